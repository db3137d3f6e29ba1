// crates/quota-ledger-core/src/runtime/quotas.rs
// ============================================================================
// Module: Quota Resolution
// Description: Resolves descriptor tables into seedable service quotas.
// Purpose: Fetch current values and escalate shortfalls before seeding.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Seeding happens once per suite: every tracked quota is fetched from the
//! injected [`QuotaSource`], and when the account value sits below the
//! desired minimum an increase request is filed. The resolved values become
//! the initial ledger pool.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::QuotaDescriptor;
use crate::core::QuotaRequestStatus;
use crate::core::ServiceQuota;
use crate::interfaces::QuotaError;
use crate::interfaces::QuotaSource;

// ============================================================================
// SECTION: Resolution
// ============================================================================

/// Resolves each descriptor against the source, requesting increases for
/// values below the desired minimum.
///
/// # Errors
///
/// Returns [`QuotaError`] when any quota cannot be fetched; increase-request
/// failures are not fatal and leave the status at
/// [`QuotaRequestStatus::NotRequested`].
pub fn ensure_service_quotas(
    source: &dyn QuotaSource,
    descriptors: &[QuotaDescriptor],
) -> Result<Vec<ServiceQuota>, QuotaError> {
    let mut resolved = Vec::with_capacity(descriptors.len());
    for descriptor in descriptors {
        let value = source.current_value(descriptor)?;
        let mut quota = ServiceQuota {
            descriptor: descriptor.clone(),
            value,
            request_status: QuotaRequestStatus::NotRequested,
        };
        if quota.below_minimum()
            && let Ok(status) = source.request_increase(descriptor)
        {
            quota.request_status = status;
        }
        resolved.push(quota);
    }
    Ok(resolved)
}
