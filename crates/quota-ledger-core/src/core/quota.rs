// crates/quota-ledger-core/src/core/quota.rs
// ============================================================================
// Module: Service Quotas
// Description: Account-level service quota records used to seed the ledger.
// Purpose: Map tracked resource kinds to provider quota codes and values.
// Dependencies: crate::core::counters, serde
// ============================================================================

//! ## Overview
//! Seeding the ledger starts from the account's actual service quotas,
//! fetched once at suite start through a [`crate::interfaces::QuotaSource`].
//! This module defines the quota records and the built-in table mapping each
//! tracked resource kind to its provider service and quota codes, together
//! with the minimum value a parallel suite needs to run comfortably.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::counters::ResourceKind;
use crate::core::counters::ResourceSet;

// ============================================================================
// SECTION: Quota Descriptor
// ============================================================================

/// Identifies one provider service quota tracked by the ledger.
///
/// # Invariants
/// - `kind` is unique across a descriptor table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaDescriptor {
    /// Tracked resource kind this quota limits.
    pub kind: ResourceKind,
    /// Provider service code, e.g. `ec2`.
    pub service_code: String,
    /// Human-readable quota name.
    pub quota_name: String,
    /// Provider quota code, e.g. `L-F678F1CE`.
    pub quota_code: String,
    /// Minimum value the suite wants; below this an increase is requested.
    pub desired_minimum: u64,
}

// ============================================================================
// SECTION: Quota Request Status
// ============================================================================

/// Status of a pending quota-increase request, if any.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuotaRequestStatus {
    /// No increase has been requested.
    #[default]
    NotRequested,
    /// An increase request is pending with the provider.
    Pending,
    /// The provider approved the increase.
    Approved,
    /// The provider denied the increase.
    Denied,
}

impl QuotaRequestStatus {
    /// Returns a stable label for the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotRequested => "not-requested",
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Denied => "denied",
        }
    }
}

impl fmt::Display for QuotaRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Service Quota
// ============================================================================

/// One resolved service quota: descriptor plus the account's current value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceQuota {
    /// Quota identity and desired minimum.
    pub descriptor: QuotaDescriptor,
    /// Current account value reported by the provider.
    pub value: u64,
    /// Status of any outstanding increase request.
    pub request_status: QuotaRequestStatus,
}

impl ServiceQuota {
    /// Returns true when the account value is below the desired minimum.
    #[must_use]
    pub const fn below_minimum(&self) -> bool {
        self.value < self.descriptor.desired_minimum
    }
}

// ============================================================================
// SECTION: Built-In Table
// ============================================================================

/// Returns the built-in table of tracked service quotas.
#[must_use]
pub fn limited_resources() -> Vec<QuotaDescriptor> {
    vec![
        QuotaDescriptor {
            kind: ResourceKind::Ec2Normal,
            service_code: "ec2".to_string(),
            quota_name: "Running On-Demand Standard (A, C, D, H, I, M, R, T, Z) instances"
                .to_string(),
            quota_code: "L-1216C47A".to_string(),
            desired_minimum: 128,
        },
        QuotaDescriptor {
            kind: ResourceKind::Vpc,
            service_code: "vpc".to_string(),
            quota_name: "VPCs per Region".to_string(),
            quota_code: "L-F678F1CE".to_string(),
            desired_minimum: 25,
        },
        QuotaDescriptor {
            kind: ResourceKind::Eip,
            service_code: "ec2".to_string(),
            quota_name: "EC2-VPC Elastic IPs".to_string(),
            quota_code: "L-0263D0A3".to_string(),
            desired_minimum: 10,
        },
        QuotaDescriptor {
            kind: ResourceKind::Igw,
            service_code: "vpc".to_string(),
            quota_name: "Internet gateways per Region".to_string(),
            quota_code: "L-A4707A72".to_string(),
            desired_minimum: 25,
        },
        QuotaDescriptor {
            kind: ResourceKind::Ngw,
            service_code: "vpc".to_string(),
            quota_name: "NAT gateways per Availability Zone".to_string(),
            quota_code: "L-FE5A380F".to_string(),
            desired_minimum: 10,
        },
        QuotaDescriptor {
            kind: ResourceKind::ClassicLb,
            service_code: "elasticloadbalancing".to_string(),
            quota_name: "Classic Load Balancers per Region".to_string(),
            quota_code: "L-E9E9831D".to_string(),
            desired_minimum: 20,
        },
        QuotaDescriptor {
            kind: ResourceKind::Ec2Gpu,
            service_code: "ec2".to_string(),
            quota_name: "Running On-Demand G and VT instances".to_string(),
            quota_code: "L-DB2E81BA".to_string(),
            desired_minimum: 8,
        },
        QuotaDescriptor {
            kind: ResourceKind::VolumeGp2,
            service_code: "ebs".to_string(),
            quota_name: "Storage for General Purpose SSD (gp2) volumes, in TiB".to_string(),
            quota_code: "L-D18FCD1D".to_string(),
            desired_minimum: 50,
        },
        QuotaDescriptor {
            kind: ResourceKind::EventBridgeRules,
            service_code: "events".to_string(),
            quota_name: "Rules per event bus".to_string(),
            quota_code: "L-244521F2".to_string(),
            desired_minimum: 100,
        },
    ]
}

/// Builds the initial ledger pool from resolved quotas.
///
/// Kinds absent from the slice stay at zero.
#[must_use]
pub fn seed_pool(quotas: &[ServiceQuota]) -> ResourceSet {
    let mut pool = ResourceSet::new();
    for quota in quotas {
        pool.set(quota.descriptor.kind, quota.value);
    }
    pool
}
