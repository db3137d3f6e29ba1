// crates/quota-ledger-core/src/core/counters.rs
// ============================================================================
// Module: Resource Counters
// Description: Counter set shared by the persisted ledger and requests.
// Purpose: Provide all-or-nothing reservation arithmetic over named counters.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`ResourceSet`] holds one unsigned counter per tracked resource kind.
//! The same shape serves two roles: the persisted ledger content (remaining
//! reservable units) and the ephemeral per-scenario request (units a test
//! needs for its duration). Counters are unsigned, so a ledger counter can
//! never go negative; an acquire that cannot be fully satisfied is rejected
//! without mutating anything.
//!
//! Serialized field keys are stable and match the on-disk YAML encoding
//! exactly (`ec2-normal`, `vpc`, `eip`, `igw`, `ngw`, `classiclb`,
//! `ec2-GPU`, `volume-GP2`, `eventBridge-rules`).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Resource Kind
// ============================================================================

/// Tracked resource kinds.
///
/// # Invariants
/// - Variants are stable; `as_str` labels equal the serialized field keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    /// Normal EC2 capacity, vCPU-denominated.
    Ec2Normal,
    /// Virtual private clouds.
    Vpc,
    /// Elastic IP addresses.
    Eip,
    /// Internet gateways.
    Igw,
    /// NAT gateways.
    Ngw,
    /// Classic load balancers.
    ClassicLb,
    /// GPU EC2 capacity, vCPU-denominated.
    Ec2Gpu,
    /// General-purpose SSD (gp2) volume storage.
    VolumeGp2,
    /// EventBridge rules.
    EventBridgeRules,
}

impl ResourceKind {
    /// All kinds in canonical field order.
    pub const ALL: [Self; 9] = [
        Self::Ec2Normal,
        Self::Vpc,
        Self::Eip,
        Self::Igw,
        Self::Ngw,
        Self::ClassicLb,
        Self::Ec2Gpu,
        Self::VolumeGp2,
        Self::EventBridgeRules,
    ];

    /// Returns the stable label for the kind, equal to its field key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ec2Normal => "ec2-normal",
            Self::Vpc => "vpc",
            Self::Eip => "eip",
            Self::Igw => "igw",
            Self::Ngw => "ngw",
            Self::ClassicLb => "classiclb",
            Self::Ec2Gpu => "ec2-GPU",
            Self::VolumeGp2 => "volume-GP2",
            Self::EventBridgeRules => "eventBridge-rules",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Worker Identifier
// ============================================================================

/// Identifier of one parallel test-execution process.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct WorkerId(u32);

impl WorkerId {
    /// Creates a new worker identifier.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw worker number.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u32> for WorkerId {
    fn from(value: u32) -> Self {
        Self::new(value)
    }
}

// ============================================================================
// SECTION: Resource Set
// ============================================================================

/// A request for capacity, with the same counter shape as the ledger.
///
/// A counter of 0 means "don't care": it never blocks acquisition and is
/// never decremented.
pub type ResourceRequest = ResourceSet;

/// One unsigned counter per tracked resource kind.
///
/// # Invariants
/// - Counters are unsigned; reservation arithmetic is all-or-nothing.
/// - Field keys are the canonical on-disk encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceSet {
    /// Normal EC2 capacity in vCPUs.
    #[serde(rename = "ec2-normal", default)]
    pub ec2_normal: u64,
    /// VPC count.
    #[serde(default)]
    pub vpc: u64,
    /// Elastic IP count.
    #[serde(default)]
    pub eip: u64,
    /// Internet gateway count.
    #[serde(default)]
    pub igw: u64,
    /// NAT gateway count.
    #[serde(default)]
    pub ngw: u64,
    /// Classic load balancer count.
    #[serde(rename = "classiclb", default)]
    pub classic_lb: u64,
    /// GPU EC2 capacity in vCPUs.
    #[serde(rename = "ec2-GPU", default)]
    pub ec2_gpu: u64,
    /// gp2 volume storage units.
    #[serde(rename = "volume-GP2", default)]
    pub volume_gp2: u64,
    /// EventBridge rule count.
    #[serde(rename = "eventBridge-rules", default)]
    pub event_bridge_rules: u64,
}

impl ResourceSet {
    /// Creates an empty set with every counter at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the counter for a kind.
    #[must_use]
    pub const fn get(&self, kind: ResourceKind) -> u64 {
        match kind {
            ResourceKind::Ec2Normal => self.ec2_normal,
            ResourceKind::Vpc => self.vpc,
            ResourceKind::Eip => self.eip,
            ResourceKind::Igw => self.igw,
            ResourceKind::Ngw => self.ngw,
            ResourceKind::ClassicLb => self.classic_lb,
            ResourceKind::Ec2Gpu => self.ec2_gpu,
            ResourceKind::VolumeGp2 => self.volume_gp2,
            ResourceKind::EventBridgeRules => self.event_bridge_rules,
        }
    }

    /// Sets the counter for a kind.
    pub const fn set(&mut self, kind: ResourceKind, value: u64) {
        match kind {
            ResourceKind::Ec2Normal => self.ec2_normal = value,
            ResourceKind::Vpc => self.vpc = value,
            ResourceKind::Eip => self.eip = value,
            ResourceKind::Igw => self.igw = value,
            ResourceKind::Ngw => self.ngw = value,
            ResourceKind::ClassicLb => self.classic_lb = value,
            ResourceKind::Ec2Gpu => self.ec2_gpu = value,
            ResourceKind::VolumeGp2 => self.volume_gp2 = value,
            ResourceKind::EventBridgeRules => self.event_bridge_rules = value,
        }
    }

    /// Returns the set with one counter replaced.
    #[must_use]
    pub const fn with(mut self, kind: ResourceKind, value: u64) -> Self {
        self.set(kind, value);
        self
    }

    /// Returns true when every counter is zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        ResourceKind::ALL.iter().all(|kind| self.get(*kind) == 0)
    }

    /// Returns true when every counter satisfies the request.
    ///
    /// A request counter of 0 is vacuously satisfied.
    #[must_use]
    pub fn covers(&self, request: &Self) -> bool {
        ResourceKind::ALL.iter().all(|kind| self.get(*kind) >= request.get(*kind))
    }

    /// Subtracts a request from every counter, all-or-nothing.
    ///
    /// Returns `None` when any counter would go negative; the receiver is
    /// never mutated.
    #[must_use]
    pub fn checked_sub(&self, request: &Self) -> Option<Self> {
        let mut out = *self;
        for kind in ResourceKind::ALL {
            out.set(kind, self.get(kind).checked_sub(request.get(kind))?);
        }
        Some(out)
    }

    /// Adds a request back into every counter.
    ///
    /// Deliberately unclamped with respect to the seeded maximum: releases
    /// from inconsistent callers can push a counter past its original seed.
    #[must_use]
    pub fn saturating_add(&self, request: &Self) -> Self {
        let mut out = *self;
        for kind in ResourceKind::ALL {
            out.set(kind, self.get(kind).saturating_add(request.get(kind)));
        }
        out
    }

    /// Reports the per-counter shortfall of this set against a request.
    ///
    /// Counters the request does not ask for are omitted.
    #[must_use]
    pub fn deficits(&self, request: &Self) -> Vec<Deficit> {
        ResourceKind::ALL
            .iter()
            .filter(|kind| request.get(**kind) > self.get(**kind))
            .map(|kind| Deficit {
                kind: *kind,
                requested: request.get(*kind),
                available: self.get(*kind),
            })
            .collect()
    }
}

// ============================================================================
// SECTION: Deficit
// ============================================================================

/// Shortfall of one ledger counter against a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deficit {
    /// Counter kind.
    pub kind: ResourceKind,
    /// Units the request asked for.
    pub requested: u64,
    /// Units the ledger had available.
    pub available: u64,
}

impl fmt::Display for Deficit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: requested {}, available {}", self.kind, self.requested, self.available)
    }
}

/// Formats a deficit list for error messages.
#[must_use]
pub fn format_deficits(deficits: &[Deficit]) -> String {
    let parts: Vec<String> = deficits.iter().map(ToString::to_string).collect();
    parts.join(", ")
}
