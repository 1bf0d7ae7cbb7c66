//! Scoped checkout of an optional analysis capability (licence gate).
//!
//! A [`CapabilityLease`] is returned by [`acquire`] and checks the
//! capability back in when dropped, on success and error paths alike.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::error::{Result, SuitabilityError};

/// Check-out/check-in protocol around a named capability.
pub trait CapabilityGate: Send + Sync {
    /// Fails with `CapabilityUnavailable` when the capability cannot be granted.
    fn check_out(&self, capability: &str) -> Result<()>;
    fn check_in(&self, capability: &str);
}

/// A checked-out capability. Checked back in on drop.
#[must_use = "the capability is checked back in as soon as the lease is dropped"]
pub struct CapabilityLease<'a> {
    gate: &'a dyn CapabilityGate,
    capability: String,
}

impl CapabilityLease<'_> {
    pub fn capability(&self) -> &str {
        &self.capability
    }
}

impl Drop for CapabilityLease<'_> {
    fn drop(&mut self) {
        self.gate.check_in(&self.capability);
        tracing::debug!(capability = %self.capability, "capability checked in");
    }
}

/// Check out `capability` from `gate` for the lifetime of the returned lease.
pub fn acquire<'a>(gate: &'a dyn CapabilityGate, capability: &str) -> Result<CapabilityLease<'a>> {
    gate.check_out(capability)?;
    tracing::debug!(capability, "capability checked out");
    Ok(CapabilityLease {
        gate,
        capability: capability.to_string(),
    })
}

/// In-process gate granting a fixed set of capabilities and counting
/// outstanding leases per capability.
#[derive(Debug, Default)]
pub struct StaticGate {
    available: HashSet<String>,
    leases: Mutex<HashMap<String, usize>>,
}

impl StaticGate {
    pub fn new<I, S>(available: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            available: available.into_iter().map(Into::into).collect(),
            leases: Mutex::new(HashMap::new()),
        }
    }

    /// Number of leases currently held on `capability`.
    pub fn outstanding(&self, capability: &str) -> usize {
        let leases = self.leases.lock().unwrap_or_else(|e| e.into_inner());
        leases.get(capability).copied().unwrap_or(0)
    }
}

impl CapabilityGate for StaticGate {
    fn check_out(&self, capability: &str) -> Result<()> {
        if !self.available.contains(capability) {
            return Err(SuitabilityError::CapabilityUnavailable {
                capability: capability.to_string(),
            });
        }
        let mut leases = self.leases.lock().unwrap_or_else(|e| e.into_inner());
        *leases.entry(capability.to_string()).or_insert(0) += 1;
        Ok(())
    }

    fn check_in(&self, capability: &str) {
        let mut leases = self.leases.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(count) = leases.get_mut(capability) {
            *count = count.saturating_sub(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lease_is_returned_on_drop() {
        let gate = StaticGate::new(["spatial"]);
        {
            let lease = acquire(&gate, "spatial").unwrap();
            assert_eq!(lease.capability(), "spatial");
            assert_eq!(gate.outstanding("spatial"), 1);
        }
        assert_eq!(gate.outstanding("spatial"), 0);
    }

    #[test]
    fn lease_is_returned_when_the_scope_fails() {
        let gate = StaticGate::new(["spatial"]);
        let run = || -> Result<()> {
            let _lease = acquire(&gate, "spatial")?;
            Err(SuitabilityError::Schema("boom".into()))
        };
        assert!(run().is_err());
        assert_eq!(gate.outstanding("spatial"), 0);
    }

    #[test]
    fn unknown_capability_is_unavailable() {
        let gate = StaticGate::new(["spatial"]);
        assert!(matches!(
            acquire(&gate, "3d"),
            Err(SuitabilityError::CapabilityUnavailable { capability }) if capability == "3d"
        ));
        assert_eq!(gate.outstanding("3d"), 0);
    }
}
