//! Single in-flight run per identity.

use crate::error::SwapError;
use amm_swap_domain::Address;
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

/// Owners that currently have a run in flight.
#[derive(Debug, Default)]
pub(crate) struct InFlight {
    owners: Mutex<HashSet<Address>>,
}

impl InFlight {
    fn owners(&self) -> MutexGuard<'_, HashSet<Address>> {
        // Poisoning only means a holder panicked; the set itself stays valid.
        self.owners.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Claims `owner`, or fails if it already has a run in flight.
    pub(crate) fn claim(&self, owner: Address) -> Result<InFlightGuard<'_>, SwapError> {
        if !self.owners().insert(owner) {
            return Err(SwapError::OrchestrationBusy(owner));
        }
        Ok(InFlightGuard { set: self, owner })
    }

    pub(crate) fn is_busy(&self, owner: &Address) -> bool {
        self.owners().contains(owner)
    }
}

/// Releases the claim when dropped.
pub(crate) struct InFlightGuard<'a> {
    set: &'a InFlight,
    owner: Address,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.set.owners().remove(&self.owner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_claim_is_busy_until_release() {
        let set = InFlight::default();
        let owner = Address::from_bytes([7; 20]);

        let guard = set.claim(owner).unwrap();
        assert!(set.is_busy(&owner));
        assert!(matches!(
            set.claim(owner),
            Err(SwapError::OrchestrationBusy(o)) if o == owner
        ));

        drop(guard);
        assert!(!set.is_busy(&owner));
        assert!(set.claim(owner).is_ok());
    }

    #[test]
    fn test_claims_are_per_owner() {
        let set = InFlight::default();
        let _a = set.claim(Address::from_bytes([1; 20])).unwrap();
        assert!(set.claim(Address::from_bytes([2; 20])).is_ok());
    }
}
