use std::sync::{Arc, RwLock};

use crate::{world::authority::error::AuthorityError, HostType};

// HandAuthorityChannel

/// Shared cell carrying which side is currently authoritative for one hand.
/// Split at creation into a mutator (kept by the arbiter) and an accessor
/// (cloned out to whatever needs to read the decision).
#[derive(Clone, Debug)]
pub(crate) struct HandAuthorityChannel {
    data: Arc<RwLock<HostType>>,
}

impl HandAuthorityChannel {
    pub(crate) fn new_channel(initial_side: HostType) -> (AuthorityMutator, AuthorityAccessor) {
        let channel = Self {
            data: Arc::new(RwLock::new(initial_side)),
        };

        let mutator = AuthorityMutator::new(&channel);
        let accessor = AuthorityAccessor::new(&channel);

        (mutator, accessor)
    }

    /// Get the authoritative side (panicking version)
    ///
    /// # Panics
    ///
    /// Panics if the lock is poisoned.
    /// Consider using `try_side` for non-panicking error handling.
    fn side(&self) -> HostType {
        self.try_side()
            .expect("Lock on authority status is held by current thread.")
    }

    /// Get the authoritative side (non-panicking version)
    ///
    /// Returns an error if the lock is poisoned.
    fn try_side(&self) -> Result<HostType, AuthorityError> {
        let data = self
            .data
            .as_ref()
            .read()
            .map_err(|_| AuthorityError::LockPoisoned)?;
        Ok(*data)
    }

    /// Set the authoritative side (panicking version)
    ///
    /// # Panics
    ///
    /// Panics if the lock is poisoned.
    /// Consider using `try_set_side` for non-panicking error handling.
    fn set_side(&self, side: HostType) {
        self.try_set_side(side)
            .expect("Lock on authority status is held by current thread.")
    }

    /// Set the authoritative side (non-panicking version)
    ///
    /// Returns an error if the lock is poisoned.
    fn try_set_side(&self, side: HostType) -> Result<(), AuthorityError> {
        let mut data = self
            .data
            .as_ref()
            .write()
            .map_err(|_| AuthorityError::LockPoisoned)?;
        *data = side;
        Ok(())
    }
}

// AuthorityAccessor

/// Read end of a hand's authority channel.
#[derive(Clone, Debug)]
pub struct AuthorityAccessor {
    channel: HandAuthorityChannel,
}

impl AuthorityAccessor {
    fn new(channel: &HandAuthorityChannel) -> Self {
        Self {
            channel: channel.clone(),
        }
    }

    /// Get the authoritative side (panicking version)
    ///
    /// # Panics
    ///
    /// Panics if the lock is poisoned.
    /// Consider using `try_side` for non-panicking error handling.
    pub fn side(&self) -> HostType {
        self.channel.side()
    }

    /// Get the authoritative side (non-panicking version)
    ///
    /// Returns an error if the lock is poisoned.
    pub fn try_side(&self) -> Result<HostType, AuthorityError> {
        self.channel.try_side()
    }
}

// AuthorityMutator
// no Clone necessary

pub(crate) struct AuthorityMutator {
    channel: HandAuthorityChannel,
}

impl AuthorityMutator {
    fn new(channel: &HandAuthorityChannel) -> Self {
        Self {
            channel: channel.clone(),
        }
    }

    /// Set the authoritative side (panicking version)
    ///
    /// # Panics
    ///
    /// Panics if the lock is poisoned.
    /// Consider using `try_set_side` for non-panicking error handling.
    pub(crate) fn set_side(&self, side: HostType) {
        self.channel.set_side(side);
    }

    /// Set the authoritative side (non-panicking version)
    ///
    /// Returns an error if the lock is poisoned.
    pub(crate) fn try_set_side(&self, side: HostType) -> Result<(), AuthorityError> {
        self.channel.try_set_side(side)
    }
}
