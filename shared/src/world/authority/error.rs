use thiserror::Error;

use crate::HandKey;

/// Errors that can occur during authority bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthorityError {
    /// A lock on shared authority status was poisoned by a panicking
    /// holder.
    #[error("lock on authority status was poisoned")]
    LockPoisoned,
    /// Attempted to register a hand that is already arbitrated.
    #[error("hand {hand:?} is already registered with the arbiter")]
    HandAlreadyRegistered { hand: HandKey },
    /// Attempted an operation on a hand the arbiter does not know.
    #[error("hand {hand:?} is not registered with the arbiter (during {operation})")]
    HandNotRegistered {
        hand: HandKey,
        operation: &'static str,
    },
}
