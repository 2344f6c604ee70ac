use crate::HostType;

/// How simulation authority over a hand is decided.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthorityPolicy {
    /// The server simulates every hand, always.
    AlwaysServer,
    /// The controlling client simulates its own hands, always.
    AlwaysClient,
    /// The controlling client keeps its hands until another participant
    /// gets involved; the server then adjudicates the contested bodies.
    Dynamic,
}

impl AuthorityPolicy {
    /// The side a freshly registered hand starts on, before any
    /// interaction has been observed.
    pub fn initial_side(self) -> HostType {
        match self {
            AuthorityPolicy::AlwaysServer => HostType::Server,
            AuthorityPolicy::AlwaysClient | AuthorityPolicy::Dynamic => HostType::Client,
        }
    }
}
