pub mod arbiter;
pub mod auth_channel;
pub mod error;
pub mod policy;
pub mod registry;
pub mod zone;

pub use arbiter::{AuthorityArbiter, AuthorityFlip};
pub use auth_channel::AuthorityAccessor;
pub use error::AuthorityError;
pub use policy::AuthorityPolicy;
pub use registry::{ReplicationPause, ZoneOverlapRegistry};
pub use zone::PhysicsAuthorityZone;
