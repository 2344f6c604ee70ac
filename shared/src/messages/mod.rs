pub mod error;
pub mod message_receiver;
pub mod message_writer;
pub mod sync_message;

pub use error::MessageError;
pub use message_receiver::MessageReceiver;
pub use message_writer::{write_packets, MessageWriter};
pub use sync_message::{
    MessageKind, SyncMessage, UpdatePhysicsAuthority, UpdatePhysicsState, UpdatePhysicsTargets,
};
