//! # Gripsync Shared
//! Common functionality shared between gripsync-server & gripsync-client crates.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

pub use gripsync_serde::{BitReader, BitWrite, BitWriter, Serde, SerdeErr, MTU_SIZE_BITS};

mod key_generator;
mod session;
mod sync_config;
mod transmission;
mod types;

pub mod messages;
pub mod world;

pub use key_generator::{GeneratedKey, KeyGenerator};
pub use messages::{
    write_packets, MessageError, MessageKind, MessageReceiver, MessageWriter, SyncMessage,
    UpdatePhysicsAuthority, UpdatePhysicsState, UpdatePhysicsTargets,
};
pub use session::SessionContext;
pub use sync_config::{ReconcileConfig, SyncConfig, TransmissionConfig, ZoneConfig};
pub use transmission::{HandTransmission, OutboundChannel, TransmissionScheduler};
pub use types::{BodyHandle, HandIndex, HandKey, HostType, ObjectId, ParticipantId};
pub use world::{
    authority::{
        AuthorityAccessor, AuthorityArbiter, AuthorityError, AuthorityFlip, AuthorityPolicy,
        PhysicsAuthorityZone, ReplicationPause, ZoneOverlapRegistry,
    },
    frame_buffer::{
        FrameBufferError, FramePayload, Sample, TimestampedFrame, TimestampedFrameBuffer,
    },
    physics::{collect_body_states, PhysicsBodies},
    reconcile::{
        follow_clock::FollowClock,
        reconciler::{BodyCorrection, Reconciler},
    },
    state::{slerp_shortest, PhysicsState, PhysicsTargets, RigidbodyState},
    sync::HandChannel,
};
