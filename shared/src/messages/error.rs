use gripsync_serde::SerdeErr;
use thiserror::Error;

/// Errors that can occur while encoding or decoding packets.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MessageError {
    /// The incoming bitstream did not decode as a message sequence. The
    /// rest of the packet is dropped; the sender retransmits on schedule.
    #[error("failed to decode packet: {0}")]
    Decode(#[from] SerdeErr),
    /// A single message is too large to ever fit a packet.
    #[error("message of {bits} bits exceeds the packet limit of {limit} bits")]
    MessageTooLarge { bits: u32, limit: u32 },
    /// The current packet has no room left for the message; flush and
    /// start another.
    #[error("packet is full ({bits} bits written)")]
    PacketFull { bits: u32 },
}
