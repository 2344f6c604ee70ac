//! # Gripsync Serde
//! Bit-level serialization for the gripsync wire protocol.

mod bit_reader;
mod bit_writer;
mod error;
mod serde;

pub use bit_reader::BitReader;
pub use bit_writer::{BitWrite, BitWriter};
pub use error::SerdeErr;
pub use serde::Serde;

/// Maximum size of a single outgoing packet, in bytes.
pub const MTU_SIZE_BYTES: usize = 1200;
/// Maximum size of a single outgoing packet, in bits.
pub const MTU_SIZE_BITS: u32 = (MTU_SIZE_BYTES as u32) * 8;
