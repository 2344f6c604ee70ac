use gripsync_serde::{BitWrite, BitWriter, Serde, MTU_SIZE_BITS};
use log::warn;

use crate::messages::{error::MessageError, sync_message::SyncMessage};

/// Builds one outgoing packet. Each message is preceded by a continue bit;
/// a false bit terminates the sequence so the receiver knows where to stop
/// inside the final partial byte.
pub struct MessageWriter {
    writer: BitWriter,
}

impl MessageWriter {
    pub fn new() -> Self {
        Self {
            writer: BitWriter::new(),
        }
    }

    /// Appends a message if the packet still has room for it plus the
    /// terminator.
    pub fn try_write(&mut self, message: &SyncMessage) -> Result<(), MessageError> {
        let needed = 1 + message.bit_length() + 1;
        if needed > MTU_SIZE_BITS {
            return Err(MessageError::MessageTooLarge {
                bits: message.bit_length(),
                limit: MTU_SIZE_BITS,
            });
        }
        if self.writer.bits_written() + needed > MTU_SIZE_BITS {
            return Err(MessageError::PacketFull {
                bits: self.writer.bits_written(),
            });
        }

        self.writer.write_bit(true);
        message.ser(&mut self.writer);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.writer.bits_written() == 0
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.writer.write_bit(false);
        self.writer.to_bytes()
    }
}

impl Default for MessageWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Packs a batch of messages into as many packets as needed. A message too
/// large for any packet is dropped with a warning; everything else is
/// delivered.
pub fn write_packets(messages: &[SyncMessage]) -> Vec<Vec<u8>> {
    let mut packets = Vec::new();
    let mut writer = MessageWriter::new();

    for message in messages {
        match writer.try_write(message) {
            Ok(()) => {}
            Err(MessageError::PacketFull { .. }) => {
                packets.push(writer.finish());
                writer = MessageWriter::new();
                if let Err(error) = writer.try_write(message) {
                    warn!("dropping undeliverable message: {error}");
                }
            }
            Err(error) => {
                warn!("dropping undeliverable message: {error}");
            }
        }
    }

    if !writer.is_empty() {
        packets.push(writer.finish());
    }

    packets
}
