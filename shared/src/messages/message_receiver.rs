use std::collections::VecDeque;

use gripsync_serde::{BitReader, Serde};

use crate::{
    messages::{
        error::MessageError,
        sync_message::{
            SyncMessage, UpdatePhysicsAuthority, UpdatePhysicsState, UpdatePhysicsTargets,
        },
    },
    ParticipantId,
};

/// Decodes incoming packets and queues each message by kind, tagged with
/// its sender. The queues are drained synchronously at the top of each
/// simulation tick, before arbitration and reconciliation run.
pub struct MessageReceiver {
    targets: VecDeque<(ParticipantId, UpdatePhysicsTargets)>,
    states: VecDeque<(ParticipantId, UpdatePhysicsState)>,
    authority: VecDeque<(ParticipantId, UpdatePhysicsAuthority)>,
}

impl MessageReceiver {
    pub fn new() -> Self {
        Self {
            targets: VecDeque::new(),
            states: VecDeque::new(),
            authority: VecDeque::new(),
        }
    }

    /// Decodes one packet into the per-kind queues. On a decode error the
    /// remainder of the packet is dropped; messages queued before the
    /// error stay queued.
    pub fn read_packet(
        &mut self,
        from: ParticipantId,
        packet: &[u8],
    ) -> Result<(), MessageError> {
        let mut reader = BitReader::new(packet);

        loop {
            let message_continues = bool::de(&mut reader)?;
            if !message_continues {
                break;
            }

            match SyncMessage::de(&mut reader)? {
                SyncMessage::Targets(message) => self.targets.push_back((from, message)),
                SyncMessage::State(message) => self.states.push_back((from, message)),
                SyncMessage::Authority(message) => self.authority.push_back((from, message)),
            }
        }

        Ok(())
    }

    pub fn take_targets(&mut self) -> Vec<(ParticipantId, UpdatePhysicsTargets)> {
        Vec::from(std::mem::take(&mut self.targets))
    }

    pub fn take_states(&mut self) -> Vec<(ParticipantId, UpdatePhysicsState)> {
        Vec::from(std::mem::take(&mut self.states))
    }

    pub fn take_authority(&mut self) -> Vec<(ParticipantId, UpdatePhysicsAuthority)> {
        Vec::from(std::mem::take(&mut self.authority))
    }
}

impl Default for MessageReceiver {
    fn default() -> Self {
        Self::new()
    }
}
