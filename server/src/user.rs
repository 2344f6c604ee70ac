use gripsync_shared::{
    HandChannel, HandIndex, HandKey, HandTransmission, ParticipantId, PhysicsTargets, SyncConfig,
};

/// Server-side record of one connected operator: the sync channels for
/// both hands plus the most recent targets each hand was driven with,
/// kept for inclusion in outgoing state frames.
pub(crate) struct User {
    pub participant: ParticipantId,
    hands: [HandChannel; 2],
    last_driven: [Option<PhysicsTargets>; 2],
}

impl User {
    pub fn new(participant: ParticipantId, config: &SyncConfig, phase_s: f64, now_s: f64) -> Self {
        let channel = |index: HandIndex| {
            HandChannel::new(
                HandKey::new(participant, index),
                config.frame_buffer_capacity,
                HandTransmission::new(&config.transmission, index, phase_s, now_s),
            )
        };

        Self {
            participant,
            hands: [channel(HandIndex::Left), channel(HandIndex::Right)],
            last_driven: [None, None],
        }
    }

    pub fn hand_keys(&self) -> [HandKey; 2] {
        HandIndex::BOTH.map(|index| HandKey::new(self.participant, index))
    }

    pub fn channel_mut(&mut self, index: HandIndex) -> &mut HandChannel {
        &mut self.hands[index.to_index()]
    }

    pub fn last_driven(&self, index: HandIndex) -> Option<&PhysicsTargets> {
        self.last_driven[index.to_index()].as_ref()
    }

    pub fn set_last_driven(&mut self, index: HandIndex, targets: PhysicsTargets) {
        self.last_driven[index.to_index()] = Some(targets);
    }

    pub fn clear_last_driven(&mut self, index: HandIndex) {
        self.last_driven[index.to_index()] = None;
    }
}
