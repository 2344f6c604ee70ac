use gripsync_shared::{
    HandChannel, HandKey, HandTransmission, HostType, ObjectId, PhysicsTargets, SyncConfig,
};

/// Client-side record of one of the operator's own hands.
///
/// `authority_side` is this endpoint's belief, updated from the server's
/// notifications; during the round trip after a flip it may briefly
/// disagree with the server, which both sides tolerate.
pub(crate) struct LocalHand {
    channel: HandChannel,
    authority_side: HostType,
    tracked: Option<PhysicsTargets>,
    carried_objects: Vec<ObjectId>,
}

impl LocalHand {
    pub fn new(hand: HandKey, config: &SyncConfig, now_s: f64) -> Self {
        let transmission = HandTransmission::new(&config.transmission, hand.index, 0.0, now_s);
        Self {
            channel: HandChannel::new(hand, config.frame_buffer_capacity, transmission),
            authority_side: config.authority_policy.initial_side(),
            tracked: None,
            carried_objects: Vec::new(),
        }
    }

    pub fn channel_mut(&mut self) -> &mut HandChannel {
        &mut self.channel
    }

    pub fn authority_side(&self) -> HostType {
        self.authority_side
    }

    /// Adopts the server's decision; on a change the buffered history
    /// belongs to the old role and is dropped.
    pub fn set_authority_side(&mut self, side: HostType) {
        if self.authority_side != side {
            self.authority_side = side;
            self.channel.reset();
        }
    }

    pub fn is_locally_authoritative(&self) -> bool {
        self.authority_side == HostType::Client
    }

    pub fn tracked(&self) -> Option<&PhysicsTargets> {
        self.tracked.as_ref()
    }

    pub fn set_tracked(&mut self, targets: PhysicsTargets) {
        self.tracked = Some(targets);
    }

    pub fn carried_objects(&self) -> &[ObjectId] {
        &self.carried_objects
    }

    pub fn set_carried_objects(&mut self, objects: Vec<ObjectId>) {
        self.carried_objects = objects;
    }
}

/// Replica of another participant's hand; only ever observed, never
/// driven, so all it needs is the state channel.
pub(crate) struct RemoteHand {
    pub channel: HandChannel,
}

impl RemoteHand {
    pub fn new(hand: HandKey, config: &SyncConfig, now_s: f64) -> Self {
        let transmission = HandTransmission::new(&config.transmission, hand.index, 0.0, now_s);
        Self {
            channel: HandChannel::new(hand, config.frame_buffer_capacity, transmission),
        }
    }

    pub fn hand(&self) -> HandKey {
        self.channel.hand()
    }
}
