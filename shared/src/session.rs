use std::collections::{HashMap, HashSet};

use crate::{
    key_generator::KeyGenerator,
    world::authority::ZoneOverlapRegistry,
    BodyHandle, HandKey, ObjectId, ParticipantId,
};

/// Session-wide identity and binding tables, plus the zone overlap
/// registry. Created at session start, passed to components at
/// construction, dropped at session end; there are no global registries.
///
/// The server allocates identifiers; clients mirror them with the insert
/// variants once the session layer relays the assignments.
pub struct SessionContext {
    participant_keys: KeyGenerator<ParticipantId>,
    object_keys: KeyGenerator<ObjectId>,
    participants: HashSet<ParticipantId>,
    hand_bodies: HashMap<HandKey, Vec<BodyHandle>>,
    object_bodies: HashMap<ObjectId, Vec<BodyHandle>>,
    registry: ZoneOverlapRegistry,
}

impl SessionContext {
    pub fn new() -> Self {
        Self {
            // 0 addresses the server itself
            participant_keys: KeyGenerator::new(1),
            object_keys: KeyGenerator::new(1),
            participants: HashSet::new(),
            hand_bodies: HashMap::new(),
            object_bodies: HashMap::new(),
            registry: ZoneOverlapRegistry::new(),
        }
    }

    // Participants

    pub fn allocate_participant(&mut self) -> ParticipantId {
        let participant = self.participant_keys.generate();
        self.participants.insert(participant);
        participant
    }

    /// Mirrors a server-assigned participant id on a client.
    pub fn insert_participant(&mut self, participant: ParticipantId) {
        self.participants.insert(participant);
    }

    pub fn remove_participant(&mut self, participant: ParticipantId) {
        if self.participants.remove(&participant) {
            self.participant_keys.recycle_key(&participant);
        }
        self.hand_bodies
            .retain(|hand, _| hand.participant != participant);
    }

    pub fn contains_participant(&self, participant: ParticipantId) -> bool {
        self.participants.contains(&participant)
    }

    pub fn participants(&self) -> impl Iterator<Item = &ParticipantId> {
        self.participants.iter()
    }

    // Hands & objects

    /// Records which physics bodies make up a hand, in wire order.
    pub fn bind_hand_bodies(&mut self, hand: HandKey, bodies: Vec<BodyHandle>) {
        self.hand_bodies.insert(hand, bodies);
    }

    pub fn hand_bodies(&self, hand: HandKey) -> &[BodyHandle] {
        self.hand_bodies
            .get(&hand)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn allocate_object(&mut self, bodies: Vec<BodyHandle>) -> ObjectId {
        let object = self.object_keys.generate();
        self.object_bodies.insert(object, bodies);
        object
    }

    /// Mirrors a server-assigned object id on a client.
    pub fn insert_object(&mut self, object: ObjectId, bodies: Vec<BodyHandle>) {
        self.object_bodies.insert(object, bodies);
    }

    pub fn remove_object(&mut self, object: ObjectId) {
        if self.object_bodies.remove(&object).is_some() {
            self.object_keys.recycle_key(&object);
        }
    }

    pub fn object_bodies(&self, object: ObjectId) -> &[BodyHandle] {
        self.object_bodies
            .get(&object)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    // Overlap registry

    pub fn registry(&self) -> &ZoneOverlapRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ZoneOverlapRegistry {
        &mut self.registry
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}
