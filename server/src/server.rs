use std::collections::HashMap;

use log::{debug, warn};
use nalgebra::Isometry3;

use gripsync_shared::{
    collect_body_states, write_packets, AuthorityArbiter, HandIndex, HandKey, HostType,
    MessageError, MessageReceiver, ObjectId, ParticipantId, PhysicsBodies, PhysicsState,
    Reconciler, ReplicationPause, SessionContext, SyncMessage, UpdatePhysicsAuthority,
    UpdatePhysicsState,
};

use crate::{server_config::ServerConfig, user::User};

/// The session host.
///
/// Each simulation tick the server drains its message queues, re-arbitrates
/// authority for every hand, drives or reconciles each hand accordingly,
/// and emits scheduled state broadcasts. The host's tick loop is expected
/// to deliver zone events and received packets before calling [`tick`];
/// arbitration always runs before reconciliation, which runs before
/// transmission.
///
/// [`tick`]: Server::tick
pub struct Server {
    config: ServerConfig,
    session: SessionContext,
    arbiter: AuthorityArbiter,
    reconciler: Reconciler,
    users: Vec<User>,
    receiver: MessageReceiver,
    outgoing: Vec<(ParticipantId, SyncMessage)>,
}

impl Server {
    pub fn new(config: ServerConfig) -> Self {
        let arbiter = AuthorityArbiter::new(config.sync.authority_policy);
        let reconciler = Reconciler::new(config.sync.reconcile.clone());
        Self {
            config,
            session: SessionContext::new(),
            arbiter,
            reconciler,
            users: Vec::new(),
            receiver: MessageReceiver::new(),
            outgoing: Vec::new(),
        }
    }

    // Session management

    /// Admits a connecting operator: allocates their id and sets up sync
    /// channels and authority arbitration for both hands. The schedules
    /// get a small random phase so operators do not burst in lockstep.
    pub fn connect_participant(&mut self, now_s: f64) -> ParticipantId {
        let participant = self.session.allocate_participant();
        let phase_s = fastrand::f64() * self.config.phase_jitter_s;

        let user = User::new(participant, &self.config.sync, phase_s, now_s);
        for hand in user.hand_keys() {
            self.arbiter.register_hand(hand, &self.config.sync.zone);
        }
        self.users.push(user);

        participant
    }

    pub fn disconnect_participant(
        &mut self,
        participant: ParticipantId,
        replication: &mut dyn ReplicationPause,
    ) {
        for index in HandIndex::BOTH {
            self.arbiter
                .deregister_hand(HandKey::new(participant, index));
        }
        self.users.retain(|user| user.participant != participant);
        self.outgoing.retain(|(to, _)| *to != participant);
        self.session
            .registry_mut()
            .remove_participant(participant, replication);
        self.session.remove_participant(participant);
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut SessionContext {
        &mut self.session
    }

    // Zone maintenance, fed by the collision collaborator

    pub fn set_hand_zone_center(&mut self, hand: HandKey, center: Isometry3<f32>) {
        self.arbiter.set_zone_center(hand, center);
    }

    pub fn zone_radius_m(&self, hand: HandKey) -> Option<f32> {
        self.arbiter.zone_radius_m(hand)
    }

    pub fn hand_zone_event(&mut self, zone_owner: HandKey, other: HandKey, entered: bool) {
        self.arbiter.hand_zone_event(zone_owner, other, entered);
    }

    pub fn object_zone_event(
        &mut self,
        zone_owner: HandKey,
        object: ObjectId,
        entered: bool,
        replication: &mut dyn ReplicationPause,
    ) {
        self.arbiter.object_zone_event(
            zone_owner,
            object,
            entered,
            self.session.registry_mut(),
            replication,
        );
    }

    /// Which side is authoritative for a hand right now.
    pub fn authority(&self, hand: HandKey) -> Option<HostType> {
        self.arbiter.authority(hand)
    }

    // Networking

    /// Decodes a packet from a connected operator into the per-kind
    /// queues, drained at the top of the next tick.
    pub fn receive(&mut self, from: ParticipantId, packet: &[u8]) -> Result<(), MessageError> {
        self.receiver.read_packet(from, packet)
    }

    /// One fixed simulation step. Returns the packets to hand to the
    /// transport, addressed per participant.
    pub fn tick(
        &mut self,
        now_s: f64,
        dt: f64,
        bodies: &mut dyn PhysicsBodies,
    ) -> Vec<(ParticipantId, Vec<u8>)> {
        self.drain_inbox();
        self.arbitrate();
        self.advance_hands(now_s, dt, bodies);
        self.flush_outgoing()
    }

    fn drain_inbox(&mut self) {
        for (from, message) in self.receiver.take_targets() {
            if message.hand.participant != from {
                warn!("{from:?} sent targets for foreign hand {:?}", message.hand);
                continue;
            }
            if let Some(user) = self.find_user_mut(from) {
                user.channel_mut(message.hand.index)
                    .receive_targets(message.time_s, message.targets);
            }
        }

        for (from, message) in self.receiver.take_states() {
            if message.hand.participant != from {
                warn!("{from:?} sent state for foreign hand {:?}", message.hand);
                continue;
            }
            let hand = message.hand;
            let client_authoritative =
                self.arbiter.authority(hand) == Some(HostType::Client);

            if let Some(user) = self.find_user_mut(from) {
                user.channel_mut(hand.index)
                    .receive_state(message.time_s, message.state.clone());
            }

            // observers learn about a client-simulated hand through us
            if client_authoritative {
                let relay = SyncMessage::State(message);
                for recipient in self.recipients() {
                    if recipient != from {
                        self.outgoing.push((recipient, relay.clone()));
                    }
                }
            }
        }

        for (from, _) in self.receiver.take_authority() {
            warn!("{from:?} sent an authority message; only the server arbitrates");
        }
    }

    fn arbitrate(&mut self) {
        let flips = self.arbiter.arbitrate(self.session.registry());
        for flip in flips {
            if let Some(user) = self.find_user_mut(flip.hand.participant) {
                // stale frames must not replay under the new role
                user.channel_mut(flip.hand.index).reset();
                user.clear_last_driven(flip.hand.index);
            }
            self.outgoing.push((
                flip.hand.participant,
                SyncMessage::Authority(UpdatePhysicsAuthority {
                    hand: flip.hand,
                    side: flip.side,
                }),
            ));
        }
    }

    fn advance_hands(&mut self, now_s: f64, dt: f64, bodies: &mut dyn PhysicsBodies) {
        let reconcile = self.config.sync.reconcile.clone();

        for user_index in 0..self.users.len() {
            for index in HandIndex::BOTH {
                let participant = self.users[user_index].participant;
                let hand = HandKey::new(participant, index);
                let server_authoritative =
                    self.arbiter.authority(hand) == Some(HostType::Server);

                if server_authoritative {
                    let driven = self.users[user_index]
                        .channel_mut(index)
                        .drive_targets(dt, &reconcile);
                    if let Some(targets) = driven {
                        bodies.set_hand_targets(hand, &targets);
                        self.users[user_index].set_last_driven(index, targets);
                    }

                    let due = self.users[user_index]
                        .channel_mut(index)
                        .poll_transmission(now_s, true)
                        .is_some();
                    if due {
                        if let Some(state) = self.capture_hand_state(&*bodies, user_index, hand) {
                            let message = SyncMessage::State(UpdatePhysicsState {
                                time_s: now_s,
                                hand,
                                state,
                            });
                            for recipient in self.recipients() {
                                self.outgoing.push((recipient, message.clone()));
                            }
                        }
                    }
                } else {
                    let sampled = self.users[user_index]
                        .channel_mut(index)
                        .sample_state(dt, &reconcile);
                    if let Some(state) = sampled {
                        self.reconciler.apply(
                            dt as f32,
                            bodies,
                            self.session.hand_bodies(hand),
                            &state.body_states,
                        );
                        for (object, states) in &state.nearby_object_states {
                            self.reconciler.apply(
                                dt as f32,
                                bodies,
                                self.session.object_bodies(*object),
                                states,
                            );
                        }
                    }
                }
            }
        }
    }

    /// Snapshot of a server-simulated hand: its bodies, the targets it is
    /// being driven with, and the objects currently inside its zone.
    fn capture_hand_state(
        &self,
        bodies: &dyn PhysicsBodies,
        user_index: usize,
        hand: HandKey,
    ) -> Option<PhysicsState> {
        let user = &self.users[user_index];
        let Some(targets) = user.last_driven(hand.index) else {
            debug!("no targets driven yet for {hand:?}; skipping state broadcast");
            return None;
        };

        let Some(body_states) = collect_body_states(bodies, self.session.hand_bodies(hand)) else {
            debug!("cannot capture state for {hand:?}; body bindings unavailable");
            return None;
        };

        let mut nearby_object_states = HashMap::new();
        for object in self.arbiter.zone_objects(hand) {
            let handles = self.session.object_bodies(object);
            if let Some(states) = collect_body_states(bodies, handles) {
                nearby_object_states.insert(object, states);
            }
        }

        Some(PhysicsState {
            targets: targets.clone(),
            body_states,
            nearby_object_states,
        })
    }

    fn flush_outgoing(&mut self) -> Vec<(ParticipantId, Vec<u8>)> {
        if self.outgoing.is_empty() {
            return Vec::new();
        }

        let mut by_recipient: Vec<(ParticipantId, Vec<SyncMessage>)> = Vec::new();
        for (recipient, message) in self.outgoing.drain(..) {
            match by_recipient.iter_mut().find(|(to, _)| *to == recipient) {
                Some((_, messages)) => messages.push(message),
                None => by_recipient.push((recipient, vec![message])),
            }
        }

        let mut packets = Vec::new();
        for (recipient, messages) in by_recipient {
            for packet in write_packets(&messages) {
                packets.push((recipient, packet));
            }
        }
        packets
    }

    fn recipients(&self) -> Vec<ParticipantId> {
        self.users.iter().map(|user| user.participant).collect()
    }

    fn find_user_mut(&mut self, participant: ParticipantId) -> Option<&mut User> {
        self.users
            .iter_mut()
            .find(|user| user.participant == participant)
    }
}
