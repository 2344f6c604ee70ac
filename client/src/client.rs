use log::{debug, warn};

use gripsync_shared::{
    collect_body_states, write_packets, HandIndex, HandKey, HostType, MessageError,
    MessageReceiver, ObjectId, ParticipantId, PhysicsBodies, PhysicsState, PhysicsTargets,
    Reconciler, SessionContext, SyncMessage, UpdatePhysicsState, UpdatePhysicsTargets,
};

use crate::{
    client_config::ClientConfig,
    hand::{LocalHand, RemoteHand},
};

/// One connected operator's endpoint.
///
/// Each simulation tick the client drains the server's messages, follows
/// the latest authority decisions, feeds tracked input to its own hands,
/// reconciles every body some remote simulation owns, and emits whichever
/// outbound frames are due. The host's tick loop delivers received packets
/// before calling [`tick`].
///
/// [`tick`]: Client::tick
pub struct Client {
    config: ClientConfig,
    participant: ParticipantId,
    session: SessionContext,
    local_hands: [LocalHand; 2],
    remote_hands: Vec<RemoteHand>,
    receiver: MessageReceiver,
    reconciler: Reconciler,
    outgoing: Vec<SyncMessage>,
}

impl Client {
    /// `participant` is the id the session layer was assigned on connect;
    /// it must match the server's allocation.
    pub fn new(participant: ParticipantId, config: ClientConfig, now_s: f64) -> Self {
        let mut session = SessionContext::new();
        session.insert_participant(participant);

        let local_hand = |index: HandIndex| {
            LocalHand::new(HandKey::new(participant, index), &config.sync, now_s)
        };
        let local_hands = [local_hand(HandIndex::Left), local_hand(HandIndex::Right)];
        let reconciler = Reconciler::new(config.sync.reconcile.clone());

        Self {
            config,
            participant,
            session,
            local_hands,
            remote_hands: Vec::new(),
            receiver: MessageReceiver::new(),
            reconciler,
            outgoing: Vec::new(),
        }
    }

    pub fn participant(&self) -> ParticipantId {
        self.participant
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut SessionContext {
        &mut self.session
    }

    /// Starts observing another participant's hand. Its bodies must be
    /// bound in the session context for reconciliation to reach them.
    pub fn register_remote_hand(&mut self, hand: HandKey, now_s: f64) {
        if hand.participant == self.participant {
            warn!("own hand {hand:?} cannot be registered as remote");
            return;
        }
        if self.remote_hands.iter().any(|remote| remote.hand() == hand) {
            return;
        }
        self.remote_hands
            .push(RemoteHand::new(hand, &self.config.sync, now_s));
    }

    pub fn deregister_remote_hand(&mut self, hand: HandKey) {
        self.remote_hands.retain(|remote| remote.hand() != hand);
    }

    // Input seams

    /// Latest tracked pose for one of the operator's hands, from the
    /// hand-pose estimation layer.
    pub fn set_tracked_targets(&mut self, index: HandIndex, targets: PhysicsTargets) {
        self.local_hands[index.to_index()].set_tracked(targets);
    }

    /// Which grasped objects ride along in this hand's state frames, from
    /// the grasp layer.
    pub fn set_carried_objects(&mut self, index: HandIndex, objects: Vec<ObjectId>) {
        self.local_hands[index.to_index()].set_carried_objects(objects);
    }

    /// This endpoint's current belief about who simulates the hand.
    pub fn hand_authority(&self, index: HandIndex) -> HostType {
        self.local_hands[index.to_index()].authority_side()
    }

    // Networking

    /// Decodes a packet from the server into the per-kind queues, drained
    /// at the top of the next tick.
    pub fn receive(&mut self, packet: &[u8]) -> Result<(), MessageError> {
        self.receiver.read_packet(ParticipantId::SERVER, packet)
    }

    /// One fixed simulation step. Returns the packets to send to the
    /// server.
    pub fn tick(&mut self, now_s: f64, dt: f64, bodies: &mut dyn PhysicsBodies) -> Vec<Vec<u8>> {
        self.drain_inbox();
        self.advance_local_hands(now_s, dt, bodies);
        self.advance_remote_hands(dt, bodies);

        if self.outgoing.is_empty() {
            return Vec::new();
        }
        let messages: Vec<SyncMessage> = self.outgoing.drain(..).collect();
        write_packets(&messages)
    }

    fn drain_inbox(&mut self) {
        for (_, message) in self.receiver.take_authority() {
            if message.hand.participant != self.participant {
                debug!("authority update for foreign hand {:?}", message.hand);
                continue;
            }
            self.local_hands[message.hand.index.to_index()].set_authority_side(message.side);
        }

        for (_, message) in self.receiver.take_states() {
            let hand = message.hand;
            if hand.participant == self.participant {
                self.local_hands[hand.index.to_index()]
                    .channel_mut()
                    .receive_state(message.time_s, message.state);
            } else if let Some(remote) = self
                .remote_hands
                .iter_mut()
                .find(|remote| remote.hand() == hand)
            {
                remote.channel.receive_state(message.time_s, message.state);
            } else {
                debug!("state frame for unregistered hand {hand:?}");
            }
        }

        for (_, message) in self.receiver.take_targets() {
            warn!(
                "server sent targets for {:?}; clients never consume targets",
                message.hand
            );
        }
    }

    fn advance_local_hands(&mut self, now_s: f64, dt: f64, bodies: &mut dyn PhysicsBodies) {
        let reconcile = self.config.sync.reconcile.clone();

        for index in HandIndex::BOTH {
            let hand = HandKey::new(self.participant, index);
            let slot = index.to_index();

            // the hand always chases the operator's tracked pose; when the
            // server owns it, reconciliation corrects the outcome below
            if let Some(tracked) = self.local_hands[slot].tracked() {
                bodies.set_hand_targets(hand, tracked);
            }

            let locally_authoritative = self.local_hands[slot].is_locally_authoritative();
            if !locally_authoritative {
                let sampled = self.local_hands[slot]
                    .channel_mut()
                    .sample_state(dt, &reconcile);
                if let Some(state) = sampled {
                    self.apply_state(dt, bodies, hand, &state);
                }
            }

            let due = self.local_hands[slot]
                .channel_mut()
                .poll_transmission(now_s, locally_authoritative);
            match due {
                Some(channel) if locally_authoritative => {
                    debug_assert_eq!(channel, gripsync_shared::OutboundChannel::State);
                    if let Some(message) = self.capture_hand_state(&*bodies, now_s, index) {
                        self.outgoing.push(SyncMessage::State(message));
                    }
                }
                Some(_) => {
                    if let Some(tracked) = self.local_hands[slot].tracked() {
                        self.outgoing.push(SyncMessage::Targets(UpdatePhysicsTargets {
                            time_s: now_s,
                            hand,
                            targets: tracked.clone(),
                        }));
                    }
                }
                None => {}
            }
        }
    }

    fn advance_remote_hands(&mut self, dt: f64, bodies: &mut dyn PhysicsBodies) {
        let reconcile = self.config.sync.reconcile.clone();

        for remote_index in 0..self.remote_hands.len() {
            let hand = self.remote_hands[remote_index].hand();
            let sampled = self.remote_hands[remote_index]
                .channel
                .sample_state(dt, &reconcile);
            if let Some(state) = sampled {
                self.apply_state(dt, bodies, hand, &state);
            }
        }
    }

    fn apply_state(
        &self,
        dt: f64,
        bodies: &mut dyn PhysicsBodies,
        hand: HandKey,
        state: &PhysicsState,
    ) {
        self.reconciler.apply(
            dt as f32,
            bodies,
            self.session.hand_bodies(hand),
            &state.body_states,
        );
        for (object, states) in &state.nearby_object_states {
            self.reconciler
                .apply(dt as f32, bodies, self.session.object_bodies(*object), states);
        }
    }

    /// Snapshot of a locally simulated hand for broadcast: its bodies, the
    /// tracked targets driving it, and the objects it carries.
    fn capture_hand_state(
        &self,
        bodies: &dyn PhysicsBodies,
        now_s: f64,
        index: HandIndex,
    ) -> Option<UpdatePhysicsState> {
        let hand = HandKey::new(self.participant, index);
        let local = &self.local_hands[index.to_index()];

        let Some(targets) = local.tracked() else {
            debug!("no tracked pose yet for {hand:?}; skipping state send");
            return None;
        };
        let body_states = collect_body_states(bodies, self.session.hand_bodies(hand))?;

        let mut nearby_object_states = std::collections::HashMap::new();
        for object in local.carried_objects() {
            let handles = self.session.object_bodies(*object);
            if let Some(states) = collect_body_states(bodies, handles) {
                nearby_object_states.insert(*object, states);
            }
        }

        Some(UpdatePhysicsState {
            time_s: now_s,
            hand,
            state: PhysicsState {
                targets: targets.clone(),
                body_states,
                nearby_object_states,
            },
        })
    }
}
