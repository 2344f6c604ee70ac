use log::info;
use nalgebra::Isometry3;

use crate::{
    sync_config::ZoneConfig,
    world::authority::{
        auth_channel::{AuthorityMutator, HandAuthorityChannel},
        error::AuthorityError,
        policy::AuthorityPolicy,
        registry::{ReplicationPause, ZoneOverlapRegistry},
        zone::PhysicsAuthorityZone,
        AuthorityAccessor,
    },
    HandKey, HostType, ObjectId,
};

/// Emitted when the authoritative side for a hand changes. The endpoint
/// that observes the flip resets the affected frame buffers and notifies
/// the hand's owner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuthorityFlip {
    pub hand: HandKey,
    pub side: HostType,
}

struct HandArbitration {
    hand: HandKey,
    zone: PhysicsAuthorityZone,
    mutator: AuthorityMutator,
    accessor: AuthorityAccessor,
}

/// Decides, per tick, which side is authoritative for each registered hand.
///
/// Runs only where the decision can be made; in this topology that is the
/// server. Hands are kept in registration order so arbitration order is
/// deterministic within a tick.
pub struct AuthorityArbiter {
    policy: AuthorityPolicy,
    hands: Vec<HandArbitration>,
}

impl AuthorityArbiter {
    pub fn new(policy: AuthorityPolicy) -> Self {
        Self {
            policy,
            hands: Vec::new(),
        }
    }

    pub fn policy(&self) -> AuthorityPolicy {
        self.policy
    }

    /// Register a hand for arbitration
    ///
    /// Returns an error if the hand is already registered.
    pub fn try_register_hand(
        &mut self,
        hand: HandKey,
        zone_config: &ZoneConfig,
    ) -> Result<AuthorityAccessor, AuthorityError> {
        if self.find(hand).is_some() {
            return Err(AuthorityError::HandAlreadyRegistered { hand });
        }

        let (mutator, accessor) = HandAuthorityChannel::new_channel(self.policy.initial_side());
        self.hands.push(HandArbitration {
            hand,
            zone: PhysicsAuthorityZone::new(zone_config),
            mutator,
            accessor: accessor.clone(),
        });

        Ok(accessor)
    }

    /// Register a hand for arbitration
    ///
    /// # Panics
    ///
    /// Panics if the hand is already registered.
    /// Consider using `try_register_hand` for non-panicking error handling.
    pub fn register_hand(&mut self, hand: HandKey, zone_config: &ZoneConfig) -> AuthorityAccessor {
        self.try_register_hand(hand, zone_config)
            .expect("Hand cannot register with the arbiter more than once!")
    }

    pub fn deregister_hand(&mut self, hand: HandKey) {
        self.hands.retain(|entry| entry.hand != hand);
    }

    /// Read end of a hand's authority channel, for handing to sync
    /// components.
    pub fn try_accessor(&self, hand: HandKey) -> Result<AuthorityAccessor, AuthorityError> {
        self.find(hand)
            .map(|entry| entry.accessor.clone())
            .ok_or(AuthorityError::HandNotRegistered {
                hand,
                operation: "accessor",
            })
    }

    pub fn authority(&self, hand: HandKey) -> Option<HostType> {
        self.find(hand).map(|entry| entry.accessor.side())
    }

    /// Follows the hand's tracked point; called once per tick per hand.
    pub fn set_zone_center(&mut self, hand: HandKey, center: Isometry3<f32>) {
        if let Some(entry) = self.find_mut(hand) {
            entry.zone.set_center(center);
        }
    }

    /// Current zone radius, for the collision layer to size its overlap
    /// volume.
    pub fn zone_radius_m(&self, hand: HandKey) -> Option<f32> {
        self.find(hand).map(|entry| entry.zone.radius_m())
    }

    /// The trackable objects currently inside a hand's zone. These ride
    /// along in the hand's authoritative state frames.
    pub fn zone_objects(&self, hand: HandKey) -> Vec<ObjectId> {
        self.find(hand)
            .map(|entry| entry.zone.objects_inside().copied().collect())
            .unwrap_or_default()
    }

    /// The collision layer observed `zone_owner`'s zone beginning or
    /// ending an overlap with `other`'s zone. Overlaps between a
    /// participant's own two hands never contend for authority and are
    /// ignored.
    pub fn hand_zone_event(&mut self, zone_owner: HandKey, other: HandKey, entered: bool) {
        if zone_owner.participant == other.participant {
            return;
        }
        let Some(entry) = self.find_mut(zone_owner) else {
            return;
        };
        if entered {
            entry.zone.hand_zone_entered(other);
        } else {
            entry.zone.hand_zone_exited(other);
        }
    }

    /// The collision layer observed a trackable object crossing
    /// `zone_owner`'s zone boundary. Keeps both the zone's membership set
    /// and the session-wide overlap registry in step.
    pub fn object_zone_event(
        &mut self,
        zone_owner: HandKey,
        object: ObjectId,
        entered: bool,
        registry: &mut ZoneOverlapRegistry,
        replication: &mut dyn ReplicationPause,
    ) {
        let Some(entry) = self.find_mut(zone_owner) else {
            return;
        };
        if entered {
            entry.zone.object_entered(object);
            registry.object_entered_zone(object, zone_owner.participant, replication);
        } else {
            entry.zone.object_exited(object);
            registry.object_exited_zone(object, zone_owner.participant, replication);
        }
    }

    /// Re-evaluates authority for every hand under the configured policy.
    /// Returns the hands whose authoritative side changed this tick.
    pub fn arbitrate(&mut self, registry: &ZoneOverlapRegistry) -> Vec<AuthorityFlip> {
        let mut flips = Vec::new();

        for entry in &self.hands {
            let desired = match self.policy {
                AuthorityPolicy::AlwaysServer => HostType::Server,
                AuthorityPolicy::AlwaysClient => HostType::Client,
                AuthorityPolicy::Dynamic => dynamic_side(entry, registry),
            };

            if entry.accessor.side() != desired {
                info!("authority for {:?} flips to {desired:?}", entry.hand);
                entry.mutator.set_side(desired);
                flips.push(AuthorityFlip {
                    hand: entry.hand,
                    side: desired,
                });
            }
        }

        flips
    }

    fn find(&self, hand: HandKey) -> Option<&HandArbitration> {
        self.hands.iter().find(|entry| entry.hand == hand)
    }

    fn find_mut(&mut self, hand: HandKey) -> Option<&mut HandArbitration> {
        self.hands.iter_mut().find(|entry| entry.hand == hand)
    }
}

/// The escalation rule: contested hands and shared objects go to the
/// server; an undisturbed hand stays with its controlling client.
fn dynamic_side(entry: &HandArbitration, registry: &ZoneOverlapRegistry) -> HostType {
    if entry.zone.has_hand_overlap() {
        return HostType::Server;
    }

    let shared_object = entry
        .zone
        .objects_inside()
        .any(|object| registry.is_shared_beyond(object, entry.hand.participant));
    if shared_object {
        return HostType::Server;
    }

    HostType::Client
}
