use std::collections::HashMap;

use log::{debug, warn};

use crate::{ObjectId, ParticipantId};

/// Control handle over an object's own independent replication component.
/// While an object sits inside at least one hand's authority zone, its
/// independent replication is paused and the zone owner's channel carries
/// its state instead.
pub trait ReplicationPause {
    fn set_paused(&mut self, object: ObjectId, paused: bool);
}

/// Session-scoped record of which trackable objects currently sit inside
/// which participants' hand zones.
///
/// Counts are per participant because both of an operator's hands may
/// contain the same object at once. An entry is removed the moment its
/// count reaches zero, and an object's mapping is removed once empty, so
/// membership checks are pure existence checks.
pub struct ZoneOverlapRegistry {
    overlaps: HashMap<ObjectId, HashMap<ParticipantId, u32>>,
}

impl ZoneOverlapRegistry {
    pub fn new() -> Self {
        Self {
            overlaps: HashMap::new(),
        }
    }

    /// An object crossed into one of `participant`'s hand zones. On the
    /// first overlap across all participants, the object's independent
    /// replication is paused.
    pub fn object_entered_zone(
        &mut self,
        object: ObjectId,
        participant: ParticipantId,
        replication: &mut dyn ReplicationPause,
    ) {
        let first_owner = !self.overlaps.contains_key(&object);

        let count = self
            .overlaps
            .entry(object)
            .or_default()
            .entry(participant)
            .or_insert(0);
        *count += 1;

        if first_owner {
            debug!("{object:?} entered its first zone; pausing independent replication");
            replication.set_paused(object, true);
        }
    }

    /// An object left one of `participant`'s hand zones. When the last
    /// owner lets go, independent replication resumes.
    pub fn object_exited_zone(
        &mut self,
        object: ObjectId,
        participant: ParticipantId,
        replication: &mut dyn ReplicationPause,
    ) {
        let Some(by_participant) = self.overlaps.get_mut(&object) else {
            warn!("zone exit for untracked {object:?}");
            return;
        };
        let Some(count) = by_participant.get_mut(&participant) else {
            warn!("zone exit for {object:?} without matching enter by {participant:?}");
            return;
        };

        *count -= 1;
        if *count == 0 {
            by_participant.remove(&participant);
        }
        if by_participant.is_empty() {
            self.overlaps.remove(&object);
            debug!("{object:?} left its last zone; resuming independent replication");
            replication.set_paused(object, false);
        }
    }

    /// Whether any participant other than `participant` currently holds the
    /// object in a zone.
    pub fn is_shared_beyond(&self, object: &ObjectId, participant: ParticipantId) -> bool {
        self.overlaps
            .get(object)
            .is_some_and(|by_participant| by_participant.keys().any(|other| *other != participant))
    }

    pub fn is_tracked(&self, object: &ObjectId) -> bool {
        self.overlaps.contains_key(object)
    }

    pub fn overlap_count(&self, object: &ObjectId, participant: ParticipantId) -> u32 {
        self.overlaps
            .get(object)
            .and_then(|by_participant| by_participant.get(&participant))
            .copied()
            .unwrap_or(0)
    }

    /// Drops every overlap held by a departing participant, resuming
    /// replication for objects it was the last owner of. Normally the
    /// collision layer delivers matching exits first and this is a no-op.
    pub fn remove_participant(
        &mut self,
        participant: ParticipantId,
        replication: &mut dyn ReplicationPause,
    ) {
        self.overlaps.retain(|object, by_participant| {
            if by_participant.remove(&participant).is_some() && by_participant.is_empty() {
                warn!("{participant:?} disconnected while holding {object:?}; resuming replication");
                replication.set_paused(*object, false);
                return false;
            }
            true
        });
    }

    /// Drops all overlap state. Called at session end.
    pub fn clear(&mut self) {
        self.overlaps.clear();
    }
}

impl Default for ZoneOverlapRegistry {
    fn default() -> Self {
        Self::new()
    }
}
