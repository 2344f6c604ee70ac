use std::collections::HashSet;

use gripsync_shared::{ObjectId, ReplicationPause};

/// Records every pause/resume toggle the core issues for independently
/// replicated objects.
#[derive(Default)]
pub struct PauseRecorder {
    paused: HashSet<ObjectId>,
    events: Vec<(ObjectId, bool)>,
}

impl PauseRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_paused(&self, object: ObjectId) -> bool {
        self.paused.contains(&object)
    }

    pub fn events(&self) -> &[(ObjectId, bool)] {
        &self.events
    }
}

impl ReplicationPause for PauseRecorder {
    fn set_paused(&mut self, object: ObjectId, paused: bool) {
        if paused {
            self.paused.insert(object);
        } else {
            self.paused.remove(&object);
        }
        self.events.push((object, paused));
    }
}
