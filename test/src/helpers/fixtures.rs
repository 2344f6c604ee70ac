use nalgebra::{UnitQuaternion, Vector3};

use gripsync_shared::{PhysicsTargets, RigidbodyState};

/// A complete, finite targets frame with the root at `x`.
pub fn tracked_targets(x: f32) -> PhysicsTargets {
    PhysicsTargets {
        root_position: Vector3::new(x, 1.2, 0.0),
        root_orientation: UnitQuaternion::identity(),
        joint_orientations: vec![UnitQuaternion::identity(); 16],
    }
}

/// A body at rest at `x`.
pub fn resting_state(x: f32) -> RigidbodyState {
    RigidbodyState::at_rest(Vector3::new(x, 1.0, 0.0), UnitQuaternion::identity())
}
