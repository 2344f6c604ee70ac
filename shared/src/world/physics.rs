use nalgebra::Vector3;

use crate::{
    world::state::{PhysicsTargets, RigidbodyState},
    BodyHandle, HandKey,
};

/// The rigid-body arena owned by the physics collaborator. The
/// synchronization core reads and writes through handles only and never
/// holds engine object references.
pub trait PhysicsBodies {
    /// Current simulated state of a body, or None if the handle is stale.
    fn body_state(&self, handle: BodyHandle) -> Option<RigidbodyState>;

    /// Overwrites pose and velocities in one step (hard snap).
    fn set_body_state(&mut self, handle: BodyHandle, state: &RigidbodyState);

    /// Overwrites velocities only, leaving pose to integrate naturally.
    fn set_body_velocities(
        &mut self,
        handle: BodyHandle,
        linear: Vector3<f32>,
        angular: Vector3<f32>,
    );

    /// Feeds this tick's kinematic drive goals to a hand's joint motors.
    fn set_hand_targets(&mut self, hand: HandKey, targets: &PhysicsTargets);
}

/// Reads the states of a handle list in order, for capture into an
/// outgoing frame. Any stale handle aborts the capture; a partial snapshot
/// would desynchronize the receiver's body ordering.
pub fn collect_body_states(
    bodies: &dyn PhysicsBodies,
    handles: &[BodyHandle],
) -> Option<Vec<RigidbodyState>> {
    if handles.is_empty() {
        return None;
    }

    let mut states = Vec::with_capacity(handles.len());
    for handle in handles {
        states.push(bodies.body_state(*handle)?);
    }
    Some(states)
}
