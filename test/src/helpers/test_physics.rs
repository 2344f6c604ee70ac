use std::collections::HashMap;

use nalgebra::{UnitQuaternion, Vector3};

use gripsync_shared::{BodyHandle, HandKey, PhysicsBodies, PhysicsTargets, RigidbodyState};

/// A stand-in for the physics collaborator: a plain arena of rigid-body
/// states plus a record of every targets write, so tests can observe what
/// the synchronization core drove into the simulation.
pub struct TestPhysics {
    bodies: HashMap<BodyHandle, RigidbodyState>,
    driven_targets: HashMap<HandKey, PhysicsTargets>,
    next_handle: u32,
}

impl TestPhysics {
    pub fn new() -> Self {
        Self {
            bodies: HashMap::new(),
            driven_targets: HashMap::new(),
            next_handle: 0,
        }
    }

    pub fn add_body(&mut self, state: RigidbodyState) -> BodyHandle {
        let handle = BodyHandle(self.next_handle);
        self.next_handle += 1;
        self.bodies.insert(handle, state);
        handle
    }

    pub fn state(&self, handle: BodyHandle) -> &RigidbodyState {
        &self.bodies[&handle]
    }

    pub fn set_state(&mut self, handle: BodyHandle, state: RigidbodyState) {
        self.bodies.insert(handle, state);
    }

    /// The last targets the core drove this hand with, if any.
    pub fn driven_targets(&self, hand: HandKey) -> Option<&PhysicsTargets> {
        self.driven_targets.get(&hand)
    }

    /// Integrates every body's pose forward by its velocities.
    pub fn step(&mut self, dt: f32) {
        for state in self.bodies.values_mut() {
            state.position += state.linear_velocity * dt;
            state.orientation = UnitQuaternion::from_scaled_axis(state.angular_velocity * dt)
                * state.orientation;
        }
    }
}

impl Default for TestPhysics {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsBodies for TestPhysics {
    fn body_state(&self, handle: BodyHandle) -> Option<RigidbodyState> {
        self.bodies.get(&handle).cloned()
    }

    fn set_body_state(&mut self, handle: BodyHandle, state: &RigidbodyState) {
        if let Some(slot) = self.bodies.get_mut(&handle) {
            *slot = state.clone();
        }
    }

    fn set_body_velocities(
        &mut self,
        handle: BodyHandle,
        linear: Vector3<f32>,
        angular: Vector3<f32>,
    ) {
        if let Some(slot) = self.bodies.get_mut(&handle) {
            slot.linear_velocity = linear;
            slot.angular_velocity = angular;
        }
    }

    fn set_hand_targets(&mut self, hand: HandKey, targets: &PhysicsTargets) {
        self.driven_targets.insert(hand, targets.clone());
    }
}
