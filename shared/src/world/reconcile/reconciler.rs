use log::debug;
use nalgebra::Vector3;

use crate::{
    sync_config::ReconcileConfig,
    world::{physics::PhysicsBodies, state::RigidbodyState},
    BodyHandle,
};

/// What to do to one body this tick to track the authoritative simulation.
#[derive(Clone, Debug, PartialEq)]
pub enum BodyCorrection {
    /// Error exceeded the configured bounds; take the target state
    /// wholesale. Bounds worst-case divergence after stalls or teleports.
    Snap(RigidbodyState),
    /// Error is small; steer velocities toward the target and let the
    /// local integrator close the gap smoothly.
    Nudge {
        linear_velocity: Vector3<f32>,
        angular_velocity: Vector3<f32>,
    },
}

/// Computes per-body corrections pulling a non-authoritative simulation
/// toward authoritative state frames.
///
/// The correction is a discrete spring on velocity plus a damping term that
/// removes only the velocity component overshooting the target along the
/// error axis, so the spring never fights motion the target itself is
/// performing.
pub struct Reconciler {
    config: ReconcileConfig,
}

impl Reconciler {
    pub fn new(config: ReconcileConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    /// Correction for one body given its current and target states.
    pub fn correct_body(
        &self,
        dt: f32,
        current: &RigidbodyState,
        target: &RigidbodyState,
    ) -> BodyCorrection {
        let error_pos = target.position - current.position;

        let error_rot = target.orientation * current.orientation.inverse();
        let error_angle = error_rot.angle();
        let error_rot_vec = match error_rot.axis() {
            Some(axis) => axis.into_inner() * error_angle,
            None => Vector3::zeros(),
        };

        if error_pos.norm() > self.config.max_position_error_m
            || error_angle > self.config.max_orientation_error_rad
        {
            return BodyCorrection::Snap(target.clone());
        }

        let linear_velocity = spring_damp(
            dt,
            current.linear_velocity,
            target.linear_velocity,
            error_pos,
            self.config.position_stiffness,
            self.config.position_damping,
        );
        let angular_velocity = spring_damp(
            dt,
            current.angular_velocity,
            target.angular_velocity,
            error_rot_vec,
            self.config.orientation_stiffness,
            self.config.orientation_damping,
        );

        BodyCorrection::Nudge {
            linear_velocity,
            angular_velocity,
        }
    }

    /// Applies corrections for a set of bodies against their target states,
    /// through the physics collaborator. Handles and targets are paired by
    /// position; a count mismatch corrects the common prefix.
    pub fn apply(
        &self,
        dt: f32,
        bodies: &mut dyn PhysicsBodies,
        handles: &[BodyHandle],
        targets: &[RigidbodyState],
    ) {
        if handles.len() != targets.len() {
            debug!(
                "body count mismatch: {} local handles, {} target states",
                handles.len(),
                targets.len()
            );
        }

        for (handle, target) in handles.iter().zip(targets.iter()) {
            let Some(current) = bodies.body_state(*handle) else {
                debug!("skipping correction for stale body handle {handle:?}");
                continue;
            };

            match self.correct_body(dt, &current, target) {
                BodyCorrection::Snap(state) => bodies.set_body_state(*handle, &state),
                BodyCorrection::Nudge {
                    linear_velocity,
                    angular_velocity,
                } => bodies.set_body_velocities(*handle, linear_velocity, angular_velocity),
            }
        }
    }
}

/// One channel of the velocity correction: spring toward the error, then
/// bleed off the overshooting component along the error axis.
fn spring_damp(
    dt: f32,
    current_velocity: Vector3<f32>,
    target_velocity: Vector3<f32>,
    error: Vector3<f32>,
    stiffness: f32,
    damping: f32,
) -> Vector3<f32> {
    let mut velocity = current_velocity + error * (stiffness * dt);

    let norm = error.norm();
    if norm > 1.0e-6 {
        let axis = error / norm;
        let excess = (velocity - target_velocity).dot(&axis);
        let removal = (damping * dt).clamp(0.0, 1.0);
        velocity -= axis * (excess * removal);
    }

    velocity
}
