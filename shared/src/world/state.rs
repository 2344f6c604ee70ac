use std::collections::HashMap;

use gripsync_serde::{BitReader, BitWrite, Serde, SerdeErr};
use nalgebra::{Quaternion, UnitQuaternion, Vector3};

use crate::{world::frame_buffer::FramePayload, ObjectId};

/// Pose and velocity of one rigid body, as simulated by whichever side is
/// authoritative. Immutable value type; everything downstream works on
/// copies.
#[derive(Clone, Debug, PartialEq)]
pub struct RigidbodyState {
    pub position: Vector3<f32>,
    pub orientation: UnitQuaternion<f32>,
    pub linear_velocity: Vector3<f32>,
    pub angular_velocity: Vector3<f32>,
}

impl RigidbodyState {
    pub fn at_rest(position: Vector3<f32>, orientation: UnitQuaternion<f32>) -> Self {
        Self {
            position,
            orientation,
            linear_velocity: Vector3::zeros(),
            angular_velocity: Vector3::zeros(),
        }
    }

    /// Blends two states: linear lerp on the vector channels, shortest-path
    /// slerp on orientation. The result's orientation is re-normalized.
    pub fn interpolate(a: &Self, b: &Self, alpha: f32) -> Self {
        Self {
            position: a.position.lerp(&b.position, alpha),
            orientation: slerp_shortest(&a.orientation, &b.orientation, alpha),
            linear_velocity: a.linear_velocity.lerp(&b.linear_velocity, alpha),
            angular_velocity: a.angular_velocity.lerp(&b.angular_velocity, alpha),
        }
    }

    pub fn is_finite(&self) -> bool {
        self.position.iter().all(|v| v.is_finite())
            && self.orientation.coords.iter().all(|v| v.is_finite())
            && self.linear_velocity.iter().all(|v| v.is_finite())
            && self.angular_velocity.iter().all(|v| v.is_finite())
    }
}

/// The commanded pose a hand's joints should track this tick. Owned by the
/// side currently driving the hand; a kinematic goal, not physical state.
#[derive(Clone, Debug, PartialEq)]
pub struct PhysicsTargets {
    pub root_position: Vector3<f32>,
    pub root_orientation: UnitQuaternion<f32>,
    pub joint_orientations: Vec<UnitQuaternion<f32>>,
}

impl PhysicsTargets {
    pub fn interpolate(a: &Self, b: &Self, alpha: f32) -> Self {
        // A mid-session change in joint count would mean the sender
        // re-rigged the hand; blend the common prefix and keep the rest
        // from the newer frame.
        let joint_orientations = b
            .joint_orientations
            .iter()
            .enumerate()
            .map(|(i, to)| match a.joint_orientations.get(i) {
                Some(from) => slerp_shortest(from, to, alpha),
                None => *to,
            })
            .collect();

        Self {
            root_position: a.root_position.lerp(&b.root_position, alpha),
            root_orientation: slerp_shortest(&a.root_orientation, &b.root_orientation, alpha),
            joint_orientations,
        }
    }
}

impl FramePayload for PhysicsTargets {
    fn is_complete(&self) -> bool {
        !self.joint_orientations.is_empty()
            && self.root_position.iter().all(|v| v.is_finite())
            && self.root_orientation.coords.iter().all(|v| v.is_finite())
            && self
                .joint_orientations
                .iter()
                .all(|q| q.coords.iter().all(|v| v.is_finite()))
    }

    fn interpolate_with(&self, other: &Self, alpha: f32) -> Self {
        Self::interpolate(self, other, alpha)
    }
}

/// Full authoritative snapshot of a hand: the targets it is driving toward,
/// the states of its own rigid bodies, and the states of any nearby
/// trackable objects it is currently responsible for.
#[derive(Clone, Debug, PartialEq)]
pub struct PhysicsState {
    pub targets: PhysicsTargets,
    pub body_states: Vec<RigidbodyState>,
    pub nearby_object_states: HashMap<ObjectId, Vec<RigidbodyState>>,
}

impl PhysicsState {
    pub fn interpolate(a: &Self, b: &Self, alpha: f32) -> Self {
        let body_states = b
            .body_states
            .iter()
            .enumerate()
            .map(|(i, to)| match a.body_states.get(i) {
                Some(from) => RigidbodyState::interpolate(from, to, alpha),
                None => to.clone(),
            })
            .collect();

        // An object present in only one endpoint frame has just entered or
        // left the zone; its states come from the newer frame alone.
        let nearby_object_states = b
            .nearby_object_states
            .iter()
            .map(|(object, to_states)| {
                let states = match a.nearby_object_states.get(object) {
                    Some(from_states) => to_states
                        .iter()
                        .enumerate()
                        .map(|(i, to)| match from_states.get(i) {
                            Some(from) => RigidbodyState::interpolate(from, to, alpha),
                            None => to.clone(),
                        })
                        .collect(),
                    None => to_states.clone(),
                };
                (*object, states)
            })
            .collect();

        Self {
            targets: PhysicsTargets::interpolate(&a.targets, &b.targets, alpha),
            body_states,
            nearby_object_states,
        }
    }
}

impl FramePayload for PhysicsState {
    fn is_complete(&self) -> bool {
        self.targets.is_complete()
            && !self.body_states.is_empty()
            && self.body_states.iter().all(RigidbodyState::is_finite)
            && self
                .nearby_object_states
                .values()
                .all(|states| states.iter().all(RigidbodyState::is_finite))
    }

    fn interpolate_with(&self, other: &Self, alpha: f32) -> Self {
        Self::interpolate(self, other, alpha)
    }
}

/// Slerp that always takes the short way around, re-normalizing the result.
pub fn slerp_shortest(
    a: &UnitQuaternion<f32>,
    b: &UnitQuaternion<f32>,
    alpha: f32,
) -> UnitQuaternion<f32> {
    let mut b = *b;
    if a.coords.dot(&b.coords) < 0.0 {
        b = UnitQuaternion::new_unchecked(-b.into_inner());
    }

    match a.try_slerp(&b, alpha, 1.0e-6) {
        Some(blended) => UnitQuaternion::new_normalize(blended.into_inner()),
        // Endpoints are (nearly) antipodal even after flipping; either one
        // is as good as the other.
        None => {
            if alpha < 0.5 {
                *a
            } else {
                b
            }
        }
    }
}

// Wire helpers for the nalgebra channel types, used by the message codecs.

pub(crate) fn ser_vector3(value: &Vector3<f32>, writer: &mut dyn BitWrite) {
    value.x.ser(writer);
    value.y.ser(writer);
    value.z.ser(writer);
}

pub(crate) fn de_vector3(reader: &mut BitReader) -> Result<Vector3<f32>, SerdeErr> {
    Ok(Vector3::new(
        f32::de(reader)?,
        f32::de(reader)?,
        f32::de(reader)?,
    ))
}

pub(crate) fn ser_quaternion(value: &UnitQuaternion<f32>, writer: &mut dyn BitWrite) {
    // coords packs [i, j, k, w]; the wire carries w first.
    let coords = &value.coords;
    coords.w.ser(writer);
    coords.x.ser(writer);
    coords.y.ser(writer);
    coords.z.ser(writer);
}

pub(crate) fn de_quaternion(reader: &mut BitReader) -> Result<UnitQuaternion<f32>, SerdeErr> {
    let w = f32::de(reader)?;
    let i = f32::de(reader)?;
    let j = f32::de(reader)?;
    let k = f32::de(reader)?;
    // A zero-length quaternion normalizes to NaN and is later rejected by
    // the payload completeness gate, not here.
    Ok(UnitQuaternion::new_normalize(Quaternion::new(w, i, j, k)))
}

const VECTOR3_BIT_LENGTH: u32 = 32 * 3;
const QUATERNION_BIT_LENGTH: u32 = 32 * 4;

impl Serde for RigidbodyState {
    fn ser(&self, writer: &mut dyn BitWrite) {
        ser_vector3(&self.position, writer);
        ser_quaternion(&self.orientation, writer);
        ser_vector3(&self.linear_velocity, writer);
        ser_vector3(&self.angular_velocity, writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            position: de_vector3(reader)?,
            orientation: de_quaternion(reader)?,
            linear_velocity: de_vector3(reader)?,
            angular_velocity: de_vector3(reader)?,
        })
    }

    fn bit_length(&self) -> u32 {
        VECTOR3_BIT_LENGTH * 3 + QUATERNION_BIT_LENGTH
    }
}

impl Serde for PhysicsTargets {
    fn ser(&self, writer: &mut dyn BitWrite) {
        ser_vector3(&self.root_position, writer);
        ser_quaternion(&self.root_orientation, writer);
        (self.joint_orientations.len() as u16).ser(writer);
        for joint in &self.joint_orientations {
            ser_quaternion(joint, writer);
        }
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let root_position = de_vector3(reader)?;
        let root_orientation = de_quaternion(reader)?;
        let joint_count = u16::de(reader)?;
        let mut joint_orientations = Vec::with_capacity(joint_count as usize);
        for _ in 0..joint_count {
            joint_orientations.push(de_quaternion(reader)?);
        }
        Ok(Self {
            root_position,
            root_orientation,
            joint_orientations,
        })
    }

    fn bit_length(&self) -> u32 {
        VECTOR3_BIT_LENGTH
            + QUATERNION_BIT_LENGTH
            + 16
            + QUATERNION_BIT_LENGTH * self.joint_orientations.len() as u32
    }
}

impl Serde for PhysicsState {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.targets.ser(writer);
        self.body_states.ser(writer);
        self.nearby_object_states.ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            targets: PhysicsTargets::de(reader)?,
            body_states: Vec::de(reader)?,
            nearby_object_states: HashMap::de(reader)?,
        })
    }

    fn bit_length(&self) -> u32 {
        self.targets.bit_length()
            + self.body_states.bit_length()
            + self.nearby_object_states.bit_length()
    }
}
