use std::collections::HashSet;

use log::debug;
use nalgebra::Isometry3;

use crate::{sync_config::ZoneConfig, HandKey, ObjectId};

/// The spatial region around one hand inside which objects and other hands
/// become candidates for authority contention.
///
/// The zone does not detect overlaps itself; the collision layer reports
/// enter/exit events and the zone tracks membership plus the hysteresis
/// radius. While at least one other participant's hand zone overlaps this
/// one, the radius is inflated by `(1 + hysteresis)` so the pair does not
/// flicker in and out of contention at the boundary.
pub struct PhysicsAuthorityZone {
    center: Isometry3<f32>,
    radius_m: f32,
    base_radius_m: f32,
    hysteresis: f32,
    overlapping_hands: HashSet<HandKey>,
    objects_inside: HashSet<ObjectId>,
}

impl PhysicsAuthorityZone {
    pub fn new(config: &ZoneConfig) -> Self {
        Self {
            center: Isometry3::identity(),
            radius_m: config.base_radius_m,
            base_radius_m: config.base_radius_m,
            hysteresis: config.hysteresis,
            overlapping_hands: HashSet::new(),
            objects_inside: HashSet::new(),
        }
    }

    /// Follows the tracked point each tick. Taken by value; the core never
    /// stores references into the input layer.
    pub fn set_center(&mut self, center: Isometry3<f32>) {
        self.center = center;
    }

    pub fn center(&self) -> &Isometry3<f32> {
        &self.center
    }

    pub fn radius_m(&self) -> f32 {
        self.radius_m
    }

    pub fn base_radius_m(&self) -> f32 {
        self.base_radius_m
    }

    pub fn has_hand_overlap(&self) -> bool {
        !self.overlapping_hands.is_empty()
    }

    pub fn objects_inside(&self) -> impl Iterator<Item = &ObjectId> {
        self.objects_inside.iter()
    }

    pub fn contains_object(&self, object: &ObjectId) -> bool {
        self.objects_inside.contains(object)
    }

    /// Another participant's hand zone began overlapping this one. On the
    /// 0 -> 1 edge the radius inflates.
    pub fn hand_zone_entered(&mut self, other: HandKey) {
        if !self.overlapping_hands.insert(other) {
            debug!("duplicate hand-zone enter for {other:?}");
            return;
        }
        if self.overlapping_hands.len() == 1 {
            self.radius_m = self.base_radius_m * (1.0 + self.hysteresis);
        }
    }

    /// A previously overlapping hand zone left. On the 1 -> 0 edge the
    /// radius relaxes back to its base value.
    pub fn hand_zone_exited(&mut self, other: HandKey) {
        if !self.overlapping_hands.remove(&other) {
            debug!("hand-zone exit without matching enter for {other:?}");
            return;
        }
        if self.overlapping_hands.is_empty() {
            self.radius_m = self.base_radius_m;
        }
    }

    pub fn object_entered(&mut self, object: ObjectId) {
        if !self.objects_inside.insert(object) {
            debug!("duplicate object enter for {object:?}");
        }
    }

    pub fn object_exited(&mut self, object: ObjectId) {
        if !self.objects_inside.remove(&object) {
            debug!("object exit without matching enter for {object:?}");
        }
    }
}
