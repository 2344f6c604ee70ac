use crate::world::authority::AuthorityPolicy;

/// Numeric knobs governing reconciliation of a non-authoritative simulation
/// toward the authoritative one.
///
/// The spring/damping defaults are empirically tuned for a 90 Hz fixed step;
/// re-verify stability before running at a substantially different tick
/// rate. The discrete spring is stable while `stiffness * dt^2 < 4`.
#[derive(Clone, Debug)]
pub struct ReconcileConfig {
    /// How far behind the newest received frame the follow point tries to
    /// stay, in seconds. `<= 0.0` disables adaptive follow-time scaling.
    pub buffer_duration_s: f64,
    /// Position error beyond which the body is snapped to the target
    /// instead of nudged.
    pub max_position_error_m: f32,
    /// Orientation error beyond which the body is snapped to the target
    /// instead of nudged, in radians.
    pub max_orientation_error_rad: f32,
    /// Spring gain pulling linear velocity toward the position target,
    /// in 1/s^2.
    pub position_stiffness: f32,
    /// Fraction-per-second of overshooting linear velocity removed along
    /// the error axis.
    pub position_damping: f32,
    /// Spring gain pulling angular velocity toward the orientation target,
    /// in 1/s^2.
    pub orientation_stiffness: f32,
    /// Fraction-per-second of overshooting angular velocity removed along
    /// the error axis.
    pub orientation_damping: f32,
    /// Once the follow point would run ahead of the newest frame by more
    /// than this, it is held back rather than allowed to race further
    /// ahead. No correction is applied while ahead at all.
    pub max_extrapolation_time_s: f64,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            buffer_duration_s: 0.1,
            max_position_error_m: 0.25,
            max_orientation_error_rad: std::f32::consts::FRAC_PI_2,
            position_stiffness: 60.0,
            position_damping: 8.0,
            orientation_stiffness: 60.0,
            orientation_damping: 8.0,
            max_extrapolation_time_s: 0.5,
        }
    }
}

/// Shape of the spatial region around a hand used for authority contention.
#[derive(Clone, Debug)]
pub struct ZoneConfig {
    /// Resting radius of a hand's authority zone, in meters.
    pub base_radius_m: f32,
    /// Fractional inflation applied while the zone overlaps another
    /// participant's hand zone, guarding against authority flicker at the
    /// boundary.
    pub hysteresis: f32,
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            base_radius_m: 0.35,
            hysteresis: 0.2,
        }
    }
}

/// Outbound send rates. The two channels are independent because a hand can
/// alternate between driving (targets up) and broadcasting (state down)
/// within one session; authority selects which one is live.
#[derive(Clone, Debug)]
pub struct TransmissionConfig {
    /// Send rate for kinematic drive targets, in Hz.
    pub targets_send_hz: f64,
    /// Send rate for full authoritative state, in Hz.
    pub state_send_hz: f64,
}

impl Default for TransmissionConfig {
    fn default() -> Self {
        Self {
            targets_send_hz: 30.0,
            state_send_hz: 20.0,
        }
    }
}

/// Everything the synchronization core can be tuned with.
#[derive(Clone, Debug)]
pub struct SyncConfig {
    /// How simulation authority over a hand is decided each tick.
    pub authority_policy: AuthorityPolicy,
    pub transmission: TransmissionConfig,
    pub reconcile: ReconcileConfig,
    pub zone: ZoneConfig,
    /// Slots in each timestamped frame ring.
    pub frame_buffer_capacity: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            authority_policy: AuthorityPolicy::Dynamic,
            transmission: TransmissionConfig::default(),
            reconcile: ReconcileConfig::default(),
            zone: ZoneConfig::default(),
            frame_buffer_capacity: 128,
        }
    }
}
