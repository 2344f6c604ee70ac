use log::debug;

use crate::{
    sync_config::ReconcileConfig,
    transmission::{HandTransmission, OutboundChannel},
    world::{
        frame_buffer::TimestampedFrameBuffer,
        reconcile::follow_clock::FollowClock,
        state::{PhysicsState, PhysicsTargets},
    },
    HandKey,
};

/// The synchronization machinery one endpoint keeps per hand: the two
/// inbound frame buffers, the follow clock that trails them, and the
/// outbound schedulers.
///
/// The channel itself is role-agnostic; whether this endpoint is currently
/// authoritative for the hand is decided outside (by the arbiter on the
/// server, by the last authority notification on a client) and passed in
/// where it matters.
pub struct HandChannel {
    hand: HandKey,
    targets_buffer: TimestampedFrameBuffer<PhysicsTargets>,
    state_buffer: TimestampedFrameBuffer<PhysicsState>,
    follow: FollowClock,
    transmission: HandTransmission,
}

impl HandChannel {
    pub fn new(hand: HandKey, buffer_capacity: usize, transmission: HandTransmission) -> Self {
        Self {
            hand,
            targets_buffer: TimestampedFrameBuffer::new(buffer_capacity),
            state_buffer: TimestampedFrameBuffer::new(buffer_capacity),
            follow: FollowClock::new(),
            transmission,
        }
    }

    pub fn hand(&self) -> HandKey {
        self.hand
    }

    /// Buffers an incoming targets frame. Rejections (malformed,
    /// out-of-order) are logged by the buffer and tolerated.
    pub fn receive_targets(&mut self, time_s: f64, targets: PhysicsTargets) {
        if let Err(error) = self.targets_buffer.push(time_s, targets) {
            debug!("targets frame for {:?} dropped: {error}", self.hand);
        }
    }

    /// Buffers an incoming state frame.
    pub fn receive_state(&mut self, time_s: f64, state: PhysicsState) {
        if let Err(error) = self.state_buffer.push(time_s, state) {
            debug!("state frame for {:?} dropped: {error}", self.hand);
        }
    }

    /// Forgets all buffered frames and the follow point. Called when
    /// authority flips, so stale frames are never replayed under the new
    /// role.
    pub fn reset(&mut self) {
        self.targets_buffer.reset();
        self.state_buffer.reset();
        self.follow.reset();
    }

    /// This tick's drive goals, interpolated at the follow point. None
    /// while the buffer has no usable history or the follow point has run
    /// ahead.
    pub fn drive_targets(&mut self, dt: f64, config: &ReconcileConfig) -> Option<PhysicsTargets> {
        let newest_time_s = self.targets_buffer.latest()?.time_s;
        self.advance_follow(dt, newest_time_s, config);
        self.targets_buffer
            .sample_at(self.follow.follow_time_s())
            .into_payload()
    }

    /// This tick's reconciliation target, interpolated at the follow
    /// point. None while there is nothing usable; the caller skips
    /// correction for the tick.
    pub fn sample_state(&mut self, dt: f64, config: &ReconcileConfig) -> Option<PhysicsState> {
        let newest_time_s = self.state_buffer.latest()?.time_s;
        self.advance_follow(dt, newest_time_s, config);
        self.state_buffer
            .sample_at(self.follow.follow_time_s())
            .into_payload()
    }

    /// Polls the outbound schedule for the channel matching the current
    /// role.
    pub fn poll_transmission(
        &mut self,
        now_s: f64,
        locally_authoritative: bool,
    ) -> Option<OutboundChannel> {
        self.transmission.poll(now_s, locally_authoritative)
    }

    fn advance_follow(&mut self, dt: f64, newest_time_s: f64, config: &ReconcileConfig) {
        self.follow
            .advance(dt, newest_time_s, config.buffer_duration_s);
        self.follow
            .clamp_ahead(newest_time_s, config.max_extrapolation_time_s);
    }
}
