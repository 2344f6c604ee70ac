use crate::sync_config::TransmissionConfig;
use crate::HandIndex;

/// Which outbound channel a hand transmits on this tick. Exactly one of
/// the two is live at a time, selected by current authority.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutboundChannel {
    /// Kinematic drive goals, sent while not authoritative.
    Targets,
    /// Full authoritative snapshots, sent while authoritative.
    State,
}

/// Decides when one channel is due to emit a frame.
///
/// Due times live on a fixed lattice `epoch + offset + k * period`;
/// marking a send advances to the next lattice point past `now`. Keeping
/// the lattice (instead of re-basing on the actual send time) is what
/// makes the half-period stagger between sibling hands hold up on a
/// discrete tick grid.
#[derive(Clone, Debug)]
pub struct TransmissionScheduler {
    period_s: f64,
    next_send_s: f64,
}

impl TransmissionScheduler {
    pub fn from_hz(frequency_hz: f64, offset_s: f64, now_s: f64) -> Self {
        let period_s = if frequency_hz > 0.0 {
            1.0 / frequency_hz
        } else {
            f64::INFINITY
        };
        Self {
            period_s,
            next_send_s: now_s + offset_s,
        }
    }

    pub fn period_s(&self) -> f64 {
        self.period_s
    }

    pub fn should_send(&self, now_s: f64) -> bool {
        now_s >= self.next_send_s
    }

    /// Advances past `now` without emitting make-up frames after a stall.
    pub fn mark_sent(&mut self, now_s: f64) {
        while self.next_send_s <= now_s {
            self.next_send_s += self.period_s;
        }
    }
}

/// The pair of schedulers owned by one hand. The second hand of a pair is
/// constructed with its channels offset by half a period so the two hands
/// never burst on the same tick.
pub struct HandTransmission {
    targets: TransmissionScheduler,
    state: TransmissionScheduler,
}

impl HandTransmission {
    /// `extra_offset_s` adds a per-participant phase shift on top of the
    /// half-period stagger between a participant's two hands.
    pub fn new(
        config: &TransmissionConfig,
        index: HandIndex,
        extra_offset_s: f64,
        now_s: f64,
    ) -> Self {
        let stagger = |frequency_hz: f64| -> f64 {
            let half_period = if frequency_hz > 0.0 {
                0.5 / frequency_hz
            } else {
                0.0
            };
            match index {
                HandIndex::Left => extra_offset_s,
                HandIndex::Right => half_period + extra_offset_s,
            }
        };

        Self {
            targets: TransmissionScheduler::from_hz(
                config.targets_send_hz,
                stagger(config.targets_send_hz),
                now_s,
            ),
            state: TransmissionScheduler::from_hz(
                config.state_send_hz,
                stagger(config.state_send_hz),
                now_s,
            ),
        }
    }

    /// Polls the channel selected by current authority; marks it sent when
    /// it fires.
    pub fn poll(&mut self, now_s: f64, locally_authoritative: bool) -> Option<OutboundChannel> {
        let (scheduler, channel) = if locally_authoritative {
            (&mut self.state, OutboundChannel::State)
        } else {
            (&mut self.targets, OutboundChannel::Targets)
        };

        if scheduler.should_send(now_s) {
            scheduler.mark_sent(now_s);
            Some(channel)
        } else {
            None
        }
    }
}
