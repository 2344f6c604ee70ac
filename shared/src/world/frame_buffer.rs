use log::{debug, warn};
use thiserror::Error;

/// Errors that can occur when inserting into a [`TimestampedFrameBuffer`].
/// Neither is fatal; the sender retransmits on its own schedule.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FrameBufferError {
    /// The payload arrived with required sub-fields unset.
    #[error("frame at {time_s}s is missing required sub-fields")]
    MalformedPayload { time_s: f64 },
    /// The frame is older than the newest one already stored. Dropped
    /// rather than inserted mid-buffer; an intentional simplification.
    #[error("frame at {incoming_s}s arrived behind newest frame at {newest_s}s")]
    OutOfOrder { incoming_s: f64, newest_s: f64 },
}

/// A payload a [`TimestampedFrameBuffer`] can store and blend.
pub trait FramePayload: Clone {
    /// Whether all required sub-fields are set and finite. Incomplete
    /// payloads never enter a buffer.
    fn is_complete(&self) -> bool;

    /// Blend toward `other` by `alpha` in [0, 1].
    fn interpolate_with(&self, other: &Self, alpha: f32) -> Self;
}

/// One received (or produced) frame.
#[derive(Clone, Debug)]
pub struct TimestampedFrame<T> {
    pub time_s: f64,
    pub payload: T,
}

/// Outcome of sampling a buffer at a point in time.
#[derive(Clone, Debug)]
pub enum Sample<T> {
    /// No frame has ever been accepted. Expected during the first moments
    /// of a session.
    NotStarted,
    /// The requested time predates all stored history; the oldest frame is
    /// returned unmodified.
    ClampedToOldest(T),
    /// The requested time is ahead of the newest frame. The caller decides;
    /// reconciliation skips the tick rather than guessing.
    WouldExtrapolate { newest_time_s: f64 },
    /// The requested time fell between two stored frames.
    Interpolated(T),
}

impl<T> Sample<T> {
    pub fn into_payload(self) -> Option<T> {
        match self {
            Sample::ClampedToOldest(payload) | Sample::Interpolated(payload) => Some(payload),
            Sample::NotStarted | Sample::WouldExtrapolate { .. } => None,
        }
    }
}

/// Fixed-capacity ring of timestamped frames, inserted in non-decreasing
/// time order and consumed by interpolating between the pair bracketing a
/// follow time.
///
/// `tail` is the oldest live frame, `head` the newest. `tail` only advances
/// when `head` would otherwise overwrite it, or when [`sample_at`] evicts
/// history older than the bracketing pair.
///
/// [`sample_at`]: TimestampedFrameBuffer::sample_at
pub struct TimestampedFrameBuffer<T: FramePayload> {
    frames: Vec<Option<TimestampedFrame<T>>>,
    head: usize,
    tail: usize,
    started: bool,
}

impl<T: FramePayload> TimestampedFrameBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(2);
        let mut frames = Vec::with_capacity(capacity);
        frames.resize_with(capacity, || None);
        Self {
            frames,
            head: 0,
            tail: 0,
            started: false,
        }
    }

    pub fn capacity(&self) -> usize {
        self.frames.len()
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Count of live frames reachable from `tail`.
    pub fn len(&self) -> usize {
        if !self.started {
            return 0;
        }
        (self.head + self.capacity() - self.tail) % self.capacity() + 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn latest(&self) -> Option<&TimestampedFrame<T>> {
        if !self.started {
            return None;
        }
        self.frames[self.head].as_ref()
    }

    pub fn oldest(&self) -> Option<&TimestampedFrame<T>> {
        if !self.started {
            return None;
        }
        self.frames[self.tail].as_ref()
    }

    /// Accepts a frame, rejecting malformed payloads and frames older than
    /// the newest stored one. O(1).
    pub fn push(&mut self, time_s: f64, payload: T) -> Result<(), FrameBufferError> {
        if !payload.is_complete() {
            warn!("dropping malformed frame at {time_s}s");
            return Err(FrameBufferError::MalformedPayload { time_s });
        }

        if let Some(newest) = self.latest() {
            if time_s < newest.time_s {
                let newest_s = newest.time_s;
                debug!("dropping out-of-order frame at {time_s}s (newest is {newest_s}s)");
                return Err(FrameBufferError::OutOfOrder {
                    incoming_s: time_s,
                    newest_s,
                });
            }
        }

        let frame = TimestampedFrame { time_s, payload };
        if !self.started {
            self.started = true;
            self.head = self.tail;
            self.frames[self.tail] = Some(frame);
        } else {
            let next = self.next_index(self.head);
            if next == self.tail {
                // ring would eat itself; let go of the oldest frame first
                self.tail = self.next_index(self.tail);
            }
            self.frames[next] = Some(frame);
            self.head = next;
        }

        Ok(())
    }

    /// Produces the payload for `time_s`, interpolating between the
    /// bracketing pair. As a side effect, frames older than the bracketing
    /// pair are evicted; the follow point only moves forward.
    pub fn sample_at(&mut self, time_s: f64) -> Sample<T> {
        let Some(oldest) = self.oldest() else {
            return Sample::NotStarted;
        };
        if time_s <= oldest.time_s {
            return Sample::ClampedToOldest(oldest.payload.clone());
        }

        let newest_time_s = match self.latest() {
            Some(newest) => newest.time_s,
            None => return Sample::NotStarted,
        };
        if time_s > newest_time_s {
            return Sample::WouldExtrapolate { newest_time_s };
        }

        // Walk from tail toward head for the pair (a, b) with
        // a.time_s <= time_s <= b.time_s.
        let mut a = self.tail;
        let (a, b) = loop {
            if a == self.head {
                // Exhausted without bracketing; only reachable if the ring
                // was corrupted, which the push invariants rule out.
                return Sample::WouldExtrapolate { newest_time_s };
            }
            let b = self.next_index(a);
            let Some(b_time_s) = self.frame_time(b) else {
                return Sample::WouldExtrapolate { newest_time_s };
            };
            if time_s <= b_time_s {
                break (a, b);
            }
            a = b;
        };

        // Frames behind `a` are history the follow point has consumed.
        while self.tail != a {
            self.frames[self.tail] = None;
            self.tail = self.next_index(self.tail);
        }

        let (Some(frame_a), Some(frame_b)) = (self.frames[a].as_ref(), self.frames[b].as_ref())
        else {
            return Sample::WouldExtrapolate { newest_time_s };
        };

        if frame_b.time_s == frame_a.time_s {
            return Sample::Interpolated(frame_a.payload.clone());
        }

        let alpha = ((time_s - frame_a.time_s) / (frame_b.time_s - frame_a.time_s)) as f32;
        Sample::Interpolated(frame_a.payload.interpolate_with(&frame_b.payload, alpha))
    }

    /// Clears all frames and the started flag. Used when simulation
    /// authority flips and buffered history belongs to the wrong role.
    pub fn reset(&mut self) {
        for slot in &mut self.frames {
            *slot = None;
        }
        self.head = 0;
        self.tail = 0;
        self.started = false;
    }

    fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.capacity()
    }

    fn frame_time(&self, index: usize) -> Option<f64> {
        self.frames[index].as_ref().map(|frame| frame.time_s)
    }
}
