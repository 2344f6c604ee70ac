//! Property suites for the numeric core: discrete-spring stability and
//! frame-ring safety under arbitrary monotonic histories.

use proptest::prelude::*;

use gripsync_shared::{
    BodyCorrection, ReconcileConfig, Reconciler, Sample, TimestampedFrameBuffer,
};
use gripsync_test::helpers::{resting_state, tracked_targets};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// With damping disabled, the velocity spring oscillates but must not
    /// diverge anywhere inside the discrete stability envelope
    /// `stiffness * dt^2 < 4` (tested with margin).
    #[test]
    fn undamped_spring_never_diverges(
        stiffness in 1.0f32..2000.0,
        dt in 0.002f32..0.03,
    ) {
        prop_assume!(stiffness * dt * dt < 3.0);

        let config = ReconcileConfig {
            position_stiffness: stiffness,
            position_damping: 0.0,
            max_position_error_m: f32::MAX,
            ..ReconcileConfig::default()
        };
        let reconciler = Reconciler::new(config);
        let target = resting_state(0.0);

        let start_error = 0.2f32;
        let mut state = resting_state(start_error);
        let mut max_error = 0.0f32;

        for _ in 0..1500 {
            match reconciler.correct_body(dt, &state, &target) {
                BodyCorrection::Nudge { linear_velocity, .. } => {
                    state.linear_velocity = linear_velocity;
                    state.position += state.linear_velocity * dt;
                }
                BodyCorrection::Snap(snapped) => state = snapped,
            }
            let error = (state.position - target.position).norm();
            prop_assert!(error.is_finite());
            max_error = max_error.max(error);
        }

        // the semi-implicit spring's amplitude is bounded by
        // start / sqrt(1 - stiffness * dt^2 / 4), which is 2x at the
        // assumed margin
        prop_assert!(max_error <= start_error * 2.0 + 0.01);
    }

    /// Pushing far more frames than the ring holds keeps the live window
    /// well-formed and still rejects out-of-order input afterward.
    #[test]
    fn ring_survives_unbounded_monotonic_history(
        capacity in 2usize..48,
        extra in 1usize..120,
    ) {
        let mut buffer = TimestampedFrameBuffer::new(capacity);
        let total = capacity + extra;
        let period = 0.02f64;

        for i in 0..total {
            buffer.push(i as f64 * period, tracked_targets(i as f32)).unwrap();
        }

        prop_assert!(buffer.len() <= capacity);
        let newest = buffer.latest().unwrap().time_s;
        let oldest = buffer.oldest().unwrap().time_s;
        prop_assert_eq!(newest, (total - 1) as f64 * period);
        prop_assert_eq!(oldest, (total - buffer.len()) as f64 * period);
        prop_assert!(oldest <= newest);

        // ancient history was evicted, not reordered
        let len_before = buffer.len();
        prop_assert!(buffer.push(oldest - period, tracked_targets(0.0)).is_err());
        prop_assert_eq!(buffer.len(), len_before);
    }

    /// Sampling at any stored timestamp reproduces that frame (the oldest
    /// by clamping, interior ones exactly via the bracketing pair).
    #[test]
    fn sampling_at_a_stored_timestamp_returns_that_frame(
        gaps in prop::collection::vec(0.001f64..0.2, 2..20),
        pick in any::<prop::sample::Index>(),
    ) {
        let mut stamps = Vec::with_capacity(gaps.len());
        let mut time_s = 0.0;
        for gap in &gaps {
            time_s += gap;
            stamps.push(time_s);
        }

        let mut buffer = TimestampedFrameBuffer::new(stamps.len() + 1);
        for (i, stamp) in stamps.iter().enumerate() {
            buffer.push(*stamp, tracked_targets(i as f32)).unwrap();
        }

        let i = pick.index(stamps.len());
        match buffer.sample_at(stamps[i]) {
            Sample::ClampedToOldest(payload) => {
                prop_assert_eq!(i, 0);
                prop_assert!((payload.root_position.x - 0.0).abs() < 1.0e-3);
            }
            Sample::Interpolated(payload) => {
                prop_assert!(i > 0);
                prop_assert!((payload.root_position.x - i as f32).abs() < 1.0e-3);
            }
            other => prop_assert!(false, "unexpected sample outcome {other:?}"),
        }
    }
}
