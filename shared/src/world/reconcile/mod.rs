pub mod follow_clock;
pub mod reconciler;
