pub mod hand_channel;

pub use hand_channel::HandChannel;
