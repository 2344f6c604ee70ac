//! # Gripsync Client
//! One connected operator. Drives its two tracked hands, sends targets or
//! state upward depending on who is authoritative, and reconciles every
//! remote-authoritative body toward the frames the server relays.

mod client;
mod client_config;
mod hand;

pub use client::Client;
pub use client_config::ClientConfig;
