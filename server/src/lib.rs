//! # Gripsync Server
//! The session host. Owns the authority arbiter and the session-wide zone
//! overlap registry, drives server-authoritative hands from relayed
//! targets, reconciles client-authoritative ones, and broadcasts
//! authoritative state to every connected operator.

mod server;
mod server_config;
mod user;

pub use server::Server;
pub use server_config::ServerConfig;
