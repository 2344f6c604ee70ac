use gripsync_shared::SyncConfig;

/// Contains Config properties which will be used by the Server
#[derive(Clone)]
pub struct ServerConfig {
    /// Tuning shared with every connected client; both sides must agree.
    pub sync: SyncConfig,
    /// Upper bound of the random phase shift applied to each connecting
    /// participant's transmission schedules, so separate operators do not
    /// all burst at the same session-relative instant.
    pub phase_jitter_s: f64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            sync: SyncConfig::default(),
            phase_jitter_s: 0.01,
        }
    }
}
