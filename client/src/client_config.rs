use gripsync_shared::SyncConfig;

/// Contains Config properties which will be used by the Client
#[derive(Clone, Default)]
pub struct ClientConfig {
    /// Tuning shared with the server; both sides must agree.
    pub sync: SyncConfig,
}
