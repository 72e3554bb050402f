use serde::Deserialize;

/// Settings loaded from `config/*.yaml` and `APP_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
    pub database_url: String,
    pub templates_dir: String,
    /// Cookie signing key material, at least 64 bytes.
    pub secret: String,
    /// Minutes an open product draft may sit untouched before it is discarded.
    #[serde(default = "default_draft_idle_minutes")]
    pub draft_idle_minutes: u64,
    pub storage: StorageConfig,
}

fn default_draft_idle_minutes() -> u64 {
    120
}

/// Where uploaded objects live and how they are addressed publicly.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one sub-directory per bucket.
    pub root: String,
    /// Absolute URL the storage root is served under, e.g. `http://localhost:8080/storage`.
    pub public_url: String,
    pub bucket: String,
}
