//! MediCare HMS core library
//!
//! Page services for triage, pharmacy, complaints and laundry, backed by a
//! hosted entity store and an email integration.

pub mod cache;
pub mod console;
pub mod context;
pub mod core;
pub mod error;
pub mod feedback;
pub mod hosted;
pub mod models;
pub mod notify;
pub mod pages;
pub mod store;
pub mod telemetry;

pub use context::HmsContext;
pub use error::{HmsError, NotifyError, Result, StoreError};

/// Application configuration
pub mod config {
    use std::path::PathBuf;
    use std::time::Duration;

    use serde::Deserialize;

    #[derive(Debug, Clone, Default, Deserialize)]
    #[serde(default)]
    pub struct Settings {
        pub backend: BackendSettings,
        pub cache: CacheSettings,
        pub pharmacy: PharmacySettings,
        pub notifications: NotificationSettings,
        pub logging: LoggingSettings,
    }

    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum BackendKind {
        Hosted,
        #[default]
        Memory,
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(default)]
    pub struct BackendSettings {
        pub kind: BackendKind,
        pub base_url: String,
        pub app_id: String,
        pub api_key: String,
        pub timeout_secs: u64,
        /// JSON fixture used to seed the in-memory store.
        pub fixture: Option<PathBuf>,
    }

    impl Default for BackendSettings {
        fn default() -> Self {
            Self {
                kind: BackendKind::Memory,
                base_url: "https://app.base44.com/api".into(),
                app_id: String::new(),
                api_key: String::new(),
                timeout_secs: 30,
                fixture: None,
            }
        }
    }

    #[derive(Debug, Clone, Default, Deserialize)]
    #[serde(default)]
    pub struct CacheSettings {
        /// Unset keeps lists until a mutation invalidates them.
        pub stale_after_secs: Option<u64>,
    }

    impl CacheSettings {
        pub fn stale_after(&self) -> Option<Duration> {
            self.stale_after_secs.map(Duration::from_secs)
        }
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(default)]
    pub struct PharmacySettings {
        /// Recorded as `dispensed_by` on every dispense.
        pub pharmacist_name: String,
    }

    impl Default for PharmacySettings {
        fn default() -> Self {
            Self {
                pharmacist_name: "Pharmacist".into(),
            }
        }
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(default)]
    pub struct NotificationSettings {
        pub enabled: bool,
    }

    impl Default for NotificationSettings {
        fn default() -> Self {
            Self { enabled: true }
        }
    }

    #[derive(Debug, Clone, Deserialize)]
    #[serde(default)]
    pub struct LoggingSettings {
        pub level: String,
        pub json: bool,
    }

    impl Default for LoggingSettings {
        fn default() -> Self {
            Self {
                level: "info".into(),
                json: false,
            }
        }
    }

    /// Load configuration from file
    pub fn load_config() -> Result<Settings, config::ConfigError> {
        let env = std::env::var("HMS_ENV").unwrap_or_else(|_| "development".into());

        config::Config::builder()
            // Start with default settings
            .add_source(config::File::with_name("config/default").required(false))
            // Override with environment-specific settings
            .add_source(config::File::with_name(&format!("config/{}", env)).required(false))
            // Override with environment variables, e.g. HMS_BACKEND__API_KEY
            .add_source(
                config::Environment::with_prefix("HMS")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
