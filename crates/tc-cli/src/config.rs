//! Configuration loading and management.
//!
//! The identity fields stand in for the identity provider: whatever
//! authenticates a request is expected to yield a stable user identifier, a
//! role tag, and a staff flag. Here they come from the config file or the
//! `TC_USER` / `TC_ROLE` / `TC_STAFF` environment.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use tc_core::{Identity, Role, UserId, ValidationError};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,

    /// Authenticated user. Operations fail until this is set.
    pub user: String,

    /// Role tag: `worker`, `company`, or `admin`.
    pub role: Role,

    /// Staff flag; grants unrestricted scope regardless of role.
    pub staff: bool,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("tc.db"),
            user: String::new(),
            role: Role::Worker,
            staff: false,
        }
    }
}

impl Config {
    /// Loads configuration from default locations.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from(None)
    }

    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (TC_*)
        figment = figment.merge(Env::prefixed("TC_"));

        figment.extract()
    }

    /// Resolves the authenticated identity for this invocation.
    pub fn identity(&self) -> Result<Identity, ValidationError> {
        Ok(Identity {
            user: UserId::new(self.user.clone())?,
            role: self.role,
            staff: self.staff,
        })
    }
}

/// Returns the platform-specific config directory for tc.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("tc"))
}

/// Returns the platform-specific data directory for tc.
///
/// On Linux: `~/.local/share/tc`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("tc"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirs_data_path_ends_with_tc() {
        let path = dirs_data_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "tc");
    }

    #[test]
    fn test_default_config_uses_data_dir_for_db() {
        let config = Config::default();
        let data_dir = dirs_data_path().unwrap();
        assert_eq!(config.database_path, data_dir.join("tc.db"));
    }

    #[test]
    fn test_default_identity_is_unset_worker() {
        let config = Config::default();
        assert!(config.identity().is_err());

        let config = Config {
            user: "alice".to_string(),
            ..config
        };
        let identity = config.identity().unwrap();
        assert_eq!(identity.user.as_str(), "alice");
        assert_eq!(identity.role, Role::Worker);
        assert!(!identity.staff);
    }
}
