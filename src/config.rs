//! Repository configuration
//!
//! Configuration lives in `.lit/config` as TOML. The file is optional; a
//! missing file yields the defaults.
//!
//! ```toml
//! [user]
//! name = "Ada Lovelace"
//! email = "ada@example.com"
//! ```
//!
//! Environment variables take precedence over the file:
//!
//! - `LIT_AUTHOR_NAME`, `LIT_AUTHOR_EMAIL`: commit identity
//! - `LIT_AUTHOR_DATE`: fixed commit timestamp (RFC 2822 or `%Y-%m-%d %H:%M:%S %z`)

use crate::artifacts::objects::commit::Author;
use crate::errors::{LitError, Result, StorageContext};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const AUTHOR_NAME_ENV: &str = "LIT_AUTHOR_NAME";
pub const AUTHOR_EMAIL_ENV: &str = "LIT_AUTHOR_EMAIL";
pub const AUTHOR_DATE_ENV: &str = "LIT_AUTHOR_DATE";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub user: UserConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl Config {
    /// Load the config file, or the defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("no config at {}, using defaults", path.display());
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(path).at_path(path)?;
        let config = toml::from_str(&content).map_err(|e| LitError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        tracing::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Resolve the commit identity from the process environment and this config.
    pub fn author(&self) -> Result<Author> {
        self.author_with(|key| std::env::var(key).ok())
    }

    /// Resolve the commit identity, looking variables up through `env`.
    pub fn author_with(&self, env: impl Fn(&str) -> Option<String>) -> Result<Author> {
        let non_empty = |value: Option<String>| value.filter(|v| !v.trim().is_empty());

        let name = non_empty(env(AUTHOR_NAME_ENV))
            .or_else(|| non_empty(self.user.name.clone()))
            .ok_or(LitError::MissingIdentity)?;
        check_identity_field("name", &name)?;
        let email = non_empty(env(AUTHOR_EMAIL_ENV))
            .or_else(|| non_empty(self.user.email.clone()))
            .ok_or(LitError::MissingIdentity)?;
        check_identity_field("email", &email)?;

        let timestamp = env(AUTHOR_DATE_ENV).and_then(|date_str| {
            let parsed = chrono::DateTime::parse_from_rfc2822(&date_str)
                .or_else(|_| chrono::DateTime::parse_from_str(&date_str, "%Y-%m-%d %H:%M:%S %z"))
                .ok();
            if parsed.is_none() {
                tracing::warn!("ignoring unparsable {AUTHOR_DATE_ENV}={date_str:?}");
            }
            parsed
        });

        match timestamp {
            Some(ts) => Ok(Author::new_with_timestamp(name, email, ts)),
            None => Ok(Author::new(name, email)),
        }
    }
}

/// Name and email are written verbatim into `Name <email>` header lines.
fn check_identity_field(field: &'static str, value: &str) -> Result<()> {
    if value.contains(['\n', '\r', '<', '>']) {
        return Err(LitError::InvalidIdentity {
            field,
            value: value.to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::TempDir;
    use assert_fs::prelude::{FileWriteStr, PathChild};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::collections::HashMap;

    fn env_of(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();
        move |key| vars.get(key).cloned()
    }

    fn config_with_user(name: &str, email: &str) -> Config {
        Config {
            user: UserConfig {
                name: Some(name.to_string()),
                email: Some(email.to_string()),
            },
        }
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();

        let config = Config::load(&dir.path().join("config")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn reads_user_section() {
        let dir = TempDir::new().unwrap();
        let file = dir.child("config");
        file.write_str("[user]\nname = \"Ada\"\nemail = \"ada@example.com\"\n")
            .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config, config_with_user("Ada", "ada@example.com"));
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let dir = TempDir::new().unwrap();
        let file = dir.child("config");
        file.write_str("[user\nname = ").unwrap();

        assert!(matches!(
            Config::load(file.path()),
            Err(LitError::Config { .. })
        ));
    }

    #[test]
    fn environment_overrides_file() {
        let config = config_with_user("File", "file@example.com");
        let env = env_of(&[
            (AUTHOR_NAME_ENV, "Env"),
            (AUTHOR_DATE_ENV, "2024-01-02 03:04:05 +0000"),
        ]);

        let author = config.author_with(env).unwrap();
        assert_eq!(author.display(), "Env <file@example.com> 1704164645 +0000");
    }

    #[test]
    fn missing_identity_is_an_error() {
        let config = Config::default();

        assert!(matches!(
            config.author_with(env_of(&[(AUTHOR_NAME_ENV, "Only Name")])),
            Err(LitError::MissingIdentity)
        ));
    }

    #[rstest]
    #[case::header_injection(AUTHOR_NAME_ENV, "Eve <e@x> 0 +0000\nparent 1111111111111111111111111111111111111111\nauthor Eve")]
    #[case::carriage_return(AUTHOR_NAME_ENV, "Eve\r")]
    #[case::bracket_in_email(AUTHOR_EMAIL_ENV, "eve>@example.com")]
    #[case::bracket_in_name(AUTHOR_NAME_ENV, "Eve <")]
    fn header_breaking_identity_is_rejected(#[case] key: &str, #[case] value: &str) {
        let config = config_with_user("File", "file@example.com");

        assert!(matches!(
            config.author_with(env_of(&[(key, value)])),
            Err(LitError::InvalidIdentity { .. })
        ));
    }

    #[test]
    fn header_breaking_identity_in_file_is_rejected() {
        let config = config_with_user("Eve\nparent x", "eve@example.com");

        assert!(matches!(
            config.author_with(env_of(&[])),
            Err(LitError::InvalidIdentity { field: "name", .. })
        ));
    }
}
