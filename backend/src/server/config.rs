//! Runtime configuration from flags and environment.

use std::net::SocketAddr;
use std::path::PathBuf;

use actix_web::cookie::Key;
use clap::Parser;
use tracing::warn;

use crate::domain::SiblingPolicy;

/// Command-line and environment configuration for the backend.
#[derive(Debug, Parser)]
#[command(name = "kitshare-backend", about = "Peer-to-peer rental marketplace backend")]
pub struct AppConfig {
    /// Socket address to bind.
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8080")]
    pub bind_addr: SocketAddr,

    /// File holding the session key material.
    #[arg(
        long,
        env = "SESSION_KEY_FILE",
        default_value = "/var/run/secrets/session_key"
    )]
    pub session_key_file: PathBuf,

    /// Set the `Secure` flag on the session cookie.
    #[arg(long, env = "SESSION_COOKIE_SECURE", default_value_t = true, action = clap::ArgAction::Set)]
    pub cookie_secure: bool,

    /// Permit an ephemeral session key when the key file is unreadable.
    /// Release builds refuse to start without this; every restart then
    /// invalidates all existing sessions.
    #[arg(long, env = "SESSION_ALLOW_EPHEMERAL", default_value_t = false)]
    pub allow_ephemeral_key: bool,

    /// What happens to the competing submitted requests against a listing
    /// when one of them is approved: "retain" or "auto-reject".
    #[arg(long, env = "SIBLING_POLICY", default_value = "retain")]
    pub sibling_policy: SiblingPolicy,
}

impl AppConfig {
    /// Load the cookie signing key, falling back to an ephemeral key in
    /// debug builds or when explicitly allowed.
    pub fn load_session_key(&self) -> std::io::Result<Key> {
        match std::fs::read(&self.session_key_file) {
            Ok(bytes) => Ok(Key::derive_from(&bytes)),
            Err(error) => {
                if cfg!(debug_assertions) || self.allow_ephemeral_key {
                    warn!(
                        path = %self.session_key_file.display(),
                        error = %error,
                        "using temporary session key (dev only)"
                    );
                    Ok(Key::generate())
                } else {
                    Err(std::io::Error::other(format!(
                        "failed to read session key at {}: {error}",
                        self.session_key_file.display()
                    )))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use rstest::rstest;

    #[test]
    fn cli_definition_is_consistent() {
        AppConfig::command().debug_assert();
    }

    #[test]
    fn defaults_bind_everywhere_with_the_retain_policy() {
        let config = AppConfig::parse_from(["kitshare-backend"]);
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(config.sibling_policy, SiblingPolicy::Retain);
        assert!(config.cookie_secure);
        assert!(!config.allow_ephemeral_key);
    }

    #[rstest]
    #[case("retain", SiblingPolicy::Retain)]
    #[case("auto-reject", SiblingPolicy::AutoReject)]
    fn sibling_policy_parses(#[case] flag: &str, #[case] expected: SiblingPolicy) {
        let config = AppConfig::parse_from(["kitshare-backend", "--sibling-policy", flag]);
        assert_eq!(config.sibling_policy, expected);
    }

    #[test]
    fn unknown_sibling_policy_is_rejected() {
        assert!(
            AppConfig::try_parse_from(["kitshare-backend", "--sibling-policy", "evict"]).is_err()
        );
    }
}
