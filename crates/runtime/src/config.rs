//! Session configuration.
//!
//! The address, port, path, and timeout were module constants in earlier
//! designs; they are an explicit value here so sessions can be
//! constructed against mock addresses and short timeouts in tests.

use crate::error::{Error, Result};
use std::net::Ipv4Addr;
use std::time::Duration;

/// Default telemetry port of the instrumentation process.
pub const DEFAULT_PORT: u16 = 22006;

/// Fixed endpoint path the instrumentation serves the stream on.
pub const DEFAULT_PATH: &str = "cs2_webradar";

/// How long a connection attempt may wait for the open signal.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Where and how to reach the telemetry stream.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Host name or IP address of the instrumentation process.
    pub host: String,
    pub port: u16,
    /// Endpoint path, without leading slash.
    pub path: String,
    pub connect_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: DEFAULT_PORT,
            path: DEFAULT_PATH.to_string(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

impl SessionConfig {
    /// The WebSocket URL this config dials.
    pub fn url(&self) -> String {
        format!("ws://{}:{}/{}", self.host, self.port, self.path)
    }

    /// Rejects private-range IPv4 hosts. A radar served to other people
    /// needs a publicly reachable address; a private one means the
    /// config was filled in with the wrong IP. Loopback and host names
    /// pass.
    pub fn validate(&self) -> Result<()> {
        if let Ok(ip) = self.host.parse::<Ipv4Addr>() {
            if ip.is_private() {
                return Err(Error::PrivateAddress {
                    host: self.host.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_is_built_from_parts() {
        let config = SessionConfig {
            host: "203.0.113.7".to_string(),
            ..Default::default()
        };
        assert_eq!(config.url(), "ws://203.0.113.7:22006/cs2_webradar");
    }

    #[test]
    fn private_ranges_are_rejected() {
        for host in ["192.168.0.12", "10.1.2.3", "172.16.5.5"] {
            let config = SessionConfig {
                host: host.to_string(),
                ..Default::default()
            };
            assert!(matches!(
                config.validate(),
                Err(Error::PrivateAddress { .. })
            ));
        }
    }

    #[test]
    fn loopback_and_hostnames_pass() {
        for host in ["localhost", "127.0.0.1", "203.0.113.7", "radar.example.com"] {
            let config = SessionConfig {
                host: host.to_string(),
                ..Default::default()
            };
            assert!(config.validate().is_ok(), "host {host}");
        }
    }
}
