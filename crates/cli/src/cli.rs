use clap::Parser;
use radar_runtime::config::{DEFAULT_PATH, DEFAULT_PORT};
use std::path::PathBuf;

/// Terminal client for the web radar telemetry stream.
#[derive(Debug, Parser)]
#[command(name = "webradar", version, about)]
pub struct Cli {
    /// Host name or public IP of the game-instrumentation process
    #[arg(long, default_value = "localhost")]
    pub host: String,

    /// Telemetry port
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Endpoint path on the telemetry socket
    #[arg(long, default_value = DEFAULT_PATH)]
    pub path: String,

    /// Connection timeout in milliseconds
    #[arg(long, default_value_t = 5000)]
    pub timeout_ms: u64,

    /// Base URL map assets (data.json, background.png, radar.png) are
    /// served from
    #[arg(long, default_value = "http://localhost:8080/data")]
    pub assets_url: String,

    /// Settings file (defaults to the user config directory)
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_session_config() {
        let cli = Cli::parse_from(["webradar"]);
        assert_eq!(cli.host, "localhost");
        assert_eq!(cli.port, 22006);
        assert_eq!(cli.path, "cs2_webradar");
        assert_eq!(cli.timeout_ms, 5000);
        assert!(!cli.verbose);
    }

    #[test]
    fn overrides_are_parsed() {
        let cli = Cli::parse_from([
            "webradar",
            "--host",
            "203.0.113.7",
            "--port",
            "22007",
            "--timeout-ms",
            "250",
            "-v",
        ]);
        assert_eq!(cli.host, "203.0.113.7");
        assert_eq!(cli.port, 22007);
        assert_eq!(cli.timeout_ms, 250);
        assert!(cli.verbose);
    }
}
