//! Command line interface for the `mavsniff` binary.
//!
//! Kept free of crate dependencies so `build.rs` can render the man page
//! from the same definition.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use clap::{Parser, ValueEnum};

/// How decoded records are written to stdout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One line per record.
    #[default]
    Text,
    /// Pretty-printed JSON objects.
    Json,
}

/// Command line arguments for the `mavsniff` binary.
#[derive(Debug, Parser)]
#[command(
    name = "mavsniff",
    version,
    about = "Listen for MAVLink heartbeat and position telemetry over UDP"
)]
pub struct Cli {
    /// Local listen port (the vehicle's remote port).
    #[arg(long, default_value_t = 14550)]
    pub local: u16,
    /// Local address to bind.
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub bind: IpAddr,
    /// Vehicle UDP port to announce to.
    #[arg(long = "veh-port", default_value_t = 14540)]
    pub veh_port: u16,
    /// Vehicle host to announce to.
    #[arg(long = "veh-host", default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub veh_host: IpAddr,
    /// Upper bound on one blocking receive, in milliseconds.
    #[arg(long = "read-deadline-ms", default_value_t = 3000)]
    pub read_deadline_ms: u64,
    /// Output format for decoded records.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    /// Serve Prometheus metrics on this address.
    #[arg(long = "metrics-addr")]
    pub metrics_addr: Option<SocketAddr>,
}

impl Cli {
    /// Address the receive socket binds to.
    #[must_use]
    pub fn listen_addr(&self) -> SocketAddr { SocketAddr::new(self.bind, self.local) }

    /// Address the announce datagram is sent to.
    #[must_use]
    pub fn remote_addr(&self) -> SocketAddr { SocketAddr::new(self.veh_host, self.veh_port) }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{Cli, OutputFormat};

    #[test]
    fn defaults_match_px4_sitl_ports() {
        let cli = Cli::parse_from(["mavsniff"]);
        assert_eq!(cli.listen_addr().to_string(), "127.0.0.1:14550");
        assert_eq!(cli.remote_addr().to_string(), "127.0.0.1:14540");
        assert_eq!(cli.read_deadline_ms, 3000);
        assert_eq!(cli.format, OutputFormat::Text);
        assert!(cli.metrics_addr.is_none());
    }

    #[test]
    fn parses_vehicle_options() {
        let cli = Cli::parse_from([
            "mavsniff",
            "--local",
            "14551",
            "--veh-host",
            "10.0.0.2",
            "--veh-port",
            "18570",
            "--format",
            "json",
        ]);
        assert_eq!(cli.listen_addr().port(), 14551);
        assert_eq!(cli.remote_addr().to_string(), "10.0.0.2:18570");
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn rejects_unparseable_host() {
        assert!(Cli::try_parse_from(["mavsniff", "--veh-host", "vehicle"]).is_err());
    }
}
