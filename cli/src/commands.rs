pub mod info;
pub mod probe;
pub mod watch;

use std::time::Duration;

use clap::{ArgAction, Parser, Subcommand};
use pingr_common::config::{self, Config};
use pingr_common::network::target::HostSpec;

#[derive(Parser)]
#[command(name = "pingr")]
#[command(about = "A continuous ping monitor.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// Milliseconds between two probes
    #[arg(long, global = true, default_value_t = 1000)]
    pub interval: u64,

    /// Milliseconds to wait for a single reply
    #[arg(long, global = true, default_value_t = 1000)]
    pub timeout: u64,

    /// Number of results kept in the live window
    #[arg(long, global = true, default_value_t = config::DEFAULT_WINDOW)]
    pub window: usize,

    /// Use TCP handshakes even when ICMP is available
    #[arg(long, global = true)]
    pub tcp: bool,

    /// Reduce output, repeat for less
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub quiet: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show which probe method this machine can use
    #[command(alias = "i")]
    Info,
    /// Watch a host live; type a new host and press enter to switch
    #[command(alias = "w")]
    Watch {
        #[arg(default_value = config::DEFAULT_HOST)]
        host: HostSpec,
    },
    /// Send a fixed number of probes and print a summary
    #[command(alias = "p")]
    Probe {
        host: HostSpec,
        #[arg(short, long, default_value_t = 4)]
        count: u64,
    },
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn config(&self) -> Config {
        Config {
            interval: Duration::from_millis(self.interval.max(1)),
            timeout: Duration::from_millis(self.timeout.max(1)),
            window: self.window,
            force_tcp: self.tcp,
            quiet: self.quiet,
            ..Config::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watch_defaults_to_the_built_in_host() {
        let cli = CommandLine::try_parse_from(["pingr", "watch"]).unwrap();
        let Commands::Watch { host } = cli.command else {
            panic!("expected watch");
        };
        assert_eq!(host, HostSpec::new("google.com", Some(443)));
    }

    #[test]
    fn global_flags_build_the_config() {
        let cli = CommandLine::try_parse_from([
            "pingr", "p", "10.0.0.1", "-c", "2", "--interval", "250", "--tcp", "-qq",
        ])
        .unwrap();
        let cfg = cli.config();

        assert_eq!(cfg.interval, Duration::from_millis(250));
        assert!(cfg.force_tcp);
        assert_eq!(cfg.quiet, 2);
        assert!(matches!(cli.command, Commands::Probe { count: 2, .. }));
    }

    #[test]
    fn invalid_host_is_a_usage_error() {
        assert!(CommandLine::try_parse_from(["pingr", "probe", "host:notaport"]).is_err());
    }
}
