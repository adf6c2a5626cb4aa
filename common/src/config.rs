use std::time::Duration;

pub const DEFAULT_HOST: &str = "google.com:443";
pub const DEFAULT_WINDOW: usize = 15;
pub const DEFAULT_PORT: u16 = 443;

pub struct Config {
    /// Time between two probes of the current host.
    pub interval: Duration,
    /// How long a single probe may wait for an answer.
    pub timeout: Duration,
    /// Number of results kept in the rolling window.
    pub window: usize,
    /// Skips raw ICMP even when running privileged.
    pub force_tcp: bool,
    /// Port used by TCP probes when the host has none.
    pub default_port: u16,
    pub quiet: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            timeout: Duration::from_secs(1),
            window: DEFAULT_WINDOW,
            force_tcp: false,
            default_port: DEFAULT_PORT,
            quiet: 0,
        }
    }
}
