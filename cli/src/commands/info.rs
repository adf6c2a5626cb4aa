use colored::*;
use pingr_common::config::{self, Config};
use pingr_common::ping::ProbeMethod;
use pingr_core::prober;

use crate::terminal::{colors, print};

const KEY_WIDTH: usize = 12;

pub fn info(cfg: &Config) -> anyhow::Result<()> {
    let privileged: bool = is_root::is_root();
    let method = prober::select_prober(cfg, privileged).method();

    print::header("about this machine", cfg.quiet);
    print::aligned_line("Version", env!("CARGO_PKG_VERSION").color(colors::TEXT_DEFAULT), KEY_WIDTH);
    print::aligned_line(
        "Privileged",
        if privileged { "yes".green() } else { "no".yellow() },
        KEY_WIDTH,
    );
    print::aligned_line("Probe method", method.to_string().color(colors::ACCENT), KEY_WIDTH);
    print::aligned_line("Default host", config::DEFAULT_HOST.color(colors::PRIMARY), KEY_WIDTH);
    print::aligned_line(
        "Interval",
        format!("{}ms", cfg.interval.as_millis()).color(colors::TEXT_DEFAULT),
        KEY_WIDTH,
    );

    if method == ProbeMethod::Tcp && !cfg.force_tcp {
        print::print_status("add your group to net.ipv4.ping_group_range or run as root for ICMP");
    }
    Ok(())
}
