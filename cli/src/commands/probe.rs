use std::time::{Duration, Instant};

use colored::*;
use pingr_common::{config::Config, network::target::HostSpec, ping::PingOutcome};
use pingr_core::{
    prober::{self, ProbeTarget},
    resolver,
};

use crate::terminal::{colors, print, spinner};

pub async fn probe(host: HostSpec, count: u64, cfg: &Config) -> anyhow::Result<()> {
    let spinner = spinner::start(format!("Resolving {host}..."), cfg.quiet);
    let addr = resolver::resolve(&host, cfg.default_port).await;
    spinner.finish_and_clear();
    let addr = addr?;

    let prober = prober::default_prober(cfg);
    let target = ProbeTarget::new(&host, addr);

    print::header(&format!("{} via {}", host, prober.method()), cfg.quiet);

    let start: Instant = Instant::now();
    let mut outcomes: Vec<PingOutcome> = Vec::new();
    for seq in 1..=count {
        let outcome = prober.probe(&target, seq).await;
        match &outcome {
            Ok(line) => print::print(&line.to_string()),
            Err(e) => print::print(&e.to_string().color(colors::FAILURE).to_string()),
        }
        outcomes.push(outcome);

        if seq < count {
            tokio::time::sleep(cfg.interval).await;
        }
    }

    print_summary(&host, &outcomes, start.elapsed(), cfg);
    Ok(())
}

struct Summary {
    sent: usize,
    received: usize,
    min: Option<Duration>,
    avg: Option<Duration>,
    max: Option<Duration>,
}

fn summarize(outcomes: &[PingOutcome]) -> Summary {
    let rtts: Vec<Duration> = outcomes
        .iter()
        .filter_map(|o| o.as_ref().ok().map(|line| line.rtt))
        .collect();

    let avg = match rtts.len() {
        0 => None,
        n => Some(rtts.iter().sum::<Duration>() / n as u32),
    };

    Summary {
        sent: outcomes.len(),
        received: rtts.len(),
        min: rtts.iter().min().copied(),
        avg,
        max: rtts.iter().max().copied(),
    }
}

fn print_summary(host: &HostSpec, outcomes: &[PingOutcome], total: Duration, cfg: &Config) {
    let summary = summarize(outcomes);
    let loss: f64 = match summary.sent {
        0 => 0.0,
        sent => (sent - summary.received) as f64 * 100.0 / sent as f64,
    };

    if cfg.quiet == 0 {
        print::fat_separator();
    }

    let stats: ColoredString = format!(
        "{} sent, {} received, {:.1}% loss, {:.2}s",
        summary.sent,
        summary.received,
        loss,
        total.as_secs_f64()
    )
    .bold();
    print::centerln(&format!("{} {}", host.to_string().color(colors::PRIMARY), stats));

    if let (Some(min), Some(avg), Some(max)) = (summary.min, summary.avg, summary.max) {
        print::aligned_line("rtt min", ms(min), 7);
        print::aligned_line("rtt avg", ms(avg), 7);
        print::aligned_line("rtt max", ms(max), 7);
    }
}

fn ms(d: Duration) -> ColoredString {
    format!("{:.3}ms", d.as_secs_f64() * 1000.0).color(colors::ACCENT)
}
