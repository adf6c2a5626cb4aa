use std::sync::Arc;

use pingr_common::{config::Config, network::target::HostSpec};
use pingr_core::{monitor::Monitor, prober};
use tracing::info;

use crate::terminal::{
    input::{InputEvent, InputHandle},
    spinner,
    window::{self, StatusLine},
};
use crate::ui::form::HostForm;

pub async fn watch(host: HostSpec, cfg: &Config) -> anyhow::Result<()> {
    let spinner = spinner::start(format!("Resolving {host}..."), cfg.quiet);
    let monitor = Monitor::spawn(host, cfg, prober::default_prober(cfg)).await;
    spinner.finish_and_clear();
    let handle = monitor?;

    let (mut form, mut outcomes) = HostForm::new(Arc::new(handle.clone()));
    let mut snapshots = handle.snapshots();
    let mut status = StatusLine::Idle;

    let (keyboard, mut keys) = InputHandle::start();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    window::open()?;
    window::render(&snapshots.borrow_and_update(), &status, form.input())?;

    loop {
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                window::render(&snapshot, &status, form.input())?;
            }
            Some(key) = keys.recv() => match key {
                InputEvent::Edit(line) => {
                    form.set_input(line);
                    window::render(&handle.latest(), &status, form.input())?;
                }
                InputEvent::Submit(line) => {
                    form.set_input(line);
                    let click = form.click();
                    status = StatusLine::Pending { click, host: form.input().to_string() };
                    form.set_input(String::new());
                    window::render(&handle.latest(), &status, form.input())?;
                }
                InputEvent::Quit => break,
            },
            Some(outcome) = outcomes.recv() => {
                if !status.supersedes(&outcome) {
                    status = StatusLine::from_outcome(&outcome);
                    window::render(&handle.latest(), &status, form.input())?;
                }
            }
            _ = &mut ctrl_c => break,
        }
    }

    // Leaves raw mode before anything else is printed.
    drop(keyboard);
    handle.shutdown().await;
    println!();
    info!("Stopped watching");
    Ok(())
}
