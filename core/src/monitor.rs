//! # Ping Monitor
//!
//! Owns the probe loop for exactly one host at a time.
//!
//! The loop runs in its own tokio task. It probes on a fixed interval, keeps
//! a rolling [`PingHistory`] and publishes a [`Snapshot`] after every change.
//! Everything else talks to it through a [`MonitorHandle`], which sends
//! [`Command`]s and waits for their [`CommandReply`].

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pingr_common::command::{Command, CommandError, CommandReply, MonitorStatus};
use pingr_common::config::Config;
use pingr_common::history::PingHistory;
use pingr_common::network::target::HostSpec;
use pingr_common::ping::{self, PingOutcome, ProbeMethod};
use serde_json::Value;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::invoke::Invoker;
use crate::prober::{ProbeTarget, Prober};
use crate::resolver;

const COMMAND_QUEUE_SIZE: usize = 32;
/// `tokio::time::interval` rejects a zero period.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// State of the monitor as published after every probe or host change.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub host: String,
    pub addr: IpAddr,
    pub method: ProbeMethod,
    pub slots: Vec<Option<PingOutcome>>,
    pub sent: u64,
    pub received: u64,
}

impl Snapshot {
    /// One rendered line per history slot, oldest first.
    pub fn lines(&self) -> Vec<String> {
        self.slots.iter().map(ping::render_slot).collect()
    }

    pub fn loss_percent(&self) -> f64 {
        if self.sent == 0 {
            return 0.0;
        }
        (self.sent - self.received) as f64 * 100.0 / self.sent as f64
    }
}

enum Request {
    Command {
        command: Command,
        reply: oneshot::Sender<Result<CommandReply, CommandError>>,
    },
    Shutdown,
}

pub struct Monitor;

impl Monitor {
    /// Resolves `initial` and starts probing it.
    ///
    /// Fails when the first host cannot be resolved; nothing is spawned then.
    pub async fn spawn(
        initial: HostSpec,
        cfg: &Config,
        prober: Arc<dyn Prober>,
    ) -> Result<MonitorHandle, CommandError> {
        let addr: SocketAddr = resolver::resolve(&initial, cfg.default_port).await?;
        let target = ProbeTarget::new(&initial, addr);

        let (tx, rx) = mpsc::channel(COMMAND_QUEUE_SIZE);

        let mut worker = Worker {
            spec: initial,
            target,
            seq: 0,
            sent: 0,
            received: 0,
            history: PingHistory::new(cfg.window),
            prober,
            default_port: cfg.default_port,
            snapshot_tx: None,
        };
        let (snapshot_tx, snapshot_rx) = watch::channel(worker.snapshot());
        worker.snapshot_tx = Some(snapshot_tx);

        info!("Pinging {} ({})", worker.spec, addr.ip());
        tokio::spawn(worker.run(rx, cfg.interval.max(MIN_INTERVAL)));

        Ok(MonitorHandle {
            tx,
            snapshots: snapshot_rx,
        })
    }
}

/// Cheap, cloneable entry point into a running monitor.
///
/// The monitor stops once every handle is dropped or [`shutdown`](Self::shutdown)
/// is called.
#[derive(Clone)]
pub struct MonitorHandle {
    tx: mpsc::Sender<Request>,
    snapshots: watch::Receiver<Snapshot>,
}

impl MonitorHandle {
    pub async fn execute(&self, command: Command) -> Result<CommandReply, CommandError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(Request::Command {
                command,
                reply: reply_tx,
            })
            .await
            .map_err(|_| CommandError::MonitorStopped)?;

        reply_rx.await.map_err(|_| CommandError::MonitorStopped)?
    }

    /// Points the monitor at `new_host`. The old host keeps running on failure.
    pub async fn change_host(&self, new_host: impl Into<String>) -> Result<CommandReply, CommandError> {
        let args = pingr_common::command::ChangeHostArgs {
            new_host: new_host.into(),
        };
        self.execute(Command::ChangeHost(args)).await
    }

    pub async fn status(&self) -> Result<MonitorStatus, CommandError> {
        match self.execute(Command::Status).await? {
            CommandReply::Status(status) => Ok(status),
            other => Err(CommandError::Internal(format!(
                "unexpected reply to status: {other:?}"
            ))),
        }
    }

    pub fn snapshots(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }

    pub fn latest(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    pub async fn shutdown(&self) {
        let _ = self.tx.send(Request::Shutdown).await;
    }
}

#[async_trait]
impl Invoker for MonitorHandle {
    async fn invoke(&self, command: &str, args: Value) -> Result<Value, CommandError> {
        let command = Command::from_invoke(command, args)?;
        debug!("Invoking '{}'", command.name());
        self.execute(command).await?.to_value()
    }
}

struct Worker {
    spec: HostSpec,
    target: ProbeTarget,
    seq: u64,
    sent: u64,
    received: u64,
    history: PingHistory<PingOutcome>,
    prober: Arc<dyn Prober>,
    default_port: u16,
    snapshot_tx: Option<watch::Sender<Snapshot>>,
}

impl Worker {
    async fn run(mut self, mut rx: mpsc::Receiver<Request>, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => self.tick().await,
                req = rx.recv() => match req {
                    Some(Request::Command { command, reply }) => {
                        let result = self.handle(command).await;
                        let host_changed = matches!(result, Ok(CommandReply::HostChanged { .. }));
                        let _ = reply.send(result);
                        if host_changed {
                            ticker.reset_immediately();
                        }
                    }
                    Some(Request::Shutdown) | None => break,
                },
            }
        }

        debug!("Monitor for {} stopped", self.spec);
    }

    async fn tick(&mut self) {
        self.seq += 1;
        self.sent += 1;

        let outcome: PingOutcome = self.prober.probe(&self.target, self.seq).await;
        match &outcome {
            Ok(line) => {
                self.received += 1;
                debug!("{line}");
            }
            Err(e) => debug!("{e}"),
        }

        self.history.push(Some(outcome));
        self.publish();
    }

    async fn handle(&mut self, command: Command) -> Result<CommandReply, CommandError> {
        match command {
            Command::ChangeHost(args) => self.change_host(&args.new_host).await,
            Command::Status => Ok(CommandReply::Status(MonitorStatus {
                host: self.spec.to_string(),
                addr: self.target.addr.ip(),
                method: self.prober.method(),
                sent: self.sent,
                received: self.received,
            })),
        }
    }

    async fn change_host(&mut self, new_host: &str) -> Result<CommandReply, CommandError> {
        let spec: HostSpec = new_host.parse::<HostSpec>().inspect_err(|e| {
            warn!("Rejected host '{new_host}': {e}");
        })?;

        let addr: SocketAddr = resolver::resolve(&spec, self.default_port)
            .await
            .inspect_err(|e| warn!("{e}; still pinging {}", self.spec))?;

        info!("Switching from {} to {} ({})", self.spec, spec, addr.ip());

        self.target = ProbeTarget::new(&spec, addr);
        self.spec = spec;
        self.seq = 0;
        self.sent = 0;
        self.received = 0;
        self.history.clear();
        self.publish();

        Ok(CommandReply::HostChanged {
            host: self.spec.to_string(),
            addr: addr.ip(),
        })
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            host: self.spec.to_string(),
            addr: self.target.addr.ip(),
            method: self.prober.method(),
            slots: self.history.snapshot(),
            sent: self.sent,
            received: self.received,
        }
    }

    fn publish(&self) {
        if let Some(tx) = &self.snapshot_tx {
            tx.send_replace(self.snapshot());
        }
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
