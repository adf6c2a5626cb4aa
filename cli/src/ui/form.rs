//! The "new host" form: a single text input and a button.
//!
//! Clicking forwards whatever the input holds at that moment to the
//! `change_host` command. The call runs in its own task so the UI never
//! waits for it; its result comes back on the outcome channel instead of
//! being dropped.

use std::sync::Arc;

use pingr_common::command::{CHANGE_HOST, ChangeHostArgs, CommandError};
use pingr_core::invoke::Invoker;
use serde_json::Value;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

/// Completion report for one click.
#[derive(Debug)]
pub struct InvokeOutcome {
    /// Increases by one per click, starting at 1.
    pub click: u64,
    /// The input value the click carried.
    pub host: String,
    pub result: Result<Value, CommandError>,
}

pub struct HostForm<I: Invoker> {
    invoker: Arc<I>,
    input: String,
    clicks: u64,
    outcome_tx: UnboundedSender<InvokeOutcome>,
}

impl<I: Invoker> HostForm<I> {
    pub fn new(invoker: Arc<I>) -> (Self, UnboundedReceiver<InvokeOutcome>) {
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        let form = Self {
            invoker,
            input: String::new(),
            clicks: 0,
            outcome_tx,
        };
        (form, outcome_rx)
    }

    pub fn set_input(&mut self, value: impl Into<String>) {
        self.input = value.into();
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// Fires one `change_host` call with the current input and returns its
    /// click id right away. Must be called from within a tokio runtime.
    ///
    /// Nothing is validated here and repeated clicks are not collapsed: every
    /// click is its own independent call.
    pub fn click(&mut self) -> u64 {
        self.clicks += 1;
        let click: u64 = self.clicks;
        let host: String = self.input.clone();
        let outcome_tx = self.outcome_tx.clone();

        let args = match serde_json::to_value(ChangeHostArgs {
            new_host: host.clone(),
        }) {
            Ok(args) => args,
            Err(e) => {
                let result = Err(CommandError::Internal(e.to_string()));
                let _ = outcome_tx.send(InvokeOutcome { click, host, result });
                return click;
            }
        };

        let invoker = self.invoker.clone();
        debug!("Click {click}: {CHANGE_HOST} '{host}'");
        tokio::spawn(async move {
            let result = invoker.invoke(CHANGE_HOST, args).await;
            // The receiver may be gone when the UI is shutting down.
            let _ = outcome_tx.send(InvokeOutcome { click, host, result });
        });

        click
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

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::BTreeSet;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct RecordingInvoker {
        calls: Mutex<Vec<(String, Value)>>,
        fail: bool,
    }

    impl RecordingInvoker {
        fn calls(&self) -> Vec<(String, Value)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Invoker for RecordingInvoker {
        async fn invoke(&self, command: &str, args: Value) -> Result<Value, CommandError> {
            self.calls.lock().unwrap().push((command.to_string(), args));
            if self.fail {
                return Err(CommandError::Resolve {
                    host: "x".to_string(),
                    reason: "boom".to_string(),
                });
            }
            Ok(json!({ "type": "hostChanged" }))
        }
    }

    async fn collect(rx: &mut UnboundedReceiver<InvokeOutcome>, n: usize) -> Vec<InvokeOutcome> {
        let mut outcomes = Vec::new();
        for _ in 0..n {
            let outcome = tokio::time::timeout(Duration::from_secs(5), rx.recv())
                .await
                .expect("outcome did not arrive")
                .expect("channel closed");
            outcomes.push(outcome);
        }
        outcomes
    }

    #[tokio::test]
    async fn nothing_is_sent_before_a_click() {
        let invoker = Arc::new(RecordingInvoker::default());
        let (mut form, mut rx) = HostForm::new(invoker.clone());

        form.set_input("example.com");
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert!(invoker.calls().is_empty());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn click_sends_the_input_as_new_host() {
        let invoker = Arc::new(RecordingInvoker::default());
        let (mut form, mut rx) = HostForm::new(invoker.clone());

        form.set_input("example.com:80");
        let click = form.click();
        let outcomes = collect(&mut rx, 1).await;

        assert_eq!(
            invoker.calls(),
            vec![(CHANGE_HOST.to_string(), json!({ "newHost": "example.com:80" }))]
        );
        assert_eq!(outcomes[0].click, click);
        assert_eq!(outcomes[0].host, "example.com:80");
        assert!(outcomes[0].result.is_ok());
    }

    #[tokio::test]
    async fn empty_input_is_forwarded_unchanged() {
        let invoker = Arc::new(RecordingInvoker::default());
        let (mut form, mut rx) = HostForm::new(invoker.clone());

        form.click();
        collect(&mut rx, 1).await;

        assert_eq!(invoker.calls()[0].1, json!({ "newHost": "" }));
    }

    #[tokio::test]
    async fn value_is_read_at_click_time() {
        let invoker = Arc::new(RecordingInvoker::default());
        let (mut form, mut rx) = HostForm::new(invoker.clone());

        form.set_input("first");
        form.click();
        form.set_input("second");
        let outcome = collect(&mut rx, 1).await.remove(0);

        assert_eq!(outcome.host, "first");
        assert_eq!(form.input(), "second");
    }

    #[tokio::test]
    async fn every_rapid_click_produces_its_own_call() {
        let invoker = Arc::new(RecordingInvoker::default());
        let (mut form, mut rx) = HostForm::new(invoker.clone());

        form.set_input("same.host");
        for _ in 0..5 {
            form.click();
        }
        let outcomes = collect(&mut rx, 5).await;

        assert_eq!(invoker.calls().len(), 5);
        let ids: BTreeSet<u64> = outcomes.iter().map(|o| o.click).collect();
        assert_eq!(ids, (1..=5).collect());
    }

    #[tokio::test]
    async fn failures_are_reported_not_raised() {
        let invoker = Arc::new(RecordingInvoker {
            fail: true,
            ..RecordingInvoker::default()
        });
        let (mut form, mut rx) = HostForm::new(invoker);

        form.set_input("unreachable");
        form.click();
        let outcome = collect(&mut rx, 1).await.remove(0);

        assert!(matches!(outcome.result, Err(CommandError::Resolve { .. })));
    }
}
