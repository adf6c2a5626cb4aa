use async_trait::async_trait;
use pingr_common::command::CommandError;
use serde_json::Value;

/// Anything that executes named commands with JSON parameters.
///
/// The UI only depends on this seam, so it can be driven against the real
/// monitor or against a recording double in tests.
#[async_trait]
pub trait Invoker: Send + Sync + 'static {
    async fn invoke(&self, command: &str, args: Value) -> Result<Value, CommandError>;
}
