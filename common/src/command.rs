//! # Command Boundary
//!
//! Named commands with JSON parameters, as they cross from the UI into the
//! monitor. The wire shape of a call is a command name plus an object of
//! camelCase parameters, e.g. `change_host` with `{"newHost": "example.com"}`.

use std::net::IpAddr;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;

use crate::network::target::TargetError;
use crate::ping::ProbeMethod;

pub const CHANGE_HOST: &str = "change_host";
pub const STATUS: &str = "status";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeHostArgs {
    pub new_host: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    ChangeHost(ChangeHostArgs),
    Status,
}

impl Command {
    /// Builds a command from its name and raw parameters.
    pub fn from_invoke(name: &str, args: Value) -> Result<Self, CommandError> {
        match name {
            CHANGE_HOST => serde_json::from_value(args)
                .map(Command::ChangeHost)
                .map_err(|e| CommandError::InvalidArgs {
                    command: CHANGE_HOST.to_string(),
                    reason: e.to_string(),
                }),
            STATUS => Ok(Command::Status),
            other => Err(CommandError::UnknownCommand(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::ChangeHost(_) => CHANGE_HOST,
            Command::Status => STATUS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorStatus {
    pub host: String,
    pub addr: IpAddr,
    pub method: ProbeMethod,
    pub sent: u64,
    pub received: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CommandReply {
    #[serde(rename_all = "camelCase")]
    HostChanged { host: String, addr: IpAddr },
    Status(MonitorStatus),
}

impl CommandReply {
    pub fn to_value(&self) -> Result<Value, CommandError> {
        serde_json::to_value(self).map_err(|e| CommandError::Internal(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
    #[error("invalid arguments for '{command}': {reason}")]
    InvalidArgs { command: String, reason: String },
    #[error("invalid host: {0}")]
    InvalidHost(#[from] TargetError),
    #[error("could not resolve '{host}': {reason}")]
    Resolve { host: String, reason: String },
    #[error("monitor is no longer running")]
    MonitorStopped,
    #[error("internal error: {0}")]
    Internal(String),
}

impl Serialize for CommandError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}
