pub mod command;
pub mod config;
pub mod history;
pub mod network;
pub mod ping;
