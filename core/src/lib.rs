pub mod invoke;
pub mod monitor;
pub mod prober;
pub mod resolver;
