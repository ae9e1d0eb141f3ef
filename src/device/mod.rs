//! Message driver and pipeline state

pub mod manager;
pub mod state;

pub use manager::MessageDriver;
pub use state::DeviceStats;
