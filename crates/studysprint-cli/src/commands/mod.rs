pub mod config;
pub mod session;
pub mod settings;
pub mod stats;
pub mod task;
pub mod timer;
pub mod user;
