//! A single quick-settings style toggle that cycles between Wi-Fi and mobile
//! data while mirroring the live state of both transports.

pub mod config;
pub mod error;
pub mod network;
pub mod platform;
pub mod shell;
pub mod store;
pub mod tile;
pub mod traits;
