//! The internet tile: a single toggle that cycles Wi-Fi → mobile data → Wi-Fi.

pub mod command;
pub mod machine;
pub mod presentation;
pub mod service;
pub mod state;

pub use command::{Generation, Ticket, ToggleCommand};
pub use machine::{Effect, Input, TransitionController};
pub use presentation::{TileDescriptor, TileIcon, TileState, cellular_text, present};
pub use service::{TileHandle, TileService, TileUpdate, UserAction};
pub use state::{ControllerSnapshot, Mode, TransportState, WifiIdentity};
