//! Core game logic. Keep this crate free of IO and platform concerns.

pub mod config;
pub mod events;
pub mod notice;
pub mod play;
pub mod rng;
pub mod rules;
pub mod state;
pub mod store;

pub use config::*;
pub use events::*;
pub use notice::*;
pub use play::*;
pub use rng::*;
pub use rules::*;
pub use state::*;
pub use store::*;
