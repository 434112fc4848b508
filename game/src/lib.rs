//! Reflex tap game: a marker sweeps a row of blocks and the player taps when it
//! sits on the highlighted one. This crate is the game-state core; drawing and
//! input devices live behind [`display::Display`] and [`engine::Frame`].

pub mod config;
pub mod display;
pub mod error;
pub mod highscore;
pub mod playtest;
pub mod round;
pub mod score;
pub mod serde_secs;
pub mod session;
pub mod store;
pub mod view;

pub use config::GameConfig;
pub use error::{ConfigError, StoreError};
pub use session::{Session, SessionSnapshot};
