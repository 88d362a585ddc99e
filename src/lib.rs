//! blocksim — simulates Arduino block programs as a replayable frame timeline.

pub mod actions;
pub mod circuit;
pub mod engine;
pub mod error;
pub mod player;
pub mod settings;
pub mod types;
