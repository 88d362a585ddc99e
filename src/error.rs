//! Error types for the simulation core.
//!
//! None of these escape `Engine::event_to_frames`: block and sensor errors
//! cause the offending block to be skipped, simulation errors flip the
//! container's `error` flag.

use thiserror::Error;

use crate::types::Timeline;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlockError {
    #[error("block {block} has no field {field}")]
    MissingField { block: String, field: &'static str },
    #[error("block {block} field {field} has malformed value {value:?}")]
    MalformedField {
        block: String,
        field: &'static str,
        value: String,
    },
    #[error("block {block} has malformed metadata: {reason}")]
    MalformedMetadata { block: String, reason: String },
    #[error("block {0} is not a sensor setup block")]
    NotASensor(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SensorError {
    #[error(transparent)]
    Block(#[from] BlockError),
    #[error("sensor block {block} is valid through loop {valid_through}, not {timeline:?}")]
    OutsideWindow {
        block: String,
        valid_through: u32,
        timeline: Timeline,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimulationError {
    #[error("block id {0} is used more than once")]
    DuplicateBlockId(String),
    #[error("program has more than one {0} block")]
    DuplicateRoot(&'static str),
    #[error("block {0} is part of a cycle")]
    Cycle(String),
    #[error("statements nest deeper than {0} blocks")]
    NestingTooDeep(usize),
    #[error("simulation exceeded {0} frames")]
    FrameLimit(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WiringError {
    #[error("pin {pin} does not exist on {board}")]
    UnknownPin { pin: String, board: &'static str },
    #[error("no free breadboard hole left")]
    NoFreeHole,
}
