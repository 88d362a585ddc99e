//! Block kinds and their simulate implementations.
//!
//! Each kind lives in its own module with its typed struct, the parser
//! that reads it out of a raw `Block`, and its `Simulate` implementation
//! side by side.

mod arduino;
mod control;
mod led;
mod sensors;
mod values;
mod variables;

pub use arduino::ArduinoLoop;
pub use control::{If, Repeat};
pub use led::{Led, LedFade, LedSetup};
pub use values::{CompareOp, ValueBlock};
pub use variables::{CreateNumberList, SetListItem, SetVariable};

use std::str::FromStr;

use tracing::warn;

use crate::engine::graph::Node;
use crate::engine::helpers::{ARDUINO_LOOP_BLOCK, ARDUINO_SETUP_BLOCK};
use crate::engine::sensor::SensorSetup;
use crate::engine::transformer::Simulation;
use crate::error::{BlockError, SimulationError};
use crate::types::Block;

/// Run one block against the simulation's working frame, emitting zero or
/// more frames.
pub trait Simulate {
    fn simulate(&self, node: &Node, sim: &mut Simulation<'_>) -> Result<(), SimulationError>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum BlockKind {
    ArduinoSetup,
    ArduinoLoop(ArduinoLoop),
    SensorSetup(SensorSetup),
    LedSetup(LedSetup),
    Led(Led),
    LedFade(LedFade),
    SetVariable(SetVariable),
    CreateNumberList(CreateNumberList),
    SetListItem(SetListItem),
    Repeat(Repeat),
    If(If),
    Value(ValueBlock),
    Unknown,
    Invalid(BlockError),
}

impl BlockKind {
    /// Read a raw block into its typed form. Blocks with unusable fields
    /// become `Invalid` rather than failing the graph.
    pub fn parse(block: &Block) -> Self {
        let fields = Fields::new(block);
        let parsed = match block.block_name.as_str() {
            ARDUINO_SETUP_BLOCK => Ok(BlockKind::ArduinoSetup),
            ARDUINO_LOOP_BLOCK => ArduinoLoop::parse(&fields).map(BlockKind::ArduinoLoop),
            "ultrasonic_sensor_setup" | "button_setup" | "photo_sensor_setup" => {
                SensorSetup::from_block(block).map(BlockKind::SensorSetup)
            }
            "led_setup" => LedSetup::parse(&fields).map(BlockKind::LedSetup),
            "led" => Led::parse(&fields).map(BlockKind::Led),
            "led_fade" => LedFade::parse(&fields).map(BlockKind::LedFade),
            name @ ("variables_set_number" | "variables_set_string" | "variables_set_boolean") => {
                SetVariable::parse(name, &fields).map(BlockKind::SetVariable)
            }
            "create_list_number_block" => {
                CreateNumberList::parse(&fields).map(BlockKind::CreateNumberList)
            }
            "set_number_list_block" => SetListItem::parse(&fields).map(BlockKind::SetListItem),
            "controls_repeat_ext" => Ok(BlockKind::Repeat(Repeat)),
            "controls_if" => Ok(BlockKind::If(If)),
            name => match ValueBlock::parse(name, &fields) {
                Some(value) => value.map(BlockKind::Value),
                None => Ok(BlockKind::Unknown),
            },
        };
        parsed.unwrap_or_else(|e| {
            warn!(block = %block.id, error = %e, "block will be skipped");
            BlockKind::Invalid(e)
        })
    }
}

impl Simulate for BlockKind {
    fn simulate(&self, node: &Node, sim: &mut Simulation<'_>) -> Result<(), SimulationError> {
        match self {
            BlockKind::ArduinoSetup => sim.emit(node, "Setting up Arduino.".to_string()),
            BlockKind::ArduinoLoop(b) => b.simulate(node, sim),
            BlockKind::SensorSetup(b) => b.simulate(node, sim),
            BlockKind::LedSetup(b) => b.simulate(node, sim),
            BlockKind::Led(b) => b.simulate(node, sim),
            BlockKind::LedFade(b) => b.simulate(node, sim),
            BlockKind::SetVariable(b) => b.simulate(node, sim),
            BlockKind::CreateNumberList(b) => b.simulate(node, sim),
            BlockKind::SetListItem(b) => b.simulate(node, sim),
            BlockKind::Repeat(b) => b.simulate(node, sim),
            BlockKind::If(b) => b.simulate(node, sim),
            // Values only run when a statement asks for them.
            BlockKind::Value(_) => Ok(()),
            BlockKind::Unknown => {
                warn!(block = %node.id, name = %node.name, "unknown block skipped");
                Ok(())
            }
            BlockKind::Invalid(_) => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Typed field access
// ---------------------------------------------------------------------------

/// Named-field reader over a raw block, turning absent or unparsable values
/// into `BlockError`s that carry the block id.
pub struct Fields<'a> {
    block: &'a Block,
}

impl<'a> Fields<'a> {
    pub fn new(block: &'a Block) -> Self {
        Fields { block }
    }

    pub fn text(&self, name: &'static str) -> Result<&'a str, BlockError> {
        self.block.field(name).ok_or_else(|| BlockError::MissingField {
            block: self.block.id.clone(),
            field: name,
        })
    }

    pub fn parse<T: FromStr>(&self, name: &'static str) -> Result<T, BlockError> {
        let value = self.text(name)?;
        value.trim().parse().map_err(|_| self.malformed(name, value))
    }

    /// Like `parse`, but an absent field is `None` instead of an error.
    pub fn optional<T: FromStr>(&self, name: &'static str) -> Result<Option<T>, BlockError> {
        match self.block.field(name) {
            Some(_) => self.parse(name).map(Some),
            None => Ok(None),
        }
    }

    /// Whole non-negative count, tolerating `"3.0"`.
    pub fn count(&self, name: &'static str) -> Result<u32, BlockError> {
        let value = self.text(name)?;
        crate::engine::helpers::parse_count(value).ok_or_else(|| self.malformed(name, value))
    }

    pub fn optional_count(&self, name: &'static str) -> Result<Option<u32>, BlockError> {
        match self.block.field(name) {
            Some(_) => self.count(name).map(Some),
            None => Ok(None),
        }
    }

    /// Blockly writes booleans as `TRUE`/`FALSE`.
    pub fn flag(&self, name: &'static str) -> Result<bool, BlockError> {
        let value = self.text(name)?;
        match value.to_ascii_uppercase().as_str() {
            "TRUE" | "ON" | "HIGH" => Ok(true),
            "FALSE" | "OFF" | "LOW" => Ok(false),
            _ => Err(self.malformed(name, value)),
        }
    }

    pub fn block_id(&self) -> &'a str {
        &self.block.id
    }

    fn malformed(&self, name: &'static str, value: &str) -> BlockError {
        BlockError::MalformedField {
            block: self.block.id.clone(),
            field: name,
            value: value.to_string(),
        }
    }
}
