use crate::engine::graph::Node;
use crate::engine::helpers::LOOP_TIMES_FIELD;
use crate::engine::transformer::Simulation;
use crate::error::{BlockError, SimulationError};

use super::{Fields, Simulate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArduinoLoop {
    pub loop_times: u32,
}

impl ArduinoLoop {
    /// An unusable `LOOP_TIMES` means zero passes, not a broken block.
    pub fn parse(fields: &Fields<'_>) -> Result<Self, BlockError> {
        Ok(ArduinoLoop {
            loop_times: fields.count(LOOP_TIMES_FIELD).unwrap_or(0),
        })
    }
}

impl Simulate for ArduinoLoop {
    fn simulate(&self, node: &Node, sim: &mut Simulation<'_>) -> Result<(), SimulationError> {
        let explanation = format!(
            "Arduino loop is running {} of {} times.",
            sim.timeline().iteration,
            self.loop_times
        );
        sim.emit(node, explanation)
    }
}
