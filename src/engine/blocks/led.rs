use crate::engine::graph::Node;
use crate::engine::transformer::Simulation;
use crate::error::{BlockError, SimulationError};
use crate::types::{ComponentState, LedState};

use super::{Fields, Simulate};

/// Declares an LED on a pin, initially off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedSetup {
    pub pin: String,
}

impl LedSetup {
    pub fn parse(fields: &Fields<'_>) -> Result<Self, BlockError> {
        Ok(LedSetup {
            pin: fields.text("PIN")?.to_string(),
        })
    }
}

impl Simulate for LedSetup {
    fn simulate(&self, node: &Node, sim: &mut Simulation<'_>) -> Result<(), SimulationError> {
        let led = ComponentState::Led(LedState {
            pin: self.pin.clone(),
            is_on: false,
            fade: 0,
        });
        let frame = sim.state_mut();
        // An LED that already exists keeps its state.
        if !frame.components.iter().any(|c| c.same_component(&led)) {
            frame.components.push(led);
        }
        sim.emit(node, format!("Setting up led on pin {}.", self.pin))
    }
}

/// Digital write: fully on or fully off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Led {
    pub pin: String,
    pub on: bool,
}

impl Led {
    pub fn parse(fields: &Fields<'_>) -> Result<Self, BlockError> {
        Ok(Led {
            pin: fields.text("PIN")?.to_string(),
            on: fields.flag("STATE")?,
        })
    }
}

impl Simulate for Led {
    fn simulate(&self, node: &Node, sim: &mut Simulation<'_>) -> Result<(), SimulationError> {
        sim.state_mut().upsert_component(ComponentState::Led(LedState {
            pin: self.pin.clone(),
            is_on: self.on,
            fade: if self.on { u8::MAX } else { 0 },
        }));
        let verb = if self.on { "on" } else { "off" };
        sim.emit(node, format!("Turning {verb} led {}.", self.pin))
    }
}

/// Analog write; the duty cycle comes from the `FADE` value input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedFade {
    pub pin: String,
}

impl LedFade {
    pub fn parse(fields: &Fields<'_>) -> Result<Self, BlockError> {
        Ok(LedFade {
            pin: fields.text("PIN")?.to_string(),
        })
    }
}

impl Simulate for LedFade {
    fn simulate(&self, node: &Node, sim: &mut Simulation<'_>) -> Result<(), SimulationError> {
        let fade = sim.number(node, "FADE")?.round().clamp(0.0, 255.0) as u8;
        sim.state_mut().upsert_component(ComponentState::Led(LedState {
            pin: self.pin.clone(),
            is_on: fade > 0,
            fade,
        }));
        sim.emit(node, format!("Fading led {} to {fade}.", self.pin))
    }
}
