use serde::{Deserialize, Serialize};

use crate::error::WiringError;
use crate::types::ComponentState;

use super::board::MicroController;
use super::breadboard::{Direction, HoleAllocator};

pub const POWER_COLOR: &str = "#FF422A";
pub const GROUND_COLOR: &str = "#000000";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WireKind {
    Signal,
    Power,
    Ground,
}

/// One wire segment for the renderer to draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Wire {
    pub component_id: String,
    /// Connector on the component the wire ends at.
    pub connection_id: &'static str,
    pub hole_id: String,
    pub kind: WireKind,
    pub color: &'static str,
    /// Moving segments follow the component when it is dragged.
    pub moving: bool,
}

/// Stable id for a component, shared by every frame it appears in.
pub fn component_id(state: &ComponentState) -> String {
    let kind = match state {
        ComponentState::UltrasonicSensor(_) => "ultrasonic_sensor",
        ComponentState::Button(_) => "button",
        ComponentState::PhotoSensor(_) => "photo_sensor",
        ComponentState::Led(_) => "led",
    };
    let mut id = kind.to_string();
    for pin in state.pins() {
        id.push('-');
        id.push_str(pin);
    }
    id
}

/// Vertical position of the ultrasonic sensor's distance marker.
pub fn distance_marker_y(cm: u32) -> u32 {
    const FIRST_DISTANCE: i64 = 224;
    (FIRST_DISTANCE - i64::from(cm)).max(100) as u32
}

/// Every wire `state` needs on `board`, taking rail holes from `holes`.
pub fn plan_wires(
    state: &ComponentState,
    board: &MicroController,
    holes: &mut HoleAllocator,
) -> Result<Vec<Wire>, WiringError> {
    let id = component_id(state);
    let mut wires = Vec::new();
    match state {
        ComponentState::UltrasonicSensor(s) => {
            wires.extend(rail_wire(&id, &s.trig_pin, WireKind::Power, Direction::Left, board, holes)?);
            wires.push(signal_wire(&id, &s.trig_pin, "PIN_TRIG", "#177a6c", board)?);
            wires.push(signal_wire(&id, &s.echo_pin, "PIN_ECHO", "#a03368", board)?);
            wires.extend(rail_wire(&id, &s.echo_pin, WireKind::Ground, Direction::Right, board, holes)?);
        }
        ComponentState::Button(s) => {
            wires.extend(rail_wire(&id, &s.pin, WireKind::Power, Direction::Left, board, holes)?);
            wires.push(signal_wire(&id, &s.pin, "PIN_DATA", "#177a6c", board)?);
            wires.extend(rail_wire(&id, &s.pin, WireKind::Ground, Direction::Right, board, holes)?);
        }
        ComponentState::PhotoSensor(s) => {
            wires.extend(rail_wire(&id, &s.pin, WireKind::Power, Direction::Left, board, holes)?);
            wires.push(signal_wire(&id, &s.pin, "PIN_DATA", "#a03368", board)?);
            wires.extend(rail_wire(&id, &s.pin, WireKind::Ground, Direction::Right, board, holes)?);
        }
        ComponentState::Led(s) => {
            wires.push(signal_wire(&id, &s.pin, "PIN_ANODE", POWER_COLOR, board)?);
            wires.extend(rail_wire(&id, &s.pin, WireKind::Ground, Direction::Right, board, holes)?);
        }
    }
    Ok(wires)
}

fn signal_wire(
    component_id: &str,
    pin: &str,
    connection_id: &'static str,
    color: &'static str,
    board: &MicroController,
) -> Result<Wire, WiringError> {
    Ok(Wire {
        component_id: component_id.to_string(),
        connection_id,
        hole_id: board.pin_to_breadboard_hole(pin)?.to_string(),
        kind: WireKind::Signal,
        color,
        moving: true,
    })
}

/// Power and ground run in two segments: a fixed one from the bottom rail
/// to row A, and a moving one from row E to the component.
fn rail_wire(
    component_id: &str,
    pin: &str,
    kind: WireKind,
    direction: Direction,
    board: &MicroController,
    holes: &mut HoleAllocator,
) -> Result<[Wire; 2], WiringError> {
    let (rail, color, connection_id) = match kind {
        WireKind::Ground => ('X', GROUND_COLOR, "PIN_GND"),
        _ => ('W', POWER_COLOR, "PIN_POWER"),
    };
    let column = board.pin_column(pin)?;
    let hole = holes
        .take_closest(column, direction)
        .ok_or(WiringError::NoFreeHole)?;

    let segment = |hole_id: String, moving| Wire {
        component_id: component_id.to_string(),
        connection_id,
        hole_id,
        kind,
        color,
        moving,
    };
    Ok([
        segment(format!("pin{hole}{rail}"), false),
        segment(format!("pin{hole}E"), true),
    ])
}
