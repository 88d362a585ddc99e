//! Shared boundary types for the block simulator.
//!
//! This module defines the two key data contracts:
//! - Editor → Engine (JSON): `BlockEvent` containing raw `Block`s
//! - Engine → Renderer (JSON): `FrameContainer` containing `Frame`s

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::settings::Settings;

// ---------------------------------------------------------------------------
// Editor → Engine boundary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlockType {
    SensorSetup,
    Setup,
    ListCreate,
    Arduino,
    Statement,
    Value,
    #[serde(other)]
    Unknown,
}

impl BlockType {
    /// Kinds that are simulated once, before `setup()` runs.
    pub fn is_pre_setup(self) -> bool {
        matches!(
            self,
            BlockType::SensorSetup | BlockType::Setup | BlockType::ListCreate
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldValue {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputBlock {
    pub name: String,
    pub block_id: String,
}

/// A block as the editor serializes it. Field lookups on this type are
/// by name; the engine converts it to typed nodes before simulating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: String,
    #[serde(rename = "type")]
    pub block_type: BlockType,
    pub block_name: String,
    #[serde(default)]
    pub field_values: Vec<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_block_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_block_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub input_blocks: Vec<InputBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,
}

impl Block {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.field_values
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }

    pub fn set_field(&mut self, name: &str, value: String) {
        match self.field_values.iter_mut().find(|f| f.name == name) {
            Some(field) => field.value = value,
            None => self.field_values.push(FieldValue {
                name: name.to_string(),
                value,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariableType {
    Number,
    String,
    Boolean,
    #[serde(rename = "List Number")]
    NumberList,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableBinding {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub variable_type: VariableType,
}

/// Everything the editor sends after a change. The trailing three fields
/// are only set for field-change events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockEvent {
    pub blocks: Vec<Block>,
    #[serde(default)]
    pub variables: Vec<VariableBinding>,
    pub micro_controller: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_id: Option<String>,
}

// ---------------------------------------------------------------------------
// Engine → Renderer boundary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArduinoFunction {
    PreSetup,
    Setup,
    Loop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Timeline {
    pub iteration: u32,
    pub function: ArduinoFunction,
}

impl Timeline {
    pub const PRE_SETUP: Timeline = Timeline {
        iteration: 0,
        function: ArduinoFunction::PreSetup,
    };

    pub const SETUP: Timeline = Timeline {
        iteration: 0,
        function: ArduinoFunction::Setup,
    };

    pub fn loop_iteration(iteration: u32) -> Self {
        Timeline {
            iteration,
            function: ArduinoFunction::Loop,
        }
    }
}

impl fmt::Display for Timeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.function {
            ArduinoFunction::PreSetup => f.write_str("pre-setup"),
            ArduinoFunction::Setup => f.write_str("setup"),
            ArduinoFunction::Loop => write!(f, "loop {}", self.iteration),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UltrasonicSensorState {
    pub trig_pin: String,
    pub echo_pin: String,
    pub cm: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonState {
    pub pin: String,
    pub is_pressed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoSensorState {
    pub pin: String,
    pub reading: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedState {
    pub pin: String,
    pub is_on: bool,
    /// PWM duty, 0..=255.
    pub fade: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComponentState {
    UltrasonicSensor(UltrasonicSensorState),
    Button(ButtonState),
    PhotoSensor(PhotoSensorState),
    Led(LedState),
}

impl ComponentState {
    /// Sensor state is re-derived from setup blocks at every phase boundary;
    /// everything else is carried forward.
    pub fn is_sensor(&self) -> bool {
        match self {
            ComponentState::UltrasonicSensor(_)
            | ComponentState::Button(_)
            | ComponentState::PhotoSensor(_) => true,
            ComponentState::Led(_) => false,
        }
    }

    /// Whether both states describe the same physical part.
    pub fn same_component(&self, other: &ComponentState) -> bool {
        match (self, other) {
            (ComponentState::UltrasonicSensor(a), ComponentState::UltrasonicSensor(b)) => {
                a.trig_pin == b.trig_pin && a.echo_pin == b.echo_pin
            }
            (ComponentState::Button(a), ComponentState::Button(b)) => a.pin == b.pin,
            (ComponentState::PhotoSensor(a), ComponentState::PhotoSensor(b)) => a.pin == b.pin,
            (ComponentState::Led(a), ComponentState::Led(b)) => a.pin == b.pin,
            _ => false,
        }
    }

    /// Pins the part occupies, in wiring order.
    pub fn pins(&self) -> Vec<&str> {
        match self {
            ComponentState::UltrasonicSensor(s) => vec![s.trig_pin.as_str(), s.echo_pin.as_str()],
            ComponentState::Button(s) => vec![s.pin.as_str()],
            ComponentState::PhotoSensor(s) => vec![s.pin.as_str()],
            ComponentState::Led(s) => vec![s.pin.as_str()],
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ComponentState::UltrasonicSensor(_) => "ultrasonic sensor",
            ComponentState::Button(_) => "button",
            ComponentState::PhotoSensor(_) => "photo sensor",
            ComponentState::Led(_) => "led",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum Value {
    Number(f64),
    Text(String),
    Boolean(bool),
    NumberList(Vec<f64>),
}

impl Value {
    pub fn as_number(&self) -> f64 {
        match self {
            Value::Number(n) => *n,
            Value::Boolean(b) => f64::from(u8::from(*b)),
            Value::Text(s) => s.trim().parse().unwrap_or(0.0),
            Value::NumberList(_) => 0.0,
        }
    }

    pub fn as_bool(&self) -> bool {
        match self {
            Value::Boolean(b) => *b,
            Value::Number(n) => *n != 0.0,
            Value::Text(s) => !s.is_empty(),
            Value::NumberList(l) => !l.is_empty(),
        }
    }

    pub fn zero(variable_type: VariableType) -> Self {
        match variable_type {
            VariableType::Number => Value::Number(0.0),
            VariableType::String => Value::Text(String::new()),
            VariableType::Boolean => Value::Boolean(false),
            VariableType::NumberList => Value::NumberList(Vec::new()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n}"),
            Value::Text(s) => write!(f, "\"{s}\""),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::NumberList(l) => {
                let items: Vec<String> = l.iter().map(|n| n.to_string()).collect();
                write!(f, "[{}]", items.join(", "))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub id: String,
    pub name: String,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub block_id: String,
    pub block_name: String,
    pub timeline: Timeline,
    pub explanation: String,
    pub components: Vec<ComponentState>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub variables: BTreeMap<String, Variable>,
}

impl Frame {
    pub fn empty(timeline: Timeline) -> Self {
        Frame {
            block_id: String::new(),
            block_name: String::new(),
            timeline,
            explanation: String::new(),
            components: Vec::new(),
            variables: BTreeMap::new(),
        }
    }

    /// Insert `state`, replacing the entry for the same part if present.
    pub fn upsert_component(&mut self, state: ComponentState) {
        match self
            .components
            .iter_mut()
            .find(|c| c.same_component(&state))
        {
            Some(existing) => *existing = state,
            None => self.components.push(state),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameContainer {
    pub board: String,
    pub frames: Vec<Frame>,
    pub error: bool,
    #[serde(default)]
    pub settings: Settings,
}
