//! Sensor setup blocks and their conversion into component state.
//!
//! A sensor setup block carries a default reading in its fields and, in
//! `metadata`, the reading the user picked for each loop pass. Its `LOOP`
//! field bounds the loop passes the block is valid for.

use serde::Deserialize;

use crate::engine::blocks::Fields;
use crate::engine::helpers::SENSOR_LOOP_FIELD;
use crate::error::{BlockError, SensorError};
use crate::types::{
    ArduinoFunction, Block, ButtonState, ComponentState, PhotoSensorState, Timeline,
    UltrasonicSensorState,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SensorKind {
    Ultrasonic {
        trig_pin: String,
        echo_pin: String,
        cm: u32,
    },
    Button {
        pin: String,
        is_pressed: bool,
    },
    PhotoSensor {
        pin: String,
        reading: u16,
    },
}

/// One entry of a sensor block's `metadata` array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SensorReading {
    #[serde(rename = "loop")]
    pub iteration: u32,
    #[serde(default)]
    pub cm: Option<u32>,
    #[serde(default)]
    pub is_pressed: Option<bool>,
    #[serde(default)]
    pub reading: Option<u16>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorSetup {
    pub block_id: String,
    pub kind: SensorKind,
    /// Last loop pass this block is valid for; `None` means every pass.
    pub valid_through: Option<u32>,
    pub readings: Vec<SensorReading>,
}

impl SensorSetup {
    pub fn from_block(block: &Block) -> Result<Self, BlockError> {
        let fields = Fields::new(block);
        let kind = match block.block_name.as_str() {
            "ultrasonic_sensor_setup" => SensorKind::Ultrasonic {
                trig_pin: fields.text("PIN_TRIG")?.to_string(),
                echo_pin: fields.text("PIN_ECHO")?.to_string(),
                cm: fields.optional_count("cm")?.unwrap_or(0),
            },
            "button_setup" => SensorKind::Button {
                pin: fields.text("PIN")?.to_string(),
                is_pressed: match block.field("is_pressed") {
                    Some(_) => fields.flag("is_pressed")?,
                    None => false,
                },
            },
            "photo_sensor_setup" => SensorKind::PhotoSensor {
                pin: fields.text("PIN")?.to_string(),
                reading: fields.optional("reading")?.unwrap_or(0),
            },
            _ => return Err(BlockError::NotASensor(block.id.clone())),
        };

        let readings = match block.metadata.as_deref().map(str::trim) {
            None | Some("") => Vec::new(),
            Some(json) => {
                serde_json::from_str(json).map_err(|e| BlockError::MalformedMetadata {
                    block: block.id.clone(),
                    reason: e.to_string(),
                })?
            }
        };

        Ok(SensorSetup {
            block_id: block.id.clone(),
            kind,
            valid_through: fields.optional_count(SENSOR_LOOP_FIELD)?,
            readings,
        })
    }

    pub fn in_window(&self, timeline: &Timeline) -> bool {
        match (timeline.function, self.valid_through) {
            (ArduinoFunction::Loop, Some(last)) => timeline.iteration <= last,
            _ => true,
        }
    }

    /// Component state for `timeline`, using the reading recorded for that
    /// loop pass when there is one.
    pub fn state_at(&self, timeline: &Timeline) -> Result<ComponentState, SensorError> {
        if !self.in_window(timeline) {
            return Err(SensorError::OutsideWindow {
                block: self.block_id.clone(),
                valid_through: self.valid_through.unwrap_or(0),
                timeline: *timeline,
            });
        }

        let reading = self
            .readings
            .iter()
            .find(|r| r.iteration == timeline.iteration);

        Ok(match &self.kind {
            SensorKind::Ultrasonic {
                trig_pin,
                echo_pin,
                cm,
            } => ComponentState::UltrasonicSensor(UltrasonicSensorState {
                trig_pin: trig_pin.clone(),
                echo_pin: echo_pin.clone(),
                cm: reading.and_then(|r| r.cm).unwrap_or(*cm),
            }),
            SensorKind::Button { pin, is_pressed } => ComponentState::Button(ButtonState {
                pin: pin.clone(),
                is_pressed: reading.and_then(|r| r.is_pressed).unwrap_or(*is_pressed),
            }),
            SensorKind::PhotoSensor { pin, reading: default } => {
                ComponentState::PhotoSensor(PhotoSensorState {
                    pin: pin.clone(),
                    reading: reading.and_then(|r| r.reading).unwrap_or(*default),
                })
            }
        })
    }
}

/// Sensor setup block → component state for one timeline position.
/// An error means the sensor is left out of the frame.
pub fn convert_to_state(block: &Block, timeline: &Timeline) -> Result<ComponentState, SensorError> {
    SensorSetup::from_block(block)?.state_at(timeline)
}
