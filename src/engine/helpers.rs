//! Lookups over the raw block list. All of these tolerate any block list,
//! including one the editor is halfway through changing.

use crate::types::Block;

pub const ARDUINO_SETUP_BLOCK: &str = "arduino_setup";
pub const ARDUINO_LOOP_BLOCK: &str = "arduino_loop";
pub const LOOP_TIMES_FIELD: &str = "LOOP_TIMES";
pub const SENSOR_LOOP_FIELD: &str = "LOOP";

pub const SENSOR_SETUP_BLOCK_NAMES: &[&str] = &[
    "ultrasonic_sensor_setup",
    "button_setup",
    "photo_sensor_setup",
];

pub fn find_arduino_setup_block(blocks: &[Block]) -> Option<&Block> {
    blocks.iter().find(|b| b.block_name == ARDUINO_SETUP_BLOCK)
}

pub fn find_arduino_loop_block(blocks: &[Block]) -> Option<&Block> {
    blocks.iter().find(|b| b.block_name == ARDUINO_LOOP_BLOCK)
}

/// Number of `loop()` passes to simulate. Anything unusable counts as zero.
pub fn loop_times_from_blocks(blocks: &[Block]) -> u32 {
    find_arduino_loop_block(blocks)
        .and_then(|b| b.field(LOOP_TIMES_FIELD))
        .and_then(parse_count)
        .unwrap_or(0)
}

pub fn is_sensor_setup_block(block: &Block) -> bool {
    SENSOR_SETUP_BLOCK_NAMES.contains(&block.block_name.as_str())
}

/// Parse a non-negative whole count. Editors send numbers as text and
/// sometimes as `"3.0"`.
pub fn parse_count(value: &str) -> Option<u32> {
    let value = value.trim();
    if let Ok(n) = value.parse::<u32>() {
        return Some(n);
    }
    let n = value.parse::<f64>().ok()?;
    (n.is_finite() && n >= 0.0 && n.fract() == 0.0 && n <= f64::from(u32::MAX))
        .then_some(n as u32)
}
