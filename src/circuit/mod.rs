//! Circuit — breadboard layout for the renderer.
//!
//! Given a board id and the components seen in a frame timeline, decides
//! which breadboard holes every wire uses. Pure data; drawing is left to
//! whoever consumes the plan.

pub mod board;
pub mod breadboard;
pub mod wire;

use std::collections::BTreeMap;

use tracing::warn;

use crate::types::Frame;
use board::MicroController;
use breadboard::HoleAllocator;
use wire::{component_id, plan_wires, Wire};

/// Wires for every component that appears anywhere in `frames`, keyed by
/// component id. Each component is wired once, at its first appearance.
/// Returns `None` for boards without a known layout.
pub fn layout_circuit(board: &str, frames: &[Frame]) -> Option<BTreeMap<String, Vec<Wire>>> {
    let board = MicroController::for_board(board)?;
    let mut holes = HoleAllocator::new(&board);
    let mut layout = BTreeMap::new();

    for component in frames.iter().flat_map(|f| &f.components) {
        let id = component_id(component);
        if layout.contains_key(&id) {
            continue;
        }
        match plan_wires(component, &board, &mut holes) {
            Ok(wires) => {
                layout.insert(id, wires);
            }
            Err(e) => {
                warn!(component = %id, error = %e, "component left unwired");
                layout.insert(id, Vec::new());
            }
        }
    }
    Some(layout)
}
