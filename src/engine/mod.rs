//! Engine — the frame compiler.
//!
//! Turns a `BlockEvent` (the user's program) into a `FrameContainer`: one
//! continuous timeline covering pre-setup blocks, `setup()` and every
//! configured pass of `loop()`.
//!
//! The engine understands blocks, phases and component state. It never deals
//! with terminals, SVG or wiring.

pub mod blocks;
pub mod graph;
pub mod helpers;
pub mod sensor;
pub mod transformer;

use tracing::{debug, warn};

use crate::error::SimulationError;
use crate::settings::Settings;
use crate::types::{Block, BlockEvent, Frame, FrameContainer, Timeline};
use graph::BlockGraph;
use helpers::{
    find_arduino_loop_block, find_arduino_setup_block, is_sensor_setup_block,
    loop_times_from_blocks,
};
use sensor::convert_to_state;
use transformer::{Transformer, MAX_FRAMES};

pub struct Engine;

impl Engine {
    /// Simulate the program in `event`. Never fails: structural problems
    /// come back as an empty container with `error` set.
    pub fn event_to_frames(event: &BlockEvent, settings: Option<Settings>) -> FrameContainer {
        let settings = settings.unwrap_or_default();
        let (frames, error) = match Self::generate(event) {
            Ok(frames) => (frames, false),
            Err(e) => {
                warn!(error = %e, "simulation aborted");
                (Vec::new(), true)
            }
        };

        FrameContainer {
            board: event.micro_controller.clone(),
            frames,
            error,
            settings,
        }
    }

    fn generate(event: &BlockEvent) -> Result<Vec<Frame>, SimulationError> {
        let blocks = &event.blocks;
        let graph = BlockGraph::from_blocks(blocks)?;

        let mut frames: Vec<Frame> = Vec::new();

        for block in blocks.iter().filter(|b| b.block_type.is_pre_setup()) {
            let produced = transformer(&graph, event, Timeline::PRE_SETUP, frames.len())
                .generate_frame(&block.id, frames.last())?;
            frames.extend(produced);
        }
        debug!(frames = frames.len(), "pre-setup done");

        if let Some(setup) = find_arduino_setup_block(blocks) {
            let previous = previous_state(blocks, Timeline::PRE_SETUP, frames.last());
            let produced = transformer(&graph, event, Timeline::SETUP, frames.len())
                .generate_input_frame(&setup.id, "setup", previous.as_ref())?;
            frames.extend(produced);
            debug!(frames = frames.len(), "setup done");
        }

        if let Some(arduino_loop) = find_arduino_loop_block(blocks) {
            let loop_times = loop_times_from_blocks(blocks);
            for iteration in 1..=loop_times {
                let timeline = Timeline::loop_iteration(iteration);
                let previous = previous_state(blocks, timeline, frames.last());
                let produced = transformer(&graph, event, timeline, frames.len())
                    .generate_input_frame(&arduino_loop.id, "loop", previous.as_ref())?;
                frames.extend(produced);
            }
            debug!(frames = frames.len(), loop_times, "loop done");
        }

        Ok(frames)
    }
}

fn transformer<'a>(
    graph: &'a BlockGraph,
    event: &'a BlockEvent,
    timeline: Timeline,
    produced: usize,
) -> Transformer<'a> {
    Transformer::new(graph, &event.variables, timeline).with_budget(MAX_FRAMES.saturating_sub(produced))
}

/// Starting state for a phase: the last frame's non-sensor components,
/// plus sensor components freshly derived from the setup blocks for
/// `timeline`. Sensors that are out of window or malformed are left out.
fn previous_state(blocks: &[Block], timeline: Timeline, last: Option<&Frame>) -> Option<Frame> {
    let last = last?;
    let mut frame = last.clone();
    frame.components.retain(|c| !c.is_sensor());
    for block in blocks.iter().filter(|b| is_sensor_setup_block(b)) {
        match convert_to_state(block, &timeline) {
            Ok(state) => frame.upsert_component(state),
            Err(e) => debug!(block = %block.id, error = %e, "sensor omitted"),
        }
    }
    Some(frame)
}
