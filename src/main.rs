use std::path::Path;
use std::{fs, process};

use anyhow::{bail, Context, Result};
use tracing_subscriber::EnvFilter;

use blocksim::{
    actions::event_to_actions,
    engine::Engine,
    player::Player,
    settings::Settings,
    types::{BlockEvent, FrameContainer},
};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

const SIMULATE_USAGE: &str = "blocksim simulate <event.json> <frames.json> [settings.json]";
const ACTIONS_USAGE: &str = "blocksim actions <event.json>";
const PLAY_USAGE: &str = "blocksim play <frames.json>";

fn run() -> Result<()> {
    let mut args = std::env::args().skip(1);

    match args.next().as_deref() {
        Some("simulate") => {
            let event_path = args.next().context(SIMULATE_USAGE)?;
            let output_path = args.next().context(SIMULATE_USAGE)?;
            let settings_path = args.next();
            simulate(&event_path, &output_path, settings_path.as_deref())
        }
        Some("actions") => {
            let path = args.next().context(ACTIONS_USAGE)?;
            actions(&path)
        }
        Some("play") => {
            let path = args.next().context(PLAY_USAGE)?;
            play(&path)
        }
        _ => bail!(
            "blocksim — Arduino block program simulator\n\nUsage:\n  {SIMULATE_USAGE}\n  {ACTIONS_USAGE}\n  {PLAY_USAGE}"
        ),
    }
}

fn read_event(path: &str) -> Result<BlockEvent> {
    let json = fs::read_to_string(path).with_context(|| format!("Failed to read {path}"))?;
    serde_json::from_str(&json).with_context(|| format!("Failed to parse {path}"))
}

fn simulate(event_path: &str, output_path: &str, settings_path: Option<&str>) -> Result<()> {
    let event = read_event(event_path)?;
    let settings = Settings::load(settings_path.map(Path::new));

    let container = Engine::event_to_frames(&event, Some(settings));

    let output_json = serde_json::to_string_pretty(&container)?;
    fs::write(output_path, &output_json)
        .with_context(|| format!("Failed to write {output_path}"))?;

    if container.error {
        bail!("{event_path} could not be simulated; wrote an empty container to {output_path}");
    }
    eprintln!(
        "Simulated {} frames from {} -> {}",
        container.frames.len(),
        event_path,
        output_path,
    );

    Ok(())
}

fn actions(path: &str) -> Result<()> {
    let event = read_event(path)?;
    let actions = event_to_actions(&event);
    println!("{}", serde_json::to_string_pretty(&actions)?);
    Ok(())
}

fn play(path: &str) -> Result<()> {
    let json = fs::read_to_string(path).with_context(|| format!("Failed to read {path}"))?;
    let container: FrameContainer =
        serde_json::from_str(&json).with_context(|| format!("Failed to parse {path}"))?;

    let mut player = Player::new(container);
    player.play()
}
