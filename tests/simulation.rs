mod common;

use blocksim::engine::Engine;
use blocksim::settings::Settings;
use blocksim::types::{ArduinoFunction, ComponentState, Frame, LedState, Timeline, Value};
use common::*;
use serde_json::json;

fn led(frame: &Frame, pin: &str) -> Option<LedState> {
    frame.components.iter().find_map(|c| match c {
        ComponentState::Led(l) if l.pin == pin => Some(l.clone()),
        _ => None,
    })
}

fn ultrasonic_cm(frame: &Frame) -> Option<u32> {
    frame.components.iter().find_map(|c| match c {
        ComponentState::UltrasonicSensor(s) => Some(s.cm),
        _ => None,
    })
}

fn loop_frames(frames: &[Frame], iteration: u32) -> Vec<&Frame> {
    frames
        .iter()
        .filter(|f| f.timeline == Timeline::loop_iteration(iteration))
        .collect()
}

#[test_log::test]
fn empty_program_yields_empty_timeline() {
    let container = Engine::event_to_frames(&event(Vec::new()), None);
    assert!(container.frames.is_empty());
    assert!(!container.error);
}

#[test_log::test]
fn unmutated_led_is_carried_through_every_loop() {
    let blocks = vec![
        arduino_loop(3).build(),
        block("led", "SETUP", "led_setup").field("PIN", "13").build(),
    ];
    let container = Engine::event_to_frames(&event(blocks), None);
    assert!(!container.error);

    let loops: Vec<&Frame> = container
        .frames
        .iter()
        .filter(|f| f.timeline.function == ArduinoFunction::Loop)
        .collect();
    assert_eq!(loops.len(), 3);
    let iterations: Vec<u32> = loops.iter().map(|f| f.timeline.iteration).collect();
    assert_eq!(iterations, vec![1, 2, 3]);
    for frame in loops {
        assert_eq!(
            frame.components,
            vec![ComponentState::Led(LedState {
                pin: "13".into(),
                is_on: false,
                fade: 0,
            })]
        );
    }
}

#[test_log::test]
fn phases_come_in_order() {
    let blocks = vec![
        arduino_setup().input("setup", "on").build(),
        block("on", "STATEMENT", "led").field("PIN", "13").field("STATE", "ON").build(),
        arduino_loop(2).build(),
        ultrasonic("sensor", 2, &[]),
        block("led", "SETUP", "led_setup").field("PIN", "9").build(),
    ];
    let container = Engine::event_to_frames(&event(blocks), None);
    let timelines: Vec<Timeline> = container.frames.iter().map(|f| f.timeline).collect();
    assert_eq!(
        timelines,
        vec![
            Timeline::PRE_SETUP,
            Timeline::PRE_SETUP,
            Timeline::SETUP,
            Timeline::SETUP,
            Timeline::loop_iteration(1),
            Timeline::loop_iteration(2),
        ]
    );
    // Pre-setup blocks run in the order they were given.
    assert_eq!(container.frames[0].block_id, "sensor");
    assert_eq!(container.frames[1].block_id, "led");
}

#[test_log::test]
fn setup_state_carries_into_loop() {
    let blocks = vec![
        block("led", "SETUP", "led_setup").field("PIN", "13").build(),
        arduino_setup().input("setup", "on").build(),
        block("on", "STATEMENT", "led").field("PIN", "13").field("STATE", "ON").build(),
        arduino_loop(2).build(),
    ];
    let container = Engine::event_to_frames(&event(blocks), None);
    for iteration in 1..=2 {
        for frame in loop_frames(&container.frames, iteration) {
            let led = led(frame, "13").unwrap();
            assert!(led.is_on);
            assert_eq!(led.fade, 255);
        }
    }
}

#[test_log::test]
fn mutations_carry_from_one_loop_to_the_next() {
    let blocks = vec![
        arduino_loop(2).input("loop", "fade").build(),
        block("fade", "STATEMENT", "led_fade")
            .field("PIN", "9")
            .input("FADE", "amount")
            .next("off")
            .build(),
        number("amount", 300.0),
        block("off", "STATEMENT", "led").field("PIN", "9").field("STATE", "OFF").build(),
    ];
    let container = Engine::event_to_frames(&event(blocks), None);

    let first = loop_frames(&container.frames, 1);
    assert_eq!(first.len(), 3);
    // The loop root frame runs before any LED exists.
    assert!(led(first[0], "9").is_none());
    assert_eq!(led(first[1], "9").unwrap().fade, 255);
    assert!(!led(first[2], "9").unwrap().is_on);

    let second = loop_frames(&container.frames, 2);
    assert!(!led(second[0], "9").unwrap().is_on);
    assert_eq!(second[1].explanation, "Fading led 9 to 255.");
}

#[test_log::test]
fn sensor_readings_follow_the_loop_counter() {
    let blocks = vec![
        ultrasonic("sensor", 3, &[20, 40, 60]),
        arduino_loop(3).input("loop", "set").build(),
        block("set", "STATEMENT", "variables_set_number")
            .field("VAR", "v1")
            .input("VALUE", "get")
            .build(),
        block("get", "VALUE", "ultrasonic_sensor_get_distance").build(),
    ];
    let variables = json!([{ "id": "v1", "name": "distance", "type": "Number" }]);
    let container = Engine::event_to_frames(&event_with_variables(blocks, variables), None);

    // Pre-setup has no recorded reading and uses the field default.
    assert_eq!(ultrasonic_cm(&container.frames[0]), Some(10));

    for (iteration, cm) in [(1, 20), (2, 40), (3, 60)] {
        let frames = loop_frames(&container.frames, iteration);
        assert_eq!(frames.len(), 2);
        assert!(frames.iter().all(|f| ultrasonic_cm(f) == Some(cm)));
        assert_eq!(
            frames[1].variables["distance"].value,
            Value::Number(f64::from(cm))
        );
    }
}

#[test_log::test]
fn sensor_drops_out_after_its_window() {
    let blocks = vec![ultrasonic("sensor", 1, &[25]), arduino_loop(3).build()];
    let container = Engine::event_to_frames(&event(blocks), None);

    assert_eq!(ultrasonic_cm(loop_frames(&container.frames, 1)[0]), Some(25));
    for iteration in 2..=3 {
        let frame = loop_frames(&container.frames, iteration)[0];
        assert!(frame.components.is_empty(), "loop {iteration}: {:?}", frame.components);
    }
}

#[test_log::test]
fn each_sensor_appears_once_per_frame() {
    let blocks = vec![
        ultrasonic("sensor", 2, &[30, 31]),
        arduino_setup().build(),
        arduino_loop(2).build(),
    ];
    let container = Engine::event_to_frames(&event(blocks), None);
    for frame in &container.frames {
        let sensors = frame.components.iter().filter(|c| c.is_sensor()).count();
        assert_eq!(sensors, 1, "{frame:?}");
    }
}

#[test_log::test]
fn frames_do_not_share_state() {
    let blocks = vec![
        block("led", "SETUP", "led_setup").field("PIN", "13").build(),
        arduino_loop(3).build(),
    ];
    let mut frames = Engine::event_to_frames(&event(blocks), None).frames;
    let untouched: Vec<Frame> = frames[1..].to_vec();

    if let ComponentState::Led(led) = &mut frames[0].components[0] {
        led.is_on = true;
        led.fade = 99;
    }
    assert_eq!(&frames[1..], untouched.as_slice());
}

#[test_log::test]
fn button_drives_if_branches() {
    let blocks = vec![
        block("button", "SENSOR_SETUP", "button_setup")
            .field("PIN", "3")
            .field("LOOP", "2")
            .metadata(json!([
                { "loop": 1, "is_pressed": true },
                { "loop": 2, "is_pressed": false }
            ]))
            .build(),
        arduino_loop(2).input("loop", "if").build(),
        block("if", "STATEMENT", "controls_if")
            .input("IF0", "pressed")
            .input("DO0", "on")
            .input("ELSE", "off")
            .build(),
        block("pressed", "VALUE", "button_is_pressed").field("PIN", "3").build(),
        block("on", "STATEMENT", "led").field("PIN", "13").field("STATE", "ON").build(),
        block("off", "STATEMENT", "led").field("PIN", "13").field("STATE", "OFF").build(),
    ];
    let container = Engine::event_to_frames(&event(blocks), None);

    let first = loop_frames(&container.frames, 1);
    assert_eq!(first[1].explanation, "Checking if condition is true.");
    assert_eq!(first[2].block_id, "on");

    let second = loop_frames(&container.frames, 2);
    assert_eq!(second[1].explanation, "Checking if condition is false.");
    assert_eq!(second[2].block_id, "off");
}

#[test_log::test]
fn compare_reads_sensor_values() {
    let blocks = vec![
        ultrasonic("sensor", 2, &[10, 50]),
        arduino_loop(2).input("loop", "if").build(),
        block("if", "STATEMENT", "controls_if")
            .input("IF0", "far")
            .input("DO0", "on")
            .build(),
        block("far", "VALUE", "logic_compare")
            .field("OP", "GT")
            .input("A", "distance")
            .input("B", "limit")
            .build(),
        block("distance", "VALUE", "ultrasonic_sensor_get_distance").build(),
        number("limit", 30.0),
        block("on", "STATEMENT", "led").field("PIN", "13").field("STATE", "ON").build(),
    ];
    let container = Engine::event_to_frames(&event(blocks), None);
    assert_eq!(loop_frames(&container.frames, 1).len(), 2);
    assert_eq!(loop_frames(&container.frames, 2).len(), 3);
}

#[test_log::test]
fn repeat_runs_its_body() {
    let blocks = vec![
        arduino_loop(1).input("loop", "repeat").build(),
        block("repeat", "STATEMENT", "controls_repeat_ext")
            .input("TIMES", "two")
            .input("DO", "on")
            .build(),
        number("two", 2.0),
        block("on", "STATEMENT", "led").field("PIN", "13").field("STATE", "ON").build(),
    ];
    let container = Engine::event_to_frames(&event(blocks), None);
    let names: Vec<&str> = container.frames.iter().map(|f| f.block_id.as_str()).collect();
    assert_eq!(names, vec!["loop", "repeat", "on", "repeat", "on"]);
}

#[test_log::test]
fn lists_are_created_before_setup_and_updated_in_loop() {
    let blocks = vec![
        block("list", "LIST_CREATE", "create_list_number_block")
            .field("VAR", "l1")
            .field("SIZE", "3")
            .build(),
        arduino_loop(1).input("loop", "set").build(),
        block("set", "STATEMENT", "set_number_list_block")
            .field("VAR", "l1")
            .input("POSITION", "pos")
            .input("VALUE", "val")
            .build(),
        number("pos", 2.0),
        number("val", 7.0),
    ];
    let variables = json!([{ "id": "l1", "name": "scores", "type": "List Number" }]);
    let container = Engine::event_to_frames(&event_with_variables(blocks, variables), None);

    assert_eq!(
        container.frames[0].variables["scores"].value,
        Value::NumberList(vec![0.0, 0.0, 0.0])
    );
    let last = container.frames.last().unwrap();
    assert_eq!(last.variables["scores"].value, Value::NumberList(vec![0.0, 7.0, 0.0]));
}

#[test_log::test]
fn unknown_and_malformed_blocks_are_skipped() {
    let blocks = vec![
        arduino_loop(1).input("loop", "a").build(),
        block("a", "STATEMENT", "led").field("PIN", "13").field("STATE", "ON").next("servo").build(),
        block("servo", "STATEMENT", "servo_move").field("DEGREE", "90").next("broken").build(),
        block("broken", "STATEMENT", "led").field("PIN", "13").next("c").build(),
        block("c", "STATEMENT", "led").field("PIN", "13").field("STATE", "OFF").build(),
    ];
    let container = Engine::event_to_frames(&event(blocks), None);
    assert!(!container.error);
    let names: Vec<&str> = container.frames.iter().map(|f| f.block_id.as_str()).collect();
    assert_eq!(names, vec!["loop", "a", "c"]);
}

#[test_log::test]
fn missing_loop_count_means_no_loop_frames() {
    let blocks = vec![
        block("loop", "ARDUINO", "arduino_loop").build(),
        block("led", "SETUP", "led_setup").field("PIN", "13").build(),
    ];
    let container = Engine::event_to_frames(&event(blocks), None);
    assert!(!container.error);
    assert_eq!(container.frames.len(), 1);
}

#[test_log::test]
fn duplicate_loop_blocks_are_an_error() {
    let blocks = vec![
        arduino_loop(2).build(),
        block("loop2", "ARDUINO", "arduino_loop").field("LOOP_TIMES", "1").build(),
    ];
    let container = Engine::event_to_frames(&event(blocks), None);
    assert!(container.error);
    assert!(container.frames.is_empty());
}

#[test_log::test]
fn duplicate_ids_are_an_error() {
    let blocks = vec![
        block("x", "SETUP", "led_setup").field("PIN", "13").build(),
        block("x", "SETUP", "led_setup").field("PIN", "12").build(),
    ];
    assert!(Engine::event_to_frames(&event(blocks), None).error);
}

#[test_log::test]
fn statement_cycles_are_an_error() {
    let blocks = vec![
        arduino_loop(1).input("loop", "a").build(),
        block("a", "STATEMENT", "led").field("PIN", "13").field("STATE", "ON").next("b").build(),
        block("b", "STATEMENT", "led").field("PIN", "13").field("STATE", "OFF").next("a").build(),
    ];
    let container = Engine::event_to_frames(&event(blocks), None);
    assert!(container.error);
    assert!(container.frames.is_empty());
}

#[test_log::test]
fn duplicate_setup_blocks_are_an_error() {
    let blocks = vec![
        arduino_setup().build(),
        block("setup2", "ARDUINO", "arduino_setup").build(),
        arduino_loop(1).build(),
    ];
    let container = Engine::event_to_frames(&event(blocks), None);
    assert!(container.error);
    assert!(container.frames.is_empty());
}

#[test_log::test]
fn value_cycles_are_an_error() {
    let blocks = vec![
        arduino_loop(1).input("loop", "if").build(),
        block("if", "STATEMENT", "controls_if").input("IF0", "compare").build(),
        block("compare", "VALUE", "logic_compare")
            .field("OP", "EQ")
            .input("A", "compare")
            .input("B", "one")
            .build(),
        number("one", 1.0),
    ];
    let container = Engine::event_to_frames(&event(blocks), None);
    assert!(container.error);
    assert!(container.frames.is_empty());
}

#[test_log::test]
fn deeply_nested_statements_are_an_error() {
    const DEPTH: usize = 5_000;
    let mut blocks = vec![
        arduino_loop(1).input("loop", "if0").build(),
        block("yes", "VALUE", "logic_boolean").field("BOOL", "TRUE").build(),
        block("on", "STATEMENT", "led").field("PIN", "13").field("STATE", "ON").build(),
    ];
    for i in 0..DEPTH {
        let body = if i + 1 < DEPTH { format!("if{}", i + 1) } else { "on".to_string() };
        blocks.push(
            block(&format!("if{i}"), "STATEMENT", "controls_if")
                .input("IF0", "yes")
                .input("DO0", &body)
                .build(),
        );
    }
    let container = Engine::event_to_frames(&event(blocks), None);
    assert!(container.error);
    assert!(container.frames.is_empty());
}

#[test_log::test]
fn moderately_nested_statements_run() {
    let blocks = vec![
        arduino_loop(1).input("loop", "outer").build(),
        block("outer", "STATEMENT", "controls_repeat_ext")
            .input("TIMES", "two")
            .input("DO", "inner")
            .build(),
        block("inner", "STATEMENT", "controls_if")
            .input("IF0", "yes")
            .input("DO0", "on")
            .build(),
        number("two", 2.0),
        block("yes", "VALUE", "logic_boolean").field("BOOL", "TRUE").build(),
        block("on", "STATEMENT", "led").field("PIN", "13").field("STATE", "ON").build(),
    ];
    let container = Engine::event_to_frames(&event(blocks), None);
    assert!(!container.error);
    assert_eq!(container.frames.len(), 7);
}

#[test_log::test]
fn oversized_lists_are_skipped() {
    let blocks = vec![
        block("list", "LIST_CREATE", "create_list_number_block")
            .field("VAR", "l1")
            .field("SIZE", "4000000000")
            .build(),
        block("small", "LIST_CREATE", "create_list_number_block")
            .field("VAR", "l2")
            .field("SIZE", "1024")
            .build(),
        arduino_loop(1).build(),
    ];
    let variables = json!([
        { "id": "l1", "name": "huge", "type": "List Number" },
        { "id": "l2", "name": "fits", "type": "List Number" }
    ]);
    let container = Engine::event_to_frames(&event_with_variables(blocks, variables), None);
    assert!(!container.error);

    let names: Vec<&str> = container.frames.iter().map(|f| f.block_id.as_str()).collect();
    assert_eq!(names, vec!["small", "loop"]);
    let last = container.frames.last().unwrap();
    assert!(!last.variables.contains_key("huge"));
    assert_eq!(last.variables["fits"].value, Value::NumberList(vec![0.0; 1024]));
}

#[test_log::test]
fn runaway_programs_hit_the_frame_limit() {
    let blocks = vec![
        arduino_loop(1).input("loop", "repeat").build(),
        block("repeat", "STATEMENT", "controls_repeat_ext")
            .input("TIMES", "many")
            .input("DO", "on")
            .build(),
        number("many", 1_000_000.0),
        block("on", "STATEMENT", "led").field("PIN", "13").field("STATE", "ON").build(),
    ];
    assert!(Engine::event_to_frames(&event(blocks), None).error);
}

#[test_log::test]
fn settings_are_forwarded() {
    let settings = Settings {
        frame_delay_ms: 10,
        ..Settings::default()
    };
    let container = Engine::event_to_frames(&event(Vec::new()), Some(settings.clone()));
    assert_eq!(container.settings, settings);
}

#[test_log::test]
fn container_serializes_for_the_renderer() {
    let blocks = vec![
        block("led", "SETUP", "led_setup").field("PIN", "13").build(),
        arduino_loop(1).build(),
    ];
    let container = Engine::event_to_frames(&event(blocks), None);
    let json = serde_json::to_value(&container).unwrap();

    assert_eq!(json["board"], "uno");
    assert_eq!(json["error"], false);
    assert_eq!(json["frames"][0]["timeline"]["function"], "pre-setup");
    assert_eq!(json["frames"][1]["timeline"], json!({ "iteration": 1, "function": "loop" }));
    assert_eq!(
        json["frames"][1]["components"][0],
        json!({ "type": "LED", "pin": "13", "isOn": false, "fade": 0 })
    );
    assert_eq!(json["settings"]["frameDelayMs"], 400);
}
