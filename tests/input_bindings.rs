use std::fs;

use bevy::prelude::*;
use udder_plunder::interaction::inputmap::parse::parse_input_toml;
use udder_plunder::interaction::inputmap::types::{ActionKind, AnalogSource, RawBindingToken, RawInputFrame};
use udder_plunder::interaction::inputmap::InputSource;

fn shipped() -> udder_plunder::interaction::inputmap::InputMap {
    let raw = fs::read_to_string("assets/config/input.toml").expect("input.toml present");
    let parsed = parse_input_toml(&raw);
    assert!(parsed.errors.is_empty(), "{:?}", parsed.errors);
    parsed.input_map
}

#[test]
fn shipped_bindings_cover_control_scheme() {
    let map = shipped();
    for (name, kind) in [
        ("Move", ActionKind::Axis2),
        ("Rotate", ActionKind::Axis1),
        ("Beam", ActionKind::Binary),
        ("Drop", ActionKind::Binary),
        ("Place", ActionKind::Binary),
        ("Mode", ActionKind::Binary),
    ] {
        let id = map.name_to_id.get(name).unwrap_or_else(|| panic!("missing action {name}"));
        assert_eq!(map.actions[id.0 as usize].kind, kind, "{name}");
    }
}

#[test]
fn every_beam_device_triggers_beam() {
    let tokens = [
        RawBindingToken::Key(KeyCode::Space),
        RawBindingToken::MouseBtn(MouseButton::Right),
        RawBindingToken::PadBtn(GamepadButton::RightTrigger),
        RawBindingToken::PadBtn(GamepadButton::RightTrigger2),
    ];
    for token in tokens {
        let mut map = shipped();
        let mut frame = RawInputFrame::default();
        frame.press(token);
        map.apply_frame(&frame, 0.016);
        assert!(map.just_pressed("Beam"), "{token:?}");
    }
}

#[test]
fn mouse_motion_moves_with_mouse_source() {
    let mut map = shipped();
    let mut frame = RawInputFrame::default();
    // Screen-space: pushing the mouse away from you is negative y.
    frame.set_analog(AnalogSource::MouseMotion, Vec2::new(0.0, -5.0));
    map.apply_frame(&frame, 0.016);
    let v = map.axis2("Move");
    assert!(v.y > 0.0 && v.length() <= 1.0 + 1e-6, "{v:?}");
    assert_eq!(map.axis_source("Move"), InputSource::Mouse);
}

#[test]
fn rotate_keys_drive_axis() {
    let mut map = shipped();
    let mut frame = RawInputFrame::default();
    frame.press(RawBindingToken::Key(KeyCode::KeyA));
    map.apply_frame(&frame, 0.016);
    assert_eq!(map.axis1("Rotate"), -1.0);
}
