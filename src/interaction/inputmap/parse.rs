use super::types::*;
use bevy::prelude::*;
use smallvec::SmallVec;
use std::collections::{HashMap, HashSet};

/// Default stick deadzone when the config omits `[gamepad]`.
pub const DEFAULT_STICK_DEADZONE: f32 = 0.15;

#[derive(Debug, Default)]
pub struct ParsedInputConfig { pub input_map: InputMap, pub errors: Vec<String> }

#[derive(Debug, serde::Deserialize)]
struct ActionDecl { description: Option<String>, kind: Option<String> }

#[derive(Debug, serde::Deserialize)]
struct VirtualAxisToml { name: String, pos: String, neg: String, scale: Option<f32>, component: Option<String> }

#[derive(Debug, serde::Deserialize)]
struct AnalogToml { action: String, source: String, scale: Option<f32>, component: Option<String>, invert_y: Option<bool> }

#[derive(Debug, serde::Deserialize)]
struct GamepadToml { deadzone: Option<f32> }

#[derive(Debug, serde::Deserialize)]
struct RootToml { actions: Option<HashMap<String, ActionDecl>>, bindings: Option<HashMap<String, Vec<String>>>, virtual_axes: Option<Vec<VirtualAxisToml>>, analog: Option<Vec<AnalogToml>>, gamepad: Option<GamepadToml> }

pub fn parse_input_toml(raw: &str) -> ParsedInputConfig {
    let mut result = ParsedInputConfig::default();
    let root: RootToml = match toml::from_str(raw) { Ok(r) => r, Err(e) => { result.errors.push(format!("Top-level parse: {e}")); return result; } };

    // Sort by name so action ids are stable across runs.
    let mut decls: Vec<(String, ActionDecl)> = root.actions.unwrap_or_default().into_iter().collect();
    decls.sort_by(|a, b| a.0.cmp(&b.0));
    let mut actions: Vec<ActionMeta> = Vec::new();
    let mut name_to_id = HashMap::new();
    for (name, decl) in decls {
        if !validate_action_name(&name) { result.errors.push(format!("Invalid action name '{}': must be PascalCase", name)); continue; }
        let kind = match decl.kind.as_deref().unwrap_or("Binary") { "Binary" => ActionKind::Binary, "Axis1" => ActionKind::Axis1, "Axis2" => ActionKind::Axis2, other => { result.errors.push(format!("Action {} unknown kind '{}': expected Binary|Axis1|Axis2", name, other)); ActionKind::Binary } };
        let id = ActionId(actions.len() as u16);
        actions.push(ActionMeta { id, name: name.clone(), description: decl.description.unwrap_or_default(), kind });
        name_to_id.insert(name, id);
    }

    let dynamic_states: Vec<ActionDynamicState> = actions.iter().map(|meta| match meta.kind {
        ActionKind::Binary => ActionDynamicState::Binary(ActionStateBinary::default()),
        ActionKind::Axis1 => ActionDynamicState::Axis1(ActionStateAxis1::default()),
        ActionKind::Axis2 => ActionDynamicState::Axis2(ActionStateAxis2::default()),
    }).collect();

    let deadzone = root.gamepad.and_then(|g| g.deadzone).unwrap_or(DEFAULT_STICK_DEADZONE);
    let mut input_map = InputMap { actions, name_to_id, dynamic_states, stick_deadzone: deadzone, ..Default::default() };

    let mut bindings: Vec<(String, Vec<String>)> = root.bindings.unwrap_or_default().into_iter().collect();
    bindings.sort_by(|a, b| a.0.cmp(&b.0));
    let mut binding_id: u32 = 0;
    for (action_name, list) in bindings {
        let Some(aid) = input_map.name_to_id.get(&action_name).copied() else { result.errors.push(format!("Binding references unknown action '{}'", action_name)); continue; };
        for spec in &list {
            match parse_binding(spec) {
                Ok((tokens, hold)) => { input_map.bindings_index.entry(aid).or_default().push(binding_id); input_map.bindings.push(Binding { id: binding_id, tokens, hold_secs: hold }); binding_id += 1; }
                Err(err) => result.errors.push(format!("[binding {} '{}'] {err}", action_name, spec)),
            }
        }
    }
    input_map.bindings_runtime = vec![BindingRuntime::default(); input_map.bindings.len()];

    for va in root.virtual_axes.unwrap_or_default() {
        let Some(aid) = axis_action(&input_map, &va.name, &mut result.errors) else { continue; };
        let component = match parse_component(va.component.as_deref()) { Ok(c) => c, Err(e) => { result.errors.push(format!("VirtualAxis '{}': {e}", va.name)); continue; } };
        match (parse_token(&va.pos), parse_token(&va.neg)) {
            (Ok(pos), Ok(neg)) => input_map.virtual_axes.push(VirtualAxis { action: aid, pos, neg, scale: va.scale.unwrap_or(1.0), component }),
            (Err(e), _) => result.errors.push(format!("VirtualAxis pos error '{}': {e}", va.name)),
            (_, Err(e)) => result.errors.push(format!("VirtualAxis neg error '{}': {e}", va.name)),
        }
    }

    for an in root.analog.unwrap_or_default() {
        let Some(aid) = axis_action(&input_map, &an.action, &mut result.errors) else { continue; };
        let source = match parse_analog_source(&an.source) { Ok(s) => s, Err(e) => { result.errors.push(format!("Analog '{}': {e}", an.action)); continue; } };
        let component = match parse_component(an.component.as_deref()) { Ok(c) => c, Err(e) => { result.errors.push(format!("Analog '{}': {e}", an.action)); continue; } };
        input_map.analog_bindings.push(AnalogBinding { action: aid, source, scale: an.scale.unwrap_or(1.0), component, invert_y: an.invert_y.unwrap_or(false) });
    }

    result.input_map = input_map; result
}

fn axis_action(map: &InputMap, name: &str, errors: &mut Vec<String>) -> Option<ActionId> {
    let Some(aid) = map.name_to_id.get(name).copied() else { errors.push(format!("Axis source references unknown action '{}'", name)); return None; };
    if map.actions[aid.0 as usize].kind == ActionKind::Binary { errors.push(format!("Axis source targets Binary action '{}'", name)); return None; }
    Some(aid)
}

fn validate_action_name(name: &str) -> bool { let bytes = name.as_bytes(); if bytes.is_empty() { return false; } if !bytes[0].is_ascii_uppercase() { return false; } !name.chars().any(|c| !c.is_ascii_alphanumeric()) }

fn parse_component(s: Option<&str>) -> Result<AxisComponent, String> { match s.unwrap_or("X") { "X" => Ok(AxisComponent::X), "Y" => Ok(AxisComponent::Y), other => Err(format!("Unknown axis component '{}' (expected X|Y)", other)) } }

fn parse_analog_source(s: &str) -> Result<AnalogSource, String> { match s { "Pad:LeftStick" => Ok(AnalogSource::LeftStick), "Pad:RightStick" => Ok(AnalogSource::RightStick), "Mouse:Motion" => Ok(AnalogSource::MouseMotion), other => Err(format!("Unrecognized analog source '{}'", other)) } }

pub(crate) fn parse_binding(spec: &str) -> Result<(SmallVec<[RawBindingToken; 2]>, f32), String> {
    let mut tokens: SmallVec<[RawBindingToken; 2]> = SmallVec::new(); let mut hold: f32 = 0.0; let mut seen: HashSet<RawBindingToken> = HashSet::new();
    for part in spec.split('+') {
        let p = part.trim(); if p.is_empty() { continue; }
        let token_str = if let Some(rest) = p.strip_prefix("hold>") { let mut it = rest.splitn(2, ':'); let secs_str = it.next().ok_or_else(|| format!("Malformed hold qualifier '{}': missing seconds", p))?; let after = it.next().ok_or_else(|| format!("Malformed hold qualifier '{}': missing ':'", p))?; hold = secs_str.parse::<f32>().map_err(|_| format!("Invalid hold seconds '{}'", secs_str))?; after } else { p };
        let token = parse_token(token_str)?; if !seen.insert(token) { return Err(format!("Duplicate token in chord: {:?}", token)); } tokens.push(token);
    }
    if tokens.is_empty() { return Err("Empty binding".into()); }
    Ok((tokens, hold))
}

pub(crate) fn parse_token(s: &str) -> Result<RawBindingToken, String> {
    if let Some(rest) = s.strip_prefix("Key:") { return parse_keycode(rest); }
    if let Some(rest) = s.strip_prefix("Mouse:") { return match rest { "Left" => Ok(RawBindingToken::MouseBtn(MouseButton::Left)), "Right" => Ok(RawBindingToken::MouseBtn(MouseButton::Right)), "Middle" => Ok(RawBindingToken::MouseBtn(MouseButton::Middle)), other => Err(format!("Unknown mouse button '{}'", other)) }; }
    if let Some(rest) = s.strip_prefix("Pad:") { return parse_pad_button(rest); }
    Err(format!("Unrecognized token '{}'", s))
}

fn parse_pad_button(name: &str) -> Result<RawBindingToken, String> {
    let b = match name {
        "South" => GamepadButton::South, "East" => GamepadButton::East, "North" => GamepadButton::North, "West" => GamepadButton::West,
        "LeftShoulder" => GamepadButton::LeftTrigger, "RightShoulder" => GamepadButton::RightTrigger,
        "LeftTrigger" => GamepadButton::LeftTrigger2, "RightTrigger" => GamepadButton::RightTrigger2,
        "Select" => GamepadButton::Select, "Start" => GamepadButton::Start,
        "DPadUp" => GamepadButton::DPadUp, "DPadDown" => GamepadButton::DPadDown, "DPadLeft" => GamepadButton::DPadLeft, "DPadRight" => GamepadButton::DPadRight,
        other => return Err(format!("Unsupported gamepad button '{}'", other)),
    };
    Ok(RawBindingToken::PadBtn(b))
}

fn parse_keycode(name: &str) -> Result<RawBindingToken, String> {
    use bevy::input::keyboard::KeyCode;
    let kc = match name {
        "Space" => KeyCode::Space, "Enter" => KeyCode::Enter, "Escape" => KeyCode::Escape, "Tab" => KeyCode::Tab,
        "ShiftLeft" => KeyCode::ShiftLeft, "ControlLeft" => KeyCode::ControlLeft, "F1" => KeyCode::F1,
        "ArrowUp" => KeyCode::ArrowUp, "ArrowDown" => KeyCode::ArrowDown, "ArrowLeft" => KeyCode::ArrowLeft, "ArrowRight" => KeyCode::ArrowRight,
        "A" | "KeyA" => KeyCode::KeyA, "B" | "KeyB" => KeyCode::KeyB, "C" | "KeyC" => KeyCode::KeyC, "D" | "KeyD" => KeyCode::KeyD,
        "E" | "KeyE" => KeyCode::KeyE, "F" | "KeyF" => KeyCode::KeyF, "G" | "KeyG" => KeyCode::KeyG, "M" | "KeyM" => KeyCode::KeyM,
        "Q" | "KeyQ" => KeyCode::KeyQ, "R" | "KeyR" => KeyCode::KeyR, "S" | "KeyS" => KeyCode::KeyS, "W" | "KeyW" => KeyCode::KeyW,
        other => return Err(format!("Unsupported KeyCode '{}' (extend parser)", other)),
    };
    Ok(RawBindingToken::Key(kc))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [actions.Move]
        kind = "Axis2"
        [actions.Beam]
        description = "Hold to beam"
        [actions.Rotate]
        kind = "Axis1"

        [bindings]
        Beam = ["Key:Space", "Pad:RightTrigger", "Key:Nope"]
        Ghost = ["Key:Space"]

        [[virtual_axes]]
        name = "Rotate"
        pos = "Key:D"
        neg = "Key:A"

        [[analog]]
        action = "Move"
        source = "Mouse:Motion"
        scale = 0.05
    "#;

    #[test]
    fn parses_actions_and_reports_bad_entries() {
        let parsed = parse_input_toml(SAMPLE);
        let map = &parsed.input_map;
        assert_eq!(map.actions.len(), 3);
        assert_eq!(map.bindings.len(), 2, "two valid Beam bindings");
        assert_eq!(map.virtual_axes.len(), 1);
        assert_eq!(map.analog_bindings.len(), 1);
        assert_eq!(map.stick_deadzone, DEFAULT_STICK_DEADZONE);
        let joined = parsed.errors.join("\n");
        assert!(joined.contains("Nope"), "{joined}");
        assert!(joined.contains("Ghost"), "{joined}");
    }

    #[test]
    fn action_ids_follow_sorted_names() {
        let map = parse_input_toml(SAMPLE).input_map;
        assert_eq!(map.name_to_id["Beam"], ActionId(0));
        assert_eq!(map.name_to_id["Move"], ActionId(1));
        assert_eq!(map.name_to_id["Rotate"], ActionId(2));
    }

    #[test]
    fn chord_with_hold_qualifier() {
        let (tokens, hold) = parse_binding("Key:ControlLeft + hold>0.5:Key:R").unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(hold, 0.5);
        assert!(parse_binding("Key:A + Key:A").is_err());
        assert!(parse_binding("   ").is_err());
    }

    #[test]
    fn analog_on_binary_action_rejected() {
        let raw = "[actions.Beam]\n[[analog]]\naction = \"Beam\"\nsource = \"Pad:LeftStick\"\n";
        let parsed = parse_input_toml(raw);
        assert!(parsed.input_map.analog_bindings.is_empty());
        assert_eq!(parsed.errors.len(), 1);
    }
}
