//! Systems for input action evaluation.
use bevy::input::gamepad::Gamepad;
use bevy::input::mouse::MouseMotion;
use bevy::prelude::*;

use super::types::*;

const SLOT_SOURCES: [InputSource; 3] = [InputSource::Keyboard, InputSource::Mouse, InputSource::Gamepad];

fn slot(source: InputSource) -> usize { match source { InputSource::Keyboard => 0, InputSource::Mouse => 1, InputSource::Gamepad => 2 } }

impl InputMap {
    /// Advance every action by one frame of raw device state.
    ///
    /// Binary actions follow their bindings (chords and hold qualifiers included).
    /// Axis actions sum contributions per device family and keep the strongest
    /// family, so a resting stick never masks the keyboard. Axis2 values are
    /// clamped to unit length, Axis1 values to `[-1, 1]`.
    pub fn apply_frame(&mut self, frame: &RawInputFrame, dt: f32) {
        self.frame_counter += 1;
        for st in &mut self.dynamic_states { st.clear_transitions(); }

        if self.bindings_runtime.len() < self.bindings.len() { self.bindings_runtime.resize(self.bindings.len(), BindingRuntime::default()); }
        for (binding, rt) in self.bindings.iter().zip(self.bindings_runtime.iter_mut()) {
            rt.just_pressed = false; rt.just_released = false;
            let all_active = binding.tokens.iter().all(|t| frame.pressed.contains(t));
            if all_active { if !rt.active { rt.active = true; rt.just_pressed = true; rt.hold_elapsed = 0.0; } else { rt.hold_elapsed += dt; } }
            else if rt.active { rt.active = false; rt.just_released = true; }
        }

        let mut binary_now = vec![false; self.actions.len()];
        for (aid, bids) in &self.bindings_index {
            for bid in bids {
                let (binding, rt) = (&self.bindings[*bid as usize], &self.bindings_runtime[*bid as usize]);
                let meets_hold = binding.hold_secs <= 0.0 || rt.hold_elapsed >= binding.hold_secs;
                if rt.active && meets_hold { binary_now[aid.0 as usize] = true; }
            }
        }

        let mut accum: Vec<[Vec2; 3]> = vec![[Vec2::ZERO; 3]; self.actions.len()];
        for va in &self.virtual_axes {
            let mut v = 0.0;
            if frame.pressed.contains(&va.pos) { v += 1.0; }
            if frame.pressed.contains(&va.neg) { v -= 1.0; }
            if v == 0.0 { continue; }
            let lane = match (self.actions[va.action.0 as usize].kind, va.component) { (ActionKind::Axis2, AxisComponent::Y) => Vec2::new(0.0, v * va.scale), _ => Vec2::new(v * va.scale, 0.0) };
            accum[va.action.0 as usize][slot(va.pos.source())] += lane;
        }
        for ab in &self.analog_bindings {
            let Some(mut raw) = frame.analog.get(&ab.source).copied() else { continue; };
            if ab.source != AnalogSource::MouseMotion && raw.length() < self.stick_deadzone { continue; }
            if ab.invert_y { raw.y = -raw.y; }
            raw *= ab.scale;
            let contrib = match self.actions[ab.action.0 as usize].kind { ActionKind::Axis2 => raw, _ => Vec2::new(match ab.component { AxisComponent::X => raw.x, AxisComponent::Y => raw.y }, 0.0) };
            accum[ab.action.0 as usize][slot(ab.source.source())] += contrib;
        }

        for (idx, state) in self.dynamic_states.iter_mut().enumerate() {
            match state {
                ActionDynamicState::Binary(b) => {
                    let now = binary_now[idx];
                    if now && !b.pressed { b.just_pressed = true; }
                    if !now && b.pressed { b.just_released = true; }
                    b.pressed = now;
                }
                ActionDynamicState::Axis1(a) => {
                    let (value, source) = strongest(&accum[idx]);
                    let value = value.x.clamp(-1.0, 1.0);
                    let now = value != 0.0;
                    if now && !a.active { a.just_pressed = true; }
                    if !now && a.active { a.just_released = true; }
                    a.value = value; a.active = now;
                    if now { a.source = source; }
                }
                ActionDynamicState::Axis2(a) => {
                    let (value, source) = strongest(&accum[idx]);
                    let value = value.clamp_length_max(1.0);
                    let now = value != Vec2::ZERO;
                    if now && !a.active { a.just_pressed = true; }
                    if !now && a.active { a.just_released = true; }
                    a.value = value; a.active = now;
                    if now { a.source = source; }
                }
            }
        }
    }
}

fn strongest(slots: &[Vec2; 3]) -> (Vec2, InputSource) {
    let mut best = (Vec2::ZERO, InputSource::Keyboard);
    for (i, v) in slots.iter().enumerate() { if v.length_squared() > best.0.length_squared() { best = (*v, SLOT_SOURCES[i]); } }
    best
}

pub fn system_collect_inputs(
    time: Res<Time>,
    keyboard: Res<ButtonInput<KeyCode>>,
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    mut motion_evr: EventReader<MouseMotion>,
    gamepads: Query<&Gamepad>,
    mut input_map: ResMut<InputMap>,
) {
    let mut frame = RawInputFrame::default();
    for k in keyboard.get_pressed() { frame.press(RawBindingToken::Key(*k)); }
    for b in mouse_buttons.get_pressed() { frame.press(RawBindingToken::MouseBtn(*b)); }
    let mut mouse_delta = Vec2::ZERO; for ev in motion_evr.read() { mouse_delta += ev.delta; }
    if mouse_delta != Vec2::ZERO { frame.set_analog(AnalogSource::MouseMotion, mouse_delta); }

    // Several pads: the one pushed furthest wins per stick.
    let (mut left, mut right) = (Vec2::ZERO, Vec2::ZERO);
    for pad in &gamepads {
        for b in pad.get_pressed() { frame.press(RawBindingToken::PadBtn(*b)); }
        let (l, r) = (pad.left_stick(), pad.right_stick());
        if l.length_squared() > left.length_squared() { left = l; }
        if r.length_squared() > right.length_squared() { right = r; }
    }
    if left != Vec2::ZERO { frame.set_analog(AnalogSource::LeftStick, left); }
    if right != Vec2::ZERO { frame.set_analog(AnalogSource::RightStick, right); }

    input_map.apply_frame(&frame, time.delta_secs());
}
