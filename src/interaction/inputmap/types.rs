use bevy::prelude::*;
use smallvec::SmallVec;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind { Binary, Axis1, Axis2 }

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActionId(pub u16); // internal index (array position)

#[derive(Debug, Clone)]
pub struct ActionMeta { pub id: ActionId, pub name: String, pub description: String, pub kind: ActionKind }

/// Device family that produced an action value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InputSource { #[default] Keyboard, Mouse, Gamepad }

#[derive(Default, Debug, Clone, Copy)]
pub struct ActionStateBinary { pub pressed: bool, pub just_pressed: bool, pub just_released: bool }
impl ActionStateBinary { pub fn clear_transitions(&mut self) { self.just_pressed = false; self.just_released = false; } }

#[derive(Default, Debug, Clone, Copy)]
pub struct ActionStateAxis1 { pub value: f32, pub active: bool, pub just_pressed: bool, pub just_released: bool, pub source: InputSource }
impl ActionStateAxis1 { pub fn clear_transitions(&mut self) { self.just_pressed = false; self.just_released = false; } }

/// `source` keeps the last device that drove the axis, even after release.
#[derive(Default, Debug, Clone, Copy)]
pub struct ActionStateAxis2 { pub value: Vec2, pub active: bool, pub just_pressed: bool, pub just_released: bool, pub source: InputSource }
impl ActionStateAxis2 { pub fn clear_transitions(&mut self) { self.just_pressed = false; self.just_released = false; } }

#[derive(Debug, Clone)]
pub enum ActionDynamicState { Binary(ActionStateBinary), Axis1(ActionStateAxis1), Axis2(ActionStateAxis2) }
impl ActionDynamicState {
    pub fn clear_transitions(&mut self) { match self { Self::Binary(b) => b.clear_transitions(), Self::Axis1(a) => a.clear_transitions(), Self::Axis2(a) => a.clear_transitions() } }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawBindingToken { Key(KeyCode), MouseBtn(MouseButton), PadBtn(GamepadButton) }
impl RawBindingToken {
    pub fn source(&self) -> InputSource { match self { Self::Key(_) => InputSource::Keyboard, Self::MouseBtn(_) => InputSource::Mouse, Self::PadBtn(_) => InputSource::Gamepad } }
}

/// Continuous 2D inputs sampled once per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalogSource { LeftStick, RightStick, MouseMotion }
impl AnalogSource {
    pub fn source(&self) -> InputSource { match self { Self::MouseMotion => InputSource::Mouse, _ => InputSource::Gamepad } }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisComponent { X, Y }

#[derive(Debug, Clone)]
pub struct Binding { pub id: u32, pub tokens: SmallVec<[RawBindingToken; 2]>, pub hold_secs: f32 }

#[derive(Debug, Default, Clone)]
pub struct BindingRuntime { pub active: bool, pub just_pressed: bool, pub just_released: bool, pub hold_elapsed: f32 }

/// Button pair driving an axis (`component` picks the Axis2 lane; ignored for Axis1).
#[derive(Debug, Clone)]
pub struct VirtualAxis { pub action: ActionId, pub pos: RawBindingToken, pub neg: RawBindingToken, pub scale: f32, pub component: AxisComponent }

/// Analog feed for an axis action. Axis1 targets read `component` of the sample.
#[derive(Debug, Clone)]
pub struct AnalogBinding { pub action: ActionId, pub source: AnalogSource, pub scale: f32, pub component: AxisComponent, pub invert_y: bool }

/// Raw device state for one frame, gathered by the collection system.
#[derive(Debug, Default, Clone)]
pub struct RawInputFrame { pub pressed: HashSet<RawBindingToken>, pub analog: HashMap<AnalogSource, Vec2> }
impl RawInputFrame {
    pub fn press(&mut self, token: RawBindingToken) -> &mut Self { self.pressed.insert(token); self }
    pub fn set_analog(&mut self, source: AnalogSource, value: Vec2) -> &mut Self { self.analog.insert(source, value); self }
}

#[derive(Resource, Debug, Default)]
pub struct InputMap {
    pub actions: Vec<ActionMeta>,
    pub name_to_id: HashMap<String, ActionId>,
    pub bindings_index: HashMap<ActionId, Vec<u32>>, // mapping to binding ids
    pub bindings: Vec<Binding>,
    pub bindings_runtime: Vec<BindingRuntime>,
    pub dynamic_states: Vec<ActionDynamicState>,
    pub virtual_axes: Vec<VirtualAxis>,
    pub analog_bindings: Vec<AnalogBinding>,
    /// Stick magnitudes below this read as zero.
    pub stick_deadzone: f32,
    pub frame_counter: u64,
}

impl InputMap {
    pub fn get_state(&self, name: &str) -> Option<&ActionDynamicState> { self.name_to_id.get(name).map(|id| &self.dynamic_states[id.0 as usize]) }
    pub fn pressed(&self, name: &str) -> bool { match self.get_state(name) { Some(ActionDynamicState::Binary(b)) => b.pressed, Some(ActionDynamicState::Axis1(a)) => a.active, Some(ActionDynamicState::Axis2(a)) => a.active, None => false } }
    pub fn just_pressed(&self, name: &str) -> bool { match self.get_state(name) { Some(ActionDynamicState::Binary(b)) => b.just_pressed, Some(ActionDynamicState::Axis1(a)) => a.just_pressed, Some(ActionDynamicState::Axis2(a)) => a.just_pressed, None => false } }
    pub fn just_released(&self, name: &str) -> bool { match self.get_state(name) { Some(ActionDynamicState::Binary(b)) => b.just_released, Some(ActionDynamicState::Axis1(a)) => a.just_released, Some(ActionDynamicState::Axis2(a)) => a.just_released, None => false } }
    pub fn axis1(&self, name: &str) -> f32 { match self.get_state(name) { Some(ActionDynamicState::Axis1(a)) => a.value, _ => 0.0 } }
    pub fn axis2(&self, name: &str) -> Vec2 { match self.get_state(name) { Some(ActionDynamicState::Axis2(a)) => a.value, _ => Vec2::ZERO } }
    /// Last device that drove an axis action (keyboard if never driven).
    pub fn axis_source(&self, name: &str) -> InputSource { match self.get_state(name) { Some(ActionDynamicState::Axis1(a)) => a.source, Some(ActionDynamicState::Axis2(a)) => a.source, _ => InputSource::Keyboard } }
}
