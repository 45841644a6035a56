use bevy::prelude::*;
use serde::Deserialize;
use std::{fs, path::Path};

use crate::geometry::cone::{BeamShapeParams, MIN_BEAM_SEGMENTS};
use crate::physics::magnet::falloff::MagnetParams;

#[derive(Debug, Deserialize, Resource, Clone, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub width: f32,
    pub height: f32,
    pub title: String,
}
impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            title: "Udder Plunder".into(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct UfoConfig {
    /// Top speed when driven by a stick or keys (smoothed).
    pub gamepad_move_speed: f32,
    /// Speed applied instantly when driven by mouse motion.
    pub mouse_move_speed: f32,
    pub fixed_y: f32,
    /// Smoothing time (seconds) for stick / key acceleration.
    pub acceleration_time: f32,
}
impl Default for UfoConfig {
    fn default() -> Self {
        Self {
            gamepad_move_speed: 5.0,
            mouse_move_speed: 10.0,
            fixed_y: 2.0,
            acceleration_time: 0.2,
        }
    }
}

/// Island confinement. `policy` is `"Circle"` (uses `radius`) or `"Square"`
/// (uses `half_extent`).
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct IslandConfig {
    pub policy: String,
    pub center: [f32; 3],
    pub radius: f32,
    pub half_extent: f32,
}
impl Default for IslandConfig {
    fn default() -> Self {
        Self {
            policy: "Circle".into(),
            center: [0.0, 0.0, 0.0],
            radius: 15.0,
            half_extent: 15.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct BeamConfig {
    pub segments: u32,
    pub length: f32,
    pub half_angle_deg: f32,
    /// sRGBA components in 0..1.
    pub color: [f32; 4],
}
impl Default for BeamConfig {
    fn default() -> Self {
        Self {
            segments: 20,
            length: 5.0,
            half_angle_deg: 45.0,
            color: [0.0, 1.0, 1.0, 0.5],
        }
    }
}
impl BeamConfig {
    pub fn shape_params(&self) -> BeamShapeParams {
        let [r, g, b, a] = self.color;
        BeamShapeParams {
            segments: self.segments,
            length: self.length,
            half_angle_deg: self.half_angle_deg,
            color: Color::srgba(r, g, b, a),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct RotatorConfig {
    /// Degrees per second at full input.
    pub rotation_speed: f32,
    pub rotation_smooth_time: f32,
}
impl Default for RotatorConfig {
    fn default() -> Self {
        Self {
            rotation_speed: 30.0,
            rotation_smooth_time: 0.2,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct BuildingConfig {
    pub cell_size: [f32; 3],
    pub grid_origin: [f32; 3],
    pub building_size: [f32; 3],
    pub color: [f32; 4],
}
impl Default for BuildingConfig {
    fn default() -> Self {
        Self {
            cell_size: [2.0, 1.0, 2.0],
            grid_origin: [0.0, 0.0, 0.0],
            building_size: [1.6, 1.2, 1.6],
            color: [0.8, 0.55, 0.35, 1.0],
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct CowSpawnConfig {
    pub count: usize,
    pub spawn_radius: f32,
    pub drop_height: f32,
    pub half_size: [f32; 3],
    pub seed: Option<u64>,
}
impl Default for CowSpawnConfig {
    fn default() -> Self {
        Self {
            count: 12,
            spawn_radius: 12.0,
            drop_height: 0.5,
            half_size: [0.5, 0.35, 0.25],
            seed: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct PhysicsConfig {
    pub gravity_y: f32,
    pub rapier_debug: bool,
}
impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity_y: -9.81,
            rapier_debug: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    /// Mixer parameter driven by the music slider.
    pub mixer_parameter: String,
    /// Slider value used when nothing has been persisted yet.
    pub default_music_volume: f32,
    pub slider_step: f32,
    pub settings_path: String,
    /// Looping background track (asset path); `None` plays nothing.
    pub music_track: Option<String>,
}
impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            mixer_parameter: "Volume".into(),
            default_music_volume: 1.0,
            slider_step: 0.1,
            settings_path: "settings/player_prefs.json".into(),
            music_track: None,
        }
    }
}

#[derive(Debug, Deserialize, Resource, Clone, PartialEq, Default)]
#[serde(default)]
pub struct GameConfig {
    pub window: WindowConfig,
    pub ufo: UfoConfig,
    pub island: IslandConfig,
    pub beam: BeamConfig,
    pub magnet: MagnetParams,
    pub rotator: RotatorConfig,
    pub building: BuildingConfig,
    pub cows: CowSpawnConfig,
    pub physics: PhysicsConfig,
    pub audio: AudioConfig,
}

impl GameConfig {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, String> {
        let data = fs::read_to_string(&path).map_err(|e| format!("read config: {e}"))?;
        ron::from_str(&data).map_err(|e| format!("parse RON: {e}"))
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> (Self, Option<String>) {
        match Self::load_from_file(&path) {
            Ok(cfg) => (cfg, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    /// Merge several RON files in order (later keys override earlier ones) and
    /// deserialize the result. Returns the config, the files that were read and
    /// any read / parse errors encountered along the way.
    pub fn load_layered<P, I>(paths: I) -> (Self, Vec<String>, Vec<String>)
    where
        P: AsRef<Path>,
        I: IntoIterator<Item = P>,
    {
        use ron::value::Value;
        let mut merged: Option<Value> = None;
        let mut used = Vec::new();
        let mut errors = Vec::new();
        fn merge_value(base: &mut Value, overlay: Value) {
            match (base, overlay) {
                (Value::Map(bm), Value::Map(om)) => {
                    for (k, v) in om.into_iter() {
                        if let Some((_, ev)) = bm.iter_mut().find(|(ek, _)| **ek == k) {
                            merge_value(ev, v);
                            continue;
                        }
                        bm.insert(k, v);
                    }
                }
                (b, o) => *b = o,
            }
        }
        for p in paths {
            let path_ref = p.as_ref();
            match fs::read_to_string(path_ref) {
                Ok(txt) => match ron::from_str::<Value>(&txt) {
                    Ok(val) => {
                        if let Some(cur) = &mut merged {
                            merge_value(cur, val);
                        } else {
                            merged = Some(val);
                        }
                        used.push(path_ref.as_os_str().to_string_lossy().to_string());
                    }
                    Err(e) => errors.push(format!("{}: parse error: {e}", path_ref.display())),
                },
                Err(e) => errors.push(format!("{}: read error: {e}", path_ref.display())),
            }
        }
        match merged {
            Some(val) => match val.into_rust::<GameConfig>() {
                Ok(cfg) => (cfg, used, errors),
                Err(e) => {
                    errors.push(format!("failed to deserialize merged config; using defaults: {e}"));
                    (GameConfig::default(), used, errors)
                }
            },
            None => (GameConfig::default(), used, errors),
        }
    }

    pub fn validate(&self) -> Vec<String> {
        let mut w = Vec::new();
        if self.window.width <= 0.0 || self.window.height <= 0.0 {
            w.push("window dimensions must be > 0".into());
        }
        let u = &self.ufo;
        if u.gamepad_move_speed <= 0.0 || u.mouse_move_speed <= 0.0 {
            w.push(format!(
                "ufo move speeds must be > 0 (gamepad {}, mouse {})",
                u.gamepad_move_speed, u.mouse_move_speed
            ));
        }
        if u.acceleration_time < 0.0 {
            w.push(format!("ufo.acceleration_time {} negative -> treated as 0", u.acceleration_time));
        }
        match self.island.policy.as_str() {
            "Circle" => {
                if self.island.radius <= 0.0 {
                    w.push("island.radius must be > 0 for the Circle policy".into());
                }
            }
            "Square" => {
                if self.island.half_extent <= 0.0 {
                    w.push("island.half_extent must be > 0 for the Square policy".into());
                }
            }
            other => w.push(format!("island.policy '{other}' unknown (expected Circle|Square); using Circle")),
        }
        if self.beam.segments < MIN_BEAM_SEGMENTS {
            w.push(format!("beam.segments {} < {MIN_BEAM_SEGMENTS}; beam will not be built", self.beam.segments));
        }
        if self.beam.length <= 0.0 {
            w.push(format!("beam.length {} must be > 0", self.beam.length));
        }
        if !(self.beam.half_angle_deg > 0.0 && self.beam.half_angle_deg < 90.0) {
            w.push(format!("beam.half_angle_deg {} outside (0, 90)", self.beam.half_angle_deg));
        }
        if self.beam.half_angle_deg >= 80.0 && self.beam.half_angle_deg < 90.0 {
            w.push(format!(
                "beam.half_angle_deg {} very wide; base radius {:.1}",
                self.beam.half_angle_deg,
                self.beam.shape_params().base_radius()
            ));
        }
        if self.beam.color.iter().any(|c| !(0.0..=1.0).contains(c)) {
            w.push(format!("beam.color {:?} has components outside 0..1", self.beam.color));
        }
        let m = &self.magnet;
        if m.pull_force <= 0.0 {
            w.push("magnet.pull_force must be > 0".into());
        }
        if m.drop_speed_threshold <= 0.0 {
            w.push("magnet.drop_speed_threshold must be > 0".into());
        }
        if m.pull_radius <= 0.0 {
            w.push("magnet.pull_radius should be > 0".into());
        }
        if self.rotator.rotation_smooth_time < 0.0 {
            w.push("rotator.rotation_smooth_time negative -> treated as 0".into());
        }
        if self.building.cell_size.iter().any(|c| *c <= 0.0) {
            w.push(format!("building.cell_size {:?} must be > 0 on every axis", self.building.cell_size));
        }
        if self.cows.count > 2_000 {
            w.push(format!("cows.count {} very high; performance may suffer", self.cows.count));
        }
        if self.cows.spawn_radius < 0.0 {
            w.push("cows.spawn_radius negative".into());
        }
        if !(0.0..=1.0).contains(&self.audio.default_music_volume) {
            w.push(format!(
                "audio.default_music_volume {} outside 0..1",
                self.audio.default_music_volume
            ));
        }
        if self.audio.slider_step <= 0.0 || self.audio.slider_step > 1.0 {
            w.push(format!("audio.slider_step {} outside (0, 1]", self.audio.slider_step));
        }
        w
    }
}

/// What happened while loading config and settings, logged once the log plugin is up.
#[derive(Resource, Debug, Default, Clone)]
pub struct ConfigLoadReport {
    pub used: Vec<String>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

pub fn log_config_report(report: Option<Res<ConfigLoadReport>>) {
    let Some(report) = report else { return; };
    for e in &report.errors {
        warn!(target: "config", "CONFIG LOAD ISSUE: {e}");
    }
    if report.used.is_empty() {
        info!(target: "config", "No config layers found; using defaults");
    } else {
        info!(target: "config", "Config layers loaded: {:?}", report.used);
    }
    for w in &report.warnings {
        warn!(target: "config", "CONFIG WARNING: {w}");
    }
}
