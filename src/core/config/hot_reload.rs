use bevy::prelude::*;
use std::{collections::HashMap, path::PathBuf, time::SystemTime};

use crate::core::config::GameConfig;
use crate::gameplay::building::LayoutGrid;
use crate::gameplay::confinement::ConfinementPolicy;
use crate::geometry::cone::generate_beam_cone;
use crate::physics::magnet::BeamMagnet;

#[derive(Resource, Debug, Clone)]
pub struct ConfigReloadSettings { pub paths: Vec<PathBuf>, pub interval_secs: f32 }
impl Default for ConfigReloadSettings { fn default() -> Self { Self { paths: vec![ PathBuf::from("assets/config/game.ron"), PathBuf::from("assets/config/game.local.ron"), ], interval_secs: 0.5 } } }
#[derive(Resource, Debug)]
struct ConfigReloadState { last_mod: HashMap<PathBuf, SystemTime>, timer: Timer }
impl FromWorld for ConfigReloadState { fn from_world(_world: &mut World) -> Self { Self { last_mod: HashMap::new(), timer: Timer::from_seconds(0.5, TimerMode::Repeating) } } }

/// Polls the config layers and applies edits to the running game: movement and
/// rotator tunables are read live, everything copied at spawn time is patched here.
pub struct ConfigHotReloadPlugin;
impl Plugin for ConfigHotReloadPlugin { fn build(&self, app: &mut App) { app.init_resource::<ConfigReloadSettings>().init_resource::<ConfigReloadState>().add_systems(Update, (poll_and_reload_config, apply_config_changes.after(poll_and_reload_config))); } }

fn poll_and_reload_config(
    time: Res<Time>,
    settings: Res<ConfigReloadSettings>,
    mut state: ResMut<ConfigReloadState>,
    mut cfg_res: ResMut<GameConfig>,
) {
    if (state.timer.duration().as_secs_f32() - settings.interval_secs).abs() > f32::EPSILON { state.timer.set_duration(std::time::Duration::from_secs_f32(settings.interval_secs.max(0.05))); }
    if !state.timer.tick(time.delta()).finished() { return; }
    use std::fs; use std::time::UNIX_EPOCH;
    // The first poll only records timestamps.
    let first = state.last_mod.is_empty();
    let mut dirty = false;
    for path in &settings.paths { if let Ok(meta) = fs::metadata(path) { if let Ok(mod_time) = meta.modified() { let entry = state.last_mod.entry(path.clone()).or_insert(UNIX_EPOCH); if mod_time > *entry { *entry = mod_time; dirty = true; } } } }
    if !dirty || first { return; }
    let (new_cfg, _used, errors) = GameConfig::load_layered(settings.paths.iter());
    for e in errors { warn!(target: "config", "CONFIG HOT-RELOAD issue: {e}"); }
    for w in new_cfg.validate() { warn!(target: "config", "CONFIG WARNING: {w}"); }
    if *cfg_res != new_cfg { info!(target: "config", "Config hot-reload applied"); *cfg_res = new_cfg; }
}

fn apply_config_changes(
    cfg: Res<GameConfig>,
    mut last_beam: Local<Option<crate::core::config::BeamConfig>>,
    mut policy: ResMut<ConfinementPolicy>,
    mut grid: Option<ResMut<LayoutGrid>>,
    mut windows: Query<&mut Window>,
    mut meshes: Option<ResMut<Assets<Mesh>>>,
    mut materials: Option<ResMut<Assets<StandardMaterial>>>,
    mut q_beams: Query<(Entity, &mut BeamMagnet, Option<&Mesh3d>, Option<&MeshMaterial3d<StandardMaterial>>)>,
    mut commands: Commands,
) {
    if !cfg.is_changed() { return; }
    let previous = last_beam.replace(cfg.beam.clone());
    if cfg.is_added() { return; }

    *policy = ConfinementPolicy::from_config(&cfg.island);
    if let Some(grid) = grid.as_deref_mut() { *grid = LayoutGrid::from_config(&cfg.building); }
    if let Ok(mut window) = windows.single_mut() { if window.width() != cfg.window.width || window.height() != cfg.window.height { window.resolution.set(cfg.window.width, cfg.window.height); } if window.title != cfg.window.title { window.title = cfg.window.title.clone(); } }
    for (_, mut magnet, _, _) in &mut q_beams { magnet.params = cfg.magnet; }
    let Some(previous) = previous else { return; };
    let params = cfg.beam.shape_params();
    if previous.color != cfg.beam.color {
        if let Some(materials) = materials.as_deref_mut() {
            for (_, _, _, mat) in &q_beams {
                if let Some(m) = mat.and_then(|h| materials.get_mut(&h.0)) { m.base_color = params.color; }
            }
        }
    }
    // Colour lives on the material; only shape edits touch the mesh and collider.
    let reshaped = previous.segments != cfg.beam.segments || previous.length != cfg.beam.length || previous.half_angle_deg != cfg.beam.half_angle_deg;
    if !reshaped { return; }
    match generate_beam_cone(&params) {
        Ok(beam) => {
            for (e, _, mesh3d, _) in &q_beams {
                if let (Some(meshes), Some(handle)) = (meshes.as_deref_mut(), mesh3d) { meshes.insert(&handle.0, beam.to_mesh()); }
                if let Some(collider) = beam.to_convex_collider() { commands.entity(e).insert(collider); }
            }
            info!(target: "beam", "Beam rebuilt: segments={} length={} half_angle={}", params.segments, params.length, params.half_angle_deg);
        }
        Err(e) => error!(target: "beam", "Beam rebuild rejected: {e}; keeping current beam"),
    }
}
