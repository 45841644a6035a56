//! Music volume: linear slider value -> decibels on the mixer, persisted in the settings store.
use bevy::audio::Volume;
use bevy::prelude::*;
use std::collections::HashMap;

use crate::core::config::GameConfig;
use crate::core::settings::{Settings, MUSIC_VOLUME_KEY};

/// Lowest linear value fed to the log; maps to -80 dB.
pub const MIN_LINEAR_VOLUME: f32 = 0.0001;

/// `20 * log10(v)` with `v` clamped to `[MIN_LINEAR_VOLUME, 1]`.
pub fn linear_to_db(volume: f32) -> f32 {
    20.0 * volume.clamp(MIN_LINEAR_VOLUME, 1.0).log10()
}

/// Current slider position in `[0, 1]`.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct MusicVolume(pub f32);

impl Default for MusicVolume {
    fn default() -> Self {
        Self(1.0)
    }
}

/// Named mixer parameters in decibels.
#[derive(Resource, Debug, Default, Clone)]
pub struct MixerParams(HashMap<String, f32>);

impl MixerParams {
    pub fn set_float(&mut self, name: &str, db: f32) {
        self.0.insert(name.to_string(), db);
    }

    pub fn get_float(&self, name: &str) -> Option<f32> {
        self.0.get(name).copied()
    }
}

/// Request to move the music slider to the given linear value.
#[derive(Event, Debug, Clone, Copy)]
pub struct SetMusicVolume(pub f32);

/// Marks the looping background track.
#[derive(Component)]
pub struct MusicTrack;

pub struct VolumePlugin;
impl Plugin for VolumePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<MusicVolume>()
            .init_resource::<MixerParams>()
            .add_event::<SetMusicVolume>()
            .add_systems(Startup, (load_music_volume, start_music).chain())
            .add_systems(Update, handle_set_music_volume);
    }
}

fn apply_volume(
    value: f32,
    cfg: &GameConfig,
    mixer: &mut MixerParams,
    global: Option<&mut GlobalVolume>,
    sinks: &mut Query<&mut AudioSink, With<MusicTrack>>,
) -> f32 {
    let db = linear_to_db(value);
    mixer.set_float(&cfg.audio.mixer_parameter, db);
    if let Some(global) = global {
        global.volume = Volume::Decibels(db);
    }
    for mut sink in sinks.iter_mut() {
        sink.set_volume(Volume::Decibels(db));
    }
    db
}

pub(crate) fn load_music_volume(
    cfg: Res<GameConfig>,
    settings: Res<Settings>,
    mut volume: ResMut<MusicVolume>,
    mut mixer: ResMut<MixerParams>,
    mut global: Option<ResMut<GlobalVolume>>,
    mut sinks: Query<&mut AudioSink, With<MusicTrack>>,
) {
    let stored = settings.get_f32(MUSIC_VOLUME_KEY);
    let value = stored.unwrap_or(cfg.audio.default_music_volume).clamp(0.0, 1.0);
    volume.0 = value;
    let db = apply_volume(value, &cfg, &mut mixer, global.as_deref_mut(), &mut sinks);
    info!(target: "settings", "Music volume {:.2} ({:.1} dB, {})", value, db, if stored.is_some() { "saved" } else { "default" });
}

fn start_music(mut commands: Commands, cfg: Res<GameConfig>, asset_server: Option<Res<AssetServer>>, volume: Res<MusicVolume>) {
    let (Some(track), Some(asset_server)) = (cfg.audio.music_track.as_ref(), asset_server) else { return; };
    commands.spawn((
        MusicTrack,
        AudioPlayer::new(asset_server.load::<AudioSource>(track.clone())),
        PlaybackSettings::LOOP.with_volume(Volume::Decibels(linear_to_db(volume.0))),
    ));
    info!(target: "settings", "Music track '{}' started", track);
}

pub(crate) fn handle_set_music_volume(
    mut events: EventReader<SetMusicVolume>,
    cfg: Res<GameConfig>,
    mut settings: ResMut<Settings>,
    mut volume: ResMut<MusicVolume>,
    mut mixer: ResMut<MixerParams>,
    mut global: Option<ResMut<GlobalVolume>>,
    mut sinks: Query<&mut AudioSink, With<MusicTrack>>,
) {
    let Some(SetMusicVolume(requested)) = events.read().last().copied() else { return; };
    let value = requested.clamp(0.0, 1.0);
    volume.0 = value;
    let db = apply_volume(value, &cfg, &mut mixer, global.as_deref_mut(), &mut sinks);
    settings.set_f32(MUSIC_VOLUME_KEY, value);
    if let Err(e) = settings.flush() {
        warn!(target: "settings", "Could not persist music volume: {e}");
    }
    info!(target: "settings", "Music volume set to {:.2} ({:.1} dB)", value, db);
}
