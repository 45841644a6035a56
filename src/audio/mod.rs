pub mod volume;

pub use volume::{linear_to_db, MixerParams, MusicVolume, SetMusicVolume, VolumePlugin};
