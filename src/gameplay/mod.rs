pub mod building;
pub mod confinement;
pub mod cows;
pub mod island;
pub mod mode;
pub mod rotator;
pub mod smoothing;
pub mod ufo;

use bevy::prelude::*;

use crate::app::state::AppState;
use crate::core::components::GameplayEntity;
use crate::core::config::GameConfig;
use confinement::ConfinementPolicy;

/// Island, UFO, cows and build mode.
pub struct GameplayPlugin;
impl Plugin for GameplayPlugin {
    fn build(&self, app: &mut App) {
        // OnEnter(Gameplay) can run before Startup (`--skip-menu`), so the
        // policy has to exist before the first spawn.
        let policy = app
            .world()
            .get_resource::<GameConfig>()
            .map(|cfg| ConfinementPolicy::from_config(&cfg.island))
            .unwrap_or_default();
        info!(target: "ufo", "Confinement policy: {:?}", policy);
        app.insert_resource(policy)
            .add_systems(OnExit(AppState::Gameplay), despawn_gameplay_entities)
            .add_plugins((
                island::IslandPlugin,
                ufo::UfoPlugin,
                rotator::RotatorPlugin,
                cows::CowsPlugin,
                mode::ModePlugin,
                building::BuildingPlugin,
            ));
    }
}

fn despawn_gameplay_entities(mut commands: Commands, q: Query<Entity, With<GameplayEntity>>) {
    for e in &q {
        commands.entity(e).despawn();
    }
}
