//! Grid-snapped building placement while in build mode.
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_rapier3d::prelude::*;
use std::collections::HashSet;
use thiserror::Error;

use crate::app::state::{AppState, GameplayMode};
use crate::core::components::{Building, GameplayEntity};
use crate::core::config::{BuildingConfig, GameConfig};
use crate::interaction::inputmap::InputMap;

/// Maps world points to integer cells: `floor((p - origin) / cell_size)`.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct LayoutGrid {
    pub cell_size: Vec3,
    pub origin: Vec3,
}

impl Default for LayoutGrid {
    fn default() -> Self {
        Self::from_config(&BuildingConfig::default())
    }
}

impl LayoutGrid {
    pub fn from_config(c: &BuildingConfig) -> Self {
        Self { cell_size: Vec3::from_array(c.cell_size).max(Vec3::splat(f32::EPSILON)), origin: Vec3::from_array(c.grid_origin) }
    }

    pub fn world_to_cell(&self, p: Vec3) -> IVec3 {
        ((p - self.origin) / self.cell_size).floor().as_ivec3()
    }

    pub fn cell_center(&self, cell: IVec3) -> Vec3 {
        self.origin + (cell.as_vec3() + Vec3::splat(0.5)) * self.cell_size
    }

    /// Where a building of height `height` sits so its base rests on the cell floor.
    pub fn building_position(&self, cell: IVec3, height: f32) -> Vec3 {
        let c = self.cell_center(cell);
        Vec3::new(c.x, self.origin.y + cell.y as f32 * self.cell_size.y + height * 0.5, c.z)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlacementError {
    #[error("cell already occupied: {0}")]
    Occupied(IVec3),
}

#[derive(Resource, Debug, Default, Clone)]
pub struct OccupiedCells(pub HashSet<IVec3>);

impl OccupiedCells {
    pub fn try_occupy(&mut self, cell: IVec3) -> Result<(), PlacementError> {
        if self.0.insert(cell) { Ok(()) } else { Err(PlacementError::Occupied(cell)) }
    }

    pub fn is_occupied(&self, cell: IVec3) -> bool {
        self.0.contains(&cell)
    }
}

/// Cell under the cursor in build mode.
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct BuildCursor {
    pub cell: Option<IVec3>,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct BuildingPlaced {
    pub entity: Entity,
    pub cell: IVec3,
}

#[derive(Component)]
pub struct BuildPreview;

#[derive(Resource, Clone)]
pub(crate) struct BuildingAssets {
    mesh: Handle<Mesh>,
    material: Handle<StandardMaterial>,
}

pub struct BuildingPlugin;
impl Plugin for BuildingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<LayoutGrid>()
            .init_resource::<OccupiedCells>()
            .init_resource::<BuildCursor>()
            .add_event::<BuildingPlaced>()
            .add_systems(OnEnter(AppState::Gameplay), setup_building)
            .add_systems(OnEnter(GameplayMode::Building), show_preview)
            .add_systems(OnExit(GameplayMode::Building), hide_preview)
            .add_systems(
                Update,
                (track_build_cursor, place_building.after(track_build_cursor))
                    .run_if(in_state(GameplayMode::Building)),
            );
    }
}

fn setup_building(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    cfg: Res<GameConfig>,
) {
    let grid = LayoutGrid::from_config(&cfg.building);
    let [w, h, d] = cfg.building.building_size;
    let [r, g, b, a] = cfg.building.color;
    let mesh = meshes.add(Cuboid::new(w, h, d));
    let material = materials.add(StandardMaterial { base_color: Color::srgba(r, g, b, a), ..default() });
    let preview_mat = materials.add(StandardMaterial { base_color: Color::srgba(r, g, b, 0.35), alpha_mode: AlphaMode::Blend, unlit: true, ..default() });
    commands.spawn((
        BuildPreview,
        GameplayEntity,
        Mesh3d(mesh.clone()),
        MeshMaterial3d(preview_mat),
        Transform::from_translation(grid.building_position(IVec3::ZERO, h)),
        Visibility::Hidden,
    ));
    commands.insert_resource(grid);
    commands.insert_resource(OccupiedCells::default());
    commands.insert_resource(BuildCursor::default());
    commands.insert_resource(BuildingAssets { mesh, material });
}

fn show_preview(mut q: Query<&mut Visibility, With<BuildPreview>>) {
    for mut v in &mut q { *v = Visibility::Visible; }
}

fn hide_preview(mut q: Query<&mut Visibility, With<BuildPreview>>, mut cursor: ResMut<BuildCursor>) {
    for mut v in &mut q { *v = Visibility::Hidden; }
    cursor.cell = None;
}

/// Ray from the camera through the cursor, intersected with the ground plane y = 0.
fn cursor_ground_point(window: &Window, camera: &Camera, cam_tf: &GlobalTransform) -> Option<Vec3> {
    let cursor = window.cursor_position()?;
    let ray = camera.viewport_to_world(cam_tf, cursor).ok()?;
    let t = ray.intersect_plane(Vec3::ZERO, InfinitePlane3d::new(Vec3::Y))?;
    Some(ray.get_point(t))
}

fn track_build_cursor(
    grid: Res<LayoutGrid>,
    cfg: Res<GameConfig>,
    q_window: Query<&Window, With<PrimaryWindow>>,
    q_camera: Query<(&Camera, &GlobalTransform), With<Camera3d>>,
    mut cursor: ResMut<BuildCursor>,
    mut q_preview: Query<&mut Transform, With<BuildPreview>>,
) {
    let Ok(window) = q_window.single() else { return; };
    let Ok((camera, cam_tf)) = q_camera.single() else { return; };
    let cell = cursor_ground_point(window, camera, cam_tf).map(|p| grid.world_to_cell(p));
    cursor.cell = cell;
    let Some(cell) = cell else { return; };
    let pos = grid.building_position(cell, cfg.building.building_size[1]);
    for mut tf in &mut q_preview { tf.translation = pos; }
}

pub(crate) fn place_building(
    mut commands: Commands,
    input: Res<InputMap>,
    grid: Res<LayoutGrid>,
    cfg: Res<GameConfig>,
    cursor: Res<BuildCursor>,
    assets: Option<Res<BuildingAssets>>,
    mut occupied: ResMut<OccupiedCells>,
    mut ev_placed: EventWriter<BuildingPlaced>,
) {
    if !input.just_pressed("Place") { return; }
    let Some(cell) = cursor.cell else { return; };
    if let Err(e) = occupied.try_occupy(cell) {
        warn!(target: "building", "{e}");
        return;
    }
    let [w, h, d] = cfg.building.building_size;
    let mut building = commands.spawn((
        Building { cell },
        GameplayEntity,
        Transform::from_translation(grid.building_position(cell, h)),
        Visibility::Visible,
        RigidBody::Fixed,
        Collider::cuboid(w * 0.5, h * 0.5, d * 0.5),
    ));
    if let Some(assets) = assets {
        building.insert((Mesh3d(assets.mesh.clone()), MeshMaterial3d(assets.material.clone())));
    }
    let entity = building.id();
    info!(target: "building", "Building placed at cell {cell}");
    ev_placed.write(BuildingPlaced { entity, cell });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::inputmap::parse::parse_input_toml;
    use crate::interaction::inputmap::types::{RawBindingToken, RawInputFrame};
    use bevy::ecs::system::RunSystemOnce;

    #[test]
    fn world_cell_round_trip() {
        let grid = LayoutGrid { cell_size: Vec3::new(2.0, 1.0, 2.0), origin: Vec3::ZERO };
        assert_eq!(grid.world_to_cell(Vec3::new(3.9, 0.0, -0.1)), IVec3::new(1, 0, -1));
        let c = IVec3::new(-3, 0, 4);
        assert_eq!(grid.world_to_cell(grid.cell_center(c)), c);
        assert_eq!(grid.cell_center(IVec3::ZERO), Vec3::new(1.0, 0.5, 1.0));
        assert_eq!(grid.building_position(IVec3::ZERO, 1.2).y, 0.6);
    }

    #[test]
    fn occupied_cell_rejected() {
        let mut occ = OccupiedCells::default();
        assert!(occ.try_occupy(IVec3::ONE).is_ok());
        assert_eq!(occ.try_occupy(IVec3::ONE), Err(PlacementError::Occupied(IVec3::ONE)));
        assert!(occ.is_occupied(IVec3::ONE));
    }

    fn place_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_event::<BuildingPlaced>();
        app.insert_resource(GameConfig::default());
        app.init_resource::<LayoutGrid>();
        app.init_resource::<OccupiedCells>();
        app.insert_resource(BuildCursor { cell: Some(IVec3::new(2, 0, 1)) });
        let mut map = parse_input_toml("[actions.Place]\n[bindings]\nPlace = [\"Mouse:Left\"]\n").input_map;
        let mut frame = RawInputFrame::default();
        frame.press(RawBindingToken::MouseBtn(MouseButton::Left));
        map.apply_frame(&frame, 0.016);
        app.insert_resource(map);
        app
    }

    #[test]
    fn place_spawns_once_per_cell() {
        let mut app = place_app();
        app.world_mut().run_system_once(place_building).unwrap();
        app.world_mut().run_system_once(place_building).unwrap();
        let world = app.world_mut();
        let count = world.query::<&Building>().iter(world).count();
        assert_eq!(count, 1, "second placement into the same cell is rejected");
        assert!(world.resource::<OccupiedCells>().is_occupied(IVec3::new(2, 0, 1)));
        let events = world.resource::<Events<BuildingPlaced>>();
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn no_cursor_cell_places_nothing() {
        let mut app = place_app();
        app.insert_resource(BuildCursor::default());
        app.world_mut().run_system_once(place_building).unwrap();
        let world = app.world_mut();
        assert_eq!(world.query::<&Building>().iter(world).count(), 0);
    }
}
