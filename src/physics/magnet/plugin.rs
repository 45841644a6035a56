use bevy::prelude::*;
use bevy_rapier3d::prelude::*;
use smallvec::SmallVec;

use super::falloff::{pull_acceleration, MagnetParams, PullQuery};
use crate::core::components::Cow;
use crate::core::system::system_order::PrePhysicsSet;

/// Tractor beam attached below a mover. Lives on the beam's sensor entity.
#[derive(Component, Debug, Clone)]
pub struct BeamMagnet {
    pub params: MagnetParams,
    /// Speed of the carrying mover; refreshed by the mover every frame.
    pub mover_speed: f32,
    pub active: bool,
    /// Entity whose position cows are pulled toward. `None` pulls toward the beam origin.
    pub pull_point: Option<Entity>,
}

impl BeamMagnet {
    pub fn new(params: MagnetParams) -> Self {
        Self { params, mover_speed: 0.0, active: false, pull_point: None }
    }
}

/// Cows currently intersecting a beam sensor (kept even while the beam is off
/// until the next deactivation clears it).
#[derive(Component, Debug, Default, Clone, Deref, DerefMut)]
pub struct BeamContacts(pub SmallVec<[Entity; 8]>);

pub struct BeamMagnetPlugin;
impl Plugin for BeamMagnetPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<CollisionEvent>().add_systems(
            Update,
            (collect_beam_contacts, apply_beam_pull).chain().in_set(PrePhysicsSet),
        );
    }
}

/// Track sensor overlaps from Rapier collision events. Only `Cow` entities are recorded.
pub(crate) fn collect_beam_contacts(
    mut ev_collisions: EventReader<CollisionEvent>,
    mut q_beams: Query<(&BeamMagnet, &mut BeamContacts)>,
    q_cows: Query<(), With<Cow>>,
) {
    for ev in ev_collisions.read() {
        let (a, b, started) = match ev {
            CollisionEvent::Started(a, b, _) => (*a, *b, true),
            CollisionEvent::Stopped(a, b, _) => (*a, *b, false),
        };
        for (beam, other) in [(a, b), (b, a)] {
            let Ok((magnet, mut contacts)) = q_beams.get_mut(beam) else { continue; };
            if q_cows.get(other).is_err() { continue; }
            if started {
                if magnet.active && !contacts.contains(&other) { contacts.push(other); }
            } else {
                contacts.retain(|e| *e != other);
            }
        }
    }
    for (magnet, mut contacts) in &mut q_beams {
        if !magnet.active && !contacts.is_empty() { contacts.clear(); }
    }
}

/// Integrate the speed-attenuated pull into every overlapping cow's velocity.
pub(crate) fn apply_beam_pull(
    time: Res<Time>,
    q_beams: Query<(&BeamMagnet, &BeamContacts, &GlobalTransform)>,
    q_points: Query<&GlobalTransform>,
    mut q_cows: Query<(&GlobalTransform, &mut Velocity), With<Cow>>,
) {
    let dt = time.delta_secs();
    if dt <= 0.0 { return; }
    for (magnet, contacts, beam_tf) in &q_beams {
        if !magnet.active || contacts.is_empty() { continue; }
        let pull_point = magnet
            .pull_point
            .and_then(|e| q_points.get(e).ok())
            .unwrap_or(beam_tf)
            .translation();
        for cow in contacts.iter() {
            let Ok((cow_tf, mut vel)) = q_cows.get_mut(*cow) else { continue; };
            let accel = pull_acceleration(
                &magnet.params,
                &PullQuery { target: cow_tf.translation(), pull_point, mover_speed: magnet.mover_speed },
            );
            if accel != Vec3::ZERO { vel.linvel += accel * dt; }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::RunSystemOnce;
    use std::time::Duration;
    use bevy_rapier3d::rapier::geometry::CollisionEventFlags;

    fn app_with_time() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_event::<CollisionEvent>();
        app.world_mut().resource_mut::<Time>().advance_by(Duration::from_millis(100));
        app
    }

    fn spawn_beam(app: &mut App, active: bool, speed: f32) -> Entity {
        let mut magnet = BeamMagnet::new(MagnetParams::default());
        magnet.active = active;
        magnet.mover_speed = speed;
        app.world_mut().spawn((magnet, BeamContacts::default(), GlobalTransform::from_xyz(0.0, 2.0, 0.0))).id()
    }

    fn spawn_cow(app: &mut App, pos: Vec3) -> Entity {
        app.world_mut().spawn((Cow, GlobalTransform::from_translation(pos), Velocity::zero())).id()
    }

    #[test]
    fn collision_events_maintain_contacts() {
        let mut app = app_with_time();
        let beam = spawn_beam(&mut app, true, 0.0);
        let cow = spawn_cow(&mut app, Vec3::new(1.0, 0.0, 0.0));
        let rock = app.world_mut().spawn(GlobalTransform::default()).id();
        app.world_mut().send_event(CollisionEvent::Started(beam, cow, CollisionEventFlags::SENSOR));
        app.world_mut().send_event(CollisionEvent::Started(rock, beam, CollisionEventFlags::SENSOR));
        app.world_mut().run_system_once(collect_beam_contacts).unwrap();
        assert_eq!(app.world().get::<BeamContacts>(beam).unwrap().as_slice(), &[cow]);

        app.world_mut().send_event(CollisionEvent::Stopped(cow, beam, CollisionEventFlags::SENSOR));
        app.world_mut().run_system_once(collect_beam_contacts).unwrap();
        assert!(app.world().get::<BeamContacts>(beam).unwrap().is_empty());
    }

    #[test]
    fn deactivation_clears_contacts() {
        let mut app = app_with_time();
        let beam = spawn_beam(&mut app, true, 0.0);
        let cow = spawn_cow(&mut app, Vec3::ZERO);
        app.world_mut().get_mut::<BeamContacts>(beam).unwrap().push(cow);
        app.world_mut().get_mut::<BeamMagnet>(beam).unwrap().active = false;
        app.world_mut().run_system_once(collect_beam_contacts).unwrap();
        assert!(app.world().get::<BeamContacts>(beam).unwrap().is_empty());
    }

    #[test]
    fn pull_moves_cow_toward_beam_origin() {
        let mut app = app_with_time();
        let beam = spawn_beam(&mut app, true, 0.0);
        let cow = spawn_cow(&mut app, Vec3::new(0.0, -2.0, 0.0));
        app.world_mut().get_mut::<BeamContacts>(beam).unwrap().push(cow);
        app.world_mut().run_system_once(apply_beam_pull).unwrap();
        let v = app.world().get::<Velocity>(cow).unwrap().linvel;
        // 17 * 0.1 straight up
        assert!((v - Vec3::new(0.0, 1.7, 0.0)).length() < 1e-4, "{v:?}");
    }

    #[test]
    fn fast_mover_drops_cows() {
        let mut app = app_with_time();
        let beam = spawn_beam(&mut app, true, 32.0);
        let cow = spawn_cow(&mut app, Vec3::new(0.0, -2.0, 0.0));
        app.world_mut().get_mut::<BeamContacts>(beam).unwrap().push(cow);
        app.world_mut().run_system_once(apply_beam_pull).unwrap();
        assert_eq!(app.world().get::<Velocity>(cow).unwrap().linvel, Vec3::ZERO);
    }

    #[test]
    fn explicit_pull_point_overrides_beam_origin() {
        let mut app = app_with_time();
        let beam = spawn_beam(&mut app, true, 0.0);
        let anchor = app.world_mut().spawn(GlobalTransform::from_xyz(5.0, 0.0, 0.0)).id();
        app.world_mut().get_mut::<BeamMagnet>(beam).unwrap().pull_point = Some(anchor);
        let cow = spawn_cow(&mut app, Vec3::ZERO);
        app.world_mut().get_mut::<BeamContacts>(beam).unwrap().push(cow);
        app.world_mut().run_system_once(apply_beam_pull).unwrap();
        let v = app.world().get::<Velocity>(cow).unwrap().linvel;
        assert!(v.x > 0.0 && v.y.abs() < 1e-6 && v.z.abs() < 1e-6);
    }
}
