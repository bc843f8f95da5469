//! Vehicle actors.
//!
//! The vehicle model is requested once per actor at startup: one player and a
//! configured number of traffic vehicles. Each actor is spawned as soon as its
//! load completes, so actors appear between frames in any order. A failed
//! load leaves that actor permanently absent and the rest of the simulation
//! carries on.

mod components;
mod roster;

use avian3d::prelude::*;
use bevy::{
    asset::{AssetLoadFailedEvent, LoadState},
    gltf::Gltf,
    prelude::*,
};
use rand::Rng;

pub use components::{
    ActorBody, ActorKind, ActorVisual, PlayerActor, TrafficActor, mirror_body,
};
pub use roster::{ActorRoster, ActorSlot, SlotStatus};

use crate::{
    clock::{FrameSet, SimulationPhase, TeardownSet},
    constants::{
        PLAYER_SPAWN, ROAD_HALF_WIDTH, ROAD_LENGTH, TRAFFIC_EDGE_MARGIN,
        TRAFFIC_MIN_SPAWN_DISTANCE, VEHICLE_HALF_EXTENTS, VEHICLE_MASS, VEHICLE_MODEL_PATH,
    },
    error::RoadwayError,
    launch_params::SimulationConfig,
    world::{SceneRng, build_world},
};

/// Plugin for loading and spawning vehicle actors.
pub struct ActorPlugin;

impl Plugin for ActorPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ActorRoster::mounted())
            .add_systems(Startup, request_vehicle_loads.after(build_world))
            .add_systems(
                Update,
                (
                    poll_vehicle_loads.before(FrameSet::Input),
                    log_load_failures::<Gltf>,
                    log_load_failures::<Scene>,
                    log_load_failures::<Image>,
                    log_load_failures::<AudioSource>,
                )
                    .run_if(in_state(SimulationPhase::Running)),
            )
            .add_systems(
                OnEnter(SimulationPhase::TornDown),
                despawn_actors.in_set(TeardownSet::Release),
            );
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Request the vehicle model for the player and every traffic actor.
fn request_vehicle_loads(
    asset_server: Res<AssetServer>,
    config: Res<SimulationConfig>,
    mut rng: ResMut<SceneRng>,
    mut roster: ResMut<ActorRoster>,
) {
    roster.request(
        ActorKind::Player,
        Transform::from_translation(PLAYER_SPAWN),
        asset_server.load(VEHICLE_MODEL_PATH),
    );

    for _ in 0..config.traffic_count {
        let placement = Transform::from_translation(traffic_placement(&mut rng.0));
        roster.request(ActorKind::Traffic, placement, asset_server.load(VEHICLE_MODEL_PATH));
    }

    tracing::info!(
        "Requested vehicle model for 1 player and {} traffic actor(s)",
        config.traffic_count
    );
}

/// Random traffic spawn point on the road.
///
/// Lateral offset is uniform across the lanes; the longitudinal position is
/// uniform along the road but kept clear of the player's spawn point.
pub fn traffic_placement(rng: &mut impl Rng) -> Vec3 {
    let lateral_limit = ROAD_HALF_WIDTH - TRAFFIC_EDGE_MARGIN;
    let longitudinal_limit = ROAD_LENGTH * 0.5 - VEHICLE_HALF_EXTENTS.z * 4.0;

    let x = rng.random_range(-lateral_limit..=lateral_limit);
    let mut z = rng.random_range(-longitudinal_limit..=longitudinal_limit);
    if (z - PLAYER_SPAWN.z).abs() < TRAFFIC_MIN_SPAWN_DISTANCE {
        z = PLAYER_SPAWN.z + TRAFFIC_MIN_SPAWN_DISTANCE.copysign(z - PLAYER_SPAWN.z);
    }

    Vec3::new(x, PLAYER_SPAWN.y, z)
}

/// Spawn actors whose model has finished loading and record failures.
///
/// The state of the base glTF handle is what counts: a corrupt file fails the
/// base load, and a model without a scene 0 loads but can never spawn.
fn poll_vehicle_loads(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    gltfs: Res<Assets<Gltf>>,
    mut roster: ResMut<ActorRoster>,
) {
    for index in roster.loading() {
        let slot = match roster.accept(index) {
            Ok(slot) => slot.clone(),
            Err(err) => {
                tracing::debug!("Discarding vehicle load: {err}");
                continue;
            }
        };

        let scene = match asset_server.load_state(&slot.model) {
            LoadState::Loaded => gltfs
                .get(&slot.model)
                .and_then(|gltf| gltf.scenes.first().cloned())
                .ok_or_else(|| "model has no scene 0".to_string()),
            LoadState::Failed(load_error) => Err(load_error.to_string()),
            LoadState::NotLoaded | LoadState::Loading => continue,
        };

        match scene {
            Ok(scene) => {
                let body = spawn_actor(&mut commands, slot.kind, index, slot.placement, scene);
                if let Err(err) = roster.mark_spawned(index, body) {
                    tracing::warn!("Vehicle spawned for unresolvable slot: {err}");
                    continue;
                }
                tracing::info!(
                    "Spawned {:?} actor (slot {index}) at {}",
                    slot.kind,
                    slot.placement.translation
                );
            }
            Err(reason) => {
                let err = RoadwayError::AssetLoad {
                    path: slot
                        .model
                        .path()
                        .map_or_else(|| VEHICLE_MODEL_PATH.to_string(), ToString::to_string),
                    reason,
                };
                tracing::warn!("{:?} actor (slot {index}) will not spawn: {err}", slot.kind);
                if let Err(err) = roster.mark_failed(index, err.to_string()) {
                    tracing::debug!("Discarding vehicle failure: {err}");
                }
            }
        }
    }
}

/// Spawn a body and its visual together. Returns the body entity.
pub fn spawn_actor(
    commands: &mut Commands,
    kind: ActorKind,
    slot: usize,
    placement: Transform,
    model: Handle<Scene>,
) -> Entity {
    let visual = commands.spawn((SceneRoot(model), placement)).id();

    let mut body = commands.spawn((
        ActorBody { kind, slot, visual },
        placement,
        RigidBody::Dynamic,
        Collider::cuboid(
            VEHICLE_HALF_EXTENTS.x * 2.0,
            VEHICLE_HALF_EXTENTS.y * 2.0,
            VEHICLE_HALF_EXTENTS.z * 2.0,
        ),
        Mass(VEHICLE_MASS),
        // Orientation is owned by the controllers, not the solver.
        LockedAxes::ROTATION_LOCKED,
        LinearVelocity::default(),
    ));
    match kind {
        ActorKind::Player => body.insert(PlayerActor),
        ActorKind::Traffic => body.insert(TrafficActor),
    };
    let body = body.id();

    commands.entity(visual).insert(ActorVisual { body });
    body
}

/// Log any asset of type `A` that failed to load.
pub fn log_load_failures<A: Asset>(mut failures: MessageReader<AssetLoadFailedEvent<A>>) {
    for failure in failures.read() {
        let err = RoadwayError::AssetLoad {
            path: failure.path.to_string(),
            reason: failure.error.to_string(),
        };
        tracing::warn!("{err}");
    }
}

// ============================================================================
// Teardown
// ============================================================================

/// Stop accepting loads and despawn every actor's body and visual.
fn despawn_actors(
    mut commands: Commands,
    mut roster: ResMut<ActorRoster>,
    bodies: Query<(Entity, &ActorBody)>,
) {
    roster.unmount();
    for (entity, body) in &bodies {
        commands.entity(body.visual).despawn();
        commands.entity(entity).despawn();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bevy::{
        asset::{AssetLoader, AssetPlugin, LoadContext, io::Reader},
        ecs::system::RunSystemOnce,
        reflect::TypePath,
    };
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    /// Rejects every `.glb`, the way a truncated or corrupt file would.
    #[derive(Default, TypePath)]
    struct FailingGltfLoader;

    impl AssetLoader for FailingGltfLoader {
        type Asset = Gltf;
        type Settings = ();
        type Error = std::io::Error;

        async fn load(
            &self,
            _reader: &mut dyn Reader,
            _settings: &Self::Settings,
            _load_context: &mut LoadContext<'_>,
        ) -> Result<Self::Asset, Self::Error> {
            Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "not a glTF binary",
            ))
        }

        fn extensions(&self) -> &[&str] {
            &["glb"]
        }
    }

    #[test]
    fn test_traffic_placement_on_road_away_from_spawn() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let position = traffic_placement(&mut rng);
            assert!(position.x.abs() <= ROAD_HALF_WIDTH - TRAFFIC_EDGE_MARGIN);
            assert!(position.z.abs() <= ROAD_LENGTH * 0.5);
            assert!((position.z - PLAYER_SPAWN.z).abs() >= TRAFFIC_MIN_SPAWN_DISTANCE - 1e-4);
        }
    }

    #[test]
    fn test_traffic_placement_is_seeded() {
        let a = traffic_placement(&mut StdRng::seed_from_u64(11));
        let b = traffic_placement(&mut StdRng::seed_from_u64(11));
        assert_eq!(a, b);
    }

    #[test]
    fn test_despawn_actors_removes_pairs_and_unmounts() {
        let mut world = World::new();
        world.insert_resource(ActorRoster::mounted());
        let visual = world.spawn(Transform::default()).id();
        let body = world
            .spawn(ActorBody {
                kind: ActorKind::Traffic,
                slot: 1,
                visual,
            })
            .id();
        world.entity_mut(visual).insert(ActorVisual { body });

        world.run_system_once(despawn_actors).unwrap();

        assert!(world.get_entity(body).is_err());
        assert!(world.get_entity(visual).is_err());
        assert!(!world.resource::<ActorRoster>().is_mounted());
    }

    #[test]
    fn test_corrupt_model_fails_its_slot() {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, AssetPlugin::default()))
            .init_asset::<Gltf>()
            .register_asset_loader(FailingGltfLoader)
            .insert_resource(ActorRoster::mounted())
            .add_systems(Update, poll_vehicle_loads);

        let model = app
            .world()
            .resource::<AssetServer>()
            .load::<Gltf>("test/corrupt_car.glb");
        app.world_mut().resource_mut::<ActorRoster>().request(
            ActorKind::Player,
            Transform::from_translation(PLAYER_SPAWN),
            model,
        );

        for _ in 0..1000 {
            app.update();
            if app.world().resource::<ActorRoster>().loading().is_empty() {
                break;
            }
            std::thread::sleep(Duration::from_millis(2));
        }

        let roster = app.world().resource::<ActorRoster>();
        assert!(matches!(
            roster.slot(0).map(|slot| &slot.status),
            Some(SlotStatus::Failed(_))
        ));
        assert_eq!(roster.player(), None);

        let world = app.world_mut();
        assert_eq!(world.query::<&ActorBody>().iter(world).count(), 0);
    }
}
