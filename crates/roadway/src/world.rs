//! Static scenery.
//!
//! The world is built once at startup and never touched again until teardown:
//! a ground plane, a textured road running along Z with lane dashes, a
//! sidewalk and barrier on each side, and trees and rocks scattered either
//! side of the road. The ground, road, sidewalks and barriers carry static
//! colliders; props are decorative only.

use avian3d::prelude::*;
use bevy::{
    image::{ImageAddressMode, ImageLoaderSettings, ImageSampler, ImageSamplerDescriptor},
    math::Affine2,
    prelude::*,
};
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{
    clock::{SimulationPhase, TeardownSet},
    constants::{
        BARRIER_HEIGHT, GROUND_HALF_SIZE, LANE_DASH_GAP, LANE_DASH_LENGTH, PROP_AREA_HALF_WIDTH,
        PROP_CLEARANCE, ROAD_BUMP_TEXTURE_PATH, ROAD_COLOR_TEXTURE_PATH, ROAD_HALF_WIDTH,
        ROAD_LENGTH, SIDEWALK_WIDTH,
    },
    launch_params::SimulationConfig,
};

/// Thickness of the road slab (m).
const ROAD_THICKNESS: f32 = 0.1;
/// Height of the sidewalk kerb (m).
const SIDEWALK_HEIGHT: f32 = 0.2;
/// Thickness of each barrier wall (m).
const BARRIER_THICKNESS: f32 = 0.5;
/// Road texture repeats every this many metres.
const ROAD_TEXTURE_TILE: f32 = 8.0;
/// Fill light applied to every surface (cd/m^2).
const AMBIENT_BRIGHTNESS: f32 = 400.0;

/// Sky background, also the colour distant geometry fades into.
pub const SKY_COLOR: Color = Color::srgb_u8(135, 206, 235);

/// Random source shared by prop scatter and traffic placement.
#[derive(Resource)]
pub struct SceneRng(pub StdRng);

impl SceneRng {
    pub fn from_seed(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

/// Marker for every entity created by [`build_world`].
#[derive(Component)]
pub struct Scenery;

/// Plugin for the static world.
pub struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ClearColor(SKY_COLOR))
            .insert_resource(GlobalAmbientLight {
                brightness: AMBIENT_BRIGHTNESS,
                ..default()
            })
            .add_systems(Startup, build_world)
            .add_systems(
                OnEnter(SimulationPhase::TornDown),
                despawn_scenery.in_set(TeardownSet::Release),
            );
    }
}

// ============================================================================
// Prop scatter
// ============================================================================

/// Kind of decorative prop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PropKind {
    Tree,
    Rock,
}

/// Where and how one prop is placed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PropPlacement {
    pub kind: PropKind,
    /// Ground position (x, z).
    pub position: Vec2,
    /// Uniform scale factor.
    pub scale: f32,
    /// Rotation about Y (radians).
    pub yaw: f32,
}

/// Scatter trees then rocks uniformly over the area either side of the road.
///
/// Every prop is at least [`PROP_CLEARANCE`] from the road centreline.
pub fn scatter_props(rng: &mut impl Rng, tree_count: usize, rock_count: usize) -> Vec<PropPlacement> {
    let kinds = std::iter::repeat_n(PropKind::Tree, tree_count)
        .chain(std::iter::repeat_n(PropKind::Rock, rock_count));

    kinds
        .map(|kind| {
            let lateral = rng.random_range(PROP_CLEARANCE..=PROP_AREA_HALF_WIDTH);
            let side = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
            let z = rng.random_range(-ROAD_LENGTH * 0.5..=ROAD_LENGTH * 0.5);
            let scale = match kind {
                PropKind::Tree => rng.random_range(0.8..1.6),
                PropKind::Rock => rng.random_range(0.4..1.2),
            };
            PropPlacement {
                kind,
                position: Vec2::new(side * lateral, z),
                scale,
                yaw: rng.random_range(0.0..std::f32::consts::TAU),
            }
        })
        .collect()
}

/// Z centres of the dashes down the middle of the road.
pub fn lane_dash_centers() -> Vec<f32> {
    let period = LANE_DASH_LENGTH + LANE_DASH_GAP;
    let start = -ROAD_LENGTH * 0.5 + LANE_DASH_LENGTH * 0.5;
    let count = ((ROAD_LENGTH - LANE_DASH_LENGTH) / period).floor() as usize + 1;
    (0..count).map(|i| start + i as f32 * period).collect()
}

// ============================================================================
// Construction
// ============================================================================

/// Build the static scene.
pub fn build_world(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    asset_server: Res<AssetServer>,
    config: Res<SimulationConfig>,
    mut rng: ResMut<SceneRng>,
) {
    // Ground.
    let grass = materials.add(StandardMaterial {
        base_color: Color::srgb(0.30, 0.52, 0.24),
        perceptual_roughness: 1.0,
        ..default()
    });
    commands.spawn((
        Scenery,
        Mesh3d(meshes.add(Plane3d::default().mesh().size(
            GROUND_HALF_SIZE * 2.0,
            GROUND_HALF_SIZE * 2.0,
        ))),
        MeshMaterial3d(grass),
        Transform::IDENTITY,
        RigidBody::Static,
        Collider::half_space(Vec3::Y),
    ));

    spawn_road(&mut commands, &mut meshes, &mut materials, &asset_server);
    spawn_lane_markings(&mut commands, &mut meshes, &mut materials);
    spawn_roadside(&mut commands, &mut meshes, &mut materials);

    let props = scatter_props(&mut rng.0, config.tree_count, config.rock_count);
    spawn_props(&mut commands, &mut meshes, &mut materials, &props);

    commands.spawn((
        Scenery,
        DirectionalLight {
            illuminance: 12_000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(40.0, 80.0, -30.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    tracing::info!(
        "World built: {} trees, {} rocks, {} lane dashes",
        config.tree_count,
        config.rock_count,
        lane_dash_centers().len()
    );
}

/// Load a road texture that tiles along the road.
fn load_road_texture(asset_server: &AssetServer, path: &'static str, srgb: bool) -> Handle<Image> {
    asset_server.load_with_settings(path, move |settings: &mut ImageLoaderSettings| {
        settings.is_srgb = srgb;
        settings.sampler = ImageSampler::Descriptor(ImageSamplerDescriptor {
            address_mode_u: ImageAddressMode::Repeat,
            address_mode_v: ImageAddressMode::Repeat,
            ..default()
        });
    })
}

fn spawn_road(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    asset_server: &AssetServer,
) {
    let width = ROAD_HALF_WIDTH * 2.0;
    let mut road_mesh = Mesh::from(Cuboid::new(width, ROAD_THICKNESS, ROAD_LENGTH));
    // Normal mapping needs tangents; without them the road renders flat.
    if let Err(err) = road_mesh.generate_tangents() {
        tracing::warn!("Road surface will render without bump detail: {err}");
    }

    let asphalt = materials.add(StandardMaterial {
        base_color_texture: Some(load_road_texture(asset_server, ROAD_COLOR_TEXTURE_PATH, true)),
        normal_map_texture: Some(load_road_texture(asset_server, ROAD_BUMP_TEXTURE_PATH, false)),
        perceptual_roughness: 0.9,
        uv_transform: Affine2::from_scale(Vec2::new(
            width / ROAD_TEXTURE_TILE,
            ROAD_LENGTH / ROAD_TEXTURE_TILE,
        )),
        ..default()
    });

    commands.spawn((
        Scenery,
        Mesh3d(meshes.add(road_mesh)),
        MeshMaterial3d(asphalt),
        Transform::from_xyz(0.0, ROAD_THICKNESS * 0.5, 0.0),
        RigidBody::Static,
        Collider::cuboid(width, ROAD_THICKNESS, ROAD_LENGTH),
    ));
}

fn spawn_lane_markings(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
) {
    let dash = meshes.add(Cuboid::new(0.2, 0.01, LANE_DASH_LENGTH));
    let paint = materials.add(StandardMaterial {
        base_color: Color::srgb(0.95, 0.95, 0.9),
        unlit: true,
        ..default()
    });

    for z in lane_dash_centers() {
        commands.spawn((
            Scenery,
            Mesh3d(dash.clone()),
            MeshMaterial3d(paint.clone()),
            Transform::from_xyz(0.0, ROAD_THICKNESS + 0.005, z),
        ));
    }
}

/// Sidewalks and barriers, mirrored on both sides of the road.
fn spawn_roadside(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
) {
    let sidewalk_mesh = meshes.add(Cuboid::new(SIDEWALK_WIDTH, SIDEWALK_HEIGHT, ROAD_LENGTH));
    let sidewalk_material = materials.add(Color::srgb(0.68, 0.68, 0.66));
    let barrier_mesh = meshes.add(Cuboid::new(BARRIER_THICKNESS, BARRIER_HEIGHT, ROAD_LENGTH));
    let barrier_material = materials.add(Color::srgb(0.75, 0.35, 0.2));

    for side in [-1.0, 1.0] {
        let sidewalk_x = side * (ROAD_HALF_WIDTH + SIDEWALK_WIDTH * 0.5);
        commands.spawn((
            Scenery,
            Mesh3d(sidewalk_mesh.clone()),
            MeshMaterial3d(sidewalk_material.clone()),
            Transform::from_xyz(sidewalk_x, SIDEWALK_HEIGHT * 0.5, 0.0),
            RigidBody::Static,
            Collider::cuboid(SIDEWALK_WIDTH, SIDEWALK_HEIGHT, ROAD_LENGTH),
        ));

        let barrier_x = side * (ROAD_HALF_WIDTH + SIDEWALK_WIDTH + BARRIER_THICKNESS * 0.5);
        commands.spawn((
            Scenery,
            Mesh3d(barrier_mesh.clone()),
            MeshMaterial3d(barrier_material.clone()),
            Transform::from_xyz(barrier_x, BARRIER_HEIGHT * 0.5, 0.0),
            RigidBody::Static,
            Collider::cuboid(BARRIER_THICKNESS, BARRIER_HEIGHT, ROAD_LENGTH),
        ));
    }
}

fn spawn_props(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    props: &[PropPlacement],
) {
    let trunk_mesh = meshes.add(Cylinder::new(0.25, 2.0));
    let trunk_material = materials.add(Color::srgb(0.40, 0.26, 0.13));
    let crown_mesh = meshes.add(Cone {
        radius: 1.4,
        height: 3.5,
    });
    let crown_material = materials.add(Color::srgb(0.13, 0.42, 0.16));
    let rock_mesh = meshes.add(Sphere::new(0.8));
    let rock_material = materials.add(Color::srgb(0.5, 0.5, 0.52));

    for prop in props {
        let rotation = Quat::from_rotation_y(prop.yaw);
        let ground = Vec3::new(prop.position.x, 0.0, prop.position.y);

        match prop.kind {
            PropKind::Tree => {
                commands.spawn((
                    Scenery,
                    Transform::from_translation(ground)
                        .with_rotation(rotation)
                        .with_scale(Vec3::splat(prop.scale)),
                    Visibility::default(),
                    children![
                        (
                            Mesh3d(trunk_mesh.clone()),
                            MeshMaterial3d(trunk_material.clone()),
                            Transform::from_xyz(0.0, 1.0, 0.0),
                        ),
                        (
                            Mesh3d(crown_mesh.clone()),
                            MeshMaterial3d(crown_material.clone()),
                            Transform::from_xyz(0.0, 3.5, 0.0),
                        ),
                    ],
                ));
            }
            PropKind::Rock => {
                // Squashed so rocks sit low on the ground.
                let scale = Vec3::new(prop.scale * 1.3, prop.scale * 0.6, prop.scale);
                commands.spawn((
                    Scenery,
                    Mesh3d(rock_mesh.clone()),
                    MeshMaterial3d(rock_material.clone()),
                    Transform::from_translation(ground)
                        .with_rotation(rotation)
                        .with_scale(scale),
                ));
            }
        }
    }
}

fn despawn_scenery(mut commands: Commands, scenery: Query<Entity, With<Scenery>>) {
    for entity in &scenery {
        commands.entity(entity).despawn();
    }
    tracing::debug!("Scenery released");
}
