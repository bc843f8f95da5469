//! Tuning constants shared by the simulation systems.

use std::time::Duration;

use glam::Vec3;

/// Gravitational acceleration (m/s^2).
pub const GRAVITY: f32 = 9.81;

/// Physics step advanced once per rendered frame.
///
/// Simulated time does not follow wall time: every frame advances exactly
/// this much, regardless of how long the frame took to render.
pub const FIXED_TIMESTEP: Duration = Duration::from_nanos(16_666_667);

// ============================================================================
// Player vehicle
// ============================================================================

/// Forward/reverse speed applied to the player body (m/s).
pub const SPEED: f32 = 10.0;

/// Yaw change applied per frame while a turn key is held (radians).
pub const TURN_RATE: f32 = 0.03;

/// Player spawn position.
pub const PLAYER_SPAWN: Vec3 = Vec3::new(0.0, 1.0, 0.0);

/// Half extents of every vehicle's box collider (x = half width, z = half length).
pub const VEHICLE_HALF_EXTENTS: Vec3 = Vec3::new(1.0, 0.6, 2.2);

/// Mass of a vehicle body (kg).
pub const VEHICLE_MASS: f32 = 1200.0;

// ============================================================================
// Traffic
// ============================================================================

/// Longitudinal speed of traffic agents (m/s).
pub const TRAFFIC_SPEED: f32 = 6.0;

/// Default number of traffic agents.
pub const DEFAULT_TRAFFIC_COUNT: usize = 4;

/// Traffic agents keep at least this far from the road edge (m).
pub const TRAFFIC_EDGE_MARGIN: f32 = 1.5;

/// Traffic agents spawn this far from the player's spawn point at minimum (m).
pub const TRAFFIC_MIN_SPAWN_DISTANCE: f32 = 12.0;

// ============================================================================
// Camera
// ============================================================================

/// Camera position relative to the player, in the player's local frame.
///
/// Vehicles drive towards local +Z, so a negative Z puts the camera behind.
pub const CAMERA_OFFSET: Vec3 = Vec3::new(0.0, 4.0, -10.0);

/// Fraction of the remaining distance covered by the camera each frame.
pub const CAMERA_LERP: f32 = 0.1;

/// Initial camera position before the player has spawned.
pub const CAMERA_START: Vec3 = Vec3::new(0.0, 8.0, -16.0);

/// Distance from the camera where fog begins (m).
pub const FOG_START: f32 = 50.0;

/// Distance from the camera where fog fully hides geometry (m).
pub const FOG_END: f32 = 200.0;

// ============================================================================
// World
// ============================================================================

/// Half width of the drivable road corridor (m).
pub const ROAD_HALF_WIDTH: f32 = 6.0;

/// Length of the road along Z (m).
pub const ROAD_LENGTH: f32 = 400.0;

/// Width of each sidewalk strip (m).
pub const SIDEWALK_WIDTH: f32 = 2.5;

/// Barrier height (m).
pub const BARRIER_HEIGHT: f32 = 1.0;

/// Half size of the square ground area (m).
pub const GROUND_HALF_SIZE: f32 = 250.0;

/// Props are kept at least this far from the road centreline (m).
pub const PROP_CLEARANCE: f32 = ROAD_HALF_WIDTH + SIDEWALK_WIDTH + 3.0;

/// Half extent of the prop scatter area along X (m).
pub const PROP_AREA_HALF_WIDTH: f32 = 120.0;

/// Default number of trees.
pub const DEFAULT_TREE_COUNT: usize = 60;

/// Default number of rocks.
pub const DEFAULT_ROCK_COUNT: usize = 40;

/// Length of one lane dash and the gap after it (m).
pub const LANE_DASH_LENGTH: f32 = 3.0;
pub const LANE_DASH_GAP: f32 = 4.0;

// ============================================================================
// Assets
// ============================================================================

/// Vehicle model (glTF scene 0 is used).
pub const VEHICLE_MODEL_PATH: &str = "models/car.glb";

/// Looping engine sound.
pub const ENGINE_SOUND_PATH: &str = "audio/engine_loop.mp3";

/// Looping ambient background sound.
pub const AMBIENT_SOUND_PATH: &str = "audio/ambient_loop.mp3";

/// Road surface color map.
pub const ROAD_COLOR_TEXTURE_PATH: &str = "textures/road_color.png";

/// Road surface bump map, used as a normal map.
pub const ROAD_BUMP_TEXTURE_PATH: &str = "textures/road_bump.png";
