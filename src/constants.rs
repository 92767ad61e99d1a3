// World constants
pub const CHUNK_SIZE: i32 = 16;
pub const DEFAULT_WORLD_WIDTH: u32 = 512;
pub const DEFAULT_WORLD_HEIGHT: u32 = 128;
pub const DEFAULT_WORLD_DEPTH: u32 = 512;

// Rendering constants
pub const VIEW_DISTANCE: i32 = 5;
pub const HIGHLIGHT_MARGIN: f32 = 1.0 / 64.0;
pub const NEAR_PLANE: f32 = 0.01;
pub const FAR_PLANE: f32 = 512.0;
pub const CLEAR_COLOR: [f32; 3] = [0.4, 0.6, 0.8];

/// Ambient light multiplier per face direction, indexed like `Direction`.
pub const FACE_LIGHT: [f32; 6] = [0.55, 1.0, 0.85, 0.85, 0.7, 0.7];

// Mesh worker constants
pub const MESH_WORKER_COUNT: usize = 2;
pub const MESH_QUEUE_CAPACITY: usize = 64;

// Player constants
pub const EYE_HEIGHT: f32 = 1.7;
pub const PLAYER_HEIGHT: f32 = 1.8;
pub const PLAYER_SPEED: f32 = 7.5;
pub const PLAYER_GRAVITY: f32 = 30.0;
pub const PLAYER_JUMP_VELOCITY: f32 = 9.0;
pub const PLAYER_MAX_FALL_SPEED: f32 = 50.0;
pub const RAYCAST_STEP: f32 = 0.2;
pub const RAYCAST_MAX_STEPS: u32 = 100;

// Texture constants
pub const TEXTURE_TILE_SIZE: u32 = 16;
pub const MISSING_TEXTURE: &str = "missing";
pub const DEFAULT_TEXTURE_DIR: &str = "textures";
pub const DEBUG_ATLAS_FILE: &str = "blockSheet.png";
