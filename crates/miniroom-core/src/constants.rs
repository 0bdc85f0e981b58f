use glam::Vec3;

// Shared editor tuning constants used by the core and the web front-end.

// Room layout (matches the rendered room geometry)
pub const ROOM_WIDTH: f32 = 10.0; // X extent, walls at -5..5
pub const ROOM_DEPTH: f32 = 10.0; // Z extent
pub const ROOM_HEIGHT: f32 = 5.0; // Y extent, floor at 0
pub const ROOM_WALL_THICKNESS: f32 = 0.3;
pub const ROOM_MARGIN: f32 = 0.3; // inward offset from each wall

// Extra padding around every item when computing its bounds
pub const FURNITURE_SAFETY_MARGIN: f32 = 0.1;

// Tolerance for "inside the room" checks after clamping
pub const EPSILON: f32 = 1e-4;

// Grid and rotation snapping defaults
pub const GRID_SIZE: f32 = 10.0;
pub const GRID_DIVISIONS: u32 = 10;
pub const ROTATION_SNAP_DEGREES: f32 = 15.0;

// Auto-lock fires this long after a move gesture settles
pub const AUTO_LOCK_DELAY_MS: u64 = 1000;

// Undo history depth
pub const MAX_HISTORY: usize = 30;

// Duplicates land diagonally next to the original
pub const DUPLICATE_OFFSET: [f32; 3] = [1.0, 0.0, 1.0];

// Spiral search for a collision-free spot
pub const SAFE_SEARCH_STEP: f32 = 0.5;
pub const SAFE_SEARCH_MAX_RADIUS: f32 = 5.0;
pub const SAFE_SEARCH_ATTEMPTS: u32 = 50;

// Camera
pub const LOCKED_VIEW_POSITION: [f32; 3] = [5.0, 4.0, 6.0];
pub const LOCKED_VIEW_TARGET: [f32; 3] = [0.0, 0.0, 0.0];
pub const CAMERA_MIN_HEIGHT: f32 = 0.5;
pub const CAMERA_SMOOTH_TIME_SEC: f32 = 0.25; // time constant for OrbitRig easing
pub const CAMERA_SETTLE_DISTANCE: f32 = 1e-3;

// Persistence keys
pub const FURNITURE_OVERRIDES_KEY: &str = "bumbum_furniture_overrides_v1";
pub const CURRENT_LAYOUT_KEY: &str = "bondidi_current_layout";
pub const ASSET_DB_NAME: &str = "bumbum_custom_library";
pub const ASSET_DB_VERSION: u32 = 1;
pub const ASSET_BLOB_STORE: &str = "blobs";

#[inline]
pub fn locked_view_position() -> Vec3 {
    Vec3::from_array(LOCKED_VIEW_POSITION)
}

#[inline]
pub fn locked_view_target() -> Vec3 {
    Vec3::from_array(LOCKED_VIEW_TARGET)
}

#[inline]
pub fn duplicate_offset_vec3() -> Vec3 {
    Vec3::from_array(DUPLICATE_OFFSET)
}
