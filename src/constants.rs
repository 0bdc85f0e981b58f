/// Browser-side tuning for the editor bindings.
///
/// Editor defaults (room size, snapping, storage keys) live in
/// `miniroom_core::constants`; this file only holds what the DOM glue needs.
// Keyboard shortcuts are ignored while typing in these elements
pub const TEXT_INPUT_TAGS: &[&str] = &["INPUT", "TEXTAREA", "SELECT"];

// Frame loop
pub const FRAME_MAX_DT_SEC: f32 = 0.1; // clamp after tab switches

// Layout autosave cadence (seconds); 0 disables
pub const AUTOSAVE_INTERVAL_SEC: f32 = 5.0;

// Fields on the camera-controls object touched by the rotation reset
pub const CONTROLS_AZIMUTH: &str = "azimuthAngle";
pub const CONTROLS_POLAR: &str = "polarAngle";
pub const CONTROLS_INTERNAL_AZIMUTH: &str = "_azimuthAngle";
pub const CONTROLS_TARGET: &str = "_target";
