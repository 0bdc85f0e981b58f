//! Grid and rotation snapping.
//!
//! All snapping is plain rounding to the nearest multiple of a step. A snap
//! strength below 1 blends between the raw and the snapped value instead of
//! switching snapping off.

use crate::constants::*;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Rounds `value` to the nearest multiple of `cell`.
///
/// A non-positive or non-finite cell leaves the value untouched.
#[inline]
pub fn grid_snap(value: f32, cell: f32) -> f32 {
    if !(cell.is_finite() && cell > 0.0) {
        return value;
    }
    (value / cell).round() * cell
}

/// Rounds a radian angle to the nearest multiple of `increment_degrees`.
#[inline]
pub fn rotation_snap(angle: f32, increment_degrees: f32) -> f32 {
    grid_snap(angle, increment_degrees.to_radians())
}

/// Snaps every Euler component (radians) to the increment.
pub fn rotation_snap_euler(rotation: Vec3, increment_degrees: f32) -> Vec3 {
    Vec3::new(
        rotation_snap(rotation.x, increment_degrees),
        rotation_snap(rotation.y, increment_degrees),
        rotation_snap(rotation.z, increment_degrees),
    )
}

/// Linear blend from `raw` (strength 0) to `snapped` (strength 1).
#[inline]
pub fn snap_with_strength(raw: f32, snapped: f32, strength: f32) -> f32 {
    let t = if strength.is_finite() {
        strength.clamp(0.0, 1.0)
    } else {
        1.0
    };
    raw + (snapped - raw) * t
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridSettings {
    pub enabled: bool,
    pub size: f32,
    pub divisions: u32,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            size: GRID_SIZE,
            divisions: GRID_DIVISIONS,
        }
    }
}

impl GridSettings {
    pub fn cell_size(&self) -> f32 {
        self.size / self.divisions.max(1) as f32
    }
}

/// Snaps each component of `position` to the grid's cell size.
pub fn grid_snap_vec3(position: Vec3, grid: &GridSettings) -> Vec3 {
    let cell = grid.cell_size();
    Vec3::new(
        grid_snap(position.x, cell),
        grid_snap(position.y, cell),
        grid_snap(position.z, cell),
    )
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RotationSnapSettings {
    pub enabled: bool,
    pub angle_degrees: f32,
}

impl Default for RotationSnapSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            angle_degrees: ROTATION_SNAP_DEGREES,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapStrength {
    pub enabled: bool,
    pub translation: f32,
    pub rotation: f32,
}

impl Default for SnapStrength {
    fn default() -> Self {
        Self {
            enabled: true,
            translation: 1.0,
            rotation: 1.0,
        }
    }
}

/// Everything that decides how a transform gesture is snapped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapConfig {
    pub grid: GridSettings,
    pub rotation: RotationSnapSettings,
    pub strength: SnapStrength,
}

impl SnapConfig {
    fn translation_strength(&self) -> f32 {
        if self.strength.enabled {
            self.strength.translation
        } else {
            1.0
        }
    }

    fn rotation_strength(&self) -> f32 {
        if self.strength.enabled {
            self.strength.rotation
        } else {
            1.0
        }
    }

    /// Applies grid snapping to a proposed position when the grid is on.
    pub fn apply_position(&self, raw: Vec3) -> Vec3 {
        if !self.grid.enabled {
            return raw;
        }
        let snapped = grid_snap_vec3(raw, &self.grid);
        let t = self.translation_strength();
        Vec3::new(
            snap_with_strength(raw.x, snapped.x, t),
            snap_with_strength(raw.y, snapped.y, t),
            snap_with_strength(raw.z, snapped.z, t),
        )
    }

    /// Applies rotation snapping to the yaw of a proposed rotation.
    ///
    /// Pitch and roll pass through; furniture only turns about Y.
    pub fn apply_rotation(&self, raw: Vec3) -> Vec3 {
        if !self.rotation.enabled {
            return raw;
        }
        let snapped = rotation_snap(raw.y, self.rotation.angle_degrees);
        Vec3::new(
            raw.x,
            snap_with_strength(raw.y, snapped, self.rotation_strength()),
            raw.z,
        )
    }

    pub fn has_changed(&self, previous: &SnapConfig) -> bool {
        self.grid != previous.grid || self.rotation != previous.rotation
    }
}

/// Snap configuration captured on an item at the moment it was locked.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockedSnapSettings {
    pub grid_enabled: bool,
    pub rotation_snap_enabled: bool,
    pub rotation_snap_angle: f32,
    pub grid_size: f32,
    pub grid_divisions: u32,
}

impl From<&SnapConfig> for LockedSnapSettings {
    fn from(config: &SnapConfig) -> Self {
        Self {
            grid_enabled: config.grid.enabled,
            rotation_snap_enabled: config.rotation.enabled,
            rotation_snap_angle: config.rotation.angle_degrees,
            grid_size: config.grid.size,
            grid_divisions: config.grid.divisions,
        }
    }
}
