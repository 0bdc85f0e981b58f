//! Room dimensions and the inward-offset box that furniture must stay inside.

use crate::constants::*;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Axis-aligned room centred on the origin in X/Z with the floor at Y = 0.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDimensions {
    pub width: f32,
    pub depth: f32,
    pub height: f32,
    pub wall_thickness: f32,
    pub margin: f32,
}

impl Default for RoomDimensions {
    fn default() -> Self {
        Self {
            width: ROOM_WIDTH,
            depth: ROOM_DEPTH,
            height: ROOM_HEIGHT,
            wall_thickness: ROOM_WALL_THICKNESS,
            margin: ROOM_MARGIN,
        }
    }
}

/// Field-wise partial update for [`RoomDimensions`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDimensionsPatch {
    pub width: Option<f32>,
    pub depth: Option<f32>,
    pub height: Option<f32>,
    pub wall_thickness: Option<f32>,
    pub margin: Option<f32>,
}

/// Inclusive limits an item's bounds must respect.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RoomBoundaries {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
    pub min_z: f32,
    pub max_z: f32,
}

impl RoomDimensions {
    pub fn boundaries(&self) -> RoomBoundaries {
        let half_width = self.width / 2.0;
        let half_depth = self.depth / 2.0;
        RoomBoundaries {
            min_x: -half_width + self.margin,
            max_x: half_width - self.margin,
            min_y: 0.0,
            max_y: self.height - self.margin,
            min_z: -half_depth + self.margin,
            max_z: half_depth - self.margin,
        }
    }

    pub fn apply(&mut self, patch: RoomDimensionsPatch) {
        if let Some(v) = patch.width {
            self.width = v;
        }
        if let Some(v) = patch.depth {
            self.depth = v;
        }
        if let Some(v) = patch.height {
            self.height = v;
        }
        if let Some(v) = patch.wall_thickness {
            self.wall_thickness = v;
        }
        if let Some(v) = patch.margin {
            self.margin = v;
        }
        log::debug!(
            "[room] dimensions now {}x{}x{} (wall {}, margin {})",
            self.width,
            self.depth,
            self.height,
            self.wall_thickness,
            self.margin
        );
    }
}

impl RoomBoundaries {
    /// Closed floor polygon (first point repeated) for drawing the boundary.
    pub fn outline(&self) -> [Vec3; 5] {
        [
            Vec3::new(self.min_x, 0.0, self.min_z),
            Vec3::new(self.max_x, 0.0, self.min_z),
            Vec3::new(self.max_x, 0.0, self.max_z),
            Vec3::new(self.min_x, 0.0, self.max_z),
            Vec3::new(self.min_x, 0.0, self.min_z),
        ]
    }

    pub fn min(&self) -> Vec3 {
        Vec3::new(self.min_x, self.min_y, self.min_z)
    }

    pub fn max(&self) -> Vec3 {
        Vec3::new(self.max_x, self.max_y, self.max_z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_room_boundaries() {
        let b = RoomDimensions::default().boundaries();
        assert!((b.min_x + 4.7).abs() < 1e-6);
        assert!((b.max_x - 4.7).abs() < 1e-6);
        assert!((b.min_z + 4.7).abs() < 1e-6);
        assert!((b.max_z - 4.7).abs() < 1e-6);
        assert_eq!(b.min_y, 0.0);
        assert!((b.max_y - 4.7).abs() < 1e-6);
    }

    #[test]
    fn patch_only_touches_given_fields() {
        let mut dims = RoomDimensions::default();
        dims.apply(RoomDimensionsPatch {
            width: Some(15.0),
            margin: Some(0.5),
            ..Default::default()
        });
        assert_eq!(dims.width, 15.0);
        assert_eq!(dims.margin, 0.5);
        assert_eq!(dims.depth, ROOM_DEPTH);
        assert_eq!(dims.height, ROOM_HEIGHT);
        let b = dims.boundaries();
        assert!((b.min_x + 7.0).abs() < 1e-6);
        assert!((b.max_x - 7.0).abs() < 1e-6);
    }

    #[test]
    fn outline_is_closed() {
        let outline = RoomDimensions::default().boundaries().outline();
        assert_eq!(outline[0], outline[4]);
        assert!(outline.iter().all(|p| p.y == 0.0));
    }
}
