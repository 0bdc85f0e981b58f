//! Placed furniture and its confinement to the room.

use crate::constants::*;
use crate::room::RoomBoundaries;
use crate::snap::LockedSnapSettings;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Unscaled item size in metres.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    pub width: f32,
    pub depth: f32,
    pub height: f32,
}

impl Default for Footprint {
    fn default() -> Self {
        Self {
            width: 1.0,
            depth: 1.0,
            height: 1.0,
        }
    }
}

#[inline]
fn positive_or_unit(v: f32) -> f32 {
    if v.is_finite() && v > 0.0 {
        v
    } else {
        1.0
    }
}

#[inline]
fn finite_or(v: f32, default: f32) -> f32 {
    if v.is_finite() {
        v
    } else {
        default
    }
}

impl Footprint {
    pub fn new(width: f32, depth: f32, height: f32) -> Self {
        Self {
            width,
            depth,
            height,
        }
    }

    /// Zero, negative and non-finite dimensions read as one unit.
    pub fn sanitized(&self) -> Self {
        Self {
            width: positive_or_unit(self.width),
            depth: positive_or_unit(self.depth),
            height: positive_or_unit(self.height),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedItem {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub model_path: Option<String>,
    pub position: Vec3,
    /// Euler XYZ in radians; yaw is `.y`.
    #[serde(default)]
    pub rotation: Vec3,
    #[serde(default = "unit_scale")]
    pub scale: Vec3,
    #[serde(default)]
    pub footprint: Footprint,
    #[serde(default, rename = "isLocked")]
    pub locked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snap_settings: Option<LockedSnapSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub furniture_id: Option<String>,
}

fn unit_scale() -> Vec3 {
    Vec3::ONE
}

impl PlacedItem {
    pub fn new(id: impl Into<String>, footprint: Footprint) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            model_path: None,
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            footprint,
            locked: false,
            snap_settings: None,
            furniture_id: None,
        }
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn with_yaw(mut self, yaw: f32) -> Self {
        self.rotation.y = yaw;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }

    /// Copy with non-finite transform components replaced by defaults
    /// (0 for position/rotation, 1 for scale) and a sanitized footprint.
    pub fn sanitized(&self) -> Self {
        let mut out = self.clone();
        out.position = Vec3::new(
            finite_or(self.position.x, 0.0),
            finite_or(self.position.y, 0.0),
            finite_or(self.position.z, 0.0),
        );
        out.rotation = Vec3::new(
            finite_or(self.rotation.x, 0.0),
            finite_or(self.rotation.y, 0.0),
            finite_or(self.rotation.z, 0.0),
        );
        out.scale = Vec3::new(
            finite_or(self.scale.x, 1.0),
            finite_or(self.scale.y, 1.0),
            finite_or(self.scale.z, 1.0),
        );
        out.footprint = self.footprint.sanitized();
        out
    }

    /// Half extents on the floor plane after scale and yaw.
    pub fn planar_half_extents(&self) -> (f32, f32) {
        let fp = self.footprint.sanitized();
        let scale = self.scale.abs();
        let base_half_w = fp.width * scale.x / 2.0;
        let base_half_d = fp.depth * scale.z / 2.0;
        let yaw = finite_or(self.rotation.y, 0.0);
        let c = yaw.cos().abs();
        let s = yaw.sin().abs();
        (c * base_half_w + s * base_half_d, s * base_half_w + c * base_half_d)
    }

    pub fn scaled_height(&self) -> f32 {
        self.footprint.sanitized().height * self.scale.y.abs()
    }
}

/// Axis-aligned bounds of an item resting at its position (base at `y`).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ItemBounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl ItemBounds {
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn fits_within(&self, room: &RoomBoundaries) -> bool {
        self.min.x >= room.min_x - EPSILON
            && self.max.x <= room.max_x + EPSILON
            && self.min.y >= room.min_y - EPSILON
            && self.max.y <= room.max_y + EPSILON
            && self.min.z >= room.min_z - EPSILON
            && self.max.z <= room.max_z + EPSILON
    }
}

/// Bounds from footprint, scale and yaw, padded by `safety_margin` on each side
/// (top only in Y; the base sits on `position.y`).
pub fn item_bounds(item: &PlacedItem, safety_margin: f32) -> ItemBounds {
    let item = item.sanitized();
    let (half_x, half_z) = item.planar_half_extents();
    let p = item.position;
    ItemBounds {
        min: Vec3::new(
            p.x - (half_x + safety_margin),
            p.y,
            p.z - (half_z + safety_margin),
        ),
        max: Vec3::new(
            p.x + (half_x + safety_margin),
            p.y + item.scaled_height() + safety_margin,
            p.z + (half_z + safety_margin),
        ),
    }
}

pub fn is_in_room(item: &PlacedItem, room: &RoomBoundaries, safety_margin: f32) -> bool {
    item_bounds(item, safety_margin).fits_within(room)
}

// Shift needed on one axis to bring [lo, hi] inside [min, max]; the min wall
// wins when the span is wider than the room.
#[inline]
fn axis_correction(lo: f32, hi: f32, min: f32, max: f32) -> f32 {
    if hi - lo > max - min + EPSILON {
        if (lo - min).abs() <= EPSILON {
            0.0
        } else {
            min - lo
        }
    } else if lo < min - EPSILON {
        min - lo
    } else if hi > max + EPSILON {
        max - hi
    } else {
        0.0
    }
}

/// Moves `item` back inside the room by exactly the amount each axis overshoots.
///
/// Every axis is measured against the original position, so corrections on
/// X, Y and Z never compound. Items already inside come back unchanged.
pub fn constrain_to_room(item: &PlacedItem, room: &RoomBoundaries, safety_margin: f32) -> PlacedItem {
    let mut out = item.sanitized();
    let b = item_bounds(&out, safety_margin);
    let shift = Vec3::new(
        axis_correction(b.min.x, b.max.x, room.min_x, room.max_x),
        axis_correction(b.min.y, b.max.y, room.min_y, room.max_y),
        axis_correction(b.min.z, b.max.z, room.min_z, room.max_z),
    );
    if shift != Vec3::ZERO {
        let from = out.position;
        out.position += shift;
        log::debug!(
            "[placement] constrained {} ({:.2},{:.2},{:.2}) -> ({:.2},{:.2},{:.2})",
            out.display_name(),
            from.x,
            from.y,
            from.z,
            out.position.x,
            out.position.y,
            out.position.z
        );
    }
    out
}
