//! Wall-facing orientation for items placed against a wall.

use crate::room::RoomBoundaries;
use glam::{Quat, Vec3};
use std::str::FromStr;

/// Model-space axis, as written in catalog metadata (`"+z"`, `"-x"`, ...).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Axis {
    PosX,
    NegX,
    PosY,
    NegY,
    #[default]
    PosZ,
    NegZ,
}

impl FromStr for Axis {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+x" => Ok(Axis::PosX),
            "-x" => Ok(Axis::NegX),
            "+y" => Ok(Axis::PosY),
            "-y" => Ok(Axis::NegY),
            "+z" => Ok(Axis::PosZ),
            "-z" => Ok(Axis::NegZ),
            _ => Err(()),
        }
    }
}

impl Axis {
    /// Parses an optional axis string, falling back to `+z` (model front).
    pub fn parse_or_front(s: Option<&str>) -> Self {
        s.and_then(|s| s.parse().ok()).unwrap_or_default()
    }

    pub fn to_vec3(self) -> Vec3 {
        match self {
            Axis::PosX => Vec3::X,
            Axis::NegX => Vec3::NEG_X,
            Axis::PosY => Vec3::Y,
            Axis::NegY => Vec3::NEG_Y,
            Axis::PosZ => Vec3::Z,
            Axis::NegZ => Vec3::NEG_Z,
        }
    }
}

/// Inward-pointing normal of the wall closest to `p`. X walls win ties.
pub fn nearest_wall_normal(room: &RoomBoundaries, p: Vec3) -> Vec3 {
    let dx_min = (p.x - room.min_x).abs();
    let dx_max = (p.x - room.max_x).abs();
    let dz_min = (p.z - room.min_z).abs();
    let dz_max = (p.z - room.max_z).abs();

    if dx_min.min(dx_max) <= dz_min.min(dz_max) {
        if dx_min < dx_max {
            Vec3::X
        } else {
            Vec3::NEG_X
        }
    } else if dz_min < dz_max {
        Vec3::Z
    } else {
        Vec3::NEG_Z
    }
}

#[inline]
fn project_on_plane(v: Vec3, normal: Vec3) -> Vec3 {
    v - normal * v.dot(normal)
}

/// Rotation that turns the model's `front` axis onto `-wall_normal` and then
/// rolls `up` as close to world up as the wall plane allows.
pub fn facing_rotation(front: Axis, up: Axis, wall_normal: Vec3) -> Quat {
    let normal = wall_normal.normalize_or_zero();
    let target = -normal;
    let q1 = Quat::from_rotation_arc(front.to_vec3(), target);

    let up_after = q1 * up.to_vec3();
    let up_proj = project_on_plane(up_after, normal);
    let world_up_proj = project_on_plane(Vec3::Y, normal);
    if up_proj.length_squared() < 1e-6 || world_up_proj.length_squared() < 1e-6 {
        return q1;
    }
    let q2 = Quat::from_rotation_arc(up_proj.normalize(), world_up_proj.normalize());
    q2 * q1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::room::RoomDimensions;

    #[test]
    fn parses_axes_with_front_default() {
        assert_eq!(Axis::parse_or_front(Some("-x")), Axis::NegX);
        assert_eq!(Axis::parse_or_front(Some("sideways")), Axis::PosZ);
        assert_eq!(Axis::parse_or_front(None), Axis::PosZ);
    }

    #[test]
    fn nearest_wall_points_inward() {
        let room = RoomDimensions::default().boundaries();
        assert_eq!(nearest_wall_normal(&room, Vec3::new(-4.5, 0.0, 0.0)), Vec3::X);
        assert_eq!(nearest_wall_normal(&room, Vec3::new(4.5, 0.0, 1.0)), Vec3::NEG_X);
        assert_eq!(nearest_wall_normal(&room, Vec3::new(0.0, 0.0, -4.4)), Vec3::Z);
        assert_eq!(nearest_wall_normal(&room, Vec3::new(1.0, 0.0, 4.4)), Vec3::NEG_Z);
    }

    #[test]
    fn front_turns_onto_negated_normal() {
        // front is turned onto the negated normal
        let q = facing_rotation(Axis::PosZ, Axis::PosY, Vec3::NEG_X);
        let front = q * Vec3::Z;
        assert!(front.abs_diff_eq(Vec3::X, 1e-5), "front={front:?}");
        let up = q * Vec3::Y;
        assert!(up.abs_diff_eq(Vec3::Y, 1e-5), "up={up:?}");
    }
}
