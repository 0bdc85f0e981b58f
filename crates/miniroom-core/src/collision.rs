//! Item-to-item overlap checks and the spiral search for a free spot.

use crate::constants::*;
use crate::placement::PlacedItem;
use glam::Vec3;

/// Collision box: like `item_bounds` but centred on `position.y`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CollisionBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl CollisionBox {
    pub fn of(item: &PlacedItem) -> Self {
        let item = item.sanitized();
        let (half_x, half_z) = item.planar_half_extents();
        let half = Vec3::new(
            half_x + FURNITURE_SAFETY_MARGIN,
            item.scaled_height() / 2.0 + FURNITURE_SAFETY_MARGIN,
            half_z + FURNITURE_SAFETY_MARGIN,
        );
        Self {
            min: item.position - half,
            max: item.position + half,
        }
    }

    pub fn overlaps(&self, other: &CollisionBox) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }
}

pub fn items_collide(a: &PlacedItem, b: &PlacedItem) -> bool {
    CollisionBox::of(a).overlaps(&CollisionBox::of(b))
}

/// Ids of every item in `all` that overlaps `target`, skipping the target's
/// own id and `exclude`.
pub fn collisions_with_others<'a>(
    target: &PlacedItem,
    all: &'a [PlacedItem],
    exclude: Option<&str>,
) -> Vec<&'a str> {
    let target_box = CollisionBox::of(target);
    all.iter()
        .filter(|it| it.id != target.id && Some(it.id.as_str()) != exclude)
        .filter(|it| target_box.overlaps(&CollisionBox::of(it)))
        .map(|it| it.id.as_str())
        .collect()
}

/// Nearest free position along an outward spiral, or `None` after
/// `max_attempts` candidates. The current position is returned when it is free.
pub fn find_non_colliding_position(
    target: &PlacedItem,
    all: &[PlacedItem],
    max_attempts: u32,
) -> Option<Vec3> {
    let origin = target.position;
    if collisions_with_others(target, all, None).is_empty() {
        return Some(origin);
    }
    let mut candidate = target.clone();
    for attempt in 1..=max_attempts {
        let angle = (attempt as f32 * 0.5) % std::f32::consts::TAU;
        let radius = (attempt as f32 * SAFE_SEARCH_STEP).min(SAFE_SEARCH_MAX_RADIUS);
        candidate.position = Vec3::new(
            origin.x + angle.cos() * radius,
            origin.y,
            origin.z + angle.sin() * radius,
        );
        if collisions_with_others(&candidate, all, None).is_empty() {
            log::debug!("[collision] free spot for {} after {} tries", target.id, attempt);
            return Some(candidate.position);
        }
    }
    log::warn!(
        "[collision] no free position for {} within {} attempts",
        target.id,
        max_attempts
    );
    None
}

/// `target` moved to the nearest free position, or unchanged if none exists.
pub fn move_to_safe_position(target: &PlacedItem, all: &[PlacedItem]) -> PlacedItem {
    match find_non_colliding_position(target, all, SAFE_SEARCH_ATTEMPTS) {
        Some(position) => PlacedItem {
            position,
            ..target.clone()
        },
        None => {
            log::warn!("[collision] keeping {} in place", target.display_name());
            target.clone()
        }
    }
}
