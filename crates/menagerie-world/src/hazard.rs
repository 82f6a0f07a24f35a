//! Static circular obstacles scattered at world creation.

use menagerie_types::{HazardId, HazardSnapshot, Vec2};
use rand::Rng;

use crate::arena::Arena;

/// Attempts per hazard before giving up on finding a free spot.
const PLACEMENT_ATTEMPTS: u32 = 32;

/// A static obstacle. Hazards never move and never destroy anything.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hazard {
    /// Unique id.
    pub id: HazardId,
    /// Center.
    pub position: Vec2,
    /// Radius.
    pub radius: f32,
}

impl Hazard {
    /// Render-facing view.
    pub const fn snapshot(&self) -> HazardSnapshot {
        HazardSnapshot {
            id: self.id,
            position: self.position,
            radius: self.radius,
        }
    }

    /// How far `point` (with its own `radius`) overlaps this hazard, if at all.
    pub fn penetration(&self, point: Vec2, radius: f32) -> Option<f32> {
        let overlap = self.radius + radius - self.position.distance(point);
        (overlap > 0.0).then_some(overlap)
    }

    /// Push a circle at `point` out of this hazard. Returns the corrected
    /// position, or `None` if there was no contact.
    pub fn push_out(&self, point: Vec2, radius: f32) -> Option<Vec2> {
        let overlap = self.penetration(point, radius)?;
        let away = (point - self.position)
            .normalized()
            .unwrap_or_else(|| Vec2::new(1.0, 0.0));
        Some(point + away * overlap)
    }
}

/// Parameters for scattering hazards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HazardLayout {
    /// How many hazards to place.
    pub count: u32,
    /// Smallest radius.
    pub min_radius: f32,
    /// Largest radius.
    pub max_radius: f32,
    /// No hazard may overlap this radius around the arena center.
    pub keep_out_radius: f32,
}

/// Scatter hazards across the arena, avoiding the center and each other.
///
/// Placement is best-effort: a hazard that cannot find a free spot after a
/// bounded number of attempts is skipped, so the result may hold fewer than
/// `layout.count` entries on a crowded arena.
pub fn scatter(arena: &Arena, layout: &HazardLayout, rng: &mut impl Rng) -> Vec<Hazard> {
    let min_radius = layout.min_radius.max(0.1);
    let max_radius = layout.max_radius.max(min_radius);
    let mut hazards: Vec<Hazard> = Vec::new();
    let mut next_id: u64 = 0;

    for _ in 0..layout.count {
        for _ in 0..PLACEMENT_ATTEMPTS {
            let radius = rng.random_range(min_radius..=max_radius);
            let position = arena.random_point(rng, radius);
            if position.length() < layout.keep_out_radius + radius {
                continue;
            }
            let clear = hazards
                .iter()
                .all(|h| h.position.distance(position) > h.radius + radius);
            if clear {
                next_id = next_id.saturating_add(1);
                hazards.push(Hazard {
                    id: HazardId::from_raw(next_id),
                    position,
                    radius,
                });
                break;
            }
        }
    }

    hazards
}
