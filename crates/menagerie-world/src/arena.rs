//! The bounded square arena everything lives in.
//!
//! The arena is centered on the origin and spans `[-half_extent, half_extent]`
//! on both axes. Actors that touch an edge have their heading reflected by
//! `PI` and their position clamped back inside.

use core::f32::consts::PI;

use menagerie_types::{Vec2, wrap_angle};
use rand::Rng;

/// Smallest allowed half extent.
const MIN_HALF_EXTENT: f32 = 5.0;

/// Result of checking a position against the arena edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryContact {
    /// Position clamped inside the arena.
    pub position: Vec2,
    /// Heading, reflected by `PI` if an edge was hit.
    pub heading: f32,
    /// Whether any edge was touched.
    pub hit: bool,
}

/// Square arena centered on the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arena {
    half_extent: f32,
}

impl Arena {
    /// Create an arena; non-finite or tiny extents are raised to a sane minimum.
    pub fn new(half_extent: f32) -> Self {
        let half_extent = if half_extent.is_finite() {
            half_extent.max(MIN_HALF_EXTENT)
        } else {
            MIN_HALF_EXTENT
        };
        Self { half_extent }
    }

    /// Half the side length.
    pub const fn half_extent(&self) -> f32 {
        self.half_extent
    }

    /// The arena center, where the player respawns.
    pub const fn center(&self) -> Vec2 {
        Vec2::ZERO
    }

    /// Whether a point lies inside (edges included).
    pub fn contains(&self, point: Vec2) -> bool {
        point.x.abs() <= self.half_extent && point.y.abs() <= self.half_extent
    }

    /// Clamp a point inside the arena. Non-finite points collapse to the center.
    pub fn clamp(&self, point: Vec2) -> Vec2 {
        if !point.is_finite() {
            return self.center();
        }
        Vec2::new(
            point.x.clamp(-self.half_extent, self.half_extent),
            point.y.clamp(-self.half_extent, self.half_extent),
        )
    }

    /// Reflect `heading` by `PI` and clamp `position` if it left the arena.
    pub fn reflect(&self, position: Vec2, heading: f32) -> BoundaryContact {
        if self.contains(position) && position.is_finite() {
            return BoundaryContact {
                position,
                heading,
                hit: false,
            };
        }
        BoundaryContact {
            position: self.clamp(position),
            heading: wrap_angle(heading + PI),
            hit: true,
        }
    }

    /// Uniform random point at least `margin` away from every edge.
    pub fn random_point(&self, rng: &mut impl Rng, margin: f32) -> Vec2 {
        let limit = (self.half_extent - margin.max(0.0)).max(0.0);
        if limit <= 0.0 {
            return self.center();
        }
        Vec2::new(
            rng.random_range(-limit..=limit),
            rng.random_range(-limit..=limit),
        )
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    #[test]
    fn inside_positions_are_untouched() {
        let arena = Arena::new(50.0);
        let contact = arena.reflect(Vec2::new(10.0, -20.0), 0.5);
        assert!(!contact.hit);
        assert!((contact.heading - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn edge_contact_reflects_and_clamps() {
        let arena = Arena::new(50.0);
        let contact = arena.reflect(Vec2::new(53.0, 0.0), 0.0);
        assert!(contact.hit);
        assert!((contact.position.x - 50.0).abs() < f32::EPSILON);
        assert!((contact.heading.abs() - PI).abs() < 1e-5);
    }

    #[test]
    fn non_finite_positions_return_to_center() {
        let arena = Arena::new(50.0);
        let contact = arena.reflect(Vec2::new(f32::NAN, 1.0), 0.0);
        assert!(contact.hit);
        assert_eq!(contact.position, Vec2::ZERO);
    }

    #[test]
    fn random_points_respect_margin() {
        let arena = Arena::new(20.0);
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..200 {
            let p = arena.random_point(&mut rng, 5.0);
            assert!(p.x.abs() <= 15.0 && p.y.abs() <= 15.0);
        }
    }

    #[test]
    fn degenerate_extent_is_raised() {
        let arena = Arena::new(f32::NAN);
        assert!((arena.half_extent() - MIN_HALF_EXTENT).abs() < f32::EPSILON);
    }
}
