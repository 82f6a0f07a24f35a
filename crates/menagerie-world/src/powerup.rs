//! Collectible power-ups.

use menagerie_types::{PowerUpId, PowerUpKind, PowerUpSnapshot, Vec2};

/// A power-up lying in the arena, waiting to be collected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerUp {
    /// Unique id.
    pub id: PowerUpId,
    /// What it does when collected.
    pub kind: PowerUpKind,
    /// Position.
    pub position: Vec2,
    /// Pickup radius.
    pub radius: f32,
    /// Simulation time after which it disappears uncollected.
    pub expires_at: f64,
}

impl PowerUp {
    /// Whether the power-up has outlived its lifetime.
    pub fn is_expired(&self, now: f64) -> bool {
        now >= self.expires_at
    }

    /// Whether a circle at `point` with `radius` touches this power-up.
    pub fn touches(&self, point: Vec2, radius: f32) -> bool {
        self.position.distance(point) <= self.radius + radius
    }

    /// Render-facing view.
    pub const fn snapshot(&self) -> PowerUpSnapshot {
        PowerUpSnapshot {
            id: self.id,
            kind: self.kind,
            position: self.position,
        }
    }
}
