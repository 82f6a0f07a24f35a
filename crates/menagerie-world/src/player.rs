//! The player-controlled actor.
//!
//! The player has a *natural* size that only grows by eating and a transient
//! multiplier from size power-ups. Every comparison against animals uses the
//! *effective* size, the product of the two.

use menagerie_types::{PlayerSnapshot, Vec2};

/// Static player parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerParams {
    /// Natural size at the start of a game.
    pub start_size: f32,
    /// Largest natural size reachable by eating.
    pub max_size: f32,
    /// Movement speed in units per second.
    pub speed: f32,
    /// Lives at the start of a game (also the maximum).
    pub max_lives: u32,
}

/// The player.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    /// Ground-plane position.
    pub position: Vec2,
    /// Heading in radians.
    pub heading: f32,
    /// Velocity from the last movement update.
    pub velocity: Vec2,
    /// Movement intent from the host (unit vector or zero).
    pub intent: Vec2,
    natural_size: f32,
    multiplier: f32,
    multiplier_until: f64,
    lives: u32,
    invulnerable_until: f64,
    alive: bool,
    params: PlayerParams,
}

impl Player {
    /// Create a player at `position` with full lives.
    pub fn new(params: PlayerParams, position: Vec2) -> Self {
        let max_size = params.max_size.max(params.start_size);
        let params = PlayerParams { max_size, ..params };
        Self {
            position,
            heading: 0.0,
            velocity: Vec2::ZERO,
            intent: Vec2::ZERO,
            natural_size: params.start_size,
            multiplier: 1.0,
            multiplier_until: 0.0,
            lives: params.max_lives,
            invulnerable_until: 0.0,
            alive: true,
            params,
        }
    }

    /// Static parameters.
    pub const fn params(&self) -> &PlayerParams {
        &self.params
    }

    /// Size from eating only.
    pub const fn natural_size(&self) -> f32 {
        self.natural_size
    }

    /// Active power-up multiplier (`1.0` when none).
    pub const fn multiplier(&self) -> f32 {
        self.multiplier
    }

    /// Natural size times the active multiplier.
    pub fn effective_size(&self) -> f32 {
        self.natural_size * self.multiplier
    }

    /// Collision radius (equal to effective size).
    pub fn radius(&self) -> f32 {
        self.effective_size()
    }

    /// Grow the natural size by `amount`, capped at the max size.
    /// Returns the new natural size.
    pub fn grow(&mut self, amount: f32) -> f32 {
        if amount.is_finite() && amount > 0.0 {
            self.natural_size = (self.natural_size + amount).min(self.params.max_size);
        }
        self.natural_size
    }

    /// Apply a temporary size multiplier until `until`.
    pub fn apply_multiplier(&mut self, multiplier: f32, until: f64) {
        if multiplier.is_finite() && multiplier > 0.0 {
            self.multiplier = multiplier;
            self.multiplier_until = until;
        }
    }

    /// Drop an expired multiplier. Returns whether one expired.
    pub fn expire_multiplier(&mut self, now: f64) -> bool {
        if self.multiplier > 1.0 && now >= self.multiplier_until {
            self.multiplier = 1.0;
            return true;
        }
        false
    }

    /// Remaining lives.
    pub const fn lives(&self) -> u32 {
        self.lives
    }

    /// Restore one life, capped at the maximum.
    pub fn add_life(&mut self) {
        self.lives = self.lives.saturating_add(1).min(self.params.max_lives);
    }

    /// Remove one life. Returns the lives left.
    pub const fn lose_life(&mut self) -> u32 {
        self.lives = self.lives.saturating_sub(1);
        self.lives
    }

    /// Whether predators are currently harmless.
    pub fn is_invulnerable(&self, now: f64) -> bool {
        now < self.invulnerable_until
    }

    /// Grant invulnerability until `until` (never shortens an active window).
    pub const fn grant_invulnerability(&mut self, until: f64) {
        if until > self.invulnerable_until {
            self.invulnerable_until = until;
        }
    }

    /// Put the player back at `center` with a fresh invulnerability window.
    pub fn respawn(&mut self, center: Vec2, now: f64, invulnerable_for: f64) {
        self.position = center;
        self.velocity = Vec2::ZERO;
        self.grant_invulnerability(now + invulnerable_for.max(0.0));
    }

    /// Whether the player is still in the game.
    pub const fn is_alive(&self) -> bool {
        self.alive
    }

    /// Mark the player as out of the game.
    pub const fn kill(&mut self) {
        self.alive = false;
        self.lives = 0;
    }

    /// Render-facing view.
    pub fn snapshot(&self, now: f64) -> PlayerSnapshot {
        PlayerSnapshot {
            position: self.position,
            heading: self.heading,
            natural_size: self.natural_size,
            effective_size: self.effective_size(),
            lives: self.lives,
            invulnerable: self.is_invulnerable(now),
            alive: self.alive,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> PlayerParams {
        PlayerParams {
            start_size: 1.0,
            max_size: 12.0,
            speed: 8.0,
            max_lives: 3,
        }
    }

    #[test]
    fn effective_size_includes_multiplier() {
        let mut player = Player::new(params(), Vec2::ZERO);
        player.apply_multiplier(1.5, 10.0);
        assert!((player.effective_size() - 1.5).abs() < f32::EPSILON);
        assert!(!player.expire_multiplier(5.0));
        assert!(player.expire_multiplier(10.0));
        assert!((player.effective_size() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn growth_is_capped() {
        let mut player = Player::new(params(), Vec2::ZERO);
        assert!((player.grow(0.5) - 1.5).abs() < f32::EPSILON);
        assert!((player.grow(100.0) - 12.0).abs() < f32::EPSILON);
        assert!((player.grow(f32::NAN) - 12.0).abs() < f32::EPSILON);
    }

    #[test]
    fn lives_are_bounded() {
        let mut player = Player::new(params(), Vec2::ZERO);
        player.add_life();
        assert_eq!(player.lives(), 3);
        assert_eq!(player.lose_life(), 2);
        player.lose_life();
        player.lose_life();
        assert_eq!(player.lose_life(), 0);
    }

    #[test]
    fn respawn_grants_invulnerability() {
        let mut player = Player::new(params(), Vec2::new(5.0, 5.0));
        player.respawn(Vec2::ZERO, 10.0, 3.0);
        assert_eq!(player.position, Vec2::ZERO);
        assert!(player.is_invulnerable(12.9));
        assert!(!player.is_invulnerable(13.0));
    }
}
