//! Fixed per-size-class speed profiles.
//!
//! Bigger animals cruise and flee slower but chase and hunt faster, and they
//! notice the player from further away.
//!
//! | Class    | Wander | Flee | Chase | Hunt | Detection |
//! |----------|--------|------|-------|------|-----------|
//! | Tiny     | 2.0    | 7.5  | 5.0   | 6.0  | 12        |
//! | Small    | 1.8    | 7.0  | 5.5   | 6.5  | 13        |
//! | Medium   | 1.6    | 6.5  | 6.0   | 7.0  | 14        |
//! | Large    | 1.4    | 6.0  | 6.5   | 7.0  | 15        |
//! | Huge     | 1.2    | 5.5  | 6.8   | 7.2  | 16        |
//! | Colossal | 1.0    | 5.0  | 7.0   | 7.5  | 18        |

use menagerie_types::SizeClass;

/// Movement constants for one size class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedProfile {
    /// Cruising speed while wandering.
    pub wander: f32,
    /// Speed while fleeing, before the panic bonus.
    pub flee: f32,
    /// Speed while chasing the player, before attenuation.
    pub chase: f32,
    /// Speed while hunting another animal.
    pub hunt: f32,
    /// Distance at which the player is noticed.
    pub detection_radius: f32,
}

/// The speed profile for a class.
pub const fn profile(class: SizeClass) -> SpeedProfile {
    match class {
        SizeClass::Tiny => SpeedProfile {
            wander: 2.0,
            flee: 7.5,
            chase: 5.0,
            hunt: 6.0,
            detection_radius: 12.0,
        },
        SizeClass::Small => SpeedProfile {
            wander: 1.8,
            flee: 7.0,
            chase: 5.5,
            hunt: 6.5,
            detection_radius: 13.0,
        },
        SizeClass::Medium => SpeedProfile {
            wander: 1.6,
            flee: 6.5,
            chase: 6.0,
            hunt: 7.0,
            detection_radius: 14.0,
        },
        SizeClass::Large => SpeedProfile {
            wander: 1.4,
            flee: 6.0,
            chase: 6.5,
            hunt: 7.0,
            detection_radius: 15.0,
        },
        SizeClass::Huge => SpeedProfile {
            wander: 1.2,
            flee: 5.5,
            chase: 6.8,
            hunt: 7.2,
            detection_radius: 16.0,
        },
        SizeClass::Colossal => SpeedProfile {
            wander: 1.0,
            flee: 5.0,
            chase: 7.0,
            hunt: 7.5,
            detection_radius: 18.0,
        },
    }
}

/// Cruising speed for a class; used as an animal's base speed at spawn.
pub const fn base_speed(class: SizeClass) -> f32 {
    profile(class).wander
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn larger_classes_chase_faster_and_wander_slower() {
        for pair in SizeClass::ALL.windows(2) {
            if let [smaller, larger] = pair {
                let s = profile(*smaller);
                let l = profile(*larger);
                assert!(l.wander < s.wander);
                assert!(l.flee < s.flee);
                assert!(l.chase > s.chase);
                assert!(l.hunt >= s.hunt);
                assert!(l.detection_radius > s.detection_radius);
            }
        }
    }

    #[test]
    fn fleeing_is_faster_than_wandering() {
        for class in SizeClass::ALL {
            let p = profile(class);
            assert!(p.flee > p.wander);
        }
    }
}
