//! Size-class banding and size clamping.
//!
//! A transfer's value maps to a magnitude `log10(value + 1)`, clamped to
//! `[0, MAX_MAGNITUDE]`. The magnitude picks a [`SizeClass`], and the
//! position of the magnitude inside the class band picks the spawn size
//! inside the class's spawn range. Sizes are always kept within
//! `[MIN_SIZE, class ceiling]`.
//!
//! | Class    | Magnitude band | Spawn size    | Ceiling |
//! |----------|----------------|---------------|---------|
//! | Tiny     | 0 -- 1         | 0.30 -- 0.55  | 1.4     |
//! | Small    | 1 -- 2         | 0.55 -- 0.85  | 2.2     |
//! | Medium   | 2 -- 3         | 0.85 -- 1.25  | 3.4     |
//! | Large    | 3 -- 4         | 1.25 -- 1.80  | 5.0     |
//! | Huge     | 4 -- 5.5       | 1.80 -- 2.60  | 7.5     |
//! | Colossal | 5.5 -- 12      | 2.60 -- 3.60  | 12.0    |

use menagerie_types::SizeClass;

/// Smallest size any animal can have.
pub const MIN_SIZE: f32 = 0.3;

/// Largest magnitude considered; `log10(1e12 + 1)` is just above 12.
pub const MAX_MAGNITUDE: f64 = 12.0;

/// Static sizing parameters for one size class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeBand {
    /// Inclusive lower magnitude bound.
    pub magnitude_floor: f64,
    /// Exclusive upper magnitude bound (inclusive for the top class).
    pub magnitude_ceiling: f64,
    /// Spawn size at the bottom of the band.
    pub spawn_min: f32,
    /// Spawn size at the top of the band.
    pub spawn_max: f32,
    /// Largest size an animal of this class may grow to.
    pub ceiling: f32,
}

/// Return the sizing band for a class.
pub const fn band(class: SizeClass) -> SizeBand {
    match class {
        SizeClass::Tiny => SizeBand {
            magnitude_floor: 0.0,
            magnitude_ceiling: 1.0,
            spawn_min: MIN_SIZE,
            spawn_max: 0.55,
            ceiling: 1.4,
        },
        SizeClass::Small => SizeBand {
            magnitude_floor: 1.0,
            magnitude_ceiling: 2.0,
            spawn_min: 0.55,
            spawn_max: 0.85,
            ceiling: 2.2,
        },
        SizeClass::Medium => SizeBand {
            magnitude_floor: 2.0,
            magnitude_ceiling: 3.0,
            spawn_min: 0.85,
            spawn_max: 1.25,
            ceiling: 3.4,
        },
        SizeClass::Large => SizeBand {
            magnitude_floor: 3.0,
            magnitude_ceiling: 4.0,
            spawn_min: 1.25,
            spawn_max: 1.8,
            ceiling: 5.0,
        },
        SizeClass::Huge => SizeBand {
            magnitude_floor: 4.0,
            magnitude_ceiling: 5.5,
            spawn_min: 1.8,
            spawn_max: 2.6,
            ceiling: 7.5,
        },
        SizeClass::Colossal => SizeBand {
            magnitude_floor: 5.5,
            magnitude_ceiling: MAX_MAGNITUDE,
            spawn_min: 2.6,
            spawn_max: 3.6,
            ceiling: 12.0,
        },
    }
}

/// `log10(value + 1)` clamped to `[0, MAX_MAGNITUDE]`; non-finite input maps to 0.
pub fn magnitude(value: f64) -> f64 {
    if !value.is_finite() || value <= 0.0 {
        return 0.0;
    }
    (value + 1.0).log10().clamp(0.0, MAX_MAGNITUDE)
}

/// Size class for a transfer value.
pub fn size_class_for_value(value: f64) -> SizeClass {
    let mag = magnitude(value);
    SizeClass::ALL
        .into_iter()
        .find(|class| mag < band(*class).magnitude_ceiling)
        .unwrap_or(SizeClass::Colossal)
}

/// Spawn size for a transfer value, interpolated inside its class band.
pub fn spawn_size_for_value(value: f64) -> f32 {
    let class = size_class_for_value(value);
    let b = band(class);
    let span = b.magnitude_ceiling - b.magnitude_floor;
    let t = if span > 0.0 {
        ((magnitude(value) - b.magnitude_floor) / span).clamp(0.0, 1.0)
    } else {
        0.0
    };
    #[allow(clippy::cast_possible_truncation)]
    let t = t as f32;
    clamp_size(b.spawn_min + (b.spawn_max - b.spawn_min) * t, class)
}

/// Growth ceiling for a class.
pub const fn ceiling(class: SizeClass) -> f32 {
    band(class).ceiling
}

/// Clamp a size into `[MIN_SIZE, ceiling(class)]`; NaN maps to `MIN_SIZE`.
pub fn clamp_size(size: f32, class: SizeClass) -> f32 {
    if size.is_nan() {
        return MIN_SIZE;
    }
    size.clamp(MIN_SIZE, ceiling(class))
}
