//! Balancerio - a lever-balancing puzzle about torque
//!
//! Core modules:
//! - `sim`: Deterministic game core (levels, placements, balance math, session)
//! - `input`: Drag/touch payloads and lever cell hit-testing
//! - `settings`: Presentation preferences

pub mod input;
pub mod settings;
pub mod sim;

pub use input::{CellHitbox, DragState, hit_test};
pub use settings::Settings;
pub use sim::{Intent, LevelSet, Session, update};

/// Game configuration constants
pub mod consts {
    /// Cells run from -BEAM_HALF_SPAN to +BEAM_HALF_SPAN; 0 is the fulcrum
    pub const BEAM_HALF_SPAN: i32 = 3;
    /// The fulcrum never holds pieces
    pub const FULCRUM: i32 = 0;

    /// Beam tilt per unit of moment difference (degrees)
    pub const ROTATION_GAIN: f64 = 1.5;
    /// Beam tilt limit (degrees, both directions)
    pub const MAX_ROTATION_DEG: f64 = 12.0;

    /// |difference| below this is balanced
    pub const BALANCED_EPSILON: f64 = 0.01;
    /// |difference| below this is close
    pub const CLOSE_THRESHOLD: f64 = 2.0;

    /// Balance indicator: knob percent at zero difference
    pub const INDICATOR_CENTER_PCT: f64 = 50.0;
    /// Balance indicator: percent moved per unit of difference
    pub const INDICATOR_GAIN_PCT: f64 = 4.0;
    pub const INDICATOR_MIN_PCT: f64 = 5.0;
    pub const INDICATOR_MAX_PCT: f64 = 95.0;

    /// Celebration overlay animation length (ms)
    pub const CELEBRATION_MS: u32 = 2000;
}

/// Every lever position from left tip to right tip, fulcrum included
pub fn beam_positions() -> impl Iterator<Item = i32> {
    -consts::BEAM_HALF_SPAN..=consts::BEAM_HALF_SPAN
}

/// Horizontal placement of a lever position along the beam, in percent
#[inline]
pub fn beam_percent(position: i32) -> f64 {
    let span = f64::from(consts::BEAM_HALF_SPAN);
    (f64::from(position) + span) / (2.0 * span) * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_beam_positions_cover_span() {
        let all: Vec<i32> = beam_positions().collect();
        assert_eq!(all, vec![-3, -2, -1, 0, 1, 2, 3]);
    }

    #[test]
    fn test_beam_percent() {
        assert!((beam_percent(-3) - 0.0).abs() < 1e-9);
        assert!((beam_percent(0) - 50.0).abs() < 1e-9);
        assert!((beam_percent(3) - 100.0).abs() < 1e-9);
    }
}
