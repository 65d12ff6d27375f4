//! Balance engine
//!
//! Pure functions from a `Board` to physical and display quantities. Nothing
//! here is cached; callers recompute after every board change.

use super::board::Board;
use crate::consts::*;

/// Turning moments on each side of the fulcrum
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Moments {
    pub left: f64,
    pub right: f64,
    /// `left - right`; positive tips the beam left-down
    pub difference: f64,
    /// At least one player-placed piece is on the lever
    pub has_user_pieces: bool,
}

impl Moments {
    /// Win condition: the player has contributed and the beam is level
    pub fn is_solved(&self) -> bool {
        self.has_user_pieces && classify(self.difference) == BalanceClass::Balanced
    }
}

/// Sum weight x distance on both sides of the fulcrum
pub fn compute_moments(board: &Board) -> Moments {
    let mut moments = Moments::default();

    for (position, stack) in board.occupied() {
        let total_weight: f64 = stack.iter().map(|p| p.piece().weight).sum();
        let moment = f64::from(position.abs()) * total_weight;
        if stack.iter().any(|p| !p.is_fixed()) {
            moments.has_user_pieces = true;
        }
        if position < 0 {
            moments.left += moment;
        } else if position > 0 {
            moments.right += moment;
        }
    }

    moments.difference = moments.left - moments.right;
    moments
}

/// Beam tilt in degrees for a moment difference
#[inline]
pub fn rotation_angle(difference: f64) -> f64 {
    (difference * ROTATION_GAIN).clamp(-MAX_ROTATION_DEG, MAX_ROTATION_DEG)
}

/// How far the lever is from level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceClass {
    Balanced,
    Close,
    Far,
}

impl BalanceClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            BalanceClass::Balanced => "balanced",
            BalanceClass::Close => "close",
            BalanceClass::Far => "far",
        }
    }

    /// Indicator color
    pub fn color(&self) -> &'static str {
        match self {
            BalanceClass::Balanced => "#4ADE80",
            BalanceClass::Close => "#FBBF24",
            BalanceClass::Far => "#F87171",
        }
    }
}

pub fn classify(difference: f64) -> BalanceClass {
    let abs = difference.abs();
    if abs < BALANCED_EPSILON {
        BalanceClass::Balanced
    } else if abs < CLOSE_THRESHOLD {
        BalanceClass::Close
    } else {
        BalanceClass::Far
    }
}

/// Horizontal knob position on the balance indicator, in percent.
///
/// Heavier left pushes the knob left.
#[inline]
pub fn indicator_percent(difference: f64) -> f64 {
    (INDICATOR_CENTER_PCT - difference * INDICATOR_GAIN_PCT)
        .clamp(INDICATOR_MIN_PCT, INDICATOR_MAX_PCT)
}

/// Per-cell readout: total weight and its moment about the fulcrum
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellTotals {
    pub weight: f64,
    pub distance: i32,
    pub moment: f64,
}

/// Totals for one cell, or `None` if nothing sits there
pub fn cell_totals(board: &Board, position: i32) -> Option<CellTotals> {
    let stack = board.cell(position);
    if stack.is_empty() {
        return None;
    }
    let weight: f64 = stack.iter().map(|p| p.piece().weight).sum();
    let distance = position.abs();
    Some(CellTotals {
        weight,
        distance,
        moment: weight * f64::from(distance),
    })
}
