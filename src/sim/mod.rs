//! Deterministic game core
//!
//! All gameplay logic lives here. This module must stay pure:
//! - No DOM, timers, or input-modality specifics
//! - Ordered iteration (cells keyed by position) so results are reproducible
//! - Balance values derived on demand, never cached

pub mod balance;
pub mod board;
pub mod level;
pub mod piece;
pub mod placement;
pub mod session;
pub mod solver;

pub use balance::{
    BalanceClass, CellTotals, Moments, cell_totals, classify, compute_moments,
    indicator_percent, rotation_angle,
};
pub use board::{Board, Placement};
pub use level::{BUNDLED_LEVELS, Level, LevelError, LevelSet};
pub use piece::{Piece, PieceTemplate, Shape, SizeClass, StaticObject, TemplateKey};
pub use placement::{InventoryUsage, Rejection};
pub use session::{
    GameEvent, Intent, LevelStatus, Phase, Session, TimerAction, Transition, UiFlags, update,
};
pub use solver::{MAX_SOLUTION_PIECES, Solution, solve};
