//! Session state machine
//!
//! A `Session` is the whole mutable game: current level, board, inventory
//! usage, phase, and transient UI flags. It only changes through [`update`],
//! which consumes the old session and returns the next one together with the
//! events the frontend should react to.
//!
//! Balance values are never stored here; call [`Session::moments`] after each
//! update.

use std::sync::Arc;

use super::balance::{Moments, compute_moments};
use super::board::Board;
use super::level::{Level, LevelSet};
use super::piece::{PieceTemplate, TemplateKey};
use super::placement::{self, InventoryUsage, Rejection};

/// Where the player is in the level sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Board accepts placements and removals
    Playing,
    /// Current level balanced; waiting for next/finish
    Solved { level: usize },
    /// Last level solved and acknowledged
    AllComplete,
}

/// Transient presentation state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UiFlags {
    pub show_hint: bool,
    /// Celebration animation running (cleared by a frontend timer)
    pub celebrating: bool,
}

/// Progress dot state for a level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelStatus {
    Completed,
    Current,
    Upcoming,
}

/// Player requests, applied strictly in the order they arrive
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Place { cell: i32, template: TemplateKey },
    Remove { cell: i32, index: usize },
    NextLevel,
    Finish,
    Restart,
    Reset,
    ToggleHint,
    CelebrationElapsed,
}

/// What an update did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    Placed { cell: i32, key: TemplateKey },
    Removed { cell: i32, key: TemplateKey },
    /// Intent ignored; state unchanged
    Rejected(Rejection),
    LevelSolved { level: usize },
    LevelStarted { level: usize },
    AllComplete,
    HintToggled { visible: bool },
    CelebrationEnded,
}

/// What the frontend's celebration timer should do after an update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    /// Leave any running timer alone
    Keep,
    /// Clear the running timer; its celebration is gone
    Cancel,
    /// Clear the running timer and start a fresh one
    Restart,
}

impl TimerAction {
    pub fn after(events: &[GameEvent]) -> Self {
        if events
            .iter()
            .any(|e| matches!(e, GameEvent::LevelSolved { .. }))
        {
            TimerAction::Restart
        } else if events
            .iter()
            .any(|e| matches!(e, GameEvent::LevelStarted { .. }))
        {
            TimerAction::Cancel
        } else {
            TimerAction::Keep
        }
    }
}

/// Result of one update
#[derive(Debug, Clone)]
pub struct Transition {
    pub session: Session,
    pub events: Vec<GameEvent>,
}

#[derive(Debug, Clone)]
pub struct Session {
    levels: Arc<LevelSet>,
    level_index: usize,
    board: Board,
    usage: InventoryUsage,
    phase: Phase,
    ui: UiFlags,
}

impl PartialEq for Session {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.levels, &other.levels)
            && self.level_index == other.level_index
            && self.board == other.board
            && self.usage == other.usage
            && self.phase == other.phase
            && self.ui == other.ui
    }
}

impl Session {
    /// Fresh game on the first level
    pub fn new(levels: Arc<LevelSet>) -> Self {
        Self::start(levels, 0)
    }

    fn start(levels: Arc<LevelSet>, level_index: usize) -> Self {
        let board = Board::from_level(levels.at(level_index));
        Self {
            levels,
            level_index,
            board,
            usage: InventoryUsage::default(),
            phase: Phase::Playing,
            ui: UiFlags::default(),
        }
    }

    pub fn levels(&self) -> &LevelSet {
        &self.levels
    }

    pub fn level_index(&self) -> usize {
        self.level_index
    }

    pub fn level(&self) -> &Level {
        self.levels.at(self.level_index)
    }

    pub fn is_last_level(&self) -> bool {
        self.level_index == self.levels.last_index()
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn usage(&self) -> &InventoryUsage {
        &self.usage
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn ui(&self) -> UiFlags {
        self.ui
    }

    pub fn is_solved(&self) -> bool {
        matches!(self.phase, Phase::Solved { .. })
    }

    /// Balance of the current board (recomputed on every call)
    pub fn moments(&self) -> Moments {
        compute_moments(&self.board)
    }

    /// Pieces of a template still in the tray
    pub fn remaining(&self, template: &PieceTemplate) -> u32 {
        self.usage.remaining(template)
    }

    pub fn level_status(&self, index: usize) -> LevelStatus {
        use std::cmp::Ordering;
        match index.cmp(&self.level_index) {
            Ordering::Less => LevelStatus::Completed,
            Ordering::Equal => LevelStatus::Current,
            Ordering::Greater => LevelStatus::Upcoming,
        }
    }

    /// Enter `Solved` if the board just balanced. No-op outside `Playing`.
    fn check_solved(&mut self, events: &mut Vec<GameEvent>) {
        if self.phase != Phase::Playing {
            return;
        }
        let moments = self.moments();
        if moments.is_solved() {
            self.phase = Phase::Solved {
                level: self.level_index,
            };
            self.ui.celebrating = true;
            log::info!(
                "Level {} solved ({} = {})",
                self.level_index + 1,
                moments.left,
                moments.right
            );
            events.push(GameEvent::LevelSolved {
                level: self.level_index,
            });
        }
    }

    fn restart_at(self, level_index: usize) -> Self {
        log::info!("Starting level {}", level_index + 1);
        Self::start(self.levels, level_index)
    }
}

/// Apply one intent
pub fn update(session: Session, intent: &Intent) -> Transition {
    let mut session = session;
    let mut events = Vec::new();

    let outcome: Result<(), Rejection> = match intent {
        Intent::Place { cell, template } => {
            if session.phase != Phase::Playing {
                Err(Rejection::NotPlaying)
            } else {
                let levels = Arc::clone(&session.levels);
                let level = levels.at(session.level_index);
                placement::place(level, &mut session.board, &mut session.usage, *cell, template)
                    .map(|()| {
                        log::debug!("Placed {} at {}", template, cell);
                        events.push(GameEvent::Placed {
                            cell: *cell,
                            key: template.clone(),
                        });
                        session.check_solved(&mut events);
                    })
            }
        }
        Intent::Remove { cell, index } => {
            if session.phase != Phase::Playing {
                Err(Rejection::NotPlaying)
            } else {
                placement::remove(&mut session.board, &mut session.usage, *cell, *index).map(
                    |key| {
                        log::debug!("Removed {} from {}", key, cell);
                        events.push(GameEvent::Removed { cell: *cell, key });
                        session.check_solved(&mut events);
                    },
                )
            }
        }
        Intent::NextLevel => match session.phase() {
            Phase::Solved { level } if level < session.levels.last_index() => {
                session = session.restart_at(level + 1);
                events.push(GameEvent::LevelStarted { level: level + 1 });
                Ok(())
            }
            Phase::Solved { .. } => Err(Rejection::NoNextLevel),
            Phase::Playing => Err(Rejection::LevelUnsolved),
            Phase::AllComplete => Err(Rejection::NoNextLevel),
        },
        Intent::Finish => match session.phase() {
            Phase::Solved { .. } if session.is_last_level() => {
                session.phase = Phase::AllComplete;
                log::info!("All {} levels complete", session.levels.len());
                events.push(GameEvent::AllComplete);
                Ok(())
            }
            Phase::Solved { .. } => Err(Rejection::NotLastLevel),
            Phase::Playing => Err(Rejection::LevelUnsolved),
            // Finishing twice changes nothing
            Phase::AllComplete => Ok(()),
        },
        Intent::Restart => {
            if session.phase == Phase::AllComplete {
                session = session.restart_at(0);
                events.push(GameEvent::LevelStarted { level: 0 });
                Ok(())
            } else {
                Err(Rejection::NotFinished)
            }
        }
        Intent::Reset => {
            let level = session.level_index;
            session = session.restart_at(level);
            events.push(GameEvent::LevelStarted { level });
            Ok(())
        }
        Intent::ToggleHint => {
            session.ui.show_hint = !session.ui.show_hint;
            events.push(GameEvent::HintToggled {
                visible: session.ui.show_hint,
            });
            Ok(())
        }
        Intent::CelebrationElapsed => {
            // Stale timers from an earlier level land here harmlessly
            if session.ui.celebrating {
                session.ui.celebrating = false;
                events.push(GameEvent::CelebrationEnded);
            }
            Ok(())
        }
    };

    if let Err(reason) = outcome {
        log::debug!("Ignored {:?}: {}", intent, reason);
        events.push(GameEvent::Rejected(reason));
    }

    Transition { session, events }
}
