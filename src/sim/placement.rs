//! Placement controller
//!
//! The only code that mutates a `Board` during play. It keeps the inventory
//! usage counter in step with the board: for every template,
//! `usage <= template.count`.

use std::collections::BTreeMap;

use thiserror::Error;

use super::board::{Board, Placement};
use super::level::Level;
use super::piece::{PieceTemplate, TemplateKey};

/// Why an intent was ignored. Never shown to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("cell does not accept pieces")]
    CellUnavailable,
    #[error("no pieces of this kind left")]
    TemplateExhausted,
    #[error("template is not in this level's inventory")]
    UnknownTemplate,
    #[error("nothing removable at that slot")]
    NothingToRemove,
    #[error("level pieces cannot be removed")]
    FixedPiece,
    #[error("the board is locked until the level restarts")]
    NotPlaying,
    #[error("the level is not solved yet")]
    LevelUnsolved,
    #[error("there is no next level")]
    NoNextLevel,
    #[error("only the last level can finish the game")]
    NotLastLevel,
    #[error("the game is not finished")]
    NotFinished,
}

/// Pieces currently on the lever per inventory template
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InventoryUsage {
    used: BTreeMap<TemplateKey, u32>,
}

impl InventoryUsage {
    pub fn used(&self, key: &TemplateKey) -> u32 {
        self.used.get(key).copied().unwrap_or(0)
    }

    /// How many more of this template can still be placed
    pub fn remaining(&self, template: &PieceTemplate) -> u32 {
        template.count.saturating_sub(self.used(&template.key()))
    }

    /// Total placed across all templates
    pub fn total(&self) -> u32 {
        self.used.values().sum()
    }

    fn increment(&mut self, key: TemplateKey) {
        *self.used.entry(key).or_insert(0) += 1;
    }

    fn decrement(&mut self, key: &TemplateKey) {
        if let Some(n) = self.used.get_mut(key) {
            *n = n.saturating_sub(1);
            if *n == 0 {
                self.used.remove(key);
            }
        }
    }
}

/// Drop one piece of `key` onto `cell`
pub fn place(
    level: &Level,
    board: &mut Board,
    usage: &mut InventoryUsage,
    cell: i32,
    key: &TemplateKey,
) -> Result<(), Rejection> {
    if !level.is_available(cell) {
        return Err(Rejection::CellUnavailable);
    }
    let template = level.template(key).ok_or(Rejection::UnknownTemplate)?;
    if usage.remaining(template) == 0 {
        return Err(Rejection::TemplateExhausted);
    }

    board.push(
        cell,
        Placement::Player {
            key: key.clone(),
            piece: template.piece.clone(),
        },
    );
    usage.increment(key.clone());
    Ok(())
}

/// Take the piece at `index` of `cell` back into the inventory
pub fn remove(
    board: &mut Board,
    usage: &mut InventoryUsage,
    cell: i32,
    index: usize,
) -> Result<TemplateKey, Rejection> {
    match board.cell(cell).get(index) {
        None => return Err(Rejection::NothingToRemove),
        Some(Placement::Fixed(_)) => return Err(Rejection::FixedPiece),
        Some(Placement::Player { .. }) => {}
    }
    let key = board
        .take_player(cell, index)
        .ok_or(Rejection::NothingToRemove)?;
    usage.decrement(&key);
    Ok(key)
}
