//! Placement state: which pieces occupy which lever cells
//!
//! Cells are keyed by signed position (negative = left of the fulcrum).
//! Iteration is ordered by position so derived values are deterministic.

use std::collections::BTreeMap;

use super::level::Level;
use super::piece::{Piece, TemplateKey};

/// One entry in a cell's stack
#[derive(Debug, Clone, PartialEq)]
pub enum Placement {
    /// Part of the level layout; never removable
    Fixed(Piece),
    /// Dropped by the player from an inventory template
    Player { key: TemplateKey, piece: Piece },
}

impl Placement {
    pub fn piece(&self) -> &Piece {
        match self {
            Placement::Fixed(piece) | Placement::Player { piece, .. } => piece,
        }
    }

    pub fn is_fixed(&self) -> bool {
        matches!(self, Placement::Fixed(_))
    }

    /// Inventory key for player pieces
    pub fn key(&self) -> Option<&TemplateKey> {
        match self {
            Placement::Fixed(_) => None,
            Placement::Player { key, .. } => Some(key),
        }
    }
}

/// Cell position -> ordered stack of placements
///
/// Empty stacks are never stored.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Board {
    cells: BTreeMap<i32, Vec<Placement>>,
}

impl Board {
    /// Board holding only the level's static objects
    pub fn from_level(level: &Level) -> Self {
        let mut board = Self::default();
        for obj in &level.static_objects {
            board.push(obj.position, Placement::Fixed(obj.piece.clone()));
        }
        board
    }

    /// Stack at a cell (empty slice if unoccupied)
    pub fn cell(&self, position: i32) -> &[Placement] {
        self.cells.get(&position).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Occupied cells, left to right
    pub fn occupied(&self) -> impl Iterator<Item = (i32, &[Placement])> {
        self.cells.iter().map(|(&pos, stack)| (pos, stack.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of player-placed pieces anywhere on the lever
    pub fn player_piece_count(&self) -> usize {
        self.cells
            .values()
            .flatten()
            .filter(|p| !p.is_fixed())
            .count()
    }

    pub(crate) fn push(&mut self, position: i32, placement: Placement) {
        self.cells.entry(position).or_default().push(placement);
    }

    /// Remove a player entry, returning its inventory key.
    ///
    /// Fixed entries and missing indices leave the board untouched.
    pub(crate) fn take_player(&mut self, position: i32, index: usize) -> Option<TemplateKey> {
        let stack = self.cells.get_mut(&position)?;
        let key = stack.get(index)?.key()?.clone();
        stack.remove(index);
        if stack.is_empty() {
            self.cells.remove(&position);
        }
        Some(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::piece::{Shape, SizeClass};

    fn piece(weight: f64) -> Piece {
        Piece {
            shape: Shape::Circle,
            size: SizeClass::Small,
            weight,
            color: "#8B9DAF".to_string(),
            unknown: false,
        }
    }

    fn player(id: &str, weight: f64) -> Placement {
        Placement::Player {
            key: TemplateKey::Id(id.to_string()),
            piece: piece(weight),
        }
    }

    #[test]
    fn test_take_player_keeps_order_of_others() {
        let mut board = Board::default();
        board.push(-2, player("a", 1.0));
        board.push(-2, player("b", 2.0));
        board.push(-2, player("c", 3.0));

        let key = board.take_player(-2, 1);
        assert_eq!(key, Some(TemplateKey::Id("b".into())));
        let keys: Vec<_> = board.cell(-2).iter().filter_map(Placement::key).cloned().collect();
        assert_eq!(
            keys,
            vec![TemplateKey::Id("a".into()), TemplateKey::Id("c".into())]
        );
    }

    #[test]
    fn test_take_player_drops_empty_cell() {
        let mut board = Board::default();
        board.push(1, player("a", 1.0));
        assert!(board.take_player(1, 0).is_some());
        assert!(board.is_empty());
        assert!(board.cell(1).is_empty());
    }

    #[test]
    fn test_take_player_refuses_fixed_and_missing() {
        let mut board = Board::default();
        board.push(2, Placement::Fixed(piece(2.0)));
        let before = board.clone();

        assert_eq!(board.take_player(2, 0), None);
        assert_eq!(board.take_player(2, 5), None);
        assert_eq!(board.take_player(-1, 0), None);
        assert_eq!(board, before);
    }

    #[test]
    fn test_player_piece_count_ignores_fixed() {
        let mut board = Board::default();
        board.push(2, Placement::Fixed(piece(2.0)));
        assert_eq!(board.player_piece_count(), 0);
        board.push(2, player("a", 1.0));
        board.push(-3, player("a", 1.0));
        assert_eq!(board.player_piece_count(), 2);
    }
}
