//! Level solver
//!
//! Finds the smallest set of player placements that balances a level.
//! Iterative deepening over (template, cell) choices in non-decreasing order,
//! so each multiset of placements is tried once per depth.

use super::balance::{BalanceClass, classify, compute_moments};
use super::board::Board;
use super::level::Level;
use super::piece::TemplateKey;
use super::session::Intent;

/// Deepest search; bundled levels need at most two pieces
pub const MAX_SOLUTION_PIECES: usize = 6;

/// Placements that balance a level, in the order they should be made
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub placements: Vec<(i32, TemplateKey)>,
}

impl Solution {
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Replayable intents
    pub fn intents(&self) -> impl Iterator<Item = Intent> + '_ {
        self.placements.iter().map(|(cell, key)| Intent::Place {
            cell: *cell,
            template: key.clone(),
        })
    }
}

/// One candidate move and what it does to `left - right`
#[derive(Debug, Clone, Copy)]
struct Choice {
    template: usize,
    cell: i32,
    delta: f64,
}

/// Smallest balancing solution with at least one player piece
pub fn solve(level: &Level) -> Option<Solution> {
    let base = compute_moments(&Board::from_level(level)).difference;

    let mut choices = Vec::new();
    for (template, t) in level.inventory.iter().enumerate() {
        for &cell in &level.available_cells {
            let moment = t.piece.weight * f64::from(cell.abs());
            let delta = if cell < 0 { moment } else { -moment };
            choices.push(Choice {
                template,
                cell,
                delta,
            });
        }
    }
    let counts: Vec<u32> = level.inventory.iter().map(|t| t.count).collect();
    let stock: usize = counts.iter().map(|&c| c as usize).sum();

    let mut used = vec![0u32; counts.len()];
    let mut picked = Vec::new();
    for depth in 1..=MAX_SOLUTION_PIECES.min(stock) {
        if search(&choices, &counts, base, depth, 0, &mut used, &mut picked) {
            log::debug!("Solved '{}' with {} piece(s)", level.title, depth);
            let placements = picked
                .iter()
                .map(|&i: &usize| {
                    let c = choices[i];
                    (c.cell, level.inventory[c.template].key())
                })
                .collect();
            return Some(Solution { placements });
        }
    }
    None
}

fn search(
    choices: &[Choice],
    counts: &[u32],
    difference: f64,
    depth_left: usize,
    start: usize,
    used: &mut [u32],
    picked: &mut Vec<usize>,
) -> bool {
    if depth_left == 0 {
        return classify(difference) == BalanceClass::Balanced;
    }
    for (i, choice) in choices.iter().enumerate().skip(start) {
        if used[choice.template] >= counts[choice.template] {
            continue;
        }
        used[choice.template] += 1;
        picked.push(i);
        if search(
            choices,
            counts,
            difference + choice.delta,
            depth_left - 1,
            i,
            used,
            picked,
        ) {
            return true;
        }
        used[choice.template] -= 1;
        picked.pop();
    }
    false
}
