//! Level definitions
//!
//! Levels are bundled as JSON and validated once at startup; after that a
//! `LevelSet` is immutable and never empty.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::piece::{Piece, PieceTemplate, StaticObject, TemplateKey};
use crate::consts::{BEAM_HALF_SPAN, FULCRUM};

/// Level data shipped with the game
pub const BUNDLED_LEVELS: &str = include_str!("../../assets/levels.json");

/// Why a level document was refused
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("level data is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("level list is empty")]
    Empty,
    #[error("level {}: the fulcrum cannot be an available cell", .level + 1)]
    FulcrumCell { level: usize },
    #[error("level {}: a static object sits on the fulcrum", .level + 1)]
    FulcrumStatic { level: usize },
    #[error("level {}: position {position} is off the beam", .level + 1)]
    OffBeam { level: usize, position: i32 },
    #[error("level {}: weight {weight} must be positive", .level + 1)]
    BadWeight { level: usize, weight: f64 },
    #[error("level {}: inventory key {key} appears twice", .level + 1)]
    DuplicateTemplate { level: usize, key: TemplateKey },
    #[error("level {}: template {key} has a zero count", .level + 1)]
    EmptyTemplate { level: usize, key: TemplateKey },
}

/// One puzzle: fixed weights, the player's stock, and where stock may go
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Level {
    pub title: String,
    pub description: String,
    pub hint: String,
    #[serde(default)]
    pub static_objects: Vec<StaticObject>,
    pub inventory: Vec<PieceTemplate>,
    pub available_cells: BTreeSet<i32>,
}

impl Level {
    /// Whether the player may drop pieces on this cell
    pub fn is_available(&self, cell: i32) -> bool {
        self.available_cells.contains(&cell)
    }

    /// Inventory entry for a key
    pub fn template(&self, key: &TemplateKey) -> Option<&PieceTemplate> {
        self.inventory.iter().find(|t| &t.key() == key)
    }

    fn validate(&self, level: usize) -> Result<(), LevelError> {
        let on_beam = |position: i32| (-BEAM_HALF_SPAN..=BEAM_HALF_SPAN).contains(&position);
        let check_weight = |piece: &Piece| {
            if piece.weight.is_finite() && piece.weight > 0.0 {
                Ok(())
            } else {
                Err(LevelError::BadWeight {
                    level,
                    weight: piece.weight,
                })
            }
        };

        for &cell in &self.available_cells {
            if cell == FULCRUM {
                return Err(LevelError::FulcrumCell { level });
            }
            if !on_beam(cell) {
                return Err(LevelError::OffBeam {
                    level,
                    position: cell,
                });
            }
        }

        for obj in &self.static_objects {
            if obj.position == FULCRUM {
                return Err(LevelError::FulcrumStatic { level });
            }
            if !on_beam(obj.position) {
                return Err(LevelError::OffBeam {
                    level,
                    position: obj.position,
                });
            }
            check_weight(&obj.piece)?;
        }

        let mut seen = HashSet::new();
        for template in &self.inventory {
            let key = template.key();
            check_weight(&template.piece)?;
            if template.count == 0 {
                return Err(LevelError::EmptyTemplate { level, key });
            }
            if !seen.insert(key.clone()) {
                return Err(LevelError::DuplicateTemplate { level, key });
            }
        }

        Ok(())
    }
}

/// Validated, non-empty, ordered collection of levels
#[derive(Debug, Clone, PartialEq)]
pub struct LevelSet {
    levels: Vec<Level>,
}

impl LevelSet {
    /// Validate and wrap a list of levels
    pub fn new(levels: Vec<Level>) -> Result<Self, LevelError> {
        if levels.is_empty() {
            return Err(LevelError::Empty);
        }
        for (i, level) in levels.iter().enumerate() {
            level.validate(i)?;
        }
        Ok(Self { levels })
    }

    /// Decode a JSON array of levels
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        let levels: Vec<Level> = serde_json::from_str(json)?;
        Self::new(levels)
    }

    /// The levels compiled into the game
    pub fn bundled() -> Result<Self, LevelError> {
        Self::from_json(BUNDLED_LEVELS)
    }

    pub fn get(&self, index: usize) -> Option<&Level> {
        self.levels.get(index)
    }

    /// Level by index; callers hold an index obtained from this set
    pub(crate) fn at(&self, index: usize) -> &Level {
        &self.levels[index]
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn last_index(&self) -> usize {
        self.levels.len() - 1
    }

    pub fn iter(&self) -> impl Iterator<Item = &Level> {
        self.levels.iter()
    }
}
