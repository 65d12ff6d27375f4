//! Weights that sit on the lever
//!
//! Static objects and inventory templates share the same visual/weight
//! attributes (`Piece`); templates add a stock count and an identity key.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Silhouette of a weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Circle,
    Square,
    Triangle,
}

impl Shape {
    pub fn as_str(&self) -> &'static str {
        match self {
            Shape::Circle => "circle",
            Shape::Square => "square",
            Shape::Triangle => "triangle",
        }
    }
}

/// Display size of a weight (independent of its actual weight)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeClass {
    Small,
    Medium,
    Large,
}

impl SizeClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            SizeClass::Small => "small",
            SizeClass::Medium => "medium",
            SizeClass::Large => "large",
        }
    }

    /// Base edge length in CSS pixels before any display scaling
    pub fn base_px(&self) -> f32 {
        match self {
            SizeClass::Small => 20.0,
            SizeClass::Medium => 28.0,
            SizeClass::Large => 36.0,
        }
    }
}

/// Visual and physical attributes of one weight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Piece {
    #[serde(rename = "type")]
    pub shape: Shape,
    pub size: SizeClass,
    pub weight: f64,
    pub color: String,
    /// Weight is hidden from the player (display only, physics still uses it)
    #[serde(default)]
    pub unknown: bool,
}

impl Piece {
    /// Text shown on the piece or in the inventory ("?" when hidden)
    pub fn weight_label(&self) -> String {
        if self.unknown {
            "?".to_string()
        } else {
            self.weight.to_string()
        }
    }
}

/// A piece fixed to the lever for the whole level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticObject {
    #[serde(flatten)]
    pub piece: Piece,
    pub position: i32,
}

/// Inventory key: explicit id when the template has one, else (shape, size)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TemplateKey {
    Id(String),
    Shape(Shape, SizeClass),
}

impl fmt::Display for TemplateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateKey::Id(id) => f.write_str(id),
            TemplateKey::Shape(shape, size) => write!(f, "{}_{}", shape.as_str(), size.as_str()),
        }
    }
}

/// A stack of identical pieces the player can drag onto the lever
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieceTemplate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(flatten)]
    pub piece: Piece,
    pub count: u32,
}

impl PieceTemplate {
    pub fn key(&self) -> TemplateKey {
        match &self.id {
            Some(id) => TemplateKey::Id(id.clone()),
            None => TemplateKey::Shape(self.piece.shape, self.piece.size),
        }
    }
}
