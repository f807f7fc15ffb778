use serde::Serialize;

use crate::model::{CategoryId, MemberId};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rectangle {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rectangle {
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Whether `other` lies inside this rectangle, borders included.
    pub fn contains(&self, other: &Rectangle) -> bool {
        self.x <= other.x
            && self.y <= other.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

/// Centre of one member marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberLabel {
    pub member: MemberId,
    pub name: String,
    pub x: f64,
    pub y: f64,
}

/// Border drawn for one category, or for two complements sharing a border.
///
/// A shared shape lists its parts left to right and has one divider between
/// each pair of neighbouring parts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShape {
    pub categories: Vec<CategoryId>,
    pub labels: Vec<String>,
    pub rect: Rectangle,
    /// x of each vertical line separating neighbouring parts
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dividers: Vec<f64>,
}

impl CategoryShape {
    pub fn is_merged(&self) -> bool {
        self.categories.len() > 1
    }
}

/// Everything a renderer needs to draw a layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Diagram {
    pub labels: Vec<MemberLabel>,
    /// Outermost first, so later shapes can be painted over earlier ones
    pub shapes: Vec<CategoryShape>,
}

impl Diagram {
    pub fn label(&self, member: MemberId) -> Option<&MemberLabel> {
        self.labels.iter().find(|l| l.member == member)
    }

    /// Shape drawn for `category`, merged or not.
    pub fn shape(&self, category: CategoryId) -> Option<&CategoryShape> {
        self.shapes.iter().find(|s| s.categories.contains(&category))
    }

    /// Smallest rectangle from the origin enclosing every shape.
    pub fn extent(&self) -> (f64, f64) {
        self.shapes.iter().fold((0.0, 0.0), |(w, h): (f64, f64), s| {
            (w.max(s.rect.right()), h.max(s.rect.bottom()))
        })
    }
}
