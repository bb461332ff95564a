use serde::{Deserialize, Serialize};

use crate::geometry::{BBox, Point};
use crate::wafer::ChipSpec;

/// Stable chip identifier: the positional index assigned during the
/// row-major generation scan. Never reused or reassigned.
pub type ChipId = usize;

/// Default chip fill color.
pub const DEFAULT_COLOR: &str = "white";

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

fn is_default_color(color: &str) -> bool {
    color == DEFAULT_COLOR
}

/// One grid cell on the wafer.
///
/// `id` is the stable arbitrary-order key; `number` is the user-facing
/// reading-order key assigned only to inside chips. The two orderings are
/// independent by design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chip {
    pub id: ChipId,
    /// Bottom-left corner, wafer-centered millimeters.
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// True iff the chip lies entirely within the usable wafer area.
    pub inside: bool,
    /// 1-based reading-order sequence number; `None` for outside chips.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<u32>,
    #[serde(default = "default_color", skip_serializing_if = "is_default_color")]
    pub color: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub label: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub file_name: String,
}

impl Chip {
    pub fn new(id: ChipId, x: f64, y: f64, spec: &ChipSpec) -> Self {
        Self {
            id,
            x,
            y,
            width: spec.width_mm,
            height: spec.height_mm,
            inside: false,
            number: None,
            color: default_color(),
            label: String::new(),
            file_name: String::new(),
        }
    }

    pub fn bbox(&self) -> BBox {
        BBox::new(
            Point::new(self.x, self.y),
            Point::new(self.x + self.width, self.y + self.height),
        )
    }

    pub fn corners(&self) -> [Point; 4] {
        self.bbox().corners()
    }

    /// Chip center, used for hit-testing display and label placement.
    pub fn center(&self) -> Point {
        self.bbox().center()
    }
}

/// The full chip collection produced by one generation pass.
///
/// Outside chips are retained in the sequence so consumers that want to
/// visualize excluded cells can still see them; `inside_chips` filters
/// them out without changing the emitted order.
#[derive(Debug, Clone, PartialEq)]
pub struct ChipGrid {
    cols: usize,
    rows: usize,
    chips: Vec<Chip>,
}

impl ChipGrid {
    pub(crate) fn new(cols: usize, rows: usize, chips: Vec<Chip>) -> Self {
        Self { cols, rows, chips }
    }

    /// A grid with no chips, used before the first generation pass.
    pub fn empty() -> Self {
        Self {
            cols: 0,
            rows: 0,
            chips: Vec::new(),
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// All chips in emitted (row-major scan) order.
    pub fn chips(&self) -> &[Chip] {
        &self.chips
    }

    pub fn chips_mut(&mut self) -> &mut [Chip] {
        &mut self.chips
    }

    /// Look up a chip by id. Ids are positional, so this is O(1).
    pub fn chip(&self, id: ChipId) -> Option<&Chip> {
        self.chips.get(id)
    }

    pub fn chip_mut(&mut self, id: ChipId) -> Option<&mut Chip> {
        self.chips.get_mut(id)
    }

    pub fn inside_chips(&self) -> impl Iterator<Item = &Chip> {
        self.chips.iter().filter(|c| c.inside)
    }

    pub fn inside_count(&self) -> usize {
        self.chips.iter().filter(|c| c.inside).count()
    }

    pub fn len(&self) -> usize {
        self.chips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chips.is_empty()
    }
}
