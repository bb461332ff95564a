//! # WaferMap Core
//!
//! Wafer-map kernel: lays a rectangular chip grid over a circular wafer
//! (optionally truncated by a flat edge and shrunk by an excluded edge
//! band), classifies each chip against the usable area, numbers inside
//! chips in reading order, and reconciles regenerated grids against saved
//! user edits by position.
//!
//! Grid generation and reconciliation are pure functions; [`WaferMap`] is
//! the owned container their results are installed into.

pub mod chip;
pub mod commands;
pub mod geometry;
pub mod grid;
pub mod map;
pub mod reconcile;
pub mod spatial;
pub mod wafer;

pub use chip::{Chip, ChipGrid, ChipId, DEFAULT_COLOR};
pub use geometry::{BBox, Point};
pub use grid::{generate, GridError};
pub use map::{MapInfo, WaferMap};
pub use reconcile::{reconcile, MATCH_TOLERANCE_MM};
pub use wafer::{ChipSpec, FlatEdge, WaferSpec};
