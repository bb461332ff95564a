//! # WaferMap I/O
//!
//! Readers and writers for the wafer-map JSON document format (the shape
//! saved maps round-trip through) and SVG export of the chip grid.

pub mod document;
pub mod svg;

pub use document::{export, import, ImportError, WaferDocument};
pub use svg::{SvgError, SvgWriter};
