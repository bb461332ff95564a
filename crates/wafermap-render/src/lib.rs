//! # WaferMap Renderer
//!
//! Viewport math and JSON-serializable render frames for the wafer-map
//! canvas. This crate produces drawing data only; the frontend canvas
//! consumes it and does the actual painting.

pub mod render_data;
pub mod viewport;

pub use render_data::{RenderChip, RenderFrame, WaferOutline};
pub use viewport::{DetailLevel, Viewport};
