//! SVG export of the wafer map.
//!
//! Produces a standalone vector drawing: wafer outline (with the flat chord
//! when present), the usable-radius guide when an exclusion band exists,
//! and one filled rectangle per inside chip with its number and label.
//! Coordinates are emitted in wafer millimeters; increasing y is down,
//! matching both the reading-order convention and SVG screen space.

use std::io;

use thiserror::Error;

use wafermap_core::map::WaferMap;

#[derive(Error, Debug)]
pub enum SvgError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Margin around the wafer outline, in millimeters.
const MARGIN_MM: f64 = 5.0;

pub struct SvgWriter<W: io::Write> {
    writer: W,
}

impl<W: io::Write> SvgWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Write the complete SVG document for the given map.
    pub fn write(&mut self, map: &WaferMap) -> Result<(), SvgError> {
        let radius = map.wafer.radius();
        let extent = radius + MARGIN_MM;

        writeln!(
            self.writer,
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{} {} {} {}">"#,
            -extent,
            -extent,
            2.0 * extent,
            2.0 * extent
        )?;

        self.write_outline(map, radius)?;
        self.write_chips(map)?;

        writeln!(self.writer, "</svg>")?;
        log::info!(
            "exported SVG for '{}': {} inside chips",
            map.name,
            map.grid().inside_count()
        );
        Ok(())
    }

    fn write_outline(&mut self, map: &WaferMap, radius: f64) -> Result<(), SvgError> {
        match map.wafer.flat_edge() {
            Some(flat) => {
                // Arc around the round side from the top chord endpoint to
                // the bottom one, closed by the chord itself.
                writeln!(
                    self.writer,
                    r#"  <path d="M {} {} A {} {} 0 1 1 {} {} Z" fill="none" stroke="black" stroke-width="0.5"/>"#,
                    flat.x_cutoff, -flat.y_max, radius, radius, flat.x_cutoff, flat.y_max
                )?;
            }
            None => {
                writeln!(
                    self.writer,
                    r#"  <circle cx="0" cy="0" r="{}" fill="none" stroke="black" stroke-width="0.5"/>"#,
                    radius
                )?;
            }
        }

        if map.wafer.excluded_radius_mm > 0.0 {
            writeln!(
                self.writer,
                r#"  <circle cx="0" cy="0" r="{}" fill="none" stroke="gray" stroke-width="0.25" stroke-dasharray="2 1"/>"#,
                map.wafer.usable_radius()
            )?;
        }
        Ok(())
    }

    fn write_chips(&mut self, map: &WaferMap) -> Result<(), SvgError> {
        let font = map.chip.label_font_size;
        for chip in map.grid().inside_chips() {
            writeln!(
                self.writer,
                r#"  <rect x="{}" y="{}" width="{}" height="{}" fill="{}" stroke="black" stroke-width="0.1"/>"#,
                chip.x, chip.y, chip.width, chip.height, chip.color
            )?;

            let center = chip.center();
            if let Some(number) = chip.number {
                writeln!(
                    self.writer,
                    r#"  <text x="{}" y="{}" font-size="{}" text-anchor="middle">{}</text>"#,
                    center.x,
                    center.y + font * 0.35,
                    font,
                    number
                )?;
            }
            if !chip.label.is_empty() {
                writeln!(
                    self.writer,
                    r#"  <text x="{}" y="{}" font-size="{}" text-anchor="middle">{}</text>"#,
                    center.x,
                    center.y + font * 1.35,
                    font,
                    escape_text(&chip.label)
                )?;
            }
        }
        Ok(())
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
