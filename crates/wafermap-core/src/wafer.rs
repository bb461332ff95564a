use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Physical parameters of the wafer being mapped.
///
/// All lengths are millimeters. The usable area is the wafer circle shrunk
/// by the excluded edge band and, when a flat angle is set, cut by a
/// vertical chord on the negative-x side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaferSpec {
    /// Full wafer diameter.
    pub diameter_mm: f64,
    /// Angle subtended at the center by the flat edge, in degrees.
    /// Zero means the boundary is a pure circle.
    pub flat_angle_deg: f64,
    /// Width of the unusable band at the wafer edge.
    pub excluded_radius_mm: f64,
}

impl WaferSpec {
    pub fn new(diameter_mm: f64, flat_angle_deg: f64, excluded_radius_mm: f64) -> Self {
        Self {
            diameter_mm,
            flat_angle_deg,
            excluded_radius_mm,
        }
    }

    /// Full wafer radius.
    pub fn radius(&self) -> f64 {
        self.diameter_mm / 2.0
    }

    /// Radius of the circle chips must stay within.
    ///
    /// May be zero or negative when the exclusion band swallows the whole
    /// wafer; that is a valid configuration that admits no chips.
    pub fn usable_radius(&self) -> f64 {
        self.radius() - self.excluded_radius_mm
    }

    /// Flat-edge cutoff geometry, if a flat angle is configured.
    ///
    /// The chord is always derived from the full wafer radius, independent
    /// of the excluded band.
    pub fn flat_edge(&self) -> Option<FlatEdge> {
        if self.flat_angle_deg > 0.0 {
            Some(FlatEdge::from_angle(self.radius(), self.flat_angle_deg))
        } else {
            None
        }
    }
}

impl Default for WaferSpec {
    fn default() -> Self {
        // 4-inch wafer, no flat, no exclusion band.
        Self {
            diameter_mm: 101.6,
            flat_angle_deg: 0.0,
            excluded_radius_mm: 0.0,
        }
    }
}

/// The flat-edge cutoff region: a vertical chord on the negative-x side of
/// the wafer, symmetric about the x-axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatEdge {
    /// Points with `x < x_cutoff` are beyond the chord.
    pub x_cutoff: f64,
    /// The chord spans `|y| < y_max`.
    pub y_max: f64,
}

impl FlatEdge {
    fn from_angle(radius: f64, angle_deg: f64) -> Self {
        let half = angle_deg.to_radians() / 2.0;
        Self {
            x_cutoff: -radius * half.cos(),
            y_max: radius * half.sin(),
        }
    }

    /// Whether a point falls in the region removed by the flat edge.
    pub fn clips(&self, p: &Point) -> bool {
        p.x < self.x_cutoff && p.y.abs() < self.y_max
    }
}

/// Dimensions of a single chip cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChipSpec {
    pub width_mm: f64,
    pub height_mm: f64,
    /// Point size used when rendering chip labels.
    pub label_font_size: f64,
}

impl ChipSpec {
    pub fn new(width_mm: f64, height_mm: f64) -> Self {
        Self {
            width_mm,
            height_mm,
            ..Default::default()
        }
    }
}

impl Default for ChipSpec {
    fn default() -> Self {
        Self {
            width_mm: 10.0,
            height_mm: 10.0,
            label_font_size: 10.0,
        }
    }
}
