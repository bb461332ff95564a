use serde::{Deserialize, Serialize};

/// Current viewport state for the wafer-map canvas.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Viewport {
    /// Center X in wafer coordinates (mm).
    pub center_x: f64,
    /// Center Y in wafer coordinates (mm).
    pub center_y: f64,
    /// Zoom level (pixels per millimeter).
    pub zoom: f64,
    /// Canvas width in pixels.
    pub canvas_width: f64,
    /// Canvas height in pixels.
    pub canvas_height: f64,
}

impl Viewport {
    pub fn new(canvas_width: f64, canvas_height: f64) -> Self {
        Self {
            center_x: 0.0,
            center_y: 0.0,
            zoom: 1.0,
            canvas_width,
            canvas_height,
        }
    }

    /// Pan the viewport by a delta in screen pixels.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.center_x -= dx / self.zoom;
        self.center_y -= dy / self.zoom;
    }

    /// Zoom in/out centered on a screen position.
    pub fn zoom_at(&mut self, screen_x: f64, screen_y: f64, factor: f64) {
        // Convert screen to wafer before zoom
        let wafer_x = self.screen_to_wafer_x(screen_x);
        let wafer_y = self.screen_to_wafer_y(screen_y);

        self.zoom *= factor;
        self.zoom = self.zoom.clamp(0.001, 1_000_000.0);

        // Adjust center so the point under the cursor stays fixed
        let new_wafer_x = self.screen_to_wafer_x(screen_x);
        let new_wafer_y = self.screen_to_wafer_y(screen_y);
        self.center_x -= new_wafer_x - wafer_x;
        self.center_y -= new_wafer_y - wafer_y;
    }

    /// Zoom so the full wafer diameter fits the canvas with a margin.
    pub fn fit_wafer(&mut self, diameter_mm: f64) {
        if diameter_mm <= 0.0 {
            return;
        }
        self.center_x = 0.0;
        self.center_y = 0.0;
        let zoom_x = self.canvas_width / diameter_mm * 0.9; // 10% margin
        let zoom_y = self.canvas_height / diameter_mm * 0.9;
        self.zoom = zoom_x.min(zoom_y);
    }

    /// Convert screen X coordinate to wafer coordinate.
    pub fn screen_to_wafer_x(&self, screen_x: f64) -> f64 {
        (screen_x - self.canvas_width / 2.0) / self.zoom + self.center_x
    }

    /// Convert screen Y coordinate to wafer coordinate.
    pub fn screen_to_wafer_y(&self, screen_y: f64) -> f64 {
        (screen_y - self.canvas_height / 2.0) / self.zoom + self.center_y
    }

    /// Convert wafer X coordinate to screen coordinate.
    pub fn wafer_to_screen_x(&self, wafer_x: f64) -> f64 {
        (wafer_x - self.center_x) * self.zoom + self.canvas_width / 2.0
    }

    /// Convert wafer Y coordinate to screen coordinate.
    pub fn wafer_to_screen_y(&self, wafer_y: f64) -> f64 {
        (wafer_y - self.center_y) * self.zoom + self.canvas_height / 2.0
    }

    /// Get the visible bounding box in wafer coordinates.
    pub fn visible_bounds(&self) -> (f64, f64, f64, f64) {
        let half_w = self.canvas_width / (2.0 * self.zoom);
        let half_h = self.canvas_height / (2.0 * self.zoom);
        (
            self.center_x - half_w,
            self.center_y - half_h,
            self.center_x + half_w,
            self.center_y + half_h,
        )
    }

    /// Determine how much per-chip detail is worth drawing at this zoom.
    pub fn detail_level(&self) -> DetailLevel {
        if self.zoom > 8.0 {
            DetailLevel::Full // Numbers, labels, and file names
        } else if self.zoom > 2.0 {
            DetailLevel::Medium // Numbers only
        } else {
            DetailLevel::Low // Bare rectangles
        }
    }
}

/// Semantic zoom level for chip text rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DetailLevel {
    Full,
    Medium,
    Low,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_wafer_round_trip() {
        let mut vp = Viewport::new(800.0, 600.0);
        vp.center_x = 12.0;
        vp.center_y = -4.0;
        vp.zoom = 5.0;
        let x = vp.wafer_to_screen_x(vp.screen_to_wafer_x(123.0));
        let y = vp.wafer_to_screen_y(vp.screen_to_wafer_y(456.0));
        assert!((x - 123.0).abs() < 1e-9);
        assert!((y - 456.0).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_at_keeps_cursor_fixed() {
        let mut vp = Viewport::new(800.0, 600.0);
        vp.zoom = 2.0;
        let before = vp.screen_to_wafer_x(200.0);
        vp.zoom_at(200.0, 300.0, 1.5);
        let after = vp.screen_to_wafer_x(200.0);
        assert!((before - after).abs() < 1e-9);
    }

    #[test]
    fn test_fit_wafer() {
        let mut vp = Viewport::new(1000.0, 800.0);
        vp.center_x = 50.0;
        vp.fit_wafer(100.0);
        assert!((vp.center_x).abs() < 1e-12);
        // Limited by the shorter canvas axis: 800 / 100 * 0.9.
        assert!((vp.zoom - 7.2).abs() < 1e-9);
        // The whole wafer is inside the visible bounds.
        let (min_x, min_y, max_x, max_y) = vp.visible_bounds();
        assert!(min_x < -50.0 && max_x > 50.0);
        assert!(min_y < -50.0 && max_y > 50.0);
    }

    #[test]
    fn test_detail_levels() {
        let mut vp = Viewport::new(800.0, 600.0);
        vp.zoom = 10.0;
        assert_eq!(vp.detail_level(), DetailLevel::Full);
        vp.zoom = 4.0;
        assert_eq!(vp.detail_level(), DetailLevel::Medium);
        vp.zoom = 1.0;
        assert_eq!(vp.detail_level(), DetailLevel::Low);
    }
}
