use serde::{Deserialize, Serialize};

use wafermap_core::chip::ChipId;
use wafermap_core::map::WaferMap;

/// Wafer boundary geometry ready for drawing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaferOutline {
    pub radius: f64,
    /// Radius of the usable-area guide circle; equals `radius` when no
    /// exclusion band is configured.
    pub usable_radius: f64,
    /// Flat chord endpoints `[x, y_top, x, y_bottom]`, if a flat is set.
    pub flat_chord: Option<[f64; 4]>,
}

/// One chip ready for drawing. Emitted for inside chips only, in the order
/// the core produced them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderChip {
    pub id: ChipId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub color: String,
    pub number: Option<u32>,
    pub label: String,
    pub file_name: String,
    pub selected: bool,
}

/// Complete render frame data sent to the frontend canvas.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderFrame {
    pub outline: WaferOutline,
    pub chips: Vec<RenderChip>,
    pub viewport: super::Viewport,
    pub label_font_size: f64,
    pub selected: Option<ChipId>,
}

impl RenderFrame {
    pub fn build(map: &WaferMap, viewport: super::Viewport, selected: Option<ChipId>) -> Self {
        let outline = WaferOutline {
            radius: map.wafer.radius(),
            usable_radius: map.wafer.usable_radius(),
            flat_chord: map
                .wafer
                .flat_edge()
                .map(|f| [f.x_cutoff, -f.y_max, f.x_cutoff, f.y_max]),
        };

        let chips = map
            .grid()
            .inside_chips()
            .map(|c| RenderChip {
                id: c.id,
                x: c.x,
                y: c.y,
                width: c.width,
                height: c.height,
                color: c.color.clone(),
                number: c.number,
                label: c.label.clone(),
                file_name: c.file_name.clone(),
                selected: selected == Some(c.id),
            })
            .collect();

        Self {
            outline,
            chips,
            viewport,
            label_font_size: map.chip.label_font_size,
            selected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Viewport;
    use wafermap_core::wafer::{ChipSpec, WaferSpec};

    fn sample_map(flat: f64) -> WaferMap {
        let mut map = WaferMap::new("render_test");
        map.regenerate(WaferSpec::new(10.0, flat, 0.0), ChipSpec::new(2.0, 2.0))
            .unwrap();
        map
    }

    #[test]
    fn test_frame_carries_inside_chips_in_emitted_order() {
        let map = sample_map(0.0);
        let frame = RenderFrame::build(&map, Viewport::new(800.0, 600.0), None);
        assert_eq!(frame.chips.len(), map.grid().inside_count());
        // Emitted order == ascending id order for inside chips.
        let ids: Vec<ChipId> = frame.chips.iter().map(|c| c.id).collect();
        let expected: Vec<ChipId> = map.grid().inside_chips().map(|c| c.id).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_outline_without_flat() {
        let frame = RenderFrame::build(&sample_map(0.0), Viewport::new(800.0, 600.0), None);
        assert!(frame.outline.flat_chord.is_none());
        assert!((frame.outline.radius - 5.0).abs() < 1e-12);
        assert!((frame.outline.usable_radius - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_outline_with_flat_chord() {
        let frame = RenderFrame::build(&sample_map(90.0), Viewport::new(800.0, 600.0), None);
        let chord = frame.outline.flat_chord.unwrap();
        // Chord is vertical and symmetric about the x-axis.
        assert!((chord[0] - chord[2]).abs() < 1e-12);
        assert!((chord[1] + chord[3]).abs() < 1e-12);
        assert!(chord[0] < 0.0);
    }

    #[test]
    fn test_selection_flag() {
        let map = sample_map(0.0);
        let id = map.grid().inside_chips().next().unwrap().id;
        let frame = RenderFrame::build(&map, Viewport::new(800.0, 600.0), Some(id));
        let selected: Vec<_> = frame.chips.iter().filter(|c| c.selected).collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].id, id);
    }
}
