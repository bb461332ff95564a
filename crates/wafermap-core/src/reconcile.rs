//! Position-based reconciliation of saved chip state against a fresh grid.
//!
//! Geometry parameters may change between save and load, which reshuffles
//! chip ids entirely; physical position is the only identity that survives.
//! Reconciliation therefore regenerates the grid and copies user fields
//! from saved chips onto new chips that occupy the same position.

use crate::chip::{Chip, ChipGrid};
use crate::grid::{self, GridError};
use crate::wafer::{ChipSpec, WaferSpec};

/// Absolute per-axis tolerance for matching a saved chip to a new one,
/// wide enough to absorb float round-trip through serialization.
pub const MATCH_TOLERANCE_MM: f64 = 0.1;

/// Regenerate the grid and carry user edits over from a saved chip list.
///
/// Only inside chips are matched. For each new inside chip the FIRST saved
/// chip within tolerance (in saved-list order) wins; this is deliberate and
/// reproducible, not an approximation of nearest-match. A saved field is
/// copied only when non-empty, so absent fields never clobber defaults.
/// Unmatched chips keep generation defaults.
pub fn reconcile(
    saved: &[Chip],
    wafer: &WaferSpec,
    chip: &ChipSpec,
) -> Result<ChipGrid, GridError> {
    let mut grid = grid::generate(wafer, chip)?;

    let mut matched = 0usize;
    for new in grid.chips_mut().iter_mut().filter(|c| c.inside) {
        let hit = saved.iter().find(|s| {
            (s.x - new.x).abs() < MATCH_TOLERANCE_MM && (s.y - new.y).abs() < MATCH_TOLERANCE_MM
        });
        if let Some(old) = hit {
            if !old.color.is_empty() {
                new.color = old.color.clone();
            }
            if !old.label.is_empty() {
                new.label = old.label.clone();
            }
            if !old.file_name.is_empty() {
                new.file_name = old.file_name.clone();
            }
            matched += 1;
        }
    }

    log::debug!(
        "reconciled {} saved chips onto {} inside chips ({} matched)",
        saved.len(),
        grid.inside_count(),
        matched
    );

    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chip::DEFAULT_COLOR;

    fn saved_chip(x: f64, y: f64, color: &str, label: &str) -> Chip {
        let mut c = Chip::new(0, x, y, &ChipSpec::new(2.0, 2.0));
        c.color = color.to_string();
        c.label = label.to_string();
        c
    }

    #[test]
    fn test_edits_survive_within_tolerance() {
        let wafer = WaferSpec::new(10.0, 0.0, 0.0);
        let spec = ChipSpec::new(2.0, 2.0);
        // A saved chip 0.05mm off the regenerated position still matches.
        let saved = vec![saved_chip(1.05, 0.96, "blue", "A1")];
        let grid = reconcile(&saved, &wafer, &spec).unwrap();
        let target = grid
            .inside_chips()
            .find(|c| c.x == 1.0 && c.y == 1.0)
            .unwrap();
        assert_eq!(target.color, "blue");
        assert_eq!(target.label, "A1");
    }

    #[test]
    fn test_far_away_saved_chip_is_ignored() {
        let wafer = WaferSpec::new(10.0, 0.0, 0.0);
        let spec = ChipSpec::new(2.0, 2.0);
        let saved = vec![saved_chip(50.0, 50.0, "green", "far")];
        let grid = reconcile(&saved, &wafer, &spec).unwrap();
        for chip in grid.inside_chips() {
            assert_eq!(chip.color, DEFAULT_COLOR);
            assert!(chip.label.is_empty());
        }
    }

    #[test]
    fn test_first_saved_match_wins() {
        let wafer = WaferSpec::new(10.0, 0.0, 0.0);
        let spec = ChipSpec::new(2.0, 2.0);
        // Both saved chips fall within tolerance of the chip at (1, 1).
        let saved = vec![
            saved_chip(1.05, 1.0, "red", "first"),
            saved_chip(0.98, 1.02, "blue", "second"),
        ];
        let grid = reconcile(&saved, &wafer, &spec).unwrap();
        let target = grid
            .inside_chips()
            .find(|c| c.x == 1.0 && c.y == 1.0)
            .unwrap();
        assert_eq!(target.label, "first");
        assert_eq!(target.color, "red");
    }

    #[test]
    fn test_empty_saved_fields_do_not_clobber() {
        let wafer = WaferSpec::new(10.0, 0.0, 0.0);
        let spec = ChipSpec::new(2.0, 2.0);
        let mut s = saved_chip(1.0, 1.0, "", "");
        s.file_name = "die.gds".to_string();
        let grid = reconcile(&[s], &wafer, &spec).unwrap();
        let target = grid
            .inside_chips()
            .find(|c| c.x == 1.0 && c.y == 1.0)
            .unwrap();
        // Empty color/label leave defaults; file_name copies.
        assert_eq!(target.color, DEFAULT_COLOR);
        assert!(target.label.is_empty());
        assert_eq!(target.file_name, "die.gds");
    }

    #[test]
    fn test_outside_chips_never_match() {
        let wafer = WaferSpec::new(10.0, 0.0, 0.0);
        let spec = ChipSpec::new(2.0, 2.0);
        let grid = grid::generate(&wafer, &spec).unwrap();
        let outside = grid.chips().iter().find(|c| !c.inside).unwrap();
        let saved = vec![saved_chip(outside.x, outside.y, "purple", "nope")];
        let reconciled = reconcile(&saved, &wafer, &spec).unwrap();
        let same = reconciled.chip(outside.id).unwrap();
        assert_eq!(same.color, DEFAULT_COLOR);
        assert!(same.label.is_empty());
    }

    #[test]
    fn test_geometry_change_keeps_only_aligned_edits() {
        // Save with 2mm chips, reload with 2mm chips but a bigger wafer:
        // positions that still exist keep their labels.
        let spec = ChipSpec::new(2.0, 2.0);
        let small = WaferSpec::new(10.0, 0.0, 0.0);
        let mut saved: Vec<Chip> = grid::generate(&small, &spec)
            .unwrap()
            .inside_chips()
            .cloned()
            .collect();
        for chip in &mut saved {
            chip.label = format!("chip-{}", chip.number.unwrap());
        }

        let big = WaferSpec::new(14.0, 0.0, 0.0);
        let grid = reconcile(&saved, &big, &spec).unwrap();
        // Every saved position lands on a grid cell in the bigger wafer
        // too (same chip size, both grids are centered), so every label
        // must survive at its position.
        for old in &saved {
            let hit = grid
                .inside_chips()
                .find(|c| (c.x - old.x).abs() < 1e-9 && (c.y - old.y).abs() < 1e-9)
                .unwrap();
            assert_eq!(hit.label, old.label);
        }
    }
}
