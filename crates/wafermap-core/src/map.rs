use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::chip::{Chip, ChipGrid, ChipId};
use crate::commands::{Command, CommandHistory};
use crate::geometry::Point;
use crate::grid::{self, GridError};
use crate::reconcile;
use crate::spatial::SpatialIndex;
use crate::wafer::{ChipSpec, WaferSpec};

/// The single owned wafer-map state: current parameters plus the chip
/// collection they produced.
///
/// Generation and reconciliation are pure functions; this container is the
/// one place their output is installed. Installation is atomic: a failed
/// regeneration leaves the current grid untouched.
#[derive(Debug)]
pub struct WaferMap {
    /// Map identifier.
    pub id: Uuid,
    /// Project name.
    pub name: String,
    /// Wafer parameters the current grid was generated from.
    pub wafer: WaferSpec,
    /// Chip parameters the current grid was generated from.
    pub chip: ChipSpec,
    grid: ChipGrid,
    /// Command history for undo/redo.
    history: CommandHistory,
}

impl WaferMap {
    /// A new map with default parameters and no chips; call
    /// [`WaferMap::regenerate`] to produce the first grid.
    pub fn new(name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            wafer: WaferSpec::default(),
            chip: ChipSpec::default(),
            grid: ChipGrid::empty(),
            history: CommandHistory::new(),
        }
    }

    /// Assemble a map from already-reconciled parts (used on import).
    pub fn from_parts(name: &str, wafer: WaferSpec, chip: ChipSpec, grid: ChipGrid) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            wafer,
            chip,
            grid,
            history: CommandHistory::new(),
        }
    }

    // ── Grid lifecycle ───────────────────────────────────────────────

    /// Regenerate the grid from new parameters. On success the old
    /// collection is fully replaced in one step and the inside-chip count
    /// is returned; on error nothing changes.
    pub fn regenerate(&mut self, wafer: WaferSpec, chip: ChipSpec) -> Result<usize, GridError> {
        let grid = grid::generate(&wafer, &chip)?;
        self.wafer = wafer;
        self.chip = chip;
        self.grid = grid;
        Ok(self.grid.inside_count())
    }

    /// Regenerate from new parameters, carrying user edits over from the
    /// current chips by position.
    pub fn regenerate_preserving(
        &mut self,
        wafer: WaferSpec,
        chip: ChipSpec,
    ) -> Result<usize, GridError> {
        let grid = reconcile::reconcile(self.grid.chips(), &wafer, &chip)?;
        self.wafer = wafer;
        self.chip = chip;
        self.grid = grid;
        Ok(self.grid.inside_count())
    }

    pub fn grid(&self) -> &ChipGrid {
        &self.grid
    }

    pub(crate) fn swap_state(
        &mut self,
        wafer: &mut WaferSpec,
        chip: &mut ChipSpec,
        grid: &mut ChipGrid,
    ) {
        std::mem::swap(&mut self.wafer, wafer);
        std::mem::swap(&mut self.chip, chip);
        std::mem::swap(&mut self.grid, grid);
    }

    // ── Chip access & interactive editing ────────────────────────────

    pub fn chip(&self, id: ChipId) -> Option<&Chip> {
        self.grid.chip(id)
    }

    /// Mutate a chip's user fields in place. `None` leaves a field alone.
    /// Returns false if the id does not exist.
    pub fn update_chip(
        &mut self,
        id: ChipId,
        color: Option<String>,
        label: Option<String>,
        file_name: Option<String>,
    ) -> bool {
        match self.grid.chip_mut(id) {
            Some(chip) => {
                if let Some(color) = color {
                    chip.color = color;
                }
                if let Some(label) = label {
                    chip.label = label;
                }
                if let Some(file_name) = file_name {
                    chip.file_name = file_name;
                }
                true
            }
            None => false,
        }
    }

    /// Map a pointer position to the inside chip under it, if any.
    pub fn chip_at(&self, point: &Point) -> Option<ChipId> {
        SpatialIndex::build(&self.grid).chip_at(point)
    }

    // ── Undo / Redo ──────────────────────────────────────────────────

    pub fn execute_command(&mut self, command: Box<dyn Command>) {
        let mut history = std::mem::take(&mut self.history);
        history.execute(command, self);
        self.history = history;
    }

    pub fn undo(&mut self) -> bool {
        let mut history = std::mem::take(&mut self.history);
        let done = history.undo(self);
        self.history = history;
        done
    }

    pub fn redo(&mut self) -> bool {
        let mut history = std::mem::take(&mut self.history);
        let done = history.redo(self);
        self.history = history;
        done
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.history.undo_description()
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.history.redo_description()
    }
}

/// Summary of the current map, serialized for UI consumption.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapInfo {
    pub name: String,
    pub cols: usize,
    pub rows: usize,
    pub chip_count: usize,
    pub inside_count: usize,
}

impl MapInfo {
    pub fn of(map: &WaferMap) -> Self {
        Self {
            name: map.name.clone(),
            cols: map.grid().cols(),
            rows: map.grid().rows(),
            chip_count: map.grid().len(),
            inside_count: map.grid().inside_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_map_is_empty() {
        let map = WaferMap::new("test_wafer");
        assert_eq!(map.name, "test_wafer");
        assert!(map.grid().is_empty());
        assert!(!map.can_undo());
    }

    #[test]
    fn test_regenerate_installs_grid() {
        let mut map = WaferMap::new("test");
        let inside = map
            .regenerate(WaferSpec::new(10.0, 0.0, 0.0), ChipSpec::new(2.0, 2.0))
            .unwrap();
        assert_eq!(inside, 9);
        assert_eq!(map.grid().inside_count(), 9);
    }

    #[test]
    fn test_failed_regenerate_leaves_grid_untouched() {
        let mut map = WaferMap::new("test");
        map.regenerate(WaferSpec::new(10.0, 0.0, 0.0), ChipSpec::new(2.0, 2.0))
            .unwrap();
        let before = map.grid().clone();

        let err = map.regenerate(WaferSpec::new(10.0, 0.0, 0.0), ChipSpec::new(0.0, 2.0));
        assert!(err.is_err());
        assert_eq!(map.grid(), &before);
        assert!((map.chip.width_mm - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_update_chip() {
        let mut map = WaferMap::new("test");
        map.regenerate(WaferSpec::new(10.0, 0.0, 0.0), ChipSpec::new(2.0, 2.0))
            .unwrap();
        let id = map.grid().inside_chips().next().unwrap().id;
        assert!(map.update_chip(id, Some("red".into()), Some("A1".into()), None));
        let chip = map.chip(id).unwrap();
        assert_eq!(chip.color, "red");
        assert_eq!(chip.label, "A1");
        assert!(chip.file_name.is_empty());

        assert!(!map.update_chip(usize::MAX, None, None, None));
    }

    #[test]
    fn test_regenerate_preserving_keeps_edits() {
        let mut map = WaferMap::new("test");
        map.regenerate(WaferSpec::new(10.0, 0.0, 0.0), ChipSpec::new(2.0, 2.0))
            .unwrap();
        let id = map.grid().inside_chips().next().unwrap().id;
        let pos = {
            let c = map.chip(id).unwrap();
            (c.x, c.y)
        };
        map.update_chip(id, None, Some("keep-me".into()), None);

        // Same chip size, bigger wafer: the edited position still exists.
        map.regenerate_preserving(WaferSpec::new(14.0, 0.0, 0.0), ChipSpec::new(2.0, 2.0))
            .unwrap();
        let survivor = map
            .grid()
            .inside_chips()
            .find(|c| (c.x - pos.0).abs() < 1e-9 && (c.y - pos.1).abs() < 1e-9)
            .unwrap();
        assert_eq!(survivor.label, "keep-me");
    }

    #[test]
    fn test_chip_at_point() {
        let mut map = WaferMap::new("test");
        map.regenerate(WaferSpec::new(10.0, 0.0, 0.0), ChipSpec::new(2.0, 2.0))
            .unwrap();
        // The chip spanning [-1,1]x[-1,1] sits under the wafer center.
        let id = map.chip_at(&Point::new(0.0, 0.0)).unwrap();
        let chip = map.chip(id).unwrap();
        assert!(chip.inside);
        assert!(chip.bbox().contains_point(&Point::new(0.0, 0.0)));

        assert!(map.chip_at(&Point::new(200.0, 200.0)).is_none());
    }
}
