use crate::chip::{ChipGrid, ChipId};
use crate::grid::GridError;
use crate::map::WaferMap;
use crate::wafer::{ChipSpec, WaferSpec};

/// A reversible command for the undo/redo system.
pub trait Command: std::fmt::Debug + Send {
    /// Execute the command (apply changes to the map).
    fn execute(&mut self, map: &mut WaferMap);
    /// Reverse the command (undo changes).
    fn undo(&mut self, map: &mut WaferMap);
    /// Human-readable description for the undo/redo history.
    fn description(&self) -> &str;
}

// ══════════════════════════════════════════════════════════════════════
// Concrete Commands
// ══════════════════════════════════════════════════════════════════════

/// Set one chip's user fields (color/label/file name).
#[derive(Debug)]
pub struct EditChipCommand {
    pub chip_id: ChipId,
    pub color: Option<String>,
    pub label: Option<String>,
    pub file_name: Option<String>,
    /// Field values before the edit (set on execute).
    previous: Option<(String, String, String)>,
}

impl EditChipCommand {
    pub fn new(
        chip_id: ChipId,
        color: Option<String>,
        label: Option<String>,
        file_name: Option<String>,
    ) -> Self {
        Self {
            chip_id,
            color,
            label,
            file_name,
            previous: None,
        }
    }
}

impl Command for EditChipCommand {
    fn execute(&mut self, map: &mut WaferMap) {
        if let Some(chip) = map.chip(self.chip_id) {
            self.previous = Some((
                chip.color.clone(),
                chip.label.clone(),
                chip.file_name.clone(),
            ));
        }
        map.update_chip(
            self.chip_id,
            self.color.clone(),
            self.label.clone(),
            self.file_name.clone(),
        );
    }

    fn undo(&mut self, map: &mut WaferMap) {
        if let Some((color, label, file_name)) = self.previous.clone() {
            map.update_chip(self.chip_id, Some(color), Some(label), Some(file_name));
        }
    }

    fn description(&self) -> &str {
        "Edit chip"
    }
}

/// Replace the grid by regenerating from new parameters.
///
/// Generation happens at construction, so the command itself cannot fail
/// and execute/undo reduce to swapping complete states.
#[derive(Debug)]
pub struct RegenerateCommand {
    wafer: WaferSpec,
    chip: ChipSpec,
    grid: ChipGrid,
}

impl RegenerateCommand {
    pub fn new(wafer: WaferSpec, chip: ChipSpec) -> Result<Self, GridError> {
        let grid = crate::grid::generate(&wafer, &chip)?;
        Ok(Self { wafer, chip, grid })
    }
}

impl Command for RegenerateCommand {
    fn execute(&mut self, map: &mut WaferMap) {
        // Swap leaves the displaced state here for undo.
        map.swap_state(&mut self.wafer, &mut self.chip, &mut self.grid);
    }

    fn undo(&mut self, map: &mut WaferMap) {
        map.swap_state(&mut self.wafer, &mut self.chip, &mut self.grid);
    }

    fn description(&self) -> &str {
        "Regenerate grid"
    }
}

/// Manages the undo/redo history stack.
#[derive(Debug, Default)]
pub struct CommandHistory {
    undo_stack: Vec<Box<dyn Command>>,
    redo_stack: Vec<Box<dyn Command>>,
}

impl CommandHistory {
    pub fn new() -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        }
    }

    pub fn execute(&mut self, mut command: Box<dyn Command>, map: &mut WaferMap) {
        command.execute(map);
        self.undo_stack.push(command);
        // Executing a new command clears the redo stack.
        self.redo_stack.clear();
    }

    pub fn undo(&mut self, map: &mut WaferMap) -> bool {
        if let Some(mut command) = self.undo_stack.pop() {
            command.undo(map);
            self.redo_stack.push(command);
            true
        } else {
            false
        }
    }

    pub fn redo(&mut self, map: &mut WaferMap) -> bool {
        if let Some(mut command) = self.redo_stack.pop() {
            command.execute(map);
            self.undo_stack.push(command);
            true
        } else {
            false
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack.last().map(|c| c.description())
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack.last().map(|c| c.description())
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_map() -> WaferMap {
        let mut map = WaferMap::new("test");
        map.regenerate(WaferSpec::new(10.0, 0.0, 0.0), ChipSpec::new(2.0, 2.0))
            .unwrap();
        map
    }

    #[test]
    fn test_edit_chip_undo_redo() {
        let mut map = test_map();
        let id = map.grid().inside_chips().next().unwrap().id;

        map.execute_command(Box::new(EditChipCommand::new(
            id,
            Some("red".into()),
            Some("A1".into()),
            None,
        )));
        assert_eq!(map.chip(id).unwrap().color, "red");
        assert!(map.can_undo());

        assert!(map.undo());
        let chip = map.chip(id).unwrap();
        assert_eq!(chip.color, crate::chip::DEFAULT_COLOR);
        assert!(chip.label.is_empty());

        assert!(map.redo());
        assert_eq!(map.chip(id).unwrap().label, "A1");
    }

    #[test]
    fn test_regenerate_undo_restores_previous_grid() {
        let mut map = test_map();
        let before = map.grid().clone();

        let command =
            RegenerateCommand::new(WaferSpec::new(20.0, 0.0, 0.0), ChipSpec::new(2.0, 2.0))
                .unwrap();
        map.execute_command(Box::new(command));
        assert!(map.grid().inside_count() > before.inside_count());

        assert!(map.undo());
        assert_eq!(map.grid(), &before);
        assert!((map.wafer.diameter_mm - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_new_command_clears_redo() {
        let mut map = test_map();
        let id = map.grid().inside_chips().next().unwrap().id;

        map.execute_command(Box::new(EditChipCommand::new(
            id,
            Some("red".into()),
            None,
            None,
        )));
        map.undo();
        assert!(map.can_redo());

        map.execute_command(Box::new(EditChipCommand::new(
            id,
            Some("blue".into()),
            None,
            None,
        )));
        assert!(!map.can_redo());
        assert_eq!(map.chip(id).unwrap().color, "blue");
    }
}
