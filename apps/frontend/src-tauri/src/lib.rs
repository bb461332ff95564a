use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;
use tauri::State;

use wafermap_core::commands::{EditChipCommand, RegenerateCommand};
use wafermap_core::geometry::Point;
use wafermap_core::map::{MapInfo, WaferMap};
use wafermap_core::wafer::{ChipSpec, WaferSpec};
use wafermap_core::ChipId;
use wafermap_render::{RenderFrame, Viewport};

/// Shared application state managed by Tauri.
pub struct AppState {
    pub map: Mutex<WaferMap>,
    pub viewport: Mutex<Viewport>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            map: Mutex::new(WaferMap::new("Untitled Wafer")),
            viewport: Mutex::new(Viewport::new(1400.0, 900.0)),
        }
    }
}

// ── Tauri IPC Commands ───────────────────────────────────────────────

/// Get a summary of the current map.
#[tauri::command]
fn get_map_info(state: State<AppState>) -> Result<MapInfo, String> {
    let map = state.map.lock().map_err(|e| e.to_string())?;
    Ok(MapInfo::of(&map))
}

/// Regenerate the grid from new wafer/chip parameters (undoable).
#[tauri::command]
fn regenerate(
    state: State<AppState>,
    diameter: f64,
    flat_angle: f64,
    excluded_radius: f64,
    chip_width: f64,
    chip_height: f64,
    label_font_size: f64,
) -> Result<MapInfo, String> {
    let wafer = WaferSpec::new(diameter, flat_angle, excluded_radius);
    let chip = ChipSpec {
        width_mm: chip_width,
        height_mm: chip_height,
        label_font_size,
    };
    let command = RegenerateCommand::new(wafer, chip).map_err(|e| e.to_string())?;

    let mut map = state.map.lock().map_err(|e| e.to_string())?;
    map.execute_command(Box::new(command));
    Ok(MapInfo::of(&map))
}

/// Set a chip's color/label/file name (undoable).
#[tauri::command]
fn update_chip(
    state: State<AppState>,
    chip_id: ChipId,
    color: Option<String>,
    label: Option<String>,
    file_name: Option<String>,
) -> Result<(), String> {
    let mut map = state.map.lock().map_err(|e| e.to_string())?;
    if map.chip(chip_id).is_none() {
        return Err(format!("Chip {} not found", chip_id));
    }
    map.execute_command(Box::new(EditChipCommand::new(
        chip_id, color, label, file_name,
    )));
    Ok(())
}

/// Get one chip's fields (for populating the edit form on selection).
#[tauri::command]
fn get_chip(state: State<AppState>, chip_id: ChipId) -> Result<ChipDetails, String> {
    let map = state.map.lock().map_err(|e| e.to_string())?;
    let chip = map
        .chip(chip_id)
        .ok_or_else(|| format!("Chip {} not found", chip_id))?;
    Ok(ChipDetails {
        id: chip.id,
        x: chip.x,
        y: chip.y,
        inside: chip.inside,
        number: chip.number,
        color: chip.color.clone(),
        label: chip.label.clone(),
        file_name: chip.file_name.clone(),
    })
}

#[derive(Serialize)]
struct ChipDetails {
    id: ChipId,
    x: f64,
    y: f64,
    inside: bool,
    number: Option<u32>,
    color: String,
    label: String,
    file_name: String,
}

/// Map a pointer position (wafer mm) to the chip under it.
#[tauri::command]
fn chip_at_point(state: State<AppState>, x: f64, y: f64) -> Result<Option<ChipId>, String> {
    let map = state.map.lock().map_err(|e| e.to_string())?;
    Ok(map.chip_at(&Point::new(x, y)))
}

/// Undo last action.
#[tauri::command]
fn undo(state: State<AppState>) -> Result<bool, String> {
    let mut map = state.map.lock().map_err(|e| e.to_string())?;
    Ok(map.undo())
}

/// Redo last undone action.
#[tauri::command]
fn redo(state: State<AppState>) -> Result<bool, String> {
    let mut map = state.map.lock().map_err(|e| e.to_string())?;
    Ok(map.redo())
}

// ── Viewport Commands ────────────────────────────────────────────────

#[tauri::command]
fn get_viewport(state: State<AppState>) -> Result<Viewport, String> {
    let vp = state.viewport.lock().map_err(|e| e.to_string())?;
    Ok(*vp)
}

#[tauri::command]
fn update_viewport(
    state: State<AppState>,
    center_x: f64,
    center_y: f64,
    zoom: f64,
) -> Result<(), String> {
    let mut vp = state.viewport.lock().map_err(|e| e.to_string())?;
    vp.center_x = center_x;
    vp.center_y = center_y;
    vp.zoom = zoom;
    Ok(())
}

/// Fit the full wafer into the canvas.
#[tauri::command]
fn fit_wafer(state: State<AppState>) -> Result<Viewport, String> {
    let map = state.map.lock().map_err(|e| e.to_string())?;
    let mut vp = state.viewport.lock().map_err(|e| e.to_string())?;
    vp.fit_wafer(map.wafer.diameter_mm);
    Ok(*vp)
}

/// Produce the current render frame for the canvas.
#[tauri::command]
fn get_render_frame(
    state: State<AppState>,
    selected: Option<ChipId>,
) -> Result<RenderFrame, String> {
    let map = state.map.lock().map_err(|e| e.to_string())?;
    let vp = state.viewport.lock().map_err(|e| e.to_string())?;
    Ok(RenderFrame::build(&map, *vp, selected))
}

// ── File I/O Commands ────────────────────────────────────────────────

fn export_timestamp() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_default()
}

/// Save the current map as a wafer-map JSON document.
#[tauri::command]
fn save_map_json(state: State<AppState>, path: String) -> Result<(), String> {
    let map = state.map.lock().map_err(|e| e.to_string())?;
    let json = wafermap_io::export(&map, &export_timestamp()).map_err(|e| e.to_string())?;
    std::fs::write(&path, json).map_err(|e| e.to_string())?;
    Ok(())
}

/// Open a wafer-map JSON document, reconciling saved chips onto a freshly
/// generated grid. On any failure the current map is left untouched.
#[tauri::command]
fn open_map_json(state: State<AppState>, path: String) -> Result<MapInfo, String> {
    let json = std::fs::read_to_string(&path).map_err(|e| e.to_string())?;
    let new_map = wafermap_io::import(&json).map_err(|e| e.to_string())?;
    let mut map = state.map.lock().map_err(|e| e.to_string())?;
    *map = new_map;
    Ok(MapInfo::of(&map))
}

/// Export the current map as an SVG drawing.
#[tauri::command]
fn export_svg(state: State<AppState>, path: String) -> Result<(), String> {
    use std::fs::File;
    use std::io::BufWriter;

    let map = state.map.lock().map_err(|e| e.to_string())?;
    let file = File::create(&path).map_err(|e| format!("Failed to create file: {}", e))?;
    let writer = BufWriter::new(file);
    let mut svg_writer = wafermap_io::SvgWriter::new(writer);
    svg_writer
        .write(&map)
        .map_err(|e| format!("SVG write error: {}", e))?;
    Ok(())
}

// ── App setup ────────────────────────────────────────────────────────

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    env_logger::try_init().ok();

    tauri::Builder::default()
        .plugin(tauri_plugin_shell::init())
        .manage(AppState::default())
        .invoke_handler(tauri::generate_handler![
            get_map_info,
            regenerate,
            update_chip,
            get_chip,
            chip_at_point,
            undo,
            redo,
            get_viewport,
            update_viewport,
            fit_wafer,
            get_render_frame,
            save_map_json,
            open_map_json,
            export_svg,
        ])
        .run(tauri::generate_context!())
        .expect("error while running WaferMap");
}
