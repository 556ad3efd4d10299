// ui.rs - Toolbar and clickable board; every action becomes an `Intent`

use eframe::egui;
use egui::{Color32, Pos2, Rect, Stroke, Vec2};
use life_core::{EngineHandle, Intent, PATTERNS};
use log::warn;

const BOX_SIZE: f32 = 15.0;
const SPACING: f32 = 0.5;
const LIVE_COLOR: Color32 = Color32::from_rgb(0, 200, 0);
const DEAD_COLOR: Color32 = Color32::from_rgb(40, 40, 40);

pub struct LifeApp {
    handle: EngineHandle,
    selected_pattern: usize,
}

impl LifeApp {
    pub fn new(handle: EngineHandle) -> Self {
        Self {
            handle,
            selected_pattern: 0,
        }
    }

    fn send(&self, intent: Intent) {
        if let Err(e) = self.handle.send(intent) {
            warn!("Could not send {intent:?}: {e}");
        }
    }
}

fn cell_color(alive: bool) -> Color32 {
    if alive { LIVE_COLOR } else { DEAD_COLOR }
}

/// Maps a click position to `(row, col)` on a board drawn from `origin`.
fn cell_at(origin: Pos2, pos: Pos2, rows: usize, cols: usize) -> Option<(usize, usize)> {
    let offset = pos - origin;
    if offset.x < 0.0 || offset.y < 0.0 {
        return None;
    }
    let pitch = BOX_SIZE + SPACING;
    let (row, col) = ((offset.y / pitch) as usize, (offset.x / pitch) as usize);
    // Clicks on the gap between two boxes belong to neither.
    let in_box = offset.x % pitch < BOX_SIZE && offset.y % pitch < BOX_SIZE;
    (in_box && row < rows && col < cols).then_some((row, col))
}

impl eframe::App for LifeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let snapshot = self.handle.snapshot();
        let grid = &snapshot.grid;

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Conway's Game of Life");

            // Controls
            ui.horizontal(|ui| {
                let button_text = if snapshot.running { "⏸ Stop" } else { "▶ Start" };
                if ui.button(button_text).clicked() {
                    self.send(if snapshot.running { Intent::Stop } else { Intent::Start });
                }

                if ui.button("⏹ Clear").clicked() {
                    self.send(Intent::Clear);
                }

                if ui.button("🎲 Random").clicked() {
                    self.send(Intent::Randomize);
                }

                ui.separator();

                // Pattern dropdown
                ui.label("Pattern:");
                egui::ComboBox::from_id_source("pattern_selector")
                    .selected_text(PATTERNS[self.selected_pattern].name)
                    .show_ui(ui, |ui| {
                        for (i, pattern) in PATTERNS.iter().enumerate() {
                            ui.selectable_value(&mut self.selected_pattern, i, pattern.name);
                        }
                    });

                if ui.button("Apply Pattern").clicked() {
                    self.send(Intent::LoadPattern(&PATTERNS[self.selected_pattern]));
                }

                ui.separator();

                ui.label(format!("Generation: {}", snapshot.generation));
            });

            ui.separator();

            ui.label("Click cells to toggle them alive/dead. Use Start/Stop to run the simulation.");

            ui.separator();

            let (rows, cols) = (grid.rows(), grid.cols());
            let start_pos = ui.cursor().min;
            let total_size = Vec2::new(
                (BOX_SIZE + SPACING) * cols as f32 - SPACING,
                (BOX_SIZE + SPACING) * rows as f32 - SPACING,
            );

            let (response, painter) = ui.allocate_painter(total_size, egui::Sense::click());

            // Fill background
            painter.rect_filled(
                Rect::from_min_size(start_pos, total_size),
                0.0,
                Color32::BLACK,
            );

            for row in 0..rows {
                for col in 0..cols {
                    let x = start_pos.x + col as f32 * (BOX_SIZE + SPACING);
                    let y = start_pos.y + row as f32 * (BOX_SIZE + SPACING);
                    let rect = Rect::from_min_size(egui::pos2(x, y), Vec2::splat(BOX_SIZE));

                    painter.rect_filled(rect, 1.0, cell_color(grid.is_alive(row, col)));
                    painter.rect_stroke(rect, 1.0, Stroke::new(0.2, Color32::from_gray(60)));
                }
            }

            if response.clicked() {
                if let Some((row, col)) = response
                    .interact_pointer_pos()
                    .and_then(|pos| cell_at(start_pos, pos, rows, cols))
                {
                    self.send(Intent::ToggleCell { row, col });
                }
            }

            ui.separator();

            let total = rows * cols;
            let live_cells = grid.population();
            ui.horizontal(|ui| {
                ui.label(format!("Live cells: {}", live_cells));
                ui.label(format!("Dead cells: {}", total - live_cells));
                ui.label(format!("Population: {:.1}%", (live_cells as f32 / total as f32) * 100.0));
            });
        });
    }
}
