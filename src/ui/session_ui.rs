use crate::config::LoaderConfig;
use crate::keybinds::{Action, KeyBindings};
use crate::selection::Selection;
use crate::session::{Session, SessionState};
use crate::utils::padded_range;
use crate::workbook::load_workbook;

use ecolor::Hsva;
use eframe::egui::{Color32, PointerButton, Rgba, RichText, Stroke};
use egui_file::FileDialog;
use egui_plot::{Line, LineStyle, Plot, PlotPoints, Points, Polygon, VLine};

use std::path::Path;

/// The selection panel: the current sample's curve, the drag-to-select
/// range, the fit readout and the confirm/clear controls.
pub struct SessionPanel {
    pub session: Session,
    pub loader: LoaderConfig,
    workbook_loaded: bool,
    drag_anchor: Option<f64>,
    live_span: Option<(f64, f64)>,
    pub show_stats: bool,
    status: Option<String>,
    open_file_dialog: Option<FileDialog>,
}

impl SessionPanel {
    pub fn new(session: Session, loader: LoaderConfig, workbook_loaded: bool) -> Self {
        Self {
            session,
            loader,
            workbook_loaded,
            drag_anchor: None,
            live_span: None,
            show_stats: true,
            status: None,
            open_file_dialog: None,
        }
    }

    pub fn ui(&mut self, ui: &mut egui::Ui, ctx: &egui::Context, keybinds: &KeyBindings) {
        if let Some(msg) = self.session.take_message() {
            println!("{}", msg);
            self.status = Some(msg);
        }

        if !self.workbook_loaded {
            self.workbook_picker_ui(ui, ctx);
            return;
        }

        if !ui.ctx().wants_keyboard_input() {
            ui.input(|i| {
                if keybinds.action_triggered(Action::ConfirmSample, i) {
                    if self.session.confirm() {
                        self.reset_drag();
                        self.status = None;
                    }
                }
                if keybinds.action_triggered(Action::ClearSelection, i) {
                    self.session.clear_selection();
                    self.reset_drag();
                }
                if keybinds.action_triggered(Action::ToggleShowStats, i) {
                    self.show_stats = !self.show_stats;
                }
            });
        }

        ui.horizontal(|ui| {
            let processed = self.session.fitted_count();
            let total = self.session.total_samples();
            match self.session.current_sample() {
                Some(sample) => {
                    ui.label(RichText::new(format!("Sample {}", sample)).strong());
                },
                None => {
                    ui.label(RichText::new("All samples processed").strong());
                },
            }
            ui.separator();
            ui.label(format!("{} of {} confirmed", processed, total));
            ui.separator();
            ui.label(format!("State: {}", self.session.state()));
        });

        if self.session.state() == SessionState::Done {
            ui.separator();
            ui.label(self.session.summary());
            ui.label("Close the window to export the results table.");
            return;
        }

        let mut confirm_clicked = false;
        let mut clear_clicked = false;
        ui.horizontal(|ui| {
            confirm_clicked = ui.button("Confirm fit (Enter)").clicked();
            clear_clicked = ui.button("Clear selection (Esc)").clicked();
        });
        if confirm_clicked && self.session.confirm() {
            self.reset_drag();
            self.status = None;
        }
        if clear_clicked {
            self.session.clear_selection();
            self.reset_drag();
        }

        if let Some(status) = &self.status {
            ui.colored_label(Color32::YELLOW, status);
        }

        ui.separator();
        self.render_curve_plot(ui);
        ui.separator();
        self.render_selection_plot(ui);

        if self.show_stats {
            self.render_fit_stats(ui);
        }
    }

    fn reset_drag(&mut self) {
        self.drag_anchor = None;
        self.live_span = None;
    }

    /// Full force-deflection curve with the drag-selected band. Dragging
    /// re-derives the span on every pointer event; the index mapping and the
    /// fit happen once on release.
    fn render_curve_plot(&mut self, ui: &mut egui::Ui) {
        let Some(sample) = self.session.current_sample() else {
            return;
        };

        let curve: Vec<[f64; 2]> =
            sample.deflection.iter().zip(&sample.force).map(|(&d, &f)| [d, f]).collect();
        let curve_color = sample_color(&sample.id);
        let (min_y, max_y) = padded_range(sample.min_force(), sample.max_force(), 0.05);

        let confirmed_band = self.session.current_fit().map(|fit| {
            let sel = fit.selection;
            (sample.deflection[sel.start_idx], sample.deflection[sel.end_idx - 1])
        });

        let mut anchor = self.drag_anchor;
        let mut live = self.live_span;
        let mut drag_ended: Option<(f64, f64)> = None;

        Plot::new("curve_plot")
            .height(340.)
            .allow_drag(false)
            .allow_scroll(false)
            .x_axis_label("Deflection (mm)")
            .y_axis_label("Force (N)")
            .show(ui, |plot_ui| {
                plot_ui.line(Line::new("curve", PlotPoints::from(curve)).color(curve_color));

                let primary_pressed =
                    plot_ui.ctx().input(|i| i.pointer.button_pressed(PointerButton::Primary));
                let primary_down =
                    plot_ui.ctx().input(|i| i.pointer.button_down(PointerButton::Primary));
                let primary_released =
                    plot_ui.ctx().input(|i| i.pointer.button_released(PointerButton::Primary));

                if primary_released {
                    if let Some(span) = live.take() {
                        drag_ended = Some(span);
                    }
                    anchor = None;
                }

                if let Some(pointer_pos) = plot_ui.pointer_coordinate() {
                    if primary_pressed {
                        anchor = Some(pointer_pos.x);
                        live = None;
                    }
                    if primary_down {
                        if let Some(a) = anchor {
                            live = Some((a.min(pointer_pos.x), a.max(pointer_pos.x)));
                        }
                    }
                }

                // the live drag band wins over the confirmed selection band
                let band = live.or(confirmed_band);
                if let Some((x0, x1)) = band {
                    plot_ui.polygon(create_polygon(
                        x0,
                        x1,
                        min_y,
                        max_y,
                        Color32::from_rgb(120, 180, 90).gamma_multiply(0.2),
                        Color32::from_rgb(120, 180, 90),
                        "selection",
                    ));
                    plot_ui.vline(create_vline(x0, Color32::DARK_GREEN, LineStyle::Solid, "start"));
                    plot_ui.vline(create_vline(x1, Color32::DARK_GREEN, LineStyle::Solid, "end"));
                }
            });

        self.drag_anchor = anchor;
        self.live_span = live;

        if let Some((lo, hi)) = drag_ended {
            let selection = self
                .session
                .current_sample()
                .map(|s| Selection::from_drag(&s.deflection, lo, hi));
            if let Some(selection) = selection {
                self.session.select(selection);
            }
        }
    }

    /// The selected sub-range on its own axes, with the fitted line over it.
    fn render_selection_plot(&mut self, ui: &mut egui::Ui) {
        let Some(sample) = self.session.current_sample() else {
            return;
        };
        let Some(fit) = self.session.current_fit() else {
            ui.label("Drag across the linear region of the curve to fit it.");
            return;
        };

        let sel = fit.selection;
        let point_color = sample_color(&sample.id);
        let points: Vec<[f64; 2]> = sel
            .slice(&sample.deflection)
            .iter()
            .zip(sel.slice(&sample.force))
            .map(|(&d, &f)| [d, f])
            .collect();

        let x0 = sample.deflection[sel.start_idx];
        let x1 = sample.deflection[sel.end_idx - 1];
        let fit_line =
            vec![[x0, fit.model.calculate(x0)], [x1, fit.model.calculate(x1)]];

        Plot::new("selection_plot")
            .height(200.)
            .allow_drag(false)
            .allow_scroll(false)
            .x_axis_label("Deflection (mm)")
            .y_axis_label("Force (N)")
            .show(ui, |plot_ui| {
                plot_ui.points(
                    Points::new("selected", PlotPoints::from(points))
                        .color(point_color)
                        .radius(2.0),
                );
                plot_ui.line(
                    Line::new("fit", PlotPoints::from(fit_line)).color(Color32::RED).width(2.0),
                );
            });
    }

    fn render_fit_stats(&mut self, ui: &mut egui::Ui) {
        let Some(fit) = self.session.current_fit() else {
            return;
        };

        egui::Grid::new("fit_stats").min_col_width(110.).show(ui, |ui| {
            ui.label("slope");
            ui.label(format!("{:.6}", fit.model.slope));
            ui.label("intercept");
            ui.label(format!("{:.6}", fit.model.intercept));
            ui.end_row();

            ui.label("r");
            ui.label(format!("{:.6}", fit.r));
            ui.label("r2");
            ui.label(format!("{:.6}", fit.r2));
            ui.end_row();

            ui.label("SE slope");
            ui.label(format!("{:.6}", fit.se_slope));
            ui.label("SE intercept");
            ui.label(format!("{:.6}", fit.se_intercept));
            ui.end_row();

            ui.label("p-value");
            ui.label(format!("{:.3e}", fit.p_value));
            ui.label("points");
            ui.label(fit.n.to_string());
            ui.end_row();
        });
    }

    fn workbook_picker_ui(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        ui.label("No workbook loaded.");
        if ui.button("Open workbook").clicked() {
            let mut dialog = FileDialog::open_file(None)
                .title("Select a bending test workbook")
                .show_rename(false)
                .show_new_folder(false);
            dialog.open();
            self.open_file_dialog = Some(dialog);
        }
        if let Some(status) = &self.status {
            ui.colored_label(Color32::YELLOW, status);
        }

        let mut picked = None;
        let mut close_dialog = false;
        if let Some(dialog) = &mut self.open_file_dialog {
            dialog.show(ctx);

            match dialog.state() {
                egui_file::State::Selected => {
                    picked = dialog.path().map(|p| p.to_path_buf());
                    close_dialog = true;
                },
                egui_file::State::Cancelled | egui_file::State::Closed => {
                    close_dialog = true;
                },
                _ => {},
            }
        }
        if close_dialog {
            self.open_file_dialog = None;
        }
        if let Some(path) = picked {
            self.load_workbook_from(&path);
        }
    }

    fn load_workbook_from(&mut self, path: &Path) {
        match load_workbook(path, &self.loader) {
            Ok(samples) => {
                println!("Stiffness data loaded with {} samples", samples.len());
                let mut session = Session::new(samples);
                session.start();
                self.session = session;
                self.workbook_loaded = true;
                self.status = None;
            },
            Err(e) => {
                eprintln!("Failed to load '{}': {}", path.display(), e);
                self.status = Some(format!("Failed to load '{}': {}", path.display(), e));
            },
        }
    }
}

pub fn create_polygon(
    start_x: f64,
    end_x: f64,
    min_y: f64,
    max_y: f64,
    color: Color32,
    stroke: Color32,
    id: &str,
) -> Polygon {
    Polygon::new(
        id,
        PlotPoints::from(vec![
            [start_x, min_y],
            [start_x, max_y],
            [end_x, max_y],
            [end_x, min_y],
            [start_x, min_y], // Close the polygon
        ]),
    )
    .fill_color(color)
    .stroke(Stroke::new(1.0, stroke))
    .allow_hover(false)
}

pub fn create_vline(x: f64, color: Color32, style: LineStyle, id: &str) -> VLine {
    VLine::new(id, x).allow_hover(false).style(style).stroke(Stroke::new(2.0, color))
}

/// Stable per-sample trace color from the sample id.
pub fn sample_color(seed: &str) -> Color32 {
    let hash = fxhash::hash(seed);

    let hue = (hash % 360) as f32 / 360.0;
    let saturation = 0.85;
    let value = 0.9;
    let alpha = 1.;

    let hsva = Hsva::new(hue, saturation, value, alpha);
    Color32::from(Rgba::from(hsva))
}
