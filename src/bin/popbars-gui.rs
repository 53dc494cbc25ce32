/*!
 * Desktop viewer for popbars - animated population bar chart
 *
 * Loads the spreadsheet in the background, then cycles through the years
 * once per second:
 * - Horizontal bars for the top 12 countries of the displayed year
 * - Large year label and total in the lower right corner
 * - Open another spreadsheet or save the current frame as PNG
 *
 * Platform support: Windows, macOS, Linux
 */

use eframe::egui;
use log::info;
use popbars::loader::{self, LoadHandle, LoadOptions, Source};
use popbars::viz::{self, ChartOptions};
use popbars::{Frame, Ticker, ViewModel};
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

const CHART_HEIGHT: f32 = 500.0;
const LABEL_COL_PX: f32 = 160.0;
const AXIS_PX: f32 = 24.0;

fn main() -> Result<(), eframe::Error> {
    // Enable logging for better debugging
    env_logger::init();

    let source = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "assets/data.csv".to_string());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 680.0])
            .with_min_inner_size([600.0, 400.0])
            .with_title("Population - popbars"),
        ..Default::default()
    };

    eframe::run_native(
        "popbars",
        options,
        Box::new(move |cc| Ok(Box::new(PopbarsApp::new(&cc.egui_ctx, source)))),
    )
}

/// Main application state
struct PopbarsApp {
    opts: ChartOptions,
    vm: ViewModel,
    source: String,

    // Background work
    load: Option<LoadHandle>,
    ticks: mpsc::Receiver<()>,
    // Stopped and joined when the app is dropped.
    _ticker: Ticker,

    // UI state
    status_message: String,
    error_message: String,
}

impl PopbarsApp {
    fn new(ctx: &egui::Context, source: String) -> Self {
        let opts = ChartOptions::default();
        let vm = ViewModel::new(opts.wrap, &opts.locale);

        let (sender, ticks) = mpsc::channel();
        let repaint = ctx.clone();
        let ticker = Ticker::spawn(Duration::from_millis(opts.interval_ms), move || {
            let _ = sender.send(());
            repaint.request_repaint();
        });

        let mut app = Self {
            opts,
            vm,
            source,
            load: None,
            ticks,
            _ticker: ticker,
            status_message: String::new(),
            error_message: String::new(),
        };
        app.start_load(ctx);
        app
    }

    fn start_load(&mut self, ctx: &egui::Context) {
        self.error_message.clear();
        self.status_message = format!("Loading {}...", self.source);
        let repaint = ctx.clone();
        // Replacing the handle cancels a load that is still running.
        self.load = Some(loader::spawn_load_then(
            Source::parse(&self.source),
            LoadOptions { skip_header: true },
            move || repaint.request_repaint(),
        ));
    }

    fn check_load_result(&mut self) {
        let Some(rows) = self.load.as_mut().and_then(LoadHandle::try_take) else {
            return;
        };
        self.load = None;
        if rows.is_empty() {
            self.error_message = format!("No data loaded from {} (see log)", self.source);
            self.status_message.clear();
        } else {
            self.status_message = format!("{} rows loaded", rows.len());
        }
        self.vm.set_rows(rows);
        self.vm.reset();
    }

    fn apply_ticks(&mut self) {
        while self.ticks.try_recv().is_ok() {
            self.vm.tick();
        }
    }

    fn save_frame(&mut self, frame: &Frame) {
        let dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        let path = dir.join(format!("popbars_{}.png", frame.year_label));
        match viz::render_frame(frame, &self.opts, &path) {
            Ok(()) => {
                info!("saved frame to {}", path.display());
                self.status_message = format!("Saved {}", path.display());
                self.error_message.clear();
            }
            Err(err) => self.error_message = format!("Failed to save frame: {}", err),
        }
    }
}

impl eframe::App for PopbarsApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_load_result();
        self.apply_ticks();
        let frame = self.vm.frame();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading(&self.opts.title);
            ui.label(&self.opts.subtitle);
            ui.add_space(10.0);

            draw_chart(ui, &frame, &self.opts);

            ui.add_space(10.0);
            ui.horizontal(|ui| {
                if ui.button("Open...").clicked()
                    && let Some(path) = rfd::FileDialog::new()
                        .add_filter("Spreadsheet", &["csv", "xlsx", "xls", "ods"])
                        .pick_file()
                {
                    self.source = path.to_string_lossy().to_string();
                    self.start_load(ctx);
                }
                if ui.button("Save frame").clicked() {
                    self.save_frame(&frame);
                }
                if self.load.is_some() {
                    ui.spinner();
                }
            });

            if !self.status_message.is_empty() {
                ui.colored_label(egui::Color32::DARK_GREEN, &self.status_message);
            }
            if !self.error_message.is_empty() {
                ui.colored_label(egui::Color32::RED, &self.error_message);
            }
        });
    }
}

fn color32(opts: &ChartOptions, rank: usize) -> egui::Color32 {
    let c = opts.color(rank);
    egui::Color32::from_rgb(c.r, c.g, c.b)
}

/// Horizontal bars with the value axis on top, like the image renderer.
fn draw_chart(ui: &mut egui::Ui, frame: &Frame, opts: &ChartOptions) {
    let (rect, _response) = ui.allocate_exact_size(
        egui::vec2(ui.available_width(), CHART_HEIGHT),
        egui::Sense::hover(),
    );
    let painter = ui.painter_at(rect);

    let rows = frame.bars.len().max(frame.categories.len()).max(1);
    let x_max = viz::util::value_axis_max(frame.bars.iter().map(|b| b.value));
    let plot_left = rect.left() + LABEL_COL_PX;
    let plot_top = rect.top() + AXIS_PX;
    let plot_w = (rect.right() - plot_left - 20.0).max(1.0);
    let row_h = (rect.bottom() - plot_top) / rows as f32;
    let bar_h = row_h * opts.bar_height.clamp(0.1, 1.0) as f32;
    let x_of = |v: f64| plot_left + (v / x_max) as f32 * plot_w;

    // vertical grid lines only
    let grid = egui::Stroke::new(1.0, egui::Color32::from_gray(225));
    for k in 0..=5 {
        let v = x_max * f64::from(k) / 5.0;
        let x = x_of(v);
        painter.line_segment([egui::pos2(x, plot_top), egui::pos2(x, rect.bottom())], grid);
        painter.text(
            egui::pos2(x, plot_top - 4.0),
            egui::Align2::CENTER_BOTTOM,
            viz::format_grouped(v.round(), &opts.locale),
            egui::FontId::proportional(12.0),
            egui::Color32::GRAY,
        );
    }

    for rank in 0..rows {
        let y_mid = plot_top + row_h * (rank as f32 + 0.5);
        if let Some(label) = frame.categories.get(rank) {
            painter.text(
                egui::pos2(plot_left - 6.0, y_mid),
                egui::Align2::RIGHT_CENTER,
                label,
                egui::FontId::proportional(14.0),
                egui::Color32::BLACK,
            );
        }
        let Some(bar) = frame.bars.get(rank) else {
            continue;
        };
        let len = if bar.value.is_finite() { bar.value.max(0.0) } else { 0.0 };
        let x_end = x_of(len);
        let bar_rect = egui::Rect::from_min_max(
            egui::pos2(plot_left, y_mid - bar_h / 2.0),
            egui::pos2(x_end, y_mid + bar_h / 2.0),
        );
        painter.rect_filled(bar_rect, 0.0, color32(opts, rank));
        painter.text(
            egui::pos2(x_end + 4.0, y_mid),
            egui::Align2::LEFT_CENTER,
            viz::format_grouped(bar.value, &opts.locale),
            egui::FontId::proportional(13.0),
            egui::Color32::BLACK,
        );
    }

    let right = rect.right() - rect.width() * 0.05;
    let faded = egui::Color32::from_black_alpha(128);
    painter.text(
        egui::pos2(right, rect.bottom() - rect.height() * 0.20),
        egui::Align2::RIGHT_BOTTOM,
        &frame.year_label,
        egui::FontId::proportional(56.0),
        faded,
    );
    painter.text(
        egui::pos2(right, rect.bottom() - rect.height() * 0.15),
        egui::Align2::RIGHT_TOP,
        format!("Total: {}", frame.total_text),
        egui::FontId::proportional(24.0),
        faded,
    );
}
