//! Visualization module: horizontal bar chart rendering for animation frames.
//!
//! Features:
//! - SVG (by `.svg` extension) or PNG output through plotters
//! - One colour per rank from a configurable palette
//! - Locale-aware number labels on the value axis and at the bar ends
//! - Year and total overlay in the lower right corner
//! - Full animation cycle rendered as numbered frames

pub mod terminal;
pub mod text;
pub mod types;
pub mod util;

pub use terminal::text_chart;
pub use types::{ChartOptions, DEFAULT_PALETTE, Rgb8};
pub use util::{format_grouped, map_locale};

use crate::models::Frame;
use crate::view::ViewModel;
use anyhow::{Context, Result, anyhow};
use log::info;

use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::coord::ranged1d::SegmentValue;
use plotters::prelude::*;
use plotters::style::FontFamily;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use plotters_bitmap::BitMapBackend;
use plotters_svg::SVGBackend;

use std::path::{Path, PathBuf};
use std::sync::Once;

use text::{label_area_px, truncate_to_width};
use util::{rgb_color, value_axis_max};

/// One-time registration for a fallback "sans-serif" font when using the `ab_glyph` text path.
/// Required because `ab_glyph` doesn't discover OS fonts.
static INIT_FONTS: Once = Once::new();

fn ensure_fonts_registered() {
    INIT_FONTS.call_once(|| {
        let _ = plotters::style::register_font(
            "sans-serif",
            plotters::style::FontStyle::Normal,
            include_bytes!("../../assets/DejaVuSans.ttf"),
        );
    });
}

const LABEL_FONT_PX: u32 = 14;
const MAX_LABEL_AREA_PX: u32 = 180;

/// Render one frame to `out_path`; SVG when the extension is `.svg`, PNG otherwise.
pub fn render_frame<P: AsRef<Path>>(frame: &Frame, opts: &ChartOptions, out_path: P) -> Result<()> {
    ensure_fonts_registered();
    let out_path = out_path.as_ref();
    let path_string = out_path.to_string_lossy().into_owned();
    let size = (opts.width.max(200), opts.height.max(200));

    if out_path.extension().and_then(|s| s.to_str()) == Some("svg") {
        let root = SVGBackend::new(path_string.as_str(), size).into_drawing_area();
        draw_frame(root, frame, opts)?;
    } else {
        let root = BitMapBackend::new(path_string.as_str(), size).into_drawing_area();
        draw_frame(root, frame, opts)?;
    }
    Ok(())
}

/// Render every step of one animation cycle into `dir` as
/// `frame_0000.<ext>`, `frame_0001.<ext>`, ...
///
/// The cursor is reset first and ends back at index 0.
pub fn render_cycle<P: AsRef<Path>>(
    vm: &mut ViewModel,
    opts: &ChartOptions,
    dir: P,
    ext: &str,
) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    vm.reset();
    let steps = vm.cycle_len();
    let mut written = Vec::with_capacity(steps);
    for step in 0..steps {
        let frame = vm.frame();
        let path = dir.join(format!("frame_{step:04}.{ext}"));
        render_frame(&frame, opts, &path)?;
        written.push(path);
        vm.tick();
    }
    info!("wrote {} frames to {}", written.len(), dir.display());
    Ok(written)
}

fn draw_frame<DB>(root: DrawingArea<DB, Shift>, frame: &Frame, opts: &ChartOptions) -> Result<()>
where
    DB: DrawingBackend,
{
    root.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;

    let rows = frame.bars.len().max(frame.categories.len()).max(1);
    let x_max = value_axis_max(frame.bars.iter().map(|b| b.value));

    let labels: Vec<String> = frame
        .categories
        .iter()
        .map(|c| truncate_to_width(c, LABEL_FONT_PX, MAX_LABEL_AREA_PX))
        .collect();
    let left_px = label_area_px(&labels, LABEL_FONT_PX, MAX_LABEL_AREA_PX);

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .caption(&opts.title, (FontFamily::SansSerif, 24))
        .set_label_area_size(LabelAreaPosition::Left, left_px)
        .set_label_area_size(LabelAreaPosition::Top, 36)
        .build_cartesian_2d(0f64..x_max, (0i32..rows as i32).into_segmented())
        .map_err(|e| anyhow!("{:?}", e))?;

    // Rank 0 is drawn at the top: segment `rows - 1 - rank`.
    let rank_of = |seg: i32| rows as i32 - 1 - seg;
    let y_label_fmt = |v: &SegmentValue<i32>| match v {
        SegmentValue::CenterOf(seg) | SegmentValue::Exact(seg) => usize::try_from(rank_of(*seg))
            .ok()
            .and_then(|rank| labels.get(rank).cloned())
            .unwrap_or_default(),
        SegmentValue::Last => String::new(),
    };
    let locale = opts.locale.as_str();
    let x_label_fmt = |v: &f64| format_grouped(v.round(), locale);

    chart
        .configure_mesh()
        .disable_y_mesh()
        .x_labels(8)
        .y_labels(rows)
        .x_label_formatter(&x_label_fmt)
        .y_label_formatter(&y_label_fmt)
        .label_style((FontFamily::SansSerif, LABEL_FONT_PX as i32))
        .draw()
        .map_err(|e| anyhow!("{:?}", e))?;

    let inset = (((1.0 - opts.bar_height.clamp(0.1, 1.0)) / 2.0)
        * (f64::from(opts.height) / rows as f64))
        .round() as u32;

    let bars = frame.bars.iter().enumerate().map(|(rank, bar)| {
        let seg = rows as i32 - 1 - rank as i32;
        let len = if bar.value.is_finite() { bar.value.max(0.0) } else { 0.0 };
        let mut rect = Rectangle::new(
            [(0.0, SegmentValue::Exact(seg)), (len, SegmentValue::Exact(seg + 1))],
            rgb_color(opts.color(rank)).filled(),
        );
        rect.set_margin(inset, inset, 0, 0);
        rect
    });
    chart
        .draw_series(bars)
        .map_err(|e| anyhow!("{:?}", e))?;

    let value_style = TextStyle::from((FontFamily::SansSerif, 13))
        .color(&BLACK)
        .pos(Pos::new(HPos::Left, VPos::Center));
    let value_labels = frame.bars.iter().enumerate().map(|(rank, bar)| {
        let seg = rows as i32 - 1 - rank as i32;
        let x = if bar.value.is_finite() { bar.value.max(0.0) } else { 0.0 };
        Text::new(
            format!(" {}", format_grouped(bar.value, locale)),
            (x, SegmentValue::CenterOf(seg)),
            value_style.clone(),
        )
    });
    chart
        .draw_series(value_labels)
        .map_err(|e| anyhow!("{:?}", e))?;

    draw_overlay(&root, frame, opts)?;

    root.present().map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}

/// Big translucent year label and the total, anchored lower right.
fn draw_overlay<DB>(root: &DrawingArea<DB, Shift>, frame: &Frame, opts: &ChartOptions) -> Result<()>
where
    DB: DrawingBackend,
{
    let (w, h) = root.dim_in_pixel();
    let right = (f64::from(w) * 0.95) as i32;
    let year_y = (f64::from(h) * 0.80) as i32;
    let total_y = (f64::from(h) * 0.85) as i32;
    let grey = BLACK.mix(0.5);

    let year_style = TextStyle::from((FontFamily::SansSerif, 56))
        .color(&grey)
        .pos(Pos::new(HPos::Right, VPos::Bottom));
    root.draw(&Text::new(frame.year_label.clone(), (right, year_y), year_style))
        .map_err(|e| anyhow!("{:?}", e))?;

    let total_style = TextStyle::from((FontFamily::SansSerif, 24))
        .color(&grey)
        .pos(Pos::new(HPos::Right, VPos::Top));
    root.draw(&Text::new(
        format!("Total: {}", frame.total_text),
        (right, total_y),
        total_style,
    ))
    .map_err(|e| anyhow!("{:?}", e))?;

    if !opts.subtitle.is_empty() {
        let sub_style = TextStyle::from((FontFamily::SansSerif, 13))
            .color(&grey)
            .pos(Pos::new(HPos::Left, VPos::Top));
        root.draw(&Text::new(opts.subtitle.clone(), (20, 48), sub_style))
            .map_err(|e| anyhow!("{:?}", e))?;
    }
    Ok(())
}
