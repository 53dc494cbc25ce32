use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

use popbars::loader::{self, LoadOptions, Source};
use popbars::viz::{self, ChartOptions};
use popbars::{Ticker, ViewModel, WrapRule, stats, storage};

#[derive(Parser, Debug)]
#[command(
    name = "popbars",
    version,
    about = "Animated population bar chart from a spreadsheet"
)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Spreadsheet to load: a path or an http(s) URL (CSV, XLSX, XLS, ODS).
    #[arg(short, long, global = true, default_value = "assets/data.csv")]
    source: String,
    /// Keep a leading header row (year column "Year") in the data instead of dropping it.
    #[arg(long, global = true, default_value_t = false)]
    keep_header: bool,
    /// Number-format locale (en, de, fr, es, it, pt, nl).
    #[arg(long, global = true)]
    locale: Option<String>,
    /// When the animation wraps back to the first year.
    #[arg(long, global = true, value_enum)]
    wrap: Option<WrapArg>,
    /// JSON file with chart options.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print year labels, axis categories and per-year statistics.
    Summary,
    /// Print the chart for one year index as text.
    Show(ShowArgs),
    /// Render the chart for one year index to an image (.svg or .png) or frame data (.json).
    Render(RenderArgs),
    /// Render one full animation cycle as numbered images.
    Frames(FramesArgs),
    /// Export the top bars of every year (format inferred by --format or extension).
    Export(ExportArgs),
    /// Play the animation in the terminal.
    Play(PlayArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum WrapArg {
    /// Wrap once the index passes the year count (visits two empty frames).
    AfterCount,
    /// Wrap right after the last year.
    AtCount,
}

impl From<WrapArg> for WrapRule {
    fn from(w: WrapArg) -> Self {
        match w {
            WrapArg::AfterCount => WrapRule::AfterCount,
            WrapArg::AtCount => WrapRule::AtCount,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ImageFormat {
    Svg,
    Png,
}

#[derive(ValueEnum, Clone, Debug)]
enum OutFormat {
    Csv,
    Json,
}

#[derive(Args, Debug)]
struct ShowArgs {
    /// Year index (0 = first group).
    #[arg(short, long, default_value_t = 0)]
    index: usize,
    /// Width of the bar area in columns.
    #[arg(long, default_value_t = 50)]
    columns: usize,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[arg(short, long, default_value_t = 0)]
    index: usize,
    /// Output file: .svg or .png image, or .json with the frame data.
    #[arg(long)]
    out: PathBuf,
    #[arg(long)]
    width: Option<u32>,
    #[arg(long)]
    height: Option<u32>,
}

#[derive(Args, Debug)]
struct FramesArgs {
    #[arg(long)]
    out_dir: PathBuf,
    #[arg(long, value_enum, default_value = "svg")]
    format: ImageFormat,
    #[arg(long)]
    width: Option<u32>,
    #[arg(long)]
    height: Option<u32>,
}

#[derive(Args, Debug)]
struct ExportArgs {
    #[arg(long)]
    out: PathBuf,
    #[arg(long, value_enum)]
    format: Option<OutFormat>,
}

#[derive(Args, Debug)]
struct PlayArgs {
    /// Stop after this many ticks (default: run until interrupted).
    #[arg(long)]
    ticks: Option<usize>,
    /// Tick interval in milliseconds (default from config, 1000).
    #[arg(long)]
    interval_ms: Option<u64>,
    #[arg(long, default_value_t = 50)]
    columns: usize,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let opts = chart_options(&cli.common)?;
    let load_opts = LoadOptions {
        skip_header: !cli.common.keep_header,
    };
    // Load failures are logged and degrade to an empty chart.
    let rows = loader::load_or_empty(&Source::parse(&cli.common.source), &load_opts);
    let mut vm = ViewModel::with_rows(rows, opts.wrap, &opts.locale);

    match cli.cmd {
        Command::Summary => cmd_summary(&mut vm),
        Command::Show(args) => cmd_show(&mut vm, &opts, args),
        Command::Render(args) => cmd_render(&mut vm, opts, args),
        Command::Frames(args) => cmd_frames(&mut vm, opts, args),
        Command::Export(args) => cmd_export(&mut vm, args),
        Command::Play(args) => cmd_play(&mut vm, &opts, args),
    }
}

/// Defaults, then the JSON config, then command-line flags.
fn chart_options(common: &CommonArgs) -> Result<ChartOptions> {
    let mut opts = match &common.config {
        Some(path) => ChartOptions::from_json_file(path)?,
        None => ChartOptions::default(),
    };
    if let Some(locale) = &common.locale {
        opts.locale = locale.clone();
    }
    if let Some(wrap) = common.wrap {
        opts.wrap = wrap.into();
    }
    Ok(opts)
}

fn fmt_opt(v: Option<f64>) -> String {
    match v {
        Some(x) if x.is_finite() => {
            // Format up to 4 decimals, then trim trailing zeros and trailing dot.
            let s = format!("{:.4}", x);
            s.trim_end_matches('0').trim_end_matches('.').to_string()
        }
        _ => "NA".to_string(),
    }
}

fn cmd_summary(vm: &mut ViewModel) -> Result<()> {
    let groups = vm.groups();
    let labels = vm.year_labels();
    println!("rows={} groups={} years={}", vm.rows().len(), groups.len(), labels.len());
    println!("years: {}", labels.join(", "));
    println!("categories: {}", popbars::view::categories(&groups).join(", "));
    for s in stats::year_summaries(&groups) {
        println!(
            "{}  count={} missing={}  min={} max={} mean={} median={}",
            s.year,
            s.count,
            s.missing,
            fmt_opt(s.min),
            fmt_opt(s.max),
            fmt_opt(s.mean),
            fmt_opt(s.median)
        );
    }
    Ok(())
}

fn seek(vm: &mut ViewModel, index: usize) -> Result<()> {
    let steps = vm.cycle_len();
    if index >= steps {
        bail!("index {} is outside the animation cycle (0..{})", index, steps);
    }
    vm.reset();
    while vm.index() != index {
        vm.tick();
    }
    Ok(())
}

fn cmd_show(vm: &mut ViewModel, opts: &ChartOptions, args: ShowArgs) -> Result<()> {
    seek(vm, args.index)?;
    print!("{}", viz::text_chart(&vm.frame(), opts, args.columns));
    Ok(())
}

fn cmd_render(vm: &mut ViewModel, mut opts: ChartOptions, args: RenderArgs) -> Result<()> {
    opts.width = args.width.unwrap_or(opts.width);
    opts.height = args.height.unwrap_or(opts.height);
    seek(vm, args.index)?;
    let frame = vm.frame();
    if args.out.extension().and_then(|e| e.to_str()) == Some("json") {
        storage::save_frame_json(&frame, &args.out)?;
    } else {
        viz::render_frame(&frame, &opts, &args.out)
            .with_context(|| format!("rendering {}", args.out.display()))?;
    }
    eprintln!("Wrote chart to {}", args.out.display());
    Ok(())
}

fn cmd_frames(vm: &mut ViewModel, mut opts: ChartOptions, args: FramesArgs) -> Result<()> {
    opts.width = args.width.unwrap_or(opts.width);
    opts.height = args.height.unwrap_or(opts.height);
    let ext = match args.format {
        ImageFormat::Svg => "svg",
        ImageFormat::Png => "png",
    };
    let written = viz::render_cycle(vm, &opts, &args.out_dir, ext)?;
    eprintln!("Wrote {} frames to {}", written.len(), args.out_dir.display());
    Ok(())
}

fn cmd_export(vm: &mut ViewModel, args: ExportArgs) -> Result<()> {
    let values = storage::ranked_values(&vm.groups());
    let fmt = match args.format {
        Some(OutFormat::Csv) => "csv",
        Some(OutFormat::Json) => "json",
        None => args.out.extension().and_then(|e| e.to_str()).unwrap_or("csv"),
    }
    .to_ascii_lowercase();
    match fmt.as_str() {
        "csv" => storage::save_csv(&values, &args.out)?,
        "json" => storage::save_json(&values, &args.out)?,
        other => bail!("unsupported format: {}", other),
    }
    eprintln!("Saved {} rows to {}", values.len(), args.out.display());
    Ok(())
}

fn cmd_play(vm: &mut ViewModel, opts: &ChartOptions, args: PlayArgs) -> Result<()> {
    let interval = Duration::from_millis(args.interval_ms.unwrap_or(opts.interval_ms).max(1));
    print!("{}", viz::text_chart(&vm.frame(), opts, args.columns));
    if args.ticks == Some(0) {
        return Ok(());
    }

    let (ticker, ticks) = Ticker::channel(interval);
    for (n, ()) in ticks.iter().enumerate() {
        vm.tick();
        println!();
        print!("{}", viz::text_chart(&vm.frame(), opts, args.columns));
        if args.ticks.is_some_and(|limit| n + 1 >= limit) {
            break;
        }
    }
    drop(ticker);
    Ok(())
}
