//! popbars
//!
//! A small Rust library for turning a population-by-country spreadsheet into
//! an animated horizontal bar chart. Pairs with the `popbars` CLI and the
//! `popbars-gui` viewer.
//!
//! ### Features
//! - Load CSV/XLSX/XLS/ODS assets from disk or over HTTP(S)
//! - Group rows by year and rank the top 12 countries per year
//! - Drive the displayed year with a 1 s repeating timer
//! - Render frames as SVG/PNG bar charts or as terminal text
//! - Per-year summary statistics and CSV/JSON export
//!
//! ### Example
//! ```no_run
//! use popbars::loader::{self, LoadOptions, Source};
//! use popbars::{ViewModel, WrapRule, viz};
//!
//! let rows = loader::load_or_empty(&Source::parse("assets/data.csv"), &LoadOptions::default());
//! let mut vm = ViewModel::with_rows(rows, WrapRule::AfterCount, "en");
//! let frame = vm.frame();
//! viz::render_frame(&frame, &viz::ChartOptions::default(), "year0.svg")?;
//! vm.tick();
//! println!("{}", vm.frame().year_label);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod animation;
pub mod loader;
pub mod models;
pub mod stats;
pub mod storage;
pub mod view;
pub mod viz;

pub use animation::{Ticker, WrapRule, YearCursor};
pub use models::{Bar, Cell, Frame, RawRow, YearGroup};
pub use view::ViewModel;
