//! # ganttoml-render
//!
//! PNG Gantt chart rendering for ganttoml.
//!
//! `GanttChart` bundles the chart configuration and the `plot()` operation:
//! load records from `<source>.toml`, derive the table, draw two bar layers
//! per task (full duration as a faded track, completed portion solid over
//! it), annotate completion percentages, and lay out date-labeled x ticks.
//! With an output name configured the figure is written as a PNG; without
//! one it is rasterized into an in-memory buffer only.
//!
//! ## Example
//!
//! ```rust,ignore
//! use ganttoml_render::GanttChart;
//!
//! GanttChart::new("gantt")
//!     .output_dir("Images")
//!     .output_name("Gantt")
//!     .plot()?;
//! ```

pub mod textsafe;

pub use textsafe::TextSafeBackend;

use ganttoml_core::{load_records, LoadError, Rgba, Table, TableError};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::RGBAColor;
use std::path::PathBuf;
use thiserror::Error;

/// Pixels per figure-size unit when rasterizing. The default (20, 5)
/// figure becomes a 1280x320 bitmap.
const PIXELS_PER_UNIT: f64 = 64.0;

/// Bars occupy 0.8 of a lane, centered on the lane index.
const BAR_HALF_HEIGHT: f64 = 0.4;

/// Chart rendering error
#[derive(Debug, Error)]
pub enum ChartError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error("cannot create output directory {}: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("drawing failed: {0}")]
    Draw(String),
}

fn draw_error(err: impl std::fmt::Display) -> ChartError {
    ChartError::Draw(err.to_string())
}

/// Gantt chart configuration and entry point.
///
/// All settings default to the historical behavior: sort by start date,
/// ten x ticks, a 20x5-unit figure, and no output file.
#[derive(Clone, Debug)]
pub struct GanttChart {
    source: String,
    output_dir: Option<PathBuf>,
    output_name: Option<String>,
    sort_by_start: bool,
    x_tick_count: usize,
    figure_size: (f64, f64),
}

impl GanttChart {
    /// Create a chart reading from `<source>.toml`. `source` may carry a
    /// directory prefix; the extension is appended.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            output_dir: None,
            output_name: None,
            sort_by_start: true,
            x_tick_count: 10,
            figure_size: (20.0, 5.0),
        }
    }

    /// Directory the PNG is written into. Created recursively on plot when
    /// an output name is also set; ignored otherwise.
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Output file base name (`.png` is appended). Without one, nothing is
    /// written to disk.
    pub fn output_name(mut self, name: impl Into<String>) -> Self {
        self.output_name = Some(name.into());
        self
    }

    /// Sort rows ascending by start date before deriving (default true).
    pub fn sort_by_start(mut self, sort: bool) -> Self {
        self.sort_by_start = sort;
        self
    }

    /// Number of x-axis ticks (default 10).
    pub fn x_tick_count(mut self, count: usize) -> Self {
        self.x_tick_count = count;
        self
    }

    /// Figure dimensions in chart units (default 20x5).
    pub fn figure_size(mut self, width: f64, height: f64) -> Self {
        self.figure_size = (width, height);
        self
    }

    /// Path of the source TOML file.
    pub fn source_path(&self) -> PathBuf {
        PathBuf::from(format!("{}.toml", self.source))
    }

    /// Bitmap dimensions in pixels.
    pub fn pixel_size(&self) -> (u32, u32) {
        let (width, height) = self.figure_size;
        (
            (width * PIXELS_PER_UNIT).round().max(1.0) as u32,
            (height * PIXELS_PER_UNIT).round().max(1.0) as u32,
        )
    }

    /// Load, derive, draw, and (when configured) save the chart.
    pub fn plot(&self) -> Result<(), ChartError> {
        let records = load_records(&self.source_path())?;
        let table = Table::build(
            records.into_iter().map(|(_, record)| record).collect(),
            self.sort_by_start,
        )?;

        // The title shows the output name even when nothing is saved; with
        // no name configured it renders the literal placeholder `false`,
        // preserved from the original tool.
        let title = self.output_name.as_deref().unwrap_or("false").to_string();
        let (width, height) = self.pixel_size();

        match self.resolve_output()? {
            Some(path) => {
                let backend = TextSafeBackend::new(BitMapBackend::new(&path, (width, height)));
                draw_gantt(
                    backend.into_drawing_area(),
                    &table,
                    &title,
                    self.x_tick_count,
                )?;
            }
            None => {
                let mut buffer = vec![0u8; width as usize * height as usize * 3];
                let backend = TextSafeBackend::new(BitMapBackend::with_buffer(
                    &mut buffer,
                    (width, height),
                ));
                draw_gantt(
                    backend.into_drawing_area(),
                    &table,
                    &title,
                    self.x_tick_count,
                )?;
            }
        }

        Ok(())
    }

    /// Where the PNG will land, if an output name is configured. Purely
    /// computed; `plot()` is what creates the directory.
    pub fn output_path(&self) -> Option<PathBuf> {
        self.output_name.as_ref().map(|name| {
            let file = format!("{name}.png");
            match &self.output_dir {
                Some(dir) => dir.join(file),
                None => PathBuf::from(file),
            }
        })
    }

    /// Resolve the output path, creating the directory if needed. `None`
    /// when no output name is configured; a directory alone writes nothing.
    fn resolve_output(&self) -> Result<Option<PathBuf>, ChartError> {
        let Some(path) = self.output_path() else {
            return Ok(None);
        };
        if let Some(dir) = &self.output_dir {
            std::fs::create_dir_all(dir).map_err(|source| ChartError::OutputDir {
                path: dir.clone(),
                source,
            })?;
        }
        Ok(Some(path))
    }
}

fn bar_color(color: Rgba, alpha: f64) -> RGBAColor {
    RGBAColor(
        (color.r * 255.0).round() as u8,
        (color.g * 255.0).round() as u8,
        (color.b * 255.0).round() as u8,
        alpha,
    )
}

/// Draw the chart onto any backend: file-backed and in-memory rendering
/// share this routine.
fn draw_gantt<DB>(
    root: DrawingArea<DB, Shift>,
    table: &Table,
    title: &str,
    x_tick_count: usize,
) -> Result<(), ChartError>
where
    DB: DrawingBackend,
{
    root.fill(&WHITE).map_err(draw_error)?;
    let root = root.titled(title, ("sans-serif", 28)).map_err(draw_error)?;

    let max_end = table.max_end_num().max(1) as f64;
    let max_duration = table.max_duration() as f64;
    let lanes = table.lane_count() as f64;

    // Data coordinates carry the margins: negative x is the task label
    // column, negative y the tick band below the axis.
    let mut chart = ChartBuilder::on(&root)
        .margin(12)
        .build_cartesian_2d(-max_end * 0.22..max_end * 1.1, -1.8..lanes - 0.1)
        .map_err(draw_error)?;

    let percent_style = ("sans-serif", 15)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Left, VPos::Center));
    let task_style = ("sans-serif", 15)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Right, VPos::Center));

    let mut labeled_lanes = vec![false; table.lane_count()];
    for row in &table.rows {
        let y = row.uid as f64;
        let x0 = row.start_num as f64;

        // Layer A: full-duration track, faded.
        chart
            .draw_series(std::iter::once(Rectangle::new(
                [
                    (x0, y - BAR_HALF_HEIGHT),
                    (x0 + row.start_end as f64, y + BAR_HALF_HEIGHT),
                ],
                bar_color(row.color, 0.5).filled(),
            )))
            .map_err(draw_error)?;

        // Layer B: completed portion, at the color's own alpha.
        chart
            .draw_series(std::iter::once(Rectangle::new(
                [
                    (x0, y - BAR_HALF_HEIGHT),
                    (x0 + row.current_num, y + BAR_HALF_HEIGHT),
                ],
                bar_color(row.color, row.color.a).filled(),
            )))
            .map_err(draw_error)?;

        chart
            .draw_series(std::iter::once(Text::new(
                format!("{}%", row.complete),
                (row.end_num as f64 + max_duration * 0.01, y),
                percent_style.clone(),
            )))
            .map_err(draw_error)?;

        if !labeled_lanes[row.uid] {
            labeled_lanes[row.uid] = true;
            chart
                .draw_series(std::iter::once(Text::new(
                    row.task.clone(),
                    (-max_end * 0.015, y),
                    task_style.clone(),
                )))
                .map_err(draw_error)?;
        }
    }

    let axis_y = -0.55;
    chart
        .draw_series(std::iter::once(PathElement::new(
            vec![(0.0, axis_y), (max_end, axis_y)],
            BLACK.stroke_width(1),
        )))
        .map_err(draw_error)?;

    let tick_style = ("sans-serif", 13)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Top));
    for tick in table.tick_marks(x_tick_count) {
        chart
            .draw_series(std::iter::once(PathElement::new(
                vec![(tick.offset, axis_y), (tick.offset, axis_y - 0.15)],
                BLACK.stroke_width(1),
            )))
            .map_err(draw_error)?;
        chart
            .draw_series(std::iter::once(Text::new(
                tick.date.format("%Y-%m-%d").to_string(),
                (tick.offset, axis_y - 0.3),
                tick_style.clone(),
            )))
            .map_err(draw_error)?;
    }

    root.present().map_err(draw_error)?;
    Ok(())
}
