//! Stereoscopic rendering of classified point sets.
//!
//! This module renders two 3D scatter panels of the same data, a few degrees
//! apart in azimuth, side by side into one image using the plotters library.
//! Cross your eyes to see depth.

pub mod projection;
pub mod scene;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::{debug, info};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters_bitmap::BitMapBackend;
use thiserror::Error;

use crate::config::RenderConfig;
use crate::core::loaders::PointSet;
use crate::core::writers::{ensure_dir, WriteError};
use crate::processors::classification::{classify, GroupMasks};
use crate::processors::frames::AzimuthRange;

pub use scene::{build_panel_scene, draw_panel_scene, group_style, GroupStyle, PanelScene};

/// Errors that can occur during visualization.
#[derive(Error, Debug)]
pub enum VisualizationError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Plotting error: {0}")]
    PlottingError(String),

    #[error("unsupported output format '{0}': must be 'png' (recommended) or 'svg' (slow to save)")]
    UnsupportedFormat(String),

    #[error(transparent)]
    Write(#[from] WriteError),
}

/// Result type for visualization operations.
pub type Result<T> = std::result::Result<T, VisualizationError>;

/// Left and right margin of the figure as a share of its width.
const SIDE_MARGIN: f64 = 0.02;

/// Gap between the panels as a share of the panel width.
const PANEL_GAP: f64 = 0.05;

/// Output file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Raster image at the configured pixel size
    #[default]
    Png,
    /// Vector document; one element per marker, so large and slow
    Svg,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Svg => "svg",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = VisualizationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "svg" => Ok(OutputFormat::Svg),
            _ => Err(VisualizationError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// File name of the stereo pair rendered at `azimuth`.
///
/// ```
/// use wise_stereo::visualization::{frame_filename, OutputFormat};
///
/// assert_eq!(
///     frame_filename(-18.0, OutputFormat::Png),
///     "3D_color_stereoscopic_az-018.00.png"
/// );
/// ```
pub fn frame_filename(azimuth: f64, format: OutputFormat) -> String {
    format!("3D_color_stereoscopic_az{:07.2}.{}", azimuth, format.extension())
}

/// One eye view: panel position (1 = left) and camera azimuth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelView {
    pub index: usize,
    pub azimuth: f64,
}

impl PanelView {
    /// Caption drawn under the panel.
    pub fn caption(&self) -> String {
        format!("panel {}, azimuth = {:.2}", self.index, self.azimuth)
    }
}

/// The two views of a crossed-eye stereo pair.
///
/// The left panel is seen by the right eye and uses the requested azimuth;
/// the right panel is rotated by `-separation`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StereoPair {
    pub left: PanelView,
    pub right: PanelView,
}

impl StereoPair {
    pub fn new(azimuth: f64, separation: f64) -> Self {
        Self {
            left: PanelView { index: 1, azimuth },
            right: PanelView {
                index: 2,
                azimuth: azimuth - separation,
            },
        }
    }

    pub fn panels(&self) -> [PanelView; 2] {
        [self.left, self.right]
    }
}

/// A loaded point set together with the settings to render it.
#[derive(Debug, Clone)]
pub struct StereoFigure {
    points: PointSet,
    config: RenderConfig,
}

impl StereoFigure {
    pub fn new(points: PointSet, config: RenderConfig) -> Self {
        Self { points, config }
    }

    pub fn points(&self) -> &PointSet {
        &self.points
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn stereo_pair(&self, azimuth: f64) -> StereoPair {
        StereoPair::new(azimuth, self.config.stereo_separation)
    }

    /// Pixel size of one panel.
    pub fn panel_size(&self) -> (u32, u32) {
        let (width, height) = (self.config.width_px, self.config.height_px);
        let usable = width as f64 * (1.0 - 2.0 * SIDE_MARGIN);
        let panel_w = (usable / (2.0 + PANEL_GAP)).floor().max(1.0) as u32;
        (panel_w, height.saturating_sub(self.title_height()).max(1))
    }

    fn title_height(&self) -> u32 {
        if !self.config.draw_labels || self.config.title.is_empty() {
            return 0;
        }
        let line = self.config.points_to_px(self.config.font_size + 2.0) * 1.3;
        (line * self.config.title.len() as f64 + line * 0.5).round() as u32
    }

    /// Build both panel scenes of the stereo pair at `azimuth`.
    ///
    /// The groups are classified once and shared by the two panels.
    pub fn build_scenes(&self, azimuth: f64) -> (GroupMasks, [PanelScene; 2]) {
        let masks = classify(&self.points);
        let (w, h) = self.panel_size();
        let pair = self.stereo_pair(azimuth);
        let scenes = pair
            .panels()
            .map(|view| build_panel_scene(&self.points, &masks, &self.config, view, w, h));
        (masks, scenes)
    }

    /// Render the stereo pair at `azimuth` into `out_dir`.
    ///
    /// Returns the path of the written file.
    pub fn render_stereo_pair(
        &self,
        azimuth: f64,
        format: OutputFormat,
        out_dir: &Path,
    ) -> Result<PathBuf> {
        let path = out_dir.join(frame_filename(azimuth, format));
        info!("Generating plot {}", path.display());

        ensure_dir(out_dir)?;
        let (_, scenes) = self.build_scenes(azimuth);
        let size = (self.config.width_px, self.config.height_px);

        // The drawing surface lives only for this arm and is released once
        // the file is written.
        match format {
            OutputFormat::Png => {
                let root = BitMapBackend::new(&path, size).into_drawing_area();
                self.draw_figure(&root, &scenes)?;
                root.present()
                    .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;
            }
            OutputFormat::Svg => {
                let root = SVGBackend::new(&path, size).into_drawing_area();
                self.draw_figure(&root, &scenes)?;
                root.present()
                    .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;
            }
        }

        debug!("Wrote {}", path.display());
        Ok(path)
    }

    /// Like [`render_stereo_pair`](Self::render_stereo_pair), with the format
    /// given by name. Unknown formats fail before anything is created.
    pub fn render_stereo_pair_str(
        &self,
        azimuth: f64,
        format: &str,
        out_dir: &Path,
    ) -> Result<PathBuf> {
        let format: OutputFormat = format.parse()?;
        self.render_stereo_pair(azimuth, format, out_dir)
    }

    /// Render one stereo pair per azimuth of `range`.
    ///
    /// `on_frame` is called with the 1-based frame number, the total and the
    /// written path after every frame. The first failing frame stops the run.
    pub fn make_movie_frames<F>(
        &self,
        range: AzimuthRange,
        format: OutputFormat,
        out_dir: &Path,
        mut on_frame: F,
    ) -> Result<Vec<PathBuf>>
    where
        F: FnMut(usize, usize, &Path),
    {
        let frames = range.sequence();
        let total = frames.len();
        let mut written = Vec::new();

        for (j, azimuth) in frames.enumerate() {
            info!("Generating frame file {} of {}", j + 1, total);
            let path = self.render_stereo_pair(azimuth, format, out_dir)?;
            on_frame(j + 1, total, &path);
            written.push(path);
        }

        Ok(written)
    }

    fn draw_figure<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
        scenes: &[PanelScene; 2],
    ) -> Result<()> {
        root.fill(&WHITE)
            .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

        let (width, _) = root.dim_in_pixel();
        let title_h = self.title_height();

        if title_h > 0 {
            let size_px = self.config.points_to_px(self.config.font_size + 2.0);
            let line = size_px * 1.3;
            let style = ("sans-serif", size_px)
                .into_font()
                .color(&BLACK)
                .pos(Pos::new(HPos::Center, VPos::Center));
            for (k, text) in self.config.title.iter().enumerate() {
                let y = (line * (k as f64 + 0.75)).round() as i32;
                root.draw(&Text::new(text.clone(), ((width / 2) as i32, y), style.clone()))
                    .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;
            }
        }

        let side = (width as f64 * SIDE_MARGIN).round() as u32;
        let (panel_w, _) = self.panel_size();
        let gap = (panel_w as f64 * PANEL_GAP).round() as u32;

        let body = root.margin(title_h, 0, side, side);
        let (left, rest) = body.split_horizontally(panel_w);
        let right = rest.margin(0, 0, gap, 0);

        draw_panel_scene(&left, &scenes[0])?;
        draw_panel_scene(&right, &scenes[1])?;

        Ok(())
    }
}
