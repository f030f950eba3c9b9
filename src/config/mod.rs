//! Configuration types for the stereoscopic renderer.
//!
//! [`PlotConfig`] is the serde-facing file format. [`RenderConfig`] is the
//! immutable value derived from it once per stereo pair and threaded through
//! the renderer.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Figure size and text settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FigureConfig {
    /// Width of the output image in pixels
    #[serde(default = "default_width_px")]
    pub width_px: u32,

    /// Pixels per inch used to derive the size unit
    #[serde(default = "default_dpi")]
    pub dpi: f64,

    /// Width / height ratio of the output image
    #[serde(default = "default_aspect")]
    pub aspect: f64,

    /// Figure title, one entry per line
    #[serde(default = "default_title")]
    pub title: Vec<String>,

    /// Draw title, tick labels and axis labels (needs system fonts)
    #[serde(default = "default_true")]
    pub draw_labels: bool,
}

fn default_width_px() -> u32 {
    1280
}

fn default_dpi() -> f64 {
    100.0
}

fn default_aspect() -> f64 {
    16.0 / 9.0
}

fn default_title() -> Vec<String> {
    vec![
        "Clustering of astronomical objects in WISE 3D color space".to_string(),
        "(cross your eyes for stereoscopic view)".to_string(),
    ]
}

fn default_true() -> bool {
    true
}

impl Default for FigureConfig {
    fn default() -> Self {
        Self {
            width_px: default_width_px(),
            dpi: default_dpi(),
            aspect: default_aspect(),
            title: default_title(),
            draw_labels: true,
        }
    }
}

/// Camera parameters shared by both eyes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Elevation angle in degrees
    #[serde(default = "default_elevation")]
    pub elevation: f64,

    /// Azimuth difference between the two panels in degrees
    #[serde(default = "default_stereo_separation")]
    pub stereo_separation: f64,

    /// Azimuth used when none is given on the command line
    #[serde(default = "default_azimuth")]
    pub default_azimuth: f64,
}

fn default_elevation() -> f64 {
    18.0
}

fn default_stereo_separation() -> f64 {
    5.0
}

fn default_azimuth() -> f64 {
    -18.0
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            elevation: default_elevation(),
            stereo_separation: default_stereo_separation(),
            default_azimuth: default_azimuth(),
        }
    }
}

/// One of the three spatial axes of the plotting cube.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Position of this axis in an `[x, y, z]` triple.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// Cosmetic and range settings for a single axis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AxisSpec {
    pub label: String,

    /// Lower data limit
    #[serde(default = "default_lo")]
    pub lo: f64,

    /// Upper data limit
    #[serde(default = "default_hi")]
    pub hi: f64,

    #[serde(default = "default_ticks")]
    pub ticks: Vec<f64>,

    /// Draw the axis high-to-low
    #[serde(default)]
    pub reversed: bool,
}

fn default_lo() -> f64 {
    -0.5
}

fn default_hi() -> f64 {
    4.0
}

fn default_ticks() -> Vec<f64> {
    vec![0.0, 1.0, 2.0, 3.0, 4.0]
}

impl AxisSpec {
    fn with_label(label: &str, reversed: bool) -> Self {
        Self {
            label: label.to_string(),
            lo: default_lo(),
            hi: default_hi(),
            ticks: default_ticks(),
            reversed,
        }
    }

    /// Map a data value onto `[-1, 1]`, honouring `reversed`.
    ///
    /// Values outside the limits map outside the interval; nothing is clamped.
    pub fn normalize(&self, value: f64) -> f64 {
        let span = self.hi - self.lo;
        let mut t = if span.abs() < f64::EPSILON {
            0.5
        } else {
            (value - self.lo) / span
        };
        if self.reversed {
            t = 1.0 - t;
        }
        2.0 * t - 1.0
    }
}

/// The three axes, addressed through [`Axis`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AxesConfig {
    #[serde(default = "default_x_axis")]
    pub x: AxisSpec,
    #[serde(default = "default_y_axis")]
    pub y: AxisSpec,
    #[serde(default = "default_z_axis")]
    pub z: AxisSpec,
}

fn default_x_axis() -> AxisSpec {
    AxisSpec::with_label("W1 - W2 (mag)", true)
}

fn default_y_axis() -> AxisSpec {
    AxisSpec::with_label("W2 - W3 (mag)", false)
}

fn default_z_axis() -> AxisSpec {
    AxisSpec::with_label("W3 - W4 (mag)", false)
}

impl Default for AxesConfig {
    fn default() -> Self {
        Self {
            x: default_x_axis(),
            y: default_y_axis(),
            z: default_z_axis(),
        }
    }
}

impl AxesConfig {
    pub fn get(&self, axis: Axis) -> &AxisSpec {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Z => &self.z,
        }
    }

    /// Normalize a data point into the `[-1, 1]^3` plotting cube.
    pub fn normalize(&self, point: [f64; 3]) -> [f64; 3] {
        let mut out = [0.0; 3];
        for axis in Axis::ALL {
            out[axis.index()] = self.get(axis).normalize(point[axis.index()]);
        }
        out
    }
}

/// Input and output locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Point set archive (`.npz`) or table (`.csv`)
    #[serde(default = "default_input")]
    pub input: PathBuf,

    /// Directory receiving rendered images
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_input() -> PathBuf {
    PathBuf::from("data.npz")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            input: default_input(),
            output_dir: default_output_dir(),
        }
    }
}

/// Top-level configuration combining all sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlotConfig {
    #[serde(default)]
    pub figure: FigureConfig,

    #[serde(default)]
    pub camera: CameraConfig,

    #[serde(default)]
    pub axes: AxesConfig,

    #[serde(default)]
    pub data: DataConfig,
}

impl PlotConfig {
    /// Load configuration from a YAML file.
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: PlotConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a YAML file.
    pub fn to_yaml<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Derive the immutable render settings for one invocation.
    pub fn render_config(&self) -> RenderConfig {
        RenderConfig::new(&self.figure, &self.camera, &self.axes)
    }
}

/// Immutable settings consumed by the renderer.
///
/// Marker and font sizes are proportional to `unit`, which is proportional
/// to the requested pixel width for a fixed aspect ratio.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    pub width_px: u32,
    pub height_px: u32,
    pub dpi: f64,
    /// Figure height in inches
    pub unit: f64,
    /// Base marker size in points squared
    pub marker_size: f64,
    /// Base font size in points
    pub font_size: f64,
    pub title: Vec<String>,
    pub draw_labels: bool,
    pub elevation: f64,
    pub stereo_separation: f64,
    pub axes: AxesConfig,
}

impl RenderConfig {
    pub fn new(figure: &FigureConfig, camera: &CameraConfig, axes: &AxesConfig) -> Self {
        let aspect = if figure.aspect > 0.0 { figure.aspect } else { default_aspect() };
        let dpi = if figure.dpi > 0.0 { figure.dpi } else { default_dpi() };

        let width_in = figure.width_px as f64 / dpi;
        let unit = width_in / aspect;
        let height_px = (figure.width_px as f64 / aspect).round().max(1.0) as u32;

        Self {
            width_px: figure.width_px.max(1),
            height_px,
            dpi,
            unit,
            marker_size: unit / 2.5,
            font_size: 2.0 * unit,
            title: figure.title.clone(),
            draw_labels: figure.draw_labels,
            elevation: camera.elevation,
            stereo_separation: camera.stereo_separation,
            axes: axes.clone(),
        }
    }

    /// Convert a size in points to pixels at this configuration's dpi.
    #[inline]
    pub fn points_to_px(&self, points: f64) -> f64 {
        points * self.dpi / 72.0
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        PlotConfig::default().render_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_plot_config() {
        let config = PlotConfig::default();
        assert_eq!(config.figure.width_px, 1280);
        assert_eq!(config.camera.elevation, 18.0);
        assert_eq!(config.camera.stereo_separation, 5.0);
        assert_eq!(config.data.input, PathBuf::from("data.npz"));
        assert!(config.axes.x.reversed);
        assert!(!config.axes.y.reversed);
    }

    #[test]
    fn test_render_config_derived_sizes() {
        let render = RenderConfig::default();
        assert_eq!(render.height_px, 720);
        assert!((render.unit - 7.2).abs() < 1e-9);
        assert!((render.marker_size - 2.88).abs() < 1e-9);
        assert!((render.font_size - 14.4).abs() < 1e-9);
    }

    #[test]
    fn test_sizes_scale_linearly_with_width() {
        let mut figure = FigureConfig::default();
        let camera = CameraConfig::default();
        let axes = AxesConfig::default();

        figure.width_px = 960;
        let base = RenderConfig::new(&figure, &camera, &axes);
        for factor in [2u32, 3, 4] {
            figure.width_px = 960 * factor;
            let scaled = RenderConfig::new(&figure, &camera, &axes);
            let f = factor as f64;
            assert!((scaled.marker_size - f * base.marker_size).abs() < 1e-9);
            assert!((scaled.font_size - f * base.font_size).abs() < 1e-9);
        }
    }

    #[test]
    fn test_axis_normalize_reversed() {
        let axes = AxesConfig::default();
        assert_eq!(axes.x.normalize(4.0), -1.0);
        assert_eq!(axes.x.normalize(-0.5), 1.0);
        assert_eq!(axes.y.normalize(4.0), 1.0);
        assert_eq!(axes.z.normalize(-0.5), -1.0);
        assert_eq!(axes.normalize([4.0, -0.5, 4.0]), [-1.0, -1.0, 1.0]);
    }

    #[test]
    fn test_axis_enumeration_uniform_access() {
        let axes = AxesConfig::default();
        let labels: Vec<&str> = Axis::ALL.iter().map(|&a| axes.get(a).label.as_str()).collect();
        assert_eq!(labels, vec!["W1 - W2 (mag)", "W2 - W3 (mag)", "W3 - W4 (mag)"]);
        for axis in Axis::ALL {
            assert_eq!(axes.get(axis).ticks, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        }
    }

    #[test]
    fn test_yaml_round_trip_partial() {
        let yaml = "figure:\n  width_px: 1920\ncamera:\n  elevation: 25.0\n";
        let config: PlotConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.figure.width_px, 1920);
        assert_eq!(config.figure.dpi, 100.0);
        assert_eq!(config.camera.elevation, 25.0);
        assert_eq!(config.camera.stereo_separation, 5.0);
        assert_eq!(config.axes, AxesConfig::default());
    }

    #[test]
    fn test_yaml_file_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plot.yaml");

        let mut config = PlotConfig::default();
        config.figure.draw_labels = false;
        config.to_yaml(&path).unwrap();

        let loaded = PlotConfig::from_yaml(&path).unwrap();
        assert!(!loaded.figure.draw_labels);
        assert_eq!(loaded.figure.title.len(), 2);
    }
}
