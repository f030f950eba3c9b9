//! Stereoscopic 3D scatter plots of astronomical objects in WISE color space.
//!
//! This crate provides tools for:
//! - Loading WISE color point sets from `.npz` archives or CSV tables
//! - Classifying objects into five clusters with fixed decision boundaries
//! - Rendering crossed-eye stereo pairs with shadow projections
//! - Sweeping the camera azimuth to produce animation frames
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use wise_stereo::{core::loaders::load_points, PlotConfig};
//! use wise_stereo::visualization::{OutputFormat, StereoFigure};
//!
//! let points = load_points("data.npz").unwrap();
//! let figure = StereoFigure::new(points, PlotConfig::default().render_config());
//! figure
//!     .render_stereo_pair(-18.0, OutputFormat::Png, Path::new("."))
//!     .unwrap();
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod processors;
pub mod visualization;

pub use config::{AxesConfig, Axis, AxisSpec, CameraConfig, FigureConfig, PlotConfig, RenderConfig};
pub use core::loaders::PointSet;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
