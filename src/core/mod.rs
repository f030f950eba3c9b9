//! Core data types and I/O operations.

pub mod loaders;
pub mod writers;

pub use loaders::{load_npz, load_points, load_xyz_csv, LoaderError, PointSet};
pub use writers::{ensure_dir, ensure_parent_dirs, write_labels_csv, WriteError};
