//! Data loaders for WISE color point sets.
//!
//! This module provides parsers for:
//! - NumPy `.npz` archives holding the arrays `x`, `y` and `z`
//! - CSV tables with `x`, `y`, `z` columns

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use log::debug;
use npyz::npz::NpzArchive;
use thiserror::Error;

/// Errors that can occur during file loading.
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Empty file: {0}")]
    EmptyFile(PathBuf),

    #[error("Missing array '{0}' in archive")]
    MissingArray(String),

    #[error("Array '{key}' is not a 1-D float array: {reason}")]
    InvalidArray { key: String, reason: String },

    #[error("Missing required columns: {0}")]
    MissingColumns(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("coordinate length mismatch: x has {x}, y has {y}, z has {z} elements")]
    LengthMismatch { x: usize, y: usize, z: usize },

    #[error("Unsupported input file extension: {0}")]
    UnsupportedExtension(PathBuf),
}

/// Result type for loader operations.
pub type Result<T> = std::result::Result<T, LoaderError>;

/// Immutable set of objects in 3D color space.
///
/// Index `i` of `x`, `y` and `z` refers to the same object. The three
/// sequences are guaranteed to have the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct PointSet {
    x: Vec<f64>,
    y: Vec<f64>,
    z: Vec<f64>,
}

impl PointSet {
    /// Creates a point set, rejecting coordinate vectors of unequal length.
    pub fn new(x: Vec<f64>, y: Vec<f64>, z: Vec<f64>) -> Result<Self> {
        if x.len() != y.len() || x.len() != z.len() {
            return Err(LoaderError::LengthMismatch {
                x: x.len(),
                y: y.len(),
                z: z.len(),
            });
        }
        Ok(Self { x, y, z })
    }

    /// Creates a point set from `[x, y, z]` triples.
    pub fn from_points(points: &[[f64; 3]]) -> Self {
        let mut x = Vec::with_capacity(points.len());
        let mut y = Vec::with_capacity(points.len());
        let mut z = Vec::with_capacity(points.len());
        for p in points {
            x.push(p[0]);
            y.push(p[1]);
            z.push(p[2]);
        }
        Self { x, y, z }
    }

    #[inline]
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    #[inline]
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    #[inline]
    pub fn z(&self) -> &[f64] {
        &self.z
    }

    /// Returns the number of objects.
    #[inline]
    pub fn len(&self) -> usize {
        self.x.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Returns object `i` as an `[x, y, z]` triple.
    #[inline]
    pub fn point(&self, i: usize) -> [f64; 3] {
        [self.x[i], self.y[i], self.z[i]]
    }

    /// Iterates over all objects as `[x, y, z]` triples.
    pub fn iter(&self) -> impl Iterator<Item = [f64; 3]> + '_ {
        self.x
            .iter()
            .zip(&self.y)
            .zip(&self.z)
            .map(|((&x, &y), &z)| [x, y, z])
    }
}

/// Load a point set from a NumPy `.npz` archive.
///
/// The archive must contain the 1-D arrays `x`, `y` and `z`, stored as
/// 64-bit or 32-bit floats.
///
/// # Errors
///
/// Returns an error if the archive cannot be opened, an array is missing or
/// has an unsupported dtype, or the arrays differ in length.
pub fn load_npz<P: AsRef<Path>>(path: P) -> Result<PointSet> {
    let path = path.as_ref();
    let mut archive = NpzArchive::open(path)?;

    let x = read_npz_array(&mut archive, "x")?;
    let y = read_npz_array(&mut archive, "y")?;
    let z = read_npz_array(&mut archive, "z")?;
    debug!("Read {} x, {} y, {} z values from {}", x.len(), y.len(), z.len(), path.display());

    PointSet::new(x, y, z)
}

/// Read one float array, accepting both `f8` and `f4` storage.
fn read_npz_array<R: Read + Seek>(archive: &mut NpzArchive<R>, key: &str) -> Result<Vec<f64>> {
    let array = archive
        .by_name(key)?
        .ok_or_else(|| LoaderError::MissingArray(key.to_string()))?;
    if array.shape().len() > 1 {
        return Err(LoaderError::InvalidArray {
            key: key.to_string(),
            reason: format!("expected 1 dimension, found {}", array.shape().len()),
        });
    }
    if let Ok(values) = array.into_vec::<f64>() {
        return Ok(values);
    }

    let array = archive
        .by_name(key)?
        .ok_or_else(|| LoaderError::MissingArray(key.to_string()))?;
    array
        .into_vec::<f32>()
        .map(|values| values.into_iter().map(f64::from).collect())
        .map_err(|e| LoaderError::InvalidArray {
            key: key.to_string(),
            reason: e.to_string(),
        })
}

/// Load a point set from a CSV file with `x`, `y`, `z` columns.
///
/// Column names are matched case-insensitively. Unlike a best-effort
/// reader, any unparsable value is an error.
pub fn load_xyz_csv<P: AsRef<Path>>(path: P) -> Result<PointSet> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(BufReader::new(file));

    let headers = reader.headers()?.clone();
    let col_map: HashMap<String, usize> = headers
        .iter()
        .enumerate()
        .map(|(i, name)| (name.to_lowercase(), i))
        .collect();

    let column = |name: &str| {
        col_map
            .get(name)
            .copied()
            .ok_or_else(|| LoaderError::MissingColumns(name.to_string()))
    };
    let idx = [column("x")?, column("y")?, column("z")?];

    let mut coords: [Vec<f64>; 3] = [Vec::new(), Vec::new(), Vec::new()];

    for (row, result) in reader.records().enumerate() {
        let record = result?;
        for (axis, &col) in idx.iter().enumerate() {
            let raw = record.get(col).unwrap_or("");
            let value: f64 = raw.parse().map_err(|_| {
                LoaderError::ParseError(format!(
                    "row {}: invalid {} value '{}'",
                    row + 1,
                    ["x", "y", "z"][axis],
                    raw
                ))
            })?;
            coords[axis].push(value);
        }
    }

    if coords[0].is_empty() {
        return Err(LoaderError::EmptyFile(path.to_path_buf()));
    }

    let [x, y, z] = coords;
    PointSet::new(x, y, z)
}

/// Load a point set, choosing the parser from the file extension.
pub fn load_points<P: AsRef<Path>>(path: P) -> Result<PointSet> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "npz" => load_npz(path),
        "csv" => load_xyz_csv(path),
        _ => Err(LoaderError::UnsupportedExtension(path.to_path_buf())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_point_set_operations() {
        let set = PointSet::new(vec![1.0, 4.0], vec![2.0, 5.0], vec![3.0, 6.0]).unwrap();
        assert_eq!(set.len(), 2);
        assert!(!set.is_empty());
        assert_eq!(set.point(1), [4.0, 5.0, 6.0]);

        let coords: Vec<[f64; 3]> = set.iter().collect();
        assert_eq!(coords, vec![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
    }

    #[test]
    fn test_point_set_length_mismatch() {
        let result = PointSet::new(vec![1.0, 2.0], vec![1.0], vec![1.0, 2.0]);
        match result {
            Err(LoaderError::LengthMismatch { x, y, z }) => {
                assert_eq!((x, y, z), (2, 1, 2));
            }
            other => panic!("Expected LengthMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_from_points() {
        let set = PointSet::from_points(&[[0.5, 1.0, 1.5]]);
        assert_eq!(set.x(), &[0.5]);
        assert_eq!(set.y(), &[1.0]);
        assert_eq!(set.z(), &[1.5]);
    }

    #[test]
    fn test_load_xyz_csv() -> Result<()> {
        let mut file = NamedTempFile::with_suffix(".csv").unwrap();
        writeln!(file, "id,Z,Y,X").unwrap();
        writeln!(file, "a,3.0,2.0,1.0").unwrap();
        writeln!(file, "b,6.0,5.0,4.0").unwrap();
        file.flush().unwrap();

        let set = load_points(file.path())?;
        assert_eq!(set.len(), 2);
        assert_eq!(set.point(0), [1.0, 2.0, 3.0]);
        assert_eq!(set.point(1), [4.0, 5.0, 6.0]);

        Ok(())
    }

    #[test]
    fn test_load_xyz_csv_missing_column() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "x,y").unwrap();
        writeln!(file, "1.0,2.0").unwrap();
        file.flush().unwrap();

        let err = load_xyz_csv(file.path()).unwrap_err();
        assert!(matches!(err, LoaderError::MissingColumns(ref c) if c == "z"));
    }

    #[test]
    fn test_load_xyz_csv_bad_value() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "x,y,z").unwrap();
        writeln!(file, "1.0,abc,3.0").unwrap();
        file.flush().unwrap();

        let err = load_xyz_csv(file.path()).unwrap_err();
        assert!(matches!(err, LoaderError::ParseError(_)));
    }

    #[test]
    fn test_load_xyz_csv_empty() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "x,y,z").unwrap();
        file.flush().unwrap();

        let err = load_xyz_csv(file.path()).unwrap_err();
        assert!(matches!(err, LoaderError::EmptyFile(_)));
    }

    #[test]
    fn test_load_npz_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_npz(dir.path().join("data.npz")).unwrap_err();
        assert!(matches!(err, LoaderError::Io(_)));
    }

    #[test]
    fn test_load_npz_not_an_archive() {
        let mut file = NamedTempFile::with_suffix(".npz").unwrap();
        writeln!(file, "definitely not a zip archive").unwrap();
        file.flush().unwrap();

        assert!(load_points(file.path()).is_err());
    }

    fn write_npz<T: npyz::AutoSerialize>(path: &Path, arrays: Vec<(&str, Vec<u64>, Vec<T>)>) {
        use npyz::WriterBuilder;

        let mut npz = npyz::npz::NpzWriter::create(path).unwrap();
        for (name, shape, values) in arrays {
            npz.array(name, Default::default())
                .unwrap()
                .default_dtype()
                .shape(&shape)
                .begin_nd()
                .unwrap()
                .extend(values)
                .unwrap();
        }
    }

    #[test]
    fn test_load_npz_f64_arrays() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.npz");
        write_npz(
            &path,
            vec![
                ("x", vec![3], vec![2.0f64, 4.0, 6.0]),
                ("y", vec![3], vec![1.0, 1.5, 2.0]),
                ("z", vec![3], vec![-0.5, 0.0, 3.0]),
            ],
        );

        let set = load_points(&path).unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.x(), &[2.0, 4.0, 6.0]);
        assert_eq!(set.point(2), [6.0, 2.0, 3.0]);
    }

    #[test]
    fn test_load_npz_f32_arrays() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.npz");
        write_npz(
            &path,
            vec![
                ("x", vec![3], vec![2.5f32, 2.5, 2.5]),
                ("y", vec![3], vec![0.25f32, 0.5, 0.75]),
                ("z", vec![3], vec![1.0f32, 2.0, 3.0]),
            ],
        );

        let set = load_npz(&path).unwrap();
        assert_eq!(set.x(), &[2.5, 2.5, 2.5]);
        assert_eq!(set.y(), &[0.25, 0.5, 0.75]);
    }

    #[test]
    fn test_load_npz_missing_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.npz");
        write_npz(
            &path,
            vec![("x", vec![2], vec![1.0f64, 2.0]), ("y", vec![2], vec![1.0, 2.0])],
        );

        match load_npz(&path) {
            Err(LoaderError::MissingArray(key)) => assert_eq!(key, "z"),
            other => panic!("Expected MissingArray, got {:?}", other),
        }
    }

    #[test]
    fn test_load_npz_rejects_2d_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.npz");
        write_npz(
            &path,
            vec![
                ("x", vec![2, 2], vec![1.0f64, 2.0, 3.0, 4.0]),
                ("y", vec![4], vec![1.0, 2.0, 3.0, 4.0]),
                ("z", vec![4], vec![1.0, 2.0, 3.0, 4.0]),
            ],
        );

        match load_npz(&path) {
            Err(LoaderError::InvalidArray { key, .. }) => assert_eq!(key, "x"),
            other => panic!("Expected InvalidArray, got {:?}", other),
        }
    }

    #[test]
    fn test_load_npz_unequal_lengths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.npz");
        write_npz(
            &path,
            vec![
                ("x", vec![3], vec![1.0f64, 2.0, 3.0]),
                ("y", vec![2], vec![1.0, 2.0]),
                ("z", vec![3], vec![1.0, 2.0, 3.0]),
            ],
        );

        let err = load_npz(&path).unwrap_err();
        assert!(matches!(err, LoaderError::LengthMismatch { x: 3, y: 2, z: 3 }));
    }

    #[test]
    fn test_load_points_unsupported_extension() {
        let err = load_points("points.ply").unwrap_err();
        assert!(matches!(err, LoaderError::UnsupportedExtension(_)));
    }
}
