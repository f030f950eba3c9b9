//! Azimuth sequences for animation frames.
//!
//! An [`AzimuthRange`] is validated once; [`AzimuthRange::sequence`] turns it
//! into a lazy, one-shot iterator of camera azimuths, `start + i * step` for
//! every `i` that keeps the value on the start side of `stop`.

use thiserror::Error;

/// Errors that can occur when building an azimuth range.
#[derive(Error, Debug, PartialEq)]
pub enum FrameError {
    #[error("{name} must be convertible to a floating point number, got '{value}'")]
    NotANumber { name: &'static str, value: String },

    #[error("{name} must be finite, got {value}")]
    NonFinite { name: &'static str, value: f64 },

    #[error("azimuth step must not be zero")]
    ZeroStep,

    #[error("azimuth range yields {count} frames, more than the limit of {}", MAX_FRAMES)]
    TooManyFrames { count: f64 },
}

/// Largest number of frames a sweep may produce.
pub const MAX_FRAMES: usize = u32::MAX as usize;

/// Result type for frame operations.
pub type Result<T> = std::result::Result<T, FrameError>;

/// Validated start, stop and step of an azimuth sweep, all in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AzimuthRange {
    start: f64,
    stop: f64,
    step: f64,
}

impl AzimuthRange {
    /// Build a range from numeric bounds.
    ///
    /// When `stop < start` the step is forced negative, keeping its
    /// magnitude, so the sweep always runs from `start` toward `stop`.
    pub fn new(start: f64, stop: f64, step: f64) -> Result<Self> {
        check_finite("azstart", start)?;
        check_finite("azstop", stop)?;
        check_finite("azstep", step)?;
        if step == 0.0 {
            return Err(FrameError::ZeroStep);
        }

        let step = if stop < start { -step.abs() } else { step };
        let count = ((stop - start) / step).ceil();
        if count > MAX_FRAMES as f64 {
            return Err(FrameError::TooManyFrames { count });
        }
        Ok(Self { start, stop, step })
    }

    /// Build a range from textual bounds, e.g. command-line arguments.
    pub fn parse(start: &str, stop: &str, step: &str) -> Result<Self> {
        let start = parse_angle("azstart", start)?;
        let stop = parse_angle("azstop", stop)?;
        let step = parse_angle("azstep", step)?;
        Self::new(start, stop, step)
    }

    #[inline]
    pub fn start(&self) -> f64 {
        self.start
    }

    #[inline]
    pub fn stop(&self) -> f64 {
        self.stop
    }

    /// Effective step after direction forcing.
    #[inline]
    pub fn step(&self) -> f64 {
        self.step
    }

    /// Number of frames the sweep produces, at most [`MAX_FRAMES`].
    pub fn len(&self) -> usize {
        let n = ((self.stop - self.start) / self.step).ceil();
        if n > 0.0 {
            n as usize
        } else {
            0
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Consume the range into its sequence of azimuths.
    pub fn sequence(self) -> AzimuthSequence {
        AzimuthSequence {
            start: self.start,
            step: self.step,
            next: 0,
            len: self.len(),
        }
    }
}

fn parse_angle(name: &'static str, value: &str) -> Result<f64> {
    value.trim().parse::<f64>().map_err(|_| FrameError::NotANumber {
        name,
        value: value.to_string(),
    })
}

fn check_finite(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(FrameError::NonFinite { name, value })
    }
}

/// Lazy iterator over the azimuths of a sweep. Not restartable.
#[derive(Debug)]
pub struct AzimuthSequence {
    start: f64,
    step: f64,
    next: usize,
    len: usize,
}

impl Iterator for AzimuthSequence {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        if self.next >= self.len {
            return None;
        }
        let azimuth = self.start + self.next as f64 * self.step;
        self.next += 1;
        Some(azimuth)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.len - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for AzimuthSequence {}
