//! Binned numeric-aggregate records
//!
//! A [`Histogram`] has one to three fixed-width axes. Every axis carries an
//! underflow bin (index 0) and an overflow bin (index `bins + 1`), and the
//! global bin index is laid out x-fastest:
//! `global = x + (nx + 2) * (y + (ny + 2) * z)`.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Relative tolerance used when comparing axis bounds.
const BOUND_TOLERANCE: f64 = 1e-9;

/// Maximum number of axes a histogram may have.
pub const MAX_DIMENSIONS: usize = 3;

/// Upper bound on storage cells (underflow and overflow included).
pub const MAX_CELLS: usize = 1 << 24;

/// A fixed-width binned axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    /// Number of in-range bins (excluding underflow and overflow)
    pub bins: usize,
    /// Lower edge of the first in-range bin
    pub low: f64,
    /// Upper edge of the last in-range bin
    pub high: f64,
}

impl Axis {
    pub fn new(bins: usize, low: f64, high: f64) -> Self {
        Self { bins, low, high }
    }

    /// Number of storage cells for this axis, including underflow and overflow.
    pub fn cells(&self) -> usize {
        self.bins.saturating_add(2)
    }

    /// Bin index for a coordinate. `0` is underflow, `bins + 1` is overflow.
    pub fn find_bin(&self, x: f64) -> usize {
        if x.is_nan() || x < self.low {
            return 0;
        }
        if x >= self.high {
            return self.bins + 1;
        }
        let width = (self.high - self.low) / self.bins as f64;
        let bin = ((x - self.low) / width) as usize + 1;
        bin.min(self.bins)
    }

    fn matches(&self, other: &Axis) -> bool {
        let scale = (self.high - self.low).abs().max(1.0);
        self.bins == other.bins
            && (self.low - other.low).abs() <= BOUND_TOLERANCE * scale
            && (self.high - other.high).abs() <= BOUND_TOLERANCE * scale
    }
}

/// Total cell count over `axes`, or `None` if it exceeds [`MAX_CELLS`].
fn cell_count(axes: &[Axis]) -> Option<usize> {
    axes.iter()
        .try_fold(1usize, |total, axis| {
            total.checked_mul(axis.bins.checked_add(2)?)
        })
        .filter(|&total| total <= MAX_CELLS)
}

/// A named, binned numeric aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    name: String,
    #[serde(default)]
    title: String,
    axes: Vec<Axis>,
    contents: Vec<f64>,
    #[serde(default)]
    entries: f64,
}

impl Histogram {
    /// Create an empty histogram over the given axes.
    pub fn new(name: impl Into<String>, title: impl Into<String>, axes: Vec<Axis>) -> Result<Self> {
        let name = name.into();
        // An oversized binning allocates nothing here and is rejected by validate.
        let histogram = Self {
            contents: vec![0.0; cell_count(&axes).unwrap_or(0)],
            name,
            title: title.into(),
            axes,
            entries: 0.0,
        };
        histogram.validate()?;
        Ok(histogram)
    }

    pub fn new_1d(
        name: impl Into<String>,
        title: impl Into<String>,
        bins: usize,
        low: f64,
        high: f64,
    ) -> Result<Self> {
        Self::new(name, title, vec![Axis::new(bins, low, high)])
    }

    pub fn new_2d(
        name: impl Into<String>,
        title: impl Into<String>,
        x: (usize, f64, f64),
        y: (usize, f64, f64),
    ) -> Result<Self> {
        Self::new(
            name,
            title,
            vec![Axis::new(x.0, x.1, x.2), Axis::new(y.0, y.1, y.2)],
        )
    }

    pub fn new_3d(
        name: impl Into<String>,
        title: impl Into<String>,
        x: (usize, f64, f64),
        y: (usize, f64, f64),
        z: (usize, f64, f64),
    ) -> Result<Self> {
        Self::new(
            name,
            title,
            vec![
                Axis::new(x.0, x.1, x.2),
                Axis::new(y.0, y.1, y.2),
                Axis::new(z.0, z.1, z.2),
            ],
        )
    }

    /// Check the structural invariants of a histogram.
    ///
    /// Deserialized histograms are not trusted, so containers call this after
    /// loading.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| Error::InvalidHistogram {
            name: self.name.clone(),
            reason,
        };

        if self.name.is_empty() {
            return Err(invalid("name must not be empty".into()));
        }
        if self.axes.is_empty() || self.axes.len() > MAX_DIMENSIONS {
            return Err(invalid(format!(
                "expected 1 to {} axes, found {}",
                MAX_DIMENSIONS,
                self.axes.len()
            )));
        }
        for (i, axis) in self.axes.iter().enumerate() {
            if axis.bins == 0 {
                return Err(invalid(format!("axis {} has no bins", i)));
            }
            if !(axis.low.is_finite() && axis.high.is_finite()) || axis.low >= axis.high {
                return Err(invalid(format!(
                    "axis {} has invalid range [{}, {})",
                    i, axis.low, axis.high
                )));
            }
        }
        let expected = cell_count(&self.axes).ok_or_else(|| {
            invalid(format!("binning needs more than {} cells", MAX_CELLS))
        })?;
        if self.contents.len() != expected {
            return Err(invalid(format!(
                "expected {} cells, found {}",
                expected,
                self.contents.len()
            )));
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    pub fn dimension(&self) -> usize {
        self.axes.len()
    }

    /// Number of fill calls (or summed entries after merging).
    pub fn entries(&self) -> f64 {
        self.entries
    }

    /// Raw cell contents, including underflow and overflow cells.
    pub fn contents(&self) -> &[f64] {
        &self.contents
    }

    /// Global cell index for per-axis bin indices.
    ///
    /// Missing trailing coordinates are treated as bin 0 of that axis.
    pub fn global_bin(&self, bins: &[usize]) -> Option<usize> {
        let mut index = 0;
        let mut stride = 1;
        for (i, axis) in self.axes.iter().enumerate() {
            let bin = bins.get(i).copied().unwrap_or(0);
            if bin >= axis.cells() {
                return None;
            }
            index += bin * stride;
            stride *= axis.cells();
        }
        Some(index)
    }

    /// Content of a global cell; `0.0` for an out-of-range index.
    pub fn bin_content(&self, global: usize) -> f64 {
        self.contents.get(global).copied().unwrap_or(0.0)
    }

    pub fn set_bin_content(&mut self, global: usize, value: f64) -> Result<()> {
        let len = self.contents.len();
        let cell = self
            .contents
            .get_mut(global)
            .ok_or_else(|| Error::InvalidHistogram {
                name: self.name.clone(),
                reason: format!("bin {} out of range (0..{})", global, len),
            })?;
        *cell = value;
        Ok(())
    }

    /// Fill with unit weight. Returns the global cell that was incremented.
    pub fn fill(&mut self, coords: &[f64]) -> usize {
        self.fill_weighted(coords, 1.0)
    }

    /// Fill with the given weight. Missing coordinates land in underflow.
    pub fn fill_weighted(&mut self, coords: &[f64], weight: f64) -> usize {
        let bins: Vec<usize> = self
            .axes
            .iter()
            .enumerate()
            .map(|(i, axis)| coords.get(i).map_or(0, |&x| axis.find_bin(x)))
            .collect();
        // Every per-axis index comes from find_bin, so the global index is in range.
        let global = self.global_bin(&bins).unwrap_or(0);
        self.contents[global] += weight;
        self.entries += 1.0;
        global
    }

    /// Sum of all in-range cells, excluding underflow and overflow.
    pub fn integral(&self) -> f64 {
        self.contents
            .iter()
            .enumerate()
            .filter(|(global, _)| self.is_in_range(*global))
            .map(|(_, value)| value)
            .sum()
    }

    fn is_in_range(&self, mut global: usize) -> bool {
        for axis in &self.axes {
            let bin = global % axis.cells();
            if bin == 0 || bin == axis.bins + 1 {
                return false;
            }
            global /= axis.cells();
        }
        true
    }

    /// Whether `other` can be added into `self`.
    pub fn is_compatible(&self, other: &Histogram) -> bool {
        self.incompatibility(other).is_none()
    }

    fn incompatibility(&self, other: &Histogram) -> Option<String> {
        if self.dimension() != other.dimension() {
            return Some(format!(
                "dimension {} vs {}",
                self.dimension(),
                other.dimension()
            ));
        }
        self.axes
            .iter()
            .zip(&other.axes)
            .enumerate()
            .find(|(_, (a, b))| !a.matches(b))
            .map(|(i, (a, b))| {
                format!(
                    "axis {}: {} bins [{}, {}) vs {} bins [{}, {})",
                    i, a.bins, a.low, a.high, b.bins, b.low, b.high
                )
            })
    }

    /// Add `other` into `self`, cell by cell.
    ///
    /// This is the additive merge primitive. It is commutative, and `self` is
    /// left untouched when the binning differs.
    pub fn add(&mut self, other: &Histogram) -> Result<()> {
        if let Some(reason) = self.incompatibility(other) {
            return Err(Error::IncompatibleBinning {
                name: self.name.clone(),
                reason,
            });
        }
        for (cell, value) in self.contents.iter_mut().zip(&other.contents) {
            *cell += value;
        }
        self.entries += other.entries;
        Ok(())
    }
}
