//! Axis-aligned integer boxes and block-local index arithmetic.
//!
//! A discretization block covers the box `[offset, offset + shape)` of its
//! manifold's global index space. Everything here is a pure function of the
//! box's recorded attributes; the global index of a point is
//! `offset + local`.

use crate::error::ShapeError;
use crate::id::IndexVec;

/// Flattening convention for multi-dimensional block data.
///
/// The container does not impose one; writers and readers of a dataset must
/// agree on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StorageOrder {
    /// Last axis varies fastest (C order).
    RowMajor,
    /// First axis varies fastest (Fortran order).
    ColumnMajor,
}

/// An axis-aligned box of integer points.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct IndexBox {
    offset: IndexVec,
    shape: IndexVec,
}

impl IndexBox {
    /// Build a box from its lower corner and extent.
    ///
    /// Fails when the vectors differ in length or any extent is negative.
    /// Zero extents are allowed and describe an empty box.
    pub fn new(offset: &[i64], shape: &[i64]) -> Result<Self, ShapeError> {
        if offset.len() != shape.len() {
            return Err(ShapeError::invalid(format!(
                "offset has {} entries but shape has {}",
                offset.len(),
                shape.len()
            )));
        }
        if let Some(axis) = shape.iter().position(|&s| s < 0) {
            return Err(ShapeError::invalid(format!(
                "shape entry {} on axis {axis} is negative",
                shape[axis]
            )));
        }
        if offset
            .iter()
            .zip(shape)
            .any(|(&o, &s)| o.checked_add(s).is_none())
        {
            return Err(ShapeError::invalid("offset + shape overflows i64"));
        }
        Ok(Self {
            offset: offset.iter().copied().collect(),
            shape: shape.iter().copied().collect(),
        })
    }

    /// Number of axes.
    pub fn dimension(&self) -> usize {
        self.shape.len()
    }

    /// Lower corner (inclusive), in global indices.
    pub fn offset(&self) -> &[i64] {
        &self.offset
    }

    /// Extent along each axis.
    pub fn shape(&self) -> &[i64] {
        &self.shape
    }

    /// Upper corner (exclusive), in global indices.
    pub fn upper(&self) -> IndexVec {
        self.offset
            .iter()
            .zip(&self.shape)
            .map(|(&o, &s)| o + s)
            .collect()
    }

    /// Number of points in the box, or `None` when it does not fit in a
    /// `usize`.
    pub fn len(&self) -> Option<usize> {
        self.shape.iter().try_fold(1usize, |acc, &s| {
            usize::try_from(s).ok().and_then(|s| acc.checked_mul(s))
        })
    }

    /// Whether the box contains no points.
    pub fn is_empty(&self) -> bool {
        self.shape.iter().any(|&s| s == 0)
    }

    /// Whether a block-local index lies inside the box.
    pub fn contains_local(&self, local: &[i64]) -> bool {
        local.len() == self.dimension()
            && local
                .iter()
                .zip(&self.shape)
                .all(|(&l, &s)| l >= 0 && l < s)
    }

    /// Whether a global index lies inside the box.
    pub fn contains(&self, global: &[i64]) -> bool {
        global.len() == self.dimension()
            && global
                .iter()
                .zip(self.offset.iter().zip(&self.shape))
                .all(|(&g, (&o, &s))| g >= o && g - o < s)
    }

    /// Whether `other` lies entirely inside this box.
    ///
    /// An empty box of matching dimension is contained in every box.
    pub fn contains_box(&self, other: &IndexBox) -> bool {
        if other.dimension() != self.dimension() {
            return false;
        }
        if other.is_empty() {
            return true;
        }
        let upper = self.upper();
        let other_upper = other.upper();
        (0..self.dimension())
            .all(|d| other.offset[d] >= self.offset[d] && other_upper[d] <= upper[d])
    }

    /// Map a block-local index to the global index `offset + local`.
    pub fn to_global(&self, local: &[i64]) -> Option<IndexVec> {
        if !self.contains_local(local) {
            return None;
        }
        Some(self.offset.iter().zip(local).map(|(&o, &l)| o + l).collect())
    }

    /// Map a global index back into this block's local indices.
    pub fn to_local(&self, global: &[i64]) -> Option<IndexVec> {
        if !self.contains(global) {
            return None;
        }
        Some(global.iter().zip(&self.offset).map(|(&g, &o)| g - o).collect())
    }

    /// Overlap of two boxes, or `None` when they are disjoint or of
    /// different dimension.
    pub fn intersection(&self, other: &IndexBox) -> Option<IndexBox> {
        if other.dimension() != self.dimension() {
            return None;
        }
        let upper = self.upper();
        let other_upper = other.upper();
        let mut offset = IndexVec::new();
        let mut shape = IndexVec::new();
        for d in 0..self.dimension() {
            let lo = self.offset[d].max(other.offset[d]);
            let hi = upper[d].min(other_upper[d]);
            if hi <= lo {
                return None;
            }
            offset.push(lo);
            shape.push(hi - lo);
        }
        Some(IndexBox { offset, shape })
    }

    /// Whether the boxes share at least one point.
    pub fn intersects(&self, other: &IndexBox) -> bool {
        self.intersection(other).is_some()
    }

    /// Position of a local index in the flattened block buffer, or `None`
    /// when it lies outside the box or does not fit in a `usize`.
    pub fn linear_index(&self, local: &[i64], order: StorageOrder) -> Option<usize> {
        if !self.contains_local(local) {
            return None;
        }
        let step = |linear: usize, (&l, &s): (&i64, &i64)| {
            linear
                .checked_mul(usize::try_from(s).ok()?)?
                .checked_add(usize::try_from(l).ok()?)
        };
        match order {
            StorageOrder::RowMajor => local.iter().zip(&self.shape).try_fold(0, step),
            StorageOrder::ColumnMajor => local.iter().zip(&self.shape).rev().try_fold(0, step),
        }
    }

    /// Inverse of [`linear_index`](Self::linear_index).
    pub fn local_index(&self, linear: usize, order: StorageOrder) -> Option<IndexVec> {
        if self.is_empty() || self.len().is_some_and(|n| linear >= n) {
            return None;
        }
        let mut local: IndexVec = smallvec::smallvec![0; self.dimension()];
        let mut rest = linear;
        let axes: Vec<usize> = match order {
            StorageOrder::RowMajor => (0..self.dimension()).rev().collect(),
            StorageOrder::ColumnMajor => (0..self.dimension()).collect(),
        };
        for d in axes {
            let s = self.shape[d] as usize;
            local[d] = (rest % s) as i64;
            rest /= s;
        }
        Some(local)
    }

    /// Iterate over every local index in flattened-buffer order.
    ///
    /// A box with more than `usize::MAX` points stops after the first
    /// `usize::MAX`.
    pub fn iter_local(&self, order: StorageOrder) -> impl Iterator<Item = IndexVec> + '_ {
        let len = if self.is_empty() {
            0
        } else {
            self.len().unwrap_or(usize::MAX)
        };
        (0..len).filter_map(move |i| self.local_index(i, order))
    }
}
