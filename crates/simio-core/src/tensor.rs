//! Tensor shapes and the canonical ordering of their independent components.
//!
//! A [`TensorShape`] is fixed by `(dimension, rank, symmetries)`. Its
//! independent components are the index tuples in lexicographic order (first
//! index position varies slowest) that are canonical under every declared
//! symmetry: non-decreasing within a symmetric group, strictly increasing
//! within an antisymmetric group. The ordering is a pure function of the
//! inputs, which is what keeps storage indices stable across runs and files.

use smallvec::SmallVec;

use crate::error::ShapeError;

/// One index tuple of a tensor component, one entry per rank.
pub type TensorIndex = SmallVec<[usize; 4]>;

/// Upper bound on `dimension^rank`, the number of tuples enumerated while
/// building the canonical ordering.
pub const MAX_ENUMERATED_TUPLES: usize = 1 << 20;

/// A group of index positions that are interchangeable.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IndexSymmetry {
    /// Index positions in `[0, rank)`. Sorted on normalization.
    pub indices: Vec<usize>,
    /// Swapping two positions flips the sign instead of leaving the value
    /// unchanged; components with a repeated index vanish.
    pub antisymmetric: bool,
}

impl IndexSymmetry {
    /// A symmetric group over the given positions.
    pub fn symmetric(indices: impl Into<Vec<usize>>) -> Self {
        Self {
            indices: indices.into(),
            antisymmetric: false,
        }
    }

    /// An antisymmetric group over the given positions.
    pub fn antisymmetric(indices: impl Into<Vec<usize>>) -> Self {
        Self {
            indices: indices.into(),
            antisymmetric: true,
        }
    }

    /// Whether `tuple` is the canonical representative under this group.
    fn admits(&self, tuple: &[usize]) -> bool {
        self.indices.windows(2).all(|w| {
            let (a, b) = (tuple[w[0]], tuple[w[1]]);
            if self.antisymmetric {
                a < b
            } else {
                a <= b
            }
        })
    }
}

/// An abstract tensor shape with its ordered independent components.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TensorShape {
    dimension: usize,
    rank: usize,
    symmetries: Vec<IndexSymmetry>,
    components: Vec<TensorIndex>,
}

impl TensorShape {
    /// Build a tensor shape and derive its canonical component ordering.
    ///
    /// Fails with [`ShapeError::InvalidShape`] when `dimension` is zero, a
    /// symmetry group has fewer than two positions, names a position outside
    /// `[0, rank)`, or a position appears more than once across all groups.
    /// Rank 0 (a scalar) is valid and has exactly one component.
    pub fn new(
        dimension: usize,
        rank: usize,
        symmetries: Vec<IndexSymmetry>,
    ) -> Result<Self, ShapeError> {
        if dimension == 0 {
            return Err(ShapeError::invalid("tensor dimension must be positive"));
        }
        let symmetries = normalize_symmetries(rank, symmetries)?;
        let total = u32::try_from(rank)
            .ok()
            .and_then(|r| dimension.checked_pow(r))
            .filter(|&t| t <= MAX_ENUMERATED_TUPLES)
            .ok_or_else(|| {
                ShapeError::invalid(format!(
                    "dimension {dimension} and rank {rank} exceed {MAX_ENUMERATED_TUPLES} index tuples"
                ))
            })?;

        let mut components = Vec::new();
        let mut tuple: TensorIndex = smallvec::smallvec![0; rank];
        for n in 0..total {
            // Last position varies fastest.
            let mut rest = n;
            for pos in (0..rank).rev() {
                tuple[pos] = rest % dimension;
                rest /= dimension;
            }
            if symmetries.iter().all(|s| s.admits(&tuple)) {
                components.push(tuple.clone());
            }
        }

        Ok(Self {
            dimension,
            rank,
            symmetries,
            components,
        })
    }

    /// A rank-0 tensor.
    pub fn scalar(dimension: usize) -> Result<Self, ShapeError> {
        Self::new(dimension, 0, Vec::new())
    }

    /// A rank-1 tensor.
    pub fn vector(dimension: usize) -> Result<Self, ShapeError> {
        Self::new(dimension, 1, Vec::new())
    }

    /// A general rank-2 tensor with `dimension^2` components.
    pub fn tensor(dimension: usize) -> Result<Self, ShapeError> {
        Self::new(dimension, 2, Vec::new())
    }

    /// A symmetric rank-2 tensor with `dimension * (dimension + 1) / 2` components.
    pub fn symmetric_tensor(dimension: usize) -> Result<Self, ShapeError> {
        Self::new(dimension, 2, vec![IndexSymmetry::symmetric([0, 1])])
    }

    /// Dimension of the underlying vector space.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of indices.
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Normalized symmetry groups.
    pub fn symmetries(&self) -> &[IndexSymmetry] {
        &self.symmetries
    }

    /// Independent components in storage order.
    pub fn components(&self) -> &[TensorIndex] {
        &self.components
    }

    /// Number of independent components.
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Index tuple stored at `storage_index`.
    pub fn component(&self, storage_index: usize) -> Option<&[usize]> {
        self.components.get(storage_index).map(|c| c.as_slice())
    }

    /// Storage index holding the value of an arbitrary index tuple.
    ///
    /// The tuple is first brought into canonical form under every symmetry.
    /// Returns `None` for out-of-range tuples and for tuples that vanish
    /// identically (a repeated index in an antisymmetric group).
    pub fn storage_index(&self, indices: &[usize]) -> Option<usize> {
        if indices.len() != self.rank || indices.iter().any(|&i| i >= self.dimension) {
            return None;
        }
        let mut canonical: TensorIndex = indices.iter().copied().collect();
        for sym in &self.symmetries {
            let mut values: SmallVec<[usize; 4]> =
                sym.indices.iter().map(|&p| canonical[p]).collect();
            values.sort_unstable();
            if sym.antisymmetric && values.windows(2).any(|w| w[0] == w[1]) {
                return None;
            }
            for (&pos, &v) in sym.indices.iter().zip(values.iter()) {
                canonical[pos] = v;
            }
        }
        self.components.binary_search(&canonical).ok()
    }

    /// Conventional name of the component at `storage_index`.
    ///
    /// `"scalar"` for rank 0, otherwise the index digits (`"01"`), separated
    /// by underscores when the dimension has multi-digit indices (`"3_11"`).
    pub fn component_name(&self, storage_index: usize) -> Option<String> {
        let tuple = self.components.get(storage_index)?;
        if tuple.is_empty() {
            return Some("scalar".to_string());
        }
        let digits: Vec<String> = tuple.iter().map(|i| i.to_string()).collect();
        Some(if self.dimension > 10 {
            digits.join("_")
        } else {
            digits.concat()
        })
    }
}

fn normalize_symmetries(
    rank: usize,
    symmetries: Vec<IndexSymmetry>,
) -> Result<Vec<IndexSymmetry>, ShapeError> {
    let mut seen = vec![false; rank];
    let mut normalized = Vec::with_capacity(symmetries.len());
    for mut sym in symmetries {
        if sym.indices.len() < 2 {
            return Err(ShapeError::invalid(format!(
                "symmetry group {:?} must name at least two index positions",
                sym.indices
            )));
        }
        for &pos in &sym.indices {
            if pos >= rank {
                return Err(ShapeError::invalid(format!(
                    "symmetry references index position {pos} outside [0, {rank})"
                )));
            }
            if seen[pos] {
                return Err(ShapeError::invalid(format!(
                    "index position {pos} appears in more than one symmetry"
                )));
            }
            seen[pos] = true;
        }
        sym.indices.sort_unstable();
        normalized.push(sym);
    }
    normalized.sort();
    Ok(normalized)
}
