//! Attaching data to components and moving bulk data through a store.
//!
//! The graph only records what backs a component. Bulk values travel
//! directly between the caller's buffer and the component's `data` dataset;
//! nothing is cached and no buffer is kept past the call.

use simio_core::{IndexVec, ShapeError};
use simio_store::{element_count, DataBuffer, DataSlice, Datatype, Storage, StoreError};

use crate::entity::{ComponentData, DiscretizationBlock};
use crate::error::ModelError;
use crate::id::ComponentId;
use crate::project::{check_dimension, Project};
use crate::serialize::layout;

/// Dataset extents for a block shape. A negative extent is an error, not
/// clamped.
pub(crate) fn dataset_shape(shape: &[i64]) -> Result<Vec<u64>, ModelError> {
    shape
        .iter()
        .map(|&s| {
            u64::try_from(s).map_err(|_| {
                ModelError::InvalidShape(ShapeError::InvalidShape {
                    reason: format!("dataset extent {s} is negative"),
                })
            })
        })
        .collect()
}

/// Number of elements in a dataset of `shape`, checked against `usize`.
fn dataset_len(shape: &[u64]) -> Result<usize, ModelError> {
    element_count(shape).ok_or_else(|| {
        ModelError::Backend(StoreError::DatasetTooLarge {
            shape: shape.to_vec(),
        })
    })
}

impl Project {
    /// The discretization block a component's values cover.
    pub fn component_block(
        &self,
        component: ComponentId,
    ) -> Result<&DiscretizationBlock, ModelError> {
        let dfb = self.components.get(component)?.discrete_field_block;
        self.blocks.get(self.discrete_field_blocks.get(dfb)?.block)
    }

    /// Declare that `component` is backed by a dataset of `datatype`.
    ///
    /// `shape` must equal the block's shape.
    pub fn set_data(
        &mut self,
        component: ComponentId,
        datatype: Datatype,
        shape: &[i64],
    ) -> Result<(), ModelError> {
        let block = self.component_block(component)?;
        if block.shape() != shape {
            return Err(ModelError::ShapeMismatch {
                expected: dataset_shape(block.shape())?,
                found: dataset_shape(shape)?,
            });
        }
        let shape: IndexVec = shape.iter().copied().collect();
        self.components.get_mut(component)?.data = ComponentData::Dataset { datatype, shape };
        Ok(())
    }

    /// Declare that `component` holds the linear range
    /// `origin + sum(delta[d] * local[d])`. No dataset is written for it.
    pub fn set_data_range(
        &mut self,
        component: ComponentId,
        origin: f64,
        delta: &[f64],
    ) -> Result<(), ModelError> {
        let dim = self.component_block(component)?.region().dimension();
        check_dimension("data range delta", dim, delta.len())?;
        self.components.get_mut(component)?.data = ComponentData::Range {
            origin,
            delta: delta.to_vec(),
        };
        Ok(())
    }

    /// Datatype and shape of a component's dataset.
    fn dataset_layout(&self, component: ComponentId) -> Result<(Datatype, Vec<u64>), ModelError> {
        let c = self.components.get(component)?;
        match &c.data {
            ComponentData::Dataset { datatype, shape } => Ok((*datatype, dataset_shape(shape)?)),
            _ => Err(ModelError::NoData {
                component: c.name.clone(),
            }),
        }
    }

    /// Write a component's full contents.
    ///
    /// `data` is the flattened block, `product(block.shape)` elements of
    /// the declared datatype; both are checked before the store is touched.
    /// The project must already have been written to `storage`, which is
    /// where the component's dataset is created.
    pub fn write_data(
        &self,
        storage: &mut dyn Storage,
        component: ComponentId,
        data: DataSlice<'_>,
    ) -> Result<(), ModelError> {
        let (datatype, shape) = self.dataset_layout(component)?;
        if data.len() != dataset_len(&shape)? {
            return Err(ModelError::ShapeMismatch {
                expected: shape,
                found: vec![data.len() as u64],
            });
        }
        if data.datatype() != datatype {
            return Err(ModelError::DatatypeMismatch {
                expected: datatype,
                found: data.datatype(),
            });
        }
        let path = self.path_of(component)?;
        storage.write_dataset(&path, layout::DATA, data)?;
        Ok(())
    }

    /// Read a component's full contents as a flat buffer.
    pub fn read_data(
        &self,
        storage: &dyn Storage,
        component: ComponentId,
    ) -> Result<DataBuffer, ModelError> {
        let (datatype, shape) = self.dataset_layout(component)?;
        let expected = dataset_len(&shape)?;
        let path = self.path_of(component)?;
        let buffer = storage.read_dataset(&path, layout::DATA)?;
        if buffer.datatype() != datatype {
            return Err(ModelError::DatatypeMismatch {
                expected: datatype,
                found: buffer.datatype(),
            });
        }
        if buffer.len() != expected {
            return Err(ModelError::ShapeMismatch {
                expected: shape,
                found: vec![buffer.len() as u64],
            });
        }
        Ok(buffer)
    }
}
