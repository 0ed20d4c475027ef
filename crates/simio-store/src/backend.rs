//! The storage contract consumed by the entity graph.

use crate::datatype::{AttrValue, DataBuffer, DataSlice, DatasetInfo, Datatype};
use crate::error::StoreError;
use crate::path::GroupPath;

/// A hierarchical container of named groups, attributes and datasets.
///
/// Groups are addressed by absolute [`GroupPath`]. Every operation is
/// synchronous and either completes or returns an error; implementations
/// must not retain any borrowed buffer past the call.
///
/// Enumeration order is part of the contract: [`groups`](Self::groups)
/// returns child names in creation order, which makes serialization of a
/// graph deterministic.
pub trait Storage {
    /// Create the group at `path`, or open it if it already exists.
    ///
    /// The parent group must exist. Creating the root is a no-op.
    fn create_group(&mut self, path: &GroupPath) -> Result<(), StoreError>;

    /// Whether a group exists at `path`.
    fn has_group(&self, path: &GroupPath) -> bool;

    /// Names of the child groups of `path`, in creation order.
    fn groups(&self, path: &GroupPath) -> Result<Vec<String>, StoreError>;

    /// Set (or overwrite) an attribute on the group at `path`.
    fn set_attribute(
        &mut self,
        path: &GroupPath,
        name: &str,
        value: AttrValue,
    ) -> Result<(), StoreError>;

    /// Read an attribute of the group at `path`.
    fn attribute(&self, path: &GroupPath, name: &str) -> Result<AttrValue, StoreError>;

    /// Whether the group at `path` has an attribute `name`.
    fn has_attribute(&self, path: &GroupPath, name: &str) -> bool;

    /// Remove an attribute, returning whether it was present.
    ///
    /// The remaining attributes keep their order.
    fn remove_attribute(&mut self, path: &GroupPath, name: &str) -> Result<bool, StoreError>;

    /// Create a fixed-shape dataset, or open it if one with the same
    /// datatype and shape already exists.
    ///
    /// A new dataset is zero-filled.
    fn create_dataset(
        &mut self,
        path: &GroupPath,
        name: &str,
        datatype: Datatype,
        shape: &[u64],
    ) -> Result<(), StoreError>;

    /// Whether the group at `path` has a dataset `name`.
    fn has_dataset(&self, path: &GroupPath, name: &str) -> bool;

    /// Remove a dataset and its contents, returning whether it was present.
    fn remove_dataset(&mut self, path: &GroupPath, name: &str) -> Result<bool, StoreError>;

    /// Datatype and shape of a dataset, without reading its contents.
    fn dataset_info(&self, path: &GroupPath, name: &str) -> Result<DatasetInfo, StoreError>;

    /// Replace the full contents of a dataset.
    ///
    /// The buffer must have the dataset's datatype and exactly as many
    /// elements as its shape describes.
    fn write_dataset(
        &mut self,
        path: &GroupPath,
        name: &str,
        data: DataSlice<'_>,
    ) -> Result<(), StoreError>;

    /// Read the full contents of a dataset as a flat buffer.
    fn read_dataset(&self, path: &GroupPath, name: &str) -> Result<DataBuffer, StoreError>;
}
