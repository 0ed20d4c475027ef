//! In-memory reference implementation of [`Storage`].

use indexmap::IndexMap;

use crate::backend::Storage;
use crate::datatype::{element_count, AttrValue, DataBuffer, DataSlice, DatasetInfo, Datatype};
use crate::error::StoreError;
use crate::path::GroupPath;

/// A dataset held in memory.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Dataset {
    pub(crate) shape: Vec<u64>,
    pub(crate) data: DataBuffer,
}

impl Dataset {
    pub(crate) fn info(&self) -> DatasetInfo {
        DatasetInfo {
            datatype: self.data.datatype(),
            shape: self.shape.clone(),
        }
    }
}

/// One group node. Children refer to other nodes by index.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct GroupNode {
    pub(crate) children: IndexMap<String, usize>,
    pub(crate) attributes: IndexMap<String, AttrValue>,
    pub(crate) datasets: IndexMap<String, Dataset>,
}

/// A tree of groups kept entirely in memory.
///
/// Nodes live in a flat vector with the root at index 0; a group's children
/// map names to node indices in creation order.
#[derive(Clone, Debug, PartialEq)]
pub struct MemStore {
    nodes: Vec<GroupNode>,
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemStore {
    /// An empty store containing only the root group.
    pub fn new() -> Self {
        Self {
            nodes: vec![GroupNode::default()],
        }
    }

    /// Total number of groups, including the root.
    pub fn group_count(&self) -> usize {
        self.nodes.len()
    }

    /// Total number of dataset elements held, across all datasets.
    pub fn element_count(&self) -> usize {
        self.nodes
            .iter()
            .flat_map(|n| n.datasets.values())
            .map(|d| d.data.len())
            .sum()
    }

    pub(crate) fn node(&self, index: usize) -> &GroupNode {
        &self.nodes[index]
    }

    /// Append a fresh node as child `name` of `parent`, returning its index.
    pub(crate) fn push_child(&mut self, parent: usize, name: String) -> usize {
        let index = self.nodes.len();
        self.nodes.push(GroupNode::default());
        self.nodes[parent].children.insert(name, index);
        index
    }

    pub(crate) fn node_mut(&mut self, index: usize) -> &mut GroupNode {
        &mut self.nodes[index]
    }

    fn lookup(&self, path: &GroupPath) -> Option<usize> {
        let mut current = 0;
        for c in path.components() {
            current = *self.nodes[current].children.get(c)?;
        }
        Some(current)
    }

    fn require(&self, path: &GroupPath) -> Result<usize, StoreError> {
        self.lookup(path).ok_or_else(|| StoreError::NoSuchGroup {
            path: path.to_string(),
        })
    }

    fn dataset(&self, path: &GroupPath, name: &str) -> Result<&Dataset, StoreError> {
        let node = self.require(path)?;
        self.nodes[node]
            .datasets
            .get(name)
            .ok_or_else(|| StoreError::NoSuchDataset {
                path: path.to_string(),
                name: name.to_string(),
            })
    }
}

impl Storage for MemStore {
    fn create_group(&mut self, path: &GroupPath) -> Result<(), StoreError> {
        let Some(parent_path) = path.parent() else {
            return Ok(());
        };
        let parent = self.require(&parent_path)?;
        let name = path.name().unwrap_or_default();
        if self.nodes[parent].children.contains_key(name) {
            return Ok(());
        }
        if !GroupPath::is_valid_component(name) {
            return Err(StoreError::InvalidPath {
                path: path.to_string(),
            });
        }
        self.push_child(parent, name.to_string());
        Ok(())
    }

    fn has_group(&self, path: &GroupPath) -> bool {
        self.lookup(path).is_some()
    }

    fn groups(&self, path: &GroupPath) -> Result<Vec<String>, StoreError> {
        let node = self.require(path)?;
        Ok(self.nodes[node].children.keys().cloned().collect())
    }

    fn set_attribute(
        &mut self,
        path: &GroupPath,
        name: &str,
        value: AttrValue,
    ) -> Result<(), StoreError> {
        let node = self.require(path)?;
        self.nodes[node]
            .attributes
            .insert(name.to_string(), value);
        Ok(())
    }

    fn attribute(&self, path: &GroupPath, name: &str) -> Result<AttrValue, StoreError> {
        let node = self.require(path)?;
        self.nodes[node]
            .attributes
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NoSuchAttribute {
                path: path.to_string(),
                name: name.to_string(),
            })
    }

    fn has_attribute(&self, path: &GroupPath, name: &str) -> bool {
        self.lookup(path)
            .is_some_and(|n| self.nodes[n].attributes.contains_key(name))
    }

    fn remove_attribute(&mut self, path: &GroupPath, name: &str) -> Result<bool, StoreError> {
        let node = self.require(path)?;
        Ok(self.nodes[node].attributes.shift_remove(name).is_some())
    }

    fn create_dataset(
        &mut self,
        path: &GroupPath,
        name: &str,
        datatype: Datatype,
        shape: &[u64],
    ) -> Result<(), StoreError> {
        let node = self.require(path)?;
        if let Some(existing) = self.nodes[node].datasets.get(name) {
            if existing.data.datatype() == datatype && existing.shape == shape {
                return Ok(());
            }
            return Err(StoreError::DatasetExists {
                path: path.to_string(),
                name: name.to_string(),
            });
        }
        let len = element_count(shape).ok_or_else(|| StoreError::DatasetTooLarge {
            shape: shape.to_vec(),
        })?;
        self.nodes[node].datasets.insert(
            name.to_string(),
            Dataset {
                shape: shape.to_vec(),
                data: DataBuffer::zeros(datatype, len),
            },
        );
        Ok(())
    }

    fn has_dataset(&self, path: &GroupPath, name: &str) -> bool {
        self.lookup(path)
            .is_some_and(|n| self.nodes[n].datasets.contains_key(name))
    }

    fn remove_dataset(&mut self, path: &GroupPath, name: &str) -> Result<bool, StoreError> {
        let node = self.require(path)?;
        Ok(self.nodes[node].datasets.shift_remove(name).is_some())
    }

    fn dataset_info(&self, path: &GroupPath, name: &str) -> Result<DatasetInfo, StoreError> {
        Ok(self.dataset(path, name)?.info())
    }

    fn write_dataset(
        &mut self,
        path: &GroupPath,
        name: &str,
        data: DataSlice<'_>,
    ) -> Result<(), StoreError> {
        let node = self.require(path)?;
        let dataset = self.nodes[node]
            .datasets
            .get_mut(name)
            .ok_or_else(|| StoreError::NoSuchDataset {
                path: path.to_string(),
                name: name.to_string(),
            })?;
        let expected = dataset.data.datatype();
        if data.datatype() != expected {
            return Err(StoreError::TypeMismatch {
                expected,
                found: data.datatype(),
            });
        }
        if data.len() != dataset.data.len() {
            return Err(StoreError::LengthMismatch {
                expected: dataset.data.len(),
                found: data.len(),
            });
        }
        dataset.data.copy_from(data);
        Ok(())
    }

    fn read_dataset(&self, path: &GroupPath, name: &str) -> Result<DataBuffer, StoreError> {
        Ok(self.dataset(path, name)?.data.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> GroupPath {
        s.parse().unwrap()
    }

    #[test]
    fn create_group_is_create_or_open() {
        let mut s = MemStore::new();
        s.create_group(&p("/fields")).unwrap();
        s.set_attribute(&p("/fields"), "k", AttrValue::Int(1)).unwrap();
        s.create_group(&p("/fields")).unwrap();
        assert_eq!(s.attribute(&p("/fields"), "k").unwrap(), AttrValue::Int(1));
        assert_eq!(s.group_count(), 2);
    }

    #[test]
    fn create_group_requires_parent() {
        let mut s = MemStore::new();
        match s.create_group(&p("/a/b")) {
            Err(StoreError::NoSuchGroup { path }) => assert_eq!(path, "/a"),
            other => panic!("expected NoSuchGroup, got {other:?}"),
        }
    }

    #[test]
    fn invalid_child_name_is_rejected() {
        let mut s = MemStore::new();
        match s.create_group(&GroupPath::root().child("a/b")) {
            Err(StoreError::InvalidPath { .. }) => {}
            other => panic!("expected InvalidPath, got {other:?}"),
        }
    }

    #[test]
    fn groups_are_listed_in_creation_order() {
        let mut s = MemStore::new();
        for name in ["zeta", "alpha", "mid"] {
            s.create_group(&GroupPath::root().child(name)).unwrap();
        }
        assert_eq!(s.groups(&GroupPath::root()).unwrap(), ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn missing_attribute_is_reported() {
        let s = MemStore::new();
        match s.attribute(&GroupPath::root(), "type") {
            Err(StoreError::NoSuchAttribute { name, .. }) => assert_eq!(name, "type"),
            other => panic!("expected NoSuchAttribute, got {other:?}"),
        }
        assert!(!s.has_attribute(&GroupPath::root(), "type"));
    }

    #[test]
    fn dataset_write_then_read() {
        let mut s = MemStore::new();
        let root = GroupPath::root();
        s.create_dataset(&root, "data", Datatype::F64, &[2, 3]).unwrap();
        let v: Vec<f64> = (0..6).map(f64::from).collect();
        s.write_dataset(&root, "data", (&v).into()).unwrap();
        assert_eq!(s.read_dataset(&root, "data").unwrap().as_f64(), Some(v.as_slice()));
        assert_eq!(
            s.dataset_info(&root, "data").unwrap(),
            DatasetInfo {
                datatype: Datatype::F64,
                shape: vec![2, 3]
            }
        );
        assert_eq!(s.element_count(), 6);
    }

    #[test]
    fn dataset_reopen_with_other_layout_fails() {
        let mut s = MemStore::new();
        let root = GroupPath::root();
        s.create_dataset(&root, "data", Datatype::F64, &[4]).unwrap();
        s.create_dataset(&root, "data", Datatype::F64, &[4]).unwrap();
        match s.create_dataset(&root, "data", Datatype::F32, &[4]) {
            Err(StoreError::DatasetExists { .. }) => {}
            other => panic!("expected DatasetExists, got {other:?}"),
        }
    }

    #[test]
    fn dataset_write_checks_type_then_length() {
        let mut s = MemStore::new();
        let root = GroupPath::root();
        s.create_dataset(&root, "data", Datatype::F64, &[4]).unwrap();
        match s.write_dataset(&root, "data", DataSlice::F32(&[0.0; 2])) {
            Err(StoreError::TypeMismatch { expected, found }) => {
                assert_eq!(expected, Datatype::F64);
                assert_eq!(found, Datatype::F32);
            }
            other => panic!("expected TypeMismatch, got {other:?}"),
        }
        match s.write_dataset(&root, "data", DataSlice::F64(&[0.0; 3])) {
            Err(StoreError::LengthMismatch { expected: 4, found: 3 }) => {}
            other => panic!("expected LengthMismatch, got {other:?}"),
        }
    }

    #[test]
    fn removal_keeps_the_order_of_the_rest() {
        let mut s = MemStore::new();
        let root = GroupPath::root();
        for (i, name) in ["a", "b", "c"].into_iter().enumerate() {
            s.set_attribute(&root, name, AttrValue::Int(i as i64)).unwrap();
        }
        assert!(s.remove_attribute(&root, "b").unwrap());
        assert!(!s.remove_attribute(&root, "b").unwrap());
        assert!(!s.has_attribute(&root, "b"));
        let kept: Vec<&str> = s.node(0).attributes.keys().map(String::as_str).collect();
        assert_eq!(kept, ["a", "c"]);

        s.create_dataset(&root, "data", Datatype::I32, &[3]).unwrap();
        assert!(s.remove_dataset(&root, "data").unwrap());
        assert!(!s.has_dataset(&root, "data"));
        assert_eq!(s.element_count(), 0);
        s.create_dataset(&root, "data", Datatype::F64, &[2]).unwrap();
        assert_eq!(s.dataset_info(&root, "data").unwrap().datatype, Datatype::F64);
    }

    #[test]
    fn removal_from_a_missing_group_fails() {
        let mut s = MemStore::new();
        match s.remove_dataset(&p("/nowhere"), "data") {
            Err(StoreError::NoSuchGroup { path }) => assert_eq!(path, "/nowhere"),
            other => panic!("expected NoSuchGroup, got {other:?}"),
        }
    }
}
