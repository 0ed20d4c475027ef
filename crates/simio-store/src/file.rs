//! File-backed store.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::backend::Storage;
use crate::codec::{decode_store, encode_store};
use crate::datatype::{AttrValue, DataBuffer, DataSlice, DatasetInfo, Datatype};
use crate::error::StoreError;
use crate::memory::MemStore;
use crate::path::GroupPath;

/// A [`MemStore`] bound to a file on disk.
///
/// The whole tree is held in memory; [`flush`](Self::flush) rewrites the
/// file from scratch. Nothing reaches disk until then.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    store: MemStore,
}

impl FileStore {
    /// Start a new, empty store that will be written to `path`.
    ///
    /// The file is created (or truncated) immediately so that an
    /// unwritable location is reported up front.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let store = MemStore::new();
        let mut fs = Self { path, store };
        fs.flush()?;
        Ok(fs)
    }

    /// Load an existing store file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        let len = file.metadata().map(|m| m.len()).unwrap_or(0);
        let mut reader = BufReader::new(file);
        let store = decode_store(&mut reader)?;
        debug!(
            path = %path.display(),
            bytes = len,
            groups = store.group_count(),
            "opened store file"
        );
        Ok(Self { path, store })
    }

    /// Write the current tree to the backing file.
    pub fn flush(&mut self) -> Result<(), StoreError> {
        let file = File::create(&self.path)?;
        let mut writer = BufWriter::new(file);
        encode_store(&mut writer, &self.store)?;
        writer.flush()?;
        debug!(
            path = %self.path.display(),
            groups = self.store.group_count(),
            "flushed store file"
        );
        Ok(())
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The in-memory tree.
    pub fn store(&self) -> &MemStore {
        &self.store
    }

    /// Detach from the file, keeping the in-memory tree.
    pub fn into_inner(self) -> MemStore {
        self.store
    }
}

impl Storage for FileStore {
    fn create_group(&mut self, path: &GroupPath) -> Result<(), StoreError> {
        self.store.create_group(path)
    }

    fn has_group(&self, path: &GroupPath) -> bool {
        self.store.has_group(path)
    }

    fn groups(&self, path: &GroupPath) -> Result<Vec<String>, StoreError> {
        self.store.groups(path)
    }

    fn set_attribute(
        &mut self,
        path: &GroupPath,
        name: &str,
        value: AttrValue,
    ) -> Result<(), StoreError> {
        self.store.set_attribute(path, name, value)
    }

    fn attribute(&self, path: &GroupPath, name: &str) -> Result<AttrValue, StoreError> {
        self.store.attribute(path, name)
    }

    fn has_attribute(&self, path: &GroupPath, name: &str) -> bool {
        self.store.has_attribute(path, name)
    }

    fn remove_attribute(&mut self, path: &GroupPath, name: &str) -> Result<bool, StoreError> {
        self.store.remove_attribute(path, name)
    }

    fn create_dataset(
        &mut self,
        path: &GroupPath,
        name: &str,
        datatype: Datatype,
        shape: &[u64],
    ) -> Result<(), StoreError> {
        self.store.create_dataset(path, name, datatype, shape)
    }

    fn has_dataset(&self, path: &GroupPath, name: &str) -> bool {
        self.store.has_dataset(path, name)
    }

    fn remove_dataset(&mut self, path: &GroupPath, name: &str) -> Result<bool, StoreError> {
        self.store.remove_dataset(path, name)
    }

    fn dataset_info(&self, path: &GroupPath, name: &str) -> Result<DatasetInfo, StoreError> {
        self.store.dataset_info(path, name)
    }

    fn write_dataset(
        &mut self,
        path: &GroupPath,
        name: &str,
        data: DataSlice<'_>,
    ) -> Result<(), StoreError> {
        self.store.write_dataset(path, name, data)
    }

    fn read_dataset(&self, path: &GroupPath, name: &str) -> Result<DataBuffer, StoreError> {
        self.store.read_dataset(path, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flush_then_open_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("out.sims");
        let mut fs = FileStore::create(&file).unwrap();
        let g = GroupPath::root().child("manifolds");
        fs.create_group(&g).unwrap();
        fs.set_attribute(&g, "dimension", AttrValue::Int(3)).unwrap();
        fs.create_dataset(&g, "data", Datatype::I32, &[3]).unwrap();
        fs.write_dataset(&g, "data", DataSlice::I32(&[7, 8, 9])).unwrap();
        fs.flush().unwrap();

        let back = FileStore::open(&file).unwrap();
        assert_eq!(back.path(), file.as_path());
        assert_eq!(back.attribute(&g, "dimension").unwrap(), AttrValue::Int(3));
        assert_eq!(
            back.read_dataset(&g, "data").unwrap().as_i32(),
            Some(&[7, 8, 9][..])
        );
        assert_eq!(back.into_inner(), *fs.store());
    }

    #[test]
    fn open_rejects_foreign_file() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"not a store").unwrap();
        tmp.flush().unwrap();
        match FileStore::open(tmp.path()) {
            Err(StoreError::InvalidMagic) => {}
            other => panic!("expected InvalidMagic, got {other:?}"),
        }
    }

    #[test]
    fn open_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        match FileStore::open(dir.path().join("absent.sims")) {
            Err(StoreError::Io(_)) => {}
            other => panic!("expected Io, got {other:?}"),
        }
    }
}
