//! Per-kind entity storage addressed by typed handles.

use std::marker::PhantomData;

use simio_core::ProjectId;

use crate::error::ModelError;
use crate::id::EntityId;

/// Append-only storage for one entity kind of one project.
///
/// Entities are never removed, so a handle stays valid for the lifetime of
/// the project that issued it.
#[derive(Debug)]
pub(crate) struct Arena<I, T> {
    project: ProjectId,
    items: Vec<T>,
    _id: PhantomData<fn() -> I>,
}

impl<I: EntityId, T> Arena<I, T> {
    pub(crate) fn new(project: ProjectId) -> Self {
        Self {
            project,
            items: Vec::new(),
            _id: PhantomData,
        }
    }

    fn check(&self, id: I) -> Result<usize, ModelError> {
        if id.project() == self.project && id.index() < self.items.len() {
            Ok(id.index())
        } else {
            Err(ModelError::DanglingReference {
                kind: I::KIND,
                handle: id.to_string(),
            })
        }
    }

    pub(crate) fn get(&self, id: I) -> Result<&T, ModelError> {
        let i = self.check(id)?;
        Ok(&self.items[i])
    }

    pub(crate) fn get_mut(&mut self, id: I) -> Result<&mut T, ModelError> {
        let i = self.check(id)?;
        Ok(&mut self.items[i])
    }

    /// Handle the next pushed entity will receive.
    pub(crate) fn next_id(&self) -> I {
        I::from_parts(self.project, self.items.len())
    }

    pub(crate) fn push(&mut self, item: T) -> I {
        let id = self.next_id();
        self.items.push(item);
        id
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::ManifoldId;

    #[test]
    fn foreign_handles_are_dangling() {
        let mut a: Arena<ManifoldId, &str> = Arena::new(ProjectId::next());
        let b: Arena<ManifoldId, &str> = Arena::new(ProjectId::next());
        let id = a.push("domain");
        assert_eq!(*a.get(id).unwrap(), "domain");
        match b.get(id) {
            Err(ModelError::DanglingReference { .. }) => {}
            other => panic!("expected DanglingReference, got {other:?}"),
        }
    }

    #[test]
    fn out_of_range_handle_is_dangling() {
        let p = ProjectId::next();
        let a: Arena<ManifoldId, ()> = Arena::new(p);
        assert!(a.get(ManifoldId::from_parts(p, 0)).is_err());
    }
}
