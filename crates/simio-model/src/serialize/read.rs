//! Two-phase read.
//!
//! Phase 1 walks the store along the layout and stages the group tree,
//! checking every `type` tag and `name` attribute. Phase 2 re-creates the
//! entities through the ordinary factories in dependency order, resolving
//! each stored reference path against the entities created so far. Either
//! phase failing discards everything.

use std::collections::HashMap;

use indexmap::IndexMap;
use simio_core::{EntityKind, TensorShape};
use simio_store::{AttrValue, GroupPath, Storage};
use tracing::{debug, trace, warn};

use super::layout::{self, decode_boxes, decode_symmetry};
use crate::config::ReadConfig;
use crate::entity::Value;
use crate::error::SerializeError;
use crate::id::{DiscreteFieldBlockId, Entity, FromEntity, TensorComponentId};
use crate::project::Project;

/// Read a project with default options.
pub fn read_project(storage: &dyn Storage) -> Result<Project, SerializeError> {
    read_project_with(storage, &ReadConfig::default())
}

/// Read a project from the root group of `storage`.
///
/// Returns the project only if every group was understood and every
/// reference resolved.
pub fn read_project_with(
    storage: &dyn Storage,
    config: &ReadConfig,
) -> Result<Project, SerializeError> {
    let root = GroupPath::root();
    let version = Attrs::new(storage, &root).int(layout::FORMAT_VERSION)?;
    if version != layout::LAYOUT_VERSION {
        return Err(SerializeError::UnsupportedFormat { found: version });
    }
    let staged = stage(storage, config, root, EntityKind::Project)?;
    debug!(project = %staged.name, "reading project");

    let mut loader = Loader {
        storage,
        project: Project::new(staged.name.clone()),
        entities: HashMap::new(),
    };
    loader.load(&staged)?;
    debug!(
        project = %staged.name,
        entities = loader.project.entity_count(),
        "project read"
    );
    Ok(loader.project)
}

// ── Phase 1: staging ────────────────────────────────────────────

/// One group of the file, with its known child collections.
struct Staged {
    path: GroupPath,
    name: String,
    children: IndexMap<&'static str, Vec<Staged>>,
}

impl Staged {
    fn members(&self, group: &str) -> &[Staged] {
        self.children.get(group).map(Vec::as_slice).unwrap_or(&[])
    }
}

fn stage(
    storage: &dyn Storage,
    config: &ReadConfig,
    path: GroupPath,
    kind: EntityKind,
) -> Result<Staged, SerializeError> {
    let attrs = Attrs::new(storage, &path);
    let found = attrs.string(layout::TYPE)?;
    if found != kind.tag() {
        return Err(SerializeError::UnexpectedType {
            path: path.to_string(),
            expected: kind,
            found,
        });
    }
    let name = attrs.string(layout::NAME)?;
    if let Some(group_name) = path.name() {
        if group_name != name {
            return Err(attrs.invalid(
                layout::NAME,
                format!("'{name}' does not match group name '{group_name}'"),
            ));
        }
    }

    let mut children = IndexMap::new();
    for group in storage.groups(&path)? {
        let collection_path = path.child(&group);
        let Some(collection) = layout::collection(kind, &group) else {
            if config.ignore_unknown_groups {
                warn!(path = %collection_path, "ignoring unknown group");
                continue;
            }
            return Err(SerializeError::UnknownGroup {
                path: collection_path.to_string(),
            });
        };
        if collection.kind == EntityKind::DiscreteField && !config.discrete_fields {
            continue;
        }
        let mut members = Vec::new();
        for member in storage.groups(&collection_path)? {
            members.push(stage(
                storage,
                config,
                collection_path.child(&member),
                collection.kind,
            )?);
        }
        children.insert(collection.group, members);
    }
    Ok(Staged {
        path,
        name,
        children,
    })
}

// ── Attribute access ────────────────────────────────────────────

/// Typed attribute reads on one group, mapping failures to
/// [`SerializeError`]s that name the group and attribute.
struct Attrs<'a> {
    storage: &'a dyn Storage,
    path: &'a GroupPath,
}

impl<'a> Attrs<'a> {
    fn new(storage: &'a dyn Storage, path: &'a GroupPath) -> Self {
        Self { storage, path }
    }

    fn has(&self, name: &str) -> bool {
        self.storage.has_attribute(self.path, name)
    }

    fn invalid(&self, name: &str, reason: impl Into<String>) -> SerializeError {
        SerializeError::InvalidAttribute {
            path: self.path.to_string(),
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    fn get(&self, name: &str) -> Result<AttrValue, SerializeError> {
        if !self.has(name) {
            return Err(SerializeError::MissingAttribute {
                path: self.path.to_string(),
                name: name.to_string(),
            });
        }
        Ok(self.storage.attribute(self.path, name)?)
    }

    fn typed<T>(
        &self,
        name: &str,
        expected: &str,
        extract: impl FnOnce(&AttrValue) -> Option<T>,
    ) -> Result<T, SerializeError> {
        let value = self.get(name)?;
        extract(&value).ok_or_else(|| {
            self.invalid(name, format!("expected {expected}, found {}", value.type_name()))
        })
    }

    fn int(&self, name: &str) -> Result<i64, SerializeError> {
        self.typed(name, "int", AttrValue::as_int)
    }

    fn count(&self, name: &str) -> Result<usize, SerializeError> {
        let v = self.int(name)?;
        usize::try_from(v).map_err(|_| self.invalid(name, format!("{v} is negative")))
    }

    fn float(&self, name: &str) -> Result<f64, SerializeError> {
        self.typed(name, "float", AttrValue::as_float)
    }

    fn string(&self, name: &str) -> Result<String, SerializeError> {
        self.typed(name, "string", |v| v.as_str().map(str::to_string))
    }

    fn ints(&self, name: &str) -> Result<Vec<i64>, SerializeError> {
        self.typed(name, "int array", |v| v.as_int_array().map(<[i64]>::to_vec))
    }

    fn floats(&self, name: &str) -> Result<Vec<f64>, SerializeError> {
        self.typed(name, "float array", |v| v.as_float_array().map(<[f64]>::to_vec))
    }

    fn strings(&self, name: &str) -> Result<Vec<String>, SerializeError> {
        self.typed(name, "string array", |v| v.as_str_array().map(<[String]>::to_vec))
    }
}

// ── Phase 2: re-creation ────────────────────────────────────────

struct Loader<'a> {
    storage: &'a dyn Storage,
    project: Project,
    /// Absolute group path of every entity created so far.
    entities: HashMap<String, Entity>,
}

impl<'a> Loader<'a> {
    fn attrs<'s>(&self, staged: &'s Staged) -> Attrs<'s>
    where
        'a: 's,
    {
        Attrs::new(self.storage, &staged.path)
    }

    fn register(&mut self, staged: &Staged, entity: impl Into<Entity>) {
        let entity = entity.into();
        trace!(path = %staged.path, kind = entity.kind().tag(), "entity read");
        self.entities.insert(staged.path.to_string(), entity);
    }

    fn resolve<I: FromEntity>(
        &self,
        staged: &Staged,
        attribute: &str,
        target: &str,
    ) -> Result<I, SerializeError> {
        self.entities
            .get(target)
            .copied()
            .and_then(I::from_entity)
            .ok_or_else(|| SerializeError::BrokenReference {
                path: staged.path.to_string(),
                attribute: attribute.to_string(),
                target: target.to_string(),
            })
    }

    /// Resolve the reference stored in `attribute`.
    fn reference<I: FromEntity>(
        &self,
        staged: &Staged,
        attribute: &str,
    ) -> Result<I, SerializeError> {
        let target = self.attrs(staged).string(attribute)?;
        self.resolve(staged, attribute, &target)
    }

    fn load(&mut self, root: &Staged) -> Result<(), SerializeError> {
        for p in root.members(layout::PARAMETERS) {
            self.load_parameter(p)?;
        }
        for c in root.members(layout::CONFIGURATIONS) {
            self.load_configuration(c)?;
        }
        for t in root.members(layout::TENSOR_TYPES) {
            self.load_tensor_type(t)?;
        }
        for m in root.members(layout::MANIFOLDS) {
            self.load_manifold(m)?;
        }
        for t in root.members(layout::TANGENT_SPACES) {
            self.load_tangent_space(t)?;
        }
        for f in root.members(layout::FIELDS) {
            self.load_field(f)?;
        }
        for c in root.members(layout::COORDINATE_SYSTEMS) {
            self.load_coordinate_system(c)?;
        }
        Ok(())
    }

    fn load_parameter(&mut self, staged: &Staged) -> Result<(), SerializeError> {
        let id = self.project.create_parameter(&staged.name)?;
        self.register(staged, id);
        for v in staged.members(layout::PARAMETER_VALUES) {
            let attrs = self.attrs(v);
            let value = if attrs.has(layout::VALUE) {
                match attrs.get(layout::VALUE)? {
                    AttrValue::Int(i) => Value::Int(i),
                    AttrValue::Float(x) => Value::Float(x),
                    AttrValue::Str(s) => Value::Str(s),
                    other => {
                        return Err(attrs.invalid(
                            layout::VALUE,
                            format!("unsupported value type {}", other.type_name()),
                        ))
                    }
                }
            } else {
                Value::None
            };
            let vid = self.project.create_parameter_value(id, &v.name, value)?;
            self.register(v, vid);
        }
        Ok(())
    }

    fn load_configuration(&mut self, staged: &Staged) -> Result<(), SerializeError> {
        let id = self.project.create_configuration(&staged.name)?;
        self.register(staged, id);
        let values = self.attrs(staged).strings(layout::PARAMETER_VALUES)?;
        for target in &values {
            let value = self.resolve(staged, layout::PARAMETER_VALUES, target)?;
            self.project.add_parameter_value(id, value)?;
        }
        Ok(())
    }

    /// Re-derive the component ordering and require the stored components
    /// to match it exactly.
    fn load_tensor_type(&mut self, staged: &Staged) -> Result<(), SerializeError> {
        let attrs = self.attrs(staged);
        let dimension = attrs.count(layout::DIMENSION)?;
        let rank = attrs.count(layout::RANK)?;
        let symmetries = attrs
            .strings(layout::SYMMETRIES)?
            .iter()
            .map(|s| {
                decode_symmetry(s)
                    .ok_or_else(|| attrs.invalid(layout::SYMMETRIES, format!("bad symmetry '{s}'")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let shape = TensorShape::new(dimension, rank, symmetries)
            .map_err(|e| attrs.invalid(layout::SYMMETRIES, e.to_string()))?;

        let id = self.project.create_tensor_type(&staged.name, shape)?;
        self.register(staged, id);

        let tt = self.project.tensor_type(id)?;
        let derived: Vec<_> = tt
            .components()
            .enumerate()
            .map(|(i, (name, cid))| {
                let tuple = tt.shape().component(i).map(<[usize]>::to_vec).unwrap_or_default();
                (name.to_string(), cid, tuple)
            })
            .collect();
        let stored = staged.members(layout::TENSOR_COMPONENTS);
        let inconsistent = |reason: String| SerializeError::InconsistentTensorType {
            path: staged.path.to_string(),
            reason,
        };
        if stored.len() != derived.len() {
            return Err(inconsistent(format!(
                "{} components stored, {} derived",
                stored.len(),
                derived.len()
            )));
        }
        for (i, (c, (name, cid, tuple))) in stored.iter().zip(derived).enumerate() {
            if c.name != name {
                return Err(inconsistent(format!(
                    "component {i} is '{}', expected '{name}'",
                    c.name
                )));
            }
            let attrs = self.attrs(c);
            if attrs.count(layout::STORAGE_INDEX)? != i {
                return Err(inconsistent(format!("component '{name}' has the wrong storage index")));
            }
            let stored_tuple = attrs.ints(layout::INDEX_VALUES)?;
            if !stored_tuple.iter().map(|&v| v as usize).eq(tuple.iter().copied()) {
                return Err(inconsistent(format!(
                    "component '{name}' has index values {stored_tuple:?}, expected {tuple:?}"
                )));
            }
            self.register(c, cid);
        }
        Ok(())
    }

    fn load_manifold(&mut self, staged: &Staged) -> Result<(), SerializeError> {
        let configuration = self.reference(staged, layout::CONFIGURATION)?;
        let dimension = self.attrs(staged).count(layout::DIMENSION)?;
        let id = self
            .project
            .create_manifold(&staged.name, configuration, dimension)?;
        self.register(staged, id);

        for d in staged.members(layout::DISCRETIZATIONS) {
            let configuration = self.reference(d, layout::CONFIGURATION)?;
            let did = self.project.create_discretization(id, &d.name, configuration)?;
            self.register(d, did);
            for b in d.members(layout::DISCRETIZATION_BLOCKS) {
                let attrs = self.attrs(b);
                let offset = attrs.ints(layout::OFFSET)?;
                let shape = attrs.ints(layout::SHAPE)?;
                let active = if attrs.has(layout::ACTIVE) {
                    let flat = attrs.ints(layout::ACTIVE)?;
                    Some(decode_boxes(&flat, offset.len()).ok_or_else(|| {
                        attrs.invalid(layout::ACTIVE, "not a list of boxes of the block's dimension")
                    })?)
                } else {
                    None
                };
                let bid = self
                    .project
                    .create_discretization_block(did, &b.name, &offset, &shape)?;
                if let Some(boxes) = active {
                    self.project.set_active_region(bid, boxes)?;
                }
                self.register(b, bid);
            }
        }

        for s in staged.members(layout::SUBDISCRETIZATIONS) {
            let parent = self.reference(s, layout::PARENT_DISCRETIZATION)?;
            let child = self.reference(s, layout::CHILD_DISCRETIZATION)?;
            let attrs = self.attrs(s);
            let factor = attrs.floats(layout::FACTOR)?;
            let offset = attrs.floats(layout::OFFSET)?;
            let sid = self
                .project
                .create_subdiscretization(id, &s.name, parent, child, &factor, &offset)?;
            self.register(s, sid);
        }
        Ok(())
    }

    fn load_tangent_space(&mut self, staged: &Staged) -> Result<(), SerializeError> {
        let configuration = self.reference(staged, layout::CONFIGURATION)?;
        let dimension = self.attrs(staged).count(layout::DIMENSION)?;
        let id = self
            .project
            .create_tangent_space(&staged.name, configuration, dimension)?;
        self.register(staged, id);
        for b in staged.members(layout::BASES) {
            let configuration = self.reference(b, layout::CONFIGURATION)?;
            let bid = self.project.create_basis(id, &b.name, configuration)?;
            self.register(b, bid);
            for v in b.members(layout::BASIS_VECTORS) {
                let direction = self.attrs(v).count(layout::DIRECTION)?;
                let vid = self.project.create_basis_vector(bid, &v.name, direction)?;
                self.register(v, vid);
            }
        }
        Ok(())
    }

    fn load_field(&mut self, staged: &Staged) -> Result<(), SerializeError> {
        let configuration = self.reference(staged, layout::CONFIGURATION)?;
        let manifold = self.reference(staged, layout::MANIFOLD)?;
        let tangent_space = self.reference(staged, layout::TANGENT_SPACE)?;
        let tensor_type = self.reference(staged, layout::TENSOR_TYPE)?;
        let id = self.project.create_field(
            &staged.name,
            configuration,
            manifold,
            tangent_space,
            tensor_type,
        )?;
        self.register(staged, id);

        for df in staged.members(layout::DISCRETE_FIELDS) {
            let configuration = self.reference(df, layout::CONFIGURATION)?;
            let discretization = self.reference(df, layout::DISCRETIZATION)?;
            let basis = self.reference(df, layout::BASIS)?;
            let dfid = self.project.create_discrete_field(
                id,
                &df.name,
                configuration,
                discretization,
                basis,
            )?;
            self.register(df, dfid);
            for dfb in df.members(layout::DISCRETE_FIELD_BLOCKS) {
                let block = self.reference(dfb, layout::DISCRETIZATION_BLOCK)?;
                let dfbid = self
                    .project
                    .create_discrete_field_block(dfid, &dfb.name, block)?;
                self.register(dfb, dfbid);
                for c in dfb.members(layout::COMPONENTS) {
                    self.load_component(dfbid, c)?;
                }
            }
        }
        Ok(())
    }

    fn load_component(
        &mut self,
        dfb: DiscreteFieldBlockId,
        staged: &Staged,
    ) -> Result<(), SerializeError> {
        let storage_index = self.attrs(staged).count(layout::STORAGE_INDEX)?;
        let tensor_component: TensorComponentId =
            self.reference(staged, layout::TENSOR_COMPONENT)?;
        let id = self
            .project
            .create_component(dfb, &staged.name, storage_index)?;
        if self.project.component(id)?.tensor_component() != tensor_component {
            return Err(self.attrs(staged).invalid(
                layout::TENSOR_COMPONENT,
                format!("does not name tensor component {storage_index} of the field's type"),
            ));
        }

        let attrs = self.attrs(staged);
        if self.storage.has_dataset(&staged.path, layout::DATA) {
            let info = self.storage.dataset_info(&staged.path, layout::DATA)?;
            let shape: Vec<i64> = info.shape.iter().map(|&s| s as i64).collect();
            self.project.set_data(id, info.datatype, &shape)?;
        } else if attrs.has(layout::RANGE_ORIGIN) {
            let origin = attrs.float(layout::RANGE_ORIGIN)?;
            let delta = attrs.floats(layout::RANGE_DELTA)?;
            self.project.set_data_range(id, origin, &delta)?;
        }
        self.register(staged, id);
        Ok(())
    }

    fn load_coordinate_system(&mut self, staged: &Staged) -> Result<(), SerializeError> {
        let configuration = self.reference(staged, layout::CONFIGURATION)?;
        let manifold = self.reference(staged, layout::MANIFOLD)?;
        let id = self
            .project
            .create_coordinate_system(&staged.name, configuration, manifold)?;
        self.register(staged, id);
        for f in staged.members(layout::COORDINATE_FIELDS) {
            let direction = self.attrs(f).count(layout::DIRECTION)?;
            let field = self.reference(f, layout::FIELD)?;
            let fid = self
                .project
                .create_coordinate_field(id, &f.name, direction, field)?;
            self.register(f, fid);
        }
        Ok(())
    }
}
