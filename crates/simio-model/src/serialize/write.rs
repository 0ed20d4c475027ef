//! Full-graph write.

use simio_store::{AttrValue, GroupPath, Storage};
use tracing::{debug, trace};

use super::layout::{self, encode_boxes, encode_symmetry};
use super::{children, Node};
use crate::config::WriteConfig;
use crate::data::dataset_shape;
use crate::entity::{ComponentData, Value};
use crate::error::{ModelError, SerializeError};
use crate::id::{ComponentId, Entity};
use crate::project::Project;

struct Writer<'a> {
    project: &'a Project,
    storage: &'a mut dyn Storage,
    config: &'a WriteConfig,
    written: usize,
}

impl Writer<'_> {
    fn set(&mut self, path: &GroupPath, name: &str, value: AttrValue) -> Result<(), SerializeError> {
        self.storage.set_attribute(path, name, value)?;
        Ok(())
    }

    /// Create a component's empty dataset; values go through
    /// [`Project::write_data`].
    ///
    /// A `data` dataset left by an earlier write is kept only while it still
    /// matches the component's declared datatype and shape.
    fn write_dataset(&mut self, path: &GroupPath, id: ComponentId) -> Result<(), SerializeError> {
        let declared = match self.project.component(id)?.data() {
            ComponentData::Dataset { datatype, shape } => Some((*datatype, dataset_shape(shape)?)),
            _ => None,
        };
        if self.storage.has_dataset(path, layout::DATA) {
            let info = self.storage.dataset_info(path, layout::DATA)?;
            let current = declared
                .as_ref()
                .is_some_and(|(datatype, shape)| info.datatype == *datatype && info.shape == *shape);
            if !current {
                trace!(path = %path, "removing stale dataset");
                self.storage.remove_dataset(path, layout::DATA)?;
            }
        }
        if let Some((datatype, shape)) = declared {
            if self.config.datasets {
                self.storage
                    .create_dataset(path, layout::DATA, datatype, &shape)?;
            }
        }
        Ok(())
    }

    /// Group, header, attributes, then every collection (even empty) with
    /// its children, depth-first in insertion order.
    fn write_node(&mut self, path: &GroupPath, node: Node) -> Result<(), SerializeError> {
        let project = self.project;
        let kind = node.kind();
        trace!(path = %path, kind = kind.tag(), "writing entity");
        self.storage.create_group(path)?;
        self.set(path, layout::TYPE, kind.tag().into())?;
        match node {
            Node::Root => {
                self.set(path, layout::NAME, project.name().into())?;
                self.set(
                    path,
                    layout::FORMAT_VERSION,
                    AttrValue::Int(layout::LAYOUT_VERSION),
                )?;
            }
            Node::Entity(entity) => {
                self.set(path, layout::NAME, project.entity_name(entity)?.into())?;
                let attrs = entity_attributes(project, entity)?;
                for &optional in layout::optional_attributes(kind) {
                    if !attrs.iter().any(|(name, _)| *name == optional) {
                        self.storage.remove_attribute(path, optional)?;
                    }
                }
                for (name, value) in attrs {
                    self.set(path, name, value)?;
                }
                if let Entity::DiscreteFieldBlockComponent(id) = entity {
                    self.write_dataset(path, id)?;
                }
                self.written += 1;
            }
        }
        for collection in layout::collections(kind) {
            let group = path.child(collection.group);
            self.storage.create_group(&group)?;
            for child in children(project, node, collection.group)? {
                let name = project.entity_name(child)?;
                self.write_node(&group.child(name), Node::Entity(child))?;
            }
        }
        Ok(())
    }
}

/// Attributes of an entity beyond `type` and `name`, in write order.
/// References are absolute paths of their targets.
pub(crate) fn entity_attributes(
    p: &Project,
    entity: Entity,
) -> Result<Vec<(&'static str, AttrValue)>, ModelError> {
    let path = |target: Entity| p.path_of(target).map(|g| AttrValue::Str(g.to_string()));
    let int = |v: usize| AttrValue::Int(v as i64);
    let attrs = match entity {
        Entity::Configuration(id) => {
            let paths = p
                .configuration(id)?
                .parameter_values()
                .iter()
                .map(|&v| p.path_of(v).map(|g| g.to_string()))
                .collect::<Result<Vec<_>, _>>()?;
            vec![(layout::PARAMETER_VALUES, AttrValue::StrArray(paths))]
        }
        Entity::Parameter(_) => Vec::new(),
        Entity::ParameterValue(id) => match p.parameter_value(id)?.value() {
            Value::None => Vec::new(),
            Value::Int(v) => vec![(layout::VALUE, AttrValue::Int(*v))],
            Value::Float(v) => vec![(layout::VALUE, AttrValue::Float(*v))],
            Value::Str(v) => vec![(layout::VALUE, AttrValue::Str(v.clone()))],
        },
        Entity::TensorType(id) => {
            let shape = p.tensor_type(id)?.shape();
            let symmetries = shape.symmetries().iter().map(encode_symmetry).collect();
            vec![
                (layout::DIMENSION, int(shape.dimension())),
                (layout::RANK, int(shape.rank())),
                (layout::SYMMETRIES, AttrValue::StrArray(symmetries)),
            ]
        }
        Entity::TensorComponent(id) => {
            let c = p.tensor_component(id)?;
            let tuple = p
                .tensor_type(c.tensor_type())?
                .shape()
                .component(c.storage_index())
                .map(|t| t.iter().map(|&i| i as i64).collect())
                .unwrap_or_default();
            vec![
                (layout::STORAGE_INDEX, int(c.storage_index())),
                (layout::INDEX_VALUES, AttrValue::IntArray(tuple)),
            ]
        }
        Entity::Manifold(id) => {
            let m = p.manifold(id)?;
            vec![
                (layout::CONFIGURATION, path(m.configuration().into())?),
                (layout::DIMENSION, int(m.dimension())),
            ]
        }
        Entity::TangentSpace(id) => {
            let t = p.tangent_space(id)?;
            vec![
                (layout::CONFIGURATION, path(t.configuration().into())?),
                (layout::DIMENSION, int(t.dimension())),
            ]
        }
        Entity::Discretization(id) => {
            let d = p.discretization(id)?;
            vec![(layout::CONFIGURATION, path(d.configuration().into())?)]
        }
        Entity::DiscretizationBlock(id) => {
            let b = p.discretization_block(id)?;
            let mut attrs = vec![
                (layout::OFFSET, AttrValue::IntArray(b.offset().to_vec())),
                (layout::SHAPE, AttrValue::IntArray(b.shape().to_vec())),
            ];
            if let Some(active) = b.active() {
                attrs.push((layout::ACTIVE, AttrValue::IntArray(encode_boxes(active))));
            }
            attrs
        }
        Entity::SubDiscretization(id) => {
            let s = p.subdiscretization(id)?;
            vec![
                (layout::PARENT_DISCRETIZATION, path(s.parent().into())?),
                (layout::CHILD_DISCRETIZATION, path(s.child().into())?),
                (layout::FACTOR, AttrValue::FloatArray(s.factor().to_vec())),
                (layout::OFFSET, AttrValue::FloatArray(s.offset().to_vec())),
            ]
        }
        Entity::Basis(id) => {
            let b = p.basis(id)?;
            vec![(layout::CONFIGURATION, path(b.configuration().into())?)]
        }
        Entity::BasisVector(id) => {
            vec![(layout::DIRECTION, int(p.basis_vector(id)?.direction()))]
        }
        Entity::CoordinateSystem(id) => {
            let c = p.coordinate_system(id)?;
            vec![
                (layout::CONFIGURATION, path(c.configuration().into())?),
                (layout::MANIFOLD, path(c.manifold().into())?),
            ]
        }
        Entity::CoordinateField(id) => {
            let c = p.coordinate_field(id)?;
            vec![
                (layout::DIRECTION, int(c.direction())),
                (layout::FIELD, path(c.field().into())?),
            ]
        }
        Entity::Field(id) => {
            let f = p.field(id)?;
            vec![
                (layout::CONFIGURATION, path(f.configuration().into())?),
                (layout::MANIFOLD, path(f.manifold().into())?),
                (layout::TANGENT_SPACE, path(f.tangent_space().into())?),
                (layout::TENSOR_TYPE, path(f.tensor_type().into())?),
            ]
        }
        Entity::DiscreteField(id) => {
            let d = p.discrete_field(id)?;
            vec![
                (layout::CONFIGURATION, path(d.configuration().into())?),
                (layout::DISCRETIZATION, path(d.discretization().into())?),
                (layout::BASIS, path(d.basis().into())?),
            ]
        }
        Entity::DiscreteFieldBlock(id) => {
            let b = p.discrete_field_block(id)?;
            vec![(layout::DISCRETIZATION_BLOCK, path(b.block().into())?)]
        }
        Entity::DiscreteFieldBlockComponent(id) => {
            let c = p.component(id)?;
            let mut attrs = vec![
                (layout::STORAGE_INDEX, int(c.storage_index())),
                (layout::TENSOR_COMPONENT, path(c.tensor_component().into())?),
            ];
            if let ComponentData::Range { origin, delta } = c.data() {
                attrs.push((layout::RANGE_ORIGIN, AttrValue::Float(*origin)));
                attrs.push((layout::RANGE_DELTA, AttrValue::FloatArray(delta.clone())));
            }
            attrs
        }
    };
    Ok(attrs)
}

impl Project {
    /// Write the whole graph to `storage` with default options.
    pub fn write(&self, storage: &mut dyn Storage) -> Result<(), SerializeError> {
        self.write_with(storage, &WriteConfig::default())
    }

    /// Write the whole graph to `storage`.
    ///
    /// Groups are created-or-opened, so re-writing an unmodified graph into
    /// the same store changes nothing, and writing it into a fresh store
    /// produces the same tree. Re-writing a modified graph drops the
    /// optional attributes and datasets its entities no longer carry. There is no rollback: after an error the
    /// store holds an incomplete graph.
    pub fn write_with(
        &self,
        storage: &mut dyn Storage,
        config: &WriteConfig,
    ) -> Result<(), SerializeError> {
        debug!(project = %self.name(), entities = self.entity_count(), "writing project");
        let mut writer = Writer {
            project: self,
            storage,
            config,
            written: 0,
        };
        writer.write_node(&GroupPath::root(), Node::Root)?;
        debug!(project = %self.name(), entities = writer.written, "project written");
        Ok(())
    }
}
