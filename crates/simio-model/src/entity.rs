//! Entity records stored in a project's arenas.
//!
//! Records are read-only outside the crate; every mutation goes through a
//! validating method on [`Project`](crate::Project).

use indexmap::IndexMap;

use simio_core::{IndexBox, IndexVec, TensorShape};
use simio_store::Datatype;

use crate::id::*;

/// Name-keyed child collection in insertion order.
pub type Children<I> = IndexMap<String, I>;

fn lookup<I: Copy>(children: &Children<I>, name: &str) -> Option<I> {
    children.get(name).copied()
}

fn entries<I: Copy>(children: &Children<I>) -> impl Iterator<Item = (&str, I)> + '_ {
    children.iter().map(|(k, &v)| (k.as_str(), v))
}

// ── Parameters and configurations ───────────────────────────────

/// A named parameter/version context.
#[derive(Clone, Debug)]
pub struct Configuration {
    pub(crate) name: String,
    pub(crate) parameter_values: Vec<ParameterValueId>,
    /// Entities created in this configuration, in creation order.
    pub(crate) members: Vec<Entity>,
}

impl Configuration {
    /// Configuration name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameter values selected by this configuration, in insertion order.
    pub fn parameter_values(&self) -> &[ParameterValueId] {
        &self.parameter_values
    }
}

/// A named simulation parameter.
#[derive(Clone, Debug)]
pub struct Parameter {
    pub(crate) name: String,
    pub(crate) values: Children<ParameterValueId>,
}

impl Parameter {
    /// Parameter name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up a value by name.
    pub fn value(&self, name: &str) -> Option<ParameterValueId> {
        lookup(&self.values, name)
    }

    /// All values in creation order.
    pub fn values(&self) -> impl Iterator<Item = (&str, ParameterValueId)> + '_ {
        entries(&self.values)
    }
}

/// Payload of a [`ParameterValue`].
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Named but untyped.
    None,
    /// An integer.
    Int(i64),
    /// A float.
    Float(f64),
    /// A string.
    Str(String),
}

/// One value a [`Parameter`] takes.
#[derive(Clone, Debug)]
pub struct ParameterValue {
    pub(crate) name: String,
    pub(crate) parameter: ParameterId,
    pub(crate) value: Value,
}

impl ParameterValue {
    /// Value name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Owning parameter.
    pub fn parameter(&self) -> ParameterId {
        self.parameter
    }

    /// The payload.
    pub fn value(&self) -> &Value {
        &self.value
    }
}

// ── Tensor types ────────────────────────────────────────────────

/// A named abstract tensor shape.
#[derive(Clone, Debug)]
pub struct TensorType {
    pub(crate) name: String,
    pub(crate) shape: TensorShape,
    pub(crate) components: Children<TensorComponentId>,
}

impl TensorType {
    /// Type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Dimension, rank, symmetries and component ordering.
    pub fn shape(&self) -> &TensorShape {
        &self.shape
    }

    /// Number of independent components.
    pub fn component_count(&self) -> usize {
        self.shape.component_count()
    }

    /// Look up a component by name.
    pub fn component(&self, name: &str) -> Option<TensorComponentId> {
        lookup(&self.components, name)
    }

    /// Components in storage-index order.
    pub fn components(&self) -> impl Iterator<Item = (&str, TensorComponentId)> + '_ {
        entries(&self.components)
    }
}

/// One independent component of a tensor type.
#[derive(Clone, Debug)]
pub struct TensorComponent {
    pub(crate) name: String,
    pub(crate) tensor_type: TensorTypeId,
    pub(crate) storage_index: usize,
}

impl TensorComponent {
    /// Component name, e.g. `01`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Owning tensor type.
    pub fn tensor_type(&self) -> TensorTypeId {
        self.tensor_type
    }

    /// Position in the canonical component ordering.
    pub fn storage_index(&self) -> usize {
        self.storage_index
    }
}

// ── Manifolds and discretizations ───────────────────────────────

/// An abstract space of fixed dimension.
#[derive(Clone, Debug)]
pub struct Manifold {
    pub(crate) name: String,
    pub(crate) configuration: ConfigurationId,
    pub(crate) dimension: usize,
    pub(crate) discretizations: Children<DiscretizationId>,
    pub(crate) subdiscretizations: Children<SubDiscretizationId>,
    pub(crate) fields: Vec<FieldId>,
    pub(crate) coordinate_systems: Vec<CoordinateSystemId>,
}

impl Manifold {
    /// Manifold name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Configuration the manifold belongs to.
    pub fn configuration(&self) -> ConfigurationId {
        self.configuration
    }

    /// Number of axes.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Look up a discretization by name.
    pub fn discretization(&self, name: &str) -> Option<DiscretizationId> {
        lookup(&self.discretizations, name)
    }

    /// Discretizations in creation order.
    pub fn discretizations(&self) -> impl Iterator<Item = (&str, DiscretizationId)> + '_ {
        entries(&self.discretizations)
    }

    /// Look up a subdiscretization by name.
    pub fn subdiscretization(&self, name: &str) -> Option<SubDiscretizationId> {
        lookup(&self.subdiscretizations, name)
    }

    /// Subdiscretizations in creation order.
    pub fn subdiscretizations(&self) -> impl Iterator<Item = (&str, SubDiscretizationId)> + '_ {
        entries(&self.subdiscretizations)
    }
}

/// A decomposition of a manifold into blocks.
#[derive(Clone, Debug)]
pub struct Discretization {
    pub(crate) name: String,
    pub(crate) manifold: ManifoldId,
    pub(crate) configuration: ConfigurationId,
    pub(crate) blocks: Children<DiscretizationBlockId>,
}

impl Discretization {
    /// Discretization name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Owning manifold.
    pub fn manifold(&self) -> ManifoldId {
        self.manifold
    }

    /// Configuration the discretization belongs to.
    pub fn configuration(&self) -> ConfigurationId {
        self.configuration
    }

    /// Look up a block by name.
    pub fn block(&self, name: &str) -> Option<DiscretizationBlockId> {
        lookup(&self.blocks, name)
    }

    /// Blocks in creation order.
    pub fn blocks(&self) -> impl Iterator<Item = (&str, DiscretizationBlockId)> + '_ {
        entries(&self.blocks)
    }
}

/// One region `[offset, offset + shape)` of a discretization.
#[derive(Clone, Debug)]
pub struct DiscretizationBlock {
    pub(crate) name: String,
    pub(crate) discretization: DiscretizationId,
    pub(crate) region: IndexBox,
    pub(crate) active: Option<Vec<IndexBox>>,
    pub(crate) discrete_field_blocks: Vec<DiscreteFieldBlockId>,
}

impl DiscretizationBlock {
    /// Block name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Owning discretization.
    pub fn discretization(&self) -> DiscretizationId {
        self.discretization
    }

    /// The block's box in global indices.
    pub fn region(&self) -> &IndexBox {
        &self.region
    }

    /// Lower corner of the box.
    pub fn offset(&self) -> &[i64] {
        self.region.offset()
    }

    /// Extent of the box.
    pub fn shape(&self) -> &[i64] {
        self.region.shape()
    }

    /// Boxes marking the valid points, if an active region was set.
    pub fn active(&self) -> Option<&[IndexBox]> {
        self.active.as_deref()
    }
}

/// Refinement relation `parent = factor * child + offset` between two
/// discretizations of one manifold.
#[derive(Clone, Debug)]
pub struct SubDiscretization {
    pub(crate) name: String,
    pub(crate) manifold: ManifoldId,
    pub(crate) parent: DiscretizationId,
    pub(crate) child: DiscretizationId,
    pub(crate) factor: Vec<f64>,
    pub(crate) offset: Vec<f64>,
}

impl SubDiscretization {
    /// Relation name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Owning manifold.
    pub fn manifold(&self) -> ManifoldId {
        self.manifold
    }

    /// The coarser discretization.
    pub fn parent(&self) -> DiscretizationId {
        self.parent
    }

    /// The finer discretization.
    pub fn child(&self) -> DiscretizationId {
        self.child
    }

    /// Per-axis scale.
    pub fn factor(&self) -> &[f64] {
        &self.factor
    }

    /// Per-axis shift.
    pub fn offset(&self) -> &[f64] {
        &self.offset
    }

    /// Map a child index to parent coordinates.
    pub fn child_to_parent(&self, child: &[f64]) -> Vec<f64> {
        child
            .iter()
            .zip(self.factor.iter().zip(&self.offset))
            .map(|(&c, (&f, &o))| f * c + o)
            .collect()
    }

    /// Map parent coordinates to a child index.
    pub fn parent_to_child(&self, parent: &[f64]) -> Vec<f64> {
        parent
            .iter()
            .zip(self.factor.iter().zip(&self.offset))
            .map(|(&p, (&f, &o))| (p - o) / f)
            .collect()
    }
}

// ── Tangent spaces and bases ────────────────────────────────────

/// The vector space of directions on a manifold.
#[derive(Clone, Debug)]
pub struct TangentSpace {
    pub(crate) name: String,
    pub(crate) configuration: ConfigurationId,
    pub(crate) dimension: usize,
    pub(crate) bases: Children<BasisId>,
}

impl TangentSpace {
    /// Tangent space name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Configuration the tangent space belongs to.
    pub fn configuration(&self) -> ConfigurationId {
        self.configuration
    }

    /// Number of directions.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Look up a basis by name.
    pub fn basis(&self, name: &str) -> Option<BasisId> {
        lookup(&self.bases, name)
    }

    /// Bases in creation order.
    pub fn bases(&self) -> impl Iterator<Item = (&str, BasisId)> + '_ {
        entries(&self.bases)
    }
}

/// A choice of basis vectors for a tangent space.
#[derive(Clone, Debug)]
pub struct Basis {
    pub(crate) name: String,
    pub(crate) tangent_space: TangentSpaceId,
    pub(crate) configuration: ConfigurationId,
    pub(crate) vectors: Children<BasisVectorId>,
}

impl Basis {
    /// Basis name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Owning tangent space.
    pub fn tangent_space(&self) -> TangentSpaceId {
        self.tangent_space
    }

    /// Configuration the basis belongs to.
    pub fn configuration(&self) -> ConfigurationId {
        self.configuration
    }

    /// Look up a basis vector by name.
    pub fn vector(&self, name: &str) -> Option<BasisVectorId> {
        lookup(&self.vectors, name)
    }

    /// Basis vectors in creation order.
    pub fn vectors(&self) -> impl Iterator<Item = (&str, BasisVectorId)> + '_ {
        entries(&self.vectors)
    }

    /// Number of basis vectors created so far.
    pub fn vector_count(&self) -> usize {
        self.vectors.len()
    }
}

/// One basis direction.
#[derive(Clone, Debug)]
pub struct BasisVector {
    pub(crate) name: String,
    pub(crate) basis: BasisId,
    pub(crate) direction: usize,
}

impl BasisVector {
    /// Vector name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Owning basis.
    pub fn basis(&self) -> BasisId {
        self.basis
    }

    /// Direction index in `[0, dimension)`.
    pub fn direction(&self) -> usize {
        self.direction
    }
}

// ── Coordinate systems ──────────────────────────────────────────

/// Names a manifold's coordinate fields.
#[derive(Clone, Debug)]
pub struct CoordinateSystem {
    pub(crate) name: String,
    pub(crate) configuration: ConfigurationId,
    pub(crate) manifold: ManifoldId,
    pub(crate) fields: Children<CoordinateFieldId>,
}

impl CoordinateSystem {
    /// Coordinate system name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Configuration the coordinate system belongs to.
    pub fn configuration(&self) -> ConfigurationId {
        self.configuration
    }

    /// Manifold being coordinatized.
    pub fn manifold(&self) -> ManifoldId {
        self.manifold
    }

    /// Look up a coordinate field by name.
    pub fn coordinate_field(&self, name: &str) -> Option<CoordinateFieldId> {
        lookup(&self.fields, name)
    }

    /// Coordinate fields in creation order.
    pub fn coordinate_fields(&self) -> impl Iterator<Item = (&str, CoordinateFieldId)> + '_ {
        entries(&self.fields)
    }
}

/// Binds one coordinate direction to a field.
#[derive(Clone, Debug)]
pub struct CoordinateField {
    pub(crate) name: String,
    pub(crate) coordinate_system: CoordinateSystemId,
    pub(crate) direction: usize,
    pub(crate) field: FieldId,
}

impl CoordinateField {
    /// Coordinate field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Owning coordinate system.
    pub fn coordinate_system(&self) -> CoordinateSystemId {
        self.coordinate_system
    }

    /// Direction index in `[0, dimension)`.
    pub fn direction(&self) -> usize {
        self.direction
    }

    /// Field holding the coordinate values.
    pub fn field(&self) -> FieldId {
        self.field
    }
}

// ── Fields ──────────────────────────────────────────────────────

/// An abstract tensor-valued field over a manifold.
#[derive(Clone, Debug)]
pub struct Field {
    pub(crate) name: String,
    pub(crate) configuration: ConfigurationId,
    pub(crate) manifold: ManifoldId,
    pub(crate) tangent_space: TangentSpaceId,
    pub(crate) tensor_type: TensorTypeId,
    pub(crate) discrete_fields: Children<DiscreteFieldId>,
}

impl Field {
    /// Field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Configuration the field belongs to.
    pub fn configuration(&self) -> ConfigurationId {
        self.configuration
    }

    /// Domain of the field.
    pub fn manifold(&self) -> ManifoldId {
        self.manifold
    }

    /// Tangent space the tensor values live in.
    pub fn tangent_space(&self) -> TangentSpaceId {
        self.tangent_space
    }

    /// Shape of the field's values.
    pub fn tensor_type(&self) -> TensorTypeId {
        self.tensor_type
    }

    /// Look up a discrete field by name.
    pub fn discrete_field(&self, name: &str) -> Option<DiscreteFieldId> {
        lookup(&self.discrete_fields, name)
    }

    /// Discrete fields in creation order.
    pub fn discrete_fields(&self) -> impl Iterator<Item = (&str, DiscreteFieldId)> + '_ {
        entries(&self.discrete_fields)
    }
}

/// A field instantiated on one discretization and basis.
#[derive(Clone, Debug)]
pub struct DiscreteField {
    pub(crate) name: String,
    pub(crate) field: FieldId,
    pub(crate) configuration: ConfigurationId,
    pub(crate) discretization: DiscretizationId,
    pub(crate) basis: BasisId,
    pub(crate) blocks: Children<DiscreteFieldBlockId>,
}

impl DiscreteField {
    /// Discrete field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Owning field.
    pub fn field(&self) -> FieldId {
        self.field
    }

    /// Configuration the discrete field belongs to.
    pub fn configuration(&self) -> ConfigurationId {
        self.configuration
    }

    /// Discretization the field is sampled on.
    pub fn discretization(&self) -> DiscretizationId {
        self.discretization
    }

    /// Basis the tensor components are expressed in.
    pub fn basis(&self) -> BasisId {
        self.basis
    }

    /// Look up a block by name.
    pub fn block(&self, name: &str) -> Option<DiscreteFieldBlockId> {
        lookup(&self.blocks, name)
    }

    /// Blocks in creation order.
    pub fn blocks(&self) -> impl Iterator<Item = (&str, DiscreteFieldBlockId)> + '_ {
        entries(&self.blocks)
    }
}

/// A discrete field restricted to one discretization block.
#[derive(Clone, Debug)]
pub struct DiscreteFieldBlock {
    pub(crate) name: String,
    pub(crate) discrete_field: DiscreteFieldId,
    pub(crate) block: DiscretizationBlockId,
    pub(crate) components: Children<ComponentId>,
}

impl DiscreteFieldBlock {
    /// Block name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Owning discrete field.
    pub fn discrete_field(&self) -> DiscreteFieldId {
        self.discrete_field
    }

    /// Discretization block this data covers.
    pub fn block(&self) -> DiscretizationBlockId {
        self.block
    }

    /// Look up a component by name.
    pub fn component(&self, name: &str) -> Option<ComponentId> {
        lookup(&self.components, name)
    }

    /// Components in creation order.
    pub fn components(&self) -> impl Iterator<Item = (&str, ComponentId)> + '_ {
        entries(&self.components)
    }
}

/// What backs a component's values.
#[derive(Clone, Debug, PartialEq)]
pub enum ComponentData {
    /// Nothing attached yet.
    None,
    /// A `data` dataset shaped like the block.
    Dataset {
        /// Element type.
        datatype: Datatype,
        /// Dataset shape, equal to the block shape.
        shape: IndexVec,
    },
    /// Values `origin + sum(delta[d] * local[d])`, stored as attributes.
    Range {
        /// Value at the block's first point.
        origin: f64,
        /// Increment per axis.
        delta: Vec<f64>,
    },
}

impl ComponentData {
    /// Whether any data is attached.
    pub fn is_attached(&self) -> bool {
        !matches!(self, Self::None)
    }
}

/// One independent tensor component's data on one block.
#[derive(Clone, Debug)]
pub struct Component {
    pub(crate) name: String,
    pub(crate) discrete_field_block: DiscreteFieldBlockId,
    pub(crate) tensor_component: TensorComponentId,
    pub(crate) storage_index: usize,
    pub(crate) data: ComponentData,
}

impl Component {
    /// Component name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Owning discrete field block.
    pub fn discrete_field_block(&self) -> DiscreteFieldBlockId {
        self.discrete_field_block
    }

    /// Tensor component this data holds.
    pub fn tensor_component(&self) -> TensorComponentId {
        self.tensor_component
    }

    /// Position in the tensor type's canonical ordering.
    pub fn storage_index(&self) -> usize {
        self.storage_index
    }

    /// Attached data descriptor.
    pub fn data(&self) -> &ComponentData {
        &self.data
    }
}
