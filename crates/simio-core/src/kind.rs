//! The closed set of entity kinds and their on-disk type tags.

use std::fmt;

/// Every kind of entity that can appear in a project graph.
///
/// The tag returned by [`EntityKind::tag`] is stored in the `type` attribute
/// of the entity's group and is how a reader recognises what it opened.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    /// Root namespace and serialization unit.
    Project,
    /// Named parameter/version context.
    Configuration,
    /// A named simulation parameter.
    Parameter,
    /// One value a parameter takes.
    ParameterValue,
    /// Abstract tensor shape.
    TensorType,
    /// One independent component of a tensor type.
    TensorComponent,
    /// Abstract space of fixed dimension.
    Manifold,
    /// Vector space of directions on a manifold.
    TangentSpace,
    /// Decomposition of a manifold into blocks.
    Discretization,
    /// One region of a discretization.
    DiscretizationBlock,
    /// Refinement relation between two discretizations.
    SubDiscretization,
    /// Choice of basis vectors for a tangent space.
    Basis,
    /// One basis direction.
    BasisVector,
    /// Names a manifold's coordinate fields.
    CoordinateSystem,
    /// Binds one coordinate direction to a field.
    CoordinateField,
    /// Abstract tensor-valued field.
    Field,
    /// A field instantiated on one discretization and basis.
    DiscreteField,
    /// A discrete field restricted to one block.
    DiscreteFieldBlock,
    /// One tensor component's data on one block.
    DiscreteFieldBlockComponent,
}

impl EntityKind {
    /// All kinds, in declaration order.
    pub const ALL: [EntityKind; 19] = [
        Self::Project,
        Self::Configuration,
        Self::Parameter,
        Self::ParameterValue,
        Self::TensorType,
        Self::TensorComponent,
        Self::Manifold,
        Self::TangentSpace,
        Self::Discretization,
        Self::DiscretizationBlock,
        Self::SubDiscretization,
        Self::Basis,
        Self::BasisVector,
        Self::CoordinateSystem,
        Self::CoordinateField,
        Self::Field,
        Self::DiscreteField,
        Self::DiscreteFieldBlock,
        Self::DiscreteFieldBlockComponent,
    ];

    /// The `type` attribute value identifying this kind on disk.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Project => "Project",
            Self::Configuration => "Configuration",
            Self::Parameter => "Parameter",
            Self::ParameterValue => "ParameterValue",
            Self::TensorType => "TensorType",
            Self::TensorComponent => "TensorComponent",
            Self::Manifold => "Manifold",
            Self::TangentSpace => "TangentSpace",
            Self::Discretization => "Discretization",
            Self::DiscretizationBlock => "DiscretizationBlock",
            Self::SubDiscretization => "SubDiscretization",
            Self::Basis => "Basis",
            Self::BasisVector => "BasisVector",
            Self::CoordinateSystem => "CoordinateSystem",
            Self::CoordinateField => "CoordinateField",
            Self::Field => "Field",
            Self::DiscreteField => "DiscreteField",
            Self::DiscreteFieldBlock => "DiscreteFieldBlock",
            Self::DiscreteFieldBlockComponent => "DiscreteFieldBlockComponent",
        }
    }

    /// Parse a `type` attribute value.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.tag() == tag)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
