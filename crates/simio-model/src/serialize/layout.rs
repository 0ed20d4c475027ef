//! The on-disk layout: group and attribute names, and the schema table
//! shared by the writer, the reader and the tree dump.
//!
//! ```text
//! /                                   type=Project name format_version
//! ├── parameters/<p>
//! │   └── parametervalues/<v>         value?
//! ├── configurations/<c>              parametervalues=[paths]
//! ├── tensortypes/<t>                 dimension rank symmetries
//! │   └── tensorcomponents/<c>        storage_index indexvalues
//! ├── manifolds/<m>                   configuration dimension
//! │   ├── discretizations/<d>         configuration
//! │   │   └── discretizationblocks/<b> offset shape active?
//! │   └── subdiscretizations/<s>      parent_discretization child_discretization factor offset
//! ├── tangentspaces/<t>               configuration dimension
//! │   └── bases/<b>                   configuration
//! │       └── basisvectors/<v>        direction
//! ├── fields/<f>                      configuration manifold tangentspace tensortype
//! │   └── discretefields/<d>          configuration discretization basis
//! │       └── discretefieldblocks/<b> discretizationblock
//! │           └── discretefieldblockcomponents/<c>
//! │                                   storage_index tensorcomponent [data | data_range_*]
//! └── coordinatesystems/<c>           configuration manifold
//!     └── coordinatefields/<f>        direction field
//! ```

use simio_core::{EntityKind, IndexBox, IndexSymmetry};

/// Version of the group/attribute layout, stamped on the root group.
pub const LAYOUT_VERSION: i64 = 1;

// ── Collection groups ───────────────────────────────────────────

pub(crate) const CONFIGURATIONS: &str = "configurations";
pub(crate) const PARAMETERS: &str = "parameters";
pub(crate) const PARAMETER_VALUES: &str = "parametervalues";
pub(crate) const TENSOR_TYPES: &str = "tensortypes";
pub(crate) const TENSOR_COMPONENTS: &str = "tensorcomponents";
pub(crate) const MANIFOLDS: &str = "manifolds";
pub(crate) const DISCRETIZATIONS: &str = "discretizations";
pub(crate) const DISCRETIZATION_BLOCKS: &str = "discretizationblocks";
pub(crate) const SUBDISCRETIZATIONS: &str = "subdiscretizations";
pub(crate) const TANGENT_SPACES: &str = "tangentspaces";
pub(crate) const BASES: &str = "bases";
pub(crate) const BASIS_VECTORS: &str = "basisvectors";
pub(crate) const FIELDS: &str = "fields";
pub(crate) const DISCRETE_FIELDS: &str = "discretefields";
pub(crate) const DISCRETE_FIELD_BLOCKS: &str = "discretefieldblocks";
pub(crate) const COMPONENTS: &str = "discretefieldblockcomponents";
pub(crate) const COORDINATE_SYSTEMS: &str = "coordinatesystems";
pub(crate) const COORDINATE_FIELDS: &str = "coordinatefields";

// ── Attributes ──────────────────────────────────────────────────

pub(crate) const TYPE: &str = "type";
pub(crate) const NAME: &str = "name";
pub(crate) const FORMAT_VERSION: &str = "format_version";

pub(crate) const CONFIGURATION: &str = "configuration";
pub(crate) const MANIFOLD: &str = "manifold";
pub(crate) const TANGENT_SPACE: &str = "tangentspace";
pub(crate) const TENSOR_TYPE: &str = "tensortype";
pub(crate) const TENSOR_COMPONENT: &str = "tensorcomponent";
pub(crate) const DISCRETIZATION: &str = "discretization";
pub(crate) const DISCRETIZATION_BLOCK: &str = "discretizationblock";
pub(crate) const PARENT_DISCRETIZATION: &str = "parent_discretization";
pub(crate) const CHILD_DISCRETIZATION: &str = "child_discretization";
pub(crate) const BASIS: &str = "basis";
pub(crate) const FIELD: &str = "field";

pub(crate) const VALUE: &str = "value";
pub(crate) const DIMENSION: &str = "dimension";
pub(crate) const RANK: &str = "rank";
pub(crate) const SYMMETRIES: &str = "symmetries";
pub(crate) const STORAGE_INDEX: &str = "storage_index";
pub(crate) const INDEX_VALUES: &str = "indexvalues";
pub(crate) const OFFSET: &str = "offset";
pub(crate) const SHAPE: &str = "shape";
pub(crate) const ACTIVE: &str = "active";
pub(crate) const FACTOR: &str = "factor";
pub(crate) const DIRECTION: &str = "direction";
pub(crate) const RANGE_ORIGIN: &str = "data_range_origin";
pub(crate) const RANGE_DELTA: &str = "data_range_delta";

/// Name of a component's dataset.
pub(crate) const DATA: &str = "data";

// ── Schema table ────────────────────────────────────────────────

/// A named child collection and the kind of entity it holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Collection {
    pub(crate) group: &'static str,
    pub(crate) kind: EntityKind,
}

/// Child collections of an entity kind, in write order.
///
/// Project collections are ordered so that every reference points to an
/// entity in an earlier collection, except coordinate fields which point
/// into `fields`; readers rely on this order, not on the file's.
pub(crate) fn collections(kind: EntityKind) -> &'static [Collection] {
    use EntityKind as K;
    match kind {
        K::Project => &[
            Collection { group: PARAMETERS, kind: K::Parameter },
            Collection { group: CONFIGURATIONS, kind: K::Configuration },
            Collection { group: TENSOR_TYPES, kind: K::TensorType },
            Collection { group: MANIFOLDS, kind: K::Manifold },
            Collection { group: TANGENT_SPACES, kind: K::TangentSpace },
            Collection { group: FIELDS, kind: K::Field },
            Collection { group: COORDINATE_SYSTEMS, kind: K::CoordinateSystem },
        ],
        K::Parameter => &[Collection { group: PARAMETER_VALUES, kind: K::ParameterValue }],
        K::TensorType => &[Collection { group: TENSOR_COMPONENTS, kind: K::TensorComponent }],
        K::Manifold => &[
            Collection { group: DISCRETIZATIONS, kind: K::Discretization },
            Collection { group: SUBDISCRETIZATIONS, kind: K::SubDiscretization },
        ],
        K::Discretization => &[Collection { group: DISCRETIZATION_BLOCKS, kind: K::DiscretizationBlock }],
        K::TangentSpace => &[Collection { group: BASES, kind: K::Basis }],
        K::Basis => &[Collection { group: BASIS_VECTORS, kind: K::BasisVector }],
        K::Field => &[Collection { group: DISCRETE_FIELDS, kind: K::DiscreteField }],
        K::DiscreteField => &[Collection { group: DISCRETE_FIELD_BLOCKS, kind: K::DiscreteFieldBlock }],
        K::DiscreteFieldBlock => &[Collection { group: COMPONENTS, kind: K::DiscreteFieldBlockComponent }],
        K::CoordinateSystem => &[Collection { group: COORDINATE_FIELDS, kind: K::CoordinateField }],
        K::Configuration
        | K::ParameterValue
        | K::TensorComponent
        | K::DiscretizationBlock
        | K::SubDiscretization
        | K::BasisVector
        | K::CoordinateField
        | K::DiscreteFieldBlockComponent => &[],
    }
}

/// The collection of `kind` named `group`, if the layout has one.
pub(crate) fn collection(kind: EntityKind, group: &str) -> Option<Collection> {
    collections(kind).iter().copied().find(|c| c.group == group)
}

/// Attributes an entity of `kind` carries only in some states. A rewrite
/// removes those the entity no longer has.
pub(crate) fn optional_attributes(kind: EntityKind) -> &'static [&'static str] {
    match kind {
        EntityKind::ParameterValue => &[VALUE],
        EntityKind::DiscretizationBlock => &[ACTIVE],
        EntityKind::DiscreteFieldBlockComponent => &[RANGE_ORIGIN, RANGE_DELTA],
        _ => &[],
    }
}

// ── Value encodings ─────────────────────────────────────────────

/// `sym:0,1` or `anti:0,1`.
pub(crate) fn encode_symmetry(s: &IndexSymmetry) -> String {
    let prefix = if s.antisymmetric { "anti" } else { "sym" };
    let indices: Vec<String> = s.indices.iter().map(usize::to_string).collect();
    format!("{prefix}:{}", indices.join(","))
}

/// Inverse of [`encode_symmetry`].
pub(crate) fn decode_symmetry(s: &str) -> Option<IndexSymmetry> {
    let (prefix, rest) = s.split_once(':')?;
    let indices = rest
        .split(',')
        .map(|i| i.parse::<usize>().ok())
        .collect::<Option<Vec<_>>>()?;
    match prefix {
        "sym" => Some(IndexSymmetry::symmetric(indices)),
        "anti" => Some(IndexSymmetry::antisymmetric(indices)),
        _ => None,
    }
}

/// Active-region boxes as one flat list: per box its offset then its shape.
pub(crate) fn encode_boxes(boxes: &[IndexBox]) -> Vec<i64> {
    boxes
        .iter()
        .flat_map(|b| b.offset().iter().chain(b.shape()).copied().collect::<Vec<_>>())
        .collect()
}

/// Inverse of [`encode_boxes`]. `None` when the length is not a multiple
/// of `2 * dimension` or a box is malformed.
pub(crate) fn decode_boxes(flat: &[i64], dimension: usize) -> Option<Vec<IndexBox>> {
    let stride = 2 * dimension;
    if stride == 0 {
        return flat.is_empty().then(Vec::new);
    }
    if flat.len() % stride != 0 {
        return None;
    }
    flat.chunks(stride)
        .map(|c| IndexBox::new(&c[..dimension], &c[dimension..]).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_has_an_entry_and_groups_are_unique() {
        let mut seen = Vec::new();
        for kind in EntityKind::ALL {
            for c in collections(kind) {
                assert!(!seen.contains(&c.group), "group {} listed twice", c.group);
                seen.push(c.group);
            }
        }
        // Every kind except the project is held by exactly one collection.
        assert_eq!(seen.len(), EntityKind::ALL.len() - 1);
    }

    #[test]
    fn symmetry_encoding_round_trips() {
        for s in [
            IndexSymmetry::symmetric(vec![0, 1]),
            IndexSymmetry::antisymmetric(vec![1, 2, 3]),
        ] {
            assert_eq!(decode_symmetry(&encode_symmetry(&s)), Some(s));
        }
        assert_eq!(decode_symmetry("swap:0,1"), None);
        assert_eq!(decode_symmetry("sym:0,x"), None);
    }

    #[test]
    fn boxes_encoding_round_trips() {
        let boxes = vec![
            IndexBox::new(&[0, 0], &[2, 3]).unwrap(),
            IndexBox::new(&[4, 1], &[1, 1]).unwrap(),
        ];
        let flat = encode_boxes(&boxes);
        assert_eq!(flat, [0, 0, 2, 3, 4, 1, 1, 1]);
        assert_eq!(decode_boxes(&flat, 2), Some(boxes));
        assert_eq!(decode_boxes(&flat[..3], 2), None);
    }

    #[test]
    fn lookup_by_group_name() {
        assert_eq!(
            collection(EntityKind::Manifold, SUBDISCRETIZATIONS).map(|c| c.kind),
            Some(EntityKind::SubDiscretization)
        );
        assert_eq!(collection(EntityKind::Manifold, FIELDS), None);
    }
}
