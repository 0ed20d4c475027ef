//! Human-readable tree dump of a project.
//!
//! The dump lists every entity with its kind and stored attributes, in the
//! same order and with the same reference paths a store would receive.
//! Handles and project ids never appear, so two isomorphic projects print
//! identically.

use std::fmt;

use simio_store::AttrValue;

use crate::entity::ComponentData;
use crate::id::Entity;
use crate::project::Project;
use crate::serialize::layout::{self, LAYOUT_VERSION};
use crate::serialize::{children, entity_attributes, Node};

struct ShowAttr<'a>(&'a AttrValue);

impl fmt::Display for ShowAttr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            AttrValue::Int(v) => write!(f, "{v}"),
            AttrValue::Float(v) => write!(f, "{v:?}"),
            AttrValue::Str(v) => write!(f, "{v:?}"),
            AttrValue::IntArray(v) => write!(f, "{v:?}"),
            AttrValue::FloatArray(v) => write!(f, "{v:?}"),
            AttrValue::StrArray(v) => write!(f, "{v:?}"),
        }
    }
}

fn dump(project: &Project, f: &mut fmt::Formatter<'_>, node: Node, depth: usize) -> fmt::Result {
    for collection in layout::collections(node.kind()) {
        let members = children(project, node, collection.group).map_err(|_| fmt::Error)?;
        if members.is_empty() {
            continue;
        }
        writeln!(f, "{:indent$}{}/", "", collection.group, indent = 2 * depth)?;
        for entity in members {
            let name = project.entity_name(entity).map_err(|_| fmt::Error)?;
            write!(f, "{:indent$}{name} <{}>", "", entity.kind(), indent = 2 * depth + 2)?;
            for (attr, value) in entity_attributes(project, entity).map_err(|_| fmt::Error)? {
                write!(f, " {attr}={}", ShowAttr(&value))?;
            }
            if let Entity::DiscreteFieldBlockComponent(id) = entity {
                let component = project.component(id).map_err(|_| fmt::Error)?;
                if let ComponentData::Dataset { datatype, shape } = component.data() {
                    write!(f, " {}=<{datatype} {:?}>", layout::DATA, shape.as_slice())?;
                }
            }
            writeln!(f)?;
            dump(project, f, Node::Entity(entity), depth + 2)?;
        }
    }
    Ok(())
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} <Project> format_version={LAYOUT_VERSION}", self.name())?;
        dump(self, f, Node::Root, 1)
    }
}

#[cfg(test)]
mod tests {
    use simio_core::TensorShape;
    use simio_store::Datatype;

    use crate::entity::Value;
    use crate::project::Project;

    fn small(name: &str) -> Project {
        let mut p = Project::new(name);
        let cfg = p.create_configuration("global").unwrap();
        let param = p.create_parameter("resolution").unwrap();
        let v = p
            .create_parameter_value(param, "coarse", Value::Int(8))
            .unwrap();
        p.add_parameter_value(cfg, v).unwrap();
        let tt = p
            .create_tensor_type("Vector2D", TensorShape::vector(2).unwrap())
            .unwrap();
        let m = p.create_manifold("plane", cfg, 2).unwrap();
        let d = p.create_discretization(m, "grid", cfg).unwrap();
        let b = p
            .create_discretization_block(d, "b0", &[0, 0], &[3, 2])
            .unwrap();
        let ts = p.create_tangent_space("tplane", cfg, 2).unwrap();
        let basis = p.create_basis(ts, "xy", cfg).unwrap();
        p.create_basis_vector(basis, "x", 0).unwrap();
        p.create_basis_vector(basis, "y", 1).unwrap();
        let field = p.create_field("velocity", cfg, m, ts, tt).unwrap();
        let df = p.create_discrete_field(field, "v", cfg, d, basis).unwrap();
        let dfb = p.create_discrete_field_block(df, "v0", b).unwrap();
        let cs = p.create_all_components(dfb).unwrap();
        p.set_data(cs[0], Datatype::F64, &[3, 2]).unwrap();
        p.set_data_range(cs[1], 0.0, &[1.0, 0.5]).unwrap();
        p
    }

    #[test]
    fn dump_lists_entities_with_paths_and_data() {
        let text = small("demo").to_string();
        assert!(text.starts_with("demo <Project> format_version=1\n"));
        assert!(text.contains("coarse <ParameterValue> value=8"));
        assert!(text.contains(
            "configurations/\n    global <Configuration> parametervalues=[\"/parameters/resolution/parametervalues/coarse\"]"
        ));
        assert!(text.contains("b0 <DiscretizationBlock> offset=[0, 0] shape=[3, 2]"));
        assert!(text.contains("data=<f64 [3, 2]>"));
        assert!(text.contains("data_range_origin=0.0 data_range_delta=[1.0, 0.5]"));
    }

    #[test]
    fn dump_is_independent_of_project_identity() {
        assert_eq!(small("demo").to_string(), small("demo").to_string());
    }

    #[test]
    fn empty_collections_are_omitted() {
        let text = Project::new("empty").to_string();
        assert_eq!(text, "empty <Project> format_version=1\n");
    }
}
