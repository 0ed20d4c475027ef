//! Benchmark profiles for the simio container format.
//!
//! - [`reference_profile`]: 4³ blocks of 16³ cells, one scalar and one
//!   vector field (~1M values per full write)
//! - [`wide_profile`]: many small fields, stressing the metadata walk
//! - [`payload`]: deterministic data for a component

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use simio_core::TensorShape;
use simio_model::{ComponentId, Project, Value};
use simio_store::Datatype;

/// A project ready for benchmarking, with every component that carries a
/// dataset.
pub struct Profile {
    pub project: Project,
    pub components: Vec<ComponentId>,
    /// Elements per component.
    pub block_len: usize,
}

/// Build a cubic domain of `k³` blocks of `side³` cells with `fields`
/// fields, alternating scalar and vector, each instantiated on every block.
pub fn build_profile(name: &str, k: usize, side: usize, fields: usize) -> Profile {
    let mut p = Project::new(name);
    let cfg = p.create_configuration("global").unwrap();
    let it = p.create_parameter("iteration").unwrap();
    let v = p
        .create_parameter_value(it, "iteration.0", Value::Int(0))
        .unwrap();
    p.add_parameter_value(cfg, v).unwrap();
    let scalar = p
        .create_tensor_type("Scalar3D", TensorShape::scalar(3).unwrap())
        .unwrap();
    let vector = p
        .create_tensor_type("Vector3D", TensorShape::vector(3).unwrap())
        .unwrap();
    let m = p.create_manifold("domain", cfg, 3).unwrap();
    let d = p.create_discretization(m, "uniform", cfg).unwrap();
    let ts = p.create_tangent_space("space", cfg, 3).unwrap();
    let basis = p.create_basis(ts, "cartesian", cfg).unwrap();
    for (i, n) in ["x", "y", "z"].into_iter().enumerate() {
        p.create_basis_vector(basis, n, i).unwrap();
    }

    let s = side as i64;
    let mut blocks = Vec::with_capacity(k * k * k);
    for i in 0..k as i64 {
        for j in 0..k as i64 {
            for l in 0..k as i64 {
                blocks.push(
                    p.create_discretization_block(
                        d,
                        &format!("b-{i}-{j}-{l}"),
                        &[i * s, j * s, l * s],
                        &[s; 3],
                    )
                    .unwrap(),
                );
            }
        }
    }

    let mut components = Vec::new();
    for f in 0..fields {
        let tt = if f % 2 == 0 { scalar } else { vector };
        let field = p
            .create_field(&format!("f{f}"), cfg, m, ts, tt)
            .unwrap();
        let df = p
            .create_discrete_field(field, &format!("f{f}"), cfg, d, basis)
            .unwrap();
        for (n, &b) in blocks.iter().enumerate() {
            let dfb = p
                .create_discrete_field_block(df, &format!("f{f}-{n}"), b)
                .unwrap();
            for c in p.create_all_components(dfb).unwrap() {
                p.set_data(c, Datatype::F64, &[s; 3]).unwrap();
                components.push(c);
            }
        }
    }

    Profile {
        project: p,
        components,
        block_len: side * side * side,
    }
}

/// 4³ blocks of 16³ cells, one scalar and one vector field.
pub fn reference_profile() -> Profile {
    build_profile("reference", 4, 16, 2)
}

/// 2³ blocks of 4³ cells, 64 fields.
pub fn wide_profile() -> Profile {
    build_profile("wide", 2, 4, 64)
}

/// Deterministic values for component number `index`.
pub fn payload(len: usize, index: usize) -> Vec<f64> {
    (0..len).map(|i| ((i * 31 + index * 7) % 1009) as f64 * 0.5).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_profile_counts() {
        let p = reference_profile();
        // 64 blocks x (1 scalar + 3 vector components).
        assert_eq!(p.components.len(), 256);
        assert_eq!(p.block_len, 4096);
    }

    #[test]
    fn payload_is_deterministic() {
        assert_eq!(payload(16, 3), payload(16, 3));
        assert_ne!(payload(16, 3), payload(16, 4));
    }
}
