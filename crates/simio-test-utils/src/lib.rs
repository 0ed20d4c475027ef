//! Test fixtures for simio development.
//!
//! - [`gaussian`]: one 3-D block carrying a scalar Gaussian, plus
//!   coordinate fields stored as linear ranges
//! - [`multiblock`]: an `n³` domain split into `k³` equal blocks, one
//!   scalar component per block
//! - [`gaussian_values`]: the synthetic data for [`gaussian`]

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use simio_core::{IndexBox, StorageOrder};
use simio_model::{
    BasisId, ComponentId, ConfigurationId, DiscreteFieldId, DiscretizationBlockId,
    DiscretizationId, ManifoldId, Project, TangentSpaceId, TensorTypeId, Value,
};
use simio_store::Datatype;

/// Entities shared by every fixture: a global configuration, the standard
/// tensor types, a 3-D manifold `domain` with discretization `uniform`, and
/// a 3-D tangent space with the `cartesian` basis `x`, `y`, `z`.
pub struct Scaffold {
    pub project: Project,
    pub configuration: ConfigurationId,
    pub manifold: ManifoldId,
    pub discretization: DiscretizationId,
    pub tangent_space: TangentSpaceId,
    pub basis: BasisId,
    pub scalar: TensorTypeId,
}

impl Scaffold {
    pub fn new(name: &str) -> Self {
        let mut project = Project::new(name);
        let configuration = project.create_configuration("global").unwrap();
        let iteration = project.create_parameter("iteration").unwrap();
        let zero = project
            .create_parameter_value(iteration, "iteration.0", Value::Int(0))
            .unwrap();
        project.add_parameter_value(configuration, zero).unwrap();
        project.create_standard_tensor_types().unwrap();
        let scalar = project.find_tensor_type("Scalar3D").unwrap();
        let manifold = project.create_manifold("domain", configuration, 3).unwrap();
        let discretization = project
            .create_discretization(manifold, "uniform", configuration)
            .unwrap();
        let tangent_space = project
            .create_tangent_space("space", configuration, 3)
            .unwrap();
        let basis = project
            .create_basis(tangent_space, "cartesian", configuration)
            .unwrap();
        for (direction, name) in ["x", "y", "z"].into_iter().enumerate() {
            project.create_basis_vector(basis, name, direction).unwrap();
        }
        Self {
            project,
            configuration,
            manifold,
            discretization,
            tangent_space,
            basis,
            scalar,
        }
    }

    /// A scalar field on the domain with one discrete field `name`.
    fn scalar_field(&mut self, name: &str) -> DiscreteFieldId {
        let p = &mut self.project;
        let field = p
            .create_field(
                name,
                self.configuration,
                self.manifold,
                self.tangent_space,
                self.scalar,
            )
            .unwrap();
        p.create_discrete_field(
            field,
            name,
            self.configuration,
            self.discretization,
            self.basis,
        )
        .unwrap()
    }
}

/// The single-block Gaussian scenario.
pub struct Gaussian {
    pub project: Project,
    pub block: DiscretizationBlockId,
    /// The `gaussian` component, declared `f64` over the whole block.
    pub component: ComponentId,
    /// Coordinate components `x`, `y`, `z`, stored as linear ranges.
    pub coordinates: Vec<ComponentId>,
    pub n: usize,
}

/// Build the Gaussian scenario on an `n³` block at the origin.
pub fn gaussian(n: usize) -> Gaussian {
    let mut s = Scaffold::new("gaussian");
    let shape = [n as i64; 3];
    let block = s
        .project
        .create_discretization_block(s.discretization, "grid", &[0, 0, 0], &shape)
        .unwrap();

    let df = s.scalar_field("gaussian");
    let dfb = s
        .project
        .create_discrete_field_block(df, "gaussian-grid", block)
        .unwrap();
    let component = s.project.create_component(dfb, "scalar", 0).unwrap();
    s.project.set_data(component, Datatype::F64, &shape).unwrap();

    let coordinate_system = s
        .project
        .create_coordinate_system("cartesian", s.configuration, s.manifold)
        .unwrap();
    let spacing = 1.0 / n as f64;
    let mut coordinates = Vec::new();
    for (direction, name) in ["x", "y", "z"].into_iter().enumerate() {
        let df = s.scalar_field(&format!("coord-{name}"));
        let field = s.project.discrete_field(df).unwrap().field();
        s.project
            .create_coordinate_field(coordinate_system, name, direction, field)
            .unwrap();
        let dfb = s
            .project
            .create_discrete_field_block(df, &format!("coord-{name}-grid"), block)
            .unwrap();
        let c = s.project.create_component(dfb, "scalar", 0).unwrap();
        let mut delta = [0.0; 3];
        delta[direction] = spacing;
        s.project
            .set_data_range(c, -0.5 + spacing / 2.0, &delta)
            .unwrap();
        coordinates.push(c);
    }

    Gaussian {
        project: s.project,
        block,
        component,
        coordinates,
        n,
    }
}

/// `exp(-0.5 * r²)` at the cell centres of an `n³` grid spanning
/// `[-0.5, 0.5]³`, with `r` scaled so the grid spans four standard
/// deviations. Row-major, last index fastest.
pub fn gaussian_values(n: usize) -> Vec<f64> {
    let centre = |i: i64| ((i as f64 + 0.5) / n as f64 - 0.5) * 4.0;
    let region = IndexBox::new(&[0, 0, 0], &[n as i64; 3]).unwrap();
    region
        .iter_local(StorageOrder::RowMajor)
        .map(|idx| {
            let r2: f64 = idx.iter().map(|&i| centre(i).powi(2)).sum();
            (-0.5 * r2).exp()
        })
        .collect()
}

/// The multi-block scenario.
pub struct MultiBlock {
    pub project: Project,
    /// Blocks in creation order with their `density` component.
    pub blocks: Vec<(DiscretizationBlockId, ComponentId)>,
}

/// Split an `n³` domain into `k³` blocks of `(n / k)³`. `k` must divide
/// `n`. Block `b-i-j-l` sits at offset `[i, j, l] * (n / k)`.
pub fn multiblock(n: usize, k: usize) -> MultiBlock {
    assert!(k > 0 && n % k == 0, "{k} does not divide {n}");
    let mut s = Scaffold::new("multiblock");
    let side = (n / k) as i64;
    let df = s.scalar_field("density");
    let mut blocks = Vec::with_capacity(k * k * k);
    for i in 0..k as i64 {
        for j in 0..k as i64 {
            for l in 0..k as i64 {
                let name = format!("b-{i}-{j}-{l}");
                let block = s
                    .project
                    .create_discretization_block(
                        s.discretization,
                        &name,
                        &[i * side, j * side, l * side],
                        &[side; 3],
                    )
                    .unwrap();
                let dfb = s
                    .project
                    .create_discrete_field_block(df, &format!("density-{name}"), block)
                    .unwrap();
                let c = s.project.create_component(dfb, "scalar", 0).unwrap();
                s.project
                    .set_data(c, Datatype::F32, &[side; 3])
                    .unwrap();
                blocks.push((block, c));
            }
        }
    }
    MultiBlock {
        project: s.project,
        blocks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gaussian_peaks_at_the_centre() {
        let values = gaussian_values(10);
        assert_eq!(values.len(), 1000);
        let max = values.iter().copied().fold(f64::MIN, f64::max);
        assert!(max < 1.0 && max > 0.9);
        assert!(values.iter().all(|&v| v > 0.0));
    }

    #[test]
    fn multiblock_covers_the_domain() {
        let m = multiblock(8, 2);
        assert_eq!(m.blocks.len(), 8);
        let total: usize = m
            .blocks
            .iter()
            .map(|&(b, _)| m.project.discretization_block(b).unwrap().region().len().unwrap())
            .sum();
        assert_eq!(total, 512);
    }
}
