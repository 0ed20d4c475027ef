//! Bulk data transfer between components and a store.

use proptest::prelude::*;
use simio_core::{IndexBox, TensorShape};
use simio_model::{
    read_project, ComponentId, DiscretizationBlockId, ModelError, Project, SerializeError,
    WriteConfig,
};
use simio_store::{DataSlice, Datatype, MemStore, Storage, StoreError};
use simio_test_utils::{gaussian, multiblock, Scaffold};

// ── Shape and type enforcement ──────────────────────────────────

#[test]
fn short_buffer_is_rejected_without_a_partial_write() {
    let g = gaussian(4);
    let mut store = MemStore::new();
    g.project.write(&mut store).unwrap();
    let full = vec![1.0_f64; 64];
    g.project
        .write_data(&mut store, g.component, (&full).into())
        .unwrap();

    let short = vec![7.0_f64; 63];
    match g.project.write_data(&mut store, g.component, (&short).into()) {
        Err(ModelError::ShapeMismatch { expected, found }) => {
            assert_eq!(expected, [4, 4, 4]);
            assert_eq!(found, [63]);
        }
        other => panic!("expected ShapeMismatch, got {other:?}"),
    }
    let data = g.project.read_data(&store, g.component).unwrap();
    assert_eq!(data.as_f64().unwrap(), full.as_slice());
}

#[test]
fn wrong_datatype_is_rejected() {
    let g = gaussian(2);
    let mut store = MemStore::new();
    g.project.write(&mut store).unwrap();
    let ints = vec![1_i32; 8];
    match g.project.write_data(&mut store, g.component, (&ints).into()) {
        Err(ModelError::DatatypeMismatch { expected, found }) => {
            assert_eq!(expected, Datatype::F64);
            assert_eq!(found, Datatype::I32);
        }
        other => panic!("expected DatatypeMismatch, got {other:?}"),
    }
}

#[test]
fn range_components_have_no_dataset() {
    let g = gaussian(2);
    let mut store = MemStore::new();
    g.project.write(&mut store).unwrap();
    let values = vec![0.0_f64; 8];
    match g
        .project
        .write_data(&mut store, g.coordinates[0], (&values).into())
    {
        Err(ModelError::NoData { component }) => assert_eq!(component, "scalar"),
        other => panic!("expected NoData, got {other:?}"),
    }
}

#[test]
fn writing_data_before_the_project_fails_in_the_backend() {
    let g = gaussian(2);
    let mut store = MemStore::new();
    let values = vec![0.0_f64; 8];
    match g.project.write_data(&mut store, g.component, (&values).into()) {
        Err(ModelError::Backend(StoreError::NoSuchGroup { .. })) => {}
        other => panic!("expected NoSuchGroup, got {other:?}"),
    }
}

#[test]
fn set_data_requires_the_block_shape() {
    let mut g = gaussian(3);
    match g.project.set_data(g.component, Datatype::F32, &[3, 3]) {
        Err(ModelError::ShapeMismatch { expected, found }) => {
            assert_eq!(expected, [3, 3, 3]);
            assert_eq!(found, [3, 3]);
        }
        other => panic!("expected ShapeMismatch, got {other:?}"),
    }
}

#[test]
fn negative_extent_is_an_invalid_shape() {
    let mut g = gaussian(3);
    match g.project.set_data(g.component, Datatype::F32, &[3, -3, 3]) {
        Err(ModelError::InvalidShape(_)) => {}
        other => panic!("expected InvalidShape, got {other:?}"),
    }
}

#[test]
fn a_failed_write_leaves_sibling_components_intact() {
    let m = multiblock(4, 2);
    let mut store = MemStore::new();
    m.project.write(&mut store).unwrap();
    let (_, first) = m.blocks[0];
    let (_, second) = m.blocks[1];
    let ones = vec![1.0_f32; 8];
    m.project.write_data(&mut store, first, (&ones).into()).unwrap();
    let wrong = vec![2.0_f32; 9];
    assert!(m.project.write_data(&mut store, second, (&wrong).into()).is_err());

    assert_eq!(
        m.project.read_data(&store, first).unwrap().as_f32().unwrap(),
        ones.as_slice()
    );
    assert!(m
        .project
        .read_data(&store, second)
        .unwrap()
        .as_f32()
        .unwrap()
        .iter()
        .all(|&v| v == 0.0));
}

#[test]
fn integer_data_round_trips() {
    let mut p = Project::new("ints");
    let cfg = p.create_configuration("global").unwrap();
    let tt = p
        .create_tensor_type("Scalar2D", TensorShape::scalar(2).unwrap())
        .unwrap();
    let m = p.create_manifold("plane", cfg, 2).unwrap();
    let d = p.create_discretization(m, "cells", cfg).unwrap();
    let b = p
        .create_discretization_block(d, "b0", &[-2, 5], &[2, 3])
        .unwrap();
    let ts = p.create_tangent_space("tplane", cfg, 2).unwrap();
    let basis = p.create_basis(ts, "xy", cfg).unwrap();
    p.create_basis_vector(basis, "x", 0).unwrap();
    p.create_basis_vector(basis, "y", 1).unwrap();
    let f = p.create_field("material", cfg, m, ts, tt).unwrap();
    let df = p.create_discrete_field(f, "material", cfg, d, basis).unwrap();
    let dfb = p.create_discrete_field_block(df, "material-b0", b).unwrap();
    let c = p.create_component(dfb, "scalar", 0).unwrap();
    p.set_data(c, Datatype::I64, &[2, 3]).unwrap();

    let mut store = MemStore::new();
    p.write(&mut store).unwrap();
    let ids = [i64::MIN, -1, 0, 1, 42, i64::MAX];
    p.write_data(&mut store, c, DataSlice::from(&ids[..])).unwrap();

    let back = read_project(&store).unwrap();
    let path = back.path_of(c).ok();
    assert!(path.is_none(), "handles of one project do not address another");
    let c = back
        .discrete_field_block(
            back.discrete_field(
                back.field(back.find_field("material").unwrap())
                    .unwrap()
                    .discrete_field("material")
                    .unwrap(),
            )
            .unwrap()
            .block("material-b0")
            .unwrap(),
        )
        .unwrap()
        .component("scalar")
        .unwrap();
    assert_eq!(back.read_data(&store, c).unwrap().as_i64().unwrap(), ids);
    assert_eq!(
        store
            .dataset_info(&back.path_of(c).unwrap(), "data")
            .unwrap()
            .shape,
        [2, 3]
    );
}

// ── Blocks too large to address ─────────────────────────────────

const HUGE: i64 = 1 << 40;

/// A scalar component declared over a `HUGE³` block.
fn huge_component() -> (Project, DiscretizationBlockId, ComponentId) {
    let mut s = Scaffold::new("huge");
    let p = &mut s.project;
    let block = p
        .create_discretization_block(s.discretization, "all", &[0, 0, 0], &[HUGE; 3])
        .unwrap();
    let f = p
        .create_field("rho", s.configuration, s.manifold, s.tangent_space, s.scalar)
        .unwrap();
    let df = p
        .create_discrete_field(f, "rho", s.configuration, s.discretization, s.basis)
        .unwrap();
    let dfb = p.create_discrete_field_block(df, "rho-all", block).unwrap();
    let c = p.create_component(dfb, "scalar", 0).unwrap();
    p.set_data(c, Datatype::F64, &[HUGE; 3]).unwrap();
    (s.project, block, c)
}

#[test]
fn active_region_of_a_huge_block_is_accepted() {
    let mut s = Scaffold::new("huge");
    let block = s
        .project
        .create_discretization_block(s.discretization, "all", &[0, 0, 0], &[HUGE; 3])
        .unwrap();
    let whole = IndexBox::new(&[0, 0, 0], &[HUGE; 3]).unwrap();
    s.project.set_active_region(block, vec![whole]).unwrap();
    assert_eq!(
        s.project.discretization_block(block).unwrap().active().map(<[_]>::len),
        Some(1)
    );
}

#[test]
fn transfer_on_a_huge_block_is_too_large_not_a_panic() {
    let (p, block, c) = huge_component();
    assert_eq!(p.discretization_block(block).unwrap().region().len(), None);

    let mut store = MemStore::new();
    p.write_with(&mut store, &WriteConfig::METADATA_ONLY).unwrap();
    match p.write_data(&mut store, c, DataSlice::F64(&[])) {
        Err(ModelError::Backend(StoreError::DatasetTooLarge { shape })) => {
            assert_eq!(shape, [HUGE as u64; 3])
        }
        other => panic!("expected DatasetTooLarge, got {other:?}"),
    }
    match p.read_data(&store, c) {
        Err(ModelError::Backend(StoreError::DatasetTooLarge { .. })) => {}
        other => panic!("expected DatasetTooLarge, got {other:?}"),
    }
    match p.write(&mut MemStore::new()) {
        Err(SerializeError::Backend(StoreError::DatasetTooLarge { .. })) => {}
        other => panic!("expected DatasetTooLarge, got {other:?}"),
    }
}

// ── Properties ──────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Any block layout, any subset of components, any f64 payload:
    /// graph and values come back unchanged.
    #[test]
    fn random_block_layouts_round_trip(
        blocks in prop::collection::vec(
            (prop::array::uniform2(-50_i64..50), prop::array::uniform2(1_i64..6)),
            1..6,
        ),
        subset in prop::sample::subsequence(vec![0_usize, 1, 2], 1..=3),
        seed in any::<u64>(),
    ) {
        let mut p = Project::new("prop");
        let cfg = p.create_configuration("global").unwrap();
        let tt = p
            .create_tensor_type("Sym2", TensorShape::symmetric_tensor(2).unwrap())
            .unwrap();
        let m = p.create_manifold("plane", cfg, 2).unwrap();
        let d = p.create_discretization(m, "grid", cfg).unwrap();
        let ts = p.create_tangent_space("tplane", cfg, 2).unwrap();
        let basis = p.create_basis(ts, "xy", cfg).unwrap();
        p.create_basis_vector(basis, "x", 0).unwrap();
        p.create_basis_vector(basis, "y", 1).unwrap();
        let f = p.create_field("strain", cfg, m, ts, tt).unwrap();
        let df = p.create_discrete_field(f, "strain", cfg, d, basis).unwrap();

        let mut payloads = Vec::new();
        for (i, (offset, shape)) in blocks.iter().enumerate() {
            let b = p
                .create_discretization_block(d, &format!("b{i}"), offset, shape)
                .unwrap();
            let dfb = p.create_discrete_field_block(df, &format!("s{i}"), b).unwrap();
            for &index in &subset {
                let c = p.create_component(dfb, &format!("c{index}"), index).unwrap();
                p.set_data(c, Datatype::F64, shape).unwrap();
                let len = (shape[0] * shape[1]) as usize;
                let values: Vec<f64> = (0..len)
                    .map(|k| f64::from_bits(seed.rotate_left((k + i) as u32) >> 2))
                    .collect();
                payloads.push((format!("s{i}"), format!("c{index}"), values));
            }
        }

        let mut store = MemStore::new();
        p.write(&mut store).unwrap();
        for (dfb_name, c_name, values) in &payloads {
            let dfb = p.discrete_field(df).unwrap().block(dfb_name).unwrap();
            let c = p.discrete_field_block(dfb).unwrap().component(c_name).unwrap();
            p.write_data(&mut store, c, values.into()).unwrap();
        }

        let back = read_project(&store).unwrap();
        prop_assert_eq!(back.to_string(), p.to_string());

        let bf = back.find_field("strain").unwrap();
        let bdf = back.field(bf).unwrap().discrete_field("strain").unwrap();
        for (dfb_name, c_name, values) in &payloads {
            let dfb = back.discrete_field(bdf).unwrap().block(dfb_name).unwrap();
            let c = back.discrete_field_block(dfb).unwrap().component(c_name).unwrap();
            let data = back.read_data(&store, c).unwrap();
            let read = data.as_f64().unwrap();
            prop_assert!(read.iter().zip(values).all(|(a, b)| a.to_bits() == b.to_bits()));
        }
    }
}
