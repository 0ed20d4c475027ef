//! Write-then-read integration tests.
//!
//! Isomorphism is checked through the project's tree dump, which lists
//! every entity, attribute and reference path in serialization order and
//! never mentions handles.

use std::collections::HashSet;

use simio_core::{IndexBox, StorageOrder, TensorShape};
use simio_model::{
    read_project, read_project_with, ComponentData, Project, ReadConfig, Value, WriteConfig,
};
use simio_store::codec::encode_store;
use simio_store::{DataBuffer, Datatype, FileStore, MemStore, Storage};
use simio_test_utils::{gaussian, gaussian_values, multiblock, Scaffold};

fn encoded(store: &MemStore) -> Vec<u8> {
    let mut bytes = Vec::new();
    encode_store(&mut bytes, store).unwrap();
    bytes
}

// ── Single-block Gaussian ───────────────────────────────────────

#[test]
fn gaussian_values_survive_a_memory_round_trip() {
    let g = gaussian(10);
    let values = gaussian_values(10);
    let mut store = MemStore::new();
    g.project.write(&mut store).unwrap();
    g.project
        .write_data(&mut store, g.component, (&values).into())
        .unwrap();

    let back = read_project(&store).unwrap();
    assert_eq!(back.to_string(), g.project.to_string());

    let field = back.find_field("gaussian").unwrap();
    let df = back.field(field).unwrap().discrete_field("gaussian").unwrap();
    let dfb = back
        .discrete_field(df)
        .unwrap()
        .block("gaussian-grid")
        .unwrap();
    let component = back
        .discrete_field_block(dfb)
        .unwrap()
        .component("scalar")
        .unwrap();
    assert_eq!(back.component_block(component).unwrap().shape(), [10, 10, 10]);

    let data = back.read_data(&store, component).unwrap();
    let read = data.as_f64().unwrap();
    assert_eq!(read.len(), 1000);
    assert!(read
        .iter()
        .zip(&values)
        .all(|(a, b)| a.to_bits() == b.to_bits()));
}

#[test]
fn gaussian_values_survive_a_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gaussian.sims");
    let g = gaussian(10);
    let values = gaussian_values(10);
    {
        let mut file = FileStore::create(&path).unwrap();
        g.project.write(&mut file).unwrap();
        g.project
            .write_data(&mut file, g.component, (&values).into())
            .unwrap();
        file.flush().unwrap();
    }

    let file = FileStore::open(&path).unwrap();
    let back = read_project(&file).unwrap();
    assert_eq!(back.name(), "gaussian");
    assert_eq!(back.to_string(), g.project.to_string());

    let component = back
        .discrete_field_block(
            back.discrete_field(
                back.field(back.find_field("gaussian").unwrap())
                    .unwrap()
                    .discrete_field("gaussian")
                    .unwrap(),
            )
            .unwrap()
            .block("gaussian-grid")
            .unwrap(),
        )
        .unwrap()
        .component("scalar")
        .unwrap();
    match back.read_data(&file, component).unwrap() {
        DataBuffer::F64(read) => assert_eq!(read, values),
        other => panic!("expected f64 data, got {:?}", other.datatype()),
    }
}

#[test]
fn coordinate_ranges_round_trip_without_datasets() {
    let g = gaussian(4);
    let mut store = MemStore::new();
    g.project.write(&mut store).unwrap();
    let back = read_project(&store).unwrap();

    let cs = back.find_coordinate_system("cartesian").unwrap();
    let fields: Vec<&str> = back
        .coordinate_system(cs)
        .unwrap()
        .coordinate_fields()
        .map(|(name, _)| name)
        .collect();
    assert_eq!(fields, ["x", "y", "z"]);

    for &c in &g.coordinates {
        let path = g.project.path_of(c).unwrap();
        assert!(!store.has_dataset(&path, "data"));
        match g.project.component(c).unwrap().data() {
            ComponentData::Range { delta, .. } => assert_eq!(delta.len(), 3),
            other => panic!("expected Range, got {other:?}"),
        }
    }
}

#[test]
fn reverse_references_are_rebuilt_on_read() {
    let g = gaussian(2);
    let mut store = MemStore::new();
    g.project.write(&mut store).unwrap();
    let back = read_project(&store).unwrap();

    let fields_on = |p: &Project| -> Vec<String> {
        let m = p.find_manifold("domain").unwrap();
        p.fields_on(m)
            .unwrap()
            .iter()
            .map(|&f| p.entity_name(f).unwrap().to_string())
            .collect()
    };
    assert_eq!(fields_on(&back), fields_on(&g.project));
    assert_eq!(fields_on(&back), ["gaussian", "coord-x", "coord-y", "coord-z"]);

    let d = back.find_manifold("domain").unwrap();
    let grid = back
        .discretization(back.manifold(d).unwrap().discretization("uniform").unwrap())
        .unwrap()
        .block("grid")
        .unwrap();
    assert_eq!(back.discrete_field_blocks_on(grid).unwrap().len(), 4);
    let global = back.find_configuration("global").unwrap();
    assert_eq!(
        back.entities_in(global).unwrap().len(),
        g.project
            .entities_in(g.project.find_configuration("global").unwrap())
            .unwrap()
            .len()
    );
}

// ── Multi-block ─────────────────────────────────────────────────

#[test]
fn multiblock_domain_is_covered_without_collisions() {
    let m = multiblock(40, 4);
    assert_eq!(m.blocks.len(), 64);

    let mut store = MemStore::new();
    m.project.write(&mut store).unwrap();
    let back = read_project(&store).unwrap();
    assert_eq!(back.to_string(), m.project.to_string());

    let domain = back.find_manifold("domain").unwrap();
    let disc = back
        .manifold(domain)
        .unwrap()
        .discretization("uniform")
        .unwrap();
    let regions: Vec<IndexBox> = back
        .discretization(disc)
        .unwrap()
        .blocks()
        .map(|(_, b)| back.discretization_block(b).unwrap().region().clone())
        .collect();
    assert_eq!(regions.len(), 64);
    assert_eq!(regions.iter().map(|b| b.len().unwrap()).sum::<usize>(), 64_000);

    let mut seen = HashSet::with_capacity(64_000);
    for region in &regions {
        for local in region.iter_local(StorageOrder::RowMajor) {
            let global = region.to_global(&local).unwrap();
            assert!(seen.insert(global.to_vec()), "collision at {global:?}");
        }
    }
    assert_eq!(seen.len(), 64_000);
}

#[test]
fn multiblock_data_lands_in_the_right_block() {
    let m = multiblock(8, 2);
    let mut store = MemStore::new();
    m.project.write(&mut store).unwrap();
    for (i, &(_, c)) in m.blocks.iter().enumerate() {
        let values = vec![i as f32; 64];
        m.project.write_data(&mut store, c, (&values).into()).unwrap();
    }

    let back = read_project(&store).unwrap();
    let field = back.find_field("density").unwrap();
    let df = back.field(field).unwrap().discrete_field("density").unwrap();
    for (i, (_, dfb)) in back.discrete_field(df).unwrap().blocks().enumerate() {
        let c = back
            .discrete_field_block(dfb)
            .unwrap()
            .component("scalar")
            .unwrap();
        let data = back.read_data(&store, c).unwrap();
        assert_eq!(data.as_f32().unwrap(), vec![i as f32; 64].as_slice());
    }
}

// ── Partial and exotic graphs ───────────────────────────────────

fn partial_symmetric() -> (Project, Vec<usize>) {
    let mut p = Project::new("partial");
    let cfg = p.create_configuration("global").unwrap();
    let tt = p
        .create_tensor_type("Stress", TensorShape::symmetric_tensor(3).unwrap())
        .unwrap();
    let m = p.create_manifold("body", cfg, 3).unwrap();
    let d = p.create_discretization(m, "mesh", cfg).unwrap();
    let b = p
        .create_discretization_block(d, "b0", &[2, 0, -1], &[3, 3, 3])
        .unwrap();
    p.set_active_region(
        b,
        vec![
            IndexBox::new(&[2, 0, -1], &[1, 3, 3]).unwrap(),
            IndexBox::new(&[4, 1, 0], &[1, 1, 1]).unwrap(),
        ],
    )
    .unwrap();
    let fine = p.create_discretization(m, "fine", cfg).unwrap();
    p.create_subdiscretization(m, "refine", d, fine, &[0.5, 0.5, 0.5], &[0.0, 0.25, 0.0])
        .unwrap();
    let ts = p.create_tangent_space("space", cfg, 3).unwrap();
    let basis = p.create_basis(ts, "xyz", cfg).unwrap();
    for (i, n) in ["x", "y", "z"].into_iter().enumerate() {
        p.create_basis_vector(basis, n, i).unwrap();
    }
    let f = p.create_field("stress", cfg, m, ts, tt).unwrap();
    let df = p.create_discrete_field(f, "stress", cfg, d, basis).unwrap();
    let dfb = p.create_discrete_field_block(df, "stress-b0", b).unwrap();
    let created = vec![4, 0, 2];
    for &i in &created {
        p.create_component(dfb, &format!("c{i}"), i).unwrap();
    }
    (p, created)
}

#[test]
fn partial_components_round_trip_exactly() {
    let (p, created) = partial_symmetric();
    let mut store = MemStore::new();
    p.write(&mut store).unwrap();
    let back = read_project(&store).unwrap();
    assert_eq!(back.to_string(), p.to_string());

    let f = back.find_field("stress").unwrap();
    let df = back.field(f).unwrap().discrete_field("stress").unwrap();
    let dfb = back.discrete_field(df).unwrap().block("stress-b0").unwrap();
    let indices: Vec<usize> = back
        .discrete_field_block(dfb)
        .unwrap()
        .components()
        .map(|(_, c)| back.component(c).unwrap().storage_index())
        .collect();
    assert_eq!(indices, created);
}

#[test]
fn active_regions_and_subdiscretizations_round_trip() {
    let (p, _) = partial_symmetric();
    let mut store = MemStore::new();
    p.write(&mut store).unwrap();
    let back = read_project(&store).unwrap();

    let m = back.find_manifold("body").unwrap();
    let d = back.manifold(m).unwrap().discretization("mesh").unwrap();
    let b = back.discretization(d).unwrap().block("b0").unwrap();
    let active = back.discretization_block(b).unwrap().active().unwrap();
    assert_eq!(active.len(), 2);
    assert_eq!(active[1].offset(), [4, 1, 0]);

    let s = back.manifold(m).unwrap().subdiscretization("refine").unwrap();
    let s = back.subdiscretization(s).unwrap();
    assert_eq!(s.factor(), [0.5, 0.5, 0.5]);
    assert_eq!(s.child_to_parent(&[2.0, 2.0, 2.0]), vec![1.0, 1.25, 1.0]);
}

#[test]
fn parameter_values_and_configurations_round_trip() {
    let mut p = Project::new("params");
    let g = p.create_configuration("global").unwrap();
    let restart = p.create_configuration("restart").unwrap();
    let it = p.create_parameter("iteration").unwrap();
    let v0 = p
        .create_parameter_value(it, "0", Value::Int(0))
        .unwrap();
    let v1 = p
        .create_parameter_value(it, "1", Value::Int(1))
        .unwrap();
    let label = p.create_parameter("label").unwrap();
    let untyped = p.create_parameter_value(label, "none", Value::None).unwrap();
    let text = p
        .create_parameter_value(label, "run", Value::Str("run-a".into()))
        .unwrap();
    let dt = p.create_parameter("dt").unwrap();
    let small = p
        .create_parameter_value(dt, "small", Value::Float(1e-3))
        .unwrap();
    p.add_parameter_value(g, v0).unwrap();
    p.add_parameter_value(g, untyped).unwrap();
    p.add_parameter_value(restart, v1).unwrap();
    p.add_parameter_value(restart, text).unwrap();
    p.add_parameter_value(restart, small).unwrap();

    let mut store = MemStore::new();
    p.write(&mut store).unwrap();
    let back = read_project(&store).unwrap();
    assert_eq!(back.to_string(), p.to_string());

    let restart = back.find_configuration("restart").unwrap();
    let values: Vec<&Value> = back
        .configuration(restart)
        .unwrap()
        .parameter_values()
        .iter()
        .map(|&v| back.parameter_value(v).unwrap().value())
        .collect();
    assert_eq!(
        values,
        [&Value::Int(1), &Value::Str("run-a".into()), &Value::Float(1e-3)]
    );
}

// ── Rewrites and options ────────────────────────────────────────

#[test]
fn rewriting_is_byte_stable() {
    let g = gaussian(3);
    let mut first = MemStore::new();
    g.project.write(&mut first).unwrap();
    let bytes = encoded(&first);

    g.project.write(&mut first).unwrap();
    assert_eq!(encoded(&first), bytes, "rewrite into the same store");

    let back = read_project(&first).unwrap();
    let mut second = MemStore::new();
    back.write(&mut second).unwrap();
    assert_eq!(encoded(&second), bytes, "re-read project written afresh");
}

/// Rewrite `project` into `store`, then check the store reads back as the
/// project and holds exactly what a fresh write would.
fn assert_rewrite_matches(project: &Project, store: &mut MemStore) {
    project.write(store).unwrap();
    let back = read_project(store).unwrap();
    assert_eq!(back.to_string(), project.to_string());
    let mut fresh = MemStore::new();
    project.write(&mut fresh).unwrap();
    assert_eq!(encoded(store), encoded(&fresh));
}

#[test]
fn rewrite_drops_a_cleared_active_region() {
    let mut s = Scaffold::new("rewrite");
    let block = s
        .project
        .create_discretization_block(s.discretization, "b0", &[0, 0, 0], &[8, 8, 8])
        .unwrap();
    let inner = IndexBox::new(&[1, 1, 1], &[2, 2, 2]).unwrap();
    s.project.set_active_region(block, vec![inner]).unwrap();
    let mut store = MemStore::new();
    s.project.write(&mut store).unwrap();

    s.project.set_region(block, &[0, 0, 0], &[8, 8, 8]).unwrap();
    assert!(s.project.discretization_block(block).unwrap().active().is_none());
    assert_rewrite_matches(&s.project, &mut store);
    assert!(!store.has_attribute(&s.project.path_of(block).unwrap(), "active"));
}

#[test]
fn rewrite_drops_the_dataset_of_a_component_turned_range() {
    let mut g = gaussian(2);
    let mut store = MemStore::new();
    g.project.write(&mut store).unwrap();
    let values = gaussian_values(2);
    g.project
        .write_data(&mut store, g.component, (&values).into())
        .unwrap();

    g.project
        .set_data_range(g.component, 1.0, &[1.0, 0.0, 0.0])
        .unwrap();
    assert_rewrite_matches(&g.project, &mut store);
    let path = g.project.path_of(g.component).unwrap();
    assert!(!store.has_dataset(&path, "data"));
    assert_eq!(store.element_count(), 0);
}

#[test]
fn rewrite_replaces_a_dataset_whose_datatype_changed() {
    let mut g = gaussian(3);
    let mut store = MemStore::new();
    g.project.write(&mut store).unwrap();

    g.project.set_data(g.component, Datatype::F32, &[3, 3, 3]).unwrap();
    assert_rewrite_matches(&g.project, &mut store);
    let info = store
        .dataset_info(&g.project.path_of(g.component).unwrap(), "data")
        .unwrap();
    assert_eq!(info.datatype, Datatype::F32);
}

#[test]
fn metadata_only_rewrite_keeps_matching_data() {
    let g = gaussian(2);
    let mut store = MemStore::new();
    g.project.write(&mut store).unwrap();
    let values = gaussian_values(2);
    g.project
        .write_data(&mut store, g.component, (&values).into())
        .unwrap();

    g.project
        .write_with(&mut store, &WriteConfig::METADATA_ONLY)
        .unwrap();
    let back = read_project(&store).unwrap();
    assert_eq!(back.to_string(), g.project.to_string());
    let data = g.project.read_data(&store, g.component).unwrap();
    assert_eq!(data.as_f64().unwrap(), values.as_slice());
}

#[test]
fn metadata_only_write_reads_back_without_data() {
    let g = gaussian(4);
    let mut store = MemStore::new();
    g.project
        .write_with(&mut store, &WriteConfig::METADATA_ONLY)
        .unwrap();
    assert_eq!(store.element_count(), 0);

    let back = read_project(&store).unwrap();
    let f = back.find_field("gaussian").unwrap();
    let df = back.field(f).unwrap().discrete_field("gaussian").unwrap();
    let dfb = back.discrete_field(df).unwrap().block("gaussian-grid").unwrap();
    let c = back.discrete_field_block(dfb).unwrap().component("scalar").unwrap();
    assert!(!back.component(c).unwrap().data().is_attached());
}

#[test]
fn partial_read_skips_discrete_fields() {
    let g = gaussian(4);
    let mut store = MemStore::new();
    g.project.write(&mut store).unwrap();

    let config = ReadConfig {
        discrete_fields: false,
        ..ReadConfig::default()
    };
    let back = read_project_with(&store, &config).unwrap();
    let f = back.find_field("gaussian").unwrap();
    assert_eq!(back.field(f).unwrap().discrete_fields().count(), 0);
    assert!(back.find_coordinate_system("cartesian").is_some());
    assert_eq!(
        back.find_tensor_type("Scalar3D").map(|t| back.tensor_type(t).unwrap().component_count()),
        Some(1)
    );
}

#[test]
fn datasets_are_created_with_the_declared_type_and_shape() {
    let g = gaussian(5);
    let mut store = MemStore::new();
    g.project.write(&mut store).unwrap();
    let info = store
        .dataset_info(&g.project.path_of(g.component).unwrap(), "data")
        .unwrap();
    assert_eq!(info.datatype, Datatype::F64);
    assert_eq!(info.shape, [5, 5, 5]);
}
