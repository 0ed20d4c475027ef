//! Binary encode/decode for store files.
//!
//! All integers are little-endian. Strings are length-prefixed with a `u32`
//! length. Groups are written recursively: attributes, then datasets, then
//! child groups, each section preceded by its `u32` entry count. There is no
//! compression and no alignment padding.

use std::io::{self, Read, Write};

use crate::datatype::{element_count, AttrValue, DataBuffer, Datatype};
use crate::error::StoreError;
use crate::memory::{Dataset, GroupNode, MemStore};
use crate::path::GroupPath;
use crate::{FORMAT_VERSION, MAGIC};

/// Deepest group nesting accepted by the decoder.
pub const MAX_DEPTH: usize = 256;

/// Cap on speculative preallocation while decoding untrusted lengths.
const MAX_PREALLOC: usize = 1 << 16;

fn malformed(detail: impl Into<String>) -> StoreError {
    StoreError::Malformed {
        detail: detail.into(),
    }
}

// ── Primitive writers ───────────────────────────────────────────

fn write_u8(w: &mut dyn Write, v: u8) -> Result<(), StoreError> {
    w.write_all(&[v])?;
    Ok(())
}

fn write_u32_le(w: &mut dyn Write, v: u32) -> Result<(), StoreError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

fn write_u64_le(w: &mut dyn Write, v: u64) -> Result<(), StoreError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

fn write_count(w: &mut dyn Write, n: usize) -> Result<(), StoreError> {
    let n = u32::try_from(n).map_err(|_| malformed(format!("count {n} exceeds u32")))?;
    write_u32_le(w, n)
}

fn write_str(w: &mut dyn Write, s: &str) -> Result<(), StoreError> {
    write_count(w, s.len())?;
    w.write_all(s.as_bytes())?;
    Ok(())
}

// ── Primitive readers ───────────────────────────────────────────

fn read_exact(r: &mut dyn Read, buf: &mut [u8]) -> Result<(), StoreError> {
    r.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => malformed("unexpected end of data"),
        _ => StoreError::Io(e),
    })
}

fn read_u8(r: &mut dyn Read) -> Result<u8, StoreError> {
    let mut buf = [0u8; 1];
    read_exact(r, &mut buf)?;
    Ok(buf[0])
}

fn read_u32_le(r: &mut dyn Read) -> Result<u32, StoreError> {
    let mut buf = [0u8; 4];
    read_exact(r, &mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_str(r: &mut dyn Read) -> Result<String, StoreError> {
    let len = read_u32_le(r)? as usize;
    let mut buf = Vec::with_capacity(len.min(MAX_PREALLOC));
    Read::take(&mut *r, len as u64).read_to_end(&mut buf)?;
    if buf.len() != len {
        return Err(malformed("unexpected end of data in string"));
    }
    String::from_utf8(buf).map_err(|e| malformed(format!("invalid UTF-8 string: {e}")))
}

/// Read `count` fixed-width little-endian values.
fn read_array<T, const N: usize>(
    r: &mut dyn Read,
    count: usize,
    from_le: fn([u8; N]) -> T,
) -> Result<Vec<T>, StoreError> {
    let mut out = Vec::with_capacity(count.min(MAX_PREALLOC));
    let mut buf = [0u8; N];
    for _ in 0..count {
        read_exact(r, &mut buf)?;
        out.push(from_le(buf));
    }
    Ok(out)
}

fn read_strings(r: &mut dyn Read, count: usize) -> Result<Vec<String>, StoreError> {
    let mut out = Vec::with_capacity(count.min(MAX_PREALLOC));
    for _ in 0..count {
        out.push(read_str(r)?);
    }
    Ok(out)
}

// ── Attribute encode/decode ─────────────────────────────────────

fn encode_attr(w: &mut dyn Write, value: &AttrValue) -> Result<(), StoreError> {
    write_u8(w, value.tag())?;
    match value {
        AttrValue::Int(v) => w.write_all(&v.to_le_bytes())?,
        AttrValue::Float(v) => w.write_all(&v.to_le_bytes())?,
        AttrValue::Str(s) => write_str(w, s)?,
        AttrValue::IntArray(vs) => {
            write_count(w, vs.len())?;
            for v in vs {
                w.write_all(&v.to_le_bytes())?;
            }
        }
        AttrValue::FloatArray(vs) => {
            write_count(w, vs.len())?;
            for v in vs {
                w.write_all(&v.to_le_bytes())?;
            }
        }
        AttrValue::StrArray(vs) => {
            write_count(w, vs.len())?;
            for s in vs {
                write_str(w, s)?;
            }
        }
    }
    Ok(())
}

fn decode_attr(r: &mut dyn Read) -> Result<AttrValue, StoreError> {
    let tag = read_u8(r)?;
    let value = match tag {
        0 => AttrValue::Int(i64::from_le_bytes(read_fixed(r)?)),
        1 => AttrValue::Float(f64::from_le_bytes(read_fixed(r)?)),
        2 => AttrValue::Str(read_str(r)?),
        3 => {
            let n = read_u32_le(r)? as usize;
            AttrValue::IntArray(read_array(r, n, i64::from_le_bytes)?)
        }
        4 => {
            let n = read_u32_le(r)? as usize;
            AttrValue::FloatArray(read_array(r, n, f64::from_le_bytes)?)
        }
        5 => {
            let n = read_u32_le(r)? as usize;
            AttrValue::StrArray(read_strings(r, n)?)
        }
        _ => return Err(malformed(format!("unknown attribute tag {tag}"))),
    };
    Ok(value)
}

fn read_fixed<const N: usize>(r: &mut dyn Read) -> Result<[u8; N], StoreError> {
    let mut buf = [0u8; N];
    read_exact(r, &mut buf)?;
    Ok(buf)
}

// ── Dataset encode/decode ───────────────────────────────────────

fn encode_dataset(w: &mut dyn Write, ds: &Dataset) -> Result<(), StoreError> {
    write_u8(w, ds.data.datatype().tag())?;
    write_count(w, ds.shape.len())?;
    for &d in &ds.shape {
        write_u64_le(w, d)?;
    }
    match &ds.data {
        DataBuffer::F32(vs) => vs.iter().try_for_each(|v| w.write_all(&v.to_le_bytes()))?,
        DataBuffer::F64(vs) => vs.iter().try_for_each(|v| w.write_all(&v.to_le_bytes()))?,
        DataBuffer::I32(vs) => vs.iter().try_for_each(|v| w.write_all(&v.to_le_bytes()))?,
        DataBuffer::I64(vs) => vs.iter().try_for_each(|v| w.write_all(&v.to_le_bytes()))?,
        DataBuffer::Str(vs) => {
            for s in vs {
                write_str(w, s)?;
            }
        }
    }
    Ok(())
}

fn decode_dataset(r: &mut dyn Read) -> Result<Dataset, StoreError> {
    let tag = read_u8(r)?;
    let datatype =
        Datatype::from_tag(tag).ok_or_else(|| malformed(format!("unknown datatype tag {tag}")))?;
    let rank = read_u32_le(r)? as usize;
    let shape = read_array(r, rank, u64::from_le_bytes)?;
    let len = element_count(&shape).ok_or_else(|| StoreError::DatasetTooLarge {
        shape: shape.clone(),
    })?;
    let data = match datatype {
        Datatype::F32 => DataBuffer::F32(read_array(r, len, f32::from_le_bytes)?),
        Datatype::F64 => DataBuffer::F64(read_array(r, len, f64::from_le_bytes)?),
        Datatype::I32 => DataBuffer::I32(read_array(r, len, i32::from_le_bytes)?),
        Datatype::I64 => DataBuffer::I64(read_array(r, len, i64::from_le_bytes)?),
        Datatype::Str => DataBuffer::Str(read_strings(r, len)?),
    };
    Ok(Dataset { shape, data })
}

// ── Group encode/decode ─────────────────────────────────────────

fn encode_group(w: &mut dyn Write, store: &MemStore, node: &GroupNode) -> Result<(), StoreError> {
    write_count(w, node.attributes.len())?;
    for (name, value) in &node.attributes {
        write_str(w, name)?;
        encode_attr(w, value)?;
    }
    write_count(w, node.datasets.len())?;
    for (name, ds) in &node.datasets {
        write_str(w, name)?;
        encode_dataset(w, ds)?;
    }
    write_count(w, node.children.len())?;
    for (name, &child) in &node.children {
        write_str(w, name)?;
        encode_group(w, store, store.node(child))?;
    }
    Ok(())
}

fn decode_group(
    r: &mut dyn Read,
    store: &mut MemStore,
    index: usize,
    depth: usize,
) -> Result<(), StoreError> {
    if depth > MAX_DEPTH {
        return Err(malformed(format!("groups nested deeper than {MAX_DEPTH}")));
    }
    let n_attrs = read_u32_le(r)?;
    for _ in 0..n_attrs {
        let name = read_str(r)?;
        let value = decode_attr(r)?;
        if store.node_mut(index).attributes.insert(name.clone(), value).is_some() {
            return Err(malformed(format!("duplicate attribute '{name}'")));
        }
    }
    let n_datasets = read_u32_le(r)?;
    for _ in 0..n_datasets {
        let name = read_str(r)?;
        let ds = decode_dataset(r)?;
        if store.node_mut(index).datasets.insert(name.clone(), ds).is_some() {
            return Err(malformed(format!("duplicate dataset '{name}'")));
        }
    }
    let n_children = read_u32_le(r)?;
    for _ in 0..n_children {
        let name = read_str(r)?;
        if !GroupPath::is_valid_component(&name) {
            return Err(malformed(format!("invalid group name '{name}'")));
        }
        if store.node(index).children.contains_key(&name) {
            return Err(malformed(format!("duplicate group '{name}'")));
        }
        let child = store.push_child(index, name);
        decode_group(r, store, child, depth + 1)?;
    }
    Ok(())
}

// ── Store encode/decode ─────────────────────────────────────────

/// Encode a whole store: magic, version byte, then the root group.
pub fn encode_store(w: &mut dyn Write, store: &MemStore) -> Result<(), StoreError> {
    w.write_all(&MAGIC)?;
    write_u8(w, FORMAT_VERSION)?;
    encode_group(w, store, store.node(0))
}

/// Decode a whole store, rejecting bad magic, unknown versions, truncated
/// input and trailing bytes.
pub fn decode_store(r: &mut dyn Read) -> Result<MemStore, StoreError> {
    let mut magic = [0u8; 4];
    read_exact(r, &mut magic).map_err(|_| StoreError::InvalidMagic)?;
    if magic != MAGIC {
        return Err(StoreError::InvalidMagic);
    }
    let version = read_u8(r)?;
    if version != FORMAT_VERSION {
        return Err(StoreError::UnsupportedVersion { found: version });
    }
    let mut store = MemStore::new();
    decode_group(r, &mut store, 0, 0)?;
    let mut trailing = [0u8; 1];
    if r.read(&mut trailing)? != 0 {
        return Err(malformed("trailing bytes after root group"));
    }
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Storage;
    use crate::datatype::DataSlice;

    fn sample() -> MemStore {
        let mut s = MemStore::new();
        let root = GroupPath::root();
        s.set_attribute(&root, "type", "Project".into()).unwrap();
        s.set_attribute(&root, "format_version", AttrValue::Int(1)).unwrap();
        let fields = root.child("fields");
        s.create_group(&fields).unwrap();
        let rho = fields.child("rho");
        s.create_group(&rho).unwrap();
        s.set_attribute(&rho, "shape", AttrValue::IntArray(vec![2, 2])).unwrap();
        s.set_attribute(&rho, "delta", AttrValue::FloatArray(vec![0.5, -1.0]))
            .unwrap();
        s.set_attribute(
            &rho,
            "symmetries",
            AttrValue::StrArray(vec!["sym:0,1".into()]),
        )
        .unwrap();
        s.create_dataset(&rho, "data", Datatype::F64, &[2, 2]).unwrap();
        s.write_dataset(&rho, "data", DataSlice::F64(&[1.0, 2.0, 3.0, f64::NAN]))
            .unwrap();
        s.create_dataset(&rho, "labels", Datatype::Str, &[2]).unwrap();
        s.write_dataset(&rho, "labels", DataSlice::Str(&["a".into(), "bc".into()]))
            .unwrap();
        s.create_group(&root.child("manifolds")).unwrap();
        s
    }

    fn encode(s: &MemStore) -> Vec<u8> {
        let mut buf = Vec::new();
        encode_store(&mut buf, s).unwrap();
        buf
    }

    #[test]
    fn store_round_trips_structure_and_bits() {
        let s = sample();
        let bytes = encode(&s);
        let back = decode_store(&mut bytes.as_slice()).unwrap();
        let root = GroupPath::root();
        assert_eq!(back.groups(&root).unwrap(), ["fields", "manifolds"]);
        let rho: GroupPath = "/fields/rho".parse().unwrap();
        let data = back.read_dataset(&rho, "data").unwrap();
        let data = data.as_f64().unwrap();
        assert_eq!(data[..3], [1.0, 2.0, 3.0]);
        assert!(data[3].is_nan());
        assert_eq!(back.attribute(&rho, "shape").unwrap(), AttrValue::IntArray(vec![2, 2]));
        // Re-encoding the decoded store reproduces the same bytes.
        assert_eq!(encode(&back), bytes);
    }

    #[test]
    fn bad_magic_is_rejected() {
        let mut bytes = encode(&sample());
        bytes[0] = b'X';
        match decode_store(&mut bytes.as_slice()) {
            Err(StoreError::InvalidMagic) => {}
            other => panic!("expected InvalidMagic, got {other:?}"),
        }
        match decode_store(&mut &b"SI"[..]) {
            Err(StoreError::InvalidMagic) => {}
            other => panic!("expected InvalidMagic, got {other:?}"),
        }
    }

    #[test]
    fn unknown_version_is_rejected() {
        let mut bytes = encode(&sample());
        bytes[4] = 99;
        match decode_store(&mut bytes.as_slice()) {
            Err(StoreError::UnsupportedVersion { found: 99 }) => {}
            other => panic!("expected UnsupportedVersion, got {other:?}"),
        }
    }

    #[test]
    fn truncated_input_is_malformed() {
        let bytes = encode(&sample());
        for cut in [5, bytes.len() / 2, bytes.len() - 1] {
            match decode_store(&mut &bytes[..cut]) {
                Err(StoreError::Malformed { .. }) => {}
                other => panic!("expected Malformed at cut {cut}, got {other:?}"),
            }
        }
    }

    #[test]
    fn trailing_bytes_are_malformed() {
        let mut bytes = encode(&sample());
        bytes.push(0);
        match decode_store(&mut bytes.as_slice()) {
            Err(StoreError::Malformed { detail }) => assert!(detail.contains("trailing")),
            other => panic!("expected Malformed, got {other:?}"),
        }
    }

    #[test]
    fn huge_declared_length_does_not_allocate() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&MAGIC);
        bytes.push(FORMAT_VERSION);
        bytes.extend_from_slice(&1u32.to_le_bytes());
        bytes.extend_from_slice(&u32::MAX.to_le_bytes());
        match decode_store(&mut bytes.as_slice()) {
            Err(StoreError::Malformed { .. }) => {}
            other => panic!("expected Malformed, got {other:?}"),
        }
    }

    // ── Properties ──────────────────────────────────────────────

    use proptest::prelude::*;

    fn attr_value() -> impl Strategy<Value = AttrValue> {
        prop_oneof![
            any::<i64>().prop_map(AttrValue::Int),
            (-1e9f64..1e9).prop_map(AttrValue::Float),
            "[a-z/:,0-9]{0,12}".prop_map(AttrValue::Str),
            prop::collection::vec(any::<i64>(), 0..5).prop_map(AttrValue::IntArray),
            prop::collection::vec(-1e9f64..1e9, 0..5).prop_map(AttrValue::FloatArray),
            prop::collection::vec("[a-z]{0,6}", 0..4).prop_map(AttrValue::StrArray),
        ]
    }

    proptest! {
        /// Any tree of groups with attributes and integer datasets decodes
        /// to an equal store and re-encodes to the same bytes.
        #[test]
        fn arbitrary_stores_round_trip(
            groups in prop::collection::vec(("[a-z]{1,6}", 0usize..4), 0..12),
            attrs in prop::collection::vec((0usize..12, "[a-z_]{1,8}", attr_value()), 0..16),
            datasets in prop::collection::vec((0usize..12, prop::collection::vec(any::<i64>(), 0..10)), 0..4),
        ) {
            let mut s = MemStore::new();
            let mut paths = vec![GroupPath::root()];
            for (name, parent) in groups {
                let path = paths[parent % paths.len()].child(&name);
                s.create_group(&path).unwrap();
                if !paths.contains(&path) {
                    paths.push(path);
                }
            }
            for (at, name, value) in attrs {
                s.set_attribute(&paths[at % paths.len()], &name, value).unwrap();
            }
            for (i, (at, values)) in datasets.into_iter().enumerate() {
                let path = &paths[at % paths.len()];
                let name = format!("d{i}");
                s.create_dataset(path, &name, Datatype::I64, &[values.len() as u64]).unwrap();
                s.write_dataset(path, &name, DataSlice::I64(&values)).unwrap();
            }

            let bytes = encode(&s);
            let back = decode_store(&mut bytes.as_slice()).unwrap();
            prop_assert_eq!(&back, &s);
            prop_assert_eq!(encode(&back), bytes);
        }
    }
}
