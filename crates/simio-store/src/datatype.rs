//! Element types, attribute values and dataset buffers.

use std::fmt;

/// Element type of a dataset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Datatype {
    /// 32-bit IEEE float.
    F32,
    /// 64-bit IEEE float.
    F64,
    /// 32-bit signed integer.
    I32,
    /// 64-bit signed integer.
    I64,
    /// Variable-length UTF-8 string.
    Str,
}

impl Datatype {
    /// Binary tag used by the file codec.
    pub fn tag(self) -> u8 {
        match self {
            Self::F32 => 0,
            Self::F64 => 1,
            Self::I32 => 2,
            Self::I64 => 3,
            Self::Str => 4,
        }
    }

    /// Inverse of [`tag`](Self::tag).
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::F32),
            1 => Some(Self::F64),
            2 => Some(Self::I32),
            3 => Some(Self::I64),
            4 => Some(Self::Str),
            _ => None,
        }
    }
}

impl fmt::Display for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::Str => "string",
        };
        f.write_str(name)
    }
}

/// Value of a group attribute.
#[derive(Clone, Debug, PartialEq)]
pub enum AttrValue {
    /// A single integer.
    Int(i64),
    /// A single float.
    Float(f64),
    /// A single string.
    Str(String),
    /// An integer vector.
    IntArray(Vec<i64>),
    /// A float vector.
    FloatArray(Vec<f64>),
    /// A string vector.
    StrArray(Vec<String>),
}

impl AttrValue {
    /// Binary tag used by the file codec.
    pub fn tag(&self) -> u8 {
        match self {
            Self::Int(_) => 0,
            Self::Float(_) => 1,
            Self::Str(_) => 2,
            Self::IntArray(_) => 3,
            Self::FloatArray(_) => 4,
            Self::StrArray(_) => 5,
        }
    }

    /// Short description of the variant, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
            Self::IntArray(_) => "int[]",
            Self::FloatArray(_) => "float[]",
            Self::StrArray(_) => "string[]",
        }
    }

    /// The integer, if this is an `Int`.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// The float, if this is a `Float`.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// The string, if this is a `Str`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(v) => Some(v),
            _ => None,
        }
    }

    /// The integers, if this is an `IntArray`.
    pub fn as_int_array(&self) -> Option<&[i64]> {
        match self {
            Self::IntArray(v) => Some(v),
            _ => None,
        }
    }

    /// The floats, if this is a `FloatArray`.
    pub fn as_float_array(&self) -> Option<&[f64]> {
        match self {
            Self::FloatArray(v) => Some(v),
            _ => None,
        }
    }

    /// The strings, if this is a `StrArray`.
    pub fn as_str_array(&self) -> Option<&[String]> {
        match self {
            Self::StrArray(v) => Some(v),
            _ => None,
        }
    }
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

/// Datatype and shape of a dataset, without its contents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatasetInfo {
    /// Element type.
    pub datatype: Datatype,
    /// Extent along each axis.
    pub shape: Vec<u64>,
}

impl DatasetInfo {
    /// Number of elements, or `None` if it does not fit in `usize`.
    pub fn len(&self) -> Option<usize> {
        element_count(&self.shape)
    }

    /// Whether the dataset holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }
}

/// Number of elements in a dataset of the given shape.
pub fn element_count(shape: &[u64]) -> Option<usize> {
    shape.iter().try_fold(1usize, |acc, &d| {
        usize::try_from(d).ok().and_then(|d| acc.checked_mul(d))
    })
}

/// A borrowed flat buffer passed to a dataset write.
///
/// The backend copies out of the slice; nothing is retained past the call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DataSlice<'a> {
    /// 32-bit floats.
    F32(&'a [f32]),
    /// 64-bit floats.
    F64(&'a [f64]),
    /// 32-bit integers.
    I32(&'a [i32]),
    /// 64-bit integers.
    I64(&'a [i64]),
    /// Strings.
    Str(&'a [String]),
}

impl DataSlice<'_> {
    /// Element type of the buffer.
    pub fn datatype(&self) -> Datatype {
        match self {
            Self::F32(_) => Datatype::F32,
            Self::F64(_) => Datatype::F64,
            Self::I32(_) => Datatype::I32,
            Self::I64(_) => Datatype::I64,
            Self::Str(_) => Datatype::Str,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        match self {
            Self::F32(v) => v.len(),
            Self::F64(v) => v.len(),
            Self::I32(v) => v.len(),
            Self::I64(v) => v.len(),
            Self::Str(v) => v.len(),
        }
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy into an owned buffer.
    pub fn to_buffer(&self) -> DataBuffer {
        match self {
            Self::F32(v) => DataBuffer::F32(v.to_vec()),
            Self::F64(v) => DataBuffer::F64(v.to_vec()),
            Self::I32(v) => DataBuffer::I32(v.to_vec()),
            Self::I64(v) => DataBuffer::I64(v.to_vec()),
            Self::Str(v) => DataBuffer::Str(v.to_vec()),
        }
    }
}

macro_rules! impl_slice_from {
    ($t:ty, $variant:ident) => {
        impl<'a> From<&'a [$t]> for DataSlice<'a> {
            fn from(v: &'a [$t]) -> Self {
                Self::$variant(v)
            }
        }

        impl<'a> From<&'a Vec<$t>> for DataSlice<'a> {
            fn from(v: &'a Vec<$t>) -> Self {
                Self::$variant(v.as_slice())
            }
        }
    };
}

impl_slice_from!(f32, F32);
impl_slice_from!(f64, F64);
impl_slice_from!(i32, I32);
impl_slice_from!(i64, I64);
impl_slice_from!(String, Str);

/// An owned flat buffer returned by a dataset read.
#[derive(Clone, Debug, PartialEq)]
pub enum DataBuffer {
    /// 32-bit floats.
    F32(Vec<f32>),
    /// 64-bit floats.
    F64(Vec<f64>),
    /// 32-bit integers.
    I32(Vec<i32>),
    /// 64-bit integers.
    I64(Vec<i64>),
    /// Strings.
    Str(Vec<String>),
}

impl DataBuffer {
    /// A zero-filled (or empty-string-filled) buffer.
    pub fn zeros(datatype: Datatype, len: usize) -> Self {
        match datatype {
            Datatype::F32 => Self::F32(vec![0.0; len]),
            Datatype::F64 => Self::F64(vec![0.0; len]),
            Datatype::I32 => Self::I32(vec![0; len]),
            Datatype::I64 => Self::I64(vec![0; len]),
            Datatype::Str => Self::Str(vec![String::new(); len]),
        }
    }

    /// Element type of the buffer.
    pub fn datatype(&self) -> Datatype {
        self.as_slice().datatype()
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrow as a [`DataSlice`].
    pub fn as_slice(&self) -> DataSlice<'_> {
        match self {
            Self::F32(v) => DataSlice::F32(v),
            Self::F64(v) => DataSlice::F64(v),
            Self::I32(v) => DataSlice::I32(v),
            Self::I64(v) => DataSlice::I64(v),
            Self::Str(v) => DataSlice::Str(v),
        }
    }

    /// The values, if this is an `F64` buffer.
    pub fn as_f64(&self) -> Option<&[f64]> {
        match self {
            Self::F64(v) => Some(v),
            _ => None,
        }
    }

    /// The values, if this is an `F32` buffer.
    pub fn as_f32(&self) -> Option<&[f32]> {
        match self {
            Self::F32(v) => Some(v),
            _ => None,
        }
    }

    /// The values, if this is an `I32` buffer.
    pub fn as_i32(&self) -> Option<&[i32]> {
        match self {
            Self::I32(v) => Some(v),
            _ => None,
        }
    }

    /// The values, if this is an `I64` buffer.
    pub fn as_i64(&self) -> Option<&[i64]> {
        match self {
            Self::I64(v) => Some(v),
            _ => None,
        }
    }

    /// Overwrite this buffer's contents from a slice of the same type and length.
    pub(crate) fn copy_from(&mut self, src: DataSlice<'_>) -> bool {
        match (self, src) {
            (Self::F32(d), DataSlice::F32(s)) if d.len() == s.len() => d.copy_from_slice(s),
            (Self::F64(d), DataSlice::F64(s)) if d.len() == s.len() => d.copy_from_slice(s),
            (Self::I32(d), DataSlice::I32(s)) if d.len() == s.len() => d.copy_from_slice(s),
            (Self::I64(d), DataSlice::I64(s)) if d.len() == s.len() => d.copy_from_slice(s),
            (Self::Str(d), DataSlice::Str(s)) if d.len() == s.len() => d.clone_from_slice(s),
            _ => return false,
        }
        true
    }
}
