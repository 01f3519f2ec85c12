use itertools::Itertools;
use smallvec::SmallVec;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::ops::{Add, Index, IndexMut};
use std::str::FromStr;
use thiserror::Error;

pub type Array = SmallVec<[i32; 5]>;

/// Extent of a dimension whose size is not resolved yet.
pub const DYNAMIC: i32 = -1;

const INVALID_REPR: &str = "[invalid]";

#[derive(Error, Debug, Eq, PartialEq)]
pub enum ShapeError {
    #[error("shape is invalid")]
    InvalidShapeAccess,

    #[error("index out of range, expected index in range of 0..{}, but {} is given.", .len, .index)]
    OutOfBounds { index: usize, len: usize },

    #[error("shape has dynamic dimensions")]
    DynamicShape,

    #[error("invalid shape extent {}, size should be at least 0 or set to -1 for dynamic", .0)]
    InvalidExtent(i32),

    #[error("shape size overflows")]
    Overflow,

    #[error("cannot parse shape from {:?}", .0)]
    Parse(String),
}

pub fn is_dynamic_dim(extent: i32) -> bool {
    extent == DYNAMIC
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
enum Extents {
    #[default]
    Absent,
    Present(Array),
}

/// Ordered list of dimension extents, or no extents at all.
///
/// An absent shape is distinct from a present shape of rank 0: the former has
/// no dimension data, the latter describes a scalar. Equality and `Display`
/// are defined for both states; every other content accessor fails with
/// [`ShapeError::InvalidShapeAccess`] on an absent shape.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Shape {
    extents: Extents,
}

impl Shape {
    pub fn new() -> Shape {
        Shape::absent()
    }

    pub fn absent() -> Shape {
        Shape {
            extents: Extents::Absent,
        }
    }

    pub fn from_extents(extents: &[i32]) -> Shape {
        Shape {
            extents: Extents::Present(Array::from_slice(extents)),
        }
    }

    pub fn valid(&self) -> bool {
        matches!(self.extents, Extents::Present(_))
    }

    /// Non-failing view of the extents, `None` when absent.
    pub fn dims(&self) -> Option<&[i32]> {
        match &self.extents {
            Extents::Present(arr) => Some(arr),
            Extents::Absent => None,
        }
    }

    pub fn extents(&self) -> Result<&[i32], ShapeError> {
        self.dims().ok_or(ShapeError::InvalidShapeAccess)
    }

    pub fn extents_mut(&mut self) -> Result<&mut Array, ShapeError> {
        match &mut self.extents {
            Extents::Present(arr) => Ok(arr),
            Extents::Absent => Err(ShapeError::InvalidShapeAccess),
        }
    }

    pub fn into_vec(self) -> Result<Vec<i32>, ShapeError> {
        match self.extents {
            Extents::Present(arr) => Ok(arr.into_vec()),
            Extents::Absent => Err(ShapeError::InvalidShapeAccess),
        }
    }

    /// Number of dimensions.
    pub fn size(&self) -> Result<usize, ShapeError> {
        Ok(self.extents()?.len())
    }

    pub fn dim(&self, index: usize) -> Result<i32, ShapeError> {
        self.get(index).copied()
    }

    pub fn dim_mut(&mut self, index: usize) -> Result<&mut i32, ShapeError> {
        let extents = self.extents_mut()?;
        let len = extents.len();
        extents
            .get_mut(index)
            .ok_or(ShapeError::OutOfBounds { index, len })
    }

    fn get(&self, index: usize) -> Result<&i32, ShapeError> {
        let extents = self.extents()?;
        extents.get(index).ok_or(ShapeError::OutOfBounds {
            index,
            len: extents.len(),
        })
    }

    /// Extents of `self` followed by extents of `other`.
    ///
    /// This is how an outer call shape is composed with an inner
    /// per-invocation shape, e.g. `[4] + [16, 16] = [4, 16, 16]`.
    pub fn concat(&self, other: &Shape) -> Result<Shape, ShapeError> {
        let lhs = self.extents()?;
        let rhs = other.extents()?;
        Ok(Shape {
            extents: Extents::Present(lhs.iter().chain(rhs.iter()).copied().collect()),
        })
    }

    /// Whether no dimension is [`DYNAMIC`].
    pub fn concrete(&self) -> Result<bool, ShapeError> {
        Ok(!self.extents()?.iter().copied().any(is_dynamic_dim))
    }

    /// Checks that every extent is either non-negative or [`DYNAMIC`].
    pub fn validate(&self) -> Result<(), ShapeError> {
        match self.extents()?.iter().find(|&&e| e < DYNAMIC) {
            Some(&e) => Err(ShapeError::InvalidExtent(e)),
            None => Ok(()),
        }
    }

    /// Total element count if this shape described a contiguous array.
    /// A rank 0 shape counts a single element.
    pub fn element_count(&self) -> Result<usize, ShapeError> {
        self.extents()?.iter().try_fold(1_usize, |count, &extent| {
            if is_dynamic_dim(extent) {
                return Err(ShapeError::DynamicShape);
            }
            let extent = usize::try_from(extent).map_err(|_| ShapeError::InvalidExtent(extent))?;
            count.checked_mul(extent).ok_or(ShapeError::Overflow)
        })
    }

    /// Row-major strides of a contiguous buffer of this shape, with the last
    /// dimension moving fastest. An absent shape yields an absent shape.
    ///
    /// Panics if a stride does not fit `i32`; see `try_calc_contiguous_strides`.
    pub fn calc_contiguous_strides(&self) -> Shape {
        match self.try_calc_contiguous_strides() {
            Ok(strides) => strides,
            Err(e) => panic!("{}", e),
        }
    }

    /// Checked form of `calc_contiguous_strides`, failing with
    /// [`ShapeError::Overflow`] when a stride does not fit `i32`.
    /// [`DYNAMIC`] extents are multiplied through as-is.
    pub fn try_calc_contiguous_strides(&self) -> Result<Shape, ShapeError> {
        let extents = match self.dims() {
            Some(extents) => extents,
            None => return Ok(Shape::absent()),
        };

        // the outermost extent never contributes to a stride
        let mut strides = Array::from_elem(1, extents.len());
        for i in (0..extents.len().saturating_sub(1)).rev() {
            strides[i] = strides[i + 1]
                .checked_mul(extents[i + 1])
                .ok_or(ShapeError::Overflow)?;
        }

        Ok(Shape {
            extents: Extents::Present(strides),
        })
    }
}

impl Display for Shape {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.dims() {
            Some(extents) => write!(f, "[{}]", extents.iter().join(", ")),
            None => f.write_str(INVALID_REPR),
        }
    }
}

impl FromStr for Shape {
    type Err = ShapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed == INVALID_REPR {
            return Ok(Shape::absent());
        }

        let inner = trimmed
            .strip_prefix('[')
            .and_then(|t| t.strip_suffix(']'))
            .ok_or_else(|| ShapeError::Parse(s.to_string()))?
            .trim();

        if inner.is_empty() {
            return Ok(Shape::from_extents(&[]));
        }

        let extents: Array = inner
            .split(',')
            .map(|t| t.trim().parse::<i32>())
            .collect::<Result<_, _>>()
            .map_err(|_| ShapeError::Parse(s.to_string()))?;

        Ok(Shape {
            extents: Extents::Present(extents),
        })
    }
}

impl From<Option<Vec<i32>>> for Shape {
    fn from(extents: Option<Vec<i32>>) -> Self {
        match extents {
            Some(vec) => Shape::from(vec),
            None => Shape::absent(),
        }
    }
}

impl From<Vec<i32>> for Shape {
    fn from(extents: Vec<i32>) -> Self {
        Shape {
            extents: Extents::Present(Array::from_vec(extents)),
        }
    }
}

impl From<&[i32]> for Shape {
    fn from(extents: &[i32]) -> Self {
        Shape::from_extents(extents)
    }
}

impl<const N: usize> From<[i32; N]> for Shape {
    fn from(extents: [i32; N]) -> Self {
        Shape::from_extents(&extents)
    }
}

impl From<Array> for Shape {
    fn from(extents: Array) -> Self {
        Shape {
            extents: Extents::Present(extents),
        }
    }
}

// Indexing panics like slice indexing does; use `dim` / `dim_mut` for the checked forms.
impl Index<usize> for Shape {
    type Output = i32;

    fn index(&self, index: usize) -> &i32 {
        match self.get(index) {
            Ok(extent) => extent,
            Err(e) => panic!("{}", e),
        }
    }
}

impl IndexMut<usize> for Shape {
    fn index_mut(&mut self, index: usize) -> &mut i32 {
        match self.dim_mut(index) {
            Ok(extent) => extent,
            Err(e) => panic!("{}", e),
        }
    }
}

impl Add for &Shape {
    type Output = Result<Shape, ShapeError>;

    fn add(self, rhs: &Shape) -> Self::Output {
        self.concat(rhs)
    }
}

impl Add for Shape {
    type Output = Result<Shape, ShapeError>;

    fn add(self, rhs: Shape) -> Self::Output {
        self.concat(&rhs)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Shape {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serde::Serialize::serialize(&self.dims(), serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Shape {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let extents = <Option<Vec<i32>> as serde::Deserialize>::deserialize(deserializer)?;
        Ok(Shape::from(extents))
    }
}

#[macro_export]
macro_rules! shape {
    ($($extent:expr),* $(,)?) => {
        $crate::shape::Shape::from_extents(&[$($extent),*])
    };
}
