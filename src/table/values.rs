// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Typed cell values.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use super::TableError;
use crate::{c32, c64};

/// The element type of a column.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, Serialize, Deserialize,
)]
pub enum DataType {
    Bool,
    UChar,
    Short,
    UShort,
    Int,
    UInt,
    Float,
    Double,
    Complex,
    DComplex,
    String,
}

impl DataType {
    /// The number of bytes one element occupies in caller buffers. Strings
    /// have no fixed size.
    pub fn size_bytes(self) -> Option<usize> {
        match self {
            DataType::Bool | DataType::UChar => Some(1),
            DataType::Short | DataType::UShort => Some(2),
            DataType::Int | DataType::UInt | DataType::Float => Some(4),
            DataType::Double | DataType::Complex => Some(8),
            DataType::DComplex => Some(16),
            DataType::String => None,
        }
    }
}

/// A homogeneous sequence of elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Values {
    Bool(Vec<bool>),
    UChar(Vec<u8>),
    Short(Vec<i16>),
    UShort(Vec<u16>),
    Int(Vec<i32>),
    UInt(Vec<u32>),
    Float(Vec<f32>),
    Double(Vec<f64>),
    Complex(Vec<c32>),
    DComplex(Vec<c64>),
    String(Vec<String>),
}

macro_rules! with_values {
    ($values:expr, $v:ident => $body:expr) => {
        match $values {
            Values::Bool($v) => $body,
            Values::UChar($v) => $body,
            Values::Short($v) => $body,
            Values::UShort($v) => $body,
            Values::Int($v) => $body,
            Values::UInt($v) => $body,
            Values::Float($v) => $body,
            Values::Double($v) => $body,
            Values::Complex($v) => $body,
            Values::DComplex($v) => $body,
            Values::String($v) => $body,
        }
    };
}

macro_rules! map_values {
    ($values:expr, $v:ident => $body:expr) => {
        match $values {
            Values::Bool($v) => Values::Bool($body),
            Values::UChar($v) => Values::UChar($body),
            Values::Short($v) => Values::Short($body),
            Values::UShort($v) => Values::UShort($body),
            Values::Int($v) => Values::Int($body),
            Values::UInt($v) => Values::UInt($body),
            Values::Float($v) => Values::Float($body),
            Values::Double($v) => Values::Double($body),
            Values::Complex($v) => Values::Complex($body),
            Values::DComplex($v) => Values::DComplex($body),
            Values::String($v) => Values::String($body),
        }
    };
}

impl Values {
    /// `n` default-valued (zero, false or empty) elements.
    pub fn zeros(data_type: DataType, n: usize) -> Values {
        match data_type {
            DataType::Bool => Values::Bool(vec![false; n]),
            DataType::UChar => Values::UChar(vec![0; n]),
            DataType::Short => Values::Short(vec![0; n]),
            DataType::UShort => Values::UShort(vec![0; n]),
            DataType::Int => Values::Int(vec![0; n]),
            DataType::UInt => Values::UInt(vec![0; n]),
            DataType::Float => Values::Float(vec![0.0; n]),
            DataType::Double => Values::Double(vec![0.0; n]),
            DataType::Complex => Values::Complex(vec![c32::default(); n]),
            DataType::DComplex => Values::DComplex(vec![c64::default(); n]),
            DataType::String => Values::String(vec![String::new(); n]),
        }
    }

    pub fn data_type(&self) -> DataType {
        match self {
            Values::Bool(_) => DataType::Bool,
            Values::UChar(_) => DataType::UChar,
            Values::Short(_) => DataType::Short,
            Values::UShort(_) => DataType::UShort,
            Values::Int(_) => DataType::Int,
            Values::UInt(_) => DataType::UInt,
            Values::Float(_) => DataType::Float,
            Values::Double(_) => DataType::Double,
            Values::Complex(_) => DataType::Complex,
            Values::DComplex(_) => DataType::DComplex,
            Values::String(_) => DataType::String,
        }
    }

    pub fn len(&self) -> usize {
        with_values!(self, v => v.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A copy of `len` elements starting at `start`.
    pub fn slice(&self, start: usize, len: usize) -> Values {
        map_values!(self, v => v[start..start + len].to_vec())
    }

    /// Append the elements of `other`, which must have the same type.
    pub(crate) fn extend(&mut self, other: Values) -> Result<(), TableError> {
        let expected = self.data_type();
        match (self, other) {
            (Values::Bool(a), Values::Bool(b)) => a.extend(b),
            (Values::UChar(a), Values::UChar(b)) => a.extend(b),
            (Values::Short(a), Values::Short(b)) => a.extend(b),
            (Values::UShort(a), Values::UShort(b)) => a.extend(b),
            (Values::Int(a), Values::Int(b)) => a.extend(b),
            (Values::UInt(a), Values::UInt(b)) => a.extend(b),
            (Values::Float(a), Values::Float(b)) => a.extend(b),
            (Values::Double(a), Values::Double(b)) => a.extend(b),
            (Values::Complex(a), Values::Complex(b)) => a.extend(b),
            (Values::DComplex(a), Values::DComplex(b)) => a.extend(b),
            (Values::String(a), Values::String(b)) => a.extend(b),
            (_, b) => {
                return Err(TableError::BadDataType {
                    column: String::new(),
                    expected,
                    got: b.data_type(),
                })
            }
        }
        Ok(())
    }
}

/// The contents of one table cell. Array shapes are listed fastest-varying
/// axis first; a scalar cell has an empty shape and one element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub shape: Vec<usize>,
    pub values: Values,
}

impl Cell {
    pub fn scalar<T: Element>(v: T) -> Cell {
        Cell {
            shape: vec![],
            values: T::into_values(vec![v]),
        }
    }

    pub fn array<T: Element>(shape: Vec<usize>, values: Vec<T>) -> Cell {
        Cell {
            shape,
            values: T::into_values(values),
        }
    }

    /// A one-dimensional array cell.
    pub fn vector<T: Element>(values: Vec<T>) -> Cell {
        Cell {
            shape: vec![values.len()],
            values: T::into_values(values),
        }
    }
}

/// Rust types that can be stored in a table column.
pub trait Element: Sized + Clone {
    const DATA_TYPE: DataType;

    fn into_values(v: Vec<Self>) -> Values;

    /// Unwrap values of this type, handing them back if the type differs.
    fn from_values(v: Values) -> Result<Vec<Self>, Values>;
}

macro_rules! impl_element {
    ($t:ty, $variant:ident) => {
        impl Element for $t {
            const DATA_TYPE: DataType = DataType::$variant;

            fn into_values(v: Vec<Self>) -> Values {
                Values::$variant(v)
            }

            fn from_values(v: Values) -> Result<Vec<Self>, Values> {
                match v {
                    Values::$variant(v) => Ok(v),
                    other => Err(other),
                }
            }
        }
    };
}

impl_element!(bool, Bool);
impl_element!(u8, UChar);
impl_element!(i16, Short);
impl_element!(u16, UShort);
impl_element!(i32, Int);
impl_element!(u32, UInt);
impl_element!(f32, Float);
impl_element!(f64, Double);
impl_element!(c32, Complex);
impl_element!(c64, DComplex);
impl_element!(String, String);
