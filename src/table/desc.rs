// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Table and column descriptions.

use serde::{Deserialize, Serialize};

use super::{DataType, Keywords};
use crate::constants::STANDARD_BUCKET_BYTES;

/// How the cells of a column are shaped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    Scalar,

    /// Every cell has this shape (fastest-varying axis first).
    FixedArray(Vec<usize>),

    /// Cells have this many dimensions, but their shapes may differ.
    VariableArray { ndim: usize },
}

/// The casacore storage manager a column asks for. rubbl binds every column
/// to the default manager, so this is only recorded in the table layout,
/// where it's used to size the tiles of later columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageManager {
    /// Fixed-size cells packed into buckets of `bucket_bytes`.
    Standard { name: String, bucket_bytes: usize },

    /// Fixed-size cells grouped into tiles. The tile shape lists the cell
    /// axes (fastest first) followed by the number of rows.
    Tiled { name: String, tile_shape: Vec<usize> },

    /// Cells serialised individually; needed for strings and
    /// variable-shaped arrays.
    Indirect,
}

impl Default for StorageManager {
    fn default() -> Self {
        StorageManager::Standard {
            name: "StandardStMan".to_string(),
            bucket_bytes: STANDARD_BUCKET_BYTES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDesc {
    pub name: String,
    pub data_type: DataType,
    pub kind: ColumnKind,
    pub comment: String,
    pub keywords: Keywords,
    pub storage: StorageManager,
}

impl ColumnDesc {
    pub fn scalar(name: &str, data_type: DataType) -> ColumnDesc {
        ColumnDesc::new(name, data_type, ColumnKind::Scalar)
    }

    pub fn fixed_array(name: &str, data_type: DataType, shape: &[usize]) -> ColumnDesc {
        ColumnDesc::new(name, data_type, ColumnKind::FixedArray(shape.to_vec()))
    }

    pub fn variable_array(name: &str, data_type: DataType, ndim: usize) -> ColumnDesc {
        ColumnDesc::new(name, data_type, ColumnKind::VariableArray { ndim })
    }

    fn new(name: &str, data_type: DataType, kind: ColumnKind) -> ColumnDesc {
        // Only fixed-size cells can be bucketed.
        let storage = match (&kind, data_type.size_bytes()) {
            (ColumnKind::VariableArray { .. }, _) | (_, None) => StorageManager::Indirect,
            _ => StorageManager::default(),
        };
        ColumnDesc {
            name: name.to_string(),
            data_type,
            kind,
            comment: String::new(),
            keywords: Keywords::new(),
            storage,
        }
    }

    pub fn comment(mut self, comment: &str) -> ColumnDesc {
        self.comment = comment.to_string();
        self
    }

    pub fn storage(mut self, storage: StorageManager) -> ColumnDesc {
        self.storage = storage;
        self
    }

    pub fn keywords(mut self, keywords: Keywords) -> ColumnDesc {
        self.keywords = keywords;
        self
    }

    /// The cell shape if every cell has the same shape. Scalars have an empty
    /// shape.
    pub fn fixed_shape(&self) -> Option<&[usize]> {
        match &self.kind {
            ColumnKind::Scalar => Some(&[]),
            ColumnKind::FixedArray(shape) => Some(shape),
            ColumnKind::VariableArray { .. } => None,
        }
    }

    /// The number of elements in each cell, if fixed.
    pub fn cell_elements(&self) -> Option<usize> {
        self.fixed_shape().map(|s| s.iter().product())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDesc {
    pub name: String,
    pub columns: Vec<ColumnDesc>,
}

impl TableDesc {
    pub fn new(name: &str) -> TableDesc {
        TableDesc {
            name: name.to_string(),
            columns: vec![],
        }
    }

    pub fn with_column(mut self, column: ColumnDesc) -> TableDesc {
        self.columns.push(column);
        self
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDesc> {
        self.columns.iter().find(|c| c.name == name)
    }
}
