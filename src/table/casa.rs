// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! casacore tables, through `rubbl_casatables`.
//!
//! casacore holds the columns, cells and keywords. rubbl can't describe
//! storage managers or read back cell shapes of variable columns, so the full
//! [`TableDesc`] is also kept as JSON in the [`LAYOUT_KEYWORD`] table keyword.
//!
//! Array shapes are listed fastest-varying axis first everywhere in this
//! crate; rubbl lists them slowest first, so shapes are reversed at this
//! boundary. The element order in memory is the same.

use std::{
    cell::{RefCell, RefMut},
    ops::Range,
    path::{Path, PathBuf},
};

use log::{debug, trace, warn};
use rubbl_casatables as casa;
use rubbl_casatables::{GlueDataType, TableCreateMode, TableDescCreateMode, TableOpenMode};

use super::{
    Cell, ColumnDesc, ColumnKind, DataType, Element, Keyword, Keywords, Table, TableDesc,
    TableEngine, TableError, Values,
};
use crate::{c32, c64};

/// The table keyword holding the JSON-encoded [`TableDesc`].
pub const LAYOUT_KEYWORD: &str = "VISTABLE_LAYOUT";

/// Creates and opens [`CasaTable`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct CasaEngine;

impl TableEngine for CasaEngine {
    fn create(&self, path: &Path, desc: TableDesc) -> Result<Box<dyn Table>, TableError> {
        Ok(Box::new(CasaTable::create(path, desc)?))
    }

    fn open(&self, path: &Path) -> Result<Box<dyn Table>, TableError> {
        Ok(Box::new(CasaTable::open(path)?))
    }

    fn exists(&self, path: &Path) -> bool {
        path.join("table.dat").is_file()
    }
}

/// Run `$body` with `$t` naming the Rust type of `$data_type`'s elements.
/// String columns run `$string` instead, when given.
macro_rules! dispatch {
    ($data_type:expr, $t:ident => $body:expr, String => $string:expr) => {
        match $data_type {
            DataType::Bool => {
                type $t = bool;
                $body
            }
            DataType::UChar => {
                type $t = u8;
                $body
            }
            DataType::Short => {
                type $t = i16;
                $body
            }
            DataType::UShort => {
                type $t = u16;
                $body
            }
            DataType::Int => {
                type $t = i32;
                $body
            }
            DataType::UInt => {
                type $t = u32;
                $body
            }
            DataType::Float => {
                type $t = f32;
                $body
            }
            DataType::Double => {
                type $t = f64;
                $body
            }
            DataType::Complex => {
                type $t = c32;
                $body
            }
            DataType::DComplex => {
                type $t = c64;
                $body
            }
            DataType::String => $string,
        }
    };
    ($data_type:expr, $t:ident => $body:expr) => {
        dispatch!($data_type, $t => $body, String => {
            type $t = String;
            $body
        })
    };
}

fn glue_type(data_type: DataType) -> GlueDataType {
    match data_type {
        DataType::Bool => GlueDataType::TpBool,
        DataType::UChar => GlueDataType::TpUChar,
        DataType::Short => GlueDataType::TpShort,
        DataType::UShort => GlueDataType::TpUShort,
        DataType::Int => GlueDataType::TpInt,
        DataType::UInt => GlueDataType::TpUInt,
        DataType::Float => GlueDataType::TpFloat,
        DataType::Double => GlueDataType::TpDouble,
        DataType::Complex => GlueDataType::TpComplex,
        DataType::DComplex => GlueDataType::TpDComplex,
        DataType::String => GlueDataType::TpString,
    }
}

fn from_glue_type(glue: GlueDataType) -> Option<DataType> {
    let data_type = match glue {
        GlueDataType::TpBool => DataType::Bool,
        GlueDataType::TpUChar => DataType::UChar,
        GlueDataType::TpShort => DataType::Short,
        GlueDataType::TpUShort => DataType::UShort,
        GlueDataType::TpInt => DataType::Int,
        GlueDataType::TpUInt => DataType::UInt,
        GlueDataType::TpFloat => DataType::Float,
        GlueDataType::TpDouble => DataType::Double,
        GlueDataType::TpComplex => DataType::Complex,
        GlueDataType::TpDComplex => DataType::DComplex,
        GlueDataType::TpString => DataType::String,
        _ => return None,
    };
    Some(data_type)
}

/// A fastest-first shape in rubbl's slowest-first order.
fn casa_shape(shape: &[usize]) -> Vec<u64> {
    shape.iter().rev().map(|&n| n as u64).collect()
}

/// Add a column to a `casa::TableDesc` or an existing `casa::Table`; both
/// have the same methods.
macro_rules! add_casa_column {
    ($target:expr, $desc:expr) => {{
        let desc: &ColumnDesc = $desc;
        let glue = glue_type(desc.data_type);
        let comment = (!desc.comment.is_empty()).then_some(desc.comment.as_str());
        match &desc.kind {
            ColumnKind::Scalar => $target
                .add_scalar_column(glue, &desc.name, comment, false, false)
                .map_err(TableError::from),
            // Fixed-shape cells are stored directly in the buckets.
            ColumnKind::FixedArray(shape) => $target
                .add_array_column(
                    glue,
                    &desc.name,
                    comment,
                    Some(casa_shape(shape).as_slice()),
                    true,
                    false,
                )
                .map_err(TableError::from),
            ColumnKind::VariableArray { .. } => $target
                .add_array_column(glue, &desc.name, comment, None, false, false)
                .map_err(TableError::from),
        }
    }};
}

/// Write a keyword to the table, or to one of its columns. Records aren't
/// supported by rubbl and are skipped.
fn put_keyword(
    handle: &mut casa::Table,
    dir: &Path,
    column: Option<&str>,
    name: &str,
    keyword: &Keyword,
) -> Result<(), TableError> {
    macro_rules! put {
        ($value:expr) => {
            match column {
                Some(c) => handle.put_column_keyword(c, name, $value)?,
                None => handle.put_keyword(name, $value)?,
            }
        };
    }

    match keyword {
        Keyword::Bool(v) => put!(v),
        Keyword::Int(v) => put!(v),
        Keyword::Double(v) => put!(v),
        Keyword::String(v) => put!(v),
        Keyword::Strings(v) => put!(v),
        Keyword::Table(rel) if column.is_none() => {
            let linked = casa::Table::open(dir.join(rel), TableOpenMode::Read)?;
            handle.put_table_keyword(name, linked)?;
        }
        Keyword::Table(_) | Keyword::Record(_) => {
            trace!("Not writing keyword '{name}' to casacore");
        }
    }
    Ok(())
}

fn keyword_field<T: casa::CasaDataType>(handle: &mut casa::Table, name: &str) -> Option<T> {
    handle.get_keyword_record().ok()?.get_field::<T>(name).ok()
}

/// Read the table keywords. Sub-tables are recognised by their directory;
/// keywords rubbl can't decode become empty records.
fn load_keywords(handle: &mut casa::Table, dir: &Path) -> Result<Keywords, TableError> {
    let mut keywords = Keywords::new();
    for name in handle.table_keyword_names()? {
        if name == LAYOUT_KEYWORD {
            continue;
        }
        let keyword = if dir.join(&name).join("table.dat").is_file() {
            Keyword::Table(name.clone())
        // Booleans and integers may also read as doubles.
        } else if let Some(v) = keyword_field::<bool>(handle, &name) {
            Keyword::Bool(v)
        } else if let Some(v) = keyword_field::<i32>(handle, &name) {
            Keyword::Int(v)
        } else if let Some(v) = keyword_field::<f64>(handle, &name) {
            Keyword::Double(v)
        } else if let Some(v) = keyword_field::<String>(handle, &name) {
            // Removed keywords are left behind as empty strings.
            if v.is_empty() {
                continue;
            }
            Keyword::String(v)
        } else if let Some(v) = keyword_field::<Vec<String>>(handle, &name) {
            Keyword::Strings(v)
        } else {
            Keyword::Record(Keywords::new())
        };
        keywords.insert(name, keyword);
    }
    Ok(keywords)
}

/// Describe a table without a layout keyword from what casacore knows.
/// Array columns are treated as one-dimensional.
fn derive_desc(handle: &mut casa::Table, dir: &Path) -> Result<TableDesc, TableError> {
    let name = dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut desc = TableDesc::new(&name);
    for column in handle.column_names()? {
        let col_desc = handle.get_col_desc(&column)?;
        let Some(data_type) = from_glue_type(col_desc.data_type()) else {
            debug!("Skipping column '{column}' of {}; its type isn't supported", dir.display());
            continue;
        };
        desc.columns.push(if col_desc.is_scalar() {
            ColumnDesc::scalar(&column, data_type)
        } else {
            ColumnDesc::variable_array(&column, data_type, 1)
        });
    }
    Ok(desc)
}

/// Read a two-dimensional cell. `like` fixes the array type.
fn get_matrix<A, D>(
    handle: &mut casa::Table,
    column: &str,
    row: u64,
    _like: casa::Array<A, D>,
) -> Result<casa::Array<A, D>, TableError>
where
    casa::Array<A, D>: casa::CasaDataType,
{
    Ok(handle.get_cell(column, row)?)
}

fn read_cell(handle: &mut casa::Table, desc: &ColumnDesc, row: u64) -> Result<Cell, TableError> {
    let column = desc.name.as_str();
    let cell = match &desc.kind {
        ColumnKind::Scalar => dispatch!(desc.data_type, T => {
            let value: T = handle.get_cell(column, row)?;
            Cell::scalar(value)
        }),
        ColumnKind::FixedArray(shape) => dispatch!(desc.data_type, T => {
            let values: Vec<T> = handle.get_cell_as_vec(column, row)?;
            Cell::array(shape.clone(), values)
        }),
        ColumnKind::VariableArray { ndim: 2 } => dispatch!(desc.data_type, T => {
            let like = casa::Array::<T, _>::default((0, 0));
            let matrix = get_matrix(handle, column, row, like)?;
            let shape = matrix.shape().iter().rev().copied().collect();
            Cell::array(shape, matrix.iter().cloned().collect::<Vec<T>>())
        }, String => {
            let values: Vec<String> = handle.get_cell_as_vec(column, row)?;
            Cell::vector(values)
        }),
        ColumnKind::VariableArray { .. } => dispatch!(desc.data_type, T => {
            let values: Vec<T> = handle.get_cell_as_vec(column, row)?;
            Cell::vector(values)
        }),
    };
    Ok(cell)
}

fn write_cell(
    handle: &mut casa::Table,
    desc: &ColumnDesc,
    row: u64,
    cell: &Cell,
) -> Result<(), TableError> {
    let column = desc.name.as_str();
    let unsupported = || TableError::UnsupportedShape {
        column: column.to_string(),
        shape: cell.shape.clone(),
    };
    dispatch!(desc.data_type, T => {
        let values = T::from_values(cell.values.clone())
            .map_err(|v| bad_type(desc, &v))?;
        match *cell.shape.as_slice() {
            [] => {
                let value = values.into_iter().next().ok_or_else(unsupported)?;
                handle.put_cell(column, row, &value)?;
            }
            [_] => handle.put_cell(column, row, &values)?,
            [n0, n1] => {
                let array = casa::Array::from_shape_vec((n1, n0), values)
                    .map_err(|_| unsupported())?;
                handle.put_cell(column, row, &array)?;
            }
            [n0, n1, n2] => {
                let array = casa::Array::from_shape_vec((n2, n1, n0), values)
                    .map_err(|_| unsupported())?;
                handle.put_cell(column, row, &array)?;
            }
            _ => return Err(unsupported()),
        }
        Ok(())
    }, String => {
        let values = String::from_values(cell.values.clone())
            .map_err(|v| bad_type(desc, &v))?;
        match cell.shape.len() {
            0 => {
                let value = values.into_iter().next().ok_or_else(unsupported)?;
                handle.put_cell(column, row, &value)?;
            }
            1 => handle.put_cell(column, row, &values)?,
            _ => return Err(unsupported()),
        }
        Ok(())
    })
}

fn bad_type(desc: &ColumnDesc, got: &Values) -> TableError {
    TableError::BadDataType {
        column: desc.name.clone(),
        expected: desc.data_type,
        got: got.data_type(),
    }
}

/// The cell of a row that has never been written.
fn default_cell(desc: &ColumnDesc) -> Cell {
    match &desc.kind {
        ColumnKind::Scalar => Cell {
            shape: vec![],
            values: Values::zeros(desc.data_type, 1),
        },
        ColumnKind::FixedArray(shape) => Cell {
            shape: shape.clone(),
            values: Values::zeros(desc.data_type, shape.iter().product()),
        },
        ColumnKind::VariableArray { ndim } => Cell {
            shape: vec![0; *ndim],
            values: Values::zeros(desc.data_type, 0),
        },
    }
}

/// Check that `cell` can be stored in a column described by `desc`.
fn check_cell(desc: &ColumnDesc, cell: &Cell) -> Result<(), TableError> {
    if cell.values.data_type() != desc.data_type {
        return Err(bad_type(desc, &cell.values));
    }
    let shape_ok = match &desc.kind {
        ColumnKind::Scalar => cell.shape.is_empty(),
        ColumnKind::FixedArray(shape) => &cell.shape == shape,
        ColumnKind::VariableArray { ndim } => cell.shape.len() == *ndim,
    };
    if !shape_ok || cell.shape.iter().product::<usize>() != cell.values.len() {
        return Err(TableError::BadShape {
            column: desc.name.clone(),
            expected: desc.fixed_shape().map(|s| s.to_vec()).unwrap_or_default(),
            got: cell.shape.clone(),
            num_values: cell.values.len(),
        });
    }
    Ok(())
}

/// A casacore table. Keyword changes are written on [`Table::flush`] and
/// when the table is dropped.
pub struct CasaTable {
    path: PathBuf,
    desc: TableDesc,
    num_rows: u64,
    keywords: Keywords,
    /// The keywords as casacore last saw them.
    stored_keywords: Keywords,
    layout_dirty: bool,
    /// rubbl needs `&mut` even to read, and a table is only written out when
    /// its handle is closed.
    handle: RefCell<Option<casa::Table>>,
}

impl CasaTable {
    pub fn create(path: &Path, desc: TableDesc) -> Result<CasaTable, TableError> {
        if path.exists() {
            return Err(TableError::AlreadyExists(path.to_path_buf()));
        }
        debug!("Creating table '{}' at {}", desc.name, path.display());
        let mut casa_desc = casa::TableDesc::new(&desc.name, TableDescCreateMode::TDM_SCRATCH)?;
        for column in &desc.columns {
            add_casa_column!(casa_desc, column)?;
        }
        let mut handle = casa::Table::new(path, casa_desc, 0, TableCreateMode::New)?;
        for column in &desc.columns {
            for (name, keyword) in column.keywords.iter() {
                put_keyword(&mut handle, path, Some(&column.name), name, keyword)?;
            }
        }
        let mut table = CasaTable {
            path: path.to_path_buf(),
            desc,
            num_rows: 0,
            keywords: Keywords::new(),
            stored_keywords: Keywords::new(),
            layout_dirty: true,
            handle: RefCell::new(Some(handle)),
        };
        table.write_keywords()?;
        Ok(table)
    }

    pub fn open(path: &Path) -> Result<CasaTable, TableError> {
        if !CasaEngine.exists(path) {
            return Err(TableError::NotATable(path.to_path_buf()));
        }
        let mut handle = casa::Table::open(path, TableOpenMode::ReadWrite)?;
        let desc = match keyword_field::<String>(&mut handle, LAYOUT_KEYWORD) {
            Some(json) => serde_json::from_str(&json)?,
            None => derive_desc(&mut handle, path)?,
        };
        let keywords = load_keywords(&mut handle, path)?;
        let num_rows = handle.n_rows();
        debug!(
            "Opened table '{}' at {} ({num_rows} rows)",
            desc.name,
            path.display(),
        );
        Ok(CasaTable {
            path: path.to_path_buf(),
            desc,
            num_rows,
            stored_keywords: keywords.clone(),
            keywords,
            layout_dirty: false,
            handle: RefCell::new(Some(handle)),
        })
    }

    fn handle(&self) -> Result<RefMut<'_, casa::Table>, TableError> {
        RefMut::filter_map(self.handle.borrow_mut(), Option::as_mut)
            .map_err(|_| TableError::Closed(self.path.clone()))
    }

    fn column(&self, column: &str) -> Result<&ColumnDesc, TableError> {
        self.desc
            .column(column)
            .ok_or_else(|| TableError::ColumnNotFound(column.to_string()))
    }

    fn check_row(&self, row: u64) -> Result<(), TableError> {
        if row >= self.num_rows {
            Err(TableError::RowOutOfRange {
                row,
                num_rows: self.num_rows,
            })
        } else {
            Ok(())
        }
    }

    /// Write the layout and any keywords that changed since the last write.
    fn write_keywords(&mut self) -> Result<(), TableError> {
        let mut handle = self.handle()?;
        if self.layout_dirty {
            let layout = serde_json::to_string(&self.desc)?;
            handle.put_keyword(LAYOUT_KEYWORD, &layout)?;
        }
        for (name, keyword) in self.keywords.iter() {
            if self.stored_keywords.get(name) != Some(keyword) {
                put_keyword(&mut handle, &self.path, None, name, keyword)?;
            }
        }
        // casacore keywords can't be removed through rubbl; blank the strings.
        for (name, keyword) in self.stored_keywords.iter() {
            if self.keywords.contains(name) {
                continue;
            }
            match keyword {
                Keyword::String(_) => handle.put_keyword(name, &String::new())?,
                _ => warn!(
                    "Keyword '{name}' of {} stays on disk; only string keywords can be removed",
                    self.path.display()
                ),
            }
        }
        drop(handle);
        self.layout_dirty = false;
        self.stored_keywords = self.keywords.clone();
        Ok(())
    }
}

impl Table for CasaTable {
    fn path(&self) -> &Path {
        &self.path
    }

    fn desc(&self) -> &TableDesc {
        &self.desc
    }

    fn num_rows(&self) -> u64 {
        self.num_rows
    }

    fn add_rows(&mut self, n: u64) -> Result<(), TableError> {
        if n == 0 {
            return Ok(());
        }
        trace!(
            "Table '{}': growing from {} to {} rows",
            self.desc.name,
            self.num_rows,
            self.num_rows + n
        );
        self.handle()?.add_rows(n as usize)?;
        self.num_rows += n;
        Ok(())
    }

    fn add_column(&mut self, desc: ColumnDesc) -> Result<(), TableError> {
        if self.desc.column(&desc.name).is_some() {
            return Err(TableError::ColumnExists(desc.name));
        }
        {
            let mut handle = self.handle()?;
            add_casa_column!(handle, &desc)?;
            for (name, keyword) in desc.keywords.iter() {
                put_keyword(&mut handle, &self.path, Some(&desc.name), name, keyword)?;
            }
            // Existing rows start out zeroed.
            if self.num_rows > 0 && desc.fixed_shape().is_some() {
                let cell = default_cell(&desc);
                for row in 0..self.num_rows {
                    write_cell(&mut handle, &desc, row, &cell)?;
                }
            }
        }
        self.desc.columns.push(desc);
        self.layout_dirty = true;
        Ok(())
    }

    fn get_cell(&self, column: &str, row: u64) -> Result<Cell, TableError> {
        let desc = self.column(column)?;
        self.check_row(row)?;
        let mut handle = self.handle()?;
        match read_cell(&mut handle, desc, row) {
            Ok(cell) => Ok(cell),
            // casacore has no array for variable cells that were never written.
            Err(e) if matches!(desc.kind, ColumnKind::VariableArray { .. }) => {
                trace!("Reading {column} row {row} as empty: {e}");
                Ok(default_cell(desc))
            }
            Err(e) => Err(e),
        }
    }

    fn put_cell(&mut self, column: &str, row: u64, cell: &Cell) -> Result<(), TableError> {
        let desc = self.column(column)?;
        self.check_row(row)?;
        check_cell(desc, cell)?;
        write_cell(&mut *self.handle()?, desc, row, cell)
    }

    fn get_column_range(&self, column: &str, rows: Range<u64>) -> Result<Values, TableError> {
        let desc = self.column(column)?;
        if rows.end > self.num_rows {
            return Err(TableError::RowOutOfRange {
                row: rows.end.saturating_sub(1),
                num_rows: self.num_rows,
            });
        }
        let mut out = Values::zeros(desc.data_type, 0);
        for row in rows {
            out.extend(self.get_cell(column, row)?.values)?;
        }
        Ok(out)
    }

    fn put_column_range(
        &mut self,
        column: &str,
        start_row: u64,
        values: &Values,
    ) -> Result<(), TableError> {
        let desc = self.column(column)?;
        if values.data_type() != desc.data_type {
            return Err(bad_type(desc, values));
        }
        let Some(shape) = desc.fixed_shape().map(|s| s.to_vec()) else {
            return Err(TableError::BadShape {
                column: column.to_string(),
                expected: vec![],
                got: vec![values.len()],
                num_values: values.len(),
            });
        };
        let cell_elements = shape.iter().product::<usize>().max(1);
        if values.len() % cell_elements != 0 {
            return Err(TableError::BadShape {
                column: column.to_string(),
                expected: shape,
                got: vec![values.len()],
                num_values: values.len(),
            });
        }
        let num_rows = (values.len() / cell_elements) as u64;
        if num_rows == 0 {
            return Ok(());
        }
        self.check_row(start_row + num_rows - 1)?;
        let mut handle = self.handle()?;
        for r in 0..num_rows as usize {
            let cell = Cell {
                shape: shape.clone(),
                values: values.slice(r * cell_elements, cell_elements),
            };
            write_cell(&mut handle, desc, start_row + r as u64, &cell)?;
        }
        Ok(())
    }

    fn keywords(&self) -> &Keywords {
        &self.keywords
    }

    fn keywords_mut(&mut self) -> &mut Keywords {
        &mut self.keywords
    }

    fn flush(&mut self) -> Result<(), TableError> {
        self.write_keywords()?;
        // rubbl writes a table out when its handle closes.
        drop(self.handle.get_mut().take());
        let handle = casa::Table::open(&self.path, TableOpenMode::ReadWrite)?;
        *self.handle.get_mut() = Some(handle);
        trace!("Flushed table '{}'", self.desc.name);
        Ok(())
    }
}

impl Drop for CasaTable {
    fn drop(&mut self) {
        if self.handle.get_mut().is_none() {
            return;
        }
        if let Err(e) = self.write_keywords() {
            warn!(
                "Couldn't write keywords of table '{}' at {}: {e}",
                self.desc.name,
                self.path.display()
            );
        }
    }
}
