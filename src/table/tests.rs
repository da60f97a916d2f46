// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::assert_abs_diff_eq;
use tempfile::TempDir;

use super::*;
use crate::c32;

fn test_desc() -> TableDesc {
    TableDesc::new("TEST")
        .with_column(ColumnDesc::scalar("ID", DataType::Int))
        .with_column(ColumnDesc::scalar("NAME", DataType::String))
        .with_column(ColumnDesc::fixed_array("UVW", DataType::Double, &[3]).storage(
            StorageManager::Tiled {
                name: "TiledUVW".to_string(),
                tile_shape: vec![3, 4],
            },
        ))
        .with_column(ColumnDesc::fixed_array("DATA", DataType::Complex, &[2, 3]).storage(
            StorageManager::Tiled {
                name: "TiledData".to_string(),
                tile_shape: vec![2, 3, 2],
            },
        ))
        .with_column(ColumnDesc::variable_array("FREQS", DataType::Double, 1))
        .with_column(ColumnDesc::variable_array("PRODUCTS", DataType::Int, 2))
}

#[test]
fn test_create_and_reopen() {
    let tmp_dir = TempDir::new().unwrap();
    let path = tmp_dir.path().join("test.tbl");
    {
        let mut table = CasaTable::create(&path, test_desc()).unwrap();
        assert_eq!(table.num_rows(), 0);
        table.add_rows(5).unwrap();
        for row in 0..5 {
            table.put_scalar("ID", row, row as i32 * 10).unwrap();
            table
                .put_vec("UVW", row, vec![row as f64, 2.0 * row as f64, -1.0])
                .unwrap();
        }
        table.put_scalar("NAME", 3, "three".to_string()).unwrap();
        table.put_vec("FREQS", 1, vec![1e8, 2e8]).unwrap();
        table.keywords_mut().insert("ANSWER", Keyword::Int(42));
        table
            .keywords_mut()
            .insert("UNITS", Keyword::Strings(vec!["m".to_string()]));
        // Dropping the table writes it out.
    }

    let engine = CasaEngine;
    assert!(engine.exists(&path));
    assert!(path.join("table.dat").is_file());
    let table = engine.open(&path).unwrap();
    assert_eq!(table.num_rows(), 5);
    assert_eq!(table.desc(), &test_desc());
    assert_eq!(table.keywords().get_int("ANSWER"), Some(42));
    assert_eq!(
        table.keywords().get("UNITS"),
        Some(&Keyword::Strings(vec!["m".to_string()]))
    );
    // The layout isn't a user keyword.
    assert!(!table.keywords().contains(LAYOUT_KEYWORD));
    let ids: Vec<i32> = table.get_column_as_vec("ID").unwrap();
    assert_eq!(ids, vec![0, 10, 20, 30, 40]);
    let uvw: Vec<f64> = table.get_vec("UVW", 4).unwrap();
    assert_abs_diff_eq!(uvw.as_slice(), [4.0, 8.0, -1.0].as_slice());
    let name: String = table.get_scalar("NAME", 3).unwrap();
    assert_eq!(name, "three");
    let name: String = table.get_scalar("NAME", 0).unwrap();
    assert_eq!(name, "");
    let freqs = table.get_cell("FREQS", 1).unwrap();
    assert_eq!(freqs.shape, vec![2]);
    let freqs = table.get_cell("FREQS", 0).unwrap();
    assert_eq!(freqs.shape, vec![0]);
    assert!(freqs.values.is_empty());
}

#[test]
fn test_create_fails_if_path_exists() {
    let tmp_dir = TempDir::new().unwrap();
    let result = CasaTable::create(tmp_dir.path(), test_desc());
    assert!(matches!(result, Err(TableError::AlreadyExists(_))));
}

#[test]
fn test_open_fails_on_non_table() {
    let tmp_dir = TempDir::new().unwrap();
    let result = CasaTable::open(tmp_dir.path());
    assert!(matches!(result, Err(TableError::NotATable(_))));
}

#[test]
fn test_matrix_cells_keep_their_axes() {
    let tmp_dir = TempDir::new().unwrap();
    let path = tmp_dir.path().join("test.tbl");
    let mut table = CasaTable::create(&path, test_desc()).unwrap();
    table.add_rows(7).unwrap();

    let data: Vec<c32> = (0..7 * 6).map(|i| c32::new(i as f32, -(i as f32))).collect();
    table.put_range("DATA", 0, data.clone()).unwrap();
    table
        .put_array("DATA", 1, &[2, 3], vec![c32::new(100.0, 0.0); 6])
        .unwrap();
    // The fastest axis comes first.
    table
        .put_array("PRODUCTS", 2, &[2, 3], vec![0, 1, 10, 11, 20, 21])
        .unwrap();
    table.flush().unwrap();

    let read: Vec<c32> = table.get_column_as_vec("DATA").unwrap();
    assert_eq!(&read[..6], &data[..6]);
    assert_eq!(&read[6..12], &[c32::new(100.0, 0.0); 6]);
    assert_eq!(&read[12..], &data[12..]);
    let values = table.get_column_range("DATA", 3..5).unwrap();
    assert_eq!(values, Values::Complex(data[18..30].to_vec()));

    let cell = table.get_cell("PRODUCTS", 2).unwrap();
    assert_eq!(cell.shape, vec![2, 3]);
    assert_eq!(cell.values, Values::Int(vec![0, 1, 10, 11, 20, 21]));
}

#[test]
fn test_new_rows_are_zero() {
    let tmp_dir = TempDir::new().unwrap();
    let mut table = CasaTable::create(&tmp_dir.path().join("t"), test_desc()).unwrap();
    table.add_rows(3).unwrap();
    table.put_scalar("ID", 2, 7).unwrap();
    table.add_rows(100).unwrap();
    let ids: Vec<i32> = table.get_column_as_vec("ID").unwrap();
    assert_eq!(ids.len(), 103);
    assert_eq!(ids[2], 7);
    assert!(ids.iter().enumerate().all(|(i, &v)| i == 2 || v == 0));
}

#[test]
fn test_type_and_shape_checks() {
    let tmp_dir = TempDir::new().unwrap();
    let mut table = CasaTable::create(&tmp_dir.path().join("t"), test_desc()).unwrap();
    table.add_rows(1).unwrap();

    let result = table.put_scalar("ID", 0, 1.0_f64);
    assert!(matches!(result, Err(TableError::BadDataType { .. })));
    let result = table.put_vec("UVW", 0, vec![1.0, 2.0]);
    assert!(matches!(result, Err(TableError::BadShape { .. })));
    let result = table.put_scalar("ID", 1, 1);
    assert!(matches!(
        result,
        Err(TableError::RowOutOfRange {
            row: 1,
            num_rows: 1
        })
    ));
    let result = table.get_scalar::<f32>("ID", 0);
    assert!(matches!(result, Err(TableError::BadDataType { .. })));
    let result = table.get_cell("NOPE", 0);
    assert!(matches!(result, Err(TableError::ColumnNotFound(_))));
}

#[test]
fn test_add_column_to_existing_rows() {
    let tmp_dir = TempDir::new().unwrap();
    let path = tmp_dir.path().join("t");
    let mut table = CasaTable::create(&path, test_desc()).unwrap();
    table.add_rows(4).unwrap();
    table
        .add_column(ColumnDesc::fixed_array("WEIGHT", DataType::Float, &[4]).storage(
            StorageManager::Tiled {
                name: "TiledWeight".to_string(),
                tile_shape: vec![4, 8],
            },
        ))
        .unwrap();
    let result = table.add_column(ColumnDesc::scalar("ID", DataType::Int));
    assert!(matches!(result, Err(TableError::ColumnExists(_))));
    let weights: Vec<f32> = table.get_column_as_vec("WEIGHT").unwrap();
    assert_eq!(weights, vec![0.0; 16]);
    drop(table);

    let table = CasaTable::open(&path).unwrap();
    assert!(table.has_column("WEIGHT"));
    assert_eq!(table.num_rows(), 4);
    // The tile shape survives in the layout.
    assert_eq!(
        table.column_desc("WEIGHT").unwrap().storage,
        StorageManager::Tiled {
            name: "TiledWeight".to_string(),
            tile_shape: vec![4, 8],
        }
    );
}

#[test]
fn test_removed_string_keywords_stay_removed() {
    let tmp_dir = TempDir::new().unwrap();
    let path = tmp_dir.path().join("t");
    {
        let mut table = CasaTable::create(&path, test_desc()).unwrap();
        table
            .keywords_mut()
            .insert("SORT_COLUMNS", Keyword::String("TIME".to_string()));
        table.keywords_mut().insert("FLAG", Keyword::Bool(true));
        table.flush().unwrap();
        table.keywords_mut().remove("SORT_COLUMNS");
    }
    let table = CasaTable::open(&path).unwrap();
    assert!(!table.keywords().contains("SORT_COLUMNS"));
    assert_eq!(table.keywords().get_bool("FLAG"), Some(true));
}

#[test]
fn test_sub_table_links() {
    let tmp_dir = TempDir::new().unwrap();
    let path = tmp_dir.path().join("main");
    {
        let mut main = CasaTable::create(&path, test_desc()).unwrap();
        let sub_desc = TableDesc::new("SUB").with_column(ColumnDesc::scalar("X", DataType::Float));
        let mut sub = CasaTable::create(&path.join("SUB"), sub_desc).unwrap();
        sub.add_rows(2).unwrap();
        sub.flush().unwrap();
        main.keywords_mut()
            .insert("SUB", Keyword::Table("SUB".to_string()));
    }
    let main = CasaTable::open(&path).unwrap();
    assert_eq!(main.keywords().get("SUB"), Some(&Keyword::Table("SUB".to_string())));
    let sub = CasaTable::open(&path.join(main.keywords().get_str("SUB").unwrap())).unwrap();
    assert_eq!(sub.num_rows(), 2);
}

#[test]
fn test_keywords_keep_order() {
    let mut keywords = Keywords::new();
    keywords.insert("B", Keyword::Bool(true));
    keywords.insert("A", Keyword::String("a".to_string()));
    keywords.insert("C", Keyword::Table("SUB".to_string()));
    assert_eq!(keywords.remove("A"), Some(Keyword::String("a".to_string())));
    assert_eq!(keywords.names().collect::<Vec<_>>(), vec!["B", "C"]);
    assert_eq!(keywords.get_str("C"), Some("SUB"));
    assert!(keywords.get_int("B").is_none());
    assert_eq!(keywords.get_bool("B"), Some(true));
}

#[test]
fn test_data_type_sizes() {
    assert_eq!(DataType::Bool.size_bytes(), Some(1));
    assert_eq!(DataType::Short.size_bytes(), Some(2));
    assert_eq!(DataType::Complex.size_bytes(), Some(8));
    assert_eq!(DataType::DComplex.size_bytes(), Some(16));
    assert_eq!(DataType::String.size_bytes(), None);
    assert_eq!(DataType::Complex.to_string(), "Complex");
}
