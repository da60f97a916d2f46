// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Bookkeeping of on-the-fly (OTF) models.
//!
//! Instead of a MODEL_DATA column, a model can be attached to a field with a
//! `definedmodel_field_<id>` keyword. Its value names another keyword that
//! holds the model; in the SOURCE table that keyword is the row whose
//! SOURCE_MODEL cell holds the model record, and in the main table it is the
//! record itself.
//!
//! Records can't be written through rubbl, so removing a model only removes
//! the keywords; a SOURCE_MODEL cell is left as it is, but nothing points at
//! it any more.

use itertools::Itertools;
use log::{debug, trace};

use super::MsError;
use crate::table::{Table, TableExt};

pub(crate) fn model_key(field_id: i32) -> String {
    format!("definedmodel_field_{field_id}")
}

/// SOURCE keywords are only consulted when the SOURCE table has rows.
fn source_in_use(source: &dyn Table) -> bool {
    source.num_rows() > 0
}

/// The model key and SOURCE row of the OTF model attached to a field, if
/// there is one.
pub(crate) fn defined_model(
    field_id: i32,
    main: &dyn Table,
    source: &dyn Table,
) -> Option<(String, Option<i32>)> {
    let mod_key = model_key(field_id);
    let (key, source_row) = if source_in_use(source) {
        let key = source.keywords().get_str(&mod_key)?.to_string();
        let row = source.keywords().get_int(&key);
        (key, row)
    } else {
        (main.keywords().get_str(&mod_key)?.to_string(), None)
    };
    if key.is_empty() {
        return None;
    }
    let defined = (source_in_use(source) && source.keywords().contains(&key))
        || main.keywords().contains(&key);
    defined.then_some((key, source_row))
}

/// Remove `key` from both keyword sets.
fn remove_record_by_key(main: &mut dyn Table, source: &mut dyn Table, key: &str) {
    if source_in_use(source) {
        if let Some(row) = source.keywords_mut().remove(key) {
            trace!("Dropping the model in SOURCE row {row:?}");
        }
    }
    main.keywords_mut().remove(key);
}

/// Remove every OTF model attached to a field used by the main table.
pub(crate) fn remove_otf_model(main: &mut dyn Table, source: &mut dyn Table) -> Result<(), MsError> {
    let field_ids: Vec<i32> = main.get_column_as_vec("FIELD_ID")?;
    for field_id in field_ids.into_iter().sorted().dedup() {
        if let Some((key, source_row)) = defined_model(field_id, main, source) {
            debug!("Removing OTF model '{key}' of field {field_id}");
            let mod_key = model_key(field_id);
            remove_record_by_key(main, source, &key);
            if source_row.is_some() {
                source.keywords_mut().remove(&mod_key);
            }
            main.keywords_mut().remove(&mod_key);
        }
    }
    Ok(())
}
