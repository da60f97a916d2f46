// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Table and column keyword sets.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Keyword {
    Bool(bool),
    Int(i32),
    Double(f64),
    String(String),
    Strings(Vec<String>),
    /// A link to a sub-table, relative to the owning table's directory.
    Table(String),
    /// Kept in memory only; casacore records can't be written through rubbl.
    Record(Keywords),
}

/// An ordered set of named keywords.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Keywords(IndexMap<String, Keyword>);

impl Keywords {
    pub fn new() -> Keywords {
        Keywords::default()
    }

    pub fn get(&self, name: &str) -> Option<&Keyword> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Insert a keyword, returning any previous value with the same name.
    pub fn insert<S: Into<String>>(&mut self, name: S, value: Keyword) -> Option<Keyword> {
        self.0.insert(name.into(), value)
    }

    /// Remove a keyword, keeping the order of the others.
    pub fn remove(&mut self, name: &str) -> Option<Keyword> {
        self.0.shift_remove(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        match self.0.get(name) {
            Some(Keyword::String(s)) | Some(Keyword::Table(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn get_int(&self, name: &str) -> Option<i32> {
        match self.0.get(name) {
            Some(Keyword::Int(i)) => Some(*i),
            _ => None,
        }
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.0.get(name) {
            Some(Keyword::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Keyword)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
