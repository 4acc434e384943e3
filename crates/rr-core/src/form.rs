//! # Form Input
//!
//! Raw web-form submissions map each field name to one or more values, the
//! first of which is effective. Logic services extract typed inputs from a
//! `FormMap` and validate them with the helpers below.

use crate::error::{AppError, Result};
use std::collections::BTreeMap;

/// Field name shared by every entity form.
pub const ID: &str = "id";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormMap {
    values: BTreeMap<String, Vec<String>>,
}

impl FormMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a map from decoded `key=value` pairs; repeated keys accumulate values.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut form = Self::new();
        for (key, value) in pairs {
            form.values.entry(key.into()).or_default().push(value.into());
        }
        form
    }

    /// Replaces all values of `key`.
    pub fn insert(&mut self, key: impl Into<String>, values: Vec<String>) {
        self.values.insert(key.into(), values);
    }

    /// Replaces all values of `key` with a single value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), vec![value.into()]);
    }

    pub fn remove(&mut self, key: &str) -> Option<Vec<String>> {
        self.values.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.values.get(key).map(Vec::as_slice)
    }

    /// The effective value of a required field.
    pub fn first(&self, key: &str) -> Result<&str> {
        let values = self
            .values
            .get(key)
            .ok_or_else(|| AppError::MissingField(key.to_string()))?;
        values
            .first()
            .map(String::as_str)
            .ok_or_else(|| AppError::EmptyField(key.to_string()))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.values.iter()
    }

    /// One `Key=k, Value/s=[a, b]` line per submitted field, for echoing back on pages.
    pub fn describe(&self) -> Vec<String> {
        self.values
            .iter()
            .map(|(k, v)| format!("Key={}, Value/s=[{}]", k, v.join(", ")))
            .collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormMap {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self::from_pairs(iter)
    }
}

/// Rejects a text value that is blank or longer than `max` characters.
pub fn validate_text(field: &str, value: &str, max: usize) -> Result<()> {
    if value.trim().is_empty() || value.chars().count() > max {
        return Err(AppError::ValidationError(format!(
            "{field}: value cannot be null, empty or larger than {max} characters"
        )));
    }
    Ok(())
}

/// Parses the optional `id` field. Absent means a new row.
pub fn parse_optional_id(form: &FormMap) -> Result<Option<i32>> {
    if !form.contains(ID) {
        return Ok(None);
    }
    parse_id(ID, form.first(ID)?).map(Some)
}

/// Parses a non-negative integer id submitted in `field`.
pub fn parse_id(field: &str, raw: &str) -> Result<i32> {
    let id: i32 = raw
        .trim()
        .parse()
        .map_err(|e| AppError::ValidationError(format!("{field}: \"{raw}\" is not a valid id ({e})")))?;
    if id < 0 {
        return Err(AppError::ValidationError(format!("{field}: id cannot be negative")));
    }
    Ok(id)
}
