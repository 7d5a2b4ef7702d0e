//! Argument extraction shared by the tool handlers

use super::{AlgorithmError, ToolDefinition};
use crate::db::{Row, StoreError};
use crate::services::GdsService;
use serde_json::{Map, Value};

/// GDS configuration map for a call: every schema-declared argument except
/// `local_keys`, with nulls dropped
pub(crate) fn forwarded_config(
    definition: &ToolDefinition,
    arguments: &Map<String, Value>,
    local_keys: &[&str],
) -> Map<String, Value> {
    let declared = definition.property_names();
    arguments
        .iter()
        .filter(|(key, value)| {
            !value.is_null()
                && declared.contains(&key.as_str())
                && !local_keys.contains(&key.as_str())
        })
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

pub(crate) fn optional_str(
    arguments: &Map<String, Value>,
    key: &str,
) -> Result<Option<String>, AlgorithmError> {
    match arguments.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(AlgorithmError::invalid_arguments(format!(
            "'{}' must be a string, got {}",
            key, other
        ))),
    }
}

pub(crate) fn required_str(
    arguments: &Map<String, Value>,
    key: &str,
) -> Result<String, AlgorithmError> {
    optional_str(arguments, key)?.ok_or_else(|| {
        AlgorithmError::invalid_arguments(format!("Missing required argument '{}'", key))
    })
}

/// A string or list of strings; `None` when absent
pub(crate) fn string_list(
    arguments: &Map<String, Value>,
    key: &str,
) -> Result<Option<Vec<String>>, AlgorithmError> {
    let invalid = || {
        AlgorithmError::invalid_arguments(format!(
            "'{}' must be a string or a list of strings",
            key
        ))
    };

    match arguments.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(vec![s.clone()])),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string).ok_or_else(invalid))
            .collect::<Result<Vec<_>, _>>()
            .map(Some),
        Some(_) => Err(invalid()),
    }
}

pub(crate) fn rows_to_value(rows: Vec<Row>) -> Value {
    Value::Array(rows.into_iter().map(Value::Object).collect())
}

/// For each `(id_column, name_column)` pair, look up the `property` value of
/// the node id held in `id_column` and store it under `name_column`
pub(crate) async fn attach_node_names(
    gds: &GdsService,
    rows: &mut [Row],
    property: &str,
    columns: &[(&str, &str)],
) -> Result<(), StoreError> {
    let mut ids: Vec<i64> = rows
        .iter()
        .flat_map(|row| {
            columns
                .iter()
                .filter_map(move |(id_column, _)| row.get(*id_column).and_then(Value::as_i64))
        })
        .collect();
    ids.sort_unstable();
    ids.dedup();

    let names = gds.node_names(property, &ids).await?;

    for row in rows.iter_mut() {
        for (id_column, name_column) in columns {
            let name = row
                .get(*id_column)
                .and_then(Value::as_i64)
                .and_then(|id| names.get(&id).cloned())
                .unwrap_or(Value::Null);
            row.insert((*name_column).to_string(), name);
        }
    }
    Ok(())
}
