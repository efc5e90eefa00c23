//! Persisted JSON form of a symbol table.
//!
//! ```json
//! { "fileUri": "...", "symbols": [{ "symbol": { ... } }],
//!   "references": [...], "hierarchicalReferences": [...] }
//! ```
//!
//! Loading is lenient: entries without a name, kind, id or location are skipped, and
//! the legacy single-range `location` (`{ "start", "end" }`) is accepted next to the
//! current `{ "symbolRange", "identifierRange" }` form.

use serde_json::{Map, Value, json};
use tracing::{debug, warn};

use crate::base::Location;
use crate::semantic::types::TableError;

use super::references::{HierarchicalReference, TypeReference};
use super::symbol::{Symbol, SymbolKey, SymbolKind};
use super::table::SymbolTable;

const REQUIRED_SYMBOL_FIELDS: [&str; 4] = ["id", "name", "kind", "location"];

impl SymbolTable {
    pub fn to_json(&self) -> Result<Value, TableError> {
        let symbols = self
            .symbols()
            .map(|symbol| Ok(json!({ "symbol": serde_json::to_value(symbol)? })))
            .collect::<Result<Vec<_>, serde_json::Error>>()?;
        Ok(json!({
            "fileUri": self.file_uri(),
            "symbols": symbols,
            "references": serde_json::to_value(self.references())?,
            "hierarchicalReferences": serde_json::to_value(self.hierarchical_references())?,
        }))
    }

    pub fn to_json_string(&self) -> Result<String, TableError> {
        Ok(serde_json::to_string(&self.to_json()?)?)
    }

    /// Rebuild a table, skipping malformed entries.
    pub fn from_json(value: &Value) -> Result<Self, TableError> {
        let object = value
            .as_object()
            .ok_or_else(|| TableError::structure("expected an object"))?;
        let file_uri = object
            .get("fileUri")
            .and_then(Value::as_str)
            .ok_or_else(|| TableError::structure("missing fileUri"))?;

        let mut table = SymbolTable::new(file_uri);
        let mut skipped = 0usize;

        for entry in array(object, "symbols") {
            match decode_symbol(entry, file_uri) {
                Some(symbol) => {
                    table.add_symbol(symbol);
                }
                None => skipped += 1,
            }
        }

        for entry in array(object, "references") {
            match decode_with_location::<TypeReference>(entry) {
                Some(reference) => table.add_type_reference(reference),
                None => skipped += 1,
            }
        }

        for entry in array(object, "hierarchicalReferences") {
            match decode_with_location::<HierarchicalReference>(entry) {
                Some(reference) => table.add_hierarchical_reference(reference),
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            warn!("[TABLE] {}: skipped {} malformed entries", file_uri, skipped);
        }
        debug!(
            "[TABLE] loaded {} symbols, {} references for {}",
            table.len(),
            table.references().len(),
            file_uri
        );
        Ok(table)
    }

    pub fn from_json_str(text: &str) -> Result<Self, TableError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_json(&value)
    }
}

fn array<'a>(object: &'a Map<String, Value>, field: &str) -> impl Iterator<Item = &'a Value> {
    object
        .get(field)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
}

/// Accept `{ "symbol": {...} }` wrappers as well as bare symbol objects.
fn decode_symbol(entry: &Value, file_uri: &str) -> Option<Symbol> {
    let raw = match entry.get("symbol") {
        Some(inner) => inner,
        None => entry,
    };
    let mut object = raw.as_object()?.clone();
    if REQUIRED_SYMBOL_FIELDS
        .iter()
        .any(|field| object.get(*field).is_none_or(Value::is_null))
    {
        return None;
    }

    let location = upgrade_location(object.get("location")?)?;
    object.insert("location".into(), serde_json::to_value(location).ok()?);

    if !object.contains_key("fileUri") {
        object.insert("fileUri".into(), Value::from(file_uri));
    }
    if !object.contains_key("key") {
        let kind: SymbolKind = serde_json::from_value(object.get("kind")?.clone()).ok()?;
        let name = object.get("name")?.as_str()?;
        let key = SymbolKey::new(Vec::new(), kind, name);
        object.insert("key".into(), serde_json::to_value(key).ok()?);
    }

    serde_json::from_value(Value::Object(object))
        .map_err(|err| debug!("[TABLE] skipping symbol: {}", err))
        .ok()
}

fn decode_with_location<T: serde::de::DeserializeOwned>(entry: &Value) -> Option<T> {
    let mut object = entry.as_object()?.clone();
    let location = upgrade_location(object.get("location")?)?;
    object.insert("location".into(), serde_json::to_value(location).ok()?);
    serde_json::from_value(Value::Object(object))
        .map_err(|err| debug!("[TABLE] skipping reference: {}", err))
        .ok()
}

/// Current dual-range form, or a legacy single range used for both ranges.
fn upgrade_location(value: &Value) -> Option<Location> {
    if value.get("symbolRange").is_some() {
        return serde_json::from_value(value.clone()).ok();
    }
    if value.get("start").is_some() {
        let range = serde_json::from_value(value.clone()).ok()?;
        return Some(Location::single(range));
    }
    None
}
