//! Declared type strings split into name, generic arguments and flags.

use serde::{Deserialize, Serialize};

use crate::base::constants::{is_builtin_type, is_primitive_type};

/// A parsed type such as `Map<String, List<Account>>` or `Integer[]`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TypeInfo {
    /// Base name without generic arguments or array suffix (`Map`)
    pub name: String,
    /// Source text as written
    pub original: String,
    pub type_arguments: Vec<TypeInfo>,
    pub is_array: bool,
    pub is_primitive: bool,
    pub is_builtin: bool,
}

impl TypeInfo {
    /// Parse a type string. Never fails: malformed generics keep whatever could be
    /// split and the remainder becomes the base name.
    pub fn parse(text: &str) -> Self {
        let original: String = text.trim().to_string();
        let mut body = original.as_str();
        let mut is_array = false;
        while let Some(stripped) = body.strip_suffix("[]") {
            is_array = true;
            body = stripped.trim_end();
        }

        let (name, type_arguments) = match body.find('<') {
            Some(open) if body.ends_with('>') => {
                let inner = &body[open + 1..body.len() - 1];
                let args = split_top_level(inner)
                    .into_iter()
                    .filter(|arg| !arg.is_empty())
                    .map(TypeInfo::parse)
                    .collect();
                (body[..open].trim().to_string(), args)
            }
            _ => (body.to_string(), Vec::new()),
        };

        Self {
            is_primitive: is_primitive_type(&name),
            is_builtin: is_builtin_type(&name),
            name,
            original,
            type_arguments,
            is_array,
        }
    }

    pub fn is_void(&self) -> bool {
        self.name.eq_ignore_ascii_case("void")
    }

    pub fn is_generic(&self) -> bool {
        !self.type_arguments.is_empty()
    }

    /// True when the type (ignoring arguments) needs resolution against the graph.
    pub fn needs_resolution(&self) -> bool {
        !self.name.is_empty() && !self.is_primitive && !self.is_builtin
    }

    /// This type and all nested type arguments, depth first.
    pub fn flatten(&self) -> Vec<&TypeInfo> {
        let mut out = vec![self];
        for arg in &self.type_arguments {
            out.extend(arg.flatten());
        }
        out
    }
}

/// Split on commas that are not nested inside `<...>`.
fn split_top_level(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(text[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(text[start..].trim());
    parts
}
