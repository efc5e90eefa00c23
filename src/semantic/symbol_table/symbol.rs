use std::fmt;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::base::Location;

use super::modifiers::{Annotation, Modifiers};
use super::type_info::TypeInfo;

/// Globally unique, deterministic symbol identity.
///
/// Format: `{file uri}#{scope path}.{kind}:{name}`. Ids are stable across re-parses of
/// unchanged declarations, which is what lets the graph replace a file's symbols in
/// place and lets the pool de-duplicate them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolId(pub SmolStr);

impl SymbolId {
    pub fn new(id: impl Into<SmolStr>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The file URI prefix of the id.
    pub fn file_uri(&self) -> &str {
        self.0.split_once('#').map_or(&self.0, |(uri, _)| uri)
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SymbolId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// The kind of a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SymbolKind {
    Class,
    Interface,
    Enum,
    Trigger,
    Method,
    Constructor,
    Field,
    Property,
    Variable,
    Parameter,
    EnumValue,
    Block,
}

impl SymbolKind {
    /// Classes, interfaces, enums and triggers.
    pub fn is_type(&self) -> bool {
        matches!(self, Self::Class | Self::Interface | Self::Enum | Self::Trigger)
    }

    pub fn is_method_like(&self) -> bool {
        matches!(self, Self::Method | Self::Constructor)
    }

    /// Symbols that carry a declared type.
    pub fn is_variable_like(&self) -> bool {
        matches!(
            self,
            Self::Field | Self::Property | Self::Variable | Self::Parameter
        )
    }

    /// Members of a type (what a type scope directly contains).
    pub fn is_member(&self) -> bool {
        matches!(
            self,
            Self::Method | Self::Constructor | Self::Field | Self::Property | Self::EnumValue
        )
    }

    /// Short tag used inside symbol ids.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Interface => "interface",
            Self::Enum => "enum",
            Self::Trigger => "trigger",
            Self::Method => "method",
            Self::Constructor => "constructor",
            Self::Field => "field",
            Self::Property => "property",
            Self::Variable => "variable",
            Self::Parameter => "parameter",
            Self::EnumValue => "enumValue",
            Self::Block => "block",
        }
    }

    pub fn display(&self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Interface => "interface",
            Self::Enum => "enum",
            Self::Trigger => "trigger",
            Self::Method => "method",
            Self::Constructor => "constructor",
            Self::Field => "field",
            Self::Property => "property",
            Self::Variable => "variable",
            Self::Parameter => "parameter",
            Self::EnumValue => "enum value",
            Self::Block => "block",
        }
    }
}

/// The lexical construct a block symbol represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScopeKind {
    File,
    Class,
    Method,
    Block,
    If,
    While,
    For,
    DoWhile,
    Try,
    Catch,
    Finally,
    Switch,
    When,
    RunAs,
    Getter,
    Setter,
}

impl ScopeKind {
    /// Scopes that add a decision point to a method's complexity.
    pub fn is_branch(&self) -> bool {
        matches!(
            self,
            Self::If | Self::While | Self::For | Self::DoWhile | Self::Catch | Self::When
        )
    }

    /// Prefix of generated block names (`if_3`, `catch_7`).
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Class => "class",
            Self::Method => "method",
            Self::Block => "block",
            Self::If => "if",
            Self::While => "while",
            Self::For => "for",
            Self::DoWhile => "doWhile",
            Self::Try => "try",
            Self::Catch => "catch",
            Self::Finally => "finally",
            Self::Switch => "switch",
            Self::When => "when",
            Self::RunAs => "runAs",
            Self::Getter => "getter",
            Self::Setter => "setter",
        }
    }
}

/// Structural key of a symbol: scope path, kind and name.
///
/// Two declarations with equal keys in one file are the same declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolKey {
    /// Names of the enclosing scopes, outermost first
    pub path: Vec<SmolStr>,
    pub kind: SymbolKind,
    /// Name, with the parameter signature appended for methods and constructors
    pub name: SmolStr,
}

impl SymbolKey {
    pub fn new(path: Vec<SmolStr>, kind: SymbolKind, name: impl Into<SmolStr>) -> Self {
        Self {
            path,
            kind,
            name: name.into(),
        }
    }

    /// Render the id of the symbol with this key in `file_uri`.
    pub fn to_id(&self, file_uri: &str) -> SymbolId {
        let mut id = String::with_capacity(file_uri.len() + 32);
        id.push_str(file_uri);
        id.push('#');
        for segment in &self.path {
            id.push_str(segment);
            id.push('.');
        }
        id.push_str(self.kind.tag());
        id.push(':');
        id.push_str(&self.name);
        SymbolId::new(id)
    }
}

/// A formal parameter of a method or constructor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterInfo {
    pub name: SmolStr,
    pub type_info: TypeInfo,
    /// The parameter symbol in the method scope
    #[serde(default)]
    pub id: Option<SymbolId>,
}

/// Kind-specific payload of a symbol.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "detail", rename_all = "camelCase")]
pub enum SymbolDetails {
    #[default]
    None,
    /// Classes, interfaces, enums and triggers
    #[serde(rename_all = "camelCase")]
    Type {
        #[serde(default)]
        super_class: Option<String>,
        #[serde(default)]
        interfaces: Vec<String>,
        /// Ordered enum value symbols (enums only)
        #[serde(default)]
        enum_values: Vec<SymbolId>,
        /// SObject a trigger is declared on (triggers only)
        #[serde(default)]
        sobject: Option<String>,
    },
    /// Methods and constructors
    #[serde(rename_all = "camelCase")]
    Method {
        return_type: TypeInfo,
        #[serde(default)]
        parameters: Vec<ParameterInfo>,
    },
    /// Fields, properties, variables, parameters and enum values
    #[serde(rename_all = "camelCase")]
    Variable {
        type_info: TypeInfo,
        #[serde(default)]
        initializer: Option<String>,
    },
    /// Scope symbols
    #[serde(rename_all = "camelCase")]
    Block { scope_kind: ScopeKind },
}

/// A named semantic entity: a type, member, variable or scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Symbol {
    pub id: SymbolId,
    pub name: SmolStr,
    pub kind: SymbolKind,
    pub file_uri: SmolStr,
    /// Enclosing scope, or for class/method scopes the symbol they represent
    #[serde(default)]
    pub parent_id: Option<SymbolId>,
    pub location: Location,
    #[serde(default)]
    pub modifiers: Modifiers,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    pub key: SymbolKey,
    #[serde(default)]
    pub namespace: Option<SmolStr>,
    /// Fully qualified dotted name (types and members only)
    #[serde(default)]
    pub fqn: Option<String>,
    #[serde(default)]
    pub details: SymbolDetails,
}

impl Symbol {
    /// Create a symbol whose id is derived from `key`.
    pub fn new(
        file_uri: impl Into<SmolStr>,
        key: SymbolKey,
        name: impl Into<SmolStr>,
        location: Location,
    ) -> Self {
        let file_uri = file_uri.into();
        Self {
            id: key.to_id(&file_uri),
            name: name.into(),
            kind: key.kind,
            file_uri,
            parent_id: None,
            location,
            modifiers: Modifiers::default(),
            annotations: Vec::new(),
            key,
            namespace: None,
            fqn: None,
            details: SymbolDetails::None,
        }
    }

    pub fn with_parent(mut self, parent: Option<SymbolId>) -> Self {
        self.parent_id = parent;
        self
    }

    pub fn with_details(mut self, details: SymbolDetails) -> Self {
        self.details = details;
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_annotations(mut self, annotations: Vec<Annotation>) -> Self {
        self.annotations = annotations;
        self
    }

    pub fn with_fqn(mut self, fqn: impl Into<String>) -> Self {
        self.fqn = Some(fqn.into());
        self
    }

    pub fn with_namespace(mut self, namespace: Option<SmolStr>) -> Self {
        self.namespace = namespace;
        self
    }

    /// Qualified name if known, otherwise the simple name.
    pub fn qualified_name(&self) -> &str {
        self.fqn.as_deref().unwrap_or(&self.name)
    }

    pub fn is_scope(&self) -> bool {
        self.kind == SymbolKind::Block
    }

    pub fn scope_kind(&self) -> Option<ScopeKind> {
        match &self.details {
            SymbolDetails::Block { scope_kind } => Some(*scope_kind),
            _ => None,
        }
    }

    pub fn super_class(&self) -> Option<&str> {
        match &self.details {
            SymbolDetails::Type { super_class, .. } => super_class.as_deref(),
            _ => None,
        }
    }

    pub fn interfaces(&self) -> &[String] {
        match &self.details {
            SymbolDetails::Type { interfaces, .. } => interfaces,
            _ => &[],
        }
    }

    pub fn enum_values(&self) -> &[SymbolId] {
        match &self.details {
            SymbolDetails::Type { enum_values, .. } => enum_values,
            _ => &[],
        }
    }

    pub fn return_type(&self) -> Option<&TypeInfo> {
        match &self.details {
            SymbolDetails::Method { return_type, .. } => Some(return_type),
            _ => None,
        }
    }

    pub fn parameters(&self) -> &[ParameterInfo] {
        match &self.details {
            SymbolDetails::Method { parameters, .. } => parameters,
            _ => &[],
        }
    }

    /// Declared type of a variable-like symbol.
    pub fn type_info(&self) -> Option<&TypeInfo> {
        match &self.details {
            SymbolDetails::Variable { type_info, .. } => Some(type_info),
            _ => None,
        }
    }

    /// Case-normalised parameter type list used for duplicate detection.
    pub fn signature(&self) -> String {
        parameter_signature(self.parameters().iter().map(|p| p.type_info.original.as_str()))
    }

    /// One-line declaration summary, e.g. `public static void run(String a)`.
    pub fn declaration(&self) -> String {
        let modifiers = self.modifiers.keywords().join(" ");
        let prefix = if modifiers.is_empty() {
            String::new()
        } else {
            format!("{modifiers} ")
        };
        match self.kind {
            SymbolKind::Method | SymbolKind::Constructor => {
                let params = self
                    .parameters()
                    .iter()
                    .map(|p| format!("{} {}", p.type_info.original, p.name))
                    .collect::<Vec<_>>()
                    .join(", ");
                match self.return_type() {
                    Some(ret) if self.kind == SymbolKind::Method => {
                        format!("{prefix}{} {}({params})", ret.original, self.name)
                    }
                    _ => format!("{prefix}{}({params})", self.name),
                }
            }
            SymbolKind::Class
            | SymbolKind::Interface
            | SymbolKind::Enum
            | SymbolKind::Trigger => {
                let mut text = format!("{prefix}{} {}", self.kind.display(), self.name);
                if let Some(base) = self.super_class() {
                    text.push_str(&format!(" extends {base}"));
                }
                if !self.interfaces().is_empty() {
                    let keyword = if self.kind == SymbolKind::Interface {
                        "extends"
                    } else {
                        "implements"
                    };
                    text.push_str(&format!(" {keyword} {}", self.interfaces().join(", ")));
                }
                text
            }
            SymbolKind::Field
            | SymbolKind::Property
            | SymbolKind::Variable
            | SymbolKind::Parameter => match self.type_info() {
                Some(ty) => format!("{prefix}{} {}", ty.original, self.name),
                None => format!("{prefix}{}", self.name),
            },
            SymbolKind::EnumValue => self.name.to_string(),
            SymbolKind::Block => format!(
                "{} scope",
                self.scope_kind().map_or("block", |k| k.prefix())
            ),
        }
    }
}

/// Lower-cased, whitespace-free parameter type list: `(string,list<integer>)`.
pub fn parameter_signature<'a>(types: impl IntoIterator<Item = &'a str>) -> String {
    let parts: Vec<String> = types
        .into_iter()
        .map(|t| {
            t.chars()
                .filter(|c| !c.is_whitespace())
                .collect::<String>()
                .to_lowercase()
        })
        .collect();
    format!("({})", parts.join(","))
}
