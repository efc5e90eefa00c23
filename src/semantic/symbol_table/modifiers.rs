//! Modifiers and annotations attached to declarations.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::base::Range;
use crate::base::constants::{TEST_ANNOTATION, TEST_METHOD_MODIFIER};

/// Access level of a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Visibility {
    Public,
    Private,
    Protected,
    Global,
    #[default]
    Default,
}

impl Visibility {
    pub fn keyword(&self) -> Option<&'static str> {
        match self {
            Self::Public => Some("public"),
            Self::Private => Some("private"),
            Self::Protected => Some("protected"),
            Self::Global => Some("global"),
            Self::Default => None,
        }
    }

    /// Visible outside the declaring file's namespace.
    pub fn is_exposed(&self) -> bool {
        matches!(self, Self::Public | Self::Global)
    }
}

/// Modifier set of a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Modifiers {
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_final: bool,
    pub is_abstract: bool,
    pub is_virtual: bool,
    pub is_override: bool,
    pub is_transient: bool,
    pub is_test_method: bool,
    pub is_web_service: bool,
    pub is_built_in: bool,
    /// `with sharing` / `without sharing` / `inherited sharing` were seen
    pub sharing: Option<Sharing>,
}

/// Sharing mode declared on a class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Sharing {
    With,
    Without,
    Inherited,
}

/// Outcome of applying one modifier keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifierOutcome {
    Applied,
    /// The keyword was already present
    Repeated,
    /// A second visibility keyword replaced the first
    ConflictingVisibility,
    Unknown,
}

impl Modifiers {
    /// Apply a modifier keyword (case-insensitive).
    pub fn apply(&mut self, keyword: &str) -> ModifierOutcome {
        let keyword = keyword.trim().to_ascii_lowercase();
        let visibility = match keyword.as_str() {
            "public" => Some(Visibility::Public),
            "private" => Some(Visibility::Private),
            "protected" => Some(Visibility::Protected),
            "global" => Some(Visibility::Global),
            _ => None,
        };
        if let Some(visibility) = visibility {
            let previous = self.visibility;
            self.visibility = visibility;
            return if previous == Visibility::Default {
                ModifierOutcome::Applied
            } else if previous == visibility {
                ModifierOutcome::Repeated
            } else {
                ModifierOutcome::ConflictingVisibility
            };
        }

        let flag = match keyword.as_str() {
            "static" => &mut self.is_static,
            "final" => &mut self.is_final,
            "abstract" => &mut self.is_abstract,
            "virtual" => &mut self.is_virtual,
            "override" => &mut self.is_override,
            "transient" => &mut self.is_transient,
            "webservice" => &mut self.is_web_service,
            k if k == TEST_METHOD_MODIFIER.to_ascii_lowercase() => &mut self.is_test_method,
            "with sharing" | "without sharing" | "inherited sharing" => {
                self.sharing = match keyword.as_str() {
                    "with sharing" => Some(Sharing::With),
                    "without sharing" => Some(Sharing::Without),
                    _ => Some(Sharing::Inherited),
                };
                return ModifierOutcome::Applied;
            }
            _ => return ModifierOutcome::Unknown,
        };
        if *flag {
            ModifierOutcome::Repeated
        } else {
            *flag = true;
            ModifierOutcome::Applied
        }
    }

    /// Keywords in canonical order, for display.
    pub fn keywords(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if let Some(keyword) = self.visibility.keyword() {
            out.push(keyword);
        }
        match self.sharing {
            Some(Sharing::With) => out.push("with sharing"),
            Some(Sharing::Without) => out.push("without sharing"),
            Some(Sharing::Inherited) => out.push("inherited sharing"),
            None => {}
        }
        for (set, keyword) in [
            (self.is_static, "static"),
            (self.is_final, "final"),
            (self.is_abstract, "abstract"),
            (self.is_virtual, "virtual"),
            (self.is_override, "override"),
            (self.is_transient, "transient"),
            (self.is_web_service, "webservice"),
        ] {
            if set {
                out.push(keyword);
            }
        }
        out
    }
}

/// A parameter of an annotation: `SeeAllData=true` or a positional value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationParameter {
    #[serde(default)]
    pub name: Option<SmolStr>,
    pub value: String,
}

impl AnnotationParameter {
    /// Split `name=value` text; text without `=` is positional.
    pub fn parse(text: &str) -> Self {
        match text.split_once('=') {
            Some((name, value)) => Self {
                name: Some(SmolStr::new(name.trim())),
                value: value.trim().to_string(),
            },
            None => Self {
                name: None,
                value: text.trim().to_string(),
            },
        }
    }
}

/// An annotation such as `@IsTest(SeeAllData=true)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub name: SmolStr,
    #[serde(default)]
    pub parameters: Vec<AnnotationParameter>,
    #[serde(default)]
    pub location: Range,
}

impl Annotation {
    pub fn new(name: impl Into<SmolStr>, location: Range) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            location,
        }
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.name.trim_start_matches('@').eq_ignore_ascii_case(name)
    }

    pub fn is_test(&self) -> bool {
        self.is_named(TEST_ANNOTATION)
    }

    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|p| p.name.as_deref().is_some_and(|n| n.eq_ignore_ascii_case(name)))
            .map(|p| p.value.as_str())
    }
}
