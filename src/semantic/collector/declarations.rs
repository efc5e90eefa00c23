//! Types, members, variables and parameters.

use smol_str::SmolStr;

use crate::base::{Location, Range};
use crate::semantic::symbol_table::{
    Annotation, AnnotationParameter, ModifierOutcome, Modifiers, ParameterInfo,
    ReferenceContext, ScopeKind, SymbolDetails, SymbolId, SymbolKind, TypeInfo, Visibility,
    parameter_signature,
};
use crate::semantic::types::{SemanticError, SemanticErrorKind, SemanticResult};
use crate::syntax::{Construct, NodeRole, SyntaxNode};

use super::SymbolCollector;
use super::rules::{identifier_problem, modifier_problems};
use super::state::PendingDeclaration;

/// Sub-range of a single-line `range` covering `len` chars at char offset `offset`.
pub(super) fn sub_range(range: Range, offset: usize, len: usize) -> Range {
    if range.is_multiline() {
        return range;
    }
    let start = range.start.column + offset as u32;
    Range::from_coords(range.start.line, start, range.start.line, start + len as u32)
}

impl SymbolCollector {
    // ============================================================
    // Files
    // ============================================================

    pub(super) fn enter_compilation_unit(&mut self, node: &dyn SyntaxNode) -> SemanticResult<()> {
        self.push_scope(
            ScopeKind::File,
            SmolStr::new_static("file"),
            "file",
            None,
            Construct::CompilationUnit,
            Location::single(node.range()),
        );
        Ok(())
    }

    pub(super) fn enter_trigger(&mut self, node: &dyn SyntaxNode) -> SemanticResult<()> {
        self.enter_compilation_unit(node)?;
        let pending = self.pending.take();

        let ident = node
            .identifier()
            .ok_or_else(|| SemanticError::malformed("trigger", "name", node.range()))?;
        let name = ident.text().trim();
        self.check_identifier(name, ident.range());
        let sobject = node.type_ref().map(|t| t.text().trim().to_string());

        let location = Location::new(node.range(), ident.range());
        let symbol = self
            .new_symbol(SymbolKind::Trigger, name, name, location)
            .with_modifiers(pending.modifiers)
            .with_annotations(pending.annotations)
            .with_fqn(self.qualify(name))
            .with_details(SymbolDetails::Type {
                super_class: None,
                interfaces: Vec::new(),
                enum_values: Vec::new(),
                sobject: sobject.clone(),
            });
        let id = self.table.add_symbol(symbol);

        if let Some(type_node) = node.type_ref() {
            self.emit_type_references(type_node, ReferenceContext::TriggerSObject);
        }

        self.push_scope(
            ScopeKind::Class,
            SmolStr::new(name),
            name,
            Some(id),
            Construct::TriggerUnit,
            location,
        );
        Ok(())
    }

    // ============================================================
    // Types
    // ============================================================

    pub(super) fn enter_type(
        &mut self,
        construct: Construct,
        node: &dyn SyntaxNode,
    ) -> SemanticResult<()> {
        let pending = self.pending.take();
        let ident = node
            .identifier()
            .ok_or_else(|| SemanticError::malformed(construct.display(), "name", node.range()))?;
        let name = ident.text().trim();
        let kind = match construct {
            Construct::InterfaceDeclaration => SymbolKind::Interface,
            Construct::EnumDeclaration => SymbolKind::Enum,
            _ => SymbolKind::Class,
        };

        self.check_identifier(name, ident.range());
        self.check_inner_type(name, ident.range());
        self.check_modifiers(&pending.modifiers, kind, node.range());
        if self
            .current_scope_symbols()
            .iter()
            .any(|s| s.kind.is_type() && s.name.eq_ignore_ascii_case(name))
        {
            self.error(SemanticError::duplicate(
                format!("Duplicate type name: {name}"),
                ident.range(),
            ));
        }

        let super_class = node
            .child(NodeRole::SuperType)
            .map(|n| n.text().trim().to_string());
        let interfaces: Vec<String> = node
            .children(NodeRole::Interface)
            .iter()
            .map(|n| n.text().trim().to_string())
            .collect();

        let location = Location::new(node.range(), ident.range());
        let fqn = self.qualify(name);
        let symbol = self
            .new_symbol(kind, name, name, location)
            .with_modifiers(pending.modifiers)
            .with_annotations(pending.annotations)
            .with_fqn(fqn)
            .with_details(SymbolDetails::Type {
                super_class,
                interfaces,
                enum_values: Vec::new(),
                sobject: None,
            });
        let id = self.table.add_symbol(symbol);

        if let Some(base) = node.child(NodeRole::SuperType) {
            self.emit_type_references(base, ReferenceContext::SuperType);
        }
        for interface in node.children(NodeRole::Interface) {
            self.emit_type_references(interface, ReferenceContext::InterfaceType);
        }

        self.push_scope(
            ScopeKind::Class,
            SmolStr::new(name),
            name,
            Some(id.clone()),
            construct,
            location,
        );

        if kind == SymbolKind::Enum {
            let values = self.declare_enum_values(node);
            self.table.update_details(&id, |details| {
                if let SymbolDetails::Type { enum_values, .. } = details {
                    *enum_values = values;
                }
            });
        }
        Ok(())
    }

    fn declare_enum_values(&mut self, node: &dyn SyntaxNode) -> Vec<SymbolId> {
        let enum_name = self
            .current_type()
            .map(|s| s.name.to_string())
            .unwrap_or_default();
        let mut ids = Vec::new();
        let mut seen: Vec<String> = Vec::new();

        for value in node.children(NodeRole::EnumValue) {
            let name = value.name().unwrap_or_else(|| value.text()).trim();
            let range = value.identifier().map_or(value.range(), |i| i.range());
            self.check_identifier(name, range);
            let lower = name.to_lowercase();
            if seen.contains(&lower) {
                self.error(SemanticError::duplicate(
                    format!("Duplicate enum value: {name}"),
                    range,
                ));
            }
            seen.push(lower);

            let fqn = self.qualify_member(name);
            let mut modifiers = Modifiers::default();
            modifiers.visibility = Visibility::Public;
            modifiers.is_static = true;
            modifiers.is_final = true;
            let symbol = self
                .new_symbol(SymbolKind::EnumValue, name, name, Location::single(range))
                .with_modifiers(modifiers)
                .with_fqn(fqn)
                .with_details(SymbolDetails::Variable {
                    type_info: TypeInfo::parse(&enum_name),
                    initializer: None,
                });
            ids.push(self.table.add_symbol(symbol));
        }
        ids
    }

    /// Inner types may not shadow their outer type's name or nest twice.
    fn check_inner_type(&mut self, name: &str, range: Range) {
        let Some(scope) = self.current_scope_id() else {
            return;
        };
        let ancestors = self.table.ancestors(&scope);
        let mut outer_types = ancestors.iter().filter(|s| s.kind.is_type());
        let Some(outer) = outer_types.next() else {
            return;
        };
        let outer_name = outer.name.clone();
        let nested_twice = outer_types.next().is_some();

        if outer_name.eq_ignore_ascii_case(name) {
            self.error(SemanticError::illegal_nesting(
                format!("Inner class {name} cannot have the same name as its outer class"),
                range,
            ));
        }
        if nested_twice {
            self.error(SemanticError::illegal_nesting(
                format!("Inner class {name} cannot be defined within another inner class"),
                range,
            ));
        }
    }

    // ============================================================
    // Methods and constructors
    // ============================================================

    pub(super) fn enter_method(
        &mut self,
        construct: Construct,
        node: &dyn SyntaxNode,
    ) -> SemanticResult<()> {
        let mut pending = self.pending.take();
        let ident = node
            .identifier()
            .ok_or_else(|| SemanticError::malformed(construct.display(), "name", node.range()))?;
        let name = ident.text().trim();
        let kind = if construct == Construct::ConstructorDeclaration {
            SymbolKind::Constructor
        } else {
            SymbolKind::Method
        };

        let parameters: Vec<(&dyn SyntaxNode, TypeInfo)> = node
            .parameters()
            .into_iter()
            .map(|p| {
                let type_text = p.type_ref().map_or("", |t| t.text());
                (p, TypeInfo::parse(type_text))
            })
            .collect();
        let signature = parameter_signature(parameters.iter().map(|(_, t)| t.original.as_str()));

        self.check_identifier(name, ident.range());
        let enclosing = self.current_type().map(|s| (s.name.clone(), s.kind));
        if construct == Construct::InterfaceMethodDeclaration
            || enclosing.as_ref().is_some_and(|(_, k)| *k == SymbolKind::Interface)
        {
            pending.modifiers.is_abstract = true;
            if pending.modifiers.visibility == Visibility::Default {
                pending.modifiers.visibility = Visibility::Public;
            }
        } else {
            self.check_modifiers(&pending.modifiers, kind, node.range());
        }

        if kind == SymbolKind::Constructor {
            if let Some((type_name, _)) = &enclosing {
                if !type_name.eq_ignore_ascii_case(name) {
                    self.error(SemanticError::new(
                        SemanticErrorKind::InvalidConstructor,
                        format!("Invalid constructor name: {name} (expected {type_name})"),
                        ident.range(),
                    ));
                }
            }
        }

        let duplicate = self.current_scope_symbols().iter().any(|s| {
            s.kind == kind && s.name.eq_ignore_ascii_case(name) && s.signature() == signature
        });
        if duplicate {
            let what = if kind == SymbolKind::Constructor {
                "constructor"
            } else {
                "method"
            };
            self.error(SemanticError::duplicate(
                format!("Duplicate {what} declaration: {name}{signature}"),
                ident.range(),
            ));
        }

        let return_type = match (kind, node.type_ref()) {
            (SymbolKind::Method, Some(t)) => TypeInfo::parse(t.text()),
            (SymbolKind::Constructor, _) => {
                TypeInfo::parse(enclosing.as_ref().map_or("void", |(n, _)| n.as_str()))
            }
            _ => TypeInfo::parse("void"),
        };

        let key_name = format!("{name}{signature}");
        let location = Location::new(node.range(), ident.range());
        let fqn = self.qualify_member(name);
        let symbol = self
            .new_symbol(kind, &key_name, name, location)
            .with_modifiers(pending.modifiers)
            .with_annotations(pending.annotations)
            .with_fqn(fqn)
            .with_details(SymbolDetails::Method {
                return_type,
                parameters: Vec::new(),
            });
        let id = self.table.add_symbol(symbol);

        if kind == SymbolKind::Method {
            if let Some(type_node) = node.type_ref() {
                let context = if self.is_web_service(&id) {
                    ReferenceContext::WebServiceType
                } else {
                    ReferenceContext::ReturnType
                };
                self.emit_type_references(type_node, context);
            }
        }

        self.push_scope(
            ScopeKind::Method,
            SmolStr::new(&key_name),
            name,
            Some(id.clone()),
            construct,
            location,
        );

        let mut infos = Vec::with_capacity(parameters.len());
        let mut seen: Vec<String> = Vec::new();
        for (param, type_info) in parameters {
            match self.declare_parameter(param, type_info, &mut seen) {
                Ok(info) => infos.push(info),
                Err(err) => self.error(err),
            }
        }
        self.table.update_details(&id, |details| {
            if let SymbolDetails::Method { parameters, .. } = details {
                *parameters = infos;
            }
        });
        Ok(())
    }

    fn declare_parameter(
        &mut self,
        param: &dyn SyntaxNode,
        type_info: TypeInfo,
        seen: &mut Vec<String>,
    ) -> SemanticResult<ParameterInfo> {
        let ident = param
            .identifier()
            .ok_or_else(|| SemanticError::malformed("parameter", "name", param.range()))?;
        let name = ident.text().trim();
        self.check_identifier(name, ident.range());
        let lower = name.to_lowercase();
        if seen.contains(&lower) {
            self.error(SemanticError::duplicate(
                format!("Duplicate parameter name: {name}"),
                ident.range(),
            ));
        }
        seen.push(lower);

        let symbol = self
            .new_symbol(
                SymbolKind::Parameter,
                name,
                name,
                Location::new(param.range(), ident.range()),
            )
            .with_details(SymbolDetails::Variable {
                type_info: type_info.clone(),
                initializer: None,
            });
        let id = self.table.add_symbol(symbol);
        if let Some(type_node) = param.type_ref() {
            self.emit_type_references(type_node, ReferenceContext::ParameterType);
        }
        Ok(ParameterInfo {
            name: SmolStr::new(name),
            type_info,
            id: Some(id),
        })
    }

    // ============================================================
    // Fields, properties and local variables
    // ============================================================

    pub(super) fn enter_field(
        &mut self,
        construct: Construct,
        node: &dyn SyntaxNode,
    ) -> SemanticResult<()> {
        let pending = self.pending.take();
        let kind = if construct == Construct::PropertyDeclaration {
            SymbolKind::Property
        } else {
            SymbolKind::Field
        };
        let type_node = node
            .type_ref()
            .ok_or_else(|| SemanticError::malformed(construct.display(), "type", node.range()))?;
        let names = node.children(NodeRole::Identifier);
        if names.is_empty() {
            return Err(SemanticError::malformed(construct.display(), "name", node.range()));
        }
        self.check_modifiers(&pending.modifiers, kind, node.range());
        let type_info = TypeInfo::parse(type_node.text());
        let initializer = initializer_text(node, names.len());

        for ident in names {
            let name = ident.text().trim();
            self.check_identifier(name, ident.range());
            if self.current_scope_symbols().iter().any(|s| {
                matches!(s.kind, SymbolKind::Field | SymbolKind::Property)
                    && s.name.eq_ignore_ascii_case(name)
            }) {
                self.error(SemanticError::duplicate(
                    format!("Duplicate {}: {name}", kind.display()),
                    ident.range(),
                ));
            }
            let fqn = self.qualify_member(name);
            let symbol = self
                .new_symbol(kind, name, name, Location::new(node.range(), ident.range()))
                .with_modifiers(pending.modifiers)
                .with_annotations(pending.annotations.clone())
                .with_fqn(fqn)
                .with_details(SymbolDetails::Variable {
                    type_info: type_info.clone(),
                    initializer: initializer.clone(),
                });
            self.table.add_symbol(symbol);
        }
        self.emit_type_references(type_node, ReferenceContext::TypeDeclaration);
        Ok(())
    }

    pub(super) fn enter_local_variable(&mut self, node: &dyn SyntaxNode) -> SemanticResult<()> {
        let pending = self.pending.take();
        let construct = Construct::LocalVariableDeclaration;
        let type_node = node
            .type_ref()
            .ok_or_else(|| SemanticError::malformed(construct.display(), "type", node.range()))?;
        let names = node.children(NodeRole::Identifier);
        if names.is_empty() {
            return Err(SemanticError::malformed(construct.display(), "name", node.range()));
        }
        self.check_modifiers(&pending.modifiers, SymbolKind::Variable, node.range());
        let type_info = TypeInfo::parse(type_node.text());
        let initializer = initializer_text(node, names.len());

        for ident in names {
            self.declare_variable(
                ident,
                node.range(),
                type_info.clone(),
                initializer.clone(),
                pending.modifiers,
            );
        }
        self.emit_type_references(type_node, ReferenceContext::TypeDeclaration);
        Ok(())
    }

    /// Declare a local variable in the current scope, reporting shadowed locals of the
    /// same method.
    pub(super) fn declare_variable(
        &mut self,
        ident: &dyn SyntaxNode,
        declaration: Range,
        type_info: TypeInfo,
        initializer: Option<String>,
        modifiers: Modifiers,
    ) {
        let name = ident.text().trim();
        self.check_identifier(name, ident.range());
        if self.is_local_declared(name) {
            self.error(SemanticError::duplicate(
                format!("Duplicate variable: {name}"),
                ident.range(),
            ));
        }
        let symbol = self
            .new_symbol(
                SymbolKind::Variable,
                name,
                name,
                Location::new(declaration, ident.range()),
            )
            .with_modifiers(modifiers)
            .with_details(SymbolDetails::Variable {
                type_info,
                initializer,
            });
        self.table.add_symbol(symbol);
    }

    /// A variable or parameter of this name exists between the current scope and the
    /// enclosing method scope.
    fn is_local_declared(&self, name: &str) -> bool {
        for frame in self.scopes.iter().rev() {
            let clash = self.table.children_of(&frame.id).iter().any(|s| {
                matches!(s.kind, SymbolKind::Variable | SymbolKind::Parameter)
                    && s.name.eq_ignore_ascii_case(name)
            });
            if clash {
                return true;
            }
            if matches!(frame.kind, ScopeKind::Method | ScopeKind::Class) {
                break;
            }
        }
        false
    }

    // ============================================================
    // Modifiers and annotations
    // ============================================================

    pub(super) fn enter_modifier(&mut self, node: &dyn SyntaxNode) -> SemanticResult<()> {
        let keyword = node.text().trim();
        match self.pending.modifiers.apply(keyword) {
            ModifierOutcome::Applied => Ok(()),
            ModifierOutcome::Repeated => Err(SemanticError::illegal_modifier(
                format!("Duplicate modifier: {keyword}"),
                node.range(),
            )),
            ModifierOutcome::ConflictingVisibility => Err(SemanticError::illegal_modifier(
                format!("Conflicting visibility modifier: {keyword}"),
                node.range(),
            )),
            ModifierOutcome::Unknown => Err(SemanticError::illegal_modifier(
                format!("Unknown modifier: {keyword}"),
                node.range(),
            )),
        }
    }

    pub(super) fn enter_annotation(&mut self, node: &dyn SyntaxNode) -> SemanticResult<()> {
        let name = node
            .name()
            .unwrap_or_else(|| node.text())
            .trim()
            .trim_start_matches('@');
        if name.is_empty() {
            return Err(SemanticError::malformed("annotation", "name", node.range()));
        }
        let mut annotation = Annotation::new(name, node.range());
        annotation.parameters = node
            .children(NodeRole::AnnotationParameter)
            .iter()
            .map(|p| AnnotationParameter::parse(p.text()))
            .collect();
        if annotation.is_test() {
            self.pending.modifiers.is_test_method = true;
        }
        let range = node.identifier().map_or(node.range(), |i| i.range());
        let reference = self.reference(
            name,
            Location::new(node.range(), range),
            ReferenceContext::AnnotationReference,
        );
        self.emit(reference);
        self.pending.annotations.push(annotation);
        Ok(())
    }

    /// Drop modifiers that no declaration consumed.
    pub(super) fn discard_pending(&mut self, construct: Construct) {
        if !self.pending.is_empty() {
            let PendingDeclaration { modifiers, .. } = self.pending.take();
            tracing::trace!(
                "[COLLECTOR] dropping modifiers {:?} before {}",
                modifiers.keywords(),
                construct.display()
            );
        }
    }

    // ============================================================
    // Shared checks and helpers
    // ============================================================

    pub(super) fn check_identifier(&mut self, name: &str, range: Range) {
        if let Some(problem) = identifier_problem(name) {
            self.error(SemanticError::invalid_identifier(problem, range));
        }
    }

    fn check_modifiers(&mut self, modifiers: &Modifiers, kind: SymbolKind, range: Range) {
        for problem in modifier_problems(modifiers, kind) {
            self.error(SemanticError::illegal_modifier(problem, range));
        }
    }

    fn is_web_service(&self, id: &SymbolId) -> bool {
        self.table
            .get(id)
            .is_some_and(|s| s.modifiers.is_web_service)
    }

    /// FQN of a type declared in the current scope.
    fn qualify(&self, name: &str) -> String {
        let mut parts: Vec<String> = Vec::new();
        if let Some(ns) = &self.namespace {
            parts.push(ns.to_string());
        }
        for frame in &self.scopes {
            if frame.kind != ScopeKind::Class {
                continue;
            }
            if let Some(owner) = frame.owner.as_ref().and_then(|id| self.table.get(id)) {
                parts.push(owner.name.to_string());
            }
        }
        parts.push(name.to_string());
        parts.join(".")
    }

    /// FQN of a member of the current type.
    fn qualify_member(&self, name: &str) -> String {
        match self.current_type() {
            Some(owner) => format!("{}.{name}", owner.qualified_name()),
            None => name.to_string(),
        }
    }

    /// Reference the base type and every generic argument of a type node.
    pub(super) fn emit_type_references(
        &mut self,
        type_node: &dyn SyntaxNode,
        context: ReferenceContext,
    ) {
        let text = type_node.text();
        let info = TypeInfo::parse(text);
        if info.name.is_empty() || info.is_void() {
            return;
        }
        let range = type_node.range();
        let leading = text.chars().take_while(|c| c.is_whitespace()).count();
        let base = sub_range(range, leading, info.name.chars().count());
        let reference = self.reference(info.name.clone(), Location::new(range, base), context);
        self.emit(reference);

        let mut cursor = text.len() - text.trim_start().len() + info.name.len();
        for argument in info.flatten().into_iter().skip(1) {
            let Some(found) = text.get(cursor..).and_then(|rest| rest.find(&argument.name)) else {
                continue;
            };
            let byte_start = cursor + found;
            let offset = text[..byte_start].chars().count();
            let arg_range = sub_range(range, offset, argument.name.chars().count());
            cursor = byte_start + argument.name.len();
            let reference = self.reference(
                argument.name.clone(),
                Location::new(range, arg_range),
                ReferenceContext::GenericParameterType,
            );
            self.emit(reference);
        }
    }
}

/// Initializer text, only when a single name is declared.
fn initializer_text(node: &dyn SyntaxNode, names: usize) -> Option<String> {
    if names != 1 {
        return None;
    }
    node.child(NodeRole::Value).map(|v| v.text().trim().to_string())
}
