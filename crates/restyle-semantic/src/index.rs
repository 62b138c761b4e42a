//! Program-wide index of types and their members.
//!
//! The index is built once per program version. Partial declarations of a
//! type are merged under one [`TypeId`], so member lookup sees every part
//! regardless of which file declares it.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use restyle_syntax::{Modifiers, NodePath, SyntaxKind, SyntaxNode, parameter_count};

use crate::program::{FileId, SourceFile};
use crate::symbol::{Symbol, SymbolId, SymbolKind, TypeId};
use crate::type_text::type_name;

/// Everything known about one (possibly partial) type.
#[derive(Debug, Clone)]
pub(crate) struct TypeInfo {
    pub(crate) name: String,
    pub(crate) kind: SyntaxKind,
    pub(crate) parts: Vec<SymbolId>,
    pub(crate) outer: Option<TypeId>,
    pub(crate) bases: Vec<String>,
    pub(crate) members: Vec<Symbol>,
}

/// Types, members and their declaration sites across all files.
#[derive(Debug, Default)]
pub(crate) struct ProgramIndex {
    types: BTreeMap<TypeId, TypeInfo>,
    by_simple_name: HashMap<String, Vec<TypeId>>,
    type_parts: HashMap<SymbolId, TypeId>,
    declarations: HashMap<SymbolId, Symbol>,
}

fn qualify(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_owned()
    } else {
        format!("{namespace}.{name}")
    }
}

fn type_ref_text(node: &SyntaxNode) -> Option<String> {
    node.first_child_of_kind(SyntaxKind::TypeRef)
        .and_then(SyntaxNode::token)
        .map(str::to_owned)
}

impl ProgramIndex {
    pub(crate) fn build<'a>(files: impl Iterator<Item = (FileId, &'a SourceFile)>) -> Self {
        let mut index = Self::default();
        for (file, source) in files {
            index.visit_container(file, source.tree().root(), &NodePath::root(), "");
        }
        index
    }

    fn visit_container(&mut self, file: FileId, node: &SyntaxNode, path: &NodePath, namespace: &str) {
        for (position, child) in node.children().iter().enumerate() {
            let child_path = path.child(position);
            match child.kind() {
                SyntaxKind::NamespaceDeclaration | SyntaxKind::FileScopedNamespaceDeclaration => {
                    let nested = qualify(namespace, child.token().unwrap_or_default());
                    self.visit_container(file, child, &child_path, &nested);
                }
                kind if kind.is_type_declaration() => {
                    self.visit_type(file, child, &child_path, namespace, None);
                }
                _ => {}
            }
        }
    }

    fn visit_type(
        &mut self,
        file: FileId,
        node: &SyntaxNode,
        path: &NodePath,
        namespace: &str,
        outer: Option<&TypeId>,
    ) {
        let Some(name) = node.token() else {
            return;
        };
        let id = outer.map_or_else(|| TypeId::new(qualify(namespace, name)), |o| o.nested(name));
        let part = SymbolId::new(file, path.clone());
        let type_symbol = Symbol {
            id: part.clone(),
            kind: SymbolKind::Type,
            name: name.to_owned(),
            containing_type: outer.cloned(),
            container_kind: outer.and_then(|o| self.types.get(o)).map(|info| info.kind),
            declared_type: None,
            modifiers: Modifiers::of(node),
            parameter_count: None,
        };
        self.declarations.insert(part.clone(), type_symbol.clone());
        self.type_parts.insert(part.clone(), id.clone());

        if let Some(outer_info) = outer.and_then(|o| self.types.get_mut(o)) {
            let known = outer_info
                .members
                .iter()
                .any(|member| member.kind == SymbolKind::Type && member.name == name);
            if !known {
                outer_info.members.push(type_symbol);
            }
        }

        if !self.types.contains_key(&id) {
            self.by_simple_name
                .entry(name.to_owned())
                .or_default()
                .push(id.clone());
            self.types.insert(
                id.clone(),
                TypeInfo {
                    name: name.to_owned(),
                    kind: node.kind(),
                    parts: Vec::new(),
                    outer: outer.cloned(),
                    bases: Vec::new(),
                    members: Vec::new(),
                },
            );
        }
        let bases: Vec<String> = node
            .first_child_of_kind(SyntaxKind::BaseList)
            .map(|list| {
                list.children()
                    .iter()
                    .filter_map(SyntaxNode::token)
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default();
        if let Some(info) = self.types.get_mut(&id) {
            info.parts.push(part);
            info.bases.extend(bases);
        }

        for (position, child) in node.children().iter().enumerate() {
            let child_path = path.child(position);
            match child.kind() {
                SyntaxKind::FieldDeclaration => {
                    let declared_type = type_ref_text(child);
                    let modifiers = Modifiers::of(child);
                    for (slot, declarator) in child.children().iter().enumerate() {
                        if declarator.kind() != SyntaxKind::VariableDeclarator {
                            continue;
                        }
                        self.add_member(
                            &id,
                            node.kind(),
                            SymbolKind::Field,
                            SymbolId::new(file, child_path.child(slot)),
                            declarator,
                            declared_type.clone(),
                            modifiers.clone(),
                        );
                    }
                }
                SyntaxKind::PropertyDeclaration => self.add_member(
                    &id,
                    node.kind(),
                    SymbolKind::Property,
                    SymbolId::new(file, child_path),
                    child,
                    type_ref_text(child),
                    Modifiers::of(child),
                ),
                SyntaxKind::MethodDeclaration => self.add_member(
                    &id,
                    node.kind(),
                    SymbolKind::Method,
                    SymbolId::new(file, child_path),
                    child,
                    type_ref_text(child),
                    Modifiers::of(child),
                ),
                SyntaxKind::EnumMember => self.add_member(
                    &id,
                    node.kind(),
                    SymbolKind::EnumMember,
                    SymbolId::new(file, child_path),
                    child,
                    Some(id.to_string()),
                    Modifiers::of(child),
                ),
                SyntaxKind::Verbatim => self.add_member(
                    &id,
                    node.kind(),
                    SymbolKind::OtherMember,
                    SymbolId::new(file, child_path),
                    child,
                    None,
                    Modifiers::default(),
                ),
                kind if kind.is_type_declaration() => {
                    self.visit_type(file, child, &child_path, namespace, Some(&id));
                }
                _ => {}
            }
        }
    }

    #[expect(
        clippy::too_many_arguments,
        reason = "members are described by several independent facts"
    )]
    fn add_member(
        &mut self,
        owner: &TypeId,
        owner_kind: SyntaxKind,
        kind: SymbolKind,
        id: SymbolId,
        node: &SyntaxNode,
        declared_type: Option<String>,
        modifiers: Modifiers,
    ) {
        let Some(name) = node.token() else {
            return;
        };
        let symbol = Symbol {
            id: id.clone(),
            kind,
            name: name.to_owned(),
            containing_type: Some(owner.clone()),
            container_kind: Some(owner_kind),
            declared_type,
            modifiers,
            parameter_count: (kind == SymbolKind::Method)
                .then(|| parameter_count(node))
                .flatten(),
        };
        self.declarations.insert(id, symbol.clone());
        if let Some(info) = self.types.get_mut(owner) {
            info.members.push(symbol);
        }
    }

    /// Member or type symbol declared at `id`.
    pub(crate) fn declaration(&self, id: &SymbolId) -> Option<&Symbol> {
        self.declarations.get(id)
    }

    /// Type declared by the type declaration at `id`.
    pub(crate) fn type_at(&self, id: &SymbolId) -> Option<&TypeId> {
        self.type_parts.get(id)
    }

    pub(crate) fn type_info(&self, id: &TypeId) -> Option<&TypeInfo> {
        self.types.get(id)
    }

    /// Symbol of the first declared part of a type.
    pub(crate) fn type_symbol(&self, id: &TypeId) -> Option<&Symbol> {
        let part = self.types.get(id)?.parts.first()?;
        self.declarations.get(part)
    }

    /// Members named `name` declared directly in `owner` (all parts).
    pub(crate) fn own_members_named<'a, 'n>(
        &'a self,
        owner: &TypeId,
        name: &'n str,
    ) -> impl Iterator<Item = &'a Symbol> + use<'a, 'n> {
        self.types
            .get(owner)
            .into_iter()
            .flat_map(|info| info.members.iter())
            .filter(move |member| member.name == name)
    }

    /// Finds a member by name in `owner` and then its base types.
    ///
    /// With an `arity`, a method with that parameter count is preferred over
    /// other overloads.
    pub(crate) fn find_member(
        &self,
        owner: &TypeId,
        name: &str,
        arity: Option<usize>,
    ) -> Option<&Symbol> {
        let mut queue = VecDeque::from([owner.clone()]);
        let mut seen = HashSet::new();
        while let Some(current) = queue.pop_front() {
            if !seen.insert(current.clone()) {
                continue;
            }
            let candidates: Vec<&Symbol> = self.own_members_named(&current, name).collect();
            let preferred = arity.and_then(|count| {
                candidates
                    .iter()
                    .find(|candidate| candidate.parameter_count == Some(count))
            });
            if let Some(found) = preferred.or_else(|| candidates.first()) {
                return Some(*found);
            }
            if let Some(info) = self.types.get(&current) {
                let context = info.outer.as_ref();
                queue.extend(
                    info.bases
                        .iter()
                        .filter_map(|base| self.resolve_type_name(base, context)),
                );
            }
        }
        None
    }

    /// Resolves written type text to a declared type.
    ///
    /// Lookup follows C# scoping: types nested in `context` and in each of its
    /// outer types come first, then the namespaces enclosing the outermost
    /// type from innermost to global, and only then any type with a matching
    /// simple name or qualified suffix.
    pub(crate) fn resolve_type_name(&self, text: &str, context: Option<&TypeId>) -> Option<TypeId> {
        let name = type_name(text)?;
        let mut scope = context.cloned();
        let mut outermost = None;
        while let Some(current) = scope {
            let nested = current.nested(&name);
            if self.types.contains_key(&nested) {
                return Some(nested);
            }
            scope = self.types.get(&current).and_then(|info| info.outer.clone());
            outermost = Some(current);
        }
        let namespace = outermost
            .as_ref()
            .and_then(|id| self.namespace_of(id))
            .unwrap_or_default();
        let mut prefix = namespace.as_str();
        loop {
            let candidate = TypeId::new(qualify(prefix, &name));
            if self.types.contains_key(&candidate) {
                return Some(candidate);
            }
            if prefix.is_empty() {
                break;
            }
            prefix = prefix.rsplit_once('.').map_or("", |(outer, _)| outer);
        }
        if name.contains('.') {
            let suffix = format!(".{name}");
            return self
                .types
                .keys()
                .find(|id| id.as_str().ends_with(&suffix))
                .cloned();
        }
        self.by_simple_name.get(&name)?.first().cloned()
    }

    /// Namespace a top-level type is declared in.
    fn namespace_of(&self, id: &TypeId) -> Option<String> {
        let info = self.types.get(id)?;
        let namespace = id
            .as_str()
            .strip_suffix(info.name.as_str())?
            .strip_suffix('.')
            .unwrap_or_default();
        Some(namespace.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn index(sources: &[(&str, &str)]) -> ProgramIndex {
        let files: Vec<SourceFile> = sources
            .iter()
            .map(|(path, text)| SourceFile::parse(Path::new(path), text).expect("parse"))
            .collect();
        ProgramIndex::build((0_u32..).map(FileId::new).zip(files.iter()))
    }

    #[test]
    fn partial_types_merge_members() {
        let index = index(&[
            ("A.cs", "namespace Game { partial class Player { int health; } }"),
            ("B.cs", "namespace Game { partial class Player { void Heal() { } } }"),
        ]);
        let player = TypeId::new("Game.Player");
        let info = index.type_info(&player).expect("type");
        assert_eq!(info.parts.len(), 2);
        assert!(index.find_member(&player, "health", None).is_some());
        assert!(index.find_member(&player, "Heal", Some(0)).is_some());
    }

    #[test]
    fn members_are_inherited_from_base_classes() {
        let index = index(&[(
            "A.cs",
            "class Base { protected int count; } class Derived : Base { }",
        )]);
        let found = index
            .find_member(&TypeId::new("Derived"), "count", None)
            .expect("inherited");
        assert_eq!(found.containing_type(), Some(&TypeId::new("Base")));
    }

    #[test]
    fn overloads_are_chosen_by_arity() {
        let index = index(&[("A.cs", "class A { void run() { } void run(int x) { } }")]);
        let one = index
            .find_member(&TypeId::new("A"), "run", Some(1))
            .expect("overload");
        assert_eq!(one.parameter_count(), Some(1));
    }

    #[test]
    fn found_members_outlive_the_looked_up_name() {
        let index = index(&[("A.cs", "class A { int count; }")]);
        let found = {
            let name = String::from("count");
            index.find_member(&TypeId::new("A"), &name, None)
        };
        assert_eq!(found.map(Symbol::name), Some("count"));
    }

    #[test]
    fn nested_types_resolve_from_their_context() {
        let index = index(&[(
            "A.cs",
            "class Outer { class Inner { } } class Inner { }",
        )]);
        let outer = TypeId::new("Outer");
        assert_eq!(
            index.resolve_type_name("Inner", Some(&outer)),
            Some(TypeId::new("Outer.Inner"))
        );
        assert_eq!(
            index.resolve_type_name("Inner", None),
            Some(TypeId::new("Inner"))
        );
        assert_eq!(
            index.resolve_type_name("List<Outer.Inner>", None),
            None
        );
    }

    #[test]
    fn nested_types_shadow_top_level_types_from_inner_members() {
        let index = index(&[(
            "A.cs",
            "class Outer { class Inner { } class Deeper { } } class Inner { }",
        )]);
        let deeper = TypeId::new("Outer.Deeper");
        assert_eq!(
            index.resolve_type_name("Inner", Some(&deeper)),
            Some(TypeId::new("Outer.Inner"))
        );
    }

    #[test]
    fn enclosing_namespaces_are_searched_before_the_global_namespace() {
        let index = index(&[
            ("A.cs", "class Widget { }"),
            ("B.cs", "namespace Game { class Widget { } class User { } }"),
        ]);
        assert_eq!(
            index.resolve_type_name("Widget", Some(&TypeId::new("Game.User"))),
            Some(TypeId::new("Game.Widget"))
        );
        assert_eq!(
            index.resolve_type_name("Widget", None),
            Some(TypeId::new("Widget"))
        );
    }
}
