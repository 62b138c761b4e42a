//! Per-file semantic models.
//!
//! [`resolve`] binds every identifier, member access and conditional access
//! in one file to the [`Symbol`] it refers to. Unqualified names are looked
//! up through the enclosing scopes of the reference site: block locals,
//! `for`/`foreach`/`catch`/`using` variables, lambda and method parameters,
//! variables declared inside constructs kept as written, members of the
//! enclosing types and their bases, and finally type names.
//! Qualified names are resolved through a small type inference over the
//! qualifier.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use restyle_syntax::{
    DeclarationKind, Modifiers, NodePath, SyntaxKind, SyntaxNode, SyntaxTree, declaration_kind,
};

use crate::error::SemanticError;
use crate::index::ProgramIndex;
use crate::program::{FileId, Program};
use crate::symbol::{Symbol, SymbolId, SymbolKind, TypeId};
use crate::type_text::element_type;

/// Symbol bindings for one file of one program version.
#[derive(Debug, Clone)]
pub struct SemanticModel {
    file: FileId,
    tree: SyntaxTree,
    index: Arc<ProgramIndex>,
    locals: BTreeMap<NodePath, Symbol>,
    bindings: BTreeMap<NodePath, SymbolId>,
}

/// Resolves the symbols of `file` against the current state of `program`.
///
/// # Errors
///
/// Returns [`SemanticError::UnknownFile`] if the file is not part of the
/// program.
pub fn resolve(program: &Program, file: FileId) -> Result<SemanticModel, SemanticError> {
    let tree = program.file(file)?.tree().clone();
    let index = program.index();
    let locals = collect_locals(file, &tree, &index);
    let mut model = SemanticModel {
        file,
        tree,
        index,
        locals,
        bindings: BTreeMap::new(),
    };
    let bindings = Binder::new(&model).bind_all();
    model.bindings = bindings;
    Ok(model)
}

impl SemanticModel {
    /// File the model describes.
    #[must_use]
    pub const fn file(&self) -> FileId {
        self.file
    }

    /// Tree the model was resolved from.
    #[must_use]
    pub const fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    /// Looks up a symbol by identity. Locals and parameters are only known
    /// to the model of their own file.
    #[must_use]
    pub fn symbol(&self, id: &SymbolId) -> Option<&Symbol> {
        if id.file() == self.file
            && let Some(local) = self.locals.get(id.path())
        {
            return Some(local);
        }
        self.index.declaration(id)
    }

    /// Symbol declared by the node at `path`.
    #[must_use]
    pub fn declared_symbol(&self, path: &NodePath) -> Option<&Symbol> {
        self.symbol(&SymbolId::new(self.file, path.clone()))
    }

    /// Symbol a reference at `path` is bound to.
    #[must_use]
    pub fn binding(&self, path: &NodePath) -> Option<&SymbolId> {
        self.bindings.get(path)
    }

    /// Symbol referenced or declared by the node at `path`.
    #[must_use]
    pub fn symbol_of(&self, path: &NodePath) -> Option<&Symbol> {
        match self.bindings.get(path) {
            Some(id) => self.symbol(id),
            None => self.declared_symbol(path),
        }
    }

    /// Every bound reference of the file, in document order.
    pub fn references(&self) -> impl Iterator<Item = (&NodePath, &SymbolId)> {
        self.bindings.iter()
    }

    /// Paths of references bound to `id`, in document order.
    #[must_use]
    pub fn references_to(&self, id: &SymbolId) -> Vec<NodePath> {
        self.bindings
            .iter()
            .filter(|(_, bound)| *bound == id)
            .map(|(path, _)| path.clone())
            .collect()
    }

    /// Locals and parameters declared in this file.
    pub fn locals(&self) -> impl Iterator<Item = &Symbol> {
        self.locals.values()
    }

    /// Innermost type declaration containing `path`.
    #[must_use]
    pub fn enclosing_type_of(&self, path: &NodePath) -> Option<&TypeId> {
        enclosing_type(self.file, &self.tree, &self.index, path).map(|(id, _)| id)
    }

    /// Simple name of a declared type.
    #[must_use]
    pub fn type_name(&self, id: &TypeId) -> Option<&str> {
        self.index.type_info(id).map(|info| info.name.as_str())
    }

    /// Members named `name` declared directly in `owner`, across all partial
    /// declarations.
    pub fn members_named<'a, 'n>(
        &'a self,
        owner: &TypeId,
        name: &'n str,
    ) -> impl Iterator<Item = &'a Symbol> + use<'a, 'n> {
        self.index.own_members_named(owner, name)
    }

    /// Binds the unqualified name `name` as if it were written at `site`.
    ///
    /// When `site` is the target of an invocation, overloads are matched by
    /// argument count.
    #[must_use]
    pub fn lookup(&self, site: &NodePath, name: &str) -> Option<&Symbol> {
        let arity = invocation_arity(&self.tree, site);
        self.lookup_with_arity(site, name, arity)
    }

    fn lookup_with_arity(&self, site: &NodePath, name: &str, arity: Option<usize>) -> Option<&Symbol> {
        let mut context: Option<&TypeId> = None;
        for ancestor in site.ancestors() {
            let node = self.tree.node_at(&ancestor)?;
            let slot = site.indices().get(ancestor.depth()).copied().unwrap_or_default();
            match self.scope_hit(&ancestor, node, slot, name, arity) {
                ScopeHit::Found(symbol) => return Some(symbol),
                ScopeHit::Hidden => return None,
                ScopeHit::Miss => {}
            }
            if context.is_none() && node.kind().is_type_declaration() {
                context = self.index.type_at(&SymbolId::new(self.file, ancestor));
            }
        }
        let id = self.index.resolve_type_name(name, context)?;
        self.index.type_symbol(&id)
    }

    fn scope_hit(
        &self,
        path: &NodePath,
        node: &SyntaxNode,
        slot: usize,
        name: &str,
        arity: Option<usize>,
    ) -> ScopeHit<'_> {
        let found = match node.kind() {
            SyntaxKind::Block | SyntaxKind::UsingStatement => self.block_local(path, node, name),
            SyntaxKind::SwitchStatement => node
                .children()
                .iter()
                .enumerate()
                .filter(|(_, child)| child.kind() == SyntaxKind::SwitchSection)
                .find_map(|(position, section)| {
                    self.block_local(&path.child(position), section, name)
                }),
            SyntaxKind::ForStatement => node
                .child(0)
                .and_then(|initializer| self.block_local(&path.child(0), initializer, name)),
            SyntaxKind::ForEachStatement if slot == 3 => node
                .child(1)
                .filter(|declarator| declarator.token() == Some(name))
                .and_then(|_| self.locals.get(&path.child(1))),
            SyntaxKind::CatchClause if slot > 0 => node
                .child(0)
                .filter(|declaration| {
                    declaration.kind() == SyntaxKind::CatchDeclaration
                        && declaration.token() == Some(name)
                })
                .and_then(|_| self.locals.get(&path.child(0))),
            SyntaxKind::Lambda | SyntaxKind::MethodDeclaration | SyntaxKind::ConstructorDeclaration => {
                self.parameter(path, node, name)
            }
            SyntaxKind::Verbatim => node
                .children()
                .iter()
                .position(|child| is_variable(child.kind()) && child.token() == Some(name))
                .and_then(|position| self.locals.get(&path.child(position))),
            SyntaxKind::Accessor
                if name == "value"
                    && matches!(node.token(), Some("set" | "init" | "add" | "remove")) =>
            {
                return ScopeHit::Hidden;
            }
            kind if kind.is_type_declaration() => self
                .index
                .type_at(&SymbolId::new(self.file, path.clone()))
                .and_then(|owner| self.index.find_member(owner, name, arity)),
            _ => None,
        };
        found.map_or(ScopeHit::Miss, ScopeHit::Found)
    }

    fn parameter(&self, path: &NodePath, node: &SyntaxNode, name: &str) -> Option<&Symbol> {
        let list_position = node.position_of_kind(SyntaxKind::ParameterList)?;
        let list = node.child(list_position)?;
        let position = list
            .children()
            .iter()
            .position(|parameter| parameter.token() == Some(name))?;
        self.locals.get(&path.child(list_position).child(position))
    }

    /// Locals declared directly in a block-like node, including `out var`
    /// declarations in its statements that are not nested in inner blocks or
    /// lambdas.
    fn block_local(&self, path: &NodePath, node: &SyntaxNode, name: &str) -> Option<&Symbol> {
        node.children()
            .iter()
            .enumerate()
            .filter(|(_, statement)| statement.kind() != SyntaxKind::Block)
            .find_map(|(position, statement)| {
                find_declarator(&path.child(position), statement, name)
                    .and_then(|declarator| self.locals.get(&declarator))
            })
    }
}

enum ScopeHit<'a> {
    Found(&'a Symbol),
    Hidden,
    Miss,
}

fn find_declarator(path: &NodePath, node: &SyntaxNode, name: &str) -> Option<NodePath> {
    match node.kind() {
        SyntaxKind::Block
        | SyntaxKind::Lambda
        | SyntaxKind::ForStatement
        | SyntaxKind::ForEachStatement
        | SyntaxKind::UsingStatement
        | SyntaxKind::SwitchStatement
        | SyntaxKind::CatchClause => return None,
        SyntaxKind::VariableDeclarator | SyntaxKind::ExpressionVariable
            if node.token() == Some(name) =>
        {
            return Some(path.clone());
        }
        _ => {}
    }
    let declares_locals = matches!(
        node.kind(),
        SyntaxKind::LocalDeclaration | SyntaxKind::Argument
    );
    node.children()
        .iter()
        .enumerate()
        .filter(|(_, child)| declares_locals || child.kind() != SyntaxKind::VariableDeclarator)
        .find_map(|(position, child)| find_declarator(&path.child(position), child, name))
}

/// Variables declared inside kept text.
const fn is_variable(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::DesignatedVariable | SyntaxKind::ExpressionVariable
    )
}

fn invocation_arity(tree: &SyntaxTree, site: &NodePath) -> Option<usize> {
    if site.indices().last() != Some(&0) {
        return None;
    }
    let parent = tree.node_at(&site.parent()?)?;
    if parent.kind() != SyntaxKind::Invocation {
        return None;
    }
    parent
        .first_child_of_kind(SyntaxKind::ArgumentList)
        .map(|list| list.children_of_kind(SyntaxKind::Argument).count())
}

fn enclosing_type<'i>(
    file: FileId,
    tree: &SyntaxTree,
    index: &'i ProgramIndex,
    path: &NodePath,
) -> Option<(&'i TypeId, SyntaxKind)> {
    let (type_path, node) = tree.ancestor_where(path, SyntaxKind::is_type_declaration)?;
    let id = index.type_at(&SymbolId::new(file, type_path))?;
    Some((id, node.kind()))
}

fn collect_locals(file: FileId, tree: &SyntaxTree, index: &ProgramIndex) -> BTreeMap<NodePath, Symbol> {
    let mut locals = BTreeMap::new();
    for (path, node) in tree.descendants() {
        let kind = match declaration_kind(tree, &path) {
            Some(kind @ (DeclarationKind::Local | DeclarationKind::Parameter)) => kind,
            _ => continue,
        };
        let Some(name) = node.token() else {
            continue;
        };
        let owner = if node.kind() == SyntaxKind::VariableDeclarator {
            path.parent().and_then(|parent| tree.node_at(&parent))
        } else {
            Some(node)
        };
        let declared_type = owner
            .and_then(|owner| owner.first_child_of_kind(SyntaxKind::TypeRef))
            .and_then(SyntaxNode::token)
            .map(str::to_owned);
        let (containing_type, container_kind) = enclosing_type(file, tree, index, &path)
            .map_or((None, None), |(id, kind)| (Some(id.clone()), Some(kind)));
        let symbol = Symbol {
            id: SymbolId::new(file, path.clone()),
            kind,
            name: name.to_owned(),
            containing_type,
            container_kind,
            declared_type,
            modifiers: owner.map(Modifiers::of).unwrap_or_default(),
            parameter_count: None,
        };
        locals.insert(path, symbol);
    }
    locals
}

/// Computes bindings for every reference node, inferring qualifier types on
/// demand. Each result is memoised; a node being resolved is provisionally
/// unbound, which cuts cycles such as `var x = x.Next;`.
struct Binder<'m> {
    model: &'m SemanticModel,
    memo: HashMap<NodePath, Option<SymbolId>>,
}

impl<'m> Binder<'m> {
    fn new(model: &'m SemanticModel) -> Self {
        Self {
            model,
            memo: HashMap::new(),
        }
    }

    fn bind_all(mut self) -> BTreeMap<NodePath, SymbolId> {
        let references: Vec<NodePath> = self
            .model
            .tree
            .descendants()
            .into_iter()
            .filter(|(_, node)| is_reference(node.kind()))
            .map(|(path, _)| path)
            .collect();
        for path in &references {
            self.binding(path);
        }
        self.memo
            .into_iter()
            .filter_map(|(path, bound)| bound.map(|id| (path, id)))
            .collect()
    }

    fn binding(&mut self, path: &NodePath) -> Option<SymbolId> {
        if let Some(known) = self.memo.get(path) {
            return known.clone();
        }
        self.memo.insert(path.clone(), None);
        let bound = self.compute(path);
        self.memo.insert(path.clone(), bound.clone());
        bound
    }

    fn compute(&mut self, path: &NodePath) -> Option<SymbolId> {
        let model = self.model;
        let node = model.tree.node_at(path)?;
        let name = node.token()?;
        let arity = invocation_arity(&model.tree, path);
        let symbol = match node.kind() {
            SyntaxKind::IdentifierName => match self.initializer_target(path) {
                Some(created) => model.index.find_member(&created, name, None),
                None => model.lookup_with_arity(path, name, arity),
            },
            SyntaxKind::MemberAccess | SyntaxKind::ConditionalAccess => {
                let owner = self.type_of(&path.child(0))?;
                model.index.find_member(&owner, name, arity)
            }
            _ => None,
        };
        symbol.map(|found| found.id.clone())
    }

    /// Type created by the object creation whose initializer assigns to the
    /// identifier at `path`, as in `new Widget { Size = 3 }`.
    fn initializer_target(&self, path: &NodePath) -> Option<TypeId> {
        let tree = &self.model.tree;
        let assignment_path = path.parent()?;
        if path.indices().last() != Some(&0)
            || tree.node_at(&assignment_path)?.kind() != SyntaxKind::Assignment
        {
            return None;
        }
        let initializer_path = assignment_path.parent()?;
        if tree.node_at(&initializer_path)?.kind() != SyntaxKind::ArrayInitializer {
            return None;
        }
        let creation = tree.node_at(&initializer_path.parent()?)?;
        if creation.kind() != SyntaxKind::ObjectCreation {
            return None;
        }
        let written = creation
            .first_child_of_kind(SyntaxKind::TypeRef)?
            .token()?;
        self.model
            .index
            .resolve_type_name(written, self.model.enclosing_type_of(path))
    }

    fn type_of(&mut self, path: &NodePath) -> Option<TypeId> {
        let text = self.type_text(path)?;
        let model = self.model;
        model
            .index
            .resolve_type_name(&text, model.enclosing_type_of(path))
    }

    fn type_text(&mut self, path: &NodePath) -> Option<String> {
        let model = self.model;
        let node = model.tree.node_at(path)?;
        match node.kind() {
            SyntaxKind::ThisExpression => model.enclosing_type_of(path).map(ToString::to_string),
            SyntaxKind::BaseExpression => model
                .enclosing_type_of(path)
                .and_then(|id| model.index.type_info(id))
                .and_then(|info| info.bases.first().cloned()),
            SyntaxKind::IdentifierName
            | SyntaxKind::MemberAccess
            | SyntaxKind::ConditionalAccess => {
                let id = self.binding(path)?;
                self.symbol_type_text(&id)
            }
            SyntaxKind::Invocation => {
                let id = self.binding(&path.child(0))?;
                model.symbol(&id)?.declared_type.clone()
            }
            SyntaxKind::ObjectCreation | SyntaxKind::Cast => type_ref(node),
            SyntaxKind::ArrayCreation => type_ref(node).map(|element| format!("{element}[]")),
            SyntaxKind::Binary if node.token() == Some("as") => {
                node.child(1).and_then(SyntaxNode::token).map(str::to_owned)
            }
            SyntaxKind::Parenthesized | SyntaxKind::Assignment => self.type_text(&path.child(0)),
            SyntaxKind::PostfixUnary if node.token() == Some("!") => self.type_text(&path.child(0)),
            SyntaxKind::Conditional => self.type_text(&path.child(1)),
            SyntaxKind::ElementAccess => {
                let collection = self.type_text(&path.child(0))?;
                element_type(&collection)
            }
            SyntaxKind::InterpolatedString => Some("string".to_owned()),
            SyntaxKind::Literal
                if node
                    .token()
                    .is_some_and(|text| text.starts_with('"') || text.starts_with("@\"")) =>
            {
                Some("string".to_owned())
            }
            _ => None,
        }
    }

    fn symbol_type_text(&mut self, id: &SymbolId) -> Option<String> {
        let model = self.model;
        let symbol = model.symbol(id)?;
        if symbol.kind == SymbolKind::Type {
            return model.index.type_at(id).map(ToString::to_string);
        }
        let declared = symbol.declared_type.as_deref()?;
        if declared != "var" {
            return Some(declared.to_owned());
        }
        let declarator = id.path();
        let owner_path = declarator.parent()?;
        let owner = model.tree.node_at(&owner_path)?;
        match owner.kind() {
            SyntaxKind::LocalDeclaration => {
                let value = model
                    .tree
                    .node_at(declarator)?
                    .position_of_kind(SyntaxKind::EqualsValue)?;
                self.type_text(&declarator.child(value).child(0))
            }
            SyntaxKind::ForEachStatement => {
                let collection = self.type_text(&owner_path.child(2))?;
                element_type(&collection)
            }
            _ => None,
        }
    }
}

fn type_ref(node: &SyntaxNode) -> Option<String> {
    node.first_child_of_kind(SyntaxKind::TypeRef)
        .and_then(SyntaxNode::token)
        .map(str::to_owned)
}

const fn is_reference(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::IdentifierName | SyntaxKind::MemberAccess | SyntaxKind::ConditionalAccess
    )
}
