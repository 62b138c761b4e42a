//! Declaration helpers shared by the semantic model and the naming rules.
//!
//! These read modifiers, attributes and the declared name off declaration
//! nodes without needing symbol resolution.

use crate::node::{NodePath, SyntaxKind, SyntaxNode};
use crate::tree::SyntaxTree;

/// Declared accessibility of a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Accessibility {
    /// No accessibility modifier was written.
    #[default]
    Default,
    /// `private`.
    Private,
    /// `protected`.
    Protected,
    /// `internal`.
    Internal,
    /// `protected internal`.
    ProtectedInternal,
    /// `private protected`.
    PrivateProtected,
    /// `public`.
    Public,
}

impl Accessibility {
    /// Returns whether the member is visible only inside its type.
    #[must_use]
    pub const fn is_private(self) -> bool {
        matches!(self, Self::Default | Self::Private)
    }
}

/// Modifiers and attributes written on a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Modifiers {
    keywords: Vec<String>,
    attributes: Vec<String>,
}

impl Modifiers {
    /// Reads the `Modifier` and `AttributeList` children of `node`.
    #[must_use]
    pub fn of(node: &SyntaxNode) -> Self {
        let keywords = node
            .children_of_kind(SyntaxKind::Modifier)
            .filter_map(SyntaxNode::token)
            .map(str::to_owned)
            .collect();
        let attributes = node
            .children_of_kind(SyntaxKind::AttributeList)
            .flat_map(|list| list.children_of_kind(SyntaxKind::Attribute))
            .filter_map(SyntaxNode::token)
            .map(str::to_owned)
            .collect();
        Self {
            keywords,
            attributes,
        }
    }

    /// Returns whether the modifier keyword `word` is present.
    #[must_use]
    pub fn has(&self, word: &str) -> bool {
        self.keywords.iter().any(|keyword| keyword == word)
    }

    /// `const`.
    #[must_use]
    pub fn is_const(&self) -> bool {
        self.has("const")
    }

    /// `static`.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.has("static")
    }

    /// `readonly`.
    #[must_use]
    pub fn is_readonly(&self) -> bool {
        self.has("readonly")
    }

    /// `event`.
    #[must_use]
    pub fn is_event(&self) -> bool {
        self.has("event")
    }

    /// `override`.
    #[must_use]
    pub fn is_override(&self) -> bool {
        self.has("override")
    }

    /// Declared accessibility.
    #[must_use]
    pub fn accessibility(&self) -> Accessibility {
        match (
            self.has("public"),
            self.has("protected"),
            self.has("internal"),
            self.has("private"),
        ) {
            (true, ..) => Accessibility::Public,
            (_, true, true, _) => Accessibility::ProtectedInternal,
            (_, true, _, true) => Accessibility::PrivateProtected,
            (_, true, ..) => Accessibility::Protected,
            (_, _, true, _) => Accessibility::Internal,
            (_, _, _, true) => Accessibility::Private,
            _ => Accessibility::Default,
        }
    }

    /// Attribute names as written.
    #[must_use]
    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    /// Returns whether an attribute named `name` is applied, accepting the
    /// `Attribute` suffix and namespace qualification (`[UnityEngine.SerializeField]`).
    #[must_use]
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|written| {
            let simple = written.rsplit('.').next().unwrap_or(written);
            let simple = simple.strip_suffix("Attribute").unwrap_or(simple);
            let wanted = name.strip_suffix("Attribute").unwrap_or(name);
            simple == wanted
        })
    }
}

/// Kind of declaration a node introduces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclarationKind {
    /// Class, struct, interface or enum.
    Type,
    /// One declarator of a field declaration.
    Field,
    /// Property.
    Property,
    /// Method.
    Method,
    /// Local variable, `foreach` variable, `catch` variable or `out var`.
    Local,
    /// Method, constructor or lambda parameter.
    Parameter,
    /// Enum member.
    EnumMember,
    /// Named member kept as written, such as an event with accessors, a
    /// delegate, a record or a destructor. It is never renamed but its name
    /// is taken.
    OtherMember,
}

/// Classifies the declaration at `path`, if the node there declares a name.
///
/// Field and local declarations declare through their `VariableDeclarator`
/// children, so the declarator's path is the declaration site.
#[must_use]
pub fn declaration_kind(tree: &SyntaxTree, path: &NodePath) -> Option<DeclarationKind> {
    let node = tree.node_at(path)?;
    match node.kind() {
        kind if kind.is_type_declaration() => Some(DeclarationKind::Type),
        SyntaxKind::PropertyDeclaration => Some(DeclarationKind::Property),
        SyntaxKind::MethodDeclaration => Some(DeclarationKind::Method),
        SyntaxKind::EnumMember => Some(DeclarationKind::EnumMember),
        SyntaxKind::Parameter => Some(DeclarationKind::Parameter),
        SyntaxKind::CatchDeclaration => node.token().map(|_| DeclarationKind::Local),
        SyntaxKind::DesignatedVariable | SyntaxKind::ExpressionVariable => {
            Some(DeclarationKind::Local)
        }
        SyntaxKind::Verbatim if node.token().is_some() => {
            let parent = tree.node_at(&path.parent()?)?;
            parent
                .kind()
                .is_type_declaration()
                .then_some(DeclarationKind::OtherMember)
        }
        SyntaxKind::VariableDeclarator => {
            let parent = tree.node_at(&path.parent()?)?;
            match parent.kind() {
                SyntaxKind::FieldDeclaration => Some(DeclarationKind::Field),
                SyntaxKind::LocalDeclaration
                | SyntaxKind::ForEachStatement
                | SyntaxKind::Argument => Some(DeclarationKind::Local),
                _ => None,
            }
        }
        _ => None,
    }
}

/// The node whose modifiers and attributes apply to the declaration at
/// `path`: the enclosing `FieldDeclaration` for field declarators, the node
/// itself otherwise.
#[must_use]
pub fn modifier_owner(tree: &SyntaxTree, path: &NodePath) -> Option<NodePath> {
    let node = tree.node_at(path)?;
    if node.kind() == SyntaxKind::VariableDeclarator {
        let parent = path.parent()?;
        if tree.node_at(&parent)?.kind() == SyntaxKind::FieldDeclaration {
            return Some(parent);
        }
    }
    Some(path.clone())
}

/// Number of parameters declared by a method, constructor or lambda node.
#[must_use]
pub fn parameter_count(node: &SyntaxNode) -> Option<usize> {
    node.first_child_of_kind(SyntaxKind::ParameterList)
        .map(|list| list.children_of_kind(SyntaxKind::Parameter).count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::SupportedLanguage;
    use crate::parser::Parser;
    use rstest::rstest;

    fn parse(source: &str) -> SyntaxTree {
        Parser::new(SupportedLanguage::CSharp)
            .expect("parser")
            .parse(source)
            .expect("parse")
    }

    #[rstest]
    #[case("class A { int x; }", Accessibility::Default)]
    #[case("class A { private int x; }", Accessibility::Private)]
    #[case("class A { public int x; }", Accessibility::Public)]
    #[case("class A { protected internal int x; }", Accessibility::ProtectedInternal)]
    fn reads_field_accessibility(#[case] source: &str, #[case] expected: Accessibility) {
        let tree = parse(source);
        let field = tree
            .paths_of_kind(SyntaxKind::FieldDeclaration)
            .into_iter()
            .next()
            .expect("field");
        let node = tree.node_at(&field).expect("node");
        assert_eq!(Modifiers::of(node).accessibility(), expected);
    }

    #[rstest]
    #[case("[SerializeField] int x;")]
    #[case("[SerializeFieldAttribute] int x;")]
    #[case("[UnityEngine.SerializeField, Tooltip(\"hint\")] int x;")]
    fn finds_attribute_in_all_spellings(#[case] member: &str) {
        let tree = parse(&format!("class A {{ {member} }}"));
        let field = tree
            .paths_of_kind(SyntaxKind::FieldDeclaration)
            .into_iter()
            .next()
            .expect("field");
        let modifiers = Modifiers::of(tree.node_at(&field).expect("node"));
        assert!(modifiers.has_attribute("SerializeField"));
        assert!(!modifiers.has_attribute("NonSerialized"));
    }

    #[test]
    fn classifies_declarators_by_parent() {
        let tree = parse("class A { int f; void M(int p) { int l = p; foreach (var e in l) { } } }");
        let kinds: Vec<_> = tree
            .paths_of_kind(SyntaxKind::VariableDeclarator)
            .iter()
            .filter_map(|path| declaration_kind(&tree, path))
            .collect();
        assert_eq!(
            kinds,
            vec![
                DeclarationKind::Field,
                DeclarationKind::Local,
                DeclarationKind::Local
            ]
        );
        let parameter = tree
            .paths_of_kind(SyntaxKind::Parameter)
            .into_iter()
            .next()
            .expect("parameter");
        assert_eq!(
            declaration_kind(&tree, &parameter),
            Some(DeclarationKind::Parameter)
        );
    }

    #[test]
    fn field_declarators_take_modifiers_from_the_declaration() {
        let tree = parse("class A { const int kA = 1, kB = 2; }");
        let declarator = tree
            .paths_of_kind(SyntaxKind::VariableDeclarator)
            .into_iter()
            .nth(1)
            .expect("declarator");
        let owner = modifier_owner(&tree, &declarator).expect("owner");
        assert!(Modifiers::of(tree.node_at(&owner).expect("node")).is_const());
    }
}
