//! Naming conventions for each kind of declaration.

use restyle_semantic::{Symbol, SymbolKind};
use restyle_syntax::{
    Accessibility, Modifiers, NodePath, SyntaxKind, SyntaxTree, declaration_kind, modifier_owner,
};

use super::transform::{
    CONSTANT_PREFIX, SEPARATOR, SERIALIZED_FIELD_ATTRIBUTE, TRAILING_MARKER, capitalize,
    has_inner_separator, is_constant_styled, to_identifier_style,
};
use crate::rule::RuleDescriptor;

/// What a renamer needs to know about one declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Current name.
    pub name: String,
    /// Declaration kind.
    pub kind: SymbolKind,
    /// Modifiers and attributes.
    pub modifiers: Modifiers,
    /// Kind of the nearest enclosing type declaration.
    pub container: Option<SyntaxKind>,
}

impl Declaration {
    /// Reads the declaration at `path` straight from the syntax tree.
    #[must_use]
    pub fn at(tree: &SyntaxTree, path: &NodePath) -> Option<Self> {
        let kind = declaration_kind(tree, path)?;
        let name = tree.node_at(path)?.token()?.to_owned();
        let owner = modifier_owner(tree, path)?;
        let modifiers = Modifiers::of(tree.node_at(&owner)?);
        let container = tree
            .ancestor_where(path, SyntaxKind::is_type_declaration)
            .map(|(_, node)| node.kind());
        Some(Self {
            name,
            kind,
            modifiers,
            container,
        })
    }

    /// Describes a resolved symbol.
    #[must_use]
    pub fn of_symbol(symbol: &Symbol) -> Self {
        Self {
            name: symbol.name().to_owned(),
            kind: symbol.kind(),
            modifiers: symbol.modifiers().clone(),
            container: symbol.container_kind(),
        }
    }
}

/// A naming convention for one kind of declaration.
#[cfg_attr(test, mockall::automock)]
pub trait Renamer: Send + Sync {
    /// Metadata of the rule built from this renamer.
    fn descriptor(&self) -> RuleDescriptor;

    /// Whether the convention governs `declaration` at all.
    fn targets(&self, declaration: &Declaration) -> bool;

    /// Whether the current name already follows the convention.
    fn is_compliant(&self, declaration: &Declaration) -> bool;

    /// The name the convention prescribes. May equal the current name when
    /// no better name can be derived.
    fn derive_new_name(&self, declaration: &Declaration) -> String;
}

/// Locals and parameters are camel case without separators.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalVariableRenamer;

impl LocalVariableRenamer {
    /// Rule name used in configuration.
    pub const NAME: &'static str = "LocalVariables";
}

impl Renamer for LocalVariableRenamer {
    fn descriptor(&self) -> RuleDescriptor {
        RuleDescriptor {
            name: Self::NAME,
            description: "Locals and parameters are named likeThis",
            order: 4,
        }
    }

    fn targets(&self, declaration: &Declaration) -> bool {
        matches!(declaration.kind, SymbolKind::Local | SymbolKind::Parameter)
    }

    fn is_compliant(&self, declaration: &Declaration) -> bool {
        !declaration.name.contains(SEPARATOR)
    }

    fn derive_new_name(&self, declaration: &Declaration) -> String {
        to_identifier_style(&declaration.name)
    }
}

/// Methods start with an uppercase letter.
#[derive(Debug, Clone, Copy, Default)]
pub struct MethodRenamer;

impl MethodRenamer {
    /// Rule name used in configuration.
    pub const NAME: &'static str = "MethodNames";
}

impl Renamer for MethodRenamer {
    fn descriptor(&self) -> RuleDescriptor {
        RuleDescriptor {
            name: Self::NAME,
            description: "Methods are named LikeThis",
            order: 3,
        }
    }

    fn targets(&self, declaration: &Declaration) -> bool {
        declaration.kind == SymbolKind::Method
    }

    fn is_compliant(&self, declaration: &Declaration) -> bool {
        declaration.name.chars().next().is_some_and(char::is_uppercase)
    }

    fn derive_new_name(&self, declaration: &Declaration) -> String {
        capitalize(&declaration.name)
    }
}

/// Non-public class properties are Pascal case with a trailing marker.
#[derive(Debug, Clone, Copy, Default)]
pub struct PropertyRenamer;

impl PropertyRenamer {
    /// Rule name used in configuration.
    pub const NAME: &'static str = "PropertyNames";
}

impl Renamer for PropertyRenamer {
    fn descriptor(&self) -> RuleDescriptor {
        RuleDescriptor {
            name: Self::NAME,
            description: "Private properties are named LikeThis_",
            order: 2,
        }
    }

    fn targets(&self, declaration: &Declaration) -> bool {
        declaration.kind == SymbolKind::Property
            && declaration.modifiers.accessibility() != Accessibility::Public
            && declaration.container == Some(SyntaxKind::ClassDeclaration)
            && !declaration
                .modifiers
                .has_attribute(SERIALIZED_FIELD_ATTRIBUTE)
    }

    fn is_compliant(&self, declaration: &Declaration) -> bool {
        let name = &declaration.name;
        is_constant_styled(name)
            || (name.chars().next().is_some_and(char::is_uppercase)
                && name.ends_with(TRAILING_MARKER)
                && !has_inner_separator(name))
    }

    fn derive_new_name(&self, declaration: &Declaration) -> String {
        let name = &declaration.name;
        if is_constant_styled(name) {
            return name.clone();
        }
        let mut derived = capitalize(&to_identifier_style(name));
        derived.push(TRAILING_MARKER);
        derived
    }
}

/// Private fields: constants are `kLikeThis`, everything else `likeThis_`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldRenamer;

impl FieldRenamer {
    /// Rule name used in configuration.
    pub const NAME: &'static str = "FieldNames";
}

impl Renamer for FieldRenamer {
    fn descriptor(&self) -> RuleDescriptor {
        RuleDescriptor {
            name: Self::NAME,
            description: "Private fields are named likeThis_ and constants kLikeThis",
            order: 1,
        }
    }

    fn targets(&self, declaration: &Declaration) -> bool {
        declaration.kind == SymbolKind::Field
            && declaration.modifiers.accessibility().is_private()
            && !declaration.modifiers.is_event()
            && matches!(
                declaration.container,
                Some(SyntaxKind::ClassDeclaration | SyntaxKind::StructDeclaration)
            )
    }

    fn is_compliant(&self, declaration: &Declaration) -> bool {
        let name = &declaration.name;
        if has_inner_separator(name) {
            return false;
        }
        if declaration.modifiers.is_const() {
            is_constant_styled(name)
        } else {
            name.ends_with(TRAILING_MARKER)
        }
    }

    fn derive_new_name(&self, declaration: &Declaration) -> String {
        let name = &declaration.name;
        if declaration.modifiers.is_const() {
            let words = to_identifier_style(strip_constant_prefix(name));
            let mut derived = String::from(CONSTANT_PREFIX);
            derived.push_str(&capitalize(&words));
            derived
        } else {
            let mut derived = to_identifier_style(name);
            derived.push(TRAILING_MARKER);
            derived
        }
    }
}

/// Drops a `k` that introduces the rest of the name (`k_Max`, `kMax`).
fn strip_constant_prefix(name: &str) -> &str {
    match name.strip_prefix(CONSTANT_PREFIX) {
        Some(rest) if rest.starts_with(|c: char| c == SEPARATOR || c.is_uppercase()) => rest,
        _ => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use restyle_syntax::{Parser, SupportedLanguage};
    use rstest::rstest;

    fn declaration_named(source: &str, name: &str) -> Declaration {
        let tree = Parser::new(SupportedLanguage::CSharp)
            .expect("parser")
            .parse(source)
            .expect("parse");
        tree.descendants()
            .into_iter()
            .filter(|(_, node)| node.token() == Some(name))
            .find_map(|(path, _)| Declaration::at(&tree, &path))
            .expect("declaration")
    }

    fn rename(renamer: &dyn Renamer, source: &str, name: &str) -> Option<String> {
        let declaration = declaration_named(source, name);
        (renamer.targets(&declaration) && !renamer.is_compliant(&declaration))
            .then(|| renamer.derive_new_name(&declaration))
    }

    #[rstest]
    #[case("class A { int count; }", "count", Some("count_"))]
    #[case("class A { private int m_count; }", "m_count", Some("count_"))]
    #[case("class A { int count_; }", "count_", None)]
    #[case("class A { int _count_; }", "_count_", None)]
    #[case("class A { int max_count_; }", "max_count_", Some("maxCount_"))]
    #[case("class A { const int k_Max = 1; }", "k_Max", Some("kMax"))]
    #[case("class A { const int MAX_VALUE = 1; }", "MAX_VALUE", Some("kMaxValue"))]
    #[case("class A { const int kMax = 1; }", "kMax", None)]
    #[case("class A { const int kitten = 1; }", "kitten", Some("kKitten"))]
    #[case("class A { public int count; }", "count", None)]
    #[case("class A { protected int count; }", "count", None)]
    #[case("struct A { int count; }", "count", Some("count_"))]
    #[case("class A { event Handler changed; }", "changed", None)]
    fn field_names(#[case] source: &str, #[case] name: &str, #[case] expected: Option<&str>) {
        assert_eq!(rename(&FieldRenamer, source, name).as_deref(), expected);
    }

    #[rstest]
    #[case("class A { int size { get; set; } }", "size", Some("Size_"))]
    #[case("class A { int max_size { get; } }", "max_size", Some("MaxSize_"))]
    #[case("class A { int Size_ { get; } }", "Size_", None)]
    #[case("class A { int kMax { get; } }", "kMax", None)]
    #[case("class A { public int size { get; set; } }", "size", None)]
    #[case("class A { [SerializeField] int size { get; set; } }", "size", None)]
    #[case("class A { [UnityEngine.SerializeField] int size { get; set; } }", "size", None)]
    #[case("struct A { int size { get; set; } }", "size", None)]
    fn property_names(#[case] source: &str, #[case] name: &str, #[case] expected: Option<&str>) {
        assert_eq!(rename(&PropertyRenamer, source, name).as_deref(), expected);
    }

    #[rstest]
    #[case("class A { void run() { } }", "run", Some("Run"))]
    #[case("class A { void Run() { } }", "Run", None)]
    #[case("class A { void _run() { } }", "_run", Some("_run"))]
    fn method_names(#[case] source: &str, #[case] name: &str, #[case] expected: Option<&str>) {
        assert_eq!(rename(&MethodRenamer, source, name).as_deref(), expected);
    }

    #[rstest]
    #[case("class A { void M() { int my_total = 0; } }", "my_total", Some("myTotal"))]
    #[case("class A { void M(int max_count) { } }", "max_count", Some("maxCount"))]
    #[case("class A { void M() { foreach (var a_b in xs) { } } }", "a_b", Some("aB"))]
    #[case("class A { void M() { try { } catch (Exception my_error) { } } }", "my_error", Some("myError"))]
    #[case("class A { void M() { int total = 0; } }", "total", None)]
    #[case("class A { int my_field; }", "my_field", None)]
    fn local_names(#[case] source: &str, #[case] name: &str, #[case] expected: Option<&str>) {
        assert_eq!(rename(&LocalVariableRenamer, source, name).as_deref(), expected);
    }
}
