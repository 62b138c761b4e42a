//! Syntax node model shared by the parser, the printer and the rule engine.
//!
//! Nodes form a uniform tree: every node carries a [`SyntaxKind`], an optional
//! token (identifier, operator, literal or type text), ordered children,
//! transient [`Annotation`]s and source [`Trivia`]. Node kinds are a closed
//! enumeration, so rules compare kinds directly instead of testing type sets.

use std::fmt;

/// Closed set of node kinds produced by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    /// Root of a file.
    CompilationUnit,
    /// `using X;` directive. Token holds the directive body.
    UsingDirective,
    /// Block-bodied namespace. Token holds the qualified name.
    NamespaceDeclaration,
    /// `namespace X;` declaration covering the rest of the file.
    FileScopedNamespaceDeclaration,
    /// `class` declaration. Token holds the type name.
    ClassDeclaration,
    /// `struct` declaration. Token holds the type name.
    StructDeclaration,
    /// `interface` declaration. Token holds the type name.
    InterfaceDeclaration,
    /// `enum` declaration. Token holds the type name.
    EnumDeclaration,
    /// Enum member. Token holds the member name.
    EnumMember,
    /// Generic parameter list such as `<T, U>`, kept verbatim in the token.
    TypeParameterList,
    /// Base type list of a type declaration.
    BaseList,
    /// `[...]` attribute section. Token holds an optional attribute target.
    AttributeList,
    /// Single attribute. Token holds the attribute name.
    Attribute,
    /// Modifier keyword such as `private` or `const`.
    Modifier,
    /// Generic constraint such as `where T : new()`. Token holds the clause
    /// text after `where`.
    ConstraintClause,
    /// Field declaration with one or more declarators.
    FieldDeclaration,
    /// Declared variable. Token holds the variable name.
    VariableDeclarator,
    /// `= value` initialiser or default value.
    EqualsValue,
    /// Property declaration. Token holds the property name.
    PropertyDeclaration,
    /// `{ get; set; }` accessor list.
    AccessorList,
    /// Accessor. Token holds `get`, `set`, `init`, `add` or `remove`.
    Accessor,
    /// `=> expression` body.
    ArrowExpressionClause,
    /// Method declaration. Token holds the method name.
    MethodDeclaration,
    /// Constructor declaration. Token holds the type name.
    ConstructorDeclaration,
    /// `: base(...)` or `: this(...)`. Token holds `base` or `this`.
    ConstructorInitializer,
    /// Parenthesised parameter list.
    ParameterList,
    /// Parameter. Token holds the parameter name.
    Parameter,
    /// Type reference. Token holds the type text.
    TypeRef,
    /// `{ ... }` statement block.
    Block,
    /// Local variable declaration.
    LocalDeclaration,
    /// `if` statement: condition, consequence, optional else clause.
    IfStatement,
    /// `else` clause wrapping its statement.
    ElseClause,
    /// `for` statement: initializer, condition, incrementor, body.
    ForStatement,
    /// Initializer slot of a `for` statement.
    ForInitializer,
    /// Condition slot of a `for` statement.
    ForCondition,
    /// Incrementor slot of a `for` statement.
    ForIncrementor,
    /// `foreach` statement: type, variable, collection, body.
    ForEachStatement,
    /// `while` statement: condition, body.
    WhileStatement,
    /// `do` statement: body, condition.
    DoStatement,
    /// `switch` statement: subject followed by sections.
    SwitchStatement,
    /// Labels and statements of one switch section.
    SwitchSection,
    /// `case value:` label.
    CaseLabel,
    /// `default:` label.
    DefaultLabel,
    /// `try` statement: block, catch clauses, optional finally.
    TryStatement,
    /// `catch` clause.
    CatchClause,
    /// `(Type name)` part of a catch clause. Token holds the optional name.
    CatchDeclaration,
    /// `finally` clause.
    FinallyClause,
    /// `using (resource) statement`.
    UsingStatement,
    /// `lock (target) statement`.
    LockStatement,
    /// `return` statement.
    ReturnStatement,
    /// `break` statement.
    BreakStatement,
    /// `continue` statement.
    ContinueStatement,
    /// `throw` statement.
    ThrowStatement,
    /// Expression followed by `;`.
    ExpressionStatement,
    /// Lone `;`.
    EmptyStatement,
    /// Simple name. Token holds the identifier.
    IdentifierName,
    /// Generic argument list such as `<int>`, kept verbatim in the token.
    TypeArgumentList,
    /// `this`.
    ThisExpression,
    /// `base`.
    BaseExpression,
    /// Literal. Token holds the literal text.
    Literal,
    /// `qualifier.Name`. Token holds the member name.
    MemberAccess,
    /// `qualifier?.Name`. Token holds the member name.
    ConditionalAccess,
    /// Invocation: target and argument list.
    Invocation,
    /// Parenthesised argument list.
    ArgumentList,
    /// Bracketed argument list.
    BracketedArgumentList,
    /// Argument. Token holds an optional `ref`, `out` or `in` keyword.
    Argument,
    /// `target[index]`.
    ElementAccess,
    /// `new T(...)`.
    ObjectCreation,
    /// `new T[n]` or `new T[] { ... }`.
    ArrayCreation,
    /// `{ a, b }` array initialiser.
    ArrayInitializer,
    /// Binary expression. Token holds the operator.
    Binary,
    /// Assignment. Token holds the operator.
    Assignment,
    /// Prefix unary expression. Token holds the operator.
    PrefixUnary,
    /// Postfix unary expression. Token holds the operator.
    PostfixUnary,
    /// `condition ? a : b`.
    Conditional,
    /// `(expression)`.
    Parenthesized,
    /// `(Type)expression`.
    Cast,
    /// Lambda: parameter list and either a block or an expression body.
    Lambda,
    /// `typeof(Type)`.
    TypeOfExpression,
    /// `default(Type)`.
    DefaultExpression,
    /// Interpolated string. Token holds the opening delimiter up to and
    /// including its quotes.
    InterpolatedString,
    /// Literal text segment of an interpolated string, kept verbatim.
    InterpolatedText,
    /// `{expression}` hole. Token holds an optional `,alignment` or
    /// `:format` suffix.
    Interpolation,
    /// Construct kept as written. Children alternate between
    /// [`SyntaxKind::VerbatimText`] runs and converted expressions or
    /// declared variables. Token holds the declared name of a member.
    Verbatim,
    /// Source text run inside a [`SyntaxKind::Verbatim`] node.
    VerbatimText,
    /// Variable declared inside kept text and scoped to the construct that
    /// declares it. Token holds the name; an optional `TypeRef` child holds
    /// the declared type.
    DesignatedVariable,
    /// Variable declared inside kept text that stays visible in the
    /// enclosing statement list, as `is` patterns and `out var` do.
    ExpressionVariable,
}

impl SyntaxKind {
    /// Returns whether the kind declares a type.
    #[must_use]
    pub const fn is_type_declaration(self) -> bool {
        matches!(
            self,
            Self::ClassDeclaration
                | Self::StructDeclaration
                | Self::InterfaceDeclaration
                | Self::EnumDeclaration
        )
    }

    /// Returns whether the kind is a member body owner (method, constructor,
    /// property or accessor).
    #[must_use]
    pub const fn is_member_declaration(self) -> bool {
        matches!(
            self,
            Self::MethodDeclaration | Self::ConstructorDeclaration | Self::PropertyDeclaration
        )
    }

    /// Returns whether the kind is a statement.
    #[must_use]
    pub const fn is_statement(self) -> bool {
        matches!(
            self,
            Self::Block
                | Self::Verbatim
                | Self::LocalDeclaration
                | Self::IfStatement
                | Self::ForStatement
                | Self::ForEachStatement
                | Self::WhileStatement
                | Self::DoStatement
                | Self::SwitchStatement
                | Self::TryStatement
                | Self::UsingStatement
                | Self::LockStatement
                | Self::ReturnStatement
                | Self::BreakStatement
                | Self::ContinueStatement
                | Self::ThrowStatement
                | Self::ExpressionStatement
                | Self::EmptyStatement
        )
    }
}

/// Identifier of one marker batch.
///
/// Batches are minted per rule invocation by the engine; markers from
/// different batches never compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BatchId(u64);

impl BatchId {
    /// Wraps a raw batch number.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw batch number.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Ordered marker attached to a declaration for the duration of one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Marker {
    batch: BatchId,
    ordinal: u32,
}

impl Marker {
    /// Creates a marker for `ordinal` within `batch`.
    #[must_use]
    pub const fn new(batch: BatchId, ordinal: u32) -> Self {
        Self { batch, ordinal }
    }

    /// Batch that minted this marker.
    #[must_use]
    pub const fn batch(self) -> BatchId {
        self.batch
    }

    /// Processing position of the marked node within its batch.
    #[must_use]
    pub const fn ordinal(self) -> u32 {
        self.ordinal
    }
}

/// Transient tag attached to a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Annotation {
    /// Engine marker identifying a rename target.
    Marker(Marker),
    /// Left behind by the rename primitive on every node it rewrote.
    RenameBookkeeping,
    /// Requests that the qualifier of a member access be reduced.
    Simplify,
}

impl Annotation {
    /// Returns whether this is a marker belonging to `batch`.
    #[must_use]
    pub fn is_marker_of(&self, batch: BatchId) -> bool {
        matches!(self, Self::Marker(marker) if marker.batch() == batch)
    }
}

/// Comments, directives and blank lines attached to a node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Trivia {
    /// Comment and directive lines printed before the node.
    pub leading: Vec<String>,
    /// Whether the source had a blank line before the node.
    pub blank_line_before: bool,
    /// Line comment printed at the end of the node's last line.
    pub end_of_line: Option<String>,
    /// Comments printed before the closing brace of a body.
    pub trailing: Vec<String>,
}

impl Trivia {
    /// Returns whether no trivia is recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.leading.is_empty()
            && !self.blank_line_before
            && self.end_of_line.is_none()
            && self.trailing.is_empty()
    }
}

/// A node of the syntax tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
    kind: SyntaxKind,
    token: Option<String>,
    children: Vec<SyntaxNode>,
    annotations: Vec<Annotation>,
    trivia: Trivia,
}

impl SyntaxNode {
    /// Creates an empty node of the given kind.
    #[must_use]
    pub const fn new(kind: SyntaxKind) -> Self {
        Self {
            kind,
            token: None,
            children: Vec::new(),
            annotations: Vec::new(),
            trivia: Trivia {
                leading: Vec::new(),
                blank_line_before: false,
                end_of_line: None,
                trailing: Vec::new(),
            },
        }
    }

    /// Sets the token text.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Sets the token text when present.
    #[must_use]
    pub fn with_optional_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    /// Replaces the children.
    #[must_use]
    pub fn with_children(mut self, children: Vec<Self>) -> Self {
        self.children = children;
        self
    }

    /// Appends one child.
    #[must_use]
    pub fn with_child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// Replaces the trivia.
    #[must_use]
    pub fn with_trivia(mut self, trivia: Trivia) -> Self {
        self.trivia = trivia;
        self
    }

    /// Adds an annotation unless it is already present.
    #[must_use]
    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        if !self.annotations.contains(&annotation) {
            self.annotations.push(annotation);
        }
        self
    }

    /// Node kind.
    #[must_use]
    pub const fn kind(&self) -> SyntaxKind {
        self.kind
    }

    /// Token text, if any.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Ordered children.
    #[must_use]
    pub fn children(&self) -> &[Self] {
        &self.children
    }

    /// Child at `index`.
    #[must_use]
    pub fn child(&self, index: usize) -> Option<&Self> {
        self.children.get(index)
    }

    /// Last child.
    #[must_use]
    pub fn last_child(&self) -> Option<&Self> {
        self.children.last()
    }

    /// Children of the given kind, in order.
    pub fn children_of_kind(&self, kind: SyntaxKind) -> impl Iterator<Item = &Self> {
        self.children.iter().filter(move |child| child.kind == kind)
    }

    /// First child of the given kind.
    #[must_use]
    pub fn first_child_of_kind(&self, kind: SyntaxKind) -> Option<&Self> {
        self.children.iter().find(|child| child.kind == kind)
    }

    /// Index of the first child of the given kind.
    #[must_use]
    pub fn position_of_kind(&self, kind: SyntaxKind) -> Option<usize> {
        self.children.iter().position(|child| child.kind == kind)
    }

    /// Annotations attached to this node.
    #[must_use]
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// Returns whether any annotation satisfies `predicate`.
    pub fn has_annotation(&self, predicate: impl Fn(&Annotation) -> bool) -> bool {
        self.annotations.iter().any(predicate)
    }

    /// Source trivia.
    #[must_use]
    pub const fn trivia(&self) -> &Trivia {
        &self.trivia
    }

    /// Returns a copy with a different token, keeping everything else.
    #[must_use]
    pub fn renamed(&self, token: impl Into<String>) -> Self {
        let mut copy = self.clone();
        copy.token = Some(token.into());
        copy
    }

    /// Returns a copy with the given trivia removed and handed back, used when
    /// a node is wrapped so its comments stay with the wrapper.
    #[must_use]
    pub fn take_trivia(&self) -> (Self, Trivia) {
        let mut copy = self.clone();
        let trivia = std::mem::take(&mut copy.trivia);
        (copy, trivia)
    }

    pub(crate) const fn trivia_mut(&mut self) -> &mut Trivia {
        &mut self.trivia
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<Self> {
        &mut self.children
    }

    pub(crate) fn retain_annotations(&mut self, keep: impl Fn(&Annotation) -> bool) {
        self.annotations.retain(|annotation| keep(annotation));
    }
}

/// Child-index path from the root to a node.
///
/// Paths order in document pre-order: an ancestor sorts before its
/// descendants and earlier siblings sort before later ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    /// Path of the root node.
    #[must_use]
    pub const fn root() -> Self {
        Self(Vec::new())
    }

    /// Builds a path from child indices.
    #[must_use]
    pub fn from_indices(indices: Vec<usize>) -> Self {
        Self(indices)
    }

    /// Path of the `index`-th child of this node.
    #[must_use]
    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    /// Path of the parent node, or `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        let (_, rest) = self.0.split_last()?;
        Some(Self(rest.to_vec()))
    }

    /// Child indices from the root.
    #[must_use]
    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    /// Number of steps from the root.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Returns whether `self` is a proper ancestor of `other`.
    #[must_use]
    pub fn is_ancestor_of(&self, other: &Self) -> bool {
        other.0.len() > self.0.len() && other.0.starts_with(&self.0)
    }

    /// Proper ancestors, nearest first.
    pub fn ancestors(&self) -> impl Iterator<Item = Self> + '_ {
        (0..self.0.len())
            .rev()
            .filter_map(|len| self.0.get(..len).map(|prefix| Self(prefix.to_vec())))
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("/");
        }
        for index in &self.0 {
            write!(f, "/{index}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_order_in_preorder() {
        let parent = NodePath::from_indices(vec![0, 1]);
        let child = parent.child(0);
        let sibling = NodePath::from_indices(vec![0, 2]);

        assert!(parent < child);
        assert!(child < sibling);
        assert!(parent.is_ancestor_of(&child));
        assert!(!child.is_ancestor_of(&parent));
    }

    #[test]
    fn ancestors_are_nearest_first() {
        let path = NodePath::from_indices(vec![3, 1, 4]);
        let ancestors: Vec<String> = path.ancestors().map(|p| p.to_string()).collect();
        assert_eq!(ancestors, vec!["/3/1", "/3", "/"]);
    }

    #[test]
    fn with_annotation_does_not_duplicate() {
        let node = SyntaxNode::new(SyntaxKind::IdentifierName)
            .with_token("x")
            .with_annotation(Annotation::Simplify)
            .with_annotation(Annotation::Simplify);
        assert_eq!(node.annotations().len(), 1);
    }

    #[test]
    fn markers_match_only_their_batch() {
        let marker = Annotation::Marker(Marker::new(BatchId::new(7), 0));
        assert!(marker.is_marker_of(BatchId::new(7)));
        assert!(!marker.is_marker_of(BatchId::new(8)));
        assert!(!Annotation::RenameBookkeeping.is_marker_of(BatchId::new(7)));
    }
}
