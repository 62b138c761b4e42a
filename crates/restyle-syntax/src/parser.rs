//! Conversion of the Tree-sitter C# syntax tree into a [`SyntaxTree`].
//!
//! The grammar does the parsing. This module maps every construct the rule
//! engine rewrites onto the uniform node model and records comments,
//! directives and blank lines as trivia. Constructs with no structured form
//! become [`SyntaxKind::Verbatim`] nodes: their text is kept as written, while
//! the expressions inside them are still converted so that the names used
//! there keep binding and renaming.

use std::collections::BTreeMap;

use tree_sitter::Node;

use crate::error::SyntaxError;
use crate::language::SupportedLanguage;
use crate::node::{SyntaxKind, SyntaxNode, Trivia};
use crate::position::point_to_one_based;
use crate::syntactic_lock::rejected_nodes;
use crate::tree::SyntaxTree;

/// Deepest nesting of members, statements and expressions that is converted.
pub(crate) const MAX_NESTING_DEPTH: usize = 128;

/// Parser front end for a supported language.
///
/// # Example
///
/// ```
/// use restyle_syntax::{Parser, SupportedLanguage};
///
/// let parser = Parser::new(SupportedLanguage::CSharp)?;
/// let tree = parser.parse("class Widget { int count; }")?;
/// assert_eq!(tree.root().children().len(), 1);
/// # Ok::<(), restyle_syntax::SyntaxError>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Parser {
    language: SupportedLanguage,
}

impl Parser {
    /// Creates a parser for `language`.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError::UnsupportedLanguage`] when no parser exists for
    /// the language.
    pub fn new(language: SupportedLanguage) -> Result<Self, SyntaxError> {
        if !language.is_processable() {
            return Err(SyntaxError::unsupported_language(language));
        }
        Ok(Self { language })
    }

    /// Returns the language this parser handles.
    #[must_use]
    pub const fn language(&self) -> SupportedLanguage {
        self.language
    }

    /// Parses `source` into a syntax tree.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxError::Parse`] with a one-based position when the
    /// grammar rejects the source or its nesting is deeper than the
    /// converter accepts, and [`SyntaxError::Grammar`] when the grammar
    /// cannot be loaded.
    pub fn parse(&self, source: &str) -> Result<SyntaxTree, SyntaxError> {
        let grammar = self
            .language
            .tree_sitter_language()
            .ok_or_else(|| SyntaxError::unsupported_language(self.language))?;
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&grammar)
            .map_err(|error| SyntaxError::grammar(self.language, error.to_string()))?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| SyntaxError::internal("tree-sitter produced no tree"))?;
        let root = tree.root_node();
        if let Some((rejected, message)) = rejected_nodes(root).into_iter().next() {
            let (line, column) = point_to_one_based(rejected.start_position());
            return Err(SyntaxError::parse(line, column, message));
        }
        let converted = Converter::new(source, root).compilation_unit(root)?;
        Ok(SyntaxTree::new(converted))
    }
}

/// Why a construct was not given a structured form.
enum Fallback {
    /// Keep the construct as written.
    Verbatim,
    /// Stop converting the file.
    Error(SyntaxError),
}

impl From<SyntaxError> for Fallback {
    fn from(error: SyntaxError) -> Self {
        Self::Error(error)
    }
}

type Step<T> = Result<T, Fallback>;
type Converted = Result<SyntaxNode, SyntaxError>;

const LITERAL_KINDS: &[&str] = &[
    "null_literal",
    "boolean_literal",
    "character_literal",
    "integer_literal",
    "real_literal",
    "string_literal",
    "verbatim_string_literal",
    "raw_string_literal",
];

const EXPRESSION_KINDS: &[&str] = &[
    "anonymous_method_expression",
    "anonymous_object_creation_expression",
    "array_creation_expression",
    "as_expression",
    "assignment_expression",
    "await_expression",
    "binary_expression",
    "cast_expression",
    "checked_expression",
    "collection_expression",
    "conditional_access_expression",
    "conditional_expression",
    "default_expression",
    "element_access_expression",
    "element_binding_expression",
    "generic_name",
    "identifier",
    "implicit_array_creation_expression",
    "implicit_object_creation_expression",
    "implicit_stackalloc_expression",
    "initializer_expression",
    "interpolated_string_expression",
    "invocation_expression",
    "is_expression",
    "is_pattern_expression",
    "lambda_expression",
    "makeref_expression",
    "member_access_expression",
    "object_creation_expression",
    "parenthesized_expression",
    "postfix_unary_expression",
    "prefix_unary_expression",
    "query_expression",
    "range_expression",
    "ref_expression",
    "reftype_expression",
    "refvalue_expression",
    "sizeof_expression",
    "stackalloc_expression",
    "switch_expression",
    "throw_expression",
    "tuple_expression",
    "typeof_expression",
    "with_expression",
];

/// Type syntax, kept as text wherever it appears inside verbatim constructs.
const TYPE_KINDS: &[&str] = &[
    "alias_qualified_name",
    "array_type",
    "attribute_target_specifier",
    "base_list",
    "explicit_interface_specifier",
    "function_pointer_type",
    "implicit_type",
    "nullable_type",
    "pointer_type",
    "predefined_type",
    "qualified_name",
    "ref_type",
    "scoped_type",
    "tuple_type",
    "type_argument_list",
    "type_parameter_constraints_clause",
    "type_parameter_list",
];

const SCOPE_KINDS: &[&str] = &[
    "accessor_declaration",
    "anonymous_method_expression",
    "block",
    "bracketed_parameter_list",
    "catch_clause",
    "class_declaration",
    "constructor_declaration",
    "conversion_operator_declaration",
    "delegate_declaration",
    "destructor_declaration",
    "event_declaration",
    "fixed_statement",
    "for_statement",
    "foreach_statement",
    "indexer_declaration",
    "interface_declaration",
    "lambda_expression",
    "local_function_statement",
    "method_declaration",
    "operator_declaration",
    "parameter_list",
    "property_declaration",
    "query_expression",
    "record_declaration",
    "struct_declaration",
    "switch_expression_arm",
    "switch_section",
    "using_statement",
];

fn is_literal(kind: &str) -> bool {
    LITERAL_KINDS.contains(&kind)
}

fn is_expression(kind: &str) -> bool {
    is_literal(kind) || EXPRESSION_KINDS.contains(&kind)
}

fn is_scope_boundary(kind: &str) -> bool {
    SCOPE_KINDS.contains(&kind)
}

fn syntax(kind: SyntaxKind) -> SyntaxNode {
    SyntaxNode::new(kind)
}

fn leaf(kind: SyntaxKind, token: impl Into<String>) -> SyntaxNode {
    SyntaxNode::new(kind).with_token(token)
}

fn type_ref(text: String) -> SyntaxNode {
    leaf(SyntaxKind::TypeRef, text)
}

/// Children of `node` that are not comments or directives.
fn code_children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .filter(|child| !child.is_extra())
        .collect()
}

fn named_children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    code_children(node)
        .into_iter()
        .filter(Node::is_named)
        .collect()
}

/// Children of `node` with the field each one fills.
fn field_children<'t>(node: Node<'t>) -> Vec<(Option<&'static str>, Node<'t>)> {
    let mut children = Vec::new();
    let mut cursor = node.walk();
    if cursor.goto_first_child() {
        loop {
            let child = cursor.node();
            if !child.is_extra() {
                children.push((cursor.field_name(), child));
            }
            if !cursor.goto_next_sibling() {
                break;
            }
        }
    }
    children
}

fn has_token(node: Node<'_>, token: &str) -> bool {
    code_children(node)
        .iter()
        .any(|child| !child.is_named() && child.kind() == token)
}

fn first_named<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    named_children(node)
        .into_iter()
        .find(|child| child.kind() == kind)
}

/// Returns whether `node` can stand for a value: any named node, or the
/// `this` and `base` keywords.
fn is_operand(node: Node<'_>) -> bool {
    node.is_named() || matches!(node.kind(), "this" | "base")
}

fn operand(node: Node<'_>) -> Option<Node<'_>> {
    code_children(node).into_iter().find(|child| is_operand(*child))
}

/// The operand after `=` in `node`.
fn value_after_equals(node: Node<'_>) -> Option<Node<'_>> {
    code_children(node)
        .into_iter()
        .skip_while(|child| child.kind() != "=")
        .skip(1)
        .find(|child| is_operand(*child))
}

fn required<'t>(node: Node<'t>, field: &str) -> Step<Node<'t>> {
    node.child_by_field_name(field).ok_or(Fallback::Verbatim)
}

/// Leaf tokens under `node` in source order, without comments.
fn leaves(node: Node<'_>) -> Vec<Node<'_>> {
    let mut found = Vec::new();
    let mut pending = vec![node];
    while let Some(current) = pending.pop() {
        if current.is_extra() {
            continue;
        }
        if current.child_count() == 0 {
            found.push(current);
            continue;
        }
        let mut cursor = current.walk();
        let children: Vec<Node<'_>> = current.children(&mut cursor).collect();
        pending.extend(children.into_iter().rev());
    }
    found
}

fn is_word(text: &str) -> bool {
    let word_char = |c: char| c.is_alphanumeric() || c == '_' || c == '@';
    text.chars().next().is_some_and(word_char) && text.chars().last().is_some_and(word_char)
}

/// Whether a space goes between two adjacent tokens of type or directive
/// text: between words, around `=` and `:`, and after `,`.
fn spaced(previous: &str, current: &str) -> bool {
    (is_word(previous) && is_word(current))
        || previous == ","
        || matches!(previous, "=" | ":")
        || matches!(current, "=" | ":")
}

fn dedent(text: &str, indent: usize) -> String {
    let mut lines = text.split('\n');
    let mut result = lines.next().unwrap_or_default().to_owned();
    for line in lines {
        result.push('\n');
        let strip: usize = line
            .chars()
            .take(indent)
            .take_while(|c| matches!(c, ' ' | '\t'))
            .map(char::len_utf8)
            .sum();
        result.push_str(line.get(strip..).unwrap_or_default());
    }
    result
}

/// Items of a list container, with conditional-compilation groups flattened
/// into the surrounding list.
fn list_items(container: Node<'_>) -> Vec<Node<'_>> {
    let mut items = Vec::new();
    let mut pending: Vec<Node<'_>> = named_children(container).into_iter().rev().collect();
    while let Some(item) = pending.pop() {
        if matches!(item.kind(), "preproc_if" | "preproc_else" | "preproc_elif") {
            let branch: Vec<Node<'_>> = field_children(item)
                .into_iter()
                .filter(|(field, child)| *field != Some("condition") && child.is_named())
                .map(|(_, child)| child)
                .collect();
            pending.extend(branch.into_iter().rev());
        } else {
            items.push(item);
        }
    }
    items
}

/// Moves the declarations after a file-scoped namespace into it.
fn file_scoped(mut children: Vec<SyntaxNode>) -> Vec<SyntaxNode> {
    let Some(index) = children
        .iter()
        .position(|child| child.kind() == SyntaxKind::FileScopedNamespaceDeclaration)
    else {
        return children;
    };
    let rest = children.split_off(index + 1);
    if let Some(namespace) = children.last_mut() {
        namespace.children_mut().extend(rest);
    }
    children
}

/// Comments, directive lines and blank lines found between two items.
#[derive(Debug, Default)]
struct Gap {
    comments: Vec<String>,
    end_of_line: Option<String>,
    blank_line: bool,
}

/// A node waiting to be classified while a verbatim construct is scanned.
struct Pending<'t> {
    node: Node<'t>,
    parent: Node<'t>,
    field: Option<&'static str>,
    scoped: bool,
}

fn push_children<'t>(pending: &mut Vec<Pending<'t>>, parent: Node<'t>, scoped: bool) {
    let children = field_children(parent);
    pending.extend(children.into_iter().rev().map(|(field, node)| Pending {
        node,
        parent,
        field,
        scoped,
    }));
}

/// A declared name found inside a verbatim construct.
struct Designation {
    declared: Option<String>,
}

struct Converter<'s> {
    source: &'s str,
    extras: Vec<(usize, usize)>,
    covered: BTreeMap<usize, usize>,
    depth: usize,
}

impl<'s> Converter<'s> {
    fn new(source: &'s str, root: Node<'_>) -> Self {
        let mut extras = Vec::new();
        let mut pending = vec![root];
        while let Some(node) = pending.pop() {
            if node.is_extra() {
                extras.push((node.start_byte(), node.end_byte()));
                continue;
            }
            let mut cursor = node.walk();
            pending.extend(node.children(&mut cursor));
        }
        extras.sort_unstable();
        Self {
            source,
            extras,
            covered: BTreeMap::new(),
            depth: 0,
        }
    }

    fn text(&self, node: Node<'_>) -> &'s str {
        self.source.get(node.byte_range()).unwrap_or_default()
    }

    fn slice(&self, start: usize, end: usize) -> &'s str {
        self.source.get(start..end).unwrap_or_default()
    }

    fn compact(&self, node: Node<'_>) -> String {
        self.join(&leaves(node))
    }

    fn join(&self, tokens: &[Node<'_>]) -> String {
        let mut text = String::new();
        let mut previous: Option<&str> = None;
        for token in tokens {
            let current = self.text(*token);
            if let Some(before) = previous
                && spaced(before, current)
            {
                text.push(' ');
            }
            text.push_str(current);
            previous = Some(current);
        }
        text
    }

    fn field_text(&self, node: Node<'_>, field: &str) -> Step<String> {
        required(node, field).map(|child| self.text(child).to_owned())
    }

    fn nested<F>(&mut self, node: Node<'_>, convert: F) -> Converted
    where
        F: FnOnce(&mut Self) -> Converted,
    {
        if self.depth >= MAX_NESTING_DEPTH {
            let (line, column) = point_to_one_based(node.start_position());
            return Err(SyntaxError::parse(
                line,
                column,
                format!("nesting deeper than {MAX_NESTING_DEPTH} levels"),
            ));
        }
        self.depth += 1;
        let converted = convert(self);
        self.depth -= 1;
        converted
    }

    // ---------------------------------------------------------------------
    // Trivia
    // ---------------------------------------------------------------------

    fn cover(&mut self, start: usize, end: usize) {
        self.covered
            .entry(start)
            .and_modify(|covered| *covered = (*covered).max(end))
            .or_insert(end);
    }

    fn is_covered(&self, position: usize) -> bool {
        self.covered
            .range(..=position)
            .next_back()
            .is_some_and(|(_, end)| position < *end)
    }

    /// Reads the comments and directive lines in `start..end`, which holds
    /// nothing else apart from whitespace and separators.
    fn gap(&mut self, start: usize, end: usize) -> Gap {
        let mut gap = Gap::default();
        if start >= end {
            return gap;
        }
        self.cover(start, end);
        let mut rest = self.slice(start, end);
        let mut seen_line_break = false;
        loop {
            let body = rest.trim_start_matches(|c: char| c.is_whitespace() || c == ',' || c == ';');
            let breaks = rest
                .get(..rest.len() - body.len())
                .unwrap_or_default()
                .matches('\n')
                .count();
            gap.blank_line |= breaks >= 2;
            seen_line_break |= breaks > 0;
            if body.is_empty() {
                return gap;
            }
            let length = if body.starts_with("/*") {
                body.find("*/").map_or(body.len(), |close| close + 2)
            } else {
                body.find('\n').unwrap_or(body.len())
            };
            let comment = body
                .get(..length)
                .unwrap_or_default()
                .trim_end()
                .replace("\r\n", "\n");
            let same_line = !seen_line_break
                && gap.comments.is_empty()
                && gap.end_of_line.is_none()
                && comment.starts_with("//");
            if same_line {
                gap.end_of_line = Some(comment);
            } else {
                gap.comments.push(comment);
            }
            rest = body.get(length..).unwrap_or_default();
        }
    }

    /// Comments inside `node` that no nested list or verbatim text claimed.
    fn stranded(&mut self, node: Node<'_>) -> Vec<String> {
        let (start, end) = (node.start_byte(), node.end_byte());
        let first = self.extras.partition_point(|&(from, _)| from < start);
        let found: Vec<(usize, usize)> = self
            .extras
            .iter()
            .skip(first)
            .take_while(|&&(from, _)| from < end)
            .filter(|&&(from, _)| !self.is_covered(from))
            .copied()
            .collect();
        let mut comments = Vec::new();
        for (from, to) in found {
            self.cover(from, to);
            let comment = self.slice(from, to).trim().replace("\r\n", "\n");
            if !comment.is_empty() {
                comments.push(comment);
            }
        }
        comments
    }

    /// Converts list items and attaches the trivia found between them.
    /// Returns the items and the comments after the last one.
    fn items<'t, F, E>(
        &mut self,
        items: &[Node<'t>],
        start: usize,
        end: usize,
        mut convert: F,
    ) -> Result<(Vec<SyntaxNode>, Vec<String>), E>
    where
        F: FnMut(&mut Self, Node<'t>) -> Result<SyntaxNode, E>,
    {
        let mut converted: Vec<SyntaxNode> = Vec::with_capacity(items.len());
        let mut cursor = start;
        for item in items {
            let gap = self.gap(cursor, item.start_byte());
            let mut leading = Vec::new();
            match (gap.end_of_line, converted.last_mut()) {
                (Some(comment), Some(previous)) => previous.trivia_mut().end_of_line = Some(comment),
                (Some(comment), None) => leading.push(comment),
                (None, _) => {}
            }
            leading.extend(gap.comments);
            let mut result = convert(self, *item)?;
            leading.extend(self.stranded(*item));
            let trivia = result.trivia_mut();
            leading.append(&mut trivia.leading);
            trivia.leading = leading;
            trivia.blank_line_before = gap.blank_line;
            converted.push(result);
            cursor = item.end_byte();
        }
        let gap = self.gap(cursor, end);
        let mut trailing = Vec::new();
        match (gap.end_of_line, converted.last_mut()) {
            (Some(comment), Some(last)) => last.trivia_mut().end_of_line = Some(comment),
            (Some(comment), None) => trailing.push(comment),
            (None, _) => {}
        }
        trailing.extend(gap.comments);
        Ok((converted, trailing))
    }

    /// Converts the items between the braces of `container`.
    fn braced_items<F, E>(
        &mut self,
        container: Node<'_>,
        convert: F,
    ) -> Result<(Vec<SyntaxNode>, Vec<String>), E>
    where
        F: FnMut(&mut Self, Node<'_>) -> Result<SyntaxNode, E>,
    {
        let tokens = code_children(container);
        let start = tokens
            .iter()
            .find(|token| token.kind() == "{")
            .map_or(container.start_byte(), Node::end_byte);
        let end = tokens
            .iter()
            .rev()
            .find(|token| token.kind() == "}")
            .map_or(container.end_byte(), Node::start_byte);
        self.items(&list_items(container), start, end, convert)
    }

    // ---------------------------------------------------------------------
    // Verbatim constructs
    // ---------------------------------------------------------------------

    /// Keeps the text of `node` as written.
    fn verbatim(&mut self, node: Node<'_>, declares: bool) -> Converted {
        let mut roots = Vec::new();
        push_children(&mut roots, node, is_scope_boundary(node.kind()));
        self.verbatim_span(node.start_byte(), node.end_byte(), roots, declares)
    }

    /// Keeps `start..end` as written. Expressions inside become converted
    /// children. Declared names become variables scoped to the construct, or
    /// to the enclosing statements when no scope boundary lies in between.
    fn verbatim_span(
        &mut self,
        start: usize,
        end: usize,
        mut pending: Vec<Pending<'_>>,
        declares: bool,
    ) -> Converted {
        let mut holes: Vec<(usize, usize, SyntaxNode)> = Vec::new();
        while let Some(Pending {
            node,
            parent,
            field,
            scoped,
        }) = pending.pop()
        {
            if !node.is_named() {
                continue;
            }
            if declares && let Some(designation) = self.designation(node, parent, field) {
                let kind = if scoped {
                    SyntaxKind::DesignatedVariable
                } else {
                    SyntaxKind::ExpressionVariable
                };
                let mut variable = leaf(kind, self.text(node));
                if let Some(declared) = designation.declared {
                    variable = variable.with_child(type_ref(declared));
                }
                holes.push((node.start_byte(), node.end_byte(), variable));
                continue;
            }
            if is_text(node, parent, field) {
                continue;
            }
            if is_expression(node.kind()) {
                holes.push((node.start_byte(), node.end_byte(), self.expression(node)?));
                continue;
            }
            push_children(&mut pending, node, scoped || is_scope_boundary(node.kind()));
        }

        let indent = self.line_indent(start);
        let mut verbatim = syntax(SyntaxKind::Verbatim);
        let mut cursor = start;
        for (from, to, hole) in holes {
            verbatim = self.verbatim_text(verbatim, cursor, from, indent);
            verbatim = verbatim.with_child(hole);
            cursor = to;
        }
        Ok(self.verbatim_text(verbatim, cursor, end, indent))
    }

    fn verbatim_text(&mut self, verbatim: SyntaxNode, start: usize, end: usize, indent: usize) -> SyntaxNode {
        if start >= end {
            return verbatim;
        }
        self.cover(start, end);
        let text = dedent(&self.slice(start, end).replace("\r\n", "\n"), indent);
        verbatim.with_child(leaf(SyntaxKind::VerbatimText, text))
    }

    fn line_indent(&self, position: usize) -> usize {
        let line_start = self
            .source
            .get(..position)
            .and_then(|before| before.rfind('\n'))
            .map_or(0, |newline| newline + 1);
        self.slice(line_start, position)
            .chars()
            .take_while(|c| matches!(c, ' ' | '\t'))
            .count()
    }

    fn designation(
        &self,
        node: Node<'_>,
        parent: Node<'_>,
        field: Option<&str>,
    ) -> Option<Designation> {
        if node.kind() == "implicit_parameter" {
            return Some(Designation { declared: None });
        }
        if node.kind() != "identifier" {
            return None;
        }
        let previous = node.prev_sibling().map(|sibling| sibling.kind());
        let next = node.next_sibling().map(|sibling| sibling.kind());
        let designates = match parent.kind() {
            "parameter"
            | "parameter_list"
            | "bracketed_parameter_list"
            | "variable_declarator"
            | "declaration_expression"
            | "declaration_pattern"
            | "var_pattern"
            | "recursive_pattern"
            | "list_pattern"
            | "parenthesized_variable_designation"
            | "tuple_pattern"
            | "catch_declaration"
            | "from_clause" => field == Some("name"),
            "foreach_statement" => field == Some("left"),
            "let_clause" => next == Some("="),
            "join_clause" => next == Some("in"),
            "join_into_clause" | "query_expression" => previous == Some("into"),
            _ => false,
        };
        designates.then(|| Designation {
            declared: self.declared_type(node, parent),
        })
    }

    fn declared_type(&self, node: Node<'_>, parent: Node<'_>) -> Option<String> {
        let declared = match parent.kind() {
            "var_pattern" => return Some("var".to_owned()),
            "parenthesized_variable_designation" | "tuple_pattern" => None,
            "variable_declarator" => parent
                .parent()
                .and_then(|declaration| declaration.child_by_field_name("type")),
            "parameter_list" | "bracketed_parameter_list" => node.prev_named_sibling(),
            _ => parent.child_by_field_name("type"),
        };
        declared.map(|type_node| self.compact(type_node))
    }

    // ---------------------------------------------------------------------
    // Compilation unit and declarations
    // ---------------------------------------------------------------------

    fn compilation_unit(&mut self, root: Node<'_>) -> Converted {
        let (children, trailing) = self.items(
            &list_items(root),
            root.start_byte(),
            root.end_byte(),
            Self::member,
        )?;
        Ok(syntax(SyntaxKind::CompilationUnit)
            .with_children(file_scoped(children))
            .with_trivia(Trivia {
                trailing,
                ..Trivia::default()
            }))
    }

    fn member(&mut self, node: Node<'_>) -> Converted {
        self.nested(node, |this| match this.member_kind(node) {
            Ok(member) => Ok(member),
            Err(Fallback::Verbatim) => {
                let name = node
                    .child_by_field_name("name")
                    .filter(|name| name.kind() == "identifier")
                    .map(|name| this.text(name).to_owned());
                let declares = node.kind() != "global_statement";
                Ok(this.verbatim(node, declares)?.with_optional_token(name))
            }
            Err(Fallback::Error(error)) => Err(error),
        })
    }

    fn member_kind(&mut self, node: Node<'_>) -> Step<SyntaxNode> {
        match node.kind() {
            "using_directive" => Ok(self.using_directive(node)),
            "namespace_declaration" => self.namespace(node),
            "file_scoped_namespace_declaration" => Ok(leaf(
                SyntaxKind::FileScopedNamespaceDeclaration,
                self.compact(required(node, "name")?),
            )),
            "global_attribute" => self.attribute_list(node),
            "class_declaration" => self.type_declaration(node, SyntaxKind::ClassDeclaration),
            "struct_declaration" => self.type_declaration(node, SyntaxKind::StructDeclaration),
            "interface_declaration" => {
                self.type_declaration(node, SyntaxKind::InterfaceDeclaration)
            }
            "enum_declaration" => self.enum_declaration(node),
            "field_declaration" | "event_field_declaration" => self.field(node),
            "method_declaration" => self.method(node),
            "constructor_declaration" => self.constructor(node),
            "property_declaration" => self.property(node),
            _ => Err(Fallback::Verbatim),
        }
    }

    fn using_directive(&self, node: Node<'_>) -> SyntaxNode {
        let tokens = leaves(node);
        let global = tokens.first().is_some_and(|token| token.kind() == "global");
        let start = usize::from(global) + 1;
        let end = tokens.len() - usize::from(tokens.last().is_some_and(|token| token.kind() == ";"));
        let body = tokens.get(start..end).unwrap_or_default();
        let directive = leaf(SyntaxKind::UsingDirective, self.join(body));
        if global {
            directive.with_child(leaf(SyntaxKind::Modifier, "global"))
        } else {
            directive
        }
    }

    fn namespace(&mut self, node: Node<'_>) -> Step<SyntaxNode> {
        let name = self.compact(required(node, "name")?);
        let body = required(node, "body")?;
        let (members, trailing) = self.braced_items(body, Self::member)?;
        Ok(leaf(SyntaxKind::NamespaceDeclaration, name)
            .with_children(members)
            .with_trivia(Trivia {
                trailing,
                ..Trivia::default()
            }))
    }

    /// Attribute lists and modifiers in front of a declaration.
    fn prefix(&mut self, node: Node<'_>) -> Step<Vec<SyntaxNode>> {
        let mut prefix = Vec::new();
        for child in named_children(node) {
            match child.kind() {
                "attribute_list" => prefix.push(self.attribute_list(child)?),
                "modifier" => prefix.push(leaf(SyntaxKind::Modifier, self.text(child))),
                kind if kind.starts_with("preproc") => return Err(Fallback::Verbatim),
                _ => {}
            }
        }
        Ok(prefix)
    }

    fn attribute_list(&mut self, node: Node<'_>) -> Step<SyntaxNode> {
        let mut list = syntax(SyntaxKind::AttributeList);
        for child in code_children(node) {
            match child.kind() {
                "attribute_target_specifier" => {
                    let target = self.text(child).trim_end_matches(':').trim();
                    list = list.with_token(target);
                }
                "assembly" | "module" if !child.is_named() => list = list.with_token(child.kind()),
                "attribute" => list = list.with_child(self.attribute(child)?),
                _ => {}
            }
        }
        Ok(list)
    }

    fn attribute(&mut self, node: Node<'_>) -> Step<SyntaxNode> {
        let mut attribute = leaf(SyntaxKind::Attribute, self.compact(required(node, "name")?));
        let Some(arguments) = first_named(node, "attribute_argument_list") else {
            return Ok(attribute);
        };
        let mut list = syntax(SyntaxKind::ArgumentList);
        for argument in named_children(arguments) {
            let mut label = None;
            let mut value = None;
            for (field, child) in field_children(argument) {
                match (field, child.kind()) {
                    (Some("name"), _) => label = Some(self.text(child)),
                    _ if is_operand(child) => value = Some(child),
                    _ => {}
                }
            }
            let separator = code_children(argument)
                .into_iter()
                .find(|child| matches!(child.kind(), ":" | "="))
                .map(|child| child.kind());
            let token = match (label, separator) {
                (Some(name), Some(":")) => Some(format!("{name}:")),
                (Some(name), _) => Some(format!("{name} =")),
                (None, _) => None,
            };
            let value = value.ok_or(Fallback::Verbatim)?;
            list = list.with_child(
                syntax(SyntaxKind::Argument)
                    .with_optional_token(token)
                    .with_child(self.expression(value)?),
            );
        }
        attribute = attribute.with_child(list);
        Ok(attribute)
    }

    fn type_declaration(&mut self, node: Node<'_>, kind: SyntaxKind) -> Step<SyntaxNode> {
        let shapes = code_children(node);
        if shapes
            .iter()
            .any(|child| matches!(child.kind(), "parameter_list" | "ref"))
        {
            return Err(Fallback::Verbatim);
        }
        let name = self.field_text(node, "name")?;
        let body = required(node, "body")?;
        let mut children = self.prefix(node)?;
        for child in named_children(node) {
            match child.kind() {
                "type_parameter_list" => children.push(self.type_parameter_list(child)),
                "base_list" => children.push(self.base_list(child)?),
                "type_parameter_constraints_clause" => {
                    children.push(self.constraint_clause(child));
                }
                _ => {}
            }
        }
        let (members, trailing) = self.braced_items(body, Self::member)?;
        children.extend(members);
        Ok(leaf(kind, name)
            .with_children(children)
            .with_trivia(Trivia {
                trailing,
                ..Trivia::default()
            }))
    }

    fn enum_declaration(&mut self, node: Node<'_>) -> Step<SyntaxNode> {
        let name = self.field_text(node, "name")?;
        let body = required(node, "body")?;
        let mut children = self.prefix(node)?;
        if let Some(base) = first_named(node, "base_list") {
            children.push(self.base_list(base)?);
        }
        let (members, trailing) = self.braced_items(body, Self::enum_member)?;
        children.extend(members);
        Ok(leaf(SyntaxKind::EnumDeclaration, name)
            .with_children(children)
            .with_trivia(Trivia {
                trailing,
                ..Trivia::default()
            }))
    }

    fn enum_member(&mut self, node: Node<'_>) -> Step<SyntaxNode> {
        if node.kind() != "enum_member_declaration" {
            return Err(Fallback::Verbatim);
        }
        let mut member = leaf(SyntaxKind::EnumMember, self.field_text(node, "name")?)
            .with_children(self.prefix(node)?);
        if let Some(value) = node.child_by_field_name("value") {
            member = member.with_child(syntax(SyntaxKind::EqualsValue).with_child(self.expression(value)?));
        }
        Ok(member)
    }

    fn type_parameter_list(&self, node: Node<'_>) -> SyntaxNode {
        let parameters: Vec<String> = named_children(node)
            .into_iter()
            .map(|parameter| self.compact(parameter))
            .collect();
        leaf(SyntaxKind::TypeParameterList, parameters.join(", "))
    }

    fn base_list(&self, node: Node<'_>) -> Step<SyntaxNode> {
        let mut list = syntax(SyntaxKind::BaseList);
        for base in named_children(node) {
            if matches!(base.kind(), "argument_list" | "primary_constructor_base_type") {
                return Err(Fallback::Verbatim);
            }
            list = list.with_child(type_ref(self.compact(base)));
        }
        Ok(list)
    }

    fn constraint_clause(&self, node: Node<'_>) -> SyntaxNode {
        let tokens: Vec<Node<'_>> = leaves(node)
            .into_iter()
            .skip_while(|token| token.kind() == "where" && !token.is_named())
            .collect();
        leaf(SyntaxKind::ConstraintClause, self.join(&tokens))
    }

    fn field(&mut self, node: Node<'_>) -> Step<SyntaxNode> {
        let mut children = self.prefix(node)?;
        if has_token(node, "event") {
            children.push(leaf(SyntaxKind::Modifier, "event"));
        }
        let declaration = first_named(node, "variable_declaration").ok_or(Fallback::Verbatim)?;
        children.extend(self.variable_declaration(declaration)?);
        Ok(syntax(SyntaxKind::FieldDeclaration).with_children(children))
    }

    /// Declared type followed by the declarators.
    fn variable_declaration(&mut self, node: Node<'_>) -> Step<Vec<SyntaxNode>> {
        let mut parts = vec![type_ref(self.compact(required(node, "type")?))];
        for declarator in named_children(node) {
            if declarator.kind() == "variable_declarator" {
                parts.push(self.declarator(declarator)?);
            }
        }
        Ok(parts)
    }

    fn declarator(&mut self, node: Node<'_>) -> Step<SyntaxNode> {
        let name = required(node, "name")?;
        if name.kind() != "identifier" || first_named(node, "bracketed_argument_list").is_some() {
            return Err(Fallback::Verbatim);
        }
        let declarator = leaf(SyntaxKind::VariableDeclarator, self.text(name));
        match value_after_equals(node) {
            Some(value) => Ok(declarator
                .with_child(syntax(SyntaxKind::EqualsValue).with_child(self.expression(value)?))),
            None => Ok(declarator),
        }
    }

    fn method(&mut self, node: Node<'_>) -> Step<SyntaxNode> {
        if first_named(node, "explicit_interface_specifier").is_some() {
            return Err(Fallback::Verbatim);
        }
        let name = self.field_text(node, "name")?;
        let mut children = self.prefix(node)?;
        children.push(type_ref(self.compact(required(node, "returns")?)));
        if let Some(parameters) = node.child_by_field_name("type_parameters") {
            children.push(self.type_parameter_list(parameters));
        }
        children.push(self.parameter_list(required(node, "parameters")?)?);
        for clause in named_children(node) {
            if clause.kind() == "type_parameter_constraints_clause" {
                children.push(self.constraint_clause(clause));
            }
        }
        children.extend(self.function_body(node)?);
        Ok(leaf(SyntaxKind::MethodDeclaration, name).with_children(children))
    }

    fn constructor(&mut self, node: Node<'_>) -> Step<SyntaxNode> {
        let name = self.field_text(node, "name")?;
        let mut children = self.prefix(node)?;
        children.push(self.parameter_list(required(node, "parameters")?)?);
        if let Some(initializer) = first_named(node, "constructor_initializer") {
            let keyword = if has_token(initializer, "base") { "base" } else { "this" };
            let arguments = first_named(initializer, "argument_list").ok_or(Fallback::Verbatim)?;
            children.push(
                leaf(SyntaxKind::ConstructorInitializer, keyword)
                    .with_child(self.arguments(arguments, SyntaxKind::ArgumentList)?),
            );
        }
        children.extend(self.function_body(node)?);
        Ok(leaf(SyntaxKind::ConstructorDeclaration, name).with_children(children))
    }

    fn function_body(&mut self, node: Node<'_>) -> Step<Option<SyntaxNode>> {
        match node.child_by_field_name("body") {
            Some(body) if body.kind() == "block" => Ok(Some(self.block(body)?)),
            Some(arrow) => Ok(Some(self.arrow(arrow)?)),
            None => Ok(None),
        }
    }

    fn arrow(&mut self, node: Node<'_>) -> Step<SyntaxNode> {
        let value = operand(node).ok_or(Fallback::Verbatim)?;
        Ok(syntax(SyntaxKind::ArrowExpressionClause).with_child(self.expression(value)?))
    }

    fn property(&mut self, node: Node<'_>) -> Step<SyntaxNode> {
        if first_named(node, "explicit_interface_specifier").is_some() {
            return Err(Fallback::Verbatim);
        }
        let name = self.field_text(node, "name")?;
        let mut children = self.prefix(node)?;
        children.push(type_ref(self.compact(required(node, "type")?)));
        let value = node.child_by_field_name("value");
        if let Some(accessors) = node.child_by_field_name("accessors") {
            let (list, _) = self.braced_items(accessors, Self::accessor)?;
            children.push(syntax(SyntaxKind::AccessorList).with_children(list));
            if let Some(initializer) = value {
                children.push(
                    syntax(SyntaxKind::EqualsValue).with_child(self.expression(initializer)?),
                );
            }
        } else {
            children.push(self.arrow(value.ok_or(Fallback::Verbatim)?)?);
        }
        Ok(leaf(SyntaxKind::PropertyDeclaration, name).with_children(children))
    }

    fn accessor(&mut self, node: Node<'_>) -> Step<SyntaxNode> {
        let keyword = self.field_text(node, "name")?;
        let mut children = self.prefix(node)?;
        children.extend(self.function_body(node)?);
        Ok(leaf(SyntaxKind::Accessor, keyword).with_children(children))
    }

    fn parameter_list(&mut self, node: Node<'_>) -> Step<SyntaxNode> {
        let mut list = syntax(SyntaxKind::ParameterList);
        let mut attributes = Vec::new();
        let mut array_type = None;
        for (field, child) in field_children(node) {
            match (field, child.kind()) {
                (_, "parameter") => list = list.with_child(self.parameter(child)?),
                (_, "attribute_list") => attributes.push(self.attribute_list(child)?),
                (_, kind) if kind.starts_with("preproc") => return Err(Fallback::Verbatim),
                (Some("type"), _) => array_type = Some(self.compact(child)),
                (Some("name"), _) => {
                    let mut children = std::mem::take(&mut attributes);
                    children.push(leaf(SyntaxKind::Modifier, "params"));
                    children.push(type_ref(array_type.take().unwrap_or_default()));
                    list = list.with_child(
                        leaf(SyntaxKind::Parameter, self.text(child)).with_children(children),
                    );
                }
                _ => {}
            }
        }
        Ok(list)
    }

    fn parameter(&mut self, node: Node<'_>) -> Step<SyntaxNode> {
        let name = self.field_text(node, "name")?;
        let mut children = self.prefix(node)?;
        if let Some(declared) = node.child_by_field_name("type") {
            children.push(type_ref(self.compact(declared)));
        }
        if let Some(value) = value_after_equals(node) {
            children.push(syntax(SyntaxKind::EqualsValue).with_child(self.expression(value)?));
        }
        Ok(leaf(SyntaxKind::Parameter, name).with_children(children))
    }

    // ---------------------------------------------------------------------
    // Statements
    // ---------------------------------------------------------------------

    fn block(&mut self, node: Node<'_>) -> Converted {
        let (statements, trailing) = self.braced_items(node, Self::statement)?;
        Ok(syntax(SyntaxKind::Block)
            .with_children(statements)
            .with_trivia(Trivia {
                trailing,
                ..Trivia::default()
            }))
    }

    fn statement(&mut self, node: Node<'_>) -> Converted {
        self.nested(node, |this| match this.statement_kind(node) {
            Ok(statement) => Ok(statement),
            Err(Fallback::Verbatim) => this.verbatim(node, true),
            Err(Fallback::Error(error)) => Err(error),
        })
    }

    fn optional_operand(&mut self, node: Node<'_>, kind: SyntaxKind) -> Step<SyntaxNode> {
        match operand(node) {
            Some(value) => Ok(syntax(kind).with_child(self.expression(value)?)),
            None => Ok(syntax(kind)),
        }
    }

    fn statement_kind(&mut self, node: Node<'_>) -> Step<SyntaxNode> {
        match node.kind() {
            "block" => Ok(self.block(node)?),
            "empty_statement" => Ok(syntax(SyntaxKind::EmptyStatement)),
            "expression_statement" => {
                let value = operand(node).ok_or(Fallback::Verbatim)?;
                Ok(syntax(SyntaxKind::ExpressionStatement).with_child(self.expression(value)?))
            }
            "local_declaration_statement" => self.local_declaration(node),
            "if_statement" => {
                let mut statement = syntax(SyntaxKind::IfStatement).with_children(vec![
                    self.expression(required(node, "condition")?)?,
                    self.statement(required(node, "consequence")?)?,
                ]);
                if let Some(alternative) = node.child_by_field_name("alternative") {
                    statement = statement.with_child(
                        syntax(SyntaxKind::ElseClause).with_child(self.statement(alternative)?),
                    );
                }
                Ok(statement)
            }
            "for_statement" => self.for_statement(node),
            "foreach_statement" => self.foreach_statement(node),
            "while_statement" => Ok(syntax(SyntaxKind::WhileStatement).with_children(vec![
                self.expression(required(node, "condition")?)?,
                self.statement(required(node, "body")?)?,
            ])),
            "do_statement" => Ok(syntax(SyntaxKind::DoStatement).with_children(vec![
                self.statement(required(node, "body")?)?,
                self.expression(required(node, "condition")?)?,
            ])),
            "lock_statement" => {
                let parts = named_children(node);
                let (Some(target), Some(body)) = (parts.first(), parts.last()) else {
                    return Err(Fallback::Verbatim);
                };
                Ok(syntax(SyntaxKind::LockStatement)
                    .with_children(vec![self.expression(*target)?, self.statement(*body)?]))
            }
            "using_statement" => self.using_statement(node),
            "return_statement" => self.optional_operand(node, SyntaxKind::ReturnStatement),
            "throw_statement" => self.optional_operand(node, SyntaxKind::ThrowStatement),
            "yield_statement" if has_token(node, "return") => Ok(self
                .optional_operand(node, SyntaxKind::ReturnStatement)?
                .with_token("yield")),
            "yield_statement" => Ok(leaf(SyntaxKind::BreakStatement, "yield")),
            "break_statement" => Ok(syntax(SyntaxKind::BreakStatement)),
            "continue_statement" => Ok(syntax(SyntaxKind::ContinueStatement)),
            "switch_statement" => self.switch_statement(node),
            "try_statement" => self.try_statement(node),
            _ => Err(Fallback::Verbatim),
        }
    }

    fn local_declaration(&mut self, node: Node<'_>) -> Step<SyntaxNode> {
        if has_token(node, "await") {
            return Err(Fallback::Verbatim);
        }
        let mut children = Vec::new();
        if has_token(node, "using") {
            children.push(leaf(SyntaxKind::Modifier, "using"));
        }
        for child in named_children(node) {
            match child.kind() {
                "modifier" => children.push(leaf(SyntaxKind::Modifier, self.text(child))),
                "variable_declaration" => children.extend(self.variable_declaration(child)?),
                _ => {}
            }
        }
        Ok(syntax(SyntaxKind::LocalDeclaration).with_children(children))
    }

    fn for_statement(&mut self, node: Node<'_>) -> Step<SyntaxNode> {
        let mut cursor = node.walk();
        let initializers: Vec<Node<'_>> = node
            .children_by_field_name("initializer", &mut cursor)
            .filter(|child| is_operand(*child))
            .collect();
        let updates: Vec<Node<'_>> = node
            .children_by_field_name("update", &mut cursor)
            .filter(|child| is_operand(*child))
            .collect();
        let mut initializer = syntax(SyntaxKind::ForInitializer);
        for part in initializers {
            initializer = if part.kind() == "variable_declaration" {
                initializer.with_child(
                    syntax(SyntaxKind::LocalDeclaration)
                        .with_children(self.variable_declaration(part)?),
                )
            } else {
                initializer.with_child(self.expression(part)?)
            };
        }
        let mut condition = syntax(SyntaxKind::ForCondition);
        if let Some(test) = node.child_by_field_name("condition") {
            condition = condition.with_child(self.expression(test)?);
        }
        let mut incrementor = syntax(SyntaxKind::ForIncrementor);
        for update in updates {
            incrementor = incrementor.with_child(self.expression(update)?);
        }
        let body = self.statement(required(node, "body")?)?;
        Ok(syntax(SyntaxKind::ForStatement).with_children(vec![
            initializer,
            condition,
            incrementor,
            body,
        ]))
    }

    fn foreach_statement(&mut self, node: Node<'_>) -> Step<SyntaxNode> {
        let variable = required(node, "left")?;
        if has_token(node, "await") || variable.kind() != "identifier" {
            return Err(Fallback::Verbatim);
        }
        let element_type = self.compact(required(node, "type")?);
        Ok(syntax(SyntaxKind::ForEachStatement).with_children(vec![
            type_ref(element_type),
            leaf(SyntaxKind::VariableDeclarator, self.text(variable)),
            self.expression(required(node, "right")?)?,
            self.statement(required(node, "body")?)?,
        ]))
    }

    fn using_statement(&mut self, node: Node<'_>) -> Step<SyntaxNode> {
        if has_token(node, "await") {
            return Err(Fallback::Verbatim);
        }
        let body = required(node, "body")?;
        let resource = named_children(node)
            .into_iter()
            .find(|child| *child != body)
            .ok_or(Fallback::Verbatim)?;
        let resource = if resource.kind() == "variable_declaration" {
            syntax(SyntaxKind::LocalDeclaration).with_children(self.variable_declaration(resource)?)
        } else {
            self.expression(resource)?
        };
        Ok(syntax(SyntaxKind::UsingStatement).with_children(vec![resource, self.statement(body)?]))
    }

    fn switch_statement(&mut self, node: Node<'_>) -> Step<SyntaxNode> {
        let subject = self.expression(required(node, "value")?)?;
        let body = required(node, "body")?;
        let (sections, trailing) = self.braced_items(body, Self::switch_section)?;
        let mut children = vec![subject];
        children.extend(sections);
        Ok(syntax(SyntaxKind::SwitchStatement)
            .with_children(children)
            .with_trivia(Trivia {
                trailing,
                ..Trivia::default()
            }))
    }

    fn switch_section(&mut self, node: Node<'_>) -> Step<SyntaxNode> {
        let parts = code_children(node);
        let colon = parts
            .iter()
            .position(|part| part.kind() == ":" && !part.is_named())
            .ok_or(Fallback::Verbatim)?;
        let (label, rest) = parts.split_at(colon);
        let label_nodes: Vec<Node<'_>> = label.iter().copied().filter(Node::is_named).collect();
        let label = if has_token(node, "default") && label_nodes.is_empty() {
            syntax(SyntaxKind::DefaultLabel)
        } else {
            syntax(SyntaxKind::CaseLabel).with_child(self.case_value(node, &label_nodes)?)
        };
        let statements: Vec<Node<'_>> = rest.iter().copied().filter(Node::is_named).collect();
        let start = rest.first().map_or(node.end_byte(), Node::end_byte);
        let (converted, _) = self.items(&statements, start, node.end_byte(), Self::statement)?;
        let mut children = vec![label];
        children.extend(converted);
        Ok(syntax(SyntaxKind::SwitchSection).with_children(children))
    }

    /// The value of a `case` label. Patterns and guards are kept as written;
    /// variables they declare stay visible in the section.
    fn case_value(&mut self, section: Node<'_>, label: &[Node<'_>]) -> Step<SyntaxNode> {
        match label {
            [value] if is_expression(value.kind()) => Ok(self.expression(*value)?),
            [first, ..] => {
                let end = label.last().map_or(first.end_byte(), Node::end_byte);
                let roots = label
                    .iter()
                    .rev()
                    .map(|node| Pending {
                        node: *node,
                        parent: section,
                        field: None,
                        scoped: false,
                    })
                    .collect();
                Ok(self.verbatim_span(first.start_byte(), end, roots, true)?)
            }
            [] => Err(Fallback::Verbatim),
        }
    }

    fn try_statement(&mut self, node: Node<'_>) -> Step<SyntaxNode> {
        let mut statement = syntax(SyntaxKind::TryStatement).with_child(self.block(required(node, "body")?)?);
        for part in named_children(node) {
            match part.kind() {
                "catch_clause" => statement = statement.with_child(self.catch_clause(part)?),
                "finally_clause" => {
                    let body = first_named(part, "block").ok_or(Fallback::Verbatim)?;
                    statement = statement
                        .with_child(syntax(SyntaxKind::FinallyClause).with_child(self.block(body)?));
                }
                _ => {}
            }
        }
        Ok(statement)
    }

    fn catch_clause(&mut self, node: Node<'_>) -> Step<SyntaxNode> {
        if first_named(node, "catch_filter_clause").is_some() {
            return Err(Fallback::Verbatim);
        }
        let mut clause = syntax(SyntaxKind::CatchClause);
        if let Some(declaration) = first_named(node, "catch_declaration") {
            let name = declaration
                .child_by_field_name("name")
                .map(|name| self.text(name).to_owned());
            let caught = type_ref(self.compact(required(declaration, "type")?));
            clause = clause.with_child(
                syntax(SyntaxKind::CatchDeclaration)
                    .with_optional_token(name)
                    .with_child(caught),
            );
        }
        Ok(clause.with_child(self.block(required(node, "body")?)?))
    }

    // ---------------------------------------------------------------------
    // Expressions
    // ---------------------------------------------------------------------

    fn expression(&mut self, node: Node<'_>) -> Converted {
        self.nested(node, |this| match this.expression_kind(node) {
            Ok(expression) => Ok(expression),
            Err(Fallback::Verbatim) => this.verbatim(node, true),
            Err(Fallback::Error(error)) => Err(error),
        })
    }

    fn expression_kind(&mut self, node: Node<'_>) -> Step<SyntaxNode> {
        let kind = node.kind();
        if is_literal(kind) {
            return Ok(leaf(SyntaxKind::Literal, self.text(node)));
        }
        match kind {
            "identifier" | "predefined_type" => Ok(leaf(SyntaxKind::IdentifierName, self.text(node))),
            "generic_name" => {
                let (name, arguments) = self.simple_name(node)?;
                Ok(leaf(SyntaxKind::IdentifierName, name).with_children(arguments.into_iter().collect()))
            }
            "alias_qualified_name" => {
                let alias = self.field_text(node, "alias")?;
                let (name, arguments) = self.simple_name(required(node, "name")?)?;
                Ok(leaf(SyntaxKind::IdentifierName, format!("{alias}::{name}"))
                    .with_children(arguments.into_iter().collect()))
            }
            "qualified_name" => self.member_access(node, "qualifier"),
            "member_access_expression" if !has_token(node, "->") => {
                self.member_access(node, "expression")
            }
            "this" => Ok(syntax(SyntaxKind::ThisExpression)),
            "base" => Ok(syntax(SyntaxKind::BaseExpression)),
            "conditional_access_expression" => self.conditional_access(node),
            "invocation_expression" => Ok(syntax(SyntaxKind::Invocation).with_children(vec![
                self.expression(required(node, "function")?)?,
                self.arguments(required(node, "arguments")?, SyntaxKind::ArgumentList)?,
            ])),
            "element_access_expression" => Ok(syntax(SyntaxKind::ElementAccess).with_children(vec![
                self.expression(required(node, "expression")?)?,
                self.arguments(required(node, "subscript")?, SyntaxKind::BracketedArgumentList)?,
            ])),
            "object_creation_expression" | "implicit_object_creation_expression" => {
                self.object_creation(node)
            }
            "array_creation_expression" => self.array_creation(node),
            "implicit_array_creation_expression" => {
                if has_token(node, ",") {
                    return Err(Fallback::Verbatim);
                }
                let initializer = first_named(node, "initializer_expression").ok_or(Fallback::Verbatim)?;
                Ok(syntax(SyntaxKind::ArrayCreation).with_children(vec![
                    syntax(SyntaxKind::BracketedArgumentList),
                    self.initializer(initializer)?,
                ]))
            }
            "initializer_expression" => self.initializer(node),
            "binary_expression" => self.operation(node, SyntaxKind::Binary),
            "assignment_expression" => self.operation(node, SyntaxKind::Assignment),
            "prefix_unary_expression" | "postfix_unary_expression" => self.unary(node),
            "await_expression" => {
                let value = operand(node).ok_or(Fallback::Verbatim)?;
                Ok(leaf(SyntaxKind::PrefixUnary, "await").with_child(self.expression(value)?))
            }
            "conditional_expression" => Ok(syntax(SyntaxKind::Conditional).with_children(vec![
                self.expression(required(node, "condition")?)?,
                self.expression(required(node, "consequence")?)?,
                self.expression(required(node, "alternative")?)?,
            ])),
            "parenthesized_expression" => {
                let value = operand(node).ok_or(Fallback::Verbatim)?;
                Ok(syntax(SyntaxKind::Parenthesized).with_child(self.expression(value)?))
            }
            "cast_expression" => Ok(syntax(SyntaxKind::Cast).with_children(vec![
                type_ref(self.compact(required(node, "type")?)),
                self.expression(required(node, "value")?)?,
            ])),
            "as_expression" | "is_expression" => {
                let operator = if kind == "as_expression" { "as" } else { "is" };
                Ok(leaf(SyntaxKind::Binary, operator).with_children(vec![
                    self.expression(required(node, "left")?)?,
                    type_ref(self.compact(required(node, "right")?)),
                ]))
            }
            "is_pattern_expression" => self.is_pattern(node),
            "lambda_expression" => self.lambda(node),
            "typeof_expression" | "sizeof_expression" => {
                let keyword = if kind == "typeof_expression" { "typeof" } else { "sizeof" };
                Ok(leaf(SyntaxKind::TypeOfExpression, keyword)
                    .with_child(type_ref(self.compact(required(node, "type")?))))
            }
            "default_expression" => match node.child_by_field_name("type") {
                Some(declared) => Ok(syntax(SyntaxKind::DefaultExpression)
                    .with_child(type_ref(self.compact(declared)))),
                None => Ok(leaf(SyntaxKind::Literal, "default")),
            },
            "interpolated_string_expression" => self.interpolated_string(node),
            _ => Err(Fallback::Verbatim),
        }
    }

    /// Name and type arguments of an identifier or generic name.
    fn simple_name(&self, node: Node<'_>) -> Step<(String, Option<SyntaxNode>)> {
        if node.kind() != "generic_name" {
            return Ok((self.text(node).to_owned(), None));
        }
        let name = first_named(node, "identifier").ok_or(Fallback::Verbatim)?;
        let arguments = first_named(node, "type_argument_list").map(|list| {
            let types: Vec<String> = named_children(list)
                .into_iter()
                .map(|argument| self.compact(argument))
                .collect();
            leaf(SyntaxKind::TypeArgumentList, types.join(", "))
        });
        Ok((self.text(name).to_owned(), arguments))
    }

    fn member_access(&mut self, node: Node<'_>, target_field: &str) -> Step<SyntaxNode> {
        let target = self.expression(required(node, target_field)?)?;
        let (name, arguments) = self.simple_name(required(node, "name")?)?;
        let mut access = leaf(SyntaxKind::MemberAccess, name).with_child(target);
        if let Some(arguments) = arguments {
            access = access.with_child(arguments);
        }
        Ok(access)
    }

    fn conditional_access(&mut self, node: Node<'_>) -> Step<SyntaxNode> {
        let binding = first_named(node, "member_binding_expression").ok_or(Fallback::Verbatim)?;
        let target = self.expression(required(node, "condition")?)?;
        let (name, arguments) = self.simple_name(required(binding, "name")?)?;
        let mut access = leaf(SyntaxKind::ConditionalAccess, name).with_child(target);
        if let Some(arguments) = arguments {
            access = access.with_child(arguments);
        }
        Ok(access)
    }

    fn arguments(&mut self, node: Node<'_>, kind: SyntaxKind) -> Step<SyntaxNode> {
        let mut list = syntax(kind);
        for argument in named_children(node) {
            if argument.kind() == "argument" {
                list = list.with_child(self.argument(argument)?);
            }
        }
        Ok(list)
    }

    fn argument(&mut self, node: Node<'_>) -> Step<SyntaxNode> {
        let mut label = None;
        let mut keyword = None;
        let mut value = None;
        for (field, child) in field_children(node) {
            match (field, child.kind()) {
                (Some("name"), _) => label = Some(self.text(child)),
                (_, "ref" | "out" | "in") if !child.is_named() => keyword = Some(child.kind()),
                _ if is_operand(child) => value = Some(child),
                _ => {}
            }
        }
        let token = match (label, keyword) {
            (Some(name), Some(keyword)) => Some(format!("{name}: {keyword}")),
            (Some(name), None) => Some(format!("{name}:")),
            (None, keyword) => keyword.map(str::to_owned),
        };
        let value = value.ok_or(Fallback::Verbatim)?;
        let children = if value.kind() == "declaration_expression" {
            let name = required(value, "name")?;
            vec![
                type_ref(self.compact(required(value, "type")?)),
                leaf(SyntaxKind::VariableDeclarator, self.text(name)),
            ]
        } else {
            vec![self.expression(value)?]
        };
        Ok(syntax(SyntaxKind::Argument)
            .with_optional_token(token)
            .with_children(children))
    }

    fn object_creation(&mut self, node: Node<'_>) -> Step<SyntaxNode> {
        let mut creation = syntax(SyntaxKind::ObjectCreation);
        if let Some(created) = node.child_by_field_name("type") {
            creation = creation.with_child(type_ref(self.compact(created)));
        }
        if let Some(arguments) = first_named(node, "argument_list") {
            creation = creation.with_child(self.arguments(arguments, SyntaxKind::ArgumentList)?);
        }
        if let Some(initializer) = first_named(node, "initializer_expression") {
            creation = creation.with_child(self.initializer(initializer)?);
        }
        Ok(creation)
    }

    fn array_creation(&mut self, node: Node<'_>) -> Step<SyntaxNode> {
        let array = required(node, "type")?;
        let element = required(array, "type")?;
        let rank = required(array, "rank")?;
        if element.kind() == "array_type" {
            return Err(Fallback::Verbatim);
        }
        let sizes = named_children(rank);
        if sizes.is_empty() && has_token(rank, ",") {
            return Err(Fallback::Verbatim);
        }
        let mut bounds = syntax(SyntaxKind::BracketedArgumentList);
        for size in sizes {
            bounds = bounds.with_child(syntax(SyntaxKind::Argument).with_child(self.expression(size)?));
        }
        let mut creation = syntax(SyntaxKind::ArrayCreation)
            .with_children(vec![type_ref(self.compact(element)), bounds]);
        if let Some(initializer) = first_named(node, "initializer_expression") {
            creation = creation.with_child(self.initializer(initializer)?);
        }
        Ok(creation)
    }

    fn initializer(&mut self, node: Node<'_>) -> Step<SyntaxNode> {
        let mut list = syntax(SyntaxKind::ArrayInitializer);
        for element in code_children(node) {
            if is_operand(element) {
                list = list.with_child(self.expression(element)?);
            }
        }
        Ok(list)
    }

    fn operation(&mut self, node: Node<'_>, kind: SyntaxKind) -> Step<SyntaxNode> {
        let operator = self.text(required(node, "operator")?);
        Ok(leaf(kind, operator).with_children(vec![
            self.expression(required(node, "left")?)?,
            self.expression(required(node, "right")?)?,
        ]))
    }

    fn unary(&mut self, node: Node<'_>) -> Step<SyntaxNode> {
        let parts = code_children(node);
        let value = parts
            .iter()
            .copied()
            .find(|part| is_operand(*part))
            .ok_or(Fallback::Verbatim)?;
        let operator = parts
            .iter()
            .find(|part| !is_operand(**part))
            .map(|part| self.text(*part))
            .ok_or(Fallback::Verbatim)?;
        let kind = if node.kind() == "prefix_unary_expression" {
            SyntaxKind::PrefixUnary
        } else {
            SyntaxKind::PostfixUnary
        };
        Ok(leaf(kind, operator).with_child(self.expression(value)?))
    }

    /// `is` tests against a constant or a type. Other patterns are kept as
    /// written.
    fn is_pattern(&mut self, node: Node<'_>) -> Step<SyntaxNode> {
        let subject = required(node, "expression")?;
        let mut pattern = required(node, "pattern")?;
        let mut operator = "is";
        if pattern.kind() == "negated_pattern" {
            pattern = named_children(pattern)
                .into_iter()
                .next()
                .ok_or(Fallback::Verbatim)?;
            operator = "is not";
        }
        let tested = match pattern.kind() {
            "constant_pattern" => self.expression(operand(pattern).ok_or(Fallback::Verbatim)?)?,
            "type_pattern" => type_ref(self.compact(required(pattern, "type")?)),
            _ => return Err(Fallback::Verbatim),
        };
        Ok(leaf(SyntaxKind::Binary, operator)
            .with_children(vec![self.expression(subject)?, tested]))
    }

    fn lambda(&mut self, node: Node<'_>) -> Step<SyntaxNode> {
        let parts = named_children(node);
        let decorated = parts
            .iter()
            .any(|part| part.kind() == "attribute_list" || part.kind().starts_with("preproc"));
        if decorated || node.child_by_field_name("type").is_some() {
            return Err(Fallback::Verbatim);
        }
        let mut children: Vec<SyntaxNode> = parts
            .iter()
            .filter(|part| part.kind() == "modifier")
            .map(|part| leaf(SyntaxKind::Modifier, self.text(*part)))
            .collect();
        let parameters = required(node, "parameters")?;
        children.push(if parameters.kind() == "implicit_parameter" {
            syntax(SyntaxKind::ParameterList)
                .with_child(leaf(SyntaxKind::Parameter, self.text(parameters)))
        } else {
            self.parameter_list(parameters)?
        });
        let body = required(node, "body")?;
        children.push(if body.kind() == "block" {
            self.block(body)?
        } else {
            self.expression(body)?
        });
        Ok(syntax(SyntaxKind::Lambda).with_children(children))
    }

    /// Splits an interpolated string into its text runs and holes. The token
    /// holds the opening delimiter, from which the printer derives the
    /// closing quotes and the hole braces.
    fn interpolated_string(&mut self, node: Node<'_>) -> Step<SyntaxNode> {
        let parts = code_children(node);
        let (Some(quote), Some(closing)) = (parts.get(1), parts.last()) else {
            return Err(Fallback::Verbatim);
        };
        let mut result = leaf(
            SyntaxKind::InterpolatedString,
            self.slice(node.start_byte(), quote.end_byte()),
        );
        let mut text_start = quote.end_byte();
        for part in parts.iter().skip(2) {
            if part.kind() != "interpolation" {
                continue;
            }
            let pieces = code_children(*part);
            let value = pieces
                .iter()
                .copied()
                .find(|piece| {
                    is_operand(*piece)
                        && !matches!(
                            piece.kind(),
                            "interpolation_brace"
                                | "interpolation_alignment_clause"
                                | "interpolation_format_clause"
                        )
                })
                .ok_or(Fallback::Verbatim)?;
            let close = pieces
                .iter()
                .rev()
                .find(|piece| piece.kind() == "interpolation_brace")
                .map_or(part.end_byte(), Node::start_byte);
            if text_start < part.start_byte() {
                result = result.with_child(leaf(
                    SyntaxKind::InterpolatedText,
                    self.slice(text_start, part.start_byte()),
                ));
            }
            let suffix = self.slice(value.end_byte(), close);
            let hole = syntax(SyntaxKind::Interpolation).with_child(self.expression(value)?);
            result = result.with_child(if suffix.is_empty() {
                hole
            } else {
                hole.with_token(suffix)
            });
            text_start = part.end_byte();
        }
        if text_start < closing.start_byte() {
            result = result.with_child(leaf(
                SyntaxKind::InterpolatedText,
                self.slice(text_start, closing.start_byte()),
            ));
        }
        Ok(result)
    }
}

/// Whether a child inside a verbatim construct stays plain text: types,
/// declared member names, labels and preprocessor conditions.
fn is_text(node: Node<'_>, parent: Node<'_>, field: Option<&str>) -> bool {
    if matches!(
        field,
        Some("type" | "returns" | "name" | "operator" | "alias" | "qualifier")
    ) {
        return true;
    }
    if field == Some("condition") && parent.kind().starts_with("preproc") {
        return true;
    }
    if TYPE_KINDS.contains(&node.kind()) {
        return true;
    }
    let labelled = || {
        node.kind() == "identifier"
            && node
                .next_sibling()
                .is_some_and(|next| matches!(next.kind(), ":" | "="))
    };
    match parent.kind() {
        "goto_statement" => true,
        "labeled_statement" => node.kind() == "identifier",
        "subpattern" | "with_initializer" | "anonymous_object_creation_expression" => labelled(),
        _ => false,
    }
}
