//! Layout printer.
//!
//! [`Formatter`] renders a [`SyntaxTree`] as source text in Allman style:
//! every brace on its own line, one statement per line, canonical spacing
//! inside expressions. Comments, directives and blank lines recorded as
//! trivia are reproduced, so `parse(render(tree))` renders identically.

use crate::node::{SyntaxKind, SyntaxNode, Trivia};
use crate::tree::SyntaxTree;

/// Layout settings for [`Formatter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutOptions {
    /// Spaces per indentation level.
    pub indent_width: usize,
    /// Line terminator written between lines.
    pub newline: String,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            indent_width: 4,
            newline: "\n".to_owned(),
        }
    }
}

/// Renders syntax trees to source text.
#[derive(Debug, Clone, Default)]
pub struct Formatter {
    options: LayoutOptions,
}

impl Formatter {
    /// Creates a formatter with the given layout.
    #[must_use]
    pub const fn new(options: LayoutOptions) -> Self {
        Self { options }
    }

    /// Layout in use.
    #[must_use]
    pub const fn options(&self) -> &LayoutOptions {
        &self.options
    }

    /// Renders `tree` as source text.
    #[must_use]
    pub fn apply_layout(&self, tree: &SyntaxTree) -> String {
        let mut printer = Printer::new(self.options.indent_width, 0);
        printer.compilation_unit(tree.root());
        if self.options.newline == "\n" {
            printer.out
        } else {
            printer.out.replace('\n', &self.options.newline)
        }
    }
}

struct Printer {
    out: String,
    indent: usize,
    width: usize,
}

fn children(node: &SyntaxNode, kind: SyntaxKind) -> impl Iterator<Item = &SyntaxNode> {
    node.children_of_kind(kind)
}

fn token(node: &SyntaxNode) -> &str {
    node.token().unwrap_or_default()
}

/// Returns whether `child` prints as a member of `container`. Attribute
/// lists are members only at namespace level; on a type they decorate it.
fn is_member(container: SyntaxKind, child: SyntaxKind) -> bool {
    match child {
        SyntaxKind::AttributeList => !container.is_type_declaration(),
        SyntaxKind::FieldDeclaration
        | SyntaxKind::EnumMember
        | SyntaxKind::NamespaceDeclaration
        | SyntaxKind::FileScopedNamespaceDeclaration
        | SyntaxKind::UsingDirective
        | SyntaxKind::Verbatim => true,
        kind => kind.is_type_declaration() || kind.is_member_declaration(),
    }
}

impl Printer {
    fn new(width: usize, indent: usize) -> Self {
        Self {
            out: String::new(),
            indent,
            width,
        }
    }

    fn pad(&self) -> String {
        " ".repeat(self.indent * self.width)
    }

    fn line(&mut self, text: &str) {
        let pad = self.pad();
        self.out.push_str(&pad);
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    fn comments(&mut self, comments: &[String]) {
        for comment in comments {
            if comment.starts_with('#') {
                self.out.push_str(comment);
                self.out.push('\n');
            } else {
                self.line(comment);
            }
        }
    }

    fn leading(&mut self, trivia: &Trivia, first: bool) {
        if trivia.blank_line_before && !first {
            self.blank();
        }
        self.comments(&trivia.leading);
    }

    fn end_of_line(&mut self, trivia: &Trivia) {
        if let Some(comment) = &trivia.end_of_line {
            if self.out.ends_with('\n') {
                self.out.pop();
            }
            self.out.push(' ');
            self.out.push_str(comment);
            self.out.push('\n');
        }
    }

    fn nested<F>(&mut self, print: F)
    where
        F: FnOnce(&mut Self),
    {
        self.indent += 1;
        print(self);
        self.indent -= 1;
    }

    // ---------------------------------------------------------------------
    // Declarations
    // ---------------------------------------------------------------------

    fn compilation_unit(&mut self, root: &SyntaxNode) {
        self.members(root, true);
        self.comments(&root.trivia().trailing);
    }

    fn members(&mut self, container: &SyntaxNode, suppress_first_blank: bool) {
        let mut first = suppress_first_blank;
        for child in container.children() {
            if is_member(container.kind(), child.kind()) {
                self.member(child, first);
                first = false;
            }
        }
    }

    fn braced_members(&mut self, container: &SyntaxNode) {
        self.line("{");
        self.nested(|p| {
            p.members(container, true);
            p.comments(&container.trivia().trailing);
        });
        self.line("}");
    }

    fn member(&mut self, member: &SyntaxNode, first: bool) {
        self.leading(member.trivia(), first);
        match member.kind() {
            SyntaxKind::UsingDirective => {
                let global = if member.first_child_of_kind(SyntaxKind::Modifier).is_some() {
                    "global "
                } else {
                    ""
                };
                self.line(&format!("{global}using {};", token(member)));
            }
            SyntaxKind::NamespaceDeclaration => {
                self.line(&format!("namespace {}", token(member)));
                self.braced_members(member);
            }
            SyntaxKind::FileScopedNamespaceDeclaration => {
                self.line(&format!("namespace {};", token(member)));
                self.members(member, false);
            }
            SyntaxKind::AttributeList => {
                let text = self.attribute_list(member);
                self.line(&text);
            }
            SyntaxKind::EnumDeclaration => self.enum_declaration(member),
            kind if kind.is_type_declaration() => self.type_declaration(member),
            SyntaxKind::FieldDeclaration => {
                self.attribute_lines(member);
                let text = format!(
                    "{}{} {};",
                    self.modifier_prefix(member),
                    self.type_text(member),
                    self.declarators(member)
                );
                self.line(&text);
            }
            SyntaxKind::PropertyDeclaration => self.property(member),
            SyntaxKind::MethodDeclaration | SyntaxKind::ConstructorDeclaration => {
                self.method(member);
            }
            SyntaxKind::Verbatim => {
                let text = self.verbatim(member);
                self.line(&text);
            }
            _ => {}
        }
        self.end_of_line(member.trivia());
    }

    fn attribute_list(&self, list: &SyntaxNode) -> String {
        let attributes: Vec<String> = list
            .children()
            .iter()
            .map(|attribute| {
                let arguments = attribute
                    .first_child_of_kind(SyntaxKind::ArgumentList)
                    .map(|args| format!("({})", self.arguments(args)))
                    .unwrap_or_default();
                format!("{}{arguments}", token(attribute))
            })
            .collect();
        let target = list
            .token()
            .map(|target| format!("{target}: "))
            .unwrap_or_default();
        format!("[{target}{}]", attributes.join(", "))
    }

    fn attribute_lines(&mut self, member: &SyntaxNode) {
        for list in children(member, SyntaxKind::AttributeList) {
            let text = self.attribute_list(list);
            self.line(&text);
        }
    }

    fn inline_attributes(&self, node: &SyntaxNode) -> String {
        children(node, SyntaxKind::AttributeList)
            .map(|list| format!("{} ", self.attribute_list(list)))
            .collect()
    }

    fn modifier_prefix(&self, node: &SyntaxNode) -> String {
        children(node, SyntaxKind::Modifier)
            .map(|modifier| format!("{} ", token(modifier)))
            .collect()
    }

    fn type_text<'a>(&self, node: &'a SyntaxNode) -> &'a str {
        node.first_child_of_kind(SyntaxKind::TypeRef)
            .map_or("", token)
    }

    fn type_parameters(node: &SyntaxNode) -> String {
        node.first_child_of_kind(SyntaxKind::TypeParameterList)
            .map(|list| format!("<{}>", token(list)))
            .unwrap_or_default()
    }

    fn constraint_lines(&mut self, node: &SyntaxNode) {
        let clauses: Vec<String> = children(node, SyntaxKind::ConstraintClause)
            .map(|clause| format!("where {}", token(clause)))
            .collect();
        self.nested(|p| {
            for clause in &clauses {
                p.line(clause);
            }
        });
    }

    fn type_declaration(&mut self, declaration: &SyntaxNode) {
        self.attribute_lines(declaration);
        let keyword = match declaration.kind() {
            SyntaxKind::StructDeclaration => "struct",
            SyntaxKind::InterfaceDeclaration => "interface",
            _ => "class",
        };
        let bases = declaration
            .first_child_of_kind(SyntaxKind::BaseList)
            .map(|list| {
                let names: Vec<&str> = list.children().iter().map(token).collect();
                format!(" : {}", names.join(", "))
            })
            .unwrap_or_default();
        let header = format!(
            "{}{keyword} {}{}{bases}",
            self.modifier_prefix(declaration),
            token(declaration),
            Self::type_parameters(declaration),
        );
        self.line(&header);
        self.constraint_lines(declaration);
        self.braced_members(declaration);
    }

    fn enum_declaration(&mut self, declaration: &SyntaxNode) {
        self.attribute_lines(declaration);
        let base = declaration
            .first_child_of_kind(SyntaxKind::BaseList)
            .and_then(|list| list.child(0))
            .map(|base| format!(" : {}", token(base)))
            .unwrap_or_default();
        let header = format!(
            "{}enum {}{base}",
            self.modifier_prefix(declaration),
            token(declaration)
        );
        self.line(&header);
        self.line("{");
        let members: Vec<&SyntaxNode> = children(declaration, SyntaxKind::EnumMember).collect();
        self.nested(|p| {
            for (index, member) in members.iter().enumerate() {
                p.leading(member.trivia(), index == 0);
                let value = member
                    .first_child_of_kind(SyntaxKind::EqualsValue)
                    .and_then(|equals| equals.child(0))
                    .map(|value| format!(" = {}", p.expression(value)))
                    .unwrap_or_default();
                let comma = if index + 1 < members.len() { "," } else { "" };
                let text = format!(
                    "{}{}{value}{comma}",
                    p.inline_attributes(member),
                    token(member)
                );
                p.line(&text);
                p.end_of_line(member.trivia());
            }
            p.comments(&declaration.trivia().trailing);
        });
        self.line("}");
    }

    fn declarators(&self, node: &SyntaxNode) -> String {
        let declarators: Vec<String> = children(node, SyntaxKind::VariableDeclarator)
            .map(|declarator| {
                let value = declarator
                    .first_child_of_kind(SyntaxKind::EqualsValue)
                    .and_then(|equals| equals.child(0))
                    .map(|value| format!(" = {}", self.expression(value)))
                    .unwrap_or_default();
                format!("{}{value}", token(declarator))
            })
            .collect();
        declarators.join(", ")
    }

    fn property(&mut self, property: &SyntaxNode) {
        self.attribute_lines(property);
        let header = format!(
            "{}{} {}",
            self.modifier_prefix(property),
            self.type_text(property),
            token(property)
        );
        if let Some(arrow) = property.first_child_of_kind(SyntaxKind::ArrowExpressionClause) {
            let text = format!("{header} => {};", self.arrow_body(arrow));
            self.line(&text);
            return;
        }
        let Some(accessors) = property.first_child_of_kind(SyntaxKind::AccessorList) else {
            return;
        };
        let initializer = property
            .first_child_of_kind(SyntaxKind::EqualsValue)
            .and_then(|equals| equals.child(0))
            .map(|value| format!(" = {};", self.expression(value)))
            .unwrap_or_default();
        let compact = accessors.children().iter().all(|accessor| {
            accessor.trivia().is_empty() && Self::accessor_body(accessor).is_none()
        });
        if compact {
            let parts: Vec<String> = accessors
                .children()
                .iter()
                .map(|accessor| format!("{}{};", self.modifier_prefix(accessor), token(accessor)))
                .collect();
            let text = format!("{header} {{ {} }}{initializer}", parts.join(" "));
            self.line(&text);
            return;
        }
        self.line(&header);
        self.line("{");
        self.nested(|p| {
            for (index, accessor) in accessors.children().iter().enumerate() {
                p.leading(accessor.trivia(), index == 0);
                p.attribute_lines(accessor);
                let head = format!("{}{}", p.modifier_prefix(accessor), token(accessor));
                match Self::accessor_body(accessor) {
                    Some(body) if body.kind() == SyntaxKind::Block => {
                        p.line(&head);
                        p.block(body);
                    }
                    Some(arrow) => {
                        let text = format!("{head} => {};", p.arrow_body(arrow));
                        p.line(&text);
                    }
                    None => p.line(&format!("{head};")),
                }
                p.end_of_line(accessor.trivia());
            }
        });
        self.line(&format!("}}{initializer}"));
    }

    fn accessor_body(accessor: &SyntaxNode) -> Option<&SyntaxNode> {
        accessor.children().iter().find(|child| {
            matches!(
                child.kind(),
                SyntaxKind::Block | SyntaxKind::ArrowExpressionClause
            )
        })
    }

    fn arrow_body(&self, arrow: &SyntaxNode) -> String {
        arrow
            .child(0)
            .map(|value| self.expression(value))
            .unwrap_or_default()
    }

    fn parameters(&self, list: &SyntaxNode) -> String {
        let parameters: Vec<String> = list
            .children()
            .iter()
            .map(|parameter| {
                let type_text = parameter
                    .first_child_of_kind(SyntaxKind::TypeRef)
                    .map(|type_ref| format!("{} ", token(type_ref)))
                    .unwrap_or_default();
                let default = parameter
                    .first_child_of_kind(SyntaxKind::EqualsValue)
                    .and_then(|equals| equals.child(0))
                    .map(|value| format!(" = {}", self.expression(value)))
                    .unwrap_or_default();
                format!(
                    "{}{}{type_text}{}{default}",
                    self.inline_attributes(parameter),
                    self.modifier_prefix(parameter),
                    token(parameter)
                )
            })
            .collect();
        parameters.join(", ")
    }

    fn method(&mut self, method: &SyntaxNode) {
        self.attribute_lines(method);
        let parameters = method
            .first_child_of_kind(SyntaxKind::ParameterList)
            .map(|list| self.parameters(list))
            .unwrap_or_default();
        let mut header = if method.kind() == SyntaxKind::ConstructorDeclaration {
            format!(
                "{}{}({parameters})",
                self.modifier_prefix(method),
                token(method)
            )
        } else {
            format!(
                "{}{} {}{}({parameters})",
                self.modifier_prefix(method),
                self.type_text(method),
                token(method),
                Self::type_parameters(method)
            )
        };
        if let Some(initializer) = method.first_child_of_kind(SyntaxKind::ConstructorInitializer) {
            let arguments = initializer
                .child(0)
                .map(|args| self.arguments(args))
                .unwrap_or_default();
            header.push_str(&format!(" : {}({arguments})", token(initializer)));
        }
        let has_constraints = method
            .first_child_of_kind(SyntaxKind::ConstraintClause)
            .is_some();
        if let Some(body) = method.first_child_of_kind(SyntaxKind::Block) {
            self.line(&header);
            self.constraint_lines(method);
            self.block(body);
        } else if let Some(arrow) = method.first_child_of_kind(SyntaxKind::ArrowExpressionClause) {
            let body = format!(" => {};", self.arrow_body(arrow));
            if has_constraints {
                self.line(&header);
                self.constraint_lines(method);
                self.nested(|p| p.line(body.trim_start()));
            } else {
                self.line(&format!("{header}{body}"));
            }
        } else if has_constraints {
            self.line(&header);
            self.constraint_lines(method);
            if self.out.ends_with('\n') {
                self.out.pop();
            }
            self.out.push_str(";\n");
        } else {
            self.line(&format!("{header};"));
        }
    }

    // ---------------------------------------------------------------------
    // Statements
    // ---------------------------------------------------------------------

    fn block(&mut self, block: &SyntaxNode) {
        self.line("{");
        self.nested(|p| {
            for (index, statement) in block.children().iter().enumerate() {
                p.statement(statement, index == 0);
            }
            p.comments(&block.trivia().trailing);
        });
        self.line("}");
    }

    /// Prints the body of a control statement: blocks at the current level,
    /// anything else indented one level.
    fn embedded(&mut self, body: &SyntaxNode) {
        if body.kind() == SyntaxKind::Block {
            self.leading(body.trivia(), true);
            self.block(body);
            self.end_of_line(body.trivia());
        } else {
            self.nested(|p| p.statement(body, true));
        }
    }

    fn statement(&mut self, statement: &SyntaxNode, first: bool) {
        self.leading(statement.trivia(), first);
        self.statement_body(statement);
        self.end_of_line(statement.trivia());
    }

    fn child_expression(&self, node: &SyntaxNode, index: usize) -> String {
        node.child(index)
            .map(|child| self.expression(child))
            .unwrap_or_default()
    }

    fn statement_body(&mut self, statement: &SyntaxNode) {
        match statement.kind() {
            SyntaxKind::Block => self.block(statement),
            SyntaxKind::LocalDeclaration => {
                let text = format!("{};", self.local_declaration(statement));
                self.line(&text);
            }
            SyntaxKind::ExpressionStatement => {
                let text = format!("{};", self.child_expression(statement, 0));
                self.line(&text);
            }
            SyntaxKind::ReturnStatement | SyntaxKind::ThrowStatement => {
                let keyword = match (statement.kind(), statement.token()) {
                    (SyntaxKind::ThrowStatement, _) => "throw".to_owned(),
                    (_, Some(prefix)) => format!("{prefix} return"),
                    (_, None) => "return".to_owned(),
                };
                let text = match statement.child(0) {
                    Some(value) => format!("{keyword} {};", self.expression(value)),
                    None => format!("{keyword};"),
                };
                self.line(&text);
            }
            SyntaxKind::BreakStatement => match statement.token() {
                Some(prefix) => self.line(&format!("{prefix} break;")),
                None => self.line("break;"),
            },
            SyntaxKind::ContinueStatement => self.line("continue;"),
            SyntaxKind::EmptyStatement => self.line(";"),
            SyntaxKind::IfStatement => self.if_statement(statement, ""),
            SyntaxKind::ForStatement => self.for_statement(statement),
            SyntaxKind::ForEachStatement => {
                let text = format!(
                    "foreach ({} {} in {})",
                    statement.child(0).map_or("", token),
                    statement.child(1).map_or("", token),
                    self.child_expression(statement, 2)
                );
                self.line(&text);
                if let Some(body) = statement.child(3) {
                    self.embedded(body);
                }
            }
            SyntaxKind::WhileStatement | SyntaxKind::LockStatement => {
                let keyword = if statement.kind() == SyntaxKind::WhileStatement {
                    "while"
                } else {
                    "lock"
                };
                let text = format!("{keyword} ({})", self.child_expression(statement, 0));
                self.line(&text);
                if let Some(body) = statement.child(1) {
                    self.embedded(body);
                }
            }
            SyntaxKind::UsingStatement => {
                let resource = match statement.child(0) {
                    Some(decl) if decl.kind() == SyntaxKind::LocalDeclaration => {
                        self.local_declaration(decl)
                    }
                    Some(expression) => self.expression(expression),
                    None => String::new(),
                };
                self.line(&format!("using ({resource})"));
                if let Some(body) = statement.child(1) {
                    self.embedded(body);
                }
            }
            SyntaxKind::DoStatement => {
                self.line("do");
                if let Some(body) = statement.child(0) {
                    self.embedded(body);
                }
                let text = format!("while ({});", self.child_expression(statement, 1));
                self.line(&text);
            }
            SyntaxKind::SwitchStatement => self.switch_statement(statement),
            SyntaxKind::TryStatement => self.try_statement(statement),
            SyntaxKind::Verbatim => {
                let text = self.verbatim(statement);
                self.line(&text);
            }
            _ => {}
        }
    }

    fn local_declaration(&self, declaration: &SyntaxNode) -> String {
        format!(
            "{}{} {}",
            self.modifier_prefix(declaration),
            self.type_text(declaration),
            self.declarators(declaration)
        )
    }

    fn if_statement(&mut self, statement: &SyntaxNode, prefix: &str) {
        let text = format!("{prefix}if ({})", self.child_expression(statement, 0));
        self.line(&text);
        if let Some(consequence) = statement.child(1) {
            self.embedded(consequence);
        }
        let Some(alternative) = statement
            .first_child_of_kind(SyntaxKind::ElseClause)
            .and_then(|clause| clause.child(0))
        else {
            return;
        };
        let chained = alternative.kind() == SyntaxKind::IfStatement
            && alternative.trivia().leading.is_empty()
            && !alternative.trivia().blank_line_before;
        if chained {
            self.if_statement(alternative, "else ");
            self.end_of_line(alternative.trivia());
        } else {
            self.line("else");
            self.embedded(alternative);
        }
    }

    fn for_statement(&mut self, statement: &SyntaxNode) {
        let initializer = statement
            .child(0)
            .map(|init| {
                init.children()
                    .iter()
                    .map(|part| {
                        if part.kind() == SyntaxKind::LocalDeclaration {
                            self.local_declaration(part)
                        } else {
                            self.expression(part)
                        }
                    })
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_default();
        let condition = statement
            .child(1)
            .and_then(|condition| condition.child(0))
            .map(|condition| format!(" {}", self.expression(condition)))
            .unwrap_or_default();
        let incrementors = statement
            .child(2)
            .map(|inc| {
                inc.children()
                    .iter()
                    .map(|part| self.expression(part))
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .filter(|text| !text.is_empty())
            .map(|text| format!(" {text}"))
            .unwrap_or_default();
        self.line(&format!("for ({initializer};{condition};{incrementors})"));
        if let Some(body) = statement.child(3) {
            self.embedded(body);
        }
    }

    fn switch_statement(&mut self, statement: &SyntaxNode) {
        let text = format!("switch ({})", self.child_expression(statement, 0));
        self.line(&text);
        self.line("{");
        self.nested(|p| {
            for (index, section) in children(statement, SyntaxKind::SwitchSection).enumerate() {
                p.leading(section.trivia(), index == 0);
                let mut first_statement = true;
                for part in section.children() {
                    match part.kind() {
                        SyntaxKind::CaseLabel => {
                            let text = format!("case {}:", p.child_expression(part, 0));
                            p.line(&text);
                        }
                        SyntaxKind::DefaultLabel => p.line("default:"),
                        _ => {
                            p.nested(|q| q.statement(part, first_statement));
                            first_statement = false;
                        }
                    }
                }
                p.end_of_line(section.trivia());
            }
            p.comments(&statement.trivia().trailing);
        });
        self.line("}");
    }

    fn try_statement(&mut self, statement: &SyntaxNode) {
        for part in statement.children() {
            match part.kind() {
                SyntaxKind::Block => {
                    self.line("try");
                    self.block(part);
                }
                SyntaxKind::CatchClause => {
                    let header = part
                        .first_child_of_kind(SyntaxKind::CatchDeclaration)
                        .map(|declaration| {
                            let caught = declaration.child(0).map_or("", token);
                            match declaration.token() {
                                Some(name) => format!("catch ({caught} {name})"),
                                None => format!("catch ({caught})"),
                            }
                        })
                        .unwrap_or_else(|| "catch".to_owned());
                    self.line(&header);
                    if let Some(body) = part.first_child_of_kind(SyntaxKind::Block) {
                        self.block(body);
                    }
                }
                SyntaxKind::FinallyClause => {
                    self.line("finally");
                    if let Some(body) = part.child(0) {
                        self.block(body);
                    }
                }
                _ => {}
            }
        }
    }

    // ---------------------------------------------------------------------
    // Expressions
    // ---------------------------------------------------------------------

    fn arguments(&self, list: &SyntaxNode) -> String {
        let arguments: Vec<String> = list
            .children()
            .iter()
            .map(|argument| {
                let keyword = argument
                    .token()
                    .map(|keyword| format!("{keyword} "))
                    .unwrap_or_default();
                let value = match argument.children() {
                    [declared, variable] => format!("{} {}", token(declared), token(variable)),
                    [value] => self.expression(value),
                    _ => String::new(),
                };
                format!("{keyword}{value}")
            })
            .collect();
        arguments.join(", ")
    }

    fn type_arguments(node: &SyntaxNode) -> String {
        node.first_child_of_kind(SyntaxKind::TypeArgumentList)
            .map(|list| format!("<{}>", token(list)))
            .unwrap_or_default()
    }

    fn initializer(&self, list: &SyntaxNode) -> String {
        if list.children().is_empty() {
            return "{ }".to_owned();
        }
        let elements: Vec<String> = list
            .children()
            .iter()
            .map(|element| self.expression(element))
            .collect();
        format!("{{ {} }}", elements.join(", "))
    }

    #[expect(
        clippy::too_many_lines,
        reason = "one arm per expression kind reads best as a single match"
    )]
    fn expression(&self, expression: &SyntaxNode) -> String {
        let child = |index: usize| self.child_expression(expression, index);
        match expression.kind() {
            SyntaxKind::IdentifierName => {
                format!("{}{}", token(expression), Self::type_arguments(expression))
            }
            SyntaxKind::Literal | SyntaxKind::TypeRef => token(expression).to_owned(),
            SyntaxKind::ThisExpression => "this".to_owned(),
            SyntaxKind::BaseExpression => "base".to_owned(),
            SyntaxKind::MemberAccess | SyntaxKind::ConditionalAccess => {
                let dot = if expression.kind() == SyntaxKind::MemberAccess {
                    "."
                } else {
                    "?."
                };
                format!(
                    "{}{dot}{}{}",
                    child(0),
                    token(expression),
                    Self::type_arguments(expression)
                )
            }
            SyntaxKind::Invocation => {
                let arguments = expression
                    .child(1)
                    .map(|args| self.arguments(args))
                    .unwrap_or_default();
                format!("{}({arguments})", child(0))
            }
            SyntaxKind::ElementAccess => {
                let arguments = expression
                    .child(1)
                    .map(|args| self.arguments(args))
                    .unwrap_or_default();
                format!("{}[{arguments}]", child(0))
            }
            SyntaxKind::ObjectCreation | SyntaxKind::ArrayCreation => {
                let mut text = "new".to_owned();
                for part in expression.children() {
                    match part.kind() {
                        SyntaxKind::TypeRef => {
                            text.push(' ');
                            text.push_str(token(part));
                        }
                        SyntaxKind::ArgumentList => {
                            text.push_str(&format!("({})", self.arguments(part)));
                        }
                        SyntaxKind::BracketedArgumentList => {
                            text.push_str(&format!("[{}]", self.arguments(part)));
                        }
                        SyntaxKind::ArrayInitializer => {
                            text.push(' ');
                            text.push_str(&self.initializer(part));
                        }
                        _ => {}
                    }
                }
                text
            }
            SyntaxKind::ArrayInitializer => self.initializer(expression),
            SyntaxKind::Binary | SyntaxKind::Assignment => {
                format!("{} {} {}", child(0), token(expression), child(1))
            }
            SyntaxKind::PrefixUnary => {
                let operator = token(expression);
                let operand = child(0);
                let spaced = operator == "await"
                    || (matches!(operator, "-" | "+") && operand.starts_with(operator));
                if spaced {
                    format!("{operator} {operand}")
                } else {
                    format!("{operator}{operand}")
                }
            }
            SyntaxKind::PostfixUnary => format!("{}{}", child(0), token(expression)),
            SyntaxKind::Conditional => format!("{} ? {} : {}", child(0), child(1), child(2)),
            SyntaxKind::Parenthesized => format!("({})", child(0)),
            SyntaxKind::Cast => format!(
                "({}){}",
                expression.child(0).map_or("", token),
                child(1)
            ),
            SyntaxKind::TypeOfExpression => format!(
                "{}({})",
                token(expression),
                expression.child(0).map_or("", token)
            ),
            SyntaxKind::DefaultExpression => {
                format!("default({})", expression.child(0).map_or("", token))
            }
            SyntaxKind::Lambda => self.lambda(expression),
            SyntaxKind::InterpolatedString => self.interpolated_string(expression),
            SyntaxKind::Verbatim => self.verbatim(expression),
            SyntaxKind::DesignatedVariable | SyntaxKind::ExpressionVariable => {
                token(expression).to_owned()
            }
            _ => String::new(),
        }
    }

    /// Kept source text with its holes filled in. Lines after the first are
    /// re-indented to the current level.
    fn verbatim(&self, node: &SyntaxNode) -> String {
        let pad = self.pad();
        let mut text = String::new();
        for part in node.children() {
            if part.kind() != SyntaxKind::VerbatimText {
                text.push_str(&self.expression(part));
                continue;
            }
            let mut lines = token(part).split('\n').peekable();
            if let Some(first) = lines.next() {
                text.push_str(first);
            }
            while let Some(line) = lines.next() {
                text.push('\n');
                if !line.is_empty() || lines.peek().is_none() {
                    text.push_str(&pad);
                }
                text.push_str(line);
            }
        }
        text
    }

    /// The token holds the opening delimiter. Raw strings close with as many
    /// quotes as they open with, and their holes use one brace per `$`.
    fn interpolated_string(&self, expression: &SyntaxNode) -> String {
        let opening = token(expression);
        let quotes = opening.chars().rev().take_while(|c| *c == '"').count().max(1);
        let braces = opening.chars().take_while(|c| *c == '$').count().max(1);
        let mut text = opening.to_owned();
        for part in expression.children() {
            if part.kind() == SyntaxKind::Interpolation {
                text.push_str(&"{".repeat(braces));
                text.push_str(&self.child_expression(part, 0));
                text.push_str(token(part));
                text.push_str(&"}".repeat(braces));
            } else {
                text.push_str(token(part));
            }
        }
        text.push_str(&"\"".repeat(quotes));
        text
    }

    fn lambda(&self, lambda: &SyntaxNode) -> String {
        let Some(position) = lambda.position_of_kind(SyntaxKind::ParameterList) else {
            return String::new();
        };
        let parameters = lambda
            .child(position)
            .map(|list| {
                let implicit_single = list.children().len() == 1
                    && list
                        .children()
                        .iter()
                        .all(|parameter| parameter.children().is_empty());
                if implicit_single {
                    self.parameters(list)
                } else {
                    format!("({})", self.parameters(list))
                }
            })
            .map(|list| format!("{}{list}", self.modifier_prefix(lambda)))
            .unwrap_or_default();
        match lambda.child(position + 1) {
            Some(body) if body.kind() == SyntaxKind::Block => {
                let mut nested = Self::new(self.width, self.indent);
                nested.block(body);
                let rendered = nested.out.trim_end_matches('\n').to_owned();
                format!("{parameters} =>\n{rendered}")
            }
            Some(body) => format!("{parameters} => {}", self.expression(body)),
            None => parameters,
        }
    }
}
