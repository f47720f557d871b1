//! Normalized declaration model produced by the parser adapter.
//!
//! Everything downstream of parsing (complexity, dependencies, routes,
//! knowledge) consumes these types and never touches tree-sitter nodes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::scan::Category;

/// Source location of a declaration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Span {
    /// Start line (1-indexed).
    pub start_line: usize,
    /// End line (1-indexed).
    pub end_line: usize,
}

impl Span {
    /// Create a span from a tree-sitter node.
    pub fn from_node(node: tree_sitter::Node) -> Self {
        Self {
            start_line: node.start_position().row + 1, // tree-sitter is 0-indexed
            end_line: node.end_position().row + 1,
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start_line, self.end_line)
    }
}

/// Kind of type declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclarationKind {
    Class,
    Interface,
    Enum,
    Record,
}

impl DeclarationKind {
    /// Convert to a string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeclarationKind::Class => "class",
            DeclarationKind::Interface => "interface",
            DeclarationKind::Enum => "enum",
            DeclarationKind::Record => "record",
        }
    }
}

impl fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A reference to a type as written in a field, parameter, or return position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef {
    /// Simple base name: `List` for `java.util.List<User>`, `User` for `User[]`.
    pub name: String,
    /// Generic type arguments, in source order.
    pub arguments: Vec<TypeRef>,
    /// Array dimensions (`User[][]` has 2).
    pub array_dims: usize,
    /// The type exactly as written in source.
    pub rendered: String,
}

impl TypeRef {
    /// A plain, non-generic, non-array type.
    pub fn simple(name: &str) -> Self {
        Self {
            name: name.to_string(),
            arguments: Vec::new(),
            array_dims: 0,
            rendered: name.to_string(),
        }
    }

    /// Every type name this reference mentions, including generic arguments.
    pub fn referenced_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        let mut stack = vec![self];
        while let Some(t) = stack.pop() {
            if !t.name.is_empty() {
                names.push(t.name.as_str());
            }
            stack.extend(t.arguments.iter());
        }
        names
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.rendered)
    }
}

/// An annotation with its arguments.
///
/// A single unnamed argument (`@GetMapping("/x")`) is stored under `value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// Simple name without `@` or package qualifier.
    pub name: String,
    /// `(key, value)` pairs; string literals are unquoted.
    pub arguments: Vec<(String, String)>,
}

impl Annotation {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            arguments: Vec::new(),
        }
    }

    /// Look up an argument by key.
    pub fn argument(&self, key: &str) -> Option<&str> {
        self.arguments
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// HTTP verb of an inferred route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpVerb {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpVerb {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpVerb::Get => "get",
            HttpVerb::Post => "post",
            HttpVerb::Put => "put",
            HttpVerb::Delete => "delete",
        }
    }
}

impl fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where a route parameter is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindingSource {
    Path,
    Query,
    Body,
}

impl BindingSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            BindingSource::Path => "path",
            BindingSource::Query => "query",
            BindingSource::Body => "body",
        }
    }
}

/// Explicit routing metadata found on a method.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutingHints {
    pub verb: Option<HttpVerb>,
    pub path: Option<String>,
}

/// A field declarator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub type_ref: TypeRef,
}

/// A method parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    /// None when the type could not be read from source.
    pub type_ref: Option<TypeRef>,
    pub annotations: Vec<Annotation>,
    /// Explicit binding marker, if any.
    pub binding: Option<BindingSource>,
    /// `String... args`
    pub variadic: bool,
}

/// A method declaration. Constructors are not represented.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    pub name: String,
    /// Keyword modifiers (`public`, `static`, ...), annotations excluded.
    pub modifiers: Vec<String>,
    pub parameters: Vec<Parameter>,
    /// None for `void`.
    pub return_type: Option<TypeRef>,
    pub annotations: Vec<Annotation>,
    pub routing: RoutingHints,
    /// Lowered body; None for abstract and interface methods.
    pub body: Option<BodyNode>,
    pub span: Span,
}

impl MethodDecl {
    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }
}

/// A top-level type declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub name: String,
    pub kind: DeclarationKind,
    pub modifiers: Vec<String>,
    pub fields: Vec<Field>,
    pub methods: Vec<MethodDecl>,
    pub annotations: Vec<Annotation>,
    /// Class-level request mapping path.
    pub base_path: Option<String>,
    pub span: Span,
}

/// All declarations parsed from one file.
#[derive(Debug, Clone, PartialEq)]
pub struct CompilationUnit {
    /// File path, as given to the parser.
    pub path: String,
    /// Category of the originating source unit.
    pub category: Category,
    pub package: Option<String>,
    pub declarations: Vec<Declaration>,
}

/// Stable identity of a class across the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassKey {
    pub file: String,
    pub name: String,
}

impl ClassKey {
    pub fn new(file: &str, name: &str) -> Self {
        Self {
            file: file.to_string(),
            name: name.to_string(),
        }
    }
}

impl fmt::Display for ClassKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.file, self.name)
    }
}

/// Loop flavours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopKind {
    For,
    ForEach,
    While,
    DoWhile,
}

/// Short-circuit boolean connectives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

/// Closed set of body node kinds.
///
/// Every grammar node inside a method body lowers to exactly one of these,
/// so consumers can match exhaustively instead of probing node names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Block,
    If,
    /// Ternary `a ? b : c`.
    Conditional,
    Loop(LoopKind),
    Switch,
    /// One `case`/`default` group or `case ->` rule.
    SwitchArm,
    Try,
    Catch,
    Logical(LogicalOp),
    Lambda,
    /// Any statement or expression without control-flow weight of its own.
    Other,
}

/// A lowered method-body node. Children are every named child of the
/// grammar node, in source order.
///
/// `Clone`, `PartialEq` and `Drop` walk the tree iteratively; bodies can be
/// tens of thousands of levels deep.
#[derive(Debug)]
pub struct BodyNode {
    pub kind: NodeKind,
    pub children: Vec<BodyNode>,
}

impl BodyNode {
    pub fn new(kind: NodeKind, children: Vec<BodyNode>) -> Self {
        Self { kind, children }
    }

    pub fn leaf(kind: NodeKind) -> Self {
        Self::new(kind, Vec::new())
    }

    /// Pre-order iterator over this node and all descendants.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }
}

impl Clone for BodyNode {
    fn clone(&self) -> Self {
        // Rebuild from reverse pre-order: a node's children are then the
        // topmost entries of `built`, first child on top.
        let order: Vec<&BodyNode> = self.descendants().collect();
        let mut built: Vec<BodyNode> = Vec::with_capacity(order.len());
        for node in order.into_iter().rev() {
            let split = built.len().saturating_sub(node.children.len());
            let children = built.drain(split..).rev().collect();
            built.push(BodyNode::new(node.kind, children));
        }
        built.pop().unwrap_or_else(|| BodyNode::leaf(self.kind))
    }
}

impl PartialEq for BodyNode {
    /// Pre-order kinds plus child counts identify a tree.
    fn eq(&self, other: &Self) -> bool {
        let mut left = self.descendants();
        let mut right = other.descendants();
        loop {
            match (left.next(), right.next()) {
                (None, None) => return true,
                (Some(a), Some(b))
                    if a.kind == b.kind && a.children.len() == b.children.len() => {}
                _ => return false,
            }
        }
    }
}

impl Drop for BodyNode {
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.children);
        while let Some(mut node) = stack.pop() {
            stack.append(&mut node.children);
        }
    }
}

/// Iterator returned by [`BodyNode::descendants`].
pub struct Descendants<'a> {
    stack: Vec<&'a BodyNode>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a BodyNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}
