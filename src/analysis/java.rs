//! Java parser adapter using tree-sitter.
//!
//! Lowers a tree-sitter-java syntax tree into the normalized declaration
//! model. Spring-style routing annotations are resolved here, once, into
//! [`RoutingHints`] and parameter bindings so later stages never inspect
//! annotation names themselves.

use std::path::Path;

use tree_sitter::{Language, Node, Parser};

use crate::analysis::{
    Annotation, BindingSource, BodyNode, CompilationUnit, Declaration, DeclarationKind, Field,
    HttpVerb, LanguageAnalyzer, LogicalOp, LoopKind, MethodDecl, NodeKind, Parameter, ParseError,
    RoutingHints, Span, TypeRef,
};
use crate::scan::Category;

pub struct JavaAnalyzer {
    language: Language,
}

impl JavaAnalyzer {
    pub fn new() -> Self {
        Self {
            language: tree_sitter_java::LANGUAGE.into(),
        }
    }

    fn create_parser(&self) -> Result<Parser, ParseError> {
        let mut parser = Parser::new();
        parser.set_language(&self.language)?;
        Ok(parser)
    }
}

impl Default for JavaAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageAnalyzer for JavaAnalyzer {
    fn language_id(&self) -> &'static str {
        "java"
    }

    fn file_extensions(&self) -> &'static [&'static str] {
        &["java"]
    }

    fn parse(&self, path: &Path, source: &[u8]) -> Result<CompilationUnit, ParseError> {
        let path = path.to_string_lossy().to_string();
        let mut parser = self.create_parser()?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| ParseError::NoTree(path.clone()))?;
        let root = tree.root_node();

        if root.has_error() {
            let at = first_error(root).unwrap_or(root).start_position();
            return Err(ParseError::Syntax {
                path,
                line: at.row + 1,
                column: at.column + 1,
            });
        }

        let extractor = Extractor { source };
        let mut package = None;
        let mut declarations = Vec::new();

        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            match child.kind() {
                "package_declaration" => package = extractor.package_name(child),
                _ => {
                    if let Some(decl) = extractor.declaration(child) {
                        declarations.push(decl);
                    }
                }
            }
        }

        Ok(CompilationUnit {
            path,
            category: Category::Unknown,
            package,
            declarations,
        })
    }
}

/// Locate the first ERROR or MISSING node for error reporting.
fn first_error(root: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        if node.is_error() || node.is_missing() {
            return Some(node);
        }
        if !node.has_error() || !cursor.goto_first_child() {
            return None;
        }
        // Move to the first child that carries the error.
        while !(cursor.node().has_error() || cursor.node().is_missing()) {
            if !cursor.goto_next_sibling() {
                return None;
            }
        }
    }
}

fn is_type_kind(kind: &str) -> bool {
    matches!(
        kind,
        "type_identifier"
            | "scoped_type_identifier"
            | "generic_type"
            | "array_type"
            | "integral_type"
            | "floating_point_type"
            | "boolean_type"
            | "void_type"
            | "annotated_type"
    )
}

/// Strip Java string literal quotes, including text blocks.
fn unquote(text: &str) -> String {
    let t = text.trim();
    let t = t
        .strip_prefix("\"\"\"")
        .and_then(|s| s.strip_suffix("\"\"\""))
        .or_else(|| t.strip_prefix('"').and_then(|s| s.strip_suffix('"')))
        .unwrap_or(t);
    t.trim().to_string()
}

/// Walks declaration nodes of one parsed file.
struct Extractor<'a> {
    source: &'a [u8],
}

impl<'a> Extractor<'a> {
    fn text(&self, node: Node) -> &'a str {
        node.utf8_text(self.source).unwrap_or("")
    }

    fn package_name(&self, node: Node) -> Option<String> {
        let mut cursor = node.walk();
        let found = node
            .named_children(&mut cursor)
            .find(|c| matches!(c.kind(), "scoped_identifier" | "identifier"))
            .map(|c| self.text(c).to_string());
        found
    }

    fn declaration(&self, node: Node) -> Option<Declaration> {
        let kind = match node.kind() {
            "class_declaration" => DeclarationKind::Class,
            "interface_declaration" => DeclarationKind::Interface,
            "enum_declaration" => DeclarationKind::Enum,
            "record_declaration" => DeclarationKind::Record,
            _ => return None,
        };

        let name = self.text(node.child_by_field_name("name")?).to_string();
        if name.is_empty() {
            return None;
        }

        let (modifiers, annotations) = self.modifiers(node);
        let base_path = annotations
            .iter()
            .find(|a| a.name == "RequestMapping")
            .and_then(mapping_path);

        let mut decl = Declaration {
            name,
            kind,
            modifiers,
            fields: Vec::new(),
            methods: Vec::new(),
            annotations,
            base_path,
            span: Span::from_node(node),
        };

        // Record components behave as fields.
        if kind == DeclarationKind::Record {
            if let Some(params) = node.child_by_field_name("parameters") {
                for p in self.parameters(params) {
                    if let Some(type_ref) = p.type_ref {
                        decl.fields.push(Field {
                            name: p.name,
                            type_ref,
                        });
                    }
                }
            }
        }

        if let Some(body) = node.child_by_field_name("body") {
            self.members(body, &mut decl);
        }

        Some(decl)
    }

    fn members(&self, body: Node, decl: &mut Declaration) {
        let mut cursor = body.walk();
        for child in body.named_children(&mut cursor) {
            match child.kind() {
                "field_declaration" | "constant_declaration" => {
                    self.fields(child, &mut decl.fields)
                }
                "method_declaration" => {
                    if let Some(method) = self.method(child) {
                        decl.methods.push(method);
                    }
                }
                "enum_body_declarations" => self.members(child, decl),
                _ => {}
            }
        }
    }

    fn fields(&self, node: Node, out: &mut Vec<Field>) {
        let Some(type_node) = node.child_by_field_name("type") else {
            return;
        };
        let type_ref = self.type_ref(type_node);

        let mut cursor = node.walk();
        for declarator in node.children_by_field_name("declarator", &mut cursor) {
            if let Some(name) = declarator.child_by_field_name("name") {
                out.push(Field {
                    name: self.text(name).to_string(),
                    type_ref: type_ref.clone(),
                });
            }
        }
    }

    fn method(&self, node: Node) -> Option<MethodDecl> {
        let name = self.text(node.child_by_field_name("name")?).to_string();
        if name.is_empty() {
            return None;
        }

        let (modifiers, annotations) = self.modifiers(node);
        let return_type = node
            .child_by_field_name("type")
            .filter(|t| t.kind() != "void_type")
            .map(|t| self.type_ref(t));
        let parameters = node
            .child_by_field_name("parameters")
            .map(|p| self.parameters(p))
            .unwrap_or_default();
        let body = node.child_by_field_name("body").and_then(|b| self.lower(b));
        let routing = routing_hints(&annotations);

        Some(MethodDecl {
            name,
            modifiers,
            parameters,
            return_type,
            annotations,
            routing,
            body,
            span: Span::from_node(node),
        })
    }

    fn parameters(&self, node: Node) -> Vec<Parameter> {
        let mut params = Vec::new();

        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            let (name, type_ref, variadic) = match child.kind() {
                "formal_parameter" => (
                    child.child_by_field_name("name").map(|n| self.text(n)),
                    child.child_by_field_name("type").map(|t| self.type_ref(t)),
                    false,
                ),
                "spread_parameter" => {
                    // No `type` field on spread parameters; scan children.
                    let mut inner = child.walk();
                    let mut type_ref = None;
                    let mut name = None;
                    for part in child.named_children(&mut inner) {
                        if type_ref.is_none() && is_type_kind(part.kind()) {
                            type_ref = Some(self.type_ref(part));
                        } else if part.kind() == "variable_declarator" {
                            name = part.child_by_field_name("name").map(|n| self.text(n));
                        }
                    }
                    (name, type_ref, true)
                }
                _ => continue,
            };

            let Some(name) = name.filter(|n| !n.is_empty()) else {
                continue;
            };
            let (_, annotations) = self.modifiers(child);
            let binding = binding_source(&annotations);

            params.push(Parameter {
                name: name.to_string(),
                type_ref,
                annotations,
                binding,
                variadic,
            });
        }

        params
    }

    fn type_ref(&self, node: Node) -> TypeRef {
        let rendered = self.text(node).to_string();

        match node.kind() {
            "generic_type" => {
                let mut name = String::new();
                let mut arguments = Vec::new();
                let mut cursor = node.walk();
                for child in node.named_children(&mut cursor) {
                    if child.kind() == "type_arguments" {
                        arguments.extend(self.type_arguments(child));
                    } else if name.is_empty() {
                        name = simple_name(self.text(child));
                    }
                }
                TypeRef {
                    name,
                    arguments,
                    array_dims: 0,
                    rendered,
                }
            }
            "array_type" => {
                let element = node
                    .child_by_field_name("element")
                    .map(|e| self.type_ref(e))
                    .unwrap_or_else(|| TypeRef::simple(""));
                let dims = node
                    .child_by_field_name("dimensions")
                    .map(|d| self.text(d).matches('[').count())
                    .unwrap_or(1);
                TypeRef {
                    name: element.name,
                    arguments: element.arguments,
                    array_dims: element.array_dims + dims,
                    rendered,
                }
            }
            "annotated_type" => {
                let mut cursor = node.walk();
                let inner = node
                    .named_children(&mut cursor)
                    .filter(|c| is_type_kind(c.kind()))
                    .last();
                match inner {
                    Some(inner) => TypeRef {
                        rendered,
                        ..self.type_ref(inner)
                    },
                    None => TypeRef::simple(&rendered),
                }
            }
            _ => TypeRef {
                name: simple_name(&rendered),
                arguments: Vec::new(),
                array_dims: 0,
                rendered,
            },
        }
    }

    fn type_arguments(&self, node: Node) -> Vec<TypeRef> {
        let mut args = Vec::new();
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if child.kind() == "wildcard" {
                // `? extends Foo` references Foo; a bare `?` references nothing.
                let mut inner = child.walk();
                let bound = child
                    .named_children(&mut inner)
                    .find(|c| is_type_kind(c.kind()));
                if let Some(bound) = bound {
                    args.push(self.type_ref(bound));
                }
            } else if is_type_kind(child.kind()) {
                args.push(self.type_ref(child));
            }
        }
        args
    }

    /// Split a declaration's `modifiers` node into keywords and annotations.
    fn modifiers(&self, node: Node) -> (Vec<String>, Vec<Annotation>) {
        let mut keywords = Vec::new();
        let mut annotations = Vec::new();

        let mut cursor = node.walk();
        let modifiers = node.children(&mut cursor).find(|c| c.kind() == "modifiers");
        let Some(modifiers) = modifiers else {
            return (keywords, annotations);
        };

        let mut cursor = modifiers.walk();
        for child in modifiers.children(&mut cursor) {
            match child.kind() {
                "annotation" | "marker_annotation" => {
                    if let Some(ann) = self.annotation(child) {
                        annotations.push(ann);
                    }
                }
                kind if !child.is_named() => keywords.push(kind.to_string()),
                _ => {}
            }
        }

        (keywords, annotations)
    }

    fn annotation(&self, node: Node) -> Option<Annotation> {
        let name = simple_name(self.text(node.child_by_field_name("name")?));
        let mut ann = Annotation::new(&name);

        if let Some(args) = node.child_by_field_name("arguments") {
            let mut cursor = args.walk();
            for child in args.named_children(&mut cursor) {
                if child.is_extra() {
                    continue;
                }
                if child.kind() == "element_value_pair" {
                    let key = child.child_by_field_name("key").map(|k| self.text(k));
                    let value = child
                        .child_by_field_name("value")
                        .map(|v| self.element_value(v));
                    if let (Some(key), Some(value)) = (key, value) {
                        ann.arguments.push((key.to_string(), value));
                    }
                } else {
                    ann.arguments
                        .push(("value".to_string(), self.element_value(child)));
                }
            }
        }

        Some(ann)
    }

    fn element_value(&self, node: Node) -> String {
        match node.kind() {
            "string_literal" => unquote(self.text(node)),
            "element_value_array_initializer" => {
                let mut cursor = node.walk();
                let first = node.named_children(&mut cursor).find(|c| !c.is_extra());
                first.map(|c| self.element_value(c)).unwrap_or_default()
            }
            _ => self.text(node).to_string(),
        }
    }

    /// Lower a body subtree into the closed [`NodeKind`] set.
    ///
    /// Uses an explicit work stack: long operator chains nest one level per
    /// operand, so depth is bounded only by file size.
    fn lower(&self, root: Node) -> Option<BodyNode> {
        let mut stack = vec![LowerFrame::open(root)];
        loop {
            let next = stack.last_mut().and_then(|frame| frame.pending.next());
            if let Some(child) = next {
                stack.push(LowerFrame::open(child));
                continue;
            }

            let frame = stack.pop()?;
            let lowered = BodyNode::new(frame.kind, frame.children);
            match stack.last_mut() {
                Some(parent) => parent.children.push(lowered),
                None => return Some(lowered),
            }
        }
    }
}

/// A grammar node being lowered: children still to visit and those done.
struct LowerFrame<'tree> {
    kind: NodeKind,
    pending: std::vec::IntoIter<Node<'tree>>,
    children: Vec<BodyNode>,
}

impl<'tree> LowerFrame<'tree> {
    fn open(node: Node<'tree>) -> Self {
        let mut cursor = node.walk();
        let pending: Vec<Node<'tree>> = node
            .named_children(&mut cursor)
            .filter(|c| !c.is_extra())
            .collect();
        Self {
            kind: body_kind(node),
            children: Vec::with_capacity(pending.len()),
            pending: pending.into_iter(),
        }
    }
}

fn body_kind(node: Node) -> NodeKind {
    match node.kind() {
        "block" => NodeKind::Block,
        "if_statement" => NodeKind::If,
        "ternary_expression" => NodeKind::Conditional,
        "for_statement" => NodeKind::Loop(LoopKind::For),
        "enhanced_for_statement" => NodeKind::Loop(LoopKind::ForEach),
        "while_statement" => NodeKind::Loop(LoopKind::While),
        "do_statement" => NodeKind::Loop(LoopKind::DoWhile),
        "switch_expression" | "switch_statement" => NodeKind::Switch,
        "switch_block_statement_group" | "switch_rule" => NodeKind::SwitchArm,
        "try_statement" | "try_with_resources_statement" => NodeKind::Try,
        "catch_clause" => NodeKind::Catch,
        "lambda_expression" => NodeKind::Lambda,
        "binary_expression" => match node.child_by_field_name("operator").map(|o| o.kind()) {
            Some("&&") => NodeKind::Logical(LogicalOp::And),
            Some("||") => NodeKind::Logical(LogicalOp::Or),
            _ => NodeKind::Other,
        },
        _ => NodeKind::Other,
    }
}

/// Last segment of a possibly qualified name.
fn simple_name(text: &str) -> String {
    text.rsplit('.').next().unwrap_or(text).trim().to_string()
}

fn mapping_path(ann: &Annotation) -> Option<String> {
    ann.argument("value")
        .or_else(|| ann.argument("path"))
        .map(str::to_string)
}

fn verb_from_request_method(value: &str) -> Option<HttpVerb> {
    match value.rsplit('.').next()?.trim().to_ascii_uppercase().as_str() {
        "GET" => Some(HttpVerb::Get),
        "POST" => Some(HttpVerb::Post),
        "PUT" | "PATCH" => Some(HttpVerb::Put),
        "DELETE" => Some(HttpVerb::Delete),
        _ => None,
    }
}

/// Resolve explicit verb and path from method annotations. The first
/// mapping annotation that supplies a value wins.
fn routing_hints(annotations: &[Annotation]) -> RoutingHints {
    let mut hints = RoutingHints::default();

    for ann in annotations {
        let verb = match ann.name.as_str() {
            "GetMapping" => Some(HttpVerb::Get),
            "PostMapping" => Some(HttpVerb::Post),
            "PutMapping" | "PatchMapping" => Some(HttpVerb::Put),
            "DeleteMapping" => Some(HttpVerb::Delete),
            "RequestMapping" => ann.argument("method").and_then(verb_from_request_method),
            _ => continue,
        };
        if hints.verb.is_none() {
            hints.verb = verb;
        }
        if hints.path.is_none() {
            hints.path = mapping_path(ann);
        }
    }

    hints
}

/// Explicit binding marker, checked path > query > body.
fn binding_source(annotations: &[Annotation]) -> Option<BindingSource> {
    let has = |name: &str| annotations.iter().any(|a| a.name == name);
    if has("PathVariable") {
        Some(BindingSource::Path)
    } else if has("RequestParam") {
        Some(BindingSource::Query)
    } else if has("RequestBody") {
        Some(BindingSource::Body)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_java(source: &str) -> CompilationUnit {
        JavaAnalyzer::new()
            .parse(Path::new("Test.java"), source.as_bytes())
            .unwrap()
    }

    fn chained(operator: &str, terms: usize, term: impl Fn(usize) -> String) -> String {
        (0..terms).map(term).collect::<Vec<_>>().join(operator)
    }

    #[test]
    fn test_long_operator_chains_lower_without_recursion() {
        let conditions = chained(" && ", 20_000, |i| format!("c{i}"));
        let concat = chained(" + ", 20_000, |i| format!("\"s{i}\""));
        let source = format!(
            "class Deep {{\n  boolean a(boolean x) {{ return {conditions}; }}\n  String f() {{ return {concat}; }}\n}}\n"
        );

        let unit = parse_java(&source);
        let methods = &unit.declarations[0].methods;
        assert_eq!(methods.len(), 2);

        let logical = methods[0]
            .body
            .as_ref()
            .unwrap()
            .descendants()
            .filter(|n| matches!(n.kind, NodeKind::Logical(LogicalOp::And)))
            .count();
        assert_eq!(logical, 19_999);

        let f_body = methods[1].body.as_ref().unwrap();
        assert!(f_body.descendants().count() > 20_000);
        assert_eq!(f_body.clone(), *f_body);
    }

    #[test]
    fn test_deep_syntax_error_is_located() {
        let concat = chained(" + ", 20_000, |i| format!("\"s{i}\""));
        let source = format!("class Deep {{ String f() {{ return {concat} + ; }} }}");

        let err = JavaAnalyzer::new()
            .parse(Path::new("Deep.java"), source.as_bytes())
            .unwrap_err();
        assert!(matches!(err, ParseError::Syntax { line: 1, .. }));
    }

    #[test]
    fn test_extract_declarations() {
        let unit = parse_java(
            r#"
package com.example;

import java.util.List;

public class MyClass {
    private int count;
    private String a, b;
    public void myMethod() {}
}

interface MyInterface {
    String NAME = "x";
    void doSomething();
}

enum MyEnum {
    VALUE1, VALUE2;
    private Helper helper;
    public Helper helper() { return helper; }
}

record Point(int x, Coordinate y) {}
"#,
        );

        assert_eq!(unit.package, Some("com.example".to_string()));
        let kinds: Vec<_> = unit.declarations.iter().map(|d| (d.name.as_str(), d.kind)).collect();
        assert_eq!(
            kinds,
            vec![
                ("MyClass", DeclarationKind::Class),
                ("MyInterface", DeclarationKind::Interface),
                ("MyEnum", DeclarationKind::Enum),
                ("Point", DeclarationKind::Record),
            ]
        );

        let class = &unit.declarations[0];
        let fields: Vec<_> = class.fields.iter().map(|f| (f.name.as_str(), f.type_ref.name.as_str())).collect();
        assert_eq!(fields, vec![("count", "int"), ("a", "String"), ("b", "String")]);
        assert_eq!(class.modifiers, vec!["public"]);

        let iface = &unit.declarations[1];
        assert_eq!(iface.fields[0].name, "NAME");
        assert!(!iface.methods[0].has_body());

        let en = &unit.declarations[2];
        assert_eq!(en.fields[0].type_ref.name, "Helper");
        assert_eq!(en.methods[0].name, "helper");

        let record = &unit.declarations[3];
        assert_eq!(record.fields[1].name, "y");
        assert_eq!(record.fields[1].type_ref.name, "Coordinate");
    }

    #[test]
    fn test_method_shape() {
        let unit = parse_java(
            r#"
public class Svc {
    public static java.util.Map<String, List<Order>> load(final long id, Order[] orders, String... tags) throws Exception {
        return null;
    }
    public void run() {}
    public Svc() {}
}
"#,
        );

        let methods = &unit.declarations[0].methods;
        assert_eq!(methods.len(), 2, "constructors are not methods");

        let load = &methods[0];
        assert_eq!(load.modifiers, vec!["public", "static"]);
        let ret = load.return_type.as_ref().unwrap();
        assert_eq!(ret.name, "Map");
        assert_eq!(ret.rendered, "java.util.Map<String, List<Order>>");
        assert_eq!(ret.arguments[1].arguments[0].name, "Order");

        let params: Vec<_> = load
            .parameters
            .iter()
            .map(|p| (p.name.as_str(), p.type_ref.as_ref().unwrap().name.as_str(), p.variadic))
            .collect();
        assert_eq!(
            params,
            vec![("id", "long", false), ("orders", "Order", false), ("tags", "String", true)]
        );
        assert_eq!(load.parameters[1].type_ref.as_ref().unwrap().array_dims, 1);

        assert!(methods[1].return_type.is_none());
        assert!(methods[1].has_body());
    }

    #[test]
    fn test_routing_annotations() {
        let unit = parse_java(
            r#"
@RestController
@RequestMapping("/api/users/")
public class UserController {
    @GetMapping("/{id}")
    public User find(@PathVariable("id") String id, @RequestParam String q, @RequestBody User body, String plain) { return null; }

    @RequestMapping(value = "/bulk", method = RequestMethod.DELETE)
    public void purge() {}

    @RequestMapping(path = {"/legacy", "/old"})
    public void legacy() {}

    @org.springframework.web.bind.annotation.PostMapping
    public void create() {}
}
"#,
        );

        let decl = &unit.declarations[0];
        assert_eq!(decl.base_path.as_deref(), Some("/api/users/"));
        assert_eq!(decl.annotations[0].name, "RestController");

        let find = &decl.methods[0];
        assert_eq!(find.routing.verb, Some(HttpVerb::Get));
        assert_eq!(find.routing.path.as_deref(), Some("/{id}"));
        let bindings: Vec<_> = find.parameters.iter().map(|p| p.binding).collect();
        assert_eq!(
            bindings,
            vec![
                Some(BindingSource::Path),
                Some(BindingSource::Query),
                Some(BindingSource::Body),
                None
            ]
        );

        let purge = &decl.methods[1];
        assert_eq!(purge.routing.verb, Some(HttpVerb::Delete));
        assert_eq!(purge.routing.path.as_deref(), Some("/bulk"));

        let legacy = &decl.methods[2];
        assert_eq!(legacy.routing.verb, None);
        assert_eq!(legacy.routing.path.as_deref(), Some("/legacy"));

        let create = &decl.methods[3];
        assert_eq!(create.routing.verb, Some(HttpVerb::Post));
        assert_eq!(create.routing.path, None);
    }

    #[test]
    fn test_syntax_error_is_parse_failure() {
        let result = JavaAnalyzer::new().parse(
            Path::new("Broken.java"),
            b"public class Broken { public void f( { }",
        );
        assert!(matches!(result, Err(ParseError::Syntax { .. })));
    }

    #[test]
    fn test_empty_file_has_no_declarations() {
        let unit = parse_java("");
        assert!(unit.declarations.is_empty());
    }

    #[test]
    fn test_lowering_marks_control_flow() {
        let unit = parse_java(
            r#"
class T {
    int f(int a, int b) {
        // comment nodes are dropped
        if (a > 0 && b > 0) { return 1; }
        return a > b ? a : b;
    }
}
"#,
        );

        let body = unit.declarations[0].methods[0].body.as_ref().unwrap();
        assert_eq!(body.kind, NodeKind::Block);
        let kinds: Vec<_> = body.descendants().map(|n| n.kind).collect();
        assert!(kinds.contains(&NodeKind::If));
        assert!(kinds.contains(&NodeKind::Logical(LogicalOp::And)));
        assert!(kinds.contains(&NodeKind::Conditional));
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("\"/api\""), "/api");
        assert_eq!(unquote("\"\"\"\n  /x\n\"\"\""), "/x");
        assert_eq!(unquote("bare"), "bare");
    }
}
