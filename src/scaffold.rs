//! Express.js scaffold generation.
//!
//! Entry-point classes become Express routers built from their inferred
//! [`RouteModel`]; service and data-access classes become JavaScript classes
//! with one async stub per method. `app.js` mounts every router.
//!
//! The output preserves structure for follow-up work; it is not a behavioural
//! translation.

use std::collections::{BTreeSet, HashMap};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use std::time::Instant;

use anyhow::Context;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::analysis::routes::infer_routes;
use crate::analysis::{
    BindingSource, CompilationUnit, Corpus, Declaration, DeclarationKind, RouteModel,
};
use crate::scan::{Category, SourceUnit};

/// JavaScript words that are legal Java identifiers but cannot be used as
/// binding names.
const JS_RESERVED: &[&str] = &[
    "arguments", "await", "debugger", "delete", "eval", "export", "function", "in", "let",
    "typeof", "var", "with", "yield",
];

/// Names a generated route handler already binds.
const HANDLER_SCOPE: &[&str] = &["req", "res", "service", "router", "express", "result"];

/// One generated file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResult {
    pub source: String,
    pub target: String,
    pub category: Category,
    pub bytes_in: u64,
    pub bytes_out: u64,
    pub elapsed_ms: f64,
}

/// Generate the scaffold for `corpus` into `out_dir`.
pub fn generate(
    corpus: &Corpus,
    units: &[SourceUnit],
    out_dir: &Path,
) -> anyhow::Result<Vec<ConversionResult>> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("creating scaffold directory {}", out_dir.display()))?;

    let sizes: HashMap<&str, u64> = units
        .iter()
        .map(|u| (u.path.as_str(), u.size_bytes))
        .collect();
    let mut written: BTreeSet<String> = BTreeSet::new();
    let mut results = Vec::new();

    // Services first, so routers know which collaborators exist.
    for unit in corpus
        .units
        .iter()
        .filter(|u| matches!(u.category, Category::Service | Category::DataAccess))
    {
        for decl in scaffold_targets(unit) {
            let start = Instant::now();
            let code = render_service(&unit.path, decl)?;
            let target = Target { unit, name: &decl.name, code: &code, start };
            if let Some(result) = target.write(out_dir, &sizes, &mut written)? {
                results.push(result);
            }
        }
    }
    let services = written.clone();

    let mut routers = Vec::new();
    for unit in corpus
        .units
        .iter()
        .filter(|u| u.category == Category::EntryPoint)
    {
        for decl in scaffold_targets(unit) {
            let start = Instant::now();
            let model = infer_routes(decl);
            let code = render_router(&unit.path, &model, &services)?;
            let target = Target { unit, name: &decl.name, code: &code, start };
            if let Some(result) = target.write(out_dir, &sizes, &mut written)? {
                routers.push(decl.name.clone());
                results.push(result);
            }
        }
    }

    if !routers.is_empty() {
        let app = render_app(&routers)?;
        let path = out_dir.join("app.js");
        fs::write(&path, &app).with_context(|| format!("writing {}", path.display()))?;
        debug!(routers = routers.len(), "wrote app.js");
    }

    info!(files = results.len(), "scaffold generated");
    Ok(results)
}

fn scaffold_targets(unit: &CompilationUnit) -> impl Iterator<Item = &Declaration> {
    unit.declarations
        .iter()
        .filter(|d| matches!(d.kind, DeclarationKind::Class | DeclarationKind::Interface))
}

struct Target<'a> {
    unit: &'a CompilationUnit,
    name: &'a str,
    code: &'a str,
    start: Instant,
}

impl Target<'_> {
    /// Write `<name>.js`, or skip with a warning if the name was already used.
    fn write(
        &self,
        out_dir: &Path,
        sizes: &HashMap<&str, u64>,
        written: &mut BTreeSet<String>,
    ) -> anyhow::Result<Option<ConversionResult>> {
        if !written.insert(self.name.to_string()) {
            warn!(
                class = self.name,
                source = %self.unit.path,
                "duplicate class name, scaffold skipped"
            );
            return Ok(None);
        }

        let target = out_dir.join(format!("{}.js", self.name));
        fs::write(&target, self.code).with_context(|| format!("writing {}", target.display()))?;

        Ok(Some(ConversionResult {
            source: self.unit.path.clone(),
            target: target.to_string_lossy().to_string(),
            category: self.unit.category,
            bytes_in: sizes.get(self.unit.path.as_str()).copied().unwrap_or(0),
            bytes_out: self.code.len() as u64,
            elapsed_ms: self.start.elapsed().as_secs_f64() * 1000.0,
        }))
    }
}

/// Escape for a single-quoted JavaScript string.
fn js_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'")
}

fn js_ident(name: &str) -> String {
    if JS_RESERVED.contains(&name) {
        format!("_{name}")
    } else {
        name.to_string()
    }
}

/// Local names for a handler's parameters: reserved words and names the
/// handler itself uses are prefixed with `_` until unique.
fn handler_locals<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut taken: BTreeSet<String> = HANDLER_SCOPE.iter().map(|s| s.to_string()).collect();
    let mut locals = Vec::new();
    for name in names {
        let mut local = js_ident(name);
        while taken.contains(&local) {
            local.insert(0, '_');
        }
        taken.insert(local.clone());
        locals.push(local);
    }
    locals
}

/// `/orders/{id}` -> `/orders/:id`.
pub fn express_path(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            match segment
                .strip_prefix('{')
                .and_then(|s| s.strip_suffix('}'))
            {
                // `{id:\d+}` keeps only the name.
                Some(var) => format!(":{}", var.split(':').next().unwrap_or(var)),
                None => segment.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn render_router(
    source: &str,
    model: &RouteModel,
    services: &BTreeSet<String>,
) -> Result<String, std::fmt::Error> {
    let collaborator = model
        .collaborator_name
        .as_deref()
        .filter(|c| services.contains(*c));

    let mut out = String::new();
    writeln!(out, "// Generated by javalens from {source}")?;
    writeln!(out, "const express = require('express');")?;
    writeln!(out, "const router = express.Router();")?;
    if let Some(service) = collaborator {
        writeln!(out, "const {service} = require('./{service}.js');")?;
        writeln!(out, "const service = new {service}();")?;
    }
    writeln!(out)?;

    for route in &model.routes {
        writeln!(
            out,
            "router.{}('{}', async (req, res) => {{",
            route.http,
            js_string(&express_path(&route.path))
        )?;

        let body_params = route
            .params
            .iter()
            .filter(|p| p.source == BindingSource::Body)
            .count();
        let locals = handler_locals(route.params.iter().map(|p| p.name.as_str()));
        let mut args = Vec::new();
        for (param, ident) in route.params.iter().zip(locals) {
            let key = js_string(&param.name);
            match param.source {
                BindingSource::Path => writeln!(out, "  const {ident} = req.params['{key}'];")?,
                BindingSource::Query => writeln!(out, "  const {ident} = req.query['{key}'];")?,
                BindingSource::Body if body_params == 1 => {
                    writeln!(out, "  const {ident} = req.body;")?
                }
                BindingSource::Body => writeln!(out, "  const {ident} = (req.body || {{}})['{key}'];")?,
            }
            args.push(ident);
        }

        match collaborator {
            Some(_) => {
                writeln!(out, "  try {{")?;
                writeln!(
                    out,
                    "    const result = await service['{}']({});",
                    js_string(&route.method_name),
                    args.join(", ")
                )?;
                writeln!(out, "    res.json(result === undefined ? null : result);")?;
                writeln!(out, "  }} catch (err) {{")?;
                writeln!(
                    out,
                    "    res.status(500).json({{ error: String((err && err.message) || err) }});"
                )?;
                writeln!(out, "  }}")?;
            }
            None => {
                if !args.is_empty() {
                    writeln!(out, "  void [{}];", args.join(", "))?;
                }
                writeln!(
                    out,
                    "  res.status(501).json({{ error: 'Not implemented', handler: '{}.{}' }});",
                    js_string(&model.class_name),
                    js_string(&route.method_name)
                )?;
            }
        }
        writeln!(out, "}});")?;
        writeln!(out)?;
    }

    writeln!(out, "module.exports = router;")?;
    Ok(out)
}

fn render_service(source: &str, decl: &Declaration) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    writeln!(out, "// Generated by javalens from {source}")?;
    writeln!(out, "class {} {{", decl.name)?;

    // Overloads collapse to the first declaration.
    let mut seen = BTreeSet::new();
    for method in decl.methods.iter().filter(|m| seen.insert(m.name.as_str())) {
        let params: Vec<String> = method
            .parameters
            .iter()
            .map(|p| {
                let ident = js_ident(&p.name);
                if p.variadic {
                    format!("...{ident}")
                } else {
                    ident
                }
            })
            .collect();
        writeln!(out, "  async {}({}) {{", method.name, params.join(", "))?;
        writeln!(
            out,
            "    throw new Error('{}.{} is not implemented');",
            js_string(&decl.name),
            js_string(&method.name)
        )?;
        writeln!(out, "  }}")?;
        writeln!(out)?;
    }

    writeln!(out, "}}")?;
    writeln!(out)?;
    writeln!(out, "module.exports = {};", decl.name)?;
    Ok(out)
}

fn render_app(routers: &[String]) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    writeln!(out, "// Generated by javalens")?;
    writeln!(out, "const express = require('express');")?;
    writeln!(out, "const app = express();")?;
    writeln!(out, "app.use(express.json());")?;
    writeln!(out)?;
    for name in routers {
        writeln!(out, "app.use(require('./{name}.js'));")?;
    }
    writeln!(out)?;
    writeln!(out, "app.get('/health', (req, res) => res.json({{ status: 'ok' }}));")?;
    writeln!(out)?;
    writeln!(out, "const port = process.env.PORT || 3000;")?;
    writeln!(
        out,
        "app.listen(port, () => console.log(`Server listening on ${{port}}`));"
    )?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::AnalysisContext;
    use tempfile::TempDir;

    fn write_unit(root: &Path, rel: &str, content: &str, category: Category) -> SourceUnit {
        let full_path = root.join(rel);
        fs::create_dir_all(full_path.parent().unwrap()).unwrap();
        fs::write(&full_path, content).unwrap();
        SourceUnit {
            path: rel.to_string(),
            full_path,
            size_bytes: content.len() as u64,
            category,
        }
    }

    #[test]
    fn test_express_path() {
        assert_eq!(express_path("/orders/{id}"), "/orders/:id");
        assert_eq!(express_path("/a/{id:\\d+}/b"), "/a/:id/b");
        assert_eq!(express_path("/plain"), "/plain");
    }

    #[test]
    fn test_js_escaping() {
        assert_eq!(js_string("it's"), "it\\'s");
        assert_eq!(js_ident("function"), "_function");
        assert_eq!(js_ident("debugger"), "_debugger");
        assert_eq!(js_ident("id"), "id");
    }

    #[test]
    fn test_handler_locals_avoid_handler_names() {
        assert_eq!(
            handler_locals(["req", "res", "service", "_req", "id", "debugger", "result"]),
            vec!["_req", "_res", "_service", "__req", "id", "_debugger", "_result"]
        );
    }

    #[test]
    fn test_servlet_parameters_do_not_redeclare_handler_args() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let units = vec![
            write_unit(
                src.path(),
                "web/PingController.java",
                r#"
public class PingController {
    public String getPing(HttpServletRequest req, HttpServletResponse res, @RequestParam String service) {
        return "pong";
    }
}
"#,
                Category::EntryPoint,
            ),
            write_unit(
                src.path(),
                "svc/PingService.java",
                "public class PingService { public String getPing(Object a, Object b, String c) { return null; } }",
                Category::Service,
            ),
        ];

        let corpus = AnalysisContext::new(src.path()).parse_corpus(&units);
        generate(&corpus, &units, out.path()).unwrap();

        let router = fs::read_to_string(out.path().join("PingController.js")).unwrap();
        assert!(router.contains("const _req = (req.body || {})['req'];"));
        assert!(router.contains("const _res = (req.body || {})['res'];"));
        assert!(router.contains("const _service = req.query['service'];"));
        assert!(router.contains("await service['getPing'](_req, _res, _service);"));
        assert!(!router.contains("const req ="));
        assert!(!router.contains("const res ="));
        assert!(!router.contains("const service = req"));
    }

    #[test]
    fn test_generate_scaffold() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let units = vec![
            write_unit(
                src.path(),
                "web/OrderController.java",
                r#"
@RequestMapping("/orders")
public class OrderController {
    @GetMapping("/{id}")
    public Order getOrder(@PathVariable Long id) { return null; }
    public Order createOrder(Order order) { return order; }
}
"#,
                Category::EntryPoint,
            ),
            write_unit(
                src.path(),
                "web/AuditResource.java",
                "public class AuditResource { public void listEvents(@RequestParam int page) {} }",
                Category::EntryPoint,
            ),
            write_unit(
                src.path(),
                "svc/OrderService.java",
                "public class OrderService { public Order getOrder(Long id) { return null; } public Order getOrder(String id) { return null; } }",
                Category::Service,
            ),
            write_unit(
                src.path(),
                "dao/OrderRepository.java",
                "public interface OrderRepository { Order save(Order o); }",
                Category::DataAccess,
            ),
            write_unit(src.path(), "model/Order.java", "public class Order {}", Category::Model),
        ];

        let corpus = AnalysisContext::new(src.path()).parse_corpus(&units);
        let results = generate(&corpus, &units, out.path()).unwrap();

        let names: Vec<_> = results
            .iter()
            .map(|r| Path::new(&r.target).file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "OrderRepository.js",
                "OrderService.js",
                "AuditResource.js",
                "OrderController.js"
            ]
        );
        assert!(results.iter().all(|r| r.bytes_in > 0 && r.bytes_out > 0));

        let controller = fs::read_to_string(out.path().join("OrderController.js")).unwrap();
        assert!(controller.contains("const OrderService = require('./OrderService.js');"));
        assert!(controller.contains("router.get('/orders/:id', async (req, res) => {"));
        assert!(controller.contains("const id = req.params['id'];"));
        assert!(controller.contains("router.post('/orders/order-controller/create-order'"));
        assert!(controller.contains("const order = req.body;"));
        assert!(controller.contains("await service['getOrder'](id);"));

        let audit = fs::read_to_string(out.path().join("AuditResource.js")).unwrap();
        assert!(audit.contains("const page = req.query['page'];"));
        assert!(audit.contains("res.status(501)"));
        assert!(!audit.contains("require('./AuditService.js')"));

        let service = fs::read_to_string(out.path().join("OrderService.js")).unwrap();
        assert_eq!(service.matches("async getOrder(").count(), 1);
        assert!(service.contains("module.exports = OrderService;"));

        let app = fs::read_to_string(out.path().join("app.js")).unwrap();
        assert!(app.contains("app.use(require('./AuditResource.js'));"));
        assert!(app.contains("app.use(require('./OrderController.js'));"));
        assert!(app.contains("app.get('/health'"));
        assert!(!out.path().join("Order.js").exists());
    }
}
