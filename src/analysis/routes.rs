//! HTTP route inference for entry-point classes.
//!
//! Explicit routing hints from the parser adapter always win; naming
//! conventions fill the gaps. Output depends only on the declaration.

use serde::{Deserialize, Serialize};

use crate::analysis::{BindingSource, Declaration, HttpVerb, MethodDecl, Parameter};

/// Suffixes identifying an entry-point class.
const ENTRY_POINT_SUFFIXES: &[&str] = &["Controller", "Resource"];
/// Suffix appended to form the presumed collaborator name.
const COLLABORATOR_SUFFIX: &str = "Service";
/// Rendered type when a parameter's type could not be read.
pub const PLACEHOLDER_TYPE: &str = "Object";

/// Name prefixes and the verb they imply, checked in order.
const VERB_PREFIXES: &[(&[&str], HttpVerb)] = &[
    (&["get", "find", "list", "fetch"], HttpVerb::Get),
    (&["create", "add", "post"], HttpVerb::Post),
    (&["update", "put"], HttpVerb::Put),
    (&["delete", "remove", "del"], HttpVerb::Delete),
];

/// Inferred external surface of one entry-point class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteModel {
    pub class_name: String,
    pub collaborator_name: Option<String>,
    pub routes: Vec<Route>,
}

/// One inferred endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub http: HttpVerb,
    /// Never empty; always starts with `/`.
    pub path: String,
    pub method_name: String,
    pub params: Vec<RouteParam>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteParam {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub source: BindingSource,
}

/// Derive the route model for one declaration.
pub fn infer_routes(decl: &Declaration) -> RouteModel {
    let base = decl.base_path.as_deref().unwrap_or("");

    RouteModel {
        class_name: decl.name.clone(),
        collaborator_name: collaborator_name(&decl.name),
        routes: decl
            .methods
            .iter()
            .map(|m| infer_route(&decl.name, base, m))
            .collect(),
    }
}

fn infer_route(class_name: &str, base: &str, method: &MethodDecl) -> Route {
    let http = method
        .routing
        .verb
        .unwrap_or_else(|| infer_verb(&method.name));

    let local = match method.routing.path.as_deref() {
        Some(explicit) => explicit.to_string(),
        None => format!("/{}/{}", kebab_case(class_name), kebab_case(&method.name)),
    };

    Route {
        http,
        path: join_path(base, &local),
        method_name: method.name.clone(),
        params: method.parameters.iter().map(route_param).collect(),
    }
}

fn route_param(param: &Parameter) -> RouteParam {
    RouteParam {
        name: param.name.clone(),
        type_name: param
            .type_ref
            .as_ref()
            .map(|t| t.rendered.clone())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| PLACEHOLDER_TYPE.to_string()),
        source: param.binding.unwrap_or(BindingSource::Body),
    }
}

/// Verb implied by a method name; `post` when nothing matches.
pub fn infer_verb(method_name: &str) -> HttpVerb {
    let lower = method_name.to_lowercase();
    VERB_PREFIXES
        .iter()
        .find(|(prefixes, _)| prefixes.iter().any(|p| lower.starts_with(p)))
        .map(|(_, verb)| *verb)
        .unwrap_or(HttpVerb::Post)
}

/// `UserController` -> `user-controller`, `getUser` -> `get-user`.
pub fn kebab_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, ch) in name.chars().enumerate() {
        if i > 0 && ch.is_uppercase() {
            out.push('-');
        }
        out.extend(ch.to_lowercase());
    }
    out
}

/// `OrderController` -> `OrderService`. None when only the suffix remains.
pub fn collaborator_name(class_name: &str) -> Option<String> {
    let stem = ENTRY_POINT_SUFFIXES
        .iter()
        .find_map(|suffix| {
            let split = class_name.len().checked_sub(suffix.len())?;
            let tail = class_name.get(split..)?;
            tail.eq_ignore_ascii_case(suffix)
                .then(|| &class_name[..split])
        })
        .unwrap_or(class_name);

    if stem.is_empty() {
        None
    } else {
        Some(format!("{stem}{COLLABORATOR_SUFFIX}"))
    }
}

/// Join a base path (trailing `/` stripped) with a method path.
pub fn join_path(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let joined = if path.is_empty() || path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    };

    if joined.is_empty() {
        "/".to_string()
    } else if joined.starts_with('/') {
        joined
    } else {
        format!("/{joined}")
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::analysis::{JavaAnalyzer, LanguageAnalyzer};

    fn model(source: &str) -> RouteModel {
        let unit = JavaAnalyzer::new()
            .parse(Path::new("T.java"), source.as_bytes())
            .unwrap();
        infer_routes(&unit.declarations[0])
    }

    #[test]
    fn test_verb_prefixes() {
        assert_eq!(infer_verb("getUser"), HttpVerb::Get);
        assert_eq!(infer_verb("findAll"), HttpVerb::Get);
        assert_eq!(infer_verb("listOrders"), HttpVerb::Get);
        assert_eq!(infer_verb("fetchPage"), HttpVerb::Get);
        assert_eq!(infer_verb("createOrder"), HttpVerb::Post);
        assert_eq!(infer_verb("addItem"), HttpVerb::Post);
        assert_eq!(infer_verb("updateOrder"), HttpVerb::Put);
        assert_eq!(infer_verb("putAll"), HttpVerb::Put);
        assert_eq!(infer_verb("deleteOrder"), HttpVerb::Delete);
        assert_eq!(infer_verb("removeItem"), HttpVerb::Delete);
        assert_eq!(infer_verb("DelCache"), HttpVerb::Delete);
        assert_eq!(infer_verb("process"), HttpVerb::Post);
    }

    #[test]
    fn test_kebab_case() {
        assert_eq!(kebab_case("UserController"), "user-controller");
        assert_eq!(kebab_case("getUser"), "get-user");
        assert_eq!(kebab_case("run"), "run");
        assert_eq!(kebab_case("URLLoader"), "u-r-l-loader");
    }

    #[test]
    fn test_collaborator_name() {
        assert_eq!(collaborator_name("OrderController").as_deref(), Some("OrderService"));
        assert_eq!(collaborator_name("UserResource").as_deref(), Some("UserService"));
        assert_eq!(collaborator_name("Billingcontroller").as_deref(), Some("BillingService"));
        assert_eq!(collaborator_name("Gateway").as_deref(), Some("GatewayService"));
        assert_eq!(collaborator_name("Controller"), None);
    }

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("", "/x"), "/x");
        assert_eq!(join_path("/api/", "/x"), "/api/x");
        assert_eq!(join_path("/api", "x"), "/api/x");
        assert_eq!(join_path("api", ""), "/api");
        assert_eq!(join_path("", ""), "/");
        assert_eq!(join_path("/", ""), "/");
    }

    #[test]
    fn test_unannotated_controller_method() {
        let m = model(
            r#"
public class UserController {
    public User getUser(String id) { return null; }
}
"#,
        );

        assert_eq!(m.class_name, "UserController");
        assert_eq!(m.collaborator_name.as_deref(), Some("UserService"));
        assert_eq!(
            m.routes,
            vec![Route {
                http: HttpVerb::Get,
                path: "/user-controller/get-user".to_string(),
                method_name: "getUser".to_string(),
                params: vec![RouteParam {
                    name: "id".to_string(),
                    type_name: "String".to_string(),
                    source: BindingSource::Body,
                }],
            }]
        );
    }

    #[test]
    fn test_explicit_annotations_win() {
        let m = model(
            r#"
@RestController
@RequestMapping("/api/orders/")
public class OrderController {
    @PostMapping("/{id}/cancel")
    public void getCancelled(@PathVariable Long id, @RequestParam("reason") String reason) {}

    @RequestMapping(method = RequestMethod.PUT)
    public void fetchAndStore(@RequestBody Order order) {}

    public void deleteOrder(long id) {}
}
"#,
        );

        let summary: Vec<_> = m
            .routes
            .iter()
            .map(|r| (r.http, r.path.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (HttpVerb::Post, "/api/orders/{id}/cancel"),
                (HttpVerb::Put, "/api/orders/order-controller/fetch-and-store"),
                (HttpVerb::Delete, "/api/orders/order-controller/delete-order"),
            ]
        );

        let sources: Vec<_> = m.routes[0].params.iter().map(|p| p.source).collect();
        assert_eq!(sources, vec![BindingSource::Path, BindingSource::Query]);
        assert_eq!(m.routes[1].params[0].source, BindingSource::Body);
    }

    #[test]
    fn test_route_json_shape() {
        let m = model("class PingController { String ping() { return \"\"; } }");
        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["className"], "PingController");
        assert_eq!(json["collaboratorName"], "PingService");
        assert_eq!(json["routes"][0]["http"], "post");
        assert_eq!(json["routes"][0]["methodName"], "ping");
        assert_eq!(json["routes"][0]["path"], "/ping-controller/ping");
    }

    #[test]
    fn test_inference_is_deterministic() {
        let source = r#"
@RequestMapping("/v1")
class ItemController {
    @GetMapping List<Item> listItems(@RequestParam int page) { return null; }
    Item addItem(@RequestBody Item item) { return item; }
}
"#;
        let first = serde_json::to_string(&model(source)).unwrap();
        let second = serde_json::to_string(&model(source)).unwrap();
        assert_eq!(first, second);
    }
}
