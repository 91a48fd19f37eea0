//! Route table and dispatch
//!
//! The table is assembled once through [`RouterBuilder`] and is immutable
//! afterwards, so it can be shared across connections without locking.
//!
//! Matching order:
//! 1. Literal patterns, in registration order
//! 2. The single-segment catch-all
//!
//! A literal is never shadowed by the catch-all regardless of the order in
//! which the two were registered.

use super::action::Action;
use super::pattern::{decode_path, RoutePattern};
use crate::error::{DispatchError, RouteError};
use crate::templates::TemplateStore;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Response};

/// A pattern bound to its accepted methods and action
#[derive(Debug, Clone)]
pub struct Route {
    pub pattern: RoutePattern,
    pub methods: Vec<Method>,
    pub action: Action,
}

impl Route {
    /// `HEAD` is implied by `GET`
    pub fn accepts(&self, method: &Method) -> bool {
        self.methods.contains(method)
            || (*method == Method::HEAD && self.methods.contains(&Method::GET))
    }

    /// Methods to advertise in an `Allow` header
    pub fn allowed_methods(&self) -> Vec<Method> {
        let mut allowed = self.methods.clone();
        if allowed.contains(&Method::GET) && !allowed.contains(&Method::HEAD) {
            allowed.push(Method::HEAD);
        }
        if !allowed.contains(&Method::OPTIONS) {
            allowed.push(Method::OPTIONS);
        }
        allowed
    }
}

/// Result of looking a path up in the table
#[derive(Debug)]
pub struct RouteMatch<'a> {
    pub route: &'a Route,
    /// Segment captured by a placeholder pattern
    pub param: Option<String>,
}

/// Startup-time route registration
#[derive(Debug, Default)]
pub struct RouterBuilder {
    literals: Vec<Route>,
    catch_all: Option<Route>,
}

impl RouterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a route
    ///
    /// Fails on a duplicate literal, a second catch-all, an empty method set,
    /// or an echo action naming a parameter the pattern does not capture.
    pub fn register(
        &mut self,
        pattern: &str,
        methods: &[Method],
        action: Action,
    ) -> Result<&mut Self, RouteError> {
        let parsed = RoutePattern::parse(pattern)?;

        if methods.is_empty() {
            return Err(RouteError::NoMethods(pattern.to_string()));
        }

        if let Action::EchoParam { param } = &action {
            if !matches!(&parsed, RoutePattern::Param(name) if name == param) {
                return Err(RouteError::InvalidPattern {
                    pattern: pattern.to_string(),
                    reason: "echoed parameter is not captured by the pattern",
                });
            }
        }

        let mut accepted: Vec<Method> = Vec::with_capacity(methods.len());
        for method in methods {
            if !accepted.contains(method) {
                accepted.push(method.clone());
            }
        }

        let route = Route {
            pattern: parsed,
            methods: accepted,
            action,
        };

        match &route.pattern {
            RoutePattern::Literal(path) => {
                if self.literals.iter().any(|r| r.pattern.matches_literal(path)) {
                    return Err(RouteError::Conflict(pattern.to_string()));
                }
                self.literals.push(route);
            }
            RoutePattern::Param(_) => {
                if let Some(existing) = &self.catch_all {
                    return Err(RouteError::Conflict(format!(
                        "{pattern} (overlaps {})",
                        existing.pattern
                    )));
                }
                self.catch_all = Some(route);
            }
        }

        Ok(self)
    }

    pub fn build(self) -> Router {
        Router {
            literals: self.literals,
            catch_all: self.catch_all,
        }
    }
}

/// Immutable route table
#[derive(Debug)]
pub struct Router {
    literals: Vec<Route>,
    catch_all: Option<Route>,
}

impl Router {
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    /// All routes in matching order
    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.literals.iter().chain(self.catch_all.iter())
    }

    pub fn len(&self) -> usize {
        self.literals.len() + usize::from(self.catch_all.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Find the route for a raw request path, ignoring the method
    pub fn find(&self, raw_path: &str) -> Option<RouteMatch<'_>> {
        let path = decode_path(raw_path);

        if let Some(route) = self.literals.iter().find(|r| r.pattern.matches_literal(&path)) {
            return Some(RouteMatch { route, param: None });
        }

        let route = self.catch_all.as_ref()?;
        let segment = route.pattern.capture(&path)?;
        Some(RouteMatch {
            route,
            param: Some(segment.to_string()),
        })
    }

    /// Find the route for a request, checking the method
    pub fn resolve(&self, method: &Method, raw_path: &str) -> Result<RouteMatch<'_>, DispatchError> {
        let matched = self.find(raw_path).ok_or(DispatchError::NotFound)?;
        if !matched.route.accepts(method) {
            return Err(DispatchError::MethodNotAllowed {
                allowed: matched.route.allowed_methods(),
            });
        }
        Ok(matched)
    }

    /// Resolve the request and run the bound action
    pub async fn dispatch(
        &self,
        method: &Method,
        raw_path: &str,
        templates: &TemplateStore,
    ) -> Result<Response<Full<Bytes>>, DispatchError> {
        let matched = self.resolve(method, raw_path)?;
        matched
            .route
            .action
            .execute(matched.param.as_deref(), templates)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    fn test_router() -> Router {
        let mut builder = Router::builder();
        builder
            .register("/<name>", &[Method::GET], Action::echo("name"))
            .unwrap()
            .register("/", &[Method::GET], Action::render("home"))
            .unwrap()
            .register("/form", &[Method::GET, Method::POST], Action::render("form"))
            .unwrap()
            .register("/out", &[Method::GET], Action::redirect("https://example.com/x"))
            .unwrap();
        builder.build()
    }

    fn test_templates() -> (tempfile::TempDir, TemplateStore) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("home.html"), "<p>home</p>").unwrap();
        std::fs::write(dir.path().join("form.html"), "<form></form>").unwrap();
        let store = TemplateStore::new(dir.path());
        (dir, store)
    }

    async fn body_string(resp: Response<Full<Bytes>>) -> String {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_duplicate_literal_conflicts() {
        let mut builder = Router::builder();
        builder.register("/quiz", &[Method::GET], Action::render("quiz")).unwrap();
        let err = builder
            .register("/quiz", &[Method::POST], Action::render("other"))
            .unwrap_err();
        assert_eq!(err, RouteError::Conflict("/quiz".to_string()));
    }

    #[test]
    fn test_second_catch_all_conflicts() {
        let mut builder = Router::builder();
        builder.register("/<a>", &[Method::GET], Action::echo("a")).unwrap();
        let err = builder
            .register("/<b>", &[Method::GET], Action::echo("b"))
            .unwrap_err();
        assert!(matches!(err, RouteError::Conflict(_)));
    }

    #[test]
    fn test_register_rejects_empty_methods_and_bad_echo() {
        let mut builder = Router::builder();
        assert_eq!(
            builder.register("/x", &[], Action::render("x")).unwrap_err(),
            RouteError::NoMethods("/x".to_string())
        );
        assert!(matches!(
            builder.register("/<usr>", &[Method::GET], Action::echo("other")),
            Err(RouteError::InvalidPattern { .. })
        ));
        assert!(matches!(
            builder.register("/x", &[Method::GET], Action::echo("usr")),
            Err(RouteError::InvalidPattern { .. })
        ));
        assert!(builder.build().is_empty());
    }

    #[test]
    fn test_literal_precedes_catch_all_regardless_of_order() {
        let router = test_router();
        let matched = router.find("/form").unwrap();
        assert!(matched.route.pattern.is_literal());
        assert!(matched.param.is_none());

        let matched = router.find("/someone").unwrap();
        assert_eq!(matched.param.as_deref(), Some("someone"));
    }

    #[test]
    fn test_resolve_errors() {
        let router = test_router();
        assert!(matches!(
            router.resolve(&Method::GET, "/a/b"),
            Err(DispatchError::NotFound)
        ));
        match router.resolve(&Method::POST, "/out") {
            Err(DispatchError::MethodNotAllowed { allowed }) => {
                assert_eq!(allowed, vec![Method::GET, Method::HEAD, Method::OPTIONS]);
            }
            other => panic!("expected 405, got {other:?}"),
        }
    }

    #[test]
    fn test_head_implied_by_get() {
        let router = test_router();
        assert!(router.resolve(&Method::HEAD, "/").is_ok());
        assert!(router.resolve(&Method::HEAD, "/anyone").is_ok());
    }

    #[test]
    fn test_routes_in_matching_order() {
        let router = test_router();
        let patterns: Vec<String> = router.routes().map(|r| r.pattern.to_string()).collect();
        assert_eq!(patterns, vec!["/", "/form", "/out", "/<name>"]);
        assert_eq!(router.len(), 4);
    }

    #[tokio::test]
    async fn test_dispatch_actions() {
        let router = test_router();
        let (_dir, templates) = test_templates();

        let resp = router.dispatch(&Method::GET, "/", &templates).await.unwrap();
        assert_eq!(resp.status(), 200);
        assert_eq!(body_string(resp).await, "<p>home</p>");

        let resp = router.dispatch(&Method::GET, "/out", &templates).await.unwrap();
        assert_eq!(resp.status(), 302);
        assert_eq!(resp.headers()["location"], "https://example.com/x");

        let resp = router
            .dispatch(&Method::GET, "/%3Cb%3Ehi", &templates)
            .await
            .unwrap();
        assert_eq!(body_string(resp).await, "<h1>&lt;b&gt;hi</h1>");
    }

    #[tokio::test]
    async fn test_dispatch_missing_template() {
        let mut builder = Router::builder();
        builder.register("/gone", &[Method::GET], Action::render("gone")).unwrap();
        let router = builder.build();
        let (_dir, templates) = test_templates();

        let err = router
            .dispatch(&Method::GET, "/gone", &templates)
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::TemplateMissing(ref name) if name == "gone"));
        assert_eq!(err.status(), 500);
    }
}
