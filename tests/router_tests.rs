use std::sync::Arc;

use brrtdispatch::context::Context;
use brrtdispatch::handler::HandlerRef;
use brrtdispatch::router::{ConstraintPolicy, NodeKind, RouteError, Router};
use http::Method;

fn handler() -> HandlerRef {
    Arc::new(|_ctx: &mut Context| {})
}

/// A small zoo API touching every segment kind and most verbs
fn zoo_router(policy: ConstraintPolicy) -> Router {
    let mut router = Router::with_policy(policy);
    let routes = [
        (Method::GET, "/"),
        (Method::GET, "/zoo/animals"),
        (Method::POST, "/zoo/animals"),
        (Method::GET, r"/zoo/animals/:id(\d+)"),
        (Method::PUT, r"/zoo/animals/:id(\d+)"),
        (Method::PATCH, r"/zoo/animals/:id(\d+)"),
        (Method::DELETE, r"/zoo/animals/:id(\d+)"),
        (Method::GET, "/zoo/animals/count"),
        (Method::GET, "/zoo/keepers/:keeper/animals/:animal"),
        (Method::HEAD, "/zoo/health"),
        (Method::OPTIONS, "/zoo/health"),
        (Method::GET, "/zoo/maps/*"),
    ];
    for (method, path) in routes {
        router.register(method, path, handler()).unwrap();
    }
    router
}

fn assert_route(router: &Router, method: Method, path: &str, pattern: &str) {
    let matched = router
        .lookup(&method, path)
        .unwrap_or_else(|| panic!("no match for {method} {path}"));
    assert!(matched.handler().is_some(), "{method} {path} has no handler");
    assert_eq!(
        matched.pattern().map(|p| &**p),
        Some(pattern),
        "{method} {path}"
    );
}

#[test]
fn test_verbs_share_paths() {
    let router = zoo_router(ConstraintPolicy::Permissive);
    assert_eq!(router.route_count(), 12);

    assert_route(&router, Method::GET, "/", "/");
    assert_route(&router, Method::POST, "/zoo/animals", "/zoo/animals");
    for method in [Method::GET, Method::PUT, Method::PATCH, Method::DELETE] {
        assert_route(&router, method, "/zoo/animals/7", r"/zoo/animals/:id(\d+)");
    }
    assert_route(&router, Method::HEAD, "/zoo/health", "/zoo/health");
    assert_route(&router, Method::OPTIONS, "/zoo/health", "/zoo/health");

    assert!(router.lookup(&Method::TRACE, "/zoo/health").is_none());
    assert!(router.lookup(&Method::GET, "/zoo/health").is_none());
}

#[test]
fn test_static_segment_wins_over_constrained_param() {
    let router = zoo_router(ConstraintPolicy::Permissive);
    let matched = router.lookup(&Method::GET, "/zoo/animals/count").unwrap();
    assert_eq!(matched.node().kind(), NodeKind::Static);
    assert!(matched.path_params().is_empty());
}

#[test]
fn test_multiple_params_bind_in_path_order() {
    let router = zoo_router(ConstraintPolicy::Permissive);
    let matched = router
        .lookup(&Method::GET, "/zoo/keepers/alice/animals/zebra")
        .unwrap();
    let bound: Vec<(&str, &str)> = matched
        .path_params()
        .iter()
        .map(|(k, v)| (&**k, v.as_str()))
        .collect();
    assert_eq!(bound, vec![("keeper", "alice"), ("animal", "zebra")]);
}

#[test]
fn test_wildcard_absorbs_any_depth() {
    let router = zoo_router(ConstraintPolicy::Permissive);
    for path in [
        "/zoo/maps/north",
        "/zoo/maps/north/aviary",
        "/zoo/maps/north/aviary/level/2",
    ] {
        assert_route(&router, Method::GET, path, "/zoo/maps/*");
    }
    let bare = router.lookup(&Method::GET, "/zoo/maps").unwrap();
    assert!(bare.handler().is_none());
}

#[test]
fn test_constraint_policies_differ_on_mismatch() {
    let permissive = zoo_router(ConstraintPolicy::Permissive);
    let matched = permissive.lookup(&Method::DELETE, "/zoo/animals/lion").unwrap();
    assert_eq!(matched.get_path_param("id"), Some("lion"));

    let strict = zoo_router(ConstraintPolicy::Strict);
    assert!(strict.lookup(&Method::DELETE, "/zoo/animals/lion").is_none());
    assert_eq!(
        strict
            .lookup(&Method::DELETE, "/zoo/animals/12")
            .unwrap()
            .get_path_param("id"),
        Some("12")
    );
}

#[test]
fn test_failed_registration_leaves_table_usable() {
    let mut router = zoo_router(ConstraintPolicy::Permissive);
    let err = router
        .register(Method::GET, "/zoo/animals/:name", handler())
        .unwrap_err();
    assert!(matches!(err, RouteError::ParamConflict { .. }));

    let err = router
        .register(Method::GET, "/zoo/maps/:region", handler())
        .unwrap_err();
    assert!(matches!(err, RouteError::WildcardParamConflict { .. }));

    let err = router
        .register(Method::GET, "/zoo/bad/:id([)", handler())
        .unwrap_err();
    assert!(matches!(err, RouteError::InvalidRegex { .. }));

    let err = router
        .register(Method::GET, "/zoo/maps/*/floor/:id([)", handler())
        .unwrap_err();
    assert!(matches!(err, RouteError::InvalidRegex { .. }));

    assert_eq!(router.route_count(), 12);
    assert_route(&router, Method::GET, "/zoo/animals/3", r"/zoo/animals/:id(\d+)");
    // no partial paths were left behind
    assert!(router.lookup(&Method::GET, "/zoo/bad").is_none());
    assert_route(&router, Method::GET, "/zoo/maps/north/floor/2", "/zoo/maps/*");
    assert_route(&router, Method::GET, "/zoo/maps/a/b", "/zoo/maps/*");
}

#[test]
fn test_concurrent_lookups_on_shared_router() {
    let router = Arc::new(zoo_router(ConstraintPolicy::Strict));
    let workers: Vec<_> = (0..4)
        .map(|i| {
            let router = Arc::clone(&router);
            std::thread::spawn(move || {
                for n in 0..500 {
                    let path = format!("/zoo/keepers/k{i}/animals/a{n}");
                    let matched = router.lookup(&Method::GET, &path).unwrap();
                    assert_eq!(matched.get_path_param("keeper"), Some(format!("k{i}").as_str()));
                    assert_eq!(matched.get_path_param("animal"), Some(format!("a{n}").as_str()));
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }
}

#[test]
fn test_routes_listing_contains_every_route() {
    let router = zoo_router(ConstraintPolicy::Permissive);
    let routes = router.routes();
    assert_eq!(routes.len(), router.route_count());
    assert!(routes
        .iter()
        .any(|(m, p)| *m == Method::OPTIONS && &**p == "/zoo/health"));
    assert_eq!(
        routes.first().map(|(m, p)| (m.as_str(), &**p)),
        Some(("DELETE", r"/zoo/animals/:id(\d+)"))
    );
}
