use std::sync::Arc;

use brrtdispatch::context::Context;
use brrtdispatch::dispatcher::{Dispatcher, NOT_FOUND_BODY};
use brrtdispatch::handler::HandlerRef;
use brrtdispatch::ids::RequestId;
use brrtdispatch::router::{ConstraintPolicy, RouteError};
use brrtdispatch::server::BufferedSink;
use http::{Method, Request, StatusCode};
use parking_lot::Mutex;

mod common;
use common::log_capture::capture_json;
use common::sinks::{BrokenSink, ShortSink};

fn get(uri: &str) -> Request<Vec<u8>> {
    Request::get(uri).body(Vec::new()).unwrap()
}

fn pet_dispatcher() -> Dispatcher {
    let mut dispatcher = Dispatcher::new();
    dispatcher
        .get("/pets", |ctx: &mut Context| {
            let limit = ctx.query_value("limit").as_i64().unwrap_or(20);
            ctx.respond(StatusCode::OK, format!("limit={limit}"));
        })
        .unwrap()
        .post("/pets", |ctx: &mut Context| {
            let body = ctx.body.clone();
            ctx.respond(StatusCode::CREATED, body);
        })
        .unwrap()
        .get("/pets/:id", |ctx: &mut Context| {
            let id = ctx.path_value("id").into_result().unwrap_or_default();
            ctx.respond(StatusCode::OK, format!("pet {id}"));
        })
        .unwrap()
        .delete("/pets/:id", |ctx: &mut Context| {
            ctx.resp_status = Some(StatusCode::NO_CONTENT);
        })
        .unwrap()
        .get("/docs/*", |ctx: &mut Context| {
            let route = ctx.matched_route().unwrap_or_default().to_string();
            ctx.respond(StatusCode::OK, route);
        })
        .unwrap();
    dispatcher
}

#[test]
fn test_dispatch_binds_path_params() {
    let service = pet_dispatcher().into_service();
    let res = service.handle(get("/pets/42"));
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.body(), b"pet 42");
}

#[test]
fn test_dispatch_decodes_encoded_path_params() {
    let mut dispatcher = Dispatcher::new();
    dispatcher
        .get("/users/:name", |ctx: &mut Context| {
            let name = ctx.path_value("name").into_result().unwrap_or_default();
            ctx.respond(StatusCode::OK, name);
        })
        .unwrap();
    let service = dispatcher.into_service();

    let res = service.handle(get("/users/john%20doe"));
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.body(), b"john doe");

    let res = service.handle(get("/users/a%2Fb"));
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.body(), b"a/b");
}

#[test]
fn test_dispatch_query_and_body() {
    let service = pet_dispatcher().into_service();

    let res = service.handle(get("/pets?limit=5"));
    assert_eq!(res.body(), b"limit=5");

    let res = service.handle(
        Request::post("/pets")
            .body(b"{\"name\":\"rex\"}".to_vec())
            .unwrap(),
    );
    assert_eq!(res.status(), StatusCode::CREATED);
    assert_eq!(res.body(), b"{\"name\":\"rex\"}");
}

#[test]
fn test_unmatched_request_gets_fixed_404() {
    let service = pet_dispatcher().into_service();
    for req in [
        get("/nothing/here"),
        Request::put("/pets/1").body(Vec::new()).unwrap(),
        get("/pets/1/toys"),
    ] {
        let res = service.handle(req);
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(res.body(), NOT_FOUND_BODY);
    }
}

#[test]
fn test_intermediate_node_is_not_found() {
    let service = pet_dispatcher().into_service();
    let res = service.handle(get("/docs"));
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.body(), b"NOT FOUND");

    let res = service.handle(get("/docs/guide/intro.html"));
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.body(), b"/docs/*");
}

#[test]
fn test_status_without_body() {
    let service = pet_dispatcher().into_service();
    let mut sink = BufferedSink::new();
    service.serve(Context::new(Method::DELETE, "/pets/9"), &mut sink);
    assert_eq!(sink.status(), Some(StatusCode::NO_CONTENT));
    assert!(sink.body().is_empty());
}

#[test]
fn test_handler_without_status_defaults_to_ok() {
    let mut dispatcher = Dispatcher::new();
    dispatcher
        .get("/plain", |ctx: &mut Context| ctx.resp_body = b"plain".to_vec())
        .unwrap();
    let service = dispatcher.into_service();

    let mut sink = BufferedSink::new();
    service.serve(Context::new(Method::GET, "/plain"), &mut sink);
    assert_eq!(sink.status(), None);
    assert_eq!(sink.into_response().status(), StatusCode::OK);
}

#[test]
fn test_call_leaves_matched_route_on_context() {
    let service = pet_dispatcher().into_service();
    let mut ctx = Context::new(Method::GET, "/pets/7");
    service.call(&mut ctx);
    assert_eq!(ctx.matched_route(), Some("/pets/:id"));
    assert_eq!(ctx.get_path_param("id"), Some("7"));

    let mut ctx = Context::new(Method::GET, "/missing");
    service.call(&mut ctx);
    assert_eq!(ctx.matched_route(), None);
    assert_eq!(ctx.resp_status, Some(StatusCode::NOT_FOUND));
}

#[test]
fn test_registration_errors_surface() {
    let mut dispatcher = pet_dispatcher();
    let err = dispatcher
        .get("/pets/:pet_id", |_ctx: &mut Context| {})
        .err()
        .unwrap();
    assert!(matches!(err, RouteError::ParamConflict { .. }));

    let err = dispatcher
        .get("/pets", |_ctx: &mut Context| {})
        .err()
        .unwrap();
    assert_eq!(
        err,
        RouteError::DuplicateRoute {
            method: Method::GET,
            path: "/pets".into()
        }
    );
    assert_eq!(dispatcher.router().route_count(), 5);
}

#[test]
fn test_strict_policy_dispatch() {
    let mut dispatcher = Dispatcher::with_policy(ConstraintPolicy::Strict);
    dispatcher
        .get(r"/orders/:id(\d+)", |ctx: &mut Context| {
            ctx.respond(StatusCode::OK, "order")
        })
        .unwrap();
    let service = dispatcher.into_service();
    assert_eq!(service.handle(get("/orders/10")).status(), StatusCode::OK);
    assert_eq!(
        service.handle(get("/orders/ten")).status(),
        StatusCode::NOT_FOUND
    );
}

fn tagger(
    log: &Arc<Mutex<Vec<String>>>,
    name: &'static str,
) -> impl Fn(HandlerRef) -> HandlerRef + Send + Sync {
    let log = Arc::clone(log);
    move |next: HandlerRef| -> HandlerRef {
        let log = Arc::clone(&log);
        Arc::new(move |ctx: &mut Context| {
            log.lock().push(format!("{name} in"));
            next.invoke(ctx);
            log.lock().push(format!("{name} out"));
        })
    }
}

#[test]
fn test_middleware_runs_as_onion() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut dispatcher = Dispatcher::new();
    let inner = Arc::clone(&log);
    dispatcher
        .get("/", move |ctx: &mut Context| {
            inner.lock().push("handler".to_string());
            ctx.respond(StatusCode::OK, "root");
        })
        .unwrap()
        .add_middleware(tagger(&log, "A"))
        .add_middleware(tagger(&log, "B"));
    let service = dispatcher.into_service();

    service.handle(get("/"));
    assert_eq!(
        *log.lock(),
        vec!["A in", "B in", "handler", "B out", "A out"]
    );

    // unmatched requests still pass through every middleware
    log.lock().clear();
    let res = service.handle(get("/missing"));
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(*log.lock(), vec!["A in", "B in", "B out", "A out"]);
}

#[test]
fn test_middleware_can_rewrite_response() {
    let mut dispatcher = pet_dispatcher();
    dispatcher.add_middleware(|next: HandlerRef| -> HandlerRef {
        Arc::new(move |ctx: &mut Context| {
            next.invoke(ctx);
            if ctx.resp_status == Some(StatusCode::NOT_FOUND) {
                ctx.respond(StatusCode::NOT_FOUND, "custom not found");
            }
        })
    });
    let service = dispatcher.into_service();
    assert_eq!(service.handle(get("/nope")).body(), b"custom not found");
    assert_eq!(service.handle(get("/pets/3")).body(), b"pet 3");
}

#[test]
fn test_short_write_is_logged_and_request_completes() {
    let service = pet_dispatcher().into_service();
    let mut sink = ShortSink::new(3);

    let ((), logs) = capture_json(|| {
        service.serve(Context::new(Method::GET, "/pets/12345"), &mut sink)
    });

    assert_eq!(sink.status, Some(StatusCode::OK));
    assert_eq!(sink.body, b"pet");
    let contents = logs.contents();
    assert!(contents.contains("Short write while flushing response body"), "{contents}");
    assert!(contents.contains("\"ERROR\""), "{contents}");
}

#[test]
fn test_write_error_is_logged() {
    let service = pet_dispatcher().into_service();
    let mut sink = BrokenSink::default();

    let ((), logs) = capture_json(|| {
        service.serve(Context::new(Method::GET, "/pets/1"), &mut sink)
    });

    assert_eq!(sink.status, Some(StatusCode::OK));
    let contents = logs.contents();
    assert!(contents.contains("Failed to flush response body"), "{contents}");
    assert!(contents.contains("connection closed"), "{contents}");
}

#[test]
fn test_request_id_header_is_honoured() {
    let id = RequestId::new();
    let mut dispatcher = Dispatcher::new();
    dispatcher
        .get("/whoami", |ctx: &mut Context| {
            let id = ctx.request_id.to_string();
            ctx.respond(StatusCode::OK, id);
        })
        .unwrap();
    let service = dispatcher.into_service();

    let req = Request::get("/whoami")
        .header("x-request-id", id.to_string())
        .body(Vec::new())
        .unwrap();
    assert_eq!(service.handle(req).body(), id.to_string().as_bytes());
}

#[test]
fn test_service_is_shared_across_threads() {
    let service = pet_dispatcher().into_service();
    let workers: Vec<_> = (0..4)
        .map(|i| {
            let service = service.clone();
            std::thread::spawn(move || {
                for n in 0..100 {
                    let res = service.handle(get(&format!("/pets/{i}{n}")));
                    assert_eq!(res.body(), format!("pet {i}{n}").as_bytes());
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }
}
