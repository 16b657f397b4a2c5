use junction::app::App;
use junction::http::request::{Method, Request, RequestBuilder, RequestContext};
use junction::http::response::{Response, StatusCode};
use junction::pipeline::HandlerFuture;

fn request(method: Method, target: &str) -> Request {
    RequestBuilder::new()
        .method(method)
        .target(target)
        .build()
        .unwrap()
}

fn json_request(target: &str, payload: &[u8]) -> Request {
    RequestBuilder::new()
        .method(Method::POST)
        .target(target)
        .header("Content-Type", "application/json")
        .body(payload.to_vec())
        .build()
        .unwrap()
}

fn body_str(res: &Response) -> String {
    String::from_utf8(res.body.clone()).unwrap()
}

// --- handlers used across the tests ---

fn push_a<'a>(req: &'a mut RequestContext, _res: &'a mut Response) -> HandlerFuture<'a> {
    Box::pin(async move {
        req.locals.entry("trail".to_string()).or_default().push('a');
        Ok(())
    })
}

fn push_b<'a>(req: &'a mut RequestContext, _res: &'a mut Response) -> HandlerFuture<'a> {
    Box::pin(async move {
        req.locals.entry("trail".to_string()).or_default().push('b');
        Ok(())
    })
}

fn send_trail<'a>(req: &'a mut RequestContext, res: &'a mut Response) -> HandlerFuture<'a> {
    Box::pin(async move {
        let trail = req.locals.get("trail").cloned().unwrap_or_default();
        res.send(trail);
        Ok(())
    })
}

fn send_ok<'a>(_req: &'a mut RequestContext, res: &'a mut Response) -> HandlerFuture<'a> {
    Box::pin(async move {
        res.send("ok");
        Ok(())
    })
}

fn send_first<'a>(_req: &'a mut RequestContext, res: &'a mut Response) -> HandlerFuture<'a> {
    Box::pin(async move {
        res.send("first");
        Ok(())
    })
}

fn send_second<'a>(_req: &'a mut RequestContext, res: &'a mut Response) -> HandlerFuture<'a> {
    Box::pin(async move {
        res.status(StatusCode::BadRequest);
        res.send("second");
        Ok(())
    })
}

fn send_param_id<'a>(req: &'a mut RequestContext, res: &'a mut Response) -> HandlerFuture<'a> {
    Box::pin(async move {
        let id = req.param("id").unwrap_or("none").to_string();
        res.send(id);
        Ok(())
    })
}

fn send_param_x<'a>(req: &'a mut RequestContext, res: &'a mut Response) -> HandlerFuture<'a> {
    Box::pin(async move {
        let x = req.param("x").unwrap_or("none").to_string();
        res.send(x);
        Ok(())
    })
}

fn send_query_and_hash<'a>(
    req: &'a mut RequestContext,
    res: &'a mut Response,
) -> HandlerFuture<'a> {
    Box::pin(async move {
        let q = req.query.get("q").cloned().unwrap_or_default();
        let hash = req.hash.clone().unwrap_or_default();
        res.send(format!("{q}/{hash}"));
        Ok(())
    })
}

fn echo_json<'a>(req: &'a mut RequestContext, res: &'a mut Response) -> HandlerFuture<'a> {
    Box::pin(async move {
        match req.body.as_json() {
            Some(value) => res.json(value),
            None => {
                res.send("no body");
                Ok(())
            }
        }
    })
}

fn send_form_name<'a>(req: &'a mut RequestContext, res: &'a mut Response) -> HandlerFuture<'a> {
    Box::pin(async move {
        let name = req
            .body
            .as_form()
            .and_then(|form| form.get("name").cloned())
            .unwrap_or_default();
        res.send(name);
        Ok(())
    })
}

fn set_status_only<'a>(_req: &'a mut RequestContext, res: &'a mut Response) -> HandlerFuture<'a> {
    Box::pin(async move {
        res.status(StatusCode::Created).set("X-Partial", "yes");
        Ok(())
    })
}

fn fail_with_boom<'a>(_req: &'a mut RequestContext, _res: &'a mut Response) -> HandlerFuture<'a> {
    Box::pin(async move { Err(anyhow::anyhow!("boom")) })
}

fn err_to_bad_request<'a>(
    err: &'a anyhow::Error,
    _req: &'a mut RequestContext,
    res: &'a mut Response,
) -> HandlerFuture<'a> {
    Box::pin(async move {
        res.status(StatusCode::BadRequest).send(format!("handled: {err}"));
        Ok(())
    })
}

fn replace_error<'a>(
    _err: &'a anyhow::Error,
    _req: &'a mut RequestContext,
    _res: &'a mut Response,
) -> HandlerFuture<'a> {
    Box::pin(async move { Err(anyhow::anyhow!("replaced")) })
}

// --- tests ---

#[tokio::test]
async fn test_route_handler_sends_response() {
    let mut app = App::new();
    app.get("/hello", send_ok);
    let engine = app.into_engine();

    let res = engine.handle(request(Method::GET, "/hello")).await;

    assert_eq!(res.status, StatusCode::Ok);
    assert_eq!(body_str(&res), "ok");
}

#[tokio::test]
async fn test_params_reach_the_handler() {
    let mut app = App::new();
    app.get("/users/:id", send_param_id);
    let engine = app.into_engine();

    let res = engine.handle(request(Method::GET, "/users/42")).await;

    assert_eq!(body_str(&res), "42");
}

#[tokio::test]
async fn test_query_and_hash_reach_the_handler() {
    let mut app = App::new();
    app.get("/search", send_query_and_hash);
    let engine = app.into_engine();

    let res = engine
        .handle(request(Method::GET, "/search?q=rust#results"))
        .await;

    assert_eq!(body_str(&res), "rust/results");
}

#[tokio::test]
async fn test_middleware_runs_in_registration_order() {
    let mut app = App::new();
    app.middleware(push_a);
    app.middleware(push_b);
    app.get("/", send_trail);
    let engine = app.into_engine();

    let res = engine.handle(request(Method::GET, "/")).await;

    assert_eq!(body_str(&res), "ab");
}

#[tokio::test]
async fn test_middleware_mount_gating() {
    let mut app = App::new();
    app.middleware_at("/admin", push_a);
    app.get("/admin/panel", send_trail);
    app.get("/other", send_trail);
    let engine = app.into_engine();

    let res = engine.handle(request(Method::GET, "/admin/panel")).await;
    assert_eq!(body_str(&res), "a");

    let res = engine.handle(request(Method::GET, "/other")).await;
    assert_eq!(body_str(&res), "");
}

#[tokio::test]
async fn test_mount_gating_is_plain_prefix_not_segment_aware() {
    let mut app = App::new();
    app.middleware_at("/admin", push_a);
    app.get("/admin2", send_trail);
    let engine = app.into_engine();

    // "/admin" string-prefixes "/admin2", so the middleware runs.
    let res = engine.handle(request(Method::GET, "/admin2")).await;
    assert_eq!(body_str(&res), "a");
}

#[tokio::test]
async fn test_failing_middleware_skips_dispatch_and_reaches_error_handler() {
    let mut app = App::new();
    app.middleware(fail_with_boom);
    app.middleware(push_b);
    app.get("/", send_ok);
    app.error_middleware(err_to_bad_request);
    let engine = app.into_engine();

    let res = engine.handle(request(Method::GET, "/")).await;

    assert_eq!(res.status, StatusCode::BadRequest);
    assert_eq!(body_str(&res), "handled: boom");
}

#[tokio::test]
async fn test_error_pipeline_exhausted_yields_fixed_500() {
    let mut app = App::new();
    app.middleware(fail_with_boom);
    app.get("/", send_ok);
    let engine = app.into_engine();

    let res = engine.handle(request(Method::GET, "/")).await;

    assert_eq!(res.status, StatusCode::InternalServerError);
    assert_eq!(body_str(&res), "Internal Server Error");
}

#[tokio::test]
async fn test_failing_error_handler_replaces_the_error() {
    let mut app = App::new();
    app.middleware(fail_with_boom);
    app.error_middleware(replace_error);
    app.error_middleware(err_to_bad_request);
    let engine = app.into_engine();

    let res = engine.handle(request(Method::GET, "/")).await;

    assert_eq!(res.status, StatusCode::BadRequest);
    assert_eq!(body_str(&res), "handled: replaced");
}

#[tokio::test]
async fn test_error_handlers_gate_on_raw_target_path() {
    let mut app = App::new();
    app.middleware(fail_with_boom);
    app.error_middleware_at("/api", err_to_bad_request);
    let engine = app.into_engine();

    let res = engine.handle(request(Method::GET, "/web/page")).await;
    assert_eq!(res.status, StatusCode::InternalServerError);

    let res = engine.handle(request(Method::GET, "/api/items")).await;
    assert_eq!(res.status, StatusCode::BadRequest);
    assert_eq!(body_str(&res), "handled: boom");
}

#[tokio::test]
async fn test_finalized_response_short_circuits_later_stages() {
    let mut app = App::new();
    app.middleware(send_first);
    app.middleware(send_second);
    app.get("/", send_ok);
    let engine = app.into_engine();

    let res = engine.handle(request(Method::GET, "/")).await;

    // The second middleware and the route handler never touch the response.
    assert_eq!(res.status, StatusCode::Ok);
    assert_eq!(body_str(&res), "first");
}

#[tokio::test]
async fn test_unmatched_route_without_static_is_404() {
    let app = App::new();
    let engine = app.into_engine();

    let res = engine.handle(request(Method::GET, "/nowhere")).await;

    assert_eq!(res.status, StatusCode::NotFound);
    assert_eq!(body_str(&res), "Not Found");
}

#[tokio::test]
async fn test_malformed_json_body_enters_error_pipeline() {
    let mut app = App::new();
    app.post("/echo", echo_json);
    app.error_middleware(err_to_bad_request);
    let engine = app.into_engine();

    let res = engine.handle(json_request("/echo", b"{not json")).await;

    assert_eq!(res.status, StatusCode::BadRequest);
    assert_eq!(body_str(&res), "handled: invalid JSON request body");
}

#[tokio::test]
async fn test_json_body_round_trips_through_handler() {
    let mut app = App::new();
    app.post("/echo", echo_json);
    let engine = app.into_engine();

    let res = engine
        .handle(json_request("/echo", br#"{"name":"junction"}"#))
        .await;

    assert_eq!(res.status, StatusCode::Ok);
    let value: serde_json::Value = serde_json::from_slice(&res.body).unwrap();
    assert_eq!(value["name"], "junction");
}

#[tokio::test]
async fn test_form_body_is_decoded_for_mutating_verbs() {
    let mut app = App::new();
    app.post("/submit", send_form_name);
    let engine = app.into_engine();

    let req = RequestBuilder::new()
        .method(Method::POST)
        .target("/submit")
        .header("Content-Type", "application/x-www-form-urlencoded")
        .body(b"name=ada&role=admin".to_vec())
        .build()
        .unwrap();
    let res = engine.handle(req).await;

    assert_eq!(body_str(&res), "ada");
}

#[tokio::test]
async fn test_route_chain_runs_in_order() {
    let mut app = App::new();
    app.route(
        Method::GET,
        "/chain",
        vec![Box::new(push_a), Box::new(push_b), Box::new(send_trail)],
    );
    let engine = app.into_engine();

    let res = engine.handle(request(Method::GET, "/chain")).await;

    assert_eq!(body_str(&res), "ab");
}

#[tokio::test]
async fn test_chain_error_bypasses_remaining_handlers() {
    let mut app = App::new();
    app.route(
        Method::GET,
        "/chain",
        vec![Box::new(fail_with_boom), Box::new(send_ok)],
    );
    app.error_middleware(err_to_bad_request);
    let engine = app.into_engine();

    let res = engine.handle(request(Method::GET, "/chain")).await;

    assert_eq!(res.status, StatusCode::BadRequest);
    assert_eq!(body_str(&res), "handled: boom");
}

#[tokio::test]
async fn test_first_registration_wins_for_shared_shapes() {
    let mut app = App::new();
    app.get("/a/:id", send_param_id);
    app.get("/a/:x", send_param_x);
    let engine = app.into_engine();

    let res = engine.handle(request(Method::GET, "/a/7")).await;

    // The first registration's parameter name binds.
    assert_eq!(body_str(&res), "7");
}

#[tokio::test]
async fn test_all_registers_every_verb() {
    let mut app = App::new();
    app.all("/any", send_ok);
    let engine = app.into_engine();

    for method in Method::ALL {
        let res = engine.handle(request(method, "/any")).await;
        assert_eq!(body_str(&res), "ok");
    }
}

#[tokio::test]
async fn test_chain_without_terminal_write_yields_accumulated_response() {
    let mut app = App::new();
    app.get("/partial", set_status_only);
    let engine = app.into_engine();

    let res = engine.handle(request(Method::GET, "/partial")).await;

    assert_eq!(res.status, StatusCode::Created);
    assert_eq!(res.headers.get("X-Partial").unwrap(), "yes");
    assert!(res.body.is_empty());
    assert!(!res.is_ended());
}
