//! Request pipeline: middleware cursor, route dispatch and error sweep.
//!
//! Continuation passing (`next()` style) is re-expressed as an explicit
//! cursor into the middleware sequence plus `Result`-returning handlers:
//! returning `Ok(())` advances the cursor, returning `Err(e)` transitions to
//! the error state, and a terminal write on the response short-circuits the
//! rest of the pipeline.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::app::Engine;
use crate::http::body::Body;
use crate::http::request::{Request, RequestContext};
use crate::http::response::{Response, StatusCode};
use crate::router::RouteMatch;
use crate::static_files::{ServeOutcome, StaticMount};

/// Handlers signal `next()` with `Ok(())` and `next(err)` with `Err(e)`.
pub type HandlerResult = anyhow::Result<()>;

/// The boxed future a handler invocation yields.
pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = HandlerResult> + Send + 'a>>;

/// An ordinary middleware or route handler.
pub type Handler = Box<
    dyn for<'a> Fn(&'a mut RequestContext, &'a mut Response) -> HandlerFuture<'a> + Send + Sync,
>;

/// An error-pipeline handler. Receives the propagating error first;
/// returning `Err(new)` replaces that error for the rest of the sweep.
pub type ErrorHandler = Box<
    dyn for<'a> Fn(&'a anyhow::Error, &'a mut RequestContext, &'a mut Response) -> HandlerFuture<'a>
        + Send
        + Sync,
>;

/// What a middleware entry does when its turn comes.
///
/// Entries are tagged at registration time; nothing is inferred from
/// handler shape. Static mounts participate in the ordinary middleware
/// sequence: a file hit ends the response, a miss advances the cursor.
pub enum MiddlewareKind {
    Func(Handler),
    Static(Arc<StaticMount>),
}

/// A path-scoped middleware entry.
pub struct MiddlewareEntry {
    /// Applies only when this is a prefix of the request pathname.
    pub mount: String,
    pub kind: MiddlewareKind,
}

/// A path-scoped error-pipeline entry, kept in its own sequence.
pub struct ErrorMiddlewareEntry {
    /// Applies only when this is a prefix of the raw request target path.
    pub mount: String,
    pub handler: ErrorHandler,
}

/// Explicit pipeline progress for one request.
enum PipelineState {
    /// Cursor into the middleware sequence.
    Running(usize),
    /// Middleware exhausted; hand off to route dispatch.
    Dispatching,
    /// A stage signaled failure; run the error pipeline.
    Failed(anyhow::Error),
    Done,
}

impl Engine {
    /// Runs one request through the full pipeline and always yields a
    /// complete response. Handler failures are confined to this request.
    pub async fn handle(&self, request: Request) -> Response {
        let mut res = Response::new();
        let mut ctx = RequestContext::new(&request);

        // The payload is decoded before dispatch for mutating verbs; a
        // malformed body is a handler error, not a dead connection.
        let mut state = if ctx.method.is_mutating() {
            match Body::parse(request.header("Content-Type"), &request.body) {
                Ok(body) => {
                    ctx.body = body;
                    PipelineState::Running(0)
                }
                Err(e) => PipelineState::Failed(e),
            }
        } else {
            PipelineState::Running(0)
        };

        loop {
            state = match state {
                PipelineState::Running(cursor) => self.step(cursor, &mut ctx, &mut res).await,
                PipelineState::Dispatching => self.dispatch(&mut ctx, &mut res).await,
                PipelineState::Failed(err) => {
                    self.run_error_pipeline(err, &mut ctx, &mut res).await;
                    PipelineState::Done
                }
                PipelineState::Done => break,
            };
        }

        res
    }

    /// One middleware-pipeline step at `cursor`.
    async fn step(
        &self,
        cursor: usize,
        ctx: &mut RequestContext,
        res: &mut Response,
    ) -> PipelineState {
        if res.is_ended() {
            return PipelineState::Done;
        }

        let Some(entry) = self.middleware.get(cursor) else {
            return PipelineState::Dispatching;
        };

        // Mount gating is a plain prefix test on the pathname, not a
        // segment-aware match: "/admin" also gates "/admin2".
        if !ctx.pathname.starts_with(&entry.mount) {
            return PipelineState::Running(cursor + 1);
        }

        match &entry.kind {
            MiddlewareKind::Func(handler) => match handler(ctx, res).await {
                Ok(()) => PipelineState::Running(cursor + 1),
                Err(e) => PipelineState::Failed(e),
            },
            MiddlewareKind::Static(mount) => match mount.serve(&ctx.pathname, res).await {
                // A hit ended the response; the next step observes that.
                Ok(ServeOutcome::Served) | Ok(ServeOutcome::Missing) => {
                    PipelineState::Running(cursor + 1)
                }
                Err(e) => PipelineState::Failed(e),
            },
        }
    }

    /// Route dispatch plus the matched route's own handler chain.
    async fn dispatch(&self, ctx: &mut RequestContext, res: &mut Response) -> PipelineState {
        if res.is_ended() {
            return PipelineState::Done;
        }

        match self.routes.dispatch(&ctx.method, &ctx.pathname) {
            Some(RouteMatch { route, params }) => {
                ctx.params = params;

                // No mount gating here: the route already matched, every
                // handler in the chain runs unless the response ends.
                for handler in &route.handlers {
                    if res.is_ended() {
                        break;
                    }
                    if let Err(e) = handler(ctx, res).await {
                        return PipelineState::Failed(e);
                    }
                }
                PipelineState::Done
            }
            None => self.fallback(ctx, res).await,
        }
    }

    /// SPA fallback after a full route-table miss, else 404.
    async fn fallback(&self, ctx: &mut RequestContext, res: &mut Response) -> PipelineState {
        for mount in &self.statics {
            match mount.serve_index(res).await {
                Ok(ServeOutcome::Served) => return PipelineState::Done,
                Ok(ServeOutcome::Missing) => continue,
                Err(e) => return PipelineState::Failed(e),
            }
        }

        tracing::debug!(method = ctx.method.as_str(), path = %ctx.target, "No route matched");
        res.status(StatusCode::NotFound)
            .send(StatusCode::NotFound.reason_phrase());
        PipelineState::Done
    }

    /// One forward sweep over the error handlers.
    ///
    /// A handler that fails replaces the propagating error and the sweep
    /// continues; it never recurses into the middleware pipeline. If the
    /// sweep ends with the response still open, a fixed 500 goes out.
    pub(crate) async fn run_error_pipeline(
        &self,
        err: anyhow::Error,
        ctx: &mut RequestContext,
        res: &mut Response,
    ) {
        tracing::warn!(path = %ctx.target, error = %err, "Request entered error pipeline");

        let mut err = err;
        for entry in &self.error_middleware {
            if res.is_ended() {
                return;
            }
            // Error entries gate on the raw target path, not the parsed
            // pathname.
            if !ctx.target.starts_with(&entry.mount) {
                continue;
            }
            let outcome = (entry.handler)(&err, ctx, res).await;
            if let Err(new_err) = outcome {
                err = new_err;
            }
        }

        if !res.is_ended() {
            tracing::error!(path = %ctx.target, error = %err, "Error pipeline exhausted");
            res.status(StatusCode::InternalServerError)
                .send(StatusCode::InternalServerError.reason_phrase());
        }
    }
}
