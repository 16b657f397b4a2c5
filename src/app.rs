//! Application builder and the immutable serving engine.
//!
//! [`App`] is the single-owner mutable builder: routes, middleware, error
//! handlers and static mounts are registered on it at setup time. `listen`
//! (or `into_engine`) seals it into an [`Engine`] snapshot that is read-only
//! for its entire serving lifetime, so concurrent request tasks share it
//! without synchronization.

use std::path::PathBuf;
use std::sync::Arc;

use crate::error::EngineError;
use crate::http::request::{Method, RequestContext};
use crate::http::response::Response;
use crate::pipeline::{
    ErrorMiddlewareEntry, Handler, HandlerFuture, MiddlewareEntry, MiddlewareKind,
};
use crate::router::{PathPattern, Route, RouteTable};
use crate::static_files::{StaticMount, StaticOptions};

/// Mutable application builder.
#[derive(Default)]
pub struct App {
    routes: RouteTable,
    middleware: Vec<MiddlewareEntry>,
    error_middleware: Vec<ErrorMiddlewareEntry>,
    statics: Vec<Arc<StaticMount>>,
}

/// Immutable snapshot of a built [`App`], shared across connection tasks.
pub struct Engine {
    pub(crate) routes: RouteTable,
    pub(crate) middleware: Vec<MiddlewareEntry>,
    pub(crate) error_middleware: Vec<ErrorMiddlewareEntry>,
    pub(crate) statics: Vec<Arc<StaticMount>>,
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a route with an explicit handler chain.
    ///
    /// Routes are matched in registration order; the first structural match
    /// wins, even when a later route shares the same shape.
    pub fn route(&mut self, method: Method, pattern: &str, handlers: Vec<Handler>) -> &mut Self {
        self.routes.push(Route {
            method,
            pattern: PathPattern::parse(pattern),
            handlers,
        });
        self
    }

    /// Registers a GET route.
    pub fn get<F>(&mut self, pattern: &str, handler: F) -> &mut Self
    where
        F: for<'a> Fn(&'a mut RequestContext, &'a mut Response) -> HandlerFuture<'a>
            + Send
            + Sync
            + 'static,
    {
        self.route(Method::GET, pattern, vec![Box::new(handler)])
    }

    /// Registers a POST route.
    pub fn post<F>(&mut self, pattern: &str, handler: F) -> &mut Self
    where
        F: for<'a> Fn(&'a mut RequestContext, &'a mut Response) -> HandlerFuture<'a>
            + Send
            + Sync
            + 'static,
    {
        self.route(Method::POST, pattern, vec![Box::new(handler)])
    }

    /// Registers a PUT route.
    pub fn put<F>(&mut self, pattern: &str, handler: F) -> &mut Self
    where
        F: for<'a> Fn(&'a mut RequestContext, &'a mut Response) -> HandlerFuture<'a>
            + Send
            + Sync
            + 'static,
    {
        self.route(Method::PUT, pattern, vec![Box::new(handler)])
    }

    /// Registers a PATCH route.
    pub fn patch<F>(&mut self, pattern: &str, handler: F) -> &mut Self
    where
        F: for<'a> Fn(&'a mut RequestContext, &'a mut Response) -> HandlerFuture<'a>
            + Send
            + Sync
            + 'static,
    {
        self.route(Method::PATCH, pattern, vec![Box::new(handler)])
    }

    /// Registers a DELETE route.
    pub fn delete<F>(&mut self, pattern: &str, handler: F) -> &mut Self
    where
        F: for<'a> Fn(&'a mut RequestContext, &'a mut Response) -> HandlerFuture<'a>
            + Send
            + Sync
            + 'static,
    {
        self.route(Method::DELETE, pattern, vec![Box::new(handler)])
    }

    /// Registers a HEAD route.
    pub fn head<F>(&mut self, pattern: &str, handler: F) -> &mut Self
    where
        F: for<'a> Fn(&'a mut RequestContext, &'a mut Response) -> HandlerFuture<'a>
            + Send
            + Sync
            + 'static,
    {
        self.route(Method::HEAD, pattern, vec![Box::new(handler)])
    }

    /// Registers an OPTIONS route.
    pub fn options<F>(&mut self, pattern: &str, handler: F) -> &mut Self
    where
        F: for<'a> Fn(&'a mut RequestContext, &'a mut Response) -> HandlerFuture<'a>
            + Send
            + Sync
            + 'static,
    {
        self.route(Method::OPTIONS, pattern, vec![Box::new(handler)])
    }

    /// Registers a TRACE route.
    pub fn trace<F>(&mut self, pattern: &str, handler: F) -> &mut Self
    where
        F: for<'a> Fn(&'a mut RequestContext, &'a mut Response) -> HandlerFuture<'a>
            + Send
            + Sync
            + 'static,
    {
        self.route(Method::TRACE, pattern, vec![Box::new(handler)])
    }

    /// Registers a CONNECT route.
    pub fn connect<F>(&mut self, pattern: &str, handler: F) -> &mut Self
    where
        F: for<'a> Fn(&'a mut RequestContext, &'a mut Response) -> HandlerFuture<'a>
            + Send
            + Sync
            + 'static,
    {
        self.route(Method::CONNECT, pattern, vec![Box::new(handler)])
    }

    /// Registers the same handler under every verb.
    pub fn all<F>(&mut self, pattern: &str, handler: F) -> &mut Self
    where
        F: for<'a> Fn(&'a mut RequestContext, &'a mut Response) -> HandlerFuture<'a>
            + Send
            + Sync
            + Clone
            + 'static,
    {
        for method in Method::ALL {
            self.route(method, pattern, vec![Box::new(handler.clone())]);
        }
        self
    }

    /// Registers middleware mounted at `/` (runs for every request).
    pub fn middleware<F>(&mut self, handler: F) -> &mut Self
    where
        F: for<'a> Fn(&'a mut RequestContext, &'a mut Response) -> HandlerFuture<'a>
            + Send
            + Sync
            + 'static,
    {
        self.middleware_at("/", handler)
    }

    /// Registers middleware scoped to a mount path.
    ///
    /// The middleware runs only when the mount is a string prefix of the
    /// request pathname.
    pub fn middleware_at<F>(&mut self, mount: &str, handler: F) -> &mut Self
    where
        F: for<'a> Fn(&'a mut RequestContext, &'a mut Response) -> HandlerFuture<'a>
            + Send
            + Sync
            + 'static,
    {
        self.middleware.push(MiddlewareEntry {
            mount: mount.to_string(),
            kind: MiddlewareKind::Func(Box::new(handler)),
        });
        self
    }

    /// Registers an error handler mounted at `/`.
    pub fn error_middleware<F>(&mut self, handler: F) -> &mut Self
    where
        F: for<'a> Fn(
                &'a anyhow::Error,
                &'a mut RequestContext,
                &'a mut Response,
            ) -> HandlerFuture<'a>
            + Send
            + Sync
            + 'static,
    {
        self.error_middleware_at("/", handler)
    }

    /// Registers an error handler scoped to a mount path.
    ///
    /// Error entries live in their own sequence, separate from ordinary
    /// middleware; classification happens here at registration, never by
    /// inspecting the handler's shape.
    pub fn error_middleware_at<F>(&mut self, mount: &str, handler: F) -> &mut Self
    where
        F: for<'a> Fn(
                &'a anyhow::Error,
                &'a mut RequestContext,
                &'a mut Response,
            ) -> HandlerFuture<'a>
            + Send
            + Sync
            + 'static,
    {
        self.error_middleware.push(ErrorMiddlewareEntry {
            mount: mount.to_string(),
            handler: Box::new(handler),
        });
        self
    }

    /// Registers a static directory mount.
    ///
    /// The mount participates in the middleware sequence at its
    /// registration position, and its index document becomes an SPA
    /// fallback candidate for unmatched routes.
    pub fn static_dir(
        &mut self,
        mount: &str,
        dir: impl Into<PathBuf>,
        options: StaticOptions,
    ) -> &mut Self {
        let static_mount = Arc::new(StaticMount::new(mount, dir, options));
        self.middleware.push(MiddlewareEntry {
            mount: mount.to_string(),
            kind: MiddlewareKind::Static(static_mount.clone()),
        });
        self.statics.push(static_mount);
        self
    }

    /// Seals the builder into the read-only serving snapshot.
    pub fn into_engine(self) -> Arc<Engine> {
        Arc::new(Engine {
            routes: self.routes,
            middleware: self.middleware,
            error_middleware: self.error_middleware,
            statics: self.statics,
        })
    }

    /// Validates the listen configuration, binds, and serves until the
    /// accept loop fails.
    ///
    /// The port is checked before any socket is opened; an out-of-range
    /// value fails fast with [`EngineError::InvalidPort`]. The host defaults
    /// to bind-all.
    pub async fn listen(self, port: u32, host: Option<&str>) -> anyhow::Result<()> {
        if port == 0 || port > 65535 {
            return Err(EngineError::InvalidPort(port).into());
        }

        let host = host.unwrap_or("0.0.0.0");
        let addr = format!("{host}:{port}");
        let engine = self.into_engine();

        crate::server::listener::run(engine, &addr).await
    }
}
