use junction::app::App;
use junction::config::Config;
use junction::http::request::RequestContext;
use junction::http::response::{Response, StatusCode};
use junction::pipeline::HandlerFuture;
use junction::static_files::StaticOptions;

fn health<'a>(_req: &'a mut RequestContext, res: &'a mut Response) -> HandlerFuture<'a> {
    Box::pin(async move { res.json(&serde_json::json!({ "status": "ok" })) })
}

fn hello<'a>(req: &'a mut RequestContext, res: &'a mut Response) -> HandlerFuture<'a> {
    Box::pin(async move {
        let name = req.param("name").unwrap_or("world");
        res.send(format!("Hello, {name}!"));
        Ok(())
    })
}

fn echo<'a>(req: &'a mut RequestContext, res: &'a mut Response) -> HandlerFuture<'a> {
    Box::pin(async move {
        match req.body.as_json() {
            Some(value) => res.json(value),
            None => {
                res.status(StatusCode::BadRequest).send("expected a JSON body");
                Ok(())
            }
        }
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load()?;

    let mut app = App::new();
    app.get("/health", health);
    app.get("/hello/:name", hello);
    app.post("/echo", echo);

    if let Some(static_cfg) = &cfg.static_files {
        app.static_dir(
            &static_cfg.mount,
            &static_cfg.dir,
            StaticOptions {
                index: static_cfg.index.clone(),
                max_age: static_cfg.max_age,
                mime_type: None,
            },
        );
    }

    tokio::select! {
        res = app.listen(cfg.server.port, Some(&cfg.server.host)) => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
