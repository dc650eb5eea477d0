use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use http::{Method, Request, StatusCode};
use tracing::info;

use crate::context::Context;
use crate::dispatcher::{Dispatcher, Service};
use crate::logging::init_logging;
use crate::middleware::{AccessLogMiddleware, Around, MetricsMiddleware, TracingMiddleware};
use crate::runtime_config::RuntimeConfig;

/// Command-line interface for brrtdispatch
#[derive(Parser)]
#[command(name = "brrtdispatch")]
#[command(about = "brrtdispatch CLI", long_about = None)]
pub struct Cli {
    /// YAML runtime configuration (environment variables still apply)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Print the demo routing table
    Routes,
    /// Run one request through the demo service and print the response
    Dispatch {
        /// HTTP method, e.g. GET
        method: String,
        /// Request path, optionally with a query string
        path: String,
        /// Request body
        #[arg(short, long)]
        body: Option<String>,
    },
}

/// Register the demo routes used by the CLI
///
/// # Errors
///
/// Any route registration error; the routing table is static so this only
/// fails if the table itself is broken.
pub fn register_demo_routes(dispatcher: &mut Dispatcher) -> Result<()> {
    dispatcher
        .get("/", |ctx: &mut Context| ctx.respond(StatusCode::OK, "brrtdispatch"))?
        .get("/health", |ctx: &mut Context| ctx.respond(StatusCode::OK, "ok"))?
        .get("/pets", |ctx: &mut Context| {
            let limit = ctx.query_value("limit").as_i64().unwrap_or(10);
            ctx.respond(StatusCode::OK, format!("listing {limit} pets"));
        })?
        .post("/pets", |ctx: &mut Context| {
            let name = String::from_utf8_lossy(&ctx.body).into_owned();
            ctx.respond(StatusCode::CREATED, format!("created {name}"));
        })?
        .get(r"/pets/:id(\d+)", |ctx: &mut Context| match ctx.path_value("id").as_i64() {
            Ok(id) => ctx.respond(StatusCode::OK, format!("pet {id}")),
            Err(e) => ctx.respond(StatusCode::BAD_REQUEST, e.to_string()),
        })?
        .get("/users/:user_id/posts/:post_id", |ctx: &mut Context| {
            let user = ctx.path_value("user_id").into_result().unwrap_or_default();
            let post = ctx.path_value("post_id").into_result().unwrap_or_default();
            ctx.respond(StatusCode::OK, format!("post {post} of user {user}"));
        })?
        .get("/static/*", |ctx: &mut Context| {
            let file = ctx.path.trim_start_matches("/static/").to_string();
            ctx.respond(StatusCode::OK, file);
        })?;
    Ok(())
}

/// Build a dispatcher from the runtime configuration
///
/// Bundled middlewares are installed outermost first: tracing, access log,
/// metrics. The metrics handle is returned when metrics are enabled.
pub fn build_dispatcher(config: &RuntimeConfig) -> (Dispatcher, Option<Arc<MetricsMiddleware>>) {
    let mut dispatcher = Dispatcher::with_policy(config.router.constraint_policy);
    if config.middleware.tracing {
        dispatcher.add_middleware(TracingMiddleware);
    }
    if config.middleware.access_log {
        dispatcher.add_middleware(AccessLogMiddleware::new());
    }
    let metrics = config.middleware.metrics.then(|| {
        let metrics = Arc::new(MetricsMiddleware::new());
        dispatcher.add_middleware(Around::new(Arc::clone(&metrics)));
        metrics
    });
    (dispatcher, metrics)
}

fn load_config(path: Option<&PathBuf>) -> Result<RuntimeConfig> {
    let mut config = match path {
        Some(path) => RuntimeConfig::load(path)?,
        None => RuntimeConfig::default(),
    };
    config.apply_overrides(|key| std::env::var(key).ok());
    Ok(config)
}

fn demo_service(config: &RuntimeConfig) -> Result<(Service, Option<Arc<MetricsMiddleware>>)> {
    let (mut dispatcher, metrics) = build_dispatcher(config);
    register_demo_routes(&mut dispatcher).context("Failed to register routes")?;
    Ok((dispatcher.into_service(), metrics))
}

/// Entry point of the `brrtdispatch` binary
///
/// # Errors
///
/// Configuration, logging or route registration failures. All of them abort
/// before any request is dispatched.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;
    init_logging(&config.logging)?;

    let (service, metrics) = demo_service(&config)?;
    match cli.command {
        Commands::Routes => service.router().dump_routes(),
        Commands::Dispatch { method, path, body } => {
            let method: Method = method
                .to_uppercase()
                .parse()
                .with_context(|| format!("Invalid HTTP method '{method}'"))?;
            let req = Request::builder()
                .method(method)
                .uri(path.as_str())
                .body(body.unwrap_or_default().into_bytes())
                .with_context(|| format!("Invalid request path '{path}'"))?;

            let res = service.handle(req);
            println!("{}", res.status());
            println!("{}", String::from_utf8_lossy(res.body()));

            if let Some(metrics) = metrics {
                info!(
                    requests = metrics.request_count(),
                    not_found = metrics.not_found_count(),
                    average_latency_us = u64::try_from(metrics.average_latency().as_micros())
                        .unwrap_or(u64::MAX),
                    "Dispatch metrics"
                );
            }
        }
    }
    Ok(())
}
