use std::{
    net::{IpAddr, SocketAddr},
    path::PathBuf,
    process::ExitCode,
};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::Handle;
use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use finance_tracker::{
    AppState, CredentialSource, GoogleSheetGateway, SheetConfig, build_router,
    config::{DEFAULT_CREDENTIALS_ENV, DEFAULT_CREDENTIALS_FILE, DEFAULT_SHEET_NAME},
    graceful_shutdown, logging_middleware,
};

/// The REST API server for the finance tracker.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The address to listen on.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: IpAddr,

    /// The port to serve the API from.
    #[arg(short, long, env = "PORT", default_value_t = 3636)]
    port: u16,

    /// The title of the Google spreadsheet that stores the transactions.
    #[arg(long, env = "SHEET_NAME", default_value = DEFAULT_SHEET_NAME)]
    sheet_name: String,

    /// The environment variable that may hold the service account key as JSON.
    #[arg(long, env = "CREDENTIALS_ENV", default_value = DEFAULT_CREDENTIALS_ENV)]
    credentials_env: String,

    /// The service account key file, used when the environment variable is not set.
    #[arg(long, env = "CREDENTIALS_FILE", default_value = DEFAULT_CREDENTIALS_FILE)]
    credentials_file: PathBuf,

    /// The directory containing `index.html`, `service-worker.js` and other static files.
    #[arg(long, env = "STATIC_DIR", default_value = "static")]
    static_dir: PathBuf,

    /// The canonical timezone for timestamps, e.g. "Asia/Jakarta".
    #[arg(long, env = "TIMEZONE", default_value = "Etc/UTC")]
    timezone: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    setup_logging();

    let args = Args::parse();

    let config = SheetConfig {
        sheet_name: args.sheet_name,
        credentials: CredentialSource {
            env_var: args.credentials_env,
            file: args.credentials_file,
        },
        ..Default::default()
    };
    let gateway = GoogleSheetGateway::new(config).expect("Could not create the HTTP client.");

    let state = match AppState::new(gateway, &args.timezone, args.static_dir) {
        Ok(state) => state,
        Err(error) => {
            tracing::error!("Could not start the server: {error}");
            return ExitCode::FAILURE;
        }
    };

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = build_router(state).layer(middleware::from_fn(logging_middleware));
    let router = add_tracing_layer(router);

    let addr = SocketAddr::new(args.host, args.port);
    tracing::info!("HTTP server listening on {}", addr);
    axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
        .expect("Could not run the server.");

    ExitCode::SUCCESS
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().pretty())
        .init();
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // By default, `TraceLayer` will log 5xx responses but we're doing our specific
        // logging of errors so disable that
        .on_failure(());

    router.layer(tracing_layer)
}
