//! `patmux run` - serve the configured route table.
//!
//! Loads the route table from a config file, mounts it on a fresh
//! [`ServeMux`], and starts the Axum HTTP server with graceful shutdown.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use crate::cli::RunArgs;
use crate::config::model::Config;
use crate::config::sources::FileSource;
use crate::config::{ConfigSource, ConfigVersion};
use crate::error::PatmuxError;
use crate::logging;
use crate::mux::ServeMux;
use crate::routes;
use crate::server::{self, AppState, LoadedConfig};

const CANDIDATES: [&str; 4] = ["patmux.yaml", "patmux.yml", "patmux.json", "patmux.toml"];

pub async fn execute(args: RunArgs) -> Result<(), PatmuxError> {
    logging::init(
        &args.log_level,
        logging::resolve_format(args.pretty, args.json),
    );

    let source = resolve_file_source(args.config.as_deref()).await?;
    let (config, version) = source.load().await?;

    let mux = ServeMux::new();
    routes::mount(&mux, &config)?;

    let state = Arc::new(AppState {
        mux,
        config: LoadedConfig {
            version,
            source_name: source.name().to_string(),
            routes: config.routes.len(),
        },
        start_time: Instant::now(),
    });
    let route_count = state.config.routes;
    let entry_count = state.mux.len();

    let router = server::build_router(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(
        addr = %addr,
        routes = route_count,
        entries = entry_count,
        "patmux started"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(server::shutdown_signal())
        .await?;

    tracing::info!("patmux stopped");
    Ok(())
}

/// Loads and validates the config named by `explicit`, or the first
/// `patmux.*` file found in the current directory.
pub async fn load_config(
    explicit: Option<&Path>,
) -> Result<(Config, ConfigVersion), PatmuxError> {
    resolve_file_source(explicit).await?.load().await
}

async fn resolve_file_source(
    explicit: Option<&Path>,
) -> Result<Box<dyn ConfigSource>, PatmuxError> {
    if let Some(path) = explicit {
        return create_file_source(path);
    }

    for name in &CANDIDATES {
        let path = PathBuf::from(name);
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            tracing::info!(path = %path.display(), "auto-detected config file");
            return create_file_source(&path);
        }
    }

    Err(PatmuxError::NoConfigSource {
        hint: format!(
            "Provide --config <file> or create one of: {}",
            CANDIDATES.join(", ")
        ),
    })
}

fn create_file_source(path: &Path) -> Result<Box<dyn ConfigSource>, PatmuxError> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    match ext {
        #[cfg(feature = "yaml")]
        "yaml" | "yml" => Ok(Box::new(FileSource::yaml(path.to_path_buf()))),

        #[cfg(feature = "json")]
        "json" => Ok(Box::new(FileSource::json(path.to_path_buf()))),

        #[cfg(feature = "toml")]
        "toml" => Ok(Box::new(FileSource::toml(path.to_path_buf()))),

        other => Err(PatmuxError::UnsupportedFormat(other.to_string())),
    }
}
