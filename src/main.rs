//! Trellis command line.
//!
//! ```text
//! trellis serve          boot the application and serve HTTP
//! trellis routes         print the route table
//! trellis route-cache    write the route table to the cache file
//! trellis check          boot without serving and report problems
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use trellis::config::{load_config, AppConfig};
use trellis::kernel::errors::report;
use trellis::kernel::KernelBuilder;
use trellis::lifecycle::signals::spawn_signal_listener;
use trellis::lifecycle::Shutdown;
use trellis::observability::{logging, metrics};
use trellis::HttpServer;

#[derive(Debug, Parser)]
#[command(name = "trellis", version, about = "Trellis web application")]
struct Cli {
    /// Configuration file. Defaults apply when it does not exist.
    #[arg(short, long, global = true, default_value = "trellis.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve HTTP (default).
    Serve {
        /// Override `server.bind_address`.
        #[arg(long)]
        bind: Option<String>,
    },
    /// Print the route table.
    Routes,
    /// Write the route table to `routing.cache_path`.
    RouteCache,
    /// Boot the application and report configuration, view and route problems.
    Check,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match read_config(&cli.config) {
        Ok(config) => config,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::FAILURE;
        }
    };
    logging::init_logging(&config.observability);

    let base_dir = cli
        .config
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    let result = match cli.command.unwrap_or(Command::Serve { bind: None }) {
        Command::Serve { bind } => serve(config, base_dir, bind),
        Command::Routes => routes(config, base_dir),
        Command::RouteCache => route_cache(config, base_dir),
        Command::Check => check(config, base_dir),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn read_config(path: &Path) -> Result<AppConfig, String> {
    if path.exists() {
        load_config(path).map_err(|e| format!("error: {}", report(&e)))
    } else {
        Ok(AppConfig::default())
    }
}

fn serve(mut config: AppConfig, base_dir: PathBuf, bind: Option<String>) -> Result<(), String> {
    if let Some(bind) = bind {
        config.server.bind_address = bind;
    }
    let server_config = config.server.clone();
    let observability = config.observability.clone();

    let kernel = KernelBuilder::new(config)
        .base_dir(base_dir)
        .build()
        .map_err(|e| format!("boot failed: {}", report(&e)))?;

    let runtime = tokio::runtime::Runtime::new().map_err(|e| e.to_string())?;
    runtime.block_on(async move {
        if observability.metrics_enabled {
            match observability.metrics_address.parse() {
                Ok(addr) => metrics::init_metrics(addr),
                Err(e) => tracing::error!(
                    metrics_address = %observability.metrics_address,
                    error = %e,
                    "Failed to parse metrics address"
                ),
            }
        }

        let listener = TcpListener::bind(&server_config.bind_address)
            .await
            .map_err(|e| format!("cannot bind {}: {e}", server_config.bind_address))?;

        let shutdown = Shutdown::new();
        spawn_signal_listener(shutdown.clone());

        HttpServer::new(Arc::new(kernel), &server_config)
            .run(listener, shutdown.signalled())
            .await
            .map_err(|e| e.to_string())?;

        tracing::info!("Shutdown complete");
        Ok(())
    })
}

fn routes(config: AppConfig, base_dir: PathBuf) -> Result<(), String> {
    let router = KernelBuilder::new(config)
        .base_dir(base_dir)
        .build_router()
        .map_err(|e| report(&e))?;

    println!("{:<16} {:<24} {:<20} {:<32} MIDDLEWARE", "METHOD", "URI", "NAME", "ACTION");
    for route in router.routes().iter() {
        let definition = route.definition();
        let methods: Vec<&str> = route.methods().iter().map(|m| m.as_str()).collect();
        println!(
            "{:<16} {:<24} {:<20} {:<32} {}",
            methods.join("|"),
            route.uri(),
            route.name().unwrap_or("-"),
            definition.action().describe(),
            definition.middleware_ids().join(", ")
        );
    }
    Ok(())
}

fn route_cache(config: AppConfig, base_dir: PathBuf) -> Result<(), String> {
    let mut config = config;
    config.routing.use_cache = false;
    let cache_path = config.routing.cache_path.clone();
    let target = if cache_path.is_absolute() {
        cache_path
    } else {
        base_dir.join(cache_path)
    };

    let router = KernelBuilder::new(config)
        .base_dir(base_dir)
        .build_router()
        .map_err(|e| report(&e))?;
    let count = router.cache_routes(&target).map_err(|e| report(&e))?;
    println!("Cached {count} routes to {}", target.display());
    Ok(())
}

fn check(config: AppConfig, base_dir: PathBuf) -> Result<(), String> {
    let kernel = KernelBuilder::new(config)
        .base_dir(base_dir)
        .build()
        .map_err(|e| format!("check failed: {}", report(&e)))?;
    println!("OK: {} routes", kernel.router().routes().len());
    Ok(())
}
