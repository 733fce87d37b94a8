//! Operator tool for modrouter
//!
//! Inspects the module set a configuration resolves to and dispatches
//! single requests through it.
//!
//! Usage:
//!   modrouter-cli [--config <file>] [--modules-dir <dir>] [--app-root <dir>] modules
//!   modrouter-cli [...] dispatch <METHOD> <URL> [--body <text>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use modrouter::instrumentation::DISPATCH_TIME;
use modrouter::utils::init_logging_from_config;
use modrouter::{DispatchConfig, DispatchProfiler, HandlerRegistry, Request, Router};

#[derive(Parser, Debug)]
#[command(name = "modrouter-cli")]
#[command(about = "Inspect and exercise a modrouter module tree", long_about = None)]
struct Cli {
    /// Configuration file (.toml or .json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the user modules directory
    #[arg(long)]
    modules_dir: Option<String>,

    /// Override the application root
    #[arg(long)]
    app_root: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List resolved modules in routing order, then excluded ones
    Modules,
    /// Dispatch one request and print the response
    Dispatch {
        method: String,
        url: String,
        #[arg(long)]
        body: Option<String>,
    },
}

fn load_config(cli: &Cli) -> anyhow::Result<DispatchConfig> {
    let mut config = match &cli.config {
        Some(path) => DispatchConfig::from_file(path)?,
        None => DispatchConfig::default(),
    };
    config.apply_env_overrides();
    if let Some(dir) = &cli.modules_dir {
        config.modules.modules_dir = dir.clone();
    }
    if let Some(root) = &cli.app_root {
        config.modules.app_root = root.clone();
    }
    config.validate()?;
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_logging_from_config(config.logging.as_ref());

    let profiler = Arc::new(DispatchProfiler::new(config.instrumentation.max_samples));
    let router =
        Router::from_config_with_sink(&config, HandlerRegistry::with_builtins(), profiler.clone());
    info!("Router ready with {} modules", router.installed_modules().len());

    match cli.command {
        Commands::Modules => {
            println!("Resolved modules (routing order):");
            for module in router.installed_modules() {
                let deps = module.dependencies();
                println!(
                    "  {:<20} domain={:<20} namespace={:<16} deps=[{}]",
                    module.name(),
                    module.domain(),
                    module.namespace(),
                    deps.join(", ")
                );
            }

            let excluded = router.excluded_modules();
            if !excluded.is_empty() {
                println!();
                println!("Excluded modules:");
                for module in excluded {
                    println!("  {:<20} missing=[{}]", module.name, module.missing.join(", "));
                }
            }
        }
        Commands::Dispatch { method, url, body } => {
            let mut request = Request::new(method, url);
            if let Some(body) = body {
                request = request.with_body(body.into_bytes());
            }

            let response = router.dispatch(&mut request);
            println!("Status: {}", response.status());
            for (key, value) in response.headers().iter() {
                println!("{}: {}", key, value);
            }
            println!();
            println!("{}", response.body_text());

            let stats = profiler.stats(DISPATCH_TIME);
            if stats.count > 0 {
                eprintln!(
                    "dispatch took {:.3} ms (id {})",
                    stats.max_ms,
                    request.dispatching_id().unwrap_or("-")
                );
            }
        }
    }

    Ok(())
}
