//! kiln - dependency-aware native build orchestrator
//!
//! This is the CLI application that drives a library build end to end:
//! resolve dependency packages, assemble build-system variables, and run
//! the patch/configure/build/install pipeline through the builder crate.

mod cli;
mod display;
mod error;
mod events;

use crate::cli::{Cli, Commands, GlobalArgs};
use crate::display::OutputRenderer;
use crate::error::CliError;
use crate::events::EventHandler;
use clap::Parser;
use kiln_builder::{BuildContext, Builder, ProjectManifest};
use kiln_config::Config;
use kiln_events::{AppEvent, EventEmitter, EventReceiver, ResolverEvent};
use kiln_resolver::Registry;
use kiln_types::{BuildReport, Os, PlatformProfile};
use std::path::{Path, PathBuf};
use std::process;
use tokio::select;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json_mode = cli.global.json;

    init_tracing(json_mode, cli.global.debug);

    if let Err(e) = run(cli).await {
        error!("Application error: {}", e);
        if !json_mode {
            eprintln!("Error: {e}");
        }
        process::exit(1);
    }
}

/// Main application logic
async fn run(cli: Cli) -> Result<(), CliError> {
    info!("Starting kiln v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration with proper precedence: file, then environment,
    // then CLI flags applied where each command consumes them.
    let mut config = Config::load_or_default(cli.global.config.as_deref()).await?;
    config.merge_env()?;

    match cli.command {
        Commands::Package {
            manifest,
            os,
            arch,
            compiler,
            enable,
            disable,
            registry,
            build_root,
            jobs,
        } => {
            let request = PackageRequest {
                manifest,
                os,
                arch,
                compiler,
                enable,
                disable,
                registry,
                build_root,
                jobs,
            };
            let report = package(&config, &cli.global, request).await?;

            let renderer = OutputRenderer::new(cli.global.json);
            renderer.render_report(&report)?;

            info!("Command completed successfully");
            Ok(())
        }
    }
}

/// Arguments of the package command
struct PackageRequest {
    manifest: PathBuf,
    os: Os,
    arch: String,
    compiler: String,
    enable: Vec<String>,
    disable: Vec<String>,
    registry: Option<PathBuf>,
    build_root: Option<PathBuf>,
    jobs: Option<usize>,
}

/// Execute the package command with concurrent event handling
async fn package(
    config: &Config,
    global: &GlobalArgs,
    request: PackageRequest,
) -> Result<BuildReport, CliError> {
    let manifest_dir = request
        .manifest
        .parent()
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    let manifest = ProjectManifest::load(&request.manifest).await?;

    let registry_path = request
        .registry
        .clone()
        .or_else(|| config.build.registry.clone())
        .ok_or_else(|| {
            CliError::InvalidArguments(
                "no registry file; pass --registry or set build.registry".to_string(),
            )
        })?;
    let registry = Registry::load(&registry_path).await?;

    let build_root = match request.build_root.clone().or_else(|| config.build.build_root.clone()) {
        Some(root) => root,
        None => std::env::current_dir()?.join("kiln-build"),
    }
    .join(&manifest.package.name);

    let profile = PlatformProfile::new(request.os, request.arch.clone(), request.compiler.clone());
    let jobs = request.jobs.unwrap_or_else(|| config.effective_jobs());

    let (event_sender, event_receiver) = kiln_events::channel();
    event_sender.emit(AppEvent::Resolver(ResolverEvent::RegistryLoaded {
        path: registry_path,
        packages: registry.len(),
    }));

    let ctx = BuildContext::new(
        manifest.package.name.clone(),
        manifest.package.version.clone(),
        profile,
        &build_root,
    )
    .with_jobs(jobs)
    .with_event_sender(event_sender.clone());

    let colors_enabled = !global.json && console::Term::stdout().features().colors_supported();
    let mut event_handler = EventHandler::new(colors_enabled, global.debug, global.json);

    let builder = Builder::new(registry);
    let result = execute_with_events(
        builder.build(
            &ctx,
            &manifest,
            &manifest_dir,
            &request.enable,
            &request.disable,
        ),
        event_receiver,
        &mut event_handler,
    )
    .await;

    match result {
        Ok(report) => Ok(report),
        Err(e) => {
            if let Some(stage) = event_handler.last_failed_stage() {
                if !global.json {
                    eprintln!("build failed at stage {stage}");
                }
            }
            Err(e.into())
        }
    }
}

/// Drive a build future while rendering its events as they arrive
async fn execute_with_events<F>(
    future: F,
    mut event_receiver: EventReceiver,
    event_handler: &mut EventHandler,
) -> kiln_errors::Result<BuildReport>
where
    F: std::future::Future<Output = kiln_errors::Result<BuildReport>>,
{
    let mut build_future = Box::pin(future);

    loop {
        select! {
            // Build completed
            result = &mut build_future => {
                // Drain any remaining events
                while let Ok(event) = event_receiver.try_recv() {
                    event_handler.handle_event(event);
                }
                return result;
            }

            // Event received
            event = event_receiver.recv() => {
                match event {
                    Some(event) => event_handler.handle_event(event),
                    None => { /* Channel closed: keep waiting for the build to finish */ }
                }
            }
        }
    }
}

/// Initialize tracing with JSON awareness
fn init_tracing(json_mode: bool, debug: bool) {
    let default_filter = if debug { "kiln=debug" } else { "kiln=info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    if json_mode {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}
