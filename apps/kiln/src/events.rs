//! Event handling and terminal rendering
//!
//! The CLI is the only place events become output: each incoming event is
//! routed into tracing with its derived metadata and, when not in JSON
//! mode, rendered as a styled status line.

use console::style;
use kiln_events::{AppEvent, BuildEvent, EventLevel, EventMeta, GeneralEvent, ResolverEvent};
use kiln_types::Stage;
use tracing::{debug, error, info, warn};

/// Event handler for terminal feedback
pub struct EventHandler {
    colors_enabled: bool,
    debug_enabled: bool,
    quiet: bool,
    /// Stage named by the most recent failure, for the exit message
    last_failed_stage: Option<Stage>,
}

impl EventHandler {
    /// Create a new event handler
    pub fn new(colors_enabled: bool, debug_enabled: bool, quiet: bool) -> Self {
        Self {
            colors_enabled,
            debug_enabled,
            quiet,
            last_failed_stage: None,
        }
    }

    /// Stage of the most recent failure, if any
    pub fn last_failed_stage(&self) -> Option<Stage> {
        self.last_failed_stage
    }

    /// Handle an incoming event
    pub fn handle_event(&mut self, event: AppEvent) {
        log_event(&event);

        match &event {
            AppEvent::Build(build_event) => self.handle_build_event(build_event),
            AppEvent::Resolver(resolver_event) => self.handle_resolver_event(resolver_event),
            AppEvent::General(general_event) => self.handle_general_event(general_event),
        }
    }

    fn handle_build_event(&mut self, event: &BuildEvent) {
        match event {
            BuildEvent::SessionStarted { package, version } => {
                self.show_status(&format!("building {package} {version}"));
            }
            BuildEvent::SessionCompleted {
                package,
                version,
                duration_ms,
                artifacts,
            } => {
                self.show_status(&format!(
                    "built {package} {version} in {duration_ms} ms ({artifacts} artifacts)"
                ));
            }
            BuildEvent::StageStarted { stage, .. } => {
                self.show_status(&format!("stage {stage} started"));
            }
            BuildEvent::StageCompleted {
                stage, duration_ms, ..
            } => {
                self.show_status(&format!("stage {stage} completed in {duration_ms} ms"));
            }
            BuildEvent::StageFailed { stage, error, .. } => {
                self.last_failed_stage = Some(*stage);
                self.show_error(&format!("stage {stage} failed: {error}"));
            }
            BuildEvent::CommandStarted {
                command,
                working_dir,
            } => {
                self.show_debug(&format!("running {command} in {}", working_dir.display()));
            }
            BuildEvent::CommandCompleted { command, exit_code } => {
                self.show_debug(&format!("{command} exited with {exit_code:?}"));
            }
            BuildEvent::PatchApplied { patch } => {
                self.show_status(&format!("applied {patch}"));
            }
            BuildEvent::ArtifactsCollected {
                install_root,
                count,
            } => {
                self.show_status(&format!(
                    "collected {count} artifacts under {}",
                    install_root.display()
                ));
            }
        }
    }

    fn handle_resolver_event(&mut self, event: &ResolverEvent) {
        match event {
            ResolverEvent::RegistryLoaded { path, packages } => {
                self.show_debug(&format!(
                    "registry {} with {packages} packages",
                    path.display()
                ));
            }
            ResolverEvent::ToggleSkipped { toggle } => {
                self.show_debug(&format!("toggle {toggle} disabled, dependencies skipped"));
            }
        }
    }

    fn handle_general_event(&mut self, event: &GeneralEvent) {
        match event {
            GeneralEvent::Warning { message } => self.show_warning(message),
            GeneralEvent::Error { message } => self.show_error(message),
            GeneralEvent::DebugLog { message } => self.show_debug(message),
            GeneralEvent::OperationStarted { operation } => {
                self.show_status(operation);
            }
            GeneralEvent::OperationCompleted { operation, success } => {
                if *success {
                    self.show_status(&format!("{operation} done"));
                } else {
                    self.show_warning(&format!("{operation} did not complete"));
                }
            }
            GeneralEvent::OperationFailed { operation, error } => {
                self.show_error(&format!("{operation} failed: {error}"));
            }
        }
    }

    fn show_status(&self, message: &str) {
        if self.quiet {
            return;
        }
        if self.colors_enabled {
            println!("{} {message}", style("::").cyan().bold());
        } else {
            println!(":: {message}");
        }
    }

    fn show_warning(&self, message: &str) {
        if self.quiet {
            return;
        }
        if self.colors_enabled {
            eprintln!("{} {message}", style("warning:").yellow().bold());
        } else {
            eprintln!("warning: {message}");
        }
    }

    fn show_error(&self, message: &str) {
        if self.colors_enabled {
            eprintln!("{} {message}", style("error:").red().bold());
        } else {
            eprintln!("error: {message}");
        }
    }

    fn show_debug(&self, message: &str) {
        if !self.debug_enabled || self.quiet {
            return;
        }
        if self.colors_enabled {
            println!("{} {message}", style("--").dim());
        } else {
            println!("-- {message}");
        }
    }
}

/// Route an event into tracing with structured fields
fn log_event(event: &AppEvent) {
    let meta = EventMeta::for_event(event);
    let source = meta.source.as_str();
    let detail = format!("{event:?}");

    match meta.level {
        EventLevel::Debug => debug!(source, event_id = %meta.event_id, "{detail}"),
        EventLevel::Info => info!(source, event_id = %meta.event_id, "{detail}"),
        EventLevel::Warn => warn!(source, event_id = %meta.event_id, "{detail}"),
        EventLevel::Error => error!(source, event_id = %meta.event_id, "{detail}"),
    }
}
