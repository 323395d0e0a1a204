//! Command line interface definition

use clap::{Parser, Subcommand};
use kiln_types::Os;
use std::path::PathBuf;

/// kiln - dependency-aware native build orchestrator
#[derive(Parser)]
#[command(name = "kiln")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Dependency-aware native build orchestrator")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Parser)]
pub struct GlobalArgs {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Use alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Build and install a library package from its manifest
    Package {
        /// Path to the project manifest (kiln.toml)
        manifest: PathBuf,

        /// Target operating system
        #[arg(long, value_enum)]
        os: Os,

        /// Target architecture (e.g. x86_64, aarch64)
        #[arg(long)]
        arch: String,

        /// Target compiler (e.g. gcc, clang, msvc)
        #[arg(long)]
        compiler: String,

        /// Enable a feature toggle declared in the manifest
        #[arg(long, value_name = "TOGGLE")]
        enable: Vec<String>,

        /// Disable a feature toggle declared in the manifest
        #[arg(long, value_name = "TOGGLE")]
        disable: Vec<String>,

        /// Registry file describing resolved dependency packages
        #[arg(long, value_name = "PATH")]
        registry: Option<PathBuf>,

        /// Root for the source/build/install triple
        #[arg(long, value_name = "PATH")]
        build_root: Option<PathBuf>,

        /// Number of parallel build jobs (0=auto)
        #[arg(short, long)]
        jobs: Option<usize>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_package_command() {
        let cli = Cli::parse_from([
            "kiln",
            "package",
            "kiln.toml",
            "--os",
            "linux",
            "--arch",
            "x86_64",
            "--compiler",
            "gcc",
            "--enable",
            "with_laszip",
        ]);

        let Commands::Package {
            manifest,
            os,
            enable,
            disable,
            ..
        } = cli.command;
        assert_eq!(manifest, PathBuf::from("kiln.toml"));
        assert_eq!(os, Os::Linux);
        assert_eq!(enable, vec!["with_laszip".to_string()]);
        assert!(disable.is_empty());
    }
}
