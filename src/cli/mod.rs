//! CLI routing and command dispatch.

use crate::constants;
use crate::core::resolver::Resolver;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod get;
pub mod list;
pub mod read;

#[derive(Parser, Debug)]
#[command(
    name = "secretfile",
    version,
    about = "Resolve Secretfile secrets into shell-exportable environment variables"
)]
pub struct Cli {
    /// Manifest path (default: Secretfile in the working directory)
    #[arg(long, global = true, value_name = "PATH", env = constants::MANIFEST_PATH_ENV)]
    pub manifest: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        // Backend selection is explicit and ambient: Vault iff VAULT_ADDR is
        // set. Commands that never reach the backend tier work without one.
        let mut resolver = Resolver::from_env()?;
        if let Some(path) = self.manifest {
            resolver = resolver.with_manifest_path(path);
        }

        match self.command {
            Commands::Read(args) => read::run(&mut resolver, args),
            Commands::Get(args) => get::run(&mut resolver, args),
            Commands::List(args) => list::run(&mut resolver, args),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve all manifest keys and print shell export lines
    Read(read::ReadArgs),
    /// Resolve a single key and print its value
    Get(get::GetArgs),
    /// List manifest entries without resolving values
    List(list::ListArgs),
}
