//! Demo entry-point: resolve database settings from flags and the environment,
//! then print them.
//!
//! `DATABASE_MASTER_HOST` and `DATABASE_MASTER_PORT` fill in the matching
//! flags; anything passed on the command line wins. Set `RUST_LOG=debug` to
//! see how each environment variable was resolved.

use std::io::{self, Write};

use clap::Parser;
use color_eyre::eyre::Result;
use envflag::{ClapRegistry, ClapRegistryError, EnvFlag, EnvFlagError, EnvFlagOptions};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Database connection settings.
#[derive(Debug, Parser)]
#[command(name = "hello_envflag", version)]
struct Cli {
    /// Database master host
    #[arg(long, default_value = "")]
    database_master_host: String,

    /// Database master port
    #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
    database_master_port: i64,

    /// a shortcut for database-master-host
    #[arg(long, default_value = "")]
    mh: String,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let debug = std::env::var_os("RUST_LOG").is_some();
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(io::stderr)
            .init();
    }
    let cli = parse_command_line(debug)?;
    debug!(?cli, "settings resolved");
    let mut stdout = io::stdout().lock();
    writeln!(
        stdout,
        "RESULT: {}:{} {}",
        cli.database_master_host, cli.database_master_port, cli.mh
    )?;
    Ok(())
}

fn parse_command_line(debug: bool) -> Result<Cli> {
    let mut registry = ClapRegistry::for_parser::<Cli>();
    let binder = EnvFlag::new(EnvFlagOptions::default().with_debug(debug));
    let args = std::env::args_os()
        .skip(1)
        .map(|arg| arg.to_string_lossy().into_owned());
    if let Err(err) = binder.parse(&mut registry, args) {
        exit_on_display_request(&err);
        return Err(err.into());
    }
    Ok(registry.extract()?)
}

/// Let clap print help or version output and exit with its status.
fn exit_on_display_request(err: &EnvFlagError) {
    if !err.is_display_request() {
        return;
    }
    if let EnvFlagError::Parse { source } = err
        && let Some(ClapRegistryError::Clap(clap_err)) = source.downcast_ref::<ClapRegistryError>()
    {
        clap_err.exit();
    }
}
