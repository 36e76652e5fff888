//! Behavioural tests that read the real process environment.
//!
//! Each test mutates process-wide state inside a `figment::Jail` and is marked
//! `#[serial]` so captures never observe another test's variables.

use anyhow::{Result, anyhow, ensure};
use envflag::{EnvFlag, EnvFlagError, EnvFlagOptions, FlagSet};
use rstest::{fixture, rstest};
use serial_test::serial;
use test_helpers::figment::{figment_error, with_jail};

#[fixture]
fn flags() -> FlagSet {
    let mut flags = FlagSet::new("example");
    let defined = [
        flags.string("database-master-host", "", "Database master host"),
        flags.int("database-master-port", -1, "Database master port"),
        flags.string("mh", "", "a shortcut for database-master-host"),
    ];
    assert!(defined.iter().all(Result::is_ok));
    flags
}

fn host(flags: &FlagSet) -> Result<String> {
    flags
        .get::<String>("database-master-host")
        .ok_or_else(|| anyhow!("database-master-host is not a string flag"))
}

#[rstest]
#[serial]
fn environment_fills_flags_without_arguments(mut flags: FlagSet) -> Result<()> {
    with_jail(|jail| {
        jail.set_env("DATABASE_MASTER_HOST", "localhost");
        jail.set_env("DATABASE_MASTER_PORT", "3306");
        EnvFlag::default()
            .parse(&mut flags, Vec::<String>::new())
            .map_err(figment_error)
    })?;
    ensure!(host(&flags)? == "localhost");
    ensure!(flags.get::<i64>("database-master-port") == Some(3306));
    ensure!(flags.get::<String>("mh").as_deref() == Some(""));
    Ok(())
}

#[rstest]
#[serial]
fn explicit_argument_beats_environment(mut flags: FlagSet) -> Result<()> {
    with_jail(|jail| {
        jail.set_env("DATABASE_MASTER_HOST", "localhost");
        jail.set_env("DATABASE_MASTER_PORT", "3306");
        EnvFlag::default()
            .parse(&mut flags, ["--database-master-host=remotehost"])
            .map_err(figment_error)
    })?;
    ensure!(host(&flags)? == "remotehost");
    ensure!(flags.get::<i64>("database-master-port") == Some(3306));
    Ok(())
}

#[rstest]
#[serial]
fn non_numeric_port_is_reported(mut flags: FlagSet) -> Result<()> {
    let outcome = with_jail(|jail| {
        jail.set_env("DATABASE_MASTER_PORT", "notanumber");
        Ok(EnvFlag::default().parse(&mut flags, Vec::<String>::new()))
    })?;
    match outcome {
        Err(EnvFlagError::SetFailed { flag, .. }) => {
            ensure!(flag == "database-master-port");
            Ok(())
        }
        other => Err(anyhow!("expected SetFailed, got {other:?}")),
    }
}

#[rstest]
#[serial]
fn free_function_applies_default_binder(mut flags: FlagSet) -> Result<()> {
    with_jail(|jail| {
        jail.set_env("DATABASE_MASTER_HOST", "from-env");
        envflag::process_flag_with_env(&mut flags).map_err(figment_error)
    })?;
    ensure!(host(&flags)? == "from-env");
    let usage = flags.usage();
    ensure!(
        usage.contains("[DATABASE_MASTER_HOST] Database master host (default \"from-env\")"),
        "{usage}"
    );
    Ok(())
}

#[rstest]
#[serial]
fn override_reads_short_variable(mut flags: FlagSet) -> Result<()> {
    let options = EnvFlagOptions::default()
        .with_min_length(2)
        .with_overrides([("MH", "database-master-host")])?;
    with_jail(|jail| {
        jail.set_env("MH", "localhost");
        EnvFlag::new(options)
            .process_flag_with_env(&mut flags)
            .map_err(figment_error)
    })?;
    ensure!(host(&flags)? == "localhost");
    ensure!(flags.get::<String>("mh").as_deref() == Some(""));
    Ok(())
}
