//! Unit tests for usage rewriting and environment injection.

use anyhow::{Result, anyhow, ensure};
use rstest::{fixture, rstest};

use super::EnvFlag;
use crate::{EnvFlagError, EnvFlagOptions, EnvSnapshot, FlagRegistry, FlagSet};

#[fixture]
fn flags() -> FlagSet {
    let mut flags = FlagSet::new("app");
    let defined = [
        flags.string("database-master-host", "", "Database master host"),
        flags.int("database-master-port", -1, "Database master port"),
        flags.string("mh", "", "a shortcut for database-master-host"),
    ];
    assert!(defined.iter().all(Result::is_ok));
    flags
}

fn usage_of(flags: &FlagSet, name: &str) -> Result<String> {
    flags
        .meta(name)
        .map(|meta| meta.usage().to_owned())
        .ok_or_else(|| anyhow!("flag {name} missing"))
}

fn string_of(flags: &FlagSet, name: &str) -> Result<String> {
    flags
        .get::<String>(name)
        .ok_or_else(|| anyhow!("flag {name} missing"))
}

#[rstest]
fn rewrites_usage_for_long_flags(mut flags: FlagSet) -> Result<()> {
    EnvFlag::default().rewrite_usage(&mut flags);
    ensure!(usage_of(&flags, "database-master-host")? == "[DATABASE_MASTER_HOST] Database master host");
    ensure!(usage_of(&flags, "database-master-port")? == "[DATABASE_MASTER_PORT] Database master port");
    ensure!(usage_of(&flags, "mh")? == "a shortcut for database-master-host");
    Ok(())
}

#[rstest]
fn usage_rewrite_is_idempotent(mut flags: FlagSet) -> Result<()> {
    let binder = EnvFlag::default();
    binder.rewrite_usage(&mut flags);
    binder.rewrite_usage(&mut flags);
    let usage = usage_of(&flags, "database-master-host")?;
    ensure!(usage.matches("[DATABASE_MASTER_HOST]").count() == 1, "{usage}");
    Ok(())
}

#[rstest]
fn usage_uses_override_name(mut flags: FlagSet) -> Result<()> {
    let options = EnvFlagOptions::default().with_overrides([("DB_HOST", "database-master-host")])?;
    EnvFlag::new(options).rewrite_usage(&mut flags);
    ensure!(usage_of(&flags, "database-master-host")?.starts_with("[DB_HOST] "));
    Ok(())
}

#[rstest]
fn lower_min_length_annotates_short_flags(mut flags: FlagSet) -> Result<()> {
    EnvFlag::new(EnvFlagOptions::default().with_min_length(2)).rewrite_usage(&mut flags);
    ensure!(usage_of(&flags, "mh")? == "[MH] a shortcut for database-master-host");
    Ok(())
}

#[rstest]
fn injects_matching_variables(mut flags: FlagSet) -> Result<()> {
    let env = EnvSnapshot::from_lines([
        "DATABASE_MASTER_HOST=localhost",
        "DATABASE_MASTER_PORT=3306",
        "PATH=/usr/bin",
        "MH=ignored",
    ]);
    EnvFlag::default().inject(&mut flags, &env)?;
    ensure!(string_of(&flags, "database-master-host")? == "localhost");
    ensure!(flags.get::<i64>("database-master-port") == Some(3306));
    ensure!(string_of(&flags, "mh")?.is_empty());
    ensure!(!flags.is_set("mh"));
    Ok(())
}

#[rstest]
fn override_targets_named_flag(mut flags: FlagSet) -> Result<()> {
    let options = EnvFlagOptions::default()
        .with_min_length(2)
        .with_overrides([("MH", "database-master-host")])?;
    let env = EnvSnapshot::from_lines(["MH=localhost"]);
    EnvFlag::new(options).inject(&mut flags, &env)?;
    ensure!(string_of(&flags, "database-master-host")? == "localhost");
    ensure!(string_of(&flags, "mh")?.is_empty());
    Ok(())
}

#[rstest]
fn later_entries_win(mut flags: FlagSet) -> Result<()> {
    let env = EnvSnapshot::from_lines(["DATABASE_MASTER_HOST=a", "DATABASE_MASTER_HOST=b"]);
    EnvFlag::default().inject(&mut flags, &env)?;
    ensure!(string_of(&flags, "database-master-host")? == "b");
    Ok(())
}

#[rstest]
fn entry_without_equals_sets_empty_value(mut flags: FlagSet) -> Result<()> {
    flags.set("database-master-host", "preset")?;
    let env = EnvSnapshot::from_lines(["DATABASE_MASTER_HOST"]);
    EnvFlag::default().inject(&mut flags, &env)?;
    ensure!(string_of(&flags, "database-master-host")?.is_empty());
    Ok(())
}

#[rstest]
fn rejected_value_aborts_with_flag_name(mut flags: FlagSet) {
    let env = EnvSnapshot::from_lines([
        "DATABASE_MASTER_HOST=localhost",
        "DATABASE_MASTER_PORT=notanumber",
        "MH_HOST=unused",
    ]);
    let err = EnvFlag::default().inject(&mut flags, &env);
    match err {
        Err(EnvFlagError::SetFailed { flag, value, .. }) => {
            assert_eq!(flag, "database-master-port");
            assert_eq!(value, "notanumber");
        }
        other => panic!("expected SetFailed, got {other:?}"),
    }
    // Earlier entries stay applied.
    assert_eq!(
        flags.get::<String>("database-master-host").as_deref(),
        Some("localhost")
    );
}

#[rstest]
fn failure_stops_the_pass(mut flags: FlagSet) {
    let env = EnvSnapshot::from_lines([
        "DATABASE_MASTER_PORT=notanumber",
        "DATABASE_MASTER_HOST=localhost",
    ]);
    assert!(EnvFlag::default().inject(&mut flags, &env).is_err());
    assert_eq!(flags.get::<String>("database-master-host").as_deref(), Some(""));
}

#[rstest]
fn refuses_to_run_after_parse(mut flags: FlagSet) -> Result<()> {
    flags.parse_args(Vec::new())?;
    let env = EnvSnapshot::from_lines(["DATABASE_MASTER_HOST=localhost"]);
    let binder = EnvFlag::default();
    ensure!(matches!(
        binder.inject(&mut flags, &env),
        Err(EnvFlagError::AlreadyParsed)
    ));
    ensure!(matches!(
        binder.process_flag_with_env_from(&mut flags, &env),
        Err(EnvFlagError::AlreadyParsed)
    ));
    ensure!(usage_of(&flags, "database-master-host")? == "Database master host");
    Ok(())
}

#[rstest]
fn shows_env_value_as_default(mut flags: FlagSet) -> Result<()> {
    let env = EnvSnapshot::from_lines(["DATABASE_MASTER_PORT=3306"]);
    EnvFlag::default().process_flag_with_env_from(&mut flags, &env)?;
    let usage = flags.usage();
    ensure!(
        usage.contains("\t[DATABASE_MASTER_PORT] Database master port (default 3306)\n"),
        "{usage}"
    );
    Ok(())
}

#[rstest]
fn presentation_toggles_can_be_disabled(mut flags: FlagSet) -> Result<()> {
    let options = EnvFlagOptions::default()
        .with_show_env_key_in_usage(false)
        .with_show_env_val_in_usage(false);
    let env = EnvSnapshot::from_lines(["DATABASE_MASTER_PORT=3306"]);
    EnvFlag::new(options).process_flag_with_env_from(&mut flags, &env)?;
    ensure!(flags.get::<i64>("database-master-port") == Some(3306));
    let usage = flags.usage();
    ensure!(usage.contains("\tDatabase master port (default -1)\n"), "{usage}");
    Ok(())
}

#[rstest]
fn plan_does_not_mutate(flags: FlagSet) -> Result<()> {
    let env = EnvSnapshot::from_lines([
        "DATABASE_MASTER_PORT=notanumber",
        "HOME=/root",
        "DATABASE_MASTER_HOST=localhost",
    ]);
    let plan = EnvFlag::default().plan(&flags, &env);
    let flags_planned: Vec<&str> = plan.iter().map(super::Assignment::flag).collect();
    ensure!(flags_planned == ["database-master-port", "database-master-host"]);
    ensure!(plan.first().map(super::Assignment::env_key) == Some("DATABASE_MASTER_PORT"));
    ensure!(flags.get::<i64>("database-master-port") == Some(-1));
    ensure!(!flags.is_set("database-master-host"));
    Ok(())
}

#[rstest]
fn plan_reads_through_a_shared_borrow(mut flags: FlagSet) -> Result<()> {
    let env = EnvSnapshot::from_lines(["MH=replica", "MISSING_FLAG=1"]);
    let shared: &FlagSet = &flags;
    ensure!(shared.contains("mh"));
    ensure!(!shared.contains("missing-flag"));
    let binder = EnvFlag::new(EnvFlagOptions::default().with_min_length(2));
    let plan = binder.plan(shared, &env);
    ensure!(plan.iter().map(super::Assignment::flag).eq(["mh"]));
    let borrowed = &mut flags;
    ensure!(FlagRegistry::contains(&borrowed, "database-master-host"));
    Ok(())
}

#[rstest]
#[case(&[], "localhost", 3306)]
#[case(&["--database-master-host=remotehost"], "remotehost", 3306)]
#[case(&["-database-master-port", "1"], "localhost", 1)]
fn arguments_override_environment(
    mut flags: FlagSet,
    #[case] args: &[&str],
    #[case] host: &str,
    #[case] port: i64,
) -> Result<()> {
    let env = EnvSnapshot::from_lines([
        "DATABASE_MASTER_HOST=localhost",
        "DATABASE_MASTER_PORT=3306",
    ]);
    EnvFlag::default().parse_with_env(&mut flags, &env, args.iter().copied())?;
    ensure!(string_of(&flags, "database-master-host")? == host);
    ensure!(flags.get::<i64>("database-master-port") == Some(port));
    ensure!(string_of(&flags, "mh")?.is_empty());
    Ok(())
}

#[rstest]
fn argument_errors_are_wrapped(mut flags: FlagSet) {
    let env = EnvSnapshot::default();
    let err = EnvFlag::default().parse_with_env(&mut flags, &env, ["-unknown"]);
    assert!(matches!(err, Err(EnvFlagError::Parse { .. })));
}

#[rstest]
#[case("DATABASE_MASTER_HOST", "database-master-host")]
#[case("MH", "mh")]
fn flag_name_without_override_is_converted(#[case] env: &str, #[case] flag: &str) {
    assert_eq!(EnvFlag::default().flag_name_for(env), flag);
}

#[test]
fn env_name_prefers_override() -> Result<()> {
    let options = EnvFlagOptions::default().with_overrides([("MH", "database-master-host")])?;
    let binder = EnvFlag::new(options);
    ensure!(binder.env_name_for("database-master-host") == "MH");
    ensure!(binder.env_name_for("database-master-port") == "DATABASE_MASTER_PORT");
    ensure!(binder.flag_name_for("MH") == "database-master-host");
    Ok(())
}

#[rstest]
fn debug_tracing_does_not_change_outcome(mut flags: FlagSet) -> Result<()> {
    let env = EnvSnapshot::from_lines(["DATABASE_MASTER_HOST=localhost", "X=1"]);
    EnvFlag::new(EnvFlagOptions::default().with_debug(true)).inject(&mut flags, &env)?;
    ensure!(string_of(&flags, "database-master-host")? == "localhost");
    Ok(())
}
