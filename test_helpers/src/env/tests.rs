//! Unit tests for environment helpers.

use super::*;
use std::sync::{Arc, Barrier};
use std::thread;

fn env_value(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

#[test]
fn set_var_restores_original() {
    let key = "ENVFLAG_HELPERS_SET_VAR";
    let base = set_var(key, "orig");
    {
        let _guard = set_var(key, "temp");
        assert_eq!(env_value(key).as_deref(), Some("temp"));
    }
    assert_eq!(env_value(key).as_deref(), Some("orig"));
    drop(base);
    assert_eq!(env_value(key), None);
}

#[test]
fn remove_var_restores_value() {
    let key = "ENVFLAG_HELPERS_REMOVE_VAR";
    let base = set_var(key, "to-be-removed");
    {
        let _guard = remove_var(key);
        assert_eq!(env_value(key), None);
    }
    assert_eq!(env_value(key).as_deref(), Some("to-be-removed"));
    drop(base);
}

#[test]
fn stacking_restores_in_lifo() {
    let key = "ENVFLAG_HELPERS_STACKING";
    let first = set_var(key, "v1");
    let second = set_var(key, "v2");
    assert_eq!(env_value(key).as_deref(), Some("v2"));
    drop(second);
    assert_eq!(env_value(key).as_deref(), Some("v1"));
    drop(first);
    assert_eq!(env_value(key), None);
}

#[test]
fn scope_restores_every_pair() {
    let keys = ["ENVFLAG_HELPERS_SCOPE_A", "ENVFLAG_HELPERS_SCOPE_B"];
    {
        let scope = scope_from_pairs(keys.iter().map(|key| (*key, "set")));
        assert!(keys.iter().all(|key| env_value(key).as_deref() == Some("set")));
        drop(scope);
    }
    assert!(keys.iter().all(|key| env_value(key).is_none()));
}

#[test]
fn concurrent_keys_do_not_interfere() {
    const THREADS: usize = 4;
    let barrier = Arc::new(Barrier::new(THREADS));
    let handles: Vec<_> = (0..THREADS)
        .map(|index| {
            let wait = Arc::clone(&barrier);
            thread::spawn(move || {
                let key = format!("ENVFLAG_HELPERS_THREAD_{index}");
                wait.wait();
                for iteration in 0..8 {
                    let value = format!("{key}-{iteration}");
                    let guard = set_var(key.as_str(), &value);
                    assert_eq!(env_value(&key), Some(value));
                    drop(guard);
                    assert_eq!(env_value(&key), None);
                }
            })
        })
        .collect();
    for handle in handles {
        assert!(handle.join().is_ok(), "worker thread panicked");
    }
}
