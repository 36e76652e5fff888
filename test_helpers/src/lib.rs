//! Test helpers shared across the envflag workspace.
//!
//! [`env`] serialises process environment mutation behind RAII guards and
//! [`figment`] wraps `figment::Jail` for tests that want an isolated
//! environment and working directory.

pub mod env;
pub mod figment;
