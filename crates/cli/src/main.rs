//! Command-line interface for the `ck` application.
//!
//! This crate serves as the main entry point for the executable, delegating
//! its core functionality to the `ckit-app` crate.

fn main() -> anyhow::Result<()> {
    ckit_app::run()
}
