use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use xshell::{cmd, Shell};

#[derive(Parser)]
#[command(name = "cargo-xtask", version, about = "Project automation tasks")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Format Rust sources
    Fmt,
    /// Run format check and clippy
    Check,
    /// Run unit and integration tests of ssc-match
    Test,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let shell = Shell::new()?;
    let _dir = shell.push_dir(project_root()?);

    match cli.command {
        Command::Fmt => run_fmt(&shell),
        Command::Check => run_check(&shell),
        Command::Test => run_test(&shell),
    }
}

fn run_fmt(shell: &Shell) -> Result<()> {
    cmd!(shell, "cargo fmt")
        .run()
        .context("failed to run cargo fmt")?;
    cmd!(shell, "cargo fmt --manifest-path xtask/Cargo.toml")
        .run()
        .context("failed to run cargo fmt for xtask")?;
    Ok(())
}

fn run_check(shell: &Shell) -> Result<()> {
    cmd!(shell, "cargo fmt -- --check")
        .run()
        .context("cargo fmt --check failed")?;
    cmd!(shell, "cargo clippy --all-targets -- -D warnings")
        .run()
        .context("cargo clippy failed")?;
    Ok(())
}

fn run_test(shell: &Shell) -> Result<()> {
    cmd!(shell, "cargo test --all-targets")
        .run()
        .context("cargo test failed")?;
    Ok(())
}

fn project_root() -> Result<PathBuf> {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .map(PathBuf::from)
        .context("xtask manifest has no parent directory")
}
