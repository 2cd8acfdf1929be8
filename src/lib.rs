pub mod canvas;
pub mod discover;
pub mod git;
pub mod repo;
pub mod runner;
pub mod theme;

use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Pull(PullArgs),
    Help,
    Version,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PullArgs {
    /// Parent directories to scan for working copies. Empty means the
    /// current directory.
    pub roots: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliParseError {
    UnknownFlag(String),
}

impl std::fmt::Display for CliParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliParseError::UnknownFlag(flag) => write!(f, "unknown flag: {flag}"),
        }
    }
}

impl std::error::Error for CliParseError {}

pub fn parse_command<I>(args: I) -> Result<Command, CliParseError>
where
    I: IntoIterator<Item = String>,
{
    let mut roots: Vec<PathBuf> = Vec::new();
    for arg in args {
        match arg.as_str() {
            "--help" | "-h" => return Ok(Command::Help),
            "--version" | "-v" => return Ok(Command::Version),
            other if other.starts_with('-') => {
                return Err(CliParseError::UnknownFlag(other.to_owned()));
            }
            path => roots.push(PathBuf::from(path)),
        }
    }
    Ok(Command::Pull(PullArgs { roots }))
}

pub fn print_usage() {
    eprintln!(
        "multipull\n\nPulls every clean git working copy found one level below the given directories,\nall in parallel, with one live status row per copy.\n\nUSAGE:\n  multipull [path ...]\n\nARGS:\n  [path ...]        Parent directories of git working copies; defaults to the\n                    current directory when none are given\n\nGENERAL:\n  -h, --help        Print help\n  -v, --version     Print version\n"
    );
}

pub fn print_version() {
    println!("multipull {}", env!("CARGO_PKG_VERSION"));
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
