use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::models::Month;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StoreKind {
    Sqlite(PathBuf),
    Memory,
}

/// Launch settings resolved from command-line flags and platform defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Config {
    pub(crate) store: StoreKind,
    pub(crate) log_path: PathBuf,
    pub(crate) start_month: Month,
}

impl Config {
    /// Resolve the config and return the arguments left after removing launch flags.
    pub(crate) fn from_args(args: &[String]) -> Result<(Self, Vec<String>)> {
        let data_dir = data_dir()?;
        Self::resolve(args, &data_dir, Month::current())
    }

    pub(crate) fn resolve(
        args: &[String],
        data_dir: &Path,
        default_month: Month,
    ) -> Result<(Self, Vec<String>)> {
        let mut store = StoreKind::Sqlite(data_dir.join("teambudget.db"));
        let mut start_month = default_month;
        let mut rest = Vec::new();

        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--db" => {
                    let path = iter
                        .next()
                        .ok_or_else(|| anyhow::anyhow!("--db requires a path"))?;
                    store = StoreKind::Sqlite(PathBuf::from(crate::export::shellexpand(path)));
                }
                "--memory" => store = StoreKind::Memory,
                "--month" => {
                    let value = iter
                        .next()
                        .ok_or_else(|| anyhow::anyhow!("--month requires YYYY-MM"))?;
                    start_month = value.parse()?;
                }
                _ => rest.push(arg.clone()),
            }
        }

        let config = Self {
            store,
            log_path: data_dir.join("teambudget.log"),
            start_month,
        };
        Ok((config, rest))
    }
}

fn data_dir() -> Result<PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("com", "teambudget", "TeamBudget")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
    Ok(data_dir.to_path_buf())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
