use std::{
    fs,
    path::{Path, PathBuf},
    time::SystemTime,
};

use crate::prelude::*;

/// File-name shape the logger uses for session logs.
const LOG_PREFIX: &str = "energy_log_";
const LOG_SUFFIX: &str = ".csv";

/// Picks the most recently modified session log in the directory. Ties break
/// by file name so that repeated runs pick the same log.
#[instrument(skip_all)]
pub fn find_latest_log(directory: &Path) -> Result<PathBuf> {
    let entries = fs::read_dir(directory)
        .with_context(|| format!("failed to list `{}`", directory.display()))?;

    let mut candidates = Vec::new();
    for entry in entries {
        let entry = entry?;
        let file_name = entry.file_name();
        let Some(file_name) = file_name.to_str() else {
            continue;
        };
        if !(file_name.starts_with(LOG_PREFIX) && file_name.ends_with(LOG_SUFFIX)) {
            continue;
        }
        let modified_at = entry.metadata()?.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        candidates.push((modified_at, file_name.to_owned(), entry.path()));
    }

    candidates
        .into_iter()
        .max_by(|left, right| (left.0, &left.1).cmp(&(right.0, &right.1)))
        .map(|(_, _, path)| path)
        .with_context(|| format!("no session logs found under `{}`", directory.display()))
}
