//! Input discovery: the newest file matching the watched glob.

use std::path::PathBuf;
use std::time::SystemTime;

use crate::exit_codes::{EXIT_NO_INPUT, EXIT_USAGE};
use crate::CliError;

/// Newest-by-modification-time file matching `pattern`. No match is a
/// hard error — the job never waits for input to appear.
pub fn newest_matching(pattern: &str) -> Result<PathBuf, CliError> {
    let paths = glob::glob(pattern).map_err(|e| CliError {
        code: EXIT_USAGE,
        message: format!("invalid input glob {pattern:?}: {e}"),
        hint: None,
    })?;

    let mut newest: Option<(SystemTime, PathBuf)> = None;
    for entry in paths {
        let path = entry.map_err(|e| CliError {
            code: EXIT_NO_INPUT,
            message: format!("cannot access {}: {e}", e.path().display()),
            hint: None,
        })?;
        if !path.is_file() {
            continue;
        }
        let modified = std::fs::metadata(&path)
            .and_then(|m| m.modified())
            .map_err(|e| CliError {
                code: EXIT_NO_INPUT,
                message: format!("cannot stat {}: {e}", path.display()),
                hint: None,
            })?;
        if newest.as_ref().map_or(true, |(t, _)| modified > *t) {
            newest = Some((modified, path));
        }
    }

    newest.map(|(_, p)| p).ok_or_else(|| CliError {
        code: EXIT_NO_INPUT,
        message: format!("no input CSV matches {pattern:?}"),
        hint: Some("drop the aging export into the watched directory and re-run".to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{File, FileTimes};
    use std::time::Duration;

    fn write_with_mtime(dir: &std::path::Path, name: &str, secs_after_epoch: u64) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, "x").unwrap();
        let mtime = SystemTime::UNIX_EPOCH + Duration::from_secs(secs_after_epoch);
        let f = File::options().write(true).open(&path).unwrap();
        f.set_times(FileTimes::new().set_modified(mtime)).unwrap();
        path
    }

    #[test]
    fn picks_newest_by_mtime() {
        let dir = tempfile::tempdir().unwrap();
        write_with_mtime(dir.path(), "old.csv", 1_000_000);
        let newest = write_with_mtime(dir.path(), "new.csv", 2_000_000);
        write_with_mtime(dir.path(), "middle.csv", 1_500_000);

        let pattern = format!("{}/*.csv", dir.path().display());
        assert_eq!(newest_matching(&pattern).unwrap(), newest);
    }

    #[test]
    fn no_match_is_a_hard_error() {
        let dir = tempfile::tempdir().unwrap();
        let pattern = format!("{}/*.csv", dir.path().display());
        let err = newest_matching(&pattern).unwrap_err();
        assert_eq!(err.code, EXIT_NO_INPUT);
        assert!(err.message.contains("no input CSV"));
    }

    #[test]
    fn non_csv_files_ignored_by_glob() {
        let dir = tempfile::tempdir().unwrap();
        write_with_mtime(dir.path(), "notes.txt", 3_000_000);
        let only = write_with_mtime(dir.path(), "aging.csv", 1_000_000);

        let pattern = format!("{}/*.csv", dir.path().display());
        assert_eq!(newest_matching(&pattern).unwrap(), only);
    }

    #[test]
    fn bad_pattern_is_usage_error() {
        let err = newest_matching("incoming[").unwrap_err();
        assert_eq!(err.code, EXIT_USAGE);
    }
}
