//! Bounded retries for transient filesystem errors

use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;

use backoff::ExponentialBackoffBuilder;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Retry budget for filesystem operations.
///
/// Only transient error kinds are retried, so a run that succeeds behaves
/// exactly as it would without retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RobustnessConfig {
    /// Retries after the first attempt. `0` disables retrying.
    pub max_retries: u32,
    /// Delay before the first retry; grows exponentially afterwards.
    pub initial_backoff_ms: u64,
}

impl Default for RobustnessConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_backoff_ms: 50,
        }
    }
}

impl RobustnessConfig {
    /// A budget that attempts every operation exactly once.
    pub fn no_retries() -> Self {
        Self {
            max_retries: 0,
            initial_backoff_ms: 0,
        }
    }
}

/// Whether an I/O error kind is worth retrying.
pub fn is_transient(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::Interrupted | ErrorKind::WouldBlock | ErrorKind::TimedOut
    )
}

/// Run `op`, retrying while `transient` says the failure may clear up.
///
/// Gives up after `config.max_retries` retries and returns the last error.
pub fn with_retries<T, E, F, P>(config: RobustnessConfig, mut op: F, transient: P) -> std::result::Result<T, E>
where
    F: FnMut() -> std::result::Result<T, E>,
    P: Fn(&E) -> bool,
{
    let policy = ExponentialBackoffBuilder::new()
        .with_initial_interval(Duration::from_millis(config.initial_backoff_ms))
        .with_max_elapsed_time(None)
        .build();

    let mut attempt = 0u32;
    let outcome = backoff::retry(policy, || {
        attempt += 1;
        op().map_err(|e| {
            if attempt <= config.max_retries && transient(&e) {
                tracing::debug!(attempt, "Transient failure, retrying");
                backoff::Error::transient(e)
            } else {
                backoff::Error::permanent(e)
            }
        })
    });

    outcome.map_err(|e| match e {
        backoff::Error::Permanent(e) => e,
        backoff::Error::Transient { err, .. } => err,
    })
}

/// Read a UTF-8 text file, retrying transient failures.
pub fn read_text(path: &Path, config: RobustnessConfig) -> Result<String> {
    with_retries(
        config,
        || std::fs::read_to_string(path),
        |e| is_transient(e.kind()),
    )
    .map_err(|e| Error::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::io;

    fn fast(max_retries: u32) -> RobustnessConfig {
        RobustnessConfig {
            max_retries,
            initial_backoff_ms: 1,
        }
    }

    #[test]
    fn transient_errors_are_retried_until_success() {
        let calls = Cell::new(0);
        let result: std::result::Result<u32, io::Error> = with_retries(
            fast(3),
            || {
                calls.set(calls.get() + 1);
                if calls.get() < 3 {
                    Err(io::Error::from(ErrorKind::Interrupted))
                } else {
                    Ok(7)
                }
            },
            |e| is_transient(e.kind()),
        );
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn permanent_errors_fail_on_first_attempt() {
        let calls = Cell::new(0);
        let result: std::result::Result<(), io::Error> = with_retries(
            fast(5),
            || {
                calls.set(calls.get() + 1);
                Err(io::Error::from(ErrorKind::NotFound))
            },
            |e| is_transient(e.kind()),
        );
        assert_eq!(result.unwrap_err().kind(), ErrorKind::NotFound);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn retry_budget_is_bounded() {
        let calls = Cell::new(0);
        let result: std::result::Result<(), io::Error> = with_retries(
            fast(2),
            || {
                calls.set(calls.get() + 1);
                Err(io::Error::from(ErrorKind::TimedOut))
            },
            |e| is_transient(e.kind()),
        );
        assert!(result.is_err());
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn read_text_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_text(&dir.path().join("missing.txt"), RobustnessConfig::no_retries())
            .unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
