//! CLI error type and its process exit codes.
//!
//! | code | kind            | raised by                                          |
//! |------|-----------------|----------------------------------------------------|
//! | 2    | (clap)          | argument parsing, before `run` is entered          |
//! | 10   | `simulation`    | parameter validation in `Simulation::new`          |
//! | 11   | `io`            | reading `--config`, writing frames or the manifest |
//! | 12   | `input`         | malformed or unknown params, unknown palette       |
//! | 13   | `serialization` | encoding `--json` output                           |

use aggregation_core::SimError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    /// Parameters were well-formed but rejected by validation.
    #[error(transparent)]
    Sim(SimError),
    #[error("{0}")]
    Io(String),
    #[error("{0}")]
    Input(String),
    #[error("cannot encode output: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Sim(_) => 10,
            CliError::Io(_) => 11,
            CliError::Input(_) => 12,
            CliError::Serialization(_) => 13,
        }
    }

    /// Stable label reported in `--json` error output.
    pub fn kind(&self) -> &'static str {
        match self {
            CliError::Sim(_) => "simulation",
            CliError::Io(_) => "io",
            CliError::Input(_) => "input",
            CliError::Serialization(_) => "serialization",
        }
    }
}

/// Export failures are I/O and color or palette errors come from user flags;
/// everything else is a rejected configuration.
impl From<SimError> for CliError {
    fn from(e: SimError) -> Self {
        match e {
            SimError::Io(msg) => CliError::Io(msg),
            e @ (SimError::InvalidColor(_) | SimError::InvalidPalette(_)) => {
                CliError::Input(e.to_string())
            }
            other => CliError::Sim(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeMap, HashSet};

    #[test]
    fn validation_failures_exit_with_simulation_code() {
        let rejected = [
            SimError::WidthTooSmall { width: 2 },
            SimError::NoAgents,
            SimError::UnstableDiffusion {
                ratio: 0.4,
                limit: 0.25,
            },
            SimError::UnstableDecay { product: 2.0 },
            SimError::StepOverflow {
                batches: usize::MAX,
                batch_size: 2,
            },
        ];
        for e in rejected {
            let cli = CliError::from(e);
            assert_eq!(cli.exit_code(), 10, "{cli}");
            assert_eq!(cli.kind(), "simulation");
        }
    }

    #[test]
    fn simulation_message_is_passed_through_unchanged() {
        let inner = SimError::UnstableDiffusion {
            ratio: 0.4,
            limit: 0.25,
        };
        let expected = inner.to_string();
        assert_eq!(CliError::from(inner).to_string(), expected);
    }

    #[test]
    fn export_failure_becomes_io_without_double_prefix() {
        let cli = CliError::from(SimError::Io("frames/aggregation_000100.png: disk full".into()));
        assert_eq!(cli.exit_code(), 11);
        assert_eq!(cli.kind(), "io");
        assert_eq!(cli.to_string(), "frames/aggregation_000100.png: disk full");
    }

    #[test]
    fn color_and_palette_errors_are_user_input() {
        for e in [
            SimError::InvalidColor("expected 6 hex digits, got '#12'".into()),
            SimError::InvalidPalette("unknown palette 'plasma'".into()),
        ] {
            let cli = CliError::from(e);
            assert_eq!(cli.exit_code(), 12);
            assert_eq!(cli.kind(), "input");
        }
    }

    #[test]
    fn json_encoding_failure_exits_with_serialization_code() {
        // Non-string map keys cannot be encoded as JSON object keys.
        let mut bad = BTreeMap::new();
        bad.insert(vec![1_u8], 0);
        let err = serde_json::to_string(&bad).unwrap_err();
        let cli = CliError::from(err);
        assert_eq!(cli.exit_code(), 13);
        assert!(cli.to_string().starts_with("cannot encode output"), "{cli}");
    }

    #[test]
    fn exit_codes_and_kinds_are_distinct() {
        let errors = [
            CliError::Sim(SimError::NoAgents),
            CliError::Io(String::new()),
            CliError::Input(String::new()),
            CliError::from(serde_json::from_str::<u8>("x").unwrap_err()),
        ];
        let codes: HashSet<_> = errors.iter().map(CliError::exit_code).collect();
        let kinds: HashSet<_> = errors.iter().map(CliError::kind).collect();
        assert_eq!(codes.len(), 4);
        assert_eq!(kinds.len(), 4);
        assert!(codes.iter().all(|&c| c != 0 && c != 2));
    }
}
