//! Execution-concurrency contract for command handlers.

use serde::{Deserialize, Serialize};

/// How a matched command's handler is executed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunMode {
    /// Execute inline: the dispatch call awaits the handler and observes its
    /// outcome directly.
    #[default]
    Sync,
    /// Schedule the handler as an independent task; the dispatch call returns
    /// immediately and failures are only observable via the error event.
    Async,
    /// Schedule fully detached: no events, no propagation. For handlers whose
    /// failure is inconsequential to report.
    FireAndForget,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_mode_default_is_sync() {
        assert_eq!(RunMode::default(), RunMode::Sync);
    }

    #[test]
    fn test_run_mode_serde_round_trip() {
        let json = serde_json::to_string(&RunMode::FireAndForget).expect("serialize");
        let back: RunMode = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, RunMode::FireAndForget);
    }
}
