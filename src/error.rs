//! Error taxonomy for the analysis core.
//!
//! Only [`AnalysisError::InputInvariantViolation`] is meant to ever reach a caller in practice;
//! the other recoverable conditions are handled locally by the coordinator and never escape as
//! an `Err`. An unresolvable delegate target has no variant here: it is handled inline by
//! [`crate::delegate::resolve_invocation`] via `AnalysisData::reset_state`, never surfaced to
//! callers.

use thiserror::Error;

pub type Result<T> = core::result::Result<T, AnalysisError>;

/// Errors that can be produced while analyzing a single method.
///
/// All variants besides [`AnalysisError::InputInvariantViolation`] are recovered locally by
/// [`crate::coordinator::analyze_method`] and translated into "no diagnostics for this method"
/// rather than propagated; they are exposed here so that host integrations which bypass the
/// coordinator can still observe and log them.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// A structural invariant of the IR was violated: a CFG without an `Entry`/`Exit`, or a
    /// nested CFG whose parent pointer does not point back to its enclosing CFG. This indicates
    /// a bug in the IR provider, not in a user's source, and should not be constructed by normal
    /// control flow — prefer `panic!`/`debug_assert!` at the violation site and reserve this
    /// variant for callers that want to convert such a panic into a typed error at an API
    /// boundary (e.g. via `std::panic::catch_unwind`).
    #[error("IR invariant violated: {0}")]
    InputInvariantViolation(&'static str),

    /// Cancellation was requested while analysis was in progress.
    #[error("analysis was cancelled")]
    AnalysisAborted,

    /// The options provider could not resolve a preference for this method's syntax tree.
    /// Treated identically to an explicit `Preference::Disabled`.
    #[error("no options available for this syntax tree")]
    OptionsUnavailable,

    /// The fix planner was asked to plan an edit that is infeasible for the target language
    /// (e.g. a discard-form fix requested where `supports_discard` is `false`, and no
    /// `PreferUnusedLocal` fallback applies either). Diagnostics are still emitted; only the fix
    /// is dropped.
    #[error("no feasible fix for this diagnostic under the given language capabilities")]
    FixPlanInfeasible,
}
