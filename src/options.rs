//! User preference and host-supplied configuration: discard vs. unused-local, severity, and
//! language capability flags.

use crate::method::MethodIr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preference {
    Disabled,
    PreferDiscard,
    PreferUnusedLocal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Suppressed,
    Hidden,
    Info,
    Warning,
    Error,
}

/// External collaborator: resolves the user's preference and severity for a given method's
/// source location. Required to be synchronously resolvable; implementations that load options
/// asynchronously should resolve and cache the result themselves before invoking the coordinator.
pub trait OptionsProvider {
    /// Returns `None` when options genuinely cannot be resolved for this tree, which the
    /// coordinator treats identically to `Disabled`.
    fn preference(&self, method: &MethodIr) -> Option<(Preference, Severity)>;
}

/// A fixed preference/severity pair, useful for tests and for hosts with a single global
/// setting rather than per-tree configuration.
pub struct StaticOptionsProvider(pub Preference, pub Severity);

impl OptionsProvider for StaticOptionsProvider {
    fn preference(&self, _method: &MethodIr) -> Option<(Preference, Severity)> {
        Some((self.0, self.1))
    }
}

/// External collaborator: language capability flags. If `supports_discard` is `false`, a
/// `PreferDiscard` request is downgraded to `PreferUnusedLocal`.
pub trait LanguageCapabilities {
    fn supports_discard(&self) -> bool;
}

pub struct AlwaysSupportsDiscard;

impl LanguageCapabilities for AlwaysSupportsDiscard {
    fn supports_discard(&self) -> bool {
        true
    }
}

pub struct NeverSupportsDiscard;

impl LanguageCapabilities for NeverSupportsDiscard {
    fn supports_discard(&self) -> bool {
        false
    }
}

/// Applies the discard-downgrade capability rule.
pub fn effective_preference(
    preference: Preference,
    caps: &dyn LanguageCapabilities,
) -> Preference {
    if preference == Preference::PreferDiscard && !caps.supports_discard() {
        Preference::PreferUnusedLocal
    } else {
        preference
    }
}
