//! Solver tunables, covering the policy points this crate leaves open for a host to decide.

use rustc_hash::FxHashSet;

/// Configuration for one run of the analyzer over a single method.
///
/// This crate has no interprocedural mode; the knobs here instead govern a couple of policy
/// points left for a host to decide.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Attempt the fast operation-tree pass before falling back to the precise CFG pass.
    /// Disabling this always runs the precise path; useful for testing the precise path in
    /// isolation, or for hosts that have found the fast path not worth its upfront tree walk
    /// for their workloads.
    try_fast_path: bool,
    /// Whether `EXPR_UNUSED` fires for boolean-valued and compile-time-constant expression
    /// statements. This crate defaults to excluding both, exposed as a policy flag.
    flag_boolean_and_constant_expression_statements: bool,
    /// Method-to-ignore attributes for the unused-parameter check, e.g. conditional-compilation
    /// or serialization-callback attribute names.
    ignored_parameter_attributes: FxHashSet<String>,
}

impl AnalysisConfig {
    pub fn new() -> Self {
        Self {
            try_fast_path: true,
            flag_boolean_and_constant_expression_statements: false,
            ignored_parameter_attributes: FxHashSet::default(),
        }
    }

    pub fn try_fast_path(&self) -> bool {
        self.try_fast_path
    }

    pub fn set_try_fast_path(&mut self, yes: bool) -> &mut Self {
        self.try_fast_path = yes;
        self
    }

    pub fn flags_boolean_and_constant_expression_statements(&self) -> bool {
        self.flag_boolean_and_constant_expression_statements
    }

    pub fn set_flag_boolean_and_constant_expression_statements(&mut self, yes: bool) -> &mut Self {
        self.flag_boolean_and_constant_expression_statements = yes;
        self
    }

    pub fn ignore_parameter_attribute(&mut self, name: impl Into<String>) -> &mut Self {
        self.ignored_parameter_attributes.insert(name.into());
        self
    }

    pub fn ignores_parameter_attribute(&self, name: &str) -> bool {
        self.ignored_parameter_attributes.contains(name)
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self::new()
    }
}
