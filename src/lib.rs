//! Analysis core for an IDE code-style rule that detects and fixes unused value computations in
//! a method body: redundant assignments whose value is never read again, unused locals, unused
//! parameters, and expression statements whose value is discarded.
//!
//! The crate consumes an already-built operation tree and control-flow graph for one method (see
//! [`interfaces::IrProvider`] and [`interfaces::SemanticModel`] for the boundary a real compiler
//! front-end implements) and produces a diagnostic set ([`coordinator::analyze_method`]) plus a
//! structured edit plan a separate rewriter applies ([`fixplan::plan_fixes`]).

pub mod analysis_data;
pub mod block_state;
pub mod cancellation;
pub mod cfg;
pub mod config;
pub mod coordinator;
pub mod dataflow;
pub mod definition;
pub mod delegate;
pub mod diagnostics;
pub mod error;
pub mod fixplan;
pub mod interfaces;
pub mod ir;
pub mod method;
pub mod options;
pub mod symbol;
pub mod traverse;
pub mod walker;

pub use coordinator::{analyze_method, MethodMetadata};
pub use diagnostics::Diagnostic;
pub use error::{AnalysisError, Result};
pub use fixplan::{plan_fixes, Edit, EditPurpose, NewNode};
