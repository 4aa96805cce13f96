//! Scope resolution: which rows an actor's request starts from.

pub mod query;
pub mod resolver;
pub mod types;

pub use query::{ColumnRef, Join, Predicate, QuerySpec, ScopeRoot, Selection};
pub use resolver::{
    apply_step, relation_spec, resolve_directory, resolve_invoices, resolve_jobcards, DIRECTORY_TABLE,
    JOBCARD_CONTRACTORS_TABLE,
};
pub use types::*;
