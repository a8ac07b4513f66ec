//! Schema-driven config forms.
//!
//! - `field`: one interpreter per descriptor, owning widget state
//! - `aggregate`: the per-act form merging field responses and judging validity

mod aggregate;
mod field;

pub use aggregate::{ConfigForm, config_responses_valid};
pub use field::{FieldInput, FieldInterpreter, FieldWidget};
