pub mod config;
pub mod diagnostic;
pub mod error;
pub mod input;
pub mod ir;
pub mod parse;
pub mod transform;

pub use diagnostic::{Diagnostic, Diagnostics};
pub use parse::SpecDocument;
