pub mod media_type;
pub mod naming;
pub mod operation_id;
pub mod pagination;
pub mod security;
pub mod spec_to_ir;

mod operation;
mod parameter;
mod schema;

pub use spec_to_ir::{TransformOptions, transform, transform_with_options};
