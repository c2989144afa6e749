pub mod context;
pub mod error;
pub mod pipeline;
pub mod plugin;
pub mod transformers;
pub mod typescript;

pub use context::{EventKind, IrEvent, PluginContext};
pub use error::PluginError;
pub use pipeline::{GenerateOutput, Pipeline, generate};
pub use plugin::{Plugin, instantiate};
