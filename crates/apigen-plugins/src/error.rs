use apigen_compiler::CompilerError;
use apigen_core::error::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PluginError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("compiler error: {0}")]
    Compiler(#[from] CompilerError),

    #[error("plugin `{plugin}` needs file `{file}`, which no plugin has created")]
    MissingFile { plugin: String, file: String },
}
