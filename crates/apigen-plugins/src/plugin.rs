use apigen_core::config::PluginConfig;

use crate::context::PluginContext;
use crate::error::PluginError;
use crate::transformers::TransformersPlugin;
use crate::typescript::TypeScriptPlugin;

/// A generator run once per pipeline execution.
pub trait Plugin {
    fn name(&self) -> &'static str;

    /// Plugins that must run first.
    fn dependencies(&self) -> &'static [&'static str];

    fn run(&self, ctx: &mut PluginContext<'_>) -> Result<(), PluginError>;
}

/// Build the plugin described by `config`.
pub fn instantiate(config: &PluginConfig) -> Box<dyn Plugin> {
    match config {
        PluginConfig::TypeScript(options) => Box::new(TypeScriptPlugin::new(options.clone())),
        PluginConfig::Transformers(options) => Box::new(TransformersPlugin::new(options.clone())),
    }
}
