use std::collections::HashMap;

use indexmap::IndexMap;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};

use apigen_compiler::{GeneratedFile, OutputFile, relative_module, tsc};
use apigen_core::Diagnostics;
use apigen_core::config::{ApigenConfig, PluginConfig};
use apigen_core::error::ConfigError;
use apigen_core::ir::IrModel;

use crate::context::PluginContext;
use crate::error::PluginError;
use crate::plugin::instantiate;

const NODE_SEPARATOR: &str = "\n\n";
const INDEX_FILE: &str = "index";

/// Plugins in execution order.
#[derive(Debug, Clone)]
pub struct Pipeline {
    plugins: Vec<PluginConfig>,
}

impl Pipeline {
    /// Resolve the configured plugin list: reject duplicates, add missing
    /// dependencies with default options, then order by dependency.
    pub fn from_config(config: &ApigenConfig) -> Result<Self, ConfigError> {
        let mut plugins: IndexMap<&'static str, PluginConfig> = IndexMap::new();
        for plugin in &config.plugins {
            if plugins.insert(plugin.name(), plugin.clone()).is_some() {
                return Err(ConfigError::DuplicatePlugin(plugin.name().to_string()));
            }
        }

        let mut i = 0;
        while let Some((&name, plugin)) = plugins.get_index(i) {
            let dependencies = plugin.dependencies();
            for &dependency in dependencies {
                if plugins.contains_key(dependency) {
                    continue;
                }
                let default = PluginConfig::default_for(dependency).ok_or_else(|| {
                    ConfigError::UnknownDependency {
                        plugin: name.to_string(),
                        dependency: dependency.to_string(),
                    }
                })?;
                log::debug!("adding plugin `{dependency}` required by `{name}`");
                plugins.insert(dependency, default);
            }
            i += 1;
        }

        let names: Vec<&str> = plugins.keys().copied().collect();
        let edges: Vec<(&str, &str)> = plugins
            .values()
            .flat_map(|p| p.dependencies().iter().map(move |&dep| (dep, p.name())))
            .collect();
        let order = topological_order(&names, &edges)?;

        let plugins = order
            .into_iter()
            .filter_map(|name| plugins.get(name).cloned())
            .collect::<Vec<_>>();
        log::debug!(
            "plugin order: {}",
            plugins.iter().map(|p| p.name()).collect::<Vec<_>>().join(", ")
        );
        Ok(Self { plugins })
    }

    pub fn order(&self) -> Vec<&'static str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    pub fn run(&self, ctx: &mut PluginContext<'_>) -> Result<(), PluginError> {
        for config in &self.plugins {
            let plugin = instantiate(config);
            log::info!("running plugin `{}`", plugin.name());
            plugin.run(ctx)?;
        }
        Ok(())
    }
}

/// Order `nodes` so that every `(from, to)` edge has `from` first.
fn topological_order<'n>(
    nodes: &[&'n str],
    edges: &[(&str, &str)],
) -> Result<Vec<&'n str>, ConfigError> {
    let mut graph: DiGraph<&'n str, ()> = DiGraph::new();
    let indices: HashMap<&str, NodeIndex> = nodes
        .iter()
        .map(|&name| (name, graph.add_node(name)))
        .collect();

    for &(from, to) in edges {
        if let (Some(&a), Some(&b)) = (indices.get(from), indices.get(to)) {
            graph.add_edge(a, b, ());
        }
    }

    toposort(&graph, None)
        .map(|order| order.into_iter().map(|index| graph[index]).collect())
        .map_err(|cycle| ConfigError::DependencyCycle(graph[cycle.node_id()].to_string()))
}

/// Everything one run produced.
#[derive(Debug)]
pub struct GenerateOutput {
    pub files: Vec<OutputFile>,
    pub diagnostics: Diagnostics,
}

impl Pipeline {
    /// Run the plugins over `ir` and serialize the resulting files.
    /// `config` must be the one the pipeline was resolved from.
    pub fn generate(
        &self,
        ir: &IrModel,
        config: &ApigenConfig,
    ) -> Result<GenerateOutput, PluginError> {
        let mut ctx = PluginContext::new(ir, config);
        self.run(&mut ctx)?;

        let (files, diagnostics) = ctx.finish();
        let mut outputs: Vec<OutputFile> = files
            .into_iter()
            .map(|file| file.into_output(NODE_SEPARATOR))
            .collect();
        if config.output_options.index {
            let index = index_file(&outputs, config.output_options.header);
            outputs.push(index.into_output("\n"));
        }
        Ok(GenerateOutput {
            files: outputs,
            diagnostics,
        })
    }
}

/// Resolve the configured pipeline and run it over `ir`.
pub fn generate(ir: &IrModel, config: &ApigenConfig) -> Result<GenerateOutput, PluginError> {
    Pipeline::from_config(config)?.generate(ir, config)
}

/// Barrel re-exporting every non-empty output flagged for the index.
fn index_file(outputs: &[OutputFile], header: bool) -> GeneratedFile {
    let mut index = GeneratedFile::new(INDEX_FILE, INDEX_FILE, header);
    for output in outputs {
        if output.export_from_index && output.content.is_some() {
            index.add(tsc::export_all(relative_module(index.path(), &output.path)));
        }
    }
    index
}
