// Copyright 2015-2025 Benjamin Fry <benjaminfry@me.com>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Ordered chains of query plugins

use std::{path::Path, slice};

use tracing::{info, warn};

use crate::{
    carrier::EdnsCarrier,
    config::{ChainConfig, PluginConfig},
    custom_edns::CustomEdnsOptions,
    error::ConfigResult,
};

/// A plugin that rewrites queries before they are forwarded
#[derive(Debug)]
#[non_exhaustive]
pub enum QueryPlugin {
    /// Attaches custom EDNS options
    CustomEdnsOptions(CustomEdnsOptions),
}

impl QueryPlugin {
    /// Builds the plugin described by `config`
    pub fn try_from_config(config: &PluginConfig, base_dir: Option<&Path>) -> ConfigResult<Self> {
        match config {
            PluginConfig::CustomEdnsOptions(config) => Ok(Self::CustomEdnsOptions(
                CustomEdnsOptions::try_from_config(config, base_dir)?,
            )),
        }
    }

    /// Name of the plugin
    pub fn name(&self) -> &'static str {
        match self {
            Self::CustomEdnsOptions(plugin) => plugin.name(),
        }
    }

    /// Short human readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::CustomEdnsOptions(plugin) => plugin.description(),
        }
    }

    /// Applies the plugin to `message`
    pub fn eval<M: EdnsCarrier + ?Sized>(&self, message: &mut M) {
        match self {
            Self::CustomEdnsOptions(plugin) => plugin.eval(message),
        }
    }

    /// Reloads the plugin's configuration
    pub fn reload(&self) -> ConfigResult<()> {
        match self {
            Self::CustomEdnsOptions(plugin) => plugin.reload(),
        }
    }
}

impl From<CustomEdnsOptions> for QueryPlugin {
    fn from(plugin: CustomEdnsOptions) -> Self {
        Self::CustomEdnsOptions(plugin)
    }
}

/// Query plugins applied in order to every query
#[derive(Debug, Default)]
pub struct PluginChain {
    plugins: Vec<QueryPlugin>,
}

impl PluginChain {
    /// Creates an empty chain
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds every plugin listed in `config`; the first plugin that fails to load fails the
    /// whole chain.
    pub fn from_config(config: &ChainConfig) -> ConfigResult<Self> {
        let base_dir = config.directory.as_deref();

        let mut chain = Self::new();
        for plugin in &config.plugins {
            let plugin = QueryPlugin::try_from_config(plugin, base_dir)?;
            info!("loaded query plugin {}: {}", plugin.name(), plugin.description());
            chain.push(plugin);
        }

        Ok(chain)
    }

    /// Adds a plugin at the end of the chain
    pub fn push(&mut self, plugin: impl Into<QueryPlugin>) {
        self.plugins.push(plugin.into());
    }

    /// Applies every plugin to `message`, in chain order
    pub fn eval<M: EdnsCarrier + ?Sized>(&self, message: &mut M) {
        for plugin in &self.plugins {
            plugin.eval(message);
        }
    }

    /// Reloads every plugin.
    ///
    /// A plugin that fails to reload keeps its previous configuration and does not stop the
    /// other plugins from reloading. The first error is returned.
    pub fn reload(&self) -> ConfigResult<()> {
        let mut result = Ok(());
        for plugin in &self.plugins {
            if let Err(e) = plugin.reload() {
                warn!("failed to reload query plugin {}: {e}", plugin.name());
                if result.is_ok() {
                    result = Err(e);
                }
            }
        }

        result
    }

    /// Number of plugins in the chain
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Returns true if the chain has no plugins
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Iterate over the plugins in chain order
    pub fn iter(&self) -> slice::Iter<'_, QueryPlugin> {
        self.plugins.iter()
    }
}
