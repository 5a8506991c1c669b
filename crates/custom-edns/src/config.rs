// Copyright 2015-2025 Benjamin Fry <benjaminfry@me.com>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Configuration for query plugins

#[cfg(feature = "toml")]
use std::fs;
#[cfg(feature = "toml")]
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

#[cfg(feature = "toml")]
use crate::error::ConfigResult;
use crate::MAX_DNS_PACKET_SIZE;

/// Configuration for the custom EDNS options plugin
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CustomEdnsConfig {
    /// File listing the options to attach, one `<hex code> <data>` pair per line. Relative
    /// paths are resolved against the chain's base directory.
    pub options_file: PathBuf,

    /// UDP payload size advertised by OPT records added to queries that had none. Defaults to
    /// 4096.
    #[serde(default = "default_max_payload")]
    pub max_payload: u16,
}

impl Default for CustomEdnsConfig {
    fn default() -> Self {
        Self {
            options_file: PathBuf::new(),
            max_payload: MAX_DNS_PACKET_SIZE,
        }
    }
}

fn default_max_payload() -> u16 {
    MAX_DNS_PACKET_SIZE
}

/// Enumeration over all query plugin configurations
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum PluginConfig {
    /// Attaches custom EDNS options to queries
    CustomEdnsOptions(CustomEdnsConfig),
}

/// Configuration for a chain of query plugins
///
/// ```toml
/// directory = "/etc/hickory"
///
/// [[plugins]]
/// type = "custom_edns_options"
/// options_file = "custom_edns_options.txt"
/// ```
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ChainConfig {
    /// Base directory for relative plugin paths
    #[serde(default)]
    pub directory: Option<PathBuf>,

    /// Plugins in evaluation order
    #[serde(default)]
    pub plugins: Vec<PluginConfig>,
}

impl ChainConfig {
    /// Read a [`ChainConfig`] from the TOML file at `path`.
    ///
    /// Without a `directory` setting, relative plugin paths are resolved against the directory
    /// containing the configuration file.
    #[cfg(feature = "toml")]
    pub fn read_config(path: &Path) -> ConfigResult<Self> {
        let toml = fs::read_to_string(path)?;
        let mut config = Self::from_toml(&toml)?;

        if config.directory.is_none() {
            config.directory = path.parent().map(Path::to_path_buf);
        }

        Ok(config)
    }

    /// Read a [`ChainConfig`] from the given TOML string.
    #[cfg(feature = "toml")]
    pub fn from_toml(toml: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(toml)?)
    }
}
