// Copyright 2015-2025 Benjamin Fry <benjaminfry@me.com>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use arc_swap::ArcSwap;
use tracing::{info, trace, warn};

use crate::{
    carrier::EdnsCarrier,
    config::CustomEdnsConfig,
    error::{ConfigErrorKind, ConfigResult},
    options::OptionSet,
    proto::rr::rdata::opt::{EdnsCode, EdnsOption},
    MAX_DNS_PACKET_SIZE,
};

/// Query plugin that attaches a fixed list of EDNS0 local options to every query.
///
/// The plugin is only ever constructed from a fully validated [`OptionSet`]. Evaluation is
/// lock-free and never fails: the configured options are appended after any options the query
/// already carries, and an OPT record is created for queries without one.
///
/// The active list is an immutable snapshot. [`CustomEdnsOptions::reload`] parses the options
/// file again and publishes the new list in one atomic swap, so concurrent evaluations see
/// either the old list or the new one, never a mix.
///
/// # Example
///
/// ```
/// use std::path::Path;
///
/// use hickory_custom_edns::{CustomEdnsConfig, CustomEdnsOptions};
/// use hickory_proto::op::Message;
///
/// let config = CustomEdnsConfig {
///     options_file: "custom_edns/options.txt".into(),
///     ..CustomEdnsConfig::default()
/// };
///
/// let plugin = CustomEdnsOptions::try_from_config(
///     &config,
///     Some(Path::new("../../tests/test-data")),
/// ).unwrap();
///
/// let mut query = Message::new();
/// plugin.eval(&mut query);
/// assert_eq!(query.extensions().as_ref().unwrap().max_payload(), 4096);
/// ```
#[derive(Debug)]
pub struct CustomEdnsOptions {
    source: Option<PathBuf>,
    max_payload: u16,
    options: ArcSwap<OptionSet>,
}

impl CustomEdnsOptions {
    /// Name of the plugin, as used in the plugin chain configuration
    pub const NAME: &'static str = "custom_edns_options";

    /// Creates a plugin attaching `options`, with no file to reload from
    pub fn new(options: OptionSet) -> Self {
        Self {
            source: None,
            max_payload: MAX_DNS_PACKET_SIZE,
            options: ArcSwap::from_pointee(options),
        }
    }

    /// Sets the UDP payload size advertised by OPT records this plugin creates
    pub fn with_max_payload(mut self, max_payload: u16) -> Self {
        self.max_payload = max_payload;
        self
    }

    /// Loads the options file named by `config`
    ///
    /// A relative `options_file` is resolved against `base_dir` when one is given.
    pub fn try_from_config(
        config: &CustomEdnsConfig,
        base_dir: Option<&Path>,
    ) -> ConfigResult<Self> {
        let path = match base_dir {
            Some(dir) if config.options_file.is_relative() => dir.join(&config.options_file),
            _ => config.options_file.clone(),
        };

        let options = load(&path)?;

        Ok(Self {
            source: Some(path),
            max_payload: config.max_payload,
            options: ArcSwap::from_pointee(options),
        })
    }

    /// Name of the plugin
    pub fn name(&self) -> &'static str {
        Self::NAME
    }

    /// Short human readable description
    pub fn description(&self) -> &'static str {
        "Attaches custom EDNS options to queries"
    }

    /// The file this plugin was loaded from, if any
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// The UDP payload size advertised by OPT records this plugin creates
    pub fn max_payload(&self) -> u16 {
        self.max_payload
    }

    /// The currently active options
    pub fn options(&self) -> Arc<OptionSet> {
        self.options.load_full()
    }

    /// Appends the configured options to the EDNS record of `message`, in order.
    ///
    /// Options already present in the message are left untouched. If the message has no EDNS
    /// record one is added first; if it cannot carry one, the message is not modified.
    pub fn eval<M: EdnsCarrier + ?Sized>(&self, message: &mut M) {
        let options = self.options.load();

        let Some(edns) = message.edns_or_insert(self.max_payload) else {
            trace!("message cannot carry edns, skipping custom edns options");
            return;
        };

        trace!("attaching {} custom edns options", options.len());
        let opt: &mut Vec<(EdnsCode, EdnsOption)> = edns.options_mut().as_mut();
        opt.extend(
            options
                .iter()
                .map(|entry| (entry.edns_code(), entry.to_edns_option())),
        );
    }

    /// Reads the options file again and swaps in the new list.
    ///
    /// On error the current list stays active. Plugins created with [`CustomEdnsOptions::new`]
    /// have no file and always succeed.
    pub fn reload(&self) -> ConfigResult<()> {
        let Some(path) = &self.source else {
            return Ok(());
        };

        match load(path) {
            Ok(options) => {
                info!(
                    "reloaded {} custom edns options from {}",
                    options.len(),
                    path.display()
                );
                self.options.store(Arc::new(options));
                Ok(())
            }
            Err(e) => {
                warn!("keeping previous custom edns options: {e}");
                Err(e)
            }
        }
    }
}

fn load(path: &Path) -> ConfigResult<OptionSet> {
    OptionSet::read_file(path).map_err(|source| {
        ConfigErrorKind::Options {
            path: path.to_owned(),
            source,
        }
        .into()
    })
}
