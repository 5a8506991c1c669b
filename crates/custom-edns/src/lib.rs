// Copyright 2015-2025 Benjamin Fry <benjaminfry@me.com>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

// LIBRARY WARNINGS
#![warn(
    clippy::default_trait_access,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::unimplemented,
    clippy::use_self,
    missing_copy_implementations,
    missing_docs,
    non_snake_case,
    non_upper_case_globals,
    rust_2018_idioms,
    unreachable_pub
)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Custom EDNS0 local options for Hickory DNS query pipelines.
//!
//! Operators list `(code, data)` pairs in a plain text file:
//!
//! ```text
//! # vendor tag
//! FDE9 tenant-42
//! FFF0 some opaque payload
//! ```
//!
//! The file is validated once at startup into an [`OptionSet`], and a
//! [`CustomEdnsOptions`] plugin then appends those options to the EDNS0 OPT pseudo-record of
//! every query it evaluates, creating the record when the query has none.
//!
//! ```
//! use hickory_custom_edns::{CustomEdnsOptions, OptionSet};
//! use hickory_proto::op::Message;
//!
//! let options: OptionSet = "FDE9 foo\nFFF0 bar\n".parse().unwrap();
//! let plugin = CustomEdnsOptions::new(options);
//!
//! let mut query = Message::new();
//! plugin.eval(&mut query);
//!
//! assert!(query.extensions().is_some());
//! ```

pub use hickory_proto as proto;

mod carrier;
pub mod chain;
pub mod config;
mod custom_edns;
pub mod error;
pub mod options;

pub use self::carrier::EdnsCarrier;
pub use self::chain::{PluginChain, QueryPlugin};
pub use self::config::{ChainConfig, CustomEdnsConfig, PluginConfig};
pub use self::custom_edns::CustomEdnsOptions;
pub use self::error::{ConfigError, ConfigErrorKind, ConfigResult, OptionsError};
pub use self::options::{OptionEntry, OptionSet};

/// Maximum size of a DNS packet, advertised as the UDP payload size of EDNS records created for
/// queries that did not carry one
pub const MAX_DNS_PACKET_SIZE: u16 = 4_096;
