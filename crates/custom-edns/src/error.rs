// Copyright 2015-2025 Benjamin Fry <benjaminfry@me.com>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// https://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// https://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! All defined errors for the custom EDNS options plugin

use std::{fmt, io, path::PathBuf};

use thiserror::Error;

use crate::options::{LOCAL_END, LOCAL_START};

/// An alias for results returned by the configuration functions of this crate
pub type ConfigResult<T> = Result<T, ConfigError>;

/// An error encountered while loading an options file
///
/// Every variant other than [`OptionsError::SourceRead`] names the 1-indexed line that
/// failed to load.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum OptionsError {
    /// The options source could not be read
    #[error("unable to read custom edns options: {0}")]
    SourceRead(#[from] io::Error),

    /// The line did not split into a code and a data field
    #[error("syntax error for a custom edns option at line {line}, expected syntax: FDE9 something")]
    Syntax {
        /// Line number, starting at 1
        line: usize,
    },

    /// The code was not a 16 bit hexadecimal number
    #[error("failed to parse hex number for edns option code at line {line}")]
    CodeParse {
        /// Line number, starting at 1
        line: usize,
    },

    /// The code was outside of the EDNS0 local use range
    #[error(
        "edns custom code {code:#06X} out of range at line {line}, code should be between \
         {lower_bound:#06X} and {upper_bound:#06X}"
    )]
    CodeRange {
        /// Line number, starting at 1
        line: usize,
        /// The rejected code
        code: u16,
        /// Lowest accepted code
        lower_bound: u16,
        /// Highest accepted code
        upper_bound: u16,
    },
}

impl OptionsError {
    /// The line that failed to load, if the error is tied to a line
    pub fn line(&self) -> Option<usize> {
        match *self {
            Self::SourceRead(_) => None,
            Self::Syntax { line } | Self::CodeParse { line } | Self::CodeRange { line, .. } => {
                Some(line)
            }
        }
    }

    pub(crate) fn out_of_range(line: usize, code: u16) -> Self {
        Self::CodeRange {
            line,
            code,
            lower_bound: LOCAL_START,
            upper_bound: LOCAL_END,
        }
    }
}

/// The error kind for configuration errors that get returned in the crate
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigErrorKind {
    // foreign
    /// An error got returned from IO
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// An error occurred while decoding toml data
    #[cfg(feature = "toml")]
    #[error("toml decode error: {0}")]
    TomlDecode(#[from] toml::de::Error),

    // local
    /// The options file could not be loaded
    #[error("failed to load custom edns options from {}: {source}", path.display())]
    Options {
        /// Path of the options file
        path: PathBuf,
        /// Reason the file was rejected
        #[source]
        source: OptionsError,
    },
}

/// The error type for configuration errors that get returned in the crate
#[derive(Debug)]
pub struct ConfigError {
    kind: Box<ConfigErrorKind>,
}

impl ConfigError {
    /// Get the kind of the error
    pub fn kind(&self) -> &ConfigErrorKind {
        &self.kind
    }

    /// The options file error behind this error, if any
    pub fn options_error(&self) -> Option<&OptionsError> {
        match &*self.kind {
            ConfigErrorKind::Options { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.kind, f)
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.kind.source()
    }
}

impl<E> From<E> for ConfigError
where
    E: Into<ConfigErrorKind>,
{
    fn from(error: E) -> Self {
        Self {
            kind: Box::new(error.into()),
        }
    }
}
