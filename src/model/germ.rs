// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Germs: short gate-label words that are repeated to amplify errors.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result, ValidationError};

/// An ordered sequence of gate labels, applied first to last.
///
/// Germs compare by content and display as their concatenated labels
/// (`GxGy`). Labels follow the `G<name>` convention, which is what lets
/// [`Germ::parse`] split a concatenated word back into labels.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Germ(Vec<String>);

impl Germ {
    /// Build a germ from gate labels.
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(labels.into_iter().map(Into::into).collect())
    }

    /// Germ of a single gate.
    pub fn single(label: impl Into<String>) -> Self {
        Self(vec![label.into()])
    }

    /// Parse a concatenated word such as `GxGyGi`.
    ///
    /// The empty string (or `{}`) parses to the empty germ.
    pub fn parse(word: &str) -> Result<Self> {
        let word = word.trim();
        if word.is_empty() || word == "{}" {
            return Ok(Self(Vec::new()));
        }
        if !word.starts_with('G') {
            return Err(ValidationError::InvalidArgument(format!(
                "germ '{}' must be a concatenation of G-prefixed gate labels",
                word
            ))
            .into());
        }

        let mut labels = Vec::new();
        let mut current = String::new();
        for ch in word.chars() {
            if ch == 'G' && !current.is_empty() {
                labels.push(std::mem::take(&mut current));
            }
            current.push(ch);
        }
        labels.push(current);

        if let Some(bad) = labels.iter().find(|l| l.len() < 2) {
            return Err(ValidationError::InvalidArgument(format!(
                "germ '{}' contains an unnamed gate '{}'",
                word, bad
            ))
            .into());
        }
        Ok(Self(labels))
    }

    pub fn labels(&self) -> &[String] {
        &self.0
    }

    /// Number of gates in the germ.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The germ repeated `times` times (`germ^L`).
    pub fn repeat(&self, times: usize) -> Self {
        Self(
            std::iter::repeat(self.0.iter().cloned())
                .take(times)
                .flatten()
                .collect(),
        )
    }
}

impl fmt::Display for Germ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "{{}}");
        }
        for label in &self.0 {
            write!(f, "{}", label)?;
        }
        Ok(())
    }
}

impl FromStr for Germ {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Parse a list of concatenated germ words.
pub fn parse_germs<S: AsRef<str>>(words: &[S]) -> Result<Vec<Germ>> {
    words.iter().map(|w| Germ::parse(w.as_ref())).collect()
}
