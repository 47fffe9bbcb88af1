//! # Component Categories
//!
//! Defines the [`ComponentCategory`] enum: the five kinds of collector
//! pipeline components. This is the single definition used for parsing
//! lookups, splitting asset filenames, and grouping listings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::IdentityError;

/// The category of a collector component.
///
/// Ordering follows declaration order, which is also the order listings
/// are grouped in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentCategory {
    /// Ingests telemetry into the pipeline.
    Receiver,
    /// Transforms telemetry in flight.
    Processor,
    /// Sends telemetry out of the pipeline.
    Exporter,
    /// Adds capabilities outside the data path (health checks, auth).
    Extension,
    /// Joins two pipelines, acting as exporter on one and receiver on the other.
    Connector,
}

impl ComponentCategory {
    /// Return all categories as a slice.
    pub fn all() -> &'static [ComponentCategory] {
        &[
            Self::Receiver,
            Self::Processor,
            Self::Exporter,
            Self::Extension,
            Self::Connector,
        ]
    }

    /// The lowercase name used in asset filenames and cache keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Receiver => "receiver",
            Self::Processor => "processor",
            Self::Exporter => "exporter",
            Self::Extension => "extension",
            Self::Connector => "connector",
        }
    }
}

impl fmt::Display for ComponentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComponentCategory {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "receiver" => Ok(Self::Receiver),
            "processor" => Ok(Self::Processor),
            "exporter" => Ok(Self::Exporter),
            "extension" => Ok(Self::Extension),
            "connector" => Ok(Self::Connector),
            other => Err(IdentityError::InvalidCategory(other.to_string())),
        }
    }
}
