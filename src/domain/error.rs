// Dashboard error taxonomy
use thiserror::Error;

use super::resource::ResourceKind;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DashboardError {
    #[error("invalid period {year}-{month:02}: {reason}")]
    InvalidPeriod {
        year: i32,
        month: u32,
        reason: String,
    },

    #[error("{kind} unavailable: {reason}")]
    ResourceUnavailable { kind: ResourceKind, reason: String },

    #[error("metadata for {kind} unavailable: {reason}")]
    MetadataUnavailable { kind: ResourceKind, reason: String },

    #[error("every resource for {period} failed to load")]
    AllResourcesFailed { period: String },

    #[error("request for {period} was superseded by a newer request")]
    Superseded { period: String },

    #[error("unknown dashboard domain: {0}")]
    UnknownDomain(String),
}
