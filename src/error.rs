//! Failure taxonomy for the sampling engine.
//!
//! Everything below the platform gate is absorbed by its consumer and
//! converted into a defined default value; nothing here is allowed to
//! terminate the polling loop.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("time counter query failed: {0}")]
    TimeCounterQuery(std::io::Error),

    #[error("extended memory status query failed: {0}")]
    ExtendedMemoryQuery(std::io::Error),

    #[error("legacy memory status query failed: {0}")]
    LegacyMemoryQuery(std::io::Error),

    #[error("all memory status queries failed")]
    AllMemoryQueriesFailed,

    #[error("metrics aggregation fault in the {0} stage")]
    AggregationFault(&'static str),

    #[error("host platform lacks the required native APIs")]
    UnsupportedPlatform,
}
