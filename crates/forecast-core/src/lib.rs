//! forecast-core
//!
//! Forecasting pipeline logic: cleaning, horizon planning, forecast engines,
//! target-year aggregation and run orchestration.
//! Depends on forecast-domain. No file I/O; sources and sinks are traits.

pub mod aggregate;
pub mod cleaning;
pub mod engine;
pub mod error;
pub mod horizon;
pub mod pipeline;
pub mod sinks;
pub mod source;
pub mod summary;
pub mod time;

pub use aggregate::*;
pub use cleaning::*;
pub use engine::*;
pub use error::CoreError;
pub use horizon::*;
pub use pipeline::*;
pub use sinks::*;
pub use source::*;
pub use summary::*;
pub use time::*;

#[cfg(test)]
mod tests;
