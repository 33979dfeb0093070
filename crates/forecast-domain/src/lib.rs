//! forecast-domain
//!
//! Pure data models for the revenue forecasting pipeline (records, daily
//! series, forecasts, monthly projections). No I/O, no model fitting.

pub mod calendar;
pub mod forecast;
pub mod model;
pub mod money;
pub mod projection;
pub mod record;
pub mod series;

pub use calendar::*;
pub use forecast::*;
pub use model::*;
pub use money::*;
pub use projection::*;
pub use record::*;
pub use series::*;
