#![doc(test(attr(deny(warnings))))]

//! Revenue Forecast loads a sales workbook, forecasts daily revenue through
//! the end of a target year and exports the result as a workbook and charts.

pub mod app;
pub mod charts;
pub mod cli;
pub mod errors;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup debug log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::debug!(
            version = utils::build_info::CLI_VERSION,
            "revenue forecast tracing initialized"
        );
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
        super::init();
    }
}
