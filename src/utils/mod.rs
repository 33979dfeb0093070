pub mod build_info;

use std::sync::Once;

use tracing_subscriber::{filter::Directive, fmt, EnvFilter};

static TRACING_INIT: Once = Once::new();

const DEFAULT_DIRECTIVE: &str = "revenue_forecast=info";
const CRATE_DIRECTIVES: [&str; 2] = ["forecast_core=info", "forecast_storage_xlsx=info"];

/// Initializes the global tracing subscriber.
///
/// `RUST_LOG` replaces the default directives when set. Events go to stderr
/// so command output on stdout stays clean.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let spec = std::env::var(EnvFilter::DEFAULT_ENV).ok();
        // a subscriber may already be installed by an embedding application
        let _ = fmt()
            .with_env_filter(build_filter(spec.as_deref()))
            .with_writer(std::io::stderr)
            .try_init();
    });
}

fn build_filter(spec: Option<&str>) -> EnvFilter {
    if let Some(spec) = spec.map(str::trim).filter(|spec| !spec.is_empty()) {
        match EnvFilter::try_new(spec) {
            Ok(filter) => return filter,
            Err(err) => eprintln!("ignoring invalid {}: {err}", EnvFilter::DEFAULT_ENV),
        }
    }
    std::iter::once(DEFAULT_DIRECTIVE)
        .chain(CRATE_DIRECTIVES)
        .filter_map(|directive| directive.parse::<Directive>().ok())
        .fold(EnvFilter::default(), |filter, directive| filter.add_directive(directive))
}
