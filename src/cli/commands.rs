use std::path::{Path, PathBuf};

use colored::Colorize;
use forecast_config::{Config, ConfigManager};
use forecast_core::SystemClock;
use forecast_storage_xlsx::XlsxSource;

use super::{output, InitConfigArgs, InspectArgs, RunArgs};
use crate::{
    app::{self, RunOverrides},
    errors::CliError,
    utils::build_info,
};

/// Config plus the directory relative input paths resolve against.
struct LoadedConfig {
    config: Config,
    dir: Option<PathBuf>,
}

fn load_config(path: Option<&Path>) -> Result<LoadedConfig, CliError> {
    let manager = match path {
        Some(path) => {
            if !path.exists() {
                return Err(CliError::Input(format!(
                    "configuration file {} does not exist",
                    path.display()
                )));
            }
            ConfigManager::new(path.to_path_buf())
        }
        None => ConfigManager::default_location(),
    };
    tracing::debug!(path = %manager.config_path().display(), "loading configuration");
    let config = manager.load()?;
    Ok(LoadedConfig {
        config,
        dir: manager.config_dir().map(Path::to_path_buf),
    })
}

/// Paths typed on the command line are relative to the working directory.
fn from_cwd(path: PathBuf) -> Result<PathBuf, CliError> {
    if path.is_absolute() {
        return Ok(path);
    }
    Ok(std::env::current_dir()?.join(path))
}

pub fn run(args: RunArgs) -> Result<(), CliError> {
    let LoadedConfig { mut config, dir } = load_config(args.config.as_deref())?;
    let overrides = RunOverrides {
        input: args.input.map(from_cwd).transpose()?,
        sheet: args.sheet,
        output_dir: args.output_dir.map(from_cwd).transpose()?,
        target_year: args.target_year,
        horizon_fallback_days: args.horizon_fallback,
        engine: args.engine.map(Into::into),
        skip_charts: args.skip_charts,
    };
    overrides.apply(&mut config);

    let report = app::run_forecast(&config, dir.as_deref(), &SystemClock)?;
    let currency = config.currency_code();
    let format = config.number_format();

    output::section("History");
    println!(
        "{}",
        output::history_table(
            &report.stats,
            report.records_read,
            report.rows_dropped,
            &currency,
            &format
        )
    );
    if report.horizon.used_fallback {
        output::warning(format!(
            "history already reaches {}; forecasting {} day(s) past {}",
            report.projection.year, report.horizon.days, report.horizon.last_history
        ));
    }

    output::section(format!("Forecast {}", report.projection.year));
    if report.projection.is_empty() {
        output::warning(format!(
            "the forecast horizon does not cover {}",
            report.projection.year
        ));
    } else {
        println!("{}", output::projection_table(&report, &currency, &format));
    }
    println!("{}", output::totals_table(&report, &currency, &format));

    output::section("Output");
    output::success(format!("report: {}", report.report_path.display()));
    for (outcome, line) in report.charts.iter().zip(output::chart_lines(&report.charts)) {
        if outcome.is_ok() {
            output::success(line);
        } else {
            output::warning(line);
        }
    }
    Ok(())
}

pub fn inspect(args: InspectArgs) -> Result<(), CliError> {
    let LoadedConfig { mut config, dir } = load_config(args.config.as_deref())?;
    if let Some(input) = args.input {
        config.input_path = from_cwd(input)?;
    }
    let path = config.resolve_input_path(dir.as_deref());
    let sheet = args.sheet.unwrap_or_else(|| config.sheet_name.clone());

    let source = XlsxSource::new();
    let sheets = source.sheet_names(&path)?;
    output::section(format!("{}", path.display()));
    for name in &sheets {
        let marker = if *name == sheet { "*".green().bold() } else { " ".normal() };
        println!(" {} {}", marker, name);
    }

    let preview = source.preview(&path, &sheet, args.rows)?;
    output::section(format!(
        "{} ({} of {} data row(s))",
        preview.sheet,
        preview.rows.len(),
        preview.total_rows
    ));
    println!("{}", output::preview_table(&preview));

    for column in [&config.date_column, &config.revenue_column] {
        let found = preview
            .headers
            .iter()
            .any(|header| header.trim() == column.trim());
        if !found {
            output::warning(format!("configured column \"{}\" is not in the header row", column));
        }
    }
    Ok(())
}

pub fn init_config(args: InitConfigArgs) -> Result<(), CliError> {
    let manager = match args.path {
        Some(path) => ConfigManager::new(from_cwd(path)?),
        None => ConfigManager::default_location(),
    };
    manager.init(args.force)?;
    output::success(format!(
        "configuration written to {}",
        manager.config_path().display()
    ));
    Ok(())
}

pub fn version() {
    let meta = build_info::current();
    output::section(format!("Revenue Forecast {}", meta.version));
    println!("{}", output::build_table(&meta));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_missing_config_is_an_input_error() {
        let err = load_config(Some(Path::new("/nonexistent/revenue-forecast.json")))
            .err()
            .unwrap();
        assert!(matches!(err, CliError::Input(_)));
    }

    #[test]
    fn relative_paths_resolve_from_working_directory() {
        let resolved = from_cwd(PathBuf::from("sales.xlsx")).unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("sales.xlsx"));
        assert_eq!(
            from_cwd(PathBuf::from("/data/sales.xlsx")).unwrap(),
            PathBuf::from("/data/sales.xlsx")
        );
    }
}
