use std::{
    error::Error,
    fs,
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use forecast_config::{expand_year, ChartConfig};
use forecast_core::{ChartInputs, ChartKind, ChartSink, CoreError};
use forecast_domain::{format_thousands, ComponentSeries, ForecastPoint, SeasonalityMode};
use plotters::{
    element::ErrorBar,
    prelude::*,
    style::text_anchor::{HPos, Pos, VPos},
};

use super::{
    fonts::{ensure_font, FONT_FAMILY},
    layout::{
        cycle_window, date_axis_format, date_label, day_offset, value_range, AxisFormat,
    },
};

type DrawResult = Result<(), Box<dyn Error>>;

const FORECAST_COLOR: RGBColor = RGBColor(31, 119, 180);
const HISTORY_COLOR: RGBColor = RGBColor(40, 40, 40);
const TARGET_COLOR: RGBColor = RGBColor(214, 39, 40);
const BAR_COLOR: RGBColor = RGBColor(44, 160, 44);
const CUTOFF_COLOR: RGBColor = RGBColor(150, 150, 150);
const BAND_OPACITY: f64 = 0.2;
const LABEL_HEADROOM: f64 = 0.12;
const VALUE_LABELS: usize = 10;
const PANEL_VALUE_LABELS: usize = 5;

/// Output file names of the four charts, with `{year}` already expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartFiles {
    pub full_forecast: String,
    pub components: String,
    pub target_year: String,
    pub monthly: String,
}

impl ChartFiles {
    pub fn from_config(config: &ChartConfig, year: i32) -> Self {
        Self {
            full_forecast: expand_year(&config.full_forecast_file, year),
            components: expand_year(&config.components_file, year),
            target_year: expand_year(&config.target_year_file, year),
            monthly: expand_year(&config.monthly_file, year),
        }
    }

    pub fn name(&self, kind: ChartKind) -> &str {
        match kind {
            ChartKind::FullForecast => &self.full_forecast,
            ChartKind::Components => &self.components,
            ChartKind::TargetYear => &self.target_year,
            ChartKind::Monthly => &self.monthly,
        }
    }
}

/// Draws PNG charts into one directory with plotters' bitmap backend.
#[derive(Debug, Clone)]
pub struct PlottersChartRenderer {
    output_dir: PathBuf,
    files: ChartFiles,
    size: (u32, u32),
    year: i32,
    font_path: Option<PathBuf>,
}

impl PlottersChartRenderer {
    pub fn new(output_dir: PathBuf, files: ChartFiles, size: (u32, u32), year: i32) -> Self {
        Self {
            output_dir,
            files,
            size,
            year,
            font_path: None,
        }
    }

    pub fn from_config(output_dir: PathBuf, config: &ChartConfig, year: i32) -> Self {
        Self {
            font_path: config.font_path.clone(),
            ..Self::new(
                output_dir,
                ChartFiles::from_config(config, year),
                (config.width, config.height),
                year,
            )
        }
    }

    pub fn path_for(&self, kind: ChartKind) -> PathBuf {
        self.output_dir.join(self.files.name(kind))
    }

    fn draw(&self, kind: ChartKind, path: &Path, inputs: &ChartInputs<'_>) -> DrawResult {
        match kind {
            ChartKind::FullForecast => draw_full_forecast(path, self.size, inputs),
            ChartKind::Components => draw_components(path, self.size, self.year, inputs),
            ChartKind::TargetYear => draw_target_year(path, self.size, self.year, inputs),
            ChartKind::Monthly => draw_monthly(path, self.size, inputs),
        }
    }
}

impl ChartSink for PlottersChartRenderer {
    fn render(&self, kind: ChartKind, inputs: &ChartInputs<'_>) -> Result<PathBuf, CoreError> {
        ensure_font(self.font_path.as_deref())?;
        fs::create_dir_all(&self.output_dir).map_err(|err| {
            CoreError::Export(format!("cannot create {}: {}", self.output_dir.display(), err))
        })?;

        let path = self.path_for(kind);
        self.draw(kind, &path, inputs)
            .map_err(|err| CoreError::Export(format!("{} chart: {}", kind, err)))?;
        Ok(path)
    }
}

fn title_font() -> FontDesc<'static> {
    (FONT_FAMILY, 30.0).into_font()
}

fn panel_font() -> FontDesc<'static> {
    (FONT_FAMILY, 22.0).into_font()
}

fn label_font() -> FontDesc<'static> {
    (FONT_FAMILY, 16.0).into_font()
}

fn bar_label_style() -> TextStyle<'static> {
    TextStyle::from((FONT_FAMILY, 16.0).into_font()).pos(Pos::new(HPos::Center, VPos::Bottom))
}

/// Closed polygon running along the upper bounds and back along the lower ones.
fn band_polygon<'a, I>(base: NaiveDate, points: I, color: RGBColor) -> Polygon<(f64, f64)>
where
    I: IntoIterator<Item = &'a ForecastPoint>,
    I::IntoIter: DoubleEndedIterator + Clone,
{
    let points = points.into_iter();
    let upper = points
        .clone()
        .map(|point| (day_offset(base, point.date), point.upper));
    let lower = points
        .rev()
        .map(|point| (day_offset(base, point.date), point.lower));
    Polygon::new(upper.chain(lower).collect::<Vec<_>>(), color.mix(BAND_OPACITY).filled())
}

fn draw_full_forecast(path: &Path, size: (u32, u32), inputs: &ChartInputs<'_>) -> DrawResult {
    let points = &inputs.forecast.points;
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return Err("forecast has no points".into());
    };
    let base = first.date;
    let x_end = day_offset(base, last.date).max(1.0);
    let (y_min, y_max) = value_range(
        points
            .iter()
            .flat_map(|point| [point.lower, point.upper])
            .chain(inputs.history.values()),
    );

    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("Revenue forecast", title_font())
        .margin(24)
        .x_label_area_size(60)
        .y_label_area_size(110)
        .build_cartesian_2d(0f64..x_end, y_min..y_max)?;

    let x_format = date_axis_format(x_end);
    let y_format = AxisFormat::money((y_min, y_max), VALUE_LABELS);
    let symbol = inputs.currency.symbol();
    chart
        .configure_mesh()
        .x_labels(12)
        .x_label_formatter(&|x| date_label(base, *x, x_format))
        .y_labels(VALUE_LABELS)
        .y_label_formatter(&|y| y_format.label(*y, &symbol))
        .x_desc("Date")
        .y_desc("Revenue")
        .label_style(label_font())
        .axis_desc_style(label_font())
        .draw()?;

    chart
        .draw_series(std::iter::once(band_polygon(base, points, FORECAST_COLOR)))?
        .label(format!(
            "{:.0}% interval",
            inputs.forecast.interval_width * 100.0
        ))
        .legend(|(x, y)| {
            Rectangle::new(
                [(x, y - 5), (x + 20, y + 5)],
                FORECAST_COLOR.mix(BAND_OPACITY).filled(),
            )
        });
    chart
        .draw_series(LineSeries::new(
            points
                .iter()
                .map(|point| (day_offset(base, point.date), point.point)),
            FORECAST_COLOR.stroke_width(2),
        ))?
        .label("Forecast")
        .legend(|(x, y)| {
            PathElement::new(vec![(x, y), (x + 20, y)], FORECAST_COLOR.stroke_width(2))
        });
    chart
        .draw_series(inputs.history.days().iter().map(|day| {
            Circle::new(
                (day_offset(base, day.date), day.revenue),
                2,
                HISTORY_COLOR.filled(),
            )
        }))?
        .label("Actual")
        .legend(|(x, y)| Circle::new((x + 10, y), 3, HISTORY_COLOR.filled()));

    let cutoff = day_offset(base, inputs.forecast.history_end);
    chart.draw_series(LineSeries::new(
        vec![(cutoff, y_min), (cutoff, y_max)],
        CUTOFF_COLOR.stroke_width(1),
    ))?;

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.85))
        .border_style(BLACK)
        .label_font(label_font())
        .draw()?;
    root.present()?;
    Ok(())
}

fn component_title(component: &ComponentSeries) -> String {
    if component.is_trend() {
        "Trend".into()
    } else {
        format!("{} seasonality ({})", component.name, component.mode)
    }
}

fn draw_components(
    path: &Path,
    size: (u32, u32),
    year: i32,
    inputs: &ChartInputs<'_>,
) -> DrawResult {
    let forecast = inputs.forecast;
    if forecast.components.is_empty() {
        return Err("engine produced no components".into());
    }
    let dates: Vec<NaiveDate> = forecast.points.iter().map(|point| point.date).collect();

    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;
    let panels = root.split_evenly((forecast.components.len(), 1));

    for (panel, component) in panels.iter().zip(&forecast.components) {
        if component.values.len() != dates.len() {
            return Err(format!("component `{}` is misaligned", component.name).into());
        }
        let window = match component.period_days {
            None => 0..dates.len(),
            Some(period) => cycle_window(&dates, period, year),
        };
        let Some(&base) = dates.get(window.start) else {
            continue;
        };
        let series: Vec<(f64, f64)> = window
            .map(|idx| (day_offset(base, dates[idx]), component.values[idx]))
            .collect();
        let x_end = series.last().map_or(1.0, |(x, _)| x.max(1.0));
        let (y_min, y_max) = value_range(series.iter().map(|(_, y)| *y));
        let relative = !component.is_trend() && component.mode == SeasonalityMode::Multiplicative;
        let (y_format, symbol) = if relative {
            (AxisFormat::percent((y_min, y_max), PANEL_VALUE_LABELS), String::new())
        } else {
            (
                AxisFormat::money((y_min, y_max), PANEL_VALUE_LABELS),
                inputs.currency.symbol(),
            )
        };

        let mut chart = ChartBuilder::on(panel)
            .caption(component_title(component), panel_font())
            .margin(16)
            .x_label_area_size(40)
            .y_label_area_size(110)
            .build_cartesian_2d(0f64..x_end, y_min..y_max)?;

        let x_format = date_axis_format(x_end);
        chart
            .configure_mesh()
            .x_labels(8)
            .y_labels(PANEL_VALUE_LABELS)
            .x_label_formatter(&|x| date_label(base, *x, x_format))
            .y_label_formatter(&|y| y_format.label(*y, &symbol))
            .label_style(label_font())
            .draw()?;
        chart.draw_series(LineSeries::new(series, FORECAST_COLOR.stroke_width(2)))?;
    }
    root.present()?;
    Ok(())
}

fn draw_target_year(
    path: &Path,
    size: (u32, u32),
    year: i32,
    inputs: &ChartInputs<'_>,
) -> DrawResult {
    let year_points: Vec<&ForecastPoint> = inputs.forecast.points_in_year(year).collect();
    let (Some(first), Some(last)) = (year_points.first(), year_points.last()) else {
        return Err(format!("forecast has no points in {}", year).into());
    };
    let prior: Vec<(NaiveDate, f64)> = inputs
        .history
        .before_year(year)
        .map(|day| (day.date, day.revenue))
        .collect();
    let base = prior.first().map_or(first.date, |(date, _)| *date);
    let x_end = day_offset(base, last.date).max(1.0);
    let (y_min, y_max) = value_range(
        year_points
            .iter()
            .flat_map(|point| [point.lower, point.upper])
            .chain(prior.iter().map(|(_, value)| *value)),
    );

    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(format!("Revenue forecast {}", year), title_font())
        .margin(24)
        .x_label_area_size(60)
        .y_label_area_size(110)
        .build_cartesian_2d(0f64..x_end, y_min..y_max)?;

    let x_format = date_axis_format(x_end);
    let y_format = AxisFormat::money((y_min, y_max), VALUE_LABELS);
    let symbol = inputs.currency.symbol();
    chart
        .configure_mesh()
        .x_labels(12)
        .x_label_formatter(&|x| date_label(base, *x, x_format))
        .y_labels(VALUE_LABELS)
        .y_label_formatter(&|y| y_format.label(*y, &symbol))
        .x_desc("Date")
        .y_desc("Revenue")
        .label_style(label_font())
        .axis_desc_style(label_font())
        .draw()?;

    chart
        .draw_series(std::iter::once(band_polygon(
            base,
            year_points.iter().copied(),
            TARGET_COLOR,
        )))?
        .label("Confidence band")
        .legend(|(x, y)| {
            Rectangle::new(
                [(x, y - 5), (x + 20, y + 5)],
                TARGET_COLOR.mix(BAND_OPACITY).filled(),
            )
        });
    chart
        .draw_series(LineSeries::new(
            year_points
                .iter()
                .map(|point| (day_offset(base, point.date), point.point)),
            TARGET_COLOR.stroke_width(2),
        ))?
        .label(format!("Forecast {}", year))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], TARGET_COLOR.stroke_width(2)));
    chart
        .draw_series(prior.iter().map(|(date, value)| {
            Circle::new((day_offset(base, *date), *value), 2, HISTORY_COLOR.filled())
        }))?
        .label("Actual")
        .legend(|(x, y)| Circle::new((x + 10, y), 3, HISTORY_COLOR.filled()));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.85))
        .border_style(BLACK)
        .label_font(label_font())
        .draw()?;
    root.present()?;
    Ok(())
}

fn draw_monthly(path: &Path, size: (u32, u32), inputs: &ChartInputs<'_>) -> DrawResult {
    let projection = inputs.projection;
    let months = &projection.months;
    if months.is_empty() {
        return Err(format!("no monthly values for {}", projection.year).into());
    }
    let bottom = months
        .iter()
        .map(|month| month.lower.min(month.point))
        .fold(0.0, f64::min);
    let (_, top) = value_range(months.iter().map(|month| month.upper.max(month.point)));
    let top = top.max(0.0) + (top - bottom).abs() * LABEL_HEADROOM;

    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Monthly revenue forecast {}", projection.year),
            title_font(),
        )
        .margin(24)
        .x_label_area_size(60)
        .y_label_area_size(110)
        .build_cartesian_2d((0u32..months.len() as u32).into_segmented(), bottom..top)?;

    let y_format = AxisFormat::money((bottom, top), VALUE_LABELS);
    let symbol = inputs.currency.symbol();

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(months.len())
        .x_label_formatter(&|value| match value {
            SegmentValue::CenterOf(idx) | SegmentValue::Exact(idx) => months
                .get(*idx as usize)
                .map(|month| month.label.clone())
                .unwrap_or_default(),
            SegmentValue::Last => String::new(),
        })
        .y_labels(VALUE_LABELS)
        .y_label_formatter(&|y| y_format.label(*y, &symbol))
        .y_desc("Revenue")
        .label_style(label_font())
        .axis_desc_style(label_font())
        .draw()?;

    chart.draw_series(months.iter().enumerate().map(|(idx, month)| {
        let idx = idx as u32;
        let mut bar = Rectangle::new(
            [
                (SegmentValue::Exact(idx), 0.0),
                (SegmentValue::Exact(idx + 1), month.point),
            ],
            BAR_COLOR.mix(0.8).filled(),
        );
        bar.set_margin(0, 0, 12, 12);
        bar
    }))?;
    chart.draw_series(months.iter().enumerate().map(|(idx, month)| {
        ErrorBar::new_vertical(
            SegmentValue::CenterOf(idx as u32),
            month.point - month.error_below(),
            month.point,
            month.point + month.error_above(),
            BLACK.stroke_width(2),
            14,
        )
    }))?;
    chart.draw_series(months.iter().enumerate().map(|(idx, month)| {
        Text::new(
            format_thousands(month.point, inputs.currency),
            (
                SegmentValue::CenterOf(idx as u32),
                month.upper.max(month.point),
            ),
            bar_label_style(),
        )
    }))?;
    root.present()?;
    Ok(())
}
