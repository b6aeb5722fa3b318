//! Server-side SVG charts: cumulative event lines and the predicted risk bar.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use plotters::chart::MeshStyle;
use plotters::coord::ranged1d::{Ranged, ValueFormatter};
use plotters::prelude::*;

use crate::entity::EntityModel;
use crate::error::DashboardError;
use crate::models::EventCount;
use crate::risk::{aggregate_risk, Predictor};

const POSITIVE_COLOR: RGBColor = RGBColor(0x1f, 0x77, 0xb4);
const NEGATIVE_COLOR: RGBColor = RGBColor(0xff, 0x7f, 0x0e);
const BAR_COLOR: RGBColor = RGBColor(0x1f, 0x77, 0xb4);

/// Border and text colors applied to a chart's axes.
#[derive(Debug, Clone, Copy)]
pub struct AxisStyle {
    pub border_color: RGBColor,
    pub font_color: RGBColor,
}

impl AxisStyle {
    pub const NEUTRAL: AxisStyle = AxisStyle {
        border_color: RGBColor(0, 0, 0),
        font_color: RGBColor(0, 0, 0),
    };

    fn font<'a>(&self, size: u32) -> TextStyle<'a> {
        ("sans-serif", size).into_font().color(&self.font_color)
    }
}

fn set_axis_styling<X, Y, XT, YT, DB>(mesh: &mut MeshStyle<'_, '_, X, Y, DB>, style: AxisStyle)
where
    X: Ranged<ValueType = XT> + ValueFormatter<XT>,
    Y: Ranged<ValueType = YT> + ValueFormatter<YT>,
    DB: DrawingBackend,
{
    mesh.axis_style(style.border_color)
        .label_style(style.font(12))
        .axis_desc_style(style.font(13));
}

fn render_error<E: std::fmt::Debug>(e: E) -> DashboardError {
    DashboardError::Render(format!("{e:?}"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CumulativePoint {
    pub date: NaiveDate,
    pub positive: i64,
    pub negative: i64,
}

/// Running totals per day from the first to the last event date. Missing
/// counts and missing days contribute zero; repeated dates are summed.
pub fn cumulative_series(rows: &[EventCount]) -> Result<Vec<CumulativePoint>, DashboardError> {
    let mut daily: BTreeMap<NaiveDate, (i64, i64)> = BTreeMap::new();
    for row in rows {
        let entry = daily.entry(row.event_date).or_insert((0, 0));
        entry.0 += row.positive_events.unwrap_or(0);
        entry.1 += row.negative_events.unwrap_or(0);
    }

    let (first, last) = match (daily.keys().next(), daily.keys().next_back()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return Err(DashboardError::EmptyInput("event counts")),
    };

    let mut positive = 0;
    let mut negative = 0;
    Ok(first
        .iter_days()
        .take_while(|day| *day <= last)
        .map(|day| {
            let (p, n) = daily.get(&day).copied().unwrap_or((0, 0));
            positive += p;
            negative += n;
            CumulativePoint {
                date: day,
                positive,
                negative,
            }
        })
        .collect())
}

#[derive(Debug, Clone)]
pub struct LineChart {
    pub style: AxisStyle,
}

impl Default for LineChart {
    fn default() -> Self {
        Self {
            style: AxisStyle::NEUTRAL,
        }
    }
}

impl LineChart {
    const SIZE: (u32, u32) = (640, 400);

    pub async fn render(
        &self,
        entity_id: i64,
        model: &EntityModel,
    ) -> Result<String, DashboardError> {
        let counts = model.event_counts(entity_id).await?;
        let points = cumulative_series(&counts)?;
        let svg = self.draw(&points)?;
        Ok(format!("<figure>{svg}</figure>"))
    }

    fn draw(&self, points: &[CumulativePoint]) -> Result<String, DashboardError> {
        let style = self.style;
        let x_max = (points.len() as i32 - 1).max(1);
        let peak = points
            .iter()
            .map(|p| p.positive.max(p.negative))
            .max()
            .unwrap_or(0);
        let y_max = (peak + peak / 10).max(1);

        // The date index is contiguous, so x is the day offset from the first date.
        let format_date = |x: &i32| {
            usize::try_from(*x)
                .ok()
                .and_then(|i| points.get(i))
                .map(|p| p.date.to_string())
                .unwrap_or_default()
        };

        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, Self::SIZE).into_drawing_area();
            root.fill(&WHITE).map_err(render_error)?;

            let mut chart = ChartBuilder::on(&root)
                .caption("Cumulative Events", style.font(18))
                .margin(10)
                .x_label_area_size(40)
                .y_label_area_size(50)
                .build_cartesian_2d(0..x_max, 0..y_max)
                .map_err(render_error)?;

            let mut mesh = chart.configure_mesh();
            set_axis_styling(&mut mesh, style);
            mesh.disable_mesh()
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&format_date)
                .x_desc("Date")
                .y_desc("Count")
                .draw()
                .map_err(render_error)?;

            let positive: Vec<i64> = points.iter().map(|p| p.positive).collect();
            let negative: Vec<i64> = points.iter().map(|p| p.negative).collect();
            for (label, color, values) in [
                ("Positive", POSITIVE_COLOR, positive),
                ("Negative", NEGATIVE_COLOR, negative),
            ] {
                let data = values.into_iter().enumerate().map(|(i, v)| (i as i32, v));
                chart
                    .draw_series(LineSeries::new(data, color.stroke_width(2)))
                    .map_err(render_error)?
                    .label(label)
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
            }

            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperLeft)
                .border_style(style.border_color)
                .label_font(style.font(12))
                .draw()
                .map_err(render_error)?;

            root.present().map_err(render_error)?;
        }
        Ok(svg)
    }
}

pub struct BarChart {
    pub predictor: Arc<dyn Predictor>,
    pub style: AxisStyle,
}

impl BarChart {
    const SIZE: (u32, u32) = (640, 200);

    pub fn new(predictor: Arc<dyn Predictor>) -> Self {
        Self {
            predictor,
            style: AxisStyle::NEUTRAL,
        }
    }

    pub async fn score(&self, entity_id: i64, model: &EntityModel) -> Result<f64, DashboardError> {
        let rows = model.feature_vector(entity_id).await?;
        if rows.is_empty() {
            return Err(DashboardError::EmptyInput("feature vector"));
        }
        let probabilities = self.predictor.predict_proba(&rows)?;
        aggregate_risk(model.kind(), &probabilities)
    }

    pub async fn render(
        &self,
        entity_id: i64,
        model: &EntityModel,
    ) -> Result<String, DashboardError> {
        let score = self.score(entity_id, model).await?;
        let svg = self.draw(score)?;
        Ok(format!("<figure data-score=\"{score:.3}\">{svg}</figure>"))
    }

    fn draw(&self, score: f64) -> Result<String, DashboardError> {
        let style = self.style;

        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, Self::SIZE).into_drawing_area();
            root.fill(&WHITE).map_err(render_error)?;

            let mut chart = ChartBuilder::on(&root)
                .caption("Predicted Recruitment Risk", style.font(20))
                .margin(10)
                .x_label_area_size(30)
                .y_label_area_size(10)
                .build_cartesian_2d(0f64..1f64, 0f64..1f64)
                .map_err(render_error)?;

            let mut mesh = chart.configure_mesh();
            set_axis_styling(&mut mesh, style);
            mesh.disable_mesh()
                .x_labels(6)
                .y_labels(0)
                .x_label_formatter(&|x| format!("{x:.1}"))
                .draw()
                .map_err(render_error)?;

            chart
                .draw_series(std::iter::once(Rectangle::new(
                    [(0.0, 0.2), (score.clamp(0.0, 1.0), 0.8)],
                    BAR_COLOR.filled(),
                )))
                .map_err(render_error)?;

            root.present().map_err(render_error)?;
        }
        Ok(svg)
    }
}

/// Chart leaves, each bound to one entity id.
pub enum Chart {
    Line(LineChart),
    Bar(BarChart),
}

impl Chart {
    pub fn name(&self) -> &'static str {
        match self {
            Chart::Line(_) => "cumulative events chart",
            Chart::Bar(_) => "risk chart",
        }
    }

    pub async fn render(
        &self,
        entity_id: Option<i64>,
        model: &EntityModel,
    ) -> Result<String, DashboardError> {
        let id = entity_id.ok_or(DashboardError::MissingEntityId(self.name()))?;
        match self {
            Chart::Line(chart) => chart.render(id, model).await,
            Chart::Bar(chart) => chart.render(id, model).await,
        }
    }
}
