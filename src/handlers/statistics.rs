use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::AppResult;
use crate::handlers::parse_param;
use crate::middlewares::AuthUser;
use crate::models::{Collection, CollectionFilter};
use crate::services::chart::{self, Bar, Category, ChartState, LineChart, PieChart, Stack};
use crate::services::statistics::{growth_series, MONTH_NAMES};
use crate::services::{ExportFormat, Series, StatisticsReport, TimeRange};
use crate::state::AppState;

#[derive(Debug, Deserialize, IntoParams)]
pub struct StatisticsParams {
    /// `7d`, `30d`, `90d`, `1y` or `all` (default)
    pub range: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ChartParams {
    /// `7d`, `30d`, `90d`, `1y` or `all` (default)
    pub range: Option<String>,
    /// `total` (default), `active`, `upcoming` or `ended`
    pub series: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ExportParams {
    /// `csv` (default) or `json`
    pub format: Option<String>,
    pub range: Option<String>,
    /// Append a month-over-month growth column to the CSV
    pub growth: Option<bool>,
}

/// Ready-to-render geometry for the statistics screen
#[derive(Debug, Serialize, ToSchema)]
pub struct ChartsResponse {
    pub time_range: TimeRange,
    pub series: Series,
    #[schema(value_type = Vec<String>)]
    pub labels: Vec<&'static str>,
    /// Month-over-month growth of the selected series, one value per month
    pub growth: Vec<f64>,
    #[schema(value_type = Object)]
    pub line: ChartState<LineChart>,
    /// Bars of the selected series; the total series stacks the active share of each month
    #[schema(value_type = Object)]
    pub bars: ChartState<Vec<Bar>>,
    #[schema(value_type = Object)]
    pub chains: ChartState<PieChart>,
    #[schema(value_type = Object)]
    pub stages: ChartState<PieChart>,
}

impl ChartsResponse {
    fn build(report: &StatisticsReport, series: Series) -> Self {
        let values: Vec<u64> = report.monthly_data.iter().map(|m| m.get(series)).collect();
        let active: Vec<u64> = report.monthly_data.iter().map(|m| m.active).collect();
        let totals: Vec<u64> = report.monthly_data.iter().map(|m| m.total).collect();
        let stack = (series == Series::Total).then_some(Stack {
            values: &active,
            totals: &totals,
        });

        let chains: Vec<Category> = report
            .chain_distribution
            .iter()
            .map(|c| Category {
                label: c.name.clone(),
                value: c.count,
                color: None,
            })
            .collect();
        let stages: Vec<Category> = report
            .stage_distribution
            .iter()
            .map(|s| Category {
                label: s.name.to_string(),
                value: s.value,
                color: Some(s.color.to_string()),
            })
            .collect();

        Self {
            time_range: report.time_range,
            series,
            labels: MONTH_NAMES.to_vec(),
            growth: growth_series(&report.monthly_data, series),
            line: chart::line_chart(&values).into(),
            bars: chart::bar_chart(&values, stack).into(),
            chains: chart::pie_chart(&chains).into(),
            stages: chart::pie_chart(&stages).into(),
        }
    }
}

async fn owner_records(state: &AppState, owner: Uuid) -> AppResult<Vec<Collection>> {
    state
        .collections
        .list_by_owner(owner, &CollectionFilter::default())
        .await
}

fn time_range(value: Option<&str>) -> AppResult<TimeRange> {
    Ok(parse_param(value, "range")?.unwrap_or_default())
}

/// Summary, monthly buckets and distributions for a time range
#[utoipa::path(
    get,
    path = "/api/statistics",
    params(StatisticsParams),
    responses(
        (status = 200, description = "Aggregated statistics", body = StatisticsReport),
        (status = 400, description = "Invalid time range"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Statistics"
)]
pub async fn get_statistics(
    user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<StatisticsParams>,
) -> AppResult<Json<StatisticsReport>> {
    let range = time_range(params.range.as_deref())?;
    let records = owner_records(&state, user.id).await?;

    Ok(Json(StatisticsReport::build(
        &records,
        range,
        OffsetDateTime::now_utc(),
    )))
}

/// Chart geometry for the statistics screen
#[utoipa::path(
    get,
    path = "/api/statistics/charts",
    params(ChartParams),
    responses(
        (status = 200, description = "Line, bar and pie geometry", body = ChartsResponse),
        (status = 400, description = "Invalid range or series"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Statistics"
)]
pub async fn get_charts(
    user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ChartParams>,
) -> AppResult<Json<ChartsResponse>> {
    let range = time_range(params.range.as_deref())?;
    let series: Series = parse_param(params.series.as_deref(), "series")?.unwrap_or_default();
    let records = owner_records(&state, user.id).await?;

    let report = StatisticsReport::build(&records, range, OffsetDateTime::now_utc());
    Ok(Json(ChartsResponse::build(&report, series)))
}

/// Download the detailed report as CSV or JSON
#[utoipa::path(
    get,
    path = "/api/statistics/export",
    params(ExportParams),
    responses(
        (status = 200, description = "Report file", content(("text/csv"), ("application/json"))),
        (status = 400, description = "Invalid format or range"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Statistics"
)]
pub async fn export_statistics(
    user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ExportParams>,
) -> AppResult<impl IntoResponse> {
    let format: ExportFormat =
        parse_param(params.format.as_deref(), "format")?.unwrap_or_default();
    let range = time_range(params.range.as_deref())?;
    let records = owner_records(&state, user.id).await?;

    let report = StatisticsReport::build(&records, range, OffsetDateTime::now_utc());
    let body = format.render(&report, params.growth.unwrap_or(false))?;

    tracing::info!(
        user_id = %user.id,
        format = ?format,
        time_range = range.as_str(),
        active = report.summary.active_collections,
        "Exported statistics report"
    );

    Ok((
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", format.file_name()),
            ),
        ],
        body,
    ))
}
