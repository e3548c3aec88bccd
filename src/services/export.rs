//! Downloadable report artefacts.

use std::str::FromStr;

use serde::Deserialize;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};
use crate::services::statistics::{growth_series, MonthlyBucket, Series, StatisticsReport};

const CSV_HEADER: [&str; 5] = ["Month", "Total Collections", "Active", "Upcoming", "Ended"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl ExportFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Csv => "text/csv; charset=utf-8",
            Self::Json => "application/json",
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Csv => "notedrop-detailed-report.csv",
            Self::Json => "notedrop-detailed-report.json",
        }
    }

    /// Render the report in this format
    pub fn render(&self, report: &StatisticsReport, include_growth: bool) -> AppResult<String> {
        match self {
            Self::Csv => monthly_csv(&report.monthly_data, include_growth),
            Self::Json => report_json(report),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(format!("unsupported export format '{}'", other)),
        }
    }
}

/// Monthly table with a trailing `Total` row.
///
/// Rows are separated by `\n` with no newline after the last row. The growth
/// column holds rounded percentages; the `Total` row leaves it empty.
pub fn monthly_csv(buckets: &[MonthlyBucket], include_growth: bool) -> AppResult<String> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    let mut header: Vec<&str> = CSV_HEADER.to_vec();
    if include_growth {
        header.push("Growth");
    }
    writer.write_record(&header)?;

    let growth = growth_series(buckets, Series::Total);
    let mut totals = [0u64; 4];

    for (bucket, growth) in buckets.iter().zip(growth) {
        let counts = [bucket.total, bucket.active, bucket.upcoming, bucket.ended];
        for (sum, count) in totals.iter_mut().zip(counts) {
            *sum += count;
        }

        let mut row = vec![bucket.month.to_string()];
        row.extend(counts.iter().map(u64::to_string));
        if include_growth {
            row.push((growth.round() as i64).to_string());
        }
        writer.write_record(&row)?;
    }

    let mut total_row = vec!["Total".to_string()];
    total_row.extend(totals.iter().map(u64::to_string));
    if include_growth {
        total_row.push(String::new());
    }
    writer.write_record(&total_row)?;

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("CSV flush failed: {}", e)))?;
    let text = String::from_utf8(bytes)
        .map_err(|e| AppError::Internal(format!("CSV output is not UTF-8: {}", e)))?;

    Ok(text.trim_end_matches('\n').to_string())
}

/// Pretty-printed report with camelCase keys
pub fn report_json(report: &StatisticsReport) -> AppResult<String> {
    Ok(serde_json::to_string_pretty(report)?)
}
