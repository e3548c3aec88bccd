//! Monthly aggregation and summary metrics over a user's collections.
//!
//! Everything here is pure: callers pass the records and the reference
//! instant (`now`), so results are deterministic and testable in isolation.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{Duration, Month, OffsetDateTime};
use utoipa::ToSchema;

use crate::models::{Collection, Stage};

pub const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Trailing window applied before aggregation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum TimeRange {
    #[serde(rename = "7d")]
    Last7Days,
    #[serde(rename = "30d")]
    Last30Days,
    #[serde(rename = "90d")]
    Last90Days,
    #[serde(rename = "1y")]
    LastYear,
    #[default]
    #[serde(rename = "all")]
    All,
}

impl TimeRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Last7Days => "7d",
            Self::Last30Days => "30d",
            Self::Last90Days => "90d",
            Self::LastYear => "1y",
            Self::All => "all",
        }
    }

    /// Earliest creation time kept by this range, `None` when unbounded
    pub fn cutoff(&self, now: OffsetDateTime) -> Option<OffsetDateTime> {
        match self {
            Self::Last7Days => Some(now - Duration::days(7)),
            Self::Last30Days => Some(now - Duration::days(30)),
            Self::Last90Days => Some(now - Duration::days(90)),
            Self::LastYear => Some(one_year_before(now)),
            Self::All => None,
        }
    }

    pub fn filter<'a>(&self, records: &'a [Collection], now: OffsetDateTime) -> Vec<&'a Collection> {
        match self.cutoff(now) {
            Some(cutoff) => records.iter().filter(|c| c.created_at >= cutoff).collect(),
            None => records.iter().collect(),
        }
    }
}

impl FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "7d" => Ok(Self::Last7Days),
            "30d" => Ok(Self::Last30Days),
            "90d" => Ok(Self::Last90Days),
            "1y" => Ok(Self::LastYear),
            "all" => Ok(Self::All),
            other => Err(format!("unknown time range '{}'", other)),
        }
    }
}

// 29 Feb has no counterpart in the previous year. Clamp to 28 Feb rather than
// rolling over to 1 Mar, so the cutoff stays in February.
fn one_year_before(now: OffsetDateTime) -> OffsetDateTime {
    let year = now.year() - 1;
    now.replace_year(year).unwrap_or_else(|_| {
        now.replace_day(28)
            .and_then(|d| d.replace_year(year))
            .unwrap_or(now - Duration::days(365))
    })
}

/// One calendar month of the current year
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct MonthlyBucket {
    #[schema(value_type = String)]
    pub month: &'static str,
    pub total: u64,
    pub active: u64,
    pub upcoming: u64,
    pub ended: u64,
}

impl MonthlyBucket {
    fn empty(month: &'static str) -> Self {
        Self {
            month,
            total: 0,
            active: 0,
            upcoming: 0,
            ended: 0,
        }
    }

    pub fn get(&self, series: Series) -> u64 {
        match series {
            Series::Total => self.total,
            Series::Active => self.active,
            Series::Upcoming => self.upcoming,
            Series::Ended => self.ended,
        }
    }
}

/// Which count of a bucket a chart or growth figure reads
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Series {
    #[default]
    Total,
    Active,
    Upcoming,
    Ended,
}

impl FromStr for Series {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "total" => Ok(Self::Total),
            "active" => Ok(Self::Active),
            "upcoming" => Ok(Self::Upcoming),
            "ended" => Ok(Self::Ended),
            other => Err(format!("unknown series '{}'", other)),
        }
    }
}

/// Bucket records by creation month; records outside `now`'s year are ignored.
pub fn monthly_buckets<'a, I>(records: I, now: OffsetDateTime) -> Vec<MonthlyBucket>
where
    I: IntoIterator<Item = &'a Collection>,
{
    let mut buckets: Vec<MonthlyBucket> =
        MONTH_NAMES.into_iter().map(MonthlyBucket::empty).collect();
    let year = now.to_offset(time::UtcOffset::UTC).year();

    for record in records {
        let created = record.created_at.to_offset(time::UtcOffset::UTC);
        if created.year() != year {
            continue;
        }

        let bucket = &mut buckets[month_index(created.month())];
        bucket.total += 1;
        match record.stage {
            Stage::Active => bucket.active += 1,
            Stage::Upcoming => bucket.upcoming += 1,
            Stage::Ended => bucket.ended += 1,
        }
    }

    buckets
}

fn month_index(month: Month) -> usize {
    u8::from(month) as usize - 1
}

/// Percentage change from `previous` to `current`.
///
/// A zero baseline reports 100 when anything appeared and 0 otherwise.
pub fn growth(current: u64, previous: u64) -> f64 {
    if previous == 0 {
        return if current > 0 { 100.0 } else { 0.0 };
    }
    (current as f64 - previous as f64) / previous as f64 * 100.0
}

/// Growth of one series for every bucket against the bucket before it
pub fn growth_series(buckets: &[MonthlyBucket], series: Series) -> Vec<f64> {
    buckets
        .iter()
        .enumerate()
        .map(|(i, bucket)| {
            let previous = if i == 0 { 0 } else { buckets[i - 1].get(series) };
            growth(bucket.get(series), previous)
        })
        .collect()
}

/// Month-over-month growth of the current month for each series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct GrowthSummary {
    pub total: f64,
    pub active: f64,
    pub upcoming: f64,
    pub ended: f64,
}

impl GrowthSummary {
    /// January compares against December of the same bucket set.
    pub fn for_month(buckets: &[MonthlyBucket], now: OffsetDateTime) -> Self {
        let current = month_index(now.to_offset(time::UtcOffset::UTC).month());
        let previous = if current == 0 { 11 } else { current - 1 };
        let (cur, prev) = (&buckets[current], &buckets[previous]);

        Self {
            total: growth(cur.total, prev.total),
            active: growth(cur.active, prev.active),
            upcoming: growth(cur.upcoming, prev.upcoming),
            ended: growth(cur.ended, prev.ended),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ChainShare {
    pub name: String,
    pub count: u64,
    pub percentage: f64,
}

/// Group by chain label in first-appearance order
pub fn chain_distribution<'a, I>(records: I) -> Vec<ChainShare>
where
    I: IntoIterator<Item = &'a Collection>,
{
    let mut shares: Vec<ChainShare> = Vec::new();
    let mut total = 0u64;

    for record in records {
        total += 1;
        match shares.iter_mut().find(|s| s.name == record.chain) {
            Some(share) => share.count += 1,
            None => shares.push(ChainShare {
                name: record.chain.clone(),
                count: 1,
                percentage: 0.0,
            }),
        }
    }

    let denominator = total.max(1) as f64;
    for share in &mut shares {
        share.percentage = share.count as f64 / denominator * 100.0;
    }
    shares
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct StageShare {
    #[schema(value_type = String)]
    pub name: &'static str,
    pub value: u64,
    #[schema(value_type = String)]
    pub color: &'static str,
}

pub fn stage_distribution<'a, I>(records: I) -> Vec<StageShare>
where
    I: IntoIterator<Item = &'a Collection>,
{
    let mut counts = [0u64; 3];
    for record in records {
        let idx = match record.stage {
            Stage::Active => 0,
            Stage::Upcoming => 1,
            Stage::Ended => 2,
        };
        counts[idx] += 1;
    }

    Stage::ALL
        .iter()
        .zip(counts)
        .map(|(stage, value)| StageShare {
            name: stage.label(),
            value,
            color: stage.color(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_collections: u64,
    pub active_collections: u64,
    pub upcoming_collections: u64,
    pub ended_collections: u64,
    #[schema(value_type = String)]
    pub total_value: Decimal,
    pub unique_chains: u64,
    pub monthly_average: f64,
    pub most_active_month: MonthlyBucket,
    pub total_growth: f64,
    pub active_growth: f64,
    pub upcoming_growth: f64,
    pub ended_growth: f64,
}

/// Everything the statistics screens and exports need for one time range
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsReport {
    pub summary: Summary,
    pub monthly_data: Vec<MonthlyBucket>,
    pub chain_distribution: Vec<ChainShare>,
    pub stage_distribution: Vec<StageShare>,
    pub time_range: TimeRange,
}

impl StatisticsReport {
    pub fn build(records: &[Collection], range: TimeRange, now: OffsetDateTime) -> Self {
        let filtered = range.filter(records, now);

        let monthly_data = monthly_buckets(filtered.iter().copied(), now);
        let chain_distribution = chain_distribution(filtered.iter().copied());
        let stage_distribution = stage_distribution(filtered.iter().copied());
        let growth = GrowthSummary::for_month(&monthly_data, now);

        let monthly_total: u64 = monthly_data.iter().map(|m| m.total).sum();
        // Earliest month wins ties
        let most_active_month = monthly_data
            .iter()
            .fold(&monthly_data[0], |best, m| if m.total > best.total { m } else { best })
            .clone();

        let count_stage =
            |stage: Stage| filtered.iter().filter(|c| c.stage == stage).count() as u64;

        let summary = Summary {
            total_collections: filtered.len() as u64,
            active_collections: count_stage(Stage::Active),
            upcoming_collections: count_stage(Stage::Upcoming),
            ended_collections: count_stage(Stage::Ended),
            total_value: filtered.iter().filter_map(|c| c.cost).sum(),
            unique_chains: chain_distribution.len() as u64,
            monthly_average: monthly_total as f64 / 12.0,
            most_active_month,
            total_growth: growth.total,
            active_growth: growth.active,
            upcoming_growth: growth.upcoming,
            ended_growth: growth.ended,
        };

        tracing::debug!(
            time_range = range.as_str(),
            records = filtered.len(),
            "Built statistics report"
        );

        Self {
            summary,
            monthly_data,
            chain_distribution,
            stage_distribution,
            time_range: range,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use time::macros::datetime;
    use uuid::Uuid;

    fn record(stage: Stage, chain: &str, created_at: OffsetDateTime) -> Collection {
        Collection {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            name: "Drop".to_string(),
            subtitle: String::new(),
            description: None,
            image_url: None,
            chain: chain.to_string(),
            cost: None,
            stage,
            backers: vec![],
            requirements: vec![],
            how_to_steps: vec![],
            created_at,
            updated_at: created_at,
        }
    }

    const NOW: OffsetDateTime = datetime!(2025-06-15 12:00 UTC);

    #[test]
    fn test_march_bucket_scenario() {
        let records = vec![
            record(Stage::Active, "Ethereum", datetime!(2025-03-02 10:00 UTC)),
            record(Stage::Active, "Ethereum", datetime!(2025-03-10 10:00 UTC)),
            record(Stage::Ended, "Solana", datetime!(2025-03-31 23:59 UTC)),
        ];

        let buckets = monthly_buckets(&records, NOW);
        assert_eq!(buckets.len(), 12);
        assert_eq!(
            buckets[2],
            MonthlyBucket {
                month: "Mar",
                total: 3,
                active: 2,
                upcoming: 0,
                ended: 1,
            }
        );
    }

    #[test]
    fn test_other_years_are_excluded() {
        let records = vec![
            record(Stage::Active, "Ethereum", datetime!(2024-03-02 10:00 UTC)),
            record(Stage::Upcoming, "Ethereum", datetime!(2026-01-01 0:00 UTC)),
        ];

        let buckets = monthly_buckets(&records, NOW);
        assert!(buckets.iter().all(|b| b.total == 0));
    }

    #[test]
    fn test_stage_counts_sum_to_total() {
        let stages = [Stage::Active, Stage::Upcoming, Stage::Ended];
        let records: Vec<Collection> = (0..40)
            .map(|i| {
                let created = datetime!(2025-01-01 0:00 UTC) + Duration::days(i * 9);
                record(stages[i as usize % 3], "Base", created)
            })
            .collect();

        for bucket in monthly_buckets(&records, NOW) {
            assert_eq!(bucket.active + bucket.upcoming + bucket.ended, bucket.total);
        }
    }

    #[test]
    fn test_stage_distribution_counts_each_stage() {
        let records = vec![
            record(Stage::Ended, "Base", datetime!(2025-02-01 0:00 UTC)),
            record(Stage::Upcoming, "Base", datetime!(2025-02-02 0:00 UTC)),
            record(Stage::Ended, "Base", datetime!(2025-02-03 0:00 UTC)),
        ];

        let shares = stage_distribution(&records);
        let counts: Vec<(&str, u64)> = shares.iter().map(|s| (s.name, s.value)).collect();
        assert_eq!(counts, vec![("Active", 0), ("Upcoming", 1), ("Ended", 2)]);
        assert_eq!(shares[2].color, "#6b7280");
    }

    #[test]
    fn test_growth_zero_baseline() {
        assert_eq!(growth(5, 0), 100.0);
        assert_eq!(growth(0, 0), 0.0);
        assert_eq!(growth(3, 2), 50.0);
        assert_eq!(growth(1, 4), -75.0);
    }

    #[test]
    fn test_growth_summary_uses_previous_month() {
        let records = vec![
            record(Stage::Active, "Ethereum", datetime!(2025-05-02 10:00 UTC)),
            record(Stage::Active, "Ethereum", datetime!(2025-05-03 10:00 UTC)),
            record(Stage::Active, "Ethereum", datetime!(2025-06-01 10:00 UTC)),
            record(Stage::Ended, "Ethereum", datetime!(2025-06-02 10:00 UTC)),
            record(Stage::Ended, "Ethereum", datetime!(2025-06-03 10:00 UTC)),
        ];

        let buckets = monthly_buckets(&records, NOW);
        let summary = GrowthSummary::for_month(&buckets, NOW);
        assert_eq!(summary.total, 50.0);
        assert_eq!(summary.active, -50.0);
        assert_eq!(summary.ended, 100.0);
        assert_eq!(summary.upcoming, 0.0);
    }

    #[test]
    fn test_growth_series_first_month_has_zero_baseline() {
        let records = vec![
            record(Stage::Active, "Ethereum", datetime!(2025-01-05 10:00 UTC)),
            record(Stage::Active, "Ethereum", datetime!(2025-02-05 10:00 UTC)),
            record(Stage::Active, "Ethereum", datetime!(2025-02-06 10:00 UTC)),
        ];

        let series = growth_series(&monthly_buckets(&records, NOW), Series::Total);
        assert_eq!(series[0], 100.0);
        assert_eq!(series[1], 100.0);
        assert_eq!(series[2], -100.0);
        assert_eq!(series[3], 0.0);
    }

    #[test]
    fn test_chain_distribution_sums_to_hundred() {
        let records = vec![
            record(Stage::Active, "Ethereum", NOW),
            record(Stage::Active, "Solana", NOW),
            record(Stage::Active, "Ethereum", NOW),
        ];

        let shares = chain_distribution(&records);
        assert_eq!(shares[0].name, "Ethereum");
        assert_eq!(shares[0].count, 2);
        assert_eq!(shares[1].name, "Solana");

        let sum: f64 = shares.iter().map(|s| s.percentage).sum();
        assert!((sum - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_records() {
        let report = StatisticsReport::build(&[], TimeRange::All, NOW);
        assert_eq!(report.monthly_data.len(), 12);
        assert!(report.monthly_data.iter().all(|b| b.total == 0));
        assert!(report.chain_distribution.is_empty());
        assert_eq!(report.summary.total_collections, 0);
        assert_eq!(report.summary.total_growth, 0.0);
        assert_eq!(report.summary.most_active_month.month, "Jan");
    }

    #[test]
    fn test_time_range_filter() {
        let records = vec![
            record(Stage::Active, "Ethereum", NOW - Duration::days(3)),
            record(Stage::Active, "Ethereum", NOW - Duration::days(20)),
            record(Stage::Active, "Ethereum", NOW - Duration::days(80)),
            record(Stage::Active, "Ethereum", NOW - Duration::days(200)),
            record(Stage::Active, "Ethereum", NOW - Duration::days(400)),
        ];

        assert_eq!(TimeRange::Last7Days.filter(&records, NOW).len(), 1);
        assert_eq!(TimeRange::Last30Days.filter(&records, NOW).len(), 2);
        assert_eq!(TimeRange::Last90Days.filter(&records, NOW).len(), 3);
        assert_eq!(TimeRange::LastYear.filter(&records, NOW).len(), 4);
        assert_eq!(TimeRange::All.filter(&records, NOW).len(), 5);
    }

    #[test]
    fn test_one_year_before_leap_day() {
        let leap = datetime!(2024-02-29 8:00 UTC);
        assert_eq!(
            TimeRange::LastYear.cutoff(leap),
            Some(datetime!(2023-02-28 8:00 UTC))
        );
    }

    #[test]
    fn test_report_summary() {
        let mut paid = record(Stage::Upcoming, "Arbitrum", datetime!(2025-04-01 0:00 UTC));
        paid.cost = Some(Decimal::new(1250, 2));
        let records = vec![
            paid,
            record(Stage::Active, "Ethereum", datetime!(2025-04-02 0:00 UTC)),
            record(Stage::Active, "Ethereum", datetime!(2025-02-02 0:00 UTC)),
        ];

        let report = StatisticsReport::build(&records, TimeRange::All, NOW);
        assert_eq!(report.summary.total_collections, 3);
        assert_eq!(report.summary.active_collections, 2);
        assert_eq!(report.summary.total_value, Decimal::new(1250, 2));
        assert_eq!(report.summary.unique_chains, 2);
        assert_eq!(report.summary.most_active_month.month, "Apr");
        assert_eq!(report.summary.monthly_average, 0.25);
        assert_eq!(report.stage_distribution[0].value, 2);
        assert_eq!(report.stage_distribution[1].value, 1);
    }
}
