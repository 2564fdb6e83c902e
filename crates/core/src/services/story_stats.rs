//! Engagement statistics over an organizer's stories.
//!
//! Everything here is pure: the story service loads the rows and these
//! functions fold them into the response shapes.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use givehub_db::entities::story::{self, StoryStatus, StoryType};
use sea_orm::Iterable;
use serde::{Deserialize, Serialize};

/// Default number of days in the view trend.
pub const DEFAULT_TREND_DAYS: u32 = 7;

/// Longest view trend that may be requested.
pub const MAX_TREND_DAYS: u32 = 90;

/// Default number of top stories.
pub const DEFAULT_TOP_LIMIT: usize = 5;

const MAX_TOP_LIMIT: usize = 50;

/// Window of story creation times the statistics cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    #[default]
    All,
    Today,
    Week,
    Month,
    Year,
}

impl TimeRange {
    /// Parse a `time_range` query value.
    #[must_use]
    pub fn from_param(value: &str) -> Option<Self> {
        match value {
            "all" => Some(Self::All),
            "today" => Some(Self::Today),
            "week" => Some(Self::Week),
            "month" => Some(Self::Month),
            "year" => Some(Self::Year),
            _ => None,
        }
    }

    /// Start of the window, in UTC calendar terms. `None` means unbounded.
    #[must_use]
    pub fn since(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let today = now.date_naive();
        let start = match self {
            Self::All => return None,
            Self::Today => today,
            Self::Week => today - Duration::days(i64::from(today.weekday().num_days_from_monday())),
            Self::Month => today.with_day(1)?,
            Self::Year => NaiveDate::from_ymd_opt(today.year(), 1, 1)?,
        };
        Some(Utc.from_utc_datetime(&start.and_hms_opt(0, 0, 0)?))
    }
}

/// Query options of the statistics endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsQuery {
    pub time_range: TimeRange,
    /// Days of view trend, clamped to `1..=MAX_TREND_DAYS`.
    pub days: u32,
    /// Number of top stories.
    pub limit: usize,
}

impl Default for StatsQuery {
    fn default() -> Self {
        Self {
            time_range: TimeRange::All,
            days: DEFAULT_TREND_DAYS,
            limit: DEFAULT_TOP_LIMIT,
        }
    }
}

impl StatsQuery {
    /// Build a query, clamping out-of-range values.
    #[must_use]
    pub fn new(time_range: Option<TimeRange>, days: Option<u32>, limit: Option<usize>) -> Self {
        Self {
            time_range: time_range.unwrap_or_default(),
            days: days.unwrap_or(DEFAULT_TREND_DAYS).clamp(1, MAX_TREND_DAYS),
            limit: limit.unwrap_or(DEFAULT_TOP_LIMIT).clamp(1, MAX_TOP_LIMIT),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsOverview {
    pub total_stories: usize,
    pub published_stories: usize,
    pub draft_stories: usize,
    pub archived_stories: usize,
    pub total_views: i64,
    /// Mean over every story in the window; 0 when there are none.
    pub average_views: f64,
    pub max_views: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Engagement {
    pub published_stories: usize,
    /// Views of published stories only.
    pub total_views: i64,
    pub avg_views_per_published_story: f64,
    pub best_views: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopStory {
    pub id: String,
    pub title: String,
    pub story_type: StoryType,
    pub views: i32,
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub views: i64,
}

/// Statistics over an organizer's stories.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryStats {
    pub time_range: TimeRange,
    pub overview: StatsOverview,
    pub engagement: Engagement,
    /// Every story type, zero-filled.
    pub type_distribution: BTreeMap<&'static str, usize>,
    pub top_stories: Vec<TopStory>,
    /// One point per day, oldest first, zero-filled.
    pub view_trends: Vec<TrendPoint>,
}

/// How one story does against the author's other stories of its type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryPerformance {
    pub story_id: String,
    pub story_type: StoryType,
    pub views: i32,
    pub type_average_views: f64,
    /// `views / type average`; 0 when the average is 0.
    pub ratio: f64,
    /// `(ratio - 1) × 100` rounded to two places.
    pub relative_performance_vs_type_average: f64,
    pub status: PerformanceStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PerformanceStatus {
    AboveAverage,
    BelowAverage,
}

/// Wire name of a story type.
#[must_use]
pub const fn story_type_code(story_type: StoryType) -> &'static str {
    match story_type {
        StoryType::Progress => "progress",
        StoryType::Milestone => "milestone",
        StoryType::ThankYou => "thank_you",
        StoryType::Completion => "completion",
    }
}

/// Fold an author's stories into statistics.
///
/// Everything but the view trend covers stories created inside
/// `query.time_range`. The trend always spans the last `query.days` days of
/// publications, whatever the range.
#[must_use]
pub fn compute_stats(
    all_stories: &[story::Model],
    query: StatsQuery,
    now: DateTime<Utc>,
) -> StoryStats {
    let since = query.time_range.since(now);
    let stories: Vec<&story::Model> = all_stories
        .iter()
        .filter(|s| since.is_none_or(|since| s.created_at.with_timezone(&Utc) >= since))
        .collect();
    let stories = stories.as_slice();
    let published: Vec<&story::Model> = stories
        .iter()
        .copied()
        .filter(|s| s.status == StoryStatus::Published)
        .collect();
    let all_published: Vec<&story::Model> = all_stories
        .iter()
        .filter(|s| s.status == StoryStatus::Published)
        .collect();

    let total_views: i64 = stories.iter().map(|s| i64::from(s.views)).sum();
    let published_views: i64 = published.iter().map(|s| i64::from(s.views)).sum();

    let overview = StatsOverview {
        total_stories: stories.len(),
        published_stories: published.len(),
        draft_stories: count_status(stories, StoryStatus::Draft),
        archived_stories: count_status(stories, StoryStatus::Archived),
        total_views,
        average_views: mean(total_views, stories.len()),
        max_views: stories.iter().map(|s| s.views).max().unwrap_or(0),
    };

    let engagement = Engagement {
        published_stories: published.len(),
        total_views: published_views,
        avg_views_per_published_story: mean(published_views, published.len()),
        best_views: published.iter().map(|s| s.views).max().unwrap_or(0),
    };

    let mut type_distribution: BTreeMap<&'static str, usize> =
        StoryType::iter().map(|t| (story_type_code(t), 0)).collect();
    for story in stories {
        *type_distribution
            .entry(story_type_code(story.story_type))
            .or_default() += 1;
    }

    let mut ranked = published.clone();
    ranked.sort_by(|a, b| b.views.cmp(&a.views).then_with(|| a.id.cmp(&b.id)));
    let top_stories = ranked
        .into_iter()
        .take(query.limit)
        .map(|s| TopStory {
            id: s.id.clone(),
            title: s.title.clone(),
            story_type: s.story_type,
            views: s.views,
            published_at: s.published_at.map(|t| t.with_timezone(&Utc)),
        })
        .collect();

    StoryStats {
        time_range: query.time_range,
        overview,
        engagement,
        type_distribution,
        top_stories,
        view_trends: view_trends(&all_published, query.days, now),
    }
}

/// Daily view sums of the last `days` days, keyed by publication date.
fn view_trends(published: &[&story::Model], days: u32, now: DateTime<Utc>) -> Vec<TrendPoint> {
    let today = now.date_naive();
    let first = today - Duration::days(i64::from(days.saturating_sub(1)));

    let mut sums: BTreeMap<NaiveDate, i64> = first
        .iter_days()
        .take_while(|d| *d <= today)
        .map(|d| (d, 0))
        .collect();
    for story in published {
        if let Some(published_at) = story.published_at {
            let date = published_at.with_timezone(&Utc).date_naive();
            if let Some(sum) = sums.get_mut(&date) {
                *sum += i64::from(story.views);
            }
        }
    }

    sums.into_iter()
        .map(|(date, views)| TrendPoint { date, views })
        .collect()
}

/// Compare a story with the author's published stories of the same type.
#[must_use]
pub fn performance(story: &story::Model, same_type_views: &[i32]) -> StoryPerformance {
    let total: i64 = same_type_views.iter().copied().map(i64::from).sum();
    let average = mean(total, same_type_views.len());

    let (ratio, relative) = if average > 0.0 {
        let ratio = f64::from(story.views) / average;
        (round2(ratio), round2((ratio - 1.0) * 100.0))
    } else {
        (0.0, 0.0)
    };

    StoryPerformance {
        story_id: story.id.clone(),
        story_type: story.story_type,
        views: story.views,
        type_average_views: round2(average),
        ratio,
        relative_performance_vs_type_average: relative,
        status: if relative >= 0.0 {
            PerformanceStatus::AboveAverage
        } else {
            PerformanceStatus::BelowAverage
        },
    }
}

fn count_status(stories: &[&story::Model], status: StoryStatus) -> usize {
    stories.iter().filter(|s| s.status == status).count()
}

#[allow(clippy::cast_precision_loss)]
fn mean(total: i64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        round2(total as f64 / count as f64)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use givehub_db::test_utils::story_model;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_time_range_windows() {
        // A Thursday afternoon.
        let now = at(2025, 3, 13, 15);

        assert_eq!(TimeRange::All.since(now), None);
        assert_eq!(TimeRange::Today.since(now), Some(at(2025, 3, 13, 0)));
        assert_eq!(TimeRange::Week.since(now), Some(at(2025, 3, 10, 0)));
        assert_eq!(TimeRange::Month.since(now), Some(at(2025, 3, 1, 0)));
        assert_eq!(TimeRange::Year.since(now), Some(at(2025, 1, 1, 0)));
        assert_eq!(TimeRange::from_param("decade"), None);
    }

    #[test]
    fn test_query_clamps() {
        let query = StatsQuery::new(None, Some(365), Some(0));
        assert_eq!(query.days, MAX_TREND_DAYS);
        assert_eq!(query.limit, 1);
        assert_eq!(StatsQuery::new(None, None, None), StatsQuery::default());
    }

    #[test]
    fn test_empty_stats() {
        let stats = compute_stats(&[], StatsQuery::default(), at(2025, 3, 13, 15));

        assert_eq!(stats.overview.total_stories, 0);
        assert!(stats.overview.average_views.abs() < f64::EPSILON);
        assert_eq!(stats.type_distribution.len(), 4);
        assert!(stats.type_distribution.values().all(|n| *n == 0));
        assert_eq!(stats.view_trends.len(), 7);
        assert!(stats.top_stories.is_empty());
    }

    #[test]
    fn test_stats_overview_and_engagement() {
        let now = at(2025, 3, 13, 15);
        let mut milestone = story_model("s2", "r1", "o1", StoryStatus::Published, 30);
        milestone.story_type = StoryType::Milestone;
        milestone.published_at = Some(at(2025, 3, 12, 9).into());
        let mut progress = story_model("s1", "r1", "o1", StoryStatus::Published, 10);
        progress.published_at = Some(at(2025, 3, 13, 9).into());
        let draft = story_model("s3", "r1", "o1", StoryStatus::Draft, 2);

        let stats = compute_stats(
            &[progress, milestone, draft],
            StatsQuery::new(Some(TimeRange::All), Some(3), Some(1)),
            now,
        );

        assert_eq!(stats.overview.total_stories, 3);
        assert_eq!(stats.overview.published_stories, 2);
        assert_eq!(stats.overview.draft_stories, 1);
        assert_eq!(stats.overview.total_views, 42);
        assert!((stats.overview.average_views - 14.0).abs() < f64::EPSILON);
        assert_eq!(stats.overview.max_views, 30);

        assert_eq!(stats.engagement.total_views, 40);
        assert!((stats.engagement.avg_views_per_published_story - 20.0).abs() < f64::EPSILON);
        assert_eq!(stats.engagement.best_views, 30);

        assert_eq!(stats.type_distribution["progress"], 2);
        assert_eq!(stats.type_distribution["milestone"], 1);
        assert_eq!(stats.type_distribution["thank_you"], 0);

        assert_eq!(stats.top_stories.len(), 1);
        assert_eq!(stats.top_stories[0].id, "s2");

        let trend: Vec<i64> = stats.view_trends.iter().map(|p| p.views).collect();
        assert_eq!(trend, [0, 30, 10]);
        assert_eq!(stats.view_trends[2].date, now.date_naive());
    }

    #[test]
    fn test_trend_ignores_the_time_range() {
        let now = at(2025, 3, 13, 15);
        let mut older = story_model("s1", "r1", "o1", StoryStatus::Published, 50);
        older.created_at = at(2025, 3, 3, 9).into();
        older.published_at = Some(at(2025, 3, 3, 9).into());
        let mut fresh = story_model("s2", "r1", "o1", StoryStatus::Published, 4);
        fresh.created_at = at(2025, 3, 13, 8).into();
        fresh.published_at = Some(at(2025, 3, 13, 8).into());

        let stats = compute_stats(
            &[fresh, older],
            StatsQuery::new(Some(TimeRange::Today), Some(30), None),
            now,
        );

        assert_eq!(stats.overview.total_stories, 1);
        assert_eq!(stats.overview.total_views, 4);
        assert_eq!(stats.top_stories.len(), 1);
        assert_eq!(stats.view_trends.len(), 30);
        let trend_total: i64 = stats.view_trends.iter().map(|p| p.views).sum();
        assert_eq!(trend_total, 54);
    }

    #[test]
    fn test_performance_against_type_average() {
        let story = story_model("s1", "r1", "o1", StoryStatus::Published, 15);
        let perf = performance(&story, &[15, 5]);

        assert!((perf.type_average_views - 10.0).abs() < f64::EPSILON);
        assert!((perf.ratio - 1.5).abs() < f64::EPSILON);
        assert!((perf.relative_performance_vs_type_average - 50.0).abs() < f64::EPSILON);
        assert_eq!(perf.status, PerformanceStatus::AboveAverage);

        let weak = story_model("s2", "r1", "o1", StoryStatus::Published, 5);
        let perf = performance(&weak, &[15, 5]);
        assert!((perf.relative_performance_vs_type_average + 50.0).abs() < f64::EPSILON);
        assert_eq!(perf.status, PerformanceStatus::BelowAverage);
    }

    #[test]
    fn test_performance_without_views() {
        let story = story_model("s1", "r1", "o1", StoryStatus::Published, 0);
        let perf = performance(&story, &[0, 0]);

        assert!(perf.ratio.abs() < f64::EPSILON);
        assert!(perf.relative_performance_vs_type_average.abs() < f64::EPSILON);
        assert_eq!(perf.status, PerformanceStatus::AboveAverage);
    }
}
