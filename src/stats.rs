//! Per-user contribution statistics.
//!
//! Builds the user set from the roster's translator lists, fetches each
//! user's Zanata statistics for the requested project/version/date range,
//! and writes a CSV or JSON report. Column order of the CSV is fixed so
//! downstream spreadsheets keep working across releases.

use crate::roster::LanguageTeam;
use crate::zanata::{Client, ContributorStats};
use anyhow::Result;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

/// Translation counters plus their precomputed sum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TranslationTotals {
    pub translated: u64,
    #[serde(rename = "needReview")]
    pub need_review: u64,
    pub approved: u64,
    pub rejected: u64,
    pub total: u64,
}

/// Review counters plus their precomputed sum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReviewTotals {
    pub approved: u64,
    pub rejected: u64,
    pub total: u64,
}

/// Accumulated statistics for one (user, language) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserStats {
    pub user_id: String,
    pub lang: String,
    #[serde(rename = "translation-stats")]
    pub translation: Option<TranslationTotals>,
    #[serde(rename = "review-stats")]
    pub review: Option<ReviewTotals>,
}

impl UserStats {
    pub fn new(user_id: &str, lang: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            lang: lang.to_string(),
            translation: None,
            review: None,
        }
    }

    /// Merge the contribution matching this user's language into the
    /// accumulated totals. Contributions for other locales are ignored.
    pub fn absorb(&mut self, stats: &ContributorStats) {
        let Some(contribution) = stats.contributions.iter().find(|c| c.locale == self.lang)
        else {
            return;
        };

        if let Some(counts) = contribution.translation_stats {
            let totals = self.translation.get_or_insert_with(TranslationTotals::default);
            totals.translated += counts.translated;
            totals.need_review += counts.need_review;
            totals.approved += counts.approved;
            totals.rejected += counts.rejected;
            totals.total =
                totals.translated + totals.need_review + totals.approved + totals.rejected;
        }

        if let Some(counts) = contribution.review_stats {
            let totals = self.review.get_or_insert_with(ReviewTotals::default);
            totals.approved += counts.approved;
            totals.rejected += counts.rejected;
            totals.total = totals.approved + totals.rejected;
        }
    }

    pub fn has_activity(&self) -> bool {
        self.translation.is_some() || self.review.is_some()
    }

    /// Column titles of the flattened CSV form. The order is part of the
    /// report format.
    pub fn flattened_titles() -> [&'static str; 10] {
        [
            "user_id",
            "lang",
            "translation-total",
            "translated",
            "needReview",
            "approved",
            "rejected",
            "review-total",
            "review-approved",
            "review-rejected",
        ]
    }

    pub fn flattened_row(&self) -> [String; 10] {
        let translation = self.translation.unwrap_or_default();
        let review = self.review.unwrap_or_default();
        [
            self.user_id.clone(),
            self.lang.clone(),
            translation.total.to_string(),
            translation.translated.to_string(),
            translation.need_review.to_string(),
            translation.approved.to_string(),
            translation.rejected.to_string(),
            review.total.to_string(),
            review.approved.to_string(),
            review.rejected.to_string(),
        ]
    }
}

/// What to fetch, built from the stats CLI arguments.
#[derive(Debug, Clone)]
pub struct StatsRequest {
    /// Project ids to report on; empty means every project on the platform
    pub projects: Vec<String>,
    /// Version ids to include; empty means every reportable version
    pub versions: Vec<String>,
    /// User ids to include; empty means every roster translator
    pub users: Vec<String>,
    /// Inclusive start date, `YYYY-MM-DD`
    pub start_date: String,
    /// Inclusive end date, `YYYY-MM-DD`
    pub end_date: String,
}

/// Fetch statistics for every roster translator across the requested
/// projects and versions.
pub async fn collect_stats(
    client: &Client,
    teams: &[LanguageTeam],
    request: &StatsRequest,
) -> Result<Vec<UserStats>> {
    info!(
        "collecting contributor statistics from {} to {}",
        request.start_date, request.end_date
    );

    let mut users: Vec<UserStats> = teams
        .iter()
        .flat_map(|team| {
            team.translators
                .iter()
                .map(|user_id| UserStats::new(user_id, &team.language_code))
        })
        .collect();

    let projects = if request.projects.is_empty() {
        client.projects().await?
    } else {
        request.projects.clone()
    };

    for project_id in &projects {
        for version in client.versions(project_id).await? {
            if !request.versions.is_empty() && !request.versions.contains(&version) {
                continue;
            }
            for user in users.iter_mut() {
                if !request.users.is_empty() && !request.users.contains(&user.user_id) {
                    continue;
                }
                debug!(
                    "fetching {} {} for user {} ({})",
                    project_id, version, user.user_id, user.lang
                );
                let stats = client
                    .user_stats(
                        project_id,
                        &version,
                        &user.user_id,
                        &request.start_date,
                        &request.end_date,
                    )
                    .await?;
                user.absorb(&stats);
            }
        }
    }

    Ok(users)
}

/// Filter and order collected statistics for output: users without
/// activity are dropped unless requested, and rows sort by (lang, user).
pub fn report_rows(mut stats: Vec<UserStats>, include_no_activities: bool) -> Vec<UserStats> {
    stats.retain(|user| include_no_activities || user.has_activity());
    stats.sort_by(|a, b| (&a.lang, &a.user_id).cmp(&(&b.lang, &b.user_id)));
    stats
}

pub fn write_csv(path: &Path, stats: &[UserStats]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(UserStats::flattened_titles())?;
    for user in stats {
        writer.write_record(user.flattened_row())?;
    }
    writer.flush()?;
    info!("stats written to {}", path.display());
    Ok(())
}

pub fn write_json(path: &Path, stats: &[UserStats]) -> Result<()> {
    let rendered = serde_json::to_string_pretty(stats)?;
    std::fs::write(path, rendered)?;
    info!("stats written to {}", path.display());
    Ok(())
}
