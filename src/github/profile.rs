use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;

use crate::compare::ProfileSource;
use crate::github::client::GitHubClient;
use crate::github::types::{ApiUserRepo, ContributionCalendar};
use crate::models::{LanguageCount, TopRepo, UserSnapshot, UserStats};

const TOP_REPOS: usize = 5;

#[async_trait]
impl ProfileSource for GitHubClient {
    async fn fetch_snapshot(&self, username: &str) -> Result<UserSnapshot> {
        let (profile, repos) = tokio::join!(self.get_user(username), self.list_user_repos(username));
        let profile = profile?;
        let repos = repos?;

        let calendar = if self.has_token() {
            match self.contribution_calendar(&profile.login).await {
                Ok(calendar) => Some(calendar),
                Err(e) => {
                    tracing::warn!("No contribution data for {}: {e:#}", profile.login);
                    None
                }
            }
        } else {
            None
        };

        let stats = compute_stats(repos, calendar);
        tracing::info!(
            "Fetched {}: {} repos, {} stars, {} contributions",
            profile.login,
            profile.public_repos,
            stats.total_stars,
            stats.contributions
        );
        Ok(UserSnapshot { profile, stats })
    }
}

pub(crate) fn compute_stats(repos: Vec<ApiUserRepo>, calendar: Option<ContributionCalendar>) -> UserStats {
    let total_stars = repos.iter().map(|r| r.stargazers_count).sum();
    let total_forks = repos.iter().map(|r| r.forks_count).sum();

    let mut counts: HashMap<&str, u32> = HashMap::new();
    for language in repos.iter().filter_map(|r| r.language.as_deref()) {
        *counts.entry(language).or_default() += 1;
    }
    let mut languages: Vec<LanguageCount> = counts
        .into_iter()
        .map(|(language, repos)| LanguageCount {
            language: language.to_string(),
            repos,
        })
        .collect();
    languages.sort_by(|a, b| b.repos.cmp(&a.repos).then_with(|| a.language.cmp(&b.language)));

    let mut repos = repos;
    repos.sort_by(|a, b| b.stargazers_count.cmp(&a.stargazers_count));
    let top_repos = repos
        .into_iter()
        .take(TOP_REPOS)
        .map(|r| TopRepo {
            name: r.name,
            stars: r.stargazers_count,
            language: r.language.unwrap_or_else(|| "Unknown".to_string()),
            description: r.description,
            url: r.html_url,
        })
        .collect();

    let (contributions, contribution_calendar) = match calendar {
        Some(calendar) => (calendar.total_contributions, calendar.daily_counts()),
        None => (0, Vec::new()),
    };

    UserStats {
        total_stars,
        total_forks,
        languages,
        contributions,
        contribution_calendar,
        top_repos,
    }
}
