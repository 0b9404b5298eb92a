//! Head-to-head comparison of two GitHub users.
//!
//! Profiles are fetched concurrently, each user gets a [`Badge`] and a
//! score, and a narrative "roast" is requested. A failed narrative never
//! fails the comparison: a templated text is substituted and the result is
//! marked [`Outcome::Degraded`].

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{FailureKind, Outcome};
use crate::models::UserSnapshot;

/// Source of user profiles and stats (GitHub).
#[async_trait]
pub trait ProfileSource: Send + Sync {
    async fn fetch_snapshot(&self, username: &str) -> anyhow::Result<UserSnapshot>;
}

/// Writer of the comparison narrative (an LLM).
#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    async fn roast(&self, user1: &UserSnapshot, user2: &UserSnapshot) -> anyhow::Result<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Badge {
    #[serde(rename = "Star Hunter")]
    StarHunter,
    #[serde(rename = "Influencer")]
    Influencer,
    #[serde(rename = "Code Machine")]
    CodeMachine,
    #[serde(rename = "Commit Beast")]
    CommitBeast,
    #[serde(rename = "Rising Star")]
    RisingStar,
}

impl Badge {
    /// First matching rule wins; the order is part of the contract.
    pub fn for_user(snapshot: &UserSnapshot) -> Self {
        let (profile, stats) = (&snapshot.profile, &snapshot.stats);
        if stats.total_stars > 1000 {
            Badge::StarHunter
        } else if profile.followers > 500 {
            Badge::Influencer
        } else if profile.public_repos > 50 {
            Badge::CodeMachine
        } else if stats.contributions > 500 {
            Badge::CommitBeast
        } else {
            Badge::RisingStar
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Badge::StarHunter => "Star Hunter",
            Badge::Influencer => "Influencer",
            Badge::CodeMachine => "Code Machine",
            Badge::CommitBeast => "Commit Beast",
            Badge::RisingStar => "Rising Star",
        }
    }
}

impl fmt::Display for Badge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Overall strength used to pick the winner.
pub fn battle_score(snapshot: &UserSnapshot) -> u64 {
    snapshot.stats.total_stars + snapshot.profile.followers + snapshot.stats.contributions
}

/// `user1` only wins with a strictly greater value; an exact tie goes to
/// `user2`. Unresolved whether that tie-break is intended, so it is kept
/// as-is.
fn strict_winner<'a>(value1: u64, value2: u64, login1: &'a str, login2: &'a str) -> &'a str {
    if value1 > value2 {
        login1
    } else {
        login2
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ComparedUser {
    pub snapshot: UserSnapshot,
    pub badge: Badge,
    pub score: u64,
    pub top_languages: Vec<String>,
}

impl ComparedUser {
    fn new(snapshot: UserSnapshot) -> Self {
        Self {
            badge: Badge::for_user(&snapshot),
            score: battle_score(&snapshot),
            top_languages: snapshot.stats.top_languages(3),
            snapshot,
        }
    }

    pub fn login(&self) -> &str {
        &self.snapshot.profile.login
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CategoryResult {
    pub category: &'static str,
    pub winner: String,
    pub value1: u64,
    pub value2: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BattleStats {
    pub total_commits_compared: u64,
    pub total_stars_clashed: u64,
    pub total_repos_judged: u64,
    pub total_contributions: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Comparison {
    pub user1: ComparedUser,
    pub user2: ComparedUser,
    pub winner: String,
    pub categories: Vec<CategoryResult>,
    pub battle_stats: BattleStats,
    pub roast: String,
}

/// Narrative used when the generator is unavailable.
pub fn fallback_roast(login1: &str, login2: &str) -> String {
    format!(
        "🔥 **{login1}** vs **{login2}**\n\n\
         The battle data has been analyzed! Check out the brutal comparison above! 💀"
    )
}

impl Comparison {
    /// Badges, winner, category champions and totals. `roast` is left empty.
    pub fn score(user1: UserSnapshot, user2: UserSnapshot) -> Self {
        let user1 = ComparedUser::new(user1);
        let user2 = ComparedUser::new(user2);
        let winner = strict_winner(user1.score, user2.score, user1.login(), user2.login()).to_string();

        let (p1, s1) = (&user1.snapshot.profile, &user1.snapshot.stats);
        let (p2, s2) = (&user2.snapshot.profile, &user2.snapshot.stats);
        let categories = [
            ("Stars", s1.total_stars, s2.total_stars),
            ("Followers", p1.followers, p2.followers),
            ("Repos", p1.public_repos, p2.public_repos),
            ("Contributions", s1.contributions, s2.contributions),
        ]
        .into_iter()
        .map(|(category, value1, value2)| CategoryResult {
            category,
            winner: strict_winner(value1, value2, &p1.login, &p2.login).to_string(),
            value1,
            value2,
        })
        .collect();

        let battle_stats = BattleStats {
            total_commits_compared: s1.total_commits() + s2.total_commits(),
            total_stars_clashed: s1.total_stars + s2.total_stars,
            total_repos_judged: p1.public_repos + p2.public_repos,
            total_contributions: s1.contributions + s2.contributions,
        };

        Self {
            user1,
            user2,
            winner,
            categories,
            battle_stats,
            roast: String::new(),
        }
    }
}

/// Fetch both users, score them, and ask for a roast.
pub async fn compare(
    source: &dyn ProfileSource,
    narrator: &dyn NarrativeGenerator,
    username1: &str,
    username2: &str,
) -> Result<Outcome<Comparison>, FailureKind> {
    let (username1, username2) = (username1.trim(), username2.trim());
    if username1.is_empty() || username2.is_empty() {
        return Err(FailureKind::MissingInput("username"));
    }

    let (first, second) = tokio::join!(
        source.fetch_snapshot(username1),
        source.fetch_snapshot(username2)
    );
    let snapshot1 = first.map_err(|e| user_failure(username1, e))?;
    let snapshot2 = second.map_err(|e| user_failure(username2, e))?;

    let narrative = narrator.roast(&snapshot1, &snapshot2).await;
    let mut comparison = Comparison::score(snapshot1, snapshot2);
    tracing::info!(
        "Compared {} ({}) vs {} ({}): winner {}",
        comparison.user1.login(),
        comparison.user1.score,
        comparison.user2.login(),
        comparison.user2.score,
        comparison.winner
    );

    let cause = match narrative {
        Ok(text) if !text.trim().is_empty() => {
            comparison.roast = text;
            return Ok(Outcome::Complete(comparison));
        }
        Ok(_) => {
            tracing::warn!("Narrative generator returned empty text, using fallback roast");
            FailureKind::EmptyResponse("narrative generation")
        }
        Err(e) => {
            tracing::warn!("Narrative generation failed, using fallback roast: {e:#}");
            FailureKind::upstream("narrative generation", e)
        }
    };

    comparison.roast = fallback_roast(comparison.user1.login(), comparison.user2.login());
    Ok(Outcome::Degraded {
        value: comparison,
        cause,
    })
}

fn user_failure(username: &str, err: anyhow::Error) -> FailureKind {
    match FailureKind::upstream("profile fetch", err) {
        FailureKind::Upstream { service, message } => FailureKind::Upstream {
            service,
            message: format!("{username}: {message}"),
        },
        other => other,
    }
}
