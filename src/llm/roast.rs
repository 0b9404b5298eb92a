use std::fmt::Write;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Datelike;

use crate::compare::NarrativeGenerator;
use crate::llm::client::LlmClient;
use crate::models::UserSnapshot;

#[async_trait]
impl NarrativeGenerator for LlmClient {
    async fn roast(&self, user1: &UserSnapshot, user2: &UserSnapshot) -> Result<String> {
        let prompt = build_roast_prompt(user1, user2);
        let text = self.complete(&prompt).await?;
        Ok(text.trim().to_string())
    }
}

fn describe(label: &str, user: &UserSnapshot) -> String {
    let (profile, stats) = (&user.profile, &user.stats);
    let mut out = String::new();
    let _ = writeln!(out, "{label}: {}", profile.login);
    let _ = writeln!(out, "- Repos: {}", profile.public_repos);
    let _ = writeln!(out, "- Followers: {}", profile.followers);
    let _ = writeln!(out, "- Following: {}", profile.following);
    let _ = writeln!(out, "- Total Stars: {}", stats.total_stars);
    let _ = writeln!(out, "- Total Forks: {}", stats.total_forks);
    let _ = writeln!(out, "- Top Languages: [{}]", stats.top_languages(3).join(", "));
    match stats.top_repos.first() {
        Some(top) => {
            let _ = writeln!(out, "- Top Repo: {} ({} stars)", top.name, top.stars);
        }
        None => {
            let _ = writeln!(out, "- Top Repo: none");
        }
    }
    let _ = writeln!(out, "- Account Created: {}", profile.created_at.year());
    let _ = writeln!(out, "- Bio: {}", profile.bio.as_deref().unwrap_or("No bio"));
    out
}

fn build_roast_prompt(user1: &UserSnapshot, user2: &UserSnapshot) -> String {
    let (login1, login2) = (&user1.profile.login, &user2.profile.login);
    format!(
        "You are a savage roast master analyzing GitHub profiles. Write a brutal but funny \
         roast of each user (2-3 lines each) based on the data below, then declare a winner \
         based on their statistics.\n\n\
         {}\n{}\n\
         Format your response as:\n\
         🔥 **{login1}**: [roast]\n\n\
         🔥 **{login2}**: [roast]\n\n\
         🏆 **WINNER**: [username] - [one line reason]\n\n\
         Keep Top Languages in array form, e.g. [TypeScript, JavaScript, Python].",
        describe("USER 1", user1),
        describe("USER 2", user2),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LanguageCount, TopRepo, UserProfile, UserStats};
    use chrono::{TimeZone, Utc};

    fn user(login: &str) -> UserSnapshot {
        UserSnapshot {
            profile: UserProfile {
                login: login.to_string(),
                name: None,
                avatar_url: None,
                bio: None,
                public_repos: 12,
                followers: 34,
                following: 5,
                created_at: Utc.with_ymd_and_hms(2014, 3, 1, 0, 0, 0).unwrap(),
            },
            stats: UserStats {
                total_stars: 150,
                languages: vec![
                    LanguageCount { language: "Rust".to_string(), repos: 6 },
                    LanguageCount { language: "Go".to_string(), repos: 3 },
                    LanguageCount { language: "C".to_string(), repos: 2 },
                    LanguageCount { language: "Lua".to_string(), repos: 1 },
                ],
                top_repos: vec![TopRepo {
                    name: "ferris".to_string(),
                    stars: 100,
                    language: "Rust".to_string(),
                    description: None,
                    url: None,
                }],
                ..UserStats::default()
            },
        }
    }

    #[test]
    fn test_prompt_includes_both_users() {
        let prompt = build_roast_prompt(&user("alice"), &user("bob"));
        assert!(prompt.contains("USER 1: alice"));
        assert!(prompt.contains("USER 2: bob"));
        assert!(prompt.contains("🔥 **alice**"));
    }

    #[test]
    fn test_description_lists_top_three_languages() {
        let text = describe("USER 1", &user("alice"));
        assert!(text.contains("- Top Languages: [Rust, Go, C]"));
        assert!(text.contains("- Top Repo: ferris (100 stars)"));
        assert!(text.contains("- Account Created: 2014"));
        assert!(text.contains("- Bio: No bio"));
    }
}
