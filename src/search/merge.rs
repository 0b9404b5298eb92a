use std::collections::HashMap;

use crate::models::{Ranking, RepositorySummary};

/// Repositories accumulated across "load more" pages, keyed by id and kept
/// in first-seen order so ties sort deterministically.
#[derive(Debug, Clone, Default)]
pub struct RankedResults {
    entries: Vec<RepositorySummary>,
    index: HashMap<u64, usize>,
}

impl RankedResults {
    /// Add a search batch. Known ids get their metadata refreshed but keep
    /// any relevance score already assigned.
    pub fn absorb(&mut self, batch: impl IntoIterator<Item = RepositorySummary>) {
        for repo in batch {
            match self.index.get(&repo.id) {
                Some(&pos) => {
                    let existing = &mut self.entries[pos];
                    let score = existing.relevance_score.take();
                    let reasoning = existing.relevance_reasoning.take();
                    *existing = RepositorySummary {
                        relevance_score: score.or(repo.relevance_score),
                        relevance_reasoning: reasoning.or(repo.relevance_reasoning),
                        ..repo
                    };
                }
                None => {
                    self.index.insert(repo.id, self.entries.len());
                    self.entries.push(repo);
                }
            }
        }
    }

    /// Write ranking scores onto matching entries. Overwrites rather than
    /// accumulates, so applying the same rankings twice changes nothing.
    /// Rankings for ids never absorbed are ignored.
    pub fn overlay(&mut self, rankings: &[Ranking]) {
        for ranking in rankings {
            let Some(&pos) = self.index.get(&ranking.id) else {
                tracing::debug!("Ignoring ranking for unknown repository id {}", ranking.id);
                continue;
            };
            let entry = &mut self.entries[pos];
            entry.relevance_score = Some(ranking.relevance_score);
            entry.relevance_reasoning = ranking.relevance_reasoning.clone();
        }
    }

    /// All entries by relevance, highest first; unranked count as 0 and ties
    /// keep first-seen order.
    pub fn ranked(&self) -> Vec<RepositorySummary> {
        let mut sorted = self.entries.clone();
        sorted.sort_by(|a, b| {
            b.sort_score()
                .partial_cmp(&a.sort_score())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        sorted
    }

    pub fn get(&self, id: u64) -> Option<&RepositorySummary> {
        self.index.get(&id).map(|&pos| &self.entries[pos])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(id: u64) -> RepositorySummary {
        RepositorySummary {
            id,
            full_name: format!("o/r{id}"),
            description: Some(format!("repo {id}")),
            language: None,
            topics: vec!["demo".to_string()],
            stars: id * 10,
            html_url: None,
            relevance_score: None,
            relevance_reasoning: None,
        }
    }

    fn ranking(id: u64, score: f32) -> Ranking {
        Ranking {
            id,
            relevance_score: score,
            relevance_reasoning: Some(format!("because {id}")),
        }
    }

    #[test]
    fn test_overlay_is_idempotent() {
        let mut once = RankedResults::default();
        once.absorb((1..=5).map(repo));
        let rankings = vec![ranking(2, 0.8), ranking(4, 0.3)];
        once.overlay(&rankings);

        let mut twice = once.clone();
        twice.overlay(&rankings);

        assert_eq!(once.ranked(), twice.ranked());
    }

    #[test]
    fn test_overlay_overwrites_previous_score() {
        let mut results = RankedResults::default();
        results.absorb(vec![repo(1)]);
        results.overlay(&[ranking(1, 0.2)]);
        results.overlay(&[Ranking {
            id: 1,
            relevance_score: 0.9,
            relevance_reasoning: None,
        }]);
        let entry = results.get(1).unwrap();
        assert_eq!(entry.relevance_score, Some(0.9));
        assert_eq!(entry.relevance_reasoning, None);
    }

    #[test]
    fn test_unknown_ranking_ids_ignored() {
        let mut results = RankedResults::default();
        results.absorb(vec![repo(1)]);
        results.overlay(&[ranking(99, 1.0)]);
        assert_eq!(results.len(), 1);
        assert!(results.get(99).is_none());
    }

    #[test]
    fn test_absorb_coalesces_duplicate_ids_and_keeps_score() {
        let mut results = RankedResults::default();
        results.absorb(vec![repo(1), repo(2)]);
        results.overlay(&[ranking(2, 0.6)]);

        let mut refreshed = repo(2);
        refreshed.stars = 999;
        results.absorb(vec![refreshed, repo(3)]);

        assert_eq!(results.len(), 3);
        let two = results.get(2).unwrap();
        assert_eq!(two.stars, 999);
        assert_eq!(two.relevance_score, Some(0.6));
    }

    #[test]
    fn test_ranked_is_stable_with_unranked_as_zero() {
        let mut results = RankedResults::default();
        results.absorb((1..=6).map(repo));
        results.overlay(&[ranking(5, 0.4), ranking(2, 0.4), ranking(6, 0.0)]);
        let ids: Vec<u64> = results.ranked().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 5, 1, 3, 4, 6]);
    }
}
