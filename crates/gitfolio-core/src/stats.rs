//! Statistics Aggregator
//!
//! Derived views over the fetched repository collection. Two language views
//! exist on purpose: `language_counts` (one tally per repo's primary
//! language, feeds the render context) and `language_bytes` (per-repo byte
//! breakdown summed across repos, feeds the `languages` command). They are
//! independent and never merged.

use std::collections::BTreeMap;

use crate::error::Result;
use crate::github::types::{Commit, Repository};

/// Count one occurrence per repository's primary language.
///
/// Repositories without a declared language are excluded; the result never
/// contains an empty-string key.
pub fn language_counts(repos: &[Repository]) -> BTreeMap<String, u64> {
    let mut counts = BTreeMap::new();
    for repo in repos {
        if let Some(language) = &repo.language {
            if !language.is_empty() {
                *counts.entry(language.clone()).or_insert(0) += 1;
            }
        }
    }
    counts
}

/// The repository with the most stars; first maximum wins on ties.
pub fn top_starred(repos: &[Repository]) -> Option<&Repository> {
    let mut best: Option<&Repository> = None;
    for repo in repos {
        match best {
            Some(current) if repo.stargazers_count <= current.stargazers_count => {}
            _ => best = Some(repo),
        }
    }
    best
}

/// Scan non-fork repositories in their given order and return the first
/// commit of the first repository whose lookup succeeds non-empty.
///
/// A failed lookup for one repository is swallowed and the scan moves on.
/// The scan is sequential by design: it stops at the first hit to bound
/// the number of remote calls.
pub fn latest_commit<F>(repos: &[Repository], mut fetch: F) -> Option<Commit>
where
    F: FnMut(&Repository) -> Result<Vec<Commit>>,
{
    for repo in repos {
        if repo.fork {
            continue;
        }
        if let Ok(commits) = fetch(repo) {
            if let Some(first) = commits.into_iter().next() {
                return Some(first);
            }
        }
    }
    None
}

/// Sum per-repository language byte breakdowns across non-fork repositories,
/// sorted by byte total descending (name ascending on equal totals).
///
/// A failed breakdown fetch for one repository is skipped.
pub fn language_bytes<F>(repos: &[Repository], mut fetch: F) -> Vec<(String, u64)>
where
    F: FnMut(&Repository) -> Result<BTreeMap<String, u64>>,
{
    let mut totals: BTreeMap<String, u64> = BTreeMap::new();
    for repo in repos {
        if repo.fork {
            continue;
        }
        if let Ok(breakdown) = fetch(repo) {
            for (language, bytes) in breakdown {
                if !language.is_empty() {
                    *totals.entry(language).or_insert(0) += bytes;
                }
            }
        }
    }

    let mut sorted: Vec<(String, u64)> = totals.into_iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GitfolioError;

    fn repo(name: &str, stars: u64, fork: bool, language: Option<&str>) -> Repository {
        Repository {
            name: name.to_string(),
            fork,
            language: language.map(|l| l.to_string()),
            stargazers_count: stars,
            html_url: format!("https://github.com/octocat/{}", name),
            description: None,
            languages_url: String::new(),
        }
    }

    fn commit(message: &str) -> Commit {
        Commit {
            commit: crate::github::types::CommitDetail {
                message: message.to_string(),
                author: crate::github::types::CommitAuthor {
                    date: "2024-05-03T12:00:00Z".to_string(),
                },
            },
        }
    }

    #[test]
    fn test_language_counts_basic() {
        let repos = vec![
            repo("a", 3, false, Some("Go")),
            repo("b", 7, false, Some("Rust")),
            repo("c", 0, false, None),
        ];
        let counts = language_counts(&repos);
        assert_eq!(counts.get("Go"), Some(&1));
        assert_eq!(counts.get("Rust"), Some(&1));
        assert_eq!(counts.len(), 2);
        assert_eq!(counts.values().sum::<u64>(), 2);
    }

    #[test]
    fn test_language_counts_empty_inputs() {
        assert!(language_counts(&[]).is_empty());
        let repos = vec![repo("a", 0, false, None), repo("b", 0, false, Some(""))];
        assert!(language_counts(&repos).is_empty());
    }

    #[test]
    fn test_top_starred_picks_max() {
        let repos = vec![
            repo("a", 3, false, Some("Go")),
            repo("b", 7, false, Some("Rust")),
        ];
        let top = top_starred(&repos).unwrap();
        assert_eq!(top.name, "b");
        assert_eq!(top.stargazers_count, 7);
    }

    #[test]
    fn test_top_starred_first_wins_on_tie() {
        let repos = vec![
            repo("first", 5, false, None),
            repo("second", 5, false, None),
            repo("third", 5, false, None),
        ];
        assert_eq!(top_starred(&repos).unwrap().name, "first");
    }

    #[test]
    fn test_top_starred_empty() {
        assert!(top_starred(&[]).is_none());
    }

    #[test]
    fn test_latest_commit_skips_forks() {
        let repos = vec![
            repo("fork1", 0, true, None),
            repo("real1", 0, false, None),
        ];
        let mut fetched = Vec::new();
        let result = latest_commit(&repos, |r| {
            fetched.push(r.name.clone());
            Ok(vec![commit("latest work")])
        });
        assert_eq!(fetched, vec!["real1"]);
        assert_eq!(result.unwrap().commit.message, "latest work");
    }

    #[test]
    fn test_latest_commit_swallows_failures_and_continues() {
        let repos = vec![
            repo("broken", 0, false, None),
            repo("empty", 0, false, None),
            repo("good", 0, false, None),
        ];
        let result = latest_commit(&repos, |r| match r.name.as_str() {
            "broken" => Err(GitfolioError::RemoteApi {
                status: 409,
                message: "Git Repository is empty.".to_string(),
            }),
            "empty" => Ok(vec![]),
            _ => Ok(vec![commit("found it")]),
        });
        assert_eq!(result.unwrap().commit.message, "found it");
    }

    #[test]
    fn test_latest_commit_exhausted() {
        let repos = vec![repo("a", 0, false, None)];
        let result = latest_commit(&repos, |_| Ok(vec![]));
        assert!(result.is_none());
    }

    #[test]
    fn test_language_bytes_sums_and_sorts() {
        let repos = vec![
            repo("a", 0, false, None),
            repo("b", 0, false, None),
            repo("f", 0, true, None),
        ];
        let result = language_bytes(&repos, |r| {
            let mut map = BTreeMap::new();
            match r.name.as_str() {
                "a" => {
                    map.insert("Rust".to_string(), 1000);
                    map.insert("Shell".to_string(), 50);
                }
                "b" => {
                    map.insert("Rust".to_string(), 500);
                }
                // forks must never be fetched
                _ => panic!("fetched fork {}", r.name),
            }
            Ok(map)
        });
        assert_eq!(
            result,
            vec![("Rust".to_string(), 1500), ("Shell".to_string(), 50)]
        );
    }
}
