use std::collections::BTreeMap;

use crate::bio::cache::BioCache;
use crate::bio::generator::{compose_prompt, fallback_bio, BioGenerator};
use crate::error::GitfolioError;
use crate::github::types::Repository;

/// What to do after a failed generation attempt.
///
/// Pure data so the policy can be decided (and tested) away from any
/// terminal; the CLI supplies an interactive `RecoveryPrompt`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoveryChoice {
    /// Install a replacement credential and try again
    RetryWithNewKey(String),
    /// Use the cached bio; falls back when no cache entry exists
    UseCached,
    UseFallback,
    /// Produce an empty bio; downstream hides the about section
    Skip,
}

/// Decision source for generation failures.
pub trait RecoveryPrompt {
    fn choose(&mut self, error: &GitfolioError, has_cached: bool) -> RecoveryChoice;
}

/// Inputs the resolver draws the prompt and fallback from.
pub struct BioRequest<'a> {
    pub username: &'a str,
    pub languages: &'a BTreeMap<String, u64>,
    pub top_repository: Option<&'a Repository>,
    pub repositories: &'a [Repository],
}

/// Resolves the "about me" text.
///
/// Priority: no generator -> fallback; otherwise one generation attempt,
/// with failures routed through the recovery prompt (retry, cached,
/// fallback, or skip). Successful generations are cached last-writer-wins.
pub struct BioResolver<'a> {
    cache: &'a BioCache,
}

impl<'a> BioResolver<'a> {
    pub fn new(cache: &'a BioCache) -> Self {
        Self { cache }
    }

    pub fn resolve(
        &self,
        request: &BioRequest,
        generator: Option<&mut dyn BioGenerator>,
        recovery: &mut dyn RecoveryPrompt,
    ) -> String {
        let Some(generator) = generator else {
            return fallback_bio(request.languages);
        };

        let cached = self.cache.get(request.username);
        let prompt = compose_prompt(
            request.username,
            request.languages,
            request.top_repository,
            request.repositories,
        );

        loop {
            match generator.generate(&prompt) {
                Ok(bio) => {
                    // best-effort; a failed cache write must not lose the bio
                    let _ = self.cache.put(request.username, &bio);
                    return bio;
                }
                Err(error) => match recovery.choose(&error, cached.is_some()) {
                    RecoveryChoice::RetryWithNewKey(key) => {
                        generator.set_credential(&key);
                    }
                    RecoveryChoice::UseCached => {
                        return cached.unwrap_or_else(|| fallback_bio(request.languages));
                    }
                    RecoveryChoice::UseFallback => return fallback_bio(request.languages),
                    RecoveryChoice::Skip => return String::new(),
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use tempfile::TempDir;

    struct FakeGenerator {
        /// Fails while set; `set_credential` with "good-key" clears it
        fail_message: Option<String>,
    }

    impl FakeGenerator {
        fn ok() -> Self {
            Self { fail_message: None }
        }

        fn failing(message: &str) -> Self {
            Self {
                fail_message: Some(message.to_string()),
            }
        }
    }

    impl BioGenerator for FakeGenerator {
        fn generate(&self, _prompt: &str) -> Result<String> {
            match &self.fail_message {
                Some(message) => Err(GitfolioError::Generation {
                    message: message.clone(),
                }),
                None => Ok("Generated bio.".to_string()),
            }
        }

        fn set_credential(&mut self, credential: &str) {
            if credential == "good-key" {
                self.fail_message = None;
            }
        }
    }

    struct ScriptedPrompt {
        choices: Vec<RecoveryChoice>,
        asked: usize,
    }

    impl ScriptedPrompt {
        fn new(choices: Vec<RecoveryChoice>) -> Self {
            Self { choices, asked: 0 }
        }
    }

    impl RecoveryPrompt for ScriptedPrompt {
        fn choose(&mut self, _error: &GitfolioError, _has_cached: bool) -> RecoveryChoice {
            let choice = self.choices[self.asked].clone();
            self.asked += 1;
            choice
        }
    }

    struct PanicPrompt;

    impl RecoveryPrompt for PanicPrompt {
        fn choose(&mut self, _error: &GitfolioError, _has_cached: bool) -> RecoveryChoice {
            panic!("recovery prompt must not run");
        }
    }

    fn request<'a>(languages: &'a BTreeMap<String, u64>) -> BioRequest<'a> {
        BioRequest {
            username: "octocat",
            languages,
            top_repository: None,
            repositories: &[],
        }
    }

    #[test]
    fn test_no_generator_means_fallback_no_prompt() {
        let tmp = TempDir::new().unwrap();
        let cache = BioCache::new(tmp.path());
        let mut languages = BTreeMap::new();
        languages.insert("Rust".to_string(), 2);

        let bio = BioResolver::new(&cache).resolve(&request(&languages), None, &mut PanicPrompt);
        assert_eq!(
            bio,
            "I'm a Rust developer passionate about open-source and building cool stuff."
        );
    }

    #[test]
    fn test_success_returns_and_caches() {
        let tmp = TempDir::new().unwrap();
        let cache = BioCache::new(tmp.path());
        let languages = BTreeMap::new();
        let mut generator = FakeGenerator::ok();

        let bio = BioResolver::new(&cache).resolve(
            &request(&languages),
            Some(&mut generator),
            &mut PanicPrompt,
        );
        assert_eq!(bio, "Generated bio.");
        assert_eq!(cache.get("octocat").as_deref(), Some("Generated bio."));
    }

    #[test]
    fn test_failure_then_fallback() {
        let tmp = TempDir::new().unwrap();
        let cache = BioCache::new(tmp.path());
        let languages = BTreeMap::new();
        let mut generator = FakeGenerator::failing("rate limited");
        let mut prompt = ScriptedPrompt::new(vec![RecoveryChoice::UseFallback]);

        let bio = BioResolver::new(&cache).resolve(
            &request(&languages),
            Some(&mut generator),
            &mut prompt,
        );
        assert_eq!(
            bio,
            "I'm a developer passionate about open-source and building cool stuff."
        );
        assert_eq!(prompt.asked, 1);
    }

    #[test]
    fn test_failure_then_cached() {
        let tmp = TempDir::new().unwrap();
        let cache = BioCache::new(tmp.path());
        cache.put("octocat", "Cached bio.").unwrap();
        let languages = BTreeMap::new();
        let mut generator = FakeGenerator::failing("boom");
        let mut prompt = ScriptedPrompt::new(vec![RecoveryChoice::UseCached]);

        let bio = BioResolver::new(&cache).resolve(
            &request(&languages),
            Some(&mut generator),
            &mut prompt,
        );
        assert_eq!(bio, "Cached bio.");
    }

    #[test]
    fn test_use_cached_without_cache_falls_back() {
        let tmp = TempDir::new().unwrap();
        let cache = BioCache::new(tmp.path());
        let languages = BTreeMap::new();
        let mut generator = FakeGenerator::failing("boom");
        let mut prompt = ScriptedPrompt::new(vec![RecoveryChoice::UseCached]);

        let bio = BioResolver::new(&cache).resolve(
            &request(&languages),
            Some(&mut generator),
            &mut prompt,
        );
        assert_eq!(
            bio,
            "I'm a developer passionate about open-source and building cool stuff."
        );
    }

    #[test]
    fn test_skip_yields_empty_bio() {
        let tmp = TempDir::new().unwrap();
        let cache = BioCache::new(tmp.path());
        let languages = BTreeMap::new();
        let mut generator = FakeGenerator::failing("boom");
        let mut prompt = ScriptedPrompt::new(vec![RecoveryChoice::Skip]);

        let bio = BioResolver::new(&cache).resolve(
            &request(&languages),
            Some(&mut generator),
            &mut prompt,
        );
        assert!(bio.is_empty());
        assert!(cache.get("octocat").is_none());
    }

    #[test]
    fn test_retry_with_new_key() {
        let tmp = TempDir::new().unwrap();
        let cache = BioCache::new(tmp.path());
        let languages = BTreeMap::new();
        let mut generator = FakeGenerator::failing("invalid key");
        let mut prompt = ScriptedPrompt::new(vec![RecoveryChoice::RetryWithNewKey(
            "good-key".to_string(),
        )]);

        let bio = BioResolver::new(&cache).resolve(
            &request(&languages),
            Some(&mut generator),
            &mut prompt,
        );
        assert_eq!(bio, "Generated bio.");
        assert_eq!(prompt.asked, 1);
    }
}
