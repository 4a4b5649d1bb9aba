//! Match orchestration - runs the query plan against the search API.
//!
//! The run is an explicit state machine:
//!
//! ```text
//! Idle -> Searching(0) -> Searching(1) -> ... -> Found(winner) | Exhausted
//! ```
//!
//! Queries are issued strictly one at a time. After each query the results are
//! folded into a [`MatchState`] by [`MatchState::absorb`], which has no I/O and
//! decides whether the run can stop early. A failed query is logged and
//! skipped. A missing credential aborts the run, and a run in which every
//! query failed ends as [`MatchError::Unavailable`] rather than "no match".

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use super::channel::is_official_channel;
use super::domain::{Candidate, MatchError, SearchError, SearchResult, VideoMatch};
use super::normalize::NormalizedTrack;
use super::queries::generate_queries;
use super::scoring::{MatchTarget, floor_score, is_reasonable_match, score_result};
use super::traits::VideoSearchApi;

/// Tuning knobs for a matcher
#[derive(Debug, Clone)]
pub struct MatcherConfig {
    /// Hard cap on queries issued per resolution
    pub max_queries: usize,
    /// Results requested per query
    pub page_size: u32,
    /// Pause between consecutive API calls
    pub politeness_delay: Duration,
    /// Score an official candidate needs to stop early
    pub early_stop_score: i32,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            max_queries: 8,
            page_size: 10,
            politeness_delay: Duration::from_millis(250),
            early_stop_score: 8,
        }
    }
}

/// Orchestrator state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    /// About to issue the query at this index
    Searching(usize),
    /// Stopped early; holds the winning candidate index
    Found(usize),
    Exhausted,
}

/// What a [`MatchState::absorb`] step decided
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Continue,
    Stop { winner: usize },
}

/// Candidates collected so far in one run.
#[derive(Debug, Default)]
pub struct MatchState {
    candidates: Vec<Candidate>,
    best: Option<usize>,
    seen: HashSet<String>,
}

impl MatchState {
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn best_score(&self) -> Option<i32> {
        self.best.map(|i| self.candidates[i].score)
    }

    /// Gate, score, and keep one query's results, then decide whether to stop.
    pub fn absorb(
        &mut self,
        results: Vec<SearchResult>,
        query_index: usize,
        target: &MatchTarget,
        early_stop_score: i32,
    ) -> Decision {
        for result in results {
            if self.seen.contains(&result.video_id) {
                continue;
            }
            if !is_reasonable_match(&result.title, &result.channel_title, target) {
                tracing::trace!("Rejected {:?} from {:?}", result.title, result.channel_title);
                continue;
            }

            let score = score_result(&result.title, &result.channel_title, target);
            let is_official = is_official_channel(&result.channel_title);
            tracing::debug!(
                "Candidate {:?} ({}) score={} official={}",
                result.title,
                result.channel_title,
                score,
                is_official
            );

            self.seen.insert(result.video_id.clone());
            self.candidates.push(Candidate {
                result,
                score,
                is_official,
                query_index,
            });

            let index = self.candidates.len() - 1;
            if self.best_score().is_none_or(|best| score > best) {
                self.best = Some(index);
            }
        }

        match self.early_stop_winner(early_stop_score) {
            Some(winner) => Decision::Stop { winner },
            None => Decision::Continue,
        }
    }

    /// Highest-scoring official candidate at or above the threshold, if the
    /// overall best has also reached it. Ties keep the first seen.
    fn early_stop_winner(&self, threshold: i32) -> Option<usize> {
        if self.best_score()? < threshold {
            return None;
        }

        let mut winner: Option<usize> = None;
        for (i, candidate) in self.candidates.iter().enumerate() {
            if !candidate.is_official || candidate.score < threshold {
                continue;
            }
            if winner.is_none_or(|w| candidate.score > self.candidates[w].score) {
                winner = Some(i);
            }
        }
        winner
    }

    /// Winner once the plan is exhausted: highest score, then official
    /// channel, then first seen.
    pub fn pick_winner(&self) -> Option<usize> {
        let mut winner: Option<usize> = None;
        for (i, candidate) in self.candidates.iter().enumerate() {
            let better = match winner {
                None => true,
                Some(w) => {
                    let current = &self.candidates[w];
                    candidate.score > current.score
                        || (candidate.score == current.score
                            && candidate.is_official
                            && !current.is_official)
                }
            };
            if better {
                winner = Some(i);
            }
        }
        winner
    }

    fn into_candidate(mut self, index: usize) -> Candidate {
        self.candidates.swap_remove(index)
    }
}

/// Result of one orchestrator run. "No match" is a normal outcome.
#[derive(Debug, Clone)]
pub enum Outcome {
    Matched {
        video: VideoMatch,
        /// Reported score, floored at zero
        score: u32,
        queries_issued: usize,
    },
    NoMatch {
        queries_issued: usize,
    },
}

impl Outcome {
    fn matched(candidate: Candidate, queries_issued: usize) -> Self {
        Outcome::Matched {
            score: floor_score(candidate.score),
            video: VideoMatch::from_result(candidate.result),
            queries_issued,
        }
    }
}

/// Finds the best video for a track using a [`VideoSearchApi`].
pub struct Matcher {
    api: Arc<dyn VideoSearchApi>,
    config: MatcherConfig,
}

impl Matcher {
    pub fn new(api: Arc<dyn VideoSearchApi>, config: MatcherConfig) -> Self {
        Self { api, config }
    }

    /// Run the query plan for a track until a winner is found or the plan
    /// (or the query cap) is exhausted.
    pub async fn find_match(&self, track: &NormalizedTrack) -> Result<Outcome, MatchError> {
        let queries = generate_queries(track);
        let target = MatchTarget::new(track);
        let limit = queries.len().min(self.config.max_queries);

        let mut state = MatchState::default();
        let mut phase = Phase::Idle;
        let mut issued = 0;
        let mut answered = 0;
        let mut last_error: Option<SearchError> = None;

        loop {
            phase = match phase {
                Phase::Idle => Phase::Searching(0),

                Phase::Searching(i) if i >= limit => Phase::Exhausted,

                Phase::Searching(i) => {
                    if i > 0 && !self.config.politeness_delay.is_zero() {
                        tokio::time::sleep(self.config.politeness_delay).await;
                    }

                    let query = &queries[i];
                    issued += 1;
                    tracing::debug!("Query {}/{}: {:?}", i + 1, limit, query);

                    match self.api.search(query, self.config.page_size).await {
                        Ok(results) => {
                            answered += 1;
                            match state.absorb(results, i, &target, self.config.early_stop_score) {
                                Decision::Stop { winner } => Phase::Found(winner),
                                Decision::Continue => Phase::Searching(i + 1),
                            }
                        }
                        Err(e) if e.is_configuration() => {
                            return Err(MatchError::Configuration(e.to_string()));
                        }
                        Err(e) => {
                            tracing::warn!("Search query {:?} failed: {}", query, e);
                            last_error = Some(e);
                            Phase::Searching(i + 1)
                        }
                    }
                }

                Phase::Found(winner) => {
                    tracing::debug!("Early stop after {} queries", issued);
                    return Ok(Outcome::matched(state.into_candidate(winner), issued));
                }

                Phase::Exhausted => {
                    // Every query failed: the API was never reached, so this
                    // says nothing about the track.
                    if answered == 0 {
                        if let Some(e) = last_error.take() {
                            return Err(MatchError::Unavailable {
                                failed: issued,
                                last: e.to_string(),
                            });
                        }
                    }
                    return Ok(match state.pick_winner() {
                        Some(winner) => Outcome::matched(state.into_candidate(winner), issued),
                        None => Outcome::NoMatch {
                            queries_issued: issued,
                        },
                    });
                }
            };
        }
    }
}
