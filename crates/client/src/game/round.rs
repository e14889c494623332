//! Round state machine for the chat-or-chatbot game.
//!
//! `Waiting` (no material) → `Playing` (question locked) → `Result`
//! (answer revealed, score updated) → `Waiting`/`Playing`.
//!
//! The locked question is owned exclusively by [`ChatbotGame`]; nothing
//! can reassign it while a round is in progress, and the router only sees
//! it through a read-only [`RoundView`]. An unanswered round is resolved
//! after a wall-clock timeout with a uniformly random guess.

#[cfg(test)]
#[path = "round_test.rs"]
mod round_test;

use std::time::Duration;

use rand::Rng;

use super::corpus::Corpus;
use super::router::{MessageRouter, RoundView};

/// Wall-clock budget for answering a round.
pub const ROUND_TIMEOUT: Duration = Duration::from_secs(30);

/// How long the result banner shows before the next round starts.
pub const RESULT_DELAY: Duration = Duration::from_secs(5);

/// Chance that a round uses a synthetic message instead of chat material.
pub const SYNTHETIC_PROBABILITY: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    /// No material yet; the game is absorbing chat.
    Waiting,
    /// A question is locked and being judged.
    Playing,
    /// The answer is revealed; the next round is pending.
    Result,
}

/// The message under judgment. Immutable for the duration of the round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveQuestion {
    text: String,
    is_synthetic: bool,
}

impl ActiveQuestion {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_synthetic(&self) -> bool {
        self.is_synthetic
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Score {
    pub correct: u32,
    pub incorrect: u32,
}

/// How a round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundOutcome {
    pub guessed_synthetic: bool,
    pub was_synthetic: bool,
    pub correct: bool,
    /// The guess was made by the timeout, not the player.
    pub timed_out: bool,
}

/// The guessing game.
#[derive(Debug, Clone)]
pub struct ChatbotGame {
    phase: RoundPhase,
    question: Option<ActiveQuestion>,
    score: Score,
    last_outcome: Option<RoundOutcome>,
    round_seq: u64,
}

impl Default for ChatbotGame {
    fn default() -> Self {
        Self {
            phase: RoundPhase::Waiting,
            question: None,
            score: Score::default(),
            last_outcome: None,
            round_seq: 0,
        }
    }
}

impl ChatbotGame {
    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn score(&self) -> Score {
        self.score
    }

    pub fn question(&self) -> Option<&ActiveQuestion> {
        self.question.as_ref()
    }

    pub fn last_outcome(&self) -> Option<RoundOutcome> {
        self.last_outcome
    }

    /// Monotonic round counter; timers capture it to detect staleness.
    pub fn round_seq(&self) -> u64 {
        self.round_seq
    }

    /// The read-only view the router evaluates its rules against.
    pub fn round_view(&self) -> RoundView<'_> {
        RoundView {
            phase: self.phase,
            active_text: self.question.as_ref().map(|q| q.text.as_str()),
        }
    }

    /// Lock a new question and enter `Playing`.
    ///
    /// A coin flip chooses synthetic vs. chat material; when the pool has
    /// nothing to offer, the round falls back to a synthetic question so
    /// the game keeps moving. A no-op while a round is locked.
    pub fn start_round<R: Rng + ?Sized>(
        &mut self,
        router: &mut MessageRouter,
        corpus: &mut Corpus,
        rng: &mut R,
    ) -> RoundPhase {
        if self.phase == RoundPhase::Playing {
            return self.phase;
        }

        let question = if rng.gen_bool(SYNTHETIC_PROBABILITY) {
            ActiveQuestion {
                text: corpus.select(rng),
                is_synthetic: true,
            }
        } else {
            match router.take_candidate(rng) {
                Some(text) => ActiveQuestion {
                    text,
                    is_synthetic: false,
                },
                None => ActiveQuestion {
                    text: corpus.select(rng),
                    is_synthetic: true,
                },
            }
        };

        self.question = Some(question);
        self.phase = RoundPhase::Playing;
        self.round_seq += 1;
        self.last_outcome = None;
        self.phase
    }

    /// Resolve the round with the player's guess.
    pub fn answer(&mut self, guessed_synthetic: bool) -> Option<RoundOutcome> {
        self.resolve(guessed_synthetic, false)
    }

    /// Resolve an unanswered round with a random guess.
    pub fn resolve_timeout<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<RoundOutcome> {
        let guess = rng.gen_bool(0.5);
        self.resolve(guess, true)
    }

    /// Leave `Result`: the finished question's text enters the used set
    /// (chat material only) and the next round starts.
    pub fn next_round<R: Rng + ?Sized>(
        &mut self,
        router: &mut MessageRouter,
        corpus: &mut Corpus,
        rng: &mut R,
    ) -> RoundPhase {
        if self.phase == RoundPhase::Playing {
            return self.phase;
        }
        if let Some(question) = self.question.take() {
            if !question.is_synthetic {
                router.mark_used(question.text);
            }
        }
        self.start_round(router, corpus, rng)
    }

    fn resolve(&mut self, guessed_synthetic: bool, timed_out: bool) -> Option<RoundOutcome> {
        if self.phase != RoundPhase::Playing {
            return None;
        }
        let question = self.question.as_ref()?;

        let correct = guessed_synthetic == question.is_synthetic;
        if correct {
            self.score.correct += 1;
        } else {
            self.score.incorrect += 1;
        }

        let outcome = RoundOutcome {
            guessed_synthetic,
            was_synthetic: question.is_synthetic,
            correct,
            timed_out,
        };
        self.last_outcome = Some(outcome);
        self.phase = RoundPhase::Result;
        Some(outcome)
    }
}
