//! Message router: decides, per inbound chat message, whether it surfaces
//! in the visible chat or is diverted into the hidden pool as game
//! material.
//!
//! Ordered rule evaluation, first match wins. The deterministic hide
//! rules (active answer, canned-phrase fingerprint) are checked before
//! the capacity stop so the current round's answer can never leak into
//! the visible feed, full pool or not. The router is the only writer of
//! the pool and the used set.

#[cfg(test)]
#[path = "router_test.rs"]
mod router_test;

use std::collections::HashSet;

use rand::Rng;

use super::corpus::Corpus;
use super::round::RoundPhase;

/// Hidden pool bound.
pub const POOL_CAPACITY: usize = 25;

/// Chance that an ordinary message is absorbed as game material.
pub const INTERCEPT_PROBABILITY: f64 = 0.5;

/// Read-only view of the round state the rules need.
#[derive(Debug, Clone, Copy)]
pub struct RoundView<'a> {
    pub phase: RoundPhase,
    pub active_text: Option<&'a str>,
}

impl RoundView<'static> {
    /// No round material yet.
    pub fn waiting() -> Self {
        Self {
            phase: RoundPhase::Waiting,
            active_text: None,
        }
    }
}

/// Outcome of rule evaluation for one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// Surface in the visible chat.
    Show,
    /// Withhold from the visible chat; `pooled` is set when the text was
    /// newly absorbed as game material.
    Hide { pooled: bool },
}

impl RouteDecision {
    pub fn is_hidden(&self) -> bool {
        matches!(self, RouteDecision::Hide { .. })
    }
}

/// The interceptor.
#[derive(Debug, Clone)]
pub struct MessageRouter {
    pool: Vec<String>,
    used: HashSet<String>,
    capacity: usize,
    intercept_probability: f64,
}

impl Default for MessageRouter {
    fn default() -> Self {
        Self::new(POOL_CAPACITY, INTERCEPT_PROBABILITY)
    }
}

impl MessageRouter {
    pub fn new(capacity: usize, intercept_probability: f64) -> Self {
        Self {
            pool: Vec::new(),
            used: HashSet::new(),
            capacity,
            intercept_probability,
        }
    }

    /// Evaluate the rules for one inbound message text.
    pub fn route<R: Rng + ?Sized>(
        &mut self,
        text: &str,
        round: RoundView<'_>,
        corpus: &Corpus,
        rng: &mut R,
    ) -> RouteDecision {
        // 1. Empty or whitespace-only text is never game material.
        if text.trim().is_empty() {
            return RouteDecision::Show;
        }

        // 2. Already consumed by a past round; safe to surface now.
        if self.used.contains(text) {
            return RouteDecision::Show;
        }

        // 3. Already pooled verbatim; stays hidden, no duplicate entry.
        if self.pool.iter().any(|pooled| pooled == text) {
            return RouteDecision::Hide { pooled: false };
        }

        // 4. The locked answer must never leak while it is being judged.
        if round.phase == RoundPhase::Playing && round.active_text == Some(text) {
            return RouteDecision::Hide { pooled: false };
        }

        // 5. A real chatter echoing a canned phrase: withhold so it is not
        //    mistaken for game material, but never pool it.
        if corpus.matches(text) {
            return RouteDecision::Hide { pooled: false };
        }

        // 6. Pool full and a round has material: stop absorbing.
        if self.pool.len() >= self.capacity && round.phase != RoundPhase::Waiting {
            return RouteDecision::Show;
        }

        // 7. No absorption while a question is locked.
        if round.phase == RoundPhase::Playing {
            return RouteDecision::Show;
        }

        // 8. Coin flip; capacity is re-checked at enqueue time.
        if rng.gen_bool(self.intercept_probability) && self.try_enqueue(text) {
            return RouteDecision::Hide { pooled: true };
        }

        RouteDecision::Show
    }

    /// Take a random pooled text as the next round's question material.
    pub fn take_candidate<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<String> {
        if self.pool.is_empty() {
            return None;
        }
        let index = rng.gen_range(0..self.pool.len());
        Some(self.pool.swap_remove(index))
    }

    /// Record a text as consumed by a finished round. It will never be
    /// pooled or asked again.
    pub fn mark_used(&mut self, text: impl Into<String>) {
        self.used.insert(text.into());
    }

    pub fn is_used(&self, text: &str) -> bool {
        self.used.contains(text)
    }

    pub fn pool_len(&self) -> usize {
        self.pool.len()
    }

    pub fn pool_is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    fn try_enqueue(&mut self, text: &str) -> bool {
        if self.pool.len() >= self.capacity {
            return false;
        }
        if self.used.contains(text) || self.pool.iter().any(|pooled| pooled == text) {
            return false;
        }
        self.pool.push(text.to_string());
        true
    }
}
