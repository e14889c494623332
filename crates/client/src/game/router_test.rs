use rand::rngs::StdRng;
use rand::SeedableRng;

use super::super::corpus::Corpus;
use super::super::round::RoundPhase;
use super::*;

fn rng() -> StdRng {
    StdRng::seed_from_u64(1234)
}

fn playing(active: &str) -> RoundView<'_> {
    RoundView {
        phase: RoundPhase::Playing,
        active_text: Some(active),
    }
}

fn result_view(active: &str) -> RoundView<'_> {
    RoundView {
        phase: RoundPhase::Result,
        active_text: Some(active),
    }
}

/// A router that absorbs every eligible message.
fn greedy_router(capacity: usize) -> MessageRouter {
    MessageRouter::new(capacity, 1.0)
}

#[test]
fn whitespace_only_text_is_shown_and_never_pooled() {
    let mut router = greedy_router(POOL_CAPACITY);
    let corpus = Corpus::default();
    let mut rng = rng();

    for text in ["", "   ", "\t\n"] {
        assert_eq!(
            router.route(text, RoundView::waiting(), &corpus, &mut rng),
            RouteDecision::Show
        );
    }
    assert!(router.pool_is_empty());
}

#[test]
fn used_texts_are_shown_again() {
    let mut router = greedy_router(POOL_CAPACITY);
    let corpus = Corpus::default();
    let mut rng = rng();

    router.mark_used("ggwp");
    assert_eq!(
        router.route("ggwp", RoundView::waiting(), &corpus, &mut rng),
        RouteDecision::Show
    );
    assert!(router.pool_is_empty());
}

#[test]
fn pooled_duplicates_stay_hidden_without_growing_the_pool() {
    let mut router = greedy_router(POOL_CAPACITY);
    let corpus = Corpus::default();
    let mut rng = rng();

    assert_eq!(
        router.route("first!", RoundView::waiting(), &corpus, &mut rng),
        RouteDecision::Hide { pooled: true }
    );
    assert_eq!(
        router.route("first!", RoundView::waiting(), &corpus, &mut rng),
        RouteDecision::Hide { pooled: false }
    );
    assert_eq!(router.pool_len(), 1);
}

// The active answer must never leak while a round is in progress,
// regardless of the probabilistic interception outcome.
#[test]
fn active_question_text_is_always_hidden_while_playing() {
    let corpus = Corpus::default();

    // Zero interception probability: the deterministic rule must fire
    // before any coin flip could matter.
    let mut router = MessageRouter::new(POOL_CAPACITY, 0.0);
    let mut rng = rng();
    for _ in 0..20 {
        assert_eq!(
            router.route("ggwp", playing("ggwp"), &corpus, &mut rng),
            RouteDecision::Hide { pooled: false }
        );
    }
    assert!(router.pool_is_empty());
}

#[test]
fn active_question_is_hidden_even_when_the_pool_is_full() {
    let corpus = Corpus::default();
    let mut router = greedy_router(2);
    let mut rng = rng();

    router.route("filler one", RoundView::waiting(), &corpus, &mut rng);
    router.route("filler two", RoundView::waiting(), &corpus, &mut rng);
    assert_eq!(router.pool_len(), 2);

    assert_eq!(
        router.route("ggwp", playing("ggwp"), &corpus, &mut rng),
        RouteDecision::Hide { pooled: false }
    );
}

#[test]
fn canned_phrase_echoes_are_hidden_but_not_pooled() {
    let mut router = greedy_router(POOL_CAPACITY);
    let corpus = Corpus::default();
    let mut rng = rng();

    let decision = router.route(
        "Have you tried turning it off and on again?",
        RoundView::waiting(),
        &corpus,
        &mut rng,
    );
    assert_eq!(decision, RouteDecision::Hide { pooled: false });
    assert!(router.pool_is_empty());
}

#[test]
fn full_pool_shows_messages_once_a_round_has_material() {
    let corpus = Corpus::default();
    let mut router = greedy_router(2);
    let mut rng = rng();

    router.route("filler one", RoundView::waiting(), &corpus, &mut rng);
    router.route("filler two", RoundView::waiting(), &corpus, &mut rng);

    assert_eq!(
        router.route("overflow", result_view("filler one"), &corpus, &mut rng),
        RouteDecision::Show
    );
    assert_eq!(router.pool_len(), 2);
}

#[test]
fn full_pool_never_exceeds_capacity_even_while_waiting() {
    let corpus = Corpus::default();
    let mut router = greedy_router(2);
    let mut rng = rng();

    for i in 0..10 {
        router.route(&format!("message {i}"), RoundView::waiting(), &corpus, &mut rng);
    }
    assert_eq!(router.pool_len(), 2);
}

#[test]
fn no_absorption_during_a_locked_round() {
    let corpus = Corpus::default();
    let mut router = greedy_router(POOL_CAPACITY);
    let mut rng = rng();

    assert_eq!(
        router.route("fresh chatter", playing("something else"), &corpus, &mut rng),
        RouteDecision::Show
    );
    assert!(router.pool_is_empty());
}

#[test]
fn interception_is_a_coin_flip() {
    let corpus = Corpus::default();
    let mut router = MessageRouter::new(1000, 0.5);
    let mut rng = rng();

    let mut hidden = 0;
    for i in 0..1000 {
        if router
            .route(&format!("message {i}"), RoundView::waiting(), &corpus, &mut rng)
            .is_hidden()
        {
            hidden += 1;
        }
    }
    assert!((350..=650).contains(&hidden), "hidden {hidden} of 1000");
}

#[test]
fn take_candidate_drains_the_pool() {
    let corpus = Corpus::default();
    let mut router = greedy_router(POOL_CAPACITY);
    let mut rng = rng();

    router.route("one", RoundView::waiting(), &corpus, &mut rng);
    router.route("two", RoundView::waiting(), &corpus, &mut rng);

    let first = router.take_candidate(&mut rng).unwrap();
    let second = router.take_candidate(&mut rng).unwrap();
    assert_ne!(first, second);
    assert!(router.take_candidate(&mut rng).is_none());
}

// Scenario: a round locks "ggwp"; identical chat is hidden while the
// round is judged, and shown again after the round consumed it.
#[test]
fn consumed_round_answers_surface_afterwards() {
    let corpus = Corpus::default();
    let mut router = greedy_router(POOL_CAPACITY);
    let mut rng = rng();

    assert_eq!(
        router.route("ggwp", RoundView::waiting(), &corpus, &mut rng),
        RouteDecision::Hide { pooled: true }
    );
    let candidate = router.take_candidate(&mut rng).unwrap();
    assert_eq!(candidate, "ggwp");

    assert_eq!(
        router.route("ggwp", playing("ggwp"), &corpus, &mut rng),
        RouteDecision::Hide { pooled: false }
    );

    // Round over; the text enters the used set.
    router.mark_used(candidate);
    assert_eq!(
        router.route("ggwp", RoundView::waiting(), &corpus, &mut rng),
        RouteDecision::Show
    );
}
