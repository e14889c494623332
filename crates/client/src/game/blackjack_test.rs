use rand::rngs::StdRng;
use rand::SeedableRng;

use super::*;

fn card(rank: Rank) -> Card {
    Card {
        suit: Suit::Spades,
        rank,
        hidden: false,
    }
}

fn hidden(rank: Rank) -> Card {
    Card {
        suit: Suit::Hearts,
        rank,
        hidden: true,
    }
}

fn table(deck: Vec<Card>, player: Vec<Card>, dealer: Vec<Card>) -> BlackjackGame {
    BlackjackGame {
        deck,
        player,
        dealer,
        phase: Phase::PlayerTurn,
        outcome: None,
        message: String::new(),
    }
}

#[test]
fn hand_value_downgrades_aces_while_busting() {
    assert_eq!(hand_value(&[card(Rank::Ace), card(Rank::King)]), 21);
    assert_eq!(
        hand_value(&[card(Rank::Ace), card(Rank::Ace), card(Rank::Nine)]),
        21
    );
    assert_eq!(
        hand_value(&[card(Rank::Ace), card(Rank::King), card(Rank::Five)]),
        16
    );
    assert_eq!(
        hand_value(&[
            card(Rank::Ace),
            card(Rank::Ace),
            card(Rank::Ace),
            card(Rank::King),
            card(Rank::Queen)
        ]),
        23
    );
}

#[test]
fn hidden_cards_do_not_count() {
    assert_eq!(hand_value(&[hidden(Rank::King), card(Rank::Seven)]), 7);
    assert_eq!(hand_value(&[]), 0);
}

#[test]
fn new_round_deals_two_cards_each_with_the_hole_card_down() {
    let mut rng = StdRng::seed_from_u64(5);
    let game = BlackjackGame::new_round(&mut rng);

    assert_eq!(game.player().len(), 2);
    assert_eq!(game.dealer().len(), 2);
    assert_eq!(game.deck_len(), 48);

    match game.phase() {
        Phase::PlayerTurn => {
            assert!(game.dealer()[0].hidden);
            assert!(!game.dealer()[1].hidden);
            assert!(game.outcome().is_none());
        }
        // A natural 21 ends the round immediately with everything shown.
        Phase::Over => {
            assert_eq!(game.outcome(), Some(Outcome::Blackjack));
            assert!(game.dealer().iter().all(|c| !c.hidden));
        }
    }
}

#[test]
fn busting_hands_the_round_to_the_dealer() {
    let mut game = table(
        vec![card(Rank::King)],
        vec![card(Rank::Ten), card(Rank::Nine)],
        vec![hidden(Rank::Five), card(Rank::Six)],
    );

    game.hit();

    assert_eq!(game.phase(), Phase::Over);
    assert_eq!(game.outcome(), Some(Outcome::Dealer));
    assert!(game.dealer().iter().all(|c| !c.hidden));
    assert!(game.message().contains("Bust"));
}

#[test]
fn dealer_draws_to_seventeen_and_stops() {
    // Dealer shows 5 + 6 = 11 and must draw the 3 and the 4 (18), then stop.
    let mut game = table(
        vec![card(Rank::King), card(Rank::Four), card(Rank::Three)],
        vec![card(Rank::Ten), card(Rank::Nine)],
        vec![hidden(Rank::Five), card(Rank::Six)],
    );

    game.stand();

    assert_eq!(game.phase(), Phase::Over);
    assert_eq!(hand_value(game.dealer()), 18);
    assert_eq!(game.deck_len(), 1);
    assert_eq!(game.outcome(), Some(Outcome::Player));
}

#[test]
fn dealer_bust_pays_the_player() {
    // Dealer 16 must draw the king and bust.
    let mut game = table(
        vec![card(Rank::King)],
        vec![card(Rank::Ten), card(Rank::Eight)],
        vec![hidden(Rank::Ten), card(Rank::Six)],
    );

    game.stand();

    assert_eq!(game.outcome(), Some(Outcome::Player));
    assert!(game.message().contains("Dealer busts"));
}

#[test]
fn equal_hands_push() {
    let mut game = table(
        vec![],
        vec![card(Rank::Ten), card(Rank::Eight)],
        vec![hidden(Rank::Ten), card(Rank::Eight)],
    );

    game.stand();

    assert_eq!(game.outcome(), Some(Outcome::Push));
}

#[test]
fn twenty_one_on_hit_stands_automatically() {
    // The deck is a stack; the player draws the 2 for exactly 21 and the
    // round settles without a separate stand.
    let mut game = table(
        vec![card(Rank::Two)],
        vec![card(Rank::Ten), card(Rank::Nine)],
        vec![hidden(Rank::Ten), card(Rank::Seven)],
    );

    game.hit();

    assert_eq!(game.phase(), Phase::Over);
    assert_eq!(hand_value(game.player()), 21);
    assert_eq!(game.outcome(), Some(Outcome::Player));
}

#[test]
fn actions_after_the_round_are_ignored() {
    let mut game = table(
        vec![card(Rank::King)],
        vec![card(Rank::Ten), card(Rank::Eight)],
        vec![hidden(Rank::Ten), card(Rank::Eight)],
    );

    game.stand();
    let dealer_cards = game.dealer().len();
    let player_cards = game.player().len();

    game.hit();
    game.stand();

    assert_eq!(game.dealer().len(), dealer_cards);
    assert_eq!(game.player().len(), player_cards);
}
