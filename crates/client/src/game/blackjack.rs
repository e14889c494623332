//! Single-player blackjack engine.
//!
//! Pure rules, no streaming input: a 52-card deck, hit/stand, ace-aware
//! valuation, dealer draws to 17. Used as filler content between chat
//! games; the view only calls `new_round`, `hit` and `stand`.

#[cfg(test)]
#[path = "blackjack_test.rs"]
mod blackjack_test;

use rand::seq::SliceRandom;
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suit {
    Spades,
    Hearts,
    Diamonds,
    Clubs,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Spades, Suit::Hearts, Suit::Diamonds, Suit::Clubs];

    pub fn symbol(&self) -> &'static str {
        match self {
            Suit::Spades => "♠",
            Suit::Hearts => "♥",
            Suit::Diamonds => "♦",
            Suit::Clubs => "♣",
        }
    }

    pub fn is_red(&self) -> bool {
        matches!(self, Suit::Hearts | Suit::Diamonds)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rank {
    Ace,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
}

impl Rank {
    pub const ALL: [Rank; 13] = [
        Rank::Ace,
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Rank::Ace => "A",
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
        }
    }

    /// Ace counts as 11 here; [`hand_value`] downgrades to 1 as needed.
    fn base_value(&self) -> u32 {
        match self {
            Rank::Ace => 11,
            Rank::Two => 2,
            Rank::Three => 3,
            Rank::Four => 4,
            Rank::Five => 5,
            Rank::Six => 6,
            Rank::Seven => 7,
            Rank::Eight => 8,
            Rank::Nine => 9,
            Rank::Ten | Rank::Jack | Rank::Queen | Rank::King => 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Card {
    pub suit: Suit,
    pub rank: Rank,
    /// Face-down (the dealer's hole card); excluded from valuation.
    pub hidden: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    PlayerTurn,
    Over,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Player,
    Dealer,
    Push,
    /// A natural 21 on the deal.
    Blackjack,
}

/// Value of the visible cards in a hand, downgrading aces from 11 to 1
/// while the hand would bust.
pub fn hand_value(hand: &[Card]) -> u32 {
    let mut value = 0;
    let mut aces = 0;
    for card in hand {
        if card.hidden {
            continue;
        }
        if card.rank == Rank::Ace {
            aces += 1;
        }
        value += card.rank.base_value();
    }
    while value > 21 && aces > 0 {
        value -= 10;
        aces -= 1;
    }
    value
}

/// One blackjack table.
#[derive(Debug, Clone)]
pub struct BlackjackGame {
    deck: Vec<Card>,
    player: Vec<Card>,
    dealer: Vec<Card>,
    phase: Phase,
    outcome: Option<Outcome>,
    message: String,
}

impl BlackjackGame {
    /// Shuffle a fresh deck and deal the opening hands.
    pub fn new_round<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut deck = Vec::with_capacity(52);
        for suit in Suit::ALL {
            for rank in Rank::ALL {
                deck.push(Card {
                    suit,
                    rank,
                    hidden: false,
                });
            }
        }
        deck.shuffle(rng);

        let mut game = Self {
            deck,
            player: Vec::new(),
            dealer: Vec::new(),
            phase: Phase::PlayerTurn,
            outcome: None,
            message: String::new(),
        };

        game.deal_to_player();
        game.deal_to_dealer(true);
        game.deal_to_player();
        game.deal_to_dealer(false);

        if hand_value(&game.player) == 21 {
            game.reveal_dealer();
            game.phase = Phase::Over;
            game.outcome = Some(Outcome::Blackjack);
            game.message = "Blackjack! You win!".to_string();
        } else {
            game.message = "Your turn: Hit or Stand?".to_string();
        }

        game
    }

    pub fn player(&self) -> &[Card] {
        &self.player
    }

    pub fn dealer(&self) -> &[Card] {
        &self.dealer
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn deck_len(&self) -> usize {
        self.deck.len()
    }

    /// Draw one card. 21 stands automatically; over 21 busts.
    pub fn hit(&mut self) {
        if self.phase != Phase::PlayerTurn {
            return;
        }
        self.deal_to_player();

        let value = hand_value(&self.player);
        if value > 21 {
            self.reveal_dealer();
            self.phase = Phase::Over;
            self.outcome = Some(Outcome::Dealer);
            self.message = format!("Bust with {value}! Dealer wins.");
        } else if value == 21 {
            self.stand();
        } else {
            self.message = format!("Your hand: {value}. Hit or Stand?");
        }
    }

    /// Stop drawing; the dealer reveals and draws to 17, then the hands
    /// are compared.
    pub fn stand(&mut self) {
        if self.phase != Phase::PlayerTurn {
            return;
        }
        self.reveal_dealer();

        while hand_value(&self.dealer) < 17 {
            self.deal_to_dealer(false);
        }

        let player_value = hand_value(&self.player);
        let dealer_value = hand_value(&self.dealer);
        self.phase = Phase::Over;

        if dealer_value > 21 {
            self.outcome = Some(Outcome::Player);
            self.message = format!("Dealer busts with {dealer_value}! You win with {player_value}!");
        } else if player_value > dealer_value {
            self.outcome = Some(Outcome::Player);
            self.message = format!("You win! {player_value} beats {dealer_value}");
        } else if dealer_value > player_value {
            self.outcome = Some(Outcome::Dealer);
            self.message = format!("Dealer wins. {dealer_value} beats {player_value}");
        } else {
            self.outcome = Some(Outcome::Push);
            self.message = format!("Push! Both have {player_value}");
        }
    }

    fn deal_to_player(&mut self) {
        if let Some(card) = self.deck.pop() {
            self.player.push(card);
        }
    }

    fn deal_to_dealer(&mut self, hidden: bool) {
        if let Some(mut card) = self.deck.pop() {
            card.hidden = hidden;
            self.dealer.push(card);
        }
    }

    fn reveal_dealer(&mut self) {
        for card in &mut self.dealer {
            card.hidden = false;
        }
    }
}
