//! Game logic: the chat-or-chatbot guessing game and the blackjack filler
//! game.
//!
//! Everything in here is plain testable state driven from callback
//! boundaries; timers and signals live in the chat session layer and the
//! views.

pub mod blackjack;
pub mod corpus;
pub mod round;
pub mod router;

pub use corpus::Corpus;
pub use round::{ActiveQuestion, ChatbotGame, RoundOutcome, RoundPhase, Score};
pub use router::{MessageRouter, RouteDecision, RoundView};
