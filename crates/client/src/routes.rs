//! Application routing configuration.

use dioxus::prelude::*;

use crate::views::{CardsView, GameView, Home};

// Router configuration
#[derive(Debug, Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    // Landing page with login
    #[route("/")]
    Home {},

    // Chat or Chatbot
    #[route("/game")]
    GameView {},

    // Blackjack filler game
    #[route("/cards")]
    CardsView {},
}
