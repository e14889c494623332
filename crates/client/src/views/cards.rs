//! Blackjack table view.

use dioxus::prelude::*;

use crate::game::blackjack::{hand_value, BlackjackGame, Card, Outcome, Phase};
use crate::Route;

#[component]
pub fn CardsView() -> Element {
    let mut game = use_signal(|| BlackjackGame::new_round(&mut rand::thread_rng()));

    let table = game.read();
    let phase = table.phase();
    let outcome = table.outcome();
    let message = table.message().to_string();
    let player: Vec<Card> = table.player().to_vec();
    let dealer: Vec<Card> = table.dealer().to_vec();
    drop(table);

    let player_value = hand_value(&player);
    let dealer_label = if phase == Phase::Over {
        hand_value(&dealer).to_string()
    } else {
        "?".to_string()
    };
    let verdict = outcome.map(|outcome| match outcome {
        Outcome::Blackjack => "BLACKJACK!",
        Outcome::Player => "YOU WIN!",
        Outcome::Dealer => "DEALER WINS",
        Outcome::Push => "PUSH (TIE)",
    });

    rsx! {
        div { class: "w-full h-screen flex flex-col items-center justify-center bg-gray-900 text-white font-mono",
            div { class: "text-center mb-4",
                h1 { class: "text-3xl mb-2", "Blackjack" }
                p { class: "text-lg", "{message}" }
            }

            div { class: "bg-green-900 w-full max-w-3xl rounded-3xl p-6 border-4 border-green-950 relative",
                div { class: "mb-8",
                    p { class: "text-sm mb-1", "Dealer: {dealer_label}" }
                    div { class: "flex gap-2 flex-wrap",
                        for card in dealer {
                            CardFace { card }
                        }
                    }
                }
                div {
                    p { class: "text-sm mb-1", "Player: {player_value}" }
                    div { class: "flex gap-2 flex-wrap",
                        for card in player {
                            CardFace { card }
                        }
                    }
                }

                if let Some(verdict) = verdict {
                    div { class: "absolute bottom-0 left-0 right-0 flex items-center justify-center bg-black bg-opacity-70 py-4 rounded-b-3xl",
                        div { class: "text-center",
                            h2 { class: "text-2xl mb-2", "{verdict}" }
                            button {
                                class: "px-4 py-2 bg-white text-green-900 font-bold rounded-md hover:bg-gray-200",
                                onclick: move |_| {
                                    game.set(BlackjackGame::new_round(&mut rand::thread_rng()));
                                },
                                "Play Again"
                            }
                        }
                    }
                }
            }

            if phase == Phase::PlayerTurn {
                div { class: "flex gap-4 mt-4",
                    button {
                        class: "px-6 py-2 bg-white text-black font-bold rounded-md hover:bg-gray-200",
                        onclick: move |_| game.write().hit(),
                        "Hit"
                    }
                    button {
                        class: "px-6 py-2 bg-white text-black font-bold rounded-md hover:bg-gray-200",
                        onclick: move |_| game.write().stand(),
                        "Stand"
                    }
                }
            }

            div { class: "mt-6",
                Link { class: "text-green-500 hover:underline", to: Route::Home {}, "Back home" }
            }
        }
    }
}

#[component]
fn CardFace(card: Card) -> Element {
    if card.hidden {
        return rsx! {
            div { class: "w-14 h-20 rounded-md bg-blue-950 border border-blue-800" }
        };
    }

    let rank = card.rank.label();
    let suit = card.suit.symbol();
    let color_class = if card.suit.is_red() {
        "w-14 h-20 rounded-md bg-white flex flex-col justify-between p-1 text-red-500"
    } else {
        "w-14 h-20 rounded-md bg-white flex flex-col justify-between p-1 text-black"
    };

    rsx! {
        div { class: color_class,
            div { class: "text-left text-sm", "{rank}" }
            div { class: "text-center text-2xl", "{suit}" }
            div { class: "text-right text-sm rotate-180", "{rank}" }
        }
    }
}
