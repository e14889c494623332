//! The chat-or-chatbot game view: filtered chat on the left, the round
//! under judgment on the right.

use dioxus::prelude::*;

use crate::auth_session::AuthContext;
use crate::chat_session::ChatSession;
use crate::components::ChatPanel;
use crate::game::RoundPhase;
use crate::Route;

fn verdict_class(correct: bool) -> &'static str {
    if correct {
        "text-2xl font-bold mb-4 text-green-400"
    } else {
        "text-2xl font-bold mb-4 text-red-400"
    }
}

#[component]
pub fn GameView() -> Element {
    let auth = use_context::<AuthContext>();
    let session = use_context::<ChatSession>();

    if !auth.is_authenticated() {
        return rsx! {
            div { class: "w-full h-screen flex flex-col items-center justify-center bg-black text-white font-mono",
                p { class: "text-xl mb-4", "Please log in with Twitch to play Chat or Chatbot" }
                Link { class: "text-green-500 hover:underline", to: Route::Home {}, "Back home" }
            }
        };
    }

    let game = session.game.read();
    let phase = game.phase();
    let score = game.score();
    let question_text = game.question().map(|q| q.text().to_string());
    let outcome = game.last_outcome();
    drop(game);

    let session_for_start = session.clone();
    let session_for_human = session.clone();
    let session_for_bot = session.clone();

    rsx! {
        div { class: "w-full h-screen flex flex-row bg-gray-900 text-white font-mono p-6",
            // Left panel: the filtered live chat.
            div { class: "w-1/3 h-full pr-4 border-r border-gray-700 flex flex-col",
                h2 { class: "text-xl mb-3 text-center", "Live Chat" }
                div { class: "flex-1 overflow-hidden", ChatPanel {} }
            }

            // Right panel: the game.
            div { class: "w-2/3 h-full pl-4 flex flex-col",
                div { class: "text-center mb-4",
                    h1 { class: "text-3xl font-bold mb-2", "Chat or Chatbot?" }
                    p { class: "text-lg",
                        "Score: {score.correct} correct, {score.incorrect} incorrect"
                    }
                }

                div { class: "flex-1 flex flex-col items-center justify-center",
                    if phase == RoundPhase::Waiting {
                        div { class: "text-center",
                            p { class: "text-xl mb-6", "Waiting for chat messages…" }
                            p { class: "animate-pulse text-gray-400 mb-6",
                                "Send some messages in your channel to play!"
                            }
                            button {
                                class: "bg-gray-700 hover:bg-gray-600 text-white px-6 py-2 rounded-lg",
                                onclick: move |_| session_for_start.start_round(),
                                "Start without chat"
                            }
                        }
                    }

                    if phase == RoundPhase::Playing {
                        div { class: "text-center max-w-2xl",
                            div { class: "bg-gray-800 p-6 rounded-lg mb-8 shadow-lg",
                                if let Some(text) = question_text.clone() {
                                    p { class: "text-xl", "\u{201c}{text}\u{201d}" }
                                }
                            }
                            p { class: "text-lg mb-6", "Is this message from a real person or a chatbot?" }
                            div { class: "flex gap-6 justify-center",
                                button {
                                    class: "bg-purple-600 hover:bg-purple-700 text-white px-8 py-3 rounded-lg font-bold transition duration-150",
                                    onclick: move |_| session_for_human.answer(false),
                                    "Real Person"
                                }
                                button {
                                    class: "bg-blue-600 hover:bg-blue-700 text-white px-8 py-3 rounded-lg font-bold transition duration-150",
                                    onclick: move |_| session_for_bot.answer(true),
                                    "Chatbot"
                                }
                            }
                        }
                    }

                    if phase == RoundPhase::Result {
                        div { class: "text-center max-w-2xl",
                            div { class: "bg-gray-800 p-6 rounded-lg mb-8 shadow-lg",
                                if let Some(text) = question_text.clone() {
                                    p { class: "text-xl", "\u{201c}{text}\u{201d}" }
                                }
                            }
                            if let Some(outcome) = outcome {
                                div { class: verdict_class(outcome.correct),
                                    if outcome.correct { "Correct!" } else { "Wrong!" }
                                }
                                p { class: "text-lg mb-2",
                                    if outcome.was_synthetic {
                                        "This message was from a chatbot"
                                    } else {
                                        "This message was from a real person"
                                    }
                                }
                                if outcome.timed_out {
                                    p { class: "text-sm text-gray-400", "Time ran out; a random guess was made." }
                                }
                            }
                            p { class: "text-gray-400 text-sm mt-4", "Next round starting soon…" }
                        }
                    }
                }
            }
        }
    }
}
