//! Landing page: login, game links.

use dioxus::prelude::*;

use crate::auth_session::AuthContext;
use crate::Route;

#[component]
pub fn Home() -> Element {
    let mut auth = use_context::<AuthContext>();
    let nav = use_navigator();

    let authenticated = auth.is_authenticated();
    let authenticating = *auth.authenticating.read();
    let error = auth.auth_error.read().clone();
    let display_name = auth.user().map(|u| u.display_name);

    rsx! {
        div { class: "w-full h-screen bg-black text-white font-mono flex flex-col items-center justify-center",
            h1 { class: "text-4xl sm:text-6xl uppercase mb-8", "Chat or Chatbot?" }
            p { class: "text-xl mb-8 max-w-2xl text-center",
                "A game for streamers: can you tell your real chatters from canned bot messages?"
            }

            if authenticating {
                p { class: "text-gray-400 animate-pulse", "Signing in…" }
            } else if authenticated {
                div { class: "flex flex-col items-center gap-4",
                    if let Some(name) = display_name {
                        p { class: "text-green-500", "Logged in as {name}" }
                    }
                    button {
                        class: "bg-white text-black px-6 py-3 text-xl hover:bg-gray-200 transition-colors",
                        onclick: move |_| {
                            nav.push(Route::GameView {});
                        },
                        "Start Game"
                    }
                    button {
                        class: "text-green-500 hover:underline",
                        onclick: move |_| auth.logout(),
                        "Logout"
                    }
                }
            } else {
                button {
                    class: "bg-white text-black px-6 py-3 text-xl hover:bg-gray-200 transition-colors",
                    onclick: move |_| auth.login(),
                    "Log In with Twitch"
                }
            }

            if let Some(error) = error {
                p { class: "text-red-500 mt-4", "{error}" }
            }

            div { class: "mt-12",
                Link { class: "text-green-500 hover:underline", to: Route::CardsView {},
                    "Bored? Play some blackjack"
                }
            }
        }
    }
}
