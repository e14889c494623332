//! botornot - main entry point
//!
//! Launches the Dioxus app on web (WASM) or desktop.

#![allow(non_snake_case)]

use botornot_client::{AuthProvider, ChatSessionProvider, Route};
use dioxus::prelude::*;

const APP_CSS: &str = include_str!("../assets/main.css");

fn main() {
    // Initialize tracing for desktop
    #[cfg(not(target_arch = "wasm32"))]
    {
        use tracing_subscriber::EnvFilter;
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("botornot_client=debug")),
            )
            .init();
    }

    #[cfg(any(target_arch = "wasm32", feature = "desktop"))]
    dioxus::launch(App);

    #[cfg(all(not(target_arch = "wasm32"), not(feature = "desktop")))]
    tracing::error!("built without a desktop renderer; rebuild with --features desktop");
}

#[cfg_attr(
    all(not(target_arch = "wasm32"), not(feature = "desktop")),
    allow(dead_code)
)]
#[component]
fn App() -> Element {
    rsx! {
        style { {APP_CSS} }

        AuthProvider {
            ChatSessionProvider {
                Router::<Route> {}
            }
        }
    }
}
