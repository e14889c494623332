//! Chat session wiring: one owned stream client feeding the router, the
//! chat log and the guessing game.
//!
//! This is the only place that touches the stream client: it connects it
//! when the user authenticates, re-registers the two chat subscriptions
//! on every `connected` event (a new session id voids the old ones), and
//! runs every inbound chat message through the router before anything
//! reaches the visible chat. Round timers (answer timeout, result delay)
//! live here too, guarded by the round sequence number so a stale timer
//! can never touch a later round.

use botornot_shared::{
    notification_event, ChannelChatDeleteEvent, ChannelChatMessageEvent, ChatMessage,
    SUB_CHANNEL_CHAT_MESSAGE, SUB_CHANNEL_CHAT_MESSAGE_DELETE, SUB_VERSION,
};
use dioxus::prelude::*;
use serde_json::Value;

use crate::auth_session::AuthContext;
use crate::eventsub::manager::{
    EVENT_CONNECTED, EVENT_MAX_RECONNECT, EVENT_REVOCATION, EVENT_SILENCED,
};
use crate::eventsub::{ConnectionState, EventSubClient};
use crate::game::round::{RESULT_DELAY, ROUND_TIMEOUT};
use crate::game::{ChatbotGame, Corpus, MessageRouter, RouteDecision, RoundPhase};
use crate::stores::CHAT_LOG;

/// Everything the views need to drive the chat game.
#[derive(Clone)]
pub struct ChatSession {
    client: EventSubClient,
    /// Short id tying this session's log lines together.
    instance: String,
    pub router: Signal<MessageRouter>,
    pub game: Signal<ChatbotGame>,
    pub corpus: Signal<Corpus>,
    pub status: Signal<ConnectionState>,
    /// Connection-health banner (silence, revocation, giving up).
    pub health: Signal<Option<String>>,
}

/// Provider component owning the stream client and the game state.
#[component]
pub fn ChatSessionProvider(children: Element) -> Element {
    let auth = use_context::<AuthContext>();
    let router = use_signal(MessageRouter::default);
    let game = use_signal(ChatbotGame::default);
    let corpus = use_signal(Corpus::default);
    let status = use_signal(|| ConnectionState::Idle);
    let health = use_signal(|| None);

    let session = use_hook(|| {
        let session = ChatSession {
            client: EventSubClient::new(),
            instance: uuid::Uuid::new_v4().to_string()[..8].to_string(),
            router,
            game,
            corpus,
            status,
            health,
        };
        session.install_handlers();
        session
    });
    use_context_provider(|| session.clone());

    // Follow the auth session: connect when a credential appears, tear
    // down on logout.
    let session_for_effect = session.clone();
    use_effect(move || {
        let authenticated = auth.session.read().is_some();
        if authenticated {
            if let Some(credential) = auth.credential() {
                crate::log_info!(
                    "[{}] starting chat session for user {}",
                    session_for_effect.instance,
                    credential.user_id
                );
                session_for_effect.client.connect(credential);
            }
        } else {
            session_for_effect.client.disconnect();
        }
    });

    children
}

impl ChatSession {
    pub fn connection_state(&self) -> ConnectionState {
        self.status.read().clone()
    }

    /// Answer the current round from the UI.
    pub fn answer(&self, guessed_synthetic: bool) {
        let finished = {
            let mut game = self.game;
            let mut game = game.write();
            game.answer(guessed_synthetic).map(|_| game.round_seq())
        };
        if let Some(seq) = finished {
            self.schedule_next_round(seq);
        }
    }

    /// Start a round by hand (the waiting screen's button). Falls back to
    /// synthetic material when nothing is pooled yet.
    pub fn start_round(&self) {
        let seq = {
            let mut game = self.game;
            let mut router = self.router;
            let mut corpus = self.corpus;
            let mut game = game.write();
            if game.phase() == RoundPhase::Playing {
                return;
            }
            game.start_round(&mut router.write(), &mut corpus.write(), &mut rand::thread_rng());
            game.round_seq()
        };
        self.arm_round_timeout(seq);
    }

    fn install_handlers(&self) {
        let status = self.status;
        self.client.set_state_listener(move |state| {
            let mut status = status;
            status.set(state);
        });

        // A fresh session id: previous subscriptions are void, register
        // both chat topics against the new session.
        let client = self.client.clone();
        let health = self.health;
        let instance = self.instance.clone();
        self.client.on(EVENT_CONNECTED, move |session_id| {
            let mut health = health;
            health.set(None);
            crate::log_info!(
                "[{}] session {} connected; registering chat subscriptions",
                instance,
                session_id.as_str().unwrap_or_default()
            );
            let client = client.clone();
            crate::runtime::spawn(async move {
                let Some(user_id) = client.user_id() else {
                    return;
                };
                for sub_type in [SUB_CHANNEL_CHAT_MESSAGE, SUB_CHANNEL_CHAT_MESSAGE_DELETE] {
                    let condition = serde_json::json!({
                        "broadcaster_user_id": user_id,
                        "user_id": user_id,
                    });
                    if let Err(e) = client.subscribe(sub_type, SUB_VERSION, condition).await {
                        crate::log_error!("failed to subscribe to {}: {}", sub_type, e);
                    }
                }
            });
        });

        let session = self.clone();
        self.client.on(SUB_CHANNEL_CHAT_MESSAGE, move |envelope| {
            session.handle_chat_message(envelope);
        });

        self.client.on(SUB_CHANNEL_CHAT_MESSAGE_DELETE, |envelope| {
            handle_chat_delete(envelope);
        });

        let health = self.health;
        self.client.on(EVENT_SILENCED, move |_| {
            let mut health = health;
            health.set(Some("Chat went quiet; reconnecting…".to_string()));
        });

        let health = self.health;
        self.client.on(EVENT_REVOCATION, move |_| {
            let mut health = health;
            health.set(Some("Chat access was revoked by the provider.".to_string()));
        });

        let health = self.health;
        self.client.on(EVENT_MAX_RECONNECT, move |_| {
            let mut health = health;
            health.set(Some(
                "Lost the chat connection for good. Log in again to retry.".to_string(),
            ));
        });
    }

    /// Route one inbound chat message: surface it, or divert it into the
    /// hidden pool as game material.
    fn handle_chat_message(&self, envelope: &Value) {
        let Some(event) = notification_event(envelope) else {
            return;
        };
        let event: ChannelChatMessageEvent = match serde_json::from_value(event.clone()) {
            Ok(event) => event,
            Err(e) => {
                crate::log_error!("failed to parse chat message event: {}", e);
                return;
            }
        };

        let decision = {
            let mut router = self.router;
            let game = self.game.read();
            let corpus = self.corpus.read();
            let mut rng = rand::thread_rng();
            let decision = router
                .write()
                .route(&event.message.text, game.round_view(), &corpus, &mut rng);
            decision
        };

        match decision {
            RouteDecision::Show => {
                let message: ChatMessage = event.into();
                CHAT_LOG.write().push(message);
            }
            RouteDecision::Hide { pooled: true } => {
                crate::log_debug!(
                    "[{}] intercepted message {} for game use",
                    self.instance,
                    event.message_id
                );
                self.maybe_start_round();
            }
            RouteDecision::Hide { pooled: false } => {}
        }
    }

    /// First material while the game is waiting kicks off a round.
    fn maybe_start_round(&self) {
        if self.game.read().phase() == RoundPhase::Waiting {
            self.start_round();
        }
    }

    fn arm_round_timeout(&self, seq: u64) {
        let session = self.clone();
        crate::runtime::spawn(async move {
            crate::runtime::sleep(ROUND_TIMEOUT).await;
            session.resolve_timed_out_round(seq);
        });
    }

    /// A round left unanswered past the budget resolves with a random
    /// guess. The sequence guard keeps a stale timer away from any later
    /// round.
    fn resolve_timed_out_round(&self, seq: u64) {
        let resolved = {
            let mut game = self.game;
            let mut game = game.write();
            if game.round_seq() != seq || game.phase() != RoundPhase::Playing {
                return;
            }
            crate::log_info!("[{}] round timed out; guessing at random", self.instance);
            game.resolve_timeout(&mut rand::thread_rng()).is_some()
        };
        if resolved {
            self.schedule_next_round(seq);
        }
    }

    fn schedule_next_round(&self, seq: u64) {
        let session = self.clone();
        crate::runtime::spawn(async move {
            crate::runtime::sleep(RESULT_DELAY).await;
            session.advance_round(seq);
        });
    }

    fn advance_round(&self, seq: u64) {
        let next_seq = {
            let mut game = self.game;
            let mut router = self.router;
            let mut corpus = self.corpus;
            let mut game = game.write();
            if game.round_seq() != seq || game.phase() != RoundPhase::Result {
                return;
            }
            game.next_round(&mut router.write(), &mut corpus.write(), &mut rand::thread_rng());
            game.round_seq()
        };
        self.arm_round_timeout(next_seq);
    }
}

/// Flip the soft-delete flag on the targeted message. Unknown ids are a
/// no-op; the message may have scrolled out of the display buffer.
fn handle_chat_delete(envelope: &Value) {
    let Some(event) = notification_event(envelope) else {
        return;
    };
    match serde_json::from_value::<ChannelChatDeleteEvent>(event.clone()) {
        Ok(event) => {
            CHAT_LOG.write().mark_deleted(&event.message_id);
        }
        Err(e) => crate::log_error!("failed to parse message delete event: {}", e),
    }
}
