use crate::config::{ServerConfig, SlackConfig};
use crate::error::{EmailBotError, Result};
use crate::logging::log_error;
use crate::lookup::Responder;
use crate::slack::{ChannelId, MessageTs, SlackClient, SlackMessage, ThreadTs};
use axum::body::Body;
use axum::extract::State;
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::{SecondsFormat, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde::Serialize;
use slack_morphism::prelude::*;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::Instrument;

/// How long a delivered event key is remembered for deduplication
const EVENT_MEMORY: Duration = Duration::from_secs(3600);

#[derive(Clone)]
struct BotState {
    responder: Arc<Responder>,
    slack_client: Arc<SlackClient>,
    processed_events: Arc<DashMap<String, Instant>>,
}

#[derive(Debug, Serialize)]
struct HealthStatus {
    status: &'static str,
    timestamp: String,
}

pub struct EventHandler {
    slack_client: Arc<SlackClient>,
    responder: Arc<Responder>,
    slack: SlackConfig,
    server: ServerConfig,
}

impl EventHandler {
    pub fn new(
        slack_client: Arc<SlackClient>,
        responder: Arc<Responder>,
        slack: SlackConfig,
        server: ServerConfig,
    ) -> Self {
        Self {
            slack_client,
            responder,
            slack,
            server,
        }
    }

    /// Serve the Events API endpoint and the health probe until the listener fails
    pub async fn start(self) -> Result<()> {
        tracing::info!("Initializing event handler components");

        let bot_state = BotState {
            responder: self.responder.clone(),
            slack_client: self.slack_client.clone(),
            processed_events: Arc::new(DashMap::new()),
        };

        tracing::debug!("Creating listener environment");
        let listener_environment: Arc<SlackHyperListenerEnvironment> = Arc::new(
            SlackClientEventsListenerEnvironment::new(self.slack_client.get_client())
                .with_error_handler(Self::error_handler),
        );

        let signing_secret: SlackSigningSecret = self.slack.signing_secret.clone().into();
        let listener = SlackEventsAxumListener::<SlackHyperHttpsConnector>::new(
            listener_environment.clone(),
        );

        let app = Router::new()
            .route(
                &self.server.events_path,
                post(Self::handle_push_event).layer(
                    listener
                        .events_layer(&signing_secret)
                        .with_event_extractor(SlackEventsExtractors::push_event()),
                ),
            )
            .route("/health", get(Self::health))
            .with_state(bot_state);

        let tcp = tokio::net::TcpListener::bind(self.server.listen_addr).await?;
        tracing::info!(
            addr = %self.server.listen_addr,
            path = %self.server.events_path,
            "Listening for Slack events"
        );

        axum::serve(tcp, app)
            .await
            .map_err(|e| EmailBotError::Internal(format!("HTTP server failed: {e}")))
    }

    async fn health() -> Json<HealthStatus> {
        Json(HealthStatus {
            status: "OK",
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        })
    }

    async fn handle_push_event(
        State(state): State<BotState>,
        Extension(event): Extension<SlackPushEvent>,
    ) -> Response<Body> {
        match event {
            SlackPushEvent::UrlVerification(url_ver) => {
                tracing::info!("Answering URL verification challenge");
                Response::new(Body::from(url_ver.challenge))
            }
            SlackPushEvent::EventCallback(callback) => {
                Self::cleanup_old_events(&state.processed_events);

                // Acknowledge immediately; Slack retries deliveries not acked within 3 seconds
                tokio::spawn(async move {
                    Self::process_event(callback, state).await;
                });

                Response::new(Body::empty())
            }
            _ => {
                tracing::debug!("Unhandled push event type");
                Response::new(Body::empty())
            }
        }
    }

    async fn process_event(callback: SlackPushEventCallback, state: BotState) {
        let SlackEventCallbackBody::Message(event) = callback.event else {
            tracing::debug!("Ignoring non-message event");
            return;
        };

        let Some(message) = Self::to_slack_message(event) else {
            tracing::debug!("Ignoring message without channel");
            return;
        };

        let event_key = message.event_key();
        if !Self::first_delivery(&state.processed_events, &event_key) {
            tracing::debug!(event_key = %event_key, "Duplicate event detected, skipping");
            return;
        }

        let span = tracing::info_span!(
            "message",
            channel_id = %message.channel.as_str(),
            ts = %message.ts.as_str(),
        );

        Self::answer(message, &state).instrument(span).await;
    }

    async fn answer(message: SlackMessage, state: &BotState) {
        let Some(outcome) = state.responder.respond(&message.to_inbound()).await else {
            return;
        };

        let reply = match outcome {
            Ok(reply) => reply,
            Err(failure) => {
                log_error("email_lookup", &failure);
                failure.reply()
            }
        };

        tracing::info!(reply = reply.kind(), "Replying to email request");

        if let Err(e) = state
            .slack_client
            .send_message(
                &message.channel,
                &reply.to_string(),
                message.thread_ts.as_ref(),
            )
            .await
        {
            log_error("send_reply", &e);
        }
    }

    fn to_slack_message(event: SlackMessageEvent) -> Option<SlackMessage> {
        let channel = event.origin.channel.as_ref()?;

        let subtype = event
            .subtype
            .as_ref()
            .and_then(|st| serde_json::to_value(st).ok())
            .and_then(|v| v.as_str().map(str::to_string));

        Some(SlackMessage {
            channel: ChannelId::new(channel.to_string()),
            text: event
                .content
                .as_ref()
                .and_then(|c| c.text.clone())
                .unwrap_or_default(),
            thread_ts: event
                .origin
                .thread_ts
                .as_ref()
                .map(|t| ThreadTs::new(t.to_string())),
            ts: MessageTs::new(event.origin.ts.to_string()),
            sender_is_bot: event.sender.bot_id.is_some(),
            subtype,
        })
    }

    fn error_handler(
        err: Box<dyn std::error::Error + Send + Sync>,
        _client: Arc<SlackHyperClient>,
        _states: SlackClientEventsUserState,
    ) -> HttpStatusCode {
        tracing::error!(
            error = %err,
            error_kind = std::any::type_name_of_val(&*err),
            "Slack event error"
        );
        HttpStatusCode::OK
    }

    /// Record `key`; false when it was already seen
    fn first_delivery(events: &DashMap<String, Instant>, key: &str) -> bool {
        match events.entry(key.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(Instant::now());
                true
            }
        }
    }

    /// Forget event keys older than an hour to prevent memory growth
    fn cleanup_old_events(events: &DashMap<String, Instant>) {
        let mut removed = 0;

        events.retain(|_key, instant| {
            let keep = instant.elapsed() < EVENT_MEMORY;
            if !keep {
                removed += 1;
            }
            keep
        });

        if removed > 0 {
            tracing::debug!(removed_count = removed, "Cleaned up old events from cache");
        }
    }
}
