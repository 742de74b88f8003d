use crate::config::SlackConfig;
use crate::directory::{Directory, UserRecord};
use crate::error::{EmailBotError, Result};
use crate::slack::{ChannelId, MessageTs, ThreadTs};
use async_trait::async_trait;
use slack_morphism::{errors::SlackClientError, prelude::*};
use std::sync::Arc;

/// Page size for `users.list`
const USERS_PAGE_LIMIT: u16 = 200;

/// `users.info` error codes meaning the member does not exist for this token
const USER_MISSING_CODES: [&str; 2] = ["user_not_found", "user_not_visible"];

pub struct SlackClient {
    client: Arc<SlackHyperClient>,
    token: SlackApiToken,
}

impl SlackClient {
    pub fn new(config: &SlackConfig) -> Result<Self> {
        let connector = SlackClientHyperConnector::new()
            .map_err(|e| EmailBotError::SlackApi(e.to_string()))?;

        let client = Arc::new(slack_morphism::SlackClient::new(connector));
        let token = SlackApiToken::new(config.bot_token.clone().into());

        Ok(Self { client, token })
    }

    pub fn get_client(&self) -> Arc<SlackHyperClient> {
        self.client.clone()
    }

    /// Send a message to a channel, optionally inside a thread
    pub async fn send_message(
        &self,
        channel: &ChannelId,
        text: &str,
        thread_ts: Option<&ThreadTs>,
    ) -> Result<MessageTs> {
        let session = self.client.open_session(&self.token);

        let mut request = SlackApiChatPostMessageRequest::new(
            channel.as_str().into(),
            SlackMessageContent::new().with_text(text.into()),
        );

        if let Some(ts) = thread_ts {
            request.thread_ts = Some(ts.as_str().into());
        }

        request.unfurl_links = Some(false);
        request.unfurl_media = Some(false);

        let response = session
            .chat_post_message(&request)
            .await
            .map_err(|e| EmailBotError::SlackApi(e.to_string()))?;

        Ok(MessageTs::new(response.ts.to_string()))
    }

    /// Get user information from Slack API
    ///
    /// Unknown or invisible users come back as `Ok(None)`.
    pub async fn get_user_info(&self, user_id: &str) -> Result<Option<UserRecord>> {
        let session = self.client.open_session(&self.token);

        let request = SlackApiUsersInfoRequest::new(SlackUserId(user_id.to_string()));

        match session.users_info(&request).await {
            Ok(response) => Ok(Some(to_user_record(response.user))),
            Err(SlackClientError::ApiError(ae)) if is_missing_user(&ae.code) => {
                tracing::debug!(user_id = %user_id, code = %ae.code, "User not in workspace");
                Ok(None)
            }
            Err(e) => Err(EmailBotError::SlackApi(e.to_string())),
        }
    }

    /// Page through `users.list` until the cursor is exhausted
    pub async fn list_users(&self) -> Result<Vec<UserRecord>> {
        let session = self.client.open_session(&self.token);
        let mut members = Vec::new();
        let mut cursor: Option<SlackCursorId> = None;

        loop {
            let mut request = SlackApiUsersListRequest::new().with_limit(USERS_PAGE_LIMIT);
            if let Some(c) = cursor.take() {
                request = request.with_cursor(c);
            }

            let response = session
                .users_list(&request)
                .await
                .map_err(|e| EmailBotError::SlackApi(e.to_string()))?;

            members.extend(response.members.into_iter().map(to_user_record));

            cursor = response
                .response_metadata
                .and_then(|m| m.next_cursor)
                .filter(|c| !c.0.is_empty());

            if cursor.is_none() {
                break;
            }
        }

        tracing::debug!(members = members.len(), "Fetched workspace member list");

        Ok(members)
    }
}

#[async_trait]
impl Directory for SlackClient {
    async fn get_user_by_id(&self, user_id: &str) -> Result<Option<UserRecord>> {
        self.get_user_info(user_id).await
    }

    async fn list_all_users(&self) -> Result<Vec<UserRecord>> {
        self.list_users().await
    }
}

fn is_missing_user(code: &str) -> bool {
    USER_MISSING_CODES.contains(&code)
}

fn to_user_record(user: SlackUser) -> UserRecord {
    let profile = user.profile.as_ref();

    UserRecord {
        id: user.id.to_string(),
        name: user.name.clone().unwrap_or_else(|| user.id.to_string()),
        display_name: profile.and_then(|p| p.display_name.clone()),
        real_name: profile
            .and_then(|p| p.real_name.clone())
            .or_else(|| user.real_name.clone()),
        email: profile.and_then(|p| p.email.as_ref().map(|e| e.to_string())),
        is_deleted: user.deleted.unwrap_or(false),
        is_bot: user.flags.is_bot.unwrap_or(false),
    }
}
