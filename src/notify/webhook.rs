use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use super::{Channel, Notification, NotificationSink, NotifyError};
use crate::config::WebhookConfig;

const EMBED_COLOR: u32 = 3447003;
const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(5);

/// 以 Discord webhook 格式投递通知
#[derive(Debug, Clone)]
pub struct WebhookSink {
    client: reqwest::Client,
    config: WebhookConfig,
}

impl WebhookSink {
    pub fn new(config: WebhookConfig) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(WEBHOOK_TIMEOUT)
            .build()?;
        Ok(Self { client, config })
    }

    fn url_for(&self, channel: Channel) -> Option<&str> {
        match channel {
            Channel::User => self.config.user_url.as_deref(),
            Channel::Recipe => self.config.recipe_url.as_deref(),
            Channel::Review => self.config.review_url.as_deref(),
            Channel::Contact => self.config.contact_url.as_deref(),
        }
    }
}

/// 生成 webhook 请求体：{content, embeds: [{title, description, color}]}
pub(crate) fn payload(notification: &Notification) -> Value {
    let (content, title, description) = match notification {
        Notification::UserRegistered { name } => (
            "new member update".to_string(),
            "new user created!".to_string(),
            format!("{name} joined our recipe community!\nwelcome {name}, we are glad to have you here"),
        ),
        Notification::RecipeCreated { title, author } => (
            "recipe update".to_string(),
            format!("new recipe created by: {author}"),
            format!("{author} added: \"{title}\" to our recipe collection"),
        ),
        Notification::RecipeUpdated { title, author } => (
            "recipe update".to_string(),
            format!("recipe edited! edited by: {author}"),
            format!("{author} edited the \"{title}\" recipe in our collection"),
        ),
        Notification::RecipeDeleted { title, author } => (
            "recipe deleted".to_string(),
            format!("recipe deleted by: {author}"),
            format!("{author}'s recipe \"{title}\" was deleted"),
        ),
        Notification::ReviewCreated {
            recipe_title,
            reviewer,
            rating,
            comment,
        } => (
            "review update".to_string(),
            format!("new review created by: {reviewer}"),
            format!("recipe: {recipe_title}\nrating: {rating}\ncomment: {comment}"),
        ),
        Notification::ReviewUpdated {
            recipe_title,
            reviewer,
            rating,
            comment,
        } => (
            "review update".to_string(),
            format!("review edited! edited by: {reviewer}"),
            format!("recipe: {recipe_title}\nrating: {rating}\ncomment: {comment}"),
        ),
        Notification::ReviewDeleted {
            recipe_title,
            reviewer,
        } => (
            "review deleted".to_string(),
            format!("review deleted by: {reviewer}"),
            format!("{reviewer} removed their review of \"{recipe_title}\""),
        ),
        Notification::ContactReceived {
            name,
            email,
            message,
        } => (
            "New Contact Us Message!".to_string(),
            format!("new message from: {name}"),
            format!("email: {email}\nmessage: {message}"),
        ),
    };

    json!({
        "content": content,
        "embeds": [{
            "title": title,
            "description": description,
            "color": EMBED_COLOR,
        }],
    })
}

#[async_trait]
impl NotificationSink for WebhookSink {
    async fn deliver(&self, notification: &Notification) -> Result<(), NotifyError> {
        let Some(url) = self.url_for(notification.channel()) else {
            tracing::debug!(
                event = notification.kind(),
                "No webhook configured for channel, skipping"
            );
            return Ok(());
        };

        let response = self
            .client
            .post(url)
            .json(&payload(notification))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(NotifyError::Rejected(response.status().as_u16()));
        }
        Ok(())
    }
}
