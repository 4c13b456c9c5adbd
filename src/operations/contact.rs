// 联系我们留言

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::database::EntityStore;
use crate::database::entities::ContactMessageEntity;
use crate::error::AppResult;
use crate::notify::{Notification, Notifier};

/// 校验通过的留言
#[derive(Debug, Clone)]
pub struct NewContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

pub struct ContactOperation {
    store: Arc<dyn EntityStore>,
    notifier: Notifier,
}

impl ContactOperation {
    pub fn new(store: Arc<dyn EntityStore>, notifier: Notifier) -> Self {
        Self { store, notifier }
    }

    pub async fn submit(&self, input: NewContactMessage) -> AppResult<ContactMessageEntity> {
        let message = ContactMessageEntity {
            message_id: Uuid::new_v4().to_string(),
            name: input.name,
            email: input.email,
            message: input.message,
            created_at: Utc::now(),
        };
        self.store.insert_contact(&message).await?;
        tracing::info!(message_id = %message.message_id, "Contact message stored");

        self.notifier.publish(Notification::ContactReceived {
            name: message.name.clone(),
            email: message.email.clone(),
            message: message.message.clone(),
        });
        Ok(message)
    }
}
