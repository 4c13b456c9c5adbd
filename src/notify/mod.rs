// 通知模块
// 写操作成功后发布事件，由独立的后台任务投递，投递失败只记日志

mod recording;
mod webhook;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

pub use recording::RecordingSink;
pub use webhook::WebhookSink;

/// 通知队列容量，队列满时新事件直接丢弃
const NOTIFY_QUEUE_CAPACITY: usize = 256;

/// 通知频道，每个频道对应一个 webhook 地址
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    User,
    Recipe,
    Review,
    Contact,
}

/// 对外发布的事件
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    UserRegistered {
        name: String,
    },
    RecipeCreated {
        title: String,
        author: String,
    },
    RecipeUpdated {
        title: String,
        author: String,
    },
    RecipeDeleted {
        title: String,
        author: String,
    },
    ReviewCreated {
        recipe_title: String,
        reviewer: String,
        rating: i32,
        comment: String,
    },
    ReviewUpdated {
        recipe_title: String,
        reviewer: String,
        rating: i32,
        comment: String,
    },
    ReviewDeleted {
        recipe_title: String,
        reviewer: String,
    },
    ContactReceived {
        name: String,
        email: String,
        message: String,
    },
}

impl Notification {
    pub fn channel(&self) -> Channel {
        match self {
            Notification::UserRegistered { .. } => Channel::User,
            Notification::RecipeCreated { .. }
            | Notification::RecipeUpdated { .. }
            | Notification::RecipeDeleted { .. } => Channel::Recipe,
            Notification::ReviewCreated { .. }
            | Notification::ReviewUpdated { .. }
            | Notification::ReviewDeleted { .. } => Channel::Review,
            Notification::ContactReceived { .. } => Channel::Contact,
        }
    }

    /// 日志里使用的事件名
    pub fn kind(&self) -> &'static str {
        match self {
            Notification::UserRegistered { .. } => "user_registered",
            Notification::RecipeCreated { .. } => "recipe_created",
            Notification::RecipeUpdated { .. } => "recipe_updated",
            Notification::RecipeDeleted { .. } => "recipe_deleted",
            Notification::ReviewCreated { .. } => "review_created",
            Notification::ReviewUpdated { .. } => "review_updated",
            Notification::ReviewDeleted { .. } => "review_deleted",
            Notification::ContactReceived { .. } => "contact_received",
        }
    }
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("webhook request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("webhook rejected notification with status {0}")]
    Rejected(u16),
    #[error("{0}")]
    Other(String),
}

/// 通知的最终接收方
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn deliver(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// 通知发布端，克隆后在各请求间共享
#[derive(Clone, Debug)]
pub struct Notifier {
    tx: Option<mpsc::Sender<Notification>>,
}

impl Notifier {
    /// 启动后台投递任务，必须在 tokio 运行时内调用
    pub fn spawn(sink: Arc<dyn NotificationSink>) -> Self {
        let (tx, rx) = mpsc::channel(NOTIFY_QUEUE_CAPACITY);
        tokio::spawn(run_dispatcher(rx, sink));
        Self { tx: Some(tx) }
    }

    /// 丢弃所有事件
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// 发布事件，不等待投递结果
    pub fn publish(&self, notification: Notification) {
        let Some(tx) = &self.tx else {
            return;
        };
        let kind = notification.kind();
        if let Err(e) = tx.try_send(notification) {
            tracing::warn!(event = kind, "Dropping notification: {}", e);
        }
    }
}

async fn run_dispatcher(mut rx: mpsc::Receiver<Notification>, sink: Arc<dyn NotificationSink>) {
    while let Some(notification) = rx.recv().await {
        match sink.deliver(&notification).await {
            Ok(()) => tracing::debug!(event = notification.kind(), "Notification delivered"),
            Err(e) => tracing::warn!(
                event = notification.kind(),
                "Failed to deliver notification: {}",
                e
            ),
        }
    }
    tracing::debug!("Notification dispatcher stopped");
}
