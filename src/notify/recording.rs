use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{Notification, NotificationSink, NotifyError};

/// 把收到的通知保存在内存里，供测试断言
#[derive(Debug, Default)]
pub struct RecordingSink {
    delivered: Mutex<Vec<Notification>>,
}

impl RecordingSink {
    pub async fn delivered(&self) -> Vec<Notification> {
        self.delivered.lock().await.clone()
    }

    /// 等待至少 `count` 条通知到达或超时，返回当前已收到的全部通知
    pub async fn wait_for(&self, count: usize, timeout: Duration) -> Vec<Notification> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let delivered = self.delivered().await;
            if delivered.len() >= count || tokio::time::Instant::now() >= deadline {
                return delivered;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn deliver(&self, notification: &Notification) -> Result<(), NotifyError> {
        self.delivered.lock().await.push(notification.clone());
        Ok(())
    }
}
