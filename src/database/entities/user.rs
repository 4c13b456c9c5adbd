use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// 用户实体，对应数据库中的 users 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct UserEntity {
    /// 用户ID
    pub user_id: String,
    /// 邮箱，区分大小写且唯一
    pub email: String,
    /// 显示名称
    pub name: String,
    /// bcrypt 哈希后的密码
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
