// 用户账号
// 注册、登录、查看资料、注销（级联删除该用户的全部数据）

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::cascade::CascadeCoordinator;
use crate::config::Config;
use crate::database::entities::UserEntity;
use crate::database::{CascadeOutcome, EntityStore, StoreError};
use crate::error::{AppError, AppResult};
use crate::notify::{Notification, Notifier};
use crate::utils::{generate_token, hash_password, verify_password};

/// 校验通过的注册信息
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// 对外展示的用户资料，不含密码哈希
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserEntity> for UserProfile {
    fn from(user: UserEntity) -> Self {
        Self {
            id: user.user_id,
            name: user.name,
            email: user.email,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// 登录或注册成功后返回
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub user: UserProfile,
    pub token: String,
    /// token 过期时间（Unix 秒）
    pub expires_at: i64,
}

pub struct UserOperation {
    store: Arc<dyn EntityStore>,
    notifier: Notifier,
    config: Arc<Config>,
}

impl UserOperation {
    pub fn new(store: Arc<dyn EntityStore>, notifier: Notifier, config: Arc<Config>) -> Self {
        Self {
            store,
            notifier,
            config,
        }
    }

    pub async fn register(&self, input: NewUser) -> AppResult<AuthSession> {
        let password_hash = hash_password(&input.password, self.config.bcrypt_cost)
            .map_err(|e| AppError::Internal(format!("failed to hash password: {e}")))?;

        let now = Utc::now();
        let user = UserEntity {
            user_id: Uuid::new_v4().to_string(),
            email: input.email,
            name: input.name,
            password_hash,
            created_at: now,
            updated_at: now,
        };

        match self.store.insert_user(&user).await {
            Ok(()) => {}
            Err(StoreError::Conflict(_)) => {
                return Err(AppError::Conflict("Email is already registered".into()));
            }
            Err(e) => return Err(e.into()),
        }
        tracing::info!(user_id = %user.user_id, "User registered");

        self.notifier.publish(Notification::UserRegistered {
            name: user.name.clone(),
        });
        self.session(user)
    }

    pub async fn login(&self, email: &str, password: &str) -> AppResult<AuthSession> {
        let invalid = || AppError::unauthenticated("Invalid email or password");

        let user = self
            .store
            .find_user_by_email(email.trim())
            .await?
            .ok_or_else(invalid)?;

        let valid = verify_password(password, &user.password_hash).map_err(|e| {
            tracing::warn!(user_id = %user.user_id, "Stored password hash is unreadable: {}", e);
            invalid()
        })?;
        if !valid {
            return Err(invalid());
        }
        self.session(user)
    }

    pub async fn profile(&self, user_id: &str) -> AppResult<UserProfile> {
        self.store
            .find_user(user_id)
            .await?
            .map(UserProfile::from)
            .ok_or_else(|| AppError::not_found(format!("User with id: {user_id} not found")))
    }

    /// 注销账号：删除用户的食谱、这些食谱下的评价、用户写过的评价，最后删除用户
    pub async fn delete_account(&self, user_id: &str) -> AppResult<CascadeOutcome> {
        CascadeCoordinator::new(self.store.clone())
            .delete_user(user_id)
            .await
    }

    fn session(&self, user: UserEntity) -> AppResult<AuthSession> {
        let (token, expires_at) = generate_token(&user.user_id, &self.config)
            .map_err(|e| AppError::Internal(format!("failed to issue token: {e}")))?;
        Ok(AuthSession {
            user: UserProfile::from(user),
            token,
            expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;
    use crate::database::entities::{Difficulty, RecipeEntity, ReviewEntity};
    use crate::utils::verify_token;

    fn setup() -> (Arc<MemoryStore>, UserOperation, Arc<Config>) {
        let store = Arc::new(MemoryStore::new());
        let config = Arc::new(Config::for_tests("user-op-secret"));
        let ops = UserOperation::new(store.clone(), Notifier::disabled(), config.clone());
        (store, ops, config)
    }

    fn alice() -> NewUser {
        NewUser {
            name: "Alice".into(),
            email: "alice@example.com".into(),
            password: "Secret123".into(),
        }
    }

    #[tokio::test]
    async fn test_register_issues_valid_token() {
        let (store, ops, config) = setup();
        let session = ops.register(alice()).await.unwrap();

        let claims = verify_token(&session.token, &config).unwrap();
        assert_eq!(claims.sub, session.user.id);
        assert_eq!(claims.exp, session.expires_at);

        let stored = store.find_user(&session.user.id).await.unwrap().unwrap();
        assert_ne!(stored.password_hash, "Secret123");
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let (_, ops, _) = setup();
        ops.register(alice()).await.unwrap();
        let err = ops.register(alice()).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_login() {
        let (_, ops, _) = setup();
        let registered = ops.register(alice()).await.unwrap();

        let session = ops.login("alice@example.com", "Secret123").await.unwrap();
        assert_eq!(session.user.id, registered.user.id);

        assert!(matches!(
            ops.login("alice@example.com", "wrong").await,
            Err(AppError::Unauthenticated(_))
        ));
        assert!(matches!(
            ops.login("nobody@example.com", "Secret123").await,
            Err(AppError::Unauthenticated(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_account_cascades() {
        let (store, ops, _) = setup();
        let owner = ops.register(alice()).await.unwrap().user.id;
        let critic = ops
            .register(NewUser {
                name: "Bob".into(),
                email: "bob@example.com".into(),
                password: "Secret123".into(),
            })
            .await
            .unwrap()
            .user
            .id;

        let now = Utc::now();
        for (id, owner_id) in [("r1", &owner), ("r2", &owner), ("r3", &critic)] {
            store
                .insert_recipe(&RecipeEntity {
                    recipe_id: id.into(),
                    title: format!("Recipe {id}"),
                    ingredients: vec!["a".into(), "b".into()],
                    instructions: vec!["mix".into()],
                    tags: vec![],
                    cooking_time: 10.0,
                    description: String::new(),
                    difficulty: Difficulty::Hard,
                    servings: 1,
                    added_by: owner_id.clone(),
                    created_at: now,
                    updated_at: now,
                })
                .await
                .unwrap();
        }
        for (id, recipe, reviewer) in [("v1", "r1", &critic), ("v2", "r2", &critic), ("v3", "r3", &owner)] {
            store
                .insert_review(&ReviewEntity {
                    review_id: id.into(),
                    recipe_id: recipe.into(),
                    reviewer_id: reviewer.clone(),
                    rating: 3,
                    comment: "fine dish".into(),
                    created_at: now,
                    updated_at: now,
                })
                .await
                .unwrap();
        }

        let outcome = ops.delete_account(&owner).await.unwrap();
        assert_eq!(outcome.removed_recipes.len(), 2);
        assert_eq!(outcome.removed_reviews.len(), 3);

        let remaining = store.list_recipes().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].recipe_id, "r3");
        assert!(store.find_review("v3").await.unwrap().is_none());
        assert!(matches!(ops.profile(&owner).await, Err(AppError::NotFound(_))));
    }
}
