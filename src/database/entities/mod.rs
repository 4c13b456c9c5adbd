// 数据库实体定义
// 外键字段只保存对方的 ID，不内嵌文档

pub mod contact;
pub mod recipe;
pub mod review;
pub mod user;

pub use contact::ContactMessageEntity;
pub use recipe::{Difficulty, RecipeEntity, RecipePatch};
pub use review::{ReviewEntity, ReviewPatch};
pub use user::UserEntity;
