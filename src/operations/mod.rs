// 业务操作
// 路由层只做请求解析和响应组装，业务规则都在这里

pub mod aggregate;
pub mod cascade;
pub mod contact;
pub mod guard;
pub mod recipe;
pub mod review;
pub mod user;
pub mod validate;

pub use aggregate::{RecipeFullView, RecipeView, ReviewSummary, UserSummary};
pub use cascade::CascadeCoordinator;
pub use contact::{ContactOperation, NewContactMessage};
pub use recipe::{NewRecipe, RecipeOperation};
pub use review::{NewReview, ReviewDetail, ReviewOperation, ReviewRecord};
pub use user::{AuthSession, NewUser, UserOperation, UserProfile};
