// 数据库模块
// 包含实体定义、存储接口以及 PostgreSQL / 内存两种实现

pub mod entities; // 数据库实体定义
pub mod memory; // 内存实现
pub mod postgres; // PostgreSQL 实现
pub mod store; // 存储接口

// 重新导出常用类型，方便其他模块使用
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use store::{CascadeOutcome, DeleteStep, EntityStore, StoreError, StoreResult};
