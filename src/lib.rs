// ==========================================
// 库存拉式补货 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 共享库存池顺序分配 + 缺口再派发
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 分配规则
pub mod engine;

// 配置层 - 分配参数
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建表/事务）
pub mod db;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{MoveState, ProcureMethod};

// 领域实体
pub use domain::{DemandLine, DemandValues, PoolKey, StockLocation, StockMove, StockMoveValues, StockRule};

// 引擎
pub use engine::{
    AllocationContext, AllocationError, AllocationResult, AvailabilityTracker, ProcurementEngine,
    ProcurementOutcome, StockRepositories,
};

// 配置
pub use config::{load_allocation_settings, AllocationSettings, ConfigManager};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "库存拉式补货";

/// 默认数据库路径环境变量
pub const DB_PATH_ENV: &str = "STOCK_ALLOCATION_DB_PATH";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
