// ==========================================
// 库存拉式补货 - 配置层
// ==========================================
// 职责: 分配参数读取
// 存储: config_kv 表
// ==========================================

pub mod allocation_config_trait;
pub mod allocation_settings;
pub mod config_manager;

// 重导出核心配置管理器
pub use allocation_config_trait::{AllocationConfigReader, ConfigResult};
pub use allocation_settings::{load_allocation_settings, AllocationSettings};
pub use config_manager::{config_keys, ConfigManager};
