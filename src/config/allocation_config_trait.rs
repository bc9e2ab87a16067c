// ==========================================
// 库存拉式补货 - 分配配置读取 Trait
// ==========================================
// 职责: 定义分配引擎所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use async_trait::async_trait;
use std::error::Error;

/// 配置读取结果
pub type ConfigResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

// ==========================================
// AllocationConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait AllocationConfigReader: Send + Sync {
    /// 获取计量单位数量精度（小数位数）
    ///
    /// # 默认值
    /// - 3，取值范围 0..=10
    async fn get_uom_precision_digits(&self) -> ConfigResult<u32>;

    /// 获取缺口再派发最大层级
    ///
    /// # 默认值
    /// - 32
    async fn get_max_redispatch_depth(&self) -> ConfigResult<usize>;

    /// 顶层运行找不到规则时是否报错
    ///
    /// # 默认值
    /// - false（缺口再派发始终静默）
    async fn get_raise_user_error(&self) -> ConfigResult<bool>;
}
