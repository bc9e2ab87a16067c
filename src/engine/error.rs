// ==========================================
// 库存拉式补货 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 约定: 引擎不做本地恢复，错误一律上抛至事务边界
// ==========================================

use crate::domain::demand::DemandError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 分配引擎错误类型
#[derive(Error, Debug)]
pub enum AllocationError {
    // ===== 外部协作方错误 =====
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    // ===== 输入错误 =====
    #[error("需求行无效: {0}")]
    InvalidDemand(#[from] DemandError),

    // ===== 规则选择错误 =====
    #[error("未找到可用规则: product_id={product_id}, location_id={location_id}")]
    NoRuleFound { product_id: i64, location_id: i64 },

    #[error("缺口再派发层级超限: depth={depth}, max={max}")]
    RedispatchDepthExceeded { depth: usize, max: usize },

    // ===== 跟踪器不变量 =====
    #[error("可用量透支: product_id={product_id}, location_id={location_id}, requested={requested}, remaining={remaining}")]
    TrackerOverdraw {
        product_id: i64,
        location_id: i64,
        requested: f64,
        remaining: f64,
    },

    #[error("批量确认条数不符: expected={expected}, confirmed={confirmed}")]
    ConfirmMismatch { expected: usize, confirmed: usize },
}

/// Result 类型别名
pub type AllocationResult<T> = Result<T, AllocationError>;
