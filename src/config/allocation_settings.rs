// ==========================================
// 库存拉式补货 - 分配参数快照
// ==========================================
// 每次运行加载一次，分配路径本身同步执行
// ==========================================

use crate::config::allocation_config_trait::{AllocationConfigReader, ConfigResult};
use serde::{Deserialize, Serialize};

pub const DEFAULT_UOM_PRECISION_DIGITS: u32 = 3;
pub const MAX_UOM_PRECISION_DIGITS: u32 = 10;
pub const DEFAULT_MAX_REDISPATCH_DEPTH: usize = 32;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationSettings {
    pub precision_digits: u32,
    pub max_redispatch_depth: usize,
    pub raise_user_error: bool,
}

impl Default for AllocationSettings {
    fn default() -> Self {
        Self {
            precision_digits: DEFAULT_UOM_PRECISION_DIGITS,
            max_redispatch_depth: DEFAULT_MAX_REDISPATCH_DEPTH,
            raise_user_error: false,
        }
    }
}

/// 从配置读取器加载分配参数
pub async fn load_allocation_settings(
    reader: &dyn AllocationConfigReader,
) -> ConfigResult<AllocationSettings> {
    let settings = AllocationSettings {
        precision_digits: reader.get_uom_precision_digits().await?,
        max_redispatch_depth: reader.get_max_redispatch_depth().await?,
        raise_user_error: reader.get_raise_user_error().await?,
    };

    tracing::debug!(?settings, "分配参数已加载");
    Ok(settings)
}
