// ==========================================
// 库存拉式补货 - 库位领域模型
// ==========================================
// 库位为树形结构: 规则查找向上回溯，可用量向下汇总
// ==========================================

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLocation {
    pub location_id: i64,
    pub name: String,
    pub parent_id: Option<i64>,
}
