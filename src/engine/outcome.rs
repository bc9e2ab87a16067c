// ==========================================
// 库存拉式补货 - 派发结果
// ==========================================
// 逐层合并: 嵌套再派发的结果并入上层
// ==========================================

use crate::domain::demand::DemandLine;
use crate::domain::pool::PoolKey;
use crate::domain::stock_move::StockMove;
use serde::Serialize;

/// 缺口再派发记录
#[derive(Debug, Clone, Serialize)]
pub struct ShortfallRecord {
    pub pool: PoolKey,
    pub from_rule_id: i64,
    pub depth: usize,
    pub demand: DemandLine, // 再派发的新需求（数量 = 缺口）
}

/// 一次派发（含嵌套再派发）的结果
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProcurementOutcome {
    pub moves: Vec<StockMove>,
    pub shortfalls: Vec<ShortfallRecord>,
    pub unfulfilled: Vec<DemandLine>,
}

impl ProcurementOutcome {
    pub fn merge(&mut self, other: ProcurementOutcome) {
        self.moves.extend(other.moves);
        self.shortfalls.extend(other.shortfalls);
        self.unfulfilled.extend(other.unfulfilled);
    }

    /// 某库存池已创建的移动数量合计
    pub fn moved_qty(&self, pool: PoolKey) -> f64 {
        self.moves
            .iter()
            .filter(|m| PoolKey::new(m.values.product_id, m.values.location_id) == pool)
            .map(|m| m.values.product_qty)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty() && self.shortfalls.is_empty() && self.unfulfilled.is_empty()
    }
}
