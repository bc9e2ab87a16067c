// ==========================================
// 库存拉式补货 - 库存移动领域模型
// ==========================================
// 生命周期: StockMoveValues -> (create) DRAFT -> (批量确认) CONFIRMED
// ==========================================

use crate::domain::types::{MoveState, ProcureMethod};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// StockMoveValues - 待创建的库存移动
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockMoveValues {
    pub product_id: i64,
    pub product_qty: f64,
    pub product_uom: String,
    pub location_id: i64,      // 来源库位
    pub location_dest_id: i64, // 目的库位 (需求库位)
    pub name: String,
    pub origin: Option<String>,
    pub company_id: i64,
    pub procure_method: ProcureMethod,
    pub rule_id: Option<i64>,
    pub sale_line_id: Option<i64>,
    pub move_orig_id: Option<i64>,
    pub date_planned: Option<NaiveDateTime>,
}

// ==========================================
// StockMove - 已持久化的库存移动
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockMove {
    pub move_id: i64,
    #[serde(flatten)]
    pub values: StockMoveValues,
    pub state: MoveState,
    pub create_date: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
}

impl StockMove {
    pub fn is_confirmed(&self) -> bool {
        self.state == MoveState::Confirmed
    }
}
