// ==========================================
// 库存拉式补货 - 库存规则领域模型
// ==========================================
// 职责: 拉式规则定义 + 构造库存移动值
// 红线: 分配期间只读，按 rule_id 唯一识别 (用于排除集)
// ==========================================

use crate::domain::demand::DemandLine;
use crate::domain::stock_move::StockMoveValues;
use crate::domain::types::ProcureMethod;
use serde::{Deserialize, Serialize};

// ==========================================
// StockRule - 库存拉式规则
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockRule {
    pub rule_id: i64,
    pub name: String,
    pub location_src_id: i64,  // 来源库位 (库存池所在)
    pub location_dest_id: i64, // 目的库位 (规则匹配的需求库位)
    pub procure_method: ProcureMethod,
    pub sequence: i32,
    pub route_sequence: i32,
    pub company_id: Option<i64>,
    pub active: bool,
}

impl StockRule {
    /// 构造库存移动值
    ///
    /// # 参数
    /// - `demand`: 需求行 (提供产品/单位/名称/来源/公司/属性)
    /// - `product_qty`: 本次移动数量 (可能小于需求数量)
    ///
    /// # 说明
    /// - 来源为规则的来源库位，目的地为需求库位
    /// - 补货方式默认取规则自身，需求强制补货方式时以需求为准
    pub fn stock_move_values(&self, demand: &DemandLine, product_qty: f64) -> StockMoveValues {
        StockMoveValues {
            product_id: demand.product_id,
            product_qty,
            product_uom: demand.product_uom.clone(),
            location_id: self.location_src_id,
            location_dest_id: demand.location_id,
            name: demand.name.clone(),
            origin: demand.origin.clone(),
            company_id: demand.company_id,
            procure_method: demand.values.procure_method.unwrap_or(self.procure_method),
            rule_id: Some(self.rule_id),
            sale_line_id: demand.values.sale_line_id,
            move_orig_id: demand.values.stock_move_id,
            date_planned: demand.values.date_planned,
        }
    }
}
