// ==========================================
// 库存拉式补货 - 库存池内排序
// ==========================================
// 职责: 库存不足时决定谁先被满足
// 排序键: (来源单据行, 来源移动) 升序，缺失按 0
// 红线: 必须稳定排序，完全相同的键保持原相对顺序
// ==========================================

use crate::domain::demand::DemandLine;
use crate::domain::rule::StockRule;

// ==========================================
// PrioritySorter - 库存池内排序
// ==========================================
pub struct PrioritySorter {
    // 无状态引擎,不需要注入依赖
}

impl PrioritySorter {
    /// 构造函数
    pub fn new() -> Self {
        Self {}
    }

    /// 排序库存池内的需求
    ///
    /// # 返回
    /// 排序后的需求列表（先满足者在前）
    pub fn sort(&self, mut lines: Vec<(DemandLine, StockRule)>) -> Vec<(DemandLine, StockRule)> {
        // sort_by_key 是稳定排序
        lines.sort_by_key(|(demand, _)| demand.values.priority_key());
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::ProcureMethod;
    use crate::engine::test_support::{demand, rule, STOCK_LOC};

    fn qtys(lines: &[(DemandLine, StockRule)]) -> Vec<f64> {
        lines.iter().map(|(d, _)| d.product_qty).collect()
    }

    #[test]
    fn test_sort_by_sale_line_then_stock_move() {
        let sorter = PrioritySorter::new();
        let r = rule(1, STOCK_LOC, ProcureMethod::MtsElseTransferNeed, 10);

        let sorted = sorter.sort(vec![
            (demand(1, 1.0, Some(3), Some(1)), r.clone()),
            (demand(1, 2.0, Some(2), Some(9)), r.clone()),
            (demand(1, 3.0, Some(2), Some(4)), r.clone()),
        ]);

        assert_eq!(qtys(&sorted), vec![3.0, 2.0, 1.0]);
    }

    #[test]
    fn test_missing_refs_sort_first() {
        let sorter = PrioritySorter::new();
        let r = rule(1, STOCK_LOC, ProcureMethod::MtsElseTransferNeed, 10);

        let sorted = sorter.sort(vec![
            (demand(1, 1.0, Some(1), None), r.clone()),
            (demand(1, 2.0, None, Some(5)), r.clone()),
            (demand(1, 3.0, None, None), r.clone()),
        ]);

        // (0,0) < (0,5) < (1,0)
        assert_eq!(qtys(&sorted), vec![3.0, 2.0, 1.0]);
    }

    #[test]
    fn test_sort_is_stable_for_equal_keys() {
        let sorter = PrioritySorter::new();
        let r = rule(1, STOCK_LOC, ProcureMethod::MtsElseTransferNeed, 10);

        let sorted = sorter.sort(vec![
            (demand(1, 5.0, Some(2), None), r.clone()),
            (demand(1, 6.0, None, None), r.clone()),
            (demand(1, 7.0, Some(2), None), r.clone()),
            (demand(1, 8.0, None, None), r.clone()),
        ]);

        assert_eq!(qtys(&sorted), vec![6.0, 8.0, 5.0, 7.0]);
    }
}
