// ==========================================
// 库存拉式补货 - 引擎层外部协作接口
// ==========================================
// 说明: Engine 层定义 trait，Repository 层实现
// 红线: Engine 不拼 SQL
// ==========================================

use crate::domain::demand::DemandLine;
use crate::domain::rule::StockRule;
use crate::domain::stock_move::{StockMove, StockMoveValues};
use crate::engine::context::AllocationContext;
use crate::engine::error::AllocationResult;
use crate::engine::outcome::ProcurementOutcome;
use crate::repository::error::RepositoryResult;

/// 可用量来源（权威库存）
///
/// 每个事务内每个库存池最多查询一次，由 AvailabilityTracker 保证。
pub trait InventorySource: Send + Sync {
    fn available_quantity(&self, product_id: i64, location_id: i64) -> RepositoryResult<f64>;
}

/// 库存移动存储
pub trait MoveStore: Send + Sync {
    /// 创建单条移动（DRAFT）
    fn create(&self, values: StockMoveValues) -> RepositoryResult<StockMove>;

    /// 批量确认，返回实际确认条数
    fn confirm_batch(&self, move_ids: &[i64]) -> RepositoryResult<usize>;
}

/// 规则查找过滤条件
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleFilter {
    pub exclude_rule_ids: Vec<i64>,
    pub company_id: Option<i64>,
}

impl RuleFilter {
    pub fn for_demand(demand: &DemandLine) -> Self {
        Self {
            exclude_rule_ids: demand.values.rules_to_exclude.clone(),
            company_id: Some(demand.company_id),
        }
    }

    /// 规则是否通过过滤（排除集 + 公司）
    pub fn accepts(&self, rule: &StockRule) -> bool {
        if self.exclude_rule_ids.contains(&rule.rule_id) {
            return false;
        }
        match (self.company_id, rule.company_id) {
            (Some(wanted), Some(owner)) => wanted == owner,
            _ => true,
        }
    }
}

/// 规则来源
pub trait RuleSource: Send + Sync {
    /// 查找需求库位适用的第一条规则（不含被排除的规则）
    fn find_rule(
        &self,
        product_id: i64,
        location_id: i64,
        filter: &RuleFilter,
    ) -> RepositoryResult<Option<StockRule>>;
}

/// 规则派发入口（缺口再派发时递归调用）
pub trait RuleDispatcher {
    fn run(
        &self,
        ctx: &mut AllocationContext,
        demands: Vec<DemandLine>,
        raise_user_error: bool,
    ) -> AllocationResult<ProcurementOutcome>;
}
