// ==========================================
// 库存拉式补货 - 规则派发引擎
// ==========================================
// 职责:
// 1) 按需求库位查找规则（排除集作为显式过滤条件）
// 2) 共享库存池规则交给 SharedPoolAllocator，其余走标准路径
// 3) 作为 RuleDispatcher 接收缺口再派发（同步递归）
// 递归上界: 每层排除一个规则，受 (产品, 库位) 可达规则数限制；
//           另有 max_redispatch_depth 兜底
// ==========================================

use crate::domain::demand::DemandLine;
use crate::engine::allocator::SharedPoolAllocator;
use crate::engine::context::AllocationContext;
use crate::engine::error::{AllocationError, AllocationResult};
use crate::engine::grouper::DemandGrouper;
use crate::engine::outcome::ProcurementOutcome;
use crate::engine::ports::{RuleDispatcher, RuleFilter};
use crate::engine::precision::float_is_zero;
use crate::engine::repositories::StockRepositories;
use crate::engine::standard_pull::StandardPull;
use tracing::instrument;

// ==========================================
// ProcurementEngine - 规则派发引擎
// ==========================================
pub struct ProcurementEngine {
    repos: StockRepositories,
    grouper: DemandGrouper,
    standard: StandardPull,
    allocator: SharedPoolAllocator,
}

impl ProcurementEngine {
    pub fn new(repos: StockRepositories) -> Self {
        Self {
            allocator: SharedPoolAllocator::new(repos.clone()),
            standard: StandardPull::new(),
            grouper: DemandGrouper::new(),
            repos,
        }
    }

    /// 派发一批需求
    ///
    /// # 参数
    /// - `ctx`: 事务上下文，同一事务内的多次调用必须传入同一个
    /// - `demands`: 需求行
    /// - `raise_user_error`: 找不到规则时是否报错（否则记入 unfulfilled）
    #[instrument(skip_all, fields(
        tx = %ctx.transaction_id,
        depth = ctx.depth() + 1,
        demands = demands.len()
    ))]
    pub fn run(
        &self,
        ctx: &mut AllocationContext,
        demands: Vec<DemandLine>,
        raise_user_error: bool,
    ) -> AllocationResult<ProcurementOutcome> {
        ctx.enter()?;
        let result = self.run_at_depth(ctx, demands, raise_user_error);
        ctx.leave();
        result
    }

    fn run_at_depth(
        &self,
        ctx: &mut AllocationContext,
        demands: Vec<DemandLine>,
        raise_user_error: bool,
    ) -> AllocationResult<ProcurementOutcome> {
        let precision = ctx.precision_digits();
        let mut outcome = ProcurementOutcome::default();
        let mut pairs = Vec::with_capacity(demands.len());

        for demand in demands {
            demand.validate()?;
            if float_is_zero(demand.product_qty, precision) {
                tracing::debug!(product_id = demand.product_id, "零数量需求，跳过");
                continue;
            }

            let filter = RuleFilter::for_demand(&demand);
            let rule = self
                .repos
                .rule_source()
                .find_rule(demand.product_id, demand.location_id, &filter)?;

            match rule {
                Some(rule) => pairs.push((demand, rule)),
                None if raise_user_error => {
                    return Err(AllocationError::NoRuleFound {
                        product_id: demand.product_id,
                        location_id: demand.location_id,
                    });
                }
                None => {
                    tracing::warn!(
                        product_id = demand.product_id,
                        location_id = demand.location_id,
                        qty = demand.product_qty,
                        excluded = ?filter.exclude_rule_ids,
                        "未找到可用规则，需求不再继续补货"
                    );
                    outcome.unfulfilled.push(demand);
                }
            }
        }

        let parts = self.grouper.partition(pairs);

        if !parts.standard.is_empty() {
            let standard = self.standard.run_pull(self.repos.moves(), parts.standard)?;
            outcome.merge(standard);
        }

        if !parts.shared_pool.is_empty() {
            let allocated = self.allocator.run_pull(ctx, parts.shared_pool, self)?;
            outcome.merge(allocated);
        }

        Ok(outcome)
    }
}

impl RuleDispatcher for ProcurementEngine {
    fn run(
        &self,
        ctx: &mut AllocationContext,
        demands: Vec<DemandLine>,
        raise_user_error: bool,
    ) -> AllocationResult<ProcurementOutcome> {
        ProcurementEngine::run(self, ctx, demands, raise_user_error)
    }
}
