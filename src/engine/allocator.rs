// ==========================================
// 库存拉式补货 - 共享库存池顺序分配
// ==========================================
// 输入: 补货方式为 MTS_ELSE_TRANSFER_NEED 的 (需求, 规则)
// 流程: 分组 -> 池内排序 -> 逐行扣减跟踪器 -> 缺口再派发 -> 批量确认
// 红线:
// - 每行取 min(需求, 剩余)，满足部分强制 MAKE_TO_STOCK
// - 扣减立即写回跟踪器（同池后续行、后续派发都可见）
// - 缺口排除当前规则后递归派发，同一跟踪器向下传递
// ==========================================

use crate::domain::demand::DemandLine;
use crate::domain::rule::StockRule;
use crate::domain::stock_move::StockMove;
use crate::domain::types::ProcureMethod;
use crate::engine::confirmer::BatchConfirmer;
use crate::engine::context::AllocationContext;
use crate::engine::error::AllocationResult;
use crate::engine::grouper::{DemandGrouper, DemandPool};
use crate::engine::outcome::ProcurementOutcome;
use crate::engine::ports::RuleDispatcher;
use crate::engine::precision::{float_is_zero, float_round};
use crate::engine::priority::PrioritySorter;
use crate::engine::redispatch::ShortfallRedispatcher;
use crate::engine::repositories::StockRepositories;
use tracing::instrument;

// ==========================================
// SharedPoolAllocator - 共享库存池分配引擎
// ==========================================
pub struct SharedPoolAllocator {
    repos: StockRepositories,
    grouper: DemandGrouper,
    sorter: PrioritySorter,
    redispatcher: ShortfallRedispatcher,
    confirmer: BatchConfirmer,
}

impl SharedPoolAllocator {
    pub fn new(repos: StockRepositories) -> Self {
        Self {
            repos,
            grouper: DemandGrouper::new(),
            sorter: PrioritySorter::new(),
            redispatcher: ShortfallRedispatcher::new(),
            confirmer: BatchConfirmer::new(),
        }
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 分配一批共享库存池需求
    ///
    /// # 参数
    /// - `ctx`: 事务上下文（跟踪器）
    /// - `pairs`: (需求, 规则)，规则均为共享库存池规则
    /// - `dispatcher`: 缺口再派发入口
    ///
    /// # 返回
    /// 本层创建并确认的移动 + 嵌套再派发的结果
    #[instrument(skip_all, fields(
        tx = %ctx.transaction_id,
        depth = ctx.depth(),
        lines = pairs.len()
    ))]
    pub fn run_pull(
        &self,
        ctx: &mut AllocationContext,
        pairs: Vec<(DemandLine, StockRule)>,
        dispatcher: &dyn RuleDispatcher,
    ) -> AllocationResult<ProcurementOutcome> {
        let mut pending = Vec::new();
        let mut outcome = ProcurementOutcome::default();

        for pool in self.grouper.group_by_pool(pairs) {
            let nested = self.allocate_pool(ctx, pool, dispatcher, &mut pending)?;
            outcome.merge(nested);
        }

        let confirmed = self.confirmer.confirm(self.repos.moves(), &mut pending)?;
        tracing::debug!(confirmed, nested = outcome.moves.len(), "本层移动已确认");

        // 本层移动排在嵌套结果之前
        pending.extend(std::mem::take(&mut outcome.moves));
        outcome.moves = pending;
        Ok(outcome)
    }

    /// 分配单个库存池
    fn allocate_pool(
        &self,
        ctx: &mut AllocationContext,
        pool: DemandPool,
        dispatcher: &dyn RuleDispatcher,
        pending: &mut Vec<StockMove>,
    ) -> AllocationResult<ProcurementOutcome> {
        let precision = ctx.precision_digits();
        let key = pool.key;
        let mut outcome = ProcurementOutcome::default();

        let initial = ctx.tracker.get_or_init(key, self.repos.inventory())?;
        let mut taken_total = 0.0;
        let mut shortfall_total = 0.0;

        for (demand, rule) in self.sorter.sort(pool.lines) {
            // 每行重新读取跟踪器: 前一行的缺口再派发可能已消耗同一库存池
            let available = ctx.tracker.get_or_init(key, self.repos.inventory())?;

            let qty_to_take = demand.product_qty.min(available);
            let qty_shortfall = float_round(demand.product_qty - qty_to_take, precision);

            if !float_is_zero(qty_to_take, precision) {
                let mut values = rule.stock_move_values(&demand, qty_to_take);
                values.procure_method = ProcureMethod::MakeToStock;
                pending.push(self.repos.moves().create(values)?);

                let remaining = ctx.tracker.consume(key, qty_to_take)?;
                taken_total += qty_to_take;

                tracing::debug!(
                    pool = %key,
                    sale_line_id = ?demand.values.sale_line_id,
                    taken = qty_to_take,
                    remaining,
                    "从库存满足"
                );
            }

            if !float_is_zero(qty_shortfall, precision) {
                shortfall_total += qty_shortfall;
                let nested = self.redispatcher.redispatch(
                    ctx,
                    dispatcher,
                    key,
                    &demand,
                    &rule,
                    qty_shortfall,
                )?;
                outcome.merge(nested);
            }
        }

        tracing::info!(
            pool = %key,
            initial,
            taken = taken_total,
            shortfall = shortfall_total,
            remaining = ?ctx.tracker.remaining(key),
            "库存池分配完成"
        );

        Ok(outcome)
    }
}
