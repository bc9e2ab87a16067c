// ==========================================
// 库存拉式补货 - 缺口再派发
// ==========================================
// 职责: 将未满足部分构造为新需求，排除当前规则后重新派发
// 约束:
// - 排除集每层只追加一个规则
// - 不强制补货方式
// - 找不到规则时静默（raise_user_error = false）
// - 同一个上下文（跟踪器）向下传递
// ==========================================

use crate::domain::demand::DemandLine;
use crate::domain::pool::PoolKey;
use crate::domain::rule::StockRule;
use crate::engine::context::AllocationContext;
use crate::engine::error::AllocationResult;
use crate::engine::outcome::{ProcurementOutcome, ShortfallRecord};
use crate::engine::ports::RuleDispatcher;

pub struct ShortfallRedispatcher {
    // 无状态
}

impl ShortfallRedispatcher {
    pub fn new() -> Self {
        Self {}
    }

    /// 构造缺口需求
    pub fn build_request(
        &self,
        demand: &DemandLine,
        rule: &StockRule,
        shortfall_qty: f64,
    ) -> AllocationResult<DemandLine> {
        debug_assert!(
            !demand.values.excludes(rule.rule_id),
            "rule {} was selected although excluded",
            rule.rule_id
        );
        Ok(demand.shortfall(shortfall_qty, rule.rule_id)?)
    }

    /// 同步递归派发缺口
    pub fn redispatch(
        &self,
        ctx: &mut AllocationContext,
        dispatcher: &dyn RuleDispatcher,
        pool: PoolKey,
        demand: &DemandLine,
        rule: &StockRule,
        shortfall_qty: f64,
    ) -> AllocationResult<ProcurementOutcome> {
        let request = self.build_request(demand, rule, shortfall_qty)?;

        tracing::debug!(
            pool = %pool,
            rule_id = rule.rule_id,
            shortfall = shortfall_qty,
            excluded = ?request.values.rules_to_exclude,
            depth = ctx.depth(),
            "缺口再派发"
        );

        let record = ShortfallRecord {
            pool,
            from_rule_id: rule.rule_id,
            depth: ctx.depth(),
            demand: request.clone(),
        };

        let nested = dispatcher.run(ctx, vec![request], false)?;

        let mut outcome = ProcurementOutcome::default();
        outcome.shortfalls.push(record);
        outcome.merge(nested);
        Ok(outcome)
    }
}
