// ==========================================
// 库存拉式补货 - 标准拉式路径
// ==========================================
// 非共享库存池规则: 整量生成移动，按规则（或需求强制）补货方式
// 不读取、不修改跟踪器
// ==========================================

use crate::domain::demand::DemandLine;
use crate::domain::rule::StockRule;
use crate::engine::confirmer::BatchConfirmer;
use crate::engine::error::AllocationResult;
use crate::engine::outcome::ProcurementOutcome;
use crate::engine::ports::MoveStore;
use tracing::instrument;

pub struct StandardPull {
    confirmer: BatchConfirmer,
}

impl StandardPull {
    pub fn new() -> Self {
        Self {
            confirmer: BatchConfirmer::new(),
        }
    }

    #[instrument(skip(self, store, pairs), fields(lines = pairs.len()))]
    pub fn run_pull(
        &self,
        store: &dyn MoveStore,
        pairs: Vec<(DemandLine, StockRule)>,
    ) -> AllocationResult<ProcurementOutcome> {
        let mut created = Vec::with_capacity(pairs.len());
        for (demand, rule) in &pairs {
            let values = rule.stock_move_values(demand, demand.product_qty);
            created.push(store.create(values)?);
        }

        self.confirmer.confirm(store, &mut created)?;

        Ok(ProcurementOutcome {
            moves: created,
            ..Default::default()
        })
    }
}
