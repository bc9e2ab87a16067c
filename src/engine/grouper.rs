// ==========================================
// 库存拉式补货 - 需求分组
// ==========================================
// 职责:
// 1) 按规则补货方式拆分: 共享库存池 vs 标准路径
// 2) 共享库存池部分按 (产品, 规则来源库位) 分组
// 顺序: 库存池按首次出现顺序，池内保持输入顺序
// ==========================================

use crate::domain::demand::DemandLine;
use crate::domain::pool::PoolKey;
use crate::domain::rule::StockRule;
use std::collections::HashMap;

/// 拆分结果
#[derive(Debug, Default)]
pub struct PartitionedDemands {
    pub shared_pool: Vec<(DemandLine, StockRule)>,
    pub standard: Vec<(DemandLine, StockRule)>,
}

/// 一个库存池内竞争同一可用量的需求
#[derive(Debug)]
pub struct DemandPool {
    pub key: PoolKey,
    pub lines: Vec<(DemandLine, StockRule)>,
}

// ==========================================
// DemandGrouper - 需求分组
// ==========================================
pub struct DemandGrouper {
    // 无状态，纯分组
}

impl DemandGrouper {
    pub fn new() -> Self {
        Self {}
    }

    /// 按规则补货方式拆分（保持各自的输入顺序）
    pub fn partition(&self, pairs: Vec<(DemandLine, StockRule)>) -> PartitionedDemands {
        let mut partitioned = PartitionedDemands::default();
        for (demand, rule) in pairs {
            if rule.procure_method.is_shared_pool() {
                partitioned.shared_pool.push((demand, rule));
            } else {
                partitioned.standard.push((demand, rule));
            }
        }
        partitioned
    }

    /// 按库存池分组
    pub fn group_by_pool(&self, pairs: Vec<(DemandLine, StockRule)>) -> Vec<DemandPool> {
        let mut pools: Vec<DemandPool> = Vec::new();
        let mut index: HashMap<PoolKey, usize> = HashMap::new();

        for (demand, rule) in pairs {
            let key = PoolKey::new(demand.product_id, rule.location_src_id);
            let slot = *index.entry(key).or_insert_with(|| {
                pools.push(DemandPool {
                    key,
                    lines: Vec::new(),
                });
                pools.len() - 1
            });
            pools[slot].lines.push((demand, rule));
        }

        pools
    }
}
