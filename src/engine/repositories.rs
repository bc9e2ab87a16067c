// ==========================================
// 库存拉式补货 - 引擎层仓储聚合
// ==========================================
// 职责: 聚合分配引擎所需的外部协作方
// ==========================================

use std::sync::Arc;

use crate::engine::ports::{InventorySource, MoveStore, RuleSource};

/// 分配引擎仓储集合
///
/// 将规则来源、可用量来源、移动存储合并为一个参数，
/// 便于单元测试时整体替换为内存实现。
#[derive(Clone)]
pub struct StockRepositories {
    /// 规则来源
    pub rule_source: Arc<dyn RuleSource>,
    /// 可用量来源
    pub inventory: Arc<dyn InventorySource>,
    /// 移动存储
    pub moves: Arc<dyn MoveStore>,
}

impl StockRepositories {
    /// 创建新的仓储集合
    pub fn new(
        rule_source: Arc<dyn RuleSource>,
        inventory: Arc<dyn InventorySource>,
        moves: Arc<dyn MoveStore>,
    ) -> Self {
        Self {
            rule_source,
            inventory,
            moves,
        }
    }

    /// 获取规则来源
    pub fn rule_source(&self) -> &dyn RuleSource {
        self.rule_source.as_ref()
    }

    /// 获取可用量来源
    pub fn inventory(&self) -> &dyn InventorySource {
        self.inventory.as_ref()
    }

    /// 获取移动存储
    pub fn moves(&self) -> &dyn MoveStore {
        self.moves.as_ref()
    }
}
