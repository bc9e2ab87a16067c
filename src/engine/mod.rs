// ==========================================
// 库存拉式补货 - 引擎层
// ==========================================
// 职责: 规则派发、共享库存池顺序分配、缺口再派发
// 红线: Engine 不拼 SQL，外部协作方通过 ports 注入
// ==========================================

pub mod allocator;
pub mod confirmer;
pub mod context;
pub mod error;
pub mod grouper;
pub mod outcome;
pub mod ports;
pub mod precision;
pub mod priority;
pub mod procurement;
pub mod redispatch;
pub mod repositories;
pub mod standard_pull;
pub mod tracker;

#[cfg(test)]
pub(crate) mod test_support;

// 重导出核心引擎
pub use allocator::SharedPoolAllocator;
pub use confirmer::BatchConfirmer;
pub use context::AllocationContext;
pub use error::{AllocationError, AllocationResult};
pub use grouper::{DemandGrouper, DemandPool, PartitionedDemands};
pub use outcome::{ProcurementOutcome, ShortfallRecord};
pub use ports::{InventorySource, MoveStore, RuleDispatcher, RuleFilter, RuleSource};
pub use priority::PrioritySorter;
pub use procurement::ProcurementEngine;
pub use redispatch::ShortfallRedispatcher;
pub use repositories::StockRepositories;
pub use standard_pull::StandardPull;
pub use tracker::AvailabilityTracker;
