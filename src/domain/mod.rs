// ==========================================
// 库存拉式补货 - 领域模型层
// ==========================================
// 职责: 定义需求行、规则、库位、库存移动、库存池键
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod demand;
pub mod location;
pub mod pool;
pub mod rule;
pub mod stock_move;
pub mod types;

// 重导出核心类型
pub use demand::{DemandError, DemandLine, DemandRecord, DemandValues};
pub use location::StockLocation;
pub use pool::PoolKey;
pub use rule::StockRule;
pub use stock_move::{StockMove, StockMoveValues};
pub use types::{MoveState, ProcureMethod};
