// ==========================================
// 库存拉式补货 - 分配上下文
// ==========================================
// 事务级共享状态: 跟踪器 + 再派发层级
// 红线: 必须显式传递到每一次（含递归）派发，不得从全局重新获取
// ==========================================

use crate::config::AllocationSettings;
use crate::engine::error::{AllocationError, AllocationResult};
use crate::engine::tracker::AvailabilityTracker;
use uuid::Uuid;

pub struct AllocationContext {
    pub transaction_id: Uuid,
    pub tracker: AvailabilityTracker,
    settings: AllocationSettings,
    depth: usize,
}

impl AllocationContext {
    pub fn new(settings: AllocationSettings) -> Self {
        Self {
            transaction_id: Uuid::new_v4(),
            tracker: AvailabilityTracker::new(settings.precision_digits),
            settings,
            depth: 0,
        }
    }

    pub fn precision_digits(&self) -> u32 {
        self.settings.precision_digits
    }

    /// 当前派发层级（顶层为 1）
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// 进入一层派发
    pub fn enter(&mut self) -> AllocationResult<()> {
        let next = self.depth + 1;
        if next > self.settings.max_redispatch_depth {
            return Err(AllocationError::RedispatchDepthExceeded {
                depth: next,
                max: self.settings.max_redispatch_depth,
            });
        }
        self.depth = next;
        Ok(())
    }

    /// 离开一层派发
    pub fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}
