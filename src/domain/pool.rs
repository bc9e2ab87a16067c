// ==========================================
// 库存拉式补货 - 库存池键
// ==========================================
// 同一 (产品, 来源库位) 下的所有需求竞争同一份可用量
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PoolKey {
    pub product_id: i64,
    pub location_src_id: i64,
}

impl PoolKey {
    pub fn new(product_id: i64, location_src_id: i64) -> Self {
        Self {
            product_id,
            location_src_id,
        }
    }
}

impl fmt::Display for PoolKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "product={}@location={}", self.product_id, self.location_src_id)
    }
}
