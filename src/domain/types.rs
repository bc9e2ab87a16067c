// ==========================================
// 库存拉式补货 - 领域类型定义
// ==========================================
// 职责: 补货方式、库存移动状态等枚举
// 序列化格式: SCREAMING_SNAKE_CASE (与数据库一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 补货方式 (Procure Method)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcureMethod {
    MakeToStock,         // 从库存取
    MakeToOrder,         // 按单触发上游补货
    MtsElseTransferNeed, // 先从库存取，不足部分转交下一条规则
}

impl ProcureMethod {
    /// 数据库/JSON 中使用的字符串标识
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcureMethod::MakeToStock => "MAKE_TO_STOCK",
            ProcureMethod::MakeToOrder => "MAKE_TO_ORDER",
            ProcureMethod::MtsElseTransferNeed => "MTS_ELSE_TRANSFER_NEED",
        }
    }

    /// 是否走共享库存池分配
    pub fn is_shared_pool(&self) -> bool {
        matches!(self, ProcureMethod::MtsElseTransferNeed)
    }
}

impl fmt::Display for ProcureMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ProcureMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "MAKE_TO_STOCK" => Ok(ProcureMethod::MakeToStock),
            "MAKE_TO_ORDER" => Ok(ProcureMethod::MakeToOrder),
            "MTS_ELSE_TRANSFER_NEED" => Ok(ProcureMethod::MtsElseTransferNeed),
            other => Err(format!("未知的补货方式: {}", other)),
        }
    }
}

// ==========================================
// 库存移动状态 (Move State)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MoveState {
    Draft,     // 已创建，未确认
    Confirmed, // 已批量确认
}

impl MoveState {
    pub fn as_str(&self) -> &'static str {
        match self {
            MoveState::Draft => "DRAFT",
            MoveState::Confirmed => "CONFIRMED",
        }
    }
}

impl fmt::Display for MoveState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MoveState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "DRAFT" => Ok(MoveState::Draft),
            "CONFIRMED" => Ok(MoveState::Confirmed),
            other => Err(format!("未知的移动状态: {}", other)),
        }
    }
}
