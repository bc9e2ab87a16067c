// ==========================================
// 库存拉式补货 - 仓储层错误类型
// ==========================================
// 仓储错误一律向上传播到事务边界，不在本层重试
// ==========================================

use rusqlite::ErrorCode;
use thiserror::Error;

/// 仓储层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("数据库锁获取失败: {0}")]
    LockError(String),

    #[error("数据库查询失败: {0}")]
    DatabaseQueryError(String),

    // ===== 约束 =====
    #[error("唯一约束违反: {0}")]
    UniqueConstraintViolation(String),

    #[error("外键约束违反 (库位或规则不存在): {0}")]
    ForeignKeyViolation(String),

    // ===== 数据质量 =====
    #[error("字段值错误 (field={field}): {message}")]
    FieldValueError { field: String, message: String },

    #[error("第 {column} 列无法解码: {message}")]
    RowDecodeError { column: usize, message: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(code, msg) if code.code == ErrorCode::ConstraintViolation => {
                let msg = msg.unwrap_or_else(|| code.to_string());
                if msg.contains("FOREIGN KEY") {
                    RepositoryError::ForeignKeyViolation(msg)
                } else {
                    RepositoryError::UniqueConstraintViolation(msg)
                }
            }
            rusqlite::Error::FromSqlConversionFailure(column, _, cause) => {
                RepositoryError::RowDecodeError {
                    column,
                    message: cause.to_string(),
                }
            }
            other => RepositoryError::DatabaseQueryError(other.to_string()),
        }
    }
}

/// Result 类型别名
pub type RepositoryResult<T> = Result<T, RepositoryError>;
