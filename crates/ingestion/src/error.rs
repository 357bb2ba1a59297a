//! Ingestion 错误类型

use thiserror::Error;

/// Ingestion 错误
#[derive(Debug, Error)]
pub enum IngestionError {
    /// 监听地址绑定失败
    #[error("failed to bind collector on {addr}: {source}")]
    Bind {
        /// 监听地址
        addr: String,
        /// 底层 IO 错误
        #[source]
        source: std::io::Error,
    },

    /// 接收数据报失败 (致命，采集循环退出)
    #[error("socket receive failed: {0}")]
    Receive(#[source] std::io::Error),

    /// 无法读取本地地址
    #[error("failed to read local address: {0}")]
    LocalAddr(#[source] std::io::Error),
}

/// Ingestion Result 类型别名
pub type Result<T> = std::result::Result<T, IngestionError>;
