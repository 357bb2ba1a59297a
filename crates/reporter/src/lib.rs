//! # Reporter
//!
//! 周期报告模块。
//!
//! 负责：
//! - 按固定间隔从 `CounterStore` 取 top-K 报告
//! - 可选地在报告后清零计数 (滚动窗口)
//! - Fan-out 到多个 sinks，慢 sink 不阻塞报告循环
//! - 停止时输出最后一份报告

pub mod error;
pub mod handle;
pub mod metrics;
pub mod reporter;
pub mod sinks;

pub use contracts::{ReportSink, TalkerReport};
pub use error::ReporterError;
pub use handle::SinkHandle;
pub use metrics::{SinkMetrics, SinkStats};
pub use reporter::{create_reporter, Reporter};
pub use sinks::{FileSink, LogSink};
