//! 配置校验模块
//!
//! 校验规则：
//! - collector.buffer_size > 0
//! - reporting.interval_secs > 0, reporting.top_k > 0
//! - sink 名称非空且唯一
//! - file sink 必须提供 path 参数
//! - sink queue_capacity > 0

use std::collections::HashSet;

use contracts::{ContractError, FlowsightConfig, SinkType};

/// 校验 FlowsightConfig 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(config: &FlowsightConfig) -> Result<(), ContractError> {
    validate_collector(config)?;
    validate_reporting(config)?;
    validate_sinks(config)?;
    Ok(())
}

/// 校验采集器配置
fn validate_collector(config: &FlowsightConfig) -> Result<(), ContractError> {
    let collector = &config.collector;
    if collector.host.trim().is_empty() {
        return Err(ContractError::config_validation(
            "collector.host",
            "host cannot be empty",
        ));
    }
    if collector.buffer_size == 0 {
        return Err(ContractError::config_validation(
            "collector.buffer_size",
            "buffer_size must be > 0",
        ));
    }
    Ok(())
}

/// 校验报告配置
fn validate_reporting(config: &FlowsightConfig) -> Result<(), ContractError> {
    let reporting = &config.reporting;
    if reporting.interval_secs == 0 {
        return Err(ContractError::config_validation(
            "reporting.interval_secs",
            "interval_secs must be > 0",
        ));
    }
    if reporting.top_k == 0 {
        return Err(ContractError::config_validation(
            "reporting.top_k",
            "top_k must be > 0",
        ));
    }
    Ok(())
}

/// 校验 sink 配置
fn validate_sinks(config: &FlowsightConfig) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, sink) in config.sinks.iter().enumerate() {
        if sink.name.is_empty() {
            return Err(ContractError::config_validation(
                format!("sinks[{}].name", idx),
                "sink name cannot be empty",
            ));
        }
        if !seen.insert(sink.name.as_str()) {
            return Err(ContractError::config_validation(
                format!("sinks[name={}]", sink.name),
                "duplicate sink name",
            ));
        }
        if sink.queue_capacity == 0 {
            return Err(ContractError::config_validation(
                format!("sinks[{}].queue_capacity", sink.name),
                "queue_capacity must be > 0",
            ));
        }
        if sink.sink_type == SinkType::File
            && sink.params.get("path").is_none_or(|p| p.is_empty())
        {
            return Err(ContractError::config_validation(
                format!("sinks[{}].params.path", sink.name),
                "file sink requires a 'path' parameter",
            ));
        }
    }
    Ok(())
}
