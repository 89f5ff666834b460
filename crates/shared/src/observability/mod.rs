//! 日志与指标初始化
//!
//! CLI 与测试都经由 [`init`] 进入，日志固定写 stderr，stdout 只留给查询结果。

pub mod metrics;
pub mod tracing;

use std::net::SocketAddr;

use ::tracing::info;
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// 写入每条日志与 `service_starts_total` 标签
    pub service_name: String,
    /// `RUST_LOG` 未设置时生效
    pub log_level: String,
    pub json_logs: bool,
    /// 关闭时指标调用落到 metrics 的空 recorder 上
    pub metrics_enabled: bool,
    pub metrics_port: u16,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            service_name: "catalog".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_port: 9090,
        }
    }
}

impl ObservabilityConfig {
    /// 服务名由进程决定，不从配置文件读取
    pub fn with_service_name(mut self, service_name: &str) -> Self {
        self.service_name = service_name.to_string();
        self
    }
}

/// 进程退出前保持存活
pub struct ObservabilityGuard {
    service_name: String,
    metrics: Option<metrics::MetricsHandle>,
}

impl ObservabilityGuard {
    /// Prometheus 导出端点，未启用指标时为 `None`
    pub fn metrics_addr(&self) -> Option<SocketAddr> {
        self.metrics.as_ref().map(|handle| handle.addr)
    }
}

impl Drop for ObservabilityGuard {
    fn drop(&mut self) {
        info!(service = %self.service_name, "Observability shut down");
    }
}

/// 先装 subscriber 再装 recorder，导出器的启动日志才能被记录下来。
/// 全局 subscriber 只能设置一次，重复调用返回错误。
pub async fn init(config: &ObservabilityConfig) -> Result<ObservabilityGuard> {
    tracing::init(config)?;

    let metrics = config
        .metrics_enabled
        .then(|| metrics::init(config))
        .transpose()?;

    let guard = ObservabilityGuard {
        service_name: config.service_name.clone(),
        metrics,
    };
    info!(
        service = %guard.service_name,
        metrics_addr = ?guard.metrics_addr(),
        "Observability ready"
    );
    Ok(guard)
}
