//! Prometheus 指标模块
//!
//! 基于 metrics crate 和 metrics-exporter-prometheus 实现指标收集与导出。
//! 指标通过独立的 HTTP 端口暴露，供 Prometheus 抓取。

use std::net::SocketAddr;

use anyhow::Result;
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::info;

use super::ObservabilityConfig;

/// Metrics 资源守卫
pub struct MetricsHandle {
    pub addr: SocketAddr,
}

/// 初始化 Prometheus 指标导出
///
/// 在指定端口启动 `/metrics` 监听，需在 tokio 运行时内调用
pub fn init(config: &ObservabilityConfig) -> Result<MetricsHandle> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.metrics_port));

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;

    register_common_metrics(&config.service_name);
    info!("Metrics exporter listening on {}", addr);

    Ok(MetricsHandle { addr })
}

/// 注册查询管线相关指标的描述
fn register_common_metrics(service_name: &str) {
    metrics::describe_counter!(
        "catalog_ranked_cache_total",
        "Ranked books cache lookups by result (hit/miss)"
    );
    metrics::describe_counter!(
        "catalog_ranked_short_circuit_total",
        "Ranked books invocations short-circuited before querying"
    );
    metrics::describe_counter!(
        "catalog_ranked_rejected_total",
        "Ranked books dropped for dangling references"
    );
    metrics::describe_counter!(
        "catalog_empty_state_total",
        "Empty-state substitutions by strategy"
    );

    metrics::counter!("service_starts_total", "service" => service_name.to_string()).increment(1);
}

// ============================================================================
// 便捷的指标记录函数
// ============================================================================

/// 记录排行缓存命中情况
#[inline]
pub fn record_cache_lookup(hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    metrics::counter!("catalog_ranked_cache_total", "result" => result).increment(1);
}

/// 记录短路原因
#[inline]
pub fn record_short_circuit(reason: &'static str) {
    metrics::counter!("catalog_ranked_short_circuit_total", "reason" => reason).increment(1);
}

/// 记录被校验剔除的记录数
#[inline]
pub fn record_rejected(count: usize) {
    if count > 0 {
        metrics::counter!("catalog_ranked_rejected_total").increment(count as u64);
    }
}

/// 记录空状态替换
#[inline]
pub fn record_empty_state(strategy: &'static str) {
    metrics::counter!("catalog_empty_state_total", "strategy" => strategy).increment(1);
}
