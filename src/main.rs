//! # Webview-Driver 服务入口
//!
//! 启动 JSON wire 协议 HTTP 服务，把 WebDriver 命令桥接到远程 web view 的 inspector 连接。
//!
//! ## 主要功能
//! - 加载配置并初始化日志
//! - 为每个会话连接 inspector 并跟踪当前浏览上下文
//! - 定期清理断开或空闲的会话
//! - 实现优雅关闭
//!
//! ## 环境变量
//! - `WEBVIEW_CONFIG`: TOML 配置文件路径（设置后忽略其余变量）
//! - `WEBVIEW_HOST`: 服务器监听地址（默认: 127.0.0.1）
//! - `WEBVIEW_PORT`: 服务器监听端口（默认: 5555）
//! - `WEBVIEW_INSPECTOR_ENDPOINT`: inspector 发现端点（默认: http://localhost:9222）
//! - `RUST_LOG`: 日志过滤器，未设置时使用配置中的 `log_level`

use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use webview_driver::{
    commands::CommandExecutor,
    config::Config,
    inspector::{DevToolsHost, InspectorHost},
    server::{self, AppState},
    session::{SessionManager, SessionManagerImpl},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = match std::env::var("WEBVIEW_CONFIG") {
        Ok(path) => Config::from_file(&path).with_context(|| format!("loading {}", path))?,
        Err(_) => Config::from_env().context("loading configuration from environment")?,
    };

    // Initialize tracing - RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Webview-Driver Server v{}", webview_driver::VERSION);
    info!(
        "Configuration loaded: host={}, port={}, inspector={}",
        config.host, config.port, config.inspector_endpoint
    );

    // One host controller shared by every session
    let host: Arc<dyn InspectorHost> = Arc::new(DevToolsHost::new(config.inspector_endpoint.clone()));
    let session_manager = Arc::new(
        SessionManagerImpl::with_host(host)
            .with_timeouts(config.context_timeouts())
            .with_session_timeout(Duration::from_secs(config.session_timeout)),
    );
    let manager: Arc<dyn SessionManager> = session_manager.clone();

    let executor = CommandExecutor::new(manager.clone())
        .with_implicit_wait_poll(Duration::from_millis(config.implicit_wait_poll_ms));

    // Start cleanup task
    let cleanup_manager = session_manager.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            match cleanup_manager.cleanup().await {
                Ok(0) => {}
                Ok(removed) => info!(
                    "Session cleanup removed {} sessions. Active sessions: {}",
                    removed,
                    cleanup_manager.session_count()
                ),
                Err(e) => warn!("Session cleanup failed: {}", e),
            }
        }
    });

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;

    server::serve(listener, AppState::new(executor), shutdown_signal()).await?;

    // Cleanup all sessions
    info!("Closing all sessions...");
    for session_id in manager.list_sessions().await? {
        if let Err(e) = manager.delete_session(&session_id).await {
            error!("Failed to close session {}: {}", session_id, e);
        }
    }

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = sigterm.recv() => info!("Received SIGTERM signal"),
                    _ = tokio::signal::ctrl_c() => info!("Received SIGINT signal"),
                }
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        info!("Received Ctrl+C signal");
    }

    info!("Shutdown signal received, stopping server...");
}
