use std::io;
use std::time::Duration;

use actix_cors::Cors;
use actix_web::middleware::{Compress, DefaultHeaders};
use actix_web::{App, HttpServer, web};
use dotenv::dotenv;
use human_panic::setup_panic;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;

use rust_grading_console::config::{AppConfig, ListenTarget};
use rust_grading_console::models::AppStartTime;
use rust_grading_console::routes;
use rust_grading_console::runtime::lifetime;
use rust_grading_console::utils::{json_error_handler, path_error_handler, query_error_handler};

/// 开发环境输出带源码位置的文本日志，其余环境输出 JSON
fn init_tracing(config: &AppConfig) -> WorkerGuard {
    let (writer, guard) = tracing_appender::non_blocking(io::stdout());
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&config.app.log_level))
        .with_writer(writer)
        .with_level(true);

    if config.is_development() {
        subscriber.with_file(true).with_line_number(true).init();
    } else {
        subscriber.with_ansi(false).json().init();
    }
    guard
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    setup_panic!();

    let started = AppStartTime {
        start_datetime: chrono::Utc::now(),
    };

    AppConfig::init().map_err(|e| io::Error::other(format!("invalid configuration: {e}")))?;
    let config = AppConfig::get();
    let _log_guard = init_tracing(config);

    info!(
        "{} v{} starting ({} profile)",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        config.app.environment
    );

    let ctx = lifetime::startup::prepare_server_startup()
        .await
        .map_err(|e| io::Error::other(e.to_string()))?;

    info!(
        "Startup finished in {} ms, {} workers",
        (chrono::Utc::now() - started.start_datetime).num_milliseconds(),
        config.server.workers
    );

    let server = HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(config.cors.max_age),
            )
            .wrap(Compress::default())
            // 任务进度和统计都是实时数据，禁止中间层缓存
            .wrap(DefaultHeaders::new().add(("Cache-Control", "no-store")))
            .app_data(web::QueryConfig::default().error_handler(query_error_handler))
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .app_data(web::PathConfig::default().error_handler(path_error_handler))
            .app_data(web::PayloadConfig::new(config.server.limits.max_payload_size))
            .app_data(web::Data::new(ctx.storage.clone()))
            .app_data(web::Data::new(ctx.cache.clone()))
            .app_data(web::Data::new(ctx.engine.clone()))
            .app_data(web::Data::new(config.grading.clone()))
            .app_data(web::Data::new(started.clone()))
            .configure(routes::configure_api_routes)
    })
    .workers(config.server.workers)
    .keep_alive(Duration::from_secs(config.server.timeouts.keep_alive))
    .client_request_timeout(Duration::from_millis(config.server.timeouts.client_request))
    .client_disconnect_timeout(Duration::from_millis(
        config.server.timeouts.client_disconnect,
    ));

    let server = match config.listen_target() {
        #[cfg(unix)]
        ListenTarget::Unix(path) => {
            // 上次异常退出留下的套接字文件会导致绑定失败
            if std::path::Path::new(&path).exists() {
                std::fs::remove_file(&path)?;
            }
            warn!("Listening on unix:{}", path);
            server.bind_uds(path)?
        }
        #[cfg(not(unix))]
        ListenTarget::Unix(path) => {
            return Err(io::Error::other(format!(
                "unix sockets are not supported here: {path}"
            )));
        }
        ListenTarget::Tcp(addr) => {
            warn!("Listening on http://{}", addr);
            server.bind(addr)?
        }
    }
    .run();

    tokio::select! {
        res = server => res?,
        _ = lifetime::shutdown::listen_for_shutdown() => {
            warn!("Shutdown requested; grading progress lives in the database, nothing to flush");
        }
    }

    Ok(())
}
