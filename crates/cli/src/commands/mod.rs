pub mod classify;
pub mod migrate;
pub mod pairings;
pub mod recommend;
pub mod seed;
pub mod stats;

use std::sync::Arc;

use serde::Serialize;

use menuwise_core::config::{AppConfig, LoadOptions};
use menuwise_core::service::MenuIntelligence;
use menuwise_db::{connect_with_settings, DbPool, SqlMenuStore};

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<serde_json::Value>,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        Self::build(command, "ok", None, message.into(), None, 0)
    }

    pub fn success_with_data(
        command: &str,
        message: impl Into<String>,
        data: serde_json::Value,
    ) -> Self {
        Self::build(command, "ok", None, message.into(), Some(data), 0)
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        Self::build(command, "error", Some(error_class.to_string()), message.into(), None, exit_code)
    }

    fn build(
        command: &str,
        status: &str,
        error_class: Option<String>,
        message: String,
        data: Option<serde_json::Value>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: status.to_string(),
            error_class,
            message,
            data,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

/// Failure triple threaded through the async command bodies:
/// (error_class, message, exit_code).
pub(crate) type CommandFailure = (&'static str, String, u8);

pub(crate) fn load_config(command: &'static str) -> Result<AppConfig, CommandResult> {
    AppConfig::load(LoadOptions::default()).map_err(|error| {
        CommandResult::failure(command, "config_validation", format!("configuration issue: {error}"), 2)
    })
}

pub(crate) fn build_runtime(command: &'static str) -> Result<tokio::runtime::Runtime, CommandResult> {
    tokio::runtime::Builder::new_current_thread().enable_all().build().map_err(|error| {
        CommandResult::failure(
            command,
            "runtime_init",
            format!("failed to initialize async runtime: {error}"),
            3,
        )
    })
}

pub(crate) async fn connect_pool(config: &AppConfig) -> Result<DbPool, CommandFailure> {
    connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(|error| ("db_connectivity", error.to_string(), 4u8))
}

pub(crate) fn open_service(config: &AppConfig, pool: &DbPool) -> MenuIntelligence {
    let store = Arc::new(SqlMenuStore::new(pool.clone()));
    MenuIntelligence::with_config(store.clone(), store, config.engine)
}

pub(crate) fn service_failure(error: menuwise_core::errors::ServiceError) -> CommandFailure {
    (error.class(), error.to_string(), 5)
}
