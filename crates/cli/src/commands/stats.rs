use super::{
    build_runtime, connect_pool, load_config, open_service, service_failure, CommandFailure,
    CommandResult,
};

pub fn run() -> CommandResult {
    let config = match load_config("stats") {
        Ok(config) => config,
        Err(result) => return result,
    };
    let runtime = match build_runtime("stats") {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let result = runtime.block_on(async {
        let pool = connect_pool(&config).await?;
        let service = open_service(&config, &pool);

        let stats = service.item_stats().await.map_err(service_failure)?;

        pool.close().await;
        Ok::<_, CommandFailure>(stats)
    });

    match result {
        Ok(stats) => {
            let message = format!("{} active items across the menu", stats.total_items);
            match serde_json::to_value(&stats) {
                Ok(data) => CommandResult::success_with_data("stats", message, data),
                Err(_) => CommandResult::success("stats", message),
            }
        }
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("stats", error_class, message, exit_code)
        }
    }
}
