use super::{
    build_runtime, connect_pool, load_config, open_service, service_failure, CommandFailure,
    CommandResult,
};

pub fn run(id: &str, limit: usize) -> CommandResult {
    let config = match load_config("pairings") {
        Ok(config) => config,
        Err(result) => return result,
    };
    let runtime = match build_runtime("pairings") {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let result = runtime.block_on(async {
        let pool = connect_pool(&config).await?;
        let service = open_service(&config, &pool);

        let pairings =
            service.frequently_bought_with(id, limit).await.map_err(service_failure)?;

        pool.close().await;
        Ok::<_, CommandFailure>(pairings)
    });

    match result {
        Ok(pairings) => {
            let message = if pairings.is_empty() {
                "no co-purchase partners recorded for this item".to_string()
            } else {
                format!("{} frequently-bought-together partners", pairings.len())
            };
            match serde_json::to_value(&pairings) {
                Ok(data) => CommandResult::success_with_data("pairings", message, data),
                Err(_) => CommandResult::success("pairings", message),
            }
        }
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("pairings", error_class, message, exit_code)
        }
    }
}
