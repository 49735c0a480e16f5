use super::{
    build_runtime, connect_pool, load_config, open_service, service_failure, CommandFailure,
    CommandResult,
};

pub fn run(cart: &[String], strategy: &str, limit: usize) -> CommandResult {
    let config = match load_config("recommend") {
        Ok(config) => config,
        Err(result) => return result,
    };
    let runtime = match build_runtime("recommend") {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let result = runtime.block_on(async {
        let pool = connect_pool(&config).await?;
        let service = open_service(&config, &pool);

        let ranked = service.recommend(cart, strategy, limit).await.map_err(service_failure)?;

        pool.close().await;
        Ok::<_, CommandFailure>(ranked)
    });

    match result {
        Ok(ranked) => {
            let message = if ranked.is_empty() {
                "no eligible recommendation candidates".to_string()
            } else {
                format!("{} candidates ranked with strategy `{strategy}`", ranked.len())
            };
            match serde_json::to_value(&ranked) {
                Ok(data) => CommandResult::success_with_data("recommend", message, data),
                Err(_) => CommandResult::success("recommend", message),
            }
        }
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("recommend", error_class, message, exit_code)
        }
    }
}
