use super::{
    build_runtime, connect_pool, load_config, open_service, service_failure, CommandFailure,
    CommandResult,
};

pub fn run(id: Option<&str>) -> CommandResult {
    let config = match load_config("classify") {
        Ok(config) => config,
        Err(result) => return result,
    };
    let runtime = match build_runtime("classify") {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let result = runtime.block_on(async {
        let pool = connect_pool(&config).await?;
        let service = open_service(&config, &pool);

        let outcome = match id {
            Some(id) => {
                let outcome = service.classify_item(id).await.map_err(service_failure)?;
                let message = format!(
                    "classified `{}` as {} ({:.0}% confidence)",
                    outcome.item.title,
                    outcome.item.category,
                    outcome.item.confidence * 100.0
                );
                (message, serde_json::to_value(&outcome))
            }
            None => {
                let outcome = service.classify_all().await.map_err(service_failure)?;
                let message = format!(
                    "classified {} items ({} failed)",
                    outcome.classified.len(),
                    outcome.failed.len()
                );
                (message, serde_json::to_value(&outcome))
            }
        };

        pool.close().await;
        Ok::<_, CommandFailure>(outcome)
    });

    match result {
        Ok((message, Ok(data))) => CommandResult::success_with_data("classify", message, data),
        Ok((message, Err(_))) => CommandResult::success("classify", message),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("classify", error_class, message, exit_code)
        }
    }
}
