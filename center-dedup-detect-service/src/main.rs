mod dedup;
mod handler;
mod normalize;
mod similarity;
mod store;
mod util;

use center_dedup_service::config::Settings;
use center_dedup_service::dto::ApiGatewayRequest;
use center_dedup_service::util::get_region;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use rusoto_core::Client;
use rusoto_s3::S3Client;
use serde_json::Value;
use store::S3CenterStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false)
        .without_time()
        .init();

    let region = get_region()?;
    let settings = Settings::from_env()?;
    let client = S3Client::new_with_client(Client::shared(), region);
    let store = S3CenterStore::new(client, settings.centers.clone());
    info!(
        bucket = %settings.centers.bucket,
        key = %settings.centers.key,
        production = settings.production,
        "Center duplicate detection ready"
    );

    let (store, settings) = (&store, &settings);
    run(service_fn(move |event: LambdaEvent<ApiGatewayRequest>| async move {
        process(event, store, settings).await
    }))
    .await?;
    Ok(())
}

async fn process(
    event: LambdaEvent<ApiGatewayRequest>,
    store: &S3CenterStore,
    settings: &Settings,
) -> Result<Value, Error> {
    let (request, context) = event.into_parts();
    info!(request_id = %context.request_id, method = %request.http_method, "Handling request");
    handler::route(&request, store, settings).await
}
