use aws_sdk_textract::types::{Block, Document, S3Object};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use ocr_pipeline_core::contract::{BlockKind, ObjectReference, TextBlock};
use ocr_pipeline_core::outcome::ApiGatewayResponse;
use ocr_pipeline_lambda::adapters::object_store::{ObjectStore, ProbeError};
use ocr_pipeline_lambda::adapters::text_detection::{DetectionError, TextDetector};
use ocr_pipeline_lambda::config::HandlerConfig;
use ocr_pipeline_lambda::handlers::handle_invocation;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

struct S3ObjectStore {
    s3_client: aws_sdk_s3::Client,
}

impl ObjectStore for S3ObjectStore {
    fn probe(&self, object: &ObjectReference) -> Result<(), ProbeError> {
        let bucket = object.bucket.clone();
        let object_key = object.key.clone();
        let client = self.s3_client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .head_object()
                    .bucket(bucket)
                    .key(object_key)
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| {
                        let not_found = error
                            .as_service_error()
                            .is_some_and(|service_error| service_error.is_not_found());
                        if not_found {
                            ProbeError::NotFound
                        } else {
                            ProbeError::Service(format!("failed to probe object in s3: {error}"))
                        }
                    })
            })
        })
    }
}

struct TextractDetector {
    textract_client: aws_sdk_textract::Client,
}

impl TextDetector for TextractDetector {
    fn detect_text(&self, object: &ObjectReference) -> Result<Vec<TextBlock>, DetectionError> {
        let document = Document::builder()
            .s3_object(
                S3Object::builder()
                    .bucket(object.bucket.clone())
                    .name(object.key.clone())
                    .build(),
            )
            .build();
        let client = self.textract_client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .detect_document_text()
                    .document(document)
                    .send()
                    .await
                    .map(|output| text_blocks(output.blocks()))
                    .map_err(|error| {
                        DetectionError::new(format!("failed to detect document text: {error}"))
                    })
            })
        })
    }
}

fn text_blocks(blocks: &[Block]) -> Vec<TextBlock> {
    blocks
        .iter()
        .map(|block| TextBlock {
            kind: block
                .block_type()
                .map(|block_type| BlockKind::from_service_tag(block_type.as_str()))
                .unwrap_or_else(|| BlockKind::Other(String::new())),
            text: block.text().map(str::to_string),
        })
        .collect()
}

struct RuntimeDependencies {
    config: HandlerConfig,
    store: S3ObjectStore,
    detector: TextractDetector,
}

async fn handle_request(
    event: LambdaEvent<Value>,
    deps: &RuntimeDependencies,
) -> Result<ApiGatewayResponse, Error> {
    tracing::debug!(request_id = %event.context.request_id, "invocation received");
    let outcome = handle_invocation(event.payload, &deps.config, &deps.store, &deps.detector);
    Ok(outcome.into_proxy_response())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing();

    let config = HandlerConfig::from_env().map_err(|error| Error::from(error.to_string()))?;
    tracing::info!(
        upload_bucket = %config.upload_bucket,
        event_batch_policy = ?config.event_batch_policy,
        "ocr runtime configured"
    );

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let deps = RuntimeDependencies {
        config,
        store: S3ObjectStore {
            s3_client: aws_sdk_s3::Client::new(&aws_config),
        },
        detector: TextractDetector {
            textract_client: aws_sdk_textract::Client::new(&aws_config),
        },
    };

    lambda_runtime::run(service_fn(|event| handle_request(event, &deps))).await
}
