//! AWS wiring: shared SDK configuration and provider error extraction.
//!
//! Every AWS-backed seam (`S3ObjectStore`, `BedrockKnowledgeBase`,
//! `BedrockTextGenerator`) is built from one `SdkConfig`, loaded once at
//! startup.

use std::sync::Arc;

use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};

use crate::config::GatewayConfig;
use crate::core_state::{GatewayClients, Service};
use crate::pipeline::rag::{BedrockKnowledgeBase, RetrievalSettings};
use crate::pipeline::strategy::BedrockTextGenerator;
use crate::storage::S3ObjectStore;

/// Load the shared SDK configuration for the configured region.
///
/// Static credentials from the environment take precedence; otherwise the
/// default provider chain (profile, IMDS, container role...) applies.
pub async fn load_sdk_config(config: &GatewayConfig) -> SdkConfig {
    let mut loader =
        aws_config::defaults(BehaviorVersion::latest()).region(Region::new(config.region.clone()));

    if let Some(creds) = &config.credentials {
        loader = loader.credentials_provider(Credentials::new(
            creds.access_key_id.clone(),
            creds.secret_access_key.clone(),
            creds.session_token.clone(),
            None,
            "s3rpent-env",
        ));
    }

    loader.load().await
}

/// Construct every AWS-backed client the configuration allows.
///
/// A service whose settings are empty is left out and logged; it will answer
/// 503 instead of taking the whole process down.
pub async fn connect(config: &GatewayConfig) -> GatewayClients {
    let mut clients = GatewayClients::default();

    if config.region.is_empty() {
        tracing::error!("AWS_REGION is empty; no AWS service is available");
        return clients;
    }

    let sdk_config = load_sdk_config(config).await;

    if let Some(reason) = missing_setting(&[
        ("S3_UPLOADS_BUCKET", &config.uploads_bucket),
        ("S3_RESULTS_BUCKET", &config.results_bucket),
    ]) {
        warn_unavailable(Service::Storage, reason);
    } else {
        clients = clients.with_storage(Arc::new(S3ObjectStore::from_sdk_config(&sdk_config)));
    }

    if let Some(reason) = missing_setting(&[
        ("KNOWLEDGE_BASE_ID", &config.knowledge_base_id),
        ("MODEL_ARN", &config.model_arn),
    ]) {
        warn_unavailable(Service::KnowledgeBase, reason);
    } else {
        let settings = RetrievalSettings::new(&config.knowledge_base_id, &config.model_arn);
        clients = clients.with_knowledge_base(Arc::new(BedrockKnowledgeBase::from_sdk_config(
            &sdk_config,
            settings,
        )));
    }

    if let Some(reason) = missing_setting(&[("STRATEGY_MODEL_ID", &config.strategy_model_id)]) {
        warn_unavailable(Service::StrategyModel, reason);
    } else {
        clients = clients.with_strategy_model(Arc::new(BedrockTextGenerator::from_sdk_config(
            &sdk_config,
            &config.strategy_model_id,
        )));
    }

    clients
}

/// Name of the first empty setting, if any.
fn missing_setting<'a>(settings: &[(&'a str, &String)]) -> Option<&'a str> {
    settings
        .iter()
        .find(|(_, value)| value.is_empty())
        .map(|(name, _)| *name)
}

fn warn_unavailable(service: Service, setting: &str) {
    tracing::warn!(%service, setting, "Client not constructed: setting is empty");
}

/// Pull the provider error code and a readable message out of an SDK error.
///
/// Transport failures carry no service code; they are reported under the
/// name of the failure kind instead.
pub fn error_parts<E, R>(err: &SdkError<E, R>) -> (String, String)
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let code = match err {
        SdkError::ConstructionFailure(_) => "ConstructionFailure".to_string(),
        SdkError::TimeoutError(_) => "Timeout".to_string(),
        SdkError::DispatchFailure(_) => "DispatchFailure".to_string(),
        SdkError::ResponseError(_) => "ResponseError".to_string(),
        _ => err.code().unwrap_or("Unknown").to_string(),
    };
    let message = err
        .message()
        .map(str::to_string)
        .unwrap_or_else(|| DisplayErrorContext(err).to_string());
    (code, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_setting_finds_first_empty() {
        let a = String::from("bucket");
        let b = String::new();
        assert_eq!(missing_setting(&[("A", &a), ("B", &b)]), Some("B"));
        assert_eq!(missing_setting(&[("A", &a)]), None);
    }

    #[tokio::test]
    async fn empty_region_constructs_nothing() {
        let config = GatewayConfig {
            region: String::new(),
            ..GatewayConfig::default()
        };
        let clients = connect(&config).await;
        assert!(clients.storage.is_none());
        assert!(clients.knowledge_base.is_none());
        assert!(clients.strategy_model.is_none());
    }

    #[tokio::test]
    async fn empty_knowledge_base_id_leaves_only_that_service_out() {
        let config = GatewayConfig {
            knowledge_base_id: String::new(),
            ..GatewayConfig::default()
        };
        let clients = connect(&config).await;
        assert!(clients.storage.is_some());
        assert!(clients.knowledge_base.is_none());
        assert!(clients.strategy_model.is_some());
    }
}
