//! Process-wide state shared by every request handler.
//!
//! `CoreState` owns the configuration and the external service clients. It is
//! built once at startup, wrapped in `Arc`, and never mutated afterwards. A
//! client that could not be constructed is simply absent; handlers that need
//! it get `CoreError::Unavailable` and answer 503.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::config::GatewayConfig;
use crate::pipeline::rag::KnowledgeBase;
use crate::pipeline::strategy::TextGenerator;
use crate::storage::ObjectStore;

/// External services the gateway depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Service {
    Storage,
    KnowledgeBase,
    StrategyModel,
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Storage => write!(f, "Storage service"),
            Self::KnowledgeBase => write!(f, "Knowledge base service"),
            Self::StrategyModel => write!(f, "Strategy model service"),
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CoreError {
    #[error("{0} is not available")]
    Unavailable(Service),
}

// ═══════════════════════════════════════════════════════════
// GatewayClients: constructed once, read-only afterwards
// ═══════════════════════════════════════════════════════════

/// Handles to the external services. `None` marks a client that could not
/// be constructed at startup.
#[derive(Clone, Default)]
pub struct GatewayClients {
    pub storage: Option<Arc<dyn ObjectStore>>,
    pub knowledge_base: Option<Arc<dyn KnowledgeBase>>,
    pub strategy_model: Option<Arc<dyn TextGenerator>>,
}

impl GatewayClients {
    pub fn with_storage(mut self, store: Arc<dyn ObjectStore>) -> Self {
        self.storage = Some(store);
        self
    }

    pub fn with_knowledge_base(mut self, kb: Arc<dyn KnowledgeBase>) -> Self {
        self.knowledge_base = Some(kb);
        self
    }

    pub fn with_strategy_model(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.strategy_model = Some(generator);
        self
    }
}

/// Which services are usable, for startup logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ServiceAvailability {
    pub storage: bool,
    pub knowledge_base: bool,
    pub strategy_model: bool,
}

// ═══════════════════════════════════════════════════════════
// CoreState
// ═══════════════════════════════════════════════════════════

pub struct CoreState {
    pub config: GatewayConfig,
    clients: GatewayClients,
}

impl CoreState {
    pub fn new(config: GatewayConfig, clients: GatewayClients) -> Self {
        Self { config, clients }
    }

    pub fn storage(&self) -> Result<&dyn ObjectStore, CoreError> {
        self.clients
            .storage
            .as_deref()
            .ok_or(CoreError::Unavailable(Service::Storage))
    }

    pub fn knowledge_base(&self) -> Result<&dyn KnowledgeBase, CoreError> {
        self.clients
            .knowledge_base
            .as_deref()
            .ok_or(CoreError::Unavailable(Service::KnowledgeBase))
    }

    pub fn strategy_model(&self) -> Result<&dyn TextGenerator, CoreError> {
        self.clients
            .strategy_model
            .as_deref()
            .ok_or(CoreError::Unavailable(Service::StrategyModel))
    }

    pub fn availability(&self) -> ServiceAvailability {
        ServiceAvailability {
            storage: self.clients.storage.is_some(),
            knowledge_base: self.clients.knowledge_base.is_some(),
            strategy_model: self.clients.strategy_model.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::rag::MockKnowledgeBase;
    use crate::storage::InMemoryObjectStore;

    #[test]
    fn missing_clients_are_unavailable() {
        let state = CoreState::new(GatewayConfig::default(), GatewayClients::default());
        assert_eq!(
            state.storage().err(),
            Some(CoreError::Unavailable(Service::Storage))
        );
        assert_eq!(
            state.knowledge_base().err(),
            Some(CoreError::Unavailable(Service::KnowledgeBase))
        );
        assert_eq!(
            state.strategy_model().err(),
            Some(CoreError::Unavailable(Service::StrategyModel))
        );
    }

    #[test]
    fn availability_reflects_constructed_clients() {
        let clients = GatewayClients::default()
            .with_storage(Arc::new(InMemoryObjectStore::new()))
            .with_knowledge_base(Arc::new(MockKnowledgeBase::new("ok")));
        let state = CoreState::new(GatewayConfig::default(), clients);

        assert!(state.storage().is_ok());
        assert_eq!(
            state.availability(),
            ServiceAvailability {
                storage: true,
                knowledge_base: true,
                strategy_model: false,
            }
        );
    }

    #[test]
    fn unavailable_message_names_service() {
        let err = CoreError::Unavailable(Service::Storage);
        assert_eq!(err.to_string(), "Storage service is not available");
    }
}
