//! Application State
//!
//! Composition root holding every long-lived service. Front ends create one
//! `AppState`, initialize it, and reach the loader, catalog and chat flow
//! through it.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::models::settings::{AppConfig, SettingsUpdate};
use crate::services::llm::{ModelProvider, OllamaProvider, ProviderConfig};
use crate::services::{ChatService, SubjectCatalog, SubjectLoader};
use crate::storage::{ConfigService, JsonSubjectStore, SubjectStore};
use crate::utils::error::{AppError, AppResult};

/// Application state shared by front ends
pub struct AppState {
    /// Configuration service for app settings
    config: Arc<RwLock<Option<ConfigService>>>,
    /// Model server client
    provider: Arc<RwLock<Option<Arc<dyn ModelProvider>>>>,
    /// Subject cache and primary pointer
    loader: Arc<RwLock<Option<Arc<SubjectLoader>>>>,
    /// Stored subject listing and creation
    catalog: Arc<RwLock<Option<Arc<SubjectCatalog>>>>,
    /// Chat flow on the primary subject
    chat: Arc<RwLock<Option<ChatService>>>,
    /// Whether the state has been initialized
    initialized: Arc<RwLock<bool>>,
}

impl AppState {
    /// Create a new uninitialized app state
    pub fn new() -> Self {
        Self {
            config: Arc::new(RwLock::new(None)),
            provider: Arc::new(RwLock::new(None)),
            loader: Arc::new(RwLock::new(None)),
            catalog: Arc::new(RwLock::new(None)),
            chat: Arc::new(RwLock::new(None)),
            initialized: Arc::new(RwLock::new(false)),
        }
    }

    /// Initialize all services from `~/.study-buddy/`
    pub async fn initialize(&self) -> AppResult<()> {
        if self.is_initialized().await {
            return Ok(());
        }

        let config = ConfigService::new()?;
        let provider = Arc::new(OllamaProvider::new(ProviderConfig::from(
            config.get_config(),
        )));
        let store = Arc::new(JsonSubjectStore::new()?);
        self.initialize_with(config, store, provider).await
    }

    /// Initialize all services from explicit parts.
    ///
    /// Does nothing when the state is already initialized.
    pub async fn initialize_with(
        &self,
        config: ConfigService,
        store: Arc<dyn SubjectStore>,
        provider: Arc<dyn ModelProvider>,
    ) -> AppResult<()> {
        let mut initialized = self.initialized.write().await;
        if *initialized {
            return Ok(());
        }

        let base_model = config.get_config().base_model.clone();

        // Initialize subject services
        {
            let loader = Arc::new(SubjectLoader::new(store.clone(), provider.clone()));
            let catalog = Arc::new(SubjectCatalog::new(store, provider.clone(), base_model));
            let chat = ChatService::new(loader.clone());

            *self.loader.write().await = Some(loader);
            *self.catalog.write().await = Some(catalog);
            *self.chat.write().await = Some(chat);
        }

        *self.provider.write().await = Some(provider);
        *self.config.write().await = Some(config);

        *initialized = true;
        info!("application state initialized");
        Ok(())
    }

    pub async fn is_initialized(&self) -> bool {
        *self.initialized.read().await
    }

    /// Check if config is healthy
    pub fn is_config_healthy(&self) -> bool {
        if let Ok(guard) = self.config.try_read() {
            if let Some(ref config) = *guard {
                return config.is_healthy();
            }
        }
        false
    }

    /// Check whether the model server answers
    pub async fn check_model_server(&self) -> AppResult<()> {
        let provider = self.provider().await?;
        provider.health_check().await?;
        Ok(())
    }

    /// Get the current configuration
    pub async fn get_config(&self) -> AppResult<AppConfig> {
        let guard = self.config.read().await;
        match &*guard {
            Some(config) => Ok(config.get_config_clone()),
            None => Err(AppError::config("Config service not initialized")),
        }
    }

    /// Update the configuration.
    ///
    /// Model server settings apply to services built by the next
    /// initialization.
    pub async fn update_config(&self, update: SettingsUpdate) -> AppResult<AppConfig> {
        let mut guard = self.config.write().await;
        match &mut *guard {
            Some(config) => config.update_config(update),
            None => Err(AppError::config("Config service not initialized")),
        }
    }

    /// Model provider shared by all subjects
    pub async fn provider(&self) -> AppResult<Arc<dyn ModelProvider>> {
        self.provider
            .read()
            .await
            .clone()
            .ok_or_else(|| AppError::internal("Model provider not initialized"))
    }

    /// Subject loader
    pub async fn loader(&self) -> AppResult<Arc<SubjectLoader>> {
        self.loader
            .read()
            .await
            .clone()
            .ok_or_else(|| AppError::internal("Subject loader not initialized"))
    }

    /// Subject catalog
    pub async fn catalog(&self) -> AppResult<Arc<SubjectCatalog>> {
        self.catalog
            .read()
            .await
            .clone()
            .ok_or_else(|| AppError::internal("Subject catalog not initialized"))
    }

    /// Chat flow
    pub async fn chat(&self) -> AppResult<ChatService> {
        self.chat
            .read()
            .await
            .clone()
            .ok_or_else(|| AppError::internal("Chat service not initialized"))
    }

    /// Persist every changed subject and stop background writes
    pub async fn shutdown(&self) -> AppResult<()> {
        let loader = self.loader.read().await.clone();
        if let Some(loader) = loader {
            loader.shutdown().await?;
        }
        info!("application state shut down");
        Ok(())
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("initialized", &self.initialized)
            .finish()
    }
}
