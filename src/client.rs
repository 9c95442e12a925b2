//! Root factory.

use std::sync::Arc;

use crate::collection::{CollectionArgs, CollectionRef};
use crate::config::TrellisConfig;
use crate::errors::Result;
use crate::gateway::{MemoryBackend, StorageBackend, StorageGateway};
use crate::hooks::{HookRegistry, Plugin};

#[cfg(feature = "dynamodb")]
use crate::gateway::{DynamoBackend, DynamoConfig};

struct TrellisInner {
    config: TrellisConfig,
    hooks: Arc<HookRegistry>,
    gateway: StorageGateway,
}

/// Entry point: owns the configuration, the hook registry and the storage
/// gateway, and mints root collection handles.
///
/// Cheap to clone; all clones share one inner state. Configuration is
/// fixed at construction.
#[derive(Clone)]
pub struct Trellis {
    inner: Arc<TrellisInner>,
}

impl Trellis {
    /// Build over any storage backend.
    pub fn new(backend: impl StorageBackend + 'static, config: TrellisConfig) -> Self {
        Self::from_backend(Arc::new(backend), config)
    }

    /// Build over a shared, pre-built backend.
    pub fn from_backend(backend: Arc<dyn StorageBackend>, config: TrellisConfig) -> Self {
        let hooks = Arc::new(HookRegistry::new());
        let gateway = StorageGateway::new(backend, config.clone(), Arc::clone(&hooks));
        Self {
            inner: Arc::new(TrellisInner {
                config,
                hooks,
                gateway,
            }),
        }
    }

    /// Build over the in-process memory backend. Useful for tests and for
    /// embedded use without a network.
    pub fn in_memory(config: TrellisConfig) -> Self {
        let backend = MemoryBackend::new(config.partition_key.as_str(), config.sort_key.as_str());
        Self::new(backend, config)
    }

    /// Build over a DynamoDB table, inheriting credentials and transport
    /// settings from the ambient SDK config.
    #[cfg(feature = "dynamodb")]
    pub fn dynamodb(
        sdk_config: &aws_config::SdkConfig,
        dynamo: DynamoConfig,
        config: TrellisConfig,
    ) -> Self {
        let backend = DynamoBackend::new(
            sdk_config,
            dynamo,
            config.partition_key.as_str(),
            config.sort_key.as_str(),
        );
        Self::new(backend, config)
    }

    /// Mint a root collection handle. The path is validated here, before
    /// any I/O.
    pub fn collection<T>(&self, path: impl Into<String>) -> Result<CollectionRef<T>> {
        self.collection_with(path, CollectionArgs::default())
    }

    /// Mint a root collection handle with arguments, e.g. an id-prefix.
    pub fn collection_with<T>(
        &self,
        path: impl Into<String>,
        args: CollectionArgs,
    ) -> Result<CollectionRef<T>> {
        CollectionRef::new(self.clone(), path.into(), args)
    }

    pub fn config(&self) -> &TrellisConfig {
        &self.inner.config
    }

    /// The hook registry, for subscribing observers.
    pub fn hooks(&self) -> &HookRegistry {
        &self.inner.hooks
    }

    /// Install a plugin's hook subscriptions.
    pub fn install(&self, plugin: &dyn Plugin) {
        plugin.install(&self.inner.hooks);
    }

    pub(crate) fn gateway(&self) -> &StorageGateway {
        &self.inner.gateway
    }
}

impl std::fmt::Debug for Trellis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Trellis")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}
