//! TOML-backed vault service.

use crate::dto::{VaultFileV1, VaultItemDto};
use crate::paths::{MarginaliaPaths, ServiceType};
use crate::storage::AtomicTomlFile;
use async_trait::async_trait;
use marginalia_core::vault::{SentenceBatch, VaultEntry, VaultItem, VaultMemo, VaultService};
use marginalia_core::{MarginaliaError, Result};
use std::path::PathBuf;
use std::sync::Arc;

/// Stores vault items in `vault.toml`, oldest first.
pub struct TomlVaultService {
    file: Arc<AtomicTomlFile<VaultFileV1>>,
}

impl TomlVaultService {
    pub fn new(paths: &MarginaliaPaths) -> Result<Self> {
        Ok(Self::with_path(paths.get_path(ServiceType::Vault)?))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self {
            file: Arc::new(AtomicTomlFile::new(path)),
        }
    }

    async fn with_file<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&AtomicTomlFile<VaultFileV1>) -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let file = Arc::clone(&self.file);
        tokio::task::spawn_blocking(move || f(&file))
            .await
            .map_err(|e| MarginaliaError::internal(format!("Storage task failed: {e}")))?
    }

    async fn append(&self, item: VaultItem) -> Result<VaultItem> {
        let dto = VaultItemDto::from(&item);
        self.with_file(move |file| {
            file.update(VaultFileV1::default(), |data| {
                data.items.push(dto);
                Ok(())
            })
        })
        .await?;
        tracing::info!("[TomlVaultService] Stored vault item {}", item.id);
        Ok(item)
    }
}

#[async_trait]
impl VaultService for TomlVaultService {
    async fn save_sentences(&self, batch: SentenceBatch) -> Result<VaultItem> {
        batch.validate()?;
        self.append(VaultItem::new(VaultEntry::Sentences(batch))).await
    }

    async fn save_memo(&self, memo: VaultMemo) -> Result<VaultItem> {
        memo.validate()?;
        self.append(VaultItem::new(VaultEntry::Memo(memo))).await
    }

    async fn list(&self) -> Result<Vec<VaultItem>> {
        let data = self
            .with_file(|file| Ok(file.load()?.unwrap_or_default()))
            .await?;
        data.items.into_iter().map(VaultItem::try_from).collect()
    }

    async fn delete(&self, item_id: &str) -> Result<()> {
        let item_id = item_id.to_string();
        self.with_file(move |file| {
            file.update(VaultFileV1::default(), |data| {
                let before = data.items.len();
                data.items.retain(|item| item.id != item_id);
                if data.items.len() == before {
                    return Err(MarginaliaError::not_found("vault item", item_id.clone()));
                }
                Ok(())
            })
        })
        .await
    }
}
