use async_trait::async_trait;
use marginalia_core::vault::{SentenceBatch, VaultEntry, VaultItem, VaultMemo, VaultService};
use marginalia_core::{MarginaliaError, Result};
use tokio::sync::RwLock;

/// Vault backend held in memory.
#[derive(Default)]
pub struct InMemoryVaultService {
    items: RwLock<Vec<VaultItem>>,
}

impl InMemoryVaultService {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VaultService for InMemoryVaultService {
    async fn save_sentences(&self, batch: SentenceBatch) -> Result<VaultItem> {
        batch.validate()?;
        let item = VaultItem::new(VaultEntry::Sentences(batch));
        self.items.write().await.push(item.clone());
        Ok(item)
    }

    async fn save_memo(&self, memo: VaultMemo) -> Result<VaultItem> {
        memo.validate()?;
        let item = VaultItem::new(VaultEntry::Memo(memo));
        self.items.write().await.push(item.clone());
        Ok(item)
    }

    async fn list(&self) -> Result<Vec<VaultItem>> {
        Ok(self.items.read().await.clone())
    }

    async fn delete(&self, item_id: &str) -> Result<()> {
        let mut items = self.items.write().await;
        let before = items.len();
        items.retain(|item| item.id != item_id);
        if items.len() == before {
            return Err(MarginaliaError::not_found("vault item", item_id));
        }
        Ok(())
    }
}
