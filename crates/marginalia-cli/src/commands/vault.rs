use anyhow::{Context, Result};
use marginalia_core::vault::{VaultService, items_for_thread};
use marginalia_infrastructure::paths::MarginaliaPaths;
use marginalia_infrastructure::{ConfigService, TomlVaultService};

fn open_vault() -> Result<TomlVaultService> {
    let config = ConfigService::new()?.get_config();
    let service = TomlVaultService::new(&MarginaliaPaths::from_config(&config))?;
    Ok(service)
}

pub async fn list(thread: Option<&str>) -> Result<()> {
    let items = open_vault()?.list().await?;
    let shown: Vec<_> = match thread {
        Some(thread_id) => items_for_thread(&items, thread_id),
        None => items.iter().collect(),
    };

    tracing::debug!("[Vault] {} of {} items shown", shown.len(), items.len());
    println!(
        "{}",
        serde_json::to_string_pretty(&shown).context("Failed to serialize vault items")?
    );
    Ok(())
}

pub async fn delete(id: &str) -> Result<()> {
    open_vault()?.delete(id).await?;
    println!("Deleted {id}");
    Ok(())
}
