use anyhow::{Context, Result};
use marginalia_core::navigation::NavigationKey;

/// Prints the navigation key a query restores to.
///
/// Malformed queries print the root key, as the reader falls back to it.
pub fn parse(query: &str) -> Result<()> {
    let key = NavigationKey::from_query(query).unwrap_or_else(|err| {
        tracing::warn!("[Nav] {}, using root", err);
        NavigationKey::default()
    });

    let json = serde_json::to_string_pretty(&key).context("Failed to serialize navigation key")?;
    println!("{json}");
    println!("?{}", key.to_query());
    Ok(())
}
