use anyhow::{Context, Result};
use marginalia_infrastructure::ConfigService;

pub fn show() -> Result<()> {
    let service = ConfigService::new()?;
    let config = service.get_config();
    println!("# {}", service.path().display());
    println!(
        "{}",
        serde_json::to_string_pretty(&config).context("Failed to serialize config")?
    );
    Ok(())
}
