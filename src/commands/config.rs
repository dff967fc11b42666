use crate::{
    info,
    store::{Config, Store},
};

pub async fn set_gemini_key(store: &Store, mut config: Config, key: String) -> anyhow::Result<()> {
    let key = key.trim();
    if key.is_empty() {
        anyhow::bail!("The Gemini API key must not be empty");
    }
    config.gemini_key = Some(key.to_string());
    store.save_config(&config)?;
    info!("Gemini API key saved to {}", store.config_path().display());
    Ok(())
}
