use crate::{
    commands, info, question,
    store::{Config, Store},
    warn,
};

pub async fn main(store: &Store, mut config: Config) -> anyhow::Result<()> {
    info!("Copy the LEETCODE_SESSION and csrftoken cookies from a logged-in browser.");
    let session = dialoguer::Password::new()
        .with_prompt(question!("LEETCODE_SESSION"))
        .interact()?;
    let csrf_token = dialoguer::Password::new()
        .with_prompt(question!("csrftoken"))
        .interact()?;

    config.leetcode_session = session.trim().to_string();
    config.csrf_token = csrf_token.trim().to_string();
    store.save_config(&config)?;
    info!("Credentials saved to {}", store.config_path().display());

    let judge = commands::authenticated_judge(&config)?;
    match judge.signed_in_user().await {
        Ok(Some(username)) => info!("Logged in as {}", username),
        Ok(None) => warn!("LeetCode does not accept these cookies, they may have expired."),
        Err(err) => warn!("Could not verify the session: {:#}", err),
    }
    Ok(())
}
