use crate::{
    info,
    language::Language,
    question,
    store::{Config, ConfigError, Store},
    warn,
};

pub async fn main(store: &Store, lang: Option<String>) -> anyhow::Result<()> {
    let lang = match lang {
        Some(lang) => Language::parse(&lang)?,
        None => prompt_language()?,
    };

    let problems_dir = std::env::current_dir()?.join("problems");
    if problems_dir.is_dir() {
        info!("{} already exists.", problems_dir.display());
    } else {
        fs_err::create_dir_all(&problems_dir)?;
        info!("Created {}", problems_dir.display());
    }

    // Re-running init moves the problems directory but keeps the login.
    let config = match store.load_config() {
        Ok(mut config) => {
            config.problems_dir = problems_dir;
            config.lang = lang.to_string();
            config
        }
        Err(ConfigError::NotInitialized { .. }) => Config::new(problems_dir, lang.to_string()),
        Err(err) => {
            warn!("Replacing unreadable config: {:#}", anyhow::Error::from(err));
            Config::new(problems_dir, lang.to_string())
        }
    };
    store.save_config(&config)?;

    info!("Saved config to {}", store.config_path().display());
    if config.credentials().is_err() {
        info!("Run `leetcli login` to be able to run and submit solutions.");
    }
    Ok(())
}

fn prompt_language() -> anyhow::Result<Language> {
    let languages = <Language as strum::IntoEnumIterator>::iter().collect::<Vec<_>>();
    let index = dialoguer::Select::new()
        .with_prompt(question!("Preferred language"))
        .items(&languages)
        .default(0)
        .interact()?;
    Ok(languages[index])
}
