use crate::{
    commands,
    gemini::{self, GeminiClient},
    info,
    store::{Config, Store},
    workspace::{self, Workspace},
};

pub async fn main(
    store: &Store,
    config: &Config,
    slug: String,
    lang: Option<String>,
    ai: bool,
) -> anyhow::Result<()> {
    let judge = commands::public_judge(config)?;
    let slug = judge.resolve_slug(&slug).await?;

    let topics = judge.topics(&slug).await?;
    println!("Topics for \"{}\":", slug);
    for line in numbered(&topics) {
        println!("{}", line);
    }

    let hints = judge.hints(&slug).await?;
    println!("Hints for \"{}\":", slug);
    for line in numbered(&hints) {
        println!("{}", line);
    }

    if !ai {
        return Ok(());
    }

    let api_key = config.gemini_key()?;
    let language = commands::language(config, lang.as_deref())?;
    let mut workspace = Workspace::open(config, store.clone());
    let path = workspace.resolve_path(&judge, &slug, language).await?;
    let code = fs_err::read_to_string(&path)?;
    let statement = path
        .parent()
        .map(|dir| dir.join(workspace::README_FILE))
        .and_then(|readme| fs_err::read_to_string(readme).ok())
        .unwrap_or_else(|| slug.clone());

    info!("Asking Gemini for a hint...");
    let gemini = GeminiClient::new(gemini::DEFAULT_BASE_URL, api_key)?;
    let hint = gemini.suggest_hint(&statement, &code).await?;
    println!();
    println!("AI hint:");
    println!("  {}", hint);
    Ok(())
}

fn numbered(items: &[String]) -> Vec<String> {
    if items.is_empty() {
        return vec!["  (none)".to_string()];
    }
    items
        .iter()
        .enumerate()
        .map(|(index, item)| format!("  {}. {}", index + 1, item))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn items_are_numbered_from_one() {
        let topics = ["Array".to_string(), "Hash Table".to_string()];
        assert_eq!(numbered(&topics), ["  1. Array", "  2. Hash Table"]);
    }

    #[test]
    fn empty_lists_say_none() {
        assert_eq!(numbered(&[]), ["  (none)"]);
    }
}
