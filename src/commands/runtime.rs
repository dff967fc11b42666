use crate::{
    commands,
    gemini::{self, Complexity, GeminiClient},
    info,
    store::{Config, Store},
    warn,
    workspace::Workspace,
};

pub async fn main(
    store: &Store,
    config: &Config,
    slug: String,
    lang: Option<String>,
) -> anyhow::Result<()> {
    let api_key = config.gemini_key()?;
    let language = commands::language(config, lang.as_deref())?;
    let judge = commands::public_judge(config)?;
    let slug = judge.resolve_slug(&slug).await?;

    let mut workspace = Workspace::open(config, store.clone());
    let path = workspace.resolve_path(&judge, &slug, language).await?;
    let code = fs_err::read_to_string(&path)?;

    info!("Asking Gemini about {}...", path.display());
    let gemini = GeminiClient::new(gemini::DEFAULT_BASE_URL, api_key)?;
    println!();
    println!("AI Runtime Analysis (experimental):");
    match gemini.analyze_complexity(&code).await? {
        Complexity::Analysis { time, space } => {
            println!("  Time:  {}", time);
            println!("  Space: {}", space);
        }
        Complexity::Rejected(reason) => warn!("{}", reason),
    }
    Ok(())
}
