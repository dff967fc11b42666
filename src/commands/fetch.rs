use crate::{
    commands,
    store::{Config, Store},
    workspace::Workspace,
};

pub async fn main(
    store: &Store,
    config: &Config,
    slug: String,
    lang: Option<String>,
) -> anyhow::Result<()> {
    let judge = commands::public_judge(config)?;
    let slug = judge.resolve_slug(&slug).await?;
    let lang = lang.unwrap_or_else(|| config.lang.clone());

    let mut workspace = Workspace::open(config, store.clone());
    let statement = workspace.fetch_problem(&judge, &slug, &lang).await?;
    println!("{}", statement);
    Ok(())
}
