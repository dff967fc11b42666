use crate::{
    commands,
    store::{Config, Store},
    workspace::{self, Workspace},
};

pub async fn main(
    store: &Store,
    config: &Config,
    slug: String,
    lang: Option<String>,
) -> anyhow::Result<()> {
    let language = commands::language(config, lang.as_deref())?;
    let judge = commands::public_judge(config)?;
    let slug = judge.resolve_slug(&slug).await?;

    let mut workspace = Workspace::open(config, store.clone());
    let path = workspace.resolve_path(&judge, &slug, language).await?;
    workspace::open_in_editor(&path)
}
