use crate::{
    commands,
    judge::Solution,
    poller::{self, SubmitPolicy},
    store::{Config, Store},
    success, warn,
    workspace::Workspace,
};

pub async fn main(
    store: &Store,
    config: &Config,
    slug: String,
    lang: Option<String>,
    max_polls: Option<u32>,
) -> anyhow::Result<()> {
    let language = commands::language(config, lang.as_deref())?;
    let judge = commands::authenticated_judge(config)?;
    let slug = judge.resolve_slug(&slug).await?;

    let mut workspace = Workspace::open(config, store.clone());
    let path = workspace.resolve_path(&judge, &slug, language).await?;
    let code = fs_err::read_to_string(&path)?;
    let question_id = workspace.question_id(&judge, &slug).await?;

    let solution = Solution {
        slug: &slug,
        question_id: &question_id,
        lang: language,
        code: &code,
    };
    let policy = SubmitPolicy {
        max_attempts: max_polls,
        ..Default::default()
    };
    let outcome = poller::submit_and_wait(&judge, &solution, policy).await?;

    let mut report = outcome.report().into_iter();
    if let Some(headline) = report.next() {
        if outcome.is_accepted() {
            success!("{}", headline);
        } else {
            warn!("{}", headline);
        }
    }
    for line in report {
        println!("{}", line);
    }
    Ok(())
}
