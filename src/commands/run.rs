use crate::{
    commands, error, info,
    judge::Solution,
    poller::{self, RunPolicy},
    store::{Config, Store},
    warn,
    workspace::{self, Workspace},
};

pub async fn main(
    store: &Store,
    config: &Config,
    slug: String,
    lang: Option<String>,
) -> anyhow::Result<()> {
    let language = commands::language(config, lang.as_deref())?;
    let judge = commands::authenticated_judge(config)?;
    let slug = judge.resolve_slug(&slug).await?;

    let mut workspace = Workspace::open(config, store.clone());
    let path = workspace.resolve_path(&judge, &slug, language).await?;
    let code = fs_err::read_to_string(&path)?;
    let question_id = workspace.question_id(&judge, &slug).await?;

    let problem_dir = path
        .parent()
        .ok_or_else(|| anyhow::anyhow!("{} has no parent folder", path.display()))?;
    let testcases = workspace::load_testcases(problem_dir)?;
    if testcases.is_empty() {
        warn!(
            "No testcases in {}",
            problem_dir.join(workspace::TESTCASES_FILE).display()
        );
        return Ok(());
    }

    let solution = Solution {
        slug: &slug,
        question_id: &question_id,
        lang: language,
        code: &code,
    };
    let total = testcases.len();
    info!("Running {} testcases...", total);
    poller::run_tests(
        &judge,
        &solution,
        &testcases,
        &RunPolicy::default(),
        |index, input, outcome| {
            println!();
            println!("Testcase {}/{}:\n{}\n---", index + 1, total, input);
            match outcome {
                Ok(outcome) => {
                    for line in outcome.report(&language.to_string()) {
                        println!("{}", line);
                    }
                }
                Err(err) => error!("Run failed: {:#}", err),
            }
        },
    )
    .await;
    Ok(())
}
