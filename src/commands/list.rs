use crate::{
    log,
    store::{Config, Store},
    workspace::Workspace,
};

pub async fn main(store: &Store, config: &Config) -> anyhow::Result<()> {
    let workspace = Workspace::open(config, store.clone());
    let problems = workspace.list()?;
    if problems.is_empty() {
        println!("No problems fetched yet in {}", workspace.problems_dir().display());
        return Ok(());
    }

    println!("Fetched problems:");
    for problem in problems {
        let languages = if problem.languages.is_empty() {
            " ".to_string()
        } else {
            problem
                .languages
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        };
        let fetched = problem
            .fetched_at
            .map(|time| {
                format!(
                    "  (fetched {})",
                    time.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M")
                )
            })
            .unwrap_or_default();
        println!(
            "  [{}] {}{}",
            languages,
            log::bold(&problem.folder),
            fetched
        );
    }
    Ok(())
}
