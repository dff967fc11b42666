use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::{
    debug, info,
    judge::JudgeClient,
    language::Language,
    render,
    store::{Config, ProblemIndex, Store},
    warn,
};

pub const README_FILE: &str = "README.md";
pub const TESTCASES_FILE: &str = "testcases.txt";
pub const TESTCASE_DELIMITER: &str = "\n---\n";

const FORBIDDEN_IN_TITLE: [char; 9] = ['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| !FORBIDDEN_IN_TITLE.contains(c))
        .collect()
}

/// `"<id>. <title>"`, the folder a problem lives in.
pub fn folder_name(id: &str, title: &str) -> String {
    format!("{}. {}", id, sanitize_title(title))
}

pub fn split_testcases(text: &str) -> Vec<String> {
    text.split(TESTCASE_DELIMITER).map(str::to_string).collect()
}

pub fn join_testcases(testcases: &[String]) -> String {
    testcases.join(TESTCASE_DELIMITER)
}

/// Reads `testcases.txt` from a problem folder. A blank file holds no
/// testcases. Windows line endings are read as `\n`.
pub fn load_testcases(problem_dir: &Path) -> anyhow::Result<Vec<String>> {
    let text = fs_err::read_to_string(problem_dir.join(TESTCASES_FILE))?.replace("\r\n", "\n");
    if text.trim().is_empty() {
        return Ok(vec![]);
    }
    Ok(split_testcases(&text))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedProblem {
    pub folder: String,
    pub languages: Vec<Language>,
    pub fetched_at: Option<DateTime<Utc>>,
}

/// The problems directory plus the slug index that points into it.
pub struct Workspace {
    problems_dir: PathBuf,
    store: Store,
    index: ProblemIndex,
}

impl Workspace {
    pub fn open(config: &Config, store: Store) -> Self {
        let index = store.load_index();
        Self {
            problems_dir: config.problems_dir.clone(),
            store,
            index,
        }
    }

    pub fn problems_dir(&self) -> &Path {
        &self.problems_dir
    }

    /// Downloads a problem into its folder and returns the rendered
    /// statement. An unknown slug is reported in the returned text and
    /// leaves the disk untouched.
    pub async fn fetch_problem(
        &mut self,
        judge: &JudgeClient,
        slug: &str,
        lang: &str,
    ) -> anyhow::Result<String> {
        let language = Language::parse(lang)?;
        let Some(question) = judge.question_detail(slug).await? else {
            return Ok(format!(
                "Problem not found. Check the title slug: \"{}\"",
                slug
            ));
        };

        let markdown = render::render_html(question.content.as_deref().unwrap_or_default());
        let starter_code = match question.snippet_for(language.judge_slug()) {
            Some(snippet) => snippet.code.clone(),
            None => format!("// No code found for {}\n", lang),
        };

        let folder = folder_name(&question.question_id, &question.title);
        let dir = self.problems_dir.join(&folder);
        fs_err::create_dir_all(&dir)?;

        fs_err::write(
            dir.join(README_FILE),
            format!("# {}\n\n{}\n", question.title, markdown),
        )?;

        let solution_path = dir.join(language.solution_file_name());
        if solution_path.exists() {
            info!("Keeping existing {}", solution_path.display());
        } else {
            let mut code = starter_code;
            if !code.ends_with('\n') {
                code.push('\n');
            }
            fs_err::write(&solution_path, code)?;
        }

        self.fetch_testcases(judge, slug, &dir).await?;

        self.index
            .record(slug, &question.question_id, &question.title, &folder);
        self.store.save_index(&self.index)?;
        debug!("Fetched {} into {:?}", slug, dir);

        Ok(format!("{}\n\n{}", question.title, markdown))
    }

    /// Writes the judge's example inputs to `testcases.txt` unless the file
    /// is already there.
    pub async fn fetch_testcases(
        &self,
        judge: &JudgeClient,
        slug: &str,
        dir: &Path,
    ) -> anyhow::Result<()> {
        let path = dir.join(TESTCASES_FILE);
        if path.exists() {
            debug!("Keeping existing {:?}", path);
            return Ok(());
        }
        let testcases = judge.example_testcases(slug).await?;
        if testcases.is_empty() {
            warn!("The judge returned no example testcases for {}", slug);
        }
        fs_err::write(&path, join_testcases(&testcases))?;
        Ok(())
    }

    /// Folder of a fetched problem. The index answers when it can; otherwise,
    /// or when the indexed folder has gone missing, the judge is asked for
    /// the id and title again.
    pub async fn problem_dir(&mut self, judge: &JudgeClient, slug: &str) -> anyhow::Result<PathBuf> {
        if let Some(entry) = self.index.get(slug) {
            let dir = self.problems_dir.join(&entry.folder);
            if dir.is_dir() {
                return Ok(dir);
            }
            debug!("Index entry for {} points to a missing folder, dropping it", slug);
            self.index.invalidate(slug);
            self.store.save_index(&self.index)?;
        }

        let summary = judge.question_summary(slug).await?;
        let dir = self
            .problems_dir
            .join(folder_name(&summary.question_id, &summary.title));
        if !dir.is_dir() {
            anyhow::bail!(
                "Problem folder not found: {}\nRun `leetcli fetch {}` first.",
                dir.display(),
                slug
            );
        }
        Ok(dir)
    }

    /// Numeric id the judge expects in submit and run bodies.
    pub async fn question_id(&self, judge: &JudgeClient, slug: &str) -> anyhow::Result<String> {
        match self.index.get(slug) {
            Some(entry) => Ok(entry.id.clone()),
            None => judge.question_id(slug).await,
        }
    }

    pub async fn resolve_path(
        &mut self,
        judge: &JudgeClient,
        slug: &str,
        language: Language,
    ) -> anyhow::Result<PathBuf> {
        let dir = self.problem_dir(judge, slug).await?;
        let path = dir.join(language.solution_file_name());
        if !path.is_file() {
            anyhow::bail!(
                "Solution file not found: {}\nRun `leetcli fetch {} --lang={}` first.",
                path.display(),
                slug,
                language
            );
        }
        Ok(path)
    }

    /// Every problem folder, ordered by problem id.
    pub fn list(&self) -> anyhow::Result<Vec<ListedProblem>> {
        if !self.problems_dir.is_dir() {
            anyhow::bail!(
                "Problems directory not found: {}",
                self.problems_dir.display()
            );
        }

        let mut problems = vec![];
        for entry in fs_err::read_dir(&self.problems_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let folder = entry.file_name().to_string_lossy().into_owned();
            let languages = <Language as strum::IntoEnumIterator>::iter()
                .filter(|lang| entry.path().join(lang.solution_file_name()).is_file())
                .collect();
            let fetched_at = self
                .index
                .find_by_folder(&folder)
                .map(|(_, entry)| entry.fetched_at);
            problems.push(ListedProblem {
                folder,
                languages,
                fetched_at,
            });
        }
        problems.sort_by_key(|problem| (problem_number(&problem.folder), problem.folder.clone()));
        Ok(problems)
    }
}

fn problem_number(folder: &str) -> u64 {
    folder
        .split_once(". ")
        .and_then(|(id, _)| id.parse().ok())
        .unwrap_or(u64::MAX)
}

/// Opens `path` in `$VISUAL` or `$EDITOR`, falling back to the system
/// handler. The editor's exit status is not checked.
pub fn open_in_editor(path: &Path) -> anyhow::Result<()> {
    let editor = ["VISUAL", "EDITOR"]
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|value| !value.trim().is_empty());

    let Some(editor) = editor else {
        info!("Opening {}", path.display());
        open::that_detached(path)?;
        return Ok(());
    };

    let mut words = editor.split_whitespace();
    let program = words.next().unwrap_or_default();
    info!("Opening {} with {}", path.display(), program);
    let status = std::process::Command::new(program)
        .args(words)
        .arg(path)
        .status()?;
    debug!("Editor exited with {}", status);
    Ok(())
}
