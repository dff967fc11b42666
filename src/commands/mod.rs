pub mod config;
pub mod fetch;
pub mod hint;
pub mod init;
pub mod list;
pub mod login;
pub mod run;
pub mod runtime;
pub mod solve;
pub mod submit;

use crate::{
    judge::{self, JudgeClient},
    language::Language,
    store::Config,
};

/// Client for public queries. Cookies are attached when the user has logged
/// in, but are not required.
fn public_judge(config: &Config) -> anyhow::Result<JudgeClient> {
    JudgeClient::new(judge::DEFAULT_BASE_URL, config.credentials().ok().as_ref())
}

/// Client for submit and run; fails when `login` has not been done.
fn authenticated_judge(config: &Config) -> anyhow::Result<JudgeClient> {
    let credentials = config.credentials()?;
    JudgeClient::new(judge::DEFAULT_BASE_URL, Some(&credentials))
}

fn language(config: &Config, lang: Option<&str>) -> anyhow::Result<Language> {
    Ok(Language::parse(lang.unwrap_or(&config.lang))?)
}
