mod commands;
mod gemini;
mod judge;
mod language;
mod log;
mod poller;
mod render;
mod store;
mod workspace;

use clap::{Parser, Subcommand};
use std::io::Write;

/// A command-line client for LeetCode.
#[derive(Parser, Debug)]
#[command(name = "leetcli", version)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create ./problems and the config file, asking for your preferred language.
    Init {
        /// Skip the prompt and use this language.
        #[arg(long)]
        lang: Option<String>,
    },

    /// Fetch a problem by slug, or `daily` for the daily question.
    Fetch {
        slug: String,
        /// Language of the starter code (cpp, python, java, javascript, csharp).
        #[arg(long)]
        lang: Option<String>,
    },

    /// Open the solution file in your editor.
    Solve {
        slug: String,
        #[arg(long)]
        lang: Option<String>,
    },

    /// List all fetched problems.
    List,

    /// Store your LEETCODE_SESSION and csrftoken cookies.
    Login,

    /// Submit your solution to LeetCode.
    Submit {
        slug: String,
        #[arg(long)]
        lang: Option<String>,
        /// Give up after this many status polls. Waits for the verdict by default.
        #[arg(long)]
        max_polls: Option<u32>,
    },

    /// Run your solution against the testcases in testcases.txt.
    Run {
        slug: String,
        #[arg(long)]
        lang: Option<String>,
    },

    /// Analyze time/space complexity of your solution using Gemini.
    Runtime {
        slug: String,
        #[arg(long)]
        lang: Option<String>,
    },

    /// Show the topics and hints of a problem.
    Hint {
        slug: String,
        #[arg(long)]
        lang: Option<String>,
        /// Also ask Gemini for a hint based on your current solution.
        #[arg(long)]
        ai: bool,
    },

    /// Change settings.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Set your Gemini API key.
    SetGeminiKey { key: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            // Help and version go to stdout and succeed, anything else is a
            // usage error.
            let code = if err.use_stderr() { 1 } else { 0 };
            err.print()?;
            std::process::exit(code);
        }
    };

    log::init();

    let result = dispatch(args.command).await;
    std::io::stdout().flush()?;
    std::io::stderr().flush()?;
    if let Err(err) = result {
        error!("{:#}", err);
        if is_fatal(&err) {
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Missing setup and bad language names stop the process with exit 1.
/// Judge, network and filesystem failures are reported and exit 0.
fn is_fatal(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause.is::<store::ConfigError>() || cause.is::<language::UnsupportedLanguage>()
    })
}

async fn dispatch(command: Commands) -> anyhow::Result<()> {
    let store = store::Store::locate()?;
    let command = match command {
        Commands::Init { lang } => return commands::init::main(&store, lang).await,
        command => command,
    };

    // Everything but init needs an initialized config, loaded once here.
    let config = store.load_config()?;
    debug!("Loaded config from {:?}", store.config_path());
    match command {
        Commands::Init { .. } => unreachable!("init runs without a config"),
        Commands::Fetch { slug, lang } => commands::fetch::main(&store, &config, slug, lang).await,
        Commands::Solve { slug, lang } => commands::solve::main(&store, &config, slug, lang).await,
        Commands::List => commands::list::main(&store, &config).await,
        Commands::Login => commands::login::main(&store, config).await,
        Commands::Submit {
            slug,
            lang,
            max_polls,
        } => commands::submit::main(&store, &config, slug, lang, max_polls).await,
        Commands::Run { slug, lang } => commands::run::main(&store, &config, slug, lang).await,
        Commands::Runtime { slug, lang } => {
            commands::runtime::main(&store, &config, slug, lang).await
        }
        Commands::Hint { slug, lang, ai } => {
            commands::hint::main(&store, &config, slug, lang, ai).await
        }
        Commands::Config {
            action: ConfigAction::SetGeminiKey { key },
        } => commands::config::set_gemini_key(&store, config, key).await,
    }
}
