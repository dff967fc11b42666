use std::str::FromStr;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Unsupported language: {0} (expected one of: cpp, python, java, javascript, csharp)")]
pub struct UnsupportedLanguage(pub String);

/// Languages a solution file can be written in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, strum::Display, strum::EnumString, strum::EnumIter)]
pub enum Language {
    #[strum(serialize = "cpp")]
    Cpp,
    #[strum(serialize = "python")]
    Python,
    #[strum(serialize = "java")]
    Java,
    #[strum(serialize = "javascript")]
    JavaScript,
    #[strum(serialize = "csharp")]
    CSharp,
}

impl Language {
    pub fn parse(name: &str) -> Result<Self, UnsupportedLanguage> {
        Self::from_str(name).map_err(|_| UnsupportedLanguage(name.to_string()))
    }

    pub fn extension(self) -> &'static str {
        match self {
            Language::Cpp => ".cpp",
            Language::Python => ".py",
            Language::Java => ".java",
            Language::JavaScript => ".js",
            Language::CSharp => ".cs",
        }
    }

    /// The `langSlug` the judge uses for code snippets and submissions.
    pub fn judge_slug(self) -> &'static str {
        match self {
            Language::Python => "python3",
            Language::Cpp => "cpp",
            Language::Java => "java",
            Language::JavaScript => "javascript",
            Language::CSharp => "csharp",
        }
    }

    pub fn solution_file_name(self) -> String {
        format!("solution{}", self.extension())
    }
}
