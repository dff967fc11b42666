use std::sync::Arc;

use anyhow::Context;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};

use crate::{
    debug, info,
    language::Language,
    poller::Judge,
    render,
    store::Credentials,
};

pub const DEFAULT_BASE_URL: &str = "https://leetcode.com";
pub const DAILY: &str = "daily";

const USER_AGENT: &str = concat!("leetcli/", env!("CARGO_PKG_VERSION"));

const QUESTION_DETAIL_QUERY: &str = r#"
query questionDetail($titleSlug: String!) {
    question(titleSlug: $titleSlug) {
        questionId
        title
        content
        codeSnippets {
            lang
            langSlug
            code
        }
    }
}"#;

const QUESTION_SUMMARY_QUERY: &str = r#"
query questionSummary($titleSlug: String!) {
    question(titleSlug: $titleSlug) {
        questionId
        title
    }
}"#;

const DAILY_QUERY: &str = r#"
query questionOfToday {
    activeDailyCodingChallengeQuestion {
        question {
            titleSlug
        }
    }
}"#;

const TOPICS_QUERY: &str = r#"
query questionTopics($titleSlug: String!) {
    question(titleSlug: $titleSlug) {
        topicTags {
            name
        }
    }
}"#;

const HINTS_QUERY: &str = r#"
query questionHints($titleSlug: String!) {
    question(titleSlug: $titleSlug) {
        hints
    }
}"#;

const TESTCASES_QUERY: &str = r#"
query questionTestcases($titleSlug: String!) {
    question(titleSlug: $titleSlug) {
        exampleTestcaseList
    }
}"#;

const USER_STATUS_QUERY: &str = r#"
query globalData {
    userStatus {
        isSignedIn
        username
    }
}"#;

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct QuestionData<Q> {
    question: Option<Q>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDetail {
    pub question_id: String,
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub code_snippets: Vec<CodeSnippet>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeSnippet {
    pub lang_slug: String,
    pub code: String,
}

impl QuestionDetail {
    /// First snippet whose `langSlug` matches.
    pub fn snippet_for(&self, lang_slug: &str) -> Option<&CodeSnippet> {
        self.code_snippets
            .iter()
            .find(|snippet| snippet.lang_slug == lang_slug)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionSummary {
    pub question_id: String,
    pub title: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DailyData {
    active_daily_coding_challenge_question: Option<DailyQuestion>,
}

#[derive(Debug, Deserialize)]
struct DailyQuestion {
    question: DailySlug,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DailySlug {
    title_slug: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserStatusData {
    user_status: UserStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserStatus {
    is_signed_in: bool,
    #[serde(default)]
    username: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Topics {
    #[serde(default)]
    topic_tags: Vec<TopicTag>,
}

#[derive(Debug, Deserialize)]
struct TopicTag {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Hints {
    #[serde(default)]
    hints: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Testcases {
    #[serde(default)]
    example_testcase_list: Vec<String>,
}

/// Judge-side progress of a submission or run.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Deserialize, strum::Display)]
pub enum CheckState {
    #[serde(rename = "PENDING")]
    #[strum(serialize = "PENDING")]
    Pending,
    #[serde(rename = "STARTED")]
    #[strum(serialize = "STARTED")]
    Started,
    #[serde(rename = "SUCCESS")]
    #[strum(serialize = "SUCCESS")]
    Success,
    #[default]
    #[serde(other)]
    #[strum(serialize = "UNKNOWN")]
    Other,
}

/// Body of `/submissions/detail/<id>/check/`. Submissions and runs share
/// the endpoint but fill different fields, hence all the options.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct CheckResult {
    #[serde(default)]
    pub state: CheckState,
    pub status_msg: Option<String>,
    pub status_runtime: Option<String>,
    pub status_memory: Option<String>,
    pub compile_error: Option<String>,
    pub full_compile_error: Option<String>,
    pub runtime_error: Option<String>,
    pub input_formatted: Option<String>,
    pub expected_output: Option<String>,
    pub code_output: Option<Value>,
    pub std_output_list: Option<Value>,
    pub total_correct: Option<u64>,
    pub total_testcases: Option<u64>,
    pub run_success: Option<bool>,
    pub correct_answer: Option<bool>,
    #[serde(default)]
    pub code_answer: Vec<String>,
    #[serde(default)]
    pub expected_code_answer: Vec<String>,
    pub pretty_lang: Option<String>,
}

impl CheckResult {
    pub fn is_terminal(&self) -> bool {
        self.state == CheckState::Success
    }
}

/// The code and problem a submit or run acts on.
#[derive(Debug, Clone, Copy)]
pub struct Solution<'a> {
    pub slug: &'a str,
    pub question_id: &'a str,
    pub lang: Language,
    pub code: &'a str,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    submission_id: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct InterpretResponse {
    interpret_id: Option<String>,
}

pub struct JudgeClient {
    http: reqwest::Client,
    base_url: String,
    csrf_token: Option<String>,
}

impl JudgeClient {
    /// Credentials are optional: public queries work without them, submit
    /// and run do not.
    pub fn new(base_url: &str, credentials: Option<&Credentials>) -> anyhow::Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let mut cookies = reqwest_cookie_store::CookieStore::default();
        if let Some(credentials) = credentials {
            let origin = reqwest::Url::parse(&base_url)
                .with_context(|| format!("Invalid judge URL: {}", base_url))?;
            for (name, value) in [
                ("LEETCODE_SESSION", &credentials.session),
                ("csrftoken", &credentials.csrf_token),
            ] {
                let cookie = cookie_store::RawCookie::new(name, value.clone());
                cookies
                    .insert_raw(&cookie, &origin)
                    .map_err(|err| anyhow::anyhow!("Failed to store {} cookie: {}", name, err))?;
            }
        }
        let cookies = reqwest_cookie_store::CookieStoreMutex::new(cookies);
        let http = reqwest::Client::builder()
            .cookie_provider(Arc::new(cookies))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            http,
            base_url,
            csrf_token: credentials.map(|credentials| credentials.csrf_token.clone()),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn problem_url(&self, slug: &str) -> String {
        self.url(&format!("/problems/{}/", slug))
    }

    fn authorize(&self, request: reqwest::RequestBuilder, referer: String) -> reqwest::RequestBuilder {
        let request = request.header(reqwest::header::REFERER, referer);
        match &self.csrf_token {
            Some(token) => request.header("x-csrftoken", token),
            None => request,
        }
    }

    async fn graphql<T: DeserializeOwned>(
        &self,
        operation: &str,
        query: &str,
        variables: Value,
    ) -> anyhow::Result<Option<T>> {
        debug!("GraphQL {} {}", operation, variables);
        let body = json!({
            "operationName": operation,
            "query": query,
            "variables": variables,
        });
        let request = self.http.post(self.url("/graphql")).json(&body);
        let response = self
            .authorize(request, self.url("/problemset/all/"))
            .send()
            .await?;
        let response = ensure_ok(response, operation).await?;
        let response: GraphQlResponse<T> = response
            .json()
            .await
            .with_context(|| format!("Malformed response to {}", operation))?;
        Ok(response.data)
    }

    async fn question<Q: DeserializeOwned>(
        &self,
        operation: &str,
        query: &str,
        slug: &str,
    ) -> anyhow::Result<Option<Q>> {
        let data: Option<QuestionData<Q>> = self
            .graphql(operation, query, json!({ "titleSlug": slug }))
            .await?;
        Ok(data.and_then(|data| data.question))
    }

    /// `None` when the judge has no question under `slug`.
    pub async fn question_detail(&self, slug: &str) -> anyhow::Result<Option<QuestionDetail>> {
        self.question("questionDetail", QUESTION_DETAIL_QUERY, slug)
            .await
    }

    pub async fn question_summary(&self, slug: &str) -> anyhow::Result<QuestionSummary> {
        self.question("questionSummary", QUESTION_SUMMARY_QUERY, slug)
            .await?
            .ok_or_else(|| not_found(slug))
    }

    pub async fn question_id(&self, slug: &str) -> anyhow::Result<String> {
        Ok(self.question_summary(slug).await?.question_id)
    }

    pub async fn daily_slug(&self) -> anyhow::Result<String> {
        let data: Option<DailyData> = self
            .graphql("questionOfToday", DAILY_QUERY, json!({}))
            .await?;
        data.and_then(|data| data.active_daily_coding_challenge_question)
            .map(|daily| daily.question.title_slug)
            .ok_or_else(|| anyhow::anyhow!("Invalid daily challenge response"))
    }

    /// Turns the `daily` pseudo-slug into today's real slug.
    pub async fn resolve_slug(&self, slug: &str) -> anyhow::Result<String> {
        if slug != DAILY {
            return Ok(slug.to_string());
        }
        let slug = self.daily_slug().await?;
        info!("Today's daily problem is {}", slug);
        Ok(slug)
    }

    /// Username the session cookie belongs to, `None` if the judge treats
    /// the request as anonymous.
    pub async fn signed_in_user(&self) -> anyhow::Result<Option<String>> {
        let data: Option<UserStatusData> = self
            .graphql("globalData", USER_STATUS_QUERY, json!({}))
            .await?;
        Ok(data
            .map(|data| data.user_status)
            .filter(|status| status.is_signed_in)
            .map(|status| status.username))
    }

    pub async fn topics(&self, slug: &str) -> anyhow::Result<Vec<String>> {
        let topics: Topics = self
            .question("questionTopics", TOPICS_QUERY, slug)
            .await?
            .ok_or_else(|| not_found(slug))?;
        Ok(topics.topic_tags.into_iter().map(|tag| tag.name).collect())
    }

    /// Hints with their HTML markup removed.
    pub async fn hints(&self, slug: &str) -> anyhow::Result<Vec<String>> {
        let hints: Hints = self
            .question("questionHints", HINTS_QUERY, slug)
            .await?
            .ok_or_else(|| not_found(slug))?;
        Ok(hints
            .hints
            .iter()
            .map(|hint| render::strip_tags(hint))
            .collect())
    }

    pub async fn example_testcases(&self, slug: &str) -> anyhow::Result<Vec<String>> {
        let testcases: Option<Testcases> = self
            .question("questionTestcases", TESTCASES_QUERY, slug)
            .await?;
        Ok(testcases
            .map(|testcases| testcases.example_testcase_list)
            .unwrap_or_default())
    }
}

impl Judge for JudgeClient {
    async fn submit(&self, solution: &Solution<'_>) -> anyhow::Result<u64> {
        let body = json!({
            "lang": solution.lang.judge_slug(),
            "question_id": solution.question_id,
            "typed_code": solution.code,
        });
        let request = self
            .http
            .post(self.url(&format!("/problems/{}/submit/", solution.slug)))
            .json(&body);
        let response = self
            .authorize(request, self.problem_url(solution.slug))
            .send()
            .await?;
        let text = ensure_ok(response, "Submission").await?.text().await?;
        let response: SubmitResponse = serde_json::from_str(&text)
            .with_context(|| format!("Invalid JSON. Raw response:\n{}", text))?;
        response
            .submission_id
            .ok_or_else(|| anyhow::anyhow!("No submission_id in response:\n{}", text))
    }

    async fn interpret(&self, solution: &Solution<'_>, input: &str) -> anyhow::Result<String> {
        let body = json!({
            "lang": solution.lang.judge_slug(),
            "question_id": solution.question_id,
            "typed_code": solution.code,
            "data_input": input,
        });
        let request = self
            .http
            .post(self.url(&format!(
                "/problems/{}/interpret_solution/",
                solution.slug
            )))
            .json(&body);
        let response = self
            .authorize(request, self.problem_url(solution.slug))
            .send()
            .await?;
        let text = ensure_ok(response, "Run").await?.text().await?;
        let response: InterpretResponse = serde_json::from_str(&text)
            .with_context(|| format!("Invalid JSON. Raw response:\n{}", text))?;
        response
            .interpret_id
            .ok_or_else(|| anyhow::anyhow!("No interpret_id in response:\n{}", text))
    }

    async fn check(&self, slug: &str, id: &str) -> anyhow::Result<CheckResult> {
        let request = self
            .http
            .get(self.url(&format!("/submissions/detail/{}/check/", id)));
        let response = self
            .authorize(request, self.problem_url(slug))
            .send()
            .await?;
        let response = ensure_ok(response, "Polling").await?;
        Ok(response.json().await.context("Malformed check response")?)
    }

    fn submission_url(&self, id: u64) -> String {
        self.url(&format!("/submissions/detail/{}/", id))
    }
}

fn not_found(slug: &str) -> anyhow::Error {
    anyhow::anyhow!("Problem not found. Check the title slug: \"{}\"", slug)
}

async fn ensure_ok(response: reqwest::Response, what: &str) -> anyhow::Result<reqwest::Response> {
    let status = response.status();
    if status == reqwest::StatusCode::OK {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    anyhow::bail!("{} failed: HTTP {}\n{}", what, status, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn credentials() -> Credentials {
        Credentials {
            session: "session-cookie".to_string(),
            csrf_token: "csrf-cookie".to_string(),
        }
    }

    fn operation(name: &str) -> Matcher {
        Matcher::PartialJson(json!({ "operationName": name }))
    }

    #[tokio::test]
    async fn null_question_is_none() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/graphql")
            .match_body(operation("questionDetail"))
            .with_body(r#"{"data":{"question":null}}"#)
            .create_async()
            .await;

        let client = JudgeClient::new(&server.url(), None).unwrap();
        assert!(client.question_detail("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn detail_picks_the_first_matching_snippet() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/graphql")
            .match_body(Matcher::PartialJson(json!({
                "operationName": "questionDetail",
                "variables": { "titleSlug": "two-sum" },
            })))
            .with_body(
                json!({"data": {"question": {
                    "questionId": "1",
                    "title": "Two Sum",
                    "content": "<p>Find two numbers.</p>",
                    "codeSnippets": [
                        {"lang": "Python", "langSlug": "python", "code": "class Solution(object):"},
                        {"lang": "Python3", "langSlug": "python3", "code": "class Solution:"},
                        {"lang": "Python3", "langSlug": "python3", "code": "second"},
                    ],
                }}})
                .to_string(),
            )
            .create_async()
            .await;

        let client = JudgeClient::new(&server.url(), None).unwrap();
        let detail = client.question_detail("two-sum").await.unwrap().unwrap();
        assert_eq!(detail.question_id, "1");
        assert_eq!(detail.snippet_for("python3").unwrap().code, "class Solution:");
        assert!(detail.snippet_for("rust").is_none());
    }

    #[tokio::test]
    async fn daily_is_resolved_through_its_own_query() {
        let mut server = mockito::Server::new_async().await;
        let daily = server
            .mock("POST", "/graphql")
            .match_body(operation("questionOfToday"))
            .with_body(
                r#"{"data":{"activeDailyCodingChallengeQuestion":{"question":{"titleSlug":"climbing-stairs"}}}}"#,
            )
            .expect(1)
            .create_async()
            .await;

        let client = JudgeClient::new(&server.url(), None).unwrap();
        assert_eq!(client.resolve_slug("daily").await.unwrap(), "climbing-stairs");
        assert_eq!(client.resolve_slug("two-sum").await.unwrap(), "two-sum");
        daily.assert_async().await;
    }

    #[tokio::test]
    async fn topics_and_hints_keep_their_order() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/graphql")
            .match_body(operation("questionTopics"))
            .with_body(
                r#"{"data":{"question":{"topicTags":[{"name":"Array"},{"name":"Hash Table"}]}}}"#,
            )
            .create_async()
            .await;
        server
            .mock("POST", "/graphql")
            .match_body(operation("questionHints"))
            .with_body(
                r#"{"data":{"question":{"hints":["Use a <b>map</b>.","Look up <code>target - x</code>."]}}}"#,
            )
            .create_async()
            .await;

        let client = JudgeClient::new(&server.url(), None).unwrap();
        assert_eq!(client.topics("two-sum").await.unwrap(), ["Array", "Hash Table"]);
        assert_eq!(
            client.hints("two-sum").await.unwrap(),
            ["Use a map.", "Look up target - x."]
        );
    }

    #[tokio::test]
    async fn anonymous_sessions_have_no_user() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/graphql")
            .match_body(operation("globalData"))
            .with_body(r#"{"data":{"userStatus":{"isSignedIn":false,"username":""}}}"#)
            .create_async()
            .await;

        let client = JudgeClient::new(&server.url(), Some(&credentials())).unwrap();
        assert_eq!(client.signed_in_user().await.unwrap(), None);
    }

    #[tokio::test]
    async fn non_200_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/graphql")
            .with_status(403)
            .with_body("forbidden")
            .create_async()
            .await;

        let client = JudgeClient::new(&server.url(), None).unwrap();
        let err = client.question_id("two-sum").await.unwrap_err();
        assert!(err.to_string().contains("403"), "{}", err);
    }

    #[tokio::test]
    async fn submit_sends_csrf_header_and_reads_id() {
        let mut server = mockito::Server::new_async().await;
        let submit = server
            .mock("POST", "/problems/two-sum/submit/")
            .match_header("x-csrftoken", "csrf-cookie")
            .match_body(Matcher::PartialJson(json!({
                "lang": "python3",
                "question_id": "1",
            })))
            .with_body(r#"{"submission_id": 42}"#)
            .create_async()
            .await;

        let client = JudgeClient::new(&server.url(), Some(&credentials())).unwrap();
        let solution = Solution {
            slug: "two-sum",
            question_id: "1",
            lang: Language::Python,
            code: "class Solution: pass",
        };
        assert_eq!(client.submit(&solution).await.unwrap(), 42);
        submit.assert_async().await;
        assert_eq!(
            client.submission_url(42),
            format!("{}/submissions/detail/42/", server.url())
        );
    }

    #[tokio::test]
    async fn submit_without_id_fails() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/problems/two-sum/submit/")
            .with_body(r#"{"error": "rate limited"}"#)
            .create_async()
            .await;

        let client = JudgeClient::new(&server.url(), Some(&credentials())).unwrap();
        let solution = Solution {
            slug: "two-sum",
            question_id: "1",
            lang: Language::Cpp,
            code: "",
        };
        let err = client.submit(&solution).await.unwrap_err();
        assert!(err.to_string().contains("No submission_id"));
    }

    #[test]
    fn pending_check_parses_with_defaults() {
        let pending: CheckResult = serde_json::from_str(r#"{"state":"PENDING"}"#).unwrap();
        assert_eq!(pending.state, CheckState::Pending);
        assert!(!pending.is_terminal());

        let odd: CheckResult = serde_json::from_str(r#"{"state":"QUEUED"}"#).unwrap();
        assert_eq!(odd.state, CheckState::Other);

        let done: CheckResult = serde_json::from_str(
            r#"{"state":"SUCCESS","status_msg":"Accepted","code_answer":["[0,1]"],"total_correct":null}"#,
        )
        .unwrap();
        assert!(done.is_terminal());
        assert_eq!(done.code_answer, ["[0,1]"]);
        assert_eq!(done.total_correct, None);
    }
}
