use std::time::Duration;

use serde_json::Value;

use crate::{
    debug, info,
    judge::{CheckResult, Solution},
};

/// Remote operations the submit and run loops depend on.
#[allow(async_fn_in_trait)]
pub trait Judge {
    /// Queues a graded submission and returns its id.
    async fn submit(&self, solution: &Solution<'_>) -> anyhow::Result<u64>;
    /// Queues a run against `input` and returns the interpret id.
    async fn interpret(&self, solution: &Solution<'_>, input: &str) -> anyhow::Result<String>;
    async fn check(&self, slug: &str, id: &str) -> anyhow::Result<CheckResult>;
    fn submission_url(&self, id: u64) -> String;
}

#[derive(Debug, Clone, Copy)]
pub struct SubmitPolicy {
    pub interval: Duration,
    /// `None` keeps polling until the judge finishes.
    pub max_attempts: Option<u32>,
}

impl Default for SubmitPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            max_attempts: None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RunPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
    /// Pause between two testcases, the judge rate-limits runs.
    pub between_tests: Duration,
}

impl Default for RunPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_attempts: 10,
            between_tests: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    Finished {
        result: CheckResult,
        detail_url: String,
    },
    TimedOut {
        attempts: u32,
        detail_url: String,
    },
}

impl SubmitOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SubmitOutcome::Finished { result, .. } if result.status_msg.as_deref() == Some("Accepted"))
    }

    pub fn report(&self) -> Vec<String> {
        let (result, detail_url) = match self {
            SubmitOutcome::TimedOut {
                attempts,
                detail_url,
            } => {
                return vec![
                    format!("Timed out after {} polls, the judge is still working.", attempts),
                    format!("Check the result later at {}", detail_url),
                ];
            }
            SubmitOutcome::Finished { result, detail_url } => (result, detail_url),
        };

        let status = result.status_msg.as_deref().unwrap_or("Unknown");
        let mut lines = vec![format!("Result: {}", status)];
        if self.is_accepted() {
            lines.push(format!(
                "Accepted! Runtime: {}, Memory: {}",
                result.status_runtime.as_deref().unwrap_or("N/A"),
                result.status_memory.as_deref().unwrap_or("N/A"),
            ));
            return lines;
        }

        lines.push(format!("Rejected: {}", status));
        if let Some(compile_error) = result
            .full_compile_error
            .as_deref()
            .or(result.compile_error.as_deref())
            .filter(|error| !error.is_empty())
        {
            lines.push(format!("Compile Error:\n{}", compile_error));
        }
        if let Some(runtime_error) = &result.runtime_error {
            lines.push(format!("Runtime Error:\n{}", runtime_error));
        }
        if let Some(input) = &result.input_formatted {
            lines.push(format!("Input:            {}", input));
        }
        if let Some(expected) = &result.expected_output {
            lines.push(format!("Expected Output:  {}", expected));
        }
        if let Some(output) = &result.code_output {
            lines.push(format!("Your Output:      {}", plain(output)));
        }
        if let (Some(correct), Some(total)) = (result.total_correct, result.total_testcases) {
            lines.push(format!("Testcases Passed: {} / {}", correct, total));
        }
        lines.push(String::new());
        lines.push("View full details:".to_string());
        lines.push(format!("   {}", detail_url));
        lines
    }
}

/// Submits and polls until the judge reports a terminal state, or until the
/// policy's attempt budget runs out.
pub async fn submit_and_wait<J: Judge>(
    judge: &J,
    solution: &Solution<'_>,
    policy: SubmitPolicy,
) -> anyhow::Result<SubmitOutcome> {
    let submission_id = judge.submit(solution).await?;
    let detail_url = judge.submission_url(submission_id);
    debug!("Submission id: {}", submission_id);
    info!("Waiting for result...");

    let id = submission_id.to_string();
    let mut attempts = 0;
    loop {
        if policy.max_attempts.is_some_and(|max| attempts >= max) {
            return Ok(SubmitOutcome::TimedOut {
                attempts,
                detail_url,
            });
        }
        tokio::time::sleep(policy.interval).await;
        attempts += 1;

        let result = judge.check(solution.slug, &id).await?;
        debug!("Poll #{}: {}", attempts, result.state);
        if result.is_terminal() {
            return Ok(SubmitOutcome::Finished { result, detail_url });
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub result: CheckResult,
    pub polls: u32,
    /// False when the poll budget ran out before a terminal state; `result`
    /// is then the last, still pending, answer.
    pub complete: bool,
}

impl RunOutcome {
    pub fn report(&self, language: &str) -> Vec<String> {
        let result = &self.result;
        let mut lines = vec![];
        if !self.complete {
            lines.push(format!(
                "Still pending after {} polls, the result may be incomplete.",
                self.polls
            ));
        }
        lines.push(format!(
            "Status:        {}",
            result.status_msg.as_deref().unwrap_or("Unknown")
        ));

        if let Some(compile_error) = result.compile_error.as_deref().filter(|e| !e.is_empty()) {
            lines.push("Compile Error:".to_string());
            lines.push(compile_error.to_string());
            return lines;
        }

        if !result.run_success.unwrap_or(false) {
            lines.push("Runtime Error or Submission Failed".to_string());
            if let Some(runtime_error) = &result.runtime_error {
                lines.push(runtime_error.clone());
            }
            if let Some(output) = &result.std_output_list {
                lines.push(format!("Output: {}", plain(output)));
            }
            return lines;
        }

        lines.push(format!(
            "Correct:       {}",
            match result.correct_answer {
                Some(true) => "Yes",
                Some(false) => "No",
                None => "Unknown",
            }
        ));
        if let Some(answer) = result.code_answer.first() {
            lines.push(format!("Your Output:   {}", answer));
        }
        if let Some(expected) = result.expected_code_answer.first() {
            lines.push(format!("Expected:      {}", expected));
        }
        lines.push(format!(
            "Runtime:       {}",
            result.status_runtime.as_deref().unwrap_or("N/A")
        ));
        lines.push(format!(
            "Memory:        {}",
            result.status_memory.as_deref().unwrap_or("N/A")
        ));
        lines.push(format!(
            "Language:      {}",
            result.pretty_lang.as_deref().unwrap_or(language)
        ));
        lines
    }
}

/// Runs `solution` against one input. Polls at most `policy.max_attempts`
/// times.
pub async fn run_once<J: Judge>(
    judge: &J,
    solution: &Solution<'_>,
    input: &str,
    policy: &RunPolicy,
) -> anyhow::Result<RunOutcome> {
    let interpret_id = judge.interpret(solution, input).await?;
    debug!("Interpret id: {}", interpret_id);
    info!("Waiting for result...");

    let mut result = CheckResult::default();
    let mut polls = 0;
    while polls < policy.max_attempts {
        result = judge.check(solution.slug, &interpret_id).await?;
        polls += 1;
        if result.is_terminal() {
            break;
        }
        tokio::time::sleep(policy.interval).await;
    }
    Ok(RunOutcome {
        complete: result.is_terminal(),
        result,
        polls,
    })
}

/// Runs every testcase in order, one at a time. A failing testcase is handed
/// to `on_result` and does not stop the rest.
pub async fn run_tests<J: Judge>(
    judge: &J,
    solution: &Solution<'_>,
    testcases: &[String],
    policy: &RunPolicy,
    mut on_result: impl FnMut(usize, &str, anyhow::Result<RunOutcome>),
) {
    for (index, input) in testcases.iter().enumerate() {
        if index > 0 {
            tokio::time::sleep(policy.between_tests).await;
        }
        let outcome = run_once(judge, solution, input, policy).await;
        on_result(index, input, outcome);
    }
}

fn plain(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Array(items) => items.iter().map(plain).collect::<Vec<_>>().join("\n"),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{judge::CheckState, language::Language};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Hands out canned check results in order.
    #[derive(Default)]
    struct ScriptedJudge {
        checks: Mutex<VecDeque<CheckResult>>,
        interprets: Mutex<Vec<String>>,
        polls: Mutex<u32>,
    }

    impl ScriptedJudge {
        fn new(checks: impl IntoIterator<Item = CheckResult>) -> Self {
            Self {
                checks: Mutex::new(checks.into_iter().collect()),
                ..Default::default()
            }
        }

        fn polls(&self) -> u32 {
            *self.polls.lock().unwrap()
        }
    }

    impl Judge for ScriptedJudge {
        async fn submit(&self, _solution: &Solution<'_>) -> anyhow::Result<u64> {
            Ok(7)
        }

        async fn interpret(&self, _solution: &Solution<'_>, input: &str) -> anyhow::Result<String> {
            self.interprets.lock().unwrap().push(input.to_string());
            Ok("runcode_1".to_string())
        }

        async fn check(&self, _slug: &str, _id: &str) -> anyhow::Result<CheckResult> {
            *self.polls.lock().unwrap() += 1;
            self.checks
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| anyhow::anyhow!("no more scripted results"))
        }

        fn submission_url(&self, id: u64) -> String {
            format!("https://judge.test/submissions/detail/{}/", id)
        }
    }

    fn solution() -> Solution<'static> {
        Solution {
            slug: "two-sum",
            question_id: "1",
            lang: Language::Cpp,
            code: "class Solution {};",
        }
    }

    fn pending() -> CheckResult {
        CheckResult {
            state: CheckState::Pending,
            ..Default::default()
        }
    }

    fn accepted() -> CheckResult {
        CheckResult {
            state: CheckState::Success,
            status_msg: Some("Accepted".to_string()),
            status_runtime: Some("3 ms".to_string()),
            status_memory: Some("12.1 MB".to_string()),
            ..Default::default()
        }
    }

    fn finished_run() -> CheckResult {
        CheckResult {
            state: CheckState::Success,
            status_msg: Some("Accepted".to_string()),
            run_success: Some(true),
            correct_answer: Some(true),
            code_answer: vec!["[0,1]".to_string(), "ignored".to_string()],
            expected_code_answer: vec!["[0,1]".to_string()],
            status_runtime: Some("0 ms".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn submit_stops_at_the_first_terminal_poll() {
        let judge = ScriptedJudge::new([pending(), pending(), accepted(), pending()]);
        let start = tokio::time::Instant::now();

        let outcome = submit_and_wait(&judge, &solution(), SubmitPolicy::default())
            .await
            .unwrap();

        assert_eq!(judge.polls(), 3);
        let waited = start.elapsed();
        assert!(waited >= Duration::from_secs(6) && waited < Duration::from_secs(7));
        assert!(outcome.is_accepted());
        let report = outcome.report();
        assert_eq!(report[0], "Result: Accepted");
        assert_eq!(report[1], "Accepted! Runtime: 3 ms, Memory: 12.1 MB");
    }

    #[tokio::test(start_paused = true)]
    async fn bounded_submit_times_out() {
        let judge = ScriptedJudge::new([pending(), pending(), pending()]);
        let policy = SubmitPolicy {
            max_attempts: Some(2),
            ..Default::default()
        };

        let outcome = submit_and_wait(&judge, &solution(), policy).await.unwrap();

        assert_eq!(judge.polls(), 2);
        assert!(matches!(outcome, SubmitOutcome::TimedOut { attempts: 2, .. }));
        assert!(!outcome.is_accepted());
    }

    #[test]
    fn rejected_submission_lists_only_present_fields() {
        let outcome = SubmitOutcome::Finished {
            result: CheckResult {
                state: CheckState::Success,
                status_msg: Some("Wrong Answer".to_string()),
                input_formatted: Some("[2,7,11,15], 9".to_string()),
                expected_output: Some("[0,1]".to_string()),
                code_output: Some(Value::String("[1,0]".to_string())),
                total_correct: Some(10),
                total_testcases: Some(63),
                ..Default::default()
            },
            detail_url: "https://judge.test/submissions/detail/7/".to_string(),
        };

        let report = outcome.report();
        assert_eq!(
            report,
            [
                "Result: Wrong Answer",
                "Rejected: Wrong Answer",
                "Input:            [2,7,11,15], 9",
                "Expected Output:  [0,1]",
                "Your Output:      [1,0]",
                "Testcases Passed: 10 / 63",
                "",
                "View full details:",
                "   https://judge.test/submissions/detail/7/",
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn run_gives_up_after_ten_polls() {
        let judge = ScriptedJudge::new(std::iter::repeat_with(pending).take(12));

        let outcome = run_once(&judge, &solution(), "[1]", &RunPolicy::default())
            .await
            .unwrap();

        assert_eq!(judge.polls(), 10);
        assert!(!outcome.complete);
        assert!(outcome.report("cpp")[0].starts_with("Still pending after 10 polls"));
    }

    #[test]
    fn rejected_submit_prefers_the_full_compile_error() {
        let outcome = SubmitOutcome::Finished {
            result: CheckResult {
                state: CheckState::Success,
                status_msg: Some("Compile Error".to_string()),
                compile_error: Some("Line 3: error".to_string()),
                full_compile_error: Some("Line 3: error: expected ';' before '}'".to_string()),
                ..Default::default()
            },
            detail_url: "https://leetcode.com/submissions/detail/7/".to_string(),
        };
        assert!(!outcome.is_accepted());
        assert_eq!(
            outcome.report(),
            [
                "Result: Compile Error",
                "Rejected: Compile Error",
                "Compile Error:\nLine 3: error: expected ';' before '}'",
                "",
                "View full details:",
                "   https://leetcode.com/submissions/detail/7/",
            ]
        );
    }

    #[test]
    fn rejected_submit_skips_an_empty_compile_error() {
        let outcome = SubmitOutcome::Finished {
            result: CheckResult {
                state: CheckState::Success,
                status_msg: Some("Runtime Error".to_string()),
                compile_error: Some(String::new()),
                runtime_error: Some("IndexError: list index out of range".to_string()),
                ..Default::default()
            },
            detail_url: "https://leetcode.com/submissions/detail/8/".to_string(),
        };
        let report = outcome.report();
        assert!(!report.iter().any(|line| line.starts_with("Compile Error")));
        assert_eq!(report[2], "Runtime Error:\nIndexError: list index out of range");
    }

    #[test]
    fn run_report_shows_first_answers() {
        let outcome = RunOutcome {
            result: finished_run(),
            polls: 1,
            complete: true,
        };
        assert_eq!(
            outcome.report("cpp"),
            [
                "Status:        Accepted",
                "Correct:       Yes",
                "Your Output:   [0,1]",
                "Expected:      [0,1]",
                "Runtime:       0 ms",
                "Memory:        N/A",
                "Language:      cpp",
            ]
        );
    }

    #[test]
    fn run_report_stops_at_compile_error() {
        let outcome = RunOutcome {
            result: CheckResult {
                state: CheckState::Success,
                status_msg: Some("Compile Error".to_string()),
                compile_error: Some("Line 1: expected ';'".to_string()),
                run_success: Some(false),
                ..Default::default()
            },
            polls: 1,
            complete: true,
        };
        assert_eq!(
            outcome.report("cpp"),
            [
                "Status:        Compile Error",
                "Compile Error:",
                "Line 1: expected ';'"
            ]
        );
    }

    #[test]
    fn failed_run_prints_output_and_stops() {
        let outcome = RunOutcome {
            result: CheckResult {
                state: CheckState::Success,
                status_msg: Some("Runtime Error".to_string()),
                run_success: Some(false),
                std_output_list: Some(serde_json::json!(["debug line", ""])),
                correct_answer: Some(false),
                ..Default::default()
            },
            polls: 1,
            complete: true,
        };
        let report = outcome.report("python");
        assert_eq!(report[1], "Runtime Error or Submission Failed");
        assert_eq!(report.last().unwrap(), "Output: debug line\n");
        assert!(!report.iter().any(|line| line.starts_with("Correct")));
    }

    #[tokio::test(start_paused = true)]
    async fn testcases_run_sequentially_with_one_pause_between() {
        let judge = ScriptedJudge::new([finished_run(), finished_run()]);
        let testcases = vec!["[2,7]\n9".to_string(), "[3,3]\n6".to_string()];
        let start = tokio::time::Instant::now();
        let mut seen = vec![];

        run_tests(
            &judge,
            &solution(),
            &testcases,
            &RunPolicy::default(),
            |index, input, outcome| {
                assert!(outcome.unwrap().complete);
                seen.push((index, input.to_string()));
            },
        )
        .await;

        assert_eq!(*judge.interprets.lock().unwrap(), testcases);
        assert_eq!(seen, [(0, testcases[0].clone()), (1, testcases[1].clone())]);
        let waited = start.elapsed();
        assert!(waited >= Duration::from_secs(5) && waited < Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn a_failing_testcase_does_not_stop_the_rest() {
        let judge = ScriptedJudge::new([finished_run()]);
        let testcases = vec!["a".to_string(), "b".to_string()];
        let mut failures = 0;

        run_tests(
            &judge,
            &solution(),
            &testcases,
            &RunPolicy::default(),
            |_, _, outcome| {
                if outcome.is_err() {
                    failures += 1;
                }
            },
        )
        .await;

        assert_eq!(judge.interprets.lock().unwrap().len(), 2);
        assert_eq!(failures, 1);
    }
}
