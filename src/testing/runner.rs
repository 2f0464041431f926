//! Test runner implementation
//!
//! Runs a suite: one setup phase against the server API, then every
//! scenario in order through a single browser session. A failing scenario
//! is reported and the runner moves on; a failing setup aborts the suite.

use std::future::Future;
use std::path::{Path, PathBuf};

use colored::Colorize;
use serde::Serialize;
use tokio::time::{sleep, Instant};

use crate::api::{AuthSession, ServerClient};
use crate::browser::{Browser, WaitPolicy};
use crate::common::{join_url, paths, timestamp_millis, Error, Result};

use super::config::{TestScenario, TestStep, TestSuite};
use super::template::Vars;

/// Result of one scenario
#[derive(Debug, Clone, Serialize)]
pub struct TestResult {
    pub name: String,
    pub passed: bool,
    pub steps_run: usize,
    pub steps_total: usize,
    pub error: Option<String>,
    pub screenshot: Option<PathBuf>,
    pub duration_ms: u64,
}

/// Result of a suite run
#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    pub suite: String,
    pub team: String,
    pub results: Vec<TestResult>,
}

impl SuiteReport {
    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.passed).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.passed()
    }

    /// `Ok` when every scenario passed, `SuiteFailed` otherwise
    pub fn into_result(self) -> Result<Self> {
        if self.failed() == 0 {
            Ok(self)
        } else {
            Err(Error::SuiteFailed {
                failed: self.failed(),
                total: self.results.len(),
            })
        }
    }
}

/// Admin login used for setup
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Knobs for a suite run
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Server base URL, prefixed to `visit` paths
    pub base_url: String,
    /// Retry schedule for assertions
    pub wait: WaitPolicy,
    /// Only run scenarios whose names contain one of these
    pub only: Vec<String>,
    /// Where to save a screenshot of each failed scenario
    pub screenshot_dir: Option<PathBuf>,
    pub verbose: bool,
}

/// Run a whole suite: setup, then every selected scenario
pub async fn run_suite(
    api: &mut ServerClient,
    credentials: &Credentials,
    browser: &dyn Browser,
    suite: &TestSuite,
    opts: &RunOptions,
) -> Result<SuiteReport> {
    println!(
        "\n{} {}",
        "Running Suite:".blue().bold(),
        suite.name.white().bold()
    );
    if let Some(desc) = &suite.description {
        println!("  {}", desc.dimmed());
    }

    // A filter that matches nothing must fail before the server is touched
    let scenarios = suite.select(&opts.only)?;

    println!("\n{}", "Setup:".cyan());

    let session = api
        .login(&credentials.username, &credentials.password)
        .await
        .map_err(setup_failed("admin login"))?;
    println!("  {} admin login as {}", "✓".green(), session.user.username.dimmed());

    if let Some(settings) = &suite.settings {
        api.update_config(settings)
            .await
            .map_err(setup_failed("update server configuration"))?;
        println!("  {} update server configuration", "✓".green());
    }

    let fixture = api
        .init_setup()
        .await
        .map_err(setup_failed("provision team"))?;
    println!("  {} provision team {}", "✓".green(), fixture.team.name.dimmed());

    open_session(browser, &opts.base_url, &session)
        .await
        .map_err(setup_failed("open browser session"))?;

    let suite_vars = Vars::new(fixture.vars());
    prepare_landing(browser, &suite_vars, suite, opts).await?;

    let results = run_scenarios(browser, &suite_vars, &scenarios, opts).await;
    let report = SuiteReport {
        suite: suite.name.clone(),
        team: fixture.team.name.clone(),
        results,
    };
    print_summary(&report);

    Ok(report)
}

fn setup_failed(what: &'static str) -> impl Fn(Error) -> Error {
    move |e| Error::SetupFailed(format!("{}: {}", what, e))
}

/// Put the API login's cookies into the browser so pages load authenticated
async fn open_session(browser: &dyn Browser, base_url: &str, session: &AuthSession) -> Result<()> {
    // Cookies can only be set for the origin currently loaded
    browser.visit(&join_url(base_url, "/")).await?;
    for cookie in &session.cookies {
        browser.set_cookie(&cookie.name, &cookie.value).await?;
    }
    Ok(())
}

/// Visit the landing page and check the preconditions
///
/// Any failure here is a `SetupFailed`: scenarios assume these hold.
pub async fn prepare_landing(
    browser: &dyn Browser,
    vars: &Vars,
    suite: &TestSuite,
    opts: &RunOptions,
) -> Result<()> {
    let landing = vars
        .expand(&suite.landing)
        .map_err(setup_failed("open landing page"))?;
    browser
        .visit(&join_url(&opts.base_url, &landing))
        .await
        .map_err(setup_failed("open landing page"))?;
    println!("  {} visit {}", "✓".green(), landing.dimmed());

    for (i, step) in suite.preconditions.iter().enumerate() {
        let step = step
            .expand(vars)
            .map_err(|e| Error::SetupFailed(format!("precondition {}: {}", i + 1, e)))?;
        if let Err(e) = execute_step(browser, &step, opts).await {
            println!("  {} {}: {}", "✗".red(), step.describe(), e);
            return Err(Error::SetupFailed(format!(
                "precondition {} ({}): {}",
                i + 1,
                step.describe(),
                e
            )));
        }
        println!("  {} {}", "✓".green(), step.describe().dimmed());
    }

    Ok(())
}

/// Run scenarios in order, collecting results
pub async fn run_scenarios(
    browser: &dyn Browser,
    suite_vars: &Vars,
    scenarios: &[&TestScenario],
    opts: &RunOptions,
) -> Vec<TestResult> {
    let mut results = Vec::new();
    for &scenario in scenarios {
        let mut result = run_scenario(browser, suite_vars, scenario, opts).await;
        if !result.passed {
            if let Some(dir) = &opts.screenshot_dir {
                result.screenshot = capture_failure(browser, dir, &scenario.name).await;
            }
        }
        results.push(result);
    }
    results
}

/// Run one scenario
pub async fn run_scenario(
    browser: &dyn Browser,
    suite_vars: &Vars,
    scenario: &TestScenario,
    opts: &RunOptions,
) -> TestResult {
    let steps_total = scenario.steps.len();
    let started = Instant::now();

    println!(
        "\n{} {}",
        "Scenario:".blue().bold(),
        scenario.name.white().bold()
    );
    if let Some(desc) = &scenario.description {
        println!("  {}", desc.dimmed());
    }

    let failed = |steps_run: usize, error: &Error| TestResult {
        name: scenario.name.clone(),
        passed: false,
        steps_run,
        steps_total,
        error: Some(error.to_string()),
        screenshot: None,
        duration_ms: started.elapsed().as_millis() as u64,
    };

    let vars = match Vars::for_scenario(suite_vars, &scenario.vars) {
        Ok(vars) => vars,
        Err(e) => {
            println!("  {} {}", "✗".red(), e);
            return failed(0, &e);
        }
    };

    if opts.verbose {
        for name in scenario.vars.keys() {
            println!("  {} = {}", name, vars.get(name).unwrap_or_default().dimmed());
        }
    }

    for (i, step) in scenario.steps.iter().enumerate() {
        let step_num = i + 1;

        let outcome = match step.expand(&vars) {
            Ok(step) => execute_step(browser, &step, opts).await.map(|()| step),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(step) => {
                println!(
                    "  {} Step {}: {}",
                    "✓".green(),
                    step_num,
                    step.describe().dimmed()
                );
            }
            Err(e) => {
                println!("  {} Step {}: {}", "✗".red(), step_num, e);
                return failed(step_num, &e);
            }
        }
    }

    println!("  {} {}", "✓".green().bold(), "Passed".green().bold());

    TestResult {
        name: scenario.name.clone(),
        passed: true,
        steps_run: steps_total,
        steps_total,
        error: None,
        screenshot: None,
        duration_ms: started.elapsed().as_millis() as u64,
    }
}

/// Execute a single step
pub async fn execute_step(browser: &dyn Browser, step: &TestStep, opts: &RunOptions) -> Result<()> {
    tracing::debug!("step: {}", step.describe());

    match step {
        TestStep::Visit { path } => browser.visit(&join_url(&opts.base_url, path)).await,
        TestStep::Click { target } => browser.click(target).await,
        TestStep::Type {
            target,
            text,
            submit,
        } => browser.type_text(target, text, *submit).await,
        TestStep::Select { target, option } => browser.select_option(target, option).await,

        TestStep::ExpectVisible { target } => {
            retry_assertion(opts.wait, || async move {
                if browser.is_visible(target).await? {
                    Ok(())
                } else {
                    Err(Error::TestAssertion(format!("'{}' is not visible", target)))
                }
            })
            .await
        }

        TestStep::ExpectText {
            target,
            equals,
            contains,
        } => {
            retry_assertion(opts.wait, || async move {
                let actual = browser.text(target).await?;
                check_text(
                    &target.to_string(),
                    &actual,
                    equals.as_deref(),
                    contains.as_deref(),
                )
            })
            .await
        }

        TestStep::ExpectCss {
            target,
            property,
            value,
        } => {
            retry_assertion(opts.wait, || async move {
                let actual = browser.css_value(target, property).await?;
                if actual.trim() == value.trim() {
                    Ok(())
                } else {
                    Err(Error::TestAssertion(format!(
                        "'{}': expected {} '{}', got '{}'",
                        target, property, value, actual
                    )))
                }
            })
            .await
        }

        TestStep::ExpectUrl { contains } => {
            retry_assertion(opts.wait, || async move {
                let url = browser.current_url().await?;
                if url.contains(contains.as_str()) {
                    Ok(())
                } else {
                    Err(Error::TestAssertion(format!(
                        "Expected URL containing '{}', got '{}'",
                        contains, url
                    )))
                }
            })
            .await
        }
    }
}

/// Compare an element's text against the expectations
fn check_text(
    target: &str,
    actual: &str,
    equals: Option<&str>,
    contains: Option<&str>,
) -> Result<()> {
    if let Some(expected) = equals {
        if actual.trim() != expected.trim() {
            return Err(Error::TestAssertion(format!(
                "'{}': expected text '{}', got '{}'",
                target, expected, actual
            )));
        }
    }

    if let Some(expected_substr) = contains {
        if !actual.contains(expected_substr) {
            return Err(Error::TestAssertion(format!(
                "'{}': expected text containing '{}', got '{}'",
                target, expected_substr, actual
            )));
        }
    }

    Ok(())
}

/// Re-run an assertion until it passes or the wait policy runs out
async fn retry_assertion<F, Fut>(wait: WaitPolicy, mut check: F) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<()>>,
{
    let deadline = Instant::now() + wait.timeout;
    loop {
        match check().await {
            Ok(()) => return Ok(()),
            Err(e) if e.is_retryable() && Instant::now() < deadline => {
                tracing::trace!("Assertion not met yet: {}", e);
            }
            Err(e) => return Err(e),
        }
        sleep(wait.poll).await;
    }
}

/// Save a screenshot for a failed scenario; failures here are only logged
async fn capture_failure(browser: &dyn Browser, dir: &Path, scenario: &str) -> Option<PathBuf> {
    let dir = match paths::ensure_dir(dir.to_path_buf()) {
        Ok(dir) => dir,
        Err(e) => {
            tracing::warn!("Cannot create screenshot dir '{}': {}", dir.display(), e);
            return None;
        }
    };

    let path = dir.join(format!("{}-{}.png", paths::slug(scenario), timestamp_millis()));
    match browser.screenshot(&path).await {
        Ok(()) => {
            println!("  {} {}", "screenshot:".dimmed(), path.display());
            Some(path)
        }
        Err(e) => {
            tracing::warn!("Screenshot failed: {}", e);
            None
        }
    }
}

fn print_summary(report: &SuiteReport) {
    let total = report.results.len();
    let failed = report.failed();

    if failed == 0 {
        println!(
            "\n{} {}\n",
            "✓".green().bold(),
            format!("{} of {} scenarios passed", total, total).green().bold()
        );
    } else {
        println!(
            "\n{} {}",
            "✗".red().bold(),
            format!("{} of {} scenarios failed", failed, total).red().bold()
        );
        for result in report.results.iter().filter(|r| !r.passed) {
            println!(
                "  {} {}: {}",
                "✗".red(),
                result.name,
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
        println!();
    }
}
