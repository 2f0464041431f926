//! CLI command handling
//!
//! Wires configuration, the WebDriver session and the server client
//! together and hands them to the runner.

use colored::Colorize;
use std::time::Duration;

use crate::api::ServerClient;
use crate::browser::{ensure_webdriver_running, Browser, WaitPolicy, WebDriverBrowser};
use crate::commands::{Commands, RunArgs};
use crate::common::config::Config;
use crate::common::{logging, Result};
use crate::suite::integrations_suite;
use crate::testing::{run_suite, Credentials, RunOptions, TestSuite};

/// Dispatch a CLI command
pub async fn dispatch(command: Commands) -> Result<()> {
    match command {
        Commands::Run { options } => run(integrations_suite(), &options).await,

        Commands::Test { path, options } => {
            let suite = TestSuite::load(&path)?;
            run(suite, &options).await
        }

        Commands::List { path } => {
            let suite = match path {
                Some(path) => TestSuite::load(&path)?,
                None => integrations_suite(),
            };
            print_scenarios(&suite);
            Ok(())
        }
    }
}

/// Run a suite against the configured server and browser
async fn run(suite: TestSuite, args: &RunArgs) -> Result<()> {
    // Fail on a bad --only before a driver is started
    suite.select(&args.only)?;

    let mut config = Config::load()?;
    apply_overrides(&mut config, args);

    // Held until the end of the run; dropping it stops a driver we spawned
    let driver = ensure_webdriver_running(
        &config.webdriver,
        Duration::from_secs(config.timeouts.driver_start_secs),
    )
    .await?;
    if let Some(process) = &driver {
        tracing::info!(pid = ?process.id(), "Started {}", config.webdriver.browser.driver_binary());
    }

    let wait = WaitPolicy::from(&config.timeouts);
    let browser = WebDriverBrowser::connect(&config.webdriver, wait).await?;
    let mut api = ServerClient::new(
        &config.server.url,
        Duration::from_secs(config.timeouts.http_secs),
    )?;

    let credentials = Credentials {
        username: config.server.admin_username.clone(),
        password: config.server.admin_password.clone(),
    };
    let opts = RunOptions {
        base_url: config.server.url.clone(),
        wait,
        only: args.only.clone(),
        screenshot_dir: config.screenshot_dir(),
        verbose: args.verbose,
    };

    let outcome = run_suite(&mut api, &credentials, &browser, &suite, &opts).await;

    if let Err(e) = browser.close().await {
        tracing::warn!("Failed to close browser session: {}", e);
    }
    drop(driver);

    let report = outcome?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    if let Some(path) = logging::run_log_path() {
        tracing::debug!("Full trace in {}", path.display());
    }

    report.into_result().map(|_| ())
}

/// Apply command-line overrides on top of the config file
pub fn apply_overrides(config: &mut Config, args: &RunArgs) {
    if let Some(url) = &args.server_url {
        config.server.url = url.clone();
    }
    if let Some(url) = &args.webdriver_url {
        config.webdriver.url = url.clone();
    }
    if let Some(browser) = args.browser {
        config.webdriver.browser = browser;
    }
    if args.headed {
        config.webdriver.headless = false;
    }
}

fn print_scenarios(suite: &TestSuite) {
    println!("{}", suite.name.white().bold());
    if let Some(desc) = &suite.description {
        println!("  {}", desc.dimmed());
    }
    println!();
    for (i, scenario) in suite.scenarios.iter().enumerate() {
        println!(
            "  {:>2}. {} {}",
            i + 1,
            scenario.name,
            format!("({} steps)", scenario.steps.len()).dimmed()
        );
    }
}
