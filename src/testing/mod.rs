//! Scenario runner
//!
//! Suites are plain data: a setup (server settings, landing page,
//! preconditions) and a list of scenarios made of browser steps. They come
//! from YAML files or from the built-in definitions in [`crate::suite`].

mod config;
mod runner;
mod template;

pub use config::{TestScenario, TestStep, TestSuite};
pub use runner::{
    execute_step, prepare_landing, run_scenario, run_scenarios, run_suite, Credentials,
    RunOptions, SuiteReport, TestResult,
};
pub use template::Vars;
