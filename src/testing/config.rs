//! Test suite configuration types
//!
//! Defines the data structures for deserializing YAML test suites. The
//! built-in integrations suite is built from the same types.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::browser::Locator;
use crate::common::{Error, Result};

use super::template::Vars;

/// A suite: one setup, then independent scenarios
#[derive(Deserialize, Debug, Clone)]
pub struct TestSuite {
    /// Name of the suite
    pub name: String,
    /// Optional description of what the suite verifies
    pub description: Option<String>,
    /// Server settings merged into the config before anything runs
    pub settings: Option<serde_json::Value>,
    /// Page opened after provisioning, before the preconditions
    #[serde(default = "default_landing")]
    pub landing: String,
    /// Assertions that must hold after setup; any failure aborts the suite
    #[serde(default)]
    pub preconditions: Vec<TestStep>,
    /// The scenarios, run in order
    pub scenarios: Vec<TestScenario>,
}

fn default_landing() -> String {
    "/{team}/integrations".to_string()
}

/// One independent scenario
#[derive(Deserialize, Debug, Clone)]
pub struct TestScenario {
    /// Name of the scenario
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Scenario variables, expanded once when the scenario starts
    #[serde(default)]
    pub vars: BTreeMap<String, String>,
    /// The sequence of steps to execute
    pub steps: Vec<TestStep>,
}

/// A single step in a scenario
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TestStep {
    /// Navigate to a path on the server (or an absolute URL)
    Visit { path: String },
    /// Click an element
    Click { target: Locator },
    /// Type into an element
    Type {
        target: Locator,
        text: String,
        /// Press Enter after the text
        #[serde(default)]
        submit: bool,
    },
    /// Pick an option of a `<select>` by visible text
    Select { target: Locator, option: String },
    /// The element exists and is displayed
    ExpectVisible { target: Locator },
    /// The element's text matches
    ExpectText {
        target: Locator,
        /// Whole text, compared after trimming surrounding whitespace
        equals: Option<String>,
        /// Expected substring
        contains: Option<String>,
    },
    /// A computed CSS property has a given value
    ExpectCss {
        target: Locator,
        property: String,
        value: String,
    },
    /// The current URL contains a substring
    ExpectUrl { contains: String },
}

impl TestStep {
    /// One-line description for progress output
    pub fn describe(&self) -> String {
        match self {
            TestStep::Visit { path } => format!("visit {}", path),
            TestStep::Click { target } => format!("click {}", target),
            TestStep::Type {
                target,
                text,
                submit,
            } => {
                let enter = if *submit { " + Enter" } else { "" };
                format!("type {:?}{} into {}", text, enter, target)
            }
            TestStep::Select { target, option } => format!("select {:?} in {}", option, target),
            TestStep::ExpectVisible { target } => format!("{} is visible", target),
            TestStep::ExpectText {
                target,
                equals,
                contains,
            } => match (equals, contains) {
                (Some(text), _) => format!("{} has text {:?}", target, text),
                (None, Some(text)) => format!("{} contains {:?}", target, text),
                (None, None) => format!("{} has text", target),
            },
            TestStep::ExpectCss {
                target,
                property,
                value,
            } => format!("{} has {} {}", target, property, value),
            TestStep::ExpectUrl { contains } => format!("url contains {:?}", contains),
        }
    }

    /// Expand placeholders in every string of the step
    pub fn expand(&self, vars: &Vars) -> Result<TestStep> {
        let ex = |s: &str| vars.expand(s);
        let ex_opt = |s: &Option<String>| s.as_deref().map(|s| vars.expand(s)).transpose();

        Ok(match self {
            TestStep::Visit { path } => TestStep::Visit { path: ex(path)? },
            TestStep::Click { target } => TestStep::Click {
                target: target.map_strings(ex)?,
            },
            TestStep::Type {
                target,
                text,
                submit,
            } => TestStep::Type {
                target: target.map_strings(ex)?,
                text: ex(text)?,
                submit: *submit,
            },
            TestStep::Select { target, option } => TestStep::Select {
                target: target.map_strings(ex)?,
                option: ex(option)?,
            },
            TestStep::ExpectVisible { target } => TestStep::ExpectVisible {
                target: target.map_strings(ex)?,
            },
            TestStep::ExpectText {
                target,
                equals,
                contains,
            } => TestStep::ExpectText {
                target: target.map_strings(ex)?,
                equals: ex_opt(equals)?,
                contains: ex_opt(contains)?,
            },
            TestStep::ExpectCss {
                target,
                property,
                value,
            } => TestStep::ExpectCss {
                target: target.map_strings(ex)?,
                property: ex(property)?,
                value: ex(value)?,
            },
            TestStep::ExpectUrl { contains } => TestStep::ExpectUrl {
                contains: ex(contains)?,
            },
        })
    }
}

impl TestSuite {
    /// Load and validate a suite from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "Failed to read test suite '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::parse(&content)
    }

    /// Parse and validate a suite from YAML text
    pub fn parse(content: &str) -> Result<Self> {
        let suite: TestSuite = serde_yaml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse test suite: {}", e)))?;
        suite.validate()?;
        Ok(suite)
    }

    /// Reject suites that cannot run
    pub fn validate(&self) -> Result<()> {
        if self.scenarios.is_empty() {
            return Err(Error::Config(format!(
                "Suite '{}' has no scenarios",
                self.name
            )));
        }
        for (i, scenario) in self.scenarios.iter().enumerate() {
            if self.scenarios[..i].iter().any(|s| s.name == scenario.name) {
                return Err(Error::Config(format!(
                    "Duplicate scenario name '{}'",
                    scenario.name
                )));
            }
            if scenario.steps.is_empty() {
                return Err(Error::Config(format!(
                    "Scenario '{}' has no steps",
                    scenario.name
                )));
            }
        }
        Ok(())
    }

    /// Scenarios whose names contain any of `only` (case-insensitive); all if empty
    ///
    /// A filter that matches nothing is an error, not an empty run.
    pub fn select(&self, only: &[String]) -> Result<Vec<&TestScenario>> {
        if only.is_empty() {
            return Ok(self.scenarios.iter().collect());
        }
        let needles: Vec<String> = only.iter().map(|s| s.to_lowercase()).collect();
        let picked: Vec<&TestScenario> = self
            .scenarios
            .iter()
            .filter(|s| {
                let name = s.name.to_lowercase();
                needles.iter().any(|n| name.contains(n.as_str()))
            })
            .collect();
        if picked.is_empty() {
            return Err(Error::Config(format!(
                "No scenario in '{}' matches --only {}",
                self.name,
                only.join(", ")
            )));
        }
        Ok(picked)
    }
}
