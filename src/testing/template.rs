//! `{name}` placeholder expansion for scenario strings
//!
//! Built-ins:
//! - `{random_id}`: a fresh six-character id at every occurrence
//! - `{timestamp}`: Unix milliseconds, fixed when the scenario starts
//!
//! `{{` and `}}` produce literal braces.

use std::collections::BTreeMap;

use crate::common::{random_id, timestamp_millis, Error, Result};

/// Placeholder producing a new random id on every use
const RANDOM_ID: &str = "random_id";

/// Variables available to one scenario
#[derive(Debug, Clone, Default)]
pub struct Vars {
    values: BTreeMap<String, String>,
}

impl Vars {
    pub fn new(values: BTreeMap<String, String>) -> Self {
        Self { values }
    }

    /// Add or replace a variable
    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.values.insert(name.to_string(), value.into());
        self
    }

    /// Look up a variable
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Variables for a scenario run
    ///
    /// Starts from the suite-level `base`, pins `{timestamp}` to now, then
    /// expands the scenario's own `vars` against that. Scenario vars may use
    /// suite vars and built-ins but not each other.
    pub fn for_scenario(base: &Vars, scenario_vars: &BTreeMap<String, String>) -> Result<Self> {
        let pinned = base.clone().with("timestamp", timestamp_millis().to_string());
        let mut vars = pinned.clone();
        for (name, template) in scenario_vars {
            let value = pinned.expand(template)?;
            vars.values.insert(name.clone(), value);
        }
        Ok(vars)
    }

    /// Replace every `{name}` in `input`
    pub fn expand(&self, input: &str) -> Result<String> {
        let mut out = String::with_capacity(input.len());
        let mut chars = input.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    out.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    out.push('}');
                }
                '{' => {
                    let mut name = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(ch) => name.push(ch),
                            None => {
                                return Err(Error::Config(format!(
                                    "Unclosed placeholder in {:?}",
                                    input
                                )))
                            }
                        }
                    }
                    out.push_str(&self.resolve(name.trim(), input)?);
                }
                _ => out.push(c),
            }
        }

        Ok(out)
    }

    fn resolve(&self, name: &str, input: &str) -> Result<String> {
        if name == RANDOM_ID {
            return Ok(random_id());
        }
        self.values.get(name).cloned().ok_or_else(|| {
            Error::Config(format!("Unknown variable '{{{}}}' in {:?}", name, input))
        })
    }
}
