//! The built-in integrations page suite
//!
//! One setup enables every integration type and checks that all five
//! sections show up. Then, for each kind, a scenario creates one entity and
//! searches for something that cannot match it. A last scenario walks the
//! sections from the main menu and checks their titles are semi-bold.

mod registry;

pub use registry::{all_integrations, Confirmation, FieldInput, FormField, IntegrationInfo};

use serde_json::json;
use std::collections::BTreeMap;

use crate::browser::Locator;
use crate::testing::{TestScenario, TestStep, TestSuite};

/// Integrations landing page of the provisioned team
pub const LANDING: &str = "/{team}/integrations";

/// Channel page the main menu is opened from
const TOWN_SQUARE: &str = "{town_square}";

/// Search that matches nothing; the timestamp keeps runs apart
const SEARCH: &str = "some random stuff {timestamp}";

/// Font weight section titles are rendered with
const SEMI_BOLD: &str = "600";

/// Build the integrations suite
pub fn integrations_suite() -> TestSuite {
    let mut scenarios: Vec<TestScenario> =
        all_integrations().iter().map(empty_search_scenario).collect();
    scenarios.push(titles_bolded_scenario());

    TestSuite {
        name: "Integrations page".to_string(),
        description: Some(
            "Empty-search messages and section titles of the integrations settings pages"
                .to_string(),
        ),
        settings: Some(json!({
            "ServiceSettings": {
                "EnableOAuthServiceProvider": true,
                "EnableIncomingWebhooks": true,
                "EnableOutgoingWebhooks": true,
                "EnableCommands": true,
                "EnableBotAccountCreation": true,
            }
        })),
        landing: LANDING.to_string(),
        preconditions: all_integrations()
            .iter()
            .map(|info| TestStep::ExpectVisible {
                target: Locator::id(info.section_link),
            })
            .collect(),
        scenarios,
    }
}

/// Create an entity of one kind, then search for something it does not match
fn empty_search_scenario(info: &IntegrationInfo) -> TestScenario {
    let mut steps = vec![
        TestStep::Visit {
            path: LANDING.to_string(),
        },
        TestStep::Click {
            target: Locator::id(info.section_link),
        },
        TestStep::Click {
            target: Locator::id(info.add_button),
        },
    ];

    steps.extend(info.fields.iter().map(fill_field));
    steps.push(TestStep::Click {
        target: Locator::id(info.save_button),
    });

    let done = TestStep::Click {
        target: Locator::id("doneButton"),
    };
    match info.confirmation {
        Confirmation::DialogTitle(title) => {
            steps.push(TestStep::ExpectText {
                target: Locator::id("formTitle"),
                equals: Some(title.to_string()),
                contains: None,
            });
            steps.push(done);
        }
        Confirmation::UrlContains(fragment) => {
            steps.push(done);
            steps.push(TestStep::ExpectUrl {
                contains: fragment.to_string(),
            });
        }
    }

    let message = Locator::id("emptySearchResultsMessage");
    steps.extend([
        TestStep::Type {
            target: Locator::id("searchInput"),
            text: "{search}".to_string(),
            submit: true,
        },
        TestStep::ExpectVisible {
            target: message.clone(),
        },
        TestStep::ExpectText {
            target: message,
            equals: Some(info.empty_message("{search}")),
            contains: None,
        },
    ]);

    TestScenario {
        name: format!("{} empty search message", info),
        description: Some(format!(
            "Add one of {} and search for text it cannot match",
            info
        )),
        vars: BTreeMap::from([("search".to_string(), SEARCH.to_string())]),
        steps,
    }
}

fn fill_field(field: &FormField) -> TestStep {
    let target = Locator::id(field.id);
    match field.input {
        FieldInput::Select => TestStep::Select {
            target,
            option: field.value.to_string(),
        },
        FieldInput::Text => TestStep::Type {
            target,
            text: field.value.to_string(),
            submit: false,
        },
    }
}

/// Open each section from the main menu and check its title weight
///
/// Lists only show item names once something exists, so this runs after
/// the empty-search scenarios and checks the entities they created.
fn titles_bolded_scenario() -> TestScenario {
    let menu_button = Locator::id("sidebarHeaderDropdownButton");
    let menu = Locator::css(".dropdown-menu");

    let mut steps = vec![
        TestStep::Visit {
            path: TOWN_SQUARE.to_string(),
        },
        TestStep::ExpectVisible {
            target: menu_button.clone(),
        },
        TestStep::Click {
            target: menu_button,
        },
        TestStep::ExpectVisible {
            target: menu.clone(),
        },
        TestStep::Click {
            target: menu.with_text("Integrations"),
        },
        TestStep::Click {
            target: Locator::css(".integration-option__title").containing("Incoming Webhooks"),
        },
    ];

    for info in all_integrations() {
        let name = Locator::css(".item-details__name");
        steps.extend([
            TestStep::Click {
                target: Locator::css(".section-title__text").containing(info.title),
            },
            TestStep::ExpectVisible {
                target: name.clone(),
            },
            TestStep::ExpectCss {
                target: name,
                property: "font-weight".to_string(),
                value: SEMI_BOLD.to_string(),
            },
        ]);
    }

    TestScenario {
        name: "MM-T570 Integration Page titles are bolded".to_string(),
        description: Some(
            "Needs one entity of each kind, as left by the empty-search scenarios".to_string(),
        ),
        vars: BTreeMap::new(),
        steps,
    }
}
