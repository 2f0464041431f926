//! Integration kinds and their page elements
//!
//! Everything the built-in suite needs to know about one kind of
//! integration: which controls open and save its form, what the form
//! requires, and how its list page words an empty search.

use std::fmt;

/// How a form field is filled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldInput {
    /// `<select>`, picked by visible option text
    Select,
    /// Text input, typed
    Text,
}

/// A required field of a creation form
#[derive(Debug, Clone, Copy)]
pub struct FormField {
    /// Element id
    pub id: &'static str,
    pub input: FieldInput,
    /// Value template; `{random_id}` keeps names from colliding between runs
    pub value: &'static str,
}

/// What tells us a save went through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    /// The dialog title reads this before it is dismissed
    DialogTitle(&'static str),
    /// After dismissing, the URL contains this
    UrlContains(&'static str),
}

/// Information about an integration kind
#[derive(Debug, Clone)]
pub struct IntegrationInfo {
    /// Unique identifier (e.g., "incoming-webhook")
    pub id: &'static str,
    /// Title shown in section headers and the integrations menu
    pub title: &'static str,
    /// Plural noun in the empty-search message
    pub empty_label: &'static str,
    /// Element ids
    pub section_link: &'static str,
    pub add_button: &'static str,
    pub save_button: &'static str,
    /// Fields that must be filled before saving
    pub fields: &'static [FormField],
    pub confirmation: Confirmation,
}

const SETUP_SUCCESSFUL: Confirmation = Confirmation::DialogTitle("Setup Successful");

/// All integration kinds, in the order their sections appear
static INTEGRATIONS: &[IntegrationInfo] = &[
    IntegrationInfo {
        id: "incoming-webhook",
        title: "Incoming Webhooks",
        empty_label: "incoming webhooks",
        section_link: "incomingWebhooks",
        add_button: "addIncomingWebhook",
        save_button: "saveWebhook",
        fields: &[FormField {
            id: "channelSelect",
            input: FieldInput::Select,
            value: "Town Square",
        }],
        confirmation: SETUP_SUCCESSFUL,
    },
    IntegrationInfo {
        id: "outgoing-webhook",
        title: "Outgoing Webhooks",
        empty_label: "outgoing webhooks",
        section_link: "outgoingWebhooks",
        add_button: "addOutgoingWebhook",
        save_button: "saveWebhook",
        fields: &[
            FormField {
                id: "channelSelect",
                input: FieldInput::Select,
                value: "Town Square",
            },
            FormField {
                id: "callbackUrls",
                input: FieldInput::Text,
                value: "https://dummy",
            },
        ],
        confirmation: SETUP_SUCCESSFUL,
    },
    IntegrationInfo {
        id: "slash-command",
        title: "Slash Commands",
        empty_label: "commands",
        section_link: "slashCommands",
        add_button: "addSlashCommand",
        save_button: "saveCommand",
        fields: &[
            FormField {
                id: "trigger",
                input: FieldInput::Text,
                value: "test-trigger{random_id}",
            },
            FormField {
                id: "url",
                input: FieldInput::Text,
                value: "https://dummy",
            },
        ],
        confirmation: SETUP_SUCCESSFUL,
    },
    IntegrationInfo {
        id: "oauth-app",
        title: "OAuth 2.0 Applications",
        empty_label: "OAuth 2.0 Applications",
        section_link: "oauthApps",
        add_button: "addOauthApp",
        save_button: "saveOauthApp",
        fields: &[
            FormField {
                id: "name",
                input: FieldInput::Text,
                value: "test-name{random_id}",
            },
            FormField {
                id: "description",
                input: FieldInput::Text,
                value: "test-descr{random_id}",
            },
            FormField {
                id: "homepage",
                input: FieldInput::Text,
                value: "https://dummy{random_id}",
            },
            FormField {
                id: "callbackUrls",
                input: FieldInput::Text,
                value: "https://dummy",
            },
        ],
        confirmation: SETUP_SUCCESSFUL,
    },
    IntegrationInfo {
        id: "bot-account",
        title: "Bot Accounts",
        empty_label: "bot accounts",
        section_link: "botAccounts",
        add_button: "addBotAccount",
        save_button: "saveBot",
        fields: &[FormField {
            id: "username",
            input: FieldInput::Text,
            value: "test-bot{random_id}",
        }],
        // The bot page closes its dialog on a route change instead of a title
        confirmation: Confirmation::UrlContains("/integrations/bots"),
    },
];

/// Get all integration kinds
pub fn all_integrations() -> &'static [IntegrationInfo] {
    INTEGRATIONS
}

impl IntegrationInfo {
    /// The empty-search message for `search`
    pub fn empty_message(&self, search: &str) -> String {
        format!("No {} match {}", self.empty_label, search)
    }
}

impl fmt::Display for IntegrationInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}
