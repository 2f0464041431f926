//! Test doubles for the end-to-end tests
//!
//! - [`MockServer`]: the REST endpoints used by setup, served by axum on a
//!   random local port
//! - [`FakeUi`]: an in-memory [`Browser`] that renders a small model of the
//!   integrations pages from the mock server's state

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::extract::{Path as UrlPath, State};
use axum::http::header::{AUTHORIZATION, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::task::JoinHandle;

use integrations_e2e::browser::{Browser, Locator};
use integrations_e2e::{Error, Result};

pub const ADMIN_USERNAME: &str = "sysadmin";
pub const ADMIN_PASSWORD: &str = "Sys@dmin-sample1";
pub const TOKEN: &str = "tok-123";

/// Server-side state shared by the mock API and the fake UI
#[derive(Debug)]
pub struct MockState {
    pub config: Value,
    /// Settings the server keeps `false` whatever is written
    pub forced_off: Vec<&'static str>,
    pub teams: Vec<Value>,
    pub channels: Vec<Value>,
    pub users: Vec<Value>,
    pub team_members: Vec<(String, String)>,
    pub channel_members: Vec<(String, String)>,
    pub config_writes: usize,
    /// Whether login answers with `Set-Cookie` headers
    pub login_cookies: bool,
    next_id: usize,
}

impl MockState {
    fn new() -> Self {
        Self {
            config: json!({
                "ServiceSettings": {
                    "SiteURL": "http://localhost:8065",
                    "EnableOAuthServiceProvider": false,
                    "EnableIncomingWebhooks": false,
                    "EnableOutgoingWebhooks": false,
                    "EnableCommands": false,
                    "EnableBotAccountCreation": false,
                },
                "TeamSettings": { "MaxUsersPerTeam": 50 }
            }),
            forced_off: Vec::new(),
            teams: Vec::new(),
            channels: Vec::new(),
            users: Vec::new(),
            team_members: Vec::new(),
            channel_members: Vec::new(),
            config_writes: 0,
            login_cookies: true,
            next_id: 0,
        }
    }

    fn id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}{:04}", prefix, self.next_id)
    }

    pub fn flag(&self, name: &str) -> bool {
        self.config["ServiceSettings"][name].as_bool().unwrap_or(false)
    }

    pub fn has_team(&self, name: &str) -> bool {
        self.teams.iter().any(|t| t["name"] == name)
    }
}

type Shared = Arc<Mutex<MockState>>;

/// Mock REST server on 127.0.0.1
pub struct MockServer {
    pub url: String,
    pub state: Shared,
    handle: JoinHandle<()>,
}

impl MockServer {
    pub async fn start() -> Self {
        Self::start_with(Vec::new()).await
    }

    /// Start a server that refuses to turn on the given settings
    pub async fn start_with(forced_off: Vec<&'static str>) -> Self {
        let mut state = MockState::new();
        state.forced_off = forced_off;
        let state = Arc::new(Mutex::new(state));

        let router = Router::new()
            .route("/api/v4/users/login", post(login))
            .route("/api/v4/config", get(get_config).put(put_config))
            .route("/api/v4/teams", post(create_team))
            .route("/api/v4/channels", post(create_channel))
            .route("/api/v4/users", post(create_user))
            .route("/api/v4/teams/:id/members", post(add_team_member))
            .route("/api/v4/channels/:id/members", post(add_channel_member))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock server");
        let addr: SocketAddr = listener.local_addr().expect("local addr");
        let handle = tokio::spawn(async move {
            axum::serve(listener, router).await.expect("mock server");
        });

        Self {
            url: format!("http://{}", addr),
            state,
            handle,
        }
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {}", TOKEN))
        .unwrap_or(false)
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "id": "api.context.session_expired.app_error", "status_code": 401 })),
    )
        .into_response()
}

async fn login(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    if body["login_id"] != ADMIN_USERNAME || body["password"] != ADMIN_PASSWORD {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "id": "api.user.login.invalid_credentials" })),
        )
            .into_response();
    }

    let mut headers = HeaderMap::new();
    headers.insert("Token", HeaderValue::from_static(TOKEN));
    if state.lock().unwrap().login_cookies {
        headers.append(
            SET_COOKIE,
            HeaderValue::from_static("MMAUTHTOKEN=tok-123; Path=/; HttpOnly"),
        );
        headers.append(SET_COOKIE, HeaderValue::from_static("MMUSERID=admin0001; Path=/"));
        headers.append(SET_COOKIE, HeaderValue::from_static("MMCSRF=csrf0001; Path=/"));
    }

    (
        headers,
        Json(json!({
            "id": "admin0001",
            "username": ADMIN_USERNAME,
            "email": "sysadmin@sample.mattermost.com",
            "roles": "system_admin system_user"
        })),
    )
        .into_response()
}

async fn get_config(State(state): State<Shared>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let state = state.lock().unwrap();
    Json(state.config.clone()).into_response()
}

async fn put_config(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut state = state.lock().unwrap();
    for name in state.forced_off.clone() {
        body["ServiceSettings"][name] = json!(false);
    }
    state.config = body;
    state.config_writes += 1;
    Json(state.config.clone()).into_response()
}

async fn create_team(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut state = state.lock().unwrap();
    let team = json!({
        "id": state.id("team"),
        "name": body["name"],
        "display_name": body["display_name"],
        "type": body["type"],
    });
    state.teams.push(team.clone());
    (StatusCode::CREATED, Json(team)).into_response()
}

async fn create_channel(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut state = state.lock().unwrap();
    let channel = json!({
        "id": state.id("chan"),
        "team_id": body["team_id"],
        "name": body["name"],
        "display_name": body["display_name"],
        "type": body["type"],
    });
    state.channels.push(channel.clone());
    (StatusCode::CREATED, Json(channel)).into_response()
}

async fn create_user(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut state = state.lock().unwrap();
    let user = json!({
        "id": state.id("user"),
        "username": body["username"],
        "email": body["email"],
    });
    state.users.push(user.clone());
    (StatusCode::CREATED, Json(user)).into_response()
}

async fn add_team_member(
    State(state): State<Shared>,
    UrlPath(team_id): UrlPath<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let user_id = body["user_id"].as_str().unwrap_or_default().to_string();
    state
        .lock()
        .unwrap()
        .team_members
        .push((team_id.clone(), user_id.clone()));
    (
        StatusCode::CREATED,
        Json(json!({ "team_id": team_id, "user_id": user_id })),
    )
        .into_response()
}

async fn add_channel_member(
    State(state): State<Shared>,
    UrlPath(channel_id): UrlPath<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let user_id = body["user_id"].as_str().unwrap_or_default().to_string();
    state
        .lock()
        .unwrap()
        .channel_members
        .push((channel_id.clone(), user_id.clone()));
    (
        StatusCode::CREATED,
        Json(json!({ "channel_id": channel_id, "user_id": user_id })),
    )
        .into_response()
}

/// One integration type as the fake pages render it
struct PageKind {
    slug: &'static str,
    title: &'static str,
    label: &'static str,
    flag: &'static str,
    section: &'static str,
    add: &'static str,
    save: &'static str,
    required: &'static [&'static str],
}

static KINDS: &[PageKind] = &[
    PageKind {
        slug: "incoming_webhooks",
        title: "Incoming Webhooks",
        label: "incoming webhooks",
        flag: "EnableIncomingWebhooks",
        section: "incomingWebhooks",
        add: "addIncomingWebhook",
        save: "saveWebhook",
        required: &["channelSelect"],
    },
    PageKind {
        slug: "outgoing_webhooks",
        title: "Outgoing Webhooks",
        label: "outgoing webhooks",
        flag: "EnableOutgoingWebhooks",
        section: "outgoingWebhooks",
        add: "addOutgoingWebhook",
        save: "saveWebhook",
        required: &["channelSelect", "callbackUrls"],
    },
    PageKind {
        slug: "commands",
        title: "Slash Commands",
        label: "commands",
        flag: "EnableCommands",
        section: "slashCommands",
        add: "addSlashCommand",
        save: "saveCommand",
        required: &["trigger", "url"],
    },
    PageKind {
        slug: "oauth2-apps",
        title: "OAuth 2.0 Applications",
        label: "OAuth 2.0 Applications",
        flag: "EnableOAuthServiceProvider",
        section: "oauthApps",
        add: "addOauthApp",
        save: "saveOauthApp",
        required: &["name", "description", "homepage", "callbackUrls"],
    },
    PageKind {
        slug: "bots",
        title: "Bot Accounts",
        label: "bot accounts",
        flag: "EnableBotAccountCreation",
        section: "botAccounts",
        add: "addBotAccount",
        save: "saveBot",
        required: &["username"],
    },
];

const CHANNEL_OPTIONS: &[&str] = &["Town Square", "Off-Topic"];

#[derive(Debug, Clone, PartialEq)]
enum Page {
    Blank,
    Login,
    Channel,
    Landing,
    List(usize),
    Add(usize),
    Confirm(usize),
}

#[derive(Debug, Clone)]
enum Action {
    None,
    Open(usize),
    Add(usize),
    Save(usize),
    Done(usize),
    OpenMenu,
    Integrations,
}

#[derive(Debug, Clone)]
struct Element {
    selector: String,
    text: String,
    action: Action,
    children: Vec<Element>,
}

impl Element {
    fn new(selector: impl Into<String>, text: impl Into<String>, action: Action) -> Self {
        Self {
            selector: selector.into(),
            text: text.into(),
            action,
            children: Vec::new(),
        }
    }

    fn id(id: &str, text: impl Into<String>, action: Action) -> Self {
        Self::new(format!("#{}", id), text, action)
    }
}

#[derive(Debug)]
struct UiState {
    origin: String,
    team: String,
    url: String,
    cookies: HashMap<String, String>,
    page: Page,
    menu_open: bool,
    form: HashMap<String, String>,
    search: Option<String>,
    /// Names of created entities per kind
    created: HashMap<usize, Vec<String>>,
}

/// Faults the fake pages can be told to show
#[derive(Debug, Default, Clone)]
pub struct Faults {
    /// Render this label instead of the right one in the slash command empty message
    pub commands_label: Option<&'static str>,
    /// Section titles render with this font weight
    pub title_weight: Option<&'static str>,
}

/// In-memory browser over a model of the integrations pages
pub struct FakeUi {
    server: Shared,
    faults: Faults,
    ui: Mutex<UiState>,
    pub screenshots: Mutex<Vec<std::path::PathBuf>>,
    /// Every value submitted in a search box, in order
    pub searches: Mutex<Vec<String>>,
}

impl FakeUi {
    pub fn new(server: &MockServer) -> Self {
        Self::with_faults(server, Faults::default())
    }

    pub fn with_faults(server: &MockServer, faults: Faults) -> Self {
        Self {
            server: server.state.clone(),
            faults,
            ui: Mutex::new(UiState {
                origin: String::new(),
                team: String::new(),
                url: "about:blank".to_string(),
                cookies: HashMap::new(),
                page: Page::Blank,
                menu_open: false,
                form: HashMap::new(),
                search: None,
                created: HashMap::new(),
            }),
            screenshots: Mutex::new(Vec::new()),
            searches: Mutex::new(Vec::new()),
        }
    }

    /// Number of entities created through the fake pages
    pub fn created_count(&self) -> usize {
        self.ui.lock().unwrap().created.values().map(Vec::len).sum()
    }

    fn enabled(&self, kind: usize) -> bool {
        self.server.lock().unwrap().flag(KINDS[kind].flag)
    }

    fn navigate(ui: &mut UiState, page: Page) {
        ui.url = match &page {
            Page::Landing => format!("{}/{}/integrations", ui.origin, ui.team),
            Page::List(k) => format!("{}/{}/integrations/{}", ui.origin, ui.team, KINDS[*k].slug),
            Page::Add(k) => format!("{}/{}/integrations/{}/add", ui.origin, ui.team, KINDS[*k].slug),
            Page::Confirm(k) => format!(
                "{}/{}/integrations/confirm?type={}",
                ui.origin, ui.team, KINDS[*k].slug
            ),
            _ => ui.url.clone(),
        };
        ui.page = page;
        ui.menu_open = false;
        ui.form.clear();
        ui.search = None;
    }

    fn section_titles(&self) -> Vec<Element> {
        (0..KINDS.len())
            .filter(|k| self.enabled(*k))
            .map(|k| Element::new(".section-title__text", KINDS[k].title, Action::Open(k)))
            .collect()
    }

    /// Elements rendered for the current page
    fn render(&self, ui: &UiState) -> Vec<Element> {
        match &ui.page {
            Page::Blank | Page::Login => Vec::new(),
            Page::Channel => {
                let mut elements = vec![Element::id(
                    "sidebarHeaderDropdownButton",
                    ui.team.clone(),
                    Action::OpenMenu,
                )];
                if ui.menu_open {
                    let mut menu = Element::new(".dropdown-menu", "", Action::None);
                    menu.children = vec![
                        Element::new("li", "View Members", Action::None),
                        Element::new("li", "Integrations", Action::Integrations),
                        Element::new("li", "Log Out", Action::None),
                    ];
                    menu.text = "View Members Integrations Log Out".to_string();
                    elements.push(menu);
                }
                elements
            }
            Page::Landing => {
                let mut elements = Vec::new();
                for (k, kind) in KINDS.iter().enumerate() {
                    if self.enabled(k) {
                        elements.push(Element::id(kind.section, kind.title, Action::Open(k)));
                        elements.push(Element::new(
                            ".integration-option__title",
                            kind.title,
                            Action::Open(k),
                        ));
                    }
                }
                elements.extend(self.section_titles());
                elements
            }
            Page::List(k) => {
                let kind = &KINDS[*k];
                let mut elements = self.section_titles();
                elements.push(Element::id(kind.add, "Add", Action::Add(*k)));
                elements.push(Element::id("searchInput", "", Action::None));
                let names = ui.created.get(k).cloned().unwrap_or_default();
                let shown: Vec<String> = match &ui.search {
                    Some(query) => names
                        .iter()
                        .filter(|n| n.contains(query.as_str()))
                        .cloned()
                        .collect(),
                    None => names.clone(),
                };
                elements.extend(
                    shown
                        .iter()
                        .map(|name| Element::new(".item-details__name", name.clone(), Action::None)),
                );
                if let Some(query) = &ui.search {
                    if shown.is_empty() {
                        let label = match (kind.slug, self.faults.commands_label) {
                            ("commands", Some(wrong)) => wrong,
                            _ => kind.label,
                        };
                        elements.push(Element::id(
                            "emptySearchResultsMessage",
                            format!("No {} match {}", label, query),
                            Action::None,
                        ));
                    }
                }
                elements
            }
            Page::Add(k) => {
                let kind = &KINDS[*k];
                let mut elements: Vec<Element> = kind
                    .required
                    .iter()
                    .map(|id| Element::id(id, "", Action::None))
                    .collect();
                elements.push(Element::id(kind.save, "Save", Action::Save(*k)));
                elements
            }
            Page::Confirm(k) => vec![
                Element::id("formTitle", "Setup Successful", Action::None),
                Element::id("doneButton", "Done", Action::Done(*k)),
            ],
        }
    }

    fn find(&self, ui: &UiState, target: &Locator) -> Result<Element> {
        for element in self.render(ui) {
            if element.selector != target.selector {
                continue;
            }
            if let Some(needle) = &target.contains {
                if !element.text.contains(needle.as_str()) {
                    continue;
                }
            }
            match &target.text {
                Some(text) => {
                    if let Some(child) = element.children.iter().find(|c| &c.text == text) {
                        return Ok(child.clone());
                    }
                }
                None => return Ok(element),
            }
        }
        Err(Error::element_not_found(target, 0))
    }

    fn perform(&self, ui: &mut UiState, action: Action) -> Result<()> {
        match action {
            Action::None => {}
            Action::Open(k) => Self::navigate(ui, Page::List(k)),
            Action::Add(k) => Self::navigate(ui, Page::Add(k)),
            Action::OpenMenu => ui.menu_open = true,
            Action::Integrations => Self::navigate(ui, Page::Landing),
            Action::Save(k) => {
                let kind = &KINDS[k];
                if let Some(missing) = kind.required.iter().find(|f| !ui.form.contains_key(**f)) {
                    return Err(Error::TestAssertion(format!(
                        "form shows '{}' is required",
                        missing
                    )));
                }
                let name = ui.form.values().cloned().collect::<Vec<_>>().join(" ");
                ui.created.entry(k).or_default().push(name);
                Self::navigate(ui, Page::Confirm(k));
            }
            Action::Done(k) => Self::navigate(ui, Page::List(k)),
        }
        Ok(())
    }
}

#[async_trait]
impl Browser for FakeUi {
    async fn visit(&self, url: &str) -> Result<()> {
        let mut ui = self.ui.lock().unwrap();
        let rest = url
            .strip_prefix("http://")
            .ok_or_else(|| Error::Config(format!("unsupported url {}", url)))?;
        let (host, path) = rest.split_once('/').unwrap_or((rest, ""));
        ui.origin = format!("http://{}", host);
        ui.url = url.to_string();
        ui.menu_open = false;
        ui.form.clear();
        ui.search = None;

        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let logged_in = ui.cookies.get("MMAUTHTOKEN").map(String::as_str) == Some(TOKEN);
        let team_known = segments
            .first()
            .map(|t| self.server.lock().unwrap().has_team(t))
            .unwrap_or(false);

        let page = match segments.as_slice() {
            [] => Page::Login,
            _ if !logged_in => Page::Login,
            [team, "integrations"] if team_known => {
                ui.team = team.to_string();
                Page::Landing
            }
            [team, "channels", _] if team_known => {
                ui.team = team.to_string();
                Page::Channel
            }
            _ => Page::Blank,
        };
        ui.page = page;
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.ui.lock().unwrap().url.clone())
    }

    async fn set_cookie(&self, name: &str, value: &str) -> Result<()> {
        let mut ui = self.ui.lock().unwrap();
        if ui.origin.is_empty() {
            return Err(Error::Config("no page loaded to set cookies on".to_string()));
        }
        ui.cookies.insert(name.to_string(), value.to_string());
        Ok(())
    }

    async fn click(&self, target: &Locator) -> Result<()> {
        let mut ui = self.ui.lock().unwrap();
        let element = self.find(&ui, target)?;
        self.perform(&mut ui, element.action)
    }

    async fn type_text(&self, target: &Locator, text: &str, submit: bool) -> Result<()> {
        let mut ui = self.ui.lock().unwrap();
        self.find(&ui, target)?;
        if target.selector == "#searchInput" {
            if submit {
                ui.search = Some(text.to_string());
                self.searches.lock().unwrap().push(text.to_string());
            }
        } else {
            let id = target.selector.trim_start_matches('#').to_string();
            ui.form.insert(id, text.to_string());
        }
        Ok(())
    }

    async fn select_option(&self, target: &Locator, option: &str) -> Result<()> {
        let mut ui = self.ui.lock().unwrap();
        self.find(&ui, target)?;
        if !CHANNEL_OPTIONS.contains(&option) {
            return Err(Error::TestAssertion(format!("no option '{}'", option)));
        }
        let id = target.selector.trim_start_matches('#').to_string();
        ui.form.insert(id, option.to_string());
        Ok(())
    }

    async fn text(&self, target: &Locator) -> Result<String> {
        let ui = self.ui.lock().unwrap();
        Ok(self.find(&ui, target)?.text)
    }

    async fn is_visible(&self, target: &Locator) -> Result<bool> {
        let ui = self.ui.lock().unwrap();
        self.find(&ui, target).map(|_| true)
    }

    async fn css_value(&self, target: &Locator, property: &str) -> Result<String> {
        let ui = self.ui.lock().unwrap();
        self.find(&ui, target)?;
        let value = match (target.selector.as_str(), property) {
            (".item-details__name", "font-weight") => self.faults.title_weight.unwrap_or("600"),
            (_, "font-weight") => "400",
            _ => "",
        };
        Ok(value.to_string())
    }

    async fn screenshot(&self, path: &Path) -> Result<()> {
        std::fs::write(path, b"\x89PNG")?;
        self.screenshots.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        let mut ui = self.ui.lock().unwrap();
        ui.page = Page::Blank;
        Ok(())
    }
}
