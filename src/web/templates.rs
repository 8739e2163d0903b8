use crate::menu::{AppLink, MenuEntry};
use askama::Template;

/// One provider tab on the login page
#[derive(Debug, Clone)]
pub struct TabView {
    pub key: &'static str,
    pub label: &'static str,
    pub active: bool,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub tabs: Vec<TabView>,
    pub provider: &'static str,
    pub collects_credentials: bool,
    pub tenant_id: String,
    pub client_id: String,
    pub tenant_error: Option<&'static str>,
    pub client_error: Option<&'static str>,
    pub notice: Option<&'static str>,
    /// GIS widget settings; the widget is omitted when unset
    pub google_client_id: Option<String>,
    pub google_login_uri: String,
}

#[derive(Template)]
#[template(path = "shell.html")]
pub struct ShellTemplate {
    pub menu: Vec<MenuEntry>,
    pub apps: Vec<AppLink>,
    pub title: String,
    pub path: String,
    pub breadcrumb: Vec<String>,
    pub component: Option<String>,
    pub access: Option<String>,
    pub found: bool,
}
