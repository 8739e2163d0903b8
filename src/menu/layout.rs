//! Shell layout data: route tree, default location and app listing.
//!
//! The layout is descriptive data only. Path uniqueness and reachability are
//! checked by the shell through [`Layout::validate`] when the layout is loaded.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// A node of the navigation tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Route {
    /// Absolute (`/admin`) or relative to the parent (`sub-sub-page1`)
    pub path: String,
    /// Display name; unnamed routes are not listed in the sidebar
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Named icon (e.g. `CrownFilled`) or image URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    /// Access tag for the external authorization collaborator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub routes: Vec<Route>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Location {
    pub pathname: String,
}

/// Entry of the app switcher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AppLink {
    pub icon: String,
    pub title: String,
    pub desc: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Layout {
    pub route: Route,
    pub location: Location,
    #[serde(default)]
    pub app_list: Vec<AppLink>,
}

/// How an icon reference should be rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconRef<'a> {
    Named(&'a str),
    Image(&'a str),
}

impl Route {
    pub fn icon_ref(&self) -> Option<IconRef<'_>> {
        self.icon.as_deref().map(|icon| {
            if icon.starts_with("http://") || icon.starts_with("https://") {
                IconRef::Image(icon)
            } else {
                IconRef::Named(icon)
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    #[error("route path must not be empty (parent: {parent})")]
    EmptyPath { parent: String },
    #[error("duplicate route path: {0}")]
    DuplicatePath(String),
    #[error("route {0} has an empty name")]
    EmptyName(String),
    #[error("default location {0} does not match any route")]
    UnknownLocation(String),
}

/// A route together with its resolved absolute path
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRoute<'a> {
    pub full_path: String,
    pub route: &'a Route,
    /// Names of the enclosing named routes, outermost first
    pub breadcrumb: Vec<&'a str>,
}

/// Sidebar row produced by flattening the route tree
#[derive(Debug, Clone, PartialEq)]
pub struct MenuEntry {
    pub depth: usize,
    pub label: String,
    pub href: String,
    pub icon: Option<String>,
    pub icon_is_image: bool,
    pub access: Option<String>,
    pub active: bool,
    /// An ancestor of the active route
    pub open: bool,
}

/// Join a child path onto its parent's resolved path
pub fn join_path(parent: &str, child: &str) -> String {
    if child.starts_with('/') {
        child.to_string()
    } else if parent.ends_with('/') {
        format!("{}{}", parent, child)
    } else {
        format!("{}/{}", parent, child)
    }
}

fn normalize(path: &str) -> &str {
    match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    }
}

impl Layout {
    /// The console's own navigation layout
    pub fn builtin() -> Self {
        fn page(path: &str, name: &str, icon: &str, component: &str) -> Route {
            Route {
                path: path.to_string(),
                name: Some(name.to_string()),
                icon: Some(icon.to_string()),
                component: Some(component.to_string()),
                access: None,
                routes: Vec::new(),
            }
        }

        let admin = Route {
            access: Some("canAdmin".to_string()),
            routes: vec![page(
                "/admin/sub-page1",
                "Cluster 001",
                "https://gw.alipayobjects.com/zos/antfincdn/upvrAjAPQX/Logo_Tech%252520UI.svg",
                "./Welcome",
            )],
            ..page("/admin", "Admin", "CrownFilled", "./Admin")
        };

        let summary = Route {
            component: None,
            routes: vec![
                page("sub-sub-page1", "Cluster Summary", "CrownFilled", "./Welcome"),
                page("sub-sub-page2", "Connection Info", "CrownFilled", "./Welcome"),
                page("sub-sub-page3", "Backup", "CrownFilled", "./Welcome"),
            ],
            ..page("/list/sub-page", "Summary", "CrownFilled", "")
        };

        let cluster = Route {
            routes: vec![summary],
            ..page("/list", "TiDB Cluster", "TabletFilled", "./ListTableList")
        };

        Layout {
            route: Route {
                path: "/".to_string(),
                name: None,
                icon: None,
                component: None,
                access: None,
                routes: vec![
                    page("/welcome", "Welcome", "SmileFilled", "./Welcome"),
                    admin,
                    cluster,
                ],
            },
            location: Location {
                pathname: "/".to_string(),
            },
            app_list: vec![AppLink {
                icon: "https://gw.alipayobjects.com/zos/rmsportal/KDpgvguMpGfqaHPjicRK.svg"
                    .to_string(),
                title: "Ant Design".to_string(),
                desc: "杭州市较知名的 UI 设计语言".to_string(),
                url: "https://ant.design".to_string(),
            }],
        }
    }

    /// Every route with its resolved path, depth-first in declaration order
    pub fn resolved_routes(&self) -> Vec<ResolvedRoute<'_>> {
        fn walk<'a>(
            route: &'a Route,
            parent: &str,
            breadcrumb: &[&'a str],
            out: &mut Vec<ResolvedRoute<'a>>,
        ) {
            let full_path = join_path(parent, &route.path);
            let mut trail = breadcrumb.to_vec();
            out.push(ResolvedRoute {
                full_path: full_path.clone(),
                route,
                breadcrumb: trail.clone(),
            });
            if let Some(name) = route.name.as_deref() {
                trail.push(name);
            }
            for child in &route.routes {
                walk(child, &full_path, &trail, out);
            }
        }

        let mut out = Vec::new();
        walk(&self.route, "/", &[], &mut out);
        out
    }

    /// Find the route whose resolved path equals `path`
    pub fn resolve(&self, path: &str) -> Option<ResolvedRoute<'_>> {
        let wanted = normalize(path);
        self.resolved_routes()
            .into_iter()
            .find(|r| normalize(&r.full_path) == wanted)
    }

    /// Check the invariants the shell relies on
    pub fn validate(&self) -> Result<(), LayoutError> {
        fn check_paths(route: &Route, parent: &str) -> Result<(), LayoutError> {
            for child in &route.routes {
                if child.path.trim().is_empty() {
                    return Err(LayoutError::EmptyPath {
                        parent: parent.to_string(),
                    });
                }
                check_paths(child, &join_path(parent, &child.path))?;
            }
            Ok(())
        }
        check_paths(&self.route, &join_path("/", &self.route.path))?;

        let mut seen = HashSet::new();
        for resolved in self.resolved_routes() {
            if !seen.insert(normalize(&resolved.full_path).to_string()) {
                return Err(LayoutError::DuplicatePath(resolved.full_path));
            }
            if resolved.route.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
                return Err(LayoutError::EmptyName(resolved.full_path));
            }
        }

        if self.resolve(&self.location.pathname).is_none() {
            return Err(LayoutError::UnknownLocation(self.location.pathname.clone()));
        }
        Ok(())
    }

    /// Flatten the named routes into sidebar rows
    pub fn menu_entries(&self, active_path: &str) -> Vec<MenuEntry> {
        fn walk(
            route: &Route,
            parent: &str,
            depth: usize,
            active: &str,
            out: &mut Vec<MenuEntry>,
        ) {
            for child in &route.routes {
                let href = join_path(parent, &child.path);
                let normalized = normalize(&href);
                let child_depth = match child.name.as_deref() {
                    Some(label) => {
                        out.push(MenuEntry {
                            depth,
                            label: label.to_string(),
                            href: href.clone(),
                            icon: child.icon.clone(),
                            icon_is_image: matches!(child.icon_ref(), Some(IconRef::Image(_))),
                            access: child.access.clone(),
                            active: normalized == active,
                            open: active.starts_with(&format!("{}/", normalized)),
                        });
                        depth + 1
                    }
                    None => depth,
                };
                walk(child, &href, child_depth, active, out);
            }
        }

        let mut out = Vec::new();
        let root = join_path("/", &self.route.path);
        walk(&self.route, &root, 0, normalize(active_path), &mut out);
        out
    }
}
