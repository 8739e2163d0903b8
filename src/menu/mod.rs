pub mod layout;

pub use layout::{
    join_path, AppLink, IconRef, Layout, LayoutError, Location, MenuEntry, ResolvedRoute, Route,
};

use crate::config::LayoutSource;

/// Load and validate the shell layout from the configured source
///
/// Path uniqueness and the default location are checked here, before the
/// shell starts serving, so a broken layout fails at startup instead of
/// rendering a sidebar with unreachable entries.
pub fn load_layout(source: &LayoutSource) -> anyhow::Result<Layout> {
    let (layout, origin) = match source {
        LayoutSource::Builtin => (Layout::builtin(), "builtin"),
        LayoutSource::Json(json) => {
            let layout: Layout = serde_json::from_str(json)
                .map_err(|e| anyhow::anyhow!("Invalid CONSOLE_LAYOUT_JSON: {}", e))?;
            (layout, "env-json")
        }
        LayoutSource::File(path) => {
            let raw = std::fs::read_to_string(path)
                .map_err(|e| anyhow::anyhow!("Failed to read layout file {}: {}", path, e))?;
            let layout: Layout = serde_json::from_str(&raw)
                .map_err(|e| anyhow::anyhow!("Invalid layout file {}: {}", path, e))?;
            (layout, "file")
        }
    };

    if let Err(error) = layout.validate() {
        tracing::error!(source = origin, error = %error, "Layout validation failed");
        return Err(anyhow::anyhow!(
            "Layout validation failed ({}): {}",
            origin,
            error
        ));
    }

    let routes = layout.resolved_routes();
    tracing::info!(
        source = origin,
        total_routes = routes.len(),
        access_tagged = routes.iter().filter(|r| r.route.access.is_some()).count(),
        default_location = %layout.location.pathname,
        apps = layout.app_list.len(),
        "Layout loaded successfully"
    );

    Ok(layout)
}
