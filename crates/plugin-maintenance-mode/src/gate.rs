//! Decides whether a request gets the maintenance page.

use cimaise_core::result::AppResult;
use cimaise_database::DatabasePool;

use crate::settings::MaintenanceSettings;

/// Paths that stay reachable so admins can still sign in.
const ALLOWED_PATHS: [&str; 4] = ["/login", "/admin/login", "/admin-login", "/admin/logout"];

const STATIC_EXTENSIONS: [&str; 13] = [
    "css", "js", "png", "jpg", "jpeg", "gif", "ico", "svg", "woff", "woff2", "ttf", "eot", "webp",
];

/// Whether `request_uri` should be answered with the maintenance page.
///
/// `base_path` is the sub-directory the site is mounted under (empty when
/// served from the root). Admin sessions always pass through.
pub async fn should_show_maintenance_page(
    db: &DatabasePool,
    is_admin: bool,
    request_uri: &str,
    base_path: &str,
) -> AppResult<bool> {
    let settings = MaintenanceSettings::load(db).await?;
    Ok(should_block(settings.enabled, is_admin, request_uri, base_path))
}

/// Pure decision used by [`should_show_maintenance_page`].
pub fn should_block(enabled: bool, is_admin: bool, request_uri: &str, base_path: &str) -> bool {
    if !enabled || is_admin {
        return false;
    }

    let path = request_uri
        .split(['?', '#'])
        .next()
        .filter(|p| !p.is_empty())
        .unwrap_or("/");

    let base = base_path.trim_end_matches('/');
    let base = base.strip_suffix("/public").unwrap_or(base);
    let normalized = match path.strip_prefix(base) {
        Some(rest) if !base.is_empty() => {
            if rest.is_empty() {
                "/"
            } else {
                rest
            }
        }
        _ => path,
    };

    if ALLOWED_PATHS.contains(&normalized) {
        return false;
    }

    !is_static_asset(path)
}

fn is_static_asset(path: &str) -> bool {
    path.rsplit_once('.').is_some_and(|(_, ext)| {
        STATIC_EXTENSIONS
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(ext))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_or_admin_never_blocks() {
        assert!(!should_block(false, false, "/", ""));
        assert!(!should_block(true, true, "/albums", ""));
    }

    #[test]
    fn login_paths_and_assets_pass() {
        for path in ["/login", "/admin/login?next=/", "/admin-login", "/admin/logout"] {
            assert!(!should_block(true, false, path, ""), "{path}");
        }
        assert!(!should_block(true, false, "/assets/app.CSS", ""));
        assert!(!should_block(true, false, "/media/photo.jpeg", ""));
    }

    #[test]
    fn everything_else_is_blocked() {
        assert!(should_block(true, false, "/", ""));
        assert!(should_block(true, false, "/album/summer", ""));
        assert!(should_block(true, false, "/admin/dashboard", ""));
    }

    #[test]
    fn base_path_is_stripped() {
        assert!(!should_block(true, false, "/photos/admin/login", "/photos"));
        assert!(!should_block(true, false, "/photos/login", "/photos/public"));
        assert!(should_block(true, false, "/photos", "/photos"));
        assert!(should_block(true, false, "/photos/login", ""));
    }
}
