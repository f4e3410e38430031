use std::env;

/// Base URL used when turning stored relative paths into servable URLs.
pub fn public_base_url() -> String {
    env::var("PUBLIC_BASE_URL").unwrap_or_else(|_| "http://localhost:8000".to_string())
}

/// Converts a stored image path into a URL a client can load.
///
/// Paths that already carry an http(s) scheme are returned unchanged for
/// backward compatibility with rows written before relative-path storage.
pub fn to_absolute_url(base_url: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }

    let base = base_url.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.starts_with("uploads/") {
        return format!("{}/{}", base, path);
    }

    // bare filename: assume it lives in the uploads root
    if !path.contains('/') {
        return format!("{}/uploads/{}", base, path);
    }

    format!("{}/{}", base, path)
}

/// Normalizes any image reference down to the storage-relative form
/// `uploads/[subfolder/]file.ext`. Idempotent; host prefixes and leading
/// slashes are stripped before persistence so stored rows stay portable
/// across deployment hosts.
pub fn to_relative_path(path: &str) -> Option<String> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut rest = trimmed;
    if let Some(idx) = rest.find("://") {
        let after_scheme = &rest[idx + 3..];
        rest = match after_scheme.find('/') {
            Some(slash) => &after_scheme[slash..],
            None => "",
        };
    }
    let mut rest = rest.trim_start_matches('/').to_string();

    if !rest.starts_with("uploads/") {
        if let Some(idx) = rest.find("uploads/") {
            rest = rest[idx..].to_string();
        }
    }

    if rest.is_empty() {
        None
    } else {
        Some(rest)
    }
}

/// Read-boundary helper for optional image columns.
pub fn absolutize(base_url: &str, path: &Option<String>) -> Option<String> {
    path.as_ref().map(|p| to_absolute_url(base_url, p))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://boganto.com";

    #[test]
    fn absolute_url_passthrough_for_legacy_rows() {
        let legacy = "https://cdn.example.com/uploads/a.png";
        assert_eq!(to_absolute_url(BASE, legacy), legacy);
    }

    #[test]
    fn absolute_url_prefixes_relative_paths() {
        assert_eq!(
            to_absolute_url(BASE, "uploads/banners/x.jpg"),
            "https://boganto.com/uploads/banners/x.jpg"
        );
        assert_eq!(
            to_absolute_url(BASE, "/uploads/x.jpg"),
            "https://boganto.com/uploads/x.jpg"
        );
    }

    #[test]
    fn absolute_url_assumes_uploads_root_for_bare_filenames() {
        assert_eq!(to_absolute_url(BASE, "x.jpg"), "https://boganto.com/uploads/x.jpg");
    }

    #[test]
    fn relative_path_strips_host_and_slash() {
        assert_eq!(
            to_relative_path("https://boganto.com/uploads/book_covers/y.png").as_deref(),
            Some("uploads/book_covers/y.png")
        );
        assert_eq!(
            to_relative_path("/uploads/y.png").as_deref(),
            Some("uploads/y.png")
        );
    }

    #[test]
    fn relative_path_truncates_before_uploads_token() {
        assert_eq!(
            to_relative_path("var/www/uploads/z.gif").as_deref(),
            Some("uploads/z.gif")
        );
    }

    #[test]
    fn relative_path_is_idempotent() {
        let inputs = [
            "uploads/a.png",
            "https://boganto.com/uploads/a.png",
            "/uploads/sub/a.png",
            "plain.png",
        ];
        for input in inputs {
            let once = to_relative_path(input);
            let twice = once.as_deref().and_then(to_relative_path);
            assert_eq!(once, twice, "not idempotent for {input}");
        }
    }

    #[test]
    fn round_trip_matches_single_normalization() {
        for p in ["uploads/a.png", "uploads/banners/b.webp"] {
            let url = to_absolute_url(BASE, p);
            assert_eq!(to_relative_path(&url), to_relative_path(p));
        }
    }

    #[test]
    fn empty_input_yields_none() {
        assert_eq!(to_relative_path(""), None);
        assert_eq!(to_relative_path("  "), None);
    }
}
