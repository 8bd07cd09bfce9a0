//! Path syntax helpers shared by the scanner, the registry and the resolver.
//!
//! Three spellings of a route parameter meet here:
//!
//! - file names use braces: `controllers/users/{user}.rs`
//! - route templates (what the name table stores) use colons: `/users/:user`
//! - axum 0.8 uses braces again: `/users/{user}`, `/files/{*rest}`

use {regex::Regex, std::sync::LazyLock};

static BRACE_PARAM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{([^}]+)\}").unwrap());

static COLON_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^|/):([^/]+)").unwrap());

static STAR_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^|/)\*([^/]+)").unwrap());

static ROUTER_CATCH_ALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\*([^}/]+)\}").unwrap());

static ROUTER_PARAM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{([^}/*]+)\}").unwrap());

/// Converts `/a/b/{c}/d/{e}` to `/a/b/:c/d/:e`.
pub(crate) fn braces_to_params(path: &str) -> String {
    BRACE_PARAM.replace_all(path, ":$1").into_owned()
}

/// Converts a path in any accepted spelling into the syntax axum registers.
///
/// `:id` becomes `{id}`, `*rest` becomes `{*rest}`, braces pass through.
pub(crate) fn to_router_path(path: &str) -> String {
    let path = ensure_leading_slash(path);
    let path = COLON_SEGMENT.replace_all(&path, "${1}{${2}}");
    STAR_SEGMENT.replace_all(&path, "${1}{*${2}}").into_owned()
}

/// Converts a path in any accepted spelling into the colon template stored in
/// the name table.
pub(crate) fn to_template_path(path: &str) -> String {
    let path = ROUTER_CATCH_ALL.replace_all(path, "*$1");
    ROUTER_PARAM.replace_all(&path, ":$1").into_owned()
}

pub(crate) fn ensure_leading_slash(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

/// Removes a single trailing `/`, leaving the root path untouched.
pub(crate) fn trim_trailing_slash(path: &str) -> &str {
    match path.strip_suffix('/') {
        Some(trimmed) if !trimmed.is_empty() => trimmed,
        _ => path,
    }
}

/// Joins a mountpath and a route path the way the name table expects:
/// the mountpath loses its trailing slash, the result loses its trailing
/// slash unless it is `/`.
pub(crate) fn join_mountpath(mountpath: &str, path: &str) -> String {
    let prefix = mountpath.strip_suffix('/').unwrap_or(mountpath);
    let joined = format!("{prefix}{}", ensure_leading_slash(path));
    trim_trailing_slash(&joined).to_string()
}

/// Whether the final segment of a path is a catch-all parameter.
pub(crate) fn ends_with_catch_all(path: &str) -> bool {
    path.rsplit('/')
        .next()
        .is_some_and(|segment| segment.starts_with('*') || segment.starts_with("{*"))
}

/// The router path with parameter names erased. Router paths with the same
/// shape match the same requests.
pub(crate) fn route_shape(path: &str) -> String {
    let shape = ROUTER_CATCH_ALL.replace_all(path, "{*}");
    ROUTER_PARAM.replace_all(&shape, "{}").into_owned()
}

/// Whether a request path is `prefix` or lies below it.
///
/// `prefix` is a router path: a `{param}` segment matches any one segment
/// and a `{*rest}` segment matches whatever remains.
pub(crate) fn matches_prefix(prefix: &str, path: &str) -> bool {
    let mut actual = path.split('/').filter(|segment| !segment.is_empty());
    for expected in prefix.split('/').filter(|segment| !segment.is_empty()) {
        if expected.starts_with("{*") {
            return true;
        }
        let is_param = expected.starts_with('{') && expected.ends_with('}');
        match actual.next() {
            Some(segment) if is_param || segment == expected => {}
            _ => return false,
        }
    }
    true
}
