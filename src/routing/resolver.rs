//! Reverse routing: route name and parameters to a concrete path.

use {
    super::registry::NameTable,
    crate::{Error, Result},
    std::{collections::BTreeMap, sync::Arc},
    url::Url,
};

/// Frozen name table of an assembled router.
///
/// Cheap to clone and safe to share across request handlers. The assembled
/// router carries one as an `Extension`:
///
/// ```rust
/// use axum::Extension;
/// use axum_enroute::Routes;
///
/// async fn link(Extension(routes): Extension<Routes>) -> String {
///     routes
///         .path_with("user", [("user", "42")])
///         .ok()
///         .flatten()
///         .unwrap_or_default()
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Routes {
    table: Arc<BTreeMap<String, String>>,
}

impl Routes {
    pub fn new(table: BTreeMap<String, String>) -> Self {
        Self {
            table: Arc::new(table),
        }
    }

    /// Path of a route without parameters. `None` for unknown names.
    ///
    /// # Errors
    ///
    /// `InvalidInput` when the template has parameters; use
    /// [`Routes::path_with`] for those.
    pub fn path(&self, name: &str) -> Result<Option<String>> {
        resolve(&self.table, name, std::iter::empty::<(&str, &str)>())
    }

    /// Path of a route with its parameters substituted.
    ///
    /// # Errors
    ///
    /// `InvalidInput` when the template needs a parameter `params` does not
    /// provide.
    pub fn path_with<I, K, V>(&self, name: &str, params: I) -> Result<Option<String>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: ToString,
    {
        resolve(&self.table, name, params)
    }

    /// The raw name table.
    pub fn routes(&self) -> &BTreeMap<String, String> {
        &self.table
    }

    pub fn contains(&self, name: &str) -> bool {
        self.table.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl From<&NameTable> for Routes {
    fn from(names: &NameTable) -> Self {
        Self::new(names.snapshot())
    }
}

/// Resolves `name` in `table`, substituting `params` into the template.
///
/// Returns `Ok(None)` when `name` is unknown. `:param` segments receive the
/// percent-encoded value; `*rest` segments keep `/` separators. Parameters
/// the template does not mention are ignored.
///
/// Empty values fail with `InvalidInput`. The dot segments `.` and `..` are
/// encoded as `%2E` so they reach the handler instead of being normalized
/// away by clients.
pub fn resolve<I, K, V>(
    table: &BTreeMap<String, String>,
    name: &str,
    params: I,
) -> Result<Option<String>>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: ToString,
{
    let Some(template) = table.get(name) else {
        return Ok(None);
    };

    let params: BTreeMap<String, String> = params
        .into_iter()
        .map(|(key, value)| (key.as_ref().to_string(), value.to_string()))
        .collect();

    let mut segments = Vec::new();
    for segment in template.split('/') {
        let resolved = match segment.strip_prefix(':') {
            Some(param) => encode_param(lookup(&params, name, param)?, name, param)?,
            None => match segment.strip_prefix('*') {
                Some(param) => encode_catch_all(lookup(&params, name, param)?, name, param)?,
                None => segment.to_string(),
            },
        };
        segments.push(resolved);
    }

    Ok(Some(segments.join("/")))
}

fn lookup<'a>(params: &'a BTreeMap<String, String>, name: &str, param: &str) -> Result<&'a str> {
    params.get(param).map(String::as_str).ok_or_else(|| {
        Error::invalid_input(format!(
            "Missing parameter '{param}' for route \"{name}\""
        ))
    })
}

fn empty_value(name: &str, param: &str) -> Error {
    Error::invalid_input(format!(
        "Empty value for parameter '{param}' of route \"{name}\""
    ))
}

fn encode_param(value: &str, name: &str, param: &str) -> Result<String> {
    if value.is_empty() {
        return Err(empty_value(name, param));
    }
    encode_segment(value)
}

fn encode_segment(value: &str) -> Result<String> {
    match value {
        "." => return Ok("%2E".to_string()),
        ".." => return Ok("%2E%2E".to_string()),
        _ => {}
    }

    let mut url = Url::parse("http://localhost/")?;
    url.path_segments_mut()
        .map_err(|()| Error::internal("base URL cannot hold path segments"))?
        .pop_if_empty()
        .push(value);
    Ok(url.path()[1..].to_string())
}

fn encode_catch_all(value: &str, name: &str, param: &str) -> Result<String> {
    let value = value.trim_start_matches('/');
    if value.is_empty() {
        return Err(empty_value(name, param));
    }

    let segments = value
        .split('/')
        .map(|segment| match segment {
            "" => Ok(String::new()),
            segment => encode_segment(segment),
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(segments.join("/"))
}
