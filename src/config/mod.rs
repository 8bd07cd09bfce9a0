//!
//! Configuration structures and utilities for assembling routers.
//!
//! A configuration can be created in many ways:
//! - From an environment-specific TOML file via `Config::from_rust_env` or `Config::from_toml_file`
//! - From a TOML string via `Config::from_toml`
//! - Constructed programmatically via the builder methods on `Config`
//!
//! In both TOML-based methods, environment variables can be referenced in the TOML
//! using the {{ VAR_NAME }} syntax, and they will be substituted with the corresponding
//! environment variable value. This is done via the `replace_handlebars_with_env`
//! function, so machine-specific paths do not have to live in the TOML files.
//!
//! Configuration is split into logical sections, each represented by their own struct:
//!
//! - `RoutingConfig` for route assembly (index, directory, declared routes)
//! - `LoggingConfig` for logging and tracing settings
//!
mod logging;
mod routing;

pub use logging::*;
pub use routing::*;

use {
    crate::{Error, Result, RouterOptions, utils::replace_handlebars_with_env},
    serde::Deserialize,
    std::{env, fs, path::PathBuf, str::FromStr},
};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub routing: RoutingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Config {
    ///
    /// Creates a default configuration.
    /// This will attempt to load configuration from the file based on the RUST_ENV
    /// environment variable falling back to a default configuration if the environment
    /// variable is not set. Configuration files should be located in the "config/"
    /// directory of your project.
    ///
    fn default() -> Self {
        match Self::from_rust_env() {
            Ok(config) => config,
            Err(_) => Self::empty(),
        }
    }
}

impl Config {
    ///
    /// A configuration with every section at its defaults, without looking
    /// at the environment. Assembling it yields an empty router.
    ///
    pub fn empty() -> Self {
        Config {
            routing: RoutingConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    ///
    /// Loads the configuration from a file based on the RUST_ENV environment variable.
    /// Fails when RUST_ENV is not set.
    ///
    pub fn from_rust_env() -> Result<Config> {
        Self::from_toml_file(env::var("RUST_ENV")?)
    }

    ///
    /// Given an environment name, loads the corresponding configuration file,
    /// substitutes any environment variables, and returns a Config struct.
    /// The configuration file is expected to be located at "config/{env}.toml"
    /// where {env} is the provided environment name (e.g., "dev", "prod").
    ///
    pub fn from_toml_file(env: impl AsRef<str>) -> Result<Config> {
        let path = format!("config/{}.toml", env.as_ref());
        let text = fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    ///
    /// Parses a configuration string in TOML format into a Config struct.
    ///
    pub fn from_toml(toml_str: &str) -> Result<Config> {
        replace_handlebars_with_env(toml_str).parse()
    }

    /// Sets the mount path the assembled router is attached at.
    pub fn with_mountpath(mut self, mountpath: &str) -> Self {
        self.routing.mountpath = mountpath.into();
        self
    }

    /// Sets the base directory index and directory paths are relative to.
    pub fn with_basedir(mut self, basedir: impl Into<PathBuf>) -> Self {
        self.routing.basedir = Some(basedir.into());
        self
    }

    /// Sets the index module.
    pub fn with_index(mut self, index: &str) -> Self {
        self.routing.index = Some(index.into());
        self
    }

    /// Sets the directory of handler modules.
    pub fn with_directory(mut self, directory: &str) -> Self {
        self.routing.directory = Some(directory.into());
        self
    }

    /// Adds glob patterns the directory scan skips.
    pub fn with_ignore<S: AsRef<str>>(mut self, patterns: &[S]) -> Self {
        self.routing
            .ignore
            .extend(patterns.iter().map(|pattern| pattern.as_ref().to_string()));
        self
    }

    /// Sets the router options used by every registry of the assembly.
    pub fn with_router_options(mut self, options: RouterOptions) -> Self {
        self.routing.router_options = options;
        self
    }

    /// Enables or disables strict trailing-slash routing.
    pub fn with_strict_routing(mut self, strict: bool) -> Self {
        self.routing.router_options.strict = strict;
        self
    }

    /// Appends a declared route.
    pub fn with_route(mut self, route: RouteConfig) -> Self {
        self.routing.routes.push(route);
        self
    }

    /// Sets the log format of the LoggingConfig.
    pub fn with_log_format(mut self, format: LogFormat) -> Self {
        self.logging.format = format;
        self
    }

    /// Enables or disables the request trace layer.
    pub fn with_trace_requests(mut self, enable: bool) -> Self {
        self.logging.trace_requests = enable;
        self
    }

    /// Ensures that the configuration is valid.
    /// Every value is optional, so validation only rejects values that can
    /// never assemble: a relative mount path, broken ignore globs and
    /// unsupported router options.
    pub fn validate(&self) -> Result<()> {
        self.routing.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    ///
    /// Sets up the tracing subscriber for logging based on the LoggingConfig.
    ///
    /// NOTE: This should be called early during startup to ensure logging is configured
    ///       before any log messages are emitted.
    ///
    pub fn setup_tracing(&self) {
        use tracing_subscriber::{EnvFilter, prelude::*};
        let env_filter = EnvFilter::from_default_env();
        match self.logging.format {
            LogFormat::Json => {
                let _ = tracing_subscriber::registry()
                    .with(tracing_subscriber::fmt::layer().json())
                    .with(env_filter)
                    .try_init();
            }
            LogFormat::Default => {
                let _ = tracing_subscriber::registry()
                    .with(tracing_subscriber::fmt::layer())
                    .with(env_filter)
                    .try_init();
            }
            LogFormat::Compact => {
                let _ = tracing_subscriber::registry()
                    .with(tracing_subscriber::fmt::layer().compact())
                    .with(env_filter)
                    .try_init();
            }
            LogFormat::Pretty => {
                let _ = tracing_subscriber::registry()
                    .with(tracing_subscriber::fmt::layer().pretty())
                    .with(env_filter)
                    .try_init();
            }
        }
    }
}

///
/// Parses a configuration string with references to environment variables
/// into a Config struct by substituting the environment variables and then
/// parsing the resulting TOML.
///
impl FromStr for Config {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        let config_file = replace_handlebars_with_env(s);
        let config = toml::from_str::<Config>(&config_file)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_unset_variables_parse_as_empty_strings() {
        unsafe {
            env::set_var("ROUTES_MOUNT_DIR", "controllers");
            env::remove_var("ROUTES_UNSET_INDEX");
        }

        let config = Config::from_toml(
            r#"
[routing]
directory = "{{ROUTES_MOUNT_DIR}}"
index = "{{  ROUTES_UNSET_INDEX  }}"
"#,
        )
        .unwrap();
        assert_eq!(config.routing.directory.as_deref(), Some("controllers"));
        assert_eq!(config.routing.index.as_deref(), Some(""));

        unsafe {
            env::remove_var("ROUTES_MOUNT_DIR");
        }
    }

    #[test]
    fn test_config_from_str_valid() {
        unsafe {
            env::set_var("ROUTES_BASEDIR", "/srv/app");
        }

        let config_str = r#"
[routing]
mountpath = "/api"
basedir = "{{ ROUTES_BASEDIR }}"
index = "routes"
directory = "controllers"
ignore = ["**/helpers/**"]

[routing.router_options]
strict = true

[[routing.routes]]
path = "/health"
method = "GET"
handler = "health"
middleware = ["auth", "audit"]
name = "health"

[[routing.routes]]
path = "/echo"
method = "all"
handler = "echo"

[logging]
format = "json"
trace_requests = true
        "#;

        let config = config_str.parse::<Config>();
        assert!(config.is_ok(), "{config:?}");

        let config = config.unwrap();
        assert_eq!(config.routing.mountpath, "/api");
        assert_eq!(config.routing.basedir, Some(PathBuf::from("/srv/app")));
        assert_eq!(config.routing.index.as_deref(), Some("routes"));
        assert_eq!(config.routing.directory.as_deref(), Some("controllers"));
        assert_eq!(config.routing.ignore, vec!["**/helpers/**".to_string()]);
        assert!(config.routing.router_options.strict);
        assert!(config.routing.router_options.case_sensitive);
        assert_eq!(config.routing.routes.len(), 2);
        assert_eq!(
            config.routing.routes[0].middleware,
            vec!["auth".to_string(), "audit".to_string()]
        );
        assert_eq!(config.routing.routes[1].name, None);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert!(config.logging.trace_requests);

        unsafe {
            env::remove_var("ROUTES_BASEDIR");
        }
    }

    #[test]
    fn test_config_from_str_empty_is_all_defaults() {
        let config: Config = "".parse().unwrap();
        assert_eq!(config.routing.mountpath, "/");
        assert!(config.routing.index.is_none());
        assert!(config.routing.directory.is_none());
        assert!(config.routing.routes.is_empty());
        assert!(!config.routing.router_options.strict);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_str_invalid_toml() {
        let invalid_config = "this is not valid toml";
        let result = invalid_config.parse::<Config>();
        assert_eq!(result.unwrap_err().kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_config_builder_matches_toml_equivalent() {
        let builder_config = Config::empty()
            .with_mountpath("/api")
            .with_basedir("/srv/app")
            .with_index("routes")
            .with_directory("controllers")
            .with_ignore(&["*.bak"])
            .with_strict_routing(true)
            .with_route(RouteConfig {
                path: "/health".into(),
                handler: Some("health".into()),
                ..RouteConfig::default()
            })
            .with_log_format(LogFormat::Compact)
            .with_trace_requests(true);

        let toml_str = r#"
[routing]
mountpath = "/api"
basedir = "/srv/app"
index = "routes"
directory = "controllers"
ignore = ["*.bak"]
router_options = { strict = true }
routes = [{ path = "/health", handler = "health" }]

[logging]
format = "compact"
trace_requests = true
        "#;

        let toml_config: Config = toml_str.parse().expect("Failed to parse TOML config");

        assert_eq!(builder_config.routing.mountpath, toml_config.routing.mountpath);
        assert_eq!(builder_config.routing.basedir, toml_config.routing.basedir);
        assert_eq!(builder_config.routing.index, toml_config.routing.index);
        assert_eq!(builder_config.routing.directory, toml_config.routing.directory);
        assert_eq!(builder_config.routing.ignore, toml_config.routing.ignore);
        assert_eq!(
            builder_config.routing.router_options,
            toml_config.routing.router_options
        );
        assert_eq!(builder_config.routing.routes, toml_config.routing.routes);
        assert_eq!(builder_config.logging.format, toml_config.logging.format);
        assert_eq!(
            builder_config.logging.trace_requests,
            toml_config.logging.trace_requests
        );
    }

    #[test]
    fn test_validate_rejects_relative_mountpath() {
        let config = Config::empty().with_mountpath("api");
        assert_eq!(config.validate().unwrap_err().kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_validate_rejects_bad_ignore_glob() {
        let config = Config::empty().with_ignore(&["[oops"]);
        assert_eq!(config.validate().unwrap_err().kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_validate_rejects_case_insensitive_routing() {
        let config: Config = "[routing.router_options]\ncase_sensitive = false"
            .parse()
            .unwrap();
        assert_eq!(config.validate().unwrap_err().kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_resolve_path_uses_basedir() {
        let config = Config::empty().with_basedir("/srv/app");
        assert_eq!(
            config.routing.resolve_path("controllers").unwrap(),
            PathBuf::from("/srv/app/controllers")
        );
        assert_eq!(
            config.routing.resolve_path("/elsewhere").unwrap(),
            PathBuf::from("/elsewhere")
        );

        let config = Config::empty();
        assert_eq!(
            config.routing.resolve_path("controllers").unwrap(),
            env::current_dir().unwrap().join("controllers")
        );
    }

    #[test]
    fn test_load_from_rust_env() {
        unsafe {
            env::set_var("RUST_ENV", "test");
        }

        let result = Config::from_rust_env();
        assert!(
            result.is_ok(),
            "Expected configuration file to load successfully"
        );

        unsafe {
            env::remove_var("RUST_ENV");
        }

        let result = Config::from_rust_env();
        assert!(
            result.is_err(),
            "Expected error when RUST_ENV is not set"
        );
    }
}
