use std::path::Path;
use std::sync::OnceLock;

use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use config::builder::DefaultState;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use crate::errors::SettingsError;

pub const DEFAULT_CSS_SELECTOR: &str = "#Intercom";

/// Environment variable prefix, e.g. `INTERCOM_APPID`.
pub const ENV_PREFIX: &str = "INTERCOM";

/// Process-wide widget configuration. Read once, never mutated.
///
/// Aliases accept the historical setting names, which is what the
/// `INTERCOM_*` environment variables reduce to once the prefix is stripped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(alias = "appid")]
    pub app_id: Option<String>,
    /// Enables identity verification hashes when set.
    #[serde(alias = "secure_key")]
    pub secret_key: Option<String>,
    pub enable_inbox: bool,
    pub enable_inbox_counter: bool,
    pub inbox_css_selector: String,
    #[serde(alias = "user_data_class")]
    pub user_attributes_provider: Option<String>,
    /// Merged in order; later providers win on key collisions.
    #[serde(alias = "custom_data_classes", deserialize_with = "provider_list")]
    pub attribute_providers: Option<Vec<String>>,
    #[serde(alias = "company_data_class")]
    pub company_attributes_provider: Option<String>,
    #[serde(alias = "include_userid")]
    pub include_user_id: bool,
    pub disabled: bool,
    #[serde(alias = "unauthenticated_user_email")]
    pub unauthenticated_email: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_id: None,
            secret_key: None,
            enable_inbox: true,
            enable_inbox_counter: true,
            inbox_css_selector: DEFAULT_CSS_SELECTOR.to_string(),
            user_attributes_provider: None,
            attribute_providers: None,
            company_attributes_provider: None,
            include_user_id: true,
            disabled: false,
            unauthenticated_email: None,
        }
    }
}

impl Settings {
    /// Layer an optional settings file under `INTERCOM_*` environment
    /// variables. Fields set nowhere keep their defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        Self::finish(builder, environment())
    }

    /// Environment-only load that never fails: a broken environment is
    /// logged and the defaults are used instead.
    pub fn from_env() -> Self {
        Self::load(None).unwrap_or_else(|e| {
            warn!(error = %e, "could not load INTERCOM_* settings, using defaults");
            Settings::default()
        })
    }

    /// Same as the environment layer, but reading the given pairs instead of
    /// the process environment.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, SettingsError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: config::Map<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::finish(Config::builder(), environment().source(Some(vars)))
    }

    pub fn from_json_str(doc: &str) -> Result<Self, SettingsError> {
        let builder = Config::builder().add_source(File::from_str(doc, FileFormat::Json));
        let s: Settings = builder.build()?.try_deserialize()?;
        s.warn_if_incomplete();
        Ok(s)
    }

    fn finish(builder: ConfigBuilder<DefaultState>, env: Environment) -> Result<Self, SettingsError> {
        let s: Settings = builder.add_source(env).build()?.try_deserialize()?;
        s.warn_if_incomplete();
        Ok(s)
    }

    /// `"true"`/`"false"` as the widget template expects.
    pub fn use_counter(&self) -> &'static str {
        if self.enable_inbox_counter {
            "true"
        } else {
            "false"
        }
    }

    fn warn_if_incomplete(&self) {
        if self.app_id.is_none() {
            warn!("INTERCOM_APPID isn't set up correctly in your settings");
        }
    }
}

// No `try_parsing`: it would coerce numeric or boolean looking secrets and
// app ids. Booleans are still read from their string form on deserialize.
fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX).ignore_empty(true)
}

/// Accepts a list (settings files) or a comma separated string (environment).
fn provider_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        List(Vec<String>),
        Joined(String),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::List(ids) => ids,
        Raw::Joined(joined) => joined
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(String::from)
            .collect(),
    }))
}

static GLOBAL: OnceLock<Settings> = OnceLock::new();

/// Settings loaded from the environment on first use.
pub fn global() -> &'static Settings {
    GLOBAL.get_or_init(Settings::from_env)
}
