use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::context::UserId;

/// Everything the widget template needs once rendering is allowed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WidgetData {
    pub app_id: Option<String>,
    pub email: Option<String>,
    pub user_id: Option<UserId>,
    pub user_created: Option<DateTime<Utc>>,
    pub name: Option<String>,
    pub enable_inbox: bool,
    /// `"true"` or `"false"`, spliced verbatim into the widget script.
    pub use_counter: String,
    pub css_selector: String,
    /// JSON object string.
    pub custom_data: String,
    /// JSON object string; `"{}"` when no complete record is available.
    pub company_data: String,
    pub user_hash: Option<String>,
}

/// The per-render data bag. When `valid` is false the template must not
/// render the widget; `data` is then absent or not meaningful.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderPayload {
    pub valid: bool,
    #[serde(flatten)]
    pub data: Option<WidgetData>,
}

impl RenderPayload {
    pub fn invalid() -> Self {
        Self { valid: false, data: None }
    }

    pub fn should_render(&self) -> bool {
        self.valid && self.data.is_some()
    }

    /// The payload under the variable names the widget template reads.
    pub fn template_vars(&self) -> Map<String, Value> {
        let mut vars = Map::new();
        vars.insert("INTERCOM_IS_VALID".into(), Value::Bool(self.valid));
        let Some(d) = &self.data else {
            return vars;
        };
        let fields = json!({
            "intercom_appid": d.app_id,
            "email_address": d.email,
            "user_id": d.user_id,
            "user_created": d.user_created,
            "name": d.name,
            "enable_inbox": d.enable_inbox,
            "use_counter": d.use_counter,
            "css_selector": d.css_selector,
            "custom_data": d.custom_data,
            "company_data": d.company_data,
            "user_hash": d.user_hash,
        });
        if let Value::Object(fields) = fields {
            vars.extend(fields);
        }
        vars
    }
}
