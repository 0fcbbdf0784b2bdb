use itertools::Itertools;
use serde_json::Value;
use tracing::warn;

use crate::context::User;
use crate::providers::{Attributes, Lookup, Registry};

/// Keys a company record must carry before it is forwarded.
pub const REQUIRED_COMPANY_KEYS: [&str; 3] = ["id", "name", "created_at"];

const EMPTY: &str = "{}";

/// Merge every configured attribute provider's output, in order, into one
/// JSON object string. Providers that cannot be used are skipped.
pub fn custom_data(registry: &Registry, providers: Option<&[String]>, user: &User) -> String {
    let mut bag = Attributes::new();
    for id in providers.unwrap_or_default() {
        match registry.attributes(id) {
            Lookup::Found(p) => match p.custom_data(user) {
                Ok(data) => bag.extend(data),
                Err(e) => warn!(provider = %id, error = %e, "custom_data failed, skipping"),
            },
            Lookup::MissingCapability => {
                warn!(provider = %id, "doesn't have a custom_data method, skipping")
            }
            Lookup::NotRegistered => {
                warn!(provider = %id, "couldn't be loaded, no such provider registered, skipping")
            }
        }
    }
    to_json(bag)
}

/// The configured company record as a JSON object string, or `"{}"` when
/// there is none or it is incomplete.
pub fn company_data(registry: &Registry, provider: Option<&str>, user: &User) -> String {
    let Some(id) = provider else {
        return EMPTY.to_string();
    };
    let record = match registry.company(id) {
        Lookup::Found(p) => match p.company_data(user) {
            Ok(record) => record,
            Err(e) => {
                warn!(provider = %id, error = %e, "company_data failed, skipping");
                return EMPTY.to_string();
            }
        },
        Lookup::MissingCapability => {
            warn!(provider = %id, "doesn't have a company_data method, skipping");
            return EMPTY.to_string();
        }
        Lookup::NotRegistered => {
            warn!(provider = %id, "couldn't be loaded, no such provider registered, skipping");
            return EMPTY.to_string();
        }
    };

    let missing = REQUIRED_COMPANY_KEYS
        .iter()
        .filter(|k| !record.contains_key(**k))
        .join(", ");
    if !missing.is_empty() {
        warn!(
            provider = %id,
            missing = %missing,
            "company record lacks required keys (id, name, created_at), skipping"
        );
        return EMPTY.to_string();
    }
    to_json(record)
}

fn to_json(map: Attributes) -> String {
    // Serializing a Map<String, Value> cannot fail.
    serde_json::to_string(&Value::Object(map)).unwrap_or_else(|_| EMPTY.to_string())
}
