use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

use crate::context::{User, UserId};
use crate::errors::Result;

/// Free-form JSON object forwarded to the widget.
pub type Attributes = Map<String, Value>;

/// Identity overrides; any field left `None` falls back to the user's own.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserData {
    pub email: Option<String>,
    pub user_id: Option<UserId>,
    pub user_created: Option<DateTime<Utc>>,
    pub name: Option<String>,
}

/// Supplies identity fields that take priority over the user's own.
pub trait UserDataProvider: Send + Sync {
    fn user_data(&self, user: &User) -> Result<UserData>;
}

/// Supplies custom attributes merged into the attribute bag.
pub trait AttributeProvider: Send + Sync {
    fn custom_data(&self, user: &User) -> Result<Attributes>;
}

/// Supplies the company record; must carry `id`, `name` and `created_at`.
pub trait CompanyDataProvider: Send + Sync {
    fn company_data(&self, user: &User) -> Result<Attributes>;
}

impl<F> UserDataProvider for F
where
    F: Fn(&User) -> Result<UserData> + Send + Sync,
{
    fn user_data(&self, user: &User) -> Result<UserData> {
        self(user)
    }
}

impl<F> AttributeProvider for F
where
    F: Fn(&User) -> Result<Attributes> + Send + Sync,
{
    fn custom_data(&self, user: &User) -> Result<Attributes> {
        self(user)
    }
}

impl<F> CompanyDataProvider for F
where
    F: Fn(&User) -> Result<Attributes> + Send + Sync,
{
    fn company_data(&self, user: &User) -> Result<Attributes> {
        self(user)
    }
}

/// Outcome of resolving a configured provider identifier.
pub enum Lookup<T: ?Sized> {
    Found(Arc<T>),
    /// Registered, but not for the requested capability.
    MissingCapability,
    NotRegistered,
}

/// Thread-safe provider registry, populated by the host at startup and
/// addressed by the identifiers named in settings.
#[derive(Clone, Default)]
pub struct Registry {
    user_data: Arc<HashMap<String, Arc<dyn UserDataProvider>>>,
    attributes: Arc<HashMap<String, Arc<dyn AttributeProvider>>>,
    company: Arc<HashMap<String, Arc<dyn CompanyDataProvider>>>,
}

impl Registry {
    pub fn new() -> Self { Self::default() }

    pub fn register_user_data<P: UserDataProvider + 'static>(&mut self, id: impl Into<String>, p: P) -> &mut Self {
        Arc::make_mut(&mut self.user_data).insert(id.into(), Arc::new(p));
        self
    }

    pub fn register_attributes<P: AttributeProvider + 'static>(&mut self, id: impl Into<String>, p: P) -> &mut Self {
        Arc::make_mut(&mut self.attributes).insert(id.into(), Arc::new(p));
        self
    }

    pub fn register_company<P: CompanyDataProvider + 'static>(&mut self, id: impl Into<String>, p: P) -> &mut Self {
        Arc::make_mut(&mut self.company).insert(id.into(), Arc::new(p));
        self
    }

    pub fn is_registered(&self, id: &str) -> bool {
        self.user_data.contains_key(id) || self.attributes.contains_key(id) || self.company.contains_key(id)
    }

    pub fn user_data(&self, id: &str) -> Lookup<dyn UserDataProvider> {
        match self.user_data.get(id) {
            Some(p) => Lookup::Found(Arc::clone(p)),
            None => self.miss(id),
        }
    }

    pub fn attributes(&self, id: &str) -> Lookup<dyn AttributeProvider> {
        match self.attributes.get(id) {
            Some(p) => Lookup::Found(Arc::clone(p)),
            None => self.miss(id),
        }
    }

    pub fn company(&self, id: &str) -> Lookup<dyn CompanyDataProvider> {
        match self.company.get(id) {
            Some(p) => Lookup::Found(Arc::clone(p)),
            None => self.miss(id),
        }
    }

    fn miss<T: ?Sized>(&self, id: &str) -> Lookup<T> {
        if self.is_registered(id) {
            Lookup::MissingCapability
        } else {
            Lookup::NotRegistered
        }
    }
}

/// Ready-made providers for hosts whose data does not depend on the user.
pub mod fixed {
    use super::*;

    /// Returns the same attribute map for every user.
    pub struct StaticAttributes(pub Attributes);

    impl AttributeProvider for StaticAttributes {
        fn custom_data(&self, _user: &User) -> Result<Attributes> {
            Ok(self.0.clone())
        }
    }

    /// Returns the same company record for every user.
    pub struct StaticCompany(pub Attributes);

    impl CompanyDataProvider for StaticCompany {
        fn company_data(&self, _user: &User) -> Result<Attributes> {
            Ok(self.0.clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixed::StaticAttributes;
    use super::*;
    use crate::errors::ProviderError;
    use chrono::TimeZone;
    use serde_json::json;

    fn user() -> User {
        User::new(1, Utc.with_ymd_and_hms(2021, 6, 1, 0, 0, 0).unwrap())
    }

    fn attrs(v: Value) -> Attributes {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn lookup_distinguishes_missing_capability_from_unknown() {
        let mut reg = Registry::new();
        reg.register_attributes("plan", StaticAttributes(attrs(json!({"plan": "pro"}))));

        assert!(matches!(reg.attributes("plan"), Lookup::Found(_)));
        assert!(matches!(reg.company("plan"), Lookup::MissingCapability));
        assert!(matches!(reg.company("acme"), Lookup::NotRegistered));
    }

    #[test]
    fn closures_register_as_providers() {
        let mut reg = Registry::new();
        reg.register_attributes("ids", |u: &User| -> Result<Attributes> {
            Ok(attrs(json!({"uid": u.id.to_string()})))
        });
        reg.register_company("broken", |_: &User| -> Result<Attributes> {
            Err(ProviderError::Failed("db down".into()))
        });

        let Lookup::Found(p) = reg.attributes("ids") else { panic!("not found") };
        assert_eq!(p.custom_data(&user()).unwrap(), attrs(json!({"uid": "1"})));

        let Lookup::Found(c) = reg.company("broken") else { panic!("not found") };
        assert!(c.company_data(&user()).is_err());
    }

    #[test]
    fn clones_share_registrations_until_modified() {
        let mut a = Registry::new();
        a.register_attributes("x", StaticAttributes(Attributes::new()));
        let mut b = a.clone();
        b.register_attributes("y", StaticAttributes(Attributes::new()));
        assert!(a.is_registered("x"));
        assert!(!a.is_registered("y"));
        assert!(b.is_registered("x") && b.is_registered("y"));
    }

    #[test]
    fn explicit_null_override_means_no_override() {
        let ud: UserData = serde_json::from_str(r#"{"email": null, "name": "n"}"#).unwrap();
        assert_eq!(ud.email, None);
        assert_eq!(ud.name.as_deref(), Some("n"));
    }
}
