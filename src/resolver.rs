use tracing::{debug, warn};

use crate::attributes;
use crate::context::{RequestContext, TemplateContext, User, UserId};
use crate::integrity;
use crate::payload::{RenderPayload, WidgetData};
use crate::providers::{Lookup, Registry, UserData};
use crate::settings::Settings;

/// Name shown for visitors who are not logged in.
pub const ANONYMOUS_NAME: &str = "Unknown";

/// Resolves the widget payload for one render. Holds no per-request state,
/// so a single instance can serve every request.
#[derive(Clone)]
pub struct Resolver {
    settings: Settings,
    registry: Registry,
}

impl Resolver {
    pub fn new(settings: Settings, registry: Registry) -> Self {
        Self { settings, registry }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Never fails: every provider problem is logged and degraded.
    pub fn resolve(&self, ctx: &TemplateContext) -> RenderPayload {
        if self.settings.disabled {
            return RenderPayload::invalid();
        }
        let Some(request) = ctx.request.as_ref() else {
            return RenderPayload::invalid();
        };

        let has_app_id = self.settings.app_id.is_some();
        if !has_app_id {
            warn!("INTERCOM_APPID isn't set up correctly in your settings");
        }

        // Without an app id nothing will be rendered, so third-party
        // providers are not run.
        let data = match request.user() {
            Some(user) if has_app_id => {
                debug!(user_id = %user.id, "resolving authenticated visitor");
                self.authenticated(user)
            }
            _ => {
                debug!("resolving anonymous visitor");
                self.anonymous(request)
            }
        };

        RenderPayload {
            valid: has_app_id,
            data: Some(data),
        }
    }

    fn authenticated(&self, user: &User) -> WidgetData {
        let overrides = self.user_data(user);

        let user_id = if self.settings.include_user_id {
            overrides.user_id.or_else(|| Some(user.id.clone()))
        } else {
            None
        };
        let email = overrides.email.or_else(|| user.email.clone());
        let user_created = overrides.user_created.or(Some(user.date_joined));
        let name = overrides
            .name
            .or_else(|| user.display_name().map(str::to_string));

        // Attribute and company providers see the full user, not the
        // overridden identity.
        let custom_data = attributes::custom_data(
            &self.registry,
            self.settings.attribute_providers.as_deref(),
            user,
        );
        let company_data = attributes::company_data(
            &self.registry,
            self.settings.company_attributes_provider.as_deref(),
            user,
        );

        let user_hash = self.user_hash(user_id.as_ref(), email.as_deref());

        WidgetData {
            app_id: self.settings.app_id.clone(),
            email,
            user_id,
            user_created,
            name,
            enable_inbox: self.settings.enable_inbox,
            use_counter: self.settings.use_counter().to_string(),
            css_selector: self.settings.inbox_css_selector.clone(),
            custom_data,
            company_data,
            user_hash,
        }
    }

    fn anonymous(&self, request: &RequestContext) -> WidgetData {
        WidgetData {
            app_id: self.settings.app_id.clone(),
            email: self.settings.unauthenticated_email.clone(),
            user_id: request.session_key.clone().map(Into::into),
            user_created: None,
            name: Some(ANONYMOUS_NAME.to_string()),
            enable_inbox: self.settings.enable_inbox,
            use_counter: self.settings.use_counter().to_string(),
            css_selector: self.settings.inbox_css_selector.clone(),
            custom_data: "{}".to_string(),
            company_data: "{}".to_string(),
            user_hash: None,
        }
    }

    /// Identity overrides from the configured user data provider, or none.
    fn user_data(&self, user: &User) -> UserData {
        let Some(id) = self.settings.user_attributes_provider.as_deref() else {
            return UserData::default();
        };
        match self.registry.user_data(id) {
            Lookup::Found(p) => p.user_data(user).unwrap_or_else(|e| {
                warn!(provider = %id, error = %e, "user_data failed, using the user's own fields");
                UserData::default()
            }),
            Lookup::MissingCapability => {
                warn!(provider = %id, "doesn't have a user_data method, skipping");
                UserData::default()
            }
            Lookup::NotRegistered => {
                warn!(provider = %id, "couldn't be loaded, no such provider registered, skipping");
                UserData::default()
            }
        }
    }

    fn user_hash(&self, user_id: Option<&UserId>, email: Option<&str>) -> Option<String> {
        let key = self.settings.secret_key.as_deref()?;
        let subject = integrity::hash_subject(user_id, email)?;
        match integrity::user_hash(key, &subject) {
            Ok(h) => Some(h),
            Err(e) => {
                warn!(error = %e, "could not compute user_hash");
                None
            }
        }
    }
}
