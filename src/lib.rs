pub mod errors;
pub mod context;
pub mod settings;
pub mod providers;  // plugin model
pub mod attributes;
pub mod integrity;
pub mod payload;
mod resolver;

pub use context::{RequestContext, TemplateContext, User, UserId, Visitor};
pub use errors::{IntegrityError, ProviderError, Result, SettingsError};
pub use payload::{RenderPayload, WidgetData};
pub use providers::{AttributeProvider, Attributes, CompanyDataProvider, Registry, UserData, UserDataProvider};
pub use resolver::{Resolver, ANONYMOUS_NAME};
pub use settings::Settings;

/// Convenience: resolve against the process-wide settings loaded from the
/// environment.
pub fn resolve(ctx: &TemplateContext, registry: Registry) -> RenderPayload {
    Resolver::new(settings::global().clone(), registry).resolve(ctx)
}
