use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use intercom_context::context::TemplateContext;
use intercom_context::providers::Registry;
use intercom_context::{RequestContext, Resolver, Settings, User};
use tracing_subscriber::EnvFilter;

/// Resolve the widget payload for a visitor and print it as JSON.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Settings file (format from its extension). INTERCOM_* environment variables override it.
    #[arg(long)]
    settings: Option<PathBuf>,
    /// Authenticated user as JSON, e.g. '{"id":1,"email":"a@b.c","date_joined":"2020-01-01T00:00:00Z"}'.
    /// Omit for an anonymous visitor.
    #[arg(long)]
    user: Option<String>,
    /// Session key of the visitor
    #[arg(long)]
    session: Option<String>,
    /// Simulate a render with no request in the context
    #[arg(long)]
    no_request: bool,
    /// Print the variables under the names the widget template reads
    #[arg(long)]
    template_vars: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    // Parse CLI arguments.
    let args = Args::parse();

    let settings = match args.settings.as_deref() {
        Some(path) => match Settings::load(Some(path)) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("{}: {e}", path.display());
                return ExitCode::FAILURE;
            }
        },
        None => Settings::from_env(),
    };

    let ctx = if args.no_request {
        TemplateContext::without_request()
    } else {
        let request = match args.user.as_deref() {
            Some(doc) => match serde_json::from_str::<User>(doc) {
                Ok(user) => RequestContext::authenticated(user),
                Err(e) => {
                    eprintln!("Invalid user JSON: {e}");
                    return ExitCode::FAILURE;
                }
            },
            None => RequestContext::anonymous(None),
        };
        let request = match args.session {
            Some(key) => request.with_session(key),
            None => request,
        };
        TemplateContext::new(request)
    };

    let payload = Resolver::new(settings, Registry::new()).resolve(&ctx);

    let out = if args.template_vars {
        serde_json::to_string_pretty(&payload.template_vars())
    } else {
        serde_json::to_string_pretty(&payload)
    };
    match out {
        Ok(s) => {
            println!("{s}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("could not serialize payload: {e}");
            ExitCode::FAILURE
        }
    }
}
