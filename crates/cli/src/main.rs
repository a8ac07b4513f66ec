use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use area_api::AreaClient;
use area_engine::{ComposerMode, WizardEvent, WizardSession, apply_plan, parse_plan_file};
use area_types::{ActKind, AppletCreateRequest, RemoteId};
use area_util::{ClientSettings, default_settings_path, redact_sensitive};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Browse Area services and compose applets.
#[derive(Parser, Debug)]
#[command(name = "area", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List services, optionally filtered by name or category
    Services {
        #[arg(long)]
        filter: Option<String>,
    },
    /// List the actions (or reactions) a service offers
    Acts {
        service_id: RemoteId,
        #[arg(long)]
        reactions: bool,
    },
    /// Print the config schema of an action (or reaction)
    Schema {
        act_id: RemoteId,
        #[arg(long)]
        reactions: bool,
    },
    /// List your applets
    Applets,
    /// Compose a new applet from a plan file
    Compose {
        #[arg(long, short = 'p')]
        plan: PathBuf,
        /// Print the request instead of sending it
        #[arg(long)]
        dry_run: bool,
    },
    /// Edit an existing applet with a plan file
    Edit {
        applet_id: RemoteId,
        #[arg(long, short = 'p')]
        plan: PathBuf,
        #[arg(long)]
        dry_run: bool,
    },
    /// Show or change client settings
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    Show,
    Set {
        #[arg(long)]
        api_base: Option<String>,
        #[arg(long)]
        session_token: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Services { filter } => {
            let filter = filter.unwrap_or_default();
            for service in connect()?.list_services().await?.iter().filter(|service| service.matches_query(&filter)) {
                println!("{:>5}  {:<28} {}", service.id, service.name, service.category);
            }
        }
        Command::Acts { service_id, reactions } => {
            let kind = act_kind(reactions);
            let acts = connect()?.list_acts(service_id, kind).await?;
            if acts.is_empty() {
                println!("No {kind} available");
            }
            for act in acts {
                println!("{:>5}  {:<28} {}", act.id, act.name, act.description);
            }
        }
        Command::Schema { act_id, reactions } => {
            let schema = connect()?.get_act_schema(act_id, act_kind(reactions)).await?;
            println!("{}", serde_json::to_string_pretty(&schema.config_schema)?);
        }
        Command::Applets => {
            for applet in connect()?.list_my_applets().await? {
                let state = if applet.enable { "enabled" } else { "disabled" };
                println!("{:>5}  {:<32} {state}", applet.id, applet.name);
            }
        }
        Command::Compose { plan, dry_run } => compose(connect()?, &plan, None, dry_run).await?,
        Command::Edit { applet_id, plan, dry_run } => compose(connect()?, &plan, Some(applet_id), dry_run).await?,
        Command::Config { action } => run_config(action, &default_settings_path())?,
    }
    Ok(())
}

/// Build the backend client from the settings file and environment.
fn connect() -> Result<AreaClient> {
    let settings = ClientSettings::load()?;
    Ok(AreaClient::from_settings(&settings)?)
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(log_filter())
        .with_writer(std::io::stderr)
        .try_init();
}

/// `RUST_LOG` directives, or `info` when unset or unparsable.
fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn act_kind(reactions: bool) -> ActKind {
    if reactions { ActKind::Reactions } else { ActKind::Actions }
}

async fn compose(client: AreaClient, plan_path: &Path, applet_id: Option<RemoteId>, dry_run: bool) -> Result<()> {
    let plan = parse_plan_file(plan_path)?;
    let mut session = match applet_id {
        Some(applet_id) => WizardSession::edit(client, applet_id).await?,
        None => WizardSession::new(client),
    };
    apply_plan(&mut session, &plan).await?;

    let request = session
        .composer()
        .draft()
        .build_request()
        .context("plan does not produce a complete applet (it needs an action, a reaction and a title)")?;

    if dry_run {
        print_dry_run(session.gateway(), session.composer().mode(), &request)?;
        return Ok(());
    }

    session.dispatch(WizardEvent::Finish).await?;
    if let Some(receipt) = session.receipt() {
        info!(area_id = ?receipt.area_id, "done");
        println!("{}", serde_json::to_string_pretty(receipt)?);
    }
    Ok(())
}

fn print_dry_run(client: &AreaClient, mode: ComposerMode, request: &AppletCreateRequest) -> Result<()> {
    let (method, path) = match mode {
        ComposerMode::Create => (reqwest::Method::POST, "/users/areas/me".to_string()),
        ComposerMode::Edit { applet_id } => (reqwest::Method::PATCH, format!("/users/areas/{applet_id}")),
    };
    let built = client.request(method, &path).json(request).build()?;

    let mut headers_out = serde_json::Map::new();
    for (name, value) in built.headers() {
        let line = format!("{}: {}", name.as_str(), value.to_str().unwrap_or(""));
        let redacted = redact_sensitive(&line);
        let out_val = redacted.split_once(':').map(|(_, value)| value.trim()).unwrap_or("").to_string();
        headers_out.insert(name.as_str().to_string(), serde_json::Value::String(out_val));
    }
    let out = serde_json::json!({
        "method": built.method().as_str(),
        "url": built.url().as_str(),
        "headers": headers_out,
        "body": request,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn run_config(action: ConfigCommand, path: &Path) -> Result<()> {
    let mut settings = ClientSettings::load_from(path)?;
    match action {
        ConfigCommand::Show => {
            let out = serde_json::json!({
                "path": path.display().to_string(),
                "api_base": settings.resolved_api_base(),
                "session_token": settings.resolved_session_token().map(|_| "[REDACTED]"),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        ConfigCommand::Set { api_base, session_token } => {
            if let Some(api_base) = api_base {
                settings.api_base = Some(api_base);
            }
            if let Some(session_token) = session_token {
                settings.session_token = Some(session_token);
            }
            settings
                .save_to(path)
                .with_context(|| format!("Failed to write settings: {}", path.display()))?;
            info!(path = %path.display(), "settings saved");
        }
    }
    Ok(())
}
