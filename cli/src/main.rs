use std::io::{self, Read};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use humanize::config::{ClientConfig, ConfigError, normalize_api_url};
use humanize::guard::{ACCESS_DENIED_MESSAGE, AdminGuard, GuardDecision, Route, RouteGuard};
use humanize::net::ApiError;
use humanize::net::api::{DEFAULT_ACTIVITY_LIMIT, DEFAULT_STATS_DAYS};
use humanize::net::types::{
    BillingCycle, ChangePasswordData, HumanizeRequest, LoginData, RegisterData, SubscriptionStatus,
    UpdateSubscription, UserInfo,
};
use humanize::state::AppState;
use humanize::state::session::SessionError;
use humanize::usage::{QuotaExceeded, check_quota, usage_percent};
use serde::Serialize;
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Quota(#[from] QuotaExceeded),
    #[error("not logged in; run `humanize-cli login` first")]
    NotLoggedIn,
    #[error("{}", ACCESS_DENIED_MESSAGE)]
    AccessDenied,
    #[error("no text to humanize")]
    EmptyInput,
    #[error("failed to read input: {0}")]
    Input(#[from] io::Error),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "humanize-cli", about = "HumanizeAI account and dashboard CLI")]
struct Cli {
    #[arg(long, env = "HUMANIZE_API_URL")]
    api_url: Option<String>,

    #[arg(long, env = "HUMANIZE_TOKEN_FILE")]
    token_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "HUMANIZE_PASSWORD")]
        password: String,
    },
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "HUMANIZE_PASSWORD")]
        password: String,
    },
    Logout,
    /// Show the cached profile, fetching when stale.
    Whoami {
        #[arg(long, default_value_t = false)]
        force: bool,
    },
    ChangePassword {
        #[arg(long)]
        current: String,
        #[arg(long)]
        new: String,
    },
    Humanize(HumanizeArgs),
    Activities {
        #[arg(long, default_value_t = DEFAULT_ACTIVITY_LIMIT)]
        limit: u32,
    },
    ApiCalls {
        #[arg(long, default_value_t = DEFAULT_ACTIVITY_LIMIT)]
        limit: u32,
    },
    ApiCallStats {
        #[arg(long, default_value_t = DEFAULT_STATS_DAYS)]
        days: u32,
    },
    ResetUsage,
    Admin(AdminCommand),
}

#[derive(Args, Debug)]
struct HumanizeArgs {
    #[arg(long, default_value = "-", help = "Input file path, or - for stdin")]
    input: String,

    #[arg(long)]
    description: Option<String>,
}

#[derive(Args, Debug)]
struct AdminCommand {
    #[command(subcommand)]
    command: AdminSubcommand,
}

#[derive(Subcommand, Debug)]
enum AdminSubcommand {
    Users,
    User {
        user_id: String,
    },
    Activities {
        user_id: String,
        #[arg(long, default_value_t = DEFAULT_ACTIVITY_LIMIT)]
        limit: u32,
    },
    UpdateSubscription(UpdateSubscriptionArgs),
    ResetUsage {
        user_id: String,
    },
    CheckExpired,
}

#[derive(Args, Debug)]
struct UpdateSubscriptionArgs {
    user_id: String,

    #[arg(long)]
    membership: String,

    #[arg(long, value_parser = parse_billing_cycle)]
    cycle: Option<BillingCycle>,

    #[arg(long)]
    word_limit: Option<u64>,

    #[arg(long, value_parser = parse_subscription_status)]
    status: Option<SubscriptionStatus>,

    #[arg(long)]
    reset_usage: Option<bool>,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = ClientConfig::from_env()?;
    if let Some(api_url) = cli.api_url {
        config.api_url = normalize_api_url(&api_url);
    }
    if let Some(token_file) = cli.token_file {
        config.token_file = token_file;
    }
    let state = AppState::from_config(config)?;

    match cli.command {
        Command::Register { name, email, password } => {
            let data = RegisterData { full_name: name, email, password };
            let response = state.session.register(&data).await?;
            print_json(&response)
        }
        Command::Login { email, password } => {
            let response = state.session.login(&LoginData { email, password }).await?;
            print_json(&json!({ "message": response.message }))
        }
        Command::Logout => {
            let next = state.session.logout();
            print_json(&json!({ "message": "Logged out", "next": next.path() }))
        }
        Command::Whoami { force } => run_whoami(&state, force).await,
        Command::ChangePassword { current, new } => {
            require_session(&state).await?;
            let data = ChangePasswordData { current_password: current, new_password: new };
            let response = state.session.change_password(&data).await?;
            print_json(&response)
        }
        Command::Humanize(args) => run_humanize(&state, args).await,
        Command::Activities { limit } => {
            require_session(&state).await?;
            print_json(&state.api.recent_activities(limit).await?)
        }
        Command::ApiCalls { limit } => {
            require_session(&state).await?;
            print_json(&state.api.recent_api_calls(limit).await?)
        }
        Command::ApiCallStats { days } => {
            require_session(&state).await?;
            print_json(&state.api.api_call_stats(days).await?)
        }
        Command::ResetUsage => {
            require_session(&state).await?;
            let response = state.api.reset_usage().await?;
            state.session.refresh(true).await?;
            print_json(&response)
        }
        Command::Admin(admin) => run_admin(&state, admin).await,
    }
}

async fn run_whoami(state: &AppState, force: bool) -> Result<(), CliError> {
    require_session(state).await?;
    let Some(user) = state.session.refresh(force).await? else {
        return Err(CliError::NotLoggedIn);
    };
    print_json(&profile_view(&user))
}

async fn run_humanize(state: &AppState, args: HumanizeArgs) -> Result<(), CliError> {
    let text = read_input(&args.input)?;
    if text.trim().is_empty() {
        return Err(CliError::EmptyInput);
    }

    require_session(state).await?;
    if let Some(user) = state.session.refresh(false).await? {
        let words = check_quota(&text, &user)?;
        tracing::debug!(words, remaining = user.words_remaining(), "quota check passed");
    }

    let request = HumanizeRequest { text, description: args.description };
    let response = state.api.humanize(&request).await?;

    // Usage counters changed server-side.
    if let Err(e) = state.session.refresh(true).await {
        tracing::warn!(error = %e, "profile refresh after humanize failed");
    }
    print_json(&response)
}

async fn run_admin(state: &AppState, admin: AdminCommand) -> Result<(), CliError> {
    require_admin(state).await?;
    let api = &state.api;

    match admin.command {
        AdminSubcommand::Users => print_json(&api.admin_users().await?),
        AdminSubcommand::User { user_id } => print_json(&api.admin_user(&user_id).await?),
        AdminSubcommand::Activities { user_id, limit } => {
            print_json(&api.admin_user_activities(&user_id, limit).await?)
        }
        AdminSubcommand::UpdateSubscription(args) => {
            let update = UpdateSubscription {
                user_id: args.user_id,
                membership: args.membership,
                membership_type: args.cycle,
                word_limit: args.word_limit,
                status: args.status,
                reset_usage: args.reset_usage,
            };
            print_json(&api.update_subscription(&update).await?)
        }
        AdminSubcommand::ResetUsage { user_id } => print_json(&api.admin_reset_usage(&user_id).await?),
        AdminSubcommand::CheckExpired => print_json(&api.check_expired_memberships().await?),
    }
}

/// Resolve the stored session and fail when nobody is logged in.
async fn require_session(state: &AppState) -> Result<(), CliError> {
    let snapshot = state.session.start().await?;
    if !snapshot.is_authenticated {
        return Err(CliError::NotLoggedIn);
    }
    Ok(())
}

/// Evaluate the admin guard against the resolved session before any admin call.
async fn require_admin(state: &AppState) -> Result<(), CliError> {
    let snapshot = state.session.start().await?;
    match AdminGuard.evaluate(&snapshot) {
        GuardDecision::Render => Ok(()),
        GuardDecision::Redirect(Route::Login) | GuardDecision::Loading => Err(CliError::NotLoggedIn),
        GuardDecision::Redirect(_) | GuardDecision::AccessDenied => Err(CliError::AccessDenied),
    }
}

fn profile_view(user: &UserInfo) -> serde_json::Value {
    json!({
        "name": user.name,
        "email": user.email,
        "membership": user.membership,
        "membership_type": user.membership_type,
        "word_limit": user.word_limit,
        "words_used": user.words_used,
        "words_remaining": user.words_remaining(),
        "usage_percent": usage_percent(user.words_used, user.word_limit),
        "total_words_humanized": user.total_words_humanized,
        "is_admin": user.is_admin,
        "expiration_date": user.expiration_date,
        "days_remaining": user.days_remaining,
    })
}

fn read_input(input: &str) -> Result<String, CliError> {
    if input == "-" {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }
    Ok(std::fs::read_to_string(input)?)
}

fn parse_billing_cycle(raw: &str) -> Result<BillingCycle, String> {
    serde_json::from_value(json!(raw)).map_err(|_| format!("unknown cycle '{raw}' (expected monthly or yearly)"))
}

fn parse_subscription_status(raw: &str) -> Result<SubscriptionStatus, String> {
    serde_json::from_value(json!(raw))
        .map_err(|_| format!("unknown status '{raw}' (expected active, canceled, expired, or trial)"))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
