use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use registry_client::app::{AppContext, AppError};
use registry_client::config::{ClientConfig, ConfigError, parse_base_url};
use registry_client::error::ApiError;
use registry_client::net::api::{self, Upload};
use registry_client::net::types::{
    Application, ApplicationStatus, Branch, BranchInput, DocumentType, DocumentTypeInput, Notification,
};
use registry_client::routes::{Resolution, Route};
use registry_client::state::notifications::RefreshOutcome;
use registry_client::state::prefs::{AdminSection, UnknownSection};
use registry_client::state::session::{Identity, SessionError};
use registry_client::storage::StorageError;
use registry_client::util::time_ago::format_age;
use registry_client::views::ViewError;
use registry_client::views::accounts::{self, ProfileEditor, RegistrationForm, UserChanges, UserDirectory};
use registry_client::views::admin_dashboard::{AdminDashboard, StatusChange};
use registry_client::views::application_form::ApplicationForm;
use registry_client::views::catalog::{BranchCatalog, DocumentTypeCatalog};
use registry_client::views::citizen_dashboard::CitizenDashboard;
use registry_client::views::collection::{CollectionDesk, SearchOutcome};
use registry_client::views::stats::StatusCounts;
use registry_client::views::tracking::{StatusTracker, TrackOutcome, status_changed_message};
use registry_client::views::Notice;
use serde::Serialize;
use time::OffsetDateTime;
use tracing::Level;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    App(#[from] AppError),
    #[error("{0}")]
    Session(#[from] SessionError),
    #[error("{0}")]
    View(#[from] ViewError),
    #[error("{0}")]
    Api(#[from] ApiError),
    #[error("{0}")]
    Storage(#[from] StorageError),
    #[error("{0}")]
    Section(#[from] UnknownSection),
    #[error("failed to read {path}: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("invalid JSON output: {0}")]
    Json(#[from] serde_json::Error),
    #[error("not signed in; run `registry login` first")]
    NotSignedIn,
    #[error("{path} is not available to this session")]
    Forbidden { path: String },
    #[error("session is not ready")]
    NotReady,
    #[error("no entry with id {0}")]
    UnknownId(String),
}

#[derive(Parser, Debug)]
#[command(name = "registry", about = "Civil registry client")]
struct Cli {
    #[arg(long, global = true, env = "REGISTRY_API_BASE_URL")]
    api_url: Option<String>,

    #[arg(long, global = true, env = "REGISTRY_STATE_FILE")]
    state_file: Option<PathBuf>,

    /// Print JSON instead of plain lines.
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and persist the session.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "REGISTRY_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Logout,
    Whoami,
    /// Create a citizen account.
    Register(RegisterArgs),
    /// Show where a client route lands for the current session.
    Open { path: String },
    /// Look up an application by reference number.
    Track {
        reference: String,
        /// Keep re-checking and report status changes.
        #[arg(long, default_value_t = false)]
        follow: bool,
        #[arg(long, default_value_t = 30)]
        every: u64,
    },
    /// Citizen dashboard: your applications.
    Mine {
        #[arg(long)]
        status: Option<ApplicationStatus>,
    },
    /// Submit a new application with its supporting document.
    Apply(ApplyCommand),
    /// Admin review of all applications.
    Apps(AppsCommand),
    /// Admin collection desk.
    Collect(CollectCommand),
    Notifications(NotificationsCommand),
    DocTypes(DocTypesCommand),
    Branches(BranchesCommand),
    Users(UsersCommand),
    Profile(ProfileCommand),
    Prefs(PrefsCommand),
}

#[derive(Args, Debug)]
struct RegisterArgs {
    #[arg(long)]
    username: String,
    #[arg(long)]
    full_name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    phone: String,
    #[arg(long)]
    date_of_birth: Option<String>,
    #[arg(long)]
    gender: Option<String>,
    #[arg(long)]
    address: Option<String>,
    #[arg(long, env = "REGISTRY_PASSWORD", hide_env_values = true)]
    password: String,
    /// Defaults to --password.
    #[arg(long)]
    confirm_password: Option<String>,
}

#[derive(Args, Debug)]
struct ApplyCommand {
    #[command(subcommand)]
    command: ApplySubcommand,
}

#[derive(Subcommand, Debug)]
enum ApplySubcommand {
    /// List document types and branches to choose from.
    Options,
    Submit {
        #[arg(long)]
        document_type: String,
        #[arg(long)]
        branch: String,
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        description: Option<String>,
    },
}

#[derive(Args, Debug)]
struct AppsCommand {
    #[command(subcommand)]
    command: AppsSubcommand,
}

#[derive(Subcommand, Debug)]
enum AppsSubcommand {
    List {
        #[arg(long)]
        status: Option<ApplicationStatus>,
    },
    Stats,
    /// Move an application to a new status. `rejected` requires --reason.
    SetStatus {
        id: String,
        status: ApplicationStatus,
        #[arg(long)]
        reason: Option<String>,
    },
    Delete {
        id: String,
    },
}

#[derive(Args, Debug)]
struct CollectCommand {
    #[command(subcommand)]
    command: CollectSubcommand,
}

#[derive(Subcommand, Debug)]
enum CollectSubcommand {
    /// Applications waiting for pickup.
    Ready,
    Search {
        reference: String,
    },
    /// Hand over a document. The applicant's identity must be verified.
    Confirm {
        id: String,
        #[arg(long, default_value_t = false)]
        verified: bool,
    },
}

#[derive(Args, Debug)]
struct NotificationsCommand {
    #[command(subcommand)]
    command: NotificationsSubcommand,
}

#[derive(Subcommand, Debug)]
enum NotificationsSubcommand {
    List,
    Read { id: String },
    ReadAll,
    Delete { id: String },
    /// Poll in the foreground and report the unread count when it changes.
    Watch,
}

#[derive(Args, Debug)]
struct DocTypesCommand {
    #[command(subcommand)]
    command: DocTypesSubcommand,
}

#[derive(Subcommand, Debug)]
enum DocTypesSubcommand {
    List,
    Create {
        #[command(flatten)]
        fields: DocTypeArgs,
    },
    Update {
        id: String,
        #[command(flatten)]
        fields: DocTypeArgs,
    },
    Delete {
        id: String,
    },
}

#[derive(Args, Debug)]
struct BranchesCommand {
    #[command(subcommand)]
    command: BranchesSubcommand,
}

#[derive(Subcommand, Debug)]
enum BranchesSubcommand {
    List,
    Create {
        #[command(flatten)]
        fields: BranchArgs,
    },
    Update {
        id: String,
        #[command(flatten)]
        fields: BranchArgs,
    },
    Delete {
        id: String,
    },
}

#[derive(Args, Debug)]
struct DocTypeArgs {
    #[arg(long)]
    name: String,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long, default_value_t = 0)]
    processing_days: u32,
    #[arg(long, default_value = "0.00")]
    fee: String,
    #[arg(long, default_value = "")]
    requirements: String,
    #[arg(long, default_value_t = false)]
    inactive: bool,
}

impl From<DocTypeArgs> for DocumentTypeInput {
    fn from(args: DocTypeArgs) -> Self {
        Self {
            name: args.name,
            description: args.description,
            processing_days: args.processing_days,
            fee: args.fee,
            requirements: args.requirements,
            is_active: !args.inactive,
        }
    }
}

#[derive(Args, Debug)]
struct BranchArgs {
    #[arg(long)]
    name: String,
    #[arg(long, default_value = "")]
    address: String,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long, default_value_t = false)]
    inactive: bool,
}

impl From<BranchArgs> for BranchInput {
    fn from(args: BranchArgs) -> Self {
        Self { name: args.name, address: args.address, phone: args.phone, email: args.email, is_active: !args.inactive }
    }
}

#[derive(Args, Debug)]
struct UsersCommand {
    #[command(subcommand)]
    command: UsersSubcommand,
}

#[derive(Subcommand, Debug)]
enum UsersSubcommand {
    List,
    Update {
        id: String,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        full_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        admin: Option<bool>,
    },
    Delete {
        id: String,
    },
}

#[derive(Args, Debug)]
struct ProfileCommand {
    #[command(subcommand)]
    command: ProfileSubcommand,
}

#[derive(Subcommand, Debug)]
enum ProfileSubcommand {
    Show,
    Update {
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        full_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        confirm_password: Option<String>,
    },
}

#[derive(Args, Debug)]
struct PrefsCommand {
    #[command(subcommand)]
    command: PrefsSubcommand,
}

#[derive(Subcommand, Debug)]
enum PrefsSubcommand {
    DarkMode { setting: Option<Switch> },
    /// Show or store the admin menu section; `menu` clears it.
    Section { section: Option<String> },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Switch {
    On,
    Off,
    Toggle,
}

// =============================================================================
// ENTRY
// =============================================================================

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt().with_writer(std::io::stderr).with_max_level(level).init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(url) = cli.api_url.as_deref() {
        config.api_base_url = parse_base_url(url)?;
    }
    if let Some(path) = cli.state_file {
        config.state_file = path;
    }

    let mut ctx = AppContext::open(config)?;
    let out = Output { json: cli.json };
    let result = dispatch(&mut ctx, out, cli.command).await;
    ctx.shutdown().await;
    result
}

async fn dispatch(ctx: &mut AppContext, out: Output, command: Command) -> Result<(), CliError> {
    match command {
        Command::Login { email, password } => {
            let identity = ctx.session().login(ctx.api(), &email, &password).await?;
            let home = Route::home_for(identity.role).path();
            ctx.navigator().navigate(&home);
            out.line(&format!("signed in as {} ({}); home {home}", identity.email, identity.role));
            Ok(())
        }
        Command::Logout => {
            ctx.session().logout();
            out.line("signed out");
            Ok(())
        }
        Command::Whoami => {
            let identity = signed_in(ctx)?;
            out.value(&identity, || println!("{} ({})", identity.email, identity.role))
        }
        Command::Register(args) => run_register(ctx, out, args).await,
        Command::Open { path } => match ctx.open_route(&path) {
            Resolution::Render(route) => {
                out.line(&route.path());
                Ok(())
            }
            Resolution::Redirect(path) => Err(CliError::Forbidden { path }),
            Resolution::Pending => Err(CliError::NotReady),
        },
        Command::Track { reference, follow, every } => run_track(ctx, out, &reference, follow, every).await,
        Command::Mine { status } => run_mine(ctx, out, status).await,
        Command::Apply(apply) => run_apply(ctx, out, apply.command).await,
        Command::Apps(apps) => run_apps(ctx, out, apps.command).await,
        Command::Collect(collect) => run_collect(ctx, out, collect.command).await,
        Command::Notifications(n) => run_notifications(ctx, out, n.command).await,
        Command::DocTypes(d) => {
            require_route(ctx, "/admin/dashboard")?;
            let mut catalog = DocumentTypeCatalog::new(ctx.api().clone());
            match d.command {
                DocTypesSubcommand::List => {
                    catalog.load().await?;
                    out.value(&catalog.items(), || {
                        for t in catalog.items() {
                            println!("{}  {}  {} days  {}  active={}", t.id, t.name, t.processing_days, t.fee, t.is_active);
                        }
                    })
                }
                DocTypesSubcommand::Create { fields } => {
                    let saved = catalog.save(None, &fields.into()).await?;
                    out.line(&format!("created document type {}", saved.id));
                    Ok(())
                }
                DocTypesSubcommand::Update { id, fields } => {
                    catalog.save(Some(&id), &fields.into()).await?;
                    out.line(&format!("updated document type {id}"));
                    Ok(())
                }
                DocTypesSubcommand::Delete { id } => {
                    catalog.delete(&id).await?;
                    out.line(&format!("deleted document type {id}"));
                    Ok(())
                }
            }
        }
        Command::Branches(b) => {
            require_route(ctx, "/admin/dashboard")?;
            let mut catalog = BranchCatalog::new(ctx.api().clone());
            match b.command {
                BranchesSubcommand::List => {
                    catalog.load().await?;
                    out.value(&catalog.items(), || {
                        for b in catalog.items() {
                            println!("{}  {}  {}  active={}", b.id, b.name, b.address, b.is_active);
                        }
                    })
                }
                BranchesSubcommand::Create { fields } => {
                    let saved = catalog.save(None, &fields.into()).await?;
                    out.line(&format!("created branch {}", saved.id));
                    Ok(())
                }
                BranchesSubcommand::Update { id, fields } => {
                    catalog.save(Some(&id), &fields.into()).await?;
                    out.line(&format!("updated branch {id}"));
                    Ok(())
                }
                BranchesSubcommand::Delete { id } => {
                    catalog.delete(&id).await?;
                    out.line(&format!("deleted branch {id}"));
                    Ok(())
                }
            }
        }
        Command::Users(users) => run_users(ctx, out, users.command).await,
        Command::Profile(profile) => run_profile(ctx, out, profile.command).await,
        Command::Prefs(prefs) => run_prefs(ctx, out, prefs.command),
    }
}

// =============================================================================
// GUARDS
// =============================================================================

fn signed_in(ctx: &AppContext) -> Result<Identity, CliError> {
    ctx.session().identity().ok_or(CliError::NotSignedIn)
}

/// Run the route guard for `path` and fail unless it renders as asked.
fn require_route(ctx: &AppContext, path: &str) -> Result<(), CliError> {
    let wanted = Route::parse(path);
    match ctx.open_route(path) {
        Resolution::Render(route) if route == wanted => Ok(()),
        Resolution::Pending => Err(CliError::NotReady),
        _ if ctx.session().identity().is_none() => Err(CliError::NotSignedIn),
        _ => Err(CliError::Forbidden { path: path.to_owned() }),
    }
}

// =============================================================================
// COMMANDS
// =============================================================================

async fn run_register(ctx: &AppContext, out: Output, args: RegisterArgs) -> Result<(), CliError> {
    let form = RegistrationForm {
        username: args.username,
        full_name: args.full_name,
        email: args.email,
        date_of_birth: args.date_of_birth.unwrap_or_default(),
        gender: args.gender.unwrap_or_default(),
        phone_number: args.phone,
        address: args.address.unwrap_or_default(),
        confirm_password: args.confirm_password.unwrap_or_else(|| args.password.clone()),
        password: args.password,
    };
    let mut notice = Notice::default();
    accounts::register(ctx.api(), &form, &mut notice).await?;
    ctx.navigator().navigate(&Route::Login.path());
    out.notice(&notice);
    Ok(())
}

async fn run_track(ctx: &AppContext, out: Output, reference: &str, follow: bool, every: u64) -> Result<(), CliError> {
    require_route(ctx, &Route::StatusReference(reference.to_owned()).path())?;
    let mut tracker = StatusTracker::new(ctx.api().clone());
    let mut ticker = tokio::time::interval(Duration::from_secs(every.max(1)));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => return Ok(()),
            _ = ticker.tick() => {}
        }
        match tracker.track(reference).await? {
            TrackOutcome::Found { application, changed_from } => {
                if let Some(previous) = changed_from {
                    tracing::info!(from = %previous, to = %application.status, "tracked status changed");
                    out.line(&status_changed_message(application.status));
                } else {
                    out.value(&application, || {
                        println!(
                            "{}  {}  {}",
                            application.reference_number.as_deref().unwrap_or(reference),
                            application.status.label(),
                            application.branch.as_ref().map_or("-", |b| b.name.as_str()),
                        );
                        if let Some(reason) = application.rejection_reason.as_deref().filter(|r| !r.is_empty()) {
                            println!("rejection reason: {reason}");
                        }
                    })?;
                }
            }
            TrackOutcome::NotFound => {
                out.notice(&tracker.notice);
                if !follow {
                    return Err(CliError::UnknownId(reference.to_owned()));
                }
            }
        }
        if !follow {
            return Ok(());
        }
    }
}

async fn run_mine(ctx: &AppContext, out: Output, status: Option<ApplicationStatus>) -> Result<(), CliError> {
    require_route(ctx, "/citizen/dashboard")?;
    let mut view = CitizenDashboard::new(ctx.api().clone());
    view.load().await?;
    view.set_filter(status);
    let visible = view.visible();
    out.value(&visible, || {
        print_applications(&visible);
        print_stats(view.stats());
    })
}

async fn run_apply(ctx: &AppContext, out: Output, command: ApplySubcommand) -> Result<(), CliError> {
    require_route(ctx, "/apply")?;
    let mut form = ApplicationForm::new(ctx.api().clone());
    form.load_options().await?;
    match command {
        ApplySubcommand::Options => {
            #[derive(Serialize)]
            struct Options<'a> {
                document_types: &'a [DocumentType],
                branches: &'a [Branch],
            }
            let options = Options { document_types: form.document_types(), branches: form.branches() };
            out.value(&options, || {
                println!("document types:");
                for t in form.document_types() {
                    println!("  {}  {}  fee {}  {} days", t.id, t.name, t.fee, t.processing_days);
                }
                println!("branches:");
                for b in form.branches() {
                    println!("  {}  {}  {}", b.id, b.name, b.address);
                }
            })
        }
        ApplySubcommand::Submit { document_type, branch, file, description } => {
            form.select_document_type(Some(&document_type));
            form.select_branch(Some(&branch));
            if let Some(requirement) = form.requirement() {
                tracing::info!(title = requirement.title, "upload requirement");
            }
            form.attach(read_upload(&file)?)?;
            if let Some(description) = description.as_deref() {
                form.set_description(description);
            }
            let application = form.submit().await?;
            out.notice(&form.notice);
            out.value(&application, || print_applications(&[&application]))
        }
    }
}

async fn run_apps(ctx: &AppContext, out: Output, command: AppsSubcommand) -> Result<(), CliError> {
    require_route(ctx, "/admin/dashboard")?;
    let mut view = AdminDashboard::new(ctx.api().clone(), ctx.prefs().clone());
    match command {
        AppsSubcommand::List { status } => {
            view.load().await?;
            view.set_filter(status);
            let visible = view.visible();
            out.value(&visible, || print_applications(&visible))
        }
        AppsSubcommand::Stats => {
            view.load().await?;
            out.value(&view.stats().rows(), || print_stats(view.stats()))
        }
        AppsSubcommand::SetStatus { id, status, reason } => {
            if view.select_status(&id, status).await? == StatusChange::ReasonRequired {
                view.set_rejection_reason(reason.as_deref().unwrap_or_default());
                view.confirm_rejection().await?;
            }
            out.notice(&view.notice);
            out.line(&format!("{id} -> {status}"));
            Ok(())
        }
        AppsSubcommand::Delete { id } => {
            api::delete_application(ctx.api(), &id).await?;
            out.line(&format!("deleted application {id}"));
            Ok(())
        }
    }
}

async fn run_collect(ctx: &AppContext, out: Output, command: CollectSubcommand) -> Result<(), CliError> {
    require_route(ctx, "/admin/collection")?;
    let mut desk = CollectionDesk::new(ctx.api().clone());
    match command {
        CollectSubcommand::Ready => {
            desk.load_ready().await?;
            let ready: Vec<&Application> = desk.ready().iter().collect();
            out.value(&ready, || print_applications(&ready))
        }
        CollectSubcommand::Search { reference } => {
            let outcome = desk.search(&reference).await?;
            out.notice(&desk.notice);
            match outcome {
                SearchOutcome::Ready(app) | SearchOutcome::AlreadyCollected(app) | SearchOutcome::NotReady(app) => {
                    out.value(&app, || print_applications(&[&app]))
                }
                SearchOutcome::NotFound => Err(CliError::UnknownId(reference)),
            }
        }
        CollectSubcommand::Confirm { id, verified } => {
            desk.begin_collection(&id);
            desk.set_identity_verified(verified);
            desk.confirm_collection().await?;
            out.notice(&desk.notice);
            Ok(())
        }
    }
}

async fn run_notifications(ctx: &mut AppContext, out: Output, command: NotificationsSubcommand) -> Result<(), CliError> {
    signed_in(ctx)?;
    let store = ctx.notifications().clone();
    match command {
        NotificationsSubcommand::List => {
            if store.refresh().await? == RefreshOutcome::Cleared {
                return Err(CliError::NotSignedIn);
            }
            let snapshot = store.snapshot();
            out.value(&snapshot.items, || {
                let now = OffsetDateTime::now_utc();
                for n in &snapshot.items {
                    print_notification(n, now);
                }
                println!("{} unread", snapshot.unread);
            })
        }
        NotificationsSubcommand::Read { id } => {
            store.refresh().await?;
            store.mark_as_read(&id).await?;
            out.line(&format!("{} unread", store.unread_count()));
            Ok(())
        }
        NotificationsSubcommand::ReadAll => {
            store.refresh().await?;
            let summary = store.mark_all_as_read().await;
            for id in &summary.failed {
                tracing::warn!(id = %id, "notification not marked read");
            }
            out.line(&format!(
                "marked {} read, {} failed, {} unread",
                summary.succeeded.len(),
                summary.failed.len(),
                store.unread_count()
            ));
            Ok(())
        }
        NotificationsSubcommand::Delete { id } => {
            store.refresh().await?;
            store.delete_notification(&id).await?;
            out.line(&format!("{} unread", store.unread_count()));
            Ok(())
        }
        NotificationsSubcommand::Watch => {
            ctx.start_polling();
            let mut last = None;
            let mut ticker = tokio::time::interval(Duration::from_secs(1));
            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => return Ok(()),
                    _ = ticker.tick() => {
                        let snapshot = store.snapshot();
                        if !snapshot.loading && last != Some(snapshot.unread) {
                            out.line(&format!("{} unread", snapshot.unread));
                            last = Some(snapshot.unread);
                        }
                        if ctx.session().identity().is_none() {
                            return Err(CliError::NotSignedIn);
                        }
                    }
                }
            }
        }
    }
}

async fn run_users(ctx: &AppContext, out: Output, command: UsersSubcommand) -> Result<(), CliError> {
    require_route(ctx, "/admin/dashboard")?;
    let mut directory = UserDirectory::new(ctx.api().clone());
    match command {
        UsersSubcommand::List => {
            directory.load().await?;
            out.value(&directory.users(), || {
                for u in directory.users() {
                    let role = if u.is_admin { "admin" } else { "citizen" };
                    println!("{}  {}  {}  {role}", u.id, u.display_name(), u.email);
                }
            })
        }
        UsersSubcommand::Update { id, username, full_name, email, phone, admin } => {
            directory.load().await?;
            let user = directory.users().iter().find(|u| u.id == id).ok_or_else(|| CliError::UnknownId(id.clone()))?;
            let mut changes = UserChanges::from_user(user);
            overwrite(&mut changes.username, username);
            overwrite(&mut changes.full_name, full_name);
            overwrite(&mut changes.email, email);
            overwrite(&mut changes.phone_number, phone);
            if let Some(admin) = admin {
                changes.is_admin = admin;
            }
            directory.update(&id, &changes).await?;
            out.line(&format!("updated user {id}"));
            Ok(())
        }
        UsersSubcommand::Delete { id } => {
            directory.delete(&id).await?;
            out.line(&format!("deleted user {id}"));
            Ok(())
        }
    }
}

async fn run_profile(ctx: &AppContext, out: Output, command: ProfileSubcommand) -> Result<(), CliError> {
    signed_in(ctx)?;
    let mut editor = ProfileEditor::new(ctx.api().clone());
    editor.load().await?;
    match command {
        ProfileSubcommand::Show => {
            let form = editor.form.clone();
            out.value(&editor.user(), || {
                println!("username: {}", form.username);
                println!("name:     {}", form.full_name);
                println!("email:    {}", form.email);
                println!("phone:    {}", form.phone_number);
            })
        }
        ProfileSubcommand::Update { username, full_name, email, phone, password, confirm_password } => {
            overwrite(&mut editor.form.username, username);
            overwrite(&mut editor.form.full_name, full_name);
            overwrite(&mut editor.form.email, email);
            overwrite(&mut editor.form.phone_number, phone);
            if let Some(password) = password {
                editor.form.confirm_password = confirm_password.unwrap_or_else(|| password.clone());
                editor.form.password = password;
            }
            editor.save().await?;
            out.notice(&editor.notice);
            Ok(())
        }
    }
}

fn run_prefs(ctx: &AppContext, out: Output, command: PrefsSubcommand) -> Result<(), CliError> {
    let prefs = ctx.prefs();
    match command {
        PrefsSubcommand::DarkMode { setting } => {
            let enabled = match setting {
                None => prefs.dark_mode(),
                Some(Switch::On) => {
                    prefs.set_dark_mode(true)?;
                    true
                }
                Some(Switch::Off) => {
                    prefs.set_dark_mode(false)?;
                    false
                }
                Some(Switch::Toggle) => prefs.toggle_dark_mode()?,
            };
            out.line(&format!("dark mode {}", if enabled { "on" } else { "off" }));
            Ok(())
        }
        PrefsSubcommand::Section { section: None } => {
            out.line(prefs.admin_section().map_or("menu", AdminSection::as_str));
            Ok(())
        }
        PrefsSubcommand::Section { section: Some(raw) } => {
            let section = if raw.eq_ignore_ascii_case("menu") {
                None
            } else {
                Some(raw.parse::<AdminSection>()?)
            };
            prefs.set_admin_section(section)?;
            out.line(section.map_or("menu", AdminSection::as_str));
            Ok(())
        }
    }
}

// =============================================================================
// OUTPUT
// =============================================================================

#[derive(Clone, Copy, Debug)]
struct Output {
    json: bool,
}

impl Output {
    fn value<T: Serialize + ?Sized>(self, value: &T, plain: impl FnOnce()) -> Result<(), CliError> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            plain();
        }
        Ok(())
    }

    fn line(self, text: &str) {
        if self.json {
            println!("{}", serde_json::json!({ "message": text }));
        } else {
            println!("{text}");
        }
    }

    fn notice(self, notice: &Notice) {
        if let Some(message) = notice.error.as_deref().or(notice.success.as_deref()) {
            self.line(message);
        }
    }
}

fn print_applications(applications: &[&Application]) {
    if applications.is_empty() {
        println!("no applications");
        return;
    }
    for app in applications {
        println!(
            "{}  {}  {}  {}  {}",
            app.id,
            app.reference_number.as_deref().unwrap_or("-"),
            app.status.label(),
            app.document_type_name.as_deref().unwrap_or("-"),
            app.applicant_name.as_deref().unwrap_or("-"),
        );
    }
}

fn print_stats(stats: &StatusCounts) {
    println!("total: {}", stats.total);
    for (status, count) in stats.rows() {
        println!("  {:<22}{count}", status.label());
    }
}

fn print_notification(n: &Notification, now: OffsetDateTime) {
    let mark = if n.is_read { ' ' } else { '*' };
    println!("{mark} {}  {}: {}  ({})", n.id, n.title, n.message, format_age(n.created_at, now));
}

fn overwrite(field: &mut String, value: Option<String>) {
    if let Some(value) = value {
        *field = value;
    }
}

fn read_upload(path: &Path) -> Result<Upload, CliError> {
    let content = std::fs::read(path).map_err(|source| CliError::ReadFile { path: path.to_path_buf(), source })?;
    let file_name = path.file_name().map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
    Ok(Upload { mime: mime_for(&file_name).map(str::to_owned), file_name, content })
}

fn mime_for(file_name: &str) -> Option<&'static str> {
    let ext = Path::new(file_name).extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "pdf" => Some("application/pdf"),
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        _ => None,
    }
}
