use clap::{Parser, Subcommand};
use hrm_console::{
    ApiError, ClientConfig, ClientState, Env, FileClientStorage, ListQuery, Navigation,
    notice::TracingNotifier,
    notifications::DEFAULT_LIST_LIMIT,
    resources::Employees,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// hrm-console - terminal front end for the HR management API
#[derive(Parser, Debug)]
#[command(name = "hrm-console")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    // === Session ===
    /// Sign in and store the issued token
    Login {
        email: String,

        /// Password (falls back to HRM_PASSWORD)
        #[arg(long, env = "HRM_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget the stored token
    Logout,

    /// Show who is signed in
    Whoami,

    // === Navigation ===
    /// List the pages available to the signed-in user
    Menu,

    /// Navigate to a path and report what the guard decided
    Open { path: String },

    // === Pages ===
    /// Search the employee list
    Employees {
        /// Free-text search on name or email
        #[arg(short, long, default_value = "")]
        search: String,

        #[arg(long)]
        department: Option<String>,

        #[arg(long)]
        position: Option<String>,

        #[arg(long)]
        status: Option<String>,

        #[arg(short = 'n', long)]
        limit: Option<u32>,
    },

    /// Show an employee's full profile
    Employee { id: i64 },

    /// Show notifications
    Notifications {
        /// Include notifications already read
        #[arg(long)]
        all: bool,

        /// Mark everything as read afterwards
        #[arg(long)]
        mark_read: bool,
    },

    /// Show or toggle the display theme
    Theme {
        #[arg(long)]
        toggle: bool,
    },
}

/// main
///
/// Loads the configuration, sets up logging, assembles the client state and runs one command.
#[tokio::main]
async fn main() {
    // 1. Configuration (fail-fast)
    dotenv::dotenv().ok();
    let config = ClientConfig::load();

    // 2. Logging: pretty locally, JSON when deployed.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "hrm_console=info,reqwest=warn".into());

    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
    }

    let cli = Cli::parse();

    // 3. State assembly
    let storage = Arc::new(FileClientStorage::new(config.storage_path.clone()));
    let state = match ClientState::build(config, storage, Arc::new(TracingNotifier)) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("could not start: {}", e);
            std::process::exit(2);
        }
    };
    let follower = state.spawn_background();

    let result = run(cli.command, &state).await;
    follower.abort();

    if let Err(e) = result {
        eprintln!("error: {}", e.user_message(&e.to_string()));
        std::process::exit(1);
    }
}

async fn run(command: Commands, state: &ClientState) -> Result<(), ApiError> {
    match command {
        Commands::Login { email, password } => {
            let navigation = state.shell.login(&email, &password).await?;
            if let Some(user) = state.auth.current_user() {
                println!("signed in as {} ({})", user.email, user.role);
            }
            print_navigation(&navigation);
        }
        Commands::Logout => {
            state.shell.logout();
            println!("signed out");
        }
        Commands::Whoami => match state.auth.current_user() {
            Some(user) => {
                println!("{} ({})", user.email, user.role);
                if let Some(employee_id) = user.employee_id {
                    println!("employee #{employee_id}");
                }
            }
            None => println!("not signed in"),
        },
        Commands::Menu => {
            let menu = state.shell.menu();
            if menu.is_empty() {
                println!("not signed in");
            }
            for item in menu {
                println!("{:<24} {}", item.label, item.path);
            }
        }
        Commands::Open { path } => print_navigation(&state.shell.navigate(&path)),
        Commands::Employees {
            search,
            department,
            position,
            status,
            limit,
        } => {
            if !opened(state, "/employees") {
                return Ok(());
            }
            let mut query = limit.map(ListQuery::with_limit).unwrap_or_default();
            query.search = search;
            query.set_filter("department_id", department.as_deref().unwrap_or_default());
            query.set_filter("position_id", position.as_deref().unwrap_or_default());
            query.set_filter("status", status.as_deref().unwrap_or_default());

            let controller = state.controller::<Employees>().with_query(query);
            controller.mount().await;
            // Load failures have already been reported through the notifier.
            for employee in controller.state().items {
                println!(
                    "{:>6}  {:<28} {:<32} {}",
                    employee.id, employee.full_name, employee.email, employee.status
                );
            }
        }
        Commands::Employee { id } => {
            if !opened(state, &format!("/employees/{id}")) {
                return Ok(());
            }
            let controller = state.controller::<Employees>();
            controller.select(id).await;
            match controller.state().detail {
                Some(profile) => {
                    let json = serde_json::to_string_pretty(&profile)
                        .map_err(|e| ApiError::Decode(e.to_string()))?;
                    println!("{json}");
                }
                None => println!("no profile loaded"),
            }
        }
        Commands::Notifications { all, mark_read } => {
            let unread = state.notifications.unread_count().await?;
            println!("{unread} unread");
            for n in state.notifications.list(DEFAULT_LIST_LIMIT, all).await? {
                let marker = if n.is_read { ' ' } else { '*' };
                println!("{marker} [{}] {} {}", n.created_at, n.notification_type, n.message);
            }
            if mark_read {
                state.notifications.mark_all_read().await?;
            }
        }
        Commands::Theme { toggle } => {
            let theme = if toggle {
                state.shell.toggle_theme()
            } else {
                state.shell.theme()
            };
            println!("{theme:?}");
        }
    }
    Ok(())
}

/// Navigates to `path` and reports a refusal. Returns whether the page may render.
fn opened(state: &ClientState, path: &str) -> bool {
    match state.shell.navigate(path) {
        Navigation::Render { .. } => true,
        other => {
            print_navigation(&other);
            false
        }
    }
}

fn print_navigation(navigation: &Navigation) {
    match navigation {
        Navigation::Render { page, params } => match params.id() {
            Some(id) => println!("-> {page:?} #{id}"),
            None => println!("-> {page:?}"),
        },
        Navigation::Redirect { to, from: Some(from) } => {
            println!("redirected to {to} (sign in to continue to {from})")
        }
        Navigation::Redirect { to, from: None } => println!("redirected to {to}"),
        Navigation::NotFound { path } => println!("no page at {path}"),
    }
}
