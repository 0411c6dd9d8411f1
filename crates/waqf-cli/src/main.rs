mod commands;
mod context;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "waqf")]
#[command(about = "Waqf administration toolkit: roles, permissions, cache keys and reports")]
#[command(version)]
struct Cli {
    /// Path to the config directory (default: ~/.waqf)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    /// User (id or email) performing role changes. Must hold `users.manage`.
    /// Without it, changes are recorded as made by the local operator.
    #[arg(long, global = true, env = "WAQF_ACTOR")]
    actor: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the default config and create the role database
    Init,

    /// Show current configuration
    Config,

    /// List roles and the permissions they grant
    Roles,

    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Assign or revoke roles
    Role {
        #[command(subcommand)]
        action: RoleAction,
    },

    /// Check a user's permissions
    Check {
        /// User id or email
        user: String,
        /// Permission keys, e.g. `journal.create`
        #[arg(required = true)]
        permissions: Vec<String>,
        /// Require every key instead of any one
        #[arg(long)]
        all: bool,
    },

    /// Print the cache key for a query
    Key {
        /// Collection, e.g. `beneficiaries`
        root: String,
        /// Record id
        #[arg(long)]
        id: Option<String>,
        /// Filters as a JSON object
        #[arg(long)]
        filters: Option<String>,
    },

    /// Print the cache prefixes a mutation invalidates
    Invalidate {
        /// Collection, e.g. `journal_entries`
        entity: String,
        /// create, update, delete or approve
        action: String,
    },

    /// Export rows from a JSON file as PDF, XLSX or CSV
    Export {
        /// JSON array of row objects
        rows: PathBuf,
        /// Columns as `key:label,key:label`
        #[arg(long)]
        columns: String,
        /// pdf, xlsx or csv (default: from the output extension)
        #[arg(long)]
        format: Option<String>,
        /// Output file
        #[arg(long)]
        out: PathBuf,
        /// Report title (default: from config)
        #[arg(long)]
        title: Option<String>,
    },

    /// Show the role-change audit log
    Audit {
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Register a user
    Add {
        email: String,
        #[arg(long)]
        name: Option<String>,
    },
    /// List users with their roles
    List,
}

#[derive(Subcommand)]
enum RoleAction {
    /// Give a user a role
    Assign { user: String, role: String },
    /// Take a role away from a user
    Revoke { user: String, role: String },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("waqf=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let base_dir = match cli.config_dir {
        Some(ref dir) => dir.clone(),
        None => waqf_core::config::WaqfConfig::default_base_dir()?,
    };

    let rt = tokio::runtime::Runtime::new()?;

    match cli.command {
        Commands::Init => rt.block_on(commands::init::run(&base_dir)),
        Commands::Config => commands::config::run(&base_dir),
        Commands::Roles => commands::roles::run(),
        Commands::User { ref action } => match action {
            UserAction::Add { email, name } => rt.block_on(commands::user::add(
                &base_dir,
                email,
                name.as_deref(),
                cli.actor.as_deref(),
            )),
            UserAction::List => rt.block_on(commands::user::list(&base_dir)),
        },
        Commands::Role { ref action } => match action {
            RoleAction::Assign { user, role } => rt.block_on(commands::role::assign(
                &base_dir,
                user,
                role,
                cli.actor.as_deref(),
            )),
            RoleAction::Revoke { user, role } => rt.block_on(commands::role::revoke(
                &base_dir,
                user,
                role,
                cli.actor.as_deref(),
            )),
        },
        Commands::Check {
            ref user,
            ref permissions,
            all,
        } => rt.block_on(commands::check::run(&base_dir, user, permissions, all)),
        Commands::Key {
            ref root,
            ref id,
            ref filters,
        } => commands::key::run(&base_dir, root, id.as_deref(), filters.as_deref()),
        Commands::Invalidate {
            ref entity,
            ref action,
        } => commands::invalidate::run(entity, action),
        Commands::Export {
            ref rows,
            ref columns,
            ref format,
            ref out,
            ref title,
        } => commands::export::run(
            &base_dir,
            rows,
            columns,
            format.as_deref(),
            out,
            title.as_deref(),
        ),
        Commands::Audit { limit } => rt.block_on(commands::audit::run(&base_dir, limit)),
    }
}
