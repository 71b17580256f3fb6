//! Development shell over the role and user accessors.
//!
//! Run a single command (`roster-shell users`) or start an interactive loop
//! (`roster-shell` / `roster-shell repl`) that reads one command per line.

use std::{error::Error, io::Write};

use clap::{Parser, Subcommand};
use roster::{db, entity::user, queries, ExpiredDeletion, SeaOrmStore};
use sea_orm::DatabaseConnection;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

type BoxError = Box<dyn Error + Send + Sync>;

#[derive(Parser, Debug)]
#[command(name = "roster-shell")]
#[command(about = "Inspect the roles and users stored by roster")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite://data.sqlite?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Option<Command>,
}

/// One line typed at the `roster>` prompt.
#[derive(Parser, Debug)]
#[command(no_binary_name = true)]
struct Line {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every role.
    Roles,
    /// List every user.
    Users,
    /// Print the number of users and roles.
    Counts,
    /// Look a user up by exact username.
    FindUser { username: String },
    /// Look a role up by exact name.
    FindRole { name: String },
    /// List the users assigned to a role id.
    RoleUsers { role_id: i32 },
    /// Delete expired session records.
    PurgeSessions,
    /// Read commands from stdin until EOF or `exit`.
    Repl,
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("roster=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let db = db::connect(&cli.database_url, 1).await?;

    match cli.command.unwrap_or(Command::Repl) {
        Command::Repl => repl(&db).await,
        command => execute(&db, command).await,
    }
}

async fn repl(db: &DatabaseConnection) -> Result<(), BoxError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("roster> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            println!();
            return Ok(());
        };
        let line = line.trim();
        match line {
            "" => continue,
            "exit" | "quit" => return Ok(()),
            _ => {}
        }

        let parsed = match Line::try_parse_from(line.split_whitespace()) {
            Ok(parsed) => parsed,
            Err(err) => {
                eprintln!("{err}");
                continue;
            }
        };

        if let Err(err) = execute(db, parsed.command).await {
            eprintln!("error: {err}");
        }
    }
}

async fn execute(db: &DatabaseConnection, command: Command) -> Result<(), BoxError> {
    match command {
        Command::Roles => {
            for role in queries::all_roles(db).await? {
                println!("<Role {:?}> id={}", role.name, role.id);
            }
        }
        Command::Users => {
            for user in queries::all_users(db).await? {
                print_user(&user);
            }
        }
        Command::Counts => {
            println!("users: {}", queries::count_users(db).await?);
            println!("roles: {}", queries::count_roles(db).await?);
        }
        Command::FindUser { username } => {
            match queries::find_user_by_username(db, &username).await? {
                Some(user) => print_user(&user),
                None => println!("no user named {username:?}"),
            }
        }
        Command::FindRole { name } => match queries::find_role_by_name(db, &name).await? {
            Some(role) => println!("<Role {:?}> id={}", role.name, role.id),
            None => println!("no role named {name:?}"),
        },
        Command::RoleUsers { role_id } => {
            for user in queries::users_for_role(db, role_id).await? {
                print_user(&user);
            }
        }
        Command::PurgeSessions => {
            SeaOrmStore::new(db.clone()).delete_expired().await?;
            println!("expired sessions deleted");
        }
        Command::Repl => println!("already in the shell"),
    }

    Ok(())
}

fn print_user(user: &user::Model) {
    match user.role_id {
        Some(role_id) => println!(
            "<User {:?}> id={} role_id={role_id}",
            user.username, user.id
        ),
        None => println!("<User {:?}> id={}", user.username, user.id),
    }
}
