use clap::{Parser, Subcommand};

mod admin_cli;

use admin_cli::user_commands::{UserAction, handle_user_command_with_conn};
use admin_cli::utils::establish_connection;

#[derive(Parser)]
#[command(name = "portal-admin")]
#[command(about = "Administrative tool for the company portal")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Manage portal accounts")]
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut conn = establish_connection()?;

    match cli.command {
        Commands::User { action } => handle_user_command_with_conn(&mut conn, action)?,
    }

    Ok(())
}
