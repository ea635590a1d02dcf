use std::{error::Error, path::Path, process::exit};

use clap::{Parser, Subcommand};
use rusqlite::Connection;

use cuentas_rs::{authorize_email, initialize_db, list_authorized_emails, revoke_email};

/// A utility for managing which emails may sign in to cuentas_rs.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Allow an email to sign in.
    Add {
        /// The email address to allow.
        email: String,
    },
    /// Stop an email from signing in. Existing sessions end on their next request.
    Remove {
        /// The email address to remove.
        email: String,
    },
    /// Print the emails that may sign in.
    List,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let db_path = Path::new(&args.db_path);
    if db_path.extension().is_none_or(|extension| extension.is_empty()) {
        eprintln!("Database path must include a file extension (e.g., 'cuentas.db').");
        exit(1);
    }

    let connection = Connection::open(db_path)?;
    initialize_db(&connection)?;

    match args.command {
        Command::Add { email } => {
            if authorize_email(&email, &connection)? {
                println!("Added {email} to the allow-list.");
            } else {
                println!("{email} is already on the allow-list.");
            }
        }
        Command::Remove { email } => {
            if revoke_email(&email, &connection)? {
                println!("Removed {email} from the allow-list.");
            } else {
                println!("{email} was not on the allow-list.");
            }
        }
        Command::List => {
            let emails = list_authorized_emails(&connection)?;

            if emails.is_empty() {
                println!("The allow-list is empty.");
            }

            for email in emails {
                println!("{email}");
            }
        }
    }

    Ok(())
}
