use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use clinicdesk::config::Config;
use clinicdesk::ClinicStore;

#[derive(Debug, Parser)]
#[command(name = "clinicdesk", version, about = "Dental clinic client")]
struct Cli {
    /// Config file (defaults to the platform config directory).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override `api.base_url` from the config file.
    #[arg(long, env = "CLINICDESK_API_URL", global = true)]
    api_url: Option<String>,

    /// Write diagnostics to this file (overrides `logging.path`).
    #[arg(long, env = "CLINICDESK_LOG", global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show the persisted session.
    Status,
    /// Log in as a doctor.
    Login {
        doctor_id: String,
        #[arg(long, env = "CLINICDESK_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Log in as an administrator.
    LoginAdmin {
        username: String,
        #[arg(long, env = "CLINICDESK_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// End the session.
    Logout,
    /// List doctors.
    Doctors,
    /// List patients.
    Patients,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref(), cli.api_url)?;
    if let Some(log_file) = cli.log_file {
        config.logging.path = Some(log_file);
    }
    clinicdesk::logging::init_tracing(&config.logging);

    let store = ClinicStore::open(&config).context("failed to open clinic store")?;
    run(&store, cli.command).await
}

fn load_config(path: Option<&std::path::Path>, api_url: Option<String>) -> Result<Config> {
    let mut config = match path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(api_url) = api_url {
        config.api.base_url = api_url;
    }
    Ok(config)
}

async fn run(store: &ClinicStore, command: Command) -> Result<()> {
    match command {
        Command::Status => match store.session().session() {
            Some(session) => println!(
                "Logged in as {} ({})",
                session.display_name(),
                session.role().as_str()
            ),
            None => println!("Not logged in"),
        },
        Command::Login {
            doctor_id,
            password,
        } => {
            let user = store.login_doctor(&doctor_id, &password).await?;
            println!("Welcome, {}", user.display_name());
        }
        Command::LoginAdmin { username, password } => {
            let user = store.login_admin(&username, &password).await?;
            println!("Welcome, {} ({})", user.display_name(), user.role().as_str());
        }
        Command::Logout => {
            if store.logout().await {
                println!("Logged out");
            } else {
                println!("Logged out (some saved session data could not be removed)");
            }
        }
        Command::Doctors => {
            store.refresh_doctors().await?;
            for doctor in store.cache().doctors() {
                println!(
                    "{:>6}  {:<28} {:<20} {:?}",
                    doctor.id, doctor.name, doctor.specialty, doctor.status
                );
            }
        }
        Command::Patients => {
            store.refresh_patients().await?;
            for patient in store.cache().patients() {
                println!(
                    "{:>14}  {:<28} {:>3}  {}",
                    patient.id, patient.name, patient.age, patient.phone
                );
            }
        }
    }
    Ok(())
}
