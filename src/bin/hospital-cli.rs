use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::Value;

use hospital_client::auth::{Credentials, Role};
use hospital_client::lifecycle::startup;
use hospital_client::observability::logging;
use hospital_client::resources::{Blog, Doctor, Event, Resource, Testimonial};
use hospital_client::{ApiClient, ApiError};

#[derive(Parser)]
#[command(name = "hospital-cli")]
#[command(about = "Management CLI for the hospital website backend", long_about = None)]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check backend and database health
    Health,
    /// Check database connectivity only
    DbHealth,
    /// Ask the backend to reconnect to its database
    Reconnect,
    /// List every record of a collection
    List { resource: Collection },
    /// Fetch one record
    Get { resource: Collection, id: String },
    /// Delete one record (appointments cannot be deleted)
    Delete { resource: Deletable, id: String },
    /// Store a bearer token for later calls
    Login {
        #[arg(long)]
        token: String,
        #[arg(long, default_value = "admin")]
        role: Role,
    },
    /// Forget the stored token
    Logout,
    /// Print the push notification public key
    VapidKey,
}

#[derive(Clone, Copy, ValueEnum)]
enum Collection {
    Blogs,
    Doctors,
    Events,
    Testimonials,
    Appointments,
}

/// Collections the backend exposes `DELETE /{id}` for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Deletable {
    Blogs,
    Doctors,
    Events,
    Testimonials,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = startup::resolve_config(cli.config.as_deref())?;
    logging::init_logging(&config.observability);

    let client = ApiClient::from_config(&config)?;

    let result = match cli.command {
        Commands::Health => print(&client.check_system_health().await),
        Commands::DbHealth => print(&client.check_database_health().await),
        Commands::Reconnect => {
            let reconnected = client.force_reconnect().await;
            print(&serde_json::json!({
                "reconnected": reconnected,
                "status": client.status(),
            }))
        }
        Commands::List { resource } => list(&client, resource).await,
        Commands::Get { resource, id } => get(&client, resource, &id).await,
        Commands::Delete { resource, id } => {
            let deleted = match resource {
                Deletable::Blogs => client.resource::<Blog>().delete(&id).await,
                Deletable::Doctors => client.resource::<Doctor>().delete(&id).await,
                Deletable::Events => client.resource::<Event>().delete(&id).await,
                Deletable::Testimonials => client.resource::<Testimonial>().delete(&id).await,
            };
            deleted.map(|()| println!("Deleted {}", id))
        }
        Commands::Login { token, role } => {
            client.session().login(Credentials { token, role })?;
            println!("Logged in as {:?}", role);
            Ok(())
        }
        Commands::Logout => {
            client.session().logout()?;
            println!("Logged out");
            Ok(())
        }
        Commands::VapidKey => client.vapid_public_key().await.map(|key| println!("{}", key)),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e.user_message());
        if let Some(status) = e.status() {
            eprintln!("Status: {}", status);
        }
        std::process::exit(1);
    }

    Ok(())
}

async fn list(client: &ApiClient, resource: Collection) -> Result<(), ApiError> {
    match resource {
        Collection::Blogs => print_all::<Blog>(client).await,
        Collection::Doctors => print_all::<Doctor>(client).await,
        Collection::Events => print_all::<Event>(client).await,
        Collection::Testimonials => print_all::<Testimonial>(client).await,
        Collection::Appointments => print(&client.appointments().list().await?),
    }
}

async fn get(client: &ApiClient, resource: Collection, id: &str) -> Result<(), ApiError> {
    match resource {
        Collection::Blogs => print(&client.resource::<Blog>().get(id).await?),
        Collection::Doctors => print(&client.resource::<Doctor>().get(id).await?),
        Collection::Events => print(&client.resource::<Event>().get(id).await?),
        Collection::Testimonials => print(&client.resource::<Testimonial>().get(id).await?),
        Collection::Appointments => print(&client.appointments().get(id).await?),
    }
}

async fn print_all<R: Resource>(client: &ApiClient) -> Result<(), ApiError> {
    print(&client.resource::<R>().list().await?)
}

fn print<S: Serialize + ?Sized>(value: &S) -> Result<(), ApiError> {
    let json: Value = serde_json::to_value(value).map_err(ApiError::Encode)?;
    match serde_json::to_string_pretty(&json) {
        Ok(text) => println!("{}", text),
        Err(_) => println!("{}", json),
    }
    Ok(())
}
