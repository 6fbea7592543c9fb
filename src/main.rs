use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use rocket_catalog::db::Database;
use rocket_catalog::models::*;

#[derive(Parser)]
#[command(name = "rcat")]
#[command(about = "Launch vehicle catalog")]
struct Cli {
    /// Path to the catalog database (defaults to the platform data directory)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage launch service providers
    #[command(subcommand)]
    Provider(ProviderCommand),
    /// Manage rocket families
    #[command(subcommand)]
    Family(FamilyCommand),
    /// Manage rockets
    #[command(subcommand)]
    Rocket(RocketCommand),
    /// Record launches
    #[command(subcommand)]
    Launch(LaunchCommand),
}

#[derive(Subcommand)]
enum ProviderCommand {
    /// Register a provider
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        country: String,
        #[arg(long)]
        year_founded: i32,
        #[arg(long)]
        headquarters: Option<String>,
    },
    /// List providers
    List,
}

#[derive(Subcommand)]
enum FamilyCommand {
    /// Create a family
    Add {
        #[arg(long)]
        name: String,
    },
    /// List families
    List,
}

#[derive(Subcommand)]
enum RocketCommand {
    /// Add a rocket
    Add(AddRocketArgs),
    /// Show a rocket as JSON
    Show { id: Uuid },
    /// List rockets
    List {
        /// Only rockets built by this provider
        #[arg(long)]
        manufacturer: Option<Uuid>,
    },
    /// Delete a rocket (its launches are kept)
    Delete { id: Uuid },
}

#[derive(Args)]
struct AddRocketArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    country: String,
    /// Provider id
    #[arg(long)]
    manufacturer: Uuid,
    #[arg(long)]
    mass_to_leo: Option<String>,
    #[arg(long)]
    mass_to_gto: Option<String>,
    #[arg(long)]
    mass_to_other: Option<String>,
    #[arg(long)]
    first_year: Option<i32>,
    #[arg(long)]
    latest_year: Option<i32>,
    /// Family id
    #[arg(long)]
    family: Option<Uuid>,
}

#[derive(Subcommand)]
enum LaunchCommand {
    /// Record a launch provided by a rocket
    Add {
        /// Rocket id
        #[arg(long)]
        rocket: Uuid,
        /// Launch date (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        site: String,
        #[arg(long)]
        orbit: String,
        #[arg(long)]
        function: Option<String>,
        /// Mark the launch as failed
        #[arg(long)]
        failed: bool,
    },
}

/// Initialize tracing on stderr so stdout carries only command output
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "rocket_catalog=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let db = match cli.db {
        Some(path) => Database::open(path)?,
        None => Database::open_default()?,
    };
    db.init_schema()?;

    match cli.command {
        Commands::Provider(command) => run_provider(&db, command),
        Commands::Family(command) => run_family(&db, command),
        Commands::Rocket(command) => run_rocket(&db, command),
        Commands::Launch(command) => run_launch(&db, command),
    }
}

fn run_provider(db: &Database, command: ProviderCommand) -> anyhow::Result<()> {
    match command {
        ProviderCommand::Add {
            name,
            country,
            year_founded,
            headquarters,
        } => {
            let provider = db.create_provider(CreateProviderInput {
                name,
                year_founded,
                country,
                headquarters,
            })?;
            println!("{}", provider.id);
        }
        ProviderCommand::List => {
            for provider in db.get_all_providers()? {
                println!("{}  {}", provider.id, provider);
            }
        }
    }
    Ok(())
}

fn run_family(db: &Database, command: FamilyCommand) -> anyhow::Result<()> {
    match command {
        FamilyCommand::Add { name } => {
            let family = db.create_family(CreateFamilyInput { name })?;
            println!("{}", family.id);
        }
        FamilyCommand::List => {
            for family in db.get_all_families()? {
                println!("{}  {}", family.id, family.name);
            }
        }
    }
    Ok(())
}

fn run_rocket(db: &Database, command: RocketCommand) -> anyhow::Result<()> {
    match command {
        RocketCommand::Add(args) => {
            let rocket = build_rocket(db, args)?;
            let record = db.insert_rocket(&rocket)?;
            println!("{}", record.id);
        }
        RocketCommand::Show { id } => {
            let record = db
                .get_rocket(id)?
                .with_context(|| format!("Rocket {} not found", id))?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        RocketCommand::List { manufacturer } => {
            let records = match manufacturer {
                Some(provider_id) => db.get_rockets_by_manufacturer(provider_id)?,
                None => db.get_all_rockets()?,
            };
            for record in records {
                println!("{}  {}", record.id, record.rocket);
            }
        }
        RocketCommand::Delete { id } => {
            if !db.delete_rocket(id)? {
                anyhow::bail!("Rocket {} not found", id);
            }
        }
    }
    Ok(())
}

fn build_rocket(db: &Database, args: AddRocketArgs) -> anyhow::Result<Rocket> {
    let manufacturer = db
        .get_provider(args.manufacturer)?
        .with_context(|| format!("Provider {} not found", args.manufacturer))?;

    let mut rocket = Rocket::new(args.name, args.country, Arc::new(manufacturer))?;
    if let Some(value) = args.mass_to_leo {
        rocket.set_mass_to_leo(value)?;
    }
    if let Some(value) = args.mass_to_gto {
        rocket.set_mass_to_gto(value)?;
    }
    if let Some(value) = args.mass_to_other {
        rocket.set_mass_to_other(value)?;
    }
    if let Some(year) = args.first_year {
        rocket.set_first_year_flight(year);
    }
    if let Some(year) = args.latest_year {
        rocket.set_latest_year_flight(year);
    }
    if let Some(family_id) = args.family {
        let family = db
            .get_family(family_id)?
            .with_context(|| format!("Family {} not found", family_id))?;
        rocket.set_family(family)?;
    }
    Ok(rocket)
}

fn run_launch(db: &Database, command: LaunchCommand) -> anyhow::Result<()> {
    match command {
        LaunchCommand::Add {
            rocket,
            date,
            site,
            orbit,
            function,
            failed,
        } => {
            db.get_rocket(rocket)?
                .with_context(|| format!("Rocket {} not found", rocket))?;

            let outcome = if failed {
                LaunchOutcome::Failed
            } else {
                LaunchOutcome::Successful
            };
            let launch = db.create_launch(CreateLaunchInput {
                launch_date: date,
                launch_site: site,
                orbit,
                function,
                outcome,
            })?;
            db.attach_launch(rocket, launch.id)?;
            println!("{}", launch.id);
        }
    }
    Ok(())
}
