use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use voyager::api::ApiServer;
use voyager::database_ops::mealdb::MealImporter;
use voyager::database_ops::restcountries::CountryImporter;
use voyager::settings::ImportSettings;
use voyager::tracing::{init_tracing, DEFAULT_FILTER};
use voyager::util::db::Db;
use voyager::util::env as env_util;

#[derive(Parser, Debug)]
#[command(name = "voyager", version, about = "Global Voyager importers and API")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
#[command(rename_all = "kebab-case")]
enum Commands {
    /// Run the HTTP API
    Serve,
    /// Replace the countries table with the current country directory
    RefreshCountries,
    /// Import the meals of one country's cuisine
    PopulateMeals {
        /// Exact common name, e.g. "United States"
        country: String,
    },
    /// Import meals for every mapped country except POPULATE_ALL_EXCLUDE
    PopulateAllMeals,
    /// Print the active country to cuisine mapping
    Cuisines,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn meal_importer(settings: &ImportSettings) -> Result<MealImporter> {
    let db = Db::connect_from_env().await?;
    Ok(MealImporter::new(
        Arc::new(db),
        Arc::new(settings.recipe_directory()?),
        settings.cuisines.clone(),
        settings.meal_options.clone(),
    ))
}

#[tokio::main]
async fn main() -> Result<()> {
    env_util::init_env();
    init_tracing(DEFAULT_FILTER)?;

    let cli = Cli::parse();
    let settings = ImportSettings::from_env()?;

    match cli.command {
        Commands::Serve => {
            let server = ApiServer::from_env()?;
            let state = settings.app_state().await?;
            server.run(state).await?;
        }
        Commands::RefreshCountries => {
            let db = Db::connect_from_env().await?;
            let importer =
                CountryImporter::new(Arc::new(db), Arc::new(settings.country_directory()?));
            let summary = importer.refresh_countries().await?;
            print_json(&summary)?;
        }
        Commands::PopulateMeals { country } => {
            // Validate against the mapping before opening a connection.
            settings
                .cuisines
                .cuisine_for(&country)
                .with_context(|| format!("Cuisine not found for {country}"))?;
            let summary = meal_importer(&settings)
                .await?
                .populate_meals(&country)
                .await?;
            print_json(&summary)?;
        }
        Commands::PopulateAllMeals => {
            let report = meal_importer(&settings).await?.populate_all_meals().await;
            info!(
                succeeded = report.succeeded,
                failed = report.failed,
                "populate-all finished"
            );
            print_json(&report)?;
        }
        Commands::Cuisines => {
            print_json(&settings.cuisines.entries())?;
        }
    }

    Ok(())
}
