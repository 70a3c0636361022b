use anyhow::{Context, Result};
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions, PgSslMode},
    Acquire, PgConnection, PgPool,
};
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, instrument, warn};

use crate::database_ops::store::{
    Country, CountrySummary, Datastore, MealInsert, MealView, NewCountry, NewMeal, ReplaceReport,
};
use crate::util::env as env_util;

const COUNTRY_COLUMNS: &str = "id, name, official_name, capital, population, area, languages, \
     flag_url, cca2, cca3, borders, gini, independent, region, subregion";

#[derive(Clone)]
pub struct Db {
    pub pool: PgPool,
}

impl Db {
    // SECURITY: never include raw DSNs in tracing spans (they may contain credentials).
    #[instrument(skip(database_url))]
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let mut connect_options = PgConnectOptions::from_str(database_url)
            .context("invalid database URL")?;

        if database_url.contains("sslmode=require") {
            connect_options = connect_options.ssl_mode(PgSslMode::Require);
        }

        // Supabase's transaction pooler rejects named prepared statements.
        if !env_util::env_flag("USE_PREPARED", false) {
            connect_options = connect_options.statement_cache_capacity(0);
        }

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(600))
            .connect_with(connect_options)
            .await
            .context("failed to connect to database")?;
        info!(max_connections, "connected to db");

        let db = Self { pool };
        if env_util::env_flag("AUTO_MIGRATE", false) {
            db.migrate().await?;
        } else {
            info!("AUTO_MIGRATE disabled; skipping migrations");
        }
        Ok(db)
    }

    /// Connect with the first configured DSN and `DB_MAX_CONNS`.
    pub async fn connect_from_env() -> Result<Self> {
        let database_url = env_util::db_url()?;
        let max_connections: u32 = env_util::env_parse("DB_MAX_CONNS", 10u32);
        Self::connect(&database_url, max_connections).await
    }

    pub async fn migrate(&self) -> Result<()> {
        info!("running migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("migration failed")?;
        Ok(())
    }
}

async fn upsert_country(conn: &mut PgConnection, country: &NewCountry) -> Result<()> {
    sqlx::query(
        "INSERT INTO countries (name, official_name, capital, population, area, languages, \
             flag_url, cca2, cca3, borders, gini, independent, region, subregion) \
         VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14) \
         ON CONFLICT (name) DO UPDATE SET \
             official_name = EXCLUDED.official_name, \
             capital = EXCLUDED.capital, \
             population = EXCLUDED.population, \
             area = EXCLUDED.area, \
             languages = EXCLUDED.languages, \
             flag_url = EXCLUDED.flag_url, \
             cca2 = EXCLUDED.cca2, \
             cca3 = EXCLUDED.cca3, \
             borders = EXCLUDED.borders, \
             gini = EXCLUDED.gini, \
             independent = EXCLUDED.independent, \
             region = EXCLUDED.region, \
             subregion = EXCLUDED.subregion",
    )
    .bind(&country.name)
    .bind(&country.official_name)
    .bind(&country.capital)
    .bind(country.population)
    .bind(country.area)
    .bind(&country.languages)
    .bind(&country.flag_url)
    .bind(&country.cca2)
    .bind(&country.cca3)
    .bind(&country.borders)
    .bind(country.gini)
    .bind(country.independent)
    .bind(&country.region)
    .bind(&country.subregion)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

#[async_trait::async_trait]
impl Datastore for Db {
    async fn list_countries(&self) -> Result<Vec<CountrySummary>> {
        let rows = sqlx::query_as::<_, CountrySummary>(
            "SELECT name, cca3, flag_url FROM countries ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn country_by_name(&self, name: &str) -> Result<Option<Country>> {
        let sql = format!(
            "SELECT {COUNTRY_COLUMNS} FROM countries WHERE name = $1 ORDER BY id LIMIT 1"
        );
        let row = sqlx::query_as::<_, Country>(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn country_id_by_name(&self, name: &str) -> Result<Option<i64>> {
        let id = sqlx::query_scalar::<_, i64>(
            "SELECT id FROM countries WHERE name = $1 ORDER BY id LIMIT 1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(id)
    }

    #[instrument(skip_all, fields(rows = countries.len()))]
    async fn replace_countries(&self, countries: &[NewCountry]) -> Result<ReplaceReport> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("begin country refresh")?;
        let mut report = ReplaceReport::default();

        for country in countries {
            // One savepoint per row so a bad row does not poison the transaction.
            let mut savepoint = (&mut tx).begin().await?;
            match upsert_country(&mut savepoint, country).await {
                Ok(()) => {
                    savepoint.commit().await?;
                    report.written += 1;
                }
                Err(e) => {
                    warn!(country = %country.name, error = %e, "country write failed");
                    savepoint.rollback().await?;
                    report.failed.push(country.name.clone());
                }
            }
        }

        // Failed rows keep their previous version; only names absent upstream go.
        let fresh: Vec<&str> = countries.iter().map(|c| c.name.as_str()).collect();
        let pruned = sqlx::query("DELETE FROM countries WHERE NOT (name = ANY($1))")
            .bind(&fresh)
            .execute(&mut *tx)
            .await
            .context("prune stale countries")?;
        tx.commit().await.context("commit country refresh")?;

        report.removed = pruned.rows_affected();
        Ok(report)
    }

    async fn meals_for_country(&self, country_id: i64) -> Result<Vec<MealView>> {
        let rows = sqlx::query_as::<_, MealView>(
            "SELECT meal_name, meal_image, description, recipe_link, category \
             FROM meals WHERE country_id = $1 ORDER BY id",
        )
        .bind(country_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn insert_meal_if_absent(&self, meal: &NewMeal) -> Result<MealInsert> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO meals (country_id, meal_name, meal_image, description, recipe_link, category) \
             VALUES ($1,$2,$3,$4,$5,$6) \
             ON CONFLICT (country_id, meal_name) DO NOTHING \
             RETURNING id",
        )
        .bind(meal.country_id)
        .bind(&meal.meal_name)
        .bind(&meal.meal_image)
        .bind(&meal.description)
        .bind(&meal.recipe_link)
        .bind(&meal.category)
        .fetch_optional(&self.pool)
        .await?;
        Ok(match id {
            Some(id) => MealInsert::Inserted(id),
            None => MealInsert::AlreadyPresent,
        })
    }

    async fn ping(&self) -> bool {
        sqlx::query_scalar::<_, bool>("SELECT true")
            .fetch_one(&self.pool)
            .await
            .is_ok()
    }
}
