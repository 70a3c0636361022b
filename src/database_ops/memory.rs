// In-memory `Datastore` used by unit tests; mirrors the Postgres constraints.

use std::sync::Mutex;

use anyhow::{anyhow, Result};

use crate::database_ops::store::{
    Country, CountrySummary, Datastore, MealInsert, MealView, NewCountry, NewMeal, ReplaceReport,
};

#[derive(Default)]
struct Tables {
    next_id: i64,
    countries: Vec<Country>,
    meals: Vec<(i64, NewMeal)>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    /// Country names whose write fails during `replace_countries`.
    fail_writes_for: Mutex<Vec<String>>,
    /// Make every call return an error.
    pub broken: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn broken() -> Self {
        Self {
            broken: true,
            ..Self::default()
        }
    }

    pub fn failing_writes_for(names: &[&str]) -> Self {
        Self {
            fail_writes_for: Mutex::new(names.iter().map(|n| n.to_string()).collect()),
            ..Self::default()
        }
    }

    /// Make later `replace_countries` calls fail for `names`.
    pub fn fail_writes(&self, names: &[&str]) {
        *self.fail_writes_for.lock().unwrap() = names.iter().map(|n| n.to_string()).collect();
    }

    pub fn meal_count(&self) -> usize {
        self.tables.lock().unwrap().meals.len()
    }

    pub fn country_names(&self) -> Vec<String> {
        let tables = self.tables.lock().unwrap();
        tables.countries.iter().map(|c| c.name.clone()).collect()
    }

    fn check(&self) -> Result<()> {
        if self.broken {
            Err(anyhow!("datastore unavailable"))
        } else {
            Ok(())
        }
    }
}

fn to_country(id: i64, c: &NewCountry) -> Country {
    Country {
        id,
        name: c.name.clone(),
        official_name: c.official_name.clone(),
        capital: c.capital.clone(),
        population: c.population,
        area: c.area,
        languages: c.languages.clone(),
        flag_url: c.flag_url.clone(),
        cca2: c.cca2.clone(),
        cca3: c.cca3.clone(),
        borders: c.borders.clone(),
        gini: c.gini,
        independent: c.independent,
        region: c.region.clone(),
        subregion: c.subregion.clone(),
    }
}

#[async_trait::async_trait]
impl Datastore for MemoryStore {
    async fn list_countries(&self) -> Result<Vec<CountrySummary>> {
        self.check()?;
        let tables = self.tables.lock().unwrap();
        let mut rows: Vec<CountrySummary> = tables
            .countries
            .iter()
            .map(|c| CountrySummary {
                name: c.name.clone(),
                cca3: c.cca3.clone(),
                flag_url: c.flag_url.clone(),
            })
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn country_by_name(&self, name: &str) -> Result<Option<Country>> {
        self.check()?;
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .countries
            .iter()
            .filter(|c| c.name == name)
            .min_by_key(|c| c.id)
            .cloned())
    }

    async fn country_id_by_name(&self, name: &str) -> Result<Option<i64>> {
        Ok(self.country_by_name(name).await?.map(|c| c.id))
    }

    async fn replace_countries(&self, countries: &[NewCountry]) -> Result<ReplaceReport> {
        self.check()?;
        let failing = self.fail_writes_for.lock().unwrap().clone();
        let mut tables = self.tables.lock().unwrap();
        let mut report = ReplaceReport::default();

        for country in countries {
            if failing.contains(&country.name) {
                report.failed.push(country.name.clone());
                continue;
            }
            let existing = tables
                .countries
                .iter()
                .position(|c| c.name == country.name);
            match existing {
                Some(pos) => {
                    let id = tables.countries[pos].id;
                    tables.countries[pos] = to_country(id, country);
                }
                None => {
                    tables.next_id += 1;
                    let id = tables.next_id;
                    tables.countries.push(to_country(id, country));
                }
            }
            report.written += 1;
        }

        let before = tables.countries.len();
        tables
            .countries
            .retain(|c| countries.iter().any(|fresh| fresh.name == c.name));
        report.removed = (before - tables.countries.len()) as u64;

        let live: Vec<i64> = tables.countries.iter().map(|c| c.id).collect();
        tables.meals.retain(|(_, m)| live.contains(&m.country_id));

        Ok(report)
    }

    async fn meals_for_country(&self, country_id: i64) -> Result<Vec<MealView>> {
        self.check()?;
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .meals
            .iter()
            .filter(|(_, m)| m.country_id == country_id)
            .map(|(_, m)| MealView {
                meal_name: m.meal_name.clone(),
                meal_image: m.meal_image.clone(),
                description: m.description.clone(),
                recipe_link: m.recipe_link.clone(),
                category: m.category.clone(),
            })
            .collect())
    }

    async fn insert_meal_if_absent(&self, meal: &NewMeal) -> Result<MealInsert> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        let exists = tables
            .meals
            .iter()
            .any(|(_, m)| m.country_id == meal.country_id && m.meal_name == meal.meal_name);
        if exists {
            return Ok(MealInsert::AlreadyPresent);
        }
        tables.next_id += 1;
        let id = tables.next_id;
        tables.meals.push((id, meal.clone()));
        Ok(MealInsert::Inserted(id))
    }

    async fn ping(&self) -> bool {
        !self.broken
    }
}
