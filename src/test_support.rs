// Fakes shared by unit tests across modules.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{anyhow, Result};

use crate::database_ops::mealdb::{MealDetail, MealSummary, RecipeDirectory};
use crate::database_ops::memory::MemoryStore;
use crate::database_ops::store::{Datastore, NewCountry};

pub fn country(name: &str) -> NewCountry {
    let code: String = name
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .take(3)
        .collect::<String>()
        .to_ascii_uppercase();
    NewCountry {
        name: name.to_string(),
        official_name: format!("Official {name}"),
        capital: Some(format!("{name} City")),
        population: 1_000_000,
        area: 1234.5,
        languages: vec!["English".to_string()],
        flag_url: format!("https://flagcdn.com/w320/{}.png", code.to_ascii_lowercase()),
        cca2: code[..2].to_string(),
        cca3: code,
        borders: Vec::new(),
        gini: None,
        independent: true,
        region: "Earth".to_string(),
        subregion: None,
    }
}

pub async fn seed_countries(store: &MemoryStore, names: &[&str]) {
    let rows: Vec<NewCountry> = names.iter().map(|n| country(n)).collect();
    store.replace_countries(&rows).await.unwrap();
}

/// In-memory recipe directory keyed by cuisine and meal id.
#[derive(Default)]
pub struct FakeRecipes {
    listings: HashMap<String, Vec<MealSummary>>,
    details: HashMap<String, MealDetail>,
    failing_cuisines: HashSet<String>,
    failing_details: HashSet<String>,
    calls: AtomicUsize,
}

impl FakeRecipes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_meal(mut self, cuisine: &str, id: &str, name: &str, category: &str) -> Self {
        self.details.insert(
            id.to_string(),
            MealDetail {
                id: id.to_string(),
                name: name.to_string(),
                instructions: Some(format!("Cook {name}.")),
                youtube: Some(format!("https://www.youtube.com/watch?v={id}")),
                category: Some(category.to_string()),
                thumbnail: Some(format!("https://img.example/{id}.jpg")),
            },
        );
        self.with_summary_only(cuisine, id, name)
    }

    /// Listed under `cuisine` but without a detail record.
    pub fn with_summary_only(mut self, cuisine: &str, id: &str, name: &str) -> Self {
        self.listings
            .entry(cuisine.to_string())
            .or_default()
            .push(MealSummary {
                id: id.to_string(),
                name: name.to_string(),
                thumbnail: Some(format!("https://img.example/{id}/preview.jpg")),
            });
        self
    }

    pub fn failing_cuisine(mut self, cuisine: &str) -> Self {
        self.failing_cuisines.insert(cuisine.to_string());
        self
    }

    pub fn failing_detail(mut self, id: &str) -> Self {
        self.failing_details.insert(id.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl RecipeDirectory for FakeRecipes {
    async fn meals_by_cuisine(&self, cuisine: &str) -> Result<Vec<MealSummary>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_cuisines.contains(cuisine) {
            return Err(anyhow!("503 Service Unavailable for {cuisine}"));
        }
        Ok(self.listings.get(cuisine).cloned().unwrap_or_default())
    }

    async fn meal_detail(&self, meal_id: &str) -> Result<Option<MealDetail>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_details.contains(meal_id) {
            return Err(anyhow!("timed out looking up {meal_id}"));
        }
        Ok(self.details.get(meal_id).cloned())
    }
}
