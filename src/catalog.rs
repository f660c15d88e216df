//! Module and software catalog offered by the survey form.
//!
//! A label wrapped in `*` is the category's major module; every other label
//! is a sub-module. The marker is part of the label text and is the only
//! classification signal, see [`crate::rules::is_major`].

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::response::CATEGORY_COUNT;
use crate::rules::is_major;

/// One module category on the form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// 1-based category number, matches the `categoryN` form key
    pub number: usize,
    pub title: String,
    pub modules: Vec<String>,
}

impl Category {
    /// The marked major module of this category, if it has one
    pub fn major(&self) -> Option<&str> {
        self.modules.iter().map(String::as_str).find(|m| is_major(m))
    }

    pub fn sub_modules(&self) -> impl Iterator<Item = &str> {
        self.modules.iter().map(String::as_str).filter(|m| !is_major(m))
    }
}

/// Everything a participant can tick
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub categories: Vec<Category>,
    pub software: Vec<String>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl Catalog {
    /// The catalog of the Phase 2 module-selection survey
    pub fn standard() -> Self {
        let category = |number: usize, title: &str, modules: &[&str]| Category {
            number,
            title: title.to_string(),
            modules: modules.iter().map(|m| m.to_string()).collect(),
        };

        Self {
            categories: vec![
                category(
                    1,
                    "Drilling & Blasting Technology",
                    &[
                        "*Drilling & Blasting Technology*",
                        "Rock Mechanics & Geology for Drilling & Blasting",
                        "Drilling Technology & Equipment",
                        "Explosives Science & Technology",
                        "Blast Design & Engineering",
                        "Blasting Operations & Safety Management",
                        "Blast Monitoring, Analysis & Optimization",
                        "Environmental Management & Specialized Applications",
                    ],
                ),
                category(
                    2,
                    "Mine Excavation & Materials Transportation",
                    &[
                        "*Mine Excavation & Materials Transportation*",
                        "Mine Production Systems & Planning",
                        "Excavation Equipment & Operations",
                        "Loading Systems & Material Handling",
                        "Hauling & Transportation Systems",
                        "Equipment Maintenance & Reliability",
                        "Safety Management & Operational Controls",
                        "Performance Monitoring & Continuous Improvement",
                    ],
                ),
            ],
            software: [
                "Ball Mill Simulation Software",
                "Datamine",
                "Deswik",
                "Leapfrog",
                "Surpac",
                "ArcGIS",
                "Matlab",
                "Ansys",
                "Solidworks",
                "Autocad",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }

    /// Load a catalog from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read catalog from {:?}", path.as_ref()))?;

        let catalog: Self =
            serde_json::from_str(&content).context("Failed to parse catalog JSON")?;
        catalog.validate()?;

        Ok(catalog)
    }

    /// Check category numbering and label uniqueness
    pub fn validate(&self) -> Result<()> {
        for category in &self.categories {
            if category.number == 0 || category.number > CATEGORY_COUNT {
                anyhow::bail!(
                    "Category number {} is outside 1-{}",
                    category.number,
                    CATEGORY_COUNT
                );
            }
            if self
                .categories
                .iter()
                .filter(|c| c.number == category.number)
                .count()
                > 1
            {
                anyhow::bail!("Category {} is defined twice", category.number);
            }
        }

        // A label belongs to exactly one category
        let mut seen = std::collections::HashSet::new();
        for label in self.categories.iter().flat_map(|c| c.modules.iter()) {
            if !seen.insert(label.as_str()) {
                anyhow::bail!("Module '{}' appears in more than one place", label);
            }
        }

        Ok(())
    }

    /// Category by 1-based number
    pub fn category(&self, number: usize) -> Option<&Category> {
        self.categories.iter().find(|c| c.number == number)
    }

    /// True if `label` is offered in category `number`
    pub fn offers_module(&self, number: usize, label: &str) -> bool {
        self.category(number)
            .is_some_and(|c| c.modules.iter().any(|m| m == label))
    }

    /// True if `name` is in the software list
    pub fn offers_software(&self, name: &str) -> bool {
        self.software.iter().any(|s| s == name)
    }
}
