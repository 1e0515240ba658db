//! Message templates for recommendations.
//!
//! Templates use `{name}` placeholders filled from the argument list passed to
//! [`Translator::translate`].

use std::collections::HashMap;

use tracing::warn;

use crate::models::FuelType;

pub trait Translator {
    /// Render the template for `key`. Unknown keys render as the key itself.
    fn translate(&self, key: &str, args: &[(&str, String)]) -> String;

    fn fuel_label(&self, fuel: FuelType) -> String;
}

/// Fill `{name}` placeholders. Unknown placeholders are left as written.
pub fn render(template: &str, args: &[(&str, String)]) -> String {
    let mut out = template.to_string();
    for (name, value) in args {
        out = out.replace(&format!("{{{}}}", name), value);
    }
    out
}

/// In-memory template catalog for one language.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    templates: HashMap<String, String>,
    fuel_labels: HashMap<FuelType, String>,
}

const ENGLISH: &[(&str, &str)] = &[
    ("recommendation.outlier_high.title", "{fuel} price far above market"),
    (
        "recommendation.outlier_high.message",
        "Your {fuel} price of ${price} is well above the competitor average of ${avg}. Consider lowering it to ${suggested}.",
    ),
    ("recommendation.outlier_low.title", "{fuel} price far below market"),
    (
        "recommendation.outlier_low.message",
        "Your {fuel} price of ${price} is well below the competitor average of ${avg}. You could raise it to ${suggested} and stay competitive.",
    ),
    ("recommendation.above_average.title", "{fuel} priced above average"),
    (
        "recommendation.above_average.message",
        "Your {fuel} price is {percent}% above the competitor average of ${avg}. Consider adjusting it to ${suggested}.",
    ),
    ("recommendation.below_average.title", "{fuel} priced below average"),
    (
        "recommendation.below_average.message",
        "Your {fuel} price is {percent}% below the competitor average of ${avg}. There is room to raise it to ${suggested}.",
    ),
    (
        "recommendation.competitive_advantage.title",
        "Competitive {fuel} price",
    ),
    (
        "recommendation.competitive_advantage.message",
        "Your {fuel} price of ${price} is in the cheaper half of the market. Keep it at ${suggested}.",
    ),
];

const SPANISH: &[(&str, &str)] = &[
    ("recommendation.outlier_high.title", "Precio de {fuel} muy por encima del mercado"),
    (
        "recommendation.outlier_high.message",
        "Tu precio de {fuel} de ${price} está muy por encima del promedio de la competencia de ${avg}. Considera bajarlo a ${suggested}.",
    ),
    ("recommendation.outlier_low.title", "Precio de {fuel} muy por debajo del mercado"),
    (
        "recommendation.outlier_low.message",
        "Tu precio de {fuel} de ${price} está muy por debajo del promedio de la competencia de ${avg}. Podrías subirlo a ${suggested} sin perder competitividad.",
    ),
    ("recommendation.above_average.title", "{fuel} por encima del promedio"),
    (
        "recommendation.above_average.message",
        "Tu precio de {fuel} está {percent}% por encima del promedio de la competencia de ${avg}. Considera ajustarlo a ${suggested}.",
    ),
    ("recommendation.below_average.title", "{fuel} por debajo del promedio"),
    (
        "recommendation.below_average.message",
        "Tu precio de {fuel} está {percent}% por debajo del promedio de la competencia de ${avg}. Hay margen para subirlo a ${suggested}.",
    ),
    (
        "recommendation.competitive_advantage.title",
        "Precio de {fuel} competitivo",
    ),
    (
        "recommendation.competitive_advantage.message",
        "Tu precio de {fuel} de ${price} está en la mitad más barata del mercado. Mantenlo en ${suggested}.",
    ),
];

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    fn from_tables(templates: &[(&str, &str)], labels: [(FuelType, &str); 3]) -> Self {
        Self {
            templates: templates
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            fuel_labels: labels
                .iter()
                .map(|(fuel, label)| (*fuel, label.to_string()))
                .collect(),
        }
    }

    pub fn english() -> Self {
        Self::from_tables(
            ENGLISH,
            [
                (FuelType::Regular, "Regular"),
                (FuelType::Premium, "Premium"),
                (FuelType::Diesel, "Diesel"),
            ],
        )
    }

    pub fn spanish() -> Self {
        Self::from_tables(
            SPANISH,
            [
                (FuelType::Regular, "Magna"),
                (FuelType::Premium, "Premium"),
                (FuelType::Diesel, "Diésel"),
            ],
        )
    }

    /// Catalog for a language tag (`"en"`, `"es"`, `"es-MX"`), English otherwise.
    pub fn for_language(tag: &str) -> Self {
        match tag.split(['-', '_']).next().map(str::to_ascii_lowercase).as_deref() {
            Some("es") => Self::spanish(),
            _ => Self::english(),
        }
    }

    /// Add or replace a template.
    pub fn insert(&mut self, key: &str, template: &str) -> &mut Self {
        self.templates.insert(key.to_string(), template.to_string());
        self
    }
}

impl Translator for Catalog {
    fn translate(&self, key: &str, args: &[(&str, String)]) -> String {
        match self.templates.get(key) {
            Some(template) => render(template, args),
            None => {
                warn!(key, "missing translation");
                key.to_string()
            }
        }
    }

    fn fuel_label(&self, fuel: FuelType) -> String {
        self.fuel_labels
            .get(&fuel)
            .cloned()
            .unwrap_or_else(|| fuel.to_string())
    }
}
