//! CSV-based table loader
//!
//! Loads the reference tables from CSV files in data/tables/, one file per
//! table. Every column is read as text and coerced here, so nothing past this
//! module ever sees raw cell values.

use super::coerce::{
    optional_text, parse_amount_list, parse_f64, parse_flag, parse_opt_f64, parse_opt_u32, parse_u32,
    parse_u64, parse_year_list,
};
use super::records::*;
use super::TableBundle;
use crate::error::TableError;
use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Default path to the tables directory
pub const DEFAULT_TABLES_PATH: &str = "data/tables";

/// Environment variable overriding the tables directory
pub const TABLES_DIR_ENV: &str = "QUOTE_TABLES_DIR";

/// Tables directory from the environment, or the default path
pub fn tables_dir_from_env() -> PathBuf {
    std::env::var_os(TABLES_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_TABLES_PATH))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawProduct {
    product_id: String,
    product_name: String,
    insurer_name: String,
    policy_type: String,
    min_age: String,
    max_age: String,
    family_allowed: String,
    sum_assured_steps: String,
    term_options_years: String,
    room_rent_limit: String,
    copay_percent: String,
    pre_existing_wait_months: String,
    disease_specific_wait_months: String,
    maternity_cover: String,
    outpatient_cover: String,
    notes: String,
}

impl From<RawProduct> for Product {
    fn from(raw: RawProduct) -> Self {
        Product {
            policy_type: raw.policy_type.parse().ok(),
            min_age: parse_u32(&raw.min_age),
            max_age: parse_u32(&raw.max_age),
            family_allowed: parse_flag(&raw.family_allowed),
            sum_assured_steps: parse_amount_list(&raw.sum_assured_steps),
            term_options_years: parse_year_list(&raw.term_options_years),
            room_rent_limit: optional_text(&raw.room_rent_limit),
            copay_percent: parse_opt_f64(&raw.copay_percent),
            pre_existing_wait_months: parse_opt_u32(&raw.pre_existing_wait_months),
            disease_specific_wait_months: parse_opt_u32(&raw.disease_specific_wait_months),
            maternity_cover: parse_flag(&raw.maternity_cover),
            outpatient_cover: parse_flag(&raw.outpatient_cover),
            product_id: raw.product_id,
            product_name: raw.product_name,
            insurer_name: raw.insurer_name,
            notes: raw.notes,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawHealthRate {
    product_id: String,
    age_band_min: String,
    age_band_max: String,
    smoker: String,
    bmi_bucket: String,
    city_tier: String,
    #[serde(alias = "sum_assured_inr")]
    sum_assured: String,
    base_premium_annual: String,
}

impl From<RawHealthRate> for HealthRate {
    fn from(raw: RawHealthRate) -> Self {
        let bmi_bucket = raw.bmi_bucket.trim().to_ascii_lowercase();
        HealthRate {
            age_band_min: parse_u32(&raw.age_band_min),
            age_band_max: parse_u32(&raw.age_band_max),
            smoker: parse_flag(&raw.smoker),
            bmi_bucket: if bmi_bucket.is_empty() { "any".to_string() } else { bmi_bucket },
            city_tier: CityTier::parse(&raw.city_tier),
            sum_assured: parse_u64(&raw.sum_assured),
            base_premium_annual: parse_f64(&raw.base_premium_annual),
            product_id: raw.product_id,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawLifeRate {
    product_id: String,
    age_band_min: String,
    age_band_max: String,
    smoker: String,
    #[serde(alias = "sum_assured_inr")]
    sum_assured: String,
    term_years: String,
    base_premium_annual: String,
}

impl From<RawLifeRate> for LifeRate {
    fn from(raw: RawLifeRate) -> Self {
        LifeRate {
            age_band_min: parse_u32(&raw.age_band_min),
            age_band_max: parse_u32(&raw.age_band_max),
            smoker: parse_flag(&raw.smoker),
            sum_assured: parse_u64(&raw.sum_assured),
            term_years: parse_u32(&raw.term_years),
            base_premium_annual: parse_f64(&raw.base_premium_annual),
            product_id: raw.product_id,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawBmiBucket {
    bucket: String,
    min_bmi: String,
    max_bmi: String,
}

impl From<RawBmiBucket> for BmiBucketRow {
    fn from(raw: RawBmiBucket) -> Self {
        BmiBucketRow {
            min_bmi: parse_f64(&raw.min_bmi),
            max_bmi: parse_f64(&raw.max_bmi),
            bucket: raw.bucket.trim().to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawLoading {
    rule_name: String,
    dimension: String,
    match_value: String,
    loading_percent: String,
    apply_to: String,
    notes: String,
}

impl From<RawLoading> for LoadingRule {
    fn from(raw: RawLoading) -> Self {
        LoadingRule {
            dimension: LoadingDimension::parse(&raw.dimension),
            match_value: raw.match_value.trim().to_string(),
            loading_percent: parse_f64(&raw.loading_percent),
            apply_to: RuleScope::parse(&raw.apply_to),
            rule_name: raw.rule_name,
            notes: raw.notes,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawDiscount {
    rule_name: String,
    discount_percent: String,
    apply_to: String,
    constraints: String,
}

impl From<RawDiscount> for DiscountRule {
    fn from(raw: RawDiscount) -> Self {
        DiscountRule {
            rule_name: raw.rule_name.trim().to_string(),
            discount_percent: parse_f64(&raw.discount_percent),
            apply_to: RuleScope::parse(&raw.apply_to),
            constraints: raw.constraints,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawFamilyMultiplier {
    family_size: String,
    multiplier: String,
}

impl From<RawFamilyMultiplier> for FamilyMultiplier {
    fn from(raw: RawFamilyMultiplier) -> Self {
        FamilyMultiplier {
            family_size: parse_u32(&raw.family_size),
            multiplier: parse_f64(&raw.multiplier),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawCondition {
    condition_code: String,
    name: String,
    default_loading_percent: String,
    default_wait_months: String,
    suggested_docs: String,
    recommended_metrics: String,
    severity: String,
}

impl From<RawCondition> for ConditionRow {
    fn from(raw: RawCondition) -> Self {
        ConditionRow {
            condition_code: raw.condition_code.trim().to_string(),
            default_loading_percent: parse_f64(&raw.default_loading_percent),
            default_wait_months: parse_opt_u32(&raw.default_wait_months),
            name: raw.name,
            suggested_docs: raw.suggested_docs,
            recommended_metrics: raw.recommended_metrics,
            severity: raw.severity,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawOccupationRisk {
    occupation_category: String,
    risk_level: String,
    loading_percent: String,
    notes: String,
}

impl From<RawOccupationRisk> for OccupationRiskRow {
    fn from(raw: RawOccupationRisk) -> Self {
        OccupationRiskRow {
            occupation_category: raw.occupation_category.trim().to_string(),
            risk_level: raw.risk_level.trim().to_string(),
            loading_percent: parse_f64(&raw.loading_percent),
            notes: raw.notes,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawCityTier {
    city: String,
    state_ut: String,
    tier: String,
}

impl From<RawCityTier> for CityTierRow {
    fn from(raw: RawCityTier) -> Self {
        CityTierRow {
            city: raw.city.trim().to_string(),
            state_ut: raw.state_ut,
            tier: CityTier::parse(&raw.tier),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawAddOn {
    addon_id: String,
    name: String,
    applies_to: String,
    price_annual: String,
    description: String,
    default_recommended: String,
}

impl From<RawAddOn> for AddOn {
    fn from(raw: RawAddOn) -> Self {
        let name = optional_text(&raw.name).unwrap_or_else(|| raw.addon_id.clone());
        AddOn {
            applies_to: AddOnScope::parse(&raw.applies_to),
            price_annual: parse_f64(&raw.price_annual).max(0.0),
            default_recommended: parse_flag(&raw.default_recommended),
            addon_id: raw.addon_id,
            name,
            description: raw.description,
        }
    }
}

/// Deserialize every row of one table from any reader
fn read_rows<Raw, Row, R>(reader: R, table: &'static str) -> Result<Vec<Row>, TableError>
where
    Raw: DeserializeOwned + Into<Row>,
    R: Read,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for result in csv_reader.deserialize::<Raw>() {
        let raw = result.map_err(|source| TableError::Csv { table, source })?;
        rows.push(raw.into());
    }
    Ok(rows)
}

fn table_path(dir: &Path, table: &str) -> PathBuf {
    dir.join(format!("{}.csv", table))
}

fn load_table<Raw, Row>(dir: &Path, table: &'static str) -> Result<Vec<Row>, TableError>
where
    Raw: DeserializeOwned + Into<Row>,
{
    let path = table_path(dir, table);
    let file = File::open(&path).map_err(|source| TableError::Io { table, path, source })?;
    read_rows::<Raw, Row, _>(file, table)
}

/// Load every table from a directory
///
/// `addons.csv` is optional; all other files are required.
pub fn load_from(dir: &Path) -> Result<TableBundle, TableError> {
    let addons = if table_path(dir, "addons").exists() {
        Some(load_table::<RawAddOn, AddOn>(dir, "addons")?)
    } else {
        None
    };

    let bundle = TableBundle {
        products: load_table::<RawProduct, Product>(dir, "products")?,
        rates_health: load_table::<RawHealthRate, HealthRate>(dir, "rates_health")?,
        rates_life: load_table::<RawLifeRate, LifeRate>(dir, "rates_life")?,
        bmi_buckets: load_table::<RawBmiBucket, BmiBucketRow>(dir, "bmi_buckets")?,
        loadings: load_table::<RawLoading, LoadingRule>(dir, "loadings")?,
        discounts: load_table::<RawDiscount, DiscountRule>(dir, "discounts")?,
        family_multipliers: load_table::<RawFamilyMultiplier, FamilyMultiplier>(dir, "family_multipliers")?,
        conditions: load_table::<RawCondition, ConditionRow>(dir, "conditions")?,
        occupation_risk: load_table::<RawOccupationRisk, OccupationRiskRow>(dir, "occupation_risk")?,
        city_tier: load_table::<RawCityTier, CityTierRow>(dir, "city_tier")?,
        addons,
    };

    info!(
        "Loaded {} products and {} rate rows from {}",
        bundle.products.len(),
        bundle.rates_health.len() + bundle.rates_life.len(),
        dir.display()
    );
    for issue in bundle.validate() {
        warn!("Table issue: {}", issue);
    }

    Ok(bundle)
}

/// Load tables from a directory, substituting the built-in dataset on any error
pub fn load_or_default(dir: &Path) -> TableBundle {
    match load_from(dir) {
        Ok(bundle) => bundle,
        Err(err) => {
            warn!("Using built-in tables: {}", err);
            TableBundle::default_bundle()
        }
    }
}
