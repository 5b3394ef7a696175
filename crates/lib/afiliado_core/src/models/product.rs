//! Product catalogue models.

use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

/// Marketplace a product is listed on.
///
/// Unknown stores are kept verbatim so a newer backend does not break
/// listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Store {
    Shopee,
    AliExpress,
    Amazon,
    MercadoLivre,
    Temu,
    Shein,
    Magalu,
    Other(String),
}

impl Store {
    pub fn as_str(&self) -> &str {
        match self {
            Store::Shopee => "shopee",
            Store::AliExpress => "aliexpress",
            Store::Amazon => "amazon",
            Store::MercadoLivre => "mercado_livre",
            Store::Temu => "temu",
            Store::Shein => "shein",
            Store::Magalu => "magalu",
            Store::Other(s) => s,
        }
    }
}

impl From<String> for Store {
    fn from(s: String) -> Self {
        match s.as_str() {
            "shopee" => Store::Shopee,
            "aliexpress" => Store::AliExpress,
            "amazon" => Store::Amazon,
            "mercado_livre" => Store::MercadoLivre,
            "temu" => Store::Temu,
            "shein" => Store::Shein,
            "magalu" => Store::Magalu,
            _ => Store::Other(s),
        }
    }
}

impl From<&str> for Store {
    fn from(s: &str) -> Self {
        Store::from(s.to_string())
    }
}

impl From<Store> for String {
    fn from(store: Store) -> Self {
        match store {
            Store::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_true() -> bool {
    true
}

/// Nullable columns: `null` decodes like an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_true<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(true))
}

/// Accepts RFC 3339 timestamps and offset-less ones (read as UTC). A value
/// in neither form is dropped rather than failing the whole row.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(ts.with_timezone(&Utc)));
    }
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"));
    match naive {
        Ok(ts) => Ok(Some(ts.and_utc())),
        Err(e) => {
            debug!(value = %raw, error = %e, "ignoring unreadable timestamp");
            Ok(None)
        }
    }
}

/// Catalogue entry as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub store: Store,
    #[serde(default, deserialize_with = "null_as_default")]
    pub affiliate_link: String,
    pub current_price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_percentage: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default = "default_true", deserialize_with = "null_as_true")]
    pub is_active: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_featured: bool,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Partial product used as the body of create and update calls.
/// Unset fields are left out of the JSON entirely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<Store>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affiliate_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_percentage: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_featured: Option<bool>,
}

/// Query parameters for `GET /products`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilters {
    pub store: Option<Store>,
    pub category: Option<String>,
    pub search: Option<String>,
    pub is_active: Option<bool>,
}

impl ProductFilters {
    /// Encodes the non-empty filters as a URL query string (without `?`).
    ///
    /// Empty strings count as unset; `is_active` is sent whenever it is set,
    /// `false` included.
    pub fn to_query(&self) -> String {
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        if let Some(store) = self.store.as_ref().filter(|s| !s.as_str().is_empty()) {
            query.append_pair("store", store.as_str());
        }
        if let Some(category) = self.category.as_deref().filter(|c| !c.is_empty()) {
            query.append_pair("category", category);
        }
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            query.append_pair("search", search);
        }
        if let Some(active) = self.is_active {
            query.append_pair("is_active", if active { "true" } else { "false" });
        }
        query.finish()
    }
}

/// `GET /products` payload: the current envelope or the legacy bare array.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ProductList {
    Envelope {
        data: Vec<Product>,
        #[serde(default)]
        count: Option<u64>,
    },
    Bare(Vec<Product>),
}

impl ProductList {
    pub fn into_products(self) -> Vec<Product> {
        match self {
            ProductList::Envelope { data, .. } => data,
            ProductList::Bare(products) => products,
        }
    }
}
