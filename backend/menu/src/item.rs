//! # Items
//!
//! One row of the hosted menu table.
//!
//! ## Columns
//! - `id`: numeric primary key, assigned by the store
//! - `name`, `description`, `category`: text
//! - `price`: non-negative number, displayed in L.L.
//! - `image_url`: public URL from object storage, optional
//! - `item_order`: position inside the category, `1..N`
//! - `category_order`: position of the category, `1..C`, shared by every item of the category
//!
//! Rows created before ordering existed carry `null` orders. Those read as `0`
//! and sort ahead of everything else until the next renumbering.
use serde::{Deserialize, Deserializer, Serialize, de::Error as _};
use serde_json::Value;

pub type ItemId = u64;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    pub category: String,
    #[serde(deserialize_with = "number_or_string")]
    pub price: f64,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub item_order: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category_order: u32,
}

/// Body of `POST /api/items`. Orders are assigned by the server.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NewItem {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    pub category: String,
    #[serde(deserialize_with = "number_or_string")]
    pub price: f64,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Body of `PUT /api/items/{id}`. Absent fields are left untouched.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ItemPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "optional_number_or_string"
    )]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_order: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_order: Option<u32>,
}

impl ItemPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply_to(&self, item: &mut Item) {
        if let Some(name) = &self.name {
            item.name = name.clone();
        }
        if let Some(description) = &self.description {
            item.description = description.clone();
        }
        if let Some(category) = &self.category {
            item.category = category.clone();
        }
        if let Some(price) = self.price {
            item.price = price;
        }
        if let Some(image_url) = &self.image_url {
            item.image_url = Some(image_url.clone());
        }
        if let Some(item_order) = self.item_order {
            item.item_order = item_order;
        }
        if let Some(category_order) = self.category_order {
            item.category_order = category_order;
        }
    }
}

/// One entry of a reorder batch, as persisted.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderUpdate {
    pub id: ItemId,
    pub item_order: u32,
    pub category_order: u32,
}

impl From<&Item> for OrderUpdate {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id,
            item_order: item.item_order,
            category_order: item.category_order,
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// the admin form posts its inputs as text, the table returns numbers
fn number_or_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;

    price_from_value(&value).ok_or_else(|| D::Error::custom(format!("invalid price: {value}")))
}

fn optional_number_or_string<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        value => price_from_value(&value)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("invalid price: {value}"))),
    }
}

fn price_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}
