//! Marketplace entities and the read/write models built on top of them

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A student user; only the fields the directory reads
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
}

/// A registered student business
///
/// Businesses are never physically removed: deletion clears `is_active`.
/// An owner has at most one active business.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Business {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    pub location: String,
    pub contact_number: String,
    pub whatsapp_link: Option<String>,
    pub instagram_handle: Option<String>,
    pub logo_url: Option<String>,
    pub owner_id: Uuid,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Business {
    /// Materialize a validated registration for `owner_id`
    pub fn from_new(owner_id: Uuid, new: NewBusiness) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: new.name,
            description: new.description,
            category: new.category,
            location: new.location,
            contact_number: new.contact_number,
            whatsapp_link: new.whatsapp_link,
            instagram_handle: new.instagram_handle,
            logo_url: new.logo_url,
            owner_id,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update; absent fields keep their value
    pub fn apply(&mut self, patch: BusinessPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(location) = patch.location {
            self.location = location;
        }
        if let Some(contact_number) = patch.contact_number {
            self.contact_number = contact_number;
        }
        if patch.whatsapp_link.is_some() {
            self.whatsapp_link = patch.whatsapp_link;
        }
        if patch.instagram_handle.is_some() {
            self.instagram_handle = patch.instagram_handle;
        }
        if patch.logo_url.is_some() {
            self.logo_url = patch.logo_url;
        }
        self.updated_at = Utc::now();
    }

    #[cfg(test)]
    pub(crate) fn new_for_test(name: &str, description: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: description.to_string(),
            category: "General".to_string(),
            location: "Campus".to_string(),
            contact_number: "0240000000".to_string(),
            whatsapp_link: None,
            instagram_handle: None,
            logo_url: None,
            owner_id: Uuid::new_v4(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A product sold by exactly one business
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Product {
    pub id: Uuid,
    pub business_id: Uuid,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user's rating of a business
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Review {
    pub id: Uuid,
    pub business_id: Uuid,
    pub user_id: Uuid,
    /// 1 to 5
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// An order placed with a business
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Order {
    pub id: Uuid,
    pub business_id: Uuid,
    pub customer_id: Uuid,
    /// e.g. pending, completed, cancelled
    pub status: String,
    pub total_amount: f64,
    pub created_at: DateTime<Utc>,
}

/// One line of an order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: f64,
}

/// A business row annotated with its derived metrics
///
/// `average_rating` is `None` when the business has no reviews.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct BusinessSummary {
    #[serde(flatten)]
    #[cfg_attr(feature = "postgres", sqlx(flatten))]
    pub business: Business,
    pub product_count: i64,
    pub average_rating: Option<f64>,
    pub review_count: i64,
    pub owner_first_name: Option<String>,
    pub owner_last_name: Option<String>,
}

/// A review together with its author's display name
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct ReviewWithAuthor {
    #[serde(flatten)]
    #[cfg_attr(feature = "postgres", sqlx(flatten))]
    pub review: Review,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

/// Full view of one business
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BusinessDetail {
    #[serde(flatten)]
    pub summary: BusinessSummary,
    /// Available products only, newest first
    pub products: Vec<Product>,
    /// Most recent reviews, newest first
    pub reviews: Vec<ReviewWithAuthor>,
}

/// Payload for registering a business
///
/// Missing fields deserialize as empty and are then reported by validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct NewBusiness {
    #[validate(length(min = 1, max = 255, message = "name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    #[validate(length(min = 1, max = 100, message = "category is required"))]
    pub category: String,
    #[validate(length(min = 1, max = 255, message = "location is required"))]
    pub location: String,
    #[validate(length(min = 1, max = 20, message = "contact_number is required"))]
    pub contact_number: String,
    #[validate(url(message = "whatsapp_link must be a URL"))]
    pub whatsapp_link: Option<String>,
    pub instagram_handle: Option<String>,
    #[validate(url(message = "logo_url must be a URL"))]
    pub logo_url: Option<String>,
}

/// Partial update of a business
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct BusinessPatch {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(length(min = 1))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub category: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub location: Option<String>,
    #[validate(length(min = 1, max = 20))]
    pub contact_number: Option<String>,
    #[validate(url)]
    pub whatsapp_link: Option<String>,
    pub instagram_handle: Option<String>,
    #[validate(url)]
    pub logo_url: Option<String>,
}
