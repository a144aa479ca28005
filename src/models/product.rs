use chrono::Utc;
use mongodb::bson::Binary;
use serde::{Deserialize, Serialize};

use crate::models::new_id;
use crate::models::user::User;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Product {
    pub id: Binary, // UUID as BSON binary
    pub seller_email: String,
    pub category_id: String,
    pub name: String,
    pub price: i32,
    pub original_price: Option<i32>,
    pub years_of_use: Option<i32>,
    pub condition: Option<String>,
    pub location: Option<String>,
    pub phone: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub is_advertised: Option<bool>,
    pub posted_at: Option<String>,
}

// Body of POST /products; the server assigns id, seller and timestamp.
#[derive(Deserialize, Debug)]
pub struct ProductInput {
    pub name: String,
    pub category_id: String,
    pub price: i32,
    pub original_price: Option<i32>,
    pub years_of_use: Option<i32>,
    pub condition: Option<String>,
    pub location: Option<String>,
    pub phone: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
}

impl Product {
    pub fn new(seller_email: String, category_id: String, input: ProductInput) -> Self {
        Product {
            id: new_id(),
            seller_email,
            category_id,
            name: input.name,
            price: input.price,
            original_price: input.original_price,
            years_of_use: input.years_of_use,
            condition: input.condition,
            location: input.location,
            phone: input.phone,
            description: input.description,
            image: input.image,
            is_advertised: Some(false),
            posted_at: Some(Utc::now().to_rfc3339()),
        }
    }
}

// Listing projection joined with the seller's user record. The seller's email is
// deliberately absent from this shape.
#[derive(Serialize, Debug)]
pub struct ProductView {
    pub id: Binary,
    pub category_id: String,
    pub name: String,
    pub price: i32,
    pub original_price: Option<i32>,
    pub years_of_use: Option<i32>,
    pub condition: Option<String>,
    pub location: Option<String>,
    pub phone: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub is_advertised: Option<bool>,
    pub posted_at: Option<String>,
    pub seller_name: Option<String>,
    pub seller_verified: bool,
}

impl ProductView {
    pub fn from_product(product: Product, seller: Option<&User>) -> Self {
        ProductView {
            id: product.id,
            category_id: product.category_id,
            name: product.name,
            price: product.price,
            original_price: product.original_price,
            years_of_use: product.years_of_use,
            condition: product.condition,
            location: product.location,
            phone: product.phone,
            description: product.description,
            image: product.image,
            is_advertised: product.is_advertised,
            posted_at: product.posted_at,
            seller_name: seller.and_then(|user| user.name.clone()),
            seller_verified: seller.and_then(|user| user.is_verified).unwrap_or(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_product() -> Product {
        Product::new(
            "seller@x.com".to_string(),
            "c1".to_string(),
            ProductInput {
                name: "Bike".to_string(),
                category_id: "c1".to_string(),
                price: 50,
                original_price: Some(120),
                years_of_use: Some(2),
                condition: Some("good".to_string()),
                location: None,
                phone: None,
                description: None,
                image: None,
            },
        )
    }

    #[test]
    fn new_product_starts_unadvertised() {
        let product = sample_product();
        assert_eq!(product.is_advertised, Some(false));
        assert_eq!(product.category_id, "c1");
        assert!(product.posted_at.is_some());
    }

    #[test]
    fn seller_join_never_exposes_the_seller_email() {
        let seller = User {
            email: "seller@x.com".to_string(),
            name: Some("S".to_string()),
            role: Some("seller".to_string()),
            is_verified: Some(true),
            phone: None,
        };
        let view = ProductView::from_product(sample_product(), Some(&seller));
        assert_eq!(view.seller_name.as_deref(), Some("S"));
        assert!(view.seller_verified);

        let json = serde_json::to_value(&view).unwrap();
        let keys = json.as_object().unwrap();
        assert!(!keys.contains_key("seller_email"));
        assert!(!keys.contains_key("email"));
    }

    #[test]
    fn missing_seller_record_degrades_to_unverified() {
        let view = ProductView::from_product(sample_product(), None);
        assert!(view.seller_name.is_none());
        assert!(!view.seller_verified);
    }
}
