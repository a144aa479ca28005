use futures::stream::TryStreamExt;
use mongodb::bson::{self, doc, Binary, Bson, Document};
use mongodb::error::Result;
use mongodb::options::{FindOneAndUpdateOptions, ReturnDocument, UpdateOptions};
use mongodb::results::{DeleteResult, UpdateResult};
use mongodb::{Client, Collection};

use crate::models::booking::{Booker, Booking};
use crate::models::new_id;
use crate::models::product::Product;

pub struct BookingRepository {
    collection: Collection<Booking>,
}

// Update document for a reservation. $push appends the booker whether or not the
// booking document already exists; $setOnInsert captures the product snapshot only
// when this is the first reservation. Combined with an upsert on the product_id
// filter, two concurrent first-time reservations converge on one document holding
// both bookers instead of one overwriting the other.
fn reserve_update(product: &Product, booker: &Booker) -> Document {
    doc! {
        "$push": { "bookers": bson::to_bson(booker).unwrap_or(Bson::Null) },
        "$setOnInsert": {
            "id": new_id(),
            "product_id": product.id.clone(),
            "seller_email": product.seller_email.clone(),
            "seller_contact": product.phone.clone(),
            "product_name": product.name.clone(),
            "price": product.price,
            "image": product.image.clone(),
            "is_paid": false,
        }
    }
}

impl BookingRepository {
    pub fn new(client: &Client) -> Self {
        let db = client.database("secondhand");
        let collection = db.collection::<Booking>("bookings");
        BookingRepository { collection }
    }

    pub async fn reserve(&self, product: &Product, booker: &Booker) -> Result<UpdateResult> {
        let filter = doc! { "product_id": product.id.clone() };
        let options = UpdateOptions::builder().upsert(true).build();
        self.collection
            .update_one(filter, reserve_update(product, booker), options)
            .await
    }

    pub async fn get_bookings_for_buyer(&self, email: &str) -> Result<Vec<Booking>> {
        let filter = doc! { "bookers.booker_email": email };
        let mut cursor = self.collection.find(filter, None).await?;
        let mut bookings = Vec::new();
        while let Some(booking) = cursor.try_next().await? {
            bookings.push(booking);
        }
        Ok(bookings)
    }

    pub async fn find_booking_by_id(&self, booking_id: &Binary) -> Result<Option<Booking>> {
        let filter = doc! { "id": booking_id.clone() };
        self.collection.find_one(filter, None).await
    }

    pub async fn remove_booker(&self, product_id: &Binary, email: &str) -> Result<UpdateResult> {
        let filter = doc! { "product_id": product_id.clone() };
        let update = doc! { "$pull": { "bookers": { "booker_email": email } } };
        self.collection.update_one(filter, update, None).await
    }

    // An unpaid booking does not outlive its last booker. Paid bookings are the
    // sale record and are never deleted.
    pub async fn delete_if_empty(&self, product_id: &Binary) -> Result<DeleteResult> {
        let filter = doc! {
            "product_id": product_id.clone(),
            "bookers": { "$size": 0 },
            "is_paid": { "$ne": true },
        };
        self.collection.delete_one(filter, None).await
    }

    pub async fn mark_paid(&self, booking_id: &Binary, buyer_email: &str) -> Result<Option<Booking>> {
        let filter = doc! { "id": booking_id.clone() };
        let update = doc! { "$set": { "is_paid": true, "bought_by": buyer_email } };
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();
        self.collection.find_one_and_update(filter, update, options).await
    }

    pub async fn mark_seller_removed(&self, seller_email: &str) -> Result<UpdateResult> {
        let filter = doc! { "seller_email": seller_email };
        let update = doc! { "$set": { "seller_removed": true } };
        self.collection.update_many(filter, update, None).await
    }

    // Account-removal cleanup: pull the buyer out of every unpaid booking, then
    // drop unpaid bookings left without bookers.
    pub async fn remove_buyer_entries(&self, email: &str) -> Result<DeleteResult> {
        let filter = doc! {
            "is_paid": { "$ne": true },
            "bookers.booker_email": email,
        };
        let update = doc! { "$pull": { "bookers": { "booker_email": email } } };
        self.collection.update_many(filter, update, None).await?;

        let empty = doc! { "bookers": { "$size": 0 }, "is_paid": { "$ne": true } };
        self.collection.delete_many(empty, None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::product::{Product, ProductInput};

    fn sample_product() -> Product {
        Product::new(
            "seller@x.com".to_string(),
            "c1".to_string(),
            ProductInput {
                name: "Bike".to_string(),
                category_id: "c1".to_string(),
                price: 50,
                original_price: None,
                years_of_use: None,
                condition: None,
                location: None,
                phone: Some("555".to_string()),
                description: None,
                image: Some("bike.png".to_string()),
            },
        )
    }

    fn sample_booker(email: &str) -> Booker {
        Booker {
            booker_name: "A".to_string(),
            booker_email: email.to_string(),
            booker_location: None,
            booker_number: None,
        }
    }

    #[test]
    fn reserve_update_pushes_the_booker_unconditionally() {
        let update = reserve_update(&sample_product(), &sample_booker("a@x.com"));
        let pushed = update
            .get_document("$push")
            .unwrap()
            .get_document("bookers")
            .unwrap();
        assert_eq!(pushed.get_str("booker_email").unwrap(), "a@x.com");
    }

    #[test]
    fn reserve_update_snapshots_the_product_only_on_insert() {
        let product = sample_product();
        let update = reserve_update(&product, &sample_booker("a@x.com"));
        let on_insert = update.get_document("$setOnInsert").unwrap();

        assert_eq!(on_insert.get_str("product_name").unwrap(), "Bike");
        assert_eq!(on_insert.get_i32("price").unwrap(), 50);
        assert_eq!(on_insert.get_str("seller_email").unwrap(), "seller@x.com");
        assert_eq!(on_insert.get_str("seller_contact").unwrap(), "555");
        assert_eq!(on_insert.get_str("image").unwrap(), "bike.png");
        assert!(!on_insert.get_bool("is_paid").unwrap());
        // bookers must stay out of $setOnInsert or the $push would conflict
        assert!(on_insert.get("bookers").is_none());
    }
}
