use mongodb::bson::{doc, Binary};
use mongodb::error::Result;
use mongodb::results::InsertOneResult;
use mongodb::{Client, Collection};

use crate::models::payment::Payment;

pub struct PaymentRepository {
    collection: Collection<Payment>,
}

impl PaymentRepository {
    pub fn new(client: &Client) -> Self {
        let db = client.database("secondhand");
        let collection = db.collection::<Payment>("payments");
        PaymentRepository { collection }
    }

    pub async fn add_payment(&self, payment: &Payment) -> Result<InsertOneResult> {
        self.collection.insert_one(payment, None).await
    }

    // Duplicate guard for checkout retries: one payment per booking, ever.
    pub async fn find_payment_by_booking(&self, booking_id: &Binary) -> Result<Option<Payment>> {
        let filter = doc! { "booking_id": booking_id.clone() };
        self.collection.find_one(filter, None).await
    }
}
