use mongodb::bson::Binary;
use serde::{Deserialize, Serialize};

// Append-only sale record. product_id and booking_id are historical references;
// the product document is gone by the time this row exists.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Payment {
    pub email: String,
    pub product_id: Binary,
    pub booking_id: Binary,
    pub amount: i32,
    pub transaction_id: String,
}
