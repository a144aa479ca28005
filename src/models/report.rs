use mongodb::bson::Binary;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ReportedProduct {
    pub reported_product_id: Binary,
}
