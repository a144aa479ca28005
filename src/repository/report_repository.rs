use futures::stream::TryStreamExt;
use mongodb::bson::{doc, Binary};
use mongodb::error::Result;
use mongodb::results::DeleteResult;
use mongodb::{Client, Collection};

use crate::models::report::ReportedProduct;

pub struct ReportRepository {
    collection: Collection<ReportedProduct>,
}

impl ReportRepository {
    pub fn new(client: &Client) -> Self {
        let db = client.database("secondhand");
        let collection = db.collection::<ReportedProduct>("reported_products");
        ReportRepository { collection }
    }

    // No dedup: reporting the same product twice produces two records.
    pub async fn add_report(&self, report: &ReportedProduct) -> Result<()> {
        self.collection.insert_one(report, None).await.map(|_| ())
    }

    pub async fn get_reported_ids(&self) -> Result<Vec<Binary>> {
        let mut cursor = self.collection.find(None, None).await?;
        let mut ids = Vec::new();
        while let Some(report) = cursor.try_next().await? {
            ids.push(report.reported_product_id);
        }
        Ok(ids)
    }

    pub async fn delete_reports_for_product(&self, product_id: &Binary) -> Result<DeleteResult> {
        let filter = doc! { "reported_product_id": product_id.clone() };
        self.collection.delete_many(filter, None).await
    }
}
