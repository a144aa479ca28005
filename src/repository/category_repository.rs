use futures::stream::TryStreamExt;
use mongodb::bson::doc;
use mongodb::error::Result;
use mongodb::{Client, Collection};

use crate::models::category::Category;

pub struct CategoryRepository {
    collection: Collection<Category>,
}

impl CategoryRepository {
    pub fn new(client: &Client) -> Self {
        let db = client.database("secondhand");
        let collection = db.collection::<Category>("categories");
        CategoryRepository { collection }
    }

    pub async fn get_all_categories(&self) -> Result<Vec<Category>> {
        let mut cursor = self.collection.find(None, None).await?;
        let mut categories = Vec::new();
        while let Some(category) = cursor.try_next().await? {
            categories.push(category);
        }
        Ok(categories)
    }

    // Accepts the identity key or the display name; products always store the
    // canonical id.
    pub async fn resolve_category(&self, value: &str) -> Result<Option<Category>> {
        let filter = doc! { "$or": [ { "id": value }, { "name": value } ] };
        self.collection.find_one(filter, None).await
    }
}
