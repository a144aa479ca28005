use futures::stream::TryStreamExt;
use mongodb::bson::{doc, Binary};
use mongodb::error::Result;
use mongodb::options::UpdateOptions;
use mongodb::results::{DeleteResult, UpdateResult};
use mongodb::{Client, Collection};

use crate::models::product::Product;

pub struct ProductRepository {
    collection: Collection<Product>,
}

impl ProductRepository {
    pub fn new(client: &Client) -> Self {
        let db = client.database("secondhand");
        let collection = db.collection::<Product>("products");
        ProductRepository { collection }
    }

    pub async fn add_product(&self, product: &Product) -> Result<()> {
        self.collection.insert_one(product, None).await.map(|_| ())
    }

    pub async fn find_product_by_id(&self, product_id: &Binary) -> Result<Option<Product>> {
        let filter = doc! { "id": product_id.clone() };
        self.collection.find_one(filter, None).await
    }

    pub async fn get_products_by_seller(&self, email: &str) -> Result<Vec<Product>> {
        let mut cursor = self.collection.find(doc! { "seller_email": email }, None).await?;
        let mut products = Vec::new();
        while let Some(product) = cursor.try_next().await? {
            products.push(product);
        }
        Ok(products)
    }

    pub async fn get_products_by_category(&self, category_id: &str) -> Result<Vec<Product>> {
        let mut cursor = self.collection.find(doc! { "category_id": category_id }, None).await?;
        let mut products = Vec::new();
        while let Some(product) = cursor.try_next().await? {
            products.push(product);
        }
        Ok(products)
    }

    pub async fn get_advertised_products(&self) -> Result<Vec<Product>> {
        let mut cursor = self.collection.find(doc! { "is_advertised": true }, None).await?;
        let mut products = Vec::new();
        while let Some(product) = cursor.try_next().await? {
            products.push(product);
        }
        Ok(products)
    }

    // Flag set, not a create: the upsert absorbs a momentarily missing row.
    pub async fn set_advertised(&self, product_id: &Binary) -> Result<UpdateResult> {
        let filter = doc! { "id": product_id.clone() };
        let update = doc! { "$set": { "is_advertised": true } };
        let options = UpdateOptions::builder().upsert(true).build();
        self.collection.update_one(filter, update, options).await
    }

    pub async fn delete_product(&self, product_id: &Binary) -> Result<DeleteResult> {
        let filter = doc! { "id": product_id.clone() };
        self.collection.delete_one(filter, None).await
    }

    pub async fn delete_products_by_seller(&self, email: &str) -> Result<DeleteResult> {
        let filter = doc! { "seller_email": email };
        self.collection.delete_many(filter, None).await
    }
}
