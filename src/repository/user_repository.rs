use futures::stream::TryStreamExt;
use mongodb::bson::doc;
use mongodb::error::Result;
use mongodb::options::UpdateOptions;
use mongodb::results::{DeleteResult, UpdateResult};
use mongodb::{Client, Collection};

use crate::models::user::User;

pub struct UserRepository {
    collection: Collection<User>,
}

impl UserRepository {
    pub fn new(client: &Client) -> Self {
        let db = client.database("secondhand");
        let collection = db.collection::<User>("users");
        UserRepository { collection }
    }

    // Create-if-absent / update-if-present in a single conditional write keyed on
    // email. The role is fixed at creation; a later upsert only refreshes the
    // profile fields.
    pub async fn upsert_user(&self, user: &User) -> Result<UpdateResult> {
        let filter = doc! { "email": user.email.clone() };
        let update = doc! {
            "$set": {
                "name": user.name.clone(),
                "phone": user.phone.clone(),
            },
            "$setOnInsert": {
                "email": user.email.clone(),
                "role": user.role.as_deref().unwrap_or("buyer"),
                "is_verified": false,
            }
        };
        let options = UpdateOptions::builder().upsert(true).build();
        self.collection.update_one(filter, update, options).await
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let filter = doc! { "email": email };
        self.collection.find_one(filter, None).await
    }

    pub async fn get_users_by_role(&self, role: &str) -> Result<Vec<User>> {
        let mut cursor = self.collection.find(doc! { "role": role }, None).await?;
        let mut users = Vec::new();
        while let Some(user) = cursor.try_next().await? {
            users.push(user);
        }
        Ok(users)
    }

    pub async fn verify_seller(&self, email: &str) -> Result<UpdateResult> {
        let filter = doc! { "email": email };
        let update = doc! { "$set": { "is_verified": true } };
        let options = UpdateOptions::builder().upsert(true).build();
        self.collection.update_one(filter, update, options).await
    }

    pub async fn delete_user(&self, email: &str) -> Result<DeleteResult> {
        self.collection.delete_one(doc! { "email": email }, None).await
    }
}
