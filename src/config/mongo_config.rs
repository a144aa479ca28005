use mongodb::{options::ClientOptions, Client};
use std::env;

pub async fn setup_mongo() -> Client {
    let mongo_uri =
        env::var("MONGODB_URI").unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
    let mut client_options = ClientOptions::parse(&mongo_uri).await.unwrap();
    client_options.app_name = Some("secondhand-backend".to_string());
    Client::with_options(client_options).unwrap()
}
