use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,  // user email
    pub role: String, // role at issuance; authorization re-checks the stored user
    pub exp: usize,
}
