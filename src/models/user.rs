use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct User {
    pub email: String, // join key across all collections
    pub name: Option<String>,
    pub role: Option<String>, // "buyer" | "seller" | "admin"
    pub is_verified: Option<bool>,
    pub phone: Option<String>,
}

impl User {
    pub fn has_role(&self, role: &str) -> bool {
        self.role.as_deref() == Some(role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_check_matches_stored_role_only() {
        let user = User {
            email: "a@x.com".to_string(),
            name: None,
            role: Some("seller".to_string()),
            is_verified: None,
            phone: None,
        };
        assert!(user.has_role("seller"));
        assert!(!user.has_role("admin"));

        let no_role = User { role: None, ..user };
        assert!(!no_role.has_role("buyer"));
    }
}
