use jsonwebtoken::{
    decode, encode, errors::Result as JwtResult, DecodingKey, EncodingKey, Header, Validation,
};
use std::env;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::jwt::claims::Claims;

const DEV_SECRET: &str = "secondhand_dev_secret";
const TOKEN_TTL_SECS: u64 = 60 * 60 * 24; // 1 day

fn secret() -> Vec<u8> {
    env::var("JWT_SECRET")
        .unwrap_or_else(|_| DEV_SECRET.to_string())
        .into_bytes()
}

pub fn create_token(email: &str, role: &str) -> JwtResult<String> {
    let claims = Claims {
        sub: email.to_string(),
        role: role.to_string(),
        exp: (SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs() + TOKEN_TTL_SECS)
            as usize,
    };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(&secret()))
}

pub fn verify_token(token: &str) -> Result<Claims, String> {
    decode::<Claims>(token, &DecodingKey::from_secret(&secret()), &Validation::default())
        .map(|data| data.claims)
        .map_err(|_| "Invalid token".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trip_preserves_email_and_role() {
        let token = create_token("a@x.com", "seller").unwrap();
        let claims = verify_token(&token).unwrap();
        assert_eq!(claims.sub, "a@x.com");
        assert_eq!(claims.role, "seller");
    }

    #[test]
    fn garbage_and_tampered_tokens_are_rejected() {
        assert!(verify_token("not.a.token").is_err());

        let mut token = create_token("a@x.com", "buyer").unwrap();
        token.push('x');
        assert!(verify_token(&token).is_err());
    }
}
