use rocket::http::Status;
use rocket::request::{FromRequest, Outcome, Request};

use crate::jwt::claims::Claims;
use crate::jwt::jwt_helper::verify_token;
use crate::models::user::User;
use crate::repository::user_repository::UserRepository;

// Request guard carrying the verified claims. A missing or malformed header is
// Unauthenticated (401); a present-but-invalid token is Forbidden (403).
pub struct AuthToken(pub Claims);

pub fn bearer_token(header: &str) -> Option<&str> {
    header.strip_prefix("Bearer ")
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthToken {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let header = match request.headers().get_one("Authorization") {
            Some(header) => header,
            None => return Outcome::Error((Status::Unauthorized, ())),
        };

        let token = match bearer_token(header) {
            Some(token) => token,
            None => return Outcome::Error((Status::Unauthorized, ())),
        };

        match verify_token(token) {
            Ok(claims) => Outcome::Success(AuthToken(claims)),
            Err(_) => Outcome::Error((Status::Forbidden, ())),
        }
    }
}

// Capability check run before each role-restricted operation. Costs one extra
// users lookup: the role on the stored user decides, not the one in the token.
pub async fn require_role(
    claims: &Claims,
    user_repo: &UserRepository,
    role: &str,
) -> Result<User, Status> {
    match user_repo.find_user_by_email(&claims.sub).await {
        Ok(Some(user)) if user.has_role(role) => Ok(user),
        Ok(_) => Err(Status::Forbidden),
        Err(e) => {
            log::error!("role lookup failed for {}: {:?}", claims.sub, e);
            Err(Status::InternalServerError)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_scheme_is_required() {
        assert_eq!(bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(bearer_token("Basic dXNlcg=="), None);
        assert_eq!(bearer_token("abc.def.ghi"), None);
    }
}
