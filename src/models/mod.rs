pub mod booking;
pub mod category;
pub mod payment;
pub mod product;
pub mod report;
pub mod user;

use mongodb::bson::{spec::BinarySubtype, Binary};
use uuid::Uuid;

pub fn new_id() -> Binary {
    Binary {
        subtype: BinarySubtype::Uuid,
        bytes: Uuid::new_v4().as_bytes().to_vec(),
    }
}

// Path parameters carry the hyphenated UUID form of a Binary id.
pub fn id_binary(value: &str) -> Option<Binary> {
    Uuid::parse_str(value).ok().map(|uuid| Binary {
        subtype: BinarySubtype::Uuid,
        bytes: uuid.as_bytes().to_vec(),
    })
}

pub fn id_string(id: &Binary) -> String {
    Uuid::from_slice(&id.bytes)
        .map(|uuid| uuid.to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_round_trips_through_its_string_form() {
        let id = new_id();
        let parsed = id_binary(&id_string(&id)).unwrap();
        assert_eq!(parsed.bytes, id.bytes);
        assert_eq!(parsed.subtype, BinarySubtype::Uuid);
    }

    #[test]
    fn malformed_path_id_is_rejected() {
        assert!(id_binary("not-a-uuid").is_none());
        assert!(id_binary("").is_none());
    }
}
