use mongodb::bson::Binary;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Booker {
    pub booker_name: String,
    pub booker_email: String,
    pub booker_location: Option<String>,
    pub booker_number: Option<String>,
}

// One document per unsold product. Product fields are snapshots taken at the first
// reservation; later product edits do not flow back into the booking.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Booking {
    pub id: Binary,
    pub product_id: Binary,
    pub seller_email: String,
    pub seller_contact: Option<String>,
    pub product_name: String,
    pub price: i32,
    pub image: Option<String>,
    pub is_paid: Option<bool>,
    pub bought_by: Option<String>,
    pub seller_removed: Option<bool>,
    #[serde(default)]
    pub bookers: Vec<Booker>,
}

impl Booking {
    // Projection handed to a buyer: only their own booker entries survive, the
    // shared product/seller fields and sale status stay untouched.
    pub fn own_entries(mut self, email: &str) -> Self {
        self.bookers.retain(|booker| booker.booker_email == email);
        self
    }
}

// Body of POST /bookings.
#[derive(Deserialize, Debug)]
pub struct ReserveRequest {
    pub product_id: Binary,
    pub booker_name: String,
    pub booker_email: String,
    pub booker_location: Option<String>,
    pub booker_number: Option<String>,
}

impl ReserveRequest {
    pub fn booker(&self) -> Booker {
        Booker {
            booker_name: self.booker_name.clone(),
            booker_email: self.booker_email.clone(),
            booker_location: self.booker_location.clone(),
            booker_number: self.booker_number.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::new_id;

    fn booker(email: &str) -> Booker {
        Booker {
            booker_name: email.to_string(),
            booker_email: email.to_string(),
            booker_location: Some("here".to_string()),
            booker_number: None,
        }
    }

    #[test]
    fn own_entries_strips_other_buyers() {
        let booking = Booking {
            id: new_id(),
            product_id: new_id(),
            seller_email: "seller@x.com".to_string(),
            seller_contact: None,
            product_name: "Bike".to_string(),
            price: 50,
            image: None,
            is_paid: Some(true),
            bought_by: Some("a@x.com".to_string()),
            seller_removed: None,
            bookers: vec![booker("a@x.com"), booker("b@x.com")],
        };

        let projected = booking.own_entries("b@x.com");
        assert_eq!(projected.bookers.len(), 1);
        assert_eq!(projected.bookers[0].booker_email, "b@x.com");
        // shared sale status stays visible to the other buyer
        assert_eq!(projected.is_paid, Some(true));
        assert_eq!(projected.product_name, "Bike");
    }

    #[test]
    fn own_entries_on_a_foreign_booking_is_empty() {
        let booking = Booking {
            id: new_id(),
            product_id: new_id(),
            seller_email: "seller@x.com".to_string(),
            seller_contact: None,
            product_name: "Bike".to_string(),
            price: 50,
            image: None,
            is_paid: None,
            bought_by: None,
            seller_removed: None,
            bookers: vec![booker("a@x.com")],
        };
        assert!(booking.own_entries("c@x.com").bookers.is_empty());
    }
}
