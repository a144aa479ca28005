use serde::{Deserialize, Serialize};
use std::env;

const PAYMENT_INTENTS_URL: &str = "https://api.stripe.com/v1/payment_intents";

#[derive(Serialize, Deserialize, Debug)]
pub struct PaymentIntent {
    pub client_secret: String,
}

// The gateway charges in minor currency units.
pub fn amount_in_minor_units(price: i32) -> i64 {
    i64::from(price) * 100
}

pub async fn create_payment_intent(price: i32) -> Result<PaymentIntent, reqwest::Error> {
    let secret_key = env::var("PAYMENT_SECRET_KEY").unwrap_or_default();
    let params = [
        ("amount", amount_in_minor_units(price).to_string()),
        ("currency", "usd".to_string()),
        ("payment_method_types[]", "card".to_string()),
    ];

    let client = reqwest::Client::new();
    let response = client
        .post(PAYMENT_INTENTS_URL)
        .bearer_auth(secret_key)
        .form(&params)
        .send()
        .await?
        .error_for_status()?;

    response.json::<PaymentIntent>().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prices_convert_to_minor_units() {
        assert_eq!(amount_in_minor_units(50), 5000);
        assert_eq!(amount_in_minor_units(0), 0);
        // near the i32 ceiling the conversion must not wrap
        assert_eq!(amount_in_minor_units(i32::MAX), i64::from(i32::MAX) * 100);
    }
}
