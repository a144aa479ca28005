#[macro_use]
extern crate rocket;

mod config;
mod jwt;
mod models;
mod repository;
mod services;

use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::{Header, Status};
use rocket::serde::json::Json;
use rocket::{Request, Response, State};
use serde::{Deserialize, Serialize};

use config::mongo_config::setup_mongo;
use models::booking::{Booking, ReserveRequest};
use models::category::Category;
use models::payment::Payment;
use models::product::{Product, ProductInput, ProductView};
use models::report::ReportedProduct;
use models::user::User;
use models::{id_binary, id_string};
use repository::booking_repository::BookingRepository;
use repository::category_repository::CategoryRepository;
use repository::payment_repository::PaymentRepository;
use repository::product_repository::ProductRepository;
use repository::report_repository::ReportRepository;
use repository::user_repository::UserRepository;
use services::auth_guard::{require_role, AuthToken};
use services::payment_service::{self, PaymentIntent};

// CORS fairing
pub struct CORS;

#[rocket::async_trait]
impl Fairing for CORS {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "POST, GET, PUT, DELETE, OPTIONS",
        ));
        response.set_header(Header::new(
            "Access-Control-Allow-Headers",
            "Content-Type, Authorization",
        ));
    }
}

#[options("/<_..>")]
fn all_options() -> Status {
    Status::Ok
}

// API response schema
#[derive(Serialize, Deserialize, Debug)]
pub struct ApiResponse<T> {
    pub message: String,
    pub result: Option<T>,
}

fn rejection<T>(status: Status) -> (Status, Json<ApiResponse<T>>) {
    (
        status,
        Json(ApiResponse {
            message: format!("{}: {}", status.code, status.reason_lossy()),
            result: None,
        }),
    )
}

#[get("/")]
fn index() -> &'static str {
    "secondhand server running"
}

#[put("/users/<email>", format = "json", data = "<user>")]
async fn upsert_user(
    email: &str,
    user: Json<User>,
    user_repo: &State<UserRepository>,
) -> (Status, Json<ApiResponse<String>>) {
    let mut user = user.into_inner();
    user.email = email.to_string();

    match user_repo.upsert_user(&user).await {
        Ok(outcome) if outcome.upserted_id.is_some() => (
            Status::Created,
            Json(ApiResponse {
                message: "201: Created".to_string(),
                result: None,
            }),
        ),
        Ok(_) => (
            Status::Ok,
            Json(ApiResponse {
                message: "200: Success".to_string(),
                result: None,
            }),
        ),
        Err(e) => {
            log::error!("user upsert failed for {}: {:?}", email, e);
            rejection(Status::InternalServerError)
        }
    }
}

#[get("/jwt?<email>")]
async fn get_token(
    email: &str,
    user_repo: &State<UserRepository>,
) -> (Status, Json<ApiResponse<String>>) {
    match user_repo.find_user_by_email(email).await {
        Ok(Some(user)) => {
            let role = user.role.clone().unwrap_or_else(|| "buyer".to_string());
            match jwt::jwt_helper::create_token(&user.email, &role) {
                Ok(token) => (
                    Status::Ok,
                    Json(ApiResponse {
                        message: "200: Success".to_string(),
                        result: Some(token),
                    }),
                ),
                Err(e) => {
                    log::error!("token mint failed for {}: {:?}", email, e);
                    rejection(Status::InternalServerError)
                }
            }
        }
        // no such user: empty credential
        Ok(None) => (
            Status::Forbidden,
            Json(ApiResponse {
                message: "403: Forbidden".to_string(),
                result: Some(String::new()),
            }),
        ),
        Err(e) => {
            log::error!("user lookup failed for {}: {:?}", email, e);
            rejection(Status::InternalServerError)
        }
    }
}

#[get("/users/sellers")]
async fn get_sellers(
    token: AuthToken,
    user_repo: &State<UserRepository>,
) -> (Status, Json<ApiResponse<Vec<User>>>) {
    if let Err(status) = require_role(&token.0, user_repo.inner(), "admin").await {
        return rejection(status);
    }

    match user_repo.get_users_by_role("seller").await {
        Ok(sellers) => (
            Status::Ok,
            Json(ApiResponse {
                message: "200: Success".to_string(),
                result: Some(sellers),
            }),
        ),
        Err(e) => {
            log::error!("seller listing failed: {:?}", e);
            rejection(Status::InternalServerError)
        }
    }
}

#[get("/users/buyers")]
async fn get_buyers(
    token: AuthToken,
    user_repo: &State<UserRepository>,
) -> (Status, Json<ApiResponse<Vec<User>>>) {
    if let Err(status) = require_role(&token.0, user_repo.inner(), "admin").await {
        return rejection(status);
    }

    match user_repo.get_users_by_role("buyer").await {
        Ok(buyers) => (
            Status::Ok,
            Json(ApiResponse {
                message: "200: Success".to_string(),
                result: Some(buyers),
            }),
        ),
        Err(e) => {
            log::error!("buyer listing failed: {:?}", e);
            rejection(Status::InternalServerError)
        }
    }
}

#[put("/users/sellers/verify?<email>")]
async fn verify_seller(
    token: AuthToken,
    email: &str,
    user_repo: &State<UserRepository>,
) -> (Status, Json<ApiResponse<String>>) {
    if let Err(status) = require_role(&token.0, user_repo.inner(), "admin").await {
        return rejection(status);
    }

    match user_repo.verify_seller(email).await {
        Ok(_) => (
            Status::Ok,
            Json(ApiResponse {
                message: "200: Success".to_string(),
                result: None,
            }),
        ),
        Err(e) => {
            log::error!("seller verification failed for {}: {:?}", email, e);
            rejection(Status::InternalServerError)
        }
    }
}

#[delete("/users/buyers/<email>")]
async fn remove_buyer(
    token: AuthToken,
    email: &str,
    user_repo: &State<UserRepository>,
    booking_repo: &State<BookingRepository>,
) -> (Status, Json<ApiResponse<String>>) {
    if let Err(status) = require_role(&token.0, user_repo.inner(), "admin").await {
        return rejection(status);
    }

    match user_repo.delete_user(email).await {
        Ok(outcome) => log::info!("removed buyer {} ({} document)", email, outcome.deleted_count),
        Err(e) => {
            log::error!("buyer removal failed for {}: {:?}", email, e);
            return rejection(Status::InternalServerError);
        }
    }

    // their reservations do not linger in unpaid bookings
    match booking_repo.remove_buyer_entries(email).await {
        Ok(dropped) => {
            log::info!(
                "pulled {} out of unpaid bookings, dropped {} empty booking(s)",
                email,
                dropped.deleted_count
            );
            (
                Status::Ok,
                Json(ApiResponse {
                    message: "200: Success".to_string(),
                    result: None,
                }),
            )
        }
        Err(e) => {
            log::error!("booking cleanup failed after removing {}: {:?}", email, e);
            rejection(Status::InternalServerError)
        }
    }
}

#[delete("/users/sellers/<email>")]
async fn remove_seller(
    token: AuthToken,
    email: &str,
    user_repo: &State<UserRepository>,
    product_repo: &State<ProductRepository>,
    booking_repo: &State<BookingRepository>,
) -> (Status, Json<ApiResponse<String>>) {
    if let Err(status) = require_role(&token.0, user_repo.inner(), "admin").await {
        return rejection(status);
    }

    // Products first, then bookings, then the account, so a crash mid-sequence
    // never leaves a user pointing at products that still look purchasable.
    match product_repo.delete_products_by_seller(email).await {
        Ok(outcome) => log::info!("removed {} product(s) owned by {}", outcome.deleted_count, email),
        Err(e) => {
            log::error!("product cascade failed for seller {}: {:?}", email, e);
            return rejection(Status::InternalServerError);
        }
    }

    match booking_repo.mark_seller_removed(email).await {
        Ok(outcome) => log::info!(
            "flagged {} booking(s) for removed seller {}",
            outcome.modified_count,
            email
        ),
        Err(e) => {
            log::error!("booking flagging failed for seller {}: {:?}", email, e);
            return rejection(Status::InternalServerError);
        }
    }

    match user_repo.delete_user(email).await {
        Ok(_) => (
            Status::Ok,
            Json(ApiResponse {
                message: "200: Success".to_string(),
                result: None,
            }),
        ),
        Err(e) => {
            log::error!("account removal failed for seller {}: {:?}", email, e);
            rejection(Status::InternalServerError)
        }
    }
}

#[get("/categories")]
async fn get_categories(category_repo: &State<CategoryRepository>) -> Json<ApiResponse<Vec<Category>>> {
    match category_repo.get_all_categories().await {
        Ok(categories) => Json(ApiResponse {
            message: "200: Success".to_string(),
            result: Some(categories),
        }),
        Err(e) => {
            log::error!("category listing failed: {:?}", e);
            Json(ApiResponse {
                message: "500: Internal Server Error".to_string(),
                result: None,
            })
        }
    }
}

// One users lookup per product; the seller's email never leaves the server.
async fn join_sellers(
    products: Vec<Product>,
    user_repo: &UserRepository,
) -> mongodb::error::Result<Vec<ProductView>> {
    let mut views = Vec::new();
    for product in products {
        let seller = user_repo.find_user_by_email(&product.seller_email).await?;
        views.push(ProductView::from_product(product, seller.as_ref()));
    }
    Ok(views)
}

// Plain variants keep the stored document shape; the seller-joined ones below are
// what public listing pages consume.
#[get("/products/category/<category_id>")]
async fn get_category_products_plain(
    category_id: &str,
    product_repo: &State<ProductRepository>,
) -> (Status, Json<ApiResponse<Vec<Product>>>) {
    match product_repo.get_products_by_category(category_id).await {
        Ok(products) => (
            Status::Ok,
            Json(ApiResponse {
                message: "200: Success".to_string(),
                result: Some(products),
            }),
        ),
        Err(e) => {
            log::error!("category {} listing failed: {:?}", category_id, e);
            rejection(Status::InternalServerError)
        }
    }
}

#[get("/products/advertised")]
async fn get_advertised_products_plain(
    product_repo: &State<ProductRepository>,
) -> (Status, Json<ApiResponse<Vec<Product>>>) {
    match product_repo.get_advertised_products().await {
        Ok(products) => (
            Status::Ok,
            Json(ApiResponse {
                message: "200: Success".to_string(),
                result: Some(products),
            }),
        ),
        Err(e) => {
            log::error!("advertised listing failed: {:?}", e);
            rejection(Status::InternalServerError)
        }
    }
}

#[get("/categories/<category_id>")]
async fn get_category_products(
    _token: AuthToken,
    category_id: &str,
    product_repo: &State<ProductRepository>,
    user_repo: &State<UserRepository>,
) -> (Status, Json<ApiResponse<Vec<ProductView>>>) {
    let products = match product_repo.get_products_by_category(category_id).await {
        Ok(products) => products,
        Err(e) => {
            log::error!("category {} listing failed: {:?}", category_id, e);
            return rejection(Status::InternalServerError);
        }
    };

    match join_sellers(products, user_repo.inner()).await {
        Ok(views) => (
            Status::Ok,
            Json(ApiResponse {
                message: "200: Success".to_string(),
                result: Some(views),
            }),
        ),
        Err(e) => {
            log::error!("seller join failed for category {}: {:?}", category_id, e);
            rejection(Status::InternalServerError)
        }
    }
}

#[get("/products/advertised/sellers")]
async fn get_advertised_products(
    product_repo: &State<ProductRepository>,
    user_repo: &State<UserRepository>,
) -> (Status, Json<ApiResponse<Vec<ProductView>>>) {
    let products = match product_repo.get_advertised_products().await {
        Ok(products) => products,
        Err(e) => {
            log::error!("advertised listing failed: {:?}", e);
            return rejection(Status::InternalServerError);
        }
    };

    match join_sellers(products, user_repo.inner()).await {
        Ok(views) => (
            Status::Ok,
            Json(ApiResponse {
                message: "200: Success".to_string(),
                result: Some(views),
            }),
        ),
        Err(e) => {
            log::error!("seller join failed for advertised listing: {:?}", e);
            rejection(Status::InternalServerError)
        }
    }
}

#[get("/products?<email>")]
async fn get_seller_products(
    token: AuthToken,
    email: &str,
    product_repo: &State<ProductRepository>,
    user_repo: &State<UserRepository>,
) -> (Status, Json<ApiResponse<Vec<Product>>>) {
    if token.0.sub != email {
        return rejection(Status::Forbidden);
    }
    if let Err(status) = require_role(&token.0, user_repo.inner(), "seller").await {
        return rejection(status);
    }

    match product_repo.get_products_by_seller(email).await {
        Ok(products) => (
            Status::Ok,
            Json(ApiResponse {
                message: "200: Success".to_string(),
                result: Some(products),
            }),
        ),
        Err(e) => {
            log::error!("seller listing failed for {}: {:?}", email, e);
            rejection(Status::InternalServerError)
        }
    }
}

#[post("/products", format = "json", data = "<input>")]
async fn create_product(
    token: AuthToken,
    input: Json<ProductInput>,
    product_repo: &State<ProductRepository>,
    category_repo: &State<CategoryRepository>,
    user_repo: &State<UserRepository>,
) -> (Status, Json<ApiResponse<String>>) {
    let seller = match require_role(&token.0, user_repo.inner(), "seller").await {
        Ok(user) => user,
        Err(status) => return rejection(status),
    };

    let input = input.into_inner();
    let category = match category_repo.resolve_category(&input.category_id).await {
        Ok(Some(category)) => category,
        Ok(None) => {
            return (
                Status::NotFound,
                Json(ApiResponse {
                    message: format!("404: Not Found - category {} does not exist", input.category_id),
                    result: None,
                }),
            )
        }
        Err(e) => {
            log::error!("category lookup failed: {:?}", e);
            return rejection(Status::InternalServerError);
        }
    };

    let product = Product::new(seller.email, category.id, input);
    let product_id = id_string(&product.id);
    match product_repo.add_product(&product).await {
        Ok(_) => (
            Status::Created,
            Json(ApiResponse {
                message: "201: Created".to_string(),
                result: Some(product_id),
            }),
        ),
        Err(e) => {
            log::error!("product insert failed: {:?}", e);
            rejection(Status::InternalServerError)
        }
    }
}

#[put("/products/advertise/<id>")]
async fn advertise_product(
    token: AuthToken,
    id: &str,
    product_repo: &State<ProductRepository>,
    user_repo: &State<UserRepository>,
) -> (Status, Json<ApiResponse<String>>) {
    if let Err(status) = require_role(&token.0, user_repo.inner(), "seller").await {
        return rejection(status);
    }

    let product_id = match id_binary(id) {
        Some(product_id) => product_id,
        None => {
            return (
                Status::BadRequest,
                Json(ApiResponse {
                    message: "400: Bad Request - malformed product id".to_string(),
                    result: None,
                }),
            )
        }
    };

    match product_repo.set_advertised(&product_id).await {
        Ok(_) => (
            Status::Ok,
            Json(ApiResponse {
                message: "200: Success".to_string(),
                result: None,
            }),
        ),
        Err(e) => {
            log::error!("advertising {} failed: {:?}", id, e);
            rejection(Status::InternalServerError)
        }
    }
}

#[delete("/products/<id>")]
async fn delete_product(
    token: AuthToken,
    id: &str,
    product_repo: &State<ProductRepository>,
    report_repo: &State<ReportRepository>,
    user_repo: &State<UserRepository>,
) -> (Status, Json<ApiResponse<String>>) {
    let product_id = match id_binary(id) {
        Some(product_id) => product_id,
        None => {
            return (
                Status::BadRequest,
                Json(ApiResponse {
                    message: "400: Bad Request - malformed product id".to_string(),
                    result: None,
                }),
            )
        }
    };

    // Only the owning seller or an admin may delete, checked before any write.
    let product = match product_repo.find_product_by_id(&product_id).await {
        Ok(Some(product)) => product,
        Ok(None) => {
            return (
                Status::NotFound,
                Json(ApiResponse {
                    message: format!("404: Not Found - product {} does not exist", id),
                    result: None,
                }),
            )
        }
        Err(e) => {
            log::error!("product lookup failed for {}: {:?}", id, e);
            return rejection(Status::InternalServerError);
        }
    };
    if product.seller_email != token.0.sub
        && require_role(&token.0, user_repo.inner(), "admin").await.is_err()
    {
        return rejection(Status::Forbidden);
    }

    match product_repo.delete_product(&product_id).await {
        Ok(outcome) => log::info!("deleted product {} ({} document)", id, outcome.deleted_count),
        Err(e) => {
            log::error!("product delete failed for {}: {:?}", id, e);
            return rejection(Status::InternalServerError);
        }
    }

    match report_repo.delete_reports_for_product(&product_id).await {
        Ok(reports) => {
            log::info!("dropped {} report(s) for product {}", reports.deleted_count, id);
            (
                Status::Ok,
                Json(ApiResponse {
                    message: "200: Success".to_string(),
                    result: None,
                }),
            )
        }
        Err(e) => {
            log::error!("report cleanup failed for product {}: {:?}", id, e);
            rejection(Status::InternalServerError)
        }
    }
}

#[post("/products/report/<id>")]
async fn report_product(
    _token: AuthToken,
    id: &str,
    report_repo: &State<ReportRepository>,
) -> (Status, Json<ApiResponse<String>>) {
    let reported_product_id = match id_binary(id) {
        Some(product_id) => product_id,
        None => {
            return (
                Status::BadRequest,
                Json(ApiResponse {
                    message: "400: Bad Request - malformed product id".to_string(),
                    result: None,
                }),
            )
        }
    };

    match report_repo.add_report(&ReportedProduct { reported_product_id }).await {
        Ok(_) => (
            Status::Created,
            Json(ApiResponse {
                message: "201: Created".to_string(),
                result: None,
            }),
        ),
        Err(e) => {
            log::error!("report insert failed for product {}: {:?}", id, e);
            rejection(Status::InternalServerError)
        }
    }
}

#[get("/products/reported")]
async fn get_reported_products(
    token: AuthToken,
    report_repo: &State<ReportRepository>,
    product_repo: &State<ProductRepository>,
    user_repo: &State<UserRepository>,
) -> (Status, Json<ApiResponse<Vec<Product>>>) {
    if let Err(status) = require_role(&token.0, user_repo.inner(), "admin").await {
        return rejection(status);
    }

    let ids = match report_repo.get_reported_ids().await {
        Ok(ids) => ids,
        Err(e) => {
            log::error!("report listing failed: {:?}", e);
            return rejection(Status::InternalServerError);
        }
    };

    // join against products; sold or deleted products drop out naturally
    let mut reported = Vec::new();
    for product_id in &ids {
        match product_repo.find_product_by_id(product_id).await {
            Ok(Some(product)) => reported.push(product),
            Ok(None) => {}
            Err(e) => {
                log::error!("reported-product join failed: {:?}", e);
                return rejection(Status::InternalServerError);
            }
        }
    }

    (
        Status::Ok,
        Json(ApiResponse {
            message: "200: Success".to_string(),
            result: Some(reported),
        }),
    )
}

#[post("/bookings", format = "json", data = "<request>")]
async fn reserve_product(
    token: AuthToken,
    request: Json<ReserveRequest>,
    booking_repo: &State<BookingRepository>,
    product_repo: &State<ProductRepository>,
) -> (Status, Json<ApiResponse<String>>) {
    let request = request.into_inner();
    if token.0.sub != request.booker_email {
        return rejection(Status::Forbidden);
    }

    // existence doubles as the availability check: sold products are gone
    let product = match product_repo.find_product_by_id(&request.product_id).await {
        Ok(Some(product)) => product,
        Ok(None) => {
            return (
                Status::NotFound,
                Json(ApiResponse {
                    message: "404: Not Found - product is no longer available".to_string(),
                    result: None,
                }),
            )
        }
        Err(e) => {
            log::error!("product lookup failed during reservation: {:?}", e);
            return rejection(Status::InternalServerError);
        }
    };

    match booking_repo.reserve(&product, &request.booker()).await {
        Ok(outcome) if outcome.upserted_id.is_some() => (
            Status::Created,
            Json(ApiResponse {
                message: "201: Created".to_string(),
                result: None,
            }),
        ),
        Ok(_) => (
            Status::Ok,
            Json(ApiResponse {
                message: "200: Success - added to the existing booking".to_string(),
                result: None,
            }),
        ),
        Err(e) => {
            log::error!(
                "reservation write failed for product {}: {:?}",
                id_string(&product.id),
                e
            );
            rejection(Status::InternalServerError)
        }
    }
}

#[get("/bookings?<email>")]
async fn get_bookings(
    token: AuthToken,
    email: &str,
    booking_repo: &State<BookingRepository>,
) -> (Status, Json<ApiResponse<Vec<Booking>>>) {
    if token.0.sub != email {
        return rejection(Status::Forbidden);
    }

    match booking_repo.get_bookings_for_buyer(email).await {
        Ok(bookings) => {
            let own = bookings
                .into_iter()
                .map(|booking| booking.own_entries(email))
                .collect::<Vec<_>>();
            (
                Status::Ok,
                Json(ApiResponse {
                    message: "200: Success".to_string(),
                    result: Some(own),
                }),
            )
        }
        Err(e) => {
            log::error!("booking listing failed for {}: {:?}", email, e);
            rejection(Status::InternalServerError)
        }
    }
}

#[get("/bookings/<id>")]
async fn get_booking(
    token: AuthToken,
    id: &str,
    booking_repo: &State<BookingRepository>,
) -> (Status, Json<ApiResponse<Booking>>) {
    let booking_id = match id_binary(id) {
        Some(booking_id) => booking_id,
        None => {
            return (
                Status::BadRequest,
                Json(ApiResponse {
                    message: "400: Bad Request - malformed booking id".to_string(),
                    result: None,
                }),
            )
        }
    };

    match booking_repo.find_booking_by_id(&booking_id).await {
        Ok(Some(booking)) => (
            Status::Ok,
            Json(ApiResponse {
                message: "200: Success".to_string(),
                // other buyers' contact data stays hidden here too
                result: Some(booking.own_entries(&token.0.sub)),
            }),
        ),
        Ok(None) => (
            Status::NotFound,
            Json(ApiResponse {
                message: format!("404: Not Found - booking {} does not exist", id),
                result: None,
            }),
        ),
        Err(e) => {
            log::error!("booking lookup failed for {}: {:?}", id, e);
            rejection(Status::InternalServerError)
        }
    }
}

#[delete("/bookings/<product_id>?<email>")]
async fn unreserve_product(
    token: AuthToken,
    product_id: &str,
    email: &str,
    booking_repo: &State<BookingRepository>,
) -> (Status, Json<ApiResponse<String>>) {
    if token.0.sub != email {
        return rejection(Status::Forbidden);
    }

    let id = match id_binary(product_id) {
        Some(id) => id,
        None => {
            return (
                Status::BadRequest,
                Json(ApiResponse {
                    message: "400: Bad Request - malformed product id".to_string(),
                    result: None,
                }),
            )
        }
    };

    match booking_repo.remove_booker(&id, email).await {
        Ok(outcome) => {
            log::info!(
                "removed {} from booking of product {} ({} entry)",
                email,
                product_id,
                outcome.modified_count
            );
            if let Err(e) = booking_repo.delete_if_empty(&id).await {
                log::warn!("empty-booking cleanup failed for product {}: {:?}", product_id, e);
            }
            (
                Status::Ok,
                Json(ApiResponse {
                    message: "200: Success".to_string(),
                    result: None,
                }),
            )
        }
        Err(e) => {
            log::error!("unreserve failed for product {}: {:?}", product_id, e);
            rejection(Status::InternalServerError)
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct PaymentIntentRequest {
    pub price: i32,
}

#[post("/payments/create-intent", format = "json", data = "<request>")]
async fn create_payment_intent(
    _token: AuthToken,
    request: Json<PaymentIntentRequest>,
) -> (Status, Json<ApiResponse<PaymentIntent>>) {
    match payment_service::create_payment_intent(request.price).await {
        Ok(intent) => (
            Status::Ok,
            Json(ApiResponse {
                message: "200: Success".to_string(),
                result: Some(intent),
            }),
        ),
        Err(e) => {
            log::error!("payment gateway call failed: {:?}", e);
            (
                Status::BadGateway,
                Json(ApiResponse {
                    message: "502: Bad Gateway - payment gateway unavailable".to_string(),
                    result: None,
                }),
            )
        }
    }
}

#[post("/payments", format = "json", data = "<payment>")]
async fn record_payment(
    token: AuthToken,
    payment: Json<Payment>,
    product_repo: &State<ProductRepository>,
    booking_repo: &State<BookingRepository>,
    payment_repo: &State<PaymentRepository>,
) -> (Status, Json<ApiResponse<Payment>>) {
    let payment = payment.into_inner();
    if token.0.sub != payment.email {
        return rejection(Status::Forbidden);
    }

    // retries must not record a second payment for the same booking
    match payment_repo.find_payment_by_booking(&payment.booking_id).await {
        Ok(Some(_)) => {
            return (
                Status::Conflict,
                Json(ApiResponse {
                    message: "409: Conflict - payment already recorded for this booking".to_string(),
                    result: None,
                }),
            )
        }
        Ok(None) => {}
        Err(e) => {
            log::error!("duplicate-payment check failed: {:?}", e);
            return rejection(Status::InternalServerError);
        }
    }

    // Fixed order: the product leaves the catalog first, then the booking flips to
    // paid, then the payment row lands. Earlier steps are not rolled back if a
    // later one fails; each outcome is logged.
    match product_repo.delete_product(&payment.product_id).await {
        Ok(outcome) if outcome.deleted_count == 1 => {
            log::info!("checkout: removed product {}", id_string(&payment.product_id))
        }
        Ok(_) => log::warn!(
            "checkout: product {} was already removed",
            id_string(&payment.product_id)
        ),
        Err(e) => {
            log::error!("checkout: product delete failed: {:?}", e);
            return rejection(Status::InternalServerError);
        }
    }

    match booking_repo.mark_paid(&payment.booking_id, &payment.email).await {
        Ok(Some(_)) => log::info!(
            "checkout: booking {} marked paid by {}",
            id_string(&payment.booking_id),
            payment.email
        ),
        Ok(None) => log::warn!(
            "checkout: booking {} not found while marking paid",
            id_string(&payment.booking_id)
        ),
        Err(e) => {
            log::error!("checkout: booking update failed: {:?}", e);
            return rejection(Status::InternalServerError);
        }
    }

    match payment_repo.add_payment(&payment).await {
        Ok(_) => (
            Status::Created,
            Json(ApiResponse {
                message: "201: Created".to_string(),
                result: Some(payment),
            }),
        ),
        Err(e) => {
            log::error!("checkout: payment insert failed: {:?}", e);
            rejection(Status::InternalServerError)
        }
    }
}

#[catch(401)]
fn unauthorized() -> Json<ApiResponse<String>> {
    Json(ApiResponse {
        message: "401: Unauthorized - missing or malformed credential".to_string(),
        result: None,
    })
}

#[catch(403)]
fn forbidden() -> Json<ApiResponse<String>> {
    Json(ApiResponse {
        message: "403: Forbidden".to_string(),
        result: None,
    })
}

#[catch(404)]
fn not_found(req: &Request) -> Json<ApiResponse<String>> {
    Json(ApiResponse {
        message: format!("404: '{}' route not found", req.uri()),
        result: None,
    })
}

#[launch]
async fn rocket() -> _ {
    dotenv::dotenv().ok();

    let client = setup_mongo().await;
    let user_repo = UserRepository::new(&client);
    let product_repo = ProductRepository::new(&client);
    let category_repo = CategoryRepository::new(&client);
    let booking_repo = BookingRepository::new(&client);
    let payment_repo = PaymentRepository::new(&client);
    let report_repo = ReportRepository::new(&client);

    rocket::build()
        .manage(user_repo)
        .manage(product_repo)
        .manage(category_repo)
        .manage(booking_repo)
        .manage(payment_repo)
        .manage(report_repo)
        .attach(CORS)
        .mount(
            "/",
            routes![
                index,
                all_options,
                upsert_user,
                get_token,
                get_sellers,
                get_buyers,
                verify_seller,
                remove_buyer,
                remove_seller,
                get_categories,
                get_category_products_plain,
                get_advertised_products_plain,
                get_category_products,
                get_advertised_products,
                get_seller_products,
                create_product,
                advertise_product,
                delete_product,
                report_product,
                get_reported_products,
                reserve_product,
                get_bookings,
                get_booking,
                unreserve_product,
                create_payment_intent,
                record_payment
            ],
        )
        .register("/", catchers![unauthorized, forbidden, not_found])
}
