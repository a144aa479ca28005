pub mod booking_repository;
pub mod category_repository;
pub mod payment_repository;
pub mod product_repository;
pub mod report_repository;
pub mod user_repository;
