// storefront/src/services/mod.rs

//! Outbound integrations: payment provider and image host.

pub mod image_upload;
pub mod payment_gateway;
pub mod payment_mock;
pub mod paypal;

pub use image_upload::{CloudinaryUploader, UploadedImage};
pub use payment_gateway::{CreatedPayment, PaymentGateway, PaymentRequest};
pub use payment_mock::MockPaymentGateway;
pub use paypal::PaypalGateway;
