pub mod auth;
pub mod codes;
pub mod customer_service;
pub mod lifecycle;
pub mod notification_service;
pub mod property_service;
pub mod report_service;
pub mod upload_service;
pub mod visit_service;

pub use auth::AuthService;
pub use customer_service::CustomerService;
pub use notification_service::Notifier;
pub use property_service::PropertyService;
pub use report_service::ReportService;
pub use upload_service::UploadService;
pub use visit_service::VisitService;
