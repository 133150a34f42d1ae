pub mod customer_repo;
pub use customer_repo::CustomerRepository;
pub mod property_repo;
pub use property_repo::PropertyRepository;
pub mod user_repo;
pub use user_repo::UserRepository;
pub mod visit_repo;
pub use visit_repo::VisitRepository;
pub mod report_repo;
pub use report_repo::ReportRepository;
pub mod notification_repo;
pub use notification_repo::NotificationRepository;
pub mod source_repo;
pub use source_repo::SourceRepository;
pub mod sequence_repo;
pub use sequence_repo::SequenceRepository;
