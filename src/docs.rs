// src/docs.rs

use crate::handlers;
use crate::models;
use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Customers ---
        handlers::customers::create_customer,
        handlers::customers::list_customers,
        handlers::customers::get_customer,
        handlers::customers::update_customer,

        // --- Properties ---
        handlers::properties::create_property,
        handlers::properties::list_properties,
        handlers::properties::get_property,
        handlers::properties::update_property,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::UserRole,
            models::auth::User,

            // --- Customers ---
            models::customer::CustomerStatus,
            models::customer::Priority,
            models::customer::Budget,
            models::customer::MovedFrom,
            models::customer::Customer,
            models::customer::CustomerNote,
            models::customer::CustomerDetail,
            models::customer::CreateCustomerPayload,
            models::customer::UpdateCustomerPayload,
            models::customer::AssignAgentPayload,
            models::customer::AddNotePayload,
            models::customer::MoveCustomerPayload,
            models::customer::AgentClosePayload,

            // --- Properties ---
            models::property::PropertyState,
            models::property::PropertyStatus,
            models::property::PropertyType,
            models::property::Property,
            models::property::UpdatePropertyPayload,
            models::property::PublishPayload,

            // --- Visits ---
            models::visit::VisitStatus,
            models::visit::CustomerInterest,
            models::visit::Visit,
            models::visit::VisitStats,

            // --- Reports ---
            models::report::ReportStatus,
            models::report::ReportStats,
            models::report::Report,
            models::report::ReportOverviewStats,

            // --- Notifications ---
            models::notification::NotificationType,
            models::notification::RelatedEntity,
            models::notification::Notification,

            // --- Sources ---
            models::source::CustomerSource,
        )
    ),
    tags(
        (name = "Customers", description = "Gestão de Clientes e Leads"),
        (name = "Properties", description = "Gestão de Imóveis"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
