//! OpenAPI documentation, served at `/api/openapi.json` and browsable at `/docs`.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error;
use crate::handlers;
use dealplan_core::models;

/// Registers the bearer JWT scheme referenced by protected paths
struct BearerTokenAddon;

impl Modify for BearerTokenAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_token",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Dealplan API",
        version = "0.1.0",
        description = "Opportunity management and AI-generated Deal Strategy Plans. Versioned endpoints live under /api/v1/ and require a bearer JWT."
    ),
    paths(
        // Clients
        handlers::clients::list_clients,
        handlers::clients::create_client,
        handlers::clients::get_client,
        handlers::clients::update_client,
        handlers::clients::delete_client,
        // Responsibles
        handlers::responsibles::list_responsibles,
        handlers::responsibles::create_responsible,
        handlers::responsibles::update_responsible,
        // Opportunities
        handlers::opportunities::list_opportunities,
        handlers::opportunities::create_opportunity,
        handlers::opportunities::get_opportunity,
        handlers::opportunities::update_opportunity,
        handlers::opportunities::delete_opportunity,
        // Inputs
        handlers::inputs::upload_input,
        handlers::inputs::list_inputs,
        handlers::inputs::input_download_url,
        handlers::inputs::delete_input,
        // Artifacts
        handlers::artifacts::list_artifacts,
        handlers::artifacts::get_artifact,
        // Generation
        handlers::dsp::generate_dsp,
        // Webhook proxies
        handlers::proxy::proxy_upload,
        handlers::proxy::proxy_generate_artifact,
        // Health
        handlers::health::health_check,
        handlers::health::liveness_check,
    ),
    components(
        schemas(
            models::Client,
            models::ClientRequest,
            models::Responsible,
            models::CreateResponsibleRequest,
            models::UpdateResponsibleRequest,
            models::Opportunity,
            models::OpportunityOverview,
            models::OpportunityDetail,
            models::ClientSummary,
            models::ResponsibleSummary,
            models::EntityRef,
            models::CreateOpportunityRequest,
            models::UpdateOpportunityRequest,
            models::Input,
            models::DownloadUrlResponse,
            models::Artifact,
            models::DspFormat,
            models::GenerateDspRequest,
            models::GenerateDspResponse,
            models::GdriveFile,
            models::UploadProxyResponse,
            models::GenerateArtifactRequest,
            models::GenerateArtifactResponse,
            handlers::health::HealthCheckResponse,
            error::ErrorResponse,
        )
    ),
    modifiers(&BearerTokenAddon),
    tags(
        (name = "clients", description = "Client management"),
        (name = "responsibles", description = "Responsible (account owner) management"),
        (name = "opportunities", description = "Opportunity CRUD with embedded client and responsible"),
        (name = "inputs", description = "PDF inputs attached to opportunities"),
        (name = "artifacts", description = "Generated artifacts and their versions"),
        (name = "dsp", description = "Deal Strategy Plan generation"),
        (name = "proxy", description = "Document-automation webhook proxies"),
        (name = "health", description = "Liveness and dependency health")
    )
)]
pub struct ApiDoc;
