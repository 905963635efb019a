use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::ad_monitoring::dtos as ad_monitoring_dtos;
use crate::features::aircraft::dtos as aircraft_dtos;
use crate::features::auth::{self, model::AuthenticatedUser};
use crate::features::documents_on_board::dtos as documents_dtos;
use crate::features::files::dtos as files_dtos;
use crate::features::fleet_daily_update::dtos as fleet_dtos;
use crate::features::ldnd_monitoring::dtos as ldnd_dtos;
use crate::features::resources::CollectionPaths;
use crate::features::tcc_maintenance::dtos as tcc_dtos;
use crate::features::technical_logs::dtos as technical_logs_dtos;
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(auth::handler::get_me),
    components(
        schemas(
            Meta,
            AuthenticatedUser,
            ApiResponse<AuthenticatedUser>,
            // Files
            files_dtos::AttachmentResponseDto,
            files_dtos::Disposition,
            files_dtos::UploadSlotDto,
            files_dtos::RecordFormDto,
            // Aircraft
            aircraft_dtos::AircraftStatus,
            aircraft_dtos::CreateAircraftDto,
            aircraft_dtos::UpdateAircraftDto,
            aircraft_dtos::AircraftResponseDto,
            // Documents on board
            documents_dtos::DocumentStatus,
            documents_dtos::CreateDocumentOnBoardDto,
            documents_dtos::UpdateDocumentOnBoardDto,
            documents_dtos::DocumentOnBoardResponseDto,
            // AD monitoring
            ad_monitoring_dtos::CreateAdMonitoringDto,
            ad_monitoring_dtos::UpdateAdMonitoringDto,
            ad_monitoring_dtos::AdMonitoringResponseDto,
            ad_monitoring_dtos::CreateWorkOrderAdMonitoringDto,
            ad_monitoring_dtos::UpdateWorkOrderAdMonitoringDto,
            ad_monitoring_dtos::WorkOrderAdMonitoringResponseDto,
            // Technical log
            technical_logs_dtos::NatureOfFlight,
            technical_logs_dtos::CreateTechnicalLogDto,
            technical_logs_dtos::UpdateTechnicalLogDto,
            technical_logs_dtos::TechnicalLogResponseDto,
            // LDND monitoring
            ldnd_dtos::IntervalUnit,
            ldnd_dtos::CreateLdndMonitoringDto,
            ldnd_dtos::UpdateLdndMonitoringDto,
            ldnd_dtos::LdndMonitoringResponseDto,
            // TCC maintenance
            tcc_dtos::TccCategory,
            tcc_dtos::MethodOfCompliance,
            tcc_dtos::CreateTccMaintenanceDto,
            tcc_dtos::UpdateTccMaintenanceDto,
            tcc_dtos::TccMaintenanceResponseDto,
            // Fleet daily update
            fleet_dtos::FleetStatus,
            fleet_dtos::CreateFleetDailyUpdateDto,
            fleet_dtos::UpdateFleetDailyUpdateDto,
            fleet_dtos::FleetDailyUpdateResponseDto,
        )
    ),
    tags(
        (name = "auth", description = "Caller identity"),
        (name = "Aircraft", description = "Fleet register"),
        (name = "Document on board", description = "Certificates and documents carried on board"),
        (name = "AD monitoring", description = "Airworthiness directive compliance"),
        (name = "Work order AD monitoring", description = "Work orders raised against AD monitoring"),
        (name = "Aircraft technical log", description = "Technical log entries"),
        (name = "LDND monitoring", description = "Last done / next due inspections"),
        (name = "TCC maintenance", description = "Time-controlled components"),
        (name = "Fleet daily update", description = "Daily aircraft status board"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Laminar API",
        version = "0.1.0",
        description = "Aircraft maintenance records API",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

/// Full document: annotated handlers, generated collection paths and the configured info.
pub fn build_openapi(info: &SwaggerInfoModifier) -> utoipa::openapi::OpenApi {
    let mut openapi = ApiDoc::openapi();
    CollectionPaths {
        docs: crate::features::catalogue(),
    }
    .modify(&mut openapi);
    info.modify(&mut openapi);
    openapi
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_has_auth_and_collection_paths() {
        let openapi = build_openapi(&SwaggerInfoModifier {
            title: "Test".to_string(),
            version: "1".to_string(),
            description: "d".to_string(),
        });

        assert_eq!(openapi.info.title, "Test");
        assert!(openapi.paths.paths.contains_key("/api/v1/auth/me"));
        assert!(openapi
            .paths
            .paths
            .contains_key("/api/v1/aircraft/{aircraft_id}/ad_monitoring/paged"));
        let components = openapi.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
        assert!(components.schemas.contains_key("AircraftResponseDto"));
    }

    #[test]
    fn test_every_collection_schema_is_registered() {
        let openapi = build_openapi(&SwaggerInfoModifier {
            title: "Test".to_string(),
            version: "1".to_string(),
            description: "d".to_string(),
        });
        let schemas = openapi.components.expect("components").schemas;

        for doc in crate::features::catalogue() {
            for name in [&doc.create_schema, &doc.update_schema, &doc.view_schema] {
                assert!(schemas.contains_key(name), "{} is not registered", name);
            }
        }
        assert!(openapi
            .paths
            .paths
            .contains_key("/api/v1/aircraft/{aircraft_id}/fleet-daily-update/{id}"));
    }
}
