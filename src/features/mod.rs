//! Feature layer: the record collections, their shared resource machinery, files and auth.

pub mod ad_monitoring;
pub mod aircraft;
pub mod auth;
pub mod documents_on_board;
pub mod files;
pub mod fleet_daily_update;
pub mod ldnd_monitoring;
pub mod resources;
pub mod tcc_maintenance;
pub mod technical_logs;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;

use crate::modules::records::RecordStore;
use ad_monitoring::{AdMonitoringResource, WorkOrderAdMonitoringResource};
use aircraft::AircraftResource;
use documents_on_board::DocumentOnBoardResource;
use files::AttachmentService;
use fleet_daily_update::FleetDailyUpdateResource;
use ldnd_monitoring::LdndMonitoringResource;
use resources::{collection_routes, CollectionDoc, Resource, ResourceService};
use tcc_maintenance::TccMaintenanceResource;
use technical_logs::TechnicalLogResource;

/// Every registered collection, in documentation order
pub fn catalogue() -> Vec<CollectionDoc> {
    vec![
        CollectionDoc::of::<AircraftResource>(),
        CollectionDoc::of::<DocumentOnBoardResource>(),
        CollectionDoc::of::<AdMonitoringResource>(),
        CollectionDoc::of::<WorkOrderAdMonitoringResource>(),
        CollectionDoc::of::<TechnicalLogResource>(),
        CollectionDoc::of::<LdndMonitoringResource>(),
        CollectionDoc::of::<TccMaintenanceResource>(),
        CollectionDoc::of::<FleetDailyUpdateResource>(),
    ]
}

fn routes_for<R: Resource>(
    records: &Arc<dyn RecordStore>,
    attachments: &Arc<AttachmentService>,
    timeout: Duration,
) -> Router {
    collection_routes::<R>(Arc::new(ResourceService::new(
        records.clone(),
        attachments.clone(),
        timeout,
    )))
}

/// Routes of every collection in every scope shape; callers add auth.
pub fn collection_router(
    records: Arc<dyn RecordStore>,
    attachments: Arc<AttachmentService>,
    record_timeout: Duration,
) -> Router {
    Router::new()
        .merge(routes_for::<AircraftResource>(&records, &attachments, record_timeout))
        .merge(routes_for::<DocumentOnBoardResource>(&records, &attachments, record_timeout))
        .merge(routes_for::<AdMonitoringResource>(&records, &attachments, record_timeout))
        .merge(routes_for::<WorkOrderAdMonitoringResource>(
            &records,
            &attachments,
            record_timeout,
        ))
        .merge(routes_for::<TechnicalLogResource>(&records, &attachments, record_timeout))
        .merge(routes_for::<LdndMonitoringResource>(&records, &attachments, record_timeout))
        .merge(routes_for::<TccMaintenanceResource>(&records, &attachments, record_timeout))
        .merge(routes_for::<FleetDailyUpdateResource>(
            &records,
            &attachments,
            record_timeout,
        ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::validation::SLOT_NAME_REGEX;

    #[test]
    fn test_every_scope_fits_its_collection() {
        for doc in catalogue() {
            for scope in doc.scopes {
                assert!(
                    scope.supports(doc.collection),
                    "{} cannot be scoped by {:?}",
                    doc.collection.label,
                    scope
                );
            }
        }
    }

    #[test]
    fn test_slot_names_are_route_safe() {
        for doc in catalogue() {
            for slot in doc.collection.slots {
                assert!(SLOT_NAME_REGEX.is_match(slot.name), "bad slot {}", slot.name);
            }
        }
    }

    #[test]
    fn test_collection_router_has_no_conflicting_routes() {
        let records: Arc<dyn RecordStore> =
            Arc::new(crate::modules::records::memory::MemoryRecordStore::default());
        let blobs = Arc::new(crate::modules::storage::MemoryBlobStore::default());
        let attachments = Arc::new(AttachmentService::new(
            blobs,
            records.clone(),
            "test",
            Duration::from_secs(1),
        ));
        // axum panics on overlapping routes
        let _ = collection_router(records, attachments, Duration::from_secs(1));
    }
}
