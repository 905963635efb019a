use crate::features::resources::{
    Collection, ColumnKind, FilterField, ParentColumn, ParentKind, Resource, ScopeDescriptor,
};
use crate::modules::records::{ForeignKey, SortDirection, SortKey, TableDef};

use super::dtos::{
    CreateFleetDailyUpdateDto, FleetDailyUpdateResponseDto, UpdateFleetDailyUpdateDto,
};

/// A second live entry for the same aircraft fails with 409 on the unique index.
pub const COLLECTION: Collection = Collection {
    label: "Fleet daily update",
    segment: "fleet-daily-update",
    nested_segment: "fleet-daily-update",
    id_param: "id",
    table: TableDef {
        name: "fleet_daily_update",
        id_column: "id",
        columns: &[
            "aircraft_fk",
            "status",
            "next_insp_due",
            "tach_time_due",
            "tach_time_eod",
            "remaining_time_before_next_isp",
            "remaining_time_before_engine",
            "remaining_time_before_propeller",
            "remarks",
        ],
        foreign_keys: &[ForeignKey {
            column: "aircraft_fk",
            references: "aircrafts",
            label: "Aircraft",
        }],
    },
    parents: &[ParentColumn {
        kind: ParentKind::Aircraft,
        column: "aircraft_fk",
    }],
    sortable: &["id", "aircraft_fk", "status", "created_at", "updated_at"],
    default_sort: &[SortKey {
        column: "created_at",
        direction: SortDirection::Desc,
    }],
    searchable: &["remarks"],
    filterable: &[FilterField {
        column: "aircraft_fk",
        kind: ColumnKind::Integer,
    }],
    status_column: Some("status"),
    slots: &[],
};

pub struct FleetDailyUpdateResource;

impl Resource for FleetDailyUpdateResource {
    type Create = CreateFleetDailyUpdateDto;
    type Update = UpdateFleetDailyUpdateDto;
    type View = FleetDailyUpdateResponseDto;

    const COLLECTION: &'static Collection = &COLLECTION;
    const SCOPES: &'static [ScopeDescriptor] =
        &[ScopeDescriptor::GLOBAL, ScopeDescriptor::AIRCRAFT];
}
