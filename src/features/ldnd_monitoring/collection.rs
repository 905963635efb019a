use crate::features::resources::{
    Collection, ColumnKind, FilterField, ParentColumn, ParentKind, Resource, ScopeDescriptor,
};
use crate::modules::records::{ForeignKey, SortDirection, SortKey, TableDef};

use super::dtos::{CreateLdndMonitoringDto, LdndMonitoringResponseDto, UpdateLdndMonitoringDto};

pub const COLLECTION: Collection = Collection {
    label: "LDND monitoring",
    segment: "ldnd-monitoring",
    nested_segment: "ldnd-monitoring",
    id_param: "id",
    table: TableDef {
        name: "ldnd_monitoring",
        id_column: "id",
        columns: &[
            "aircraft_fk",
            "inspection_type",
            "unit",
            "last_done_tach_due",
            "last_done_tach_done",
            "next_due_tach_hours",
            "performed_date_start",
            "performed_date_end",
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
    sortable: &[
        "id",
        "aircraft_fk",
        "inspection_type",
        "unit",
        "last_done_tach_due",
        "last_done_tach_done",
        "next_due_tach_hours",
        "performed_date_start",
        "performed_date_end",
        "created_at",
        "updated_at",
    ],
    default_sort: &[SortKey {
        column: "created_at",
        direction: SortDirection::Desc,
    }],
    searchable: &["inspection_type"],
    filterable: &[
        FilterField {
            column: "aircraft_fk",
            kind: ColumnKind::Integer,
        },
        FilterField {
            column: "unit",
            kind: ColumnKind::Text,
        },
    ],
    status_column: None,
    slots: &[],
};

pub struct LdndMonitoringResource;

impl Resource for LdndMonitoringResource {
    type Create = CreateLdndMonitoringDto;
    type Update = UpdateLdndMonitoringDto;
    type View = LdndMonitoringResponseDto;

    const COLLECTION: &'static Collection = &COLLECTION;
    const SCOPES: &'static [ScopeDescriptor] =
        &[ScopeDescriptor::GLOBAL, ScopeDescriptor::AIRCRAFT];
}
