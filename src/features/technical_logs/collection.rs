use crate::features::resources::{
    Collection, ColumnKind, FilterField, ParentColumn, ParentKind, Resource, ScopeDescriptor,
};
use crate::modules::records::{ForeignKey, SortDirection, SortKey, TableDef};

use super::dtos::{CreateTechnicalLogDto, TechnicalLogResponseDto, UpdateTechnicalLogDto};

pub const COLLECTION: Collection = Collection {
    label: "Aircraft technical log",
    segment: "aircraft-technical-log",
    nested_segment: "atl",
    id_param: "id",
    table: TableDef {
        name: "aircraft_technical_log",
        id_column: "id",
        columns: &[
            "aircraft_fk",
            "sequence_no",
            "nature_of_flight",
            "next_inspection_due",
            "tach_time_due",
            "origin_station",
            "origin_date",
            "destination_station",
            "destination_date",
            "number_of_landings",
            "hobbs_meter_start",
            "hobbs_meter_end",
            "hobbs_meter_total",
            "tachometer_start",
            "tachometer_end",
            "tachometer_total",
            "remarks",
            "actions_taken",
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
        "sequence_no",
        "nature_of_flight",
        "origin_date",
        "destination_date",
        "created_at",
        "updated_at",
    ],
    default_sort: &[SortKey {
        column: "created_at",
        direction: SortDirection::Desc,
    }],
    searchable: &[
        "sequence_no",
        "origin_station",
        "destination_station",
        "nature_of_flight",
    ],
    filterable: &[
        FilterField {
            column: "aircraft_fk",
            kind: ColumnKind::Integer,
        },
        FilterField {
            column: "nature_of_flight",
            kind: ColumnKind::Text,
        },
    ],
    status_column: None,
    slots: &[],
};

pub struct TechnicalLogResource;

impl Resource for TechnicalLogResource {
    type Create = CreateTechnicalLogDto;
    type Update = UpdateTechnicalLogDto;
    type View = TechnicalLogResponseDto;

    const COLLECTION: &'static Collection = &COLLECTION;
    const SCOPES: &'static [ScopeDescriptor] =
        &[ScopeDescriptor::GLOBAL, ScopeDescriptor::AIRCRAFT];
}
