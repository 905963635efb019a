use crate::features::resources::{
    Collection, ColumnKind, FilterField, ParentColumn, ParentKind, Resource, ScopeDescriptor,
};
use crate::modules::records::{ForeignKey, SortDirection, SortKey, TableDef};

use super::dtos::{CreateTccMaintenanceDto, TccMaintenanceResponseDto, UpdateTccMaintenanceDto};

pub const COLLECTION: Collection = Collection {
    label: "TCC maintenance",
    segment: "tcc-maintenance",
    nested_segment: "tcc-maintenance",
    id_param: "id",
    table: TableDef {
        name: "tcc_maintenance",
        id_column: "id",
        columns: &[
            "aircraft_fk",
            "atl_ref",
            "category",
            "part_number",
            "serial_number",
            "description",
            "component_limit_years",
            "component_limit_hours",
            "component_method_of_compliance",
            "last_done_date",
            "last_done_tach",
            "last_done_aftt",
            "last_done_method_of_compliance",
        ],
        foreign_keys: &[
            ForeignKey {
                column: "aircraft_fk",
                references: "aircrafts",
                label: "Aircraft",
            },
            ForeignKey {
                column: "atl_ref",
                references: "aircraft_technical_log",
                label: "Aircraft technical log entry",
            },
        ],
    },
    parents: &[ParentColumn {
        kind: ParentKind::Aircraft,
        column: "aircraft_fk",
    }],
    sortable: &[
        "id",
        "category",
        "part_number",
        "last_done_date",
        "created_at",
        "updated_at",
    ],
    default_sort: &[SortKey {
        column: "created_at",
        direction: SortDirection::Desc,
    }],
    searchable: &["part_number", "serial_number", "description"],
    filterable: &[
        FilterField {
            column: "aircraft_fk",
            kind: ColumnKind::Integer,
        },
        FilterField {
            column: "atl_ref",
            kind: ColumnKind::Integer,
        },
        FilterField {
            column: "category",
            kind: ColumnKind::Text,
        },
    ],
    status_column: None,
    slots: &[],
};

pub struct TccMaintenanceResource;

impl Resource for TccMaintenanceResource {
    type Create = CreateTccMaintenanceDto;
    type Update = UpdateTccMaintenanceDto;
    type View = TccMaintenanceResponseDto;

    const COLLECTION: &'static Collection = &COLLECTION;
    const SCOPES: &'static [ScopeDescriptor] =
        &[ScopeDescriptor::GLOBAL, ScopeDescriptor::AIRCRAFT];
}
