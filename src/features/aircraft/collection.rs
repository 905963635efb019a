use crate::features::files::dtos::FileSlot;
use crate::features::resources::{Collection, ColumnKind, FilterField, Resource, ScopeDescriptor};
use crate::modules::records::{SortDirection, SortKey, TableDef};

use super::dtos::{AircraftResponseDto, CreateAircraftDto, UpdateAircraftDto};

pub const ENGINE_ARC: FileSlot = FileSlot {
    name: "engine-arc",
    field: "engine_arc",
};

pub const PROPELLER_ARC: FileSlot = FileSlot {
    name: "propeller-arc",
    field: "propeller_arc",
};

pub const COLLECTION: Collection = Collection {
    label: "Aircraft",
    segment: "aircraft",
    nested_segment: "aircraft",
    id_param: "aircraft_id",
    table: TableDef {
        name: "aircrafts",
        id_column: "id",
        columns: &[
            "registration",
            "manufacturer",
            "type",
            "model",
            "msn",
            "reg_no",
            "base",
            "ownership",
            "status",
            "report_description",
            "airframe_model",
            "airframe_service_manual",
            "airframe_serial_number",
            "airframe_ipc",
            "engine_model",
            "engine_serial_number",
            "propeller_model",
            "propeller_serial_number",
        ],
        foreign_keys: &[],
    },
    parents: &[],
    sortable: &[
        "id",
        "registration",
        "reg_no",
        "msn",
        "model",
        "manufacturer",
        "base",
        "status",
        "created_at",
        "updated_at",
    ],
    default_sort: &[SortKey {
        column: "created_at",
        direction: SortDirection::Desc,
    }],
    searchable: &["registration", "reg_no", "msn", "model", "manufacturer"],
    filterable: &[
        FilterField {
            column: "type",
            kind: ColumnKind::Text,
        },
        FilterField {
            column: "model",
            kind: ColumnKind::Text,
        },
        FilterField {
            column: "base",
            kind: ColumnKind::Text,
        },
        FilterField {
            column: "ownership",
            kind: ColumnKind::Text,
        },
    ],
    status_column: Some("status"),
    slots: &[ENGINE_ARC, PROPELLER_ARC],
};

/// Aircraft: the root of every scope chain
pub struct AircraftResource;

impl Resource for AircraftResource {
    type Create = CreateAircraftDto;
    type Update = UpdateAircraftDto;
    type View = AircraftResponseDto;

    const COLLECTION: &'static Collection = &COLLECTION;
    const SCOPES: &'static [ScopeDescriptor] = &[ScopeDescriptor::GLOBAL];
}
