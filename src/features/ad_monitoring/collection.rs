use crate::features::files::dtos::FileSlot;
use crate::features::resources::{
    Collection, ColumnKind, FilterField, ParentColumn, ParentKind, Resource, ScopeDescriptor,
};
use crate::modules::records::{ForeignKey, SortDirection, SortKey, TableDef};

use super::dtos::{
    AdMonitoringResponseDto, CreateAdMonitoringDto, CreateWorkOrderAdMonitoringDto,
    UpdateAdMonitoringDto, UpdateWorkOrderAdMonitoringDto, WorkOrderAdMonitoringResponseDto,
};

const NEWEST_FIRST: &[SortKey] = &[SortKey {
    column: "created_at",
    direction: SortDirection::Desc,
}];

pub const COLLECTION: Collection = Collection {
    label: "AD monitoring",
    segment: "ad-monitoring",
    nested_segment: "ad_monitoring",
    id_param: "ad_monitoring_id",
    table: TableDef {
        name: "ad_monitoring",
        id_column: "id",
        columns: &[
            "aircraft_fk",
            "ad_number",
            "subject",
            "inspection_interval",
            "compli_date",
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
        "ad_number",
        "subject",
        "compli_date",
        "created_at",
        "updated_at",
    ],
    default_sort: NEWEST_FIRST,
    searchable: &["ad_number", "subject", "inspection_interval"],
    filterable: &[FilterField {
        column: "aircraft_fk",
        kind: ColumnKind::Integer,
    }],
    status_column: None,
    slots: &[FileSlot {
        name: "document",
        field: "document",
    }],
};

pub const WORK_ORDER_COLLECTION: Collection = Collection {
    label: "Work order AD monitoring",
    segment: "work-order-ad-monitoring",
    nested_segment: "work-order-ad-monitoring",
    id_param: "id",
    table: TableDef {
        name: "workorder_ad_monitoring",
        id_column: "id",
        columns: &[
            "ad_monitoring_fk",
            "work_order_number",
            "last_done_actt",
            "last_done_tach",
            "last_done_date",
            "next_done_actt",
            "tach",
            "atl_ref",
        ],
        foreign_keys: &[ForeignKey {
            column: "ad_monitoring_fk",
            references: "ad_monitoring",
            label: "AD monitoring",
        }],
    },
    parents: &[ParentColumn {
        kind: ParentKind::AdMonitoring,
        column: "ad_monitoring_fk",
    }],
    sortable: &[
        "id",
        "ad_monitoring_fk",
        "work_order_number",
        "last_done_actt",
        "last_done_tach",
        "last_done_date",
        "next_done_actt",
        "tach",
        "atl_ref",
        "created_at",
        "updated_at",
    ],
    default_sort: NEWEST_FIRST,
    searchable: &["work_order_number", "atl_ref"],
    filterable: &[FilterField {
        column: "ad_monitoring_fk",
        kind: ColumnKind::Integer,
    }],
    status_column: None,
    slots: &[],
};

pub struct AdMonitoringResource;

impl Resource for AdMonitoringResource {
    type Create = CreateAdMonitoringDto;
    type Update = UpdateAdMonitoringDto;
    type View = AdMonitoringResponseDto;

    const COLLECTION: &'static Collection = &COLLECTION;
    const SCOPES: &'static [ScopeDescriptor] =
        &[ScopeDescriptor::GLOBAL, ScopeDescriptor::AIRCRAFT];
}

/// Work orders are reachable globally and below an aircraft's AD monitoring entry
pub struct WorkOrderAdMonitoringResource;

impl Resource for WorkOrderAdMonitoringResource {
    type Create = CreateWorkOrderAdMonitoringDto;
    type Update = UpdateWorkOrderAdMonitoringDto;
    type View = WorkOrderAdMonitoringResponseDto;

    const COLLECTION: &'static Collection = &WORK_ORDER_COLLECTION;
    const SCOPES: &'static [ScopeDescriptor] = &[
        ScopeDescriptor::GLOBAL,
        ScopeDescriptor::AIRCRAFT_AD_MONITORING,
    ];
}
