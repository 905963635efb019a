use crate::features::files::dtos::FileSlot;
use crate::features::resources::{
    Collection, ColumnKind, FilterField, ParentColumn, ParentKind, Resource, ScopeDescriptor,
};
use crate::modules::records::{ForeignKey, SortDirection, SortKey, TableDef};

use super::dtos::{
    CreateDocumentOnBoardDto, DocumentOnBoardResponseDto, UpdateDocumentOnBoardDto,
};

pub const COLLECTION: Collection = Collection {
    label: "Document on board",
    segment: "documents-on-board",
    nested_segment: "documents-on-board",
    id_param: "id",
    table: TableDef {
        name: "documents_on_board",
        id_column: "document_id",
        columns: &[
            "aircraft_id",
            "document_name",
            "description",
            "issue_date",
            "expiry_date",
            "warning_days",
            "status",
            "web_link",
            "is_aircraft_certificate",
        ],
        foreign_keys: &[ForeignKey {
            column: "aircraft_id",
            references: "aircrafts",
            label: "Aircraft",
        }],
    },
    parents: &[ParentColumn {
        kind: ParentKind::Aircraft,
        column: "aircraft_id",
    }],
    sortable: &[
        "document_id",
        "document_name",
        "issue_date",
        "expiry_date",
        "status",
        "created_at",
        "updated_at",
    ],
    default_sort: &[SortKey {
        column: "created_at",
        direction: SortDirection::Desc,
    }],
    searchable: &["document_name", "description"],
    filterable: &[
        FilterField {
            column: "aircraft_id",
            kind: ColumnKind::Integer,
        },
        FilterField {
            column: "is_aircraft_certificate",
            kind: ColumnKind::Boolean,
        },
        FilterField {
            column: "issue_date",
            kind: ColumnKind::Date,
        },
        FilterField {
            column: "expiry_date",
            kind: ColumnKind::Date,
        },
    ],
    status_column: Some("status"),
    slots: &[FileSlot {
        name: "document",
        field: "document",
    }],
};

pub struct DocumentOnBoardResource;

impl Resource for DocumentOnBoardResource {
    type Create = CreateDocumentOnBoardDto;
    type Update = UpdateDocumentOnBoardDto;
    type View = DocumentOnBoardResponseDto;

    const COLLECTION: &'static Collection = &COLLECTION;
    const SCOPES: &'static [ScopeDescriptor] =
        &[ScopeDescriptor::GLOBAL, ScopeDescriptor::AIRCRAFT];
}
