//! OpenAPI path items for the generic collection routes.
//!
//! The generic handlers cannot carry `#[utoipa::path]` attributes, so the paths are generated
//! from the same catalogue the router is built from.

use utoipa::openapi::path::{HttpMethod, OperationBuilder, ParameterBuilder, ParameterIn};
use utoipa::openapi::request_body::RequestBodyBuilder;
use utoipa::openapi::security::SecurityRequirement;
use utoipa::openapi::{
    ArrayBuilder, ContentBuilder, ObjectBuilder, OpenApi, Ref, Required, ResponseBuilder, Type,
};
use utoipa::{Modify, ToSchema};

use super::collection::{Collection, Resource};
use super::scope::ScopeDescriptor;
use crate::features::files::dtos::{AttachmentResponseDto, RecordFormDto, UploadSlotDto};
use crate::shared::constants::API_PREFIX;

/// Documentation view of one registered collection
#[derive(Debug, Clone)]
pub struct CollectionDoc {
    pub collection: &'static Collection,
    pub scopes: &'static [ScopeDescriptor],
    pub create_schema: String,
    pub update_schema: String,
    pub view_schema: String,
}

impl CollectionDoc {
    pub fn of<R: Resource>() -> Self {
        Self {
            collection: R::COLLECTION,
            scopes: R::SCOPES,
            create_schema: R::Create::name().into_owned(),
            update_schema: R::Update::name().into_owned(),
            view_schema: R::View::name().into_owned(),
        }
    }
}

/// Adds every collection route in every scope shape to the document
pub struct CollectionPaths {
    pub docs: Vec<CollectionDoc>,
}

fn integer_param(name: &str, description: String) -> ParameterBuilder {
    ParameterBuilder::new()
        .name(name)
        .parameter_in(ParameterIn::Path)
        .required(Required::True)
        .description(Some(description))
        .schema(Some(ObjectBuilder::new().schema_type(Type::Integer)))
}

fn query_param(name: &str, description: &str, kind: Type) -> ParameterBuilder {
    ParameterBuilder::new()
        .name(name)
        .parameter_in(ParameterIn::Query)
        .required(Required::False)
        .description(Some(description))
        .schema(Some(ObjectBuilder::new().schema_type(kind)))
}

fn json_body(schema: &str) -> ContentBuilder {
    ContentBuilder::new().schema(Some(Ref::from_schema_name(schema)))
}

fn error(description: &str) -> ResponseBuilder {
    ResponseBuilder::new().description(description)
}

impl CollectionPaths {
    fn operation(
        doc: &CollectionDoc,
        scope: &ScopeDescriptor,
        summary: String,
        with_id: bool,
    ) -> OperationBuilder {
        let tag = doc.collection.label;
        let mut op = OperationBuilder::new()
            .tag(tag)
            .summary(Some(summary))
            .securities(Some([SecurityRequirement::new(
                "bearer_auth",
                Vec::<String>::new(),
            )]));
        for kind in scope.levels {
            op = op.parameter(integer_param(kind.param(), format!("{} id", kind.label())));
        }
        if with_id {
            op = op.parameter(integer_param(
                doc.collection.id_param,
                format!("{} id", doc.collection.label),
            ));
        }
        op.response("400", error("Invalid query, path or payload"))
            .response("401", error("Missing or invalid token"))
            .response("404", error("Not found in this scope"))
            .response("503", error("Store unavailable"))
            .response("504", error("Store timeout"))
    }

    fn write_body(doc: &CollectionDoc, schema: &str) -> RequestBodyBuilder {
        let body = RequestBodyBuilder::new()
            .required(Some(Required::True))
            .content("application/json", json_body(schema).build());
        if doc.collection.slots.is_empty() {
            body
        } else {
            body.content(
                "multipart/form-data",
                json_body(&RecordFormDto::name()).build(),
            )
        }
    }

    fn add_scope(openapi: &mut OpenApi, doc: &CollectionDoc, scope: &ScopeDescriptor) {
        let collection = doc.collection;
        let base = format!(
            "{}{}/{}",
            API_PREFIX,
            scope.route_prefix(),
            collection.segment_in(scope)
        );
        let item = format!("{}/{{{}}}", base, collection.id_param);
        let label = collection.label;

        let page = ObjectBuilder::new()
            .property(
                "items",
                ArrayBuilder::new().items(Ref::from_schema_name(&doc.view_schema)),
            )
            .property("total", ObjectBuilder::new().schema_type(Type::Integer))
            .property("page", ObjectBuilder::new().schema_type(Type::Integer))
            .property("limit", ObjectBuilder::new().schema_type(Type::Integer))
            .property("pages", ObjectBuilder::new().schema_type(Type::Integer))
            .required("items")
            .required("total");
        let mut list = Self::operation(doc, scope, format!("List {} (paged)", label), false)
            .response(
                "200",
                ResponseBuilder::new()
                    .description("One page of records")
                    .content("application/json", ContentBuilder::new().schema(Some(page)).build()),
            );
        for (name, description, kind) in [
            ("limit", "Page size, 1-100 (default 10)", Type::Integer),
            ("page", "1-based page number (default 1)", Type::Integer),
            ("search", "Case-insensitive substring match", Type::String),
            ("sort", "Comma-separated fields, `-` prefix for descending", Type::String),
        ] {
            list = list.parameter(query_param(name, description, kind));
        }
        if collection.status_column.is_some() {
            list = list.parameter(query_param("status", "Exact status, or `all`", Type::String));
        }
        for field in collection.filterable {
            list = list.parameter(query_param(field.column, "Equality filter", Type::String));
        }
        openapi
            .paths
            .add_path_operation(format!("{}/paged", base), vec![HttpMethod::Get], list);

        let create = Self::operation(doc, scope, format!("Create {}", label), false)
            .request_body(Some(Self::write_body(doc, &doc.create_schema).build()))
            .response(
                "201",
                ResponseBuilder::new()
                    .description("Created")
                    .content("application/json", json_body(&doc.view_schema).build()),
            )
            .response("409", error("Referenced parent missing or unique value taken"));
        openapi
            .paths
            .add_path_operation(&base, vec![HttpMethod::Post], create);

        let get = Self::operation(doc, scope, format!("Get {}", label), true).response(
            "200",
            ResponseBuilder::new()
                .description("The record")
                .content("application/json", json_body(&doc.view_schema).build()),
        );
        openapi
            .paths
            .add_path_operation(&item, vec![HttpMethod::Get], get);

        let update = Self::operation(doc, scope, format!("Update {}", label), true)
            .request_body(Some(Self::write_body(doc, &doc.update_schema).build()))
            .response(
                "200",
                ResponseBuilder::new()
                    .description("Updated")
                    .content("application/json", json_body(&doc.view_schema).build()),
            )
            .response("409", error("Referenced parent missing or unique value taken"));
        openapi
            .paths
            .add_path_operation(&item, vec![HttpMethod::Put], update);

        let delete = Self::operation(doc, scope, format!("Delete {}", label), true)
            .response("204", ResponseBuilder::new().description("Deleted"));
        openapi
            .paths
            .add_path_operation(&item, vec![HttpMethod::Delete], delete);

        if !collection.slots.is_empty() {
            Self::add_files(openapi, doc, scope, &item);
        }
    }

    fn slot_param(doc: &CollectionDoc) -> ParameterBuilder {
        let slots: Vec<&str> = doc.collection.slots.iter().map(|s| s.name).collect();
        ParameterBuilder::new()
            .name("slot")
            .parameter_in(ParameterIn::Path)
            .required(Required::True)
            .description(Some(format!("One of: {}", slots.join(", "))))
            .schema(Some(ObjectBuilder::new().schema_type(Type::String)))
    }

    fn add_files(openapi: &mut OpenApi, doc: &CollectionDoc, scope: &ScopeDescriptor, item: &str) {
        let path = format!("{}/files/{{slot}}", item);
        let download = Self::operation(doc, scope, "Download a stored file".to_string(), true)
            .parameter(Self::slot_param(doc))
            .parameter(query_param(
                "disposition",
                "`inline` or `attachment` (default)",
                Type::String,
            ))
            .response(
                "200",
                ResponseBuilder::new().description("Raw bytes with the stored media type"),
            )
            .response("500", error("Stored bytes are missing"));
        openapi
            .paths
            .add_path_operation(&path, vec![HttpMethod::Get], download);

        let upload = Self::operation(doc, scope, "Store or replace a file".to_string(), true)
            .parameter(Self::slot_param(doc))
            .request_body(Some(
                RequestBodyBuilder::new()
                    .required(Some(Required::True))
                    .content(
                        "multipart/form-data",
                        json_body(&UploadSlotDto::name()).build(),
                    )
                    .build(),
            ))
            .response(
                "200",
                ResponseBuilder::new()
                    .description("Stored attachment")
                    .content(
                        "application/json",
                        json_body(&AttachmentResponseDto::name()).build(),
                    ),
            );
        openapi
            .paths
            .add_path_operation(&path, vec![HttpMethod::Put], upload);

        let remove = Self::operation(doc, scope, "Remove a stored file".to_string(), true)
            .parameter(Self::slot_param(doc))
            .response("204", ResponseBuilder::new().description("Removed"));
        openapi
            .paths
            .add_path_operation(&path, vec![HttpMethod::Delete], remove);
    }
}

impl Modify for CollectionPaths {
    fn modify(&self, openapi: &mut OpenApi) {
        for doc in &self.docs {
            for scope in doc.scopes {
                Self::add_scope(openapi, doc, scope);
            }
        }
    }
}
