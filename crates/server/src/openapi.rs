//! OpenAPI document assembled from the resource descriptors.

use utoipa::openapi::path::{OperationBuilder, ParameterBuilder, ParameterIn, PathItemBuilder, PathItemType};
use utoipa::openapi::request_body::RequestBodyBuilder;
use utoipa::openapi::schema::{ArrayBuilder, ObjectBuilder, Schema, SchemaType};
use utoipa::openapi::tag::TagBuilder;
use utoipa::openapi::{
    ComponentsBuilder, ContentBuilder, InfoBuilder, OpenApi, OpenApiBuilder, PathsBuilder, Ref, RefOr,
    Required, ResponseBuilder, Tag,
};
use utoipa::ToSchema;

use service::{Categories, Items, Products, Resource};

use crate::negotiate::{JSON, XML};

fn integer() -> RefOr<Schema> {
    RefOr::T(Schema::Object(ObjectBuilder::new().schema_type(SchemaType::Integer).minimum(Some(0.0)).build()))
}

fn content(schema: RefOr<Schema>) -> [(&'static str, utoipa::openapi::Content); 2] {
    [
        (JSON, ContentBuilder::new().schema(schema.clone()).build()),
        (XML, ContentBuilder::new().schema(schema).build()),
    ]
}

fn with_body(description: &str, schema: RefOr<Schema>) -> utoipa::openapi::Response {
    content(schema)
        .into_iter()
        .fold(ResponseBuilder::new().description(description), |b, (mime, c)| b.content(mime, c))
        .build()
}

fn empty(description: &str) -> utoipa::openapi::Response {
    ResponseBuilder::new().description(description).build()
}

fn id_param() -> utoipa::openapi::path::Parameter {
    ParameterBuilder::new()
        .name("id")
        .parameter_in(ParameterIn::Path)
        .required(Required::True)
        .schema(Some(integer()))
        .build()
}

fn query_param(name: &str, description: &str) -> utoipa::openapi::path::Parameter {
    ParameterBuilder::new()
        .name(name)
        .parameter_in(ParameterIn::Query)
        .required(Required::False)
        .description(Some(description))
        .schema(Some(integer()))
        .build()
}

#[derive(Default)]
struct Doc {
    paths: PathsBuilder,
    components: ComponentsBuilder,
    tags: Vec<Tag>,
}

impl Doc {
    fn resource<R>(mut self) -> Self
    where
        R: Resource,
        R::Payload: for<'s> ToSchema<'s>,
        R::View: for<'s> ToSchema<'s>,
    {
        let (payload_name, payload_schema) = <R::Payload as ToSchema>::schema();
        let (view_name, view_schema) = <R::View as ToSchema>::schema();
        let payload = RefOr::Ref(Ref::from_schema_name(payload_name));
        let view = RefOr::Ref(Ref::from_schema_name(view_name));
        let views = RefOr::T(Schema::Array(ArrayBuilder::new().items(view.clone()).build()));
        self.components = self.components.schema(payload_name, payload_schema).schema(view_name, view_schema);

        let body = content(payload)
            .into_iter()
            .fold(RequestBodyBuilder::new().required(Some(Required::True)), |b, (mime, c)| b.content(mime, c))
            .build();
        let op = |id: String, summary: String| {
            OperationBuilder::new().tags(Some(vec![R::NAME.to_string()])).operation_id(Some(id)).summary(Some(summary))
        };

        let collection = PathItemBuilder::new()
            .operation(
                PathItemType::Get,
                op(format!("list_{}", R::COLLECTION), format!("List {} ordered by id", R::COLLECTION))
                    .parameter(query_param("start", "zero-based offset"))
                    .parameter(query_param("max", "maximum number of results"))
                    .response("200", with_body("entities in id order", views))
                    .response("400", empty("invalid start or max"))
                    .response("406", empty("no acceptable representation"))
                    .build(),
            )
            .operation(
                PathItemType::Post,
                op(format!("create_{}", R::NAME), format!("Create a {}", R::NAME))
                    .request_body(Some(body.clone()))
                    .response("201", empty("created; see Location header"))
                    .response("400", empty("malformed body"))
                    .response("415", empty("unsupported content type"))
                    .build(),
            )
            .build();

        let member = PathItemBuilder::new()
            .operation(
                PathItemType::Get,
                op(format!("find_{}", R::NAME), format!("Find a {} by id", R::NAME))
                    .parameter(id_param())
                    .response("200", with_body("entity found", view.clone()))
                    .response("404", empty("no entity with that id"))
                    .build(),
            )
            .operation(
                PathItemType::Put,
                op(format!("update_{}", R::NAME), format!("Update a {} guarded by its version", R::NAME))
                    .parameter(id_param())
                    .request_body(Some(body))
                    .response("204", empty("updated"))
                    .response("400", empty("missing version or mismatched id"))
                    .response("404", empty("no entity with that id"))
                    .response("409", with_body("stale version; current state", view))
                    .build(),
            )
            .operation(
                PathItemType::Delete,
                op(format!("delete_{}", R::NAME), format!("Delete a {}", R::NAME))
                    .parameter(id_param())
                    .response("204", empty("deleted"))
                    .response("404", empty("no entity with that id"))
                    .build(),
            )
            .build();

        self.paths = self
            .paths
            .path(format!("/{}", R::COLLECTION), collection)
            .path(format!("/{}/{{id}}", R::COLLECTION), member);
        self.tags.push(TagBuilder::new().name(R::NAME).description(Some(format!("/{}", R::COLLECTION))).build());
        self
    }
}

fn health_schema() -> RefOr<Schema> {
    let status = RefOr::T(Schema::Object(ObjectBuilder::new().schema_type(SchemaType::String).build()));
    RefOr::T(Schema::Object(ObjectBuilder::new().property("status", status).required("status").build()))
}

pub fn api_doc() -> OpenApi {
    let health = PathItemBuilder::new()
        .operation(
            PathItemType::Get,
            OperationBuilder::new()
                .tags(Some(vec!["health".to_string()]))
                .operation_id(Some("health"))
                .response(
                    "200",
                    ResponseBuilder::new()
                        .description("service is up")
                        .content(JSON, ContentBuilder::new().schema(health_schema()).build())
                        .build(),
                )
                .build(),
        )
        .build();

    let doc = Doc { paths: PathsBuilder::new().path("/health", health), ..Default::default() }
        .resource::<Categories>()
        .resource::<Products>()
        .resource::<Items>();

    let mut tags = vec![TagBuilder::new().name("health").build()];
    tags.extend(doc.tags);

    OpenApiBuilder::new()
        .info(InfoBuilder::new().title("catalog").version(env!("CARGO_PKG_VERSION")).build())
        .paths(doc.paths.build())
        .components(Some(doc.components.build()))
        .tags(Some(tags))
        .build()
}
