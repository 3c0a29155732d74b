use oas3::spec::{ParameterIn, ParameterStyle, Schema, SchemaType, SchemaTypeSet};

use super::common::{
  component, component_names, generate_library, library_pool, object, operation, parameters, ref_path,
  request_schema, response_schema,
};
use crate::generator::{
  config::{GeneratorConfig, OutputFormat},
  http_rule::HttpMethod,
  metrics::GenerationWarning,
  orchestrator::Orchestrator,
};

fn parameter_names(operation: &oas3::spec::Operation) -> Vec<&str> {
  parameters(operation).into_iter().map(|p| p.name.as_str()).collect()
}

#[test]
fn test_paths_are_rendered_with_json_names() {
  let output = generate_library(GeneratorConfig::default());
  let paths = output.spec.paths.as_ref().unwrap().keys().map(String::as_str).collect::<Vec<_>>();

  assert_eq!(
    paths,
    vec![
      "/v1/books",
      "/v1/books/{name}",
      "/v1/books/{name}:move",
      "/v1/books:publish",
      "/v1/shelves/{parent}/books",
    ]
  );
}

#[test]
fn test_get_book_operation() {
  let output = generate_library(GeneratorConfig::default());
  let get_book = operation(&output.spec, "/v1/books/{name}", HttpMethod::Get);

  assert_eq!(get_book.operation_id.as_deref(), Some("getBook"));
  assert_eq!(get_book.description.as_deref(), Some("Returns a single book."));
  assert!(get_book.request_body.is_none());
  assert_eq!(get_book.deprecated, None);

  let params = parameters(get_book);
  assert_eq!(params.len(), 1);
  assert_eq!(params[0].name, "name");
  assert!(matches!(params[0].location, ParameterIn::Path));
  assert_eq!(params[0].required, Some(true));

  assert_eq!(ref_path(response_schema(get_book)), Some("#/components/schemas/Book"));
}

#[test]
fn test_response_description_names_the_rpc() {
  let output = generate_library(GeneratorConfig::default());
  let get_book = operation(&output.spec, "/v1/books/{name}", HttpMethod::Get);
  let Some(oas3::spec::ObjectOrReference::Object(response)) =
    get_book.responses.as_ref().and_then(|responses| responses.get("200"))
  else {
    panic!("expected an inline 200 response");
  };

  assert_eq!(
    response.description.as_deref(),
    Some("library.v1.LibraryService.GetBook response")
  );
}

#[test]
fn test_list_books_flattens_query_parameters() {
  let output = generate_library(GeneratorConfig::default());
  let list_books = operation(&output.spec, "/v1/shelves/{parent}/books", HttpMethod::Get);

  assert_eq!(list_books.operation_id.as_deref(), Some("listBooks"));
  assert_eq!(
    parameter_names(list_books),
    vec!["parent", "filter.author", "filter.genre", "ids", "pageSize"]
  );

  let params = parameters(list_books);
  assert!(matches!(params[0].location, ParameterIn::Path));
  assert!(params[1..].iter().all(|p| matches!(p.location, ParameterIn::Query)));
  assert!(params[1..].iter().all(|p| p.required.is_none()));

  let author = object(params[1].schema.as_ref().unwrap());
  assert_eq!(
    author.schema_type,
    Some(SchemaTypeSet::Multiple(vec![SchemaType::String, SchemaType::Null]))
  );

  let genre = params[2].schema.as_ref().unwrap();
  assert_eq!(ref_path(genre), Some("#/components/schemas/Genre"));
}

#[test]
fn test_repeated_query_parameter_is_exploded_with_format() {
  let output = generate_library(GeneratorConfig::default());
  let list_books = operation(&output.spec, "/v1/shelves/{parent}/books", HttpMethod::Get);
  let ids = parameters(list_books)
    .into_iter()
    .find(|p| p.name == "ids")
    .unwrap();

  assert!(matches!(ids.style, Some(ParameterStyle::Form)));
  assert_eq!(ids.explode, Some(true));

  let schema = object(ids.schema.as_ref().unwrap());
  assert_eq!(schema.schema_type, Some(SchemaTypeSet::Single(SchemaType::Array)));
  let Some(Schema::Object(items)) = schema.items.as_deref() else {
    panic!("expected array items");
  };
  assert_eq!(object(items).format.as_deref(), Some("uuid"));
}

#[test]
fn test_internal_fields_are_not_query_parameters() {
  let output = generate_library(GeneratorConfig::default());
  let list_books = operation(&output.spec, "/v1/shelves/{parent}/books", HttpMethod::Get);

  assert!(!parameter_names(list_books).contains(&"debugToken"));
}

#[test]
fn test_additional_binding_has_no_operation_id() {
  let output = generate_library(GeneratorConfig::default());
  let list_all = operation(&output.spec, "/v1/books", HttpMethod::Get);

  assert_eq!(list_all.operation_id, None);
  assert_eq!(
    parameter_names(list_all),
    vec!["filter.author", "filter.genre", "ids", "pageSize", "parent"]
  );
  assert!(
    parameters(list_all)
      .iter()
      .all(|p| matches!(p.location, ParameterIn::Query))
  );
}

#[test]
fn test_body_field_selector() {
  let output = generate_library(GeneratorConfig::default());
  let create_book = operation(&output.spec, "/v1/shelves/{parent}/books", HttpMethod::Post);

  assert_eq!(create_book.operation_id.as_deref(), Some("createBook"));
  assert_eq!(parameter_names(create_book), vec!["parent"]);
  assert_eq!(ref_path(request_schema(create_book)), Some("#/components/schemas/Book"));

  let Some(oas3::spec::ObjectOrReference::Object(body)) = create_book.request_body.as_ref() else {
    panic!("expected an inline request body");
  };
  assert_eq!(body.required, Some(true));
}

#[test]
fn test_wildcard_body_with_path_parameters_is_inline() {
  let output = generate_library(GeneratorConfig::default());
  let move_book = operation(&output.spec, "/v1/books/{name}:move", HttpMethod::Post);

  assert_eq!(parameter_names(move_book), vec!["name"]);
  let body = object(request_schema(move_book));
  assert_eq!(body.properties.keys().collect::<Vec<_>>(), vec!["destinationShelf"]);
  assert!(body.required.is_empty());
}

#[test]
fn test_wildcard_body_without_path_parameters_refers_to_input() {
  let output = generate_library(GeneratorConfig::default());
  let publish = operation(&output.spec, "/v1/books:publish", HttpMethod::Post);

  assert!(publish.parameters.is_empty());
  assert_eq!(
    ref_path(request_schema(publish)),
    Some("#/components/schemas/PublishBookRequest")
  );
  assert_eq!(ref_path(response_schema(publish)), Some("#/components/schemas/Book"));
}

#[test]
fn test_deprecated_method() {
  let output = generate_library(GeneratorConfig::default());
  let delete_book = operation(&output.spec, "/v1/books/{name}", HttpMethod::Delete);

  assert_eq!(delete_book.operation_id.as_deref(), Some("deleteBook"));
  assert_eq!(delete_book.deprecated, Some(true));
  assert_eq!(ref_path(response_schema(delete_book)), Some("#/components/schemas/Empty"));
}

#[test]
fn test_components_cover_reachable_types_only() {
  let output = generate_library(GeneratorConfig::default());

  assert_eq!(
    component_names(&output.spec),
    vec![
      "Author",
      "Book",
      "Empty",
      "Genre",
      "ListBooksRequest.Filter",
      "ListBooksResponse",
      "PublishBookRequest",
      "PublishBookResponse",
    ]
  );
}

#[test]
fn test_book_schema() {
  let output = generate_library(GeneratorConfig::default());
  let book = component(&output.spec, "Book");

  assert_eq!(book.description.as_deref(), Some("A single book in the library."));
  assert_eq!(book.required, vec!["name".to_string()]);
  assert_eq!(
    book.properties.keys().map(String::as_str).collect::<Vec<_>>(),
    vec!["author", "createTime", "genre", "name", "pageCount", "ratings", "tags", "title"]
  );

  let name = object(&book.properties["name"]);
  assert_eq!(name.description.as_deref(), Some("Resource name of the book."));

  let create_time = object(&book.properties["createTime"]);
  assert_eq!(create_time.format.as_deref(), Some("date-time"));

  let ratings = object(&book.properties["ratings"]);
  assert!(ratings.additional_properties.is_some());

  let page_count = object(&book.properties["pageCount"]);
  assert_eq!(page_count.format.as_deref(), Some("int64"));
  assert_eq!(page_count.deprecated, Some(true));

  assert_eq!(
    ref_path(&book.properties["author"]),
    Some("#/components/schemas/Author")
  );
}

#[test]
fn test_enum_schema() {
  let output = generate_library(GeneratorConfig::default());
  let genre = component(&output.spec, "Genre");

  assert_eq!(genre.description.as_deref(), Some("Literary genre."));
  assert_eq!(genre.schema_type, Some(SchemaTypeSet::Single(SchemaType::String)));
  assert_eq!(
    genre.enum_values,
    vec![
      serde_json::json!("GENRE_UNSPECIFIED"),
      serde_json::json!("FICTION"),
      serde_json::json!("NON_FICTION"),
    ]
  );
}

#[test]
fn test_statistics() {
  let output = generate_library(GeneratorConfig::default());
  let stats = &output.stats;

  assert_eq!(stats.operations_converted, 7);
  assert_eq!(stats.additional_bindings, 1);
  assert_eq!(stats.methods_skipped, 1);
  assert_eq!(stats.schemas_generated, 8);
  assert_eq!(stats.messages_generated, 7);
  assert_eq!(stats.enums_generated, 1);
  assert_eq!(stats.cycles_detected, 1);
  assert_eq!(stats.cycle_details, vec![vec!["library.v1.Author".to_string()]]);
  assert_eq!(
    stats.warnings,
    vec![GenerationWarning::MethodSkipped {
      method: "library.v1.LibraryService.WatchBooks".to_string()
    }]
  );
}

#[test]
fn test_all_schemas_adds_unreferenced_declarations() {
  let config = GeneratorConfig::builder().all_schemas(true).build();
  let output = generate_library(config);
  let names = component_names(&output.spec);

  assert!(names.contains(&"Shelf"));
  assert_eq!(names.len(), 9);
  assert!(!names.iter().any(|name| name.ends_with("Request") && *name != "PublishBookRequest"));
  assert!(!names.contains(&"Book.RatingsEntry"));
}

#[test]
fn test_dependency_files_are_not_generated() {
  let pool = library_pool();

  assert_eq!(pool.files().len(), 4);
  assert_eq!(
    pool.generated_files().map(|file| file.name.as_str()).collect::<Vec<_>>(),
    vec!["library/v1/library.proto"]
  );
  assert_eq!(pool.services().count(), 1);
}

#[test]
fn test_info_block_follows_config() {
  let config = GeneratorConfig::builder()
    .title("Library".to_string())
    .description("Books and shelves".to_string())
    .version("2.0.0".to_string())
    .build();
  let output = generate_library(config);

  assert_eq!(output.spec.openapi, "3.1.0");
  assert_eq!(output.spec.info.title, "Library");
  assert_eq!(output.spec.info.description.as_deref(), Some("Books and shelves"));
  assert_eq!(output.spec.info.version, "2.0.0");
}

#[test]
fn test_yaml_render_is_deterministic() {
  let first = Orchestrator::new(library_pool(), GeneratorConfig::default());
  let second = Orchestrator::new(library_pool(), GeneratorConfig::default());

  let first = first.render(&first.generate().unwrap().spec).unwrap();
  let second = second.render(&second.generate().unwrap().spec).unwrap();

  assert_eq!(first, second);
  assert!(first.contains("operationId: getBook"));
}

#[test]
fn test_yaml_render_with_custom_indent_parses_back() {
  let reference = Orchestrator::new(library_pool(), GeneratorConfig::default());
  let reference = reference.render(&reference.generate().unwrap().spec).unwrap();
  let reference = serde_json::to_value(oas3::from_yaml(&reference).unwrap()).unwrap();

  for indent in [3, 4, 8] {
    let orchestrator = Orchestrator::new(library_pool(), GeneratorConfig::builder().indent(indent).build());
    let rendered = orchestrator.render(&orchestrator.generate().unwrap().spec).unwrap();

    let parsed = oas3::from_yaml(&rendered).unwrap();
    assert_eq!(serde_json::to_value(parsed).unwrap(), reference, "indent {indent}");
  }

  let orchestrator = Orchestrator::new(library_pool(), GeneratorConfig::builder().indent(4).build());
  let rendered = orchestrator.render(&orchestrator.generate().unwrap().spec).unwrap();
  assert!(rendered.contains("\n        get:\n            "));
}

#[test]
fn test_json_render_uses_configured_indent() {
  let config = GeneratorConfig::builder().format(OutputFormat::Json).indent(4).build();
  let orchestrator = Orchestrator::new(library_pool(), config);
  let output = orchestrator.generate().unwrap();
  let rendered = orchestrator.render(&output.spec).unwrap();

  assert!(rendered.starts_with("{\n    \""));
  assert!(rendered.ends_with("}\n"));

  let value = serde_json::from_str::<serde_json::Value>(&rendered).unwrap();
  assert_eq!(value["paths"]["/v1/books/{name}"]["get"]["operationId"], "getBook");
}

#[test]
fn test_mapping_operations() {
  let output = generate_library(GeneratorConfig::default());
  let mapping = &output.mapping;

  assert_eq!(mapping.services.len(), 1);
  assert_eq!(mapping.services[0].proto_name, "library.v1.LibraryService");

  let summary = mapping
    .methods()
    .map(|method| (method.http_method, method.path.as_str(), method.proto_name.as_str()))
    .collect::<Vec<_>>();
  assert_eq!(
    summary,
    vec![
      (HttpMethod::Get, "/v1/books", "library.v1.LibraryService.ListBooks"),
      (HttpMethod::Get, "/v1/books/{name}", "library.v1.LibraryService.GetBook"),
      (HttpMethod::Delete, "/v1/books/{name}", "library.v1.LibraryService.DeleteBook"),
      (HttpMethod::Post, "/v1/books/{name}:move", "library.v1.LibraryService.MoveBook"),
      (HttpMethod::Post, "/v1/books:publish", "library.v1.LibraryService.PublishBook"),
      (HttpMethod::Get, "/v1/shelves/{parent}/books", "library.v1.LibraryService.ListBooks"),
      (HttpMethod::Post, "/v1/shelves/{parent}/books", "library.v1.LibraryService.CreateBook"),
    ]
  );
}

#[test]
fn test_mapping_input_and_output() {
  let output = generate_library(GeneratorConfig::default());
  let find = |path: &str, method: HttpMethod| {
    output
      .mapping
      .methods()
      .find(|m| m.path == path && m.http_method == method)
      .unwrap()
  };

  let list_books = find("/v1/shelves/{parent}/books", HttpMethod::Get);
  assert_eq!(list_books.input.path[0].proto_path, "parent");
  let author = list_books
    .input
    .query
    .iter()
    .find(|field| field.schema_name == "filter.author")
    .unwrap();
  assert_eq!(author.proto_path, "filter.author");
  assert_eq!(
    list_books
      .input
      .query
      .iter()
      .find(|field| field.schema_name == "pageSize")
      .map(|field| field.proto_ident.as_str()),
    Some("page_size")
  );
  assert!(list_books.input.body.is_none());

  let create_book = find("/v1/shelves/{parent}/books", HttpMethod::Post);
  let body = create_book.input.body.as_ref().unwrap();
  assert_eq!(body.schema.as_deref(), Some("Book"));
  assert_eq!(body.field.as_ref().map(|field| field.proto_path.as_str()), Some("book"));

  let publish = find("/v1/books:publish", HttpMethod::Post);
  assert!(publish.input.path.is_empty() && publish.input.query.is_empty());
  let body = publish.input.body.as_ref().unwrap();
  assert_eq!(body.schema.as_deref(), Some("PublishBookRequest"));
  assert_eq!(body.field, None);
  assert_eq!(publish.output.schema.as_deref(), Some("Book"));
  assert_eq!(
    publish.output.field.as_ref().map(|field| field.proto_path.as_str()),
    Some("book")
  );

  let move_book = find("/v1/books/{name}:move", HttpMethod::Post);
  let body = move_book.input.body.as_ref().unwrap();
  assert_eq!(body.schema, None);
  assert_eq!(body.field, None);
  assert_eq!(move_book.input.path.len(), 1);
}

#[test]
fn test_mapping_types() {
  let output = generate_library(GeneratorConfig::default());
  let mapping = &output.mapping;

  assert_eq!(
    mapping
      .messages
      .iter()
      .map(|message| message.proto_type.as_str())
      .collect::<Vec<_>>(),
    vec![
      "google.protobuf.Empty",
      "library.v1.Author",
      "library.v1.Book",
      "library.v1.ListBooksRequest.Filter",
      "library.v1.ListBooksResponse",
      "library.v1.PublishBookRequest",
      "library.v1.PublishBookResponse",
    ]
  );

  let book = mapping
    .messages
    .iter()
    .find(|message| message.proto_type == "library.v1.Book")
    .unwrap();
  let create_time = book.fields.iter().find(|field| field.schema_name == "createTime").unwrap();
  assert_eq!(create_time.proto_ident, "create_time");

  assert_eq!(mapping.enums.len(), 1);
  let genre = &mapping.enums[0];
  assert_eq!(genre.schema_name, "Genre");
  assert_eq!(genre.name_to_value.get("FICTION"), Some(&1));
  assert_eq!(genre.value_to_name.get(&2).map(String::as_str), Some("NON_FICTION"));
}

#[test]
fn test_mapping_json_omits_missing_operation_ids() {
  let orchestrator = Orchestrator::new(library_pool(), GeneratorConfig::default());
  let output = orchestrator.generate().unwrap();
  let rendered = orchestrator.render_mapping(&output.mapping).unwrap();
  let value = serde_json::from_str::<serde_json::Value>(&rendered).unwrap();

  let first = &value["services"][0]["methods"][0];
  assert_eq!(first["http_method"], "GET");
  assert_eq!(first["path"], "/v1/books");
  assert!(first.get("operation_id").is_none());
}
