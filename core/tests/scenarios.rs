use oasgen_core::{
    AppError, DocumentGenerator, Framework, GeneratorSettings, HttpMethod, ParameterKind,
    ReflectionSnapshot, SchemaType,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn generate(settings: GeneratorSettings, yaml: &str) -> oasgen_core::Document {
    let snapshot = ReflectionSnapshot::from_yaml(yaml).unwrap();
    DocumentGenerator::new(settings)
        .unwrap()
        .generate(&snapshot)
        .unwrap()
}

const PERSONS: &str = r#"
types:
  - name: Person
    kind: object
    properties:
      - name: FirstName
        type: string
      - name: LastName
        type: string
controllers:
  - name: PersonsController
    attributes:
      - kind: route_prefix
        prefix: api/Persons
    actions:
      - name: Get
        returns: Vec<Person>
      - name: Get
        parameters:
          - name: id
            type: int32
        returns: Person
        attributes:
          - kind: route
            template: "{id}"
      - name: Post
        parameters:
          - name: person
            type: Person
            attributes:
              - kind: bind
                source: body
        attributes:
          - kind: http_method
            method: post
      - name: Put
        parameters:
          - name: id
            type: int32
          - name: person
            type: Person
            attributes:
              - kind: bind
                source: body
        attributes:
          - kind: route
            template: "{id}"
      - name: Delete
        parameters:
          - name: id
            type: int32
        attributes:
          - kind: route
            template: "{id}"
"#;

#[test]
fn test_persons_controller_paths() {
    let document = generate(GeneratorSettings::default(), PERSONS);

    let paths: Vec<&str> = document.paths.keys().map(String::as_str).collect();
    assert_eq!(paths, vec!["/api/Persons", "/api/Persons/{id}"]);

    let methods = |path: &str| -> Vec<HttpMethod> {
        document.paths[path].iter().map(|(m, _)| m).collect()
    };
    assert_eq!(methods("/api/Persons"), vec![HttpMethod::Get, HttpMethod::Post]);
    assert_eq!(
        methods("/api/Persons/{id}"),
        vec![HttpMethod::Get, HttpMethod::Put, HttpMethod::Delete]
    );
    assert_eq!(document.operations().count(), 5);
}

#[test]
fn test_persons_operation_ids_are_unique() {
    let document = generate(GeneratorSettings::default(), PERSONS);
    let ids: Vec<&str> = document
        .operations()
        .map(|(_, _, op)| op.operation_id.as_str())
        .collect();
    assert_eq!(
        ids,
        vec![
            "Persons_Get",
            "Persons_Post",
            "Persons_Get_2",
            "Persons_Put",
            "Persons_Delete"
        ]
    );
}

#[test]
fn test_persons_bodies_and_definitions() {
    let document = generate(GeneratorSettings::default(), PERSONS);
    let put = document.operation("/api/Persons/{id}", HttpMethod::Put).unwrap();
    assert_eq!(put.body_parameter_count(), 1);
    let body = put.body_parameter().unwrap();
    assert_eq!(body.schema, json!({ "$ref": "#/components/schemas/Person" }));
    assert!(body.is_required);

    let id = &put.parameters[0];
    assert_eq!(id.kind, ParameterKind::Path);
    assert!(id.is_required);

    assert_eq!(document.definitions.keys().collect::<Vec<_>>(), vec!["Person"]);

    let json = document.to_json();
    assert_eq!(
        json["paths"]["/api/Persons"]["get"]["responses"]["200"]["content"]["application/json"]
            ["schema"],
        json!({ "type": "array", "items": { "$ref": "#/components/schemas/Person" } })
    );
    assert_eq!(
        json["paths"]["/api/Persons"]["post"]["requestBody"]["content"]["application/json"]
            ["schema"],
        json!({ "$ref": "#/components/schemas/Person" })
    );
    assert_eq!(json["tags"], json!([{ "name": "Persons" }]));
}

#[test]
fn test_accept_verbs_select_the_method() {
    let yaml = r#"
controllers:
  - name: CalcController
    actions:
      - name: AddPost
        returns: int32
        parameters:
          - name: a
            type: int32
          - name: b
            type: int32
        attributes:
          - kind: accept_verbs
            methods: [post]
      - name: AddGet
        returns: int32
        parameters:
          - name: a
            type: int32
          - name: b
            type: int32
        attributes:
          - kind: accept_verbs
            methods: [GET]
"#;
    let document = generate(GeneratorSettings::default(), yaml);
    let post = document.operation("/api/Calc", HttpMethod::Post).unwrap();
    assert_eq!(post.operation_id, "Calc_AddPost");
    let get = document.operation("/api/Calc", HttpMethod::Get).unwrap();
    assert_eq!(get.operation_id, "Calc_AddGet");

    let query: Vec<(&str, ParameterKind, bool)> = get
        .parameters
        .iter()
        .map(|p| (p.name.as_str(), p.kind, p.is_required))
        .collect();
    assert_eq!(
        query,
        vec![
            ("a", ParameterKind::Query, true),
            ("b", ParameterKind::Query, true)
        ]
    );
}

#[test]
fn test_declared_conflict_response() {
    let yaml = r#"
controllers:
  - name: AccountsController
    actions:
      - name: Register
        returns: int32
        attributes:
          - kind: response_type
            status: 409
            type: string
"#;
    let document = generate(GeneratorSettings::default(), yaml);
    let json = document.to_json();
    assert_eq!(
        json["paths"]["/api/Accounts"]["post"]["responses"],
        json!({
            "409": {
                "description": "Conflict",
                "content": { "application/json": { "schema": { "type": "string" } } }
            }
        })
    );
}

#[test]
fn test_complex_query_parameter_is_flattened() {
    let yaml = r#"
types:
  - name: MyParameter
    kind: object
    properties:
      - name: Foo
        type: string
      - name: Bar
        type: string
        attributes:
          - kind: json_property
            name: bar
controllers:
  - name: DataController
    actions:
      - name: Get
        parameters:
          - name: data
            type: MyParameter
            attributes:
              - kind: bind
                source: query
"#;
    let document = generate(GeneratorSettings::default(), yaml);
    let op = document.operation("/api/Data", HttpMethod::Get).unwrap();
    let params: Vec<(&str, ParameterKind)> = op
        .parameters
        .iter()
        .map(|p| (p.name.as_str(), p.kind))
        .collect();
    assert_eq!(
        params,
        vec![("Foo", ParameterKind::Query), ("bar", ParameterKind::Query)]
    );
    assert!(document.definitions.is_empty());
}

#[test]
fn test_multipart_form_with_files() {
    let yaml = r#"
types:
  - name: UploadRequest
    kind: object
    properties:
      - name: Files
        type: Vec<file>
      - name: Title
        type: string
controllers:
  - name: UploadController
    actions:
      - name: Upload
        parameters:
          - name: request
            type: UploadRequest
            attributes:
              - kind: bind
                source: form
"#;
    let document = generate(GeneratorSettings::default(), yaml);
    assert_eq!(document.consumes, vec!["multipart/form-data"]);

    let json = document.to_json();
    assert_eq!(
        json["paths"]["/api/Upload"]["post"]["requestBody"],
        json!({
            "content": {
                "multipart/form-data": {
                    "schema": {
                        "type": "object",
                        "properties": {
                            "Files": {
                                "type": "array",
                                "items": { "type": "string", "format": "binary" }
                            },
                            "Title": { "type": "string" }
                        }
                    }
                }
            }
        })
    );
}

#[test]
fn test_multipart_form_in_swagger2() {
    let yaml = r#"
controllers:
  - name: UploadController
    actions:
      - name: Upload
        parameters:
          - name: file
            type: file
          - name: title
            type: string
            attributes:
              - kind: bind
                source: form
"#;
    let settings = GeneratorSettings::default().with_schema_type(SchemaType::Swagger2);
    let document = generate(settings, yaml);
    let json = document.to_json();
    assert_eq!(json["consumes"], json!(["multipart/form-data"]));
    assert_eq!(
        json["paths"]["/api/Upload"]["post"]["parameters"],
        json!([
            {
                "name": "file",
                "in": "formData",
                "required": false,
                "type": "file",
                "x-position": 1
            },
            {
                "name": "title",
                "in": "formData",
                "required": false,
                "type": "string",
                "x-position": 2
            }
        ])
    );
}

#[test]
fn test_native_descriptions() {
    let yaml = r#"
types:
  - name: Order
    kind: object
    properties:
      - name: Id
        type: int32
controllers:
  - name: OrdersController
    actions:
      - name: GetOrder
        parameters:
          - name: id
            type: int32
        returns: Task<ActionResult<Order>>
      - name: Archive
        parameters:
          - name: id
            type: int32
api_descriptions:
  - controller: OrdersController
    action: GetOrder
    http_method: get
    relative_path: "Api/Orders/{id}/{version}"
    group_name: v1
    parameters:
      - name: id
        source: path
        parameter: id
    supported_response_types:
      - status_code: 200
      - status_code: 404
  - controller: OrdersController
    action: Archive
    http_method: post
    relative_path: "api/v2/orders/{id}/archive"
    group_name: v2
    parameters:
      - name: id
        source: path
"#;
    let settings = GeneratorSettings {
        lowercase_paths: true,
        api_group_names: vec!["v1".into()],
        ..Default::default()
    }
    .with_framework(Framework::AspNetCore);
    let document = generate(settings, yaml);

    let paths: Vec<&str> = document.paths.keys().map(String::as_str).collect();
    assert_eq!(paths, vec!["/api/orders/{id}"]);
    let op = document.operation("/api/orders/{id}", HttpMethod::Get).unwrap();
    assert_eq!(op.operation_id, "Orders_GetOrder");
    assert_eq!(op.responses.keys().collect::<Vec<_>>(), vec!["200", "404"]);
    assert_eq!(
        op.responses["200"].schema,
        Some(json!({ "$ref": "#/components/schemas/Order" }))
    );
    assert_eq!(op.responses["404"].schema, None);
    assert_eq!(op.responses["404"].description, "Not Found");
}

#[test]
fn test_attribute_declared_processors() {
    let yaml = r#"
controllers:
  - name: LegacyController
    attributes:
      - kind: operation_processor
        name: require_header
        arguments: ["X-Api-Key"]
    actions:
      - name: GetAll
        attributes:
          - kind: operation_processor
            name: deprecate
      - name: GetHidden
        attributes:
          - kind: route
            template: "api/hidden"
          - kind: operation_processor
            name: exclude
"#;
    let document = generate(GeneratorSettings::default(), yaml);
    assert_eq!(document.operations().count(), 1);
    let op = document.operation("/api/Legacy", HttpMethod::Get).unwrap();
    assert!(op.is_deprecated);
    assert_eq!(op.parameters[0].name, "X-Api-Key");
    assert_eq!(op.parameters[0].kind, ParameterKind::Header);
}

#[test]
fn test_unknown_attribute_processor_fails_before_generation() {
    let yaml = r#"
controllers:
  - name: LegacyController
    actions:
      - name: GetAll
        attributes:
          - kind: operation_processor
            name: does_not_exist
"#;
    let snapshot = ReflectionSnapshot::from_yaml(yaml).unwrap();
    let result = DocumentGenerator::new(GeneratorSettings::default())
        .unwrap()
        .generate(&snapshot);
    assert!(matches!(result, Err(AppError::Config(_))));
}
