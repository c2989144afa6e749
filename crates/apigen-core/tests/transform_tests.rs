use apigen_core::config::{ApigenConfig, NamingStrategy};
use apigen_core::ir::*;
use apigen_core::parse;
use apigen_core::transform::{self, TransformOptions};

const PETSTORE: &str = include_str!("fixtures/petstore.yaml");
const LEGACY: &str = include_str!("fixtures/legacy-3.0.yaml");

fn petstore() -> (IrModel, apigen_core::Diagnostics) {
    let doc = parse::from_yaml(PETSTORE).unwrap();
    transform::transform_with_options(&doc, &TransformOptions::default()).unwrap()
}

fn operation<'a>(ir: &'a IrModel, path: &str, method: HttpMethod) -> &'a IrOperation {
    ir.paths
        .get(path)
        .and_then(|ops| ops.get(&method))
        .unwrap_or_else(|| panic!("missing {} {path}", method.as_str()))
}

#[test]
fn transform_info_and_servers() {
    let (ir, _) = petstore();
    assert_eq!(ir.info.title, "Petstore");
    assert_eq!(ir.info.version, "1.0.0");
    let urls: Vec<_> = ir.servers.iter().map(|s| s.url.as_str()).collect();
    assert_eq!(
        urls,
        vec!["https://api.petstore.dev/v1", "https://uploads.petstore.dev"]
    );
}

#[test]
fn component_refs_stay_refs() {
    let (ir, _) = petstore();
    let page = &ir.components.schemas["PetPage"];
    let items = &page.properties["items"];
    assert!(items.is_type(IrSchemaType::Array));
    assert_eq!(
        items.items[0].ref_path.as_deref(),
        Some("#/components/schemas/Pet")
    );
}

#[test]
fn object_schema_shape() {
    let (ir, _) = petstore();
    let yaml = serde_yaml_ng::to_string(&ir.components.schemas["Error"]).unwrap();
    insta::assert_snapshot!(yaml, @r"
    type: object
    properties:
      code:
        type: integer
      message:
        type: string
    required:
    - code
    ");
}

#[test]
fn type_arrays_become_unions() {
    let (ir, _) = petstore();
    let tag = &ir.components.schemas["Pet"].properties["tag"];
    assert_eq!(tag.logical_operator, Some(LogicalOperator::Or));
    assert!(tag.admits_null());
    assert!(tag.items[0].is_type(IrSchemaType::String));
}

#[test]
fn all_of_becomes_intersection() {
    let (ir, _) = petstore();
    let new_pet = &ir.components.schemas["NewPet"];
    assert_eq!(new_pet.logical_operator, Some(LogicalOperator::And));
    assert_eq!(new_pet.items.len(), 2);
    assert!(new_pet.items[0].is_ref());
    assert!(new_pet.items[1].properties.contains_key("note"));
}

#[test]
fn enum_members_are_consts() {
    let (ir, _) = petstore();
    let status = &ir.components.schemas["Status"];
    assert!(status.is_type(IrSchemaType::Enum));
    let values: Vec<_> = status
        .items
        .iter()
        .map(|i| i.const_value.clone().unwrap())
        .collect();
    assert_eq!(values, vec!["available", "pending", "sold"]);
}

#[test]
fn read_only_sets_access_scope() {
    let (ir, _) = petstore();
    let created = &ir.components.schemas["Pet"].properties["createdAt"];
    assert_eq!(created.access_scope, Some(AccessScope::Read));
    assert_eq!(created.format.as_deref(), Some("date-time"));
}

#[test]
fn unresolved_component_ref_warns() {
    let (ir, diagnostics) = petstore();
    assert!(ir.components.schemas["Legacy"].is_type(IrSchemaType::Unknown));
    assert!(
        diagnostics
            .iter()
            .any(|d| d.location == "#/components/schemas/Legacy"
                && d.message.contains("#/components/schemas/Missing"))
    );
}

#[test]
fn json_media_type_is_preferred() {
    let (ir, _) = petstore();
    let list = operation(&ir, "/pets", HttpMethod::Get);
    let ok = &list.responses["200"];
    assert_eq!(ok.media_type.as_deref(), Some("application/json"));
    assert_eq!(
        ok.schema.ref_path.as_deref(),
        Some("#/components/schemas/PetPage")
    );
}

#[test]
fn default_response_is_error_when_success_exists() {
    let (ir, _) = petstore();
    let list = operation(&ir, "/pets", HttpMethod::Get);
    let groups = list.response_groups();
    assert_eq!(groups.success.keys().copied().collect::<Vec<_>>(), vec!["200"]);
    assert_eq!(groups.errors.keys().copied().collect::<Vec<_>>(), vec!["default"]);
}

#[test]
fn empty_responses() {
    let (ir, _) = petstore();
    let delete = operation(&ir, "/pets/{petId}", HttpMethod::Delete);
    let no_content = &delete.responses["204"];
    assert!(no_content.media_type.is_none());
    assert!(no_content.schema.is_type(IrSchemaType::Void));

    let put = operation(&ir, "/pets/{petId}", HttpMethod::Put);
    assert!(put.responses["200"].schema.is_type(IrSchemaType::Unknown));
}

#[test]
fn referenced_response_is_resolved() {
    let (ir, _) = petstore();
    let get = operation(&ir, "/pets/{petId}", HttpMethod::Get);
    let not_found = &get.responses["404"];
    assert_eq!(not_found.description.as_deref(), Some("Not found"));
    assert_eq!(
        not_found.schema.ref_path.as_deref(),
        Some("#/components/schemas/Error")
    );
}

#[test]
fn path_parameters_are_merged() {
    let (ir, _) = petstore();
    let list = operation(&ir, "/pets", HttpMethod::Get);
    assert!(list.parameters.header.contains_key("X-Request-Id"));
    assert_eq!(list.parameters.query.len(), 3);

    let get = operation(&ir, "/pets/{petId}", HttpMethod::Get);
    let pet_id = &get.parameters.path["petId"];
    assert!(pet_id.required);
    assert_eq!(pet_id.style, ParameterStyle::Simple);
    assert!(!pet_id.explode);
}

#[test]
fn parameter_style_defaults() {
    let (ir, _) = petstore();
    let list = operation(&ir, "/pets", HttpMethod::Get);
    let limit = &list.parameters.query["limit"];
    assert_eq!(limit.style, ParameterStyle::Form);
    assert!(limit.explode);
    assert_eq!(limit.schema.minimum, Some(1.0));

    let tags = &list.parameters.query["tags"];
    assert_eq!(tags.style, ParameterStyle::PipeDelimited);
    assert!(!tags.explode);
}

#[test]
fn pagination_is_detected() {
    let (ir, _) = petstore();
    let list = operation(&ir, "/pets", HttpMethod::Get);
    assert_eq!(list.parameters.query["cursor"].pagination, Some(Pagination::Root));
    assert_eq!(list.parameters.query["limit"].pagination, None);

    let search = operation(&ir, "/search", HttpMethod::Post);
    let body = search.body.as_ref().unwrap();
    assert_eq!(body.pagination, Some(Pagination::Field("page".to_string())));
}

#[test]
fn request_bodies() {
    let (ir, _) = petstore();
    let create = operation(&ir, "/pets", HttpMethod::Post);
    let body = create.body.as_ref().unwrap();
    assert!(body.required);
    assert_eq!(body.kind, Some(MediaKind::Json));
    assert_eq!(
        body.schema.ref_path.as_deref(),
        Some("#/components/schemas/NewPet")
    );

    let upload = operation(&ir, "/pets/{petId}", HttpMethod::Put);
    let body = upload.body.as_ref().unwrap();
    assert_eq!(body.kind, Some(MediaKind::OctetStream));
    assert!(body.schema.is_type(IrSchemaType::String));
    assert_eq!(body.schema.format.as_deref(), Some("binary"));

    assert!(ir.components.request_bodies.contains_key("NewPetBody"));
    assert!(ir.components.parameters.contains_key("PetId"));
}

#[test]
fn operation_ids_are_unique() {
    let (ir, _) = petstore();
    assert_eq!(operation(&ir, "/pets", HttpMethod::Get).id, "listPets");
    assert_eq!(
        operation(&ir, "/pets/{petId}", HttpMethod::Put).id,
        "listPetsPetsByPetId"
    );
    assert_eq!(operation(&ir, "/search", HttpMethod::Post).id, "createSearch");
}

#[test]
fn route_based_naming() {
    let doc = parse::from_yaml(PETSTORE).unwrap();
    let options = TransformOptions {
        naming_strategy: NamingStrategy::UseRouteBased,
        ..Default::default()
    };
    let (ir, _) = transform::transform_with_options(&doc, &options).unwrap();
    assert_eq!(operation(&ir, "/pets", HttpMethod::Get).id, "listPets");
    assert_eq!(operation(&ir, "/pets", HttpMethod::Post).id, "createPets");
    assert_eq!(operation(&ir, "/pets/{petId}", HttpMethod::Get).id, "getPet");
}

#[test]
fn aliases_rename_operations() {
    let doc = parse::from_yaml(PETSTORE).unwrap();
    let mut config = ApigenConfig::default();
    config
        .naming
        .aliases
        .insert("getPet".to_string(), "fetch_pet".to_string());
    let options = TransformOptions::from_config(&config);
    let (ir, _) = transform::transform_with_options(&doc, &options).unwrap();
    assert_eq!(operation(&ir, "/pets/{petId}", HttpMethod::Get).id, "fetchPet");
}

#[test]
fn empty_alias_is_rejected() {
    let doc = parse::from_yaml(PETSTORE).unwrap();
    let mut options = TransformOptions::default();
    options.aliases.insert("getPet".to_string(), String::new());
    assert!(transform::transform_with_options(&doc, &options).is_err());
}

#[test]
fn security_is_flattened() {
    let (ir, _) = petstore();
    let list = operation(&ir, "/pets", HttpMethod::Get);
    let names: Vec<_> = list.security.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["bearerAuth"]);
    match &list.security[0].kind {
        IrSecuritySchemeKind::Http { scheme, bearer_format } => {
            assert_eq!(scheme, "bearer");
            assert_eq!(bearer_format.as_deref(), Some("JWT"));
        }
        other => panic!("expected http scheme, got {other:?}"),
    }

    let get = operation(&ir, "/pets/{petId}", HttpMethod::Get);
    let names: Vec<_> = get.security.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["apiKey", "bearerAuth"]);

    let create = operation(&ir, "/pets", HttpMethod::Post);
    assert!(create.security.is_empty());
}

#[test]
fn operation_servers_are_kept() {
    let (ir, _) = petstore();
    let upload = operation(&ir, "/pets/{petId}", HttpMethod::Put);
    assert_eq!(upload.servers.len(), 1);
    assert_eq!(upload.servers[0].url, "https://uploads.petstore.dev");
}

#[test]
fn webhooks_are_collected() {
    let (ir, _) = petstore();
    let hooks: Vec<_> = ir.webhook_operations().collect();
    assert_eq!(hooks.len(), 1);
    assert_eq!(hooks[0].id, "createNewPet");
    assert_eq!(hooks[0].path, "newPet");
    assert_eq!(ir.operations().count(), 6);
}

#[test]
fn legacy_nullable_and_exclusive_bounds() {
    let doc = parse::from_yaml(LEGACY).unwrap();
    let ir = transform::transform(&doc).unwrap();
    let user = &ir.components.schemas["User"];

    let nickname = &user.properties["nickname"];
    assert!(nickname.admits_null());
    assert_eq!(nickname.description.as_deref(), Some("Display name"));

    let age = &user.properties["age"];
    assert_eq!(age.exclusive_minimum, Some(0.0));
    assert_eq!(age.minimum, None);

    let friends = &user.properties["friends"];
    assert_eq!(
        friends.items[0].ref_path.as_deref(),
        Some("#/components/schemas/User")
    );
}

#[test]
fn non_component_refs_are_inlined() {
    let doc = parse::from_yaml(LEGACY).unwrap();
    let ir = transform::transform(&doc).unwrap();
    let address = &ir.components.schemas["User"].properties["address"];
    assert!(address.ref_path.is_none());
    assert!(address.properties.contains_key("city"));

    let avatar = operation(&ir, "/users/{id}/avatar", HttpMethod::Get);
    assert_eq!(avatar.responses["200"].media_type.as_deref(), Some("image/png"));
}

#[test]
fn legacy_parameters() {
    let doc = parse::from_yaml(LEGACY).unwrap();
    let (ir, diagnostics) =
        transform::transform_with_options(&doc, &TransformOptions::default()).unwrap();
    let get = operation(&ir, "/users/{id}", HttpMethod::Get);
    assert_eq!(get.id, "getUser");
    assert!(get.parameters.path["id"].required);

    let filter = &get.parameters.query["filter"];
    assert!(filter.schema.properties.contains_key("role"));

    let sort = &get.parameters.query["sort"];
    assert_eq!(sort.style, ParameterStyle::Form);
    assert!(diagnostics.iter().any(|d| d.message.contains("sideways")));
}

#[test]
fn unrecognized_type_becomes_unknown_with_warning() {
    let doc = parse::from_yaml(
        r#"
openapi: 3.0.3
info: {title: T, version: "1"}
components:
  schemas:
    Upload:
      type: object
      properties:
        file:
          type: file
"#,
    )
    .unwrap();
    let (ir, diagnostics) =
        transform::transform_with_options(&doc, &TransformOptions::default()).unwrap();

    let file = &ir.components.schemas["Upload"].properties["file"];
    assert!(file.is_type(IrSchemaType::Unknown));
    assert_eq!(diagnostics.len(), 1);
    let warning = diagnostics.iter().next().unwrap();
    assert!(warning.location.ends_with("/properties/file"), "{}", warning.location);
    assert!(warning.message.contains("unrecognized `type`"));
}
