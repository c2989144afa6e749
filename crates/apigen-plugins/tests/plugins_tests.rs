use std::fs;

use apigen_compiler::{CompilerError, OutputFile};
use apigen_core::config::{
    ApigenConfig, PluginConfig, StringCase, TransformersOptions, TypeScriptOptions,
};
use apigen_core::ir::IrModel;
use apigen_core::{parse, transform};
use apigen_plugins::{
    GenerateOutput, Pipeline, Plugin, PluginContext, PluginError, generate, instantiate,
};

const CLINIC: &str = include_str!("fixtures/clinic.yaml");

fn clinic() -> IrModel {
    let doc = parse::from_yaml(CLINIC).unwrap();
    transform::transform(&doc).unwrap()
}

fn file<'a>(output: &'a GenerateOutput, path: &str) -> &'a OutputFile {
    output
        .files
        .iter()
        .find(|f| f.path == path)
        .unwrap_or_else(|| panic!("missing output {path}"))
}

fn content<'a>(output: &'a GenerateOutput, path: &str) -> &'a str {
    file(output, path)
        .content
        .as_deref()
        .unwrap_or_else(|| panic!("{path} is empty"))
}

fn with_plugins(plugins: Vec<PluginConfig>) -> ApigenConfig {
    ApigenConfig {
        plugins,
        ..Default::default()
    }
}

#[test]
fn default_config_outputs() {
    let output = generate(&clinic(), &ApigenConfig::default()).unwrap();
    let paths: Vec<_> = output.files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(paths, vec!["types.gen.ts", "transformers.gen.ts", "index.ts"]);
    assert!(output.diagnostics.is_empty());
}

#[test]
fn types_file_declarations() {
    let output = generate(&clinic(), &ApigenConfig::default()).unwrap();
    let types = content(&output, "types.gen.ts");

    assert!(types.starts_with("// This file is auto-generated by apigen."));
    assert!(types.contains("/**\n * A pet in the clinic\n */\nexport type Pet = {"));
    assert!(types.contains("    id: number;"));
    assert!(types.contains("    status?: Status;"));
    assert!(types.contains("    createdAt: Date;"));
    assert!(types.contains("    adoptedAt: Date | null;"));
    assert!(types.contains("    tags?: Tag[];"));
    assert!(types.contains("export type Status = 'available' | 'adopted';"));
    assert!(types.contains("export type ListPetsResponse = Pet[];"));
    assert!(types.contains("export type GetPetError = Error;"));
    assert!(types.contains("export type DeletePetResponse = void;"));
    assert!(types.contains("export type ListVisitsResponse = Visit | Tag;"));
    assert!(types.contains("/**\n * The adopted pet\n */\nexport type PetAdoptedWebhookPayload = Pet;"));
}

#[test]
fn request_data_type() {
    let output = generate(&clinic(), &ApigenConfig::default()).unwrap();
    let types = content(&output, "types.gen.ts");
    assert!(types.contains(
        "export type ListPetsData = {
    body?: never;
    headers?: never;
    path?: never;
    query?: {
        cursor?: string;
    };
    url: '/pets';
};"
    ));
    assert!(types.contains(
        "    path: {
        petId: number;
    };
    query?: never;
    url: '/pets/{petId}';"
    ));
}

#[test]
fn transformers_file() {
    let output = generate(&clinic(), &ApigenConfig::default()).unwrap();
    insta::assert_snapshot!(content(&output, "transformers.gen.ts"), @r"
    // This file is auto-generated by apigen. Do not edit it by hand.

    import type { ListPetsResponse, GetPetResponse } from './types.gen';

    const petSchemaResponseTransformer = (data: any) => {
        data.createdAt = new Date(data.createdAt);
        if (data.adoptedAt !== undefined && data.adoptedAt !== null) {
            data.adoptedAt = new Date(data.adoptedAt);
        }
        return data;
    };

    export const listPetsResponseTransformer = async (data: any): Promise<ListPetsResponse> => {
        data = data.map((item: any) => {
            return petSchemaResponseTransformer(item);
        });
        return data;
    };

    export const getPetResponseTransformer = async (data: any): Promise<GetPetResponse> => {
        data = petSchemaResponseTransformer(data);
        return data;
    };
    ");
}

#[test]
fn index_reexports_outputs() {
    let output = generate(&clinic(), &ApigenConfig::default()).unwrap();
    insta::assert_snapshot!(content(&output, "index.ts"), @r"
    // This file is auto-generated by apigen. Do not edit it by hand.
    export * from './types.gen';
    export * from './transformers.gen';
    ");
}

#[test]
fn header_and_index_can_be_disabled() {
    let mut config = ApigenConfig::default();
    config.output_options.header = false;
    config.output_options.index = false;
    let output = generate(&clinic(), &config).unwrap();
    assert!(output.files.iter().all(|f| f.path != "index.ts"));
    assert!(content(&output, "types.gen.ts").starts_with("/**\n * A pet in the clinic"));
}

#[test]
fn enums_emit_const_objects() {
    let config = with_plugins(vec![PluginConfig::TypeScript(TypeScriptOptions {
        enums: true,
        ..Default::default()
    })]);
    let output = generate(&clinic(), &config).unwrap();
    let types = content(&output, "types.gen.ts");
    assert!(types.contains(
        "export const Status = {
    AVAILABLE: 'available',
    ADOPTED: 'adopted'
} as const;"
    ));
    assert!(types.contains("export type Status = (typeof Status)[keyof typeof Status];"));
}

#[test]
fn bigint_conversion() {
    let config = with_plugins(vec![PluginConfig::Transformers(TransformersOptions {
        bigint: true,
        ..Default::default()
    })]);
    let output = generate(&clinic(), &config).unwrap();
    assert!(content(&output, "types.gen.ts").contains("    id: bigint;"));
    assert!(content(&output, "transformers.gen.ts").contains("    data.id = BigInt(data.id.toString());"));
}

#[test]
fn transformers_pulls_in_typescript() {
    let config = with_plugins(vec![PluginConfig::Transformers(TransformersOptions::default())]);
    let output = generate(&clinic(), &config).unwrap();
    assert!(file(&output, "types.gen.ts").content.is_some());
    assert!(file(&output, "transformers.gen.ts").content.is_some());
}

#[test]
fn nothing_to_transform_leaves_file_empty() {
    let config = with_plugins(vec![PluginConfig::Transformers(TransformersOptions {
        dates: false,
        ..Default::default()
    })]);
    let output = generate(&clinic(), &config).unwrap();
    assert!(file(&output, "transformers.gen.ts").content.is_none());
    assert!(!content(&output, "index.ts").contains("transformers.gen"));
}

#[test]
fn generation_is_deterministic_across_runs() {
    let ir = clinic();
    let config = ApigenConfig::default();
    let first = generate(&ir, &config).unwrap();
    let pipeline = Pipeline::from_config(&config).unwrap();
    let second = pipeline.generate(&ir, &config).unwrap();
    let contents = |output: &GenerateOutput| {
        output
            .files
            .iter()
            .map(|f| (f.path.clone(), f.content.clone()))
            .collect::<Vec<_>>()
    };
    assert_eq!(contents(&first), contents(&second));
}

#[test]
fn transformers_without_types_file_fails() {
    let ir = clinic();
    let config = ApigenConfig::default();
    let mut ctx = PluginContext::new(&ir, &config);
    let plugin = instantiate(&PluginConfig::Transformers(TransformersOptions::default()));
    let err = plugin.run(&mut ctx).unwrap_err();
    assert!(matches!(err, PluginError::MissingFile { ref file, .. } if file == "types"));
}

#[test]
fn transformers_fail_on_undeclared_response_type() {
    let ir = clinic();
    let config = ApigenConfig::default();
    let mut ctx = PluginContext::new(&ir, &config);
    ctx.create_file("types", "types", StringCase::Pascal, true);
    let plugin = instantiate(&PluginConfig::Transformers(TransformersOptions::default()));
    let err = plugin.run(&mut ctx).unwrap_err();
    assert!(matches!(
        err,
        PluginError::Compiler(CompilerError::MissingIdentifier { ref ref_path, ref file, .. })
            if ref_path == "#/ir/listPetsResponse" && file == "types"
    ));
}

#[test]
fn names_starting_with_digits_are_prefixed() {
    let doc = parse::from_yaml(
        r##"
openapi: 3.1.0
info:
  title: Models
  version: "1.0"
paths:
  /models:
    get:
      operationId: 3dModels
      responses:
        "200":
          description: A model
          content:
            application/json:
              schema:
                $ref: "#/components/schemas/3dModel"
components:
  schemas:
    3dModel:
      type: object
      required: [createdAt]
      properties:
        createdAt:
          type: string
          format: date-time
"##,
    )
    .unwrap();
    let ir = transform::transform(&doc).unwrap();
    let output = generate(&ir, &ApigenConfig::default()).unwrap();

    let types = content(&output, "types.gen.ts");
    assert!(!types.contains("export type 3"), "{types}");
    assert!(types.contains("export type _3dModel = {"));
    assert!(types.contains("export type _3dModelsData = {"));
    assert!(types.contains("export type _3dModelsResponse = _3dModel;"));

    let transformers = content(&output, "transformers.gen.ts");
    assert!(!transformers.contains("const 3"), "{transformers}");
    assert!(transformers.contains("const _3dModelSchemaResponseTransformer = "));
    assert!(transformers.contains(
        "export const _3dModelsResponseTransformer = async (data: any): Promise<_3dModelsResponse> => {"
    ));
}

#[test]
fn write_outputs_and_remove_empty_files() {
    let dir = tempfile::tempdir().unwrap();
    let stale = dir.path().join("transformers.gen.ts");
    fs::write(&stale, "// stale").unwrap();

    let config = with_plugins(vec![PluginConfig::Transformers(TransformersOptions {
        dates: false,
        ..Default::default()
    })]);
    let output = generate(&clinic(), &config).unwrap();
    for file in &output.files {
        file.write(dir.path()).unwrap();
    }

    assert!(dir.path().join("types.gen.ts").exists());
    assert!(dir.path().join("index.ts").exists());
    assert!(!stale.exists());
}
