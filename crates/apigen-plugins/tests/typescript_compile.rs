use std::fs;
use std::process::Command;

use apigen_core::config::{ApigenConfig, PluginConfig, TransformersOptions, TypeScriptOptions};
use apigen_core::{parse, transform};

const CLINIC: &str = include_str!("fixtures/clinic.yaml");

const TSCONFIG: &str = r#"{
  "compilerOptions": {
    "strict": true,
    "target": "ES2020",
    "module": "ES2020",
    "moduleResolution": "bundler",
    "lib": ["ES2020", "DOM"],
    "noEmit": true,
    "skipLibCheck": true
  },
  "include": ["*.ts"]
}"#;

#[test]
#[ignore] // Requires Node.js + TypeScript installed
fn generated_typescript_compiles() {
    let doc = parse::from_yaml(CLINIC).unwrap();
    let ir = transform::transform(&doc).unwrap();
    let config = ApigenConfig {
        plugins: vec![
            PluginConfig::TypeScript(TypeScriptOptions {
                enums: true,
                ..Default::default()
            }),
            PluginConfig::Transformers(TransformersOptions {
                bigint: true,
                ..Default::default()
            }),
        ],
        ..Default::default()
    };
    let output = apigen_plugins::generate(&ir, &config).unwrap();

    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path();
    for file in &output.files {
        file.write(dir).unwrap();
    }
    fs::write(dir.join("tsconfig.json"), TSCONFIG).unwrap();

    let result = Command::new("npx")
        .args(["tsc", "--noEmit"])
        .current_dir(dir)
        .output()
        .expect("failed to run tsc");

    if !result.status.success() {
        panic!(
            "TypeScript compilation failed:\nstdout: {}\nstderr: {}",
            String::from_utf8_lossy(&result.stdout),
            String::from_utf8_lossy(&result.stderr)
        );
    }
}
