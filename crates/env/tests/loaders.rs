//! Building environments from files, environment variables and arguments

use std::fs;
use std::path::Path;
use std::sync::Arc;

use nebula_env::prelude::*;
use nebula_env::EnvVarPropertySource;
use pretty_assertions::assert_eq;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn write_config(dir: &Path) {
    fs::write(
        dir.join("application.properties"),
        "server.port=8080\nserver.host=0.0.0.0\napp.name=shop\n",
    )
    .unwrap();
    fs::write(
        dir.join("application-dev.json"),
        r#"{"server": {"port": 9090}, "features": ["search", "cart"]}"#,
    )
    .unwrap();
}

#[tokio::test]
async fn application_profile_overrides_base_file() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path());

    let env = EnvironmentBuilder::new(Environment::DEVELOPMENT)
        .with_source(SourceKind::Application {
            dir: dir.path().to_path_buf(),
        })
        .build()
        .await
        .unwrap();

    assert!(env.is_development());
    assert_eq!(env.resolve::<u16>("server.port").unwrap(), Some(9090));
    assert_eq!(
        env.resolve::<String>("server.host").unwrap().as_deref(),
        Some("0.0.0.0")
    );
    assert_eq!(
        env.resolve::<Vec<String>>("features").unwrap(),
        Some(vec!["search".to_string(), "cart".to_string()])
    );
}

#[tokio::test]
async fn full_precedence_stack() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path());

    let vars = [
        ("SHOP_SERVER_PORT".to_string(), "7000".to_string()),
        ("SHOP_APP_NAME".to_string(), "shop-env".to_string()),
        ("OTHER_SERVER_PORT".to_string(), "1".to_string()),
    ];

    let env = EnvironmentBuilder::new("dev")
        .with_source(SourceKind::Inline {
            name: "defaults".into(),
            format: SourceFormat::Json,
            content: r#"{"server": {"port": 1000, "threads": 4}}"#.into(),
        })
        .with_source(SourceKind::Application {
            dir: dir.path().to_path_buf(),
        })
        .with_property_source(Arc::new(EnvVarPropertySource::from_vars(
            Some("SHOP".into()),
            vars,
        )))
        .with_source(SourceKind::CommandLine(vec!["--app.name=shop-cli".into()]))
        .build()
        .await
        .unwrap();

    let names: Vec<_> = env
        .property_sources()
        .iter()
        .map(|s| s.name().to_string())
        .collect();
    assert_eq!(
        names,
        vec![
            "command-line".to_string(),
            "environment:SHOP".to_string(),
            dir.path().join("application-dev.json").display().to_string(),
            dir.path().join("application.properties").display().to_string(),
            "defaults".to_string(),
        ]
    );

    assert_eq!(env.resolve::<u16>("server.port").unwrap(), Some(7000));
    assert_eq!(env.resolve::<u8>("server.threads").unwrap(), Some(4));
    assert_eq!(
        env.resolve::<String>("app.name").unwrap().as_deref(),
        Some("shop-cli")
    );
}

#[tokio::test]
async fn process_environment_is_optional_and_registered() {
    let env = EnvironmentBuilder::new("test")
        .with_source(SourceKind::Env)
        .build()
        .await
        .unwrap();
    assert!(env.property_source("environment").is_some());
}

#[tokio::test]
async fn fail_on_missing_makes_optional_sources_required() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("application.json"), "{ not json").unwrap();

    let lenient = EnvironmentBuilder::new("test")
        .with_source(SourceKind::Application {
            dir: dir.path().to_path_buf(),
        })
        .build()
        .await
        .unwrap();
    assert!(lenient.property_sources().is_empty());

    let err = EnvironmentBuilder::new("test")
        .with_source(SourceKind::Application {
            dir: dir.path().to_path_buf(),
        })
        .with_fail_on_missing(true)
        .build()
        .await
        .unwrap_err();
    assert_eq!(err.category(), nebula_env::ErrorCategory::Parse);
}

#[tokio::test]
async fn broken_required_file_reports_its_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "port = ").unwrap();

    let err = EnvironmentBuilder::new("test")
        .with_source(SourceKind::File(path))
        .build()
        .await
        .unwrap_err();
    assert!(err.to_string().contains("broken.toml"));
}

#[tokio::test]
async fn same_file_name_in_two_directories_keeps_both() {
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    fs::write(first.path().join("db.json"), r#"{"db": {"host": "primary"}}"#).unwrap();
    fs::write(second.path().join("db.json"), r#"{"cache": {"size": 10}}"#).unwrap();

    let env = EnvironmentBuilder::new("test")
        .with_source(SourceKind::File(first.path().join("db.json")))
        .with_source(SourceKind::File(second.path().join("db.json")))
        .build()
        .await
        .unwrap();

    assert_eq!(env.property_sources().len(), 2);
    assert_eq!(
        env.resolve::<String>("db.host").unwrap().as_deref(),
        Some("primary")
    );
    assert_eq!(env.resolve::<u32>("cache.size").unwrap(), Some(10));
}

#[tokio::test]
async fn application_files_from_two_directories_are_layered() {
    let shared = tempfile::tempdir().unwrap();
    let local = tempfile::tempdir().unwrap();
    fs::write(
        shared.path().join("application.properties"),
        "server.port=8080\nserver.host=0.0.0.0\n",
    )
    .unwrap();
    fs::write(local.path().join("application.properties"), "server.port=9000\n").unwrap();

    let env = EnvironmentBuilder::new("test")
        .with_source(SourceKind::Application {
            dir: shared.path().to_path_buf(),
        })
        .with_source(SourceKind::Application {
            dir: local.path().to_path_buf(),
        })
        .build()
        .await
        .unwrap();

    assert_eq!(env.property_sources().len(), 2);
    assert_eq!(env.resolve::<u16>("server.port").unwrap(), Some(9000));
    assert_eq!(
        env.resolve::<String>("server.host").unwrap().as_deref(),
        Some("0.0.0.0")
    );
}
