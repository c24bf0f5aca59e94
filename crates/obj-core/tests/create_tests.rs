use obj_core::{CreateRequest, ErrorKind, Outcome, Registry, Settings};
use obj_model::{ObjectKey, OriginCookie, RuntimeObject};
use obj_test_utils::{RegistryEvent, TestStore};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;

fn ping_request() -> CreateRequest {
    CreateRequest::new("Service", "host1!ping").with_attribute("check_command", json!("ping"))
}

#[test]
fn test_create_service_writes_file_and_registers_object() {
    let fixture = TestStore::new();

    let report = fixture.store.create_object(&ping_request()).unwrap();

    assert_eq!(report.outcome, Outcome::Created);
    assert!(report.errors.is_empty());
    assert!(fixture.registry.contains("Service", "host1!ping"));

    let expected = fixture
        .config_dir()
        .join("conf.d/services/host1!ping.conf");
    assert_eq!(fixture.conf_files(), vec![expected.to_native()]);

    let content = fixture.read(expected.to_native());
    assert!(content.starts_with("object Service \"ping\" {\n"));
    assert!(content.contains("\n\tcheck_command = \"ping\""));
    assert!(content.contains("\n\thost_name = \"host1\""));
    assert!(content.contains("\n\tversion = "));
    assert!(!content.contains("\n\tname = "));
    assert!(content.ends_with("\n}\n"));

    assert!(fixture.pending_files().is_empty());
}

#[test]
fn test_created_object_records_its_source_file() {
    let fixture = TestStore::new();
    fixture.store.create_object(&ping_request()).unwrap();

    let object = fixture.registry.get_object("Service", "host1!ping").unwrap();
    assert_eq!(object.package, "_api");
    assert_eq!(
        object.source_path,
        Some(fixture.store.compute_path("Service", "host1!ping").unwrap())
    );
}

#[test]
fn test_compiler_sees_managed_package_and_templates() {
    let fixture = TestStore::new();
    let request = ping_request().with_template("generic-service");

    fixture.store.create_object(&request).unwrap();

    let compiled = fixture.compiler.compiled();
    assert_eq!(compiled.len(), 1);
    assert_eq!(compiled[0].1, "_api");

    let content = fixture.read(compiled[0].0.to_native());
    assert!(content.contains("\n\timport \"generic-service\"\n\n"));
}

#[rstest]
#[case::compile("compile", ErrorKind::Compile)]
#[case::commit("commit", ErrorKind::Commit)]
#[case::activation("activation", ErrorKind::Activation)]
fn test_failed_create_leaves_no_file_and_no_object(
    #[case] stage: &str,
    #[case] expected: ErrorKind,
) {
    let fixture = TestStore::new();
    match stage {
        "compile" => fixture.compiler.fail_when_contains("ping"),
        "commit" => fixture.registry.fail_commit_for("host1!ping"),
        _ => fixture.registry.fail_activation_for("host1!ping"),
    }

    let report = fixture.store.create_object(&ping_request()).unwrap();

    assert_eq!(report.outcome, Outcome::Failed);
    assert_eq!(report.kind, Some(expected));
    assert!(!report.errors.is_empty());
    assert_eq!(report.errors.len(), report.diagnostics.len());

    assert!(fixture.conf_files().is_empty());
    assert!(fixture.pending_files().is_empty());
    assert!(!fixture.registry.contains("Service", "host1!ping"));
    assert_eq!(fixture.registry.item_count(), 0);
    assert_eq!(fixture.notifier.count(), 0);
}

#[test]
fn test_one_invalid_key_among_ten_rejects_before_any_write() {
    let fixture = TestStore::new();
    let request = CreateRequest::new("Host", "web")
        .with_attribute("display_name", json!("Web"))
        .with_attribute("address", json!("192.0.2.10"))
        .with_attribute("address6", json!("2001:db8::10"))
        .with_attribute("check_command", json!("hostalive"))
        .with_attribute("check_interval", json!(60))
        .with_attribute("max_check_attempts", json!(3))
        .with_attribute("enable_notifications", json!(true))
        .with_attribute("groups", json!(["linux"]))
        .with_attribute("zone", json!("master"))
        .with_attribute("vars.os", json!("Linux"))
        .with_attribute("bogus", json!(1));

    let report = fixture.store.create_object(&request).unwrap();

    assert_eq!(report.kind, Some(ErrorKind::Validation));
    assert_eq!(report.errors, vec!["Invalid attribute specified: bogus"]);
    assert!(fixture.conf_files().is_empty());
    assert!(fixture.pending_files().is_empty());
    assert!(fixture.compiler.compiled().is_empty());
    assert!(fixture.registry.events().is_empty());
}

#[rstest]
#[case::internal_field("state")]
#[case::name("name")]
#[case::version("version")]
fn test_internal_attributes_are_rejected(#[case] key: &str) {
    let fixture = TestStore::new();
    let request = CreateRequest::new("Host", "web").with_attribute(key, json!("x"));

    let report = fixture.store.create_object(&request).unwrap();

    assert_eq!(report.kind, Some(ErrorKind::Validation));
    assert!(report.errors[0].contains("internal use only"));
    assert!(fixture.conf_files().is_empty());
}

#[rstest]
#[case::unknown_type("Planet", "earth")]
#[case::empty_name("Host", "")]
#[case::too_many_parts("Service", "a!b!c")]
#[case::missing_host("Service", "ping")]
#[case::empty_part("Service", "!ping")]
fn test_malformed_requests_fail_validation(#[case] type_name: &str, #[case] name: &str) {
    let fixture = TestStore::new();

    let report = fixture
        .store
        .create_object(&CreateRequest::new(type_name, name))
        .unwrap();

    assert_eq!(report.kind, Some(ErrorKind::Validation));
    assert!(fixture.conf_files().is_empty());
}

#[test]
fn test_existing_object_reports_already_exists_without_io() {
    let fixture = TestStore::new();
    fixture.registry.register(RuntimeObject::new(
        ObjectKey::new("Service", "host1!ping"),
        "_etc",
    ));

    let report = fixture.store.create_object(&ping_request()).unwrap();

    assert_eq!(report.kind, Some(ErrorKind::AlreadyExists));
    assert_eq!(report.errors, vec!["Object 'host1!ping' already exists."]);
    assert!(fixture.conf_files().is_empty());
    assert!(fixture.compiler.compiled().is_empty());
}

#[test]
fn test_second_create_of_same_object_fails() {
    let fixture = TestStore::new();
    assert!(fixture.store.create_object(&ping_request()).unwrap().is_success());

    let report = fixture.store.create_object(&ping_request()).unwrap();

    assert_eq!(report.kind, Some(ErrorKind::AlreadyExists));
    assert_eq!(fixture.conf_files().len(), 1);
}

#[test]
fn test_object_filtered_during_activation_is_ignored() {
    let fixture = TestStore::new();
    fixture.registry.filter_on_activation("web");

    let report = fixture
        .store
        .create_object(&CreateRequest::new("Host", "web"))
        .unwrap();

    assert_eq!(report.outcome, Outcome::Ignored);
    assert!(report.is_success());
    assert_eq!(
        report.notes,
        vec!["Object 'web' was not created but ignored due to errors."]
    );
    assert!(fixture.conf_files().is_empty());
    assert!(fixture.pending_files().is_empty());
    assert!(!fixture.registry.contains("Host", "web"));
    assert_eq!(fixture.registry.item_count(), 0);
}

#[test]
fn test_ignore_on_error_skips_failing_declaration() {
    let fixture = TestStore::new();
    fixture.registry.fail_commit_for("web");

    let report = fixture
        .store
        .create_object(&CreateRequest::new("Host", "web").ignore_on_error(true))
        .unwrap();

    assert_eq!(report.outcome, Outcome::Ignored);
    assert!(fixture.conf_files().is_empty());

    let report = fixture
        .store
        .create_object(&CreateRequest::new("Host", "web"))
        .unwrap();
    assert_eq!(report.kind, Some(ErrorKind::Commit));
}

#[test]
fn test_authority_recomputed_except_for_exempt_kinds() {
    let fixture = TestStore::new();

    fixture
        .store
        .create_object(&CreateRequest::new("Host", "host1"))
        .unwrap();
    assert_eq!(fixture.notifier.count(), 1);

    let downtime = CreateRequest::new("Downtime", "host1!maintenance")
        .with_attribute("author", json!("ops"))
        .with_attribute("start_time", json!(1_700_000_000))
        .with_attribute("end_time", json!(1_700_003_600));
    let report = fixture.store.create_object(&downtime).unwrap();

    assert_eq!(report.outcome, Outcome::Created);
    assert_eq!(fixture.notifier.count(), 1);
}

#[test]
fn test_long_downtime_name_is_truncated_and_hashed() {
    let fixture = TestStore::new();
    let name = format!("host1!{}", "d".repeat(194));
    assert_eq!(name.len(), 200);

    let report = fixture
        .store
        .create_object(&CreateRequest::new("Downtime", name.as_str()))
        .unwrap();
    assert_eq!(report.outcome, Outcome::Created);

    let files = fixture.conf_files();
    assert_eq!(files.len(), 1);
    let file_name = files[0].file_name().unwrap().to_string_lossy().into_owned();
    let stem = file_name.strip_suffix(".conf").unwrap();

    assert!(stem.len() <= 123);
    assert!(stem.starts_with(&name[..80]));
    assert!(stem.contains("..."));
    assert!(files[0].to_string_lossy().contains("/conf.d/downtimes/"));
}

#[test]
fn test_overlong_host_name_fails_with_path_error() {
    let fixture = TestStore::new();

    let report = fixture
        .store
        .create_object(&CreateRequest::new("Host", "h".repeat(300)))
        .unwrap();

    assert_eq!(report.kind, Some(ErrorKind::Path));
    assert!(fixture.conf_files().is_empty());
}

#[test]
fn test_hostile_characters_are_escaped_on_disk() {
    let fixture = TestStore::new();

    let report = fixture
        .store
        .create_object(&CreateRequest::new("Host", "web:01/eth0"))
        .unwrap();
    assert_eq!(report.outcome, Outcome::Created);

    let files = fixture.conf_files();
    assert_eq!(
        files[0].file_name().unwrap().to_string_lossy(),
        "web%3a01%2feth0.conf"
    );
    assert!(fixture.registry.contains("Host", "web:01/eth0"));
}

#[test]
fn test_activation_carries_origin_and_runtime_flags() {
    let fixture = TestStore::new();
    let origin = OriginCookie::new("satellite-1");

    fixture
        .store
        .create_object(&ping_request().with_origin(origin.clone()))
        .unwrap();

    let options = fixture.registry.last_activation().unwrap();
    assert!(options.runtime_created);
    assert!(!options.silent);
    assert!(!options.with_modified_attrs);
    assert_eq!(options.origin, Some(origin.clone()));

    assert!(fixture.registry.events().contains(&RegistryEvent::Activated {
        key: ObjectKey::new("Service", "host1!ping"),
        origin: Some(origin),
    }));
}

#[test]
fn test_unrepairable_package_is_fatal() {
    let fixture = TestStore::new();
    fixture.store.packages().create_package("_api").unwrap();

    let err = fixture.store.create_object(&ping_request()).unwrap_err();

    assert!(err.is_fatal());
    assert_eq!(err.kind(), ErrorKind::RepairFailure);
}

#[test]
fn test_custom_package_name_is_used() {
    let fixture = TestStore::with_settings(|settings| Settings {
        package: "_runtime".to_string(),
        ..settings
    });

    fixture.store.create_object(&ping_request()).unwrap();

    let object = fixture.registry.get_object("Service", "host1!ping").unwrap();
    assert_eq!(object.package, "_runtime");
    assert!(fixture.config_dir().as_str().contains("/packages/_runtime/"));
}
