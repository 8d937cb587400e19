#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use wspresence_hub::config;

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
hub:
  listen: "0.0.0.0:8080"
  ping_intervl_ms: 20000 # typo should fail
auth:
  tickets:
    - { ticket: "t1", identity: "alice" }
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "BAD_REQUEST");
}

#[test]
fn ok_minimal_config() {
    let ok = r#"
version: 1
auth:
  tickets:
    - { ticket: "t1", identity: "alice" }
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.hub.listen, "0.0.0.0:8080");
    assert_eq!(cfg.hub.outbound_queue, 1024);
    assert_eq!(cfg.auth.tickets[0].identity, "alice");
}

#[test]
fn wrong_version_is_unsupported() {
    let s = r#"
version: 2
auth:
  tickets:
    - { ticket: "t1", identity: "alice" }
"#;
    let err = config::load_from_str(s).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "UNSUPPORTED_VERSION");
}

#[test]
fn idle_timeout_must_exceed_ping_interval() {
    let s = r#"
version: 1
hub:
  ping_interval_ms: 30000
  idle_timeout_ms: 20000
auth:
  tickets:
    - { ticket: "t1", identity: "alice" }
"#;
    let err = config::load_from_str(s).expect_err("must fail");
    assert!(err.to_string().contains("idle_timeout_ms"));
}

#[test]
fn tickets_must_be_unique_and_non_empty() {
    let dup = r#"
version: 1
auth:
  tickets:
    - { ticket: "t1", identity: "alice" }
    - { ticket: "t1", identity: "bob" }
"#;
    assert!(config::load_from_str(dup).is_err());

    let empty_identity = r#"
version: 1
auth:
  tickets:
    - { ticket: "t1", identity: "" }
"#;
    assert!(config::load_from_str(empty_identity).is_err());

    let none = r#"
version: 1
auth:
  tickets: []
"#;
    assert!(config::load_from_str(none).is_err());
}

#[test]
fn listen_must_be_socket_addr() {
    let s = r#"
version: 1
hub:
  listen: "localhost"
auth:
  tickets:
    - { ticket: "t1", identity: "alice" }
"#;
    let err = config::load_from_str(s).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "BAD_REQUEST");
}

#[test]
fn config_path_prefers_cli_argument() {
    assert_eq!(config::resolve_path(Some("custom.yaml".into())), "custom.yaml");
}
