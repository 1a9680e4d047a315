use pmoconfig::Config;
use pmosoap::{
    BodyOutcome, NamespaceContext, SoapConfigExt, SoapVersion, decode_response_with,
};
use serde::Deserialize;
use tempfile::TempDir;

#[derive(Debug, Default, Deserialize, PartialEq)]
struct PingResponse {
    #[serde(default)]
    status: String,
}

fn load_in_tempdir() -> (TempDir, Config) {
    let temp_dir = tempfile::tempdir().unwrap();
    let config = Config::load_config(temp_dir.path().to_str().unwrap()).unwrap();
    (temp_dir, config)
}

#[test]
fn test_defaults_from_config_file() {
    let (_temp_dir, config) = load_in_tempdir();

    assert_eq!(config.get_soap_version().unwrap(), SoapVersion::V11);
    assert_eq!(
        config.get_soap_namespace_context().unwrap(),
        NamespaceContext::promostandards()
    );
}

#[test]
fn test_soap_settings_are_persisted() {
    let (temp_dir, config) = load_in_tempdir();
    config.set_soap_version(SoapVersion::V12).unwrap();
    config
        .set_soap_alias("ns2", "urn:vendor:pds".to_string())
        .unwrap();

    let reloaded = Config::load_config(temp_dir.path().to_str().unwrap()).unwrap();
    assert_eq!(reloaded.get_soap_version().unwrap(), SoapVersion::V12);

    let ctx = reloaded.get_soap_namespace_context().unwrap();
    assert_eq!(ctx.alias("ns2"), Some("urn:vendor:pds"));
}

#[test]
fn test_configured_alias_drives_fault_detection() {
    let temp_dir = tempfile::tempdir().unwrap();
    std::fs::write(
        temp_dir.path().join("config.yaml"),
        "soap:\n  aliases:\n    env: http://schemas.xmlsoap.org/soap/envelope/\n",
    )
    .unwrap();
    let config = Config::load_config(temp_dir.path().to_str().unwrap()).unwrap();
    let ctx = config.get_soap_namespace_context().unwrap();

    // `env` n'est pas déclaré dans le document
    let xml = r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Body><env:Fault><faultcode>Client</faultcode><faultstring>Bad id</faultstring></env:Fault></s:Body></s:Envelope>"#;

    match decode_response_with::<PingResponse>(xml.as_bytes(), &ctx).unwrap() {
        BodyOutcome::Fault(fault) => assert_eq!(fault.string, "Bad id"),
        other => panic!("unexpected {other:?}"),
    }
}
