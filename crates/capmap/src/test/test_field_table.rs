// Tests for hand-registered FieldTable targets
use crate::*;
use std::sync::LazyLock;

#[derive(Debug, Default)]
pub struct Endpoint {
    host: String,
    port: u16,
    aliases: Vec<String>,
    tls: Option<Tls>,
    proxy: Option<Proxy>,
    hits: u32,
}

#[derive(Debug, Default, Captures)]
pub struct Tls {
    pub cert: String,
    pub verify: bool,
}

#[derive(Debug)]
pub struct Proxy {
    url: String,
}

static ENDPOINT: LazyLock<FieldTable<Endpoint>> = LazyLock::new(|| {
    FieldTable::<Endpoint>::new()
        .set_type_name("Endpoint")
        .field("Host", |e| &mut e.host)
        .field("Port", |e| &mut e.port)
        .field("Alias", |e| &mut e.aliases)
        .field("Tls", |e| &mut e.tls)
        .nested_with("Proxy", |e| &mut e.proxy, || Proxy::connect(true))
});
table_target!(Endpoint, ENDPOINT);

static PROXY: LazyLock<FieldTable<Proxy>> =
    LazyLock::new(|| FieldTable::<Proxy>::new().field("Url", |p| &mut p.url));
table_target!(Proxy, PROXY, no_default);

impl Proxy {
    fn connect(ok: bool) -> Result<Proxy, String> {
        if ok {
            Ok(Proxy { url: String::new() })
        } else {
            Err("proxy disabled".to_string())
        }
    }
}

#[derive(Debug, Default)]
pub struct Gateway {
    proxy: Option<Proxy>,
}

static GATEWAY: LazyLock<FieldTable<Gateway>> = LazyLock::new(|| {
    FieldTable::<Gateway>::new().nested_with("Proxy", |g| &mut g.proxy, || {
        Proxy::connect(false)
    })
});
table_target!(Gateway, GATEWAY);

#[test]
fn test_table_names() {
    let endpoint = Endpoint::default();
    assert_eq!(endpoint.type_name(), "Endpoint");
    assert_eq!(endpoint.field_names(), &["Host", "Port", "Alias", "Tls", "Proxy"]);
    // Without set_type_name the Rust type path is used
    assert!(Proxy::connect(true).unwrap().type_name().ends_with("Proxy"));
}

#[test]
fn test_table_scalars_and_collections() {
    let m = MatchResult::new("")
        .with_group("Host", ["example.org"])
        .with_group("Port", ["8443"])
        .with_group("Alias", ["a", "b"])
        .with_group("Hits", ["3"]);
    let endpoint: Endpoint = Mapper::new().map(&m).unwrap();
    assert_eq!(endpoint.host, "example.org");
    assert_eq!(endpoint.port, 8443);
    assert_eq!(endpoint.aliases, vec!["a", "b"]);
    // Unregistered fields are not writable
    assert_eq!(endpoint.hits, 0);
}

#[test]
fn test_table_nests_into_derived_type() {
    let m = MatchResult::new("")
        .with_group("Tls__cert", ["server.pem"])
        .with_group("Tls__verify", ["true"]);
    let endpoint: Endpoint = Mapper::new().map(&m).unwrap();
    let tls = endpoint.tls.unwrap();
    assert_eq!(tls.cert, "server.pem");
    assert!(tls.verify);
}

#[test]
fn test_table_factory_builds_object() {
    let m = MatchResult::new("").with_group("Proxy__Url", ["http://proxy:3128"]);
    let endpoint: Endpoint = Mapper::new().map(&m).unwrap();
    assert_eq!(endpoint.proxy.unwrap().url, "http://proxy:3128");
}

#[test]
fn test_table_factory_failure() {
    let m = MatchResult::new("").with_group("Proxy__Url", ["http://proxy:3128"]);
    let err = Mapper::new().map::<Gateway>(&m).unwrap_err();
    assert_eq!(err.group(), Some("Proxy__Url"));
    assert_eq!(
        err.to_string(),
        format!(
            "group 'Proxy__Url', field 'Proxy': cannot construct {}: proxy disabled",
            std::any::type_name::<Proxy>()
        )
    );
}

#[test]
fn test_table_object_as_terminal_fails() {
    let m = MatchResult::new("").with_group("Tls", ["on"]);
    let err = Mapper::new().map::<Endpoint>(&m).unwrap_err();
    assert!(matches!(
        err,
        MapError::Convert {
            source: ConvertError::Unsupported { target: "Tls", .. },
            ..
        }
    ));
}

#[test]
fn test_table_unknown_and_conversion_errors() {
    let m = MatchResult::new("")
        .with_group("Nope__Deeper", ["x"])
        .with_group("Port", ["99999"]);
    let err = Mapper::new().map::<Endpoint>(&m).unwrap_err();
    match err {
        MapError::Convert { group, field, source } => {
            assert_eq!(group, "Port");
            assert_eq!(field, "Port");
            assert_eq!(source, ConvertError::out_of_range("99999", "u16"));
        }
        other => panic!("expected conversion error, got {:?}", other),
    }
}

#[test]
fn test_table_prebuilt_objects() {
    let mapper = Mapper::new()
        .transform("Tls", |s| {
            Ok(CaptureValue::other(Tls {
                cert: s.to_string(),
                verify: true,
            }))
        })
        .transform("Proxy", |s| Ok(CaptureValue::other(Proxy { url: s.to_string() })));
    let m = MatchResult::new("")
        .with_group("Tls", ["ca.pem"])
        .with_group("Proxy", ["socks5://p:1080"]);
    let endpoint: Endpoint = mapper.map(&m).unwrap();
    assert_eq!(endpoint.tls.unwrap().cert, "ca.pem");
    assert_eq!(endpoint.proxy.unwrap().url, "socks5://p:1080");
}
