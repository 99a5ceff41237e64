//! Codec construction, caching, and full round trips of parsed definitions.

use bytes::Bytes;
use reflex_codec::{Config, Error, Handler, Registry, TypeCodec};
use reflex_schema::{Catalog, FieldSchema, Message, MessageSchema, Source, Value};
use std::sync::Arc;
use test_case::test_case;

const SATELLITE: &str = "
uint8 prn
int16 elevation
uint16 azimuth
float32 snr
bool used
";

const SAMPLE: &str = "
uint32 t
string note
";

const REPORT: &str = "
# Receiver tracking report
uint8 MODE_NONE=0
uint8 MODE_FIX=2
string VENDOR=acme # not encoded
Header header
uint8 mode
char[4] receiver
string label
uint8[] raw
uint8 sats_count
Satellite[] sats
Sample[] samples
";

fn traced() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

fn catalog() -> Catalog {
    let mut catalog = Catalog::with_std();
    catalog.parse("gnss/Satellite", SATELLITE).unwrap();
    catalog.parse("gnss/Sample", SAMPLE).unwrap();
    catalog.parse("gnss/Report", REPORT).unwrap();
    catalog.parse("pkg/Point", "float32 x\nfloat32 y").unwrap();
    catalog.parse("pkg/Named", "string name").unwrap();
    catalog
}

fn satellite(prn: u8, snr: f32, used: bool) -> Message {
    Message::new("gnss/Satellite")
        .with("prn", prn)
        .with("elevation", -5i16)
        .with("azimuth", 270u16)
        .with("snr", snr)
        .with("used", used)
}

fn sample(t: u32, note: &str) -> Message {
    Message::new("gnss/Sample").with("t", t).with("note", note)
}

fn report(registry: &Registry<Catalog>) -> Message {
    let codec = registry.get_or_build("gnss/Report").unwrap();
    let mut header = registry
        .get_or_build("std_msgs/Header")
        .unwrap()
        .instantiate();
    header.set("seq", 42u32).unwrap();
    header.set("stamp_secs", 1_700_000_000u32).unwrap();
    header.set("frame_id", Bytes::from_static(&[b'g'; 16])).unwrap();

    let mut msg = codec.instantiate();
    msg.set("header", header).unwrap();
    msg.set("mode", 2u8).unwrap();
    msg.set("receiver", &b"GPS1"[..]).unwrap();
    msg.set("label", "rooftop").unwrap();
    msg.set("raw", &b"\x01\x02\x03"[..]).unwrap();
    msg.set(
        "sats",
        vec![satellite(3, 41.5, true), satellite(17, 12.0, false)],
    )
    .unwrap();
    msg.set("samples", vec![sample(1, "first"), sample(2, "")])
        .unwrap();
    msg
}

#[test]
fn test_report_layout() {
    traced();
    let registry = Registry::new(catalog(), Config::default());
    let codec = registry.get_or_build("gnss/Report").unwrap();

    let kinds: Vec<_> = codec
        .handlers()
        .iter()
        .map(|h| match h {
            Handler::FixedFields(_) => "fixed",
            Handler::VariableString(_) => "string",
            Handler::SubMessage(_) => "message",
            Handler::SubMessageArray(_) => "array",
        })
        .collect();
    assert_eq!(
        kinds,
        ["message", "fixed", "string", "string", "fixed", "array", "array"]
    );
    assert_eq!(codec.handlers()[1].size(), Some(1 + 4));
    assert_eq!(codec.size(), None);

    match &codec.handlers()[5] {
        Handler::SubMessageArray(array) => {
            assert_eq!(array.count(), Some("sats_count"));
            assert_eq!(array.element().size(), Some(10));
        }
        other => panic!("unexpected handler: {other:?}"),
    }
    match &codec.handlers()[6] {
        Handler::SubMessageArray(array) => assert_eq!(array.count(), None),
        other => panic!("unexpected handler: {other:?}"),
    }
}

#[test]
fn test_report_roundtrip() {
    traced();
    let registry = Registry::new(catalog(), Config::default());
    let mut msg = report(&registry);

    let encoded = registry.encode(&mut msg).unwrap();
    let expected = 28 + (1 + 4) + (2 + 7) + (2 + 3) + 1 + 2 * 10 + (4 + 2 + 5) + (4 + 2);
    assert_eq!(encoded.len(), expected);
    assert_eq!(msg.get("sats_count"), Some(&Value::U8(2)));

    let decoded = registry.decode_exact("gnss/Report", encoded.freeze()).unwrap();
    assert_eq!(decoded, msg);
    assert_eq!(decoded.get_as::<String>("label").unwrap(), "rooftop");
    assert_eq!(&decoded.get_as::<Bytes>("raw").unwrap()[..], b"\x01\x02\x03");
}

#[test]
fn test_independent_builds_agree() {
    let first = Registry::new(catalog(), Config::default());
    let second = Registry::new(catalog(), Config::default());

    let mut a = report(&first);
    let mut b = report(&second);
    let encoded_a = first.encode(&mut a).unwrap();
    let encoded_b = second.encode(&mut b).unwrap();
    assert_eq!(encoded_a, encoded_b);

    let decoded_a = first.decode_exact("gnss/Report", &encoded_a[..]).unwrap();
    let decoded_b = second.decode_exact("gnss/Report", &encoded_b[..]).unwrap();
    assert_eq!(decoded_a, decoded_b);
}

#[test]
fn test_build_with_own_cache() {
    let catalog = catalog();
    let cfg = Config::default();
    let point = catalog.schema("pkg/Point").unwrap();
    let point = Arc::new(TypeCodec::build(&point, &cfg, |_| unreachable!()).unwrap());

    let line = MessageSchema::new(
        "pkg/Line",
        vec![
            FieldSchema::scalar("start", "pkg/Point"),
            FieldSchema::scalar("end", "pkg/Point"),
        ],
    );
    let mut requested = Vec::new();
    let codec = TypeCodec::build(&line, &cfg, |name| {
        requested.push(name.to_string());
        Ok(point.clone())
    })
    .unwrap();
    assert_eq!(requested, ["pkg/Point", "pkg/Point"]);

    let mut msg = codec.instantiate();
    let encoded = codec.bind(&mut msg).encode().unwrap();
    assert_eq!(&encoded[..], &[0u8; 16]);
}

#[test_case("float64[9] covariance"; "fixed primitive array")]
#[test_case("float32[] values"; "variable primitive array")]
#[test_case("Point[] items\nuint16 items_count"; "count after array")]
#[test_case("uint16 items_count\nNamed[] items"; "variable size elements")]
#[test_case("uint8 id\nMissing field"; "unknown nested type")]
fn test_rejected(text: &str) {
    traced();
    let mut catalog = catalog();
    catalog.parse("pkg/Bad", text).unwrap();
    let registry = Registry::new(catalog, Config::default());
    let err = registry.get_or_build("pkg/Bad").unwrap_err();
    assert!(matches!(err, Error::Schema(_, _)), "{err:?}");
    assert!(registry.get_or_build("pkg/Point").is_ok());
}

#[test_case(FieldSchema::scalar("n", "float32"); "non-integer count")]
#[test_case(FieldSchema::array("n", "uint16"); "array count")]
fn test_rejected_count(counter: FieldSchema) {
    let mut catalog = catalog();
    catalog.insert(MessageSchema::new(
        "pkg/Bad",
        vec![counter, FieldSchema::array("items", "pkg/Point").with_count("n")],
    ));
    let registry = Registry::new(catalog, Config::default());
    assert!(matches!(
        registry.get_or_build("pkg/Bad"),
        Err(Error::Schema(_, _))
    ));
}

#[test]
fn test_missing_count_field() {
    let mut catalog = catalog();
    catalog.insert(MessageSchema::new(
        "pkg/Bad",
        vec![FieldSchema::array("items", "pkg/Point").with_count("n")],
    ));
    let registry = Registry::new(catalog, Config::default());
    let err = registry.get_or_build("pkg/Bad").unwrap_err();
    assert!(err.to_string().contains("does not exist"), "{err}");
}

#[test]
fn test_count_order_unchecked() {
    let mut catalog = catalog();
    catalog
        .parse("pkg/Late", "Point[] items\nuint16 items_count")
        .unwrap();
    let cfg = Config {
        check_count_order: false,
        ..Config::default()
    };
    let registry = Registry::new(catalog, cfg);
    let codec = registry.get_or_build("pkg/Late").unwrap();
    match &codec.handlers()[0] {
        Handler::SubMessageArray(array) => assert_eq!(array.count(), Some("items_count")),
        other => panic!("unexpected handler: {other:?}"),
    }
}

#[test]
fn test_fixed_array_ignores_count_name() {
    let mut catalog = catalog();
    catalog
        .parse("pkg/Segment", "uint8 ends_count\nPoint[2] ends")
        .unwrap();
    let registry = Registry::new(catalog, Config::default());
    let codec = registry.get_or_build("pkg/Segment").unwrap();
    match &codec.handlers()[1] {
        Handler::SubMessageArray(array) => assert_eq!(array.count(), None),
        other => panic!("unexpected handler: {other:?}"),
    }

    let mut msg = codec.instantiate();
    let encoded = codec.bind(&mut msg).encode().unwrap();
    assert_eq!(encoded.len(), 1 + 2 * 8);
    assert_eq!(codec.decode_exact(encoded.freeze()).unwrap(), msg);
}
