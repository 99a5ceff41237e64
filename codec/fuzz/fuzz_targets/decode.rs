#![no_main]

use arbitrary::Arbitrary;
use bytes::Buf;
use libfuzzer_sys::fuzz_target;
use reflex_codec::{Config, Registry};
use reflex_schema::Catalog;
use std::sync::OnceLock;

const DEFINITIONS: &[(&str, &str)] = &[
    ("fuzz/Point", "float32 x\nfloat32 y\nbool valid"),
    ("fuzz/Named", "string name\nuint8[] blob\nchar[3] tag"),
    ("fuzz/Counted", "Header header\nuint8 points_count\nPoint[] points\nint64 tail"),
    ("fuzz/Signed", "int8 points_count\nPoint[] points"),
    ("fuzz/Trail", "Named first\nPoint[2] ends\nNamed[] rest"),
];

fn registry() -> &'static Registry<Catalog> {
    static REGISTRY: OnceLock<Registry<Catalog>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let mut catalog = Catalog::with_std();
        for (name, text) in DEFINITIONS {
            catalog.parse(name, text).expect("definition should parse");
        }
        let cfg = Config {
            max_array_len: 1024,
            ..Config::default()
        };
        Registry::new(catalog, cfg)
    })
}

#[derive(Arbitrary, Debug)]
struct FuzzInput<'a> {
    kind: u8,
    data: &'a [u8],
}

fn fuzz(input: FuzzInput) {
    let registry = registry();
    let (name, _) = DEFINITIONS[input.kind as usize % DEFINITIONS.len()];

    let mut reader = input.data;
    let Ok(mut msg) = registry.decode(name, &mut reader) else {
        return;
    };
    let consumed = input.data.len() - reader.remaining();

    // Anything that decodes must encode back to the bytes it was read from
    let encoded = registry
        .encode(&mut msg)
        .expect("Failed to encode a successfully decoded message!");
    assert_eq!(&encoded[..], &input.data[..consumed]);
}

fuzz_target!(|input: FuzzInput| {
    fuzz(input);
});
