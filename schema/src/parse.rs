//! Parser for the line-oriented message definition language.
//!
//! # Format
//!
//! ```text
//! # Comments run to the end of the line.
//! uint8 STATUS_FIX=0        # constant (not encoded)
//! Header header             # shorthand for std_msgs/Header
//! uint16 points_count       # integer paired with `points` below
//! Point[] points            # variable-length array of pkg/Point
//! char[4] tag               # fixed-length array
//! string name               # length-prefixed text
//! ```
//!
//! Bare type names that are neither primitives nor `string` are resolved relative to the
//! package of the message being parsed.

use crate::{field::Constant, Error, FieldSchema, MessageSchema, Primitive};

/// Suffix that pairs an integer field with the array it counts.
pub const COUNT_SUFFIX: &str = "_count";

/// Parses the definition `text` of message type `type_name`.
pub fn parse(type_name: &str, text: &str) -> Result<MessageSchema, Error> {
    if !is_type_name(type_name) {
        return Err(Error::InvalidTypeName(type_name.to_string()));
    }
    let mut schema = MessageSchema::new(type_name, Vec::new());
    let package = schema.package().map(str::to_string);

    for (index, raw) in text.lines().enumerate() {
        let lineno = index + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let malformed = || Error::Malformed(type_name.to_string(), lineno, line.to_string());
        let (ty, rest) = line.split_once(char::is_whitespace).ok_or_else(malformed)?;
        let rest = rest.trim_start();

        // Constants: `type NAME=value`. String constants keep everything after `=`.
        let code = strip_comment(rest);
        if let Some((name, _)) = code.split_once('=') {
            let value = match ty {
                "string" => rest.split_once('=').map(|(_, v)| v).unwrap_or_default(),
                _ => code.split_once('=').map(|(_, v)| v).unwrap_or_default(),
            };
            schema
                .constants
                .push(constant(type_name, lineno, ty, name.trim(), value.trim(), line)?);
            continue;
        }

        let name = code.trim();
        if !is_identifier(name) {
            return Err(malformed());
        }
        if schema.field(name).is_some() {
            return Err(Error::DuplicateField(type_name.to_string(), name.to_string()));
        }
        let field = field(type_name, lineno, package.as_deref(), ty, name, line)?;
        schema.fields.push(field);
    }

    link_counts(&mut schema);
    Ok(schema)
}

/// Pairs each variable-length sub-message array `x` without a count link with an integer
/// field `x_count`.
fn link_counts(schema: &mut MessageSchema) {
    let links: Vec<(usize, String)> = schema
        .fields
        .iter()
        .enumerate()
        .filter(|(_, f)| f.is_array && f.array_len.is_none() && f.primitive().is_none())
        .filter(|(_, f)| f.count_field.is_none())
        .filter_map(|(i, f)| {
            let count = format!("{}{COUNT_SUFFIX}", f.name);
            let counter = schema.field(&count)?;
            let integer = !counter.is_array && counter.primitive()?.is_integer();
            integer.then_some((i, count))
        })
        .collect();
    for (i, count) in links {
        schema.fields[i].count_field = Some(count);
    }
}

fn field(
    type_name: &str,
    lineno: usize,
    package: Option<&str>,
    ty: &str,
    name: &str,
    line: &str,
) -> Result<FieldSchema, Error> {
    let (base, array) = match ty.split_once('[') {
        Some((base, suffix)) => {
            let len = suffix.strip_suffix(']').ok_or_else(|| {
                Error::Malformed(type_name.to_string(), lineno, line.to_string())
            })?;
            (base, Some(len))
        }
        None => (ty, None),
    };
    if !is_type_name(base) {
        return Err(Error::Malformed(
            type_name.to_string(),
            lineno,
            line.to_string(),
        ));
    }
    let base = resolve(base, package);
    match array {
        None => Ok(FieldSchema::scalar(name, base)),
        Some("") => Ok(FieldSchema::array(name, base)),
        Some(len) => {
            let len = len.parse::<usize>().map_err(|_| {
                Error::InvalidArrayLength(type_name.to_string(), lineno, len.to_string())
            })?;
            Ok(FieldSchema::fixed_array(name, base, len))
        }
    }
}

fn constant(
    type_name: &str,
    lineno: usize,
    ty: &str,
    name: &str,
    value: &str,
    line: &str,
) -> Result<Constant, Error> {
    let valid = (ty == "string" || Primitive::from_name(ty).is_some())
        && is_identifier(name)
        && (ty == "string" || !value.is_empty());
    if !valid {
        return Err(Error::InvalidConstant(
            type_name.to_string(),
            lineno,
            line.to_string(),
        ));
    }
    Ok(Constant {
        name: name.to_string(),
        type_name: ty.to_string(),
        value: value.to_string(),
    })
}

/// Qualifies a bare message type with `package`.
fn resolve(base: &str, package: Option<&str>) -> String {
    if base == "Header" {
        return "std_msgs/Header".to_string();
    }
    if base == "string" || base.contains('/') || Primitive::from_name(base).is_some() {
        return base.to_string();
    }
    match package {
        Some(package) => format!("{package}/{base}"),
        None => base.to_string(),
    }
}

fn strip_comment(s: &str) -> &str {
    s.split_once('#').map_or(s, |(code, _)| code)
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn is_type_name(s: &str) -> bool {
    match s.split_once('/') {
        Some((package, name)) => is_identifier(package) && is_identifier(name),
        None => is_identifier(s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GNSS_STATUS: &str = "
# Satellite summary
Header header
uint8 STATUS_NO_FIX=255   # -1 in the vendor document
string LABEL=primary # receiver
float32 clock_offset
uint16 channel_status_count
ChannelStatus[] channel_status
char[4] model
uint8[] raw
";

    #[test]
    fn test_parse_fields() {
        let schema = parse("applanix_msgs/GNSSStatus", GNSS_STATUS).unwrap();
        let names: Vec<_> = schema.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["header", "clock_offset", "channel_status_count", "channel_status", "model", "raw"]
        );

        let header = schema.field("header").unwrap();
        assert_eq!(header.base_type, "std_msgs/Header");
        assert!(!header.is_array);

        let channels = schema.field("channel_status").unwrap();
        assert_eq!(channels.base_type, "applanix_msgs/ChannelStatus");
        assert_eq!(channels.type_name, "applanix_msgs/ChannelStatus[]");
        assert_eq!(channels.count_field.as_deref(), Some("channel_status_count"));

        let model = schema.field("model").unwrap();
        assert_eq!(model.array_len, Some(4));
        assert!(model.is_simple_fixed());

        assert!(schema.field("raw").unwrap().is_byte_blob());
    }

    #[test]
    fn test_parse_constants() {
        let schema = parse("applanix_msgs/GNSSStatus", GNSS_STATUS).unwrap();
        let fix = schema.constant("STATUS_NO_FIX").unwrap();
        assert_eq!(fix.type_name, "uint8");
        assert_eq!(fix.value, "255");

        // String constants keep everything after `=`
        let label = schema.constant("LABEL").unwrap();
        assert_eq!(label.value, "primary # receiver");
    }

    #[test]
    fn test_count_link_requires_integer() {
        let schema = parse("pkg/A", "float32 items_count\nItem[] items").unwrap();
        assert!(schema.field("items").unwrap().count_field.is_none());

        let schema = parse("pkg/A", "Item[] items\nuint32 items_count").unwrap();
        assert_eq!(
            schema.field("items").unwrap().count_field.as_deref(),
            Some("items_count")
        );
    }

    #[test]
    fn test_count_link_skips_fixed_arrays() {
        let schema = parse("pkg/A", "uint8 ends_count\nPoint[2] ends").unwrap();
        let ends = schema.field("ends").unwrap();
        assert_eq!(ends.array_len, Some(2));
        assert!(ends.count_field.is_none());
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            parse("pkg/A", "uint8"),
            Err(Error::Malformed(_, 1, _))
        ));
        assert!(matches!(
            parse("pkg/A", "uint8 a\nuint8[x] b"),
            Err(Error::InvalidArrayLength(_, 2, _))
        ));
        assert!(matches!(
            parse("pkg/A", "uint8 a\nuint16 a"),
            Err(Error::DuplicateField(_, _))
        ));
        assert!(matches!(
            parse("pkg/A", "Point P=3"),
            Err(Error::InvalidConstant(_, 1, _))
        ));
        assert!(matches!(
            parse("pkg/A", "uint8 a b"),
            Err(Error::Malformed(_, 1, _))
        ));
        assert!(matches!(
            parse("not a type", ""),
            Err(Error::InvalidTypeName(_))
        ));
    }

    #[test]
    fn test_unqualified_type() {
        let schema = parse("Bare", "Point p").unwrap();
        assert_eq!(schema.field("p").unwrap().base_type, "Point");
    }
}
