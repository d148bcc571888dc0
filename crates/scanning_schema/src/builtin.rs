//! Built-in XSD simple types.

use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    String,
    NormalizedString,
    Token,
    Boolean,
    Int,
    Integer,
    Long,
    Short,
    Byte,
    NonNegativeInteger,
    PositiveInteger,
    UnsignedInt,
    Decimal,
    Double,
    Float,
    Date,
    DateTime,
    Time,
    Base64Binary,
    AnyUri,
    /// `anySimpleType` and anything this subset does not model.
    AnySimple,
    /// `anyType`: accepts any content.
    AnyType,
}

impl Builtin {
    pub fn from_name(local: &str) -> Builtin {
        match local {
            "string" => Builtin::String,
            "normalizedString" => Builtin::NormalizedString,
            "token" | "NMTOKEN" | "Name" | "NCName" | "language" => Builtin::Token,
            "boolean" => Builtin::Boolean,
            "int" => Builtin::Int,
            "integer" => Builtin::Integer,
            "long" => Builtin::Long,
            "short" => Builtin::Short,
            "byte" => Builtin::Byte,
            "nonNegativeInteger" => Builtin::NonNegativeInteger,
            "positiveInteger" => Builtin::PositiveInteger,
            "unsignedInt" => Builtin::UnsignedInt,
            "decimal" => Builtin::Decimal,
            "double" => Builtin::Double,
            "float" => Builtin::Float,
            "date" => Builtin::Date,
            "dateTime" => Builtin::DateTime,
            "time" => Builtin::Time,
            "base64Binary" => Builtin::Base64Binary,
            "anyURI" => Builtin::AnyUri,
            "anyType" => Builtin::AnyType,
            _ => Builtin::AnySimple,
        }
    }

    /// Name as printed in validation messages.
    pub fn xs_name(self) -> &'static str {
        match self {
            Builtin::String => "xs:string",
            Builtin::NormalizedString => "xs:normalizedString",
            Builtin::Token => "xs:token",
            Builtin::Boolean => "xs:boolean",
            Builtin::Int => "xs:int",
            Builtin::Integer => "xs:integer",
            Builtin::Long => "xs:long",
            Builtin::Short => "xs:short",
            Builtin::Byte => "xs:byte",
            Builtin::NonNegativeInteger => "xs:nonNegativeInteger",
            Builtin::PositiveInteger => "xs:positiveInteger",
            Builtin::UnsignedInt => "xs:unsignedInt",
            Builtin::Decimal => "xs:decimal",
            Builtin::Double => "xs:double",
            Builtin::Float => "xs:float",
            Builtin::Date => "xs:date",
            Builtin::DateTime => "xs:dateTime",
            Builtin::Time => "xs:time",
            Builtin::Base64Binary => "xs:base64Binary",
            Builtin::AnyUri => "xs:anyURI",
            Builtin::AnySimple => "xs:anySimpleType",
            Builtin::AnyType => "xs:anyType",
        }
    }

    /// Apply the type's whitespace facet. Only `xs:string` preserves whitespace.
    pub fn normalize(self, raw: &str) -> String {
        match self {
            Builtin::String | Builtin::AnySimple | Builtin::AnyType => raw.to_string(),
            Builtin::NormalizedString => raw.replace(['\t', '\n', '\r'], " "),
            _ => raw.split_whitespace().collect::<Vec<_>>().join(" "),
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            Builtin::Int
                | Builtin::Integer
                | Builtin::Long
                | Builtin::Short
                | Builtin::Byte
                | Builtin::NonNegativeInteger
                | Builtin::PositiveInteger
                | Builtin::UnsignedInt
                | Builtin::Decimal
                | Builtin::Double
                | Builtin::Float
        )
    }

    /// Lexical check of an already normalised value.
    pub fn accepts(self, value: &str) -> bool {
        match self {
            Builtin::String
            | Builtin::NormalizedString
            | Builtin::Token
            | Builtin::AnyUri
            | Builtin::AnySimple
            | Builtin::AnyType => true,
            Builtin::Boolean => matches!(value, "true" | "false" | "1" | "0"),
            Builtin::Int => value.parse::<i32>().is_ok(),
            Builtin::Long => value.parse::<i64>().is_ok(),
            Builtin::Short => value.parse::<i16>().is_ok(),
            Builtin::Byte => value.parse::<i8>().is_ok(),
            Builtin::UnsignedInt => value.trim_start_matches('+').parse::<u32>().is_ok(),
            Builtin::Integer => is_integer(value),
            Builtin::NonNegativeInteger => {
                is_integer(value) && !value.starts_with('-') || is_negative_zero(value)
            }
            Builtin::PositiveInteger => {
                is_integer(value)
                    && !value.starts_with('-')
                    && value.trim_start_matches('+').bytes().any(|b| b != b'0')
            }
            Builtin::Decimal => is_decimal(value),
            Builtin::Double | Builtin::Float => {
                matches!(value, "INF" | "-INF" | "NaN")
                    || (!value.is_empty()
                        && !value.contains(|c: char| c.is_ascii_alphabetic() && c != 'e' && c != 'E')
                        && value.parse::<f64>().is_ok())
            }
            Builtin::Date => is_date(value),
            Builtin::DateTime => is_date_time(value),
            Builtin::Time => is_time(value),
            Builtin::Base64Binary => is_base64(value),
        }
    }
}

fn is_integer(value: &str) -> bool {
    let digits = value
        .strip_prefix('-')
        .or_else(|| value.strip_prefix('+'))
        .unwrap_or(value);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn is_negative_zero(value: &str) -> bool {
    value
        .strip_prefix('-')
        .map(|d| !d.is_empty() && d.bytes().all(|b| b == b'0'))
        .unwrap_or(false)
}

fn is_decimal(value: &str) -> bool {
    let unsigned = value
        .strip_prefix('-')
        .or_else(|| value.strip_prefix('+'))
        .unwrap_or(value);
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, f),
        None => (unsigned, ""),
    };
    (!int_part.is_empty() || !frac_part.is_empty())
        && int_part.bytes().all(|b| b.is_ascii_digit())
        && frac_part.bytes().all(|b| b.is_ascii_digit())
}

/// Split a trailing `Z` or `+hh:mm`/`-hh:mm` timezone off a lexical value.
fn strip_timezone(value: &str) -> &str {
    if let Some(rest) = value.strip_suffix('Z') {
        return rest;
    }
    if value.len() > 6 && value.is_char_boundary(value.len() - 6) {
        let (rest, tz) = value.split_at(value.len() - 6);
        let tz = tz.as_bytes();
        if (tz[0] == b'+' || tz[0] == b'-')
            && tz[3] == b':'
            && tz[1..3].iter().chain(&tz[4..6]).all(|b| b.is_ascii_digit())
        {
            return rest;
        }
    }
    value
}

fn is_date(value: &str) -> bool {
    let date = strip_timezone(value);
    date.len() == 10 && NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok()
}

fn is_time(value: &str) -> bool {
    let t = strip_timezone(value);
    let (hms, frac) = match t.split_once('.') {
        Some((hms, frac)) => (hms, Some(frac)),
        None => (t, None),
    };
    if let Some(frac) = frac {
        if frac.is_empty() || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
    }
    let parts: Vec<&str> = hms.split(':').collect();
    if parts.len() != 3
        || parts
            .iter()
            .any(|p| p.len() != 2 || !p.bytes().all(|b| b.is_ascii_digit()))
    {
        return false;
    }
    let h: u32 = parts[0].parse().unwrap_or(99);
    let m: u32 = parts[1].parse().unwrap_or(99);
    let s: u32 = parts[2].parse().unwrap_or(99);
    (h < 24 && m < 60 && s < 60) || (h == 24 && m == 0 && s == 0)
}

fn is_date_time(value: &str) -> bool {
    match value.split_once('T') {
        Some((date, time)) => is_date(date) && is_time(time),
        None => false,
    }
}

fn is_base64(value: &str) -> bool {
    let compact: Vec<u8> = value.bytes().filter(|b| !b.is_ascii_whitespace()).collect();
    if compact.len() % 4 != 0 {
        return false;
    }
    let padding = compact.iter().rev().take_while(|b| **b == b'=').count();
    if padding > 2 {
        return false;
    }
    compact[..compact.len() - padding]
        .iter()
        .all(|b| b.is_ascii_alphanumeric() || *b == b'+' || *b == b'/')
}
