//! Parsing of the `-p key=value[,key=value…]` parameter option.
//!
//! Keys mirror the compression parameter fields:
//!
//! | key                    | values                                   |
//! |------------------------|------------------------------------------|
//! | `preprocess`           | `none`, `diff`, `iwt`                    |
//! | `encoder`              | `uncompressed`, `golomb_zero`, `golomb_multi` |
//! | `param`, `outlier`     | unsigned integers                        |
//! | `iterations`           | secondary pass count (0 disables)        |
//! | `secondary_preprocess` | as `preprocess`, plus `model`            |
//! | `secondary_encoder`    | as `encoder`                             |
//! | `secondary_param`, `secondary_outlier` | unsigned integers        |
//! | `model_rate`           | 0–16                                     |
//! | `checksum`, `fallback` | `0`/`1`/`false`/`true`                   |
//!
//! Only the syntax is validated here; the semantic checks (ranges,
//! forbidden combinations) stay with the library so the CLI and embedders
//! agree on them.

use airspace::{CmpParams, EncoderType, Preprocessing};

fn parse_preprocessing(value: &str, secondary: bool) -> Result<Preprocessing, String> {
    match value {
        "none" => Ok(Preprocessing::None),
        "diff" => Ok(Preprocessing::Diff),
        "iwt" => Ok(Preprocessing::Iwt),
        "model" if secondary => Ok(Preprocessing::Model),
        "model" => Err("'model' is only allowed as secondary preprocessing".into()),
        other => Err(format!("unknown preprocessing '{other}'")),
    }
}

fn parse_encoder(value: &str) -> Result<EncoderType, String> {
    match value {
        "uncompressed" => Ok(EncoderType::Uncompressed),
        "golomb_zero" => Ok(EncoderType::GolombZero),
        "golomb_multi" => Ok(EncoderType::GolombMulti),
        other => Err(format!("unknown encoder '{other}'")),
    }
}

fn parse_u32(key: &str, value: &str) -> Result<u32, String> {
    value
        .parse::<u32>()
        .map_err(|_| format!("'{key}' expects an unsigned integer, got '{value}'"))
}

fn parse_bool(key: &str, value: &str) -> Result<bool, String> {
    match value {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        other => Err(format!("'{key}' expects 0 or 1, got '{other}'")),
    }
}

/// Parses a full parameter option string into [`CmpParams`].
///
/// Unset keys keep their defaults (uncompressed mode, no secondary passes).
pub fn parse_params(spec: &str) -> Result<CmpParams, String> {
    let mut params = CmpParams::default();

    for entry in spec.split(',').filter(|e| !e.is_empty()) {
        let (key, value) = entry
            .split_once('=')
            .ok_or_else(|| format!("expected key=value, got '{entry}'"))?;

        match key {
            "preprocess" => params.primary_preprocessing = parse_preprocessing(value, false)?,
            "encoder" => params.primary_encoder_type = parse_encoder(value)?,
            "param" => params.primary_encoder_param = parse_u32(key, value)?,
            "outlier" => params.primary_encoder_outlier = parse_u32(key, value)?,
            "iterations" => params.secondary_iterations = parse_u32(key, value)?,
            "secondary_preprocess" => {
                params.secondary_preprocessing = parse_preprocessing(value, true)?;
            }
            "secondary_encoder" => params.secondary_encoder_type = parse_encoder(value)?,
            "secondary_param" => params.secondary_encoder_param = parse_u32(key, value)?,
            "secondary_outlier" => params.secondary_encoder_outlier = parse_u32(key, value)?,
            "model_rate" => params.model_rate = parse_u32(key, value)?,
            "checksum" => params.checksum_enabled = parse_bool(key, value)?,
            "fallback" => params.uncompressed_fallback_enabled = parse_bool(key, value)?,
            other => return Err(format!("unknown parameter key '{other}'")),
        }
    }

    Ok(params)
}
