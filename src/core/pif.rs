use crate::core::props::SystemProps;
use crate::domain::model::{PifProfile, RepoType};
use crate::utils::error::{PifError, Result};
use chrono::NaiveDate;

const FINGERPRINT_KEYS: &[&str] = &[
    "ro.build.fingerprint",
    "ro.product.build.fingerprint",
    "ro.bootimage.build.fingerprint",
    "ro.vendor.build.fingerprint",
    "ro.system.build.fingerprint",
];

const PRODUCT_KEYS: &[&str] = &[
    "ro.build.product",
    "ro.product.device",
    "ro.product.name",
    "ro.product.board",
];

const DEVICE_KEYS: &[&str] = &["ro.product.device", "ro.build.product", "ro.product.board"];

const FIRST_API_LEVEL_KEYS: &[&str] = &[
    "ro.product.first_api_level",
    "ro.board.first_api_level",
    "ro.board.api_level",
    "ro.build.version.sdk",
    "ro.system.build.version.sdk",
];

const SECURITY_PATCH_KEYS: &[&str] = &[
    "ro.build.version.security_patch",
    "ro.vendor.build.security_patch",
];

/// Android 5.0 (Lollipop).
pub const MIN_FIRST_API_LEVEL: i64 = 21;

fn chain(props: &SystemProps, keys: &[&str], fallback: &str) -> String {
    props
        .first_non_empty(keys)
        .unwrap_or(fallback)
        .trim()
        .to_string()
}

fn or_default(props: &SystemProps, key: &str, default: &str) -> String {
    props.get(key).unwrap_or(default).trim().to_string()
}

/// An integer literal in canonical form: no sign for zero, no leading zeros.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ApiLevel {
    negative: bool,
    digits: String,
}

impl ApiLevel {
    fn is_below(&self, min: i64) -> bool {
        if self.negative {
            return true;
        }
        match self.digits.parse::<i64>() {
            Ok(value) => value < min,
            Err(_) => false,
        }
    }
}

impl std::fmt::Display for ApiLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.negative {
            write!(f, "-")?;
        }
        f.write_str(&self.digits)
    }
}

/// Accepts an optional sign and `_` separators between digits, with no
/// upper bound on size.
fn parse_api_level(raw: &str) -> Result<ApiLevel> {
    let invalid = || {
        PifError::validation(
            "FIRST_API_LEVEL",
            format!("FIRST_API_LEVEL must be a valid integer: {}", raw),
        )
    };

    let trimmed = raw.trim();
    let (negative, body) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let mut digits = String::with_capacity(body.len());
    for group in body.split('_') {
        if group.is_empty() || !group.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        digits.push_str(group);
    }

    let digits = match digits.trim_start_matches('0') {
        "" => "0".to_string(),
        significant => significant.to_string(),
    };
    Ok(ApiLevel {
        negative: negative && digits != "0",
        digits,
    })
}

/// Derives a profile from parsed properties and validates it.
pub fn build_pif(props: &SystemProps) -> Result<PifProfile> {
    let fingerprint = chain(props, FINGERPRINT_KEYS, "");
    if fingerprint.is_empty() {
        return Err(PifError::MissingFingerprint);
    }

    let first_api_level = parse_api_level(&chain(props, FIRST_API_LEVEL_KEYS, "0"))?;

    let profile = PifProfile {
        manufacturer: or_default(props, "ro.product.manufacturer", "Google"),
        model: or_default(props, "ro.product.model", "Unknown"),
        fingerprint,
        brand: or_default(props, "ro.product.brand", "google"),
        product: chain(props, PRODUCT_KEYS, ""),
        device: chain(props, DEVICE_KEYS, ""),
        security_patch: chain(props, SECURITY_PATCH_KEYS, ""),
        first_api_level: first_api_level.to_string(),
    };

    validate_pif(&profile)?;
    Ok(profile)
}

pub fn validate_pif(pif: &PifProfile) -> Result<()> {
    let required = [
        ("MANUFACTURER", &pif.manufacturer),
        ("MODEL", &pif.model),
        ("FINGERPRINT", &pif.fingerprint),
        ("BRAND", &pif.brand),
        ("PRODUCT", &pif.product),
        ("DEVICE", &pif.device),
    ];

    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(PifError::validation(
                field,
                format!("Field '{}' is empty or missing", field),
            ));
        }
    }

    let api_level = parse_api_level(&pif.first_api_level)?;
    if api_level.is_below(MIN_FIRST_API_LEVEL) {
        return Err(PifError::validation(
            "FIRST_API_LEVEL",
            format!("Invalid FIRST_API_LEVEL: {}", api_level),
        ));
    }

    let patch = pif.security_patch.as_str();
    if !patch.is_empty()
        && (patch.len() != 10 || NaiveDate::parse_from_str(patch, "%Y-%m-%d").is_err())
    {
        return Err(PifError::validation(
            "SECURITY_PATCH",
            format!("Invalid SECURITY_PATCH format: {}", patch),
        ));
    }

    Ok(())
}

/// `<prefix><asset name without .zip>.json`
pub fn output_filename(repo_type: RepoType, asset_name: &str) -> String {
    format!(
        "{}{}.json",
        repo_type.file_prefix(),
        asset_name.replace(".zip", "")
    )
}
