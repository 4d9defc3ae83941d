// snapsize/src/utils/mod.rs
use crate::core::OutputFormat;
use chrono::Utc;
use std::path::Path;
use uuid::Uuid;

/// Top-level prefix for every cloud-saved object.
pub const CLOUD_ROOT: &str = "resized";

const TOKEN_LEN: usize = 11;

/// `<basename>_resized.<ext>`, stripping only the last extension segment.
pub fn output_file_name(original: &str, format: OutputFormat) -> String {
    let basename = match original.rfind('.') {
        Some(dot) if dot + 1 < original.len() => &original[..dot],
        _ => original,
    };
    format!("{}_resized.{}", basename, format.extension())
}

/// Replaces every character outside `[A-Za-z0-9-_.]` with `_`.
pub fn sanitize_user_prefix(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// `resized/[<prefix>/]<timestamp>_<token>.<ext>`.
pub fn cloud_key(
    user_prefix: Option<&str>,
    format: OutputFormat,
    timestamp_ms: i64,
    token: &str,
) -> String {
    let file = format!("{}_{}.{}", timestamp_ms, token, format.extension());
    match user_prefix.map(sanitize_user_prefix) {
        Some(prefix) if !prefix.is_empty() => format!("{}/{}/{}", CLOUD_ROOT, prefix, file),
        _ => format!("{}/{}", CLOUD_ROOT, file),
    }
}

pub fn generate_cloud_key(user_prefix: Option<&str>, format: OutputFormat) -> String {
    cloud_key(
        user_prefix,
        format,
        Utc::now().timestamp_millis(),
        &random_token(),
    )
}

/// Short lowercase base-36 token. Collisions are not checked.
pub fn random_token() -> String {
    let mut value = Uuid::new_v4().as_u128();
    let mut token = String::with_capacity(TOKEN_LEN);
    while token.len() < TOKEN_LEN {
        let digit = (value % 36) as u32;
        token.push(std::char::from_digit(digit, 36).unwrap_or('0'));
        value /= 36;
    }
    token
}

/// Adds `_2`, `_3`, ... before the extension until `taken` says the name is free.
pub fn disambiguate(name: &str, taken: impl Fn(&str) -> bool) -> String {
    if !taken(name) {
        return name.to_string();
    }

    let (stem, extension) = match name.rfind('.') {
        Some(dot) if dot > 0 => (&name[..dot], &name[dot..]),
        _ => (name, ""),
    };

    let mut counter = 2;
    loop {
        let candidate = format!("{}_{}{}", stem, counter, extension);
        if !taken(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let base = 1024_f64;
    let bytes_f64 = bytes as f64;
    let exponent = ((bytes_f64.ln() / base.ln()).floor() as usize).min(UNITS.len() - 1);
    let size = bytes_f64 / base.powi(exponent as i32);

    format!("{:.2} {}", size, UNITS[exponent])
}

pub fn is_supported_format(path: &Path) -> bool {
    let extensions = ["jpg", "jpeg", "png", "gif", "bmp", "tiff", "tif", "webp"];

    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}
