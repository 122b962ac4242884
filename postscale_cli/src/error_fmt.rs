//! Human-readable error descriptions and structured JSON error formatting.

use postscale_core::{Resource, ScaleError};

/// Stable machine-readable name of a scale error.
pub fn reason_name(e: &ScaleError) -> &'static str {
    match e {
        ScaleError::DecodeTruncated { .. } => "DecodeTruncated",
        ScaleError::InvalidRead => "InvalidRead",
        ScaleError::NeedsTare => "NeedsTare",
        ScaleError::WrongMode => "WrongMode",
        ScaleError::TransportFault { .. } => "TransportFault",
        ScaleError::Transport(_) => "Transport",
        ScaleError::DeviceCountMismatch { .. } => "DeviceCountMismatch",
        ScaleError::ResourceRelease { .. } => "ResourceReleaseFailure",
    }
}

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    if let Some(se) = err.downcast_ref::<ScaleError>() {
        return match se {
            ScaleError::DeviceCountMismatch { found: 0 } => {
                "What happened: No scale was found.\nLikely causes: Scale unplugged or powered off, wrong device.vendor_id, or missing USB permissions.\nHow to fix: Plug in and switch on the scale, check the vendor id in the config, and make sure the user may access the USB device (udev rule).".to_string()
            }
            ScaleError::DeviceCountMismatch { found } => format!(
                "What happened: {found} matching scales were found; exactly one is supported.\nLikely causes: Several scales from the same vendor are attached.\nHow to fix: Unplug all but one scale and rerun."
            ),
            ScaleError::ResourceRelease { resource, message } => {
                let what = match resource {
                    Resource::Device => "the scale's USB handle",
                    Resource::Context => "the USB context",
                };
                format!(
                    "What happened: Failed to release {what} ({message}).\nLikely causes: The scale was unplugged while in use.\nHow to fix: Reconnect the scale; no data was lost."
                )
            }
            ScaleError::TransportFault { .. } => {
                "What happened: Reading from the scale stalled or timed out.\nLikely causes: Loose cable, the scale going to sleep, or device.read_timeout_ms too low.\nHow to fix: The device was reset; retry, check the cable, or raise device.read_timeout_ms.".to_string()
            }
            ScaleError::NeedsTare => {
                "What happened: The scale reads a negative weight.\nLikely causes: Something was removed after the scale zeroed.\nHow to fix: Clear the platform and press the tare/zero button.".to_string()
            }
            ScaleError::WrongMode => {
                "What happened: The scale is in ounces mode.\nLikely causes: The unit button was pressed.\nHow to fix: Switch the scale to grams; ounces readings are not converted.".to_string()
            }
            other => format!(
                "What happened: {other}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
            ),
        };
    }

    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("invalid configuration")
        || lower.contains("must be")
        || lower.contains("unreasonably large")
    {
        return format!(
            "What happened: Configuration is invalid ({msg}).\nLikely causes: Out-of-range or misspelled values in the TOML.\nHow to fix: Edit the config file and try again."
        );
    }

    if lower.contains("read config") {
        return format!(
            "What happened: The config file could not be read ({msg}).\nHow to fix: Check the --config path."
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Map fatal errors to stable exit codes; anything unclassified returns 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    match err.downcast_ref::<ScaleError>() {
        Some(ScaleError::DeviceCountMismatch { .. }) => 3,
        Some(ScaleError::ResourceRelease { .. }) => 4,
        _ => 1,
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    let reason = err.downcast_ref::<ScaleError>().map_or("Error", reason_name);
    json!({ "reason": reason, "message": humanize(err) }).to_string()
}
