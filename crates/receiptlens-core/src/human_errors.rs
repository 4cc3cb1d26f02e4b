// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the capture screen.
//
// Every technical error is mapped to plain English with a clear suggestion.
// The severity drives how the host presents it (toast, banner, or dialog).

use crate::error::ReceiptLensError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Camera hiccup or memory pressure: trying again usually works.
    Transient,
    /// User must do something (grant camera access, retake the photo).
    ActionRequired,
    /// Cannot be fixed by retrying: bad configuration, missing capability.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether the host may retry automatically.
    pub retriable: bool,
    pub severity: Severity,
}

/// Convert a `ReceiptLensError` into a `HumanError` for the capture screen.
pub fn humanize_error(err: &ReceiptLensError) -> HumanError {
    match err {
        ReceiptLensError::ImageError(_) => HumanError {
            message: "There's a problem with this photo.".into(),
            suggestion: "Retake the photo. If you picked an existing image, try saving it as a JPEG or PNG first.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },
        ReceiptLensError::BufferAllocation { width, height } => HumanError {
            message: "This photo is too large to process.".into(),
            suggestion: format!(
                "Close other apps and try again, or retake the photo at a lower resolution. ({width}x{height})"
            ),
            retriable: true,
            severity: Severity::Transient,
        },
        ReceiptLensError::FrameUnavailable(_) => HumanError {
            message: "We can't see the camera picture right now.".into(),
            suggestion: "Make sure no other app is using the camera, then try again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },
        ReceiptLensError::SessionClosed => HumanError {
            message: "This photo has already been used.".into(),
            suggestion: "Take a new photo to start again.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },
        ReceiptLensError::InvalidConfig(detail) => HumanError {
            message: "The scanner settings are not valid.".into(),
            suggestion: format!("Reset the scanner settings to their defaults. ({detail})"),
            retriable: false,
            severity: Severity::Permanent,
        },
        ReceiptLensError::PlatformUnavailable => HumanError {
            message: "This device can't do that.".into(),
            suggestion: "Pick an existing photo instead of using the camera.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },
        ReceiptLensError::Serialization(_) => HumanError {
            message: "The saved scanner settings are damaged.".into(),
            suggestion: "Reset the scanner settings to their defaults.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },
    }
}
