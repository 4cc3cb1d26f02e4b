// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for ReceiptLens.
//
// "No document found" and "degenerate crop" are not errors: they surface as
// `None` and as a fallback image respectively.

use thiserror::Error;

/// Top-level error type for all ReceiptLens operations.
#[derive(Debug, Error)]
pub enum ReceiptLensError {
    // -- Image errors --
    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("could not allocate a {width}x{height} output buffer")]
    BufferAllocation { width: u32, height: u32 },

    // -- Capture / session --
    #[error("frame source unavailable: {0}")]
    FrameUnavailable(String),

    #[error("adjustment session already closed")]
    SessionClosed,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // -- Platform bridge --
    #[error("feature not available on this platform")]
    PlatformUnavailable,

    // -- Serialization --
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ReceiptLensError>;
