// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Interactive corner editing: session state machine, overlay rendering, and
// the editor that ties them to the crop step.

pub mod corner_editor;
pub mod overlay;
pub mod session;

pub use corner_editor::{CornerEditor, UpdateCallback};
pub use overlay::{HandleMarker, Overlay};
pub use session::{AdjustmentSession, DragState, PointerInput, normalize_pointer};
