// SPDX-License-Identifier: MPL-2.0

//! Processing pipelines for stereogram generation
//!
//! Heavy bitmap work runs on the blocking pool so callers on an async runtime
//! are never stalled while a pair is composed or encoded.
//!
//! # Pipeline Architecture
//!
//! ```text
//! ┌──────────────┐     ┌───────────────────┐     ┌──────────────┐
//! │ Left + Right │ ──▶ │ Compose Pipeline  │ ──▶ │ JPEG/GIF     │
//! │   images     │     │  - Side by side   │     │  file/bytes  │
//! │              │     │  - Anaglyph       │     │              │
//! │              │     │  - Encoding       │     │              │
//! └──────────────┘     └───────────────────┘     └──────────────┘
//! ```
//!
//! # Modules
//!
//! - [`compose`]: Compositing, encoding and saving

pub mod compose;
