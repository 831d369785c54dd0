//! Pipeline stages for document-to-cropped-image conversion.
//!
//! Each submodule implements exactly one transformation step and is a pure
//! function of its inputs, so stages can be tested in isolation.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ render ──▶ crop ──▶ encode
//! (bytes)  (frames)  (trim)   (data URI)
//! ```
//!
//! 1. [`input`]  — resolve uploaded bytes, a URL, or a path to raw bytes;
//!    the only stage with I/O
//! 2. [`render`] — decode bytes into at most one frame, with a placeholder
//!    fallback for undecodable documents
//! 3. [`crop`]   — trim light margins using a luminance threshold
//! 4. [`encode`] — compress and base64-wrap each frame as a data URI

pub mod crop;
pub mod encode;
pub mod input;
pub mod render;
