// Copyright 2024-2026 KERP Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Filing-form machinery for the four social-insurance authorities.
//!
//! A form is data, not behavior: an ordered list of sections, each an
//! ordered list of fields with byte widths and validators. The same
//! declaration drives caller-side validation and the byte-exact fixed-width
//! body encoding, so adding a new filing type is a constant-size
//! declaration in one of the per-authority modules.

mod common;
mod dates;
mod errors;
mod field;
mod form;
mod section;
pub mod validators;

pub mod ei;
pub mod nhis;
pub mod nps;

pub use self::dates::{format_compact_date, normalize_date, parse_date};
pub use self::errors::{Error, ValidationError};
pub use self::field::{Alignment, FieldKind, FormField, Value};
pub use self::form::{Form, FormData, Record, SectionData};
pub use self::section::FormSection;
