//! Small helpers shared by the UI and the headless printer.
//!
//! - **URL validation**: checks for subscription URLs entered at runtime
//! - **Text processing**: width-aware truncation and control-character
//!   stripping for untrusted node fields
//!
//! # Examples
//!
//! ```
//! use clashview::util::{display_width, strip_control_chars, truncate_to_width};
//!
//! let name = strip_control_chars("\x1b[1mHK 01\x1b[0m");
//! assert_eq!(name, "HK 01");
//! assert_eq!(display_width("香港 01"), 7);
//! assert_eq!(truncate_to_width("singapore-premium", 10), "singapo...");
//! ```

mod text;
mod url_validator;

pub use text::{display_width, strip_control_chars, truncate_to_width};
pub use url_validator::{validate_subscription_url, UrlValidationError};

/// Maximum length of the node filter query.
pub const MAX_FILTER_LENGTH: usize = 256;
