//! Display-side output processing.
//!
//! Shell output is relayed verbatim by default. When the display cannot
//! interpret terminal control sequences (a log file, a plain text view),
//! [`OutputSanitizer`] strips them while keeping line structure.
//!
//! # Example
//!
//! ```
//! use sshtool::output::OutputSanitizer;
//!
//! let mut sanitizer = OutputSanitizer::new();
//! assert_eq!(sanitizer.push("\x1b[01;34mdir\x1b[0m\r\n"), "dir\r\n");
//! ```

mod sanitizer;

pub use sanitizer::OutputSanitizer;
