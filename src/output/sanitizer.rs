//! ANSI escape stripping for the display sink.

use vte::{Params, Parser, Perform};

/// Streaming sanitizer built on the VTE parser.
///
/// Parser state is kept between chunks, so an escape sequence split
/// across two reads is still removed.
pub struct OutputSanitizer {
    parser: Parser,
    extractor: PlainTextExtractor,
}

impl Default for OutputSanitizer {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputSanitizer {
    /// Create a sanitizer in the ground state.
    pub fn new() -> Self {
        Self {
            parser: Parser::new(),
            extractor: PlainTextExtractor::default(),
        }
    }

    /// Feed the next chunk of output, returning its printable text.
    pub fn push(&mut self, chunk: &str) -> String {
        self.parser.advance(&mut self.extractor, chunk.as_bytes());
        self.extractor.take()
    }

    /// Strip escape sequences from a complete string in one go.
    pub fn strip_ansi_str(input: &str) -> String {
        Self::new().push(input)
    }
}

/// VTE performer that extracts plain text.
#[derive(Default)]
struct PlainTextExtractor {
    output: String,
}

impl PlainTextExtractor {
    fn take(&mut self) -> String {
        std::mem::take(&mut self.output)
    }
}

impl Perform for PlainTextExtractor {
    fn print(&mut self, c: char) {
        self.output.push(c);
    }

    fn execute(&mut self, byte: u8) {
        match byte {
            // Newline, carriage return, tab
            0x0A | 0x0D | 0x09 => self.output.push(byte as char),
            // Everything else, backspace included, is dropped: text already
            // handed to the sink cannot be retracted.
            _ => {}
        }
    }

    fn hook(&mut self, _params: &Params, _intermediates: &[u8], _ignore: bool, _action: char) {}

    fn put(&mut self, _byte: u8) {}

    fn unhook(&mut self) {}

    fn osc_dispatch(&mut self, _params: &[&[u8]], _bell_terminated: bool) {}

    fn csi_dispatch(
        &mut self,
        _params: &Params,
        _intermediates: &[u8],
        _ignore: bool,
        _action: char,
    ) {
    }

    fn esc_dispatch(&mut self, _intermediates: &[u8], _ignore: bool, _byte: u8) {}
}
