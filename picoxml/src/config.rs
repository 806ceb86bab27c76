// SPDX-License-Identifier: Apache-2.0

/// Configuration for [`crate::XmlReader`].
///
/// ```rust
/// use picoxml::{ReaderConfig, XmlReader};
///
/// let config = ReaderConfig {
///     max_token_len: Some(4096),
///     ..Default::default()
/// };
/// let reader = XmlReader::with_config(config);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderConfig {
    /// Largest number of code points a single unfinished token may occupy.
    ///
    /// The parsing buffer is only compacted at token boundaries, so an
    /// unterminated construct (say, a comment that never closes) keeps
    /// growing it. With a limit set, the reader fails with
    /// [`crate::ParseError::TokenTooLarge`] instead.
    ///
    /// # Default
    ///
    /// `None`, no limit
    pub max_token_len: Option<usize>,

    /// Code points reserved up front in the parsing buffer.
    ///
    /// # Default
    ///
    /// 256
    pub initial_capacity: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            max_token_len: None,
            initial_capacity: 256,
        }
    }
}
