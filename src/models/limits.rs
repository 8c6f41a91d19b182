//! Size limits shared by the editor and the import schema
//!
//! Anything the editor can build must import again, so the model setters
//! and `schema::validate` both read their bounds from here.

use super::error::ChartError;

pub const MAX_ID_LEN: usize = 100;
pub const MAX_NAME_LEN: usize = 200;
pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_SUBTITLE_LEN: usize = 200;
pub const MAX_DESCRIPTION_LEN: usize = 2000;

/// Rows in one chart
pub const MAX_ROWS: usize = 50;

/// Highest fret a diagram may show or start at
pub const MAX_FRET: u8 = 24;

pub const MAX_BARS: u32 = 32;

/// Strum slots in one pattern, across all bars
pub const MAX_BEATS: usize = 128;

/// Length is counted in characters, not bytes
pub fn check_text(field: &'static str, text: &str, max: usize) -> Result<(), ChartError> {
    let len = text.chars().count();
    if len > max {
        return Err(ChartError::TextTooLong { field, len, max });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_text_counts_chars() {
        assert!(check_text("title", &"é".repeat(MAX_TITLE_LEN), MAX_TITLE_LEN).is_ok());
        assert_eq!(
            check_text("title", &"x".repeat(MAX_TITLE_LEN + 1), MAX_TITLE_LEN),
            Err(ChartError::TextTooLong { field: "title", len: 201, max: 200 })
        );
    }
}
