/// Calculates the 1-based line and column number for a given byte position in
/// the source text. This function is designed to be called only when an error
/// occurs, as it iterates through the source text to determine the position.
pub fn line_and_column(source: &str, position: usize) -> (usize, usize) {
    let mut line = 1;
    let mut column = 1;
    for (i, c) in source.char_indices() {
        if i >= position {
            break;
        }
        if c == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    (line, column)
}

/// Returns a short window of `source` starting at `offset`, suitable for
/// embedding in an error message. The offset is clamped to the input length
/// and both ends are snapped to char boundaries, so a window requested near
/// the end of the buffer never slices out of range.
pub fn excerpt(source: &str, offset: usize) -> &str {
    const WINDOW: usize = 32;
    let mut start = offset.min(source.len());
    while !source.is_char_boundary(start) {
        start -= 1;
    }
    let mut end = (start + WINDOW).min(source.len());
    while !source.is_char_boundary(end) {
        end -= 1;
    }
    &source[start..end]
}
