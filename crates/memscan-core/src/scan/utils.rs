//! Byte matching helpers for chunk scanning

/// Offsets in `haystack` where `needle` starts, limited to offsets below `limit`.
///
/// Matches may overlap. A haystack shorter than the needle yields nothing.
pub fn match_offsets<'h>(
    haystack: &'h [u8],
    needle: &'h [u8],
    limit: usize,
) -> impl Iterator<Item = usize> + 'h {
    let starts = match (needle.first(), haystack.len().checked_sub(needle.len())) {
        (Some(_), Some(last)) => (last + 1).min(limit),
        _ => 0,
    };
    let first = needle.first().copied().unwrap_or(0);
    memchr::memchr_iter(first, &haystack[..starts])
        .filter(move |&i| &haystack[i..i + needle.len()] == needle)
}
