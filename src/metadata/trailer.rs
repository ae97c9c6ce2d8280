//! Trailer lookup and rendition selection.

use crate::metadata::record::{media_type, MovieRecord, Rendition};

/// Media code of the trailer: the movie's own trailer reference, otherwise
/// the first media item typed as a trailer.
pub fn trailer_reference(movie: &MovieRecord) -> Option<u64> {
    movie.trailer_code.filter(|&code| code != 0).or_else(|| {
        movie
            .media
            .iter()
            .find(|m| m.kind == Some(media_type::TRAILER))
            .and_then(|m| m.code)
    })
}

/// Best rendition not above `max_quality`.
///
/// Renditions with equal quality codes resolve to the last one seen.
pub fn select_rendition(renditions: &[Rendition], max_quality: u64) -> Option<&Rendition> {
    renditions
        .iter()
        .filter(|r| r.quality <= max_quality)
        .fold(None, |best: Option<&Rendition>, r| match best {
            Some(b) if b.quality > r.quality => Some(b),
            _ => Some(r),
        })
}
