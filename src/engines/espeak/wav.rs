//! Fixing up the WAV stream espeak-ng writes to stdout.
//!
//! A pipe cannot be rewound, so espeak-ng leaves placeholder values in the
//! RIFF and `data` size fields. These helpers rewrite them from the bytes that
//! actually arrived, and join several recordings under one header.

use crate::pcm::HEADER_LEN;

const RIFF_LEN_OFFSET: usize = 4;
const DATA_LEN_OFFSET: usize = 40;

/// Rewrite the size fields of a canonical header to match `wav`'s payload.
pub fn fix_lengths(wav: &mut [u8]) {
    if wav.len() < HEADER_LEN {
        return;
    }
    let data_len = (wav.len() - HEADER_LEN) as u32;
    wav[RIFF_LEN_OFFSET..RIFF_LEN_OFFSET + 4].copy_from_slice(&(data_len + 36).to_le_bytes());
    wav[DATA_LEN_OFFSET..DATA_LEN_OFFSET + 4].copy_from_slice(&data_len.to_le_bytes());
}

/// Join recordings in order, keeping the first header.
///
/// All parts come from the same voice settings, so their formats match.
/// Returns `None` when there is no sample data at all.
pub fn join(recordings: Vec<Vec<u8>>) -> Option<Vec<u8>> {
    let mut parts = recordings.into_iter().filter(|r| r.len() >= HEADER_LEN);
    let mut joined = parts.next()?;
    for part in parts {
        joined.extend_from_slice(&part[HEADER_LEN..]);
    }
    fix_lengths(&mut joined);

    if joined.len() == HEADER_LEN {
        None
    } else {
        Some(joined)
    }
}
