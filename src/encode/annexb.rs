//! H.264 Annex-B byte-stream helpers.
//!
//! The ffmpeg encoder emits one continuous byte stream with an access unit delimiter (AUD) at the
//! start of every access unit. These helpers cut that stream back into per-frame chunks.

/// NAL unit type of an IDR slice.
pub const NAL_IDR: u8 = 5;
/// NAL unit type of an access unit delimiter.
pub const NAL_AUD: u8 = 9;

const START_CODE: [u8; 4] = [0, 0, 0, 1];

/// Locate the next start code at or after `from`. Returns `(position, length)`.
fn find_start_code(data: &[u8], from: usize) -> Option<(usize, usize)> {
    let mut i = from;
    while i + 3 <= data.len() {
        if data[i] == 0 && data[i + 1] == 0 && data[i + 2] == 1 {
            if i > from && data[i - 1] == 0 {
                return Some((i - 1, 4));
            }
            return Some((i, 3));
        }
        i += 1;
    }
    None
}

/// NAL unit type from the first header byte.
pub fn nal_type(nal: &[u8]) -> Option<u8> {
    nal.first().map(|b| b & 0x1f)
}

/// Iterate the NAL units of an Annex-B buffer, without their start codes.
pub fn nal_units(data: &[u8]) -> impl Iterator<Item = &[u8]> {
    let mut next = find_start_code(data, 0);
    std::iter::from_fn(move || {
        let (pos, len) = next?;
        let body = pos + len;
        next = find_start_code(data, body);
        let end = next.map(|(p, _)| p).unwrap_or(data.len());
        Some(&data[body..end])
    })
    .filter(|nal| !nal.is_empty())
}

/// Return `true` when the access unit contains an IDR slice.
pub fn contains_idr(au: &[u8]) -> bool {
    nal_units(au).any(|nal| nal_type(nal) == Some(NAL_IDR))
}

/// Re-emit `au` without access unit delimiters, using 4-byte start codes.
pub fn strip_aud(au: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(au.len());
    for nal in nal_units(au).filter(|nal| nal_type(nal) != Some(NAL_AUD)) {
        out.extend_from_slice(&START_CODE);
        out.extend_from_slice(nal);
    }
    out
}

/// Incremental splitter turning a delimited Annex-B stream into access units.
///
/// An access unit is complete once the delimiter of the following one has been seen; the final
/// unit is released by [`AccessUnitSplitter::finish`].
#[derive(Debug, Default)]
pub struct AccessUnitSplitter {
    pending: Vec<u8>,
    // Start of the delimiter opening the unit currently being accumulated.
    current: Option<usize>,
    search_from: usize,
}

impl AccessUnitSplitter {
    /// Create an empty splitter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed stream bytes; returns every access unit completed by them.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<Vec<u8>> {
        self.pending.extend_from_slice(bytes);
        let mut out = Vec::new();

        while let Some((pos, len)) = find_start_code(&self.pending, self.search_from) {
            let Some(&header) = self.pending.get(pos + len) else {
                // Type byte not buffered yet; rescan this start code next time.
                self.search_from = pos;
                return out;
            };
            self.search_from = pos + len;
            if header & 0x1f != NAL_AUD {
                continue;
            }

            match self.current {
                None => self.current = Some(pos),
                Some(_) => {
                    // Bytes before the first delimiter belong to the first unit.
                    let au: Vec<u8> = self.pending.drain(..pos).collect();
                    out.push(au);
                    self.current = Some(0);
                    self.search_from = len;
                }
            }
        }

        // Keep a partial start code at the tail visible to the next scan.
        self.search_from = self
            .search_from
            .max(self.pending.len().saturating_sub(3))
            .min(self.pending.len());
        out
    }

    /// Flush the final access unit, if it carries any payload.
    pub fn finish(&mut self) -> Option<Vec<u8>> {
        let rest = std::mem::take(&mut self.pending);
        self.current = None;
        self.search_from = 0;
        let has_payload = nal_units(&rest).any(|nal| nal_type(nal) != Some(NAL_AUD));
        has_payload.then_some(rest)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/annexb.rs"]
mod tests;
