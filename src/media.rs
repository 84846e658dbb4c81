//! Media inspection for uploaded files.
//!
//! Only ISO base media files (MP4, MOV, M4V) are inspected: the duration is read from
//! the `mvhd` box inside `moov`. Anything else reports no duration.

/// read_duration
///
/// Returns the presentation duration in seconds declared by the movie header,
/// or `None` if the bytes are not an ISO media file or the header is missing.
pub fn read_duration(bytes: &[u8]) -> Option<f64> {
    let moov = find_box(bytes, b"moov")?;
    let mvhd = find_box(moov, b"mvhd")?;
    parse_mvhd(mvhd)
}

/// Iterates over the top-level boxes of `data` and returns the payload of the first
/// box of type `kind`.
fn find_box<'a>(mut data: &'a [u8], kind: &[u8; 4]) -> Option<&'a [u8]> {
    while data.len() >= 8 {
        let size32 = u32::from_be_bytes(data[0..4].try_into().ok()?);
        let box_type = &data[4..8];

        let (header_len, box_len) = match size32 {
            // Box extends to the end of the enclosing data.
            0 => (8, data.len()),
            // 64-bit "largesize" follows the type.
            1 => {
                if data.len() < 16 {
                    return None;
                }
                let size64 = u64::from_be_bytes(data[8..16].try_into().ok()?);
                (16, usize::try_from(size64).ok()?)
            }
            n => (8, n as usize),
        };

        if box_len < header_len || box_len > data.len() {
            return None;
        }

        if box_type == kind {
            return Some(&data[header_len..box_len]);
        }
        data = &data[box_len..];
    }
    None
}

fn parse_mvhd(payload: &[u8]) -> Option<f64> {
    let version = *payload.first()?;
    // version(1) + flags(3), then creation/modification times.
    let (timescale, duration) = match version {
        0 => {
            let fields = payload.get(4..20)?;
            let timescale = u32::from_be_bytes(fields[8..12].try_into().ok()?);
            let duration = u32::from_be_bytes(fields[12..16].try_into().ok()?) as u64;
            (timescale, duration)
        }
        1 => {
            let fields = payload.get(4..32)?;
            let timescale = u32::from_be_bytes(fields[16..20].try_into().ok()?);
            let duration = u64::from_be_bytes(fields[20..28].try_into().ok()?);
            (timescale, duration)
        }
        _ => return None,
    };

    if timescale == 0 {
        return None;
    }
    Some(duration as f64 / f64::from(timescale))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boxed(kind: &[u8; 4], payload: &[u8]) -> Vec<u8> {
        let mut out = ((payload.len() + 8) as u32).to_be_bytes().to_vec();
        out.extend_from_slice(kind);
        out.extend_from_slice(payload);
        out
    }

    /// Builds a minimal MP4 (`ftyp` + `moov/mvhd` v0) declaring the given duration.
    fn mp4_with_duration(timescale: u32, units: u32) -> Vec<u8> {
        let mut mvhd = vec![0u8; 4];
        mvhd.extend_from_slice(&0u32.to_be_bytes());
        mvhd.extend_from_slice(&0u32.to_be_bytes());
        mvhd.extend_from_slice(&timescale.to_be_bytes());
        mvhd.extend_from_slice(&units.to_be_bytes());
        mvhd.extend_from_slice(&[0u8; 80]);

        let mut file = boxed(b"ftyp", b"isom\0\0\x02\0isomiso2");
        file.extend(boxed(b"moov", &boxed(b"mvhd", &mvhd)));
        file
    }

    #[test]
    fn reads_version_zero_header() {
        let file = mp4_with_duration(1000, 12_500);
        assert_eq!(read_duration(&file), Some(12.5));
    }

    #[test]
    fn reads_version_one_header() {
        let mut mvhd = vec![1u8, 0, 0, 0];
        mvhd.extend_from_slice(&0u64.to_be_bytes());
        mvhd.extend_from_slice(&0u64.to_be_bytes());
        mvhd.extend_from_slice(&600u32.to_be_bytes());
        mvhd.extend_from_slice(&(600u64 * 90).to_be_bytes());
        let file = boxed(b"moov", &boxed(b"mvhd", &mvhd));

        assert_eq!(read_duration(&file), Some(90.0));
    }

    #[test]
    fn skips_leading_boxes() {
        let mut file = boxed(b"free", &[0u8; 32]);
        file.extend(mp4_with_duration(30, 60));
        assert_eq!(read_duration(&file), Some(2.0));
    }

    #[test]
    fn rejects_non_mp4_and_truncated_input() {
        assert_eq!(read_duration(b"not a video at all"), None);
        assert_eq!(read_duration(&[]), None);

        let file = mp4_with_duration(1000, 5000);
        assert_eq!(read_duration(&file[..file.len() - 40]), None);
    }

    #[test]
    fn zero_timescale_is_unknown() {
        assert_eq!(read_duration(&mp4_with_duration(0, 100)), None);
    }
}
