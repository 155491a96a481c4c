//! Fixed-ratio linear resampling between 8 kHz and 24 kHz PCM16.
//!
//! Both directions operate on little-endian PCM16 byte sequences and ignore
//! a trailing odd byte; no anti-alias filtering is applied beyond the
//! averaging itself, which is adequate for speech-grade content at these
//! rates.

fn samples_le(pcm: &[u8]) -> impl Iterator<Item = i16> + '_ {
    let usable = pcm.len() - (pcm.len() % 2);
    pcm[..usable]
        .chunks_exact(2)
        .map(|c| i16::from_le_bytes([c[0], c[1]]))
}

/// 8 kHz -> 24 kHz. Each input sample pair yields 3 output samples; the
/// final input sample is replicated three times since it has no successor.
pub fn upsample8to24(pcm: &[u8]) -> Vec<u8> {
    let samples: Vec<i16> = samples_le(pcm).collect();
    let mut out = Vec::with_capacity(samples.len() * 3 * 2);
    for i in 0..samples.len() {
        let s0 = samples[i] as i32;
        if i + 1 < samples.len() {
            let s1 = samples[i + 1] as i32;
            let mid1 = (2 * s0 + s1) / 3;
            let mid2 = (s0 + 2 * s1) / 3;
            out.extend_from_slice(&(s0 as i16).to_le_bytes());
            out.extend_from_slice(&(mid1 as i16).to_le_bytes());
            out.extend_from_slice(&(mid2 as i16).to_le_bytes());
        } else {
            let bytes = (s0 as i16).to_le_bytes();
            for _ in 0..3 {
                out.extend_from_slice(&bytes);
            }
        }
    }
    out
}

/// 24 kHz -> 8 kHz. Each group of 3 input samples yields 1 output sample,
/// the integer mean of the three. A trailing partial group is discarded.
pub fn downsample24to8(pcm: &[u8]) -> Vec<u8> {
    let samples: Vec<i16> = samples_le(pcm).collect();
    let groups = samples.len() / 3;
    let mut out = Vec::with_capacity(groups * 2);
    for g in 0..groups {
        let base = g * 3;
        let sum = samples[base] as i32 + samples[base + 1] as i32 + samples[base + 2] as i32;
        let mean = (sum / 3) as i16;
        out.extend_from_slice(&mean.to_le_bytes());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pcm_from(samples: &[i16]) -> Vec<u8> {
        samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    fn samples_from(pcm: &[u8]) -> Vec<i16> {
        pcm.chunks_exact(2)
            .map(|c| i16::from_le_bytes([c[0], c[1]]))
            .collect()
    }

    #[test]
    fn upsample_length_is_exactly_triple() {
        let pcm = pcm_from(&[100, 200, 300, 400]);
        let up = upsample8to24(&pcm);
        assert_eq!(up.len(), 3 * 4 * 2);
    }

    #[test]
    fn upsample_interpolates_between_pairs() {
        let pcm = pcm_from(&[0, 300]);
        let up = samples_from(&upsample8to24(&pcm));
        // i=0 interpolates against its successor (300); i=1 has none, so it
        // replicates itself three times.
        assert_eq!(up, vec![0, 100, 200, 300, 300, 300]);
    }

    #[test]
    fn upsample_replicates_the_final_sample() {
        let pcm = pcm_from(&[10, 20, 30]);
        let up = samples_from(&upsample8to24(&pcm));
        assert_eq!(&up[6..9], &[30, 30, 30]);
    }

    #[test]
    fn downsample_length_is_floor_div_three() {
        let pcm = pcm_from(&[1, 2, 3, 4, 5, 6, 7]);
        let down = downsample24to8(&pcm);
        assert_eq!(down.len(), 2 * 2);
    }

    #[test]
    fn downsample_is_the_integer_mean_of_each_group() {
        let pcm = pcm_from(&[0, 300, 600]);
        let down = samples_from(&downsample24to8(&pcm));
        assert_eq!(down, vec![300]);
    }

    #[test]
    fn odd_trailing_byte_is_ignored() {
        let mut pcm = pcm_from(&[1, 2]);
        pcm.push(0xAB);
        let up = upsample8to24(&pcm);
        assert_eq!(up.len(), 3 * 2 * 2);
    }

    #[test]
    fn round_trip_through_both_directions_preserves_scale() {
        let original = pcm_from(&[1000, -1000, 2000, -2000, 500, -500]);
        let up = upsample8to24(&original);
        let down = downsample24to8(&up);
        assert_eq!(down.len(), original.len());
    }
}
