/// FNV-1a over the given parts, with a separator byte between them.
///
/// Used to derive RNG streams from symbols and contract slices. Unlike `std`'s
/// `DefaultHasher` the output is stable across processes and releases. Only 64 bits of
/// seed are needed and nothing is adversarial, so a few lines of FNV stand in for `sha2`.
pub fn stream_id(parts: &[&str]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    let mut hash = OFFSET;
    for part in parts {
        for byte in part.bytes().chain(std::iter::once(0x1f)) {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(PRIME);
        }
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_and_part_sensitive() {
        assert_eq!(stream_id(&["SPY", "2026-10-23"]), stream_id(&["SPY", "2026-10-23"]));
        assert_ne!(stream_id(&["SPY", "2026-10-23"]), stream_id(&["SPY2", "026-10-23"]));
        assert_ne!(stream_id(&["QQQ"]), stream_id(&["SPY"]));
    }
}
