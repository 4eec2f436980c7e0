//! Password format rules per cipher algorithm

use crate::core::types::CipherAlgorithm;

/// Check whether a password satisfies the format rules of a cipher.
///
/// - `None`: always valid, a password is not used.
/// - `Wep`: exactly 10, 26 or 40 uppercase hex digits.
/// - `Tkip`/`Ccmp` (WPA/WPA2 pre-shared key): 8 to 63 ASCII characters.
/// - anything else: accepted as-is, the OS decides.
pub fn is_valid(password: &str, cipher: CipherAlgorithm) -> bool {
    match cipher {
        CipherAlgorithm::None => true,
        CipherAlgorithm::Wep => {
            let len = password.len();
            !password.is_empty()
                && (len == 10 || len == 26 || len == 40)
                && password
                    .bytes()
                    .all(|b| matches!(b, b'0'..=b'9' | b'A'..=b'F'))
        }
        CipherAlgorithm::Tkip | CipherAlgorithm::Ccmp => (8..=63).contains(&password.len()),
        _ => true,
    }
}
