use base64::{STANDARD, decode_config};

#[derive(Debug, Clone, Copy)]
pub struct InvalidServerKey;

impl std::fmt::Display for InvalidServerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("server key is not valid url-safe base64")
    }
}

/// Decodes the server's URL-safe base64 public key into raw bytes: pad the
/// input to a multiple of four with `=`, swap the URL-safe alphabet back to
/// the standard one, decode.
pub fn decode_server_key(raw: &str) -> Result<Vec<u8>, InvalidServerKey> {
    let trimmed = raw.trim();
    let mut padded = String::with_capacity(trimmed.len() + 3);
    padded.push_str(trimmed);
    while padded.len() % 4 != 0 {
        padded.push('=');
    }
    let standard: String = padded
        .chars()
        .map(|ch| match ch {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();
    decode_config(&standard, STANDARD).map_err(|_| InvalidServerKey)
}

#[cfg(test)]
#[allow(non_snake_case)]
mod tests {
    use super::*;
    use base64::encode_config;
    use rand::RngCore;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn decode_server_key__should_round_trip_url_safe_re_encodings() {
        // Given
        let mut rng = StdRng::from_seed([21u8; 32]);

        for length in [0usize, 1, 16, 65] {
            let mut bytes = vec![0u8; length];
            rng.fill_bytes(&mut bytes);
            let url_safe = encode_config(&bytes, STANDARD)
                .replace('+', "-")
                .replace('/', "_")
                .replace('=', "");

            // When
            let decoded = decode_server_key(&url_safe).expect("decode");

            // Then
            assert_eq!(decoded, bytes, "length {length}");
        }
    }

    #[test]
    fn decode_server_key__should_decode_known_vector() {
        // When
        let decoded = decode_server_key("_v7-").expect("decode");

        // Then
        assert_eq!(decoded, vec![0xFE, 0xFE, 0xFE]);
    }

    #[test]
    fn decode_server_key__should_reject_garbage() {
        // Then
        assert!(decode_server_key("!!not base64!!").is_err());
    }
}
