use base64::{URL_SAFE_NO_PAD, encode_config};
use jwt_simple::prelude::ES256KeyPair;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};

/// A freshly generated VAPID key pair identifying a server deployment to the
/// push messaging platform. Generated once per deployment by `satchel init`;
/// the client itself only ever consumes the public half.
#[derive(Debug, Clone)]
pub struct VapidKeyPair {
    pub private_key: String,
    pub public_key: String,
}

pub fn generate_vapid_keypair() -> Result<VapidKeyPair, web_push::WebPushError> {
    let mut rng = OsRng;
    generate_vapid_keypair_with_rng(&mut rng)
}

pub(crate) fn generate_vapid_keypair_with_rng<R: RngCore + CryptoRng>(
    rng: &mut R,
) -> Result<VapidKeyPair, web_push::WebPushError> {
    let key_pair = es256_keypair_with_rng(rng);
    let private_key = encode_config(key_pair.to_bytes(), URL_SAFE_NO_PAD);
    let public_key =
        web_push::VapidSignatureBuilder::from_base64_no_sub(&private_key, URL_SAFE_NO_PAD)?
            .get_public_key();
    let public_key = encode_config(public_key, URL_SAFE_NO_PAD);

    Ok(VapidKeyPair {
        private_key,
        public_key,
    })
}

// Not every 32-byte string is a valid P-256 scalar; draw until one is.
fn es256_keypair_with_rng<R: RngCore + CryptoRng>(rng: &mut R) -> ES256KeyPair {
    let mut key_bytes = [0u8; 32];
    loop {
        rng.fill_bytes(&mut key_bytes);
        if let Ok(key_pair) = ES256KeyPair::from_bytes(&key_bytes) {
            return key_pair;
        }
    }
}
