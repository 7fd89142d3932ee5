//! Canal client authentication
//!
//! The CLIENTAUTHENTICATION body always carries the client identity and
//! the advertised idle timeouts. Credentials are optional: when a
//! username is configured the password is scrambled with the seed bytes
//! from the server handshake instead of being sent in the clear, using
//! the same SHA1 construction as MySQL native password auth.

use crate::config::CanalConfig;
use crate::proto::{ClientAuth, Handshake};

/// Scrambles a password with the handshake seeds.
///
/// XOR(SHA1(password), SHA1(seed + SHA1(SHA1(password))))
pub fn scramble_password(password: &str, seed: &[u8]) -> Vec<u8> {
    if password.is_empty() {
        return Vec::new();
    }

    let stage1 = sha1(password.as_bytes());
    let stage2 = sha1(&stage1);

    let mut combined = seed.to_vec();
    combined.extend_from_slice(&stage2);
    let stage3 = sha1(&combined);

    stage1
        .iter()
        .zip(stage3.iter())
        .map(|(a, b)| a ^ b)
        .collect()
}

fn sha1(data: &[u8]) -> Vec<u8> {
    use sha1::{Digest, Sha1};
    let mut hasher = Sha1::new();
    hasher.update(data);
    hasher.finalize().to_vec()
}

/// Builds the CLIENTAUTHENTICATION body for one session.
pub fn build_client_auth(config: &CanalConfig, handshake: &Handshake) -> ClientAuth {
    let mut auth = ClientAuth {
        destination: config.destination.clone(),
        client_id: config.client_id.clone(),
        net_read_timeout: Some(config.idle_timeout_ms),
        net_write_timeout: Some(config.idle_timeout_ms),
        ..Default::default()
    };

    if !config.username.is_empty() {
        auth.username = config.username.clone();
        auth.password = scramble_password(&config.password, &handshake.seeds);
    }

    auth
}
