//! Integration tests for the crypto layer: KDF, cipher, and key derivation.

use launchkey::crypto::derivation::{derive_ed25519_seed, DEFAULT_DERIVATION_PATH};
use launchkey::crypto::encryption::{decrypt, encrypt, IV_LEN, TAG_LEN};
use launchkey::crypto::kdf::{derive_key, generate_salt, KdfParams, MIN_MEMORY_KIB};
use launchkey::errors::WalletError;
use launchkey::wallet::mnemonic;

fn fast_kdf() -> KdfParams {
    KdfParams {
        memory_kib: MIN_MEMORY_KIB,
        iterations: 1,
        parallelism: 1,
    }
}

// ---------------------------------------------------------------------------
// Key derivation
// ---------------------------------------------------------------------------

#[test]
fn same_password_and_salt_give_same_key() {
    let salt = generate_salt();
    let a = derive_key(b"password", &salt, &fast_kdf()).unwrap();
    let b = derive_key(b"password", &salt, &fast_kdf()).unwrap();
    assert_eq!(*a, *b);
}

#[test]
fn salt_password_and_params_all_change_the_key() {
    let salt = generate_salt();
    let base = derive_key(b"password", &salt, &fast_kdf()).unwrap();

    let other_salt = derive_key(b"password", &generate_salt(), &fast_kdf()).unwrap();
    let other_pw = derive_key(b"passw0rd", &salt, &fast_kdf()).unwrap();
    let other_params = derive_key(
        b"password",
        &salt,
        &KdfParams {
            iterations: 2,
            ..fast_kdf()
        },
    )
    .unwrap();

    assert_ne!(*base, *other_salt);
    assert_ne!(*base, *other_pw);
    assert_ne!(*base, *other_params);
}

#[test]
fn weak_kdf_params_are_refused() {
    let weak = KdfParams {
        memory_kib: 1024,
        ..fast_kdf()
    };
    assert!(matches!(
        derive_key(b"password", &generate_salt(), &weak),
        Err(WalletError::KeyDerivation(_))
    ));
}

// ---------------------------------------------------------------------------
// Authenticated encryption
// ---------------------------------------------------------------------------

#[test]
fn encrypt_then_decrypt_with_derived_key() {
    let key = derive_key(b"password", &generate_salt(), &fast_kdf()).unwrap();
    let sealed = encrypt(&key[..], b"{\"secretKey\":[1,2,3]}").unwrap();

    assert_eq!(sealed.iv.len(), IV_LEN);
    assert_eq!(sealed.auth_tag.len(), TAG_LEN);

    let plain = decrypt(&key[..], &sealed.iv, &sealed.ciphertext, &sealed.auth_tag).unwrap();
    assert_eq!(plain, b"{\"secretKey\":[1,2,3]}");
}

#[test]
fn every_encryption_uses_a_new_iv() {
    let key = [7u8; 32];
    let a = encrypt(&key, b"same").unwrap();
    let b = encrypt(&key, b"same").unwrap();
    assert_ne!(a.iv, b.iv);
    assert_ne!(a.ciphertext, b.ciphertext);
}

#[test]
fn wrong_key_fails_closed() {
    let sealed = encrypt(&[1u8; 32], b"secret").unwrap();
    let result = decrypt(&[2u8; 32], &sealed.iv, &sealed.ciphertext, &sealed.auth_tag);
    assert!(matches!(result, Err(WalletError::InvalidPassword)));
}

#[test]
fn flipped_ciphertext_bit_fails_closed() {
    let key = [1u8; 32];
    let mut sealed = encrypt(&key, b"secret").unwrap();
    sealed.ciphertext[0] ^= 0x80;

    let result = decrypt(&key, &sealed.iv, &sealed.ciphertext, &sealed.auth_tag);
    assert!(matches!(result, Err(WalletError::InvalidPassword)));
}

#[test]
fn swapped_iv_fails_closed() {
    let key = [1u8; 32];
    let a = encrypt(&key, b"secret").unwrap();
    let b = encrypt(&key, b"secret").unwrap();

    let result = decrypt(&key, &b.iv, &a.ciphertext, &a.auth_tag);
    assert!(matches!(result, Err(WalletError::InvalidPassword)));
}

// ---------------------------------------------------------------------------
// Recovery phrase derivation
// ---------------------------------------------------------------------------

#[test]
fn accounts_on_the_path_differ() {
    let seed = [3u8; 64];
    let account0 = derive_ed25519_seed(&seed, DEFAULT_DERIVATION_PATH).unwrap();
    let account1 = derive_ed25519_seed(&seed, "m/44'/501'/1'/0'").unwrap();
    assert_ne!(*account0, *account1);
}

#[test]
fn generated_phrases_reparse_to_the_same_key() {
    let phrase = mnemonic::generate(24).unwrap();
    let reparsed = mnemonic::parse(&phrase.to_string()).unwrap();

    let a = mnemonic::signing_key(&phrase).unwrap();
    let b = mnemonic::signing_key(&reparsed).unwrap();
    assert_eq!(a.to_bytes(), b.to_bytes());
}

#[test]
fn generated_phrases_are_random() {
    let a = mnemonic::generate(12).unwrap().to_string();
    let b = mnemonic::generate(12).unwrap().to_string();
    assert_ne!(a, b);
}
