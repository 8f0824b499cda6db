//! Integration tests for the pwvault crypto module.

use pwvault::crypto::{decrypt, derive, encrypt, generate_salt, verify, Argon2Params, DerivedKey};
use pwvault::VaultError;

fn fast() -> Argon2Params {
    Argon2Params::minimum()
}

// ---------------------------------------------------------------------------
// Key derivation (Argon2id)
// ---------------------------------------------------------------------------

#[test]
fn derive_same_inputs_same_output() {
    let salt = generate_salt().unwrap();

    let key1 = derive(b"my-secure-passphrase", &salt, &fast()).expect("derive 1");
    let key2 = derive(b"my-secure-passphrase", &salt, &fast()).expect("derive 2");

    assert_eq!(
        key1.as_bytes(),
        key2.as_bytes(),
        "same passphrase + salt must produce the same key"
    );
}

#[test]
fn derive_different_salts_different_keys() {
    let key1 = derive(b"same", &generate_salt().unwrap(), &fast()).unwrap();
    let key2 = derive(b"same", &generate_salt().unwrap(), &fast()).unwrap();
    assert_ne!(key1.as_bytes(), key2.as_bytes());
}

#[test]
fn derive_different_passphrases_different_keys() {
    let salt = generate_salt().unwrap();
    let key1 = derive(b"passphrase-one", &salt, &fast()).unwrap();
    let key2 = derive(b"passphrase-two", &salt, &fast()).unwrap();
    assert_ne!(key1.as_bytes(), key2.as_bytes());
}

#[test]
fn verify_accepts_only_the_right_passphrase() {
    let salt = generate_salt().unwrap();
    let key = derive(b"correct-horse", &salt, &fast()).unwrap();
    let check = key.key_check(&salt).unwrap();

    assert!(verify(b"correct-horse", &salt, &check, &fast()).unwrap());
    assert!(!verify(b"wrong-pw", &salt, &check, &fast()).unwrap());
}

#[test]
fn key_check_does_not_reveal_key() {
    let salt = generate_salt().unwrap();
    let key = derive(b"correct-horse", &salt, &fast()).unwrap();
    let check = key.key_check(&salt).unwrap();
    assert_ne!(check.as_slice(), key.as_bytes().as_slice());
    assert_ne!(check.as_slice(), key.record_key().unwrap().as_slice());
}

// ---------------------------------------------------------------------------
// Secret codec
// ---------------------------------------------------------------------------

#[test]
fn full_crypto_pipeline() {
    let salt = generate_salt().unwrap();
    let key = derive(b"hunter2", &salt, &fast()).expect("derive");

    let record = encrypt(&key, "email", "p@ss1").expect("encrypt");
    assert_ne!(record.ciphertext, b"p@ss1".to_vec());

    assert_eq!(decrypt(&key, &record).expect("decrypt"), "p@ss1");
}

#[test]
fn same_password_encrypts_differently() {
    let key = DerivedKey::new([0x11; 32]);
    let r1 = encrypt(&key, "a", "same").unwrap();
    let r2 = encrypt(&key, "a", "same").unwrap();
    assert_ne!(r1.nonce, r2.nonce);
    assert_ne!(r1.ciphertext, r2.ciphertext);
}

#[test]
fn wrong_passphrase_fails_per_record() {
    let salt = generate_salt().unwrap();
    let right = derive(b"correct-horse", &salt, &fast()).unwrap();
    let wrong = derive(b"wrong-pw", &salt, &fast()).unwrap();

    let record = encrypt(&right, "email", "p@ss1").unwrap();
    assert!(matches!(
        decrypt(&wrong, &record),
        Err(VaultError::AuthenticationFailure)
    ));
}

#[test]
fn records_cannot_be_swapped_between_accounts() {
    let key = DerivedKey::new([0x22; 32]);
    let email = encrypt(&key, "email", "p@ss1").unwrap();
    let bank = encrypt(&key, "bank", "b4nk").unwrap();

    // Put the bank ciphertext under the email label.
    let mut forged = bank.clone();
    forged.account = email.account.clone();
    assert!(matches!(
        decrypt(&key, &forged),
        Err(VaultError::AuthenticationFailure)
    ));
}

#[test]
fn authentication_failure_message_leaks_nothing() {
    let key = DerivedKey::new([0x33; 32]);
    let mut record = encrypt(&key, "email", "super-secret-value").unwrap();
    record.tag[0] ^= 1;
    let msg = decrypt(&key, &record).unwrap_err().to_string();
    assert!(!msg.contains("super-secret-value"));
    assert!(!msg.contains("email"));
}
