//! Fuzz target: `CredentialId::from_str`
//!
//! Drives arbitrary text into the credential parser and asserts that it
//! never panics, only accepts valid UID lengths, and that anything it
//! accepts survives a trip through the canonical form.
//!
//! cargo fuzz run fuzz_credential_parse

#![no_main]

use libfuzzer_sys::fuzz_target;
use lockbox::credential::CredentialId;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };
    if let Ok(id) = text.parse::<CredentialId>() {
        assert!(matches!(id.as_bytes().len(), 4 | 7 | 10));
        let again: CredentialId = id.canonical().parse().expect("canonical form must parse");
        assert_eq!(again, id);
    }
});
