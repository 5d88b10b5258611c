//! Unit tests for file key validation

use cloud_save_client::api::validate_key;
use cloud_save_client::error::codes;
use cloud_save_client::CloudSaveErrorReason;

#[test]
fn test_accepted_keys() {
    let longest = "a".repeat(255);
    for key in ["abc", "a-b_c.d", "A", "-", "save.v2", longest.as_str()] {
        assert!(validate_key(key).is_ok(), "{key:?} should be accepted");
    }
}

#[test]
fn test_rejected_keys() {
    let too_long = "a".repeat(256);
    for key in [".hidden", "", too_long.as_str(), "a/b", "tab\tkey", "é"] {
        let err = validate_key(key).unwrap_err();
        assert_eq!(err.reason(), CloudSaveErrorReason::InvalidArgument, "{key:?}");
        assert_eq!(err.code(), codes::VALIDATION);
    }
}
