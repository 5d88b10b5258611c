//! Unit tests for the access class support matrix

use cloud_save_client::access::{AccessClassError, OperationKind};
use cloud_save_client::{AccessClass, DataOptions};

const ALL: [AccessClass; 4] = [
    AccessClass::Default,
    AccessClass::Private,
    AccessClass::Protected,
    AccessClass::Public,
];

fn allowed(operation: OperationKind) -> Vec<AccessClass> {
    ALL.into_iter()
        .filter(|&access_class| {
            DataOptions {
                access_class,
                ..Default::default()
            }
            .validate(operation)
            .is_ok()
        })
        .collect()
}

#[test]
fn test_write_operations() {
    for operation in [OperationKind::Save, OperationKind::Delete, OperationKind::DeleteAll] {
        assert_eq!(
            allowed(operation),
            vec![AccessClass::Default, AccessClass::Public],
            "{operation}"
        );
    }
}

#[test]
fn test_read_operations() {
    for operation in [OperationKind::ListKeys, OperationKind::Load, OperationKind::LoadAll] {
        assert_eq!(
            allowed(operation),
            vec![AccessClass::Default, AccessClass::Protected, AccessClass::Public],
            "{operation}"
        );
    }
}

#[test]
fn test_query_operations() {
    assert_eq!(allowed(OperationKind::PlayerQuery), vec![AccessClass::Public]);
    assert_eq!(allowed(OperationKind::CustomQuery), vec![AccessClass::Default]);
}

#[test]
fn test_private_never_allowed_from_client() {
    let operations = [
        OperationKind::Save,
        OperationKind::Delete,
        OperationKind::DeleteAll,
        OperationKind::ListKeys,
        OperationKind::Load,
        OperationKind::LoadAll,
        OperationKind::PlayerQuery,
        OperationKind::CustomQuery,
    ];
    for operation in operations {
        assert!(!allowed(operation).contains(&AccessClass::Private));
    }
}

#[test]
fn test_player_id_only_for_public_reads() {
    let other = DataOptions::public_for("friend");
    assert!(other.validate(OperationKind::Load).is_ok());
    assert!(other.validate(OperationKind::ListKeys).is_ok());
    assert!(matches!(
        other.validate(OperationKind::Save),
        Err(AccessClassError::PlayerIdNotAllowed { .. })
    ));

    let protected_other = DataOptions {
        player_id: Some("friend".to_string()),
        ..DataOptions::protected()
    };
    assert!(protected_other.validate(OperationKind::Load).is_err());
}
