use super::*;

#[test]
fn test_empty_name_defaults_to_up() {
    assert_eq!(Operation::from_name("").unwrap(), Operation::Up);
    assert_eq!(Operation::from_name("  ").unwrap(), Operation::Up);
}

#[test]
fn test_parse_known_names() {
    assert_eq!(Operation::from_name("install").unwrap(), Operation::Install);
    assert_eq!(Operation::from_name("up").unwrap(), Operation::Up);
    assert_eq!(Operation::from_name("drop").unwrap(), Operation::Drop);
    assert_eq!(Operation::from_name("RESET").unwrap(), Operation::Reset);
}

#[test]
fn test_unknown_name_is_rejected() {
    let err = Operation::from_name("qwerty").unwrap_err();
    assert!(matches!(err, CoreError::UnknownOperation { ref name } if name == "qwerty"));
    assert!(err.to_string().contains("[E007]"));
}

#[test]
fn test_display_round_trips() {
    for op in Operation::ALL {
        assert_eq!(op.to_string().parse::<Operation>().unwrap(), op);
    }
}

#[test]
fn test_yaml_names() {
    let ops: Vec<Operation> = serde_yaml::from_str("[up, install, drop]").unwrap();
    assert_eq!(ops, vec![Operation::Up, Operation::Install, Operation::Drop]);
    assert!(serde_yaml::from_str::<Vec<Operation>>("[truncate]").is_err());
}
