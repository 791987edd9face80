use lightdash_core::hotkey::{parse_accelerator, Key, Modifier};

#[test]
fn parses_and_canonicalizes_accelerators() {
    let accel = parse_accelerator(" shift + ctrl + p ").unwrap();
    assert_eq!(accel.name(), "Ctrl+Shift+P");
    assert_eq!(accel.modifiers(), &[Modifier::Ctrl, Modifier::Shift]);
    assert_eq!(accel.key(), Key::Char('P'));
}

#[test]
fn modifier_spellings_normalize() {
    assert_eq!(
        parse_accelerator("control+space").unwrap().name(),
        "Ctrl+Space"
    );
    assert_eq!(parse_accelerator("primary+k").unwrap().name(), "Ctrl+K");
    assert_eq!(parse_accelerator("win+F2").unwrap().name(), "Super+F2");
    assert_eq!(parse_accelerator("meta+0").unwrap().name(), "Super+0");
}

#[test]
fn duplicate_modifiers_collapse() {
    let accel = parse_accelerator("ctrl+control+space").unwrap();
    assert_eq!(accel.name(), "Ctrl+Space");
}

#[test]
fn rejects_accelerators_without_a_modifier() {
    assert!(parse_accelerator("space").is_err());
    assert!(parse_accelerator("").is_err());
    assert!(parse_accelerator("+").is_err());
}

#[test]
fn rejects_unknown_modifiers_and_keys() {
    assert!(parse_accelerator("hyper+space").is_err());
    assert!(parse_accelerator("ctrl+escape").is_err());
    assert!(parse_accelerator("ctrl+F25").is_err());
    assert!(parse_accelerator("ctrl+!").is_err());
}

#[test]
fn function_keys_cover_the_supported_range() {
    assert_eq!(parse_accelerator("alt+f1").unwrap().key(), Key::Function(1));
    assert_eq!(
        parse_accelerator("alt+F24").unwrap().key(),
        Key::Function(24)
    );
}

#[test]
fn display_label_matches_the_canonical_name() {
    let accel = parse_accelerator("ctrl+space").unwrap();
    assert_eq!(accel.display_label(), "Ctrl+Space");
}
