use super::palette::{Palette, Role};

#[test]
fn plain_is_passthrough() {
    let p = Palette::PLAIN;
    assert_eq!(p.paint(Role::Kind, "Add").to_string(), "Add");
    assert_eq!(p.paint(Role::Position, 3).to_string(), "3");
    assert!(!p.is_ansi());
    assert_eq!(Palette::default(), Palette::PLAIN);
}

#[test]
fn ansi_wraps_each_role() {
    let p = Palette::new(true);
    assert!(p.is_ansi());
    assert_eq!(p.paint(Role::Kind, "Add").to_string(), "\x1b[34mAdd\x1b[0m");
    assert_eq!(p.paint(Role::Matched, "x").to_string(), "\x1b[32mx\x1b[0m");
    assert_eq!(
        p.paint(Role::Recovery, "<Error>").to_string(),
        "\x1b[31m<Error>\x1b[0m"
    );
    assert_eq!(p.paint(Role::Position, "0..1").to_string(), "\x1b[2m0..1\x1b[0m");
}
