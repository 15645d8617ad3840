use stratum::schema::{EntityNameUse, UseKind};

const ALL: [EntityNameUse; 5] = [
    EntityNameUse::PROJECTION,
    EntityNameUse::EXPRESSION,
    EntityNameUse::TREAT,
    EntityNameUse::TREAT_UNRESTRICTED,
    EntityNameUse::FILTER,
];

#[test]
fn strength_ordering() {
    assert!(UseKind::Filter > UseKind::Treat);
    assert!(UseKind::Treat > UseKind::Expression);
    assert!(UseKind::Expression > UseKind::Projection);
}

#[test]
fn combining_keeps_the_stronger_kind() {
    let combined = EntityNameUse::PROJECTION.stronger(EntityNameUse::FILTER);
    assert_eq!(combined.kind(), UseKind::Filter);

    let combined = EntityNameUse::TREAT.stronger(EntityNameUse::EXPRESSION);
    assert_eq!(combined.kind(), UseKind::Treat);
    assert!(combined.requires_restriction());
}

#[test]
fn equal_kinds_keep_the_restriction_requirement() {
    // A restricted and an unrestricted TREAT of the same name: the combined
    // use must still restrict.
    let combined = EntityNameUse::TREAT_UNRESTRICTED.stronger(EntityNameUse::TREAT);
    assert_eq!(combined.kind(), UseKind::Treat);
    assert!(combined.requires_restriction());

    // The weaker combination drops it only when both sides agree.
    let combined = EntityNameUse::TREAT_UNRESTRICTED.weaker(EntityNameUse::TREAT);
    assert!(!combined.requires_restriction());

    let combined = EntityNameUse::TREAT.weaker(EntityNameUse::TREAT);
    assert!(combined.requires_restriction());
}

#[test]
fn stronger_and_weaker_are_symmetric() {
    for a in ALL {
        for b in ALL {
            assert_eq!(a.stronger(b), b.stronger(a), "{a:?} vs {b:?}");
            assert_eq!(a.weaker(b), b.weaker(a), "{a:?} vs {b:?}");
        }
    }
}

#[test]
fn only_restricting_uses_prune() {
    assert!(!EntityNameUse::PROJECTION.restricts());
    assert!(!EntityNameUse::EXPRESSION.restricts());
    assert!(!EntityNameUse::TREAT_UNRESTRICTED.restricts());
    assert!(EntityNameUse::TREAT.restricts());
    assert!(EntityNameUse::FILTER.restricts());
}
