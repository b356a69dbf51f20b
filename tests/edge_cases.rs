use prpolicy::parse::{parse, ParseErrorKind};
use prpolicy::rules::{BranchRule, ConfigError, DefaultRule, UserConfig};
use prpolicy::{Attribute, ConditionSet, Facts, Value};

#[test]
fn empty_and_blank_expressions() {
    assert_eq!(parse("").unwrap_err().kind(), &ParseErrorKind::Empty);
    assert_eq!(parse("   ").unwrap_err().kind(), &ParseErrorKind::Empty);
}

#[test]
fn surrounding_whitespace_is_ignored() {
    assert_eq!(parse("  base=main  ").unwrap(), parse("base=main").unwrap());
}

#[test]
fn unknown_attribute_span() {
    let err = parse("-reviewer=bob").unwrap_err();
    assert!(matches!(
        err.kind(),
        ParseErrorKind::UnknownAttribute { name } if name == "reviewer"
    ));
    assert_eq!(err.span(), 1..9);
}

#[test]
fn missing_operator_and_value() {
    assert!(matches!(
        parse("label").unwrap_err().kind(),
        ParseErrorKind::ExpectedOperator { .. }
    ));
    assert!(matches!(
        parse("label=").unwrap_err().kind(),
        ParseErrorKind::ExpectedValue { .. }
    ));
    assert!(matches!(
        parse("number>").unwrap_err().kind(),
        ParseErrorKind::ExpectedValue { .. }
    ));
}

#[test]
fn malformed_literals() {
    let err = parse("number=4x").unwrap_err();
    assert_eq!(err.kind(), &ParseErrorKind::InvalidInteger);
    assert_eq!(err.span(), 7..9);
    assert_eq!(
        parse("number=4 x").unwrap_err().kind(),
        &ParseErrorKind::TrailingInput
    );
    assert_eq!(
        parse("number=x").unwrap_err().kind(),
        &ParseErrorKind::InvalidInteger
    );
    assert_eq!(
        parse("number=99999999999999999999").unwrap_err().kind(),
        &ParseErrorKind::InvalidInteger
    );
    assert_eq!(
        parse("current-time>9").unwrap_err().kind(),
        &ParseErrorKind::MalformedTime
    );
    assert_eq!(
        parse(r#"title="never closed"#).unwrap_err().kind(),
        &ParseErrorKind::UnterminatedQuote
    );
}

#[test]
fn operator_family_mismatch() {
    for expr in ["label>3", "author<=bob", "current-time=10:00", "number~=4", "draft=true"] {
        assert!(
            matches!(
                parse(expr).unwrap_err().kind(),
                ParseErrorKind::IncompatibleOperator { .. }
            ),
            "{expr}"
        );
    }
}

#[test]
fn quantifier_and_prefix_restrictions() {
    assert!(matches!(
        parse("#merged").unwrap_err().kind(),
        ParseErrorKind::QuantifierNotAllowed { .. }
    ));
    assert!(matches!(
        parse("-current-time>=10:00").unwrap_err().kind(),
        ParseErrorKind::PrefixNotAllowed { .. }
    ));
    assert!(matches!(
        parse("#files~=a").unwrap_err().kind(),
        ParseErrorKind::IncompatibleOperator { .. }
    ));
}

#[test]
fn midnight_and_last_minute() {
    assert!(parse("current-time>=00:00").is_ok());
    assert!(parse("current-time<=23:59").is_ok());
    assert!(parse("current-time>=9:05").is_ok());
}

#[test]
fn not_equal_on_empty_list_holds() {
    let set = ConditionSet::parse(["label!=wip", "-label=wip", "#label=0"]).unwrap();
    assert!(set.evaluate(&Facts::new()));
}

#[test]
fn equal_on_empty_list_fails() {
    let set = ConditionSet::parse(["label=wip"]).unwrap();
    assert!(!set.evaluate(&Facts::new()));
}

#[test]
fn quoted_text_with_escapes_and_spaces() {
    let cond = parse(r#"title="  padded \"quote\"  ""#).unwrap();
    assert_eq!(cond.value(), &Value::from(r#"  padded "quote"  "#));
    assert_eq!(parse(&cond.to_string()).unwrap(), cond);
}

#[test]
fn control_characters_in_quoted_text_survive_display() {
    let cond = parse("label=\" \r\"").unwrap();
    assert_eq!(cond.value(), &Value::from(" \r"));
    let rendered = cond.to_string();
    assert_eq!(rendered, r#"label=" \r""#);
    assert_eq!(parse(&rendered).unwrap(), cond);
}

#[test]
fn team_without_members_is_literal() {
    let set = ConditionSet::parse(["author=@org/ghosts"]).unwrap();
    let facts = Facts::new().set(Attribute::Author, ["@org/ghosts"]);
    assert!(set.evaluate(&facts));
}

#[test]
fn empty_config_document_needs_rules() {
    assert!(UserConfig::from_yaml("").is_err());
    let err = UserConfig::from_yaml("{}").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn empty_branches_mapping() {
    let config = UserConfig::from_yaml("rules:\n  branches: {}\n").unwrap();
    assert_eq!(config.branch_patterns().count(), 0);
    let rule = config
        .rule_for_branch(&DefaultRule::builtin(), "anything")
        .unwrap();
    assert!(matches!(rule, BranchRule::Protected(_)));
}

#[test]
fn empty_branch_override_is_not_no_policy() {
    let config = UserConfig::from_yaml("rules:\n  branches:\n    main: {}\n").unwrap();
    let rule = config
        .rule_for_branch(&DefaultRule::builtin(), "main")
        .unwrap();
    assert_eq!(
        rule.rule().unwrap(),
        UserConfig::default()
            .rule_for_branch(&DefaultRule::builtin(), "main")
            .unwrap()
            .rule()
            .unwrap()
    );
}

#[test]
fn non_string_branch_key_rejected() {
    let err = UserConfig::from_yaml("rules:\n  branches:\n    42: null\n").unwrap_err();
    let ConfigError::Invalid(err) = err else {
        panic!("expected validation failure");
    };
    assert_eq!(err.issues()[0].path().to_string(), "rules.branches.42");
}
