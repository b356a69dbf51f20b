use chrono::{NaiveTime, TimeZone, Utc};
use prpolicy::parse::{parse, ParseErrorKind};
use prpolicy::{attr, count, flag, Attribute, ConditionSet, Facts, Operator, Value};

#[test]
fn parse_is_deterministic() {
    for expr in ["-label=needs-review", "#files>3", "status-success~=ci/.*", "merged"] {
        assert_eq!(parse(expr).unwrap(), parse(expr).unwrap());
    }
}

#[test]
fn negation_round_trip() {
    let dash = parse("-label=foo").unwrap();
    let not = parse("¬label=foo").unwrap();
    let plain = parse("label=foo").unwrap();
    let plus = parse("+label=foo").unwrap();

    assert!(dash.negated());
    assert_eq!(dash, not);
    assert_eq!(dash, !plain.clone());
    assert!(!plain.negated());
    assert_eq!(plain, plus);
}

#[test]
fn operator_alias_normalization() {
    assert_eq!(parse("base:main").unwrap().operator(), Operator::Eq);
    assert_eq!(parse("base==main").unwrap().operator(), Operator::Eq);
    assert_eq!(parse("base≠main").unwrap().operator(), Operator::Ne);
    assert_eq!(parse("number≥5").unwrap().operator(), Operator::Ge);
    assert_eq!(parse("number≤5").unwrap().operator(), Operator::Le);
    assert_eq!(parse("base:main").unwrap(), parse("base=main").unwrap());
}

#[test]
fn count_quantifier() {
    let cond = parse("#files>3").unwrap();
    assert_eq!(cond.attribute(), Attribute::Files);
    assert!(cond.quantified());
    assert_eq!(cond.operator(), Operator::Gt);
    assert_eq!(cond.value(), &Value::Int(3));
    assert_eq!(cond, count(Attribute::Files).gt(3_i64).unwrap());
}

#[test]
fn boolean_attributes_take_no_operator() {
    let cond = parse("merged").unwrap();
    assert_eq!(cond.operator(), Operator::Eq);
    assert_eq!(cond.value(), &Value::Bool(true));
    assert_eq!(cond, flag(Attribute::Merged).unwrap());
}

#[test]
fn time_bounds() {
    assert_eq!(
        parse("current-time>=24:00").unwrap_err().kind(),
        &ParseErrorKind::HourOutOfRange { hour: 24 }
    );
    assert_eq!(
        parse("current-time>=12:60").unwrap_err().kind(),
        &ParseErrorKind::MinuteOutOfRange { minute: 60 }
    );
    let cond = parse("current-time>=09:30").unwrap();
    assert_eq!(
        cond.value(),
        &Value::Time(NaiveTime::from_hms_opt(9, 30, 0).unwrap())
    );
}

#[test]
fn canonical_tree() {
    let tree = serde_yaml::to_value(parse("-#files>3").unwrap()).unwrap();
    let expected: serde_yaml::Value = serde_yaml::from_str("{'-': {'>': ['#files', 3]}}").unwrap();
    assert_eq!(tree, expected);

    let tree = serde_yaml::to_value(parse("label=bug").unwrap()).unwrap();
    let expected: serde_yaml::Value = serde_yaml::from_str("{'=': [label, bug]}").unwrap();
    assert_eq!(tree, expected);
}

#[test]
fn conditions_from_yaml_rule() {
    #[derive(serde::Deserialize)]
    struct PullRequestRule {
        name: String,
        conditions: ConditionSet,
    }

    let rule: PullRequestRule = serde_yaml::from_str(
        r##"
name: automerge
conditions:
  - base=main
  - "#approved-reviews-by>=2"
  - -label~=^(wip|do-not-merge)$
  - status-success=ci/build
  - -draft
  - current-time>=09:00
  - current-time<17:30
"##,
    )
    .unwrap();
    assert_eq!(rule.name, "automerge");
    assert_eq!(rule.conditions.len(), 7);

    let facts = Facts::new()
        .set(Attribute::Base, ["main"])
        .set(Attribute::ApprovedReviewsBy, ["alice", "bob"])
        .set(Attribute::Label, ["ready"])
        .set(Attribute::StatusSuccess, ["ci/build", "ci/lint"])
        .flag(Attribute::Draft, false)
        .at(Utc.with_ymd_and_hms(2024, 3, 4, 11, 0, 0).unwrap());
    assert!(rule.conditions.evaluate(&facts));

    let blocked = facts.clone().set(Attribute::Label, ["wip"]);
    let report = rule.conditions.evaluate_detailed(&blocked);
    assert!(!report.passed());
    assert_eq!(report.unmatched(), &["-label~=^(wip|do-not-merge)$"]);

    let late = facts.at(Utc.with_ymd_and_hms(2024, 3, 4, 18, 0, 0).unwrap());
    assert!(!rule.conditions.evaluate(&late));
}

#[test]
fn builders_match_parsed() {
    assert_eq!(
        parse("author=@org/core").unwrap(),
        attr(Attribute::Author).eq("@org/core").unwrap()
    );
    assert_eq!(
        parse("status-success~=ci/.*").unwrap(),
        attr(Attribute::StatusSuccess).matches("ci/.*").unwrap()
    );
    assert_eq!(
        parse("¬#label>=2").unwrap(),
        !count(Attribute::Label).ge(2_i64).unwrap()
    );
}

#[test]
fn from_str_and_display() {
    let cond: prpolicy::Condition = "title = 'WIP: draft'".parse().unwrap();
    assert_eq!(cond.value(), &Value::from("WIP: draft"));
    let again: prpolicy::Condition = cond.to_string().parse().unwrap();
    assert_eq!(again, cond);
}
