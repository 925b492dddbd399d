use robo_trail_system_classifier::{classify, classify_source, Rule, Verdict};

#[test]
fn simple_commands_are_valid() {
    for line in ["move(2)", "turn_left()", "turn_right()", "x = 5", "    move(steps)"] {
        assert_eq!(classify(line), Verdict::Valid, "line {line:?}");
    }
}

#[test]
fn arithmetic_assignment_is_invalid() {
    assert_eq!(classify("x = 5 + 1"), Verdict::Invalid);
    assert_eq!(classify("while True:"), Verdict::Invalid);
    assert_eq!(classify("for i in range(n):"), Verdict::Invalid);
}

#[test]
fn negative_move_passes_the_static_check() {
    assert_eq!(classify("move(-2)"), Verdict::Valid);
}

#[test]
fn source_reports_follow_line_numbers() {
    let reports = classify_source("steps = 2\r\nfor i in range(3):\r\n    move(steps)\r\nfly()\r\n");
    let rules: Vec<Option<Rule>> = reports.iter().map(|report| report.rule).collect();
    assert_eq!(
        rules,
        vec![
            Some(Rule::IntAssignment),
            Some(Rule::CountedLoop),
            Some(Rule::MoveCall),
            None,
            Some(Rule::Blank),
        ]
    );
    assert_eq!(reports[3].number, 4);
    assert_eq!(reports[3].text, "fly()");
    assert_eq!(reports[3].verdict, Verdict::Invalid);
}

#[test]
fn reports_serialize_with_snake_case_names() {
    let reports = classify_source("turn_left()\nfly()");
    let json = serde_json::to_value(&reports).expect("reports serialize");
    assert_eq!(
        json,
        serde_json::json!([
            {"number": 1, "text": "turn_left()", "verdict": "valid", "rule": "turn_call"},
            {"number": 2, "text": "fly()", "verdict": "invalid", "rule": null},
        ])
    );
}
