use greyscript_lang::compiler::{
    ast::{ExprKind, StmtKind},
    error::ParseError,
    parser::parse,
};

const INPUT: &str = r#"
Shape = {"name": "shape", "sides": 0}
Shape.describe = function(prefix="a")
    return prefix + " " + self.name
end function
// a comment
total = 0
for i in range(1, 10)
    if i % 3 == 0 then continue
    if i > 7 then
        break
    else if i == 5 then
        total -= 1
    else
        total += i
    end if
end for
while total > 0 and not done
    total = total - 4
end while
items = [1, -2, @Shape.describe, new Shape][1:]
print items[0], total
"#;

#[test]
fn test_parse_is_deterministic() {
    let (first, errors) = parse(INPUT);
    assert!(errors.is_empty(), "{errors:?}");
    let (second, _) = parse(INPUT);
    assert_eq!(first, second);
}

#[test]
fn test_display_reparses() {
    let (chunk, errors) = parse(INPUT);
    assert!(errors.is_empty(), "{errors:?}");
    let printed = chunk.to_string();
    let (reparsed, errors) = parse(&printed);
    assert!(errors.is_empty(), "{printed}\n{errors:?}");
    assert_eq!(reparsed.to_string(), printed);
}

#[test]
fn test_statement_kinds() {
    let (chunk, _) = parse(INPUT);
    let kinds: Vec<&str> = chunk
        .body
        .body
        .iter()
        .map(|stmt| match stmt.kind {
            StmtKind::Assign { .. } => "assign",
            StmtKind::Comment(_) => "comment",
            StmtKind::For { .. } => "for",
            StmtKind::While { .. } => "while",
            StmtKind::Expr(_) => "expr",
            _ => "other",
        })
        .collect();
    assert_eq!(
        kinds,
        vec![
            "assign", "assign", "comment", "assign", "for", "while", "assign", "expr"
        ]
    );
    // the comment keeps its line
    assert_eq!(chunk.body.body[2].line, 6);
}

#[test]
fn test_shortcut_if() {
    let (chunk, errors) = parse("if x then y = 1 else y = 2");
    assert!(errors.is_empty(), "{errors:?}");
    let StmtKind::If {
        clauses,
        alternate,
        shortcut,
    } = &chunk.body.body[0].kind
    else {
        panic!("expected an if statement");
    };
    assert!(shortcut);
    assert_eq!(clauses.len(), 1);
    assert_eq!(alternate.as_ref().map(|block| block.body.len()), Some(1));
    assert_eq!(chunk.to_string().trim(), "if x then y = 1 else y = 2");
}

#[test]
fn test_parenless_call_statement() {
    let (chunk, errors) = parse("print \"a\", 1\nprint(2)\nprint [3]");
    assert!(errors.is_empty(), "{errors:?}");
    let arities: Vec<usize> = chunk
        .body
        .body
        .iter()
        .map(|stmt| match &stmt.kind {
            StmtKind::Expr(expr) => match &expr.kind {
                ExprKind::Call { arguments, .. } => arguments.len(),
                _ => panic!("expected a call, found {expr}"),
            },
            _ => panic!("expected an expression statement"),
        })
        .collect();
    assert_eq!(arities, vec![2, 1, 1]);
}

#[test]
fn test_condition_operands() {
    let (chunk, _) = parse("if a.b == 1 and c then x = 1");
    let StmtKind::If { clauses, .. } = &chunk.body.body[0].kind else {
        panic!("expected an if statement");
    };
    let ExprKind::Logical { left, operands, .. } = &clauses[0].test.kind else {
        panic!("expected a logical test");
    };
    assert_eq!(operands.as_slice(), ["c"]);
    let ExprKind::Binary { operands, .. } = &left.kind else {
        panic!("expected a comparison");
    };
    assert_eq!(operands.as_slice(), ["a.b"]);
}

#[test]
fn test_debugger_statement() {
    let (chunk, _) = parse("x = 1\n// debugger\n");
    assert!(matches!(chunk.body.body[1].kind, StmtKind::Debugger));
    assert_eq!(chunk.body.body[1].line, 2);
}

#[test]
fn test_loop_control_outside_loop() {
    let (_, errors) = parse("break");
    assert!(matches!(
        errors.as_slice(),
        [ParseError::BreakOutsideLoop { location }] if location.lineno == 1
    ));

    // function bodies do not inherit the enclosing loop
    let (_, errors) = parse("while true\nf = function\ncontinue\nend function\nend while");
    assert!(matches!(
        errors.as_slice(),
        [ParseError::ContinueOutsideLoop { location }] if location.lineno == 3
    ));
}

#[test]
fn test_invalid_assign_target() {
    for input in ["1 = 2", "f(x) = 2", "a + b += 1"] {
        let (_, errors) = parse(input);
        assert!(
            matches!(errors.as_slice(), [ParseError::InvalidAssignTarget { .. }]),
            "{input}: {errors:?}"
        );
    }
}

#[test]
fn test_recovers_after_errors() {
    let (chunk, errors) = parse("x = )\ny = 1\nz = (");
    assert_eq!(errors.len(), 2, "{errors:?}");
    assert_eq!(errors[0].location().lineno, 1);
    assert!(chunk.body.body.iter().any(|stmt| stmt.to_string() == "y = 1"));
}

#[test]
fn test_unterminated_string() {
    let (_, errors) = parse("x = \"abc");
    assert!(matches!(errors.first(), Some(ParseError::Lex(_))));
}
