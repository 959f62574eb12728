use rox::expr::{Expr, LiteralValue};
use rox::parser::parse;
use rox::scanner::scan;
use rox::stmt::Stmt;

fn parse_ok(source: &str) -> Vec<Stmt> {
    let tokens = scan(source).expect("source should scan");
    parse(&tokens).expect("source should parse")
}

fn parse_errors(source: &str) -> Vec<String> {
    let tokens = scan(source).expect("source should scan");
    parse(&tokens)
        .expect_err("source should not parse")
        .iter()
        .map(ToString::to_string)
        .collect()
}

#[test]
fn parses_declarations_in_order() {
    let statements = parse_ok("var a = 1; func f(x, y) { return x; } class C {} print a;");

    assert_eq!(statements.len(), 4);
    assert!(matches!(&statements[0], Stmt::Var { name, initializer: Some(_) } if name.lexeme == "a"));
    assert!(matches!(&statements[1], Stmt::Function(decl) if decl.params.len() == 2));
    assert!(matches!(&statements[2], Stmt::Class { superclass: None, .. }));
    assert!(matches!(&statements[3], Stmt::Print(Expr::Variable { .. })));
}

#[test]
fn for_loop_desugars_to_block_and_while() {
    let statements = parse_ok("for (var i = 0; i < 3; i = i + 1) print i;");

    let [Stmt::Block(inner)] = statements.as_slice() else {
        panic!("expected a single block, got {:?}", statements);
    };

    assert!(matches!(&inner[0], Stmt::Var { .. }));
    assert!(matches!(
        &inner[1],
        Stmt::While {
            increment: Some(Expr::Assign { .. }),
            ..
        }
    ));
}

#[test]
fn for_loop_without_clauses_loops_on_true() {
    let statements = parse_ok("for (;;) print 1;");

    assert!(matches!(
        statements.as_slice(),
        [Stmt::While {
            condition: Expr::Literal(LiteralValue::Bool(true)),
            increment: None,
            ..
        }]
    ));
}

#[test]
fn class_with_superclass_and_methods() {
    let statements = parse_ok("class B < A { init(n) { this.n = n; } get() { return super.get(); } }");

    let Stmt::Class {
        name,
        superclass,
        methods,
    } = &statements[0]
    else {
        panic!("expected a class");
    };

    assert_eq!(name.lexeme, "B");
    assert!(matches!(superclass, Some(Expr::Variable { name, .. }) if name.lexeme == "A"));
    let names: Vec<&str> = methods.iter().map(|m| m.name.lexeme.as_str()).collect();
    assert_eq!(names, vec!["init", "get"]);
}

#[test]
fn assignment_is_right_associative() {
    let statements = parse_ok("a = b = 1;");

    let Stmt::Expression(Expr::Assign { name, value, .. }) = &statements[0] else {
        panic!("expected assignment");
    };

    assert_eq!(name.lexeme, "a");
    assert!(matches!(value.as_ref(), Expr::Assign { name, .. } if name.lexeme == "b"));
}

#[test]
fn each_variable_node_gets_its_own_id() {
    let statements = parse_ok("a; a;");

    let ids: Vec<_> = statements
        .iter()
        .map(|s| match s {
            Stmt::Expression(Expr::Variable { id, .. }) => *id,
            other => panic!("unexpected {:?}", other),
        })
        .collect();

    assert_ne!(ids[0], ids[1]);
}

#[test]
fn invalid_assignment_target_is_reported() {
    assert_eq!(
        parse_errors("1 + 2 = 3;"),
        vec!["[line 1] Error at '=': Invalid assignment target."]
    );
}

#[test]
fn recovers_and_reports_every_independent_error() {
    let errors = parse_errors("var = 1;\nprint 2;\nvar x = ;\nprint (3;");

    assert_eq!(
        errors,
        vec![
            "[line 1] Error at '=': Expect variable name.",
            "[line 3] Error at ';': Expect expression.",
            "[line 4] Error at ';': Expect ')' after expression.",
        ]
    );
}

#[test]
fn missing_semicolon_at_end_reports_at_end() {
    assert_eq!(
        parse_errors("print 1"),
        vec!["[line 1] Error at end: Expect ';' after value."]
    );
}

#[test]
fn too_many_arguments_is_reported_without_aborting() {
    let args: Vec<String> = (0..256).map(|i| i.to_string()).collect();
    let source = format!("f({});", args.join(", "));

    let errors = parse_errors(&source);

    assert_eq!(errors.len(), 1);
    assert!(errors[0].ends_with("Can't have more than 255 arguments."));
}

#[test]
fn super_requires_a_method_name() {
    assert_eq!(
        parse_errors("super;"),
        vec!["[line 1] Error at ';': Expect '.' after 'super'."]
    );
}

#[test]
fn empty_token_sequence_is_an_empty_program() {
    assert!(parse(&[]).expect("empty input").is_empty());
}

#[test]
fn sequence_without_eof_is_terminated() {
    let mut tokens = scan("print 1;\nprint 2").expect("source should scan");
    tokens.pop();

    let errors: Vec<String> = parse(&tokens)
        .expect_err("missing semicolon")
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(errors, vec!["[line 2] Error at end: Expect ';' after value."]);

    let mut tokens = scan("print 1;").expect("source should scan");
    tokens.pop();
    assert_eq!(parse(&tokens).expect("complete statement").len(), 1);
}
