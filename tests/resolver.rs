use rox::expr::Expr;
use rox::parser::parse;
use rox::resolver::{resolve, Locals};
use rox::scanner::scan;
use rox::stmt::Stmt;

fn resolve_source(source: &str) -> (Vec<Stmt>, Result<Locals, Vec<String>>) {
    let tokens = scan(source).expect("source should scan");
    let statements = parse(&tokens).expect("source should parse");
    let result = resolve(&statements)
        .map_err(|errors| errors.iter().map(ToString::to_string).collect());

    (statements, result)
}

fn resolve_errors(source: &str) -> Vec<String> {
    resolve_source(source)
        .1
        .expect_err("source should fail to resolve")
}

#[test]
fn globals_are_left_unresolved() {
    let (_, locals) = resolve_source("var a = 1; print a;");

    assert!(locals.expect("valid program").is_empty());
}

#[test]
fn locals_record_scope_distance() {
    let (statements, locals) = resolve_source("{ var a = 1; { print a; } }");
    let locals = locals.expect("valid program");

    let Stmt::Block(outer) = &statements[0] else {
        panic!("expected block");
    };
    let Stmt::Block(inner) = &outer[1] else {
        panic!("expected inner block");
    };
    let Stmt::Print(Expr::Variable { id, .. }) = &inner[0] else {
        panic!("expected print of a variable");
    };

    assert_eq!(locals.get(id), Some(&1));
}

#[test]
fn reading_own_initializer_is_rejected_at_top_level_and_in_blocks() {
    assert_eq!(
        resolve_errors("var a = a;"),
        vec!["[line 1] Error at 'a': Can't read local variable in its own initializer."]
    );
    assert_eq!(
        resolve_errors("{ var b = b + 1; }"),
        vec!["[line 1] Error at 'b': Can't read local variable in its own initializer."]
    );
}

#[test]
fn shadowing_an_outer_variable_in_its_initializer_is_still_rejected() {
    let errors = resolve_errors("var a = 1; { var a = a; }");

    assert_eq!(errors.len(), 1);
}

#[test]
fn duplicate_local_is_rejected_but_global_redefinition_is_allowed() {
    assert_eq!(
        resolve_errors("func f() { var x = 1; var x = 2; }"),
        vec!["[line 1] Error at 'x': Already a variable with this name in this scope."]
    );

    assert!(resolve_source("var x = 1; var x = 2;").1.is_ok());
}

#[test]
fn structural_errors_are_all_collected() {
    let errors = resolve_errors(
        "return 1;\n\
         print this;\n\
         print super.x;\n\
         class A { m() { return super.m(); } }\n\
         class B { init() { return 1; } }\n\
         class C < C {}",
    );

    assert_eq!(
        errors,
        vec![
            "[line 1] Error at 'return': Can't return from top-level code.",
            "[line 2] Error at 'this': Can't use 'this' outside of a class.",
            "[line 3] Error at 'super': Can't use 'super' outside of a class.",
            "[line 4] Error at 'super': Can't use 'super' in a class with no superclass.",
            "[line 5] Error at 'return': Can't return a value from an initializer.",
            "[line 6] Error at 'C': A class can't inherit from itself.",
        ]
    );
}

#[test]
fn bare_return_in_initializer_is_allowed() {
    assert!(resolve_source("class A { init() { return; } }").1.is_ok());
}

#[test]
fn this_and_super_resolve_through_class_scopes() {
    let (statements, locals) =
        resolve_source("class A { m() {} } class B < A { m() { print this; return super.m; } }");
    let locals = locals.expect("valid program");

    let Stmt::Class { methods, .. } = &statements[1] else {
        panic!("expected class B");
    };
    let body = &methods[0].body;

    let Stmt::Print(Expr::This { id: this_id, .. }) = &body[0] else {
        panic!("expected print this");
    };
    let Stmt::Return {
        value: Some(Expr::Super { id: super_id, .. }),
        ..
    } = &body[1]
    else {
        panic!("expected return of super.m");
    };

    // method body → `this` scope → `super` scope
    assert_eq!(locals.get(this_id), Some(&1));
    assert_eq!(locals.get(super_id), Some(&2));
}
