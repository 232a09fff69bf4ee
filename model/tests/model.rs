use std::collections::HashSet;

use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;

use synth_model::traverse::reset_indents;
use synth_model::{
    expression_usefulness, merge_compatible, statement_usefulness, Catalog, Condition, Emit, Encode, EncodingTable,
    Expression, Fragment, FragmentCorpus, Kind, Literal, NameStyle, Operator, Program, Renames, Statement,
    StatementKind, StructuralSize, Substitute, Type, Var,
};

const CATALOG: &str = r#"
arrays = ["int"]

[[component]]
kind = "method"
declaring = "java.lang.Math"
name = "abs"
returns = "int"
args = ["int"]
static = true

[[component]]
kind = "method"
declaring = "java.lang.StrictMath"
name = "abs"
returns = "int"
args = ["int"]
static = true

[[component]]
kind = "method"
declaring = "java.util.List"
name = "add"
returns = "boolean"
args = [{ param = "E" }]
instantiate = ["java.lang.Integer"]
"#;

fn int_var(name: &str) -> Expression {
    Expression::var(name, Type::int())
}

fn r_plus_i() -> Statement {
    Statement::assign(
        Var::new("r", Type::int()),
        Expression::binary(Operator::Add, int_var("r"), int_var("i")),
    )
}

fn sum_loop() -> Statement {
    Statement::for_each(
        "i",
        Type::int(),
        Expression::var("arr", Type::array_of(Type::int())),
        vec![r_plus_i()],
    )
}

fn program_with(statements: Vec<Statement>) -> Program {
    let mut p = Program::new("sum", Type::int(), vec![("arr".to_string(), Type::array_of(Type::int()))]);
    p.add_local_var("r", Type::int()).unwrap();
    for s in statements {
        p.push_statement(s);
    }
    p.set_return(Some(int_var("r")));
    reset_indents(&mut p);
    p
}

#[test]
fn clones_encode_identically_and_distinct_trees_do_not() {
    let catalog = Catalog::from_toml_str(CATALOG).unwrap();
    let abs = catalog.lookup("java.lang.Math", "abs").next().unwrap().clone();
    let call = Expression::func(abs, None, vec![Expression::binary(Operator::Sub, int_var("a"), int_var("b"))]);
    let stmt = Statement::if_then(Condition::Concrete(int_var("flag")), vec![Statement::call(call.clone())]);

    let mut table = EncodingTable::new();
    assert_eq!(call.encoded(&mut table), call.clone().encoded(&mut table));
    assert_eq!(stmt.encoded(&mut table), stmt.clone().encoded(&mut table));
    assert_eq!(stmt.clone().size(), stmt.size());

    let other = Statement::if_then(Condition::Angelic(None), vec![Statement::call(call)]);
    assert_ne!(stmt.encoded(&mut table), other.encoded(&mut table));
    assert_ne!(stmt, other);
}

#[test]
fn same_method_name_on_different_classes_is_distinct() {
    let catalog = Catalog::from_toml_str(CATALOG).unwrap();
    let math = catalog.lookup("java.lang.Math", "abs").next().unwrap();
    let strict = catalog.lookup("java.lang.StrictMath", "abs").next().unwrap();
    let mut table = EncodingTable::new();
    let a = Expression::func(math.clone(), None, vec![int_var("x")]);
    let b = Expression::func(strict.clone(), None, vec![int_var("x")]);
    assert_ne!(a.encoded(&mut table), b.encoded(&mut table));
    assert_ne!(**math, **strict);
    assert_eq!(table.len(), 2);

    table.reset();
    assert!(table.is_empty());
}

#[test]
fn verbatim_fragment_is_fully_useful_and_missing_root_is_not() {
    let target = program_with(vec![sum_loop()]);
    assert_eq!(statement_usefulness(&sum_loop(), &target), 1.0);

    let bare = program_with(vec![r_plus_i()]);
    assert_eq!(statement_usefulness(&sum_loop(), &bare), 0.0);
    assert_eq!(statement_usefulness(&r_plus_i(), &bare), 1.0);

    let absent = Expression::literal(Literal::string("unused"));
    assert_eq!(expression_usefulness(&absent, &target), 0.0);
}

#[test]
fn mined_corpus_partially_matches_bare_statement() {
    let mut table = EncodingTable::new();
    let mut corpus = FragmentCorpus::new();
    corpus.remember(&program_with(vec![sum_loop()]), &mut table);
    let bare = program_with(vec![r_plus_i()]);
    let scores: Vec<f64> = corpus.fragments().iter().map(|f| f.usefulness(&bare)).collect();
    // only the enclosing loop is missing
    assert_eq!(scores.iter().filter(|&&u| u == 0.0).count(), 1);
    let mean = synth_model::mean_usefulness(corpus.fragments(), &bare, 0);
    assert!(mean > 0.0 && mean < 1.0);
    assert!(matches!(
        corpus.fragments().iter().find(|f| f.usefulness(&bare) == 0.0),
        Some(Fragment::Stmt(s)) if matches!(s.kind, StatementKind::ForEach { .. })
    ));
}

#[test]
fn merge_maps_every_occurrence_to_one_name() {
    for seed in 0..16 {
        let mut target = Program::new("f", Type::int(), vec![("y".to_string(), Type::int())]);
        target.add_local_var("z", Type::int()).unwrap();
        let mut fragment = Statement::assign(
            Var::new("x", Type::int()),
            Expression::binary(Operator::Mul, int_var("x"), int_var("x")),
        );
        let original = fragment.clone();
        let mut renames = Renames::new();
        let mut rng = StdRng::seed_from_u64(seed);
        merge_compatible(&mut fragment, &mut renames, &mut target, &mut rng).unwrap();

        let chosen = renames.get("x").cloned().unwrap();
        assert!(chosen == "y" || chosen == "z", "{chosen}");
        let mut expected = original.clone();
        expected.substitute(&renames);
        assert_eq!(fragment, expected);
        // nothing new had to be declared
        assert_eq!(target.local_vars().len(), 1);
    }
}

#[test]
fn merge_picks_each_candidate_eventually() {
    let mut seen = HashSet::new();
    for seed in 0..64 {
        let mut target = Program::new("f", Type::int(), vec![("y".to_string(), Type::int())]);
        target.add_local_var("z", Type::int()).unwrap();
        let mut fragment = int_var("x");
        let mut renames = Renames::new();
        merge_compatible(&mut fragment, &mut renames, &mut target, &mut StdRng::seed_from_u64(seed)).unwrap();
        seen.insert(renames["x"].clone());
    }
    assert_eq!(seen.len(), 2);
}

#[test]
fn merged_loop_renders_without_shadowing() {
    let mut target = program_with(vec![]);
    target.add_loop_var("i").unwrap();
    let mut fragment = Statement::for_loop(
        "i",
        Condition::Concrete(Expression::binary(
            Operator::Lt,
            int_var("i"),
            Expression::func(
                std::rc::Rc::new(synth_model::FunctionData::array_op(Kind::ArrayLength, Type::int())),
                None,
                vec![Expression::var("arr", Type::array_of(Type::int()))],
            ),
        )),
        vec![Statement::assign(
            Var::new("r", Type::int()),
            Expression::binary(Operator::Add, int_var("r"), int_var("i")),
        )],
    );
    let mut renames = Renames::new();
    merge_compatible(&mut fragment, &mut renames, &mut target, &mut StdRng::seed_from_u64(0)).unwrap();
    assert_eq!(renames.get("i").map(String::as_str), Some("j"));
    assert!(!renames.contains_key("r"));
    target.push_statement(fragment);
    reset_indents(&mut target);
    let expected = "\
public static int sum(int[] arr) {
    int r = 0;
    int i = 0;
    int j = 0;
    for (j = 0; j < arr.length; j++) {
        r = r + j;
    }
    return r;
}";
    assert_eq!(target.render(NameStyle::Simple), expected);
}

#[test]
fn reset_indents_handles_deep_nesting() {
    let mut s = r_plus_i();
    for depth in 0..6 {
        s = if depth % 2 == 0 {
            Statement::if_then(Condition::Angelic(None), vec![s])
        } else {
            Statement::while_loop(Condition::Concrete(int_var("b")), vec![s])
        };
    }
    let mut p = program_with(vec![s]);
    reset_indents(&mut p);
    let mut depth = 1;
    let mut node = &p.statements()[0];
    loop {
        assert_eq!(node.indent, depth);
        match node.body().first() {
            Some(inner) => {
                node = inner;
                depth += 1;
            }
            None => break,
        }
    }
    assert_eq!(depth, 7);
}
