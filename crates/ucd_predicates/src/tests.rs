use crate::code_unit::CodeUnit;
use crate::compile::{Case, CompileError, Compiler, Domain, Logic, Node, Predicate, Tail};
use crate::config::Config;
use crate::expr::Expr;
use crate::sparse_set::{Element, SetError, SparseSet};

fn set<E: Into<Element>>(elements: impl IntoIterator<Item = E>) -> SparseSet {
    let mut set = SparseSet::from_elements(elements).unwrap();
    set.finish().unwrap();
    set
}

fn compile(set: &SparseSet, domain: Domain, config: Config) -> Predicate {
    let predicate = Compiler::new(config).unwrap().compile(set, domain).unwrap();
    println!("{:#?}", predicate.root().logic());
    predicate
}

// Compare the predicate with the set for every input of the domain.
fn check_total(set: &SparseSet, predicate: &Predicate) {
    let domain = predicate.domain();
    for c in domain.first..=domain.limit {
        assert_eq!(
            predicate.evaluate(c),
            set.contains(c),
            "predicate disagrees with the set for {:#X}",
            c
        );
    }
    predicate.verify(set).unwrap();
}

fn root_expr(predicate: &Predicate) -> &Expr {
    match predicate.root().leaf() {
        Some(leaf) => &leaf.expr,
        None => panic!("root is not an expression: {:?}", predicate.root().logic()),
    }
}

fn evens_and_200() -> SparseSet {
    let mut elements: Vec<Element> = (0u32..=126).step_by(2).map(Element::from).collect();
    elements.push(Element::from(200));
    set(elements)
}

#[test]
fn contiguous_letters() {
    let letters = set([65u32, 66, 67]);
    let predicate = compile(&letters, Domain::new(0, 127), Config::default());
    assert_eq!(
        root_expr(&predicate),
        &Expr::And(vec![Expr::Ge(65), Expr::Le(67)])
    );
    check_total(&letters, &predicate);
}

#[test]
fn decimal_digits() {
    let digits = set([(0x30u32, 0x39u32)]);
    let predicate = compile(&digits, Domain::new(0, 127), Config::default());
    assert_eq!(
        root_expr(&predicate),
        &Expr::And(vec![Expr::Ge(0x30), Expr::Le(0x39)])
    );
    assert!(!predicate.evaluate(47));
    assert!(!predicate.evaluate(58));
    check_total(&digits, &predicate);
}

#[test]
fn even_numbers() {
    let evens = set((0u32..=62).step_by(2));
    let predicate = compile(&evens, Domain::new(0, 63), Config::default());
    assert_eq!(root_expr(&predicate), &Expr::Mod { add: 0, div: 2 });
    check_total(&evens, &predicate);
}

#[test]
fn subdivision() {
    let values = evens_and_200();
    let predicate = compile(&values, Domain::new(0, 300), Config::default());

    let dispatch = match predicate.root().logic() {
        Logic::Dispatch(dispatch) => dispatch,
        other => panic!("expected a dispatch, found {:?}", other),
    };
    assert_eq!(dispatch.children.len(), 4);
    assert_eq!(dispatch.child_size, 64);
    assert_eq!(dispatch.guard.above, Some(200));
    assert_eq!(dispatch.trues, Expr::Eq(200));
    assert_eq!(
        dispatch.tail,
        Tail::Switch {
            cases: vec![Case::Child(0), Case::Child(1)],
            default: Some(false),
        }
    );
    assert_eq!(predicate.root().node_count(), 5);

    check_total(&values, &predicate);
}

#[test]
fn subdivision_disabled_by_depth_limit() {
    let values = evens_and_200();
    let config = Config {
        depth_limit: 1,
        ..Default::default()
    };
    let predicate = compile(&values, Domain::new(0, 300), config);
    assert!(predicate.root().leaf().is_some());
    check_total(&values, &predicate);
}

#[test]
fn constant_children_are_hoisted() {
    let mut elements: Vec<Element> = vec![(0u32, 63u32).into(), (128u32, 191u32).into()];
    elements.extend([70u32, 72, 75, 80, 200, 210, 220, 230].map(Element::from));
    let values = set(elements);
    let config = Config {
        bitmask_tables: false,
        ..Default::default()
    };
    let predicate = compile(&values, Domain::new(0, 255), config);

    let dispatch = match predicate.root().logic() {
        Logic::Dispatch(dispatch) => dispatch,
        other => panic!("expected a dispatch, found {:?}", other),
    };
    assert_eq!(dispatch.trues, Expr::SelBit { mask: 0b101 });
    assert_eq!(
        dispatch.tail,
        Tail::Switch {
            cases: vec![Case::Child(1), Case::Child(3)],
            default: None,
        }
    );
    check_total(&values, &predicate);

    // Without hoisting the constant children get their own cases
    let predicate = compile(&values, Domain::new(0, 255), Config::naive());
    check_total(&values, &predicate);
}

#[test]
fn bitmask_table() {
    let values = set((0..512u32).filter(|c| c % 3 == 0 || c % 7 == 0));
    let predicate = compile(&values, Domain::new(0, 1023), Config::default());
    match predicate.root().logic() {
        Logic::Table(table) => {
            assert_eq!(table.offset, 0);
            assert_eq!(table.words.len(), 8);
            assert_eq!(table.guard.above, Some(511));
        }
        other => panic!("expected a table, found {:?}", other),
    }
    check_total(&values, &predicate);
}

#[test]
fn constants() {
    let empty = set(Vec::<u32>::new());
    let predicate = compile(&empty, Domain::new(0, 127), Config::default());
    assert_eq!(root_expr(&predicate), &Expr::Const(false));
    check_total(&empty, &predicate);

    let everything = set([(0u32, 127u32)]);
    let predicate = compile(&everything, Domain::new(0, 127), Config::default());
    assert_eq!(root_expr(&predicate), &Expr::Const(true));
    check_total(&everything, &predicate);
}

#[test]
fn root_is_clamped_to_the_domain() {
    // The set fills the span, but the domain extends past it
    let ascii = set([(0u32, 127u32)]);
    let domain = Domain {
        first: 0,
        last: 127,
        limit: 255,
    };
    let predicate = compile(&ascii, domain, Config::default());
    assert!(!predicate.evaluate(128));
    assert!(!predicate.evaluate(255));
    check_total(&ascii, &predicate);
}

#[test]
fn wide_code_units() {
    let values = set([0x41u32, 0x10FFFF]);
    let predicate = compile(
        &values,
        Domain::for_code_unit(&CodeUnit::CHAR32),
        Config::default(),
    );
    assert!(predicate.evaluate(0x41));
    assert!(predicate.evaluate(0x10FFFF));
    assert!(!predicate.evaluate(0x110000));
    assert!(!predicate.evaluate(u32::MAX));
    predicate.verify(&values).unwrap();
}

#[test]
fn word_sizes() {
    let values = set((0..700u32).filter(|c| c % 5 == 1 || c % 11 == 0 || (300..340).contains(c)));
    for word_size in [8, 16, 32, 64] {
        let config = Config {
            word_size,
            ..Default::default()
        };
        let predicate = compile(&values, Domain::new(0, 1000), config);
        check_total(&values, &predicate);
    }
}

#[test]
fn verify_reports_mismatches() {
    let letters = set([(0x41u32, 0x5Au32)]);
    let predicate = compile(&letters, Domain::new(0, 127), Config::default());
    let lowercase = set([(0x61u32, 0x7Au32)]);
    assert_eq!(
        predicate.verify(&lowercase),
        Err(CompileError::Mismatch {
            value: 0x41,
            actual: true
        })
    );
}

#[test]
fn values_outside_of_the_span() {
    let values = set([300u32]);
    let err = Compiler::new(Config::default())
        .unwrap()
        .compile(&values, Domain::new(0, 255))
        .unwrap_err();
    assert!(matches!(err, CompileError::OutOfSpan { first: 300, .. }));
}

#[test]
fn node_finishes_once() {
    let config = Config::default();
    let domain = Domain::new(0, 127);
    let mut node = Node::new(0, 127, 0);
    node.add((65u32, 67u32)).unwrap();
    node.finish(&config, &domain).unwrap();
    let logic = node.logic().clone();

    node.finish(&config, &domain).unwrap();
    assert_eq!(node.logic(), &logic);
    assert_eq!(node.add(70u32), Err(SetError::AlreadyFinished));
}

#[test]
fn unsupported_word_size() {
    let config = Config {
        word_size: 128,
        ..Default::default()
    };
    assert!(Compiler::new(config).is_err());
}
