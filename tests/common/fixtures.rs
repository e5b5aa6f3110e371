//! Test fixture generators for integration tests.
#![allow(dead_code)]

use module_finder::domain::model::{ClassModelDocument, ClassUnit, MethodUnit};
use std::path::{Path, PathBuf};

/// A, B, C with raw inter-class call counts A-B=6, A-C=2, B-C=2.
pub fn three_class_units() -> Vec<ClassUnit> {
    let mut run = MethodUnit::new("run", 0);
    for i in 0..6 {
        run = run.with_call(format!("b{i}"), 0);
    }
    run = run.with_call("c0", 0).with_call("c1", 0);

    let mut b = ClassUnit::new("B").with_method(
        MethodUnit::new("work", 0)
            .with_call("c2", 0)
            .with_call("c3", 0),
    );
    for i in 0..6 {
        b = b.with_method(MethodUnit::new(format!("b{i}"), 0));
    }

    let mut c = ClassUnit::new("C");
    for i in 0..4 {
        c = c.with_method(MethodUnit::new(format!("c{i}"), 0));
    }

    vec![ClassUnit::new("A").with_method(run), b, c]
}

/// Deterministic pseudo-random class model.
///
/// Every class owns a few uniquely named methods plus a shared `get:0`, so some calls are
/// ambiguous; a few calls target `println:1`, which nothing owns.
pub fn synthetic_units(class_count: usize, seed: u64) -> Vec<ClassUnit> {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    let mut next = move |bound: usize| {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((state >> 33) as usize) % bound.max(1)
    };

    const METHODS: usize = 3;
    let mut classes = Vec::with_capacity(class_count);
    for c in 0..class_count {
        let mut class = ClassUnit::new(format!("C{c:02}")).in_package("synthetic");
        for m in 0..METHODS {
            let mut method = MethodUnit::new(format!("m{c}_{m}"), (m % 3) as u32);
            for _ in 0..next(5) {
                let target = next(class_count);
                let tm = next(METHODS);
                method = method.with_call(format!("m{target}_{tm}"), (tm % 3) as u32);
            }
            if next(4) == 0 {
                method = method.with_call("get", 0);
            }
            if next(6) == 0 {
                method = method.with_call("println", 1);
            }
            class = class.with_method(method);
        }
        if c % 3 == 0 {
            class = class.with_method(MethodUnit::new("get", 0));
        }
        classes.push(class);
    }
    classes
}

/// Service classes plus their test classes, in Java and Python naming.
pub fn units_with_tests() -> Vec<ClassUnit> {
    vec![
        ClassUnit::new("OrderService")
            .in_package("shop")
            .with_method(MethodUnit::new("place", 1).with_call("save", 1)),
        ClassUnit::new("OrderRepository")
            .in_package("shop")
            .with_method(MethodUnit::new("save", 1)),
        ClassUnit::new("OrderServiceTest")
            .in_package("shop")
            .with_method(MethodUnit::new("testPlace", 0).with_call("place", 1)),
        ClassUnit::new("TestRepository")
            .in_package("shop.tests")
            .with_method(MethodUnit::new("test_save", 0).with_call("save", 1)),
    ]
}

/// Write a class model document to `dir/name`.
pub fn write_model(dir: &Path, name: &str, classes: Vec<ClassUnit>) -> PathBuf {
    let path = dir.join(name);
    let doc = ClassModelDocument { classes };
    std::fs::write(&path, serde_json::to_string_pretty(&doc).unwrap()).unwrap();
    path
}
