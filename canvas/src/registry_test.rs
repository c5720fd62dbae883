use super::*;
use crate::doc::DocStore;
use crate::geom::Point;
use crate::object::{CanvasObject, Circle, Shape};

/// Mint distinct keys through an anonymous-object store.
fn keys(n: usize) -> Vec<ObjectKey> {
    let mut doc = DocStore::new();
    (0..n)
        .map(|_| {
            doc.insert(None, CanvasObject::new(Shape::Circle(Circle::new(Point::default(), 1.0))))
                .unwrap()
        })
        .collect()
}

#[test]
fn register_then_get() {
    let k = keys(1);
    let mut reg = Registry::new();
    reg.register("a", k[0]).unwrap();
    assert_eq!(reg.get("a"), Some(k[0]));
    assert!(reg.contains("a"));
    assert_eq!(reg.get("b"), None);
}

#[test]
fn duplicate_identifier_is_rejected() {
    let k = keys(2);
    let mut reg = Registry::new();
    reg.register("a", k[0]).unwrap();
    let err = reg.register("a", k[1]).unwrap_err();
    assert_eq!(err, SceneError::DuplicateIdentifier("a".into()));
    assert_eq!(reg.get("a"), Some(k[0]));
    assert_eq!(reg.len(), 1);
}

#[test]
fn iteration_follows_registration_order() {
    let k = keys(3);
    let mut reg = Registry::new();
    reg.register("zeta", k[0]).unwrap();
    reg.register("alpha", k[1]).unwrap();
    reg.register("mid", k[2]).unwrap();
    let ids = reg.iter().map(|(id, _)| id).collect::<Vec<_>>();
    assert_eq!(ids, ["zeta", "alpha", "mid"]);
}

#[test]
fn reset_empties_and_allows_reuse() {
    let k = keys(2);
    let mut reg = Registry::new();
    reg.register("a", k[0]).unwrap();
    reg.reset();
    assert!(reg.is_empty());
    assert!(!reg.contains("a"));
    reg.register("a", k[1]).unwrap();
    assert_eq!(reg.get("a"), Some(k[1]));
}
