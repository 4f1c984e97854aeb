use super::*;
use std::sync::Arc;

#[test]
fn equal_paths_share_one_allocation() {
    let t = ElementIdPathTable::new();
    let a = t.intern(&[1, 2, 3]);
    let b = t.intern_path(&ElementIdPath::new(&[1, 2, 3]));
    assert!(a.ptr_eq(&b));
    assert_eq!(t.len(), 1);

    let c = t.intern(&[1, 2]);
    assert!(!a.ptr_eq(&c));
    assert_eq!(t.len(), 2);
}

#[test]
fn concurrent_interning_converges() {
    let t = Arc::new(ElementIdPathTable::new());
    let results: Vec<ElementIdPath> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let t = Arc::clone(&t);
                s.spawn(move || t.intern(&[4, 2]))
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert!(results.windows(2).all(|w| w[0].ptr_eq(&w[1])));
    assert_eq!(t.len(), 1);
}
