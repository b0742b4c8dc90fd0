use super::*;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

type Counter = Arc<dyn Fn() + Send + Sync>;

fn counting_listener(hits: &Arc<AtomicUsize>) -> Counter {
    let hits = Arc::clone(hits);
    Arc::new(move || {
        hits.fetch_add(1, Ordering::SeqCst);
    })
}

#[test]
fn add_then_remove_leaves_registry_empty() {
    let registry = ListenerRegistry::<Counter>::new(ListenerSource::Coloring);
    let hits = Arc::new(AtomicUsize::new(0));

    let id = registry.add(counting_listener(&hits)).expect("add");
    assert_eq!(registry.len(), 1);
    for listener in registry.snapshot() {
        listener();
    }
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    registry.remove(id).expect("remove");
    assert!(registry.is_empty());
}

#[test]
fn removing_unknown_listener_is_rejected() {
    let registry = ListenerRegistry::<Counter>::new(ListenerSource::Focus);
    let hits = Arc::new(AtomicUsize::new(0));
    let id = registry.add(counting_listener(&hits)).expect("add");
    registry.remove(id).expect("first remove");

    let err = registry.remove(id).expect_err("second remove must fail");
    assert_eq!(
        err,
        RegistrationError::UnknownListener {
            registry: ListenerSource::Focus,
            id,
        }
    );
}

#[test]
fn closed_registry_rejects_add_and_remove() {
    let registry = ListenerRegistry::<Counter>::new(ListenerSource::Timepoint);
    let hits = Arc::new(AtomicUsize::new(0));
    let id = registry.add(counting_listener(&hits)).expect("add");

    registry.close();
    assert!(registry.is_closed());
    assert!(registry.is_empty());
    assert!(matches!(
        registry.add(counting_listener(&hits)),
        Err(RegistrationError::RegistryClosed {
            registry: ListenerSource::Timepoint
        })
    ));
    assert!(matches!(
        registry.remove(id),
        Err(RegistrationError::RegistryClosed { .. })
    ));
}

#[test]
fn listener_ids_are_unique_across_registries() {
    let first = ListenerRegistry::<Counter>::new(ListenerSource::Coloring);
    let second = ListenerRegistry::<Counter>::new(ListenerSource::Focus);
    let hits = Arc::new(AtomicUsize::new(0));

    let a = first.add(counting_listener(&hits)).expect("add a");
    let b = second.add(counting_listener(&hits)).expect("add b");
    assert_ne!(a, b);
}
