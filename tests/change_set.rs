//! Change tracking as seen through typed collections.

mod common;

use common::{Customer, customers};
use std::cell::RefCell;
use std::rc::Rc;
use tabula::core::{RowState, StoreEvent};
use tabula::prelude::*;

fn accepted() -> Collection<Customer> {
    let mut customers = customers();
    customers.accept_changes();
    customers
}

#[test]
fn change_set_holds_only_the_delta() {
    let mut customers = accepted();
    assert!(!customers.has_changes());

    customers.get_mut(0).unwrap().set("region", "west").unwrap();
    customers.remove_at(1).unwrap();
    customers.push(&Customer::new("Linus")).unwrap();

    let delta = customers.change_set();
    assert_eq!(delta.len(), 2);
    assert!(delta.get(0).unwrap().state().contains(RowState::MODIFIED));
    assert!(delta.get(1).unwrap().state().contains(RowState::ADDED));
    assert_eq!(delta.store().deleted_rows().len(), 1);
    assert_eq!(delta.entity(1).unwrap().name, "Linus");

    customers.accept_changes();
    assert!(!customers.has_changes());
    assert!(customers.store().deleted_rows().is_empty());
    assert!(customers.change_set().is_empty());
}

#[test]
fn removing_an_unsaved_row_leaves_no_trace() {
    let mut customers = accepted();
    customers.push(&Customer::new("Linus")).unwrap();
    customers.remove_at(2).unwrap();
    assert!(!customers.has_changes());
    assert!(customers.store().deleted_rows().is_empty());
}

#[test]
fn assigning_an_equal_entity_changes_nothing() {
    let mut customers = accepted();
    let same = customers.entity(0).unwrap();
    customers.set(0, &same).unwrap();
    assert!(!customers.has_changes());

    customers.set(0, &same.clone().in_region("east")).unwrap();
    assert!(customers.has_changes());
    assert_eq!(customers.entity(0).unwrap().region.as_deref(), Some("east"));
}

#[test]
fn observers_see_every_tracked_write() {
    let mut customers = accepted();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    customers
        .store_mut()
        .subscribe(move |event| sink.borrow_mut().push(*event));

    customers.get_mut(1).unwrap().set("name", "Grace H").unwrap();
    customers.remove_at(0).unwrap();

    let events = seen.borrow();
    assert_eq!(events.len(), 3);
    assert!(matches!(events[0], StoreEvent::Changing { column: 1, .. }));
    assert!(matches!(events[1], StoreEvent::Updated { column: 1, .. }));
    assert!(matches!(events[2], StoreEvent::Deleted { .. }));
}

#[test]
fn suspended_events_are_not_delivered() {
    let mut customers = accepted();
    let seen = Rc::new(RefCell::new(0usize));
    let sink = Rc::clone(&seen);
    let store = customers.store_mut();
    store.subscribe(move |_| *sink.borrow_mut() += 1);
    store.suspend_events();
    store.set_value(0, 1, "Ada L").unwrap();
    store.resume_events();
    store.set_value(0, 1, "Ada K").unwrap();
    assert_eq!(*seen.borrow(), 2);
}

#[test]
fn detached_items_follow_their_row() {
    let mut customers = accepted();
    let grace = customers.detach(1).unwrap();
    customers.insert(0, &Customer::new("Linus")).unwrap();

    assert_eq!(grace.resolve(&customers).unwrap().index(), 2);
    grace
        .resolve_mut(&mut customers)
        .unwrap()
        .set("region", "south")
        .unwrap();
    assert_eq!(customers.entity(2).unwrap().region.as_deref(), Some("south"));

    customers.remove_at(2).unwrap();
    assert!(grace.resolve(&customers).is_err());
}

#[test]
fn rejection_must_start_from_a_clean_state() {
    let mut customers = customers();
    assert!(customers.track_for_rejection().is_err());
    customers.accept_changes();
    customers.track_for_rejection().unwrap();

    customers.remove_at(0).unwrap();
    customers.reject_changes().unwrap();
    assert_eq!(customers.len(), 2);
    assert!(!customers.has_changes());
}

#[test]
fn merge_appends_rows_with_their_state() {
    let mut target = accepted();
    let source = customers();
    target.store_mut().merge(source.store()).unwrap();

    assert_eq!(target.len(), 4);
    assert!(target.get(0).unwrap().state().is_unchanged());
    assert!(target.get(3).unwrap().state().contains(RowState::ADDED));
    assert_eq!(target.store().columns().len(), source.store().columns().len());
}
