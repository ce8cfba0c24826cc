// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use proptest::prelude::*;

fn table() -> AllocationTable {
    AllocationTable::from_resources([("A", 1), ("B", 2)]).unwrap()
}

fn c(id: &str) -> ClientId {
    ClientId::new(id)
}

fn r(name: &str) -> ResourceName {
    ResourceName::new(name)
}

#[test]
fn from_resources_rejects_duplicates() {
    let err = AllocationTable::from_resources([("A", 1), ("A", 2)]).unwrap_err();
    assert_eq!(err, AllocationError::DuplicateResource(r("A")));
}

#[test]
fn acquire_unknown_resource_is_an_error() {
    let mut table = table();
    let err = table.acquire(&r("Z"), &c("t1")).unwrap_err();
    assert_eq!(err, AllocationError::UnknownResource(r("Z")));
}

#[test]
fn acquire_reports_full_resource_as_false() {
    let mut table = table();
    assert!(table.acquire(&r("A"), &c("t1")).unwrap());
    assert!(!table.acquire(&r("A"), &c("t2")).unwrap());
    assert_eq!(table.holders(&r("A")).unwrap(), &[c("t1")]);
}

#[test]
fn release_by_non_holder_leaves_table_unchanged() {
    let mut table = table();
    table.acquire(&r("B"), &c("t1")).unwrap();
    let before = table.snapshot();

    let err = table.release(&r("B"), &c("t2")).unwrap_err();

    assert_eq!(
        err,
        AllocationError::NotHolder {
            client: c("t2"),
            resource: r("B"),
        }
    );
    assert_eq!(table.snapshot(), before);
}

#[test]
fn release_unknown_resource_is_an_error() {
    let mut table = table();
    assert!(matches!(
        table.release(&r("Z"), &c("t1")),
        Err(AllocationError::UnknownResource(_))
    ));
}

#[test]
fn force_release_removes_holder() {
    let mut table = table();
    table.acquire(&r("A"), &c("t1")).unwrap();

    assert!(table.force_release(&r("A"), &c("t1")).unwrap());
    assert!(table.holders(&r("A")).unwrap().is_empty());
    assert!(!table.force_release(&r("A"), &c("t1")).unwrap());
}

#[test]
fn held_by_lists_every_resource_a_client_is_in() {
    let mut table = table();
    table.acquire(&r("A"), &c("t1")).unwrap();
    table.acquire(&r("B"), &c("t1")).unwrap();
    table.acquire(&r("B"), &c("t2")).unwrap();

    assert_eq!(table.held_by(&c("t1")), vec![r("A"), r("B")]);
    assert_eq!(table.held_by(&c("t2")), vec![r("B")]);
    assert!(table.held_by(&c("t3")).is_empty());
}

#[test]
fn snapshot_is_ordered_by_name_and_detached() {
    let mut table = table();
    table.acquire(&r("B"), &c("t1")).unwrap();

    let snap = table.snapshot();
    table.release(&r("B"), &c("t1")).unwrap();

    assert_eq!(snap.len(), 2);
    assert_eq!(snap[0].name, r("A"));
    assert_eq!(snap[0].kind, ResourceKind::Mutex);
    assert_eq!(snap[1].holders, vec![c("t1")]);
    assert!(table.holders(&r("B")).unwrap().is_empty());
}

#[derive(Debug, Clone)]
enum Op {
    Acquire(usize, usize),
    Release(usize, usize),
    Force(usize, usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..3usize, 0..5usize).prop_map(|(r, c)| Op::Acquire(r, c)),
        (0..3usize, 0..5usize).prop_map(|(r, c)| Op::Release(r, c)),
        (0..3usize, 0..5usize).prop_map(|(r, c)| Op::Force(r, c)),
    ]
}

proptest! {
    #[test]
    fn holders_never_exceed_capacity(ops in prop::collection::vec(op_strategy(), 0..64)) {
        let names = [r("A"), r("B"), r("C")];
        let mut table = AllocationTable::from_resources([("A", 1), ("B", 2), ("C", 3)]).unwrap();

        for op in ops {
            match op {
                Op::Acquire(ri, ci) => { table.acquire(&names[ri], &c(&format!("t{}", ci))).unwrap(); }
                Op::Release(ri, ci) => { let _ = table.release(&names[ri], &c(&format!("t{}", ci))); }
                Op::Force(ri, ci) => { table.force_release(&names[ri], &c(&format!("t{}", ci))).unwrap(); }
            }
            for snap in table.snapshot() {
                prop_assert!(snap.holders.len() as u32 <= snap.capacity);
                if snap.kind == ResourceKind::Mutex {
                    prop_assert!(snap.holders.len() <= 1);
                }
            }
        }
    }
}
