//! Misuse detection, only built with `--features validate`

#![cfg(feature = "validate")]

use std::ptr::NonNull;

use blockpool::BlockPool;

#[test]
#[should_panic(expected = "released twice")]
fn double_release_panics() {
    let pool = BlockPool::<u64, 4>::new();
    let p = pool.acquire();

    unsafe {
        pool.release(p);
        pool.release(p);
    }
}

#[test]
#[should_panic(expected = "does not belong to this pool")]
fn foreign_pointer_panics() {
    let pool = BlockPool::<u64, 4>::new();
    let mut value = 7u64;

    unsafe { pool.release(NonNull::from(&mut value)) };
}

#[test]
#[should_panic(expected = "does not belong to this pool")]
fn pointer_from_other_pool_panics() {
    let a = BlockPool::<u64, 4>::new();
    let b = BlockPool::<u64, 4>::new();

    unsafe { a.release(b.acquire()) };
}

#[test]
#[should_panic(expected = "does not belong to this pool")]
fn misaligned_pointer_panics() {
    let pool = BlockPool::<u64, 4>::new();
    let p = pool.acquire();
    let inside = unsafe { NonNull::new_unchecked(p.as_ptr().cast::<u8>().add(3)) };

    unsafe { pool.release(inside.cast()) };
}

#[test]
#[should_panic(expected = "never issued")]
fn never_issued_slot_panics() {
    let pool = BlockPool::<u64, 4>::new();
    let p = pool.acquire();
    let next = unsafe { NonNull::new_unchecked(p.as_ptr().add(1)) };

    unsafe { pool.release(next) };
}

#[test]
fn valid_releases_pass() {
    let pool = BlockPool::<u64, 2>::new();
    let slots: Vec<_> = (0..7).map(|_| pool.acquire()).collect();

    for slot in slots {
        unsafe { pool.release(slot) };
    }

    assert_eq!(pool.stats().live(), 0);
}
