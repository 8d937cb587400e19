//! Registry behaviour under long random sequences and concurrent callers.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::thread;

use wspresence_core::PresenceRegistry;

/// Tiny deterministic generator so failures reproduce.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next() as usize) % items.len()]
    }
}

#[test]
fn random_sequences_match_reference_model() {
    let identities = ["alice", "bob", "carol", "dave"];
    let reg = PresenceRegistry::new();
    let mut model: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    let mut rng = Lcg(0x5eed);
    let mut next_conn = 0u32;

    for _ in 0..5_000 {
        let id = rng.pick(&identities);
        if rng.next() % 2 == 0 {
            next_conn += 1;
            let conn = format!("c{next_conn}");
            let was_empty = model.get(id).map_or(true, |s| s.is_empty());
            let t = reg.connect(id, &conn).unwrap();
            assert_eq!(t.went_online(), was_empty, "connect {id} {conn}");
            model.entry(id.to_string()).or_default().insert(conn);
        } else {
            // Pick a live connection of `id` most of the time, otherwise a stale one.
            let live: Vec<String> = model
                .get(id)
                .map(|s| s.iter().cloned().collect())
                .unwrap_or_default();
            let conn = if !live.is_empty() && rng.next() % 4 != 0 {
                live[(rng.next() as usize) % live.len()].clone()
            } else {
                format!("stale{}", rng.next() % 8)
            };

            let had_exactly_this = live.len() == 1 && live[0] == conn;
            let t = reg.disconnect(id, &conn).unwrap();
            assert_eq!(t.went_offline(), had_exactly_this, "disconnect {id} {conn}");
            if let Some(set) = model.get_mut(id) {
                set.remove(&conn);
                if set.is_empty() {
                    model.remove(id);
                }
            }
        }

        let expected: Vec<String> = model.keys().cloned().collect();
        assert_eq!(reg.online_identities(), expected);
        for id in identities {
            let got = reg
                .connections_for(id)
                .map(|v| v.into_iter().collect::<BTreeSet<_>>());
            assert_eq!(got, model.get(id).cloned());
        }
    }
}

#[test]
fn concurrent_connects_are_not_lost() {
    let reg = Arc::new(PresenceRegistry::new());
    let threads = 8;
    let per_thread = 200;

    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let reg = Arc::clone(&reg);
            thread::spawn(move || {
                let mut online_edges = 0;
                for i in 0..per_thread {
                    let id = if i % 2 == 0 { "alice" } else { "bob" };
                    if reg.connect(id, &format!("t{t}-c{i}")).unwrap().went_online() {
                        online_edges += 1;
                    }
                }
                online_edges
            })
        })
        .collect();

    let edges: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(edges, 2, "exactly one online edge per identity");
    assert_eq!(reg.online_identities(), vec!["alice", "bob"]);
    assert_eq!(reg.connection_count("alice") + reg.connection_count("bob"), threads * per_thread);
}

#[test]
fn concurrent_churn_reports_balanced_transitions() {
    let reg = Arc::new(PresenceRegistry::new());

    let handles: Vec<_> = (0..6)
        .map(|t| {
            let reg = Arc::clone(&reg);
            thread::spawn(move || {
                let (mut up, mut down) = (0i64, 0i64);
                for i in 0..500 {
                    let conn = format!("t{t}-c{i}");
                    if reg.connect("shared", &conn).unwrap().went_online() {
                        up += 1;
                    }
                    if reg.disconnect("shared", &conn).unwrap().went_offline() {
                        down += 1;
                    }
                }
                (up, down)
            })
        })
        .collect();

    let (up, down) = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .fold((0, 0), |(a, b), (u, d)| (a + u, b + d));

    assert_eq!(up, down, "every online edge is matched by an offline edge");
    assert!(up >= 1);
    assert!(reg.online_identities().is_empty());
    assert_eq!(reg.connections_for("shared"), None);
}
