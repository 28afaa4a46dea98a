use std::collections::BTreeSet;

use reel_booker::booker::{BookerId, BookerRegistry};
use reel_booker::catalog::Catalog;
use reel_booker::cli::seat_list::parse_seat_list;
use reel_booker::cli::{CommandTree, Location};
use reel_booker::config::{ConfigRoot, MovieConfig};
use reel_booker::engine::ReservationEngine;

fn simulated_catalog() -> ConfigRoot {
    ConfigRoot {
        movies: vec![MovieConfig { movie: "GodFather".to_string(), theatres: vec!["Tokyo".into(), "Delhi".into()] }],
    }
}

/// Mirrors what a real session does at accept time: join the registry, compose
/// a UID from the peer address and the returned sequence number, then drive the
/// CLI tree built from a snapshot of the catalog.
fn simulated_session(registry: &BookerRegistry, peer: &str) -> BookerId {
    let booker = BookerId::new();
    let seq = registry.join(booker.clone()).expect("fresh identity should always join");
    booker.set_uid(format!("{peer}@{seq}"));
    booker
}

#[test]
fn two_sessions_book_disjoint_seats_through_the_cli_tree() {
    let catalog = Catalog::load(simulated_catalog()).unwrap();
    let tree = CommandTree::from_catalog(&catalog);
    let engine = ReservationEngine::new(catalog);
    let registry = BookerRegistry::new();

    let alice = simulated_session(&registry, "10.0.0.1:4001");
    let bob = simulated_session(&registry, "10.0.0.2:4002");
    assert_eq!(registry.active_count(), 2);

    let mut alice_state = reel_booker::cli::CliState { location: Location::Root, use_color: false };
    tree.dispatch(&mut alice_state, &engine, &alice, "GodFather");
    tree.dispatch(&mut alice_state, &engine, &alice, "Tokyo");
    let out = tree.dispatch(&mut alice_state, &engine, &alice, "book 1,2,3");
    assert!(out.text.contains("you now own 3 seat(s)"));

    let mut bob_state = reel_booker::cli::CliState { location: Location::Root, use_color: false };
    tree.dispatch(&mut bob_state, &engine, &bob, "GodFather");
    tree.dispatch(&mut bob_state, &engine, &bob, "Tokyo");
    let out = tree.dispatch(&mut bob_state, &engine, &bob, "book 4,5");
    assert!(out.text.contains("you now own 2 seat(s)"));

    assert_eq!(engine.owned_seats(&alice, "GodFather", "Tokyo").unwrap(), BTreeSet::from([1, 2, 3]));
    assert_eq!(engine.owned_seats(&bob, "GodFather", "Tokyo").unwrap(), BTreeSet::from([4, 5]));

    registry.leave(&alice);
    registry.leave(&bob);
    assert_eq!(registry.active_count(), 0);

    // Disconnect does not release seats (see the documented open question).
    assert_eq!(engine.owned_seats(&alice, "GodFather", "Tokyo").unwrap(), BTreeSet::from([1, 2, 3]));
}

#[test]
fn a_conflicting_strict_booking_leaves_the_theatre_unchanged_for_the_loser() {
    let catalog = Catalog::load(simulated_catalog()).unwrap();
    let engine = ReservationEngine::new(catalog);
    let registry = BookerRegistry::new();

    let alice = simulated_session(&registry, "10.0.0.1:4001");
    let bob = simulated_session(&registry, "10.0.0.2:4002");

    engine.book(&alice, "GodFather", "Delhi", &parse_seat_list("0-2"), false).unwrap();
    let outcome = engine.book(&bob, "GodFather", "Delhi", &parse_seat_list("1,5"), false).unwrap();

    assert_eq!(outcome.owned_count, 0);
    assert_eq!(outcome.unavailable, vec![1]);
    assert!(engine.owned_seats(&bob, "GodFather", "Delhi").unwrap().is_empty());
    assert!(engine.free_seats("GodFather", "Delhi").unwrap().contains(&5));
}

#[test]
fn rejoining_with_the_same_identity_token_is_a_conflict() {
    let registry = BookerRegistry::new();
    let booker = BookerId::new();
    registry.join(booker.clone()).unwrap();
    assert!(registry.join(booker).is_err());
}
