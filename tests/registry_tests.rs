use battleship_server::registry::RegistryError;
use battleship_server::{ConnectionId, SessionRegistry};

#[test]
fn test_ids_are_unique() {
    let registry = SessionRegistry::new();
    let a = registry.next_connection_id();
    let b = registry.next_connection_id();
    assert_ne!(a, b);

    let c = registry.clone().next_connection_id();
    assert!(c > b, "clones share one counter");
}

#[test]
fn test_ticket_lifecycle() {
    let registry = SessionRegistry::new();
    let (a, b) = (registry.next_connection_id(), registry.next_connection_id());

    let ticket = registry.begin(a, b).unwrap();
    let id = ticket.id();
    assert!(registry.contains(id));
    assert_eq!(registry.active_count(), 1);
    assert_eq!(registry.session_of(a), Some(id));
    assert_eq!(registry.session_of(b), Some(id));

    drop(ticket);
    assert!(!registry.contains(id));
    assert_eq!(registry.active_count(), 0);
    assert_eq!(registry.session_of(a), None);
}

#[test]
fn test_connection_in_active_session_rejected() {
    let registry = SessionRegistry::new();
    let a = registry.next_connection_id();
    let b = registry.next_connection_id();
    let c = registry.next_connection_id();

    let first = registry.begin(a, b).unwrap();
    let err = registry.begin(c, b).unwrap_err();
    assert_eq!(
        err,
        RegistryError::AlreadyInSession {
            connection: b,
            session: first.id()
        }
    );
    assert_eq!(registry.active_count(), 1);

    // free again once the first session ends
    drop(first);
    let second = registry.begin(c, b).unwrap();
    assert_eq!(registry.sessions(), vec![second.id()]);
}

#[test]
fn test_same_connection_twice_rejected() {
    let registry = SessionRegistry::new();
    let a = ConnectionId(42);
    assert_eq!(
        registry.begin(a, a).unwrap_err(),
        RegistryError::SameConnection(a)
    );
    assert_eq!(registry.active_count(), 0);
}

#[test]
fn test_concurrent_sessions() {
    let registry = SessionRegistry::new();
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let registry = registry.clone();
            std::thread::spawn(move || {
                let a = registry.next_connection_id();
                let b = registry.next_connection_id();
                registry.begin(a, b).unwrap()
            })
        })
        .collect();
    let tickets: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(registry.active_count(), 8);
    let mut ids: Vec<_> = tickets.iter().map(|t| t.id()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 8);
    drop(tickets);
    assert_eq!(registry.active_count(), 0);
}
