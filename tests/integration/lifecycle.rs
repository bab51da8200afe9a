use crate::*;

use wayline_core::{ConnectionSessionStatus, DataTransferred, Direction, ServiceSessionStatus, Status};
use wayline_services::Publisher;

/// create → stats → payment → end on the consumer side.
#[test]
fn test_consumer_session_is_recorded() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let node = Node::start(&db_path(&dir))?;

    node.bus.publish(connection("c1", ConnectionSessionStatus::Created));
    node.bus.publish(stats("c1", 100, 50));
    node.bus.publish(paid("c1", 5));
    node.bus.publish(connection("c1", ConnectionSessionStatus::Ended));

    let all = node.history.get_all()?;
    assert_eq!(all.len(), 1);
    let record = &all[0];
    assert_eq!(record.direction, Direction::Consumer);
    assert_eq!(record.consumer_id.address(), "0xAA");
    assert_eq!(record.provider_id.address(), "0xbb");
    assert_eq!(record.service_type, "wireguard");
    assert_eq!(record.accountant_id, format!("0x{}", "42".repeat(20)));
    assert_eq!(record.data_sent, 100);
    assert_eq!(record.data_received, 50);
    assert_eq!(record.tokens, 5);
    assert_eq!(record.status, Some(Status::Completed));
    assert_eq!(record.started, started_at());
    assert!(record.updated >= record.started);
    assert_eq!(node.history.active_count(), 0);
    Ok(())
}

/// The last statistics and payment before `end` win.
#[test]
fn test_last_values_before_end_are_kept() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let node = Node::start(&db_path(&dir))?;

    node.bus.publish(connection("c1", ConnectionSessionStatus::Created));
    for i in 1..=5u64 {
        node.bus.publish(stats("c1", i * 1000, i * 10));
        node.bus.publish(paid("c1", i * 2));
    }
    node.bus.publish(connection("c1", ConnectionSessionStatus::Ended));
    // Late events after the end are dropped.
    node.bus.publish(stats("c1", 1, 1));
    node.bus.publish(paid("c1", 99));

    let record = node.persisted("c1")?.expect("record persisted");
    assert_eq!(record.data_sent, 5000);
    assert_eq!(record.data_received, 50);
    assert_eq!(record.tokens, 10);
    assert_eq!(record.status, Some(Status::Completed));
    Ok(())
}

#[test]
fn test_unknown_session_leaves_no_history() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let node = Node::start(&db_path(&dir))?;

    node.bus.publish(stats("X", 10, 10));

    assert!(node.persisted("X")?.is_none());
    assert!(node.history.get_all()?.is_empty());
    Ok(())
}

/// Provider side: the service layer owns the figures, the history hydrates
/// from its table on every service event.
#[test]
fn test_provider_session_is_recorded() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let node = Node::start(&db_path(&dir))?;

    node.service_sessions.insert(service_session("p1"));
    node.bus.publish(service("p1", ServiceSessionStatus::Created));

    let stored = node.persisted("p1")?.expect("stored on create");
    assert_eq!(stored.direction, Direction::Provider);
    assert_eq!(stored.status, Some(Status::New));

    let mut running = service_session("p1");
    running.data_transferred = DataTransferred { up: 2048, down: 4096 };
    running.tokens_earned = 15;
    node.service_sessions.insert(running);
    node.bus.publish(service("p1", ServiceSessionStatus::Removed));
    node.service_sessions.remove(&wayline_core::SessionId::from("p1"));

    let done = node.persisted("p1")?.expect("completed");
    assert_eq!(done.status, Some(Status::Completed));
    assert_eq!(done.data_sent, 2048);
    assert_eq!(done.data_received, 4096);
    assert_eq!(done.tokens, 15);
    assert_eq!(done.service_type, "openvpn");
    assert_eq!(node.history.get_all()?.len(), 1);
    Ok(())
}

/// In-flight sessions are visible in memory but not in history until stored.
#[test]
fn test_pending_session_is_not_history() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let node = Node::start(&db_path(&dir))?;

    node.service_sessions.insert(service_session("p1"));
    node.bus.publish(service("p1", ServiceSessionStatus::Acknowledged));

    assert_eq!(node.history.active_count(), 1);
    assert!(node.history.get_all()?.is_empty());
    Ok(())
}
