use crate::*;

use wayline_core::{ConnectionSessionStatus, Status};
use wayline_services::Publisher;

/// Completed history survives a restart; the new node starts with an empty
/// active table.
#[test]
fn test_history_survives_restart() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = db_path(&dir);

    {
        let node = Node::start(&path)?;
        node.bus.publish(connection("c1", ConnectionSessionStatus::Created));
        node.bus.publish(paid("c1", 3));
        node.bus.publish(connection("c1", ConnectionSessionStatus::Ended));
        node.bus.publish(connection("c2", ConnectionSessionStatus::Created));
        node.bus.close();
    }

    let node = Node::start(&path)?;
    let all = node.history.get_all()?;
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].session_id.as_str(), "c1");
    assert_eq!(all[0].status, Some(Status::Completed));
    assert_eq!(all[0].tokens, 3);
    // c2 was stored as New and never finished.
    assert_eq!(all[1].status, Some(Status::New));
    assert_eq!(node.history.active_count(), 0);

    // An end for c2 after restart finds nothing to finish.
    node.bus.publish(connection("c2", ConnectionSessionStatus::Ended));
    assert_eq!(node.persisted("c2")?.map(|r| r.status), Some(Some(Status::New)));
    Ok(())
}

/// Statistics are memory-only: a restart between the last persisted write
/// and the end loses them.
#[test]
fn test_unpersisted_statistics_are_lost_on_restart() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = db_path(&dir);

    {
        let node = Node::start(&path)?;
        node.bus.publish(connection("c1", ConnectionSessionStatus::Created));
        node.bus.publish(stats("c1", 777, 888));
    }

    let node = Node::start(&path)?;
    let record = node.persisted("c1")?.expect("stored on create");
    assert_eq!(record.data_sent, 0);
    assert_eq!(record.data_received, 0);
    Ok(())
}

/// Reusing a finished session id: the second create hits a duplicate key in
/// storage and stays pending in memory.
#[test]
fn test_reused_session_id_is_not_overwritten() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let node = Node::start(&db_path(&dir))?;

    node.bus.publish(connection("c1", ConnectionSessionStatus::Created));
    node.bus.publish(paid("c1", 8));
    node.bus.publish(connection("c1", ConnectionSessionStatus::Ended));

    node.bus.publish(connection("c1", ConnectionSessionStatus::Created));

    let all = node.history.get_all()?;
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].status, Some(Status::Completed));
    assert_eq!(all[0].tokens, 8);
    let pending = node
        .history
        .active(&wayline_core::SessionId::from("c1"))
        .expect("pending in memory");
    assert_eq!(pending.status, None);
    Ok(())
}
