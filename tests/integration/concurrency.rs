use crate::*;

use std::collections::HashSet;

use wayline_core::{ConnectionSessionStatus, Direction, ServiceSessionStatus, Status};
use wayline_services::Publisher;

/// Many sessions from both roles at once, each driven from its own thread.
#[test]
fn test_concurrent_sessions_are_all_recorded() -> Result<()> {
    const N: u64 = 40;

    let dir = tempfile::tempdir()?;
    let node = Node::start(&db_path(&dir))?;
    for i in 0..N {
        node.service_sessions.insert(service_session(&format!("p{i}")));
    }

    std::thread::scope(|s| {
        for i in 0..N {
            let bus = node.bus.clone();
            s.spawn(move || {
                let id = format!("c{i}");
                bus.publish(connection(&id, ConnectionSessionStatus::Created));
                bus.publish(stats(&id, i, i + 1));
                bus.publish(paid(&id, i * 3));
                bus.publish(connection(&id, ConnectionSessionStatus::Ended));
            });
            let bus = node.bus.clone();
            s.spawn(move || {
                let id = format!("p{i}");
                bus.publish(service(&id, ServiceSessionStatus::Created));
                bus.publish(service(&id, ServiceSessionStatus::Removed));
            });
        }
    });

    let all = node.history.get_all()?;
    assert_eq!(all.len() as u64, 2 * N);

    let ids: HashSet<_> = all.iter().map(|r| r.session_id.clone()).collect();
    assert_eq!(ids.len() as u64, 2 * N, "no duplicated records");

    for record in &all {
        assert_eq!(record.status, Some(Status::Completed));
        let id = record.session_id.as_str();
        let i: u64 = id[1..].parse()?;
        match record.direction {
            Direction::Consumer => {
                assert!(id.starts_with('c'));
                assert_eq!((record.data_sent, record.data_received), (i, i + 1));
                assert_eq!(record.tokens, i * 3);
            }
            Direction::Provider => assert!(id.starts_with('p')),
        }
    }
    assert_eq!(node.history.active_count(), 0);
    Ok(())
}
