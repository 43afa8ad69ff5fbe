use role_directory::{DirectoryError, RoleDirectory, RoleStore, StorageError};
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;

const TIMEOUT: Duration = Duration::from_secs(5);

async fn orphan_edges(dir: &RoleDirectory) -> i64 {
    dir.database()
        .call(|conn| {
            conn.query_row(
                "SELECT COUNT(*) FROM role_users
                 WHERE role_id NOT IN (SELECT id FROM roles)
                    OR user_id NOT IN (SELECT id FROM users)",
                [],
                |row| row.get(0),
            )
            .map_err(StorageError::from)
        })
        .await
        .unwrap()
}

#[tokio::test]
async fn membership_lifecycle() {
    let tmp = tempdir().unwrap();
    let dir = RoleDirectory::open(&tmp.path().join("bot.db"), TIMEOUT)
        .await
        .unwrap();

    dir.create_role("ops").await.unwrap();
    dir.add_user_to_role("ops", "alice").await.unwrap();
    dir.add_user_to_role("ops", "bob").await.unwrap();
    assert_eq!(dir.get_users_in_role("ops").await.unwrap(), vec!["alice", "bob"]);

    dir.remove_user_from_role("ops", "alice").await.unwrap();
    assert_eq!(dir.get_users_in_role("ops").await.unwrap(), vec!["bob"]);

    dir.remove_role("ops").await.unwrap();
    let err = dir.add_user_to_role("ops", "carol").await.unwrap_err();
    assert!(matches!(err, DirectoryError::RoleNotFound { .. }));
    assert_eq!(orphan_edges(&dir).await, 0);
}

#[tokio::test]
async fn equivalent_names_collide() {
    let dir = RoleDirectory::open_in_memory(TIMEOUT).await.unwrap();
    for (first, second) in [("Ops", " ops"), ("On Call", "on call  "), ("DEV\n", "dev")] {
        dir.create_role(first).await.unwrap();
        let err = dir.create_role(second).await.unwrap_err();
        assert_eq!(err.kind(), "already_exists", "{first:?} vs {second:?}");
    }
}

#[tokio::test]
async fn reads_are_sorted() {
    let dir = RoleDirectory::open_in_memory(TIMEOUT).await.unwrap();
    for role in ["support", "backend", "oncall"] {
        dir.create_role(role).await.unwrap();
    }
    for user in ["zoe", "@mike", "Anna"] {
        dir.add_user_to_role("backend", user).await.unwrap();
    }

    assert_eq!(
        dir.get_all_roles().await.unwrap(),
        vec!["backend", "oncall", "support"]
    );
    assert_eq!(
        dir.get_users_in_role("backend").await.unwrap(),
        vec!["anna", "mike", "zoe"]
    );
}

#[tokio::test]
async fn data_survives_reopen() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("bot.db");

    let dir = RoleDirectory::open(&path, TIMEOUT).await.unwrap();
    dir.create_role("ops").await.unwrap();
    dir.add_user_to_role("ops", "alice").await.unwrap();
    dir.close().await.unwrap();

    let dir = RoleDirectory::open(&path, TIMEOUT).await.unwrap();
    assert_eq!(dir.get_users_in_role("ops").await.unwrap(), vec!["alice"]);
}

#[tokio::test]
async fn remove_role_cascades_every_member() {
    let dir = RoleDirectory::open_in_memory(TIMEOUT).await.unwrap();
    dir.create_role("ops").await.unwrap();
    for i in 0..25 {
        dir.add_user_to_role("ops", &format!("user{i:02}")).await.unwrap();
    }
    assert_eq!(dir.get_users_in_role("ops").await.unwrap().len(), 25);

    dir.remove_role("ops").await.unwrap();
    assert!(dir.get_users_in_role("ops").await.unwrap().is_empty());

    let edges: i64 = dir
        .database()
        .call(|conn| {
            conn.query_row("SELECT COUNT(*) FROM role_users", [], |row| row.get(0))
                .map_err(StorageError::from)
        })
        .await
        .unwrap();
    assert_eq!(edges, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_remove_and_add_never_orphan() {
    let tmp = tempdir().unwrap();
    let dir = Arc::new(
        RoleDirectory::open(&tmp.path().join("bot.db"), TIMEOUT)
            .await
            .unwrap(),
    );

    for round in 0..20 {
        let role = format!("team{round}");
        dir.create_role(&role).await.unwrap();
        dir.add_user_to_role(&role, "seed").await.unwrap();

        let adder = {
            let dir = Arc::clone(&dir);
            let role = role.clone();
            tokio::spawn(async move { dir.add_user_to_role(&role, "late").await })
        };
        let remover = {
            let dir = Arc::clone(&dir);
            let role = role.clone();
            tokio::spawn(async move { dir.remove_role(&role).await })
        };

        remover.await.unwrap().unwrap();
        match adder.await.unwrap() {
            Ok(()) => {}
            Err(DirectoryError::RoleNotFound { .. }) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }

        assert!(dir.get_users_in_role(&role).await.unwrap().is_empty());
        assert_eq!(orphan_edges(&dir).await, 0);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_adds_of_same_member_produce_one_edge() {
    let dir = Arc::new(RoleDirectory::open_in_memory(TIMEOUT).await.unwrap());
    dir.create_role("ops").await.unwrap();

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let dir = Arc::clone(&dir);
            tokio::spawn(async move { dir.add_user_to_role("ops", "@alice").await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(dir.get_users_in_role("ops").await.unwrap(), vec!["alice"]);
}

#[tokio::test]
async fn timed_out_add_never_commits() {
    let dir = RoleDirectory::open_in_memory(Duration::from_millis(50))
        .await
        .unwrap();
    dir.create_role("ops").await.unwrap();

    let blocker = {
        let db = dir.database().clone();
        tokio::spawn(async move {
            db.call(|_| {
                std::thread::sleep(Duration::from_millis(300));
                Ok::<_, StorageError>(())
            })
            .await
            .unwrap();
        })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;

    let err = dir.add_user_to_role("ops", "alice").await.unwrap_err();
    assert!(matches!(
        err,
        DirectoryError::StorageFailure(StorageError::Timeout(_))
    ));

    blocker.await.unwrap();
    assert!(dir.get_users_in_role("ops").await.unwrap().is_empty());
    assert!(dir.get_user("alice").await.unwrap().is_none());
}
