use quiz_core::model::{
    AccountRef, DisplayName, PasswordHash, Player, ScoreRecord, Username,
};
use quiz_core::time::fixed_now;
use storage::repository::{AccountService, NewAccountRecord, StorageError, UserStore};
use storage::sqlite::SqliteRepository;

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

fn new_account(name: &str, password: &str) -> NewAccountRecord {
    NewAccountRecord {
        username: Username::parse(name).unwrap(),
        password: PasswordHash::derive(password),
        created_at: fixed_now(),
    }
}

#[tokio::test]
async fn sqlite_accounts_round_trip_and_verify() {
    let repo = connect("memdb_accounts").await;

    let id = repo
        .insert_account(new_account("alice", "hunter22"))
        .await
        .unwrap();

    let found = repo
        .find_account(&Username::parse("ALICE").unwrap())
        .await
        .unwrap()
        .expect("account stored");
    assert_eq!(found.id, id);
    assert_eq!(found.username.as_str(), "alice");
    assert_eq!(found.created_at, fixed_now());

    let verified = repo
        .verify_credentials("alice", "hunter22")
        .await
        .unwrap()
        .expect("credentials accepted");
    assert_eq!(verified.account, id);
    assert!(
        repo.verify_credentials("alice", "hunter99")
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn sqlite_rejects_duplicate_usernames() {
    let repo = connect("memdb_duplicates").await;
    repo.insert_account(new_account("bob_1", "hunter22"))
        .await
        .unwrap();

    let err = repo
        .insert_account(new_account("BOB_1", "other456"))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Conflict));
    assert!(
        repo.username_taken(&Username::parse("bob_1").unwrap())
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn sqlite_leaderboard_orders_scores() {
    let repo = connect("memdb_scores").await;
    let account = repo
        .insert_account(new_account("carol", "hunter22"))
        .await
        .unwrap();

    let carol = Player::authenticated(account, Username::parse("carol").unwrap());
    let guest = Player::anonymous(DisplayName::parse("guest").unwrap());
    let now = fixed_now();

    for (player, score, minutes) in [(&guest, 3, 0), (&carol, 5, 2), (&guest, 5, 1)] {
        let record =
            ScoreRecord::for_player(player, score, 5, now + chrono::Duration::minutes(minutes))
                .unwrap();
        repo.store_score(&record).await.unwrap();
    }

    let top = repo.top_scores(10).await.unwrap();
    assert_eq!(top.len(), 3);
    assert_eq!(top[0].player_name(), "guest");
    assert!(top[0].is_anonymous());
    assert_eq!(top[1].player_name(), "carol");
    assert_eq!(top[1].account(), Some(account));
    assert_eq!(top[2].score(), 3);

    let limited = repo.top_scores(1).await.unwrap();
    assert_eq!(limited.len(), 1);
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let repo = connect("memdb_migrate_twice").await;
    repo.migrate().await.expect("second migrate");
    let id = repo
        .insert_account(new_account("dave", "hunter22"))
        .await
        .unwrap();
    assert_eq!(id, AccountRef::new(1));
}
