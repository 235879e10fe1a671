use marketplace_core::db::open_db_in_memory;
use marketplace_core::store::{self, with_transaction};
use marketplace_core::{
    validate, EntityKind, OfferPayload, OfferRepository, OrderPayload, OrderRepository,
    RepoError, SqliteOfferRepository, SqliteOrderRepository, SqliteUserRepository, Store,
    UserPayload, UserRepository,
};
use rusqlite::Connection;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

// Long enough for the second writer to be parked on the write lock.
const HOLD_WRITE_LOCK: Duration = Duration::from_millis(300);

fn offer_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM offers;", [], |row| row.get(0))
        .unwrap()
}

#[test]
fn customer_order_offer_walkthrough() {
    let mut conn = open_db_in_memory().unwrap();

    let user = SqliteUserRepository::new(&mut conn)
        .create_user(&UserPayload {
            email: Some("a@x.com".to_string()),
            ..UserPayload::new("Ann", "Lee", "customer")
        })
        .unwrap();
    assert_eq!(user, 1);

    let order = SqliteOrderRepository::new(&mut conn)
        .create_order(&OrderPayload {
            customer_id: Some(user),
            ..OrderPayload::new("Paint walls")
        })
        .unwrap();
    assert_eq!(order, 1);

    let mut offers = SqliteOfferRepository::new(&mut conn);
    let offer = offers.create_offer(&OfferPayload::new(order, user)).unwrap();
    assert_eq!(offer, 1);

    let err = offers
        .create_offer(&OfferPayload::new(99, user))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::ForeignKey { ref field, id: Some(99) } if field == "order_id"
    ));
    assert_eq!(offers.list_offers().unwrap().len(), 1);
}

#[test]
fn deleting_user_clears_order_references_and_removes_their_offers() {
    let mut conn = open_db_in_memory().unwrap();
    let mut users = SqliteUserRepository::new(&mut conn);
    let customer = users
        .create_user(&UserPayload::new("Ann", "Lee", "customer"))
        .unwrap();
    let executor = users
        .create_user(&UserPayload::new("Bo", "Kim", "executor"))
        .unwrap();

    let order = SqliteOrderRepository::new(&mut conn)
        .create_order(&OrderPayload {
            customer_id: Some(customer),
            executor_id: Some(executor),
            ..OrderPayload::new("Paint walls")
        })
        .unwrap();
    let offer = SqliteOfferRepository::new(&mut conn)
        .create_offer(&OfferPayload::new(order, executor))
        .unwrap();

    SqliteUserRepository::new(&mut conn)
        .delete_user(executor)
        .unwrap();

    let order_after = SqliteOrderRepository::new(&mut conn)
        .get_order(order)
        .unwrap();
    assert_eq!(order_after.customer_id, Some(customer));
    assert_eq!(order_after.executor_id, None);

    let err = SqliteOfferRepository::new(&mut conn)
        .get_offer(offer)
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound { .. }));
}

#[test]
fn deleting_order_removes_its_offers_only() {
    let mut conn = open_db_in_memory().unwrap();
    let executor = SqliteUserRepository::new(&mut conn)
        .create_user(&UserPayload::new("Bo", "Kim", "executor"))
        .unwrap();
    let mut orders = SqliteOrderRepository::new(&mut conn);
    let doomed = orders.create_order(&OrderPayload::new("Paint walls")).unwrap();
    let kept = orders.create_order(&OrderPayload::new("Fix sink")).unwrap();

    let mut offers = SqliteOfferRepository::new(&mut conn);
    offers
        .create_offer(&OfferPayload::new(doomed, executor))
        .unwrap();
    offers
        .create_offer(&OfferPayload::new(doomed, executor))
        .unwrap();
    let survivor = offers
        .create_offer(&OfferPayload::new(kept, executor))
        .unwrap();

    SqliteOrderRepository::new(&mut conn)
        .delete_order(doomed)
        .unwrap();

    assert_eq!(offer_count(&conn), 1);
    let remaining = SqliteOfferRepository::new(&mut conn).list_offers().unwrap();
    assert_eq!(remaining[0].id, survivor);
}

#[test]
fn no_dangling_references_after_mixed_deletes() {
    let mut conn = open_db_in_memory().unwrap();
    let mut users = SqliteUserRepository::new(&mut conn);
    let ann = users
        .create_user(&UserPayload::new("Ann", "Lee", "customer"))
        .unwrap();
    let bo = users
        .create_user(&UserPayload::new("Bo", "Kim", "executor"))
        .unwrap();

    let mut orders = SqliteOrderRepository::new(&mut conn);
    let first = orders
        .create_order(&OrderPayload {
            customer_id: Some(ann),
            executor_id: Some(bo),
            ..OrderPayload::new("Paint walls")
        })
        .unwrap();
    let second = orders
        .create_order(&OrderPayload {
            customer_id: Some(bo),
            ..OrderPayload::new("Fix sink")
        })
        .unwrap();

    let mut offers = SqliteOfferRepository::new(&mut conn);
    offers.create_offer(&OfferPayload::new(first, bo)).unwrap();
    offers.create_offer(&OfferPayload::new(second, ann)).unwrap();

    SqliteUserRepository::new(&mut conn).delete_user(ann).unwrap();
    SqliteOrderRepository::new(&mut conn)
        .delete_order(first)
        .unwrap();

    let dangling: i64 = conn
        .query_row(
            "SELECT
                (SELECT COUNT(*) FROM orders o
                 WHERE (o.customer_id IS NOT NULL
                        AND o.customer_id NOT IN (SELECT id FROM users))
                    OR (o.executor_id IS NOT NULL
                        AND o.executor_id NOT IN (SELECT id FROM users)))
              + (SELECT COUNT(*) FROM offers f
                 WHERE f.order_id NOT IN (SELECT id FROM orders)
                    OR f.executor_id NOT IN (SELECT id FROM users));",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(dangling, 0);
    assert_eq!(offer_count(&conn), 0);
}

#[test]
fn schema_rejects_dangling_offer_written_past_the_repository() {
    let conn = open_db_in_memory().unwrap();
    let err = conn
        .execute(
            "INSERT INTO offers (order_id, executor_id) VALUES (5, 6);",
            [],
        )
        .unwrap_err();
    let mapped = RepoError::from(err);
    assert!(matches!(mapped, RepoError::ForeignKey { id: None, .. }));
}

#[test]
fn order_create_racing_user_delete_sees_the_committed_delete() {
    let dir = tempfile::tempdir().unwrap();
    let db = Store::open(dir.path().join("race.sqlite3")).unwrap();

    let mut conn = db.connect().unwrap();
    let customer = SqliteUserRepository::new(&mut conn)
        .create_user(&UserPayload::new("Ann", "Lee", "customer"))
        .unwrap();

    let (locked_tx, locked_rx) = mpsc::channel::<()>();
    let writer_db = db.clone();
    let writer = thread::spawn(move || {
        locked_rx.recv().unwrap();
        let mut conn = writer_db.connect().unwrap();
        SqliteOrderRepository::new(&mut conn).create_order(&OrderPayload {
            customer_id: Some(customer),
            ..OrderPayload::new("Paint walls")
        })
    });

    with_transaction(&mut conn, "user_delete_held", |tx| {
        store::delete(tx, EntityKind::User, customer)?;
        locked_tx.send(()).unwrap();
        thread::sleep(HOLD_WRITE_LOCK);
        Ok(())
    })
    .unwrap();

    let err = writer.join().unwrap().unwrap_err();
    assert!(matches!(
        err,
        RepoError::ForeignKey { ref field, id: Some(id) } if field == "customer_id" && id == customer
    ));

    let orders: i64 = conn
        .query_row("SELECT COUNT(*) FROM orders;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(orders, 0);
}

#[test]
fn concurrent_writers_cannot_share_an_email() {
    let dir = tempfile::tempdir().unwrap();
    let db = Store::open(dir.path().join("race.sqlite3")).unwrap();
    let payload = UserPayload {
        email: Some("a@x.com".to_string()),
        ..UserPayload::new("Ann", "Lee", "customer")
    };

    let (locked_tx, locked_rx) = mpsc::channel::<()>();
    let writer_db = db.clone();
    let writer_payload = UserPayload {
        first_name: Some("Other".to_string()),
        ..payload.clone()
    };
    let writer = thread::spawn(move || {
        locked_rx.recv().unwrap();
        let mut conn = writer_db.connect().unwrap();
        SqliteUserRepository::new(&mut conn).create_user(&writer_payload)
    });

    let mut conn = db.connect().unwrap();
    let first = with_transaction(&mut conn, "user_create_held", |tx| {
        let columns = validate::user_columns(&payload)?;
        let id = store::insert(tx, EntityKind::User, &columns)?;
        locked_tx.send(()).unwrap();
        thread::sleep(HOLD_WRITE_LOCK);
        Ok(id)
    })
    .unwrap();

    let err = writer.join().unwrap().unwrap_err();
    assert!(matches!(err, RepoError::UniqueViolation { ref field } if field == "email"));

    let users = SqliteUserRepository::new(&mut conn).list_users().unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].id, first);
    assert_eq!(users[0].first_name, "Ann");
}
