// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! End-to-end DAO tests over a derived entity and an in-memory executor.

use std::{collections::VecDeque, sync::Mutex};

use chrono::{TimeZone, Utc};
use daokit::{
    COMMA, Dao, DaoConfig, DaoError, Entity, ExecResult, Executor, IdProtocol, PlaceholderStyle,
    Rows, Separator, Value, async_trait
};

#[derive(Debug, Default, Clone, PartialEq, Entity)]
#[dao(table = "users")]
pub struct User {
    #[dao(tag = "auto")]
    pub id:         Option<i64>,
    pub user_name:  Option<String>,
    pub age:        Option<i32>,
    pub created_at: Option<chrono::DateTime<Utc>>
}

#[derive(Debug, thiserror::Error)]
#[error("connection reset")]
struct Reset;

enum Reply {
    Rows(Rows),
    Done(ExecResult),
    Fail
}

/// Replays canned replies and records every statement.
#[derive(Default)]
struct Memory {
    calls:   Mutex<Vec<(String, Vec<Value>)>>,
    replies: Mutex<VecDeque<Reply>>
}

impl Memory {
    fn with(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            calls:   Mutex::new(Vec::new()),
            replies: Mutex::new(replies.into_iter().collect())
        }
    }

    fn calls(&self) -> Vec<(String, Vec<Value>)> {
        self.calls.lock().unwrap().clone()
    }

    fn next(&self, sql: &str, args: &[Value]) -> Option<Reply> {
        self.calls.lock().unwrap().push((sql.to_owned(), args.to_vec()));
        self.replies.lock().unwrap().pop_front()
    }
}

#[async_trait]
impl Executor for Memory {
    type Error = Reset;

    async fn query(&self, sql: &str, args: &[Value]) -> Result<Rows, Reset> {
        match self.next(sql, args) {
            Some(Reply::Rows(rows)) => Ok(rows),
            Some(Reply::Fail) => Err(Reset),
            _ => Ok(Rows::default())
        }
    }

    async fn execute(&self, sql: &str, args: &[Value]) -> Result<ExecResult, Reset> {
        match self.next(sql, args) {
            Some(Reply::Done(done)) => Ok(done),
            Some(Reply::Fail) => Err(Reset),
            _ => Ok(ExecResult::new(0))
        }
    }
}

fn dao() -> Dao<User> {
    Dao::new(DaoConfig::default()).unwrap()
}

fn ann() -> User {
    User {
        user_name: Some("ann".into()),
        age: Some(30),
        ..User::default()
    }
}

#[tokio::test]
async fn insert_writes_generated_id_back() {
    let db = Memory::with([Reply::Done(ExecResult::new(1).with_last_insert_id(Some(7)))]);
    let mut user = ann();

    let affected = dao().insert(&db, &mut user).await.unwrap();

    assert_eq!(affected, 1);
    assert_eq!(user.id, Some(7));
    let calls = db.calls();
    assert_eq!(calls[0].0, "INSERT INTO users(user_name,age,created_at) VALUES (?,?,?)");
    assert_eq!(calls[0].1, [Value::from("ann"), Value::I32(30), Value::Null]);
}

#[tokio::test]
async fn batch_insert_with_dollar_placeholders() {
    let db = Memory::with([Reply::Done(ExecResult::new(2).with_last_insert_id(Some(100)))]);
    let dao = Dao::<User>::new(DaoConfig::default().with_placeholder(PlaceholderStyle::dollar())).unwrap();
    let mut users = vec![ann(), User {
        user_name: Some("bob".into()),
        ..User::default()
    }];

    dao.insert_batch(&db, &mut users).await.unwrap();

    assert_eq!(users[0].id, Some(100));
    assert_eq!(users[1].id, Some(101));
    assert_eq!(
        db.calls()[0].0,
        "INSERT INTO users(user_name,age,created_at) VALUES ($1,$2,$3),($4,$5,$6)"
    );
}

#[tokio::test]
async fn sparse_insert_skips_holes() {
    let db = Memory::with([Reply::Done(ExecResult::new(2).with_last_insert_id(Some(30)))]);
    let dao = Dao::<User>::new(DaoConfig::default().with_id_protocol(IdProtocol::LastId)).unwrap();
    let mut slots = vec![Some(ann()), None, Some(ann())];

    dao.insert_sparse(&db, &mut slots).await.unwrap();

    assert_eq!(slots[0].as_ref().and_then(|u| u.id), Some(29));
    assert!(slots[1].is_none());
    assert_eq!(slots[2].as_ref().and_then(|u| u.id), Some(30));
}

#[tokio::test]
async fn returning_protocol_reads_ids_from_rows() {
    let db = Memory::with([Reply::Rows(Rows::new(["id"], vec![vec![Value::I64(5)]]))]);
    let dao = Dao::<User>::new(DaoConfig::default().with_id_protocol(IdProtocol::Returning)).unwrap();
    let mut user = ann();

    dao.insert(&db, &mut user).await.unwrap();

    assert_eq!(user.id, Some(5));
    assert!(db.calls()[0].0.ends_with(" RETURNING id"));
}

#[tokio::test]
async fn query_binds_rows_by_column_name() {
    let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let rows = Rows::new(["age", "id", "extra", "user_name", "created_at"], vec![
        vec![Value::I32(41), Value::I64(1), Value::from("ignored"), Value::from("cy"), Value::Timestamp(at)],
        vec![Value::Null, Value::I64(2), Value::Null, Value::from("di"), Value::Null],
    ]);
    let db = Memory::with([Reply::Rows(rows)]);

    let users = dao()
        .query(&db, |b| {
            let columns = b.registry().joined_columns();
            b.write("SELECT ").write(columns).write(" FROM users WHERE age>");
            b.bind(18);
        })
        .await
        .unwrap();

    assert_eq!(users.len(), 2);
    assert_eq!(users[0], User {
        id:         Some(1),
        user_name:  Some("cy".into()),
        age:        Some(41),
        created_at: Some(at)
    });
    assert_eq!(users[1].age, None);
    assert_eq!(db.calls()[0].0, "SELECT id,user_name,age,created_at FROM users WHERE age>?");
}

#[tokio::test]
async fn exec_with_writes_custom_upsert_over_bound_entities() {
    let db = Memory::with([Reply::Done(ExecResult::new(2))]);
    let ann = User {
        id: Some(1),
        ..ann()
    };
    let bob = User {
        id: Some(2),
        user_name: Some("bob".into()),
        ..User::default()
    };
    let dao = dao();

    let affected = dao
        .exec_with(&db, [Some(&ann), None, Some(&bob)], |b| {
            let columns = b.columns(true, &[]).join(",");
            let table = b.table();
            b.write("INSERT INTO ").write(table).write("(").write(&columns).write(")");
            b.each_entity(Separator::fix(" VALUES ", ",", "", false), None, |b, _, _, user| {
                b.write("(");
                b.each_column(user, COMMA, &["created_at"], |b, _, _, value| {
                    b.bind(value);
                });
                b.write(")");
            });
            b.write(" ON CONFLICT(id) DO NOTHING");
        })
        .await
        .unwrap();

    assert_eq!(affected, 2);
    let calls = db.calls();
    assert_eq!(
        calls[0].0,
        "INSERT INTO users(id,user_name,age) VALUES (?,?,?),(?,?,?) ON CONFLICT(id) DO NOTHING"
    );
    assert_eq!(calls[0].1, [
        Value::I64(1),
        Value::from("ann"),
        Value::I32(30),
        Value::I64(2),
        Value::from("bob"),
        Value::Null
    ]);
}

#[tokio::test]
async fn query_with_filters_on_bound_entity() {
    let db = Memory::with([Reply::Rows(Rows::new(["id", "user_name"], vec![vec![
        Value::I64(9),
        Value::from("ann"),
    ]]))]);
    let filter = ann();
    let dao = dao();

    let users = dao
        .query_with(&db, [Some(&filter)], |b| {
            let registry = b.registry();
            let Some(user) = b.entity() else {
                b.set_ok(false);
                return;
            };
            b.write("SELECT id,user_name FROM users WHERE ");
            for (i, name) in b.columns(true, &[]).into_iter().enumerate() {
                if i > 0 {
                    b.write(" AND ");
                }
                b.write(name).write("=");
                b.bind(registry.column(name).map_or(Value::Null, |column| registry.read(user, column)));
            }
        })
        .await
        .unwrap();

    assert_eq!(users.len(), 1);
    assert_eq!(users[0].id, Some(9));
    let calls = db.calls();
    assert_eq!(calls[0].0, "SELECT id,user_name FROM users WHERE user_name=? AND age=?");
    assert_eq!(calls[0].1, [Value::from("ann"), Value::I32(30)]);
}

#[tokio::test]
async fn update_without_assigned_columns_is_skipped() {
    let db = Memory::default();
    let user = User::default();

    let affected = dao()
        .update(&db, &user, |b| {
            b.write_where_eq("id", 1_i64);
        })
        .await
        .unwrap();

    assert_eq!(affected, 0);
    assert!(db.calls().is_empty());
}

#[tokio::test]
async fn update_writes_set_and_filter() {
    let db = Memory::with([Reply::Done(ExecResult::new(1))]);
    let user = User {
        id: Some(3),
        age: Some(31),
        ..User::default()
    };

    dao()
        .update(&db, &user, |b| {
            b.write_where_eq("id", 3_i64);
        })
        .await
        .unwrap();

    let calls = db.calls();
    assert_eq!(calls[0].0, "UPDATE users SET age=? WHERE id=?");
    assert_eq!(calls[0].1, [Value::I32(31), Value::I64(3)]);
}

#[tokio::test]
async fn build_error_never_reaches_executor() {
    let db = Memory::default();

    let err = dao()
        .delete(&db, |b| {
            b.set_error("refusing unfiltered delete");
        })
        .await
        .unwrap_err();

    assert!(err.is_build());
    assert!(db.calls().is_empty());
}

#[tokio::test]
async fn driver_errors_are_wrapped() {
    let db = Memory::with([Reply::Fail]);

    let err = dao()
        .count(&db, |b| {
            b.write("SELECT COUNT(*) FROM users");
        })
        .await
        .unwrap_err();

    assert!(matches!(err, DaoError::Driver(_)));
}

#[test]
fn derived_table_name() {
    assert_eq!(User::table(), "users");
    assert_eq!(dao().table(), "users");
}
