//! `SeaQuery` / `SeaModel` against an in-memory SQLite database.

use datatable_core::{Queryable, SortDir, TableError, TableResponder, DISALLOW_ORDERING_BY};
use datatable_db::{connect, ComputedAttributes, ConnectOpts, SeaModel, SeaQuery};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Schema, Set,
};
use serde_json::json;

mod users {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "users")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i32,
        pub first_name: String,
        pub last_name: String,
        pub active: bool,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

impl ComputedAttributes for users::Entity {
    fn computed_attributes() -> &'static [&'static str] {
        &["fullName", "isActive"]
    }
}

async fn seeded() -> DatabaseConnection {
    let conn = connect("sqlite::memory:", ConnectOpts::default())
        .await
        .unwrap();
    let backend = conn.get_database_backend();
    let stmt = Schema::new(backend).create_table_from_entity(users::Entity);
    conn.execute(backend.build(&stmt)).await.unwrap();

    for (first, last, active) in [
        ("Ada", "Lovelace", true),
        ("Alan", "Turing", false),
        ("Grace", "Hopper", true),
        ("Ada", "Byron", true),
    ] {
        users::ActiveModel {
            first_name: Set(first.to_string()),
            last_name: Set(last.to_string()),
            active: Set(active),
            ..Default::default()
        }
        .insert(&conn)
        .await
        .unwrap();
    }
    conn
}

fn ids(rows: &[users::Model]) -> Vec<i32> {
    rows.iter().map(|r| r.id).collect()
}

#[tokio::test]
async fn orders_by_entity_column() {
    let conn = seeded().await;
    let mut q = SeaQuery::<users::Entity>::find(conn);
    q.order_by("last_name", SortDir::Asc);

    let page = q.paginate(1, 10).await.unwrap();
    assert_eq!(ids(&page.items), vec![4, 3, 1, 2]);
    assert_eq!(page.page_info.total, 4);
    assert_eq!(page.page_info.last_page, 1);
}

#[tokio::test]
async fn pages_are_one_based() {
    let conn = seeded().await;
    let mut q = SeaQuery::<users::Entity>::find(conn);
    q.order_by("id", SortDir::Desc);

    let page = q.paginate(2, 3).await.unwrap();
    assert_eq!(ids(&page.items), vec![1]);
    assert_eq!(page.page_info.page, 2);
    assert_eq!(page.page_info.per_page, 3);
    assert_eq!(page.page_info.last_page, 2);

    let beyond = q.paginate(9, 3).await.unwrap();
    assert!(beyond.items.is_empty());
    assert_eq!(beyond.page_info.total, 4);
}

#[tokio::test]
async fn unknown_column_is_rendered_and_rejected_by_database() {
    let conn = seeded().await;
    let mut q = SeaQuery::<users::Entity>::find(conn);
    q.order_by("shoe_size", SortDir::Asc);

    assert!(q.to_sql().contains("\"users\".\"shoe_size\" ASC"));
    assert!(q.paginate(1, 10).await.is_err());
}

#[test]
fn model_is_named_after_table() {
    use datatable_core::TableModel;

    // A disconnected handle is enough to inspect the model.
    let model = SeaModel::<users::Entity>::new(DatabaseConnection::Disconnected);
    assert_eq!(model.name(), "users");
    assert_eq!(model.computed_attributes(), vec!["fullName", "isActive"]);
}

#[test]
fn debug_does_not_need_a_live_connection() {
    let mut q = SeaQuery::<users::Entity>::find(DatabaseConnection::Disconnected);
    q.order_by("last_name", SortDir::Desc);
    let rendered = format!("{q:?}");
    assert!(rendered.starts_with("SeaQuery"));
}

#[tokio::test]
async fn generic_sort_on_computed_column_fails_in_store() {
    let conn = seeded().await;
    let err = TableResponder::for_model(SeaModel::<users::Entity>::new(conn))
        .per_page(2)
        .build()
        .unwrap()
        .respond(&[("orderByField", "full_name"), ("orderByDirection", "desc")])
        .await
        .unwrap_err();

    assert!(matches!(err, TableError::Store(_)));
}

#[tokio::test]
async fn override_sort_on_computed_column() {
    let conn = seeded().await;
    let resp = TableResponder::for_model(SeaModel::<users::Entity>::new(conn))
        .per_page(2)
        .meta("label", "Users")
        .override_order_by("full_name", |q: &mut SeaQuery<users::Entity>, dir| {
            q.order_by_column(users::Column::FirstName, dir)
                .order_by_column(users::Column::LastName, dir);
            Ok(())
        })
        .build()
        .unwrap()
        .respond(&[("orderByField", "full_name"), ("orderByDirection", "asc")])
        .await
        .unwrap();

    assert_eq!(ids(&resp.data), vec![4, 1]);
    assert_eq!(resp.page_info.total, 4);
    assert_eq!(
        serde_json::to_value(&resp.meta).unwrap(),
        json!({"label": "Users", "disallow_ordering_by": ["is_active"]})
    );
}

#[tokio::test]
async fn query_hook_filters_before_counting() {
    let conn = seeded().await;
    let resp = TableResponder::for_model(SeaModel::<users::Entity>::new(conn))
        .query(|q: &mut SeaQuery<users::Entity>| {
            q.filter(users::Column::Active.eq(true));
            Ok(())
        })
        .meta_with("sql", |q: &SeaQuery<users::Entity>, _| Ok(json!(q.to_sql())))
        .build()
        .unwrap()
        .respond(&[("orderByField", "first_name"), ("orderByDirection", "DESC")])
        .await
        .unwrap();

    assert_eq!(resp.page_info.total, 3);
    assert_eq!(resp.data[0].first_name, "Grace");
    let sql = resp.meta["sql"].as_str().unwrap();
    assert!(sql.contains("WHERE"));
    assert!(sql.contains("ORDER BY"));
}

#[tokio::test]
async fn raw_query_source_reports_no_disallowed_fields() {
    let conn = seeded().await;
    let select = users::Entity::find().filter(users::Column::FirstName.eq("Ada"));
    let resp = TableResponder::for_query(SeaQuery::new(select, conn))
        .build()
        .unwrap()
        .respond(&[("page", "1")])
        .await
        .unwrap();

    assert_eq!(resp.page_info.total, 2);
    assert_eq!(resp.meta[DISALLOW_ORDERING_BY], json!([]));
}
