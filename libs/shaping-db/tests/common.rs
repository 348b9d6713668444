#![allow(dead_code)]
use anyhow::Result;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbBackend, EntityTrait, Schema,
    Set,
};
use shaping_core::FieldKind;
use shaping_db::FieldMap;

pub mod department {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "department")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: i32,
        pub code: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod employee {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "employee")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: i32,
        pub name: String,
        pub status: String,
        pub age: i64,
        pub department_id: Option<i32>,
        pub manager_id: Option<i32>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::department::Entity",
            from = "Column::DepartmentId",
            to = "super::department::Column::Id"
        )]
        Department,
    }

    impl Related<super::department::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Department.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn employee_fields() -> FieldMap<employee::Entity> {
    FieldMap::<employee::Entity>::new()
        .insert("id", employee::Column::Id, FieldKind::I64)
        .insert("name", employee::Column::Name, FieldKind::String)
        .insert("status", employee::Column::Status, FieldKind::String)
        .insert("age", employee::Column::Age, FieldKind::I64)
        .insert("manager", employee::Column::ManagerId, FieldKind::I64)
        .nested(
            "department",
            FieldMap::<department::Entity>::new().insert(
                "code",
                department::Column::Code,
                FieldKind::String,
            ),
        )
}

fn emp(
    id: i32,
    name: &str,
    status: &str,
    age: i64,
    department_id: Option<i32>,
    manager_id: Option<i32>,
) -> employee::ActiveModel {
    employee::ActiveModel {
        id: Set(id),
        name: Set(name.to_owned()),
        status: Set(status.to_owned()),
        age: Set(age),
        department_id: Set(department_id),
        manager_id: Set(manager_id),
    }
}

/// In-memory SQLite with two departments and five employees:
///
/// | id | name     | status   | age | dept | manager |
/// |----|----------|----------|-----|------|---------|
/// | 1  | Ada      | active   | 36  | ENG  | -       |
/// | 2  | Grace    | active   | 45  | ENG  | 1       |
/// | 3  | Linus    | leave    | 28  | OPS  | 1       |
/// | 4  | Margaret | inactive | 52  | OPS  | -       |
/// | 5  | Alan     | active   | 41  | -    | 4       |
pub async fn seeded_db() -> Result<DatabaseConnection> {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1).sqlx_logging(false);
    let db = Database::connect(opts).await?;

    let schema = Schema::new(DbBackend::Sqlite);
    let backend = db.get_database_backend();
    db.execute(backend.build(&schema.create_table_from_entity(department::Entity)))
        .await?;
    db.execute(backend.build(&schema.create_table_from_entity(employee::Entity)))
        .await?;

    department::Entity::insert_many([
        department::ActiveModel {
            id: Set(1),
            code: Set("ENG".into()),
        },
        department::ActiveModel {
            id: Set(2),
            code: Set("OPS".into()),
        },
    ])
    .exec(&db)
    .await?;

    employee::Entity::insert_many([
        emp(1, "Ada", "active", 36, Some(1), None),
        emp(2, "Grace", "active", 45, Some(1), Some(1)),
        emp(3, "Linus", "leave", 28, Some(2), Some(1)),
        emp(4, "Margaret", "inactive", 52, Some(2), None),
        emp(5, "Alan", "active", 41, None, Some(4)),
    ])
    .exec(&db)
    .await?;

    Ok(db)
}

pub fn names(rows: &[employee::Model]) -> Vec<&str> {
    rows.iter().map(|m| m.name.as_str()).collect()
}
