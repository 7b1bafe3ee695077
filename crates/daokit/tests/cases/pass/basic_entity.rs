use daokit::{Entity, NameMapper, Registry};

#[derive(Debug, Default, Entity)]
#[dao(table = "users")]
pub struct User {
    #[dao(tag = "auto")]
    pub id: Option<i64>,
    pub user_name: Option<String>,
    pub age: Option<i32>,
}

fn main() {
    assert_eq!(User::table(), "users");

    let registry = Registry::<User>::register(Some(&NameMapper::snake_case()), false).unwrap();
    assert_eq!(registry.column_names(), ["id", "user_name", "age"]);
    assert_eq!(registry.joined_columns(), "id,user_name,age");
    assert!(registry.is_auto_column("id"));
}
