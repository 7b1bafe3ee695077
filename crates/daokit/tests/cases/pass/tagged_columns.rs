use daokit::{Entity, NameMapper, Registry};

#[derive(Debug, Default, Entity)]
#[dao(table = "accounts")]
pub struct Account {
    #[dao(tag = "column=account_id;auto=2")]
    pub id: Option<i64>,
    #[dao(tag = "column=login")]
    pub name: Option<String>,
    pub r#type: Option<String>,
    pub tags: Option<Vec<String>>,
}

fn main() {
    let registry = Registry::<Account>::register(Some(&NameMapper::snake_case()), false).unwrap();
    assert_eq!(registry.column_names(), ["account_id", "login", "type", "tags"]);
    assert_eq!(registry.auto_step(), 2);

    let tagged_only = Registry::<Account>::register(None, false).unwrap();
    assert_eq!(tagged_only.column_names(), ["account_id", "login"]);
}
