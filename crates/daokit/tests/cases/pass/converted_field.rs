use daokit::{Convert, Entity, NameMapper, Registry, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Active,
    Banned,
}

impl Convert for Status {
    type Storage = i32;

    fn to_storage_value(&self) -> i32 {
        match self {
            Self::Active => 1,
            Self::Banned => 2,
        }
    }

    fn from_storage_value(value: i32) -> Option<Self> {
        match value {
            1 => Some(Self::Active),
            2 => Some(Self::Banned),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Entity)]
#[dao(table = "members")]
pub struct Member {
    pub id: Option<i64>,
    #[dao(convert)]
    pub status: Option<Status>,
}

fn main() {
    let registry = Registry::<Member>::register(Some(&NameMapper::snake_case()), false).unwrap();
    let column = registry.column("status").unwrap();
    assert!(column.converter().is_some());

    let member = Member { id: None, status: Some(Status::Banned) };
    assert_eq!(registry.read(&member, column), Value::I32(2));
}
