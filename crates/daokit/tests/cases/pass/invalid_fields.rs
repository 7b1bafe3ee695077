use daokit::{Entity, NameMapper, Registry, RegistryError};

#[derive(Debug, Default)]
pub struct Audit {
    pub created_by: Option<String>,
}

#[derive(Debug, Default, Entity)]
#[dao(table = "notes")]
pub struct Note {
    pub id: Option<i64>,
    pub revision: u32,
    secret: Option<String>,
    #[dao(embedded)]
    pub audit: Audit,
}

fn main() {
    let mapper = NameMapper::snake_case();

    let err = Registry::<Note>::register(Some(&mapper), false).unwrap_err();
    assert_eq!(
        err,
        RegistryError::UnsupportedFieldKind { field: "revision", type_name: "u32" }
    );

    let registry = Registry::<Note>::register(Some(&mapper), true).unwrap();
    assert_eq!(registry.column_names(), ["id"]);

    let _ = Note::default().secret;
}
