//! Квалификации (справочник)

use sea_orm::entity::prelude::*;

use super::timestamp_to_datetime;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "qualifications")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_dictionary_item(self) -> crate::models::dictionaries::DictionaryItem {
        crate::models::dictionaries::DictionaryItem {
            id: self.id,
            name: self.name,
            created_at: timestamp_to_datetime(self.created_at),
            updated_at: timestamp_to_datetime(self.updated_at),
        }
    }

    pub fn into_named_ref(self) -> crate::models::NamedRef {
        crate::models::NamedRef {
            id: self.id,
            name: self.name,
        }
    }
}
