//! Документы ФОС

use sea_orm::entity::prelude::*;

use super::timestamp_to_datetime;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "documents")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub fos_id: i64,
    pub path: Option<String>,
    pub original_name: Option<String>,
    pub file_size: i64,
    pub content_type: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::fos::Entity",
        from = "Column::FosId",
        to = "super::fos::Column::Id"
    )]
    Fos,
}

impl Related<super::fos::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Fos.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_document(self) -> crate::models::documents::Document {
        crate::models::documents::Document {
            id: self.id,
            name: self.name,
            fos_id: self.fos_id,
            path: self.path,
            original_name: self.original_name,
            file_size: self.file_size,
            content_type: self.content_type,
            created_at: timestamp_to_datetime(self.created_at),
            updated_at: timestamp_to_datetime(self.updated_at),
        }
    }
}
