//! Учебные группы

use sea_orm::entity::prelude::*;

use super::timestamp_to_datetime;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "groups")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub course: i32,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::discipline_groups::Entity")]
    DisciplineGroups,
}

impl Related<super::discipline_groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DisciplineGroups.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_group(self) -> crate::models::groups::Group {
        crate::models::groups::Group {
            id: self.id,
            name: self.name,
            course: self.course,
            created_at: timestamp_to_datetime(self.created_at),
            updated_at: timestamp_to_datetime(self.updated_at),
        }
    }
}
