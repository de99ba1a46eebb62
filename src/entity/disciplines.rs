//! Дисциплины

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "disciplines")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub type_id: i64,
    pub qualification_id: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::discipline_types::Entity",
        from = "Column::TypeId",
        to = "super::discipline_types::Column::Id"
    )]
    DisciplineType,
    #[sea_orm(
        belongs_to = "super::qualifications::Entity",
        from = "Column::QualificationId",
        to = "super::qualifications::Column::Id"
    )]
    Qualification,
    #[sea_orm(has_many = "super::discipline_users::Entity")]
    DisciplineUsers,
    #[sea_orm(has_many = "super::discipline_groups::Entity")]
    DisciplineGroups,
    #[sea_orm(has_many = "super::fos::Entity")]
    Fos,
}

impl Related<super::discipline_types::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DisciplineType.def()
    }
}

impl Related<super::qualifications::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Qualification.def()
    }
}

impl Related<super::discipline_users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DisciplineUsers.def()
    }
}

impl Related<super::discipline_groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DisciplineGroups.def()
    }
}

impl Related<super::fos::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Fos.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
