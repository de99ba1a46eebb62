//! Реэкспорт сущностей

pub use super::discipline_groups::Entity as DisciplineGroups;
pub use super::discipline_types::Entity as DisciplineTypes;
pub use super::discipline_users::Entity as DisciplineUsers;
pub use super::disciplines::{
    ActiveModel as DisciplineActiveModel, Entity as Disciplines, Model as DisciplineModel,
};
pub use super::documents::{
    ActiveModel as DocumentActiveModel, Entity as Documents, Model as DocumentModel,
};
pub use super::fos::{ActiveModel as FosActiveModel, Entity as Fos, Model as FosModel};
pub use super::fos_types::Entity as FosTypes;
pub use super::groups::{ActiveModel as GroupActiveModel, Entity as Groups, Model as GroupModel};
pub use super::qualifications::Entity as Qualifications;
pub use super::users::{ActiveModel as UserActiveModel, Entity as Users, Model as UserModel};
