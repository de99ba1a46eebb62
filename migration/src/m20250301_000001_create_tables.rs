use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Пользователи (преподаватели и администраторы)
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::Role).string().not_null())
                    .col(ColumnDef::new(Users::Status).string().not_null())
                    .col(ColumnDef::new(Users::DisplayName).string().null())
                    .col(ColumnDef::new(Users::LastLogin).big_integer().null())
                    .col(ColumnDef::new(Users::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Users::UpdatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // Справочники: типы ФОС, типы дисциплин, квалификации
        create_dictionary_table(manager, FosTypes::Table).await?;
        create_dictionary_table(manager, DisciplineTypes::Table).await?;
        create_dictionary_table(manager, Qualifications::Table).await?;

        // Группы
        manager
            .create_table(
                Table::create()
                    .table(Groups::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Groups::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Groups::Name).string().not_null())
                    .col(ColumnDef::new(Groups::Course).integer().not_null())
                    .col(ColumnDef::new(Groups::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Groups::UpdatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // Дисциплины
        manager
            .create_table(
                Table::create()
                    .table(Disciplines::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Disciplines::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Disciplines::Name).string().not_null())
                    .col(ColumnDef::new(Disciplines::TypeId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Disciplines::QualificationId)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Disciplines::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Disciplines::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Disciplines::Table, Disciplines::TypeId)
                            .to(DisciplineTypes::Table, DictionaryColumn::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Disciplines::Table, Disciplines::QualificationId)
                            .to(Qualifications::Table, DictionaryColumn::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // Преподаватели дисциплины (M2M)
        manager
            .create_table(
                Table::create()
                    .table(DisciplineUsers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DisciplineUsers::DisciplineId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DisciplineUsers::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(DisciplineUsers::DisciplineId)
                            .col(DisciplineUsers::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(DisciplineUsers::Table, DisciplineUsers::DisciplineId)
                            .to(Disciplines::Table, Disciplines::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(DisciplineUsers::Table, DisciplineUsers::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Группы дисциплины (M2M)
        manager
            .create_table(
                Table::create()
                    .table(DisciplineGroups::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DisciplineGroups::DisciplineId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DisciplineGroups::GroupId)
                            .big_integer()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(DisciplineGroups::DisciplineId)
                            .col(DisciplineGroups::GroupId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(DisciplineGroups::Table, DisciplineGroups::DisciplineId)
                            .to(Disciplines::Table, Disciplines::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(DisciplineGroups::Table, DisciplineGroups::GroupId)
                            .to(Groups::Table, Groups::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Фонды оценочных средств
        manager
            .create_table(
                Table::create()
                    .table(Fos::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Fos::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Fos::Name).string().not_null())
                    .col(ColumnDef::new(Fos::Description).text().null())
                    .col(ColumnDef::new(Fos::TypeId).big_integer().not_null())
                    .col(ColumnDef::new(Fos::DisciplineId).big_integer().not_null())
                    .col(ColumnDef::new(Fos::Year).string_len(9).null())
                    .col(ColumnDef::new(Fos::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Fos::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Fos::Table, Fos::TypeId)
                            .to(FosTypes::Table, DictionaryColumn::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Fos::Table, Fos::DisciplineId)
                            .to(Disciplines::Table, Disciplines::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Документы ФОС
        manager
            .create_table(
                Table::create()
                    .table(Documents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Documents::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Documents::Name).string().not_null())
                    .col(ColumnDef::new(Documents::FosId).big_integer().not_null())
                    .col(ColumnDef::new(Documents::Path).string().null())
                    .col(ColumnDef::new(Documents::OriginalName).string().null())
                    .col(
                        ColumnDef::new(Documents::FileSize)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Documents::ContentType).string().null())
                    .col(ColumnDef::new(Documents::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Documents::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Documents::Table, Documents::FosId)
                            .to(Fos::Table, Fos::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Индексы для фильтров списков
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_fos_discipline_id")
                    .table(Fos::Table)
                    .col(Fos::DisciplineId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_fos_year")
                    .table(Fos::Table)
                    .col(Fos::Year)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_documents_fos_id")
                    .table(Documents::Table)
                    .col(Documents::FosId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_discipline_users_user_id")
                    .table(DisciplineUsers::Table)
                    .col(DisciplineUsers::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Documents::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Fos::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DisciplineGroups::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DisciplineUsers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Disciplines::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Groups::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Qualifications::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DisciplineTypes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FosTypes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}

/// Все справочники устроены одинаково: id, name, created_at, updated_at
async fn create_dictionary_table<T>(manager: &SchemaManager<'_>, table: T) -> Result<(), DbErr>
where
    T: IntoIden + 'static,
{
    manager
        .create_table(
            Table::create()
                .table(table)
                .if_not_exists()
                .col(
                    ColumnDef::new(DictionaryColumn::Id)
                        .big_integer()
                        .not_null()
                        .auto_increment()
                        .primary_key(),
                )
                .col(
                    ColumnDef::new(DictionaryColumn::Name)
                        .string_len(255)
                        .not_null(),
                )
                .col(
                    ColumnDef::new(DictionaryColumn::CreatedAt)
                        .big_integer()
                        .not_null(),
                )
                .col(
                    ColumnDef::new(DictionaryColumn::UpdatedAt)
                        .big_integer()
                        .not_null(),
                )
                .to_owned(),
        )
        .await
}

#[derive(DeriveIden)]
enum Users {
    #[sea_orm(iden = "users")]
    Table,
    Id,
    Username,
    Email,
    PasswordHash,
    Role,
    Status,
    DisplayName,
    LastLogin,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum DictionaryColumn {
    Id,
    Name,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum FosTypes {
    #[sea_orm(iden = "fos_types")]
    Table,
}

#[derive(DeriveIden)]
enum DisciplineTypes {
    #[sea_orm(iden = "discipline_types")]
    Table,
}

#[derive(DeriveIden)]
enum Qualifications {
    #[sea_orm(iden = "qualifications")]
    Table,
}

#[derive(DeriveIden)]
enum Groups {
    #[sea_orm(iden = "groups")]
    Table,
    Id,
    Name,
    Course,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Disciplines {
    #[sea_orm(iden = "disciplines")]
    Table,
    Id,
    Name,
    TypeId,
    QualificationId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum DisciplineUsers {
    #[sea_orm(iden = "discipline_users")]
    Table,
    DisciplineId,
    UserId,
}

#[derive(DeriveIden)]
enum DisciplineGroups {
    #[sea_orm(iden = "discipline_groups")]
    Table,
    DisciplineId,
    GroupId,
}

#[derive(DeriveIden)]
enum Fos {
    #[sea_orm(iden = "fos")]
    Table,
    Id,
    Name,
    Description,
    TypeId,
    DisciplineId,
    Year,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Documents {
    #[sea_orm(iden = "documents")]
    Table,
    Id,
    Name,
    FosId,
    Path,
    OriginalName,
    FileSize,
    ContentType,
    CreatedAt,
    UpdatedAt,
}
