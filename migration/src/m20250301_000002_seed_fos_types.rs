use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Типы ФОС по умолчанию
const DEFAULT_FOS_TYPES: [&str; 9] = [
    "Вопросы к зачету / экзамену",
    "Задание для опроса",
    "Тестовое задание",
    "Лабораторное задание",
    "Практическое задание",
    "Расчетные задачи",
    "Реферат",
    "Индивидуальное задание",
    "Курсовой проект",
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or_default();

        for name in DEFAULT_FOS_TYPES {
            let insert = Query::insert()
                .into_table(FosTypes::Table)
                .columns([FosTypes::Name, FosTypes::CreatedAt, FosTypes::UpdatedAt])
                .values_panic([name.into(), now.into(), now.into()])
                .to_owned();

            manager.exec_stmt(insert).await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let delete = Query::delete()
            .from_table(FosTypes::Table)
            .and_where(Expr::col(FosTypes::Name).is_in(DEFAULT_FOS_TYPES))
            .to_owned();

        manager.exec_stmt(delete).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum FosTypes {
    #[sea_orm(iden = "fos_types")]
    Table,
    Name,
    CreatedAt,
    UpdatedAt,
}
