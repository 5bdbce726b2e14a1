use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20260301_000001_create_jobs_table::Migration)]
    }
}

mod m20260301_000001_create_jobs_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20260301_000001_create_jobs_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Jobs::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Jobs::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Jobs::Tenant).string().not_null())
                        .col(ColumnDef::new(Jobs::Code).string().not_null())
                        .col(ColumnDef::new(Jobs::Title).json().not_null())
                        .col(ColumnDef::new(Jobs::Description).json().not_null())
                        .col(ColumnDef::new(Jobs::Source).string().not_null())
                        .col(ColumnDef::new(Jobs::Status).string().not_null())
                        .col(ColumnDef::new(Jobs::Priority).integer().not_null())
                        .col(ColumnDef::new(Jobs::Tags).json().not_null())
                        .col(
                            ColumnDef::new(Jobs::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Jobs::ApartmentId).uuid().null())
                        .col(ColumnDef::new(Jobs::ServiceId).uuid().null())
                        .col(ColumnDef::new(Jobs::ContractId).uuid().null())
                        .col(ColumnDef::new(Jobs::CategoryId).uuid().null())
                        .col(
                            ColumnDef::new(Jobs::PlannedStart)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Jobs::PlannedEnd)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(ColumnDef::new(Jobs::DueAt).timestamp_with_time_zone().null())
                        .col(
                            ColumnDef::new(Jobs::StartedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Jobs::PausedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Jobs::ResumedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Jobs::CompletedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Jobs::CancelledAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Jobs::AccruedSeconds)
                                .big_integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Jobs::ActualDurationMinutes).big_integer().null())
                        .col(ColumnDef::new(Jobs::OnTime).boolean().null())
                        .col(ColumnDef::new(Jobs::AssigneeIds).string().not_null())
                        .col(ColumnDef::new(Jobs::Assignments).json().not_null())
                        .col(ColumnDef::new(Jobs::Steps).json().not_null())
                        .col(ColumnDef::new(Jobs::Materials).json().not_null())
                        .col(ColumnDef::new(Jobs::Deliverables).json().null())
                        .col(ColumnDef::new(Jobs::Finance).json().not_null())
                        .col(ColumnDef::new(Jobs::PauseReason).string().null())
                        .col(ColumnDef::new(Jobs::CancelReason).string().null())
                        .col(ColumnDef::new(Jobs::SearchText).string().not_null())
                        .col(
                            ColumnDef::new(Jobs::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Jobs::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Jobs::Version)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_jobs_tenant_code")
                        .table(Jobs::Table)
                        .col(Jobs::Tenant)
                        .col(Jobs::Code)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_jobs_status")
                        .table(Jobs::Table)
                        .col(Jobs::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_jobs_due_at")
                        .table(Jobs::Table)
                        .col(Jobs::DueAt)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Jobs::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Jobs {
        Table,
        Id,
        Tenant,
        Code,
        Title,
        Description,
        Source,
        Status,
        Priority,
        Tags,
        IsActive,
        ApartmentId,
        ServiceId,
        ContractId,
        CategoryId,
        PlannedStart,
        PlannedEnd,
        DueAt,
        StartedAt,
        PausedAt,
        ResumedAt,
        CompletedAt,
        CancelledAt,
        AccruedSeconds,
        ActualDurationMinutes,
        OnTime,
        AssigneeIds,
        Assignments,
        Steps,
        Materials,
        Deliverables,
        Finance,
        PauseReason,
        CancelReason,
        SearchText,
        CreatedAt,
        UpdatedAt,
        Version,
    }
}
