//! 维护任务相关表迁移
//!
//! - unique_views: 每日独立访客快照
//! - resources: 接口资源（从 API 文档导入）
//! - role_resources: 角色与资源关联，(role_id, resource_id) 唯一
//! - job_logs: 任务执行日志

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 1. 创建 unique_views 表
        manager
            .create_table(
                Table::create()
                    .table(UniqueView::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UniqueView::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(UniqueView::ViewsCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(UniqueView::CreateTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_unique_views_create_time")
                    .table(UniqueView::Table)
                    .col(UniqueView::CreateTime)
                    .to_owned(),
            )
            .await?;

        // 2. 创建 resources 表
        manager
            .create_table(
                Table::create()
                    .table(Resource::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Resource::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Resource::ResourceName)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Resource::Url).string_len(255).null())
                    .col(ColumnDef::new(Resource::RequestMethod).string_len(16).null())
                    .col(ColumnDef::new(Resource::ParentId).integer().null())
                    .col(
                        ColumnDef::new(Resource::IsAnonymous)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Resource::CreateTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Resource::UpdateTime)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 索引：url + request_method（导入时按此匹配已有资源）
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_resources_url_method")
                    .table(Resource::Table)
                    .col(Resource::Url)
                    .col(Resource::RequestMethod)
                    .to_owned(),
            )
            .await?;

        // 3. 创建 role_resources 表
        manager
            .create_table(
                Table::create()
                    .table(RoleResource::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RoleResource::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(RoleResource::RoleId).integer().not_null())
                    .col(
                        ColumnDef::new(RoleResource::ResourceId)
                            .integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 唯一索引：同一角色对同一资源只能有一条关联
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_role_resources_role_resource")
                    .table(RoleResource::Table)
                    .col(RoleResource::RoleId)
                    .col(RoleResource::ResourceId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 4. 创建 job_logs 表
        manager
            .create_table(
                Table::create()
                    .table(JobLog::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(JobLog::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(JobLog::JobName).string_len(64).not_null())
                    .col(ColumnDef::new(JobLog::JobGroup).string_len(64).not_null())
                    .col(
                        ColumnDef::new(JobLog::InvokeTarget)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(JobLog::JobMessage).text().null())
                    .col(ColumnDef::new(JobLog::Status).integer().not_null())
                    .col(ColumnDef::new(JobLog::ExceptionInfo).text().null())
                    .col(
                        ColumnDef::new(JobLog::StartTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(JobLog::EndTime)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(JobLog::CreateTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 索引：create_time（用于保留策略清理）
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_job_logs_create_time")
                    .table(JobLog::Table)
                    .col(JobLog::CreateTime)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_job_logs_create_time").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(JobLog::Table).to_owned())
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_role_resources_role_resource")
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(RoleResource::Table).to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_resources_url_method").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Resource::Table).to_owned())
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_unique_views_create_time")
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(UniqueView::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum UniqueView {
    #[sea_orm(iden = "unique_views")]
    Table,
    Id,
    ViewsCount,
    CreateTime,
}

#[derive(DeriveIden)]
enum Resource {
    #[sea_orm(iden = "resources")]
    Table,
    Id,
    ResourceName,
    Url,
    RequestMethod,
    ParentId,
    IsAnonymous,
    CreateTime,
    UpdateTime,
}

#[derive(DeriveIden)]
enum RoleResource {
    #[sea_orm(iden = "role_resources")]
    Table,
    Id,
    RoleId,
    ResourceId,
}

#[derive(DeriveIden)]
enum JobLog {
    #[sea_orm(iden = "job_logs")]
    Table,
    Id,
    JobName,
    JobGroup,
    InvokeTarget,
    JobMessage,
    Status,
    ExceptionInfo,
    StartTime,
    EndTime,
    CreateTime,
}
