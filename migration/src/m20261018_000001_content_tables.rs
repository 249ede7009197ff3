//! 内容与用户表迁移
//!
//! - articles: 文章
//! - user_infos: 用户资料
//! - user_auths: 用户登录信息（含 IP 来源）
//! - user_roles: 用户角色关联

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 1. 创建 articles 表
        manager
            .create_table(
                Table::create()
                    .table(Article::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Article::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Article::UserId).integer().not_null())
                    .col(ColumnDef::new(Article::CategoryId).integer().null())
                    .col(ColumnDef::new(Article::ArticleCover).string_len(1024).null())
                    .col(
                        ColumnDef::new(Article::ArticleTitle)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Article::ArticleContent).text().not_null())
                    .col(
                        ColumnDef::new(Article::IsDelete)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Article::Status)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(Article::CreateTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Article::UpdateTime)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 2. 创建 user_infos 表
        manager
            .create_table(
                Table::create()
                    .table(UserInfo::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserInfo::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UserInfo::Email).string_len(255).null())
                    .col(ColumnDef::new(UserInfo::Nickname).string_len(64).not_null())
                    .col(ColumnDef::new(UserInfo::Avatar).string_len(1024).not_null())
                    .col(ColumnDef::new(UserInfo::Intro).string_len(255).null())
                    .col(ColumnDef::new(UserInfo::Website).string_len(255).null())
                    .col(
                        ColumnDef::new(UserInfo::IsSubscribe)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(UserInfo::IsDisable)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(UserInfo::CreateTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserInfo::UpdateTime)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 3. 创建 user_auths 表
        manager
            .create_table(
                Table::create()
                    .table(UserAuth::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserAuth::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UserAuth::UserInfoId).integer().not_null())
                    .col(ColumnDef::new(UserAuth::Username).string_len(64).not_null())
                    .col(ColumnDef::new(UserAuth::IpAddress).string_len(64).null())
                    .col(ColumnDef::new(UserAuth::IpSource).string_len(255).null())
                    .col(
                        ColumnDef::new(UserAuth::LastLoginTime)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(UserAuth::CreateTime)
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
                    .name("idx_user_auths_username")
                    .table(UserAuth::Table)
                    .col(UserAuth::Username)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 4. 创建 user_roles 表
        manager
            .create_table(
                Table::create()
                    .table(UserRole::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserRole::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UserRole::UserId).integer().not_null())
                    .col(ColumnDef::new(UserRole::RoleId).integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_user_roles_user")
                    .table(UserRole::Table)
                    .col(UserRole::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_user_roles_user").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserRole::Table).to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_user_auths_username").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserAuth::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(UserInfo::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Article::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Article {
    #[sea_orm(iden = "articles")]
    Table,
    Id,
    UserId,
    CategoryId,
    ArticleCover,
    ArticleTitle,
    ArticleContent,
    IsDelete,
    Status,
    CreateTime,
    UpdateTime,
}

#[derive(DeriveIden)]
enum UserInfo {
    #[sea_orm(iden = "user_infos")]
    Table,
    Id,
    Email,
    Nickname,
    Avatar,
    Intro,
    Website,
    IsSubscribe,
    IsDisable,
    CreateTime,
    UpdateTime,
}

#[derive(DeriveIden)]
enum UserAuth {
    #[sea_orm(iden = "user_auths")]
    Table,
    Id,
    UserInfoId,
    Username,
    IpAddress,
    IpSource,
    LastLoginTime,
    CreateTime,
}

#[derive(DeriveIden)]
enum UserRole {
    #[sea_orm(iden = "user_roles")]
    Table,
    Id,
    UserId,
    RoleId,
}
