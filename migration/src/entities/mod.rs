pub mod article;
pub mod job_log;
pub mod resource;
pub mod role_resource;
pub mod unique_view;
pub mod user_auth;
pub mod user_info;
pub mod user_role;

pub use article::Entity as ArticleEntity;
pub use job_log::Entity as JobLogEntity;
pub use resource::Entity as ResourceEntity;
pub use role_resource::Entity as RoleResourceEntity;
pub use unique_view::Entity as UniqueViewEntity;
pub use user_auth::Entity as UserAuthEntity;
pub use user_info::Entity as UserInfoEntity;
pub use user_role::Entity as UserRoleEntity;
